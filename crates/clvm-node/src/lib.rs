//! # CLVM Node
//! The tree value model of CLVM: every value is either an atom, an immutable
//! byte string, or a pair of two values. Trees live in an [`Allocator`] and
//! are referred to by [`NodePtr`] handles.
//!
//! The [`ToNode`] and [`FromNode`] traits convert between Rust values and trees.
//!
//! ```rust
//! use clvm_node::{node_list, Allocator, FromNode, ToNode};
//!
//! let a = &mut Allocator::new();
//! let list = node_list!(1, "two", (3, 4)).to_node(a).unwrap();
//!
//! let items = a.list(list).unwrap();
//! assert_eq!(items.len(), 3);
//! assert_eq!(String::from_node(a, items[1]).unwrap(), "two");
//! ```

mod allocator;
mod error;
mod from_node;
mod int_encoding;
mod macros;
mod to_node;

#[cfg(feature = "arbitrary")]
mod fuzzing;

pub use allocator::*;
pub use error::*;
pub use from_node::*;
pub use int_encoding::*;
pub use to_node::*;

#[cfg(feature = "arbitrary")]
pub use fuzzing::*;

//! # CLVM Serialize
//! The canonical binary serialization of CLVM trees.
//!
//! An atom of a single byte below `0x80` is serialized as itself, the empty
//! atom as `0x80`, and any other atom as a length prefix followed by its
//! bytes. A pair is `0xff` followed by its first and then its rest.
//!
//! The `*_backrefs` functions additionally understand `0xfe`, a reference to
//! an object serialized earlier in the same stream, which lets trees that
//! share structure serialize in a fraction of the canonical size. Decoders
//! that don't allow back-references reject them.
//!
//! ```rust
//! use clvm_node::{node_list, Allocator, ToNode};
//! use clvm_serialize::{node_from_bytes, node_to_bytes};
//!
//! let a = &mut Allocator::new();
//! let node = node_list!(1, 2).to_node(a).unwrap();
//! let bytes = node_to_bytes(a, node).unwrap();
//! assert_eq!(bytes, [0xff, 0x01, 0xff, 0x02, 0x80]);
//!
//! let decoded = node_from_bytes(a, &bytes).unwrap();
//! assert!(clvm_node::node_eq(a, node, a, decoded));
//! ```

mod atom;
mod backref;
mod decode;
mod encode;
mod error;
mod flags;
mod scan;
mod serialized_node;
mod stream;

#[cfg(test)]
mod test_utils;

pub use atom::*;
pub use backref::*;
pub use decode::*;
pub use encode::*;
pub use error::*;
pub use flags::*;
pub use scan::*;
pub use serialized_node::*;

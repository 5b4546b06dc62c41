//! Re-exports the crates of this workspace, each behind a feature of the same
//! name.

#[cfg(feature = "node")]
pub use clvm_node as node;

#[cfg(feature = "serialize")]
pub use clvm_serialize as serialize;

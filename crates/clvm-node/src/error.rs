use std::string::FromUtf8Error;

use thiserror::Error;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeError {
    #[error("type mismatch: expected atom")]
    ExpectedAtom,

    #[error("type mismatch: expected pair")]
    ExpectedPair,

    #[error("too many atoms")]
    TooManyAtoms,

    #[error("too many pairs")]
    TooManyPairs,

    #[error("out of memory")]
    OutOfMemory,
}

impl NodeError {
    /// True for errors caused by asking an atom for pair data, or vice versa.
    pub fn is_type_mismatch(&self) -> bool {
        matches!(self, Self::ExpectedAtom | Self::ExpectedPair)
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FromNodeError {
    #[error("{0}")]
    Node(#[from] NodeError),

    #[error("{0}")]
    InvalidUtf8(#[from] FromUtf8Error),

    #[error("expected atom of length {expected}, but found length {found}")]
    WrongAtomLength { expected: usize, found: usize },

    #[error("{0}")]
    Custom(String),
}

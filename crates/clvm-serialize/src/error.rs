use std::io;

use clvm_node::NodeError;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("malformed input: {0}")]
    MalformedInput(&'static str),

    #[error("unexpected end of input")]
    UnexpectedEndOfInput,

    #[error("length {0} exceeds the size limit")]
    SizeLimitExceeded(u64),

    #[error("invalid back reference to offset {0}")]
    InvalidBackReference(u64),

    #[error("{0}")]
    Node(#[from] NodeError),

    #[error("i/o error: {0}")]
    Io(String),
}

pub type Result<T> = std::result::Result<T, Error>;

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        if err.kind() == io::ErrorKind::UnexpectedEof {
            Self::UnexpectedEndOfInput
        } else {
            Self::Io(err.to_string())
        }
    }
}

impl From<Error> for io::Error {
    fn from(err: Error) -> Self {
        let kind = match err {
            Error::UnexpectedEndOfInput => io::ErrorKind::UnexpectedEof,
            Error::Io(_) => io::ErrorKind::Other,
            _ => io::ErrorKind::InvalidData,
        };
        io::Error::new(kind, err)
    }
}

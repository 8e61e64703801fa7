//! BSON codec error type.

use thiserror::Error;

/// Error type for BSON encoding and decoding operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BsonError {
    #[error("unexpected end of input")]
    UnexpectedEof,
    #[error("unknown element kind tag: 0x{0:02x}")]
    UnknownKind(u8),
    #[error("invalid UTF-8")]
    InvalidUtf8,
    #[error("document length prefix {declared} does not bracket the {actual} bytes read")]
    LengthMismatch { declared: i32, actual: usize },
    #[error("untyped node cannot be encoded")]
    EmptyNode,
}

//! Error types for EJSON encoding and decoding.

use thiserror::Error;

/// Errors that can occur while rendering Extended JSON.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EjsonEncodeError {
    /// An untyped placeholder node reached the emitter.
    #[error("untyped node cannot be rendered")]
    EmptyNode,
}

/// Errors that can occur while parsing Extended JSON.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EjsonDecodeError {
    #[error("unexpected end of input")]
    UnexpectedEof,
    #[error("unexpected character at offset {0}")]
    UnexpectedChar(usize),
    #[error("unterminated string literal")]
    UnterminatedString,
    #[error("invalid UTF-8")]
    InvalidUtf8,
    #[error("unknown wrapper key: {0:?}")]
    UnknownWrapper(String),
    #[error("invalid number literal")]
    InvalidNumber,
    #[error("invalid $oid payload")]
    InvalidObjectId,
    #[error("invalid $date payload")]
    InvalidDate,
    #[error("invalid $numberDouble payload")]
    InvalidDouble,
    #[error("invalid $binary payload")]
    InvalidBinary,
    #[error("invalid $timestamp payload")]
    InvalidTimestamp,
    #[error("invalid $regularExpression payload")]
    InvalidRegularExpression,
}

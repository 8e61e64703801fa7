//! BSON binary encoding and decoding.
//!
//! All multi-byte integers and floats are little-endian. Documents are
//! framed as an inclusive int32 length prefix, a stream of
//! `tag | key NUL | payload` elements, and a single NUL terminator.

pub mod decoder;
pub mod encoder;
pub mod error;

pub use decoder::BsonDecoder;
pub use encoder::BsonEncoder;
pub use error::BsonError;

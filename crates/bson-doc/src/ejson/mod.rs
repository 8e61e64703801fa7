//! Extended JSON (EJSON) encoding and decoding.
//!
//! EJSON is a superset of JSON in which non-native kinds appear as objects
//! whose sole key begins with `$` (e.g. `{ "$oid" : "..." }`). The emitter
//! produces the canonical forms with humane spacing; the reader tolerates
//! arbitrary whitespace between tokens.

mod date;
pub mod decoder;
pub mod encoder;
pub mod error;

pub use decoder::EjsonDecoder;
pub use encoder::EjsonEncoder;
pub use error::{EjsonDecodeError, EjsonEncodeError};

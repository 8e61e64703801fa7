//! Ordered BSON document model with binary and Extended JSON codecs.
//!
//! The crate is a format library, not a database client. It provides:
//!
//! - a recursive, typed, ordered key/value tree ([`Value`] and
//!   [`Container`]) covering the fifteen BSON node kinds;
//! - a deterministic binary codec ([`BsonEncoder`] / [`BsonDecoder`]) with
//!   exact byte-size accounting ([`Value::encoded_size`]);
//! - an Extended JSON codec ([`EjsonEncoder`] / [`EjsonDecoder`]) that
//!   renders non-JSON-native kinds as `$`-prefixed wrapper objects.
//!
//! ```
//! use bson_doc::{Container, Value};
//!
//! let mut doc = Container::document();
//! doc.insert("greeting", "hello world!").unwrap();
//! doc.insert("count", 3i32).unwrap();
//!
//! let bytes = doc.to_bson().unwrap();
//! let back = Container::from_bson(&bytes).unwrap();
//! assert_eq!(back, doc);
//!
//! let text = doc.to_ejson().unwrap();
//! assert_eq!(Container::from_ejson(&text).unwrap(), doc);
//! assert_eq!(back.get("count"), Some(&Value::Int32(3)));
//! ```

pub mod bson;
pub mod container;
pub mod ejson;
pub mod value;

pub use bson::{BsonDecoder, BsonEncoder, BsonError};
pub use container::{Container, ContainerError, ContainerKind};
pub use ejson::{EjsonDecodeError, EjsonDecoder, EjsonEncodeError, EjsonEncoder};
pub use value::{Binary, BinarySubtype, Kind, ObjectId, Regular, Value};

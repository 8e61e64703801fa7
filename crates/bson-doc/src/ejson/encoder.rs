//! Extended JSON emitter.
//!
//! Produces the canonical textual forms with humane spacing: a single
//! space after `{`, `[`, `,` and on both sides of `:`, and a single space
//! before `}` and `]`.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use super::date;
use super::error::EjsonEncodeError;
use crate::container::{Container, ContainerKind};
use crate::value::{Binary, ObjectId, Regular, Value};

/// EJSON encoder. Writes Extended JSON into an internal byte buffer.
pub struct EjsonEncoder {
    out: Vec<u8>,
}

impl Default for EjsonEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl EjsonEncoder {
    pub fn new() -> Self {
        Self { out: Vec::new() }
    }

    /// Encodes any value to UTF-8 JSON bytes.
    pub fn encode(&mut self, value: &Value) -> Result<Vec<u8>, EjsonEncodeError> {
        self.out.clear();
        self.write_value(value)?;
        Ok(std::mem::take(&mut self.out))
    }

    /// Encodes a container without wrapping it in a [`Value`].
    pub fn encode_container(&mut self, container: &Container) -> Result<Vec<u8>, EjsonEncodeError> {
        self.out.clear();
        self.write_container(container)?;
        Ok(std::mem::take(&mut self.out))
    }

    /// Convenience: encode and return as a `String`.
    pub fn encode_to_string(&mut self, value: &Value) -> Result<String, EjsonEncodeError> {
        let bytes = self.encode(value)?;
        Ok(String::from_utf8(bytes).unwrap_or_default())
    }

    fn write_value(&mut self, value: &Value) -> Result<(), EjsonEncodeError> {
        match value {
            Value::Empty => return Err(EjsonEncodeError::EmptyNode),
            Value::Null => self.buf(b"null"),
            Value::Boolean(true) => self.buf(b"true"),
            Value::Boolean(false) => self.buf(b"false"),
            Value::Int32(v) => self.ascii(&v.to_string()),
            Value::Int64(v) => self.ascii(&v.to_string()),
            Value::Double(v) => self.write_double(*v),
            Value::Str(s) => self.write_str(s),
            Value::Binary(bin) => self.write_binary(bin),
            Value::ObjectId(id) => self.write_object_id(id),
            Value::DateTime(ms) => self.write_datetime(*ms),
            Value::Timestamp(v) => self.write_timestamp(*v),
            Value::Regular(r) => self.write_regular(r),
            Value::MinKey => self.buf(b"{ \"$minKey\" : 1 }"),
            Value::MaxKey => self.buf(b"{ \"$maxKey\" : 1 }"),
            Value::Document(c) | Value::Array(c) => self.write_container(c)?,
        }
        Ok(())
    }

    fn write_container(&mut self, container: &Container) -> Result<(), EjsonEncodeError> {
        match container.kind() {
            ContainerKind::Document => self.write_document(container),
            ContainerKind::Array => self.write_array(container),
        }
    }

    fn write_document(&mut self, container: &Container) -> Result<(), EjsonEncodeError> {
        if container.is_empty() {
            self.buf(b"{ }");
            return Ok(());
        }
        self.buf(b"{ ");
        for (i, (key, value)) in container.iter().enumerate() {
            if i > 0 {
                self.buf(b", ");
            }
            self.write_str(key);
            self.buf(b" : ");
            self.write_value(value)?;
        }
        self.buf(b" }");
        Ok(())
    }

    fn write_array(&mut self, container: &Container) -> Result<(), EjsonEncodeError> {
        if container.is_empty() {
            self.buf(b"[ ]");
            return Ok(());
        }
        self.buf(b"[ ");
        for (i, (_, value)) in container.iter().enumerate() {
            if i > 0 {
                self.buf(b", ");
            }
            self.write_value(value)?;
        }
        self.buf(b" ]");
        Ok(())
    }

    /// Writes a double. Non-finite values become the JSON strings `"NaN"`,
    /// `"Infinity"`, `"-Infinity"` to stay syntactically valid; finite
    /// values always carry a `.` so they re-read as doubles.
    fn write_double(&mut self, v: f64) {
        if v.is_nan() {
            self.buf(b"\"NaN\"");
        } else if v.is_infinite() {
            if v < 0.0 {
                self.buf(b"\"-Infinity\"");
            } else {
                self.buf(b"\"Infinity\"");
            }
        } else {
            let mut s = v.to_string();
            if !s.contains('.') {
                s.push_str(".0");
            }
            self.ascii(&s);
        }
    }

    /// Writes a JSON-encoded string with proper escaping.
    fn write_str(&mut self, s: &str) {
        let json = serde_json::to_string(s).unwrap_or_else(|_| "\"\"".to_string());
        self.buf(json.as_bytes());
    }

    fn write_binary(&mut self, bin: &Binary) {
        let b64 = STANDARD.encode(&bin.data);
        self.buf(b"{ \"$binary\" : { \"base64\" : \"");
        self.ascii(&b64);
        self.buf(b"\", \"subType\" : \"");
        self.ascii(&format!("{:02x}", bin.subtype.to_u8()));
        self.buf(b"\" } }");
    }

    fn write_object_id(&mut self, id: &ObjectId) {
        self.buf(b"{ \"$oid\" : \"");
        self.ascii(&id.to_string());
        self.buf(b"\" }");
    }

    fn write_datetime(&mut self, ms: i64) {
        self.buf(b"{ \"$date\" : \"");
        self.ascii(&date::to_iso_string(ms));
        self.buf(b"\" }");
    }

    fn write_timestamp(&mut self, v: u64) {
        self.buf(b"{ \"$timestamp\" : { \"t\" : ");
        self.ascii(&v.to_string());
        self.buf(b", \"i\" : 1 } }");
    }

    fn write_regular(&mut self, r: &Regular) {
        self.buf(b"{ \"$regularExpression\" : { \"pattern\" : ");
        self.write_str(&r.pattern);
        self.buf(b", \"options\" : ");
        self.write_str(&r.options);
        self.buf(b" } }");
    }

    fn buf(&mut self, bytes: &[u8]) {
        self.out.extend_from_slice(bytes);
    }

    fn ascii(&mut self, s: &str) {
        self.out.extend_from_slice(s.as_bytes());
    }
}

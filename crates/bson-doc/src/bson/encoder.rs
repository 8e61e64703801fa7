//! BSON document encoder.

use super::error::BsonError;
use crate::container::Container;
use crate::value::Value;

/// Encodes a document tree to BSON bytes.
///
/// The top level is always a container; BSON has no scalar top-level
/// encoding. The size prefix is written up front from
/// [`Container::encoded_size`], so `encode(c).len() == c.encoded_size()`
/// holds for every value tree.
pub struct BsonEncoder;

impl Default for BsonEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl BsonEncoder {
    pub fn new() -> Self {
        Self
    }

    /// Encodes a container (document or array policy) to bytes.
    pub fn encode(&self, container: &Container) -> Result<Vec<u8>, BsonError> {
        let mut buf = Vec::with_capacity(container.encoded_size());
        self.write_container(&mut buf, container)?;
        Ok(buf)
    }

    fn write_container(&self, buf: &mut Vec<u8>, container: &Container) -> Result<(), BsonError> {
        let size = container.encoded_size() as i32;
        buf.extend_from_slice(&size.to_le_bytes());
        for (key, value) in container.iter() {
            self.write_element(buf, key, value)?;
        }
        buf.push(0); // terminating null byte
        Ok(())
    }

    fn write_element(&self, buf: &mut Vec<u8>, key: &str, value: &Value) -> Result<(), BsonError> {
        if matches!(value, Value::Empty) {
            return Err(BsonError::EmptyNode);
        }
        buf.push(value.kind().tag());
        self.write_cstring(buf, key);
        match value {
            Value::Empty => unreachable!("rejected above"),
            Value::Null | Value::MinKey | Value::MaxKey => {}
            Value::Int32(v) => buf.extend_from_slice(&v.to_le_bytes()),
            Value::Int64(v) => buf.extend_from_slice(&v.to_le_bytes()),
            Value::Double(v) => buf.extend_from_slice(&v.to_le_bytes()),
            Value::Boolean(v) => buf.push(if *v { 1 } else { 0 }),
            Value::Str(s) => self.write_string(buf, s),
            Value::Binary(bin) => {
                buf.extend_from_slice(&(bin.data.len() as i32).to_le_bytes());
                buf.push(bin.subtype.to_u8());
                buf.extend_from_slice(&bin.data);
            }
            Value::ObjectId(id) => buf.extend_from_slice(id.bytes()),
            Value::DateTime(ms) => buf.extend_from_slice(&ms.to_le_bytes()),
            Value::Timestamp(v) => buf.extend_from_slice(&v.to_le_bytes()),
            Value::Regular(r) => {
                self.write_cstring(buf, &r.pattern);
                self.write_cstring(buf, &r.options);
            }
            Value::Document(c) | Value::Array(c) => self.write_container(buf, c)?,
        }
        Ok(())
    }

    /// Writes a null-terminated byte string without a length prefix.
    fn write_cstring(&self, buf: &mut Vec<u8>, s: &str) {
        buf.extend_from_slice(s.as_bytes());
        buf.push(0);
    }

    /// Writes a BSON string: little-endian i32 length (NUL inclusive),
    /// UTF-8 bytes, NUL.
    fn write_string(&self, buf: &mut Vec<u8>, s: &str) {
        let len = (s.len() as i32) + 1;
        buf.extend_from_slice(&len.to_le_bytes());
        buf.extend_from_slice(s.as_bytes());
        buf.push(0);
    }
}

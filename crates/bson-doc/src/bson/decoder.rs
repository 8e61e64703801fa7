//! BSON document decoder.

use super::error::BsonError;
use crate::container::{Container, ContainerKind};
use crate::value::{Binary, BinarySubtype, Kind, ObjectId, Regular, Value};

/// Decodes BSON bytes into a document tree.
///
/// The element stream is authoritative: decoding walks tag bytes until the
/// zero terminator and only afterwards verifies that the declared length
/// prefix brackets exactly the bytes consumed.
pub struct BsonDecoder {
    data: Vec<u8>,
    x: usize,
}

impl Default for BsonDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl BsonDecoder {
    pub fn new() -> Self {
        Self {
            data: Vec::new(),
            x: 0,
        }
    }

    /// Decodes one top-level document from bytes.
    pub fn decode(&mut self, data: &[u8]) -> Result<Container, BsonError> {
        self.data = data.to_vec();
        self.x = 0;
        self.read_container(ContainerKind::Document)
    }

    #[inline]
    fn check(&self, n: usize) -> Result<(), BsonError> {
        if self.x + n > self.data.len() {
            Err(BsonError::UnexpectedEof)
        } else {
            Ok(())
        }
    }

    fn u8(&mut self) -> Result<u8, BsonError> {
        self.check(1)?;
        let val = self.data[self.x];
        self.x += 1;
        Ok(val)
    }

    fn i32_le(&mut self) -> Result<i32, BsonError> {
        let bytes = self.buf(4)?;
        Ok(i32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    fn i64_le(&mut self) -> Result<i64, BsonError> {
        let bytes = self.buf(8)?;
        let mut raw = [0u8; 8];
        raw.copy_from_slice(&bytes);
        Ok(i64::from_le_bytes(raw))
    }

    fn u64_le(&mut self) -> Result<u64, BsonError> {
        let bytes = self.buf(8)?;
        let mut raw = [0u8; 8];
        raw.copy_from_slice(&bytes);
        Ok(u64::from_le_bytes(raw))
    }

    fn f64_le(&mut self) -> Result<f64, BsonError> {
        let bytes = self.buf(8)?;
        let mut raw = [0u8; 8];
        raw.copy_from_slice(&bytes);
        Ok(f64::from_le_bytes(raw))
    }

    fn buf(&mut self, n: usize) -> Result<Vec<u8>, BsonError> {
        self.check(n)?;
        let data = self.data[self.x..self.x + n].to_vec();
        self.x += n;
        Ok(data)
    }

    fn utf8(&mut self, n: usize) -> Result<String, BsonError> {
        let bytes = self.buf(n)?;
        String::from_utf8(bytes).map_err(|_| BsonError::InvalidUtf8)
    }

    fn read_container(&mut self, kind: ContainerKind) -> Result<Container, BsonError> {
        let start = self.x;
        let declared = self.i32_le()?;
        let mut out = match kind {
            ContainerKind::Document => Container::document(),
            ContainerKind::Array => Container::array(),
        };
        loop {
            let tag = self.u8()?;
            if tag == 0 {
                break;
            }
            let key = self.read_cstring()?;
            let value = self.read_element_value(tag)?;
            out.push_node(key, value);
        }
        let actual = self.x - start;
        if declared < 0 || actual != declared as usize {
            return Err(BsonError::LengthMismatch { declared, actual });
        }
        Ok(out)
    }

    fn read_cstring(&mut self) -> Result<String, BsonError> {
        let start = self.x;
        while self.x < self.data.len() && self.data[self.x] != 0 {
            self.x += 1;
        }
        if self.x >= self.data.len() {
            return Err(BsonError::UnexpectedEof);
        }
        let s = String::from_utf8(self.data[start..self.x].to_vec())
            .map_err(|_| BsonError::InvalidUtf8)?;
        self.x += 1; // skip null terminator
        Ok(s)
    }

    fn read_string(&mut self) -> Result<String, BsonError> {
        let length = self.i32_le()?;
        if length <= 0 {
            return Ok(String::new());
        }
        let s = self.utf8(length as usize - 1)?; // length includes the NUL
        self.u8()?; // consume the terminator
        Ok(s)
    }

    fn read_element_value(&mut self, tag: u8) -> Result<Value, BsonError> {
        let kind = Kind::from_tag(tag).ok_or(BsonError::UnknownKind(tag))?;
        match kind {
            Kind::Double => Ok(Value::Double(self.f64_le()?)),
            Kind::Str => Ok(Value::Str(self.read_string()?)),
            Kind::Document => Ok(Value::Document(
                self.read_container(ContainerKind::Document)?,
            )),
            Kind::Array => Ok(Value::Array(self.read_container(ContainerKind::Array)?)),
            Kind::Binary => self.read_binary(),
            Kind::ObjectId => {
                let bytes = self.buf(12)?;
                let mut raw = [0u8; 12];
                raw.copy_from_slice(&bytes);
                Ok(Value::ObjectId(ObjectId(raw)))
            }
            // Exactly 0x01 reads as true; any other byte is false.
            Kind::Boolean => Ok(Value::Boolean(self.u8()? == 1)),
            Kind::DateTime => Ok(Value::DateTime(self.i64_le()?)),
            Kind::Null => Ok(Value::Null),
            Kind::Regular => {
                let pattern = self.read_cstring()?;
                let options = self.read_cstring()?;
                Ok(Value::Regular(Regular { pattern, options }))
            }
            Kind::Int32 => Ok(Value::Int32(self.i32_le()?)),
            Kind::Timestamp => Ok(Value::Timestamp(self.u64_le()?)),
            Kind::Int64 => Ok(Value::Int64(self.i64_le()?)),
            Kind::MinKey => Ok(Value::MinKey),
            Kind::MaxKey => Ok(Value::MaxKey),
            Kind::Unknown => Err(BsonError::UnknownKind(tag)),
        }
    }

    fn read_binary(&mut self) -> Result<Value, BsonError> {
        let length = self.i32_le()?;
        if length < 0 {
            return Err(BsonError::UnexpectedEof);
        }
        let subtype = BinarySubtype::from_u8(self.u8()?);
        let data = self.buf(length as usize)?;
        Ok(Value::Binary(Binary { subtype, data }))
    }
}

//! The value model: a closed sum over every node kind a document can hold.

use std::fmt;

use crate::container::Container;

/// One-byte wire tag identifying a value kind inside an encoded document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Kind {
    /// IEEE-754 binary64 (0x01)
    Double = 0x01,
    /// Length-prefixed UTF-8 string (0x02)
    Str = 0x02,
    /// Embedded document (0x03)
    Document = 0x03,
    /// Array, encoded as a document with decimal keys (0x04)
    Array = 0x04,
    /// Binary payload with subtype byte (0x05)
    Binary = 0x05,
    /// 12-byte ObjectId (0x07)
    ObjectId = 0x07,
    /// Boolean (0x08)
    Boolean = 0x08,
    /// UTC datetime, milliseconds since the Unix epoch (0x09)
    DateTime = 0x09,
    /// Null (0x0a)
    Null = 0x0A,
    /// Regular expression: pattern and options cstrings (0x0b)
    Regular = 0x0B,
    /// Signed 32-bit integer (0x10)
    Int32 = 0x10,
    /// Opaque unsigned 64-bit timestamp (0x11)
    Timestamp = 0x11,
    /// Signed 64-bit integer (0x12)
    Int64 = 0x12,
    /// MaxKey sentinel (0x7f)
    MaxKey = 0x7F,
    /// Decoder placeholder; never serialized (0xef)
    Unknown = 0xEF,
    /// MinKey sentinel (0xff)
    MinKey = 0xFF,
}

impl Kind {
    /// The wire tag byte for this kind.
    pub fn tag(self) -> u8 {
        self as u8
    }

    /// Maps a wire tag back to a kind. `None` for tags outside the closed
    /// sum, including the `0xEF` sentinel reserved for untyped nodes.
    pub fn from_tag(tag: u8) -> Option<Kind> {
        match tag {
            0x01 => Some(Kind::Double),
            0x02 => Some(Kind::Str),
            0x03 => Some(Kind::Document),
            0x04 => Some(Kind::Array),
            0x05 => Some(Kind::Binary),
            0x07 => Some(Kind::ObjectId),
            0x08 => Some(Kind::Boolean),
            0x09 => Some(Kind::DateTime),
            0x0A => Some(Kind::Null),
            0x0B => Some(Kind::Regular),
            0x10 => Some(Kind::Int32),
            0x11 => Some(Kind::Timestamp),
            0x12 => Some(Kind::Int64),
            0x7F => Some(Kind::MaxKey),
            0xFF => Some(Kind::MinKey),
            _ => None,
        }
    }
}

/// One-byte tag identifying the semantic category of a binary payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinarySubtype {
    Generic,
    Function,
    BinaryOld,
    UuidOld,
    Uuid,
    Md5,
    Encrypted,
    User,
    /// Any subtype byte outside the named set, preserved as-is.
    Other(u8),
}

impl BinarySubtype {
    pub fn from_u8(byte: u8) -> BinarySubtype {
        match byte {
            0x00 => BinarySubtype::Generic,
            0x01 => BinarySubtype::Function,
            0x02 => BinarySubtype::BinaryOld,
            0x03 => BinarySubtype::UuidOld,
            0x04 => BinarySubtype::Uuid,
            0x05 => BinarySubtype::Md5,
            0x06 => BinarySubtype::Encrypted,
            0x80 => BinarySubtype::User,
            other => BinarySubtype::Other(other),
        }
    }

    pub fn to_u8(self) -> u8 {
        match self {
            BinarySubtype::Generic => 0x00,
            BinarySubtype::Function => 0x01,
            BinarySubtype::BinaryOld => 0x02,
            BinarySubtype::UuidOld => 0x03,
            BinarySubtype::Uuid => 0x04,
            BinarySubtype::Md5 => 0x05,
            BinarySubtype::Encrypted => 0x06,
            BinarySubtype::User => 0x80,
            BinarySubtype::Other(byte) => byte,
        }
    }
}

impl Default for BinarySubtype {
    fn default() -> Self {
        BinarySubtype::Generic
    }
}

/// Opaque 12-byte object identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ObjectId(pub [u8; 12]);

impl ObjectId {
    pub fn bytes(&self) -> &[u8; 12] {
        &self.0
    }

    /// Parses 24 hex characters (either case) into an id.
    pub fn parse_hex(hex: &str) -> Option<ObjectId> {
        let bytes = hex.as_bytes();
        if bytes.len() != 24 || !bytes.iter().all(|b| b.is_ascii_hexdigit()) {
            return None;
        }
        let mut out = [0u8; 12];
        for (i, chunk) in hex.as_bytes().chunks(2).enumerate() {
            let pair = std::str::from_utf8(chunk).ok()?;
            out[i] = u8::from_str_radix(pair, 16).ok()?;
        }
        Some(ObjectId(out))
    }
}

impl From<[u8; 12]> for ObjectId {
    fn from(bytes: [u8; 12]) -> Self {
        ObjectId(bytes)
    }
}

/// Renders the id as 24 lowercase hex characters.
impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in self.0 {
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}

/// Binary payload plus its subtype byte.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Binary {
    pub subtype: BinarySubtype,
    pub data: Vec<u8>,
}

impl Binary {
    /// A generic-subtype payload.
    pub fn new(data: Vec<u8>) -> Binary {
        Binary {
            subtype: BinarySubtype::Generic,
            data,
        }
    }

    pub fn with_subtype(subtype: BinarySubtype, data: Vec<u8>) -> Binary {
        Binary { subtype, data }
    }
}

/// Regular expression: pattern and options strings, both NUL-free.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Regular {
    pub pattern: String,
    pub options: String,
}

impl Regular {
    pub fn new(pattern: impl Into<String>, options: impl Into<String>) -> Regular {
        Regular {
            pattern: pattern.into(),
            options: options.into(),
        }
    }
}

/// A single node of the document tree.
///
/// `Empty` exists only as the decoder's "target not yet typed" state and as
/// the placeholder installed by auto-vivifying keyed access; neither codec
/// will ever serialize it.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    #[default]
    Empty,
    Null,
    Int32(i32),
    Int64(i64),
    Double(f64),
    Boolean(bool),
    Str(String),
    Binary(Binary),
    ObjectId(ObjectId),
    /// Milliseconds since the Unix epoch, UTC.
    DateTime(i64),
    Timestamp(u64),
    Regular(Regular),
    MinKey,
    MaxKey,
    Document(Container),
    Array(Container),
}

impl Value {
    pub fn kind(&self) -> Kind {
        match self {
            Value::Empty => Kind::Unknown,
            Value::Null => Kind::Null,
            Value::Int32(_) => Kind::Int32,
            Value::Int64(_) => Kind::Int64,
            Value::Double(_) => Kind::Double,
            Value::Boolean(_) => Kind::Boolean,
            Value::Str(_) => Kind::Str,
            Value::Binary(_) => Kind::Binary,
            Value::ObjectId(_) => Kind::ObjectId,
            Value::DateTime(_) => Kind::DateTime,
            Value::Timestamp(_) => Kind::Timestamp,
            Value::Regular(_) => Kind::Regular,
            Value::MinKey => Kind::MinKey,
            Value::MaxKey => Kind::MaxKey,
            Value::Document(_) => Kind::Document,
            Value::Array(_) => Kind::Array,
        }
    }

    /// Exact payload size in bytes when encoded, excluding the tag byte and
    /// key that frame the value inside its parent document.
    pub fn encoded_size(&self) -> usize {
        match self {
            Value::Empty | Value::Null | Value::MinKey | Value::MaxKey => 0,
            Value::Boolean(_) => 1,
            Value::Int32(_) => 4,
            Value::Int64(_) | Value::Double(_) | Value::DateTime(_) | Value::Timestamp(_) => 8,
            // int32 length prefix + bytes + trailing NUL
            Value::Str(s) => 4 + s.len() + 1,
            // int32 length prefix + subtype byte + payload
            Value::Binary(b) => 4 + 1 + b.data.len(),
            Value::ObjectId(_) => 12,
            Value::Regular(r) => r.pattern.len() + 1 + r.options.len() + 1,
            Value::Document(c) | Value::Array(c) => c.encoded_size(),
        }
    }

    pub fn as_i32(&self) -> Option<i32> {
        match self {
            Value::Int32(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int64(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Double(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Boolean(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_document(&self) -> Option<&Container> {
        match self {
            Value::Document(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&Container> {
        match self {
            Value::Array(c) => Some(c),
            _ => None,
        }
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Value {
        Value::Int32(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Value {
        Value::Int64(v)
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Value {
        Value::Double(v as f64)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Value {
        Value::Double(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Value {
        Value::Boolean(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Value {
        Value::Str(v.to_owned())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Value {
        Value::Str(v)
    }
}

impl From<Vec<u8>> for Value {
    fn from(v: Vec<u8>) -> Value {
        Value::Binary(Binary::new(v))
    }
}

impl From<u64> for Value {
    fn from(v: u64) -> Value {
        Value::Timestamp(v)
    }
}

impl From<ObjectId> for Value {
    fn from(v: ObjectId) -> Value {
        Value::ObjectId(v)
    }
}

impl From<Binary> for Value {
    fn from(v: Binary) -> Value {
        Value::Binary(v)
    }
}

impl From<Regular> for Value {
    fn from(v: Regular) -> Value {
        Value::Regular(v)
    }
}

impl From<Container> for Value {
    fn from(c: Container) -> Value {
        match c.kind() {
            crate::container::ContainerKind::Document => Value::Document(c),
            crate::container::ContainerKind::Array => Value::Array(c),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_tags_match_wire_values() {
        assert_eq!(Kind::Double.tag(), 0x01);
        assert_eq!(Kind::Str.tag(), 0x02);
        assert_eq!(Kind::Document.tag(), 0x03);
        assert_eq!(Kind::Array.tag(), 0x04);
        assert_eq!(Kind::Binary.tag(), 0x05);
        assert_eq!(Kind::ObjectId.tag(), 0x07);
        assert_eq!(Kind::Boolean.tag(), 0x08);
        assert_eq!(Kind::DateTime.tag(), 0x09);
        assert_eq!(Kind::Null.tag(), 0x0A);
        assert_eq!(Kind::Regular.tag(), 0x0B);
        assert_eq!(Kind::Int32.tag(), 0x10);
        assert_eq!(Kind::Timestamp.tag(), 0x11);
        assert_eq!(Kind::Int64.tag(), 0x12);
        assert_eq!(Kind::MaxKey.tag(), 0x7F);
        assert_eq!(Kind::MinKey.tag(), 0xFF);
        assert_eq!(Kind::Unknown.tag(), 0xEF);
    }

    #[test]
    fn from_tag_rejects_out_of_range_and_sentinel() {
        assert_eq!(Kind::from_tag(0x10), Some(Kind::Int32));
        assert_eq!(Kind::from_tag(0x00), None);
        assert_eq!(Kind::from_tag(0x06), None);
        assert_eq!(Kind::from_tag(0xEF), None);
    }

    #[test]
    fn encoded_sizes_follow_layout_table() {
        assert_eq!(Value::Null.encoded_size(), 0);
        assert_eq!(Value::MinKey.encoded_size(), 0);
        assert_eq!(Value::Boolean(true).encoded_size(), 1);
        assert_eq!(Value::Int32(7).encoded_size(), 4);
        assert_eq!(Value::Int64(7).encoded_size(), 8);
        assert_eq!(Value::Double(1.5).encoded_size(), 8);
        assert_eq!(Value::DateTime(0).encoded_size(), 8);
        assert_eq!(Value::Timestamp(0).encoded_size(), 8);
        assert_eq!(Value::Str("abc".into()).encoded_size(), 4 + 3 + 1);
        assert_eq!(Value::Str(String::new()).encoded_size(), 5);
        assert_eq!(Value::Binary(Binary::new(vec![1, 2, 3])).encoded_size(), 8);
        assert_eq!(Value::Binary(Binary::new(vec![])).encoded_size(), 5);
        assert_eq!(Value::ObjectId(ObjectId::default()).encoded_size(), 12);
        assert_eq!(Value::Regular(Regular::new("^H", "i")).encoded_size(), 2 + 1 + 1 + 1);
    }

    #[test]
    fn object_id_hex_roundtrip() {
        let id = ObjectId::parse_hex("a1b2c3d4e5f66f5e4d3c2b1a").unwrap();
        assert_eq!(
            id.bytes(),
            &[0xA1, 0xB2, 0xC3, 0xD4, 0xE5, 0xF6, 0x6F, 0x5E, 0x4D, 0x3C, 0x2B, 0x1A]
        );
        assert_eq!(id.to_string(), "a1b2c3d4e5f66f5e4d3c2b1a");
    }

    #[test]
    fn object_id_accepts_uppercase_rejects_garbage() {
        let upper = ObjectId::parse_hex("A1B2C3D4E5F66F5E4D3C2B1A").unwrap();
        let lower = ObjectId::parse_hex("a1b2c3d4e5f66f5e4d3c2b1a").unwrap();
        assert_eq!(upper, lower);
        assert!(ObjectId::parse_hex("a1b2").is_none());
        assert!(ObjectId::parse_hex("g1b2c3d4e5f66f5e4d3c2b1a").is_none());
    }

    #[test]
    fn binary_subtype_bytes_roundtrip() {
        for byte in [0x00, 0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x80, 0x42, 0xFE] {
            assert_eq!(BinarySubtype::from_u8(byte).to_u8(), byte);
        }
        assert_eq!(BinarySubtype::from_u8(0x80), BinarySubtype::User);
        assert_eq!(BinarySubtype::from_u8(0x42), BinarySubtype::Other(0x42));
    }

    #[test]
    fn conversions_pick_the_expected_kind() {
        assert_eq!(Value::from(1i32).kind(), Kind::Int32);
        assert_eq!(Value::from(1i64).kind(), Kind::Int64);
        assert_eq!(Value::from(1.5f64).kind(), Kind::Double);
        assert_eq!(Value::from(1.5f32).kind(), Kind::Double);
        assert_eq!(Value::from(true).kind(), Kind::Boolean);
        assert_eq!(Value::from("x").kind(), Kind::Str);
        assert_eq!(Value::from(7u64).kind(), Kind::Timestamp);
        assert_eq!(Value::from(vec![1u8]).kind(), Kind::Binary);
    }
}

//! Extended JSON reader.
//!
//! A streaming tokenizer: ASCII whitespace is skipped between tokens but
//! never inside literals, and a one-character peek at each value position
//! selects the decoder. Objects whose first key begins with `$` dispatch
//! on the exact key name to the matching typed-wrapper reader.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use super::date;
use super::error::EjsonDecodeError;
use crate::container::Container;
use crate::value::{Binary, BinarySubtype, ObjectId, Regular, Value};

/// EJSON decoder. Reads Extended JSON bytes and produces a [`Value`].
pub struct EjsonDecoder {
    data: Vec<u8>,
    x: usize,
}

impl Default for EjsonDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl EjsonDecoder {
    pub fn new() -> Self {
        Self {
            data: Vec::new(),
            x: 0,
        }
    }

    /// Decodes one value from bytes.
    pub fn decode(&mut self, input: &[u8]) -> Result<Value, EjsonDecodeError> {
        self.data = input.to_vec();
        self.x = 0;
        self.read_value()
    }

    /// Convenience: decode from a UTF-8 string.
    pub fn decode_str(&mut self, s: &str) -> Result<Value, EjsonDecodeError> {
        self.decode(s.as_bytes())
    }

    // ----------------------------------------------------------------
    // Tokenizer primitives

    fn skip_ws(&mut self) {
        while self.x < self.data.len() {
            match self.data[self.x] {
                b' ' | b'\t' | b'\n' | b'\r' => self.x += 1,
                _ => break,
            }
        }
    }

    /// Skips whitespace and returns the next byte without consuming it.
    fn peek(&mut self) -> Result<u8, EjsonDecodeError> {
        self.skip_ws();
        self.data
            .get(self.x)
            .copied()
            .ok_or(EjsonDecodeError::UnexpectedEof)
    }

    /// Skips whitespace, then consumes exactly `want`.
    fn expect(&mut self, want: u8) -> Result<(), EjsonDecodeError> {
        if self.peek()? != want {
            return Err(EjsonDecodeError::UnexpectedChar(self.x));
        }
        self.x += 1;
        Ok(())
    }

    /// Consumes an exact literal with no interior whitespace.
    fn expect_literal(&mut self, literal: &[u8]) -> Result<(), EjsonDecodeError> {
        if self.x + literal.len() > self.data.len()
            || &self.data[self.x..self.x + literal.len()] != literal
        {
            return Err(EjsonDecodeError::UnexpectedChar(self.x));
        }
        self.x += literal.len();
        Ok(())
    }

    // ----------------------------------------------------------------
    // Value dispatch

    fn read_value(&mut self) -> Result<Value, EjsonDecodeError> {
        match self.peek()? {
            b'"' => {
                let s = self.read_string()?;
                // A bare string may be the textual rendering of a
                // non-finite double.
                Ok(match s.as_str() {
                    "NaN" => Value::Double(f64::NAN),
                    "Infinity" => Value::Double(f64::INFINITY),
                    "-Infinity" => Value::Double(f64::NEG_INFINITY),
                    _ => Value::Str(s),
                })
            }
            b'{' => self.read_object(),
            b'[' => self.read_array(),
            b'n' => {
                self.expect_literal(b"null")?;
                Ok(Value::Null)
            }
            b't' => {
                self.expect_literal(b"true")?;
                Ok(Value::Boolean(true))
            }
            b'f' => {
                self.expect_literal(b"false")?;
                Ok(Value::Boolean(false))
            }
            b'-' | b'.' | b'0'..=b'9' => self.read_number(),
            _ => Err(EjsonDecodeError::UnexpectedChar(self.x)),
        }
    }

    // ----------------------------------------------------------------
    // Strings

    fn read_string(&mut self) -> Result<String, EjsonDecodeError> {
        if self.peek()? != b'"' {
            return Err(EjsonDecodeError::UnexpectedChar(self.x));
        }
        self.x += 1;
        let start = self.x;
        let end = self.find_end_quote(start)?;
        let s = decode_json_string(&self.data[start..end])?;
        self.x = end + 1; // skip closing quote
        Ok(s)
    }

    fn find_end_quote(&self, start: usize) -> Result<usize, EjsonDecodeError> {
        let mut i = start;
        while i < self.data.len() {
            match self.data[i] {
                b'\\' => i += 2, // skip escaped char
                b'"' => return Ok(i),
                _ => i += 1,
            }
        }
        Err(EjsonDecodeError::UnterminatedString)
    }

    // ----------------------------------------------------------------
    // Numbers

    /// Numeric triage: the longest run of `[0-9.\-]`, then a double if it
    /// contains `.`, otherwise the smallest signed integer width that
    /// holds it (int32 preferred over int64).
    fn read_number(&mut self) -> Result<Value, EjsonDecodeError> {
        let start = self.x;
        while self.x < self.data.len()
            && matches!(self.data[self.x], b'0'..=b'9' | b'.' | b'-')
        {
            self.x += 1;
        }
        if self.x == start {
            return Err(EjsonDecodeError::UnexpectedChar(start));
        }
        let s = std::str::from_utf8(&self.data[start..self.x])
            .map_err(|_| EjsonDecodeError::InvalidUtf8)?;
        if s.contains('.') {
            let v: f64 = s.parse().map_err(|_| EjsonDecodeError::InvalidNumber)?;
            Ok(Value::Double(v))
        } else {
            let n: i64 = s.parse().map_err(|_| EjsonDecodeError::InvalidNumber)?;
            if n >= i32::MIN as i64 && n <= i32::MAX as i64 {
                Ok(Value::Int32(n as i32))
            } else {
                Ok(Value::Int64(n))
            }
        }
    }

    /// An unsigned decimal digit run.
    fn read_u64(&mut self) -> Result<u64, EjsonDecodeError> {
        self.skip_ws();
        let start = self.x;
        while self.x < self.data.len() && self.data[self.x].is_ascii_digit() {
            self.x += 1;
        }
        if self.x == start {
            return Err(EjsonDecodeError::UnexpectedChar(start));
        }
        std::str::from_utf8(&self.data[start..self.x])
            .map_err(|_| EjsonDecodeError::InvalidUtf8)?
            .parse()
            .map_err(|_| EjsonDecodeError::InvalidNumber)
    }

    // ----------------------------------------------------------------
    // Containers and wrapper dispatch

    fn read_array(&mut self) -> Result<Value, EjsonDecodeError> {
        self.expect(b'[')?;
        let mut arr = Container::array();
        if self.peek()? == b']' {
            self.x += 1;
            return Ok(Value::Array(arr));
        }
        loop {
            let value = self.read_value()?;
            let key = arr.len().to_string();
            arr.push_node(key, value);
            match self.peek()? {
                b']' => {
                    self.x += 1;
                    return Ok(Value::Array(arr));
                }
                b',' => self.x += 1,
                _ => return Err(EjsonDecodeError::UnexpectedChar(self.x)),
            }
        }
    }

    /// At `{`: reads the first key, and either routes to a typed-wrapper
    /// reader (key begins with `$`) or parses a plain document.
    fn read_object(&mut self) -> Result<Value, EjsonDecodeError> {
        self.expect(b'{')?;
        if self.peek()? == b'}' {
            self.x += 1;
            return Ok(Value::Document(Container::document()));
        }
        let key = self.read_string()?;
        self.expect(b':')?;
        if key.starts_with('$') {
            let value = self.read_wrapper(&key)?;
            self.expect(b'}')?;
            return Ok(value);
        }

        let mut doc = Container::document();
        let value = self.read_value()?;
        doc.push_node(key, value);
        loop {
            match self.peek()? {
                b'}' => {
                    self.x += 1;
                    return Ok(Value::Document(doc));
                }
                b',' => {
                    self.x += 1;
                    let key = self.read_string()?;
                    self.expect(b':')?;
                    let value = self.read_value()?;
                    doc.push_node(key, value);
                }
                _ => return Err(EjsonDecodeError::UnexpectedChar(self.x)),
            }
        }
    }

    /// Dispatches on the exact wrapper key; the cursor sits just past the
    /// `:` after the key, and each arm consumes exactly the wrapper body
    /// (the caller consumes the enclosing `}`).
    fn read_wrapper(&mut self, key: &str) -> Result<Value, EjsonDecodeError> {
        match key {
            "$oid" => self.read_oid_body(),
            "$date" => self.read_date_body(),
            "$numberDouble" => self.read_number_double_body(),
            "$minKey" => {
                self.expect(b'1')?;
                Ok(Value::MinKey)
            }
            "$maxKey" => {
                self.expect(b'1')?;
                Ok(Value::MaxKey)
            }
            "$timestamp" => self.read_timestamp_body(),
            "$binary" => self.read_binary_body(),
            "$regularExpression" => self.read_regular_body(),
            _ => Err(EjsonDecodeError::UnknownWrapper(key.to_owned())),
        }
    }

    fn read_oid_body(&mut self) -> Result<Value, EjsonDecodeError> {
        let hex = self.read_string()?;
        let id = ObjectId::parse_hex(&hex).ok_or(EjsonDecodeError::InvalidObjectId)?;
        Ok(Value::ObjectId(id))
    }

    fn read_date_body(&mut self) -> Result<Value, EjsonDecodeError> {
        let iso = self.read_string()?;
        let ms = date::from_iso_str(&iso).ok_or(EjsonDecodeError::InvalidDate)?;
        Ok(Value::DateTime(ms))
    }

    /// `$numberDouble` is recognised on input only. The body is either a
    /// quoted string (`"NaN"`, `"Infinity"`, `"-Infinity"`, or a decimal)
    /// or a bare numeric literal.
    fn read_number_double_body(&mut self) -> Result<Value, EjsonDecodeError> {
        if self.peek()? == b'"' {
            let s = self.read_string()?;
            let v = match s.as_str() {
                "NaN" => f64::NAN,
                "Infinity" => f64::INFINITY,
                "-Infinity" => f64::NEG_INFINITY,
                other => other.parse().map_err(|_| EjsonDecodeError::InvalidDouble)?,
            };
            return Ok(Value::Double(v));
        }
        match self.read_number()? {
            Value::Double(v) => Ok(Value::Double(v)),
            Value::Int32(v) => Ok(Value::Double(v as f64)),
            Value::Int64(v) => Ok(Value::Double(v as f64)),
            _ => Err(EjsonDecodeError::InvalidDouble),
        }
    }

    fn read_timestamp_body(&mut self) -> Result<Value, EjsonDecodeError> {
        self.expect(b'{')?;
        if self.read_string()? != "t" {
            return Err(EjsonDecodeError::InvalidTimestamp);
        }
        self.expect(b':')?;
        let t = self.read_u64()?;
        self.expect(b',')?;
        if self.read_string()? != "i" {
            return Err(EjsonDecodeError::InvalidTimestamp);
        }
        self.expect(b':')?;
        self.read_u64()?; // the increment field is ignored
        self.expect(b'}')?;
        Ok(Value::Timestamp(t))
    }

    fn read_binary_body(&mut self) -> Result<Value, EjsonDecodeError> {
        self.expect(b'{')?;
        if self.read_string()? != "base64" {
            return Err(EjsonDecodeError::InvalidBinary);
        }
        self.expect(b':')?;
        let b64 = self.read_string()?;
        self.expect(b',')?;
        if self.read_string()? != "subType" {
            return Err(EjsonDecodeError::InvalidBinary);
        }
        self.expect(b':')?;
        let sub = self.read_string()?;
        self.expect(b'}')?;
        let data = STANDARD
            .decode(b64.as_bytes())
            .map_err(|_| EjsonDecodeError::InvalidBinary)?;
        let subtype = u8::from_str_radix(&sub, 16).map_err(|_| EjsonDecodeError::InvalidBinary)?;
        Ok(Value::Binary(Binary {
            subtype: BinarySubtype::from_u8(subtype),
            data,
        }))
    }

    fn read_regular_body(&mut self) -> Result<Value, EjsonDecodeError> {
        self.expect(b'{')?;
        if self.read_string()? != "pattern" {
            return Err(EjsonDecodeError::InvalidRegularExpression);
        }
        self.expect(b':')?;
        let pattern = self.read_string()?;
        self.expect(b',')?;
        if self.read_string()? != "options" {
            return Err(EjsonDecodeError::InvalidRegularExpression);
        }
        self.expect(b':')?;
        let options = self.read_string()?;
        self.expect(b'}')?;
        Ok(Value::Regular(Regular { pattern, options }))
    }
}

/// Decodes a JSON string body (the bytes between quotes), resolving escape
/// sequences.
fn decode_json_string(bytes: &[u8]) -> Result<String, EjsonDecodeError> {
    if !bytes.contains(&b'\\') {
        return std::str::from_utf8(bytes)
            .map(|s| s.to_string())
            .map_err(|_| EjsonDecodeError::InvalidUtf8);
    }
    // Re-quote and let serde_json handle the escapes.
    let mut quoted = Vec::with_capacity(bytes.len() + 2);
    quoted.push(b'"');
    quoted.extend_from_slice(bytes);
    quoted.push(b'"');
    serde_json::from_slice(&quoted).map_err(|_| EjsonDecodeError::UnexpectedChar(0))
}

//! Ordered key/value container shared by the document and array kinds.

use std::fmt;
use std::ops::{Index, IndexMut};

use thiserror::Error;

use crate::bson::{BsonDecoder, BsonEncoder, BsonError};
use crate::ejson::{EjsonDecodeError, EjsonDecoder, EjsonEncodeError, EjsonEncoder};
use crate::value::Value;

/// Key policy of a container: documents keep caller keys, arrays keep the
/// decimal form of each element's position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContainerKind {
    Document,
    Array,
}

impl fmt::Display for ContainerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContainerKind::Document => f.write_str("document"),
            ContainerKind::Array => f.write_str("array"),
        }
    }
}

/// Errors raised by container access and mutation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ContainerError {
    #[error("key not found: {0:?}")]
    MissingKey(String),
    #[error("{op} requires a {required} container")]
    Shape {
        op: &'static str,
        required: ContainerKind,
    },
}

/// An ordered sequence of `(key, value)` pairs.
///
/// Both the document and array kinds use this storage; only the key policy
/// differs. Insertion order is preserved and observable through iteration
/// and both codecs. Keys must not contain NUL bytes (the binary framing
/// uses NUL as the key terminator).
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Container {
    kind: ContainerKind,
    nodes: Vec<(String, Value)>,
}

impl Default for ContainerKind {
    fn default() -> Self {
        ContainerKind::Document
    }
}

impl Container {
    /// An empty document.
    pub fn document() -> Container {
        Container {
            kind: ContainerKind::Document,
            nodes: Vec::new(),
        }
    }

    /// An empty array.
    pub fn array() -> Container {
        Container {
            kind: ContainerKind::Array,
            nodes: Vec::new(),
        }
    }

    /// Builds a document from a pair list. Pairs are appended in order and
    /// duplicate keys are kept as-is.
    pub fn document_from<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Container
    where
        K: Into<String>,
        V: Into<Value>,
    {
        let mut doc = Container::document();
        for (key, value) in pairs {
            doc.nodes.push((key.into(), value.into()));
        }
        doc
    }

    /// Builds an array from a value list, keys assigned positionally.
    pub fn array_from<V>(values: impl IntoIterator<Item = V>) -> Container
    where
        V: Into<Value>,
    {
        let mut arr = Container::array();
        for value in values {
            let key = arr.nodes.len().to_string();
            arr.nodes.push((key, value.into()));
        }
        arr
    }

    pub fn kind(&self) -> ContainerKind {
        self.kind
    }

    pub fn is_document(&self) -> bool {
        self.kind == ContainerKind::Document
    }

    pub fn is_array(&self) -> bool {
        self.kind == ContainerKind::Array
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Upserts by key: replaces the first matching pair in place, appends
    /// otherwise. Documents only.
    pub fn insert(
        &mut self,
        key: impl Into<String>,
        value: impl Into<Value>,
    ) -> Result<(), ContainerError> {
        if self.kind != ContainerKind::Document {
            return Err(ContainerError::Shape {
                op: "insert",
                required: ContainerKind::Document,
            });
        }
        let key = key.into();
        let value = value.into();
        match self.position(&key) {
            Some(i) => self.nodes[i].1 = value,
            None => self.nodes.push((key, value)),
        }
        Ok(())
    }

    /// Appends one element with key set to the decimal of its position.
    /// Arrays only.
    pub fn push(&mut self, value: impl Into<Value>) -> Result<(), ContainerError> {
        if self.kind != ContainerKind::Array {
            return Err(ContainerError::Shape {
                op: "push",
                required: ContainerKind::Array,
            });
        }
        let key = self.nodes.len().to_string();
        self.nodes.push((key, value.into()));
        Ok(())
    }

    /// Appends a pair to a document; equivalent to [`Container::insert`].
    pub fn push_pair(
        &mut self,
        key: impl Into<String>,
        value: impl Into<Value>,
    ) -> Result<(), ContainerError> {
        if self.kind != ContainerKind::Document {
            return Err(ContainerError::Shape {
                op: "push_pair",
                required: ContainerKind::Document,
            });
        }
        self.insert(key, value)
    }

    /// First value under `key`, if any. Duplicate keys resolve to the first
    /// occurrence.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.nodes
            .iter()
            .find(|(k, _)| k.as_str() == key)
            .map(|(_, v)| v)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut Value> {
        self.nodes
            .iter_mut()
            .find(|(k, _)| k.as_str() == key)
            .map(|(_, v)| v)
    }

    /// Keyed read that reports an absent key as an error.
    pub fn fetch(&self, key: &str) -> Result<&Value, ContainerError> {
        self.get(key)
            .ok_or_else(|| ContainerError::MissingKey(key.to_owned()))
    }

    /// Mutable keyed access with auto-vivification: an absent key appends an
    /// [`Value::Empty`] placeholder and returns a reference to it. Documents
    /// only.
    pub fn entry(&mut self, key: &str) -> Result<&mut Value, ContainerError> {
        if self.kind != ContainerKind::Document {
            return Err(ContainerError::Shape {
                op: "entry",
                required: ContainerKind::Document,
            });
        }
        if let Some(i) = self.position(key) {
            return Ok(&mut self.nodes[i].1);
        }
        let end = self.nodes.len();
        self.nodes.push((key.to_owned(), Value::Empty));
        Ok(&mut self.nodes[end].1)
    }

    /// Value of the `i`-th pair.
    pub fn at(&self, index: usize) -> Option<&Value> {
        self.nodes.get(index).map(|(_, v)| v)
    }

    pub fn at_mut(&mut self, index: usize) -> Option<&mut Value> {
        self.nodes.get_mut(index).map(|(_, v)| v)
    }

    /// Key of the `i`-th pair.
    pub fn key_at(&self, index: usize) -> Option<&str> {
        self.nodes.get(index).map(|(k, _)| k.as_str())
    }

    /// Position of the first pair under `key`.
    pub fn position(&self, key: &str) -> Option<usize> {
        self.nodes.iter().position(|(k, _)| k.as_str() == key)
    }

    /// Removes the `i`-th pair and returns it. In arrays every subsequent
    /// key is rewritten to its new decimal index.
    pub fn remove(&mut self, index: usize) -> Option<(String, Value)> {
        if index >= self.nodes.len() {
            return None;
        }
        let pair = self.nodes.remove(index);
        if self.kind == ContainerKind::Array {
            for (i, node) in self.nodes.iter_mut().enumerate().skip(index) {
                node.0 = i.to_string();
            }
        }
        Some(pair)
    }

    /// Pairs in insertion order.
    pub fn iter(&self) -> std::slice::Iter<'_, (String, Value)> {
        self.nodes.iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, (String, Value)> {
        self.nodes.iter_mut()
    }

    /// Appends a pair without applying any key policy. Used by the decoders,
    /// which must preserve the stream's keys and duplicates exactly.
    pub(crate) fn push_node(&mut self, key: String, value: Value) {
        self.nodes.push((key, value));
    }

    /// Size in bytes of this container's binary encoding: length prefix,
    /// per-pair framing, payloads, and the trailing NUL.
    pub fn encoded_size(&self) -> usize {
        let mut size = 4;
        for (key, value) in &self.nodes {
            size += 1 + key.len() + 1 + value.encoded_size();
        }
        size + 1
    }

    /// Encodes this container to BSON bytes.
    pub fn to_bson(&self) -> Result<Vec<u8>, BsonError> {
        BsonEncoder::new().encode(self)
    }

    /// Decodes one top-level document from BSON bytes.
    pub fn from_bson(data: &[u8]) -> Result<Container, BsonError> {
        BsonDecoder::new().decode(data)
    }

    /// Renders this container as Extended JSON text.
    pub fn to_ejson(&self) -> Result<String, EjsonEncodeError> {
        let bytes = EjsonEncoder::new().encode_container(self)?;
        Ok(String::from_utf8(bytes).unwrap_or_default())
    }

    /// Parses Extended JSON text whose top level is a document or array.
    pub fn from_ejson(text: &str) -> Result<Container, EjsonDecodeError> {
        match EjsonDecoder::new().decode_str(text)? {
            Value::Document(c) | Value::Array(c) => Ok(c),
            _ => Err(EjsonDecodeError::UnexpectedChar(0)),
        }
    }
}

impl Index<usize> for Container {
    type Output = Value;

    fn index(&self, index: usize) -> &Value {
        &self.nodes[index].1
    }
}

impl IndexMut<usize> for Container {
    fn index_mut(&mut self, index: usize) -> &mut Value {
        &mut self.nodes[index].1
    }
}

impl Index<&str> for Container {
    type Output = Value;

    fn index(&self, key: &str) -> &Value {
        self.get(key)
            .unwrap_or_else(|| panic!("key not found: {key:?}"))
    }
}

impl<'a> IntoIterator for &'a Container {
    type Item = &'a (String, Value);
    type IntoIter = std::slice::Iter<'a, (String, Value)>;

    fn into_iter(self) -> Self::IntoIter {
        self.nodes.iter()
    }
}

impl<'a> IntoIterator for &'a mut Container {
    type Item = &'a mut (String, Value);
    type IntoIter = std::slice::IterMut<'a, (String, Value)>;

    fn into_iter(self) -> Self::IntoIter {
        self.nodes.iter_mut()
    }
}

impl IntoIterator for Container {
    type Item = (String, Value);
    type IntoIter = std::vec::IntoIter<(String, Value)>;

    fn into_iter(self) -> Self::IntoIter {
        self.nodes.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_upserts_in_place() {
        let mut doc = Container::document();
        doc.insert("a", 1i32).unwrap();
        doc.insert("b", 2i32).unwrap();
        doc.insert("a", 3i32).unwrap();
        assert_eq!(doc.len(), 2);
        assert_eq!(doc.key_at(0), Some("a"));
        assert_eq!(doc.get("a"), Some(&Value::Int32(3)));
    }

    #[test]
    fn push_assigns_decimal_keys() {
        let mut arr = Container::array();
        arr.push(Value::Null).unwrap();
        arr.push(1i32).unwrap();
        arr.push("x").unwrap();
        assert_eq!(arr.key_at(0), Some("0"));
        assert_eq!(arr.key_at(1), Some("1"));
        assert_eq!(arr.key_at(2), Some("2"));
    }

    #[test]
    fn remove_renumbers_array_tail() {
        let mut arr = Container::array_from([10i32, 20, 30, 40]);
        let removed = arr.remove(1).unwrap();
        assert_eq!(removed.1, Value::Int32(20));
        let keys: Vec<&str> = (0..arr.len()).map(|i| arr.key_at(i).unwrap()).collect();
        assert_eq!(keys, ["0", "1", "2"]);
        assert_eq!(arr[1], Value::Int32(30));
    }

    #[test]
    fn remove_keeps_document_keys() {
        let mut doc = Container::document_from([("x", 1i32), ("y", 2), ("z", 3)]);
        doc.remove(0).unwrap();
        assert_eq!(doc.key_at(0), Some("y"));
        assert_eq!(doc.key_at(1), Some("z"));
    }

    #[test]
    fn entry_vivifies_missing_key_with_empty() {
        let mut doc = Container::document();
        {
            let slot = doc.entry("k").unwrap();
            assert_eq!(*slot, Value::Empty);
            *slot = Value::Boolean(true);
        }
        assert_eq!(doc.get("k"), Some(&Value::Boolean(true)));
        // Existing keys resolve to the same slot.
        *doc.entry("k").unwrap() = Value::Int32(9);
        assert_eq!(doc.len(), 1);
    }

    #[test]
    fn fetch_reports_missing_key() {
        let doc = Container::document_from([("a", 1i32)]);
        assert_eq!(doc.fetch("a"), Ok(&Value::Int32(1)));
        assert_eq!(
            doc.fetch("nope"),
            Err(ContainerError::MissingKey("nope".into()))
        );
    }

    #[test]
    fn shape_misuse_is_an_error() {
        let mut arr = Container::array();
        assert!(matches!(
            arr.insert("k", 1i32),
            Err(ContainerError::Shape { .. })
        ));
        assert!(matches!(arr.entry("k"), Err(ContainerError::Shape { .. })));
        let mut doc = Container::document();
        assert!(matches!(doc.push(1i32), Err(ContainerError::Shape { .. })));
    }

    #[test]
    fn duplicate_keys_survive_pair_list_construction() {
        let doc = Container::document_from([("k", 1i32), ("k", 2i32)]);
        assert_eq!(doc.len(), 2);
        // Keyed read sees the first occurrence.
        assert_eq!(doc.get("k"), Some(&Value::Int32(1)));
    }

    #[test]
    fn iteration_preserves_insertion_order() {
        let mut doc = Container::document();
        for key in ["z", "a", "m"] {
            doc.insert(key, key).unwrap();
        }
        let keys: Vec<&str> = doc.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, ["z", "a", "m"]);
    }
}

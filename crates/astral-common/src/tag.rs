//! Structured key-value documents used for persistence.
//!
//! A [`CompoundTag`] is an ordered map from string keys to typed
//! [`TagValue`]s. The host game stores these documents next to its own save
//! data; this crate can also encode them as a versioned binary blob or as JSON.
//!
//! # Example
//!
//! ```
//! use astral_common::tag::CompoundTag;
//!
//! let mut tag = CompoundTag::new();
//! tag.set_int("elapsed_ticks", 40);
//! tag.set_long("task_most", -7);
//!
//! assert_eq!(tag.get_int("elapsed_ticks").ok(), Some(40));
//! assert!(tag.get_int("task_most").is_err());
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::error::{TagError, TagResult};
use crate::version::{MagicBytes, SchemaVersion};

/// Header length: magic bytes followed by the schema version.
const HEADER_LEN: usize = 10;

/// A single typed value inside a tag document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TagValue {
    /// 32-bit signed integer.
    Int(i32),
    /// 64-bit signed integer.
    Long(i64),
    /// UTF-8 string.
    String(String),
    /// Ordered list of values.
    List(Vec<TagValue>),
    /// Nested document.
    Compound(CompoundTag),
}

impl TagValue {
    /// Name of the value kind, for diagnostics.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Int(_) => "int",
            Self::Long(_) => "long",
            Self::String(_) => "string",
            Self::List(_) => "list",
            Self::Compound(_) => "compound",
        }
    }
}

/// Ordered key-value document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompoundTag {
    entries: BTreeMap<String, TagValue>,
}

impl CompoundTag {
    /// Creates an empty document.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the document has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether an entry exists for `key`.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Iterates over keys in order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Inserts a raw value, replacing any previous entry.
    pub fn set(&mut self, key: impl Into<String>, value: TagValue) {
        self.entries.insert(key.into(), value);
    }

    /// Stores a 32-bit integer.
    pub fn set_int(&mut self, key: impl Into<String>, value: i32) {
        self.set(key, TagValue::Int(value));
    }

    /// Stores an unsigned 32-bit value. Kept as a long so the full range
    /// survives.
    pub fn set_u32(&mut self, key: impl Into<String>, value: u32) {
        self.set(key, TagValue::Long(i64::from(value)));
    }

    /// Stores a 64-bit integer.
    pub fn set_long(&mut self, key: impl Into<String>, value: i64) {
        self.set(key, TagValue::Long(value));
    }

    /// Stores a string.
    pub fn set_string(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.set(key, TagValue::String(value.into()));
    }

    /// Stores a list.
    pub fn set_list(&mut self, key: impl Into<String>, value: Vec<TagValue>) {
        self.set(key, TagValue::List(value));
    }

    /// Stores a nested document.
    pub fn set_compound(&mut self, key: impl Into<String>, value: CompoundTag) {
        self.set(key, TagValue::Compound(value));
    }

    /// Removes and returns an entry.
    pub fn remove(&mut self, key: &str) -> Option<TagValue> {
        self.entries.remove(key)
    }

    /// Raw entry access.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&TagValue> {
        self.entries.get(key)
    }

    fn require(&self, key: &str) -> TagResult<&TagValue> {
        self.entries
            .get(key)
            .ok_or_else(|| TagError::Missing(key.to_string()))
    }

    fn wrong_type(key: &str, expected: &'static str, found: &TagValue) -> TagError {
        TagError::WrongType {
            key: key.to_string(),
            expected,
            found: found.kind(),
        }
    }

    /// Reads a 32-bit integer.
    pub fn get_int(&self, key: &str) -> TagResult<i32> {
        match self.require(key)? {
            TagValue::Int(v) => Ok(*v),
            other => Err(Self::wrong_type(key, "int", other)),
        }
    }

    /// Reads an unsigned 32-bit value stored as an int or a long.
    pub fn get_u32(&self, key: &str) -> TagResult<u32> {
        let value = match self.require(key)? {
            TagValue::Int(v) => i64::from(*v),
            TagValue::Long(v) => *v,
            other => return Err(Self::wrong_type(key, "int", other)),
        };
        u32::try_from(value).map_err(|_| TagError::OutOfRange {
            key: key.to_string(),
            value,
        })
    }

    /// Reads a 64-bit integer.
    pub fn get_long(&self, key: &str) -> TagResult<i64> {
        match self.require(key)? {
            TagValue::Long(v) => Ok(*v),
            other => Err(Self::wrong_type(key, "long", other)),
        }
    }

    /// Reads a string.
    pub fn get_string(&self, key: &str) -> TagResult<&str> {
        match self.require(key)? {
            TagValue::String(v) => Ok(v),
            other => Err(Self::wrong_type(key, "string", other)),
        }
    }

    /// Reads a list.
    pub fn get_list(&self, key: &str) -> TagResult<&[TagValue]> {
        match self.require(key)? {
            TagValue::List(v) => Ok(v),
            other => Err(Self::wrong_type(key, "list", other)),
        }
    }

    /// Reads a nested document.
    pub fn get_compound(&self, key: &str) -> TagResult<&CompoundTag> {
        match self.require(key)? {
            TagValue::Compound(v) => Ok(v),
            other => Err(Self::wrong_type(key, "compound", other)),
        }
    }

    /// Encodes the document as a versioned binary blob.
    pub fn to_bytes(&self) -> TagResult<Vec<u8>> {
        let body = bincode::serialize(self).map_err(|e| TagError::Encoding(e.to_string()))?;
        let mut bytes = Vec::with_capacity(HEADER_LEN + body.len());
        bytes.extend_from_slice(&MagicBytes::TAG.0);
        bytes.extend_from_slice(&SchemaVersion::TAG_DOCUMENT.to_bytes());
        bytes.extend_from_slice(&body);
        trace!("Encoded tag document: {} entries, {} bytes", self.len(), bytes.len());
        Ok(bytes)
    }

    /// Decodes a blob produced by [`CompoundTag::to_bytes`].
    pub fn from_bytes(bytes: &[u8]) -> TagResult<Self> {
        if bytes.len() < HEADER_LEN || bytes[0..4] != MagicBytes::TAG.0 {
            return Err(TagError::InvalidFormat);
        }

        let mut version = [0u8; 6];
        version.copy_from_slice(&bytes[4..HEADER_LEN]);
        let version = SchemaVersion::from_bytes(version);
        if !SchemaVersion::TAG_DOCUMENT.can_read(&version) {
            return Err(TagError::VersionMismatch {
                expected: SchemaVersion::TAG_DOCUMENT.to_string(),
                actual: version.to_string(),
            });
        }

        bincode::deserialize(&bytes[HEADER_LEN..]).map_err(|e| TagError::Encoding(e.to_string()))
    }

    /// Encodes the document as JSON.
    pub fn to_json(&self) -> TagResult<String> {
        serde_json::to_string(self).map_err(|e| TagError::Encoding(e.to_string()))
    }

    /// Decodes a JSON document.
    pub fn from_json(json: &str) -> TagResult<Self> {
        serde_json::from_str(json).map_err(|e| TagError::Encoding(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> CompoundTag {
        let mut inner = CompoundTag::new();
        inner.set_string("name", "altar");

        let mut tag = CompoundTag::new();
        tag.set_int("ticks", 12);
        tag.set_long("most", i64::MIN);
        tag.set_list("slots", vec![TagValue::Int(1), TagValue::Int(2)]);
        tag.set_compound("inner", inner);
        tag
    }

    #[test]
    fn test_typed_access() {
        let tag = sample();
        assert_eq!(tag.get_int("ticks").ok(), Some(12));
        assert_eq!(tag.get_long("most").ok(), Some(i64::MIN));
        assert_eq!(tag.get_list("slots").map(<[TagValue]>::len).ok(), Some(2));
        assert_eq!(
            tag.get_compound("inner")
                .and_then(|c| c.get_string("name").map(str::to_string))
                .ok(),
            Some("altar".to_string())
        );
    }

    #[test]
    fn test_missing_and_wrong_type() {
        let tag = sample();
        assert!(matches!(tag.get_int("nope"), Err(TagError::Missing(_))));
        assert!(matches!(
            tag.get_int("most"),
            Err(TagError::WrongType {
                expected: "int",
                found: "long",
                ..
            })
        ));
    }

    #[test]
    fn test_negative_u32_rejected() {
        let mut tag = CompoundTag::new();
        tag.set_int("count", -3);
        assert!(matches!(tag.get_u32("count"), Err(TagError::OutOfRange { value: -3, .. })));
    }

    #[test]
    fn test_u32_full_range() {
        let mut tag = CompoundTag::new();
        tag.set_u32("capacity", u32::MAX);
        tag.set_u32("ticks", 3_000_000_000);
        tag.set_int("legacy", 40);
        tag.set_long("huge", i64::from(u32::MAX) + 1);

        let tag = CompoundTag::from_bytes(&tag.to_bytes().expect("encode")).expect("decode");
        assert_eq!(tag.get_u32("capacity").ok(), Some(u32::MAX));
        assert_eq!(tag.get_u32("ticks").ok(), Some(3_000_000_000));
        assert_eq!(tag.get_u32("legacy").ok(), Some(40));
        assert!(matches!(
            tag.get_u32("huge"),
            Err(TagError::OutOfRange { value: 4_294_967_296, .. })
        ));
    }

    #[test]
    fn test_binary_encoding() {
        let tag = sample();
        let bytes = tag.to_bytes().expect("encode");
        assert_eq!(&bytes[0..4], b"ASTG");
        assert_eq!(CompoundTag::from_bytes(&bytes).expect("decode"), tag);
    }

    #[test]
    fn test_binary_rejects_bad_header() {
        assert!(matches!(
            CompoundTag::from_bytes(b"NOPE000000"),
            Err(TagError::InvalidFormat)
        ));

        let mut bytes = sample().to_bytes().expect("encode");
        bytes[4] = 9;
        assert!(matches!(
            CompoundTag::from_bytes(&bytes),
            Err(TagError::VersionMismatch { .. })
        ));
    }

    #[test]
    fn test_json_encoding() {
        let tag = sample();
        let json = tag.to_json().expect("json");
        assert_eq!(CompoundTag::from_json(&json).expect("parse"), tag);
        assert!(CompoundTag::from_json("{not json").is_err());
    }
}

use super::ValidationError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::marker::PhantomData;
use uuid::Uuid;

/// Strong typing for IDs with phantom types
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Id<T> {
    value: String,
    _phantom: PhantomData<T>,
}

/// Marker types for different ID kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BlockMarker;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AccordionItemMarker;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RecordMarker;

/// Type aliases for specific ID types
pub type BlockId = Id<BlockMarker>;
pub type AccordionItemId = Id<AccordionItemMarker>;
/// Identifier the backend assigns to a saved article or news record.
pub type RecordId = Id<RecordMarker>;

impl<T> Id<T> {
    /// Accepts any non-blank identifier; ids are opaque outside this crate.
    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::InvalidId("identifier is empty".to_string()));
        }
        if trimmed.chars().any(char::is_whitespace) {
            return Err(ValidationError::InvalidId(format!(
                "identifier contains whitespace: {:?}",
                trimmed
            )));
        }
        Ok(Self::from_normalized(trimmed.to_string()))
    }

    /// Create an ID from a string known to be valid (internal use)
    pub(crate) fn from_normalized(value: String) -> Self {
        Self {
            value,
            _phantom: PhantomData,
        }
    }

    /// Create a fresh random ID. Generated ids are never reused.
    pub fn generate() -> Self {
        let uuid = Uuid::new_v4();
        Self::from_normalized(uuid.as_simple().to_string())
    }

    /// Get the ID as a string reference
    pub fn as_str(&self) -> &str {
        &self.value
    }
}

impl<T> fmt::Display for Id<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value)
    }
}

impl<T> Serialize for Id<T> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        self.value.serialize(serializer)
    }
}

impl<'de, T> Deserialize<'de> for Id<T> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        // Stored documents carry numeric-looking and legacy ids; accept any
        // non-empty string and mint a new id for blank ones.
        let value = String::deserialize(deserializer)?;
        if value.trim().is_empty() {
            Ok(Self::generate())
        } else {
            Ok(Self::from_normalized(value))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_ids_are_unique() {
        let a = BlockId::generate();
        let b = BlockId::generate();
        assert_ne!(a, b);
        assert_eq!(a.as_str().len(), 32);
    }

    #[test]
    fn parse_rejects_blank_and_whitespace() {
        assert!(BlockId::parse("").is_err());
        assert!(BlockId::parse("   ").is_err());
        assert!(BlockId::parse("a b").is_err());
        assert_eq!(BlockId::parse(" 1712 ").unwrap().as_str(), "1712");
    }

    #[test]
    fn blank_ids_are_replaced_on_deserialize() {
        let id: BlockId = serde_json::from_str("\"\"").unwrap();
        assert!(!id.as_str().is_empty());
        let id: BlockId = serde_json::from_str("\"block-1\"").unwrap();
        assert_eq!(id.as_str(), "block-1");
    }
}

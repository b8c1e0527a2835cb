//! Identity types for records and wallet addresses

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Unique identifier for a collection or mint record
///
/// Generated ids take the form `<unix-millis>-<suffix>`, so lexical order
/// roughly follows creation order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(pub String);

impl RecordId {
    /// Wrap an existing id
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generate a fresh id stamped with the current time
    pub fn generate() -> Self {
        let millis = chrono::Utc::now().timestamp_millis();
        let suffix = uuid::Uuid::new_v4().simple().to_string();
        Self(format!("{}-{}", millis, &suffix[..9]))
    }

    /// Get the ID as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for RecordId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for RecordId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// A wallet or contract address in canonical form
///
/// Wallet connectors hand out EIP-55 checksummed (mixed-case) addresses
/// while other sources use lowercase. Every `Address` is trimmed and
/// lowercased on construction, including when deserialized, so both
/// spellings index and compare as the same value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct Address(String);

impl Address {
    /// Create a canonical address
    pub fn new(raw: impl AsRef<str>) -> Self {
        Self(normalize_address(raw.as_ref()))
    }

    /// Get the canonical address as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True for the empty address
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// `None` for the empty address
    pub fn non_empty(self) -> Option<Self> {
        (!self.is_empty()).then_some(self)
    }
}

/// Deserialize an optional address, reading `""` as absent.
pub(crate) fn deserialize_optional_address<'de, D>(
    deserializer: D,
) -> std::result::Result<Option<Address>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Address>::deserialize(deserializer)?.and_then(Address::non_empty))
}

/// Canonical spelling of an address: surrounding whitespace removed, ASCII lowercased.
pub fn normalize_address(raw: &str) -> String {
    raw.trim().to_ascii_lowercase()
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for Address {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for Address {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<Address> for String {
    fn from(a: Address) -> Self {
        a.0
    }
}

impl AsRef<str> for Address {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_id() {
        let id = RecordId::new("1700000000000-abc123def");
        assert_eq!(id.as_str(), "1700000000000-abc123def");
        assert_eq!(format!("{}", id), "1700000000000-abc123def");
    }

    #[test]
    fn test_generated_ids_are_unique() {
        let a = RecordId::generate();
        let b = RecordId::generate();
        assert_ne!(a, b);

        let (millis, suffix) = a.as_str().split_once('-').unwrap();
        assert!(millis.parse::<i64>().is_ok());
        assert_eq!(suffix.len(), 9);
    }

    #[test]
    fn test_address_normalization() {
        let checksummed = Address::new("  0xAbC123dEf  ");
        let lower = Address::new("0xabc123def");
        assert_eq!(checksummed, lower);
        assert_eq!(checksummed.as_str(), "0xabc123def");
    }

    #[test]
    fn test_address_normalized_on_deserialize() {
        let addr: Address = serde_json::from_str("\"0xDEADbeef\"").unwrap();
        assert_eq!(addr.as_str(), "0xdeadbeef");
        assert_eq!(serde_json::to_string(&addr).unwrap(), "\"0xdeadbeef\"");
    }

    #[test]
    fn test_blank_address_is_absent() {
        assert_eq!(Address::new("   ").non_empty(), None);
        assert_eq!(
            Address::new("0xAB").non_empty(),
            Some(Address::new("0xab"))
        );
    }
}

//! Mint records

use crate::error::{Error, Result};
use crate::identity::{Address, RecordId};
use crate::record::Record;
use crate::time::{self, Timestamp};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// State of a mint transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum MintStatus {
    #[default]
    Minting,
    Minted,
    Failed,
}

impl MintStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            MintStatus::Minting => "minting",
            MintStatus::Minted => "minted",
            MintStatus::Failed => "failed",
        }
    }
}

impl fmt::Display for MintStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MintStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "minting" => Ok(MintStatus::Minting),
            "minted" => Ok(MintStatus::Minted),
            "failed" => Ok(MintStatus::Failed),
            other => Err(Error::UnknownStatus {
                kind: "mint",
                value: other.to_string(),
            }),
        }
    }
}

/// Value of a metadata trait: text or a number
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttributeValue {
    Number(f64),
    Text(String),
}

impl fmt::Display for AttributeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttributeValue::Number(n) => write!(f, "{}", n),
            AttributeValue::Text(s) => write!(f, "{}", s),
        }
    }
}

impl From<&str> for AttributeValue {
    fn from(s: &str) -> Self {
        AttributeValue::Text(s.to_string())
    }
}

impl From<String> for AttributeValue {
    fn from(s: String) -> Self {
        AttributeValue::Text(s)
    }
}

impl From<f64> for AttributeValue {
    fn from(n: f64) -> Self {
        AttributeValue::Number(n)
    }
}

/// One `{trait_type, value}` pair of token metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attribute {
    pub trait_type: String,
    pub value: AttributeValue,
}

impl Attribute {
    pub fn new(trait_type: impl Into<String>, value: impl Into<AttributeValue>) -> Self {
        Self {
            trait_type: trait_type.into(),
            value: value.into(),
        }
    }
}

/// A token minted into a collection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Mint {
    pub id: RecordId,
    pub collection_id: RecordId,
    /// Provisional until the receipt's transfer event reports the real id
    pub token_id: String,
    pub name: String,
    pub description: String,
    pub image: String,
    pub metadata_uri: String,
    #[serde(default)]
    pub attributes: Vec<Attribute>,
    pub owner_address: Address,
    #[serde(default)]
    pub recipient_address: Option<Address>,
    #[serde(default)]
    pub transaction_hash: Option<String>,
    #[serde(default)]
    pub status: MintStatus,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// User-supplied fields for a new mint
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewMint {
    pub collection_id: RecordId,
    pub token_id: String,
    pub name: String,
    pub description: String,
    pub image: String,
    pub metadata_uri: String,
    pub attributes: Vec<Attribute>,
    pub owner_address: Address,
    pub recipient_address: Option<Address>,
}

impl Mint {
    /// Create a mint with a fresh id in `Minting` status.
    pub fn new(data: NewMint) -> Self {
        let now = time::now();
        Self {
            id: RecordId::generate(),
            collection_id: data.collection_id,
            token_id: data.token_id,
            name: data.name,
            description: data.description,
            image: data.image,
            metadata_uri: data.metadata_uri,
            attributes: data.attributes,
            owner_address: data.owner_address,
            recipient_address: data.recipient_address,
            transaction_hash: None,
            status: MintStatus::Minting,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_minted(&self) -> bool {
        self.status == MintStatus::Minted
    }
}

impl Record for Mint {
    fn id(&self) -> &RecordId {
        &self.id
    }

    fn owner(&self) -> &Address {
        &self.owner_address
    }

    fn created_at(&self) -> Timestamp {
        self.created_at
    }
}

/// Partial update for a mint
///
/// Only fields set to `Some` are changed. Optional fields take `Some(None)`
/// to clear them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MintPatch {
    pub collection_id: Option<RecordId>,
    pub token_id: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub image: Option<String>,
    pub metadata_uri: Option<String>,
    pub attributes: Option<Vec<Attribute>>,
    pub owner_address: Option<Address>,
    pub recipient_address: Option<Option<Address>>,
    pub transaction_hash: Option<Option<String>>,
    pub status: Option<MintStatus>,
}

impl MintPatch {
    /// Record a confirmed mint and reconcile the token id from the receipt
    pub fn minted(transaction_hash: impl Into<String>, token_id: impl Into<String>) -> Self {
        Self {
            transaction_hash: Some(Some(transaction_hash.into())),
            token_id: Some(token_id.into()),
            status: Some(MintStatus::Minted),
            ..Default::default()
        }
    }

    pub fn failed() -> Self {
        Self {
            status: Some(MintStatus::Failed),
            ..Default::default()
        }
    }

    /// Merge into `mint` and stamp `updated_at`.
    pub fn apply(self, mint: &mut Mint, now: Timestamp) {
        if let Some(v) = self.collection_id {
            mint.collection_id = v;
        }
        if let Some(v) = self.token_id {
            mint.token_id = v;
        }
        if let Some(v) = self.name {
            mint.name = v;
        }
        if let Some(v) = self.description {
            mint.description = v;
        }
        if let Some(v) = self.image {
            mint.image = v;
        }
        if let Some(v) = self.metadata_uri {
            mint.metadata_uri = v;
        }
        if let Some(v) = self.attributes {
            mint.attributes = v;
        }
        if let Some(v) = self.owner_address {
            mint.owner_address = v;
        }
        if let Some(v) = self.recipient_address {
            mint.recipient_address = v;
        }
        if let Some(v) = self.transaction_hash {
            mint.transaction_hash = v;
        }
        if let Some(v) = self.status {
            mint.status = v;
        }
        mint.updated_at = now;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minted_patch_reconciles_token() {
        let mut mint = Mint::new(NewMint {
            collection_id: RecordId::new("c1"),
            token_id: "pending-1".to_string(),
            name: "Frame 1".to_string(),
            owner_address: Address::new("0xabc"),
            ..Default::default()
        });
        assert_eq!(mint.status, MintStatus::Minting);

        let now = time::now();
        MintPatch::minted("0xhash", "7").apply(&mut mint, now);
        assert!(mint.is_minted());
        assert_eq!(mint.token_id, "7");
        assert_eq!(mint.transaction_hash.as_deref(), Some("0xhash"));
        assert_eq!(mint.updated_at, now);
    }

    #[test]
    fn test_attribute_values_untagged() {
        let attrs: Vec<Attribute> = serde_json::from_str(
            r#"[{"trait_type":"Scene","value":"Opening"},{"trait_type":"Frame","value":12}]"#,
        )
        .unwrap();
        assert_eq!(attrs[0], Attribute::new("Scene", "Opening"));
        assert_eq!(attrs[1], Attribute::new("Frame", 12.0));
        assert_eq!(attrs[1].value.to_string(), "12");
    }

    #[test]
    fn test_patch_clears_optional_fields() {
        let mut mint = Mint::new(NewMint {
            recipient_address: Some(Address::new("0xFriend")),
            ..Default::default()
        });
        MintPatch::minted("0xhash", "3").apply(&mut mint, time::now());

        MintPatch {
            recipient_address: Some(None),
            transaction_hash: Some(None),
            status: Some(MintStatus::Minting),
            ..Default::default()
        }
        .apply(&mut mint, time::now());
        assert_eq!(mint.recipient_address, None);
        assert_eq!(mint.transaction_hash, None);
        assert_eq!(mint.token_id, "3");
    }
}

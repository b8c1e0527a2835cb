//! Mint model for database storage.

use crate::error::{Error, Result};
use filmint_core::time::{from_millis_nanos, sub_millis_nanos, to_millis};
use filmint_core::{Address, Attribute, AttributeValue, Mint, MintStatus, RecordId};
use native_db::*;
use native_model::{native_model, Model};
use serde::{Deserialize, Serialize};

/// Stored mint in the `mints` partition.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[native_model(id = 2, version = 1)]
#[native_db]
pub struct StoredMint {
    /// Primary key - mint ID.
    #[primary_key]
    pub id: String,
    /// Parent collection ID.
    #[secondary_key]
    pub collection_id: String,
    /// Owning wallet, lowercase.
    #[secondary_key]
    pub owner_address: String,
    /// Token ID, provisional until confirmed.
    #[secondary_key]
    pub token_id: String,
    /// Creation time in Unix milliseconds.
    #[secondary_key]
    pub created_at: i64,
    /// Nanoseconds of the creation time below `created_at`.
    pub created_at_nanos: u32,
    pub name: String,
    pub description: String,
    pub image: String,
    pub metadata_uri: String,
    /// Serialized attributes.
    pub attributes: Vec<u8>,
    pub recipient_address: Option<String>,
    pub transaction_hash: Option<String>,
    /// Mint status (serialized).
    pub status: u8,
    /// Last update in Unix milliseconds.
    pub updated_at: i64,
    pub updated_at_nanos: u32,
}

/// Attribute encoding for the serialized attribute blob.
///
/// The domain `AttributeValue` is untagged for JSON, which bincode cannot
/// decode, so the blob carries an explicitly tagged copy.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoredAttribute {
    trait_type: String,
    value: StoredAttributeValue,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
enum StoredAttributeValue {
    Number(f64),
    Text(String),
}

impl StoredMint {
    /// Create from a Mint.
    pub fn from_mint(mint: &Mint) -> Result<Self> {
        let attributes: Vec<StoredAttribute> = mint
            .attributes
            .iter()
            .map(|a| StoredAttribute {
                trait_type: a.trait_type.clone(),
                value: match &a.value {
                    AttributeValue::Number(n) => StoredAttributeValue::Number(*n),
                    AttributeValue::Text(s) => StoredAttributeValue::Text(s.clone()),
                },
            })
            .collect();
        let attributes =
            bincode::serialize(&attributes).map_err(|e| Error::Serialization(e.to_string()))?;
        let status = match mint.status {
            MintStatus::Minting => 0,
            MintStatus::Minted => 1,
            MintStatus::Failed => 2,
        };
        Ok(Self {
            id: mint.id.as_str().to_string(),
            collection_id: mint.collection_id.as_str().to_string(),
            owner_address: mint.owner_address.as_str().to_string(),
            token_id: mint.token_id.clone(),
            created_at: to_millis(&mint.created_at),
            created_at_nanos: sub_millis_nanos(&mint.created_at),
            name: mint.name.clone(),
            description: mint.description.clone(),
            image: mint.image.clone(),
            metadata_uri: mint.metadata_uri.clone(),
            attributes,
            recipient_address: mint
                .recipient_address
                .as_ref()
                .map(|a| a.as_str().to_string()),
            transaction_hash: mint.transaction_hash.clone(),
            status,
            updated_at: to_millis(&mint.updated_at),
            updated_at_nanos: sub_millis_nanos(&mint.updated_at),
        })
    }

    /// Convert to a Mint.
    pub fn to_mint(&self) -> Result<Mint> {
        let attributes: Vec<StoredAttribute> = bincode::deserialize(&self.attributes)
            .map_err(|e| Error::Serialization(e.to_string()))?;
        let status = match self.status {
            0 => MintStatus::Minting,
            1 => MintStatus::Minted,
            2 => MintStatus::Failed,
            other => {
                return Err(Error::Serialization(format!(
                    "mint {} has unknown status byte {}",
                    self.id, other
                )))
            }
        };
        Ok(Mint {
            id: RecordId::new(self.id.clone()),
            collection_id: RecordId::new(self.collection_id.clone()),
            token_id: self.token_id.clone(),
            name: self.name.clone(),
            description: self.description.clone(),
            image: self.image.clone(),
            metadata_uri: self.metadata_uri.clone(),
            attributes: attributes
                .into_iter()
                .map(|a| Attribute {
                    trait_type: a.trait_type,
                    value: match a.value {
                        StoredAttributeValue::Number(n) => AttributeValue::Number(n),
                        StoredAttributeValue::Text(s) => AttributeValue::Text(s),
                    },
                })
                .collect(),
            owner_address: Address::new(&self.owner_address),
            recipient_address: self.recipient_address.as_deref().map(Address::new),
            transaction_hash: self.transaction_hash.clone(),
            status,
            created_at: from_millis_nanos(self.created_at, self.created_at_nanos),
            updated_at: from_millis_nanos(self.updated_at, self.updated_at_nanos),
        })
    }
}

//! Collection model for database storage.

use crate::error::{Error, Result};
use filmint_core::time::{from_millis_nanos, sub_millis_nanos, to_millis};
use filmint_core::{Address, Collection, CollectionStatus, RecordId};
use native_db::*;
use native_model::{native_model, Model};
use serde::{Deserialize, Serialize};

/// Stored collection in the `collections` partition.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[native_model(id = 1, version = 1)]
#[native_db]
pub struct StoredCollection {
    /// Primary key - collection ID.
    #[primary_key]
    pub id: String,
    /// Owning wallet, lowercase.
    #[secondary_key]
    pub owner_address: String,
    /// Deployed contract, lowercase.
    #[secondary_key(optional)]
    pub contract_address: Option<String>,
    /// Creation time in Unix milliseconds.
    #[secondary_key]
    pub created_at: i64,
    /// Nanoseconds of the creation time below `created_at`.
    pub created_at_nanos: u32,
    pub name: String,
    pub description: String,
    pub symbol: String,
    pub image: String,
    pub metadata_uri: String,
    pub external_link: Option<String>,
    pub royalty_percentage: f64,
    /// Cached mint count.
    pub item_count: u64,
    pub network: String,
    /// Deployment status (serialized).
    pub status: u8,
    /// Last update in Unix milliseconds.
    pub updated_at: i64,
    pub updated_at_nanos: u32,
}

impl StoredCollection {
    /// Create from a Collection.
    pub fn from_collection(collection: &Collection) -> Self {
        let status = match collection.status {
            CollectionStatus::Deploying => 0,
            CollectionStatus::Deployed => 1,
            CollectionStatus::Failed => 2,
        };
        Self {
            id: collection.id.as_str().to_string(),
            owner_address: collection.owner_address.as_str().to_string(),
            contract_address: collection
                .contract_address
                .as_ref()
                .map(|a| a.as_str().to_string()),
            created_at: to_millis(&collection.created_at),
            created_at_nanos: sub_millis_nanos(&collection.created_at),
            name: collection.name.clone(),
            description: collection.description.clone(),
            symbol: collection.symbol.clone(),
            image: collection.image.clone(),
            metadata_uri: collection.metadata_uri.clone(),
            external_link: collection.external_link.clone(),
            royalty_percentage: collection.royalty_percentage,
            item_count: collection.item_count,
            network: collection.network.clone(),
            status,
            updated_at: to_millis(&collection.updated_at),
            updated_at_nanos: sub_millis_nanos(&collection.updated_at),
        }
    }

    /// Convert to a Collection.
    pub fn to_collection(&self) -> Result<Collection> {
        let status = match self.status {
            0 => CollectionStatus::Deploying,
            1 => CollectionStatus::Deployed,
            2 => CollectionStatus::Failed,
            other => {
                return Err(Error::Serialization(format!(
                    "collection {} has unknown status byte {}",
                    self.id, other
                )))
            }
        };
        Ok(Collection {
            id: RecordId::new(self.id.clone()),
            name: self.name.clone(),
            description: self.description.clone(),
            symbol: self.symbol.clone(),
            image: self.image.clone(),
            contract_address: self.contract_address.as_deref().map(Address::new),
            metadata_uri: self.metadata_uri.clone(),
            external_link: self.external_link.clone(),
            royalty_percentage: self.royalty_percentage,
            owner_address: Address::new(&self.owner_address),
            item_count: self.item_count,
            network: self.network.clone(),
            status,
            created_at: from_millis_nanos(self.created_at, self.created_at_nanos),
            updated_at: from_millis_nanos(self.updated_at, self.updated_at_nanos),
        })
    }
}

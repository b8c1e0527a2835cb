//! Collection records
//!
//! A collection is an ERC-1155 contract the user creates. It starts out
//! `Deploying`, and the deployment result is recorded later through a
//! [`CollectionPatch`].

use crate::error::{Error, Result};
use crate::identity::{deserialize_optional_address, Address, RecordId};
use crate::record::Record;
use crate::time::{self, Timestamp};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Deployment state of a collection contract
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum CollectionStatus {
    /// Deployment transaction submitted, not yet confirmed
    #[default]
    Deploying,
    /// Contract confirmed on chain
    Deployed,
    /// Deployment failed
    Failed,
}

impl CollectionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CollectionStatus::Deploying => "deploying",
            CollectionStatus::Deployed => "deployed",
            CollectionStatus::Failed => "failed",
        }
    }
}

impl fmt::Display for CollectionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CollectionStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "deploying" => Ok(CollectionStatus::Deploying),
            "deployed" => Ok(CollectionStatus::Deployed),
            "failed" => Ok(CollectionStatus::Failed),
            other => Err(Error::UnknownStatus {
                kind: "collection",
                value: other.to_string(),
            }),
        }
    }
}

/// An NFT collection owned by a wallet
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Collection {
    pub id: RecordId,
    pub name: String,
    pub description: String,
    pub symbol: String,
    /// Cover art URI (IPFS gateway or HTTP)
    pub image: String,
    /// Deployed contract, absent until confirmation; never the empty address
    #[serde(default, deserialize_with = "deserialize_optional_address")]
    pub contract_address: Option<Address>,
    pub metadata_uri: String,
    #[serde(default)]
    pub external_link: Option<String>,
    /// Royalty in percent, 0 to 100
    #[serde(default)]
    pub royalty_percentage: f64,
    pub owner_address: Address,
    /// Cached mint count; recompute with the store, never trust on its own
    #[serde(default)]
    pub item_count: u64,
    #[serde(default)]
    pub network: String,
    #[serde(default)]
    pub status: CollectionStatus,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// User-supplied fields for a new collection
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewCollection {
    pub name: String,
    pub description: String,
    pub symbol: String,
    pub image: String,
    pub contract_address: Option<Address>,
    pub metadata_uri: String,
    pub external_link: Option<String>,
    pub royalty_percentage: f64,
    pub owner_address: Address,
    pub network: String,
}

impl Collection {
    /// Create a collection with a fresh id, `Deploying` status and no items.
    pub fn new(data: NewCollection) -> Self {
        let now = time::now();
        Self {
            id: RecordId::generate(),
            name: data.name,
            description: data.description,
            symbol: data.symbol,
            image: data.image,
            contract_address: data.contract_address.and_then(Address::non_empty),
            metadata_uri: data.metadata_uri,
            external_link: data.external_link,
            royalty_percentage: data.royalty_percentage,
            owner_address: data.owner_address,
            item_count: 0,
            network: data.network,
            status: CollectionStatus::Deploying,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_deployed(&self) -> bool {
        self.status == CollectionStatus::Deployed
    }
}

impl Record for Collection {
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

/// Partial update for a collection
///
/// Only fields set to `Some` are changed. Optional fields take
/// `Some(None)` to clear them. `id` and `created_at` cannot be patched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CollectionPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub symbol: Option<String>,
    pub image: Option<String>,
    pub contract_address: Option<Option<Address>>,
    pub metadata_uri: Option<String>,
    pub external_link: Option<Option<String>>,
    pub royalty_percentage: Option<f64>,
    pub owner_address: Option<Address>,
    pub item_count: Option<u64>,
    pub network: Option<String>,
    pub status: Option<CollectionStatus>,
}

impl CollectionPatch {
    /// Record a confirmed deployment
    pub fn deployed(contract_address: impl Into<Address>) -> Self {
        Self {
            contract_address: Some(Address::non_empty(contract_address.into())),
            status: Some(CollectionStatus::Deployed),
            ..Default::default()
        }
    }

    /// Record a failed deployment
    pub fn failed() -> Self {
        Self {
            status: Some(CollectionStatus::Failed),
            ..Default::default()
        }
    }

    pub fn item_count(count: u64) -> Self {
        Self {
            item_count: Some(count),
            ..Default::default()
        }
    }

    /// Merge into `collection` and stamp `updated_at`.
    pub fn apply(self, collection: &mut Collection, now: Timestamp) {
        if let Some(v) = self.name {
            collection.name = v;
        }
        if let Some(v) = self.description {
            collection.description = v;
        }
        if let Some(v) = self.symbol {
            collection.symbol = v;
        }
        if let Some(v) = self.image {
            collection.image = v;
        }
        if let Some(v) = self.contract_address {
            collection.contract_address = v.and_then(Address::non_empty);
        }
        if let Some(v) = self.metadata_uri {
            collection.metadata_uri = v;
        }
        if let Some(v) = self.external_link {
            collection.external_link = v;
        }
        if let Some(v) = self.royalty_percentage {
            collection.royalty_percentage = v;
        }
        if let Some(v) = self.owner_address {
            collection.owner_address = v;
        }
        if let Some(v) = self.item_count {
            collection.item_count = v;
        }
        if let Some(v) = self.network {
            collection.network = v;
        }
        if let Some(v) = self.status {
            collection.status = v;
        }
        collection.updated_at = now;
    }
}

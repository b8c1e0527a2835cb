//! Per-owner backup snapshot and derived statistics

use crate::collection::{Collection, CollectionStatus};
use crate::identity::Address;
use crate::mint::{Mint, MintStatus};
use crate::time::Timestamp;
use serde::{Deserialize, Serialize};

/// Everything one owner has stored, for backup and restore
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserData {
    pub address: Address,
    pub collections: Vec<Collection>,
    pub mints: Vec<Mint>,
    pub last_updated: Timestamp,
}

/// Dashboard counters for one owner
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserStats {
    pub total_collections: usize,
    pub total_mints: usize,
    pub deployed_collections: usize,
    pub minted_items: usize,
}

impl UserStats {
    /// Derive the counters from an owner's records
    pub fn from_records(collections: &[Collection], mints: &[Mint]) -> Self {
        Self {
            total_collections: collections.len(),
            total_mints: mints.len(),
            deployed_collections: collections
                .iter()
                .filter(|c| c.status == CollectionStatus::Deployed)
                .count(),
            minted_items: mints
                .iter()
                .filter(|m| m.status == MintStatus::Minted)
                .count(),
        }
    }
}

impl std::fmt::Display for UserStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "collections={} (deployed={}) mints={} (minted={})",
            self.total_collections, self.deployed_collections, self.total_mints, self.minted_items
        )
    }
}

//! Per-owner bookkeeping.

use native_db::*;
use native_model::{native_model, Model};
use serde::{Deserialize, Serialize};

/// Stored row in the `userData` partition, keyed by owner address.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[native_model(id = 3, version = 1)]
#[native_db]
pub struct StoredUserData {
    /// Primary key - owner address, lowercase.
    #[primary_key]
    pub address: String,
    /// `lastUpdated` of the most recently imported snapshot, Unix milliseconds.
    pub last_updated: i64,
    pub last_updated_nanos: u32,
}

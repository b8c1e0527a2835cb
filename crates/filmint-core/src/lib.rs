//! Filmint Core - Domain types for NFT collections and mints
//!
//! This crate provides the records the local store persists:
//! - Record and address identifiers (`RecordId`, `Address`)
//! - `Collection` and `Mint` with their lifecycle statuses
//! - Partial-update patches that stamp `updated_at`
//! - Per-owner backup snapshots (`UserData`) and statistics (`UserStats`)
//! - The upload endpoint's response contract
//!
//! Addresses are canonicalized to lowercase on construction, so records
//! created from checksummed and lowercase spellings land in the same owner
//! partition.

mod collection;
mod error;
mod identity;
mod mint;
mod record;
mod snapshot;
pub mod time;
mod upload;

pub use collection::{Collection, CollectionPatch, CollectionStatus, NewCollection};
pub use error::{Error, Result};
pub use identity::{normalize_address, Address, RecordId};
pub use mint::{Attribute, AttributeValue, Mint, MintPatch, MintStatus, NewMint};
pub use record::{newest_first, Record};
pub use snapshot::{UserData, UserStats};
pub use time::Timestamp;
pub use upload::UploadResponse;

//! Index lookups and derived statistics.
//!
//! Secondary scans use `start_with`, which matches by prefix, so each scan
//! keeps only exact matches.

use crate::error::Result;
use crate::models::*;
use crate::store::Store;
use filmint_core::time::{to_millis, Timestamp};
use filmint_core::{newest_first, Address, Collection, Mint, RecordId, UserStats};
use native_db::*;

impl Store {
    /// Get all collections of an owner, in no particular order.
    pub fn collections_by_owner(&self, owner: &Address) -> Result<Vec<Collection>> {
        let r = self.db.r_transaction()?;
        to_collections(owner_collections(&r, owner.as_str())?)
    }

    /// Get all collections of an owner, newest first.
    pub fn recent_collections_by_owner(&self, owner: &Address) -> Result<Vec<Collection>> {
        let mut collections = self.collections_by_owner(owner)?;
        newest_first(&mut collections);
        Ok(collections)
    }

    /// Get all mints of an owner, in no particular order.
    pub fn mints_by_owner(&self, owner: &Address) -> Result<Vec<Mint>> {
        let r = self.db.r_transaction()?;
        to_mints(owner_mints(&r, owner.as_str())?)
    }

    /// Get all mints of an owner, newest first.
    pub fn recent_mints_by_owner(&self, owner: &Address) -> Result<Vec<Mint>> {
        let mut mints = self.mints_by_owner(owner)?;
        newest_first(&mut mints);
        Ok(mints)
    }

    /// Get all mints of a collection, in no particular order.
    pub fn mints_by_collection(&self, collection_id: &RecordId) -> Result<Vec<Mint>> {
        let r = self.db.r_transaction()?;
        let scan = r
            .scan()
            .secondary::<StoredMint>(StoredMintKey::collection_id)?;
        let mints: std::result::Result<Vec<StoredMint>, _> =
            scan.start_with(collection_id.as_str())?.collect();
        to_mints(
            mints?
                .into_iter()
                .filter(|m| m.collection_id == collection_id.as_str())
                .collect(),
        )
    }

    /// Get all mints of a collection, newest first.
    pub fn recent_mints_by_collection(&self, collection_id: &RecordId) -> Result<Vec<Mint>> {
        let mut mints = self.mints_by_collection(collection_id)?;
        newest_first(&mut mints);
        Ok(mints)
    }

    /// Get collections deployed at a contract address.
    pub fn collections_by_contract(&self, contract: &Address) -> Result<Vec<Collection>> {
        let r = self.db.r_transaction()?;
        let scan = r
            .scan()
            .secondary::<StoredCollection>(StoredCollectionKey::contract_address)?;
        let collections: std::result::Result<Vec<StoredCollection>, _> = scan
            .start_with(Some(contract.as_str().to_string()))?
            .collect();
        to_collections(
            collections?
                .into_iter()
                .filter(|c| c.contract_address.as_deref() == Some(contract.as_str()))
                .collect(),
        )
    }

    /// Get mints carrying a token id.
    ///
    /// Token ids are only unique per contract, so several collections may match.
    pub fn mints_by_token(&self, token_id: &str) -> Result<Vec<Mint>> {
        let r = self.db.r_transaction()?;
        let scan = r.scan().secondary::<StoredMint>(StoredMintKey::token_id)?;
        let mints: std::result::Result<Vec<StoredMint>, _> = scan.start_with(token_id)?.collect();
        to_mints(
            mints?
                .into_iter()
                .filter(|m| m.token_id == token_id)
                .collect(),
        )
    }

    /// Get collections created in `[from, to)`, oldest first.
    pub fn collections_created_between(
        &self,
        from: Timestamp,
        to: Timestamp,
    ) -> Result<Vec<Collection>> {
        let r = self.db.r_transaction()?;
        let scan = r
            .scan()
            .secondary::<StoredCollection>(StoredCollectionKey::created_at)?;
        let collections: std::result::Result<Vec<StoredCollection>, _> =
            scan.range(to_millis(&from)..to_millis(&to))?.collect();
        to_collections(collections?)
    }

    /// Count mints of a collection without decoding them.
    pub fn count_mints_in_collection(&self, collection_id: &RecordId) -> Result<usize> {
        let r = self.db.r_transaction()?;
        let scan = r
            .scan()
            .secondary::<StoredMint>(StoredMintKey::collection_id)?;
        let mut count = 0;
        for mint in scan.start_with(collection_id.as_str())? {
            if mint?.collection_id == collection_id.as_str() {
                count += 1;
            }
        }
        Ok(count)
    }

    /// Aggregate counters for an owner, recomputed on every call.
    pub fn user_stats(&self, owner: &Address) -> Result<UserStats> {
        let r = self.db.r_transaction()?;
        let collections = to_collections(owner_collections(&r, owner.as_str())?)?;
        let mints = to_mints(owner_mints(&r, owner.as_str())?)?;
        Ok(UserStats::from_records(&collections, &mints))
    }
}

pub(crate) fn owner_collections(
    r: &transaction::RTransaction<'_>,
    owner: &str,
) -> Result<Vec<StoredCollection>> {
    let scan = r
        .scan()
        .secondary::<StoredCollection>(StoredCollectionKey::owner_address)?;
    let collections: std::result::Result<Vec<StoredCollection>, _> =
        scan.start_with(owner)?.collect();
    Ok(collections?
        .into_iter()
        .filter(|c| c.owner_address == owner)
        .collect())
}

pub(crate) fn owner_mints(
    r: &transaction::RTransaction<'_>,
    owner: &str,
) -> Result<Vec<StoredMint>> {
    let scan = r
        .scan()
        .secondary::<StoredMint>(StoredMintKey::owner_address)?;
    let mints: std::result::Result<Vec<StoredMint>, _> = scan.start_with(owner)?.collect();
    Ok(mints?
        .into_iter()
        .filter(|m| m.owner_address == owner)
        .collect())
}

pub(crate) fn to_collections(stored: Vec<StoredCollection>) -> Result<Vec<Collection>> {
    stored.iter().map(StoredCollection::to_collection).collect()
}

pub(crate) fn to_mints(stored: Vec<StoredMint>) -> Result<Vec<Mint>> {
    stored.iter().map(StoredMint::to_mint).collect()
}

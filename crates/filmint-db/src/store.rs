//! Database store wrapper.
//!
//! Every public operation runs as exactly one native_db transaction. A
//! read-write transaction that is dropped without `commit()` is rolled
//! back, so returning early with an error leaves the store as it was.

use crate::config::StoreConfig;
use crate::error::{Error, Result};
use crate::models::*;
use filmint_core::time::{self, sub_millis_nanos, to_millis};
use filmint_core::{Collection, CollectionPatch, Mint, MintPatch, RecordId};
use native_db::*;
use std::fs;
use std::path::Path;
use std::sync::LazyLock;
use tracing::{debug, info, warn};

// Static models for the database
static MODELS: LazyLock<Models> = LazyLock::new(|| {
    let mut models = Models::new();
    models
        .define::<StoredCollection>()
        .expect("collections model is well-formed");
    models
        .define::<StoredMint>()
        .expect("mints model is well-formed");
    models
        .define::<StoredUserData>()
        .expect("userData model is well-formed");
    models
});

/// Database store for collection and mint records.
pub struct Store {
    pub(crate) db: Database<'static>,
}

impl Store {
    /// Open or create a database at the given path.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let db = Builder::new().create(&MODELS, path).map_err(|e| {
            Error::StorageUnavailable(format!("{}: {}", path.display(), e))
        })?;
        info!(path = %path.display(), "record store opened");
        Ok(Self { db })
    }

    /// Create an in-memory database.
    pub fn in_memory() -> Result<Self> {
        let db = Builder::new()
            .create_in_memory(&MODELS)
            .map_err(|e| Error::StorageUnavailable(e.to_string()))?;
        debug!("in-memory record store opened");
        Ok(Self { db })
    }

    /// Open the database described by `config`, creating its directory if needed.
    pub fn open_with(config: &StoreConfig) -> Result<Self> {
        if config.in_memory {
            return Self::in_memory();
        }
        fs::create_dir_all(&config.data_dir).map_err(|e| {
            Error::StorageUnavailable(format!("{}: {}", config.data_dir.display(), e))
        })?;
        Self::open(config.database_path())
    }

    /// Save a collection, replacing any record with the same id.
    ///
    /// Stored as given; `updated_at` is not touched.
    pub fn save_collection(&self, collection: &Collection) -> Result<()> {
        let stored = StoredCollection::from_collection(collection);
        let rw = self.db.rw_transaction()?;
        rw.upsert(stored)?;
        rw.commit()?;
        debug!(collection = %collection.id, "collection saved");
        Ok(())
    }

    /// Load a collection by ID.
    pub fn get_collection(&self, id: &RecordId) -> Result<Option<Collection>> {
        let r = self.db.r_transaction()?;
        let stored: Option<StoredCollection> = r.get().primary(id.as_str())?;
        stored.map(|s| s.to_collection()).transpose()
    }

    /// Merge `patch` into a collection and stamp `updated_at`.
    ///
    /// There is no version check: concurrent updates of one id apply in
    /// commit order and the last writer wins on every field both set.
    pub fn update_collection(&self, id: &RecordId, patch: CollectionPatch) -> Result<Collection> {
        let rw = self.db.rw_transaction()?;
        let stored: Option<StoredCollection> = rw.get().primary(id.as_str())?;
        let Some(stored) = stored else {
            return Err(Error::NotFound(format!("collection {}", id)));
        };
        let mut collection = stored.to_collection()?;
        patch.apply(&mut collection, time::now());
        rw.upsert(StoredCollection::from_collection(&collection))?;
        rw.commit()?;
        debug!(collection = %id, status = %collection.status, "collection updated");
        Ok(collection)
    }

    /// Delete a collection together with all of its mints.
    ///
    /// Returns the number of mints removed.
    pub fn delete_collection(&self, id: &RecordId) -> Result<usize> {
        let rw = self.db.rw_transaction()?;
        let stored: Option<StoredCollection> = rw.get().primary(id.as_str())?;
        let Some(stored) = stored else {
            return Err(Error::NotFound(format!("collection {}", id)));
        };
        let mints = collection_mints_rw(&rw, id.as_str())?;
        let removed = mints.len();
        for mint in mints {
            rw.remove(mint)?;
        }
        rw.remove(stored)?;
        rw.commit()?;
        info!(collection = %id, mints = removed, "collection deleted");
        Ok(removed)
    }

    /// Save a mint, replacing any record with the same id.
    ///
    /// The parent collection is not checked; use [`Store::add_mint`] for that.
    pub fn save_mint(&self, mint: &Mint) -> Result<()> {
        let stored = StoredMint::from_mint(mint)?;
        let rw = self.db.rw_transaction()?;
        rw.upsert(stored)?;
        rw.commit()?;
        debug!(mint = %mint.id, "mint saved");
        Ok(())
    }

    /// Save a mint whose collection must exist, then recount that collection.
    ///
    /// Returns the collection's new item count.
    pub fn add_mint(&self, mint: &Mint) -> Result<u64> {
        let stored = StoredMint::from_mint(mint)?;
        let rw = self.db.rw_transaction()?;
        let parent: Option<StoredCollection> = rw.get().primary(mint.collection_id.as_str())?;
        if parent.is_none() {
            warn!(mint = %mint.id, collection = %mint.collection_id, "mint rejected, unknown collection");
            return Err(Error::InvalidReference(format!(
                "mint {} references missing collection {}",
                mint.id, mint.collection_id
            )));
        }
        let previous: Option<StoredMint> = rw.get().primary(mint.id.as_str())?;
        rw.upsert(stored)?;
        if let Some(previous) = previous {
            if previous.collection_id != mint.collection_id.as_str() {
                recount_rw(&rw, &previous.collection_id)?;
            }
        }
        let count = recount_rw(&rw, mint.collection_id.as_str())?.unwrap_or_default();
        rw.commit()?;
        debug!(mint = %mint.id, collection = %mint.collection_id, items = count, "mint added");
        Ok(count)
    }

    /// Load a mint by ID.
    pub fn get_mint(&self, id: &RecordId) -> Result<Option<Mint>> {
        let r = self.db.r_transaction()?;
        let stored: Option<StoredMint> = r.get().primary(id.as_str())?;
        stored.map(|s| s.to_mint()).transpose()
    }

    /// Merge `patch` into a mint and stamp `updated_at`.
    ///
    /// Moving a mint to another collection requires the target to exist;
    /// both collections are recounted.
    pub fn update_mint(&self, id: &RecordId, patch: MintPatch) -> Result<Mint> {
        let rw = self.db.rw_transaction()?;
        let stored: Option<StoredMint> = rw.get().primary(id.as_str())?;
        let Some(stored) = stored else {
            return Err(Error::NotFound(format!("mint {}", id)));
        };
        let mut mint = stored.to_mint()?;
        let previous_collection = mint.collection_id.clone();

        if let Some(target) = &patch.collection_id {
            if *target != previous_collection {
                let exists: Option<StoredCollection> = rw.get().primary(target.as_str())?;
                if exists.is_none() {
                    warn!(mint = %id, collection = %target, "mint move rejected, unknown collection");
                    return Err(Error::InvalidReference(format!(
                        "mint {} cannot move to missing collection {}",
                        id, target
                    )));
                }
            }
        }

        patch.apply(&mut mint, time::now());
        rw.upsert(StoredMint::from_mint(&mint)?)?;
        if mint.collection_id != previous_collection {
            recount_rw(&rw, previous_collection.as_str())?;
            recount_rw(&rw, mint.collection_id.as_str())?;
        }
        rw.commit()?;
        debug!(mint = %id, status = %mint.status, "mint updated");
        Ok(mint)
    }

    /// Delete a mint and recount its collection.
    pub fn delete_mint(&self, id: &RecordId) -> Result<()> {
        let rw = self.db.rw_transaction()?;
        let stored: Option<StoredMint> = rw.get().primary(id.as_str())?;
        let Some(stored) = stored else {
            return Err(Error::NotFound(format!("mint {}", id)));
        };
        let parent = stored.collection_id.clone();
        rw.remove(stored)?;
        recount_rw(&rw, &parent)?;
        rw.commit()?;
        debug!(mint = %id, collection = %parent, "mint deleted");
        Ok(())
    }

    /// Recompute a collection's `item_count` from its mints and store it.
    pub fn update_collection_item_count(&self, collection_id: &RecordId) -> Result<u64> {
        let rw = self.db.rw_transaction()?;
        let Some(count) = recount_rw(&rw, collection_id.as_str())? else {
            return Err(Error::NotFound(format!("collection {}", collection_id)));
        };
        rw.commit()?;
        debug!(collection = %collection_id, items = count, "item count recomputed");
        Ok(count)
    }
}

/// Mints of one collection, read through the `collection_id` index.
pub(crate) fn collection_mints_rw(
    rw: &transaction::RwTransaction<'_>,
    collection_id: &str,
) -> Result<Vec<StoredMint>> {
    let scan = rw
        .scan()
        .secondary::<StoredMint>(StoredMintKey::collection_id)?;
    let mints: std::result::Result<Vec<StoredMint>, _> = scan.start_with(collection_id)?.collect();
    Ok(mints?
        .into_iter()
        .filter(|m| m.collection_id == collection_id)
        .collect())
}

/// Collections of one owner, read through the `owner_address` index.
pub(crate) fn owner_collections_rw(
    rw: &transaction::RwTransaction<'_>,
    owner: &str,
) -> Result<Vec<StoredCollection>> {
    let scan = rw
        .scan()
        .secondary::<StoredCollection>(StoredCollectionKey::owner_address)?;
    let collections: std::result::Result<Vec<StoredCollection>, _> =
        scan.start_with(owner)?.collect();
    Ok(collections?
        .into_iter()
        .filter(|c| c.owner_address == owner)
        .collect())
}

/// Mints of one owner, read through the `owner_address` index.
pub(crate) fn owner_mints_rw(
    rw: &transaction::RwTransaction<'_>,
    owner: &str,
) -> Result<Vec<StoredMint>> {
    let scan = rw
        .scan()
        .secondary::<StoredMint>(StoredMintKey::owner_address)?;
    let mints: std::result::Result<Vec<StoredMint>, _> = scan.start_with(owner)?.collect();
    Ok(mints?
        .into_iter()
        .filter(|m| m.owner_address == owner)
        .collect())
}

/// Rewrite a collection's cached count inside an open transaction.
///
/// Returns `None` when the collection does not exist.
pub(crate) fn recount_rw(
    rw: &transaction::RwTransaction<'_>,
    collection_id: &str,
) -> Result<Option<u64>> {
    let stored: Option<StoredCollection> = rw.get().primary(collection_id)?;
    let Some(mut collection) = stored else {
        return Ok(None);
    };
    let count = collection_mints_rw(rw, collection_id)?.len() as u64;
    collection.item_count = count;
    let now = time::now();
    collection.updated_at = to_millis(&now);
    collection.updated_at_nanos = sub_millis_nanos(&now);
    rw.upsert(collection)?;
    Ok(Some(count))
}

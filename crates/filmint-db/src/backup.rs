//! Per-owner backup, restore and erasure.

use crate::error::{Error, Result};
use crate::models::*;
use crate::queries::{owner_collections, owner_mints, to_collections, to_mints};
use crate::store::{collection_mints_rw, owner_collections_rw, owner_mints_rw, recount_rw, Store};
use filmint_core::time::{self, from_millis_nanos, sub_millis_nanos, to_millis, Timestamp};
use filmint_core::{Address, UserData};
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::Path;
use tracing::{info, warn};

/// Snapshot file format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapshotFormat {
    /// RON format (Rust Object Notation)
    Ron,
    /// JSON format (requires serde_json feature)
    Json,
}

impl SnapshotFormat {
    /// Pick a format from a file extension, defaulting to RON.
    pub fn from_path(path: impl AsRef<Path>) -> Self {
        match path.as_ref().extension().and_then(|e| e.to_str()) {
            Some("json") => SnapshotFormat::Json,
            _ => SnapshotFormat::Ron,
        }
    }
}

/// What `clear_user_data` removed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Cleared {
    pub collections: usize,
    pub mints: usize,
}

impl Store {
    /// Snapshot every collection and mint owned by `owner`.
    ///
    /// Both partitions are read in one transaction, so the snapshot is
    /// consistent.
    pub fn export_user_data(&self, owner: &Address) -> Result<UserData> {
        let r = self.db.r_transaction()?;
        let collections = to_collections(owner_collections(&r, owner.as_str())?)?;
        let mints = to_mints(owner_mints(&r, owner.as_str())?)?;
        Ok(UserData {
            address: owner.clone(),
            collections,
            mints,
            last_updated: time::now(),
        })
    }

    /// Upsert every record of a snapshot in one transaction.
    ///
    /// Records missing from the snapshot are left alone. A mint whose
    /// collection is neither in the snapshot nor already stored aborts the
    /// whole import. Item counts of every touched collection are recomputed.
    pub fn import_user_data(&self, data: &UserData) -> Result<()> {
        let collections: Vec<StoredCollection> = data
            .collections
            .iter()
            .map(StoredCollection::from_collection)
            .collect();
        let mints = data
            .mints
            .iter()
            .map(StoredMint::from_mint)
            .collect::<Result<Vec<_>>>()?;
        let known: BTreeSet<&str> = collections.iter().map(|c| c.id.as_str()).collect();

        let rw = self.db.rw_transaction()?;
        let mut touched: BTreeSet<String> = known.iter().map(|id| id.to_string()).collect();
        for collection in collections.iter().cloned() {
            rw.upsert(collection)?;
        }
        for mint in mints {
            if !known.contains(mint.collection_id.as_str()) {
                let stored: Option<StoredCollection> = rw.get().primary(mint.collection_id.as_str())?;
                if stored.is_none() {
                    warn!(mint = %mint.id, collection = %mint.collection_id, "import rejected, unknown collection");
                    return Err(Error::InvalidReference(format!(
                        "snapshot mint {} references missing collection {}",
                        mint.id, mint.collection_id
                    )));
                }
            }
            let previous: Option<StoredMint> = rw.get().primary(mint.id.as_str())?;
            if let Some(previous) = previous {
                touched.insert(previous.collection_id);
            }
            touched.insert(mint.collection_id.clone());
            rw.upsert(mint)?;
        }
        for collection_id in &touched {
            recount_rw(&rw, collection_id)?;
        }
        rw.upsert(StoredUserData {
            address: data.address.as_str().to_string(),
            last_updated: to_millis(&data.last_updated),
            last_updated_nanos: sub_millis_nanos(&data.last_updated),
        })?;
        rw.commit()?;
        info!(
            owner = %data.address,
            collections = data.collections.len(),
            mints = data.mints.len(),
            "snapshot imported"
        );
        Ok(())
    }

    /// Delete every collection and mint owned by `owner`.
    ///
    /// Mints of the owner's collections go too, whoever owns them, so no
    /// orphan survives. Collections of other owners that lose a mint are
    /// recounted.
    pub fn clear_user_data(&self, owner: &Address) -> Result<Cleared> {
        let rw = self.db.rw_transaction()?;
        let collections = owner_collections_rw(&rw, owner.as_str())?;
        let owned: BTreeSet<String> = collections.iter().map(|c| c.id.clone()).collect();

        let mut mints: BTreeMap<String, StoredMint> = BTreeMap::new();
        for mint in owner_mints_rw(&rw, owner.as_str())? {
            mints.insert(mint.id.clone(), mint);
        }
        for collection_id in &owned {
            for mint in collection_mints_rw(&rw, collection_id)? {
                mints.insert(mint.id.clone(), mint);
            }
        }

        let cleared = Cleared {
            collections: collections.len(),
            mints: mints.len(),
        };
        let mut foreign: BTreeSet<String> = BTreeSet::new();
        for mint in mints.into_values() {
            if !owned.contains(&mint.collection_id) {
                foreign.insert(mint.collection_id.clone());
            }
            rw.remove(mint)?;
        }
        for collection in collections {
            rw.remove(collection)?;
        }
        for collection_id in &foreign {
            recount_rw(&rw, collection_id)?;
        }
        let user: Option<StoredUserData> = rw.get().primary(owner.as_str())?;
        if let Some(user) = user {
            rw.remove(user)?;
        }
        rw.commit()?;
        info!(
            owner = %owner,
            collections = cleared.collections,
            mints = cleared.mints,
            "user data cleared"
        );
        Ok(cleared)
    }

    /// `lastUpdated` of the most recent snapshot imported for `owner`.
    pub fn last_updated(&self, owner: &Address) -> Result<Option<Timestamp>> {
        let r = self.db.r_transaction()?;
        let user: Option<StoredUserData> = r.get().primary(owner.as_str())?;
        Ok(user.map(|u| from_millis_nanos(u.last_updated, u.last_updated_nanos)))
    }
}

/// Serialize a snapshot
pub fn snapshot_to_string(data: &UserData, format: SnapshotFormat) -> Result<String> {
    match format {
        SnapshotFormat::Ron => ron::ser::to_string_pretty(data, ron::ser::PrettyConfig::default())
            .map_err(|e| Error::Serialization(e.to_string())),
        SnapshotFormat::Json => to_json(data),
    }
}

/// Deserialize a snapshot
pub fn snapshot_from_str(content: &str, format: SnapshotFormat) -> Result<UserData> {
    match format {
        SnapshotFormat::Ron => {
            ron::from_str(content).map_err(|e| Error::Serialization(e.to_string()))
        }
        SnapshotFormat::Json => from_json(content),
    }
}

/// Write a snapshot file
pub fn write_snapshot(data: &UserData, path: impl AsRef<Path>, format: SnapshotFormat) -> Result<()> {
    let content = snapshot_to_string(data, format)?;
    fs::write(path, content)?;
    Ok(())
}

/// Read a snapshot file
pub fn read_snapshot(path: impl AsRef<Path>, format: SnapshotFormat) -> Result<UserData> {
    let content = fs::read_to_string(path)?;
    snapshot_from_str(&content, format)
}

#[cfg(feature = "serde_json")]
fn to_json(data: &UserData) -> Result<String> {
    serde_json::to_string_pretty(data).map_err(|e| Error::Serialization(e.to_string()))
}

#[cfg(not(feature = "serde_json"))]
fn to_json(_data: &UserData) -> Result<String> {
    Err(Error::Serialization(
        "JSON snapshots require the 'serde_json' feature".to_string(),
    ))
}

#[cfg(feature = "serde_json")]
fn from_json(content: &str) -> Result<UserData> {
    serde_json::from_str(content).map_err(|e| Error::Serialization(e.to_string()))
}

#[cfg(not(feature = "serde_json"))]
fn from_json(_content: &str) -> Result<UserData> {
    Err(Error::Serialization(
        "JSON snapshots require the 'serde_json' feature".to_string(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::tests::{collection, mint};
    use filmint_core::{Attribute, CollectionPatch, Mint, MintPatch, RecordId};

    fn by_id<T: filmint_core::Record + Clone>(records: &[T]) -> BTreeMap<RecordId, T> {
        records.iter().map(|r| (r.id().clone(), r.clone())).collect()
    }

    fn populated() -> (Store, Address) {
        let store = Store::in_memory().unwrap();
        let owner = Address::new("0xOwner");
        let a = collection("0xowner", "A");
        let b = collection("0xowner", "B");
        store.save_collection(&a).unwrap();
        store.save_collection(&b).unwrap();
        store
            .update_collection(&a.id, CollectionPatch::deployed("0xc1"))
            .unwrap();
        for i in 0..3 {
            let mut m = mint(&a, &i.to_string());
            m.attributes = vec![Attribute::new("Frame", i as f64)];
            store.add_mint(&m).unwrap();
        }
        let m = mint(&b, "solo");
        store.add_mint(&m).unwrap();
        store.update_mint(&m.id, MintPatch::minted("0xtx", "9")).unwrap();
        (store, owner)
    }

    #[test]
    fn test_export_import_round_trip() {
        let (store, owner) = populated();
        let snapshot = store.export_user_data(&owner).unwrap();
        assert_eq!(snapshot.collections.len(), 2);
        assert_eq!(snapshot.mints.len(), 4);

        let restored = Store::in_memory().unwrap();
        restored.import_user_data(&snapshot).unwrap();
        let again = restored.export_user_data(&owner).unwrap();

        assert_eq!(by_id(&again.mints), by_id(&snapshot.mints));
        let before = by_id(&snapshot.collections);
        for (id, c) in by_id(&again.collections) {
            let original = &before[&id];
            assert_eq!(c.name, original.name);
            assert_eq!(c.status, original.status);
            assert_eq!(c.item_count, original.item_count);
            assert_eq!(c.contract_address, original.contract_address);
            assert_eq!(c.created_at, original.created_at);
        }
        assert_eq!(
            restored.last_updated(&owner).unwrap(),
            Some(snapshot.last_updated)
        );
    }

    #[test]
    fn test_import_keeps_sub_millisecond_timestamps() {
        let (store, owner) = populated();
        let mut snapshot = store.export_user_data(&owner).unwrap();
        for c in &mut snapshot.collections {
            c.created_at += chrono::Duration::microseconds(250);
        }
        for m in &mut snapshot.mints {
            m.updated_at += chrono::Duration::microseconds(17);
        }
        snapshot.last_updated += chrono::Duration::microseconds(9);

        let restored = Store::in_memory().unwrap();
        restored.import_user_data(&snapshot).unwrap();
        let again = restored.export_user_data(&owner).unwrap();

        assert_eq!(by_id(&again.mints), by_id(&snapshot.mints));
        let before = by_id(&snapshot.collections);
        for (id, c) in by_id(&again.collections) {
            assert_eq!(c.created_at, before[&id].created_at);
        }
        assert_eq!(
            restored.last_updated(&owner).unwrap(),
            Some(snapshot.last_updated)
        );
    }

    #[test]
    fn test_import_keeps_unlisted_records() {
        let (store, owner) = populated();
        let extra = collection("0xowner", "Extra");
        store.save_collection(&extra).unwrap();

        let mut snapshot = store.export_user_data(&owner).unwrap();
        snapshot.collections.retain(|c| c.id != extra.id);
        store.import_user_data(&snapshot).unwrap();
        assert!(store.get_collection(&extra.id).unwrap().is_some());
    }

    #[test]
    fn test_import_rejects_dangling_mint_atomically() {
        let (store, owner) = populated();
        let mut snapshot = store.export_user_data(&owner).unwrap();
        let ghost = collection("0xowner", "Ghost");
        let dangling: Mint = mint(&ghost, "lost");
        snapshot.mints.push(dangling.clone());
        snapshot.collections[0].name = "Changed".to_string();

        let target = Store::in_memory().unwrap();
        let err = target.import_user_data(&snapshot).unwrap_err();
        assert!(matches!(err, Error::InvalidReference(_)));
        assert!(target.export_user_data(&owner).unwrap().collections.is_empty());
        assert_eq!(target.last_updated(&owner).unwrap(), None);
    }

    #[test]
    fn test_clear_user_data() {
        let (store, owner) = populated();
        let theirs = collection("0xother", "Theirs");
        store.save_collection(&theirs).unwrap();
        let mut gift = mint(&theirs, "gift");
        gift.owner_address = owner.clone();
        store.add_mint(&gift).unwrap();
        store.import_user_data(&store.export_user_data(&owner).unwrap()).unwrap();

        let cleared = store.clear_user_data(&owner).unwrap();
        assert_eq!(cleared, Cleared { collections: 2, mints: 5 });
        assert!(store.collections_by_owner(&owner).unwrap().is_empty());
        assert!(store.mints_by_owner(&owner).unwrap().is_empty());
        assert_eq!(store.last_updated(&owner).unwrap(), None);

        let theirs = store.get_collection(&theirs.id).unwrap().unwrap();
        assert_eq!(theirs.item_count, 0);
    }

    #[test]
    fn test_snapshot_files() {
        let (store, owner) = populated();
        let snapshot = store.export_user_data(&owner).unwrap();
        let dir = tempfile::tempdir().unwrap();

        let ron_path = dir.path().join("backup.ron");
        write_snapshot(&snapshot, &ron_path, SnapshotFormat::from_path(&ron_path)).unwrap();
        assert_eq!(read_snapshot(&ron_path, SnapshotFormat::Ron).unwrap(), snapshot);

        let json_path = dir.path().join("backup.json");
        assert_eq!(SnapshotFormat::from_path(&json_path), SnapshotFormat::Json);
        write_snapshot(&snapshot, &json_path, SnapshotFormat::Json).unwrap();
        let content = fs::read_to_string(&json_path).unwrap();
        assert!(content.contains("\"ownerAddress\": \"0xowner\""));
        assert_eq!(read_snapshot(&json_path, SnapshotFormat::Json).unwrap(), snapshot);
    }
}

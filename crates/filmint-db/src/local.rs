//! Async facade over [`Store`]
//!
//! The store handle is opened lazily on first use (or by an explicit
//! [`LocalDatabase::init`]) and shared afterwards. native_db calls block, so
//! each operation runs on tokio's blocking pool. Dropping a returned future
//! does not cancel the operation; it still runs to completion.

use crate::backup::Cleared;
use crate::config::StoreConfig;
use crate::error::{Error, Result};
use crate::store::Store;
use filmint_core::{
    Address, Collection, CollectionPatch, Mint, MintPatch, RecordId, Timestamp, UserData,
    UserStats,
};
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::debug;

/// Handle to the local record store, meant to be created once and injected
/// into every consumer.
pub struct LocalDatabase {
    config: StoreConfig,
    store: OnceCell<Arc<Store>>,
}

impl LocalDatabase {
    /// Create a handle; nothing is opened until first use
    pub fn new(config: StoreConfig) -> Self {
        Self {
            config,
            store: OnceCell::new(),
        }
    }

    /// Wrap an already opened store
    pub fn from_store(store: Store) -> Self {
        Self {
            config: StoreConfig::default(),
            store: OnceCell::new_with(Some(Arc::new(store))),
        }
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Open the backing store. Later calls reuse the same handle.
    pub async fn init(&self) -> Result<()> {
        self.handle().await.map(|_| ())
    }

    async fn handle(&self) -> Result<Arc<Store>> {
        let store = self
            .store
            .get_or_try_init(|| async {
                let config = self.config.clone();
                debug!(path = %config.database_path().display(), in_memory = config.in_memory, "opening record store");
                let store = tokio::task::spawn_blocking(move || Store::open_with(&config))
                    .await
                    .map_err(|e| Error::StorageUnavailable(format!("task join error: {}", e)))??;
                Ok::<_, Error>(Arc::new(store))
            })
            .await?;
        Ok(Arc::clone(store))
    }

    async fn run<T, F>(&self, op: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&Store) -> Result<T> + Send + 'static,
    {
        let store = self.handle().await?;
        tokio::task::spawn_blocking(move || op(&store))
            .await
            .map_err(|e| Error::TransactionFailed(format!("task join error: {}", e)))?
    }

    pub async fn save_collection(&self, collection: Collection) -> Result<()> {
        self.run(move |s| s.save_collection(&collection)).await
    }

    pub async fn get_collection(&self, id: RecordId) -> Result<Option<Collection>> {
        self.run(move |s| s.get_collection(&id)).await
    }

    pub async fn collections_by_owner(&self, owner: Address) -> Result<Vec<Collection>> {
        self.run(move |s| s.collections_by_owner(&owner)).await
    }

    /// Owner's collections, newest first
    pub async fn recent_collections_by_owner(&self, owner: Address) -> Result<Vec<Collection>> {
        self.run(move |s| s.recent_collections_by_owner(&owner)).await
    }

    pub async fn collections_by_contract(&self, contract: Address) -> Result<Vec<Collection>> {
        self.run(move |s| s.collections_by_contract(&contract)).await
    }

    pub async fn collections_created_between(
        &self,
        from: Timestamp,
        to: Timestamp,
    ) -> Result<Vec<Collection>> {
        self.run(move |s| s.collections_created_between(from, to)).await
    }

    pub async fn update_collection(
        &self,
        id: RecordId,
        patch: CollectionPatch,
    ) -> Result<Collection> {
        self.run(move |s| s.update_collection(&id, patch)).await
    }

    /// Delete a collection and its mints; returns the number of mints removed
    pub async fn delete_collection(&self, id: RecordId) -> Result<usize> {
        self.run(move |s| s.delete_collection(&id)).await
    }

    pub async fn save_mint(&self, mint: Mint) -> Result<()> {
        self.run(move |s| s.save_mint(&mint)).await
    }

    /// Save a mint into an existing collection and recount it
    pub async fn add_mint(&self, mint: Mint) -> Result<u64> {
        self.run(move |s| s.add_mint(&mint)).await
    }

    pub async fn get_mint(&self, id: RecordId) -> Result<Option<Mint>> {
        self.run(move |s| s.get_mint(&id)).await
    }

    pub async fn mints_by_collection(&self, collection_id: RecordId) -> Result<Vec<Mint>> {
        self.run(move |s| s.mints_by_collection(&collection_id)).await
    }

    pub async fn recent_mints_by_collection(&self, collection_id: RecordId) -> Result<Vec<Mint>> {
        self.run(move |s| s.recent_mints_by_collection(&collection_id))
            .await
    }

    pub async fn mints_by_owner(&self, owner: Address) -> Result<Vec<Mint>> {
        self.run(move |s| s.mints_by_owner(&owner)).await
    }

    pub async fn recent_mints_by_owner(&self, owner: Address) -> Result<Vec<Mint>> {
        self.run(move |s| s.recent_mints_by_owner(&owner)).await
    }

    pub async fn mints_by_token(&self, token_id: String) -> Result<Vec<Mint>> {
        self.run(move |s| s.mints_by_token(&token_id)).await
    }

    pub async fn update_mint(&self, id: RecordId, patch: MintPatch) -> Result<Mint> {
        self.run(move |s| s.update_mint(&id, patch)).await
    }

    pub async fn delete_mint(&self, id: RecordId) -> Result<()> {
        self.run(move |s| s.delete_mint(&id)).await
    }

    pub async fn update_collection_item_count(&self, collection_id: RecordId) -> Result<u64> {
        self.run(move |s| s.update_collection_item_count(&collection_id))
            .await
    }

    pub async fn user_stats(&self, owner: Address) -> Result<UserStats> {
        self.run(move |s| s.user_stats(&owner)).await
    }

    pub async fn export_user_data(&self, owner: Address) -> Result<UserData> {
        self.run(move |s| s.export_user_data(&owner)).await
    }

    pub async fn import_user_data(&self, data: UserData) -> Result<()> {
        self.run(move |s| s.import_user_data(&data)).await
    }

    pub async fn clear_user_data(&self, owner: Address) -> Result<Cleared> {
        self.run(move |s| s.clear_user_data(&owner)).await
    }

    pub async fn last_updated(&self, owner: Address) -> Result<Option<Timestamp>> {
        self.run(move |s| s.last_updated(&owner)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::tests::{collection, mint};
    use std::collections::BTreeSet;

    #[tokio::test]
    async fn test_init_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let db = LocalDatabase::new(StoreConfig::at(dir.path()));
        db.init().await.unwrap();
        let first = db.handle().await.unwrap();
        db.init().await.unwrap();
        let second = db.handle().await.unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert!(dir.path().join("filmint-nft-db.redb").exists());
    }

    #[tokio::test]
    async fn test_storage_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("not-a-dir");
        std::fs::write(&blocker, b"file").unwrap();

        let db = LocalDatabase::new(StoreConfig::at(blocker.join("data")));
        assert!(matches!(db.init().await, Err(Error::StorageUnavailable(_))));
        assert!(matches!(
            db.get_collection(RecordId::new("x")).await,
            Err(Error::StorageUnavailable(_))
        ));
    }

    #[tokio::test]
    async fn test_lazy_open_and_read_after_write() {
        let db = LocalDatabase::new(StoreConfig::in_memory());
        let c = collection("0xowner", "Stills");
        db.save_collection(c.clone()).await.unwrap();
        assert_eq!(db.get_collection(c.id.clone()).await.unwrap(), Some(c.clone()));

        let m = mint(&c, "1");
        assert_eq!(db.add_mint(m.clone()).await.unwrap(), 1);
        assert_eq!(db.mints_by_collection(c.id.clone()).await.unwrap(), vec![m]);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_concurrent_adds_keep_count_consistent() {
        let db = Arc::new(LocalDatabase::new(StoreConfig::in_memory()));
        let c = collection("0xowner", "Stills");
        db.save_collection(c.clone()).await.unwrap();

        let mut handles = Vec::new();
        for i in 0..16 {
            let db = Arc::clone(&db);
            let m = mint(&c, &i.to_string());
            handles.push(tokio::spawn(async move { db.add_mint(m).await }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let fetched = db.get_collection(c.id.clone()).await.unwrap().unwrap();
        assert_eq!(fetched.item_count, 16);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_concurrent_updates_last_writer_wins() {
        let db = Arc::new(LocalDatabase::new(StoreConfig::in_memory()));
        let c = collection("0xowner", "Stills");
        db.save_collection(c.clone()).await.unwrap();

        let names: BTreeSet<String> = (0..8).map(|i| format!("name-{}", i)).collect();
        let mut handles = Vec::new();
        for name in names.iter().cloned() {
            let db = Arc::clone(&db);
            let id = c.id.clone();
            handles.push(tokio::spawn(async move {
                db.update_collection(
                    id,
                    CollectionPatch {
                        name: Some(name),
                        ..Default::default()
                    },
                )
                .await
            }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let fetched = db.get_collection(c.id.clone()).await.unwrap().unwrap();
        assert!(names.contains(&fetched.name));
    }

    #[tokio::test]
    async fn test_cascade_through_facade() {
        let db = LocalDatabase::new(StoreConfig::in_memory());
        let c = collection("0xowner", "Stills");
        db.save_collection(c.clone()).await.unwrap();
        for i in 0..3 {
            db.add_mint(mint(&c, &i.to_string())).await.unwrap();
        }

        assert_eq!(db.delete_collection(c.id.clone()).await.unwrap(), 3);
        assert_eq!(db.get_collection(c.id.clone()).await.unwrap(), None);
        assert!(db.mints_by_collection(c.id.clone()).await.unwrap().is_empty());
        assert_eq!(
            db.user_stats(Address::new("0xowner")).await.unwrap(),
            UserStats::default()
        );
    }
}

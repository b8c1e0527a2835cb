//! Filmint DB - Local record store using native_db
//!
//! Provides persistent storage for:
//! - Collections, indexed by owner, contract address and creation time
//! - Mints, indexed by collection, owner, token id and creation time
//! - Per-owner bookkeeping for imported backups
//!
//! [`Store`] is the synchronous engine; [`LocalDatabase`] wraps it for
//! async callers and opens it lazily from a [`StoreConfig`].
//!
//! ```rust,ignore
//! use filmint_core::{Address, Collection, CollectionPatch, NewCollection};
//! use filmint_db::{LocalDatabase, StoreConfig};
//!
//! let db = LocalDatabase::new(StoreConfig::load("filmint.ron")?);
//! db.init().await?;
//!
//! let collection = Collection::new(NewCollection {
//!     name: "Film Stills".into(),
//!     owner_address: Address::new(wallet),
//!     ..Default::default()
//! });
//! db.save_collection(collection.clone()).await?;
//! db.update_collection(collection.id, CollectionPatch::deployed(contract)).await?;
//! ```

mod backup;
mod config;
mod error;
mod local;
mod models;
mod queries;
mod store;

pub use backup::{
    read_snapshot, snapshot_from_str, snapshot_to_string, write_snapshot, Cleared,
    SnapshotFormat,
};
pub use config::StoreConfig;
pub use error::{Error, Result};
pub use local::LocalDatabase;
pub use store::Store;

//! Database models for persistent storage.
//!
//! One native_db model per partition: `collections`, `mints` and
//! `userData`. Secondary keys back every owner, collection, contract,
//! token and creation-time lookup.

mod collection;
mod mint;
mod user;

pub use collection::*;
pub use mint::*;
pub use user::*;

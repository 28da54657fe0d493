//! SQLite persistence for field points.
//!
//! [`SqlitePointStore`] implements both the read and write seams of
//! `fieldroute-core`, so one store can back a
//! [`SequencingService`](fieldroute_core::SequencingService). Databases are
//! created with [`SqlitePointStore::create`] and filled with
//! [`import_points`].

#![forbid(unsafe_code)]

pub mod fs;
mod import;
mod schema;
mod store;

pub use import::{ImportPointsError, import_points};
pub use store::{SqlitePointStore, SqlitePointStoreError};

//! Facade crate for the fieldroute sequencing engine.
//!
//! This crate re-exports the core domain types and exposes the SQLite point
//! store behind the `store-sqlite` feature.

#![forbid(unsafe_code)]

pub use fieldroute_core::{
    Atomicity, BatchWriteError, CommittedResequence, FilterError, GroupKeys, OrderField,
    OrderWriter, Point, PointError, PointFilter, PointRepository, RepositoryError, Resequenced,
    RoutePlan, RouteStop, SequencingService, ServiceError, TourError, WritePlan, WriteReport,
    build_tour, haversine_km, resequence_from,
};

#[cfg(feature = "store-sqlite")]
pub use fieldroute_store::{
    ImportPointsError, SqlitePointStore, SqlitePointStoreError, import_points,
};

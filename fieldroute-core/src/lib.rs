//! Core sequencing engine for geolocated field points.
//!
//! The crate orders collection points with a greedy nearest-neighbour
//! heuristic over haversine distance and turns the resulting order into write
//! plans. Storage stays behind the [`PointRepository`] and [`OrderWriter`]
//! traits; [`SequencingService`] wires the two together for each request.
//!
//! Points are validated on construction, so the engines never see a missing
//! or out-of-range coordinate from a well-behaved repository.

#![forbid(unsafe_code)]

pub mod distance;
pub mod filter;
pub mod plan;
pub mod point;
pub mod repository;
pub mod resequence;
pub mod service;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
pub mod tour;
pub mod writer;

pub use distance::{DISTANCE_SENTINEL_KM, EARTH_RADIUS_KM, haversine_km, tour_length_km};
pub use filter::{FilterError, PointFilter};
pub use plan::{Assignment, OrderField, RouteStop, WritePlan, enumerate_stops};
pub use point::{GroupKeys, Point, PointError, is_valid_location};
pub use repository::{PointRepository, RepositoryError};
pub use resequence::{Resequenced, resequence_from};
pub use service::{
    CommittedResequence, RoutePlan, SequencingService, ServiceError, resolve_start_index,
};
pub use tour::{TourError, build_tour};
pub use writer::{Atomicity, BatchWriteError, OrderWriter, WriteFailure, WriteReport};

//! Fetch, compute and write for each sequencing request.
//!
//! [`SequencingService`] owns its repository and writer; there is no global
//! connection. Every operation validates the filter, reads the working set
//! fresh, and refuses to do anything with an empty set.

use thiserror::Error;

use crate::{
    BatchWriteError, FilterError, OrderWriter, Point, PointFilter, PointRepository,
    RepositoryError, Resequenced, RouteStop, TourError, WritePlan, WriteReport, build_tour,
    enumerate_stops, resequence_from, tour_length_km,
};

/// Errors returned by [`SequencingService`] operations.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// The filter failed validation; nothing was queried.
    #[error(transparent)]
    InvalidFilter(#[from] FilterError),
    /// Reading the working set failed.
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    /// The filter selected no points; nothing was computed or written.
    #[error("no points match the filter")]
    EmptyInput,
    /// Tour construction rejected its input.
    #[error(transparent)]
    Tour(#[from] TourError),
    /// Writing the plan failed part-way or entirely.
    #[error(transparent)]
    Persistence(#[from] BatchWriteError),
}

/// A computed visiting order that has not been written anywhere.
#[derive(Debug, Clone, PartialEq)]
pub struct RoutePlan {
    /// Points in visiting order with 1-based positions.
    pub stops: Vec<RouteStop>,
    /// Sum of the leg distances along the route.
    pub total_distance_km: f64,
}

/// A partial resequence together with the outcome of writing it.
#[derive(Debug, Clone, PartialEq)]
pub struct CommittedResequence {
    /// The order and numbering that the plan was built from.
    pub resequenced: Resequenced,
    /// Rows updated by the write.
    pub report: WriteReport,
}

/// Map a requested start index onto the working set.
///
/// Indices past the end restart the tour from the first point.
///
/// # Examples
/// ```
/// use fieldroute_core::resolve_start_index;
///
/// assert_eq!(resolve_start_index(2, 5), 2);
/// assert_eq!(resolve_start_index(5, 5), 0);
/// ```
#[must_use]
pub const fn resolve_start_index(requested: usize, len: usize) -> usize {
    if requested < len { requested } else { 0 }
}

/// Sequencing operations over a repository and a writer.
///
/// # Examples
/// ```
/// use fieldroute_core::{PointFilter, SequencingService, test_support::{MemoryPointStore, point}};
///
/// let store = MemoryPointStore::with_points([
///     point(1, 0.0, 0.0, 1),
///     point(2, 0.0, 1.0, 2),
///     point(3, 10.0, 10.0, 3),
///     point(4, 0.0, 2.0, 4),
/// ]);
/// let service = SequencingService::new(&store, &store);
/// let report = service.renumber(&PointFilter::default(), 0)?;
/// assert_eq!(report.updated, 4);
/// assert_eq!(store.number(4), Some(3));
/// # Ok::<(), fieldroute_core::ServiceError>(())
/// ```
#[derive(Debug, Clone)]
pub struct SequencingService<R, W> {
    repository: R,
    writer: W,
}

impl<R, W> SequencingService<R, W>
where
    R: PointRepository,
    W: OrderWriter,
{
    /// Build a service from its collaborators.
    #[must_use]
    pub const fn new(repository: R, writer: W) -> Self {
        Self { repository, writer }
    }

    /// Filtered points in ascending number order.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::InvalidFilter`], [`ServiceError::Repository`]
    /// or [`ServiceError::EmptyInput`].
    pub fn points(&self, filter: &PointFilter) -> Result<Vec<Point>, ServiceError> {
        filter.validate()?;
        let points = self.repository.fetch_points(filter)?;
        if points.is_empty() {
            log::info!("no points matched {filter:?}");
            return Err(ServiceError::EmptyInput);
        }
        Ok(points)
    }

    /// Compute a route without writing it.
    ///
    /// # Errors
    ///
    /// See [`SequencingService::points`].
    pub fn preview_route(
        &self,
        filter: &PointFilter,
        start_index: usize,
    ) -> Result<RoutePlan, ServiceError> {
        let tour = self.tour(filter, start_index)?;
        let total_distance_km = tour_length_km(tour.iter().map(|point| point.location));
        Ok(RoutePlan {
            stops: enumerate_stops(tour),
            total_distance_km,
        })
    }

    /// Store the route as the advisory display order, leaving numbers alone.
    ///
    /// # Errors
    ///
    /// See [`SequencingService::points`]; write failures surface as
    /// [`ServiceError::Persistence`].
    pub fn update_display_order(
        &self,
        filter: &PointFilter,
        start_index: usize,
    ) -> Result<WriteReport, ServiceError> {
        let tour = self.tour(filter, start_index)?;
        self.write(&WritePlan::display_order(&tour))
    }

    /// Overwrite sequence numbers with `1..=N` in route order.
    ///
    /// # Errors
    ///
    /// See [`SequencingService::update_display_order`].
    pub fn renumber(
        &self,
        filter: &PointFilter,
        start_index: usize,
    ) -> Result<WriteReport, ServiceError> {
        let tour = self.tour(filter, start_index)?;
        self.write(&WritePlan::renumber(&tour))
    }

    /// Re-order points numbered at or above `threshold` without writing.
    ///
    /// # Errors
    ///
    /// See [`SequencingService::points`].
    pub fn preview_resequence(
        &self,
        filter: &PointFilter,
        threshold: u32,
    ) -> Result<Resequenced, ServiceError> {
        let points = self.points(filter)?;
        Ok(resequence_from(points, threshold))
    }

    /// Renumber points at or above `threshold` in new route order.
    ///
    /// Points below the threshold are never written. When every point is
    /// below it the writer is not called and zero updates are reported.
    ///
    /// # Errors
    ///
    /// See [`SequencingService::update_display_order`].
    pub fn renumber_from(
        &self,
        filter: &PointFilter,
        threshold: u32,
    ) -> Result<WriteReport, ServiceError> {
        self.commit_resequence(filter, threshold)
            .map(|committed| committed.report)
    }

    /// Like [`SequencingService::renumber_from`], but also returns the
    /// resequencing that was written, computed from the same read.
    ///
    /// # Errors
    ///
    /// See [`SequencingService::update_display_order`].
    pub fn commit_resequence(
        &self,
        filter: &PointFilter,
        threshold: u32,
    ) -> Result<CommittedResequence, ServiceError> {
        let resequenced = self.preview_resequence(filter, threshold)?;
        let plan = WritePlan::renumber_from(&resequenced);
        let report = if plan.is_empty() {
            log::info!(
                "every point is numbered below {}; nothing to renumber",
                resequenced.threshold()
            );
            WriteReport {
                field: plan.field(),
                updated: 0,
            }
        } else {
            self.write(&plan)?
        };
        Ok(CommittedResequence {
            resequenced,
            report,
        })
    }

    fn tour(&self, filter: &PointFilter, start_index: usize) -> Result<Vec<Point>, ServiceError> {
        let points = self.points(filter)?;
        let start = resolve_start_index(start_index, points.len());
        if start != start_index {
            log::debug!(
                "start index {start_index} out of range for {} points; starting at 0",
                points.len()
            );
        }
        Ok(build_tour(points, start)?)
    }

    fn write(&self, plan: &WritePlan) -> Result<WriteReport, ServiceError> {
        let report = self.writer.apply(plan)?;
        log::info!("updated {} of {} {} rows", report.updated, plan.len(), plan.field());
        Ok(report)
    }
}

//! Read access to persisted points.

use std::error::Error as StdError;

use thiserror::Error;

use crate::{Point, PointFilter};

/// Errors from [`PointRepository::fetch_points`].
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// The backing store failed to run the query.
    #[error("failed to query points: {source}")]
    Query {
        /// Backend error.
        #[source]
        source: Box<dyn StdError + Send + Sync>,
    },
}

impl RepositoryError {
    /// Wrap a backend error as a query failure.
    pub fn query(source: impl Into<Box<dyn StdError + Send + Sync>>) -> Self {
        Self::Query {
            source: source.into(),
        }
    }
}

/// Supplies the working set of points for a request.
///
/// Implementations must return only active points with valid coordinates
/// that match `filter`, sorted ascending by sequence number (then identity).
/// Points are read fresh on every call.
///
/// # Examples
///
/// ```rust
/// use fieldroute_core::{Point, PointFilter, PointRepository, RepositoryError};
/// use fieldroute_core::test_support::point;
///
/// struct Fixed(Vec<Point>);
///
/// impl PointRepository for Fixed {
///     fn fetch_points(&self, filter: &PointFilter) -> Result<Vec<Point>, RepositoryError> {
///         let mut points: Vec<Point> =
///             self.0.iter().filter(|p| filter.matches(p)).cloned().collect();
///         points.sort_by_key(|p| (p.number, p.id));
///         Ok(points)
///     }
/// }
///
/// let repo = Fixed(vec![point(2, 0.0, 1.0, 2), point(1, 0.0, 0.0, 1)]);
/// let found = repo.fetch_points(&PointFilter::default())?;
/// assert_eq!(found.first().map(|p| p.id), Some(1));
/// # Ok::<(), RepositoryError>(())
/// ```
pub trait PointRepository {
    /// Return the points selected by `filter`, ascending by number.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError`] when the backing store cannot be read.
    fn fetch_points(&self, filter: &PointFilter) -> Result<Vec<Point>, RepositoryError>;
}

impl<T: PointRepository + ?Sized> PointRepository for &T {
    fn fetch_points(&self, filter: &PointFilter) -> Result<Vec<Point>, RepositoryError> {
        (**self).fetch_points(filter)
    }
}

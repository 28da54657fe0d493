//! Greedy nearest-neighbour tour construction.
//!
//! The engine places the start point first, then repeatedly moves the closest
//! unplaced point (by [`haversine_km`]) to the end of the tour. It never
//! improves the result afterwards; the output is a visiting order, not an
//! optimal tour.

use geo::Coord;
use thiserror::Error;

use crate::{Point, haversine_km};

/// Errors returned by [`build_tour`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TourError {
    /// No points were supplied.
    #[error("cannot build a tour from an empty point set")]
    EmptyInput,
    /// The start index does not address a point in the input.
    #[error("start index {start} is out of range for {len} points")]
    StartOutOfRange {
        /// Requested start index.
        start: usize,
        /// Number of points supplied.
        len: usize,
    },
}

/// Order `points` by greedy nearest neighbour, beginning at `start_index`.
///
/// The output is a permutation of the input whose first element is
/// `points[start_index]`. Each following point is the nearest of the points
/// not yet placed; ties go to the candidate met first while scanning the
/// remaining pool, which keeps the result deterministic.
///
/// The caller owns start-index policy: the engine does not clamp.
///
/// # Errors
///
/// Returns [`TourError::EmptyInput`] for an empty input and
/// [`TourError::StartOutOfRange`] when `start_index >= points.len()`.
///
/// # Examples
/// ```
/// use fieldroute_core::{build_tour, test_support::point};
///
/// let points = vec![
///     point(1, 0.0, 0.0, 1),
///     point(2, 0.0, 1.0, 2),
///     point(3, 10.0, 10.0, 3),
///     point(4, 0.0, 2.0, 4),
/// ];
/// let tour = build_tour(points, 0)?;
/// let ids: Vec<u64> = tour.iter().map(|p| p.id).collect();
/// assert_eq!(ids, vec![1, 2, 4, 3]);
/// # Ok::<(), fieldroute_core::TourError>(())
/// ```
pub fn build_tour(points: Vec<Point>, start_index: usize) -> Result<Vec<Point>, TourError> {
    if points.is_empty() {
        return Err(TourError::EmptyInput);
    }
    if start_index >= points.len() {
        return Err(TourError::StartOutOfRange {
            start: start_index,
            len: points.len(),
        });
    }
    Ok(order_from(points, start_index))
}

/// Nearest-neighbour ordering for inputs already known to be valid.
///
/// An out-of-range `start_index` returns the pool unchanged so the output
/// always holds every input point exactly once.
pub(crate) fn order_from(mut pool: Vec<Point>, start_index: usize) -> Vec<Point> {
    if start_index >= pool.len() {
        return pool;
    }
    let mut tour = Vec::with_capacity(pool.len());
    let first = pool.remove(start_index);
    let mut current = first.location;
    tour.push(first);

    while !pool.is_empty() {
        let Some(next) = nearest_in_pool(current, &pool) else {
            log::warn!(
                "no nearest candidate from ({}, {}); appending {} remaining points in pool order",
                current.y,
                current.x,
                pool.len()
            );
            tour.append(&mut pool);
            break;
        };
        // `remove` (not `swap_remove`) keeps pool order for later tie-breaks.
        let chosen = pool.remove(next);
        current = chosen.location;
        tour.push(chosen);
    }
    tour
}

/// Index of the closest candidate to `from`, first-encountered on ties.
///
/// Returns `None` when no candidate has a distance below infinity.
fn nearest_in_pool(from: Coord<f64>, pool: &[Point]) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (index, candidate) in pool.iter().enumerate() {
        let distance = haversine_km(from, candidate.location);
        let threshold = best.map_or(f64::INFINITY, |(_, best_distance)| best_distance);
        if distance < threshold {
            best = Some((index, distance));
        }
    }
    best.map(|(index, _)| index)
}

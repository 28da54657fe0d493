//! Partial resequencing behind a frozen prefix.
//!
//! Points numbered below the threshold have already been walked in a fixed
//! order and stay where they are. Only the suffix is re-optimised.

use crate::{Point, plan::numbering_from, tour::order_from};

/// Outcome of [`resequence_from`]: the frozen prefix and the re-ordered suffix.
#[derive(Debug, Clone, PartialEq)]
pub struct Resequenced {
    threshold: u32,
    frozen: Vec<Point>,
    tour: Vec<Point>,
}

impl Resequenced {
    /// Number at which re-optimised points start.
    #[must_use]
    pub const fn threshold(&self) -> u32 {
        self.threshold
    }

    /// Points numbered below the threshold, in input order.
    #[must_use]
    pub fn frozen(&self) -> &[Point] {
        &self.frozen
    }

    /// Points at or above the threshold, in new visiting order.
    #[must_use]
    pub fn tour(&self) -> &[Point] {
        &self.tour
    }

    /// Full display order: the frozen prefix followed by the tour.
    pub fn ordered(&self) -> impl Iterator<Item = &Point> {
        self.frozen.iter().chain(&self.tour)
    }

    /// Full display order with renumbering applied.
    ///
    /// Frozen points keep their numbers; tour points are numbered
    /// `threshold, threshold + 1, …` in visiting order. Tour points past
    /// `u32::MAX` keep their stored numbers.
    #[must_use]
    pub fn renumbered(&self) -> Vec<Point> {
        let tour = self
            .tour
            .iter()
            .zip(numbering_from(self.threshold))
            .map(|(point, number)| {
                number.map_or_else(|| point.clone(), |value| point.renumbered(value))
            });
        self.frozen.iter().cloned().chain(tour).collect()
    }

    /// Total number of points, frozen and re-ordered.
    #[must_use]
    pub fn len(&self) -> usize {
        self.frozen.len() + self.tour.len()
    }

    /// Whether the input held no points at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.frozen.is_empty() && self.tour.is_empty()
    }
}

/// Re-optimise the points numbered at or above `threshold`.
///
/// `points` are expected in ascending number order, as a repository returns
/// them. Points with `number < threshold` are frozen in their input order.
/// The rest are toured by nearest neighbour starting from the one with the
/// lowest current number (the first such point on ties).
///
/// A threshold of one or less freezes nothing (zero is treated as one, since
/// numbers start at one); a threshold above every number freezes everything
/// and leaves the tour empty.
///
/// # Examples
/// ```
/// use fieldroute_core::{resequence_from, test_support::point};
///
/// let points = vec![
///     point(1, 0.0, 0.0, 1),
///     point(2, 0.0, 1.0, 2),
///     point(3, 10.0, 10.0, 3),
///     point(4, 0.0, 2.0, 4),
/// ];
/// let result = resequence_from(points, 3);
/// let numbers: Vec<(u64, u32)> = result
///     .renumbered()
///     .iter()
///     .map(|p| (p.id, p.number))
///     .collect();
/// assert_eq!(numbers, vec![(1, 1), (2, 2), (3, 3), (4, 4)]);
/// ```
#[must_use]
pub fn resequence_from(points: Vec<Point>, threshold: u32) -> Resequenced {
    let first_number = threshold.max(1);
    let (frozen, mutable): (Vec<Point>, Vec<Point>) = points
        .into_iter()
        .partition(|point| point.number < first_number);
    let tour = match lowest_number_index(&mutable) {
        Some(seed) => order_from(mutable, seed),
        None => mutable,
    };
    log::debug!(
        "resequenced from {first_number}: {} frozen, {} re-ordered",
        frozen.len(),
        tour.len()
    );
    Resequenced {
        threshold: first_number,
        frozen,
        tour,
    }
}

fn lowest_number_index(points: &[Point]) -> Option<usize> {
    points
        .iter()
        .enumerate()
        .min_by_key(|(index, point)| (point.number, *index))
        .map(|(index, _)| index)
}

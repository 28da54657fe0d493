//! Materialise a visiting order into per-point write assignments.
//!
//! A [`WritePlan`] targets exactly one [`OrderField`]. The advisory display
//! order and the authoritative number are never written by the same plan.

use std::{fmt, iter};

use crate::{Point, Resequenced};

/// Persisted field a [`WritePlan`] updates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OrderField {
    /// Advisory ordinal used to preview a tour; the sequence number is untouched.
    DisplayOrder,
    /// Authoritative sequence number.
    Number,
}

impl OrderField {
    /// Stable lowercase name, used in logs and reports.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::DisplayOrder => "display_order",
            Self::Number => "number",
        }
    }
}

impl fmt::Display for OrderField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// New value for one point, matched by identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Assignment {
    /// Identity of the point to update.
    pub point_id: u64,
    /// Value to store in the plan's field.
    pub value: u32,
}

/// Ordered assignments for a single [`OrderField`].
///
/// # Examples
/// ```
/// use fieldroute_core::{OrderField, WritePlan, test_support::point};
///
/// let tour = vec![point(7, 0.0, 0.0, 3), point(5, 0.0, 1.0, 1)];
/// let plan = WritePlan::renumber(&tour);
/// assert_eq!(plan.field(), OrderField::Number);
/// let values: Vec<(u64, u32)> = plan
///     .assignments()
///     .iter()
///     .map(|a| (a.point_id, a.value))
///     .collect();
/// assert_eq!(values, vec![(7, 1), (5, 2)]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WritePlan {
    field: OrderField,
    assignments: Vec<Assignment>,
}

impl WritePlan {
    /// Display order `1..=N` over `ordered`.
    #[must_use]
    pub fn display_order<'a, I>(ordered: I) -> Self
    where
        I: IntoIterator<Item = &'a Point>,
    {
        Self::enumerate(OrderField::DisplayOrder, ordered, 1)
    }

    /// Authoritative numbers `1..=N` over `ordered`.
    #[must_use]
    pub fn renumber<'a, I>(ordered: I) -> Self
    where
        I: IntoIterator<Item = &'a Point>,
    {
        Self::enumerate(OrderField::Number, ordered, 1)
    }

    /// Authoritative numbers for the re-ordered suffix of a partial resequence.
    ///
    /// Tour points are numbered from the threshold upwards; frozen points keep
    /// their numbers and get no assignment.
    #[must_use]
    pub fn renumber_from(resequenced: &Resequenced) -> Self {
        Self::enumerate(
            OrderField::Number,
            resequenced.tour(),
            resequenced.threshold(),
        )
    }

    fn enumerate<'a, I>(field: OrderField, ordered: I, first: u32) -> Self
    where
        I: IntoIterator<Item = &'a Point>,
    {
        let mut unnumbered = 0_usize;
        let assignments = ordered
            .into_iter()
            .zip(numbering_from(first))
            .filter_map(|(point, number)| {
                let Some(value) = number else {
                    unnumbered += 1;
                    return None;
                };
                Some(Assignment {
                    point_id: point.id,
                    value,
                })
            })
            .collect();
        if unnumbered > 0 {
            log::warn!(
                "{field} values run out at {}; {unnumbered} points left unassigned",
                u32::MAX
            );
        }
        Self { field, assignments }
    }

    /// Field every assignment targets.
    #[must_use]
    pub const fn field(&self) -> OrderField {
        self.field
    }

    /// Assignments in write order.
    #[must_use]
    pub fn assignments(&self) -> &[Assignment] {
        &self.assignments
    }

    /// Number of rows the plan touches.
    #[must_use]
    pub fn len(&self) -> usize {
        self.assignments.len()
    }

    /// Whether the plan writes nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.assignments.is_empty()
    }
}

/// A point together with its 1-based position in a visiting order.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteStop {
    /// Position in the route, starting at one.
    pub order: u32,
    /// The visited point, with its stored number unchanged.
    pub point: Point,
}

/// Pair each point of `ordered` with its 1-based position.
#[must_use]
pub fn enumerate_stops(ordered: Vec<Point>) -> Vec<RouteStop> {
    ordered
        .into_iter()
        .zip(numbering_from(1))
        .map(|(point, order)| RouteStop {
            order: order.unwrap_or(u32::MAX),
            point,
        })
        .collect()
}

/// Consecutive numbers starting at `first`, then `None` forever once
/// `u32::MAX` has been handed out.
pub(crate) fn numbering_from(first: u32) -> impl Iterator<Item = Option<u32>> {
    (first..=u32::MAX).map(Some).chain(iter::repeat(None))
}

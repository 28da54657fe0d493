//! In-memory repository and writer used by unit, behaviour and doc tests.
//!
//! Available under `cfg(test)` and the `test-support` feature.

use std::cell::{Cell, RefCell};

use geo::Coord;

use crate::{
    Atomicity, BatchWriteError, GroupKeys, OrderField, OrderWriter, Point, PointFilter,
    PointRepository, RepositoryError, WriteFailure, WritePlan, WriteReport, is_valid_location,
};

/// Build a point in group `EST / DIV1 / BLK001` without validation.
///
/// Arguments follow the order used in field sheets: identity, latitude,
/// longitude, sequence number.
#[must_use]
pub fn point(id: u64, lat: f64, lon: f64, number: u32) -> Point {
    Point {
        id,
        number,
        group: GroupKeys::new("EST", "DIV1", "BLK001"),
        location: Coord { x: lon, y: lat },
        label: None,
    }
}

#[derive(Debug, Clone, PartialEq)]
struct Row {
    point: Point,
    active: bool,
    display_order: Option<u32>,
}

/// Linear-scan point store implementing both [`PointRepository`] and
/// [`OrderWriter`].
///
/// Failures can be injected with [`MemoryPointStore::failing_after`].
#[derive(Debug, Default)]
pub struct MemoryPointStore {
    rows: RefCell<Vec<Row>>,
    writes: Cell<usize>,
    fail_after: Option<usize>,
    atomicity: Atomicity,
}

impl MemoryPointStore {
    /// Create a store holding active `points`.
    pub fn with_points<I>(points: I) -> Self
    where
        I: IntoIterator<Item = Point>,
    {
        let rows = points
            .into_iter()
            .map(|point| Row {
                point,
                active: true,
                display_order: None,
            })
            .collect();
        Self {
            rows: RefCell::new(rows),
            ..Self::default()
        }
    }

    /// Add an inactive point that repositories must never return.
    #[must_use]
    pub fn with_inactive(self, point: Point) -> Self {
        self.rows.borrow_mut().push(Row {
            point,
            active: false,
            display_order: None,
        });
        self
    }

    /// Fail every row write after `successes` rows have been written.
    #[must_use]
    pub const fn failing_after(mut self, successes: usize) -> Self {
        self.fail_after = Some(successes);
        self
    }

    /// Choose the failure semantics of [`OrderWriter::apply`].
    #[must_use]
    pub const fn with_atomicity(mut self, atomicity: Atomicity) -> Self {
        self.atomicity = atomicity;
        self
    }

    /// Stored sequence number of `id`.
    #[must_use]
    pub fn number(&self, id: u64) -> Option<u32> {
        self.find(id, |row| Some(row.point.number))
    }

    /// Stored display order of `id`.
    #[must_use]
    pub fn display_order(&self, id: u64) -> Option<u32> {
        self.find(id, |row| row.display_order)
    }

    /// Rows written successfully and not rolled back.
    #[must_use]
    pub fn write_count(&self) -> usize {
        self.writes.get()
    }

    /// Every stored point in insertion order, active or not.
    #[must_use]
    pub fn points(&self) -> Vec<Point> {
        self.rows
            .borrow()
            .iter()
            .map(|row| row.point.clone())
            .collect()
    }

    fn find<T>(&self, id: u64, read: impl Fn(&Row) -> Option<T>) -> Option<T> {
        self.rows
            .borrow()
            .iter()
            .find(|row| row.point.id == id)
            .and_then(read)
    }

    fn write_row(&self, field: OrderField, id: u64, value: u32) -> Result<(), WriteFailure> {
        if self.fail_after.is_some_and(|limit| self.writes.get() >= limit) {
            return Err(WriteFailure::backend("injected write failure"));
        }
        let mut rows = self.rows.borrow_mut();
        let row = rows
            .iter_mut()
            .find(|row| row.point.id == id)
            .ok_or(WriteFailure::MissingRow)?;
        match field {
            OrderField::DisplayOrder => row.display_order = Some(value),
            OrderField::Number => row.point.number = value,
        }
        self.writes.set(self.writes.get() + 1);
        Ok(())
    }
}

impl PointRepository for MemoryPointStore {
    fn fetch_points(&self, filter: &PointFilter) -> Result<Vec<Point>, RepositoryError> {
        let mut points: Vec<Point> = self
            .rows
            .borrow()
            .iter()
            .filter(|row| row.active && is_valid_location(row.point.location))
            .map(|row| &row.point)
            .filter(|point| filter.matches(point))
            .cloned()
            .collect();
        points.sort_by_key(|point| (point.number, point.id));
        Ok(points)
    }
}

impl OrderWriter for MemoryPointStore {
    fn atomicity(&self) -> Atomicity {
        self.atomicity
    }

    fn apply(&self, plan: &WritePlan) -> Result<WriteReport, BatchWriteError> {
        let snapshot = (self.rows.borrow().clone(), self.writes.get());
        let total = plan.len();
        for (applied, assignment) in plan.assignments().iter().enumerate() {
            if let Err(source) = self.write_row(plan.field(), assignment.point_id, assignment.value)
            {
                let err = BatchWriteError::Row {
                    field: plan.field(),
                    point_id: assignment.point_id,
                    applied,
                    total,
                    source,
                };
                return Err(match self.atomicity {
                    Atomicity::BestEffort => err,
                    Atomicity::AllOrNothing => {
                        let (rows, writes) = snapshot;
                        *self.rows.borrow_mut() = rows;
                        self.writes.set(writes);
                        err.rolled_back()
                    }
                });
            }
        }
        Ok(WriteReport {
            field: plan.field(),
            updated: total,
        })
    }
}

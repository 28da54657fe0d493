//! Group filters used to select the working set for a request.

use thiserror::Error;

use crate::Point;

const MAX_DEPARTMENT_LEN: usize = 10;
const MAX_DIVISION_LEN: usize = 10;
const MAX_BLOCK_LEN: usize = 15;

/// Selects points by their grouping keys.
///
/// `department` must match exactly. `division` and `block` match when the
/// stored key contains the filter value, ignoring ASCII case. Unset (or empty)
/// fields match everything.
///
/// # Examples
/// ```
/// use fieldroute_core::PointFilter;
///
/// let filter = PointFilter::default()
///     .with_department("EST")
///     .with_block("BLK00");
/// assert!(filter.validate().is_ok());
/// assert_eq!(filter.division(), None);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PointFilter {
    department: Option<String>,
    division: Option<String>,
    block: Option<String>,
}

/// Filter values rejected by [`PointFilter::validate`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FilterError {
    /// Departments are short alphanumeric codes.
    #[error("invalid department filter {value:?}")]
    Department {
        /// Rejected value.
        value: String,
    },
    /// Divisions are short alphanumeric codes that may contain `_`.
    #[error("invalid division filter {value:?}")]
    Division {
        /// Rejected value.
        value: String,
    },
    /// Blocks are alphanumeric codes that may contain `_` or `-`.
    #[error("invalid block filter {value:?}")]
    Block {
        /// Rejected value.
        value: String,
    },
}

impl PointFilter {
    /// Build a filter from optional components, treating empty strings as unset.
    #[must_use]
    pub fn new(
        department: Option<String>,
        division: Option<String>,
        block: Option<String>,
    ) -> Self {
        Self {
            department: department.filter(|value| !value.is_empty()),
            division: division.filter(|value| !value.is_empty()),
            block: block.filter(|value| !value.is_empty()),
        }
    }

    /// Restrict to a single department.
    #[must_use]
    pub fn with_department(self, department: impl Into<String>) -> Self {
        Self::new(Some(department.into()), self.division, self.block)
    }

    /// Restrict to divisions containing `division`.
    #[must_use]
    pub fn with_division(self, division: impl Into<String>) -> Self {
        Self::new(self.department, Some(division.into()), self.block)
    }

    /// Restrict to blocks containing `block`.
    #[must_use]
    pub fn with_block(self, block: impl Into<String>) -> Self {
        Self::new(self.department, self.division, Some(block.into()))
    }

    /// Department filter, if any.
    #[must_use]
    pub fn department(&self) -> Option<&str> {
        self.department.as_deref()
    }

    /// Division filter, if any.
    #[must_use]
    pub fn division(&self) -> Option<&str> {
        self.division.as_deref()
    }

    /// Block filter, if any.
    #[must_use]
    pub fn block(&self) -> Option<&str> {
        self.block.as_deref()
    }

    /// Check the filter values against the accepted code formats.
    ///
    /// # Errors
    ///
    /// Returns the first [`FilterError`] found, checking department, division
    /// and block in that order.
    pub fn validate(&self) -> Result<(), FilterError> {
        if let Some(value) = self.department()
            && !is_code(value, MAX_DEPARTMENT_LEN, &[])
        {
            return Err(FilterError::Department {
                value: value.to_owned(),
            });
        }
        if let Some(value) = self.division()
            && !is_code(value, MAX_DIVISION_LEN, &['_'])
        {
            return Err(FilterError::Division {
                value: value.to_owned(),
            });
        }
        if let Some(value) = self.block()
            && !is_code(value, MAX_BLOCK_LEN, &['_', '-'])
        {
            return Err(FilterError::Block {
                value: value.to_owned(),
            });
        }
        Ok(())
    }

    /// Return whether `point` belongs to the filtered groups.
    #[must_use]
    pub fn matches(&self, point: &Point) -> bool {
        self.department()
            .is_none_or(|department| point.group.department == department)
            && self
                .division()
                .is_none_or(|division| contains_ignore_case(&point.group.division, division))
            && self
                .block()
                .is_none_or(|block| contains_ignore_case(&point.group.block, block))
    }
}

fn is_code(value: &str, max_len: usize, extra: &[char]) -> bool {
    value.chars().count() <= max_len
        && value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || extra.contains(&c))
}

fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack
        .to_ascii_lowercase()
        .contains(&needle.to_ascii_lowercase())
}

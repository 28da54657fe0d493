//! Apply write plans to persistent storage.
//!
//! Writers declare an [`Atomicity`] so callers know what a failure leaves
//! behind. With [`Atomicity::BestEffort`] rows are applied one at a time and a
//! failure keeps every row written before it; [`BatchWriteError::applied`]
//! reports how many. With [`Atomicity::AllOrNothing`] a failure leaves storage
//! as it was.

use std::error::Error as StdError;

use thiserror::Error;

use crate::{OrderField, WritePlan};

/// How much of a plan survives a failed write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Atomicity {
    /// Rows are applied sequentially without a transaction.
    #[default]
    BestEffort,
    /// Rows are applied in one transaction and rolled back on failure.
    AllOrNothing,
}

/// Summary of a successfully applied plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WriteReport {
    /// Field the plan updated.
    pub field: OrderField,
    /// Number of rows updated.
    pub updated: usize,
}

/// Why a single row could not be written.
#[derive(Debug, Error)]
pub enum WriteFailure {
    /// No stored row has the point's identity.
    #[error("no stored row matches the point")]
    MissingRow,
    /// The storage backend rejected the update.
    #[error(transparent)]
    Backend(Box<dyn StdError + Send + Sync>),
}

impl WriteFailure {
    /// Wrap a backend error.
    pub fn backend(source: impl Into<Box<dyn StdError + Send + Sync>>) -> Self {
        Self::Backend(source.into())
    }
}

/// A plan that was not fully applied.
#[derive(Debug, Error)]
pub enum BatchWriteError {
    /// Writing one row failed.
    #[error("failed to write {field} for point {point_id} after {applied} of {total} rows")]
    Row {
        /// Field being written.
        field: OrderField,
        /// Identity of the row that failed.
        point_id: u64,
        /// Rows that remain written.
        applied: usize,
        /// Rows in the plan.
        total: usize,
        /// Row failure.
        #[source]
        source: WriteFailure,
    },
    /// Starting, preparing or committing the batch failed; nothing was written.
    #[error("failed to run {field} batch of {total} rows")]
    Batch {
        /// Field being written.
        field: OrderField,
        /// Rows in the plan.
        total: usize,
        /// Backend error.
        #[source]
        source: Box<dyn StdError + Send + Sync>,
    },
}

impl BatchWriteError {
    /// Rows that remain written after the failure.
    #[must_use]
    pub const fn applied(&self) -> usize {
        match self {
            Self::Row { applied, .. } => *applied,
            Self::Batch { .. } => 0,
        }
    }

    /// Mark a row failure as rolled back, so no rows remain written.
    #[must_use]
    pub fn rolled_back(self) -> Self {
        match self {
            Self::Row {
                field,
                point_id,
                total,
                source,
                ..
            } => Self::Row {
                field,
                point_id,
                applied: 0,
                total,
                source,
            },
            batch @ Self::Batch { .. } => batch,
        }
    }
}

/// Applies [`WritePlan`]s to storage, matching rows by point identity.
///
/// A plan row whose identity is missing from storage is a failure
/// ([`WriteFailure::MissingRow`]), never a silent skip. Writers do not retry.
pub trait OrderWriter {
    /// Failure semantics of [`OrderWriter::apply`].
    fn atomicity(&self) -> Atomicity;

    /// Write every assignment of `plan` in order.
    ///
    /// # Errors
    ///
    /// Returns [`BatchWriteError`] describing the failing row and how many
    /// rows remain written, per [`OrderWriter::atomicity`].
    fn apply(&self, plan: &WritePlan) -> Result<WriteReport, BatchWriteError>;
}

impl<T: OrderWriter + ?Sized> OrderWriter for &T {
    fn atomicity(&self) -> Atomicity {
        (**self).atomicity()
    }

    fn apply(&self, plan: &WritePlan) -> Result<WriteReport, BatchWriteError> {
        (**self).apply(plan)
    }
}

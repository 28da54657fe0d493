//! Bulk loading of points into a SQLite database.

use camino::{Utf8Path, Utf8PathBuf};
use fieldroute_core::Point;
use rusqlite::{Connection, Error as SqliteError, Transaction};
use thiserror::Error;

use crate::{fs, schema};

/// Errors raised by [`import_points`].
#[derive(Debug, Error)]
pub enum ImportPointsError {
    /// Failed to create the parent directory for the database.
    #[error("failed to create parent directory for {path:?}")]
    CreateDirectory {
        /// Database path whose parent could not be created.
        path: Utf8PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// Opening the SQLite database failed.
    #[error("failed to open SQLite database at {path:?}")]
    Open {
        /// Destination database path.
        path: Utf8PathBuf,
        /// Source error returned by `rusqlite`.
        #[source]
        source: SqliteError,
    },
    /// Beginning the transaction failed.
    #[error("failed to begin point import transaction")]
    BeginTransaction {
        /// Source error returned by `rusqlite`.
        #[source]
        source: SqliteError,
    },
    /// Creating the `points` table failed.
    #[error("failed to create points table")]
    CreateSchema {
        /// Source error returned by `rusqlite`.
        #[source]
        source: SqliteError,
    },
    /// Preparing the insert statement failed.
    #[error("failed to prepare point insert statement")]
    PrepareInsert {
        /// Source error returned by `rusqlite`.
        #[source]
        source: SqliteError,
    },
    /// A point identifier could not be represented as an SQLite integer.
    #[error("point id {point_id} exceeds SQLite i64 range")]
    PointIdOutOfRange {
        /// Identifier that failed the conversion.
        point_id: u64,
    },
    /// Writing a point row failed.
    #[error("failed to import point {point_id}")]
    PersistRow {
        /// Identifier of the point being written.
        point_id: u64,
        /// Source error returned by `rusqlite`.
        #[source]
        source: SqliteError,
    },
    /// Committing the transaction failed.
    #[error("failed to commit point import transaction")]
    Commit {
        /// Source error returned by `rusqlite`.
        #[source]
        source: SqliteError,
    },
}

/// Insert or replace `points` in the database at `path`, in one transaction.
///
/// The database and its parent directories are created when missing.
/// Imported rows are active and have no display order; an existing row with
/// the same identity is replaced entirely. Returns the number of rows written.
///
/// # Errors
///
/// Returns [`ImportPointsError`] for the first failing step; on any failure
/// nothing is imported.
pub fn import_points(path: &Utf8Path, points: &[Point]) -> Result<usize, ImportPointsError> {
    fs::ensure_parent_dir(path).map_err(|source| ImportPointsError::CreateDirectory {
        path: path.to_path_buf(),
        source,
    })?;
    let mut connection =
        Connection::open(path.as_std_path()).map_err(|source| ImportPointsError::Open {
            path: path.to_path_buf(),
            source,
        })?;
    let transaction = connection
        .transaction()
        .map_err(|source| ImportPointsError::BeginTransaction { source })?;

    schema::initialise(&transaction).map_err(|source| ImportPointsError::CreateSchema { source })?;
    persist_rows(&transaction, points)?;

    transaction
        .commit()
        .map_err(|source| ImportPointsError::Commit { source })?;
    log::info!("imported {} points into {path}", points.len());
    Ok(points.len())
}

fn persist_rows(transaction: &Transaction<'_>, points: &[Point]) -> Result<(), ImportPointsError> {
    if points.is_empty() {
        return Ok(());
    }

    let mut statement = transaction
        .prepare(
            "INSERT OR REPLACE INTO points \
             (id, number, department, division, block, lat, lon, label, active, display_order) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, 1, NULL)",
        )
        .map_err(|source| ImportPointsError::PrepareInsert { source })?;

    for point in points {
        let point_id = i64::try_from(point.id).map_err(|_| ImportPointsError::PointIdOutOfRange {
            point_id: point.id,
        })?;
        statement
            .execute((
                point_id,
                point.number,
                &point.group.department,
                &point.group.division,
                &point.group.block,
                point.lat(),
                point.lon(),
                point.label.as_deref(),
            ))
            .map_err(|source| ImportPointsError::PersistRow {
                point_id: point.id,
                source,
            })?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use fieldroute_core::{GroupKeys, PointFilter, PointRepository};
    use geo::Coord;
    use rstest::rstest;
    use tempfile::TempDir;

    use crate::SqlitePointStore;

    fn sample(id: u64, number: u32) -> Point {
        Point::new(
            id,
            number,
            GroupKeys::new("EST", "DIV1", "BLK001"),
            Coord { x: 110.65, y: -2.12 },
        )
        .expect("valid point")
    }

    #[rstest]
    fn import_replaces_rows_with_the_same_id() {
        let dir = TempDir::new().expect("tempdir");
        let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).expect("utf-8 temp dir");
        let path = root.join("points.db");

        assert_eq!(import_points(&path, &[sample(1, 1), sample(2, 2)]).expect("first"), 2);
        assert_eq!(import_points(&path, &[sample(1, 5)]).expect("second"), 1);

        let store = SqlitePointStore::open(&path).expect("open");
        let numbers: Vec<(u64, u32)> = store
            .fetch_points(&PointFilter::default())
            .expect("fetch")
            .iter()
            .map(|p| (p.id, p.number))
            .collect();
        assert_eq!(numbers, vec![(2, 2), (1, 5)]);
    }

    #[rstest]
    fn rejects_ids_beyond_sqlite_range() {
        let dir = TempDir::new().expect("tempdir");
        let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).expect("utf-8 temp dir");
        let path = root.join("points.db");
        let mut huge = sample(1, 1);
        huge.id = u64::MAX;

        let err = import_points(&path, &[sample(2, 1), huge]).expect_err("id out of range");
        assert!(matches!(
            err,
            ImportPointsError::PointIdOutOfRange { point_id: u64::MAX }
        ));

        let store = SqlitePointStore::create(&path).expect("create");
        let points = store.fetch_points(&PointFilter::default()).expect("fetch");
        assert!(points.is_empty(), "failed import must not leave rows behind");
    }
}

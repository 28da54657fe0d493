//! SQLite-backed point repository and order writer.

use std::fmt;

use camino::{Utf8Path, Utf8PathBuf};
use fieldroute_core::{
    Atomicity, BatchWriteError, GroupKeys, OrderWriter, Point, PointFilter, PointRepository,
    RepositoryError, WriteFailure, WritePlan, WriteReport,
};
use geo::Coord;
use rusqlite::{Connection, OpenFlags, Row, params_from_iter, types::ValueRef};
use thiserror::Error;

use crate::{fs, schema};

const SELECT_POINTS: &str = "SELECT id, number, department, division, block, lat, lon, label \
     FROM points WHERE active = 1 AND lat IS NOT NULL AND lon IS NOT NULL";

/// Errors raised while creating or opening a point database.
#[derive(Debug, Error)]
pub enum SqlitePointStoreError {
    /// Creating the parent directory for a new database failed.
    #[error("failed to create parent directory for {path:?}")]
    CreateDirectory {
        /// Database path whose parent could not be created.
        path: Utf8PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// The database to open does not exist.
    #[error("no point database at {path:?}; run `fieldroute init` first")]
    MissingDatabase {
        /// Requested database path.
        path: Utf8PathBuf,
    },
    /// Inspecting the database path failed.
    #[error("failed to inspect {path:?}")]
    InspectDatabase {
        /// Requested database path.
        path: Utf8PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// Opening the SQLite database failed.
    #[error("failed to open SQLite database at {path:?}")]
    Open {
        /// Requested database path.
        path: Utf8PathBuf,
        /// Source error returned by `rusqlite`.
        #[source]
        source: rusqlite::Error,
    },
    /// Creating the points table failed.
    #[error("failed to initialise the points schema in {path:?}")]
    Schema {
        /// Database path.
        path: Utf8PathBuf,
        /// Source error returned by `rusqlite`.
        #[source]
        source: rusqlite::Error,
    },
}

/// Point storage in a single SQLite database.
///
/// Reads return active points with coordinates, ascending by number. Writes
/// update one row per assignment with the configured [`Atomicity`].
pub struct SqlitePointStore {
    connection: Connection,
    path: Utf8PathBuf,
    atomicity: Atomicity,
}

impl fmt::Debug for SqlitePointStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SqlitePointStore")
            .field("path", &self.path)
            .field("atomicity", &self.atomicity)
            .finish_non_exhaustive()
    }
}

impl SqlitePointStore {
    /// Create (or reuse) a database at `path` and make sure the schema exists.
    ///
    /// Missing parent directories are created.
    ///
    /// # Errors
    ///
    /// Returns [`SqlitePointStoreError`] when the directory, database or schema
    /// cannot be created.
    pub fn create(path: &Utf8Path) -> Result<Self, SqlitePointStoreError> {
        fs::ensure_parent_dir(path).map_err(|source| SqlitePointStoreError::CreateDirectory {
            path: path.to_path_buf(),
            source,
        })?;
        let connection = Connection::open(path.as_std_path()).map_err(|source| {
            SqlitePointStoreError::Open {
                path: path.to_path_buf(),
                source,
            }
        })?;
        schema::initialise(&connection).map_err(|source| SqlitePointStoreError::Schema {
            path: path.to_path_buf(),
            source,
        })?;
        log::debug!("initialised point database at {path}");
        Ok(Self::from_connection(connection, path))
    }

    /// Open an existing database for reading and writing.
    ///
    /// # Errors
    ///
    /// Returns [`SqlitePointStoreError::MissingDatabase`] when nothing exists at
    /// `path`, or the `rusqlite` failure when it cannot be opened.
    pub fn open(path: &Utf8Path) -> Result<Self, SqlitePointStoreError> {
        let exists =
            fs::file_is_file(path).map_err(|source| SqlitePointStoreError::InspectDatabase {
                path: path.to_path_buf(),
                source,
            })?;
        if !exists {
            return Err(SqlitePointStoreError::MissingDatabase {
                path: path.to_path_buf(),
            });
        }
        let connection =
            Connection::open_with_flags(path.as_std_path(), OpenFlags::SQLITE_OPEN_READ_WRITE)
                .map_err(|source| SqlitePointStoreError::Open {
                    path: path.to_path_buf(),
                    source,
                })?;
        Ok(Self::from_connection(connection, path))
    }

    fn from_connection(connection: Connection, path: &Utf8Path) -> Self {
        Self {
            connection,
            path: path.to_path_buf(),
            atomicity: Atomicity::default(),
        }
    }

    /// Choose how [`OrderWriter::apply`] behaves on failure.
    #[must_use]
    pub fn with_atomicity(mut self, atomicity: Atomicity) -> Self {
        self.atomicity = atomicity;
        self
    }

    /// Location of the database file.
    #[must_use]
    pub fn path(&self) -> &Utf8Path {
        &self.path
    }

    fn query_rows(&self, filter: &PointFilter) -> rusqlite::Result<Vec<StoredRow>> {
        let (sql, params) = filtered_query(filter);
        let mut statement = self.connection.prepare(&sql)?;
        let rows = statement.query_map(params_from_iter(params), StoredRow::from_row)?;
        rows.collect()
    }
}

/// SQL and bound parameters for the rows selected by `filter`.
fn filtered_query(filter: &PointFilter) -> (String, Vec<&str>) {
    let mut sql = String::from(SELECT_POINTS);
    let mut params = Vec::new();
    if let Some(department) = filter.department() {
        sql.push_str(" AND department = ?");
        params.push(department);
    }
    if let Some(division) = filter.division() {
        sql.push_str(" AND instr(lower(division), lower(?)) > 0");
        params.push(division);
    }
    if let Some(block) = filter.block() {
        sql.push_str(" AND instr(lower(block), lower(?)) > 0");
        params.push(block);
    }
    sql.push_str(" ORDER BY number ASC, id ASC");
    (sql, params)
}

/// A `points` row as stored, before domain validation.
struct StoredRow {
    id: i64,
    number: i64,
    group: GroupKeys,
    lat: Option<f64>,
    lon: Option<f64>,
    label: Option<String>,
}

impl StoredRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            number: row.get(1)?,
            group: GroupKeys::new(
                row.get::<_, String>(2)?,
                row.get::<_, String>(3)?,
                row.get::<_, String>(4)?,
            ),
            lat: coordinate(row, 5)?,
            lon: coordinate(row, 6)?,
            label: row.get(7)?,
        })
    }

    /// Convert to a [`Point`], logging and returning `None` for rows the
    /// engine must not see.
    fn into_point(self) -> Option<Point> {
        let Ok(id) = u64::try_from(self.id) else {
            log::warn!("skipping point row with negative id {}", self.id);
            return None;
        };
        let Ok(number) = u32::try_from(self.number) else {
            log::warn!("skipping point {id}: number {} is out of range", self.number);
            return None;
        };
        let (Some(lat), Some(lon)) = (self.lat, self.lon) else {
            log::warn!("skipping point {id}: stored coordinates are not numeric");
            return None;
        };
        let location = Coord { x: lon, y: lat };
        match Point::new(id, number, self.group, location) {
            Ok(point) => Some(match self.label {
                Some(label) => point.with_label(label),
                None => point,
            }),
            Err(err) => {
                log::warn!("skipping stored point: {err}");
                None
            }
        }
    }
}

/// Read a coordinate column, mapping values SQLite kept as text or blobs to
/// `None` rather than failing the whole query.
fn coordinate(row: &Row<'_>, index: usize) -> rusqlite::Result<Option<f64>> {
    match row.get_ref(index)? {
        ValueRef::Integer(_) | ValueRef::Real(_) => row.get(index).map(Some),
        ValueRef::Null | ValueRef::Text(_) | ValueRef::Blob(_) => Ok(None),
    }
}

impl PointRepository for SqlitePointStore {
    fn fetch_points(&self, filter: &PointFilter) -> Result<Vec<Point>, RepositoryError> {
        let rows = self.query_rows(filter).map_err(RepositoryError::query)?;
        let fetched = rows.len();
        let points: Vec<Point> = rows.into_iter().filter_map(StoredRow::into_point).collect();
        log::debug!(
            "fetched {} of {fetched} rows from {} for {filter:?}",
            points.len(),
            self.path
        );
        Ok(points)
    }
}

/// Apply every assignment in order, stopping at the first failing row.
fn apply_rows(connection: &Connection, plan: &WritePlan) -> Result<usize, BatchWriteError> {
    let total = plan.len();
    let sql = format!("UPDATE points SET {} = ?1 WHERE id = ?2", plan.field());
    let mut statement = connection
        .prepare(&sql)
        .map_err(|source| BatchWriteError::Batch {
            field: plan.field(),
            total,
            source: Box::new(source),
        })?;
    for (applied, assignment) in plan.assignments().iter().enumerate() {
        let row_error = |source| BatchWriteError::Row {
            field: plan.field(),
            point_id: assignment.point_id,
            applied,
            total,
            source,
        };
        let id = i64::try_from(assignment.point_id).map_err(|_| row_error(WriteFailure::MissingRow))?;
        match statement.execute((assignment.value, id)) {
            Ok(0) => return Err(row_error(WriteFailure::MissingRow)),
            Ok(_) => {}
            Err(source) => return Err(row_error(WriteFailure::backend(source))),
        }
    }
    Ok(total)
}

impl OrderWriter for SqlitePointStore {
    fn atomicity(&self) -> Atomicity {
        self.atomicity
    }

    fn apply(&self, plan: &WritePlan) -> Result<WriteReport, BatchWriteError> {
        let batch_error = |source: rusqlite::Error| BatchWriteError::Batch {
            field: plan.field(),
            total: plan.len(),
            source: Box::new(source),
        };
        let updated = match self.atomicity {
            Atomicity::BestEffort => apply_rows(&self.connection, plan)?,
            Atomicity::AllOrNothing => {
                let transaction = self
                    .connection
                    .unchecked_transaction()
                    .map_err(batch_error)?;
                match apply_rows(&transaction, plan) {
                    Ok(updated) => {
                        transaction.commit().map_err(batch_error)?;
                        updated
                    }
                    Err(err) => {
                        transaction.rollback().map_err(batch_error)?;
                        log::warn!("rolled back {} batch: {err}", plan.field());
                        return Err(err.rolled_back());
                    }
                }
            }
        };
        Ok(WriteReport {
            field: plan.field(),
            updated,
        })
    }
}

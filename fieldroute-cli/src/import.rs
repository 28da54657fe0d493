//! Loading point records from JSON import files.

use std::io::BufReader;

use camino::Utf8Path;
use fieldroute_core::{GroupKeys, Point};
use fieldroute_store::fs::open_utf8_file;
use geo::Coord;
use serde::Deserialize;

use crate::CliError;

/// One entry of the JSON array accepted by `fieldroute import`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct PointRecord {
    pub(crate) id: u64,
    pub(crate) number: u32,
    pub(crate) department: String,
    pub(crate) division: String,
    pub(crate) block: String,
    pub(crate) lat: f64,
    pub(crate) lon: f64,
    #[serde(default)]
    pub(crate) label: Option<String>,
}

impl PointRecord {
    fn into_point(self) -> Result<Point, fieldroute_core::PointError> {
        let point = Point::new(
            self.id,
            self.number,
            GroupKeys::new(self.department, self.division, self.block),
            Coord {
                x: self.lon,
                y: self.lat,
            },
        )?;
        Ok(match self.label {
            Some(label) => point.with_label(label),
            None => point,
        })
    }
}

/// Read and validate every record in `path`.
///
/// The whole file is rejected when any record fails validation.
pub(crate) fn load_points(path: &Utf8Path) -> Result<Vec<Point>, CliError> {
    let file = open_utf8_file(path).map_err(|source| CliError::OpenImport {
        path: path.to_path_buf(),
        source,
    })?;
    let records: Vec<PointRecord> =
        serde_json::from_reader(BufReader::new(file)).map_err(|source| {
            CliError::ParseImport {
                path: path.to_path_buf(),
                source,
            }
        })?;
    records
        .into_iter()
        .map(PointRecord::into_point)
        .collect::<Result<Vec<_>, _>>()
        .map_err(|source| CliError::InvalidPoint {
            path: path.to_path_buf(),
            source,
        })
}

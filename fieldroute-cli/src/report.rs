//! JSON reports printed by each command.

use std::io::Write;

use camino::Utf8PathBuf;
use fieldroute_core::{Point, Resequenced, RoutePlan, WriteReport};
use serde::Serialize;

use crate::CliError;

/// One point as it appears in a report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub(crate) struct PointRow {
    /// Position in the listed order, starting at 1.
    pub(crate) order: usize,
    pub(crate) id: u64,
    pub(crate) number: u32,
    pub(crate) department: String,
    pub(crate) division: String,
    pub(crate) block: String,
    pub(crate) lat: f64,
    pub(crate) lon: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) label: Option<String>,
}

impl PointRow {
    fn new(order: usize, point: &Point) -> Self {
        Self {
            order,
            id: point.id,
            number: point.number,
            department: point.group.department.clone(),
            division: point.group.division.clone(),
            block: point.group.block.clone(),
            lat: point.lat(),
            lon: point.lon(),
            label: point.label.clone(),
        }
    }

    pub(crate) fn listing<'a>(points: impl IntoIterator<Item = &'a Point>) -> Vec<Self> {
        points
            .into_iter()
            .enumerate()
            .map(|(index, point)| Self::new(index + 1, point))
            .collect()
    }
}

/// Output of `points`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub(crate) struct PointsReport {
    pub(crate) count: usize,
    pub(crate) points: Vec<PointRow>,
}

impl PointsReport {
    pub(crate) fn new(points: &[Point]) -> Self {
        Self {
            count: points.len(),
            points: PointRow::listing(points),
        }
    }
}

/// Output of `optimize`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub(crate) struct RouteReport {
    pub(crate) total_distance_km: f64,
    pub(crate) stops: Vec<PointRow>,
}

impl From<&RoutePlan> for RouteReport {
    fn from(plan: &RoutePlan) -> Self {
        Self {
            total_distance_km: plan.total_distance_km,
            stops: PointRow::listing(plan.stops.iter().map(|stop| &stop.point)),
        }
    }
}

/// Output of `update-order` and `update-numbers`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub(crate) struct WriteSummary {
    pub(crate) field: &'static str,
    pub(crate) updated: usize,
}

impl From<WriteReport> for WriteSummary {
    fn from(report: WriteReport) -> Self {
        Self {
            field: report.field.as_str(),
            updated: report.updated,
        }
    }
}

/// Output of `resequence`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub(crate) struct ResequenceReport {
    pub(crate) threshold: u32,
    pub(crate) committed: bool,
    pub(crate) frozen: usize,
    pub(crate) reordered: usize,
    /// Full display order with the new numbers applied.
    pub(crate) points: Vec<PointRow>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) updated: Option<usize>,
}

impl ResequenceReport {
    pub(crate) fn new(resequenced: &Resequenced, report: Option<WriteReport>) -> Self {
        Self {
            threshold: resequenced.threshold(),
            committed: report.is_some(),
            frozen: resequenced.frozen().len(),
            reordered: resequenced.tour().len(),
            points: PointRow::listing(&resequenced.renumbered()),
            updated: report.map(|report| report.updated),
        }
    }
}

/// Output of `init`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub(crate) struct InitReport {
    pub(crate) database: Utf8PathBuf,
}

/// Output of `import`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub(crate) struct ImportReport {
    pub(crate) database: Utf8PathBuf,
    pub(crate) imported: usize,
}

/// Pretty-print `report` as JSON followed by a newline.
pub(crate) fn write_report<T: Serialize>(writer: &mut dyn Write, report: &T) -> Result<(), CliError> {
    let payload = serde_json::to_string_pretty(report).map_err(CliError::SerialiseReport)?;
    writer
        .write_all(payload.as_bytes())
        .map_err(CliError::WriteOutput)?;
    writer.write_all(b"\n").map_err(CliError::WriteOutput)?;
    Ok(())
}

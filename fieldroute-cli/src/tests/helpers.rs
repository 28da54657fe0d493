//! Temporary databases and import files shared by the command tests.

use camino::{Utf8Path, Utf8PathBuf};
use fieldroute_core::{Atomicity, PointFilter};
use rusqlite::Connection;
use serde_json::Value;
use std::fs;
use tempfile::TempDir;

use crate::{
    Role,
    config::{Access, ImportConfig, ResequenceConfig, RouteConfig},
};

/// Four points in one block; point 3 sits far away from the others.
pub(super) const POINTS_JSON: &str = r#"[
    {"id": 1, "number": 1, "department": "EST", "division": "DIV1", "block": "BLK001", "lat": 0.0, "lon": 0.0, "label": "gate"},
    {"id": 2, "number": 2, "department": "EST", "division": "DIV1", "block": "BLK001", "lat": 0.0, "lon": 1.0},
    {"id": 3, "number": 3, "department": "EST", "division": "DIV1", "block": "BLK001", "lat": 10.0, "lon": 10.0},
    {"id": 4, "number": 4, "department": "EST", "division": "DIV1", "block": "BLK001", "lat": 0.0, "lon": 2.0}
]"#;

pub(super) struct Workspace {
    _dir: TempDir,
    root: Utf8PathBuf,
}

impl Workspace {
    pub(super) fn new() -> Self {
        let dir = TempDir::new().expect("tempdir");
        let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).expect("utf-8 tempdir");
        Self { _dir: dir, root }
    }

    pub(super) fn database(&self) -> Utf8PathBuf {
        self.root.join("points.db")
    }

    pub(super) fn write(&self, name: &str, contents: &str) -> Utf8PathBuf {
        let path = self.root.join(name);
        fs::write(path.as_std_path(), contents).expect("write file");
        path
    }

    pub(super) fn access(&self, role: Role) -> Access {
        Access {
            database: self.database(),
            role,
        }
    }

    pub(super) fn import_request(&self, role: Role) -> ImportConfig {
        ImportConfig {
            access: self.access(role),
            input: self.write("points.json", POINTS_JSON),
        }
    }

    pub(super) fn route(&self, role: Role) -> RouteConfig {
        RouteConfig {
            access: self.access(role),
            filter: PointFilter::default().with_department("EST"),
            start_index: 0,
            atomicity: Atomicity::BestEffort,
        }
    }

    pub(super) fn resequence(&self, role: Role, threshold: u32, commit: bool) -> ResequenceConfig {
        ResequenceConfig {
            access: self.access(role),
            filter: PointFilter::default().with_block("blk001"),
            threshold,
            commit,
            atomicity: Atomicity::AllOrNothing,
        }
    }

    pub(super) fn column(&self, column: &str) -> Vec<(u64, Option<u32>)> {
        read_column(&self.database(), column)
    }
}

fn read_column(path: &Utf8Path, column: &str) -> Vec<(u64, Option<u32>)> {
    let connection = Connection::open(path.as_std_path()).expect("raw connection");
    let mut statement = connection
        .prepare(&format!("SELECT id, {column} FROM points ORDER BY id"))
        .expect("prepare");
    statement
        .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))
        .expect("query")
        .collect::<Result<_, _>>()
        .expect("read rows")
}

/// Parse the JSON report a command wrote.
pub(super) fn parse_report(output: &[u8]) -> Value {
    serde_json::from_slice(output).expect("report is JSON")
}

//! Table layout for persisted points.

use rusqlite::Connection;

/// Points table plus indexes for the group filters and the active flag.
///
/// `lat`/`lon` are nullable: rows without coordinates may exist but are never
/// returned to the engine. `display_order` stays null until a preview is
/// written.
const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS points (
    id INTEGER PRIMARY KEY,
    number INTEGER NOT NULL,
    department TEXT NOT NULL,
    division TEXT NOT NULL,
    block TEXT NOT NULL,
    lat REAL,
    lon REAL,
    label TEXT,
    active INTEGER NOT NULL DEFAULT 1,
    display_order INTEGER
);
CREATE INDEX IF NOT EXISTS points_group_idx ON points (department, division, block);
CREATE INDEX IF NOT EXISTS points_active_idx ON points (active);
";

/// Create the points table and its indexes if they are missing.
pub(crate) fn initialise(connection: &Connection) -> rusqlite::Result<()> {
    connection.execute_batch(SCHEMA)
}

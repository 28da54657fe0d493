//! Error types emitted by the fieldroute CLI.
//!
//! Keep this error type reasonably small, as every command helper returns
//! `Result<_, CliError>`.

use std::sync::Arc;

use camino::Utf8PathBuf;
use fieldroute_core::{PointError, ServiceError};
use fieldroute_store::{ImportPointsError, SqlitePointStoreError};
use thiserror::Error;

use crate::access::{Capability, Role};

/// Errors emitted by the fieldroute CLI.
#[derive(Debug, Error)]
pub enum CliError {
    /// Provided arguments failed Clap validation.
    #[error(transparent)]
    ArgumentParsing(#[from] clap::Error),
    /// Configuration layering failed (files, env, CLI).
    #[error("failed to load configuration: {0}")]
    Configuration(#[from] Arc<ortho_config::OrthoError>),
    /// A required option is missing after configuration merging.
    #[error("missing {field} (set --{field} or {env})")]
    MissingArgument {
        field: &'static str,
        env: &'static str,
    },
    /// The configured role is not one of `reader`, `operator` or `admin`.
    #[error("unknown role {value:?}; expected reader, operator or admin")]
    InvalidRole { value: String },
    /// The role lacks the capability the command needs.
    #[error("role {role} lacks the {capability} capability")]
    Forbidden { role: Role, capability: Capability },
    /// Creating or opening the point database failed.
    #[error(transparent)]
    Store(#[from] SqlitePointStoreError),
    /// Opening the import file failed.
    #[error("failed to open import file at {path:?}: {source}")]
    OpenImport {
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// The import file is not a JSON array of point records.
    #[error("failed to parse import file at {path:?}: {source}")]
    ParseImport {
        path: Utf8PathBuf,
        #[source]
        source: serde_json::Error,
    },
    /// A record in the import file is not a valid point.
    #[error("invalid point in import file at {path:?}: {source}")]
    InvalidPoint {
        path: Utf8PathBuf,
        #[source]
        source: PointError,
    },
    /// Writing imported points to the database failed.
    #[error("failed to import points into {path:?}: {source}")]
    Import {
        path: Utf8PathBuf,
        #[source]
        source: ImportPointsError,
    },
    /// A sequencing operation failed.
    #[error(transparent)]
    Service(#[from] ServiceError),
    /// Serialising a report failed.
    #[error("failed to serialise report: {0}")]
    SerialiseReport(#[source] serde_json::Error),
    /// Writing the report failed.
    #[error("failed to write report: {0}")]
    WriteOutput(#[source] std::io::Error),
}

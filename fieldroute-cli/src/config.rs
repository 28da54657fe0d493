//! Layered arguments for each subcommand and their resolved forms.
//!
//! Every argument struct merges CLI flags over configuration files and
//! `FIELDROUTE_*` environment variables before it is resolved.

use camino::Utf8PathBuf;
use clap::Parser;
use fieldroute_core::{Atomicity, PointFilter};
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};

use crate::{
    ARG_FROM, ARG_INPUT, CliError, DEFAULT_DATABASE, ENV_FROM, ENV_INPUT, access::Role,
};

/// Arguments for `init`.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(name = "init", about = "Create the point database and its schema")]
#[ortho_config(prefix = "FIELDROUTE")]
pub(crate) struct InitArgs {
    /// Path to the SQLite point database.
    #[arg(long, value_name = "path")]
    #[serde(default)]
    pub(crate) database: Option<Utf8PathBuf>,
    /// Role used for the capability check (reader, operator or admin).
    #[arg(long, value_name = "role")]
    #[serde(default)]
    pub(crate) role: Option<String>,
}

/// Arguments for `import`.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    name = "import",
    about = "Insert or replace points from a JSON file",
    long_about = "Insert or replace points from a JSON array of records with \
                  id, number, department, division, block, lat, lon and an \
                  optional label. The import runs in one transaction."
)]
#[ortho_config(prefix = "FIELDROUTE")]
pub(crate) struct ImportArgs {
    /// JSON file holding the point records.
    #[arg(value_name = "path")]
    #[serde(default)]
    pub(crate) input: Option<Utf8PathBuf>,
    /// Path to the SQLite point database.
    #[arg(long, value_name = "path")]
    #[serde(default)]
    pub(crate) database: Option<Utf8PathBuf>,
    /// Role used for the capability check (reader, operator or admin).
    #[arg(long, value_name = "role")]
    #[serde(default)]
    pub(crate) role: Option<String>,
}

/// Arguments shared by `points`, `optimize`, `update-order` and
/// `update-numbers`.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(name = "route", about = "Select points and order them")]
#[ortho_config(prefix = "FIELDROUTE")]
pub(crate) struct RouteArgs {
    /// Path to the SQLite point database.
    #[arg(long, value_name = "path")]
    #[serde(default)]
    pub(crate) database: Option<Utf8PathBuf>,
    /// Department code (exact match).
    #[arg(long, value_name = "code")]
    #[serde(default)]
    pub(crate) department: Option<String>,
    /// Division code (case-insensitive substring match).
    #[arg(long, value_name = "code")]
    #[serde(default)]
    pub(crate) division: Option<String>,
    /// Block code (case-insensitive substring match).
    #[arg(long, value_name = "code")]
    #[serde(default)]
    pub(crate) block: Option<String>,
    /// Position in the number-ordered selection to start the tour from.
    #[arg(long = "start-index", value_name = "index")]
    #[serde(default)]
    pub(crate) start_index: Option<usize>,
    /// Role used for the capability check (reader, operator or admin).
    #[arg(long, value_name = "role")]
    #[serde(default)]
    pub(crate) role: Option<String>,
    /// Roll back every row if any row fails to write.
    #[arg(long = "all-or-nothing")]
    #[serde(default)]
    pub(crate) all_or_nothing: bool,
}

/// Arguments for `resequence`.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    name = "resequence",
    about = "Re-order points numbered at or above a threshold",
    long_about = "Re-order points numbered at or above --from by nearest \
                  neighbour, starting from the lowest such number. Points \
                  below the threshold keep their numbers. Without --commit \
                  the result is only previewed."
)]
#[ortho_config(prefix = "FIELDROUTE")]
pub(crate) struct ResequenceArgs {
    /// Path to the SQLite point database.
    #[arg(long, value_name = "path")]
    #[serde(default)]
    pub(crate) database: Option<Utf8PathBuf>,
    /// Department code (exact match).
    #[arg(long, value_name = "code")]
    #[serde(default)]
    pub(crate) department: Option<String>,
    /// Division code (case-insensitive substring match).
    #[arg(long, value_name = "code")]
    #[serde(default)]
    pub(crate) division: Option<String>,
    /// Block code (case-insensitive substring match).
    #[arg(long, value_name = "code")]
    #[serde(default)]
    pub(crate) block: Option<String>,
    /// First number to re-assign; lower numbers are kept.
    #[arg(long = ARG_FROM, value_name = "number")]
    #[serde(default)]
    pub(crate) from: Option<u32>,
    /// Write the new numbers instead of previewing them.
    #[arg(long)]
    #[serde(default)]
    pub(crate) commit: bool,
    /// Role used for the capability check (reader, operator or admin).
    #[arg(long, value_name = "role")]
    #[serde(default)]
    pub(crate) role: Option<String>,
    /// Roll back every row if any row fails to write.
    #[arg(long = "all-or-nothing")]
    #[serde(default)]
    pub(crate) all_or_nothing: bool,
}

/// Database location and role shared by every resolved command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Access {
    pub(crate) database: Utf8PathBuf,
    pub(crate) role: Role,
}

impl Access {
    fn resolve(database: Option<Utf8PathBuf>, role: Option<&str>) -> Result<Self, CliError> {
        Ok(Self {
            database: database.unwrap_or_else(|| Utf8PathBuf::from(DEFAULT_DATABASE)),
            role: Role::resolve(role)?,
        })
    }
}

/// Resolved `import` configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ImportConfig {
    pub(crate) access: Access,
    pub(crate) input: Utf8PathBuf,
}

/// Resolved configuration for the route commands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct RouteConfig {
    pub(crate) access: Access,
    pub(crate) filter: PointFilter,
    pub(crate) start_index: usize,
    pub(crate) atomicity: Atomicity,
}

/// Resolved `resequence` configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ResequenceConfig {
    pub(crate) access: Access,
    pub(crate) filter: PointFilter,
    pub(crate) threshold: u32,
    pub(crate) commit: bool,
    pub(crate) atomicity: Atomicity,
}

const fn atomicity(all_or_nothing: bool) -> Atomicity {
    if all_or_nothing {
        Atomicity::AllOrNothing
    } else {
        Atomicity::BestEffort
    }
}

impl TryFrom<InitArgs> for Access {
    type Error = CliError;

    fn try_from(args: InitArgs) -> Result<Self, Self::Error> {
        Self::resolve(args.database, args.role.as_deref())
    }
}

impl TryFrom<ImportArgs> for ImportConfig {
    type Error = CliError;

    fn try_from(args: ImportArgs) -> Result<Self, Self::Error> {
        let input = args.input.ok_or(CliError::MissingArgument {
            field: ARG_INPUT,
            env: ENV_INPUT,
        })?;
        Ok(Self {
            access: Access::resolve(args.database, args.role.as_deref())?,
            input,
        })
    }
}

impl TryFrom<RouteArgs> for RouteConfig {
    type Error = CliError;

    fn try_from(args: RouteArgs) -> Result<Self, Self::Error> {
        Ok(Self {
            access: Access::resolve(args.database, args.role.as_deref())?,
            filter: PointFilter::new(args.department, args.division, args.block),
            start_index: args.start_index.unwrap_or_default(),
            atomicity: atomicity(args.all_or_nothing),
        })
    }
}

impl TryFrom<ResequenceArgs> for ResequenceConfig {
    type Error = CliError;

    fn try_from(args: ResequenceArgs) -> Result<Self, Self::Error> {
        let threshold = args.from.ok_or(CliError::MissingArgument {
            field: ARG_FROM,
            env: ENV_FROM,
        })?;
        Ok(Self {
            access: Access::resolve(args.database, args.role.as_deref())?,
            filter: PointFilter::new(args.department, args.division, args.block),
            threshold,
            commit: args.commit,
            atomicity: atomicity(args.all_or_nothing),
        })
    }
}

impl InitArgs {
    pub(crate) fn into_config(self) -> Result<Access, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        Access::try_from(merged)
    }
}

impl ImportArgs {
    pub(crate) fn into_config(self) -> Result<ImportConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        ImportConfig::try_from(merged)
    }
}

impl RouteArgs {
    pub(crate) fn into_config(self) -> Result<RouteConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        RouteConfig::try_from(merged)
    }
}

impl ResequenceArgs {
    pub(crate) fn into_config(self) -> Result<ResequenceConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        ResequenceConfig::try_from(merged)
    }
}

#[cfg(test)]
pub(crate) fn resequence_config_from_layers_for_test(
    layers: Vec<ortho_config::MergeLayer<'static>>,
) -> Result<ResequenceConfig, CliError> {
    let merged = ResequenceArgs::merge_from_layers(layers).map_err(CliError::from)?;
    ResequenceConfig::try_from(merged)
}

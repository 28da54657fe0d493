//! Command-line interface for sequencing and renumbering field points.
//!
//! Every command prints a JSON report on stdout. Diagnostics go through
//! `log`; set `RUST_LOG` to see them.
#![forbid(unsafe_code)]

use clap::{Parser, Subcommand};
use std::io::Write;

mod access;
mod commands;
mod config;
mod error;
mod import;
mod report;

pub use access::{Capability, Role};
pub use error::CliError;

use commands::{Request, RouteAction};
use config::{ImportArgs, InitArgs, ResequenceArgs, RouteArgs};

const ARG_INPUT: &str = "input";
const ARG_FROM: &str = "from";
const ENV_INPUT: &str = "FIELDROUTE_CMDS_IMPORT_INPUT";
const ENV_FROM: &str = "FIELDROUTE_CMDS_RESEQUENCE_FROM";
const DEFAULT_DATABASE: &str = "fieldroute.db";

/// Run the fieldroute CLI with the current process arguments and environment.
pub fn run() -> Result<(), CliError> {
    let cli = Cli::try_parse().map_err(CliError::ArgumentParsing)?;
    let request = cli.command.into_request()?;
    let mut stdout = std::io::stdout().lock();
    run_with(request, &mut stdout)
}

fn run_with(request: Request, writer: &mut dyn Write) -> Result<(), CliError> {
    commands::execute(request, writer)
}

#[derive(Debug, Parser)]
#[command(
    name = "fieldroute",
    about = "Order geolocated field points into nearest-neighbour routes",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Create an empty point database.
    Init(InitArgs),
    /// Load points from a JSON file into the database.
    Import(ImportArgs),
    /// List the selected points in number order.
    Points(RouteArgs),
    /// Preview the nearest-neighbour route for the selected points.
    Optimize(RouteArgs),
    /// Store the route as the advisory display order.
    UpdateOrder(RouteArgs),
    /// Overwrite sequence numbers with the route order.
    UpdateNumbers(RouteArgs),
    /// Re-order points numbered at or above a threshold.
    Resequence(ResequenceArgs),
}

impl Command {
    fn into_request(self) -> Result<Request, CliError> {
        Ok(match self {
            Self::Init(args) => Request::Init(args.into_config()?),
            Self::Import(args) => Request::Import(args.into_config()?),
            Self::Points(args) => Request::Route(RouteAction::List, args.into_config()?),
            Self::Optimize(args) => Request::Route(RouteAction::Optimize, args.into_config()?),
            Self::UpdateOrder(args) => {
                Request::Route(RouteAction::UpdateOrder, args.into_config()?)
            }
            Self::UpdateNumbers(args) => {
                Request::Route(RouteAction::UpdateNumbers, args.into_config()?)
            }
            Self::Resequence(args) => Request::Resequence(args.into_config()?),
        })
    }
}

#[cfg(test)]
mod tests;

//! Resolved requests and their execution against the SQLite point store.

use std::io::Write;

use fieldroute_core::SequencingService;
use fieldroute_store::{SqlitePointStore, import_points};

use crate::{
    CliError,
    access::Capability,
    config::{Access, ImportConfig, ResequenceConfig, RouteConfig},
    import::load_points,
    report::{
        ImportReport, InitReport, PointsReport, ResequenceReport, RouteReport, WriteSummary,
        write_report,
    },
};

/// What a route command does with the selected points.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum RouteAction {
    /// List the selection in number order.
    List,
    /// Preview the nearest-neighbour tour.
    Optimize,
    /// Persist the tour as display order.
    UpdateOrder,
    /// Persist the tour as sequence numbers.
    UpdateNumbers,
}

/// A fully resolved command, ready to run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Request {
    Init(Access),
    Import(ImportConfig),
    Route(RouteAction, RouteConfig),
    Resequence(ResequenceConfig),
}

impl Request {
    /// Capability a role needs before the request may run.
    pub(crate) const fn required_capability(&self) -> Capability {
        match self {
            Self::Init(_) | Self::Import(_) => Capability::Admin,
            Self::Route(RouteAction::List | RouteAction::Optimize, _) => Capability::Read,
            Self::Route(RouteAction::UpdateOrder, _) => Capability::Write,
            Self::Route(RouteAction::UpdateNumbers, _) => Capability::Admin,
            Self::Resequence(config) => {
                if config.commit {
                    Capability::Admin
                } else {
                    Capability::Read
                }
            }
        }
    }

    const fn access(&self) -> &Access {
        match self {
            Self::Init(access) => access,
            Self::Import(config) => &config.access,
            Self::Route(_, config) => &config.access,
            Self::Resequence(config) => &config.access,
        }
    }
}

/// Check the caller's role, run `request` and print its report to `writer`.
pub(crate) fn execute(request: Request, writer: &mut dyn Write) -> Result<(), CliError> {
    let capability = request.required_capability();
    let role = request.access().role;
    role.require(capability)?;
    log::debug!("role {role} granted {capability}");

    match request {
        Request::Init(access) => {
            let store = SqlitePointStore::create(&access.database)?;
            log::info!("initialised point database at {}", store.path());
            write_report(
                writer,
                &InitReport {
                    database: access.database,
                },
            )
        }
        Request::Import(config) => {
            let points = load_points(&config.input)?;
            let database = config.access.database;
            let imported =
                import_points(&database, &points).map_err(|source| CliError::Import {
                    path: database.clone(),
                    source,
                })?;
            log::info!("imported {imported} points from {}", config.input);
            write_report(writer, &ImportReport { database, imported })
        }
        Request::Route(action, config) => run_route(action, &config, writer),
        Request::Resequence(config) => run_resequence(&config, writer),
    }
}

fn run_route(
    action: RouteAction,
    config: &RouteConfig,
    writer: &mut dyn Write,
) -> Result<(), CliError> {
    let store = SqlitePointStore::open(&config.access.database)?.with_atomicity(config.atomicity);
    let service = SequencingService::new(&store, &store);
    match action {
        RouteAction::List => {
            let points = service.points(&config.filter)?;
            write_report(writer, &PointsReport::new(&points))
        }
        RouteAction::Optimize => {
            let plan = service.preview_route(&config.filter, config.start_index)?;
            write_report(writer, &RouteReport::from(&plan))
        }
        RouteAction::UpdateOrder => {
            let report = service.update_display_order(&config.filter, config.start_index)?;
            write_report(writer, &WriteSummary::from(report))
        }
        RouteAction::UpdateNumbers => {
            let report = service.renumber(&config.filter, config.start_index)?;
            write_report(writer, &WriteSummary::from(report))
        }
    }
}

fn run_resequence(config: &ResequenceConfig, writer: &mut dyn Write) -> Result<(), CliError> {
    let store = SqlitePointStore::open(&config.access.database)?.with_atomicity(config.atomicity);
    let service = SequencingService::new(&store, &store);
    if config.commit {
        let committed = service.commit_resequence(&config.filter, config.threshold)?;
        return write_report(
            writer,
            &ResequenceReport::new(&committed.resequenced, Some(committed.report)),
        );
    }
    let resequenced = service.preview_resequence(&config.filter, config.threshold)?;
    write_report(writer, &ResequenceReport::new(&resequenced, None))
}

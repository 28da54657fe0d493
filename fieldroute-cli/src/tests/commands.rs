//! End-to-end command tests against temporary SQLite databases.

use super::helpers::{Workspace, parse_report};
use super::*;
use crate::commands::{Request, RouteAction};
use rstest::{fixture, rstest};
use serde_json::Value;

#[fixture]
fn seeded() -> Workspace {
    let workspace = Workspace::new();
    let request = Request::Import(workspace.import_request(Role::Admin));
    let mut output = Vec::new();
    run_with(request, &mut output).expect("import should succeed");
    workspace
}

fn run_ok(request: Request) -> Value {
    let mut output = Vec::new();
    run_with(request, &mut output).expect("command should succeed");
    parse_report(&output)
}

fn ids(rows: &Value) -> Vec<u64> {
    rows.as_array()
        .expect("array of rows")
        .iter()
        .map(|row| row["id"].as_u64().expect("id"))
        .collect()
}

#[rstest]
fn init_creates_database() {
    let workspace = Workspace::new();
    let report = run_ok(Request::Init(workspace.access(Role::Admin)));

    assert_eq!(report["database"], workspace.database().as_str());
    assert!(workspace.database().is_file());
    assert!(workspace.column("number").is_empty());
}

#[rstest]
fn import_reports_count(seeded: Workspace) {
    let report = run_ok(Request::Import(seeded.import_request(Role::Admin)));

    assert_eq!(report["imported"], 4);
    assert_eq!(seeded.column("number").len(), 4);
}

#[rstest]
fn points_lists_selection_in_number_order(seeded: Workspace) {
    let report = run_ok(Request::Route(RouteAction::List, seeded.route(Role::Reader)));

    assert_eq!(report["count"], 4);
    assert_eq!(ids(&report["points"]), vec![1, 2, 3, 4]);
    assert_eq!(report["points"][0]["label"], "gate");
    assert!(report["points"][1].get("label").is_none());
}

#[rstest]
fn optimize_previews_without_writing(seeded: Workspace) {
    let report = run_ok(Request::Route(RouteAction::Optimize, seeded.route(Role::Reader)));

    assert_eq!(ids(&report["stops"]), vec![1, 2, 4, 3]);
    assert!(report["total_distance_km"].as_f64().expect("distance") > 0.0);
    assert_eq!(
        seeded.column("display_order"),
        vec![(1, None), (2, None), (3, None), (4, None)]
    );
}

#[rstest]
fn optimize_with_out_of_range_start_uses_first_point(seeded: Workspace) {
    let mut config = seeded.route(Role::Reader);
    config.start_index = 99;
    let report = run_ok(Request::Route(RouteAction::Optimize, config));

    assert_eq!(ids(&report["stops"]), vec![1, 2, 4, 3]);
}

#[rstest]
fn update_order_writes_display_order_only(seeded: Workspace) {
    let report = run_ok(Request::Route(
        RouteAction::UpdateOrder,
        seeded.route(Role::Operator),
    ));

    assert_eq!(report["field"], "display_order");
    assert_eq!(report["updated"], 4);
    assert_eq!(
        seeded.column("display_order"),
        vec![(1, Some(1)), (2, Some(2)), (3, Some(4)), (4, Some(3))]
    );
    assert_eq!(
        seeded.column("number"),
        vec![(1, Some(1)), (2, Some(2)), (3, Some(3)), (4, Some(4))]
    );
}

#[rstest]
fn update_numbers_requires_admin(seeded: Workspace) {
    let mut output = Vec::new();
    let err = run_with(
        Request::Route(RouteAction::UpdateNumbers, seeded.route(Role::Operator)),
        &mut output,
    )
    .expect_err("operator cannot renumber");

    match err {
        CliError::Forbidden { role, capability } => {
            assert_eq!(role, Role::Operator);
            assert_eq!(capability, Capability::Admin);
        }
        other => panic!("expected Forbidden, found {other:?}"),
    }
    assert!(output.is_empty());
    assert_eq!(
        seeded.column("number"),
        vec![(1, Some(1)), (2, Some(2)), (3, Some(3)), (4, Some(4))]
    );
}

#[rstest]
fn update_numbers_renumbers_in_route_order(seeded: Workspace) {
    let report = run_ok(Request::Route(
        RouteAction::UpdateNumbers,
        seeded.route(Role::Admin),
    ));

    assert_eq!(report["field"], "number");
    assert_eq!(report["updated"], 4);
    assert_eq!(
        seeded.column("number"),
        vec![(1, Some(1)), (2, Some(2)), (3, Some(4)), (4, Some(3))]
    );
}

#[rstest]
fn resequence_preview_keeps_numbers(seeded: Workspace) {
    let report = run_ok(Request::Resequence(seeded.resequence(Role::Reader, 2, false)));

    assert_eq!(report["threshold"], 2);
    assert_eq!(report["committed"], false);
    assert_eq!(report["frozen"], 1);
    assert_eq!(report["reordered"], 3);
    assert_eq!(ids(&report["points"]), vec![1, 2, 4, 3]);
    assert!(report.get("updated").is_none());
    assert_eq!(
        seeded.column("number"),
        vec![(1, Some(1)), (2, Some(2)), (3, Some(3)), (4, Some(4))]
    );
}

#[rstest]
fn resequence_commit_writes_suffix(seeded: Workspace) {
    let report = run_ok(Request::Resequence(seeded.resequence(Role::Admin, 2, true)));

    assert_eq!(report["committed"], true);
    assert_eq!(report["updated"], 3);
    assert_eq!(
        seeded.column("number"),
        vec![(1, Some(1)), (2, Some(2)), (3, Some(4)), (4, Some(3))]
    );
}

#[rstest]
fn resequence_commit_reports_the_numbers_it_wrote(seeded: Workspace) {
    let report = run_ok(Request::Resequence(seeded.resequence(Role::Admin, 2, true)));

    let stored = seeded.column("number");
    for row in report["points"].as_array().expect("array of rows") {
        let id = row["id"].as_u64().expect("id");
        let number = row["number"].as_u64().and_then(|n| u32::try_from(n).ok());
        assert!(stored.contains(&(id, number)), "point {id} reported {number:?}");
    }
}

#[rstest]
fn resequence_above_every_number_updates_nothing(seeded: Workspace) {
    let report = run_ok(Request::Resequence(seeded.resequence(Role::Admin, 10, true)));

    assert_eq!(report["frozen"], 4);
    assert_eq!(report["reordered"], 0);
    assert_eq!(report["updated"], 0);
}

#[rstest]
fn empty_selection_is_reported(seeded: Workspace) {
    let mut config = seeded.route(Role::Reader);
    config.filter = config.filter.with_block("NOPE");
    let mut output = Vec::new();

    let err = run_with(Request::Route(RouteAction::Optimize, config), &mut output)
        .expect_err("no points match");
    assert!(matches!(
        err,
        CliError::Service(fieldroute_core::ServiceError::EmptyInput)
    ));
}

#[rstest]
fn invalid_filter_is_rejected_before_querying(seeded: Workspace) {
    let mut config = seeded.route(Role::Reader);
    config.filter = config.filter.with_department("EST; DROP TABLE points");
    let mut output = Vec::new();

    let err = run_with(Request::Route(RouteAction::List, config), &mut output)
        .expect_err("invalid filter");
    assert!(matches!(
        err,
        CliError::Service(fieldroute_core::ServiceError::InvalidFilter(_))
    ));
    assert_eq!(seeded.column("number").len(), 4);
}

#[rstest]
fn route_commands_fail_without_database() {
    let workspace = Workspace::new();
    let mut output = Vec::new();

    let err = run_with(
        Request::Route(RouteAction::List, workspace.route(Role::Reader)),
        &mut output,
    )
    .expect_err("missing database");
    assert!(matches!(err, CliError::Store(_)));
}

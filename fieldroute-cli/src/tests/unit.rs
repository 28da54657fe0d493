//! Focused unit tests for roles, configuration resolution and import parsing.

use super::helpers::Workspace;
use super::*;
use crate::{
    commands::{Request, RouteAction},
    config::{ImportConfig, ResequenceConfig, RouteConfig, resequence_config_from_layers_for_test},
    import::load_points,
};
use camino::Utf8PathBuf;
use fieldroute_core::{Atomicity, PointFilter};
use rstest::rstest;

#[rstest]
#[case(Role::Reader, Capability::Read, true)]
#[case(Role::Reader, Capability::Write, false)]
#[case(Role::Operator, Capability::Write, true)]
#[case(Role::Operator, Capability::Admin, false)]
#[case(Role::Admin, Capability::Admin, true)]
fn roles_grant_expected_capabilities(
    #[case] role: Role,
    #[case] capability: Capability,
    #[case] granted: bool,
) {
    assert_eq!(role.grants(capability), granted);
    assert_eq!(role.require(capability).is_ok(), granted);
}

#[rstest]
#[case(None, Role::Reader)]
#[case(Some("operator"), Role::Operator)]
#[case(Some(" ADMIN "), Role::Admin)]
fn roles_resolve_case_insensitively(#[case] value: Option<&str>, #[case] expected: Role) {
    assert_eq!(Role::resolve(value).expect("known role"), expected);
}

#[rstest]
fn unknown_role_is_rejected() {
    let err = Role::resolve(Some("root")).expect_err("unknown role should error");
    match err {
        CliError::InvalidRole { value } => assert_eq!(value, "root"),
        other => panic!("expected InvalidRole, found {other:?}"),
    }
}

#[rstest]
fn forbidden_error_names_role_and_capability() {
    let err = Role::Reader
        .require(Capability::Admin)
        .expect_err("reader lacks admin");
    assert_eq!(err.to_string(), "role reader lacks the admin capability");
}

#[rstest]
fn route_args_default_database_and_start() {
    let config = RouteConfig::try_from(RouteArgs {
        department: Some("EST".into()),
        division: Some(String::new()),
        ..RouteArgs::default()
    })
    .expect("config should build");

    assert_eq!(config.access.database, Utf8PathBuf::from(DEFAULT_DATABASE));
    assert_eq!(config.access.role, Role::Reader);
    assert_eq!(config.filter, PointFilter::default().with_department("EST"));
    assert_eq!(config.start_index, 0);
    assert_eq!(config.atomicity, Atomicity::BestEffort);
}

#[rstest]
fn route_args_map_all_or_nothing() {
    let config = RouteConfig::try_from(RouteArgs {
        all_or_nothing: true,
        role: Some("operator".into()),
        ..RouteArgs::default()
    })
    .expect("config should build");

    assert_eq!(config.atomicity, Atomicity::AllOrNothing);
    assert_eq!(config.access.role, Role::Operator);
}

#[rstest]
fn route_args_reject_unknown_roles() {
    let err = RouteConfig::try_from(RouteArgs {
        role: Some("superuser".into()),
        ..RouteArgs::default()
    })
    .expect_err("unknown role should error");
    assert!(matches!(err, CliError::InvalidRole { .. }));
}

#[rstest]
fn resequence_without_threshold_errors() {
    let err = ResequenceConfig::try_from(ResequenceArgs::default())
        .expect_err("missing threshold should error");
    match err {
        CliError::MissingArgument { field, env } => {
            assert_eq!(field, ARG_FROM);
            assert_eq!(env, ENV_FROM);
        }
        other => panic!("expected MissingArgument, found {other:?}"),
    }
}

#[rstest]
fn import_without_input_errors() {
    let err = ImportConfig::try_from(ImportArgs::default()).expect_err("missing input");
    match err {
        CliError::MissingArgument { field, env } => {
            assert_eq!(field, ARG_INPUT);
            assert_eq!(env, ENV_INPUT);
        }
        other => panic!("expected MissingArgument, found {other:?}"),
    }
}

#[rstest]
fn merge_layers_maps_configuration_errors() {
    use ortho_config::MergeComposer;
    use serde_json::json;

    let mut composer = MergeComposer::new();
    composer.push_cli(json!({ "from": "first" }));

    let err = resequence_config_from_layers_for_test(composer.layers())
        .expect_err("invalid config layer should map to CliError::Configuration");
    match err {
        CliError::Configuration(_) => {}
        other => panic!("expected CliError::Configuration, found {other:?}"),
    }
}

#[rstest]
fn merge_layers_honour_precedence() {
    use ortho_config::MergeComposer;
    use serde_json::json;

    let mut composer = MergeComposer::new();
    composer.push_file(
        json!({ "database": "from-file.db", "from": 5, "role": "admin" }),
        None,
    );
    composer.push_environment(json!({ "from": 7, "block": "BLK002" }));
    composer.push_cli(json!({ "database": "from-cli.db" }));

    let config = resequence_config_from_layers_for_test(composer.layers())
        .expect("merged config should build");
    assert_eq!(config.access.database, Utf8PathBuf::from("from-cli.db"));
    assert_eq!(config.access.role, Role::Admin);
    assert_eq!(config.threshold, 7);
    assert_eq!(config.filter, PointFilter::default().with_block("BLK002"));
    assert!(!config.commit);
}

#[rstest]
fn resequence_capability_depends_on_commit() {
    let workspace = Workspace::new();
    let preview = Request::Resequence(workspace.resequence(Role::Reader, 2, false));
    let commit = Request::Resequence(workspace.resequence(Role::Reader, 2, true));

    assert_eq!(preview.required_capability(), Capability::Read);
    assert_eq!(commit.required_capability(), Capability::Admin);
}

#[rstest]
#[case(RouteAction::List, Capability::Read)]
#[case(RouteAction::Optimize, Capability::Read)]
#[case(RouteAction::UpdateOrder, Capability::Write)]
#[case(RouteAction::UpdateNumbers, Capability::Admin)]
fn route_actions_require_capabilities(#[case] action: RouteAction, #[case] expected: Capability) {
    let workspace = Workspace::new();
    let request = Request::Route(action, workspace.route(Role::Reader));
    assert_eq!(request.required_capability(), expected);
}

#[rstest]
fn load_points_reads_records_and_labels() {
    let workspace = Workspace::new();
    let path = workspace.write("points.json", super::helpers::POINTS_JSON);

    let points = load_points(&path).expect("points should load");
    assert_eq!(points.len(), 4);
    assert_eq!(points[0].label.as_deref(), Some("gate"));
    assert_eq!(points[1].label, None);
    assert!((points[2].lat() - 10.0).abs() < f64::EPSILON);
}

#[rstest]
fn load_points_missing_file_returns_open_error() {
    let workspace = Workspace::new();
    let path = workspace.database().with_file_name("absent.json");

    let err = load_points(&path).expect_err("missing file should error");
    match err {
        CliError::OpenImport { path: reported, .. } => assert_eq!(reported, path),
        other => panic!("expected OpenImport, found {other:?}"),
    }
}

#[rstest]
fn load_points_rejects_malformed_json() {
    let workspace = Workspace::new();
    let path = workspace.write("broken.json", r#"{"id": 1}"#);

    let err = load_points(&path).expect_err("object instead of array should error");
    assert!(matches!(err, CliError::ParseImport { .. }));
}

#[rstest]
#[case(r#"[{"id": 9, "number": 1, "department": "EST", "division": "D", "block": "B", "lat": 91.0, "lon": 0.0}]"#)]
#[case(r#"[{"id": 9, "number": 0, "department": "EST", "division": "D", "block": "B", "lat": 1.0, "lon": 0.0}]"#)]
fn load_points_rejects_invalid_points(#[case] contents: &str) {
    let workspace = Workspace::new();
    let path = workspace.write("invalid.json", contents);

    let err = load_points(&path).expect_err("invalid point should error");
    assert!(matches!(err, CliError::InvalidPoint { .. }));
}

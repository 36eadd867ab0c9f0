//! Focused unit tests covering export CLI configuration and execution.

use super::helpers::{Workspace, bundle_relations, write_utf8};
use super::*;
use crate::export::{ExportArgs, ExportConfig, execute_export};
use camino::Utf8PathBuf;
use routepack_data::ShutdownReason;
use rstest::rstest;
use std::time::Duration;

fn config_for(workspace: &Workspace) -> ExportConfig {
    ExportConfig::try_from(ExportArgs {
        store: Some(workspace.interstate_store()),
        output_dir: Some(workspace.root().join("bundles")),
        ..ExportArgs::default()
    })
    .expect("config should build")
}

#[rstest]
fn converting_export_without_store_errors() {
    let err = ExportConfig::try_from(ExportArgs::default()).expect_err("missing store");
    match err {
        CliError::MissingArgument { field, env } => {
            assert_eq!(field, ARG_STORE);
            assert_eq!(env, ENV_EXPORT_STORE);
        }
        other => panic!("expected MissingArgument, found {other:?}"),
    }
}

#[rstest]
fn export_config_applies_defaults() {
    let args = ExportArgs {
        store: Some(Utf8PathBuf::from("routes.db")),
        ..ExportArgs::default()
    };

    let config = ExportConfig::try_from(args).expect("config should build");

    assert_eq!(config.output_dir, Utf8PathBuf::from("."));
    assert_eq!(config.prefix, "routes");
    assert_eq!(config.coordinate_threshold, 100_000);
    assert_eq!(config.queue_timeout, Duration::from_secs(300));
    assert_eq!(config.queue_capacity, None);
}

#[rstest]
fn export_config_maps_onto_pipeline_options() {
    let args = ExportArgs {
        store: Some(Utf8PathBuf::from("routes.db")),
        output_dir: Some(Utf8PathBuf::from("out")),
        prefix: Some("il".to_owned()),
        coordinate_threshold: Some(42),
        queue_timeout_secs: Some(7),
        queue_capacity: Some(2),
    };

    let options = ExportConfig::try_from(args)
        .expect("config should build")
        .export_options();

    assert_eq!(options.grouping.coordinate_threshold, 42);
    assert_eq!(options.bundle.output_dir, Utf8PathBuf::from("out"));
    assert_eq!(options.bundle.file_prefix, "il");
    assert_eq!(options.bundle.queue_timeout, Duration::from_secs(7));
    assert_eq!(options.queue_capacity, Some(2));
}

#[rstest]
#[case::zero_timeout(None, Some(0), ARG_QUEUE_TIMEOUT_SECS)]
#[case::empty_prefix(Some(""), None, ARG_PREFIX)]
#[case::nested_prefix(Some("a/b"), None, ARG_PREFIX)]
fn export_config_rejects_unusable_values(
    #[case] prefix: Option<&str>,
    #[case] timeout: Option<u64>,
    #[case] expected_field: &'static str,
) {
    let args = ExportArgs {
        store: Some(Utf8PathBuf::from("routes.db")),
        prefix: prefix.map(str::to_owned),
        queue_timeout_secs: timeout,
        ..ExportArgs::default()
    };

    let err = ExportConfig::try_from(args).expect_err("value should be rejected");
    match err {
        CliError::InvalidArgument { field, .. } => assert_eq!(field, expected_field),
        other => panic!("expected InvalidArgument, found {other:?}"),
    }
}

#[rstest]
fn validate_sources_reports_missing_store() {
    let workspace = Workspace::new();
    let config = ExportConfig::try_from(ExportArgs {
        store: Some(workspace.root().join("missing.db")),
        ..ExportArgs::default()
    })
    .expect("config should build");

    let err = config.validate_sources().expect_err("store is missing");
    match err {
        CliError::MissingSourceFile { field, .. } => assert_eq!(field, ARG_STORE),
        other => panic!("unexpected error {other:?}"),
    }
}

#[rstest]
fn validate_sources_rejects_store_directory() {
    let workspace = Workspace::new();
    let config = ExportConfig::try_from(ExportArgs {
        store: Some(workspace.root().to_path_buf()),
        ..ExportArgs::default()
    })
    .expect("config should build");

    let err = config.validate_sources().expect_err("store is a directory");
    match err {
        CliError::SourcePathNotFile { field, .. } => assert_eq!(field, ARG_STORE),
        other => panic!("unexpected error {other:?}"),
    }
}

#[rstest]
fn validate_sources_rejects_output_file() {
    let workspace = Workspace::new();
    let output = workspace.root().join("bundles");
    write_utf8(&output, b"not a directory");
    let config = ExportConfig {
        output_dir: output,
        ..config_for(&workspace)
    };

    let err = config
        .validate_sources()
        .expect_err("expected output directory validation to fail");
    assert!(
        matches!(err, CliError::OutputDirectoryNotDirectory { .. }),
        "unexpected error {err:?}"
    );
}

#[rstest]
fn validate_sources_accepts_absent_output_dir() {
    let workspace = Workspace::new();
    let config = config_for(&workspace);

    config.validate_sources().expect("absent output dir is created later");
}

#[rstest]
fn execute_export_writes_one_bundle() {
    let workspace = Workspace::new();
    let config = config_for(&workspace);

    let report = execute_export(&config).expect("export should succeed");

    assert_eq!(report.relations, 2);
    assert_eq!(report.groups, 1);
    assert_eq!(report.bundle.shutdown, ShutdownReason::QueueClosed);
    assert_eq!(
        report.bundle.files,
        vec![workspace.root().join("bundles/routes-000001.osm.bz2")]
    );
    assert_eq!(bundle_relations(&report.bundle.files[0]), 2);
}

#[rstest]
fn execute_export_wraps_store_errors() {
    let workspace = Workspace::new();
    let store = workspace.root().join("empty.db");
    write_utf8(&store, b"");
    let config = ExportConfig {
        store,
        ..config_for(&workspace)
    };

    let err = execute_export(&config).expect_err("empty database has no tables");
    assert!(
        matches!(err, CliError::OpenStore { .. } | CliError::Export { .. }),
        "unexpected error {err:?}"
    );
}

//! Export command implementation for the routepack CLI.

use std::time::Duration;

use camino::{Utf8Path, Utf8PathBuf};
use clap::Parser;
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use routepack_core::SqliteRouteStore;
use routepack_data::{
    BundleOptions, DEFAULT_COORDINATE_THRESHOLD, DEFAULT_FILE_PREFIX, DEFAULT_QUEUE_TIMEOUT,
    ExportOptions, ExportReport, GroupingOptions, export_routes,
};
use serde::{Deserialize, Serialize};

use crate::{
    ARG_COORDINATE_THRESHOLD, ARG_OUTPUT_DIR, ARG_PREFIX, ARG_QUEUE_CAPACITY,
    ARG_QUEUE_TIMEOUT_SECS, ARG_STORE, CliError, ENV_EXPORT_STORE,
};

/// CLI arguments for the `export` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    name = "export",
    long_about = "Read route relations from a SQLite route store, group \
                 them by network, ref and modifier, and write each group \
                 as a bzip2-compressed OSM XML bundle. Options can come \
                 from CLI flags, configuration files, or environment \
                 variables.",
    about = "Export route relations as OSM XML bundles"
)]
#[ortho_config(prefix = "ROUTEPACK")]
pub(crate) struct ExportArgs {
    /// Path to the SQLite route store.
    #[arg(long = ARG_STORE, value_name = "path")]
    #[serde(default)]
    pub(crate) store: Option<Utf8PathBuf>,
    /// Directory receiving the bundles (default: current directory).
    #[arg(long = ARG_OUTPUT_DIR, value_name = "dir")]
    #[serde(default)]
    pub(crate) output_dir: Option<Utf8PathBuf>,
    /// Bundle file name prefix (default: "routes").
    #[arg(long = ARG_PREFIX, value_name = "name")]
    #[serde(default)]
    pub(crate) prefix: Option<String>,
    /// Coordinates accumulated before a group may be flushed.
    #[arg(long = ARG_COORDINATE_THRESHOLD, value_name = "count")]
    #[serde(default)]
    pub(crate) coordinate_threshold: Option<usize>,
    /// Seconds the writer waits for a group before stopping.
    #[arg(long = ARG_QUEUE_TIMEOUT_SECS, value_name = "secs")]
    #[serde(default)]
    pub(crate) queue_timeout_secs: Option<u64>,
    /// Bound on queued groups; unbounded when omitted.
    #[arg(long = ARG_QUEUE_CAPACITY, value_name = "groups")]
    #[serde(default)]
    pub(crate) queue_capacity: Option<usize>,
}

impl ExportArgs {
    pub(crate) fn into_config(self) -> Result<ExportConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        ExportConfig::try_from(merged)
    }
}

/// Resolved `export` command configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ExportConfig {
    pub(crate) store: Utf8PathBuf,
    pub(crate) output_dir: Utf8PathBuf,
    pub(crate) prefix: String,
    pub(crate) coordinate_threshold: usize,
    pub(crate) queue_timeout: Duration,
    pub(crate) queue_capacity: Option<usize>,
}

impl ExportConfig {
    pub(crate) fn validate_sources(&self) -> Result<(), CliError> {
        match routepack_fs::file_is_file(&self.store) {
            Ok(true) => {}
            Ok(false) => {
                return Err(CliError::SourcePathNotFile {
                    field: ARG_STORE,
                    path: self.store.clone(),
                });
            }
            Err(source) if source.kind() == std::io::ErrorKind::NotFound => {
                return Err(CliError::MissingSourceFile {
                    field: ARG_STORE,
                    path: self.store.clone(),
                });
            }
            Err(source) => {
                return Err(CliError::InspectSourcePath {
                    field: ARG_STORE,
                    path: self.store.clone(),
                    source,
                });
            }
        }
        Self::require_directory_or_absent(&self.output_dir)
    }

    fn require_directory_or_absent(path: &Utf8Path) -> Result<(), CliError> {
        if routepack_fs::dir_exists(path).unwrap_or(false) {
            return Ok(());
        }
        match routepack_fs::file_is_file(path) {
            Ok(true) => Err(CliError::OutputDirectoryNotDirectory {
                path: path.to_path_buf(),
            }),
            _ => Ok(()),
        }
    }

    pub(crate) fn export_options(&self) -> ExportOptions {
        ExportOptions {
            grouping: GroupingOptions {
                coordinate_threshold: self.coordinate_threshold,
            },
            bundle: BundleOptions {
                output_dir: self.output_dir.clone(),
                file_prefix: self.prefix.clone(),
                queue_timeout: self.queue_timeout,
            },
            queue_capacity: self.queue_capacity,
            ..ExportOptions::default()
        }
    }
}

impl TryFrom<ExportArgs> for ExportConfig {
    type Error = CliError;

    fn try_from(args: ExportArgs) -> Result<Self, Self::Error> {
        let store = args.store.ok_or(CliError::MissingArgument {
            field: ARG_STORE,
            env: ENV_EXPORT_STORE,
        })?;
        let prefix = args
            .prefix
            .unwrap_or_else(|| DEFAULT_FILE_PREFIX.to_owned());
        if prefix.is_empty() || prefix.contains(['/', '\\']) {
            return Err(CliError::InvalidArgument {
                field: ARG_PREFIX,
                reason: "must be a non-empty file name without separators",
            });
        }
        let queue_timeout = args
            .queue_timeout_secs
            .map_or(DEFAULT_QUEUE_TIMEOUT, Duration::from_secs);
        if queue_timeout.is_zero() {
            return Err(CliError::InvalidArgument {
                field: ARG_QUEUE_TIMEOUT_SECS,
                reason: "must be at least one second",
            });
        }
        Ok(Self {
            store,
            output_dir: args.output_dir.unwrap_or_else(|| Utf8PathBuf::from(".")),
            prefix,
            coordinate_threshold: args
                .coordinate_threshold
                .unwrap_or(DEFAULT_COORDINATE_THRESHOLD),
            queue_timeout,
            queue_capacity: args.queue_capacity,
        })
    }
}

pub(crate) fn run_export(args: ExportArgs) -> Result<ExportReport, CliError> {
    let config = resolve_export_config(args)?;
    execute_export(&config)
}

pub(crate) fn resolve_export_config(args: ExportArgs) -> Result<ExportConfig, CliError> {
    let config = args.into_config()?;
    config.validate_sources()?;
    Ok(config)
}

pub(crate) fn execute_export(config: &ExportConfig) -> Result<ExportReport, CliError> {
    let store =
        SqliteRouteStore::open(config.store.as_std_path()).map_err(|source| {
            CliError::OpenStore {
                path: config.store.clone(),
                source,
            }
        })?;
    export_routes(&store, config.export_options()).map_err(|source| CliError::Export {
        source: Box::new(source),
    })
}

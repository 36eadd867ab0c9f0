//! Error types emitted by the routepack CLI.
//!
//! Pipeline and import failures are boxed behind their source so the enum
//! stays small for the many helpers returning `Result<_, CliError>`.

use std::sync::Arc;

use camino::Utf8PathBuf;
use routepack_core::StoreError;
use routepack_data::{ImportError, PipelineError};
use thiserror::Error;

/// Errors emitted by the routepack CLI.
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
    /// An option was supplied with a value the pipeline cannot use.
    #[error("invalid {field}: {reason}")]
    InvalidArgument {
        field: &'static str,
        reason: &'static str,
    },
    /// A referenced input path does not exist on disk.
    #[error("{field} path {path:?} does not exist")]
    MissingSourceFile {
        field: &'static str,
        path: Utf8PathBuf,
    },
    /// A referenced input path exists but is not a file.
    #[error("{field} path {path:?} exists but is not a file")]
    SourcePathNotFile {
        field: &'static str,
        path: Utf8PathBuf,
    },
    /// A referenced input path could not be inspected due to an IO error.
    #[error("failed to inspect {field} path {path:?}: {source}")]
    InspectSourcePath {
        field: &'static str,
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// The output directory exists but is not a directory.
    #[error("output directory {path:?} is not a directory")]
    OutputDirectoryNotDirectory { path: Utf8PathBuf },
    /// Opening the route store failed.
    #[error("failed to open route store at {path:?}: {source}")]
    OpenStore {
        path: Utf8PathBuf,
        #[source]
        source: StoreError,
    },
    /// The export pipeline stopped with an error.
    #[error("route export failed: {source}")]
    Export {
        #[source]
        source: Box<PipelineError>,
    },
    /// Importing the PBF extract failed.
    #[error("OSM import failed: {source}")]
    Import {
        #[source]
        source: Box<ImportError>,
    },
}

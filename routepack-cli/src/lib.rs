//! Command-line interface for routepack's offline tooling.
#![forbid(unsafe_code)]

use clap::{Parser, Subcommand};

mod error;
mod export;
mod import;

pub use error::CliError;

use export::ExportArgs;
use import::ImportArgs;

pub(crate) const ARG_STORE: &str = "store";
pub(crate) const ARG_OUTPUT_DIR: &str = "output-dir";
pub(crate) const ARG_PREFIX: &str = "prefix";
pub(crate) const ARG_COORDINATE_THRESHOLD: &str = "coordinate-threshold";
pub(crate) const ARG_QUEUE_TIMEOUT_SECS: &str = "queue-timeout-secs";
pub(crate) const ARG_QUEUE_CAPACITY: &str = "queue-capacity";
pub(crate) const ARG_OSM_PBF: &str = "osm-pbf";
pub(crate) const ENV_EXPORT_STORE: &str = "ROUTEPACK_CMDS_EXPORT_STORE";
pub(crate) const ENV_IMPORT_STORE: &str = "ROUTEPACK_CMDS_IMPORT_STORE";
pub(crate) const ENV_IMPORT_OSM_PBF: &str = "ROUTEPACK_CMDS_IMPORT_OSM_PBF";

/// Run the routepack CLI with the current process arguments and environment.
pub fn run() -> Result<(), CliError> {
    let cli = Cli::try_parse().map_err(CliError::ArgumentParsing)?;
    match cli.command {
        Command::Export(args) => {
            export::run_export(args)?;
        }
        Command::Import(args) => {
            import::run_import(args)?;
        }
    }
    Ok(())
}

#[derive(Debug, Parser)]
#[command(
    name = "routepack",
    about = "Package OSM route relations into compressed OSM XML bundles",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Write grouped route relations from a store as `.osm.bz2` bundles.
    Export(ExportArgs),
    /// Load an OSM PBF extract into a SQLite route store.
    Import(ImportArgs),
}

#[cfg(test)]
mod tests;

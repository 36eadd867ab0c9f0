//! Import command implementation for the routepack CLI.

use camino::Utf8PathBuf;
use clap::Parser;
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use routepack_data::{ImportSummary, import_osm_pbf};
use serde::{Deserialize, Serialize};

use crate::{ARG_OSM_PBF, ARG_STORE, CliError, ENV_IMPORT_OSM_PBF, ENV_IMPORT_STORE};

/// CLI arguments for the `import` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    name = "import",
    long_about = "Load nodes, ways and relations from an OpenStreetMap PBF \
                 extract into a SQLite route store. The store is created \
                 when missing and existing rows are replaced.",
    about = "Import an OSM PBF extract into a route store"
)]
#[ortho_config(prefix = "ROUTEPACK")]
pub(crate) struct ImportArgs {
    /// Path to the OpenStreetMap PBF file.
    #[arg(long = ARG_OSM_PBF, value_name = "path")]
    #[serde(default)]
    pub(crate) osm_pbf: Option<Utf8PathBuf>,
    /// Path to the SQLite route store to write.
    #[arg(long = ARG_STORE, value_name = "path")]
    #[serde(default)]
    pub(crate) store: Option<Utf8PathBuf>,
}

impl ImportArgs {
    fn into_config(self) -> Result<ImportConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        ImportConfig::try_from(merged)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ImportConfig {
    pub(crate) osm_pbf: Utf8PathBuf,
    pub(crate) store: Utf8PathBuf,
}

impl ImportConfig {
    pub(crate) fn validate_sources(&self) -> Result<(), CliError> {
        match routepack_fs::file_is_file(&self.osm_pbf) {
            Ok(true) => Ok(()),
            Ok(false) => Err(CliError::SourcePathNotFile {
                field: ARG_OSM_PBF,
                path: self.osm_pbf.clone(),
            }),
            Err(source) if source.kind() == std::io::ErrorKind::NotFound => {
                Err(CliError::MissingSourceFile {
                    field: ARG_OSM_PBF,
                    path: self.osm_pbf.clone(),
                })
            }
            Err(source) => Err(CliError::InspectSourcePath {
                field: ARG_OSM_PBF,
                path: self.osm_pbf.clone(),
                source,
            }),
        }
    }
}

impl TryFrom<ImportArgs> for ImportConfig {
    type Error = CliError;

    fn try_from(args: ImportArgs) -> Result<Self, Self::Error> {
        let osm_pbf = args.osm_pbf.ok_or(CliError::MissingArgument {
            field: ARG_OSM_PBF,
            env: ENV_IMPORT_OSM_PBF,
        })?;
        let store = args.store.ok_or(CliError::MissingArgument {
            field: ARG_STORE,
            env: ENV_IMPORT_STORE,
        })?;
        Ok(Self { osm_pbf, store })
    }
}

pub(crate) fn run_import(args: ImportArgs) -> Result<ImportSummary, CliError> {
    let config = args.into_config()?;
    config.validate_sources()?;
    import_osm_pbf(config.osm_pbf.as_std_path(), config.store.as_std_path()).map_err(|source| {
        CliError::Import {
            source: Box::new(source),
        }
    })
}

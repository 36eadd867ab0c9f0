//! Loading OSM PBF extracts into the SQLite route store layout.

use std::path::{Path, PathBuf};

use log::{info, warn};
use osmpbf::{Element, ElementReader, RelMemberType};
use routepack_core::{Member, initialise_schema};
use rusqlite::{Connection, Transaction, params};
use thiserror::Error;

use crate::geometry::WGS84_SRID;

/// Element counts written by [`import_osm_pbf`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ImportSummary {
    /// Nodes written, including dense-node entries.
    pub nodes: u64,
    /// Ways written.
    pub ways: u64,
    /// Relations written.
    pub relations: u64,
}

/// Errors returned when importing an OSM PBF file.
#[derive(Debug, Error)]
pub enum ImportError {
    /// The PBF file could not be opened.
    #[error("failed to open OSM PBF file at {path:?}")]
    Open {
        /// Underlying decoder error.
        #[source]
        source: osmpbf::Error,
        /// Requested file.
        path: PathBuf,
    },
    /// The PBF payload could not be decoded.
    #[error("failed to decode OSM PBF data at {path:?}")]
    Decode {
        /// Underlying decoder error.
        #[source]
        source: osmpbf::Error,
        /// Requested file.
        path: PathBuf,
    },
    /// Writing the route store failed.
    #[error("failed to write route store at {path:?}")]
    Database {
        /// Underlying SQLite error.
        #[source]
        source: rusqlite::Error,
        /// Store location.
        path: PathBuf,
    },
}

/// Read `pbf` and write its nodes, ways and relations into the store at
/// `database`.
///
/// The store is created when missing. Positions are stored as WGS84 1e-7
/// degree integers and the whole import runs in one transaction; rows with
/// an existing id are replaced.
///
/// # Examples
/// ```no_run
/// use std::path::Path;
/// use routepack_data::import_osm_pbf;
///
/// # fn main() -> Result<(), routepack_data::ImportError> {
/// let summary = import_osm_pbf(Path::new("illinois.osm.pbf"), Path::new("routes.db"))?;
/// println!("Imported {} relations", summary.relations);
/// # Ok(())
/// # }
/// ```
pub fn import_osm_pbf(pbf: &Path, database: &Path) -> Result<ImportSummary, ImportError> {
    let reader = ElementReader::from_path(pbf).map_err(|source| ImportError::Open {
        source,
        path: pbf.to_path_buf(),
    })?;
    let database_error = |source| ImportError::Database {
        source,
        path: database.to_path_buf(),
    };

    let mut connection = Connection::open(database).map_err(database_error)?;
    let transaction = connection.transaction().map_err(database_error)?;
    initialise_schema(&transaction, WGS84_SRID).map_err(database_error)?;

    let mut importer = ElementImporter::new(&transaction);
    reader
        .for_each(|element| importer.insert(&element))
        .map_err(|source| ImportError::Decode {
            source,
            path: pbf.to_path_buf(),
        })?;
    let summary = importer.finish().map_err(database_error)?;
    transaction.commit().map_err(database_error)?;

    info!(
        "Imported {} nodes, {} ways and {} relations into {}",
        summary.nodes,
        summary.ways,
        summary.relations,
        database.display()
    );
    Ok(summary)
}

/// Writes decoded elements, remembering the first database failure so the
/// decoder callback never has to return an error.
struct ElementImporter<'t, 'c> {
    transaction: &'t Transaction<'c>,
    summary: ImportSummary,
    failure: Option<rusqlite::Error>,
}

impl<'t, 'c> ElementImporter<'t, 'c> {
    const fn new(transaction: &'t Transaction<'c>) -> Self {
        Self {
            transaction,
            summary: ImportSummary {
                nodes: 0,
                ways: 0,
                relations: 0,
            },
            failure: None,
        }
    }

    fn insert(&mut self, element: &Element<'_>) {
        if self.failure.is_some() {
            return;
        }
        if let Err(err) = self.try_insert(element) {
            self.failure = Some(err);
        }
    }

    fn try_insert(&mut self, element: &Element<'_>) -> rusqlite::Result<()> {
        match element {
            Element::Node(node) => {
                self.insert_node(node.id(), node.decimicro_lat(), node.decimicro_lon())
            }
            Element::DenseNode(node) => {
                self.insert_node(node.id(), node.decimicro_lat(), node.decimicro_lon())
            }
            Element::Way(way) => {
                let tags = flat_tags(way.tags());
                let nodes: Vec<i64> = way.refs().collect();
                self.transaction
                    .prepare_cached(
                        "INSERT OR REPLACE INTO planet_osm_ways (id, tags, nodes) VALUES (?1, ?2, ?3)",
                    )?
                    .execute(params![way.id(), to_json(&tags)?, to_json(&nodes)?])?;
                self.summary.ways += 1;
                Ok(())
            }
            Element::Relation(relation) => {
                let tags = flat_tags(relation.tags());
                let mut members = Vec::new();
                for member in relation.members() {
                    let marker = match member.member_type {
                        RelMemberType::Node => Member::Node(member.member_id),
                        RelMemberType::Way => Member::Way(member.member_id),
                        RelMemberType::Relation => Member::Relation(member.member_id),
                    };
                    let role = member.role().unwrap_or_else(|err| {
                        warn!(
                            "relation {}: unreadable member role ({err}); storing it empty",
                            relation.id()
                        );
                        ""
                    });
                    members.push(marker.to_string());
                    members.push(role.to_owned());
                }
                self.transaction
                    .prepare_cached(
                        "INSERT OR REPLACE INTO planet_osm_rels (id, tags, members) VALUES (?1, ?2, ?3)",
                    )?
                    .execute(params![relation.id(), to_json(&tags)?, to_json(&members)?])?;
                self.summary.relations += 1;
                Ok(())
            }
        }
    }

    fn insert_node(&mut self, id: i64, lat: i32, lon: i32) -> rusqlite::Result<()> {
        self.transaction
            .prepare_cached("INSERT OR REPLACE INTO planet_osm_nodes (id, lat, lon) VALUES (?1, ?2, ?3)")?
            .execute(params![id, lat, lon])?;
        self.summary.nodes += 1;
        Ok(())
    }

    fn finish(self) -> rusqlite::Result<ImportSummary> {
        self.failure.map_or(Ok(self.summary), Err)
    }
}

fn flat_tags<'a>(tags: impl Iterator<Item = (&'a str, &'a str)>) -> Vec<&'a str> {
    tags.flat_map(|(key, value)| [key, value]).collect()
}

fn to_json<T: serde::Serialize + ?Sized>(value: &T) -> rusqlite::Result<String> {
    serde_json::to_string(value).map_err(|err| rusqlite::Error::ToSqlConversionFailure(Box::new(err)))
}

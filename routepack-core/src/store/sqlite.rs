//! SQLite-backed route store.
//!
//! The layout mirrors the slim tables of an osm2pgsql import:
//! `planet_osm_rels(id, tags, members)`, `planet_osm_ways(id, tags, nodes)`
//! and `planet_osm_nodes(id, lat, lon)`. Array columns hold JSON arrays:
//! tags are flattened `[k0, v0, ...]`, members are `[marker, role, ...]`
//! pairs and nodes are ids. A single-row `store_metadata` table records the
//! spatial reference id of the node positions.

use std::{
    collections::HashMap,
    fmt,
    path::{Path, PathBuf},
};

use rusqlite::{Connection, OpenFlags, OptionalExtension, params, params_from_iter};
use serde::de::DeserializeOwned;

use super::{RawPosition, RelationRecord, RouteStore, StoreError, WayRecord};
use crate::{Member, Tags, tags_from_flat};

/// SQLite limits bound parameters per statement to 999 by default. The store
/// chunks `IN` queries to remain below that ceiling.
const SQLITE_MAX_VARIABLE_NUMBER: usize = 999;

const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS planet_osm_rels (
        id INTEGER PRIMARY KEY,
        tags TEXT NOT NULL,
        members TEXT NOT NULL
    );
    CREATE TABLE IF NOT EXISTS planet_osm_ways (
        id INTEGER PRIMARY KEY,
        tags TEXT NOT NULL,
        nodes TEXT NOT NULL
    );
    CREATE TABLE IF NOT EXISTS planet_osm_nodes (
        id INTEGER PRIMARY KEY,
        lat INTEGER NOT NULL,
        lon INTEGER NOT NULL
    );
    CREATE TABLE IF NOT EXISTS store_metadata (
        srid INTEGER NOT NULL
    );
";

/// Create the route store tables and record `srid` if none is set yet.
pub fn initialise_schema(connection: &Connection, srid: i32) -> rusqlite::Result<()> {
    connection.execute_batch(SCHEMA)?;
    connection.execute(
        "INSERT INTO store_metadata (srid)
         SELECT ?1 WHERE NOT EXISTS (SELECT 1 FROM store_metadata)",
        params![srid],
    )?;
    Ok(())
}

/// Read-only [`RouteStore`] over a SQLite database.
pub struct SqliteRouteStore {
    connection: Connection,
    path: PathBuf,
}

impl fmt::Debug for SqliteRouteStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SqliteRouteStore")
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

impl SqliteRouteStore {
    /// Open an existing store read-only.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let path = path.as_ref();
        let connection = Connection::open_with_flags(path, OpenFlags::SQLITE_OPEN_READ_ONLY)
            .map_err(|source| StoreError::Open {
                path: path.to_path_buf(),
                source: Box::new(source),
            })?;
        Ok(Self {
            connection,
            path: path.to_path_buf(),
        })
    }

    /// Location of the underlying database file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl RouteStore for SqliteRouteStore {
    fn relations_with_keys(&self, keys: &[&str]) -> Result<Vec<RelationRecord>, StoreError> {
        const QUERY: &str = "relations_with_keys";

        // Prefilter in SQL on array membership; values can match too, so the
        // decoded tags are checked again below.
        let mut sql = String::from("SELECT id, tags FROM planet_osm_rels");
        for (index, _) in keys.iter().enumerate() {
            let clause = if index == 0 { " WHERE" } else { " AND" };
            sql.push_str(&format!(
                "{clause} EXISTS (SELECT 1 FROM json_each(planet_osm_rels.tags) WHERE value = ?{})",
                index + 1
            ));
        }

        let mut statement = self.connection.prepare(&sql).map_err(query_error(QUERY))?;
        let mut rows = statement
            .query(params_from_iter(keys.iter()))
            .map_err(query_error(QUERY))?;

        let mut relations = Vec::new();
        while let Some(row) = rows.next().map_err(query_error(QUERY))? {
            let id: i64 = row.get(0).map_err(query_error(QUERY))?;
            let payload: String = row.get(1).map_err(query_error(QUERY))?;
            let tags = decode_tags("relation", id, &payload)?;
            if keys.iter().all(|key| tags.contains_key(*key)) {
                relations.push(RelationRecord { id, tags });
            }
        }
        Ok(relations)
    }

    fn relation_members(&self, id: i64) -> Result<Option<Vec<Member>>, StoreError> {
        const QUERY: &str = "relation_members";

        let payload: Option<String> = self
            .connection
            .query_row(
                "SELECT members FROM planet_osm_rels WHERE id = ?1",
                params![id],
                |row| row.get(0),
            )
            .optional()
            .map_err(query_error(QUERY))?;
        let Some(payload) = payload else {
            return Ok(None);
        };

        let flat: Vec<String> = decode_json("relation", id, "members", &payload)?;
        // Markers that do not parse are dropped.
        let members = flat
            .iter()
            .step_by(2)
            .filter_map(|marker| marker.parse::<Member>().ok())
            .collect();
        Ok(Some(members))
    }

    fn way(&self, id: i64) -> Result<Option<WayRecord>, StoreError> {
        const QUERY: &str = "way";

        let row: Option<(String, String)> = self
            .connection
            .query_row(
                "SELECT tags, nodes FROM planet_osm_ways WHERE id = ?1",
                params![id],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()
            .map_err(query_error(QUERY))?;
        let Some((tags, nodes)) = row else {
            return Ok(None);
        };

        Ok(Some(WayRecord {
            tags: decode_tags("way", id, &tags)?,
            nodes: decode_json("way", id, "nodes", &nodes)?,
        }))
    }

    fn node_positions(&self, ids: &[i64]) -> Result<HashMap<i64, RawPosition>, StoreError> {
        const QUERY: &str = "node_positions";

        let mut positions = HashMap::with_capacity(ids.len());
        for chunk in ids.chunks(SQLITE_MAX_VARIABLE_NUMBER) {
            let placeholders = vec!["?"; chunk.len()].join(", ");
            let sql = format!("SELECT id, lon, lat FROM planet_osm_nodes WHERE id IN ({placeholders})");
            let mut statement = self.connection.prepare(&sql).map_err(query_error(QUERY))?;
            let mut rows = statement
                .query(params_from_iter(chunk.iter()))
                .map_err(query_error(QUERY))?;
            while let Some(row) = rows.next().map_err(query_error(QUERY))? {
                let id: i64 = row.get(0).map_err(query_error(QUERY))?;
                let lon: i64 = row.get(1).map_err(query_error(QUERY))?;
                let lat: i64 = row.get(2).map_err(query_error(QUERY))?;
                positions.insert(id, RawPosition { lon, lat });
            }
        }
        Ok(positions)
    }

    fn srid(&self) -> Result<i32, StoreError> {
        self.connection
            .query_row("SELECT srid FROM store_metadata LIMIT 1", [], |row| {
                row.get(0)
            })
            .optional()
            .map_err(query_error("srid"))?
            .ok_or(StoreError::MissingSrid)
    }
}

fn query_error(query: &'static str) -> impl Fn(rusqlite::Error) -> StoreError {
    move |source| StoreError::Query {
        query,
        source: Box::new(source),
    }
}

fn decode_json<T>(
    kind: &'static str,
    id: i64,
    field: &'static str,
    payload: &str,
) -> Result<T, StoreError>
where
    T: DeserializeOwned,
{
    serde_json::from_str(payload).map_err(|source| StoreError::Decode {
        kind,
        id,
        field,
        source: Box::new(source),
    })
}

fn decode_tags(kind: &'static str, id: i64, payload: &str) -> Result<Tags, StoreError> {
    decode_json::<Vec<String>>(kind, id, "tags", payload).map(tags_from_flat)
}

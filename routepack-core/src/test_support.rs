//! Test-only, in-memory `RouteStore` implementation used by unit and
//! behaviour tests.

use std::cell::Cell;
use std::collections::{BTreeMap, HashMap};

use crate::{Member, RawPosition, RelationRecord, RouteStore, StoreError, Tags, WayRecord};

/// Spatial reference id for WGS84 positions stored as 1e-7 degrees.
pub const WGS84_SRID: i32 = 4326;

/// Encode WGS84 degrees into the store's fixed-point representation.
pub fn wgs84_position(lon: f64, lat: f64) -> RawPosition {
    RawPosition {
        lon: (lon * 1.0e7).round() as i64,
        lat: (lat * 1.0e7).round() as i64,
    }
}

/// In-memory `RouteStore` implementation used in tests.
///
/// Membership lookups are counted so tests can assert how often a relation
/// was expanded.
#[derive(Debug, Clone, Default)]
pub struct MemoryRouteStore {
    srid: i32,
    relations: BTreeMap<i64, (Tags, Vec<Member>)>,
    ways: BTreeMap<i64, WayRecord>,
    nodes: HashMap<i64, RawPosition>,
    membership_lookups: Cell<usize>,
}

impl MemoryRouteStore {
    /// Create an empty store declaring the given spatial reference id.
    pub fn with_srid(srid: i32) -> Self {
        Self {
            srid,
            ..Self::default()
        }
    }

    /// Create an empty WGS84 store.
    pub fn wgs84() -> Self {
        Self::with_srid(WGS84_SRID)
    }

    /// Add a relation.
    pub fn with_relation(mut self, id: i64, tags: Tags, members: Vec<Member>) -> Self {
        self.relations.insert(id, (tags, members));
        self
    }

    /// Add a way referencing the given node ids.
    pub fn with_way(mut self, id: i64, tags: Tags, nodes: Vec<i64>) -> Self {
        self.ways.insert(id, WayRecord { tags, nodes });
        self
    }

    /// Add a node at a raw position.
    pub fn with_node(mut self, id: i64, position: RawPosition) -> Self {
        self.nodes.insert(id, position);
        self
    }

    /// Add a way whose nodes are created from WGS84 coordinates.
    ///
    /// Node ids are allocated as `way_id * 1000 + index`.
    pub fn with_wgs84_way(mut self, id: i64, tags: Tags, coords: &[(f64, f64)]) -> Self {
        let mut nodes = Vec::with_capacity(coords.len());
        for (index, (lon, lat)) in (0_i64..).zip(coords) {
            let node_id = id * 1000 + index;
            self.nodes.insert(node_id, wgs84_position(*lon, *lat));
            nodes.push(node_id);
        }
        self.ways.insert(id, WayRecord { tags, nodes });
        self
    }

    /// Number of `relation_members` calls served so far.
    pub fn membership_lookups(&self) -> usize {
        self.membership_lookups.get()
    }

    /// Persist the store into a SQLite database at `path`.
    #[cfg(feature = "store-sqlite")]
    pub fn write_sqlite(&self, path: &std::path::Path) -> rusqlite::Result<()> {
        use crate::flatten_tags;
        use rusqlite::{Connection, params};

        let mut connection = Connection::open(path)?;
        let transaction = connection.transaction()?;
        crate::initialise_schema(&transaction, self.srid)?;
        for (id, (tags, members)) in &self.relations {
            let flat_members: Vec<String> = members
                .iter()
                .flat_map(|member| [member.to_string(), String::new()])
                .collect();
            transaction.execute(
                "INSERT INTO planet_osm_rels (id, tags, members) VALUES (?1, ?2, ?3)",
                params![id, to_json(&flatten_tags(tags))?, to_json(&flat_members)?],
            )?;
        }
        for (id, way) in &self.ways {
            transaction.execute(
                "INSERT INTO planet_osm_ways (id, tags, nodes) VALUES (?1, ?2, ?3)",
                params![id, to_json(&flatten_tags(&way.tags))?, to_json(&way.nodes)?],
            )?;
        }
        for (id, position) in &self.nodes {
            transaction.execute(
                "INSERT INTO planet_osm_nodes (id, lat, lon) VALUES (?1, ?2, ?3)",
                params![id, position.lat, position.lon],
            )?;
        }
        transaction.commit()
    }
}

#[cfg(feature = "store-sqlite")]
fn to_json<T: serde::Serialize>(value: &T) -> rusqlite::Result<String> {
    serde_json::to_string(value).map_err(|err| rusqlite::Error::ToSqlConversionFailure(Box::new(err)))
}

impl RouteStore for MemoryRouteStore {
    fn relations_with_keys(&self, keys: &[&str]) -> Result<Vec<RelationRecord>, StoreError> {
        Ok(self
            .relations
            .iter()
            .filter(|(_, (tags, _))| keys.iter().all(|key| tags.contains_key(*key)))
            .map(|(id, (tags, _))| RelationRecord {
                id: *id,
                tags: tags.clone(),
            })
            .collect())
    }

    fn relation_members(&self, id: i64) -> Result<Option<Vec<Member>>, StoreError> {
        self.membership_lookups.set(self.membership_lookups.get() + 1);
        Ok(self.relations.get(&id).map(|(_, members)| members.clone()))
    }

    fn way(&self, id: i64) -> Result<Option<WayRecord>, StoreError> {
        Ok(self.ways.get(&id).cloned())
    }

    fn node_positions(&self, ids: &[i64]) -> Result<HashMap<i64, RawPosition>, StoreError> {
        Ok(ids
            .iter()
            .filter_map(|id| self.nodes.get(id).map(|position| (*id, *position)))
            .collect())
    }

    fn srid(&self) -> Result<i32, StoreError> {
        Ok(self.srid)
    }
}

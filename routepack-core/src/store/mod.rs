//! Query protocol for the tagged route store.
//!
//! The [`RouteStore`] trait is the only seam between the extraction pipeline
//! and the underlying database. Implementations return typed records; raw
//! storage encodings (flattened tag arrays, member markers, fixed-point
//! coordinates) are decoded before they cross the trait boundary.

use std::collections::HashMap;
use std::error::Error as StdError;
use std::path::PathBuf;

use thiserror::Error;

use crate::{Member, Tags};

#[cfg(feature = "store-sqlite")]
mod sqlite;

#[cfg(feature = "store-sqlite")]
pub use sqlite::{SqliteRouteStore, initialise_schema};

/// A relation row returned by tag queries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelationRecord {
    /// Relation id.
    pub id: i64,
    /// Decoded relation tags.
    pub tags: Tags,
}

/// A way row: tags plus the ordered node references.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WayRecord {
    /// Decoded way tags.
    pub tags: Tags,
    /// Node ids in traversal order.
    pub nodes: Vec<i64>,
}

/// A node position in the store's native fixed-point encoding.
///
/// Interpretation depends on the store's coordinate reference system; see
/// [`RouteStore::srid`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RawPosition {
    /// Encoded longitude (or easting).
    pub lon: i64,
    /// Encoded latitude (or northing).
    pub lat: i64,
}

/// Errors raised by [`RouteStore`] implementations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The backing database could not be opened.
    #[error("failed to open route store at {path:?}: {source}")]
    Open {
        /// Location of the store.
        path: PathBuf,
        /// Driver error.
        #[source]
        source: Box<dyn StdError + Send + Sync>,
    },
    /// A query against the store failed.
    #[error("route store query `{query}` failed: {source}")]
    Query {
        /// Short name of the failing query.
        query: &'static str,
        /// Driver error.
        #[source]
        source: Box<dyn StdError + Send + Sync>,
    },
    /// A stored payload could not be decoded.
    #[error("failed to decode {field} of {kind} {id}: {source}")]
    Decode {
        /// Element kind (`relation`, `way`).
        kind: &'static str,
        /// Element id.
        id: i64,
        /// Column holding the payload.
        field: &'static str,
        /// Decoder error.
        #[source]
        source: Box<dyn StdError + Send + Sync>,
    },
    /// The store does not record its coordinate reference system.
    #[error("route store does not declare a coordinate reference system")]
    MissingSrid,
}

/// Read access to relations, ways and nodes of a tagged geospatial store.
///
/// A missing row is reported as `Ok(None)` rather than an error so callers
/// can decide how to recover.
///
/// # Examples
///
/// ```rust
/// use routepack_core::{RouteStore, StoreError};
///
/// fn count_route_candidates(store: &impl RouteStore) -> Result<usize, StoreError> {
///     Ok(store.relations_with_keys(&["network", "ref"])?.len())
/// }
/// ```
pub trait RouteStore {
    /// Relations whose tags contain every key in `keys`.
    ///
    /// The result order is unspecified.
    fn relations_with_keys(&self, keys: &[&str]) -> Result<Vec<RelationRecord>, StoreError>;

    /// Membership list of relation `id`, or `None` if the relation is absent.
    fn relation_members(&self, id: i64) -> Result<Option<Vec<Member>>, StoreError>;

    /// Tags and node references of way `id`, or `None` if the way is absent.
    fn way(&self, id: i64) -> Result<Option<WayRecord>, StoreError>;

    /// Raw positions for the requested node ids.
    ///
    /// Ids without a stored node are omitted from the map.
    fn node_positions(&self, ids: &[i64]) -> Result<HashMap<i64, RawPosition>, StoreError>;

    /// Spatial reference id of the stored node positions.
    fn srid(&self) -> Result<i32, StoreError>;
}

impl<S: RouteStore + ?Sized> RouteStore for &S {
    fn relations_with_keys(&self, keys: &[&str]) -> Result<Vec<RelationRecord>, StoreError> {
        (**self).relations_with_keys(keys)
    }

    fn relation_members(&self, id: i64) -> Result<Option<Vec<Member>>, StoreError> {
        (**self).relation_members(id)
    }

    fn way(&self, id: i64) -> Result<Option<WayRecord>, StoreError> {
        (**self).way(id)
    }

    fn node_positions(&self, ids: &[i64]) -> Result<HashMap<i64, RawPosition>, StoreError> {
        (**self).node_positions(ids)
    }

    fn srid(&self) -> Result<i32, StoreError> {
        (**self).srid()
    }
}

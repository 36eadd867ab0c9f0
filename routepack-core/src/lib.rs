//! Core domain types for routepack.
//!
//! The crate models route relations as they are read from an OSM-style
//! tagged store: flattened tag arrays, typed membership markers, the logical
//! [`RouteKey`] used to group relations, and the [`RouteGroup`] values handed
//! from the producer to the bundle writer. The [`RouteStore`] trait describes
//! the query protocol consumed by the extraction pipeline.

#![forbid(unsafe_code)]

pub mod group;
pub mod member;
pub mod route_key;
pub mod store;
pub mod tags;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
pub mod union;

pub use group::{GroupEntry, GroupWay, RouteGroup};
pub use member::{Member, MemberParseError};
pub use route_key::RouteKey;
pub use store::{RawPosition, RelationRecord, RouteStore, StoreError, WayRecord};
#[cfg(feature = "store-sqlite")]
pub use store::{SqliteRouteStore, initialise_schema};
pub use tags::{Tags, flatten_tags, tags_from_flat};
pub use union::{Union, cascaded_union};

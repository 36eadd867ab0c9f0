//! Extraction pipeline for routepack.
//!
//! Responsibilities:
//! - Select candidate route relations from a [`RouteStore`].
//! - Resolve nested membership into ways and WGS84 lines.
//! - Stream relations into key-contiguous groups and write them as
//!   compressed OSM XML bundles on a dedicated worker thread.
//! - Load OSM PBF extracts into the SQLite store layout.
//!
//! Boundaries:
//! - Domain types and the store protocol live in `routepack-core`.
//! - The store is only touched from the calling thread.
//!
//! Invariants:
//! - Relations sharing a route key are never split across bundles.
//! - Synthetic element ids are negative and unique for a writer's lifetime.
//!
//! [`RouteStore`]: routepack_core::RouteStore

pub mod bundle;
pub mod catalog;
mod error;
pub mod geometry;
pub mod grouping;
mod import;
pub mod membership;
pub mod pipeline;

pub use bundle::{
    BundleError, BundleOptions, BundleReport, BundleWriter, DEFAULT_FILE_PREFIX,
    DEFAULT_QUEUE_TIMEOUT, IdMinter, ShutdownReason, SyntheticDocument, bundle_file_name,
};
pub use catalog::{REQUIRED_KEYS, RouteFilter, list_route_relations, route_classification};
pub use error::PipelineError;
pub use geometry::{CoordinateSystem, GeometryFetcher, SPHERICAL_MERCATOR_SRID, WGS84_SRID};
pub use grouping::{DEFAULT_COORDINATE_THRESHOLD, GroupingOptions, RouteGroups, sort_by_route_key};
pub use import::{ImportError, ImportSummary, import_osm_pbf};
pub use membership::resolve_way_ids;
pub use pipeline::{ExportOptions, ExportReport, export_routes};

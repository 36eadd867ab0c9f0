//! Facade crate for routepack.
//!
//! This crate re-exports the route domain types and the store protocol, and
//! exposes the SQLite store and the bundle export pipeline behind feature
//! flags.

#![forbid(unsafe_code)]

pub use routepack_core::{
    GroupEntry, GroupWay, Member, RelationRecord, RouteGroup, RouteKey, RouteStore, StoreError,
    Tags, Union, WayRecord, cascaded_union, tags_from_flat,
};

#[cfg(feature = "store-sqlite")]
pub use routepack_core::SqliteRouteStore;

#[cfg(feature = "pipeline")]
pub use routepack_data::{
    BundleOptions, BundleReport, ExportOptions, ExportReport, GroupingOptions, ImportError,
    ImportSummary, PipelineError, RouteFilter, ShutdownReason, export_routes, import_osm_pbf,
};

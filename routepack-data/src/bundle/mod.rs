//! Serialisation of route groups into compressed OSM XML bundles.

mod document;
mod writer;

pub use document::{
    ELEMENT_VERSION, IdMinter, OSM_API_VERSION, PLACEHOLDER_TIMESTAMP, SyntheticDocument,
    SyntheticNode, SyntheticRelation, SyntheticWay, escape_xml,
};
pub use writer::{
    BUNDLE_EXTENSION, BundleError, BundleOptions, BundleReport, BundleWriter,
    DEFAULT_FILE_PREFIX, DEFAULT_QUEUE_TIMEOUT, ShutdownReason, bundle_file_name,
};

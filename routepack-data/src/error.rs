//! Errors raised while exporting route bundles.

use std::io;

use routepack_core::StoreError;
use thiserror::Error;

use crate::bundle::BundleError;

/// Errors returned by the export pipeline.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The route store failed; the producer stops immediately.
    #[error(transparent)]
    Store(#[from] StoreError),
    /// Node positions use a coordinate reference system the pipeline cannot
    /// reproject.
    #[error("unsupported coordinate reference system (SRID {srid})")]
    UnsupportedCoordinateSystem {
        /// Spatial reference id declared by the store.
        srid: i32,
    },
    /// The bundle writer thread could not be started.
    #[error("failed to spawn the bundle writer thread")]
    SpawnWorker {
        /// Underlying OS error.
        #[source]
        source: io::Error,
    },
    /// The bundle writer stopped receiving groups before production finished.
    #[error("bundle writer stopped before all groups were delivered")]
    WorkerStopped,
    /// The bundle writer thread panicked.
    #[error("bundle writer thread panicked")]
    WorkerPanicked,
    /// The bundle writer failed to write output.
    #[error(transparent)]
    Bundle(#[from] BundleError),
}

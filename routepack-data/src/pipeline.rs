//! Producer/writer export pipeline.
//!
//! The calling thread reads the store, builds groups and hands them to a
//! dedicated bundle writer thread over a crossbeam channel.

use std::thread;

use crossbeam_channel::{Sender, bounded, unbounded};
use log::{info, warn};
use routepack_core::{RouteGroup, RouteStore};

use crate::bundle::{BundleError, BundleOptions, BundleReport, BundleWriter};
use crate::catalog::{RouteFilter, list_route_relations};
use crate::grouping::{GroupingOptions, RouteGroups};
use crate::PipelineError;

/// Name of the bundle writer thread.
pub const WRITER_THREAD_NAME: &str = "bundle-writer";

/// Options for [`export_routes`].
#[derive(Debug, Clone, Default)]
pub struct ExportOptions {
    /// Group sizing.
    pub grouping: GroupingOptions,
    /// Output location, naming and writer timeout.
    pub bundle: BundleOptions,
    /// Relation exclusions.
    pub filter: RouteFilter,
    /// Capacity of the handoff queue; `None` leaves it unbounded.
    pub queue_capacity: Option<usize>,
}

/// Outcome of an export run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportReport {
    /// Relations accepted by the catalog.
    pub relations: usize,
    /// Groups handed to the writer.
    pub groups: usize,
    /// What the writer produced.
    pub bundle: BundleReport,
}

struct Production {
    relations: usize,
    groups: usize,
}

/// Export every accepted route relation in `store` as bundle files.
///
/// The writer thread starts before the first store query. Once production
/// ends, successfully or not, the queue is closed and the writer joined;
/// files it already wrote stay on disk.
///
/// # Examples
///
/// ```no_run
/// use routepack_core::SqliteRouteStore;
/// use routepack_data::{ExportOptions, export_routes};
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let store = SqliteRouteStore::open("planet-routes.db")?;
/// let report = export_routes(&store, ExportOptions::default())?;
/// println!("wrote {} bundles", report.bundle.files.len());
/// # Ok(())
/// # }
/// ```
pub fn export_routes<S: RouteStore + ?Sized>(
    store: &S,
    options: ExportOptions,
) -> Result<ExportReport, PipelineError> {
    let ExportOptions {
        grouping,
        bundle,
        filter,
        queue_capacity,
    } = options;

    let (sender, receiver) = queue_capacity.map_or_else(unbounded::<RouteGroup>, bounded);
    let writer = BundleWriter::create(bundle)?;
    let worker = thread::Builder::new()
        .name(WRITER_THREAD_NAME.to_owned())
        .spawn(move || writer.run(&receiver))
        .map_err(|source| PipelineError::SpawnWorker { source })?;

    let produced = produce(store, &filter, grouping, &sender);
    drop(sender);
    let written = worker.join().map_err(|_| PipelineError::WorkerPanicked)?;

    merge_outcomes(produced, written)
}

/// Combine the producer and writer results into the run outcome.
///
/// A producer failure wins unless it only reports that the writer went
/// away, in which case the writer's own error explains why.
fn merge_outcomes(
    produced: Result<Production, PipelineError>,
    written: Result<BundleReport, BundleError>,
) -> Result<ExportReport, PipelineError> {
    match (produced, written) {
        (Ok(production), Ok(bundle)) => {
            info!(
                "Exported {} relations in {} groups to {} files",
                production.relations,
                production.groups,
                bundle.files.len()
            );
            Ok(ExportReport {
                relations: production.relations,
                groups: production.groups,
                bundle,
            })
        }
        (Err(PipelineError::WorkerStopped), Err(err)) => Err(err.into()),
        (Err(err), Err(write_err)) => {
            warn!("Bundle writer also failed: {write_err}");
            Err(err)
        }
        (Err(err), Ok(_)) => Err(err),
        (Ok(_), Err(err)) => Err(err.into()),
    }
}

fn produce<S: RouteStore + ?Sized>(
    store: &S,
    filter: &RouteFilter,
    grouping: GroupingOptions,
    queue: &Sender<RouteGroup>,
) -> Result<Production, PipelineError> {
    let relations = list_route_relations(store, filter)?;
    let total = relations.len();
    let mut groups = 0;
    for group in RouteGroups::new(store, relations, grouping)? {
        queue
            .send(group?)
            .map_err(|_| PipelineError::WorkerStopped)?;
        groups += 1;
    }
    Ok(Production {
        relations: total,
        groups,
    })
}

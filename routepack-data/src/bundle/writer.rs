//! Bundle writer worker.
//!
//! The writer drains route groups from the handoff queue and writes each one
//! to its own numbered `.osm.bz2` file. An idle queue or a closed queue ends
//! the run normally.

use std::fmt;
use std::io::{self, BufWriter, Write};
use std::time::Duration;

use bzip2::{Compression, write::BzEncoder};
use camino::{Utf8Path, Utf8PathBuf};
use cap_std::fs_utf8;
use crossbeam_channel::{Receiver, RecvTimeoutError};
use log::info;
use routepack_core::RouteGroup;
use thiserror::Error;

use super::document::{IdMinter, SyntheticDocument};

/// How long the writer waits for a group before shutting down.
pub const DEFAULT_QUEUE_TIMEOUT: Duration = Duration::from_secs(300);
/// Default output file name prefix.
pub const DEFAULT_FILE_PREFIX: &str = "routes";
/// Extension appended to every bundle file.
pub const BUNDLE_EXTENSION: &str = "osm.bz2";

/// Name of bundle number `sequence` under `prefix`.
///
/// # Examples
///
/// ```rust
/// use routepack_data::bundle_file_name;
///
/// assert_eq!(bundle_file_name("routes", 7), "routes-000007.osm.bz2");
/// ```
pub fn bundle_file_name(prefix: &str, sequence: u32) -> String {
    format!("{prefix}-{sequence:06}.{BUNDLE_EXTENSION}")
}

/// Where and how bundles are written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BundleOptions {
    /// Directory receiving the bundle files; created when missing.
    pub output_dir: Utf8PathBuf,
    /// File name prefix.
    pub file_prefix: String,
    /// Idle time after which the writer stops.
    pub queue_timeout: Duration,
}

impl Default for BundleOptions {
    fn default() -> Self {
        Self {
            output_dir: Utf8PathBuf::from("."),
            file_prefix: DEFAULT_FILE_PREFIX.to_owned(),
            queue_timeout: DEFAULT_QUEUE_TIMEOUT,
        }
    }
}

/// Why the writer stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownReason {
    /// No group arrived within the queue timeout.
    IdleTimeout,
    /// Every sender was dropped and the queue drained.
    QueueClosed,
}

impl fmt::Display for ShutdownReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::IdleTimeout => f.write_str("idle timeout"),
            Self::QueueClosed => f.write_str("queue closed"),
        }
    }
}

/// Summary of a finished writer run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BundleReport {
    /// Files written, in sequence order.
    pub files: Vec<Utf8PathBuf>,
    /// Relation elements written.
    pub relations: usize,
    /// Way elements written.
    pub ways: usize,
    /// Node elements written.
    pub nodes: usize,
    /// Why the writer stopped.
    pub shutdown: ShutdownReason,
}

/// Errors raised while writing bundles.
#[derive(Debug, Error)]
pub enum BundleError {
    /// The output directory could not be created or opened.
    #[error("failed to open output directory {path}")]
    OutputDirectory {
        /// Requested directory.
        path: Utf8PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },
    /// A bundle file could not be created.
    #[error("failed to create bundle {path}")]
    CreateFile {
        /// Bundle path.
        path: Utf8PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },
    /// Writing or compressing a bundle failed.
    #[error("failed to write bundle {path}")]
    Write {
        /// Bundle path.
        path: Utf8PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },
}

/// Writes route groups to numbered, bzip2-compressed OSM XML files.
///
/// One id counter spans the writer's lifetime so ids never repeat across
/// files.
#[derive(Debug)]
pub struct BundleWriter {
    dir: fs_utf8::Dir,
    output_dir: Utf8PathBuf,
    file_prefix: String,
    queue_timeout: Duration,
    ids: IdMinter,
    sequence: u32,
    files: Vec<Utf8PathBuf>,
    relations: usize,
    ways: usize,
    nodes: usize,
}

impl BundleWriter {
    /// Create the output directory if needed and prepare a writer.
    pub fn create(options: BundleOptions) -> Result<Self, BundleError> {
        let BundleOptions {
            output_dir,
            file_prefix,
            queue_timeout,
        } = options;
        let dir = routepack_fs::open_output_dir(&output_dir).map_err(|source| {
            BundleError::OutputDirectory {
                path: output_dir.clone(),
                source,
            }
        })?;
        Ok(Self {
            dir,
            output_dir,
            file_prefix,
            queue_timeout,
            ids: IdMinter::new(),
            sequence: 0,
            files: Vec::new(),
            relations: 0,
            ways: 0,
            nodes: 0,
        })
    }

    /// Directory receiving the bundles.
    pub fn output_dir(&self) -> &Utf8Path {
        &self.output_dir
    }

    /// Files written so far.
    pub fn files(&self) -> &[Utf8PathBuf] {
        &self.files
    }

    /// Serialise `group` into the next numbered bundle and return its path.
    pub fn write_group(&mut self, group: RouteGroup) -> Result<Utf8PathBuf, BundleError> {
        let document = SyntheticDocument::from_group(group, &mut self.ids);
        self.sequence += 1;
        let name = bundle_file_name(&self.file_prefix, self.sequence);
        let path = self.output_dir.join(&name);

        let file = self
            .dir
            .create(&name)
            .map_err(|source| BundleError::CreateFile {
                path: path.clone(),
                source,
            })?;
        let write_error = |source| BundleError::Write {
            path: path.clone(),
            source,
        };
        let mut encoder = BzEncoder::new(BufWriter::new(file), Compression::default());
        document.write_to(&mut encoder).map_err(write_error)?;
        encoder
            .finish()
            .and_then(|mut buffered| buffered.flush())
            .map_err(write_error)?;

        self.relations += document.relation_count();
        self.ways += document.way_count();
        self.nodes += document.node_count();
        info!(
            "Wrote {path} ({} relations, {} ways, {} nodes)",
            document.relation_count(),
            document.way_count(),
            document.node_count()
        );
        self.files.push(path.clone());
        Ok(path)
    }

    /// Drain `queue` until it stays idle for the configured timeout or every
    /// sender is dropped.
    pub fn run(mut self, queue: &Receiver<RouteGroup>) -> Result<BundleReport, BundleError> {
        let shutdown = loop {
            match queue.recv_timeout(self.queue_timeout) {
                Ok(group) => {
                    self.write_group(group)?;
                }
                Err(RecvTimeoutError::Timeout) => break ShutdownReason::IdleTimeout,
                Err(RecvTimeoutError::Disconnected) => break ShutdownReason::QueueClosed,
            }
        };
        info!(
            "Bundle writer stopped ({shutdown}) after writing {} files",
            self.files.len()
        );
        Ok(BundleReport {
            files: self.files,
            relations: self.relations,
            ways: self.ways,
            nodes: self.nodes,
            shutdown,
        })
    }
}

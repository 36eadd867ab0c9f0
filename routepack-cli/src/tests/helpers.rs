//! Test helpers for composing route stores on disk.

use camino::{Utf8Path, Utf8PathBuf};
use routepack_core::{Member, Tags, tags_from_flat, test_support::MemoryRouteStore};
use std::{fs, io::Read};
use tempfile::TempDir;

pub(super) struct Workspace {
    _dir: TempDir,
    root: Utf8PathBuf,
}

impl std::fmt::Debug for Workspace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Workspace").field("root", &self.root).finish()
    }
}

impl Workspace {
    pub(super) fn new() -> Self {
        let dir = TempDir::new().expect("tempdir");
        let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).expect("utf-8 workspace");
        Self { _dir: dir, root }
    }

    pub(super) fn root(&self) -> &Utf8Path {
        &self.root
    }

    /// Write a store holding interstates 90 and 94, three five-point ways each.
    pub(super) fn interstate_store(&self) -> Utf8PathBuf {
        let path = self.root.join("routes.db");
        let mut store = MemoryRouteStore::wgs84()
            .with_relation(1, road("90"), (10..13).map(Member::Way).collect())
            .with_relation(2, road("94"), (20..23).map(Member::Way).collect());
        for way_id in (10..13).chain(20..23) {
            let coords: Vec<_> = (0..5)
                .map(|step| (-88.0 + way_id as f64 * 0.01, 42.0 + step as f64 * 0.001))
                .collect();
            store = store.with_wgs84_way(way_id, tags_from_flat(["highway", "motorway"]), &coords);
        }
        store
            .write_sqlite(path.as_std_path())
            .expect("write route store");
        path
    }
}

fn road(reference: &str) -> Tags {
    tags_from_flat(["network", "US:I", "ref", reference, "route", "road"])
}

pub(super) fn write_utf8(path: &Utf8Path, contents: &[u8]) {
    fs::write(path.as_std_path(), contents).expect("write fixture file");
}

/// Count `relation` elements in a compressed bundle.
pub(super) fn bundle_relations(path: &Utf8Path) -> usize {
    let file = fs::File::open(path.as_std_path()).expect("open bundle");
    let mut xml = String::new();
    bzip2::read::BzDecoder::new(file)
        .read_to_string(&mut xml)
        .expect("decompress bundle");
    let document = roxmltree::Document::parse(&xml).expect("parse bundle");
    document
        .root_element()
        .children()
        .filter(|node| node.has_tag_name("relation"))
        .count()
}

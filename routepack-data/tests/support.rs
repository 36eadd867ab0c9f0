//! Fixture helpers shared by behaviour tests.

use base64::{Engine as _, engine::general_purpose};
use std::{
    fs,
    path::{Path, PathBuf},
};

/// Directory containing the encoded fixture blobs.
pub fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

/// Decode the Base64 fixture `<stem>.osm.pbf.b64` into `target_dir` and
/// return the path of the written `.osm.pbf` file.
pub fn decode_fixture(target_dir: &Path, stem: &str) -> PathBuf {
    let encoded_path = fixtures_dir().join(format!("{stem}.osm.pbf.b64"));
    let encoded = fs::read_to_string(&encoded_path).unwrap_or_else(|err| {
        panic!("failed to read base64 fixture {encoded_path:?}: {err}");
    });
    let cleaned: String = encoded
        .chars()
        .filter(|ch| !ch.is_ascii_whitespace())
        .collect();
    let decoded = general_purpose::STANDARD
        .decode(cleaned.as_bytes())
        .unwrap_or_else(|err| {
            panic!("failed to decode base64 fixture {encoded_path:?}: {err}");
        });
    let pbf = target_dir.join(format!("{stem}.osm.pbf"));
    fs::write(&pbf, decoded).unwrap_or_else(|err| {
        panic!("failed to write decoded fixture for {stem}: {err}");
    });
    pbf
}

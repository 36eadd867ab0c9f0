//! OSM-style tag maps and their flattened wire form.

use std::collections::BTreeMap;

/// Free-form key/value tags attached to relations and ways.
///
/// A `BTreeMap` keeps serialisation order stable across runs.
pub type Tags = BTreeMap<String, String>;

/// Build a tag map from a flattened `[k0, v0, k1, v1, ...]` array.
///
/// A trailing key without a value is dropped. Later duplicates win.
///
/// # Examples
/// ```
/// use routepack_core::tags_from_flat;
///
/// let tags = tags_from_flat(["network", "US:I", "ref", "90"]);
/// assert_eq!(tags.get("ref").map(String::as_str), Some("90"));
/// ```
pub fn tags_from_flat<I, S>(flat: I) -> Tags
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let mut tags = Tags::new();
    let mut items = flat.into_iter();
    while let (Some(key), Some(value)) = (items.next(), items.next()) {
        tags.insert(key.into(), value.into());
    }
    tags
}

/// Flatten a tag map into the alternating key/value form used by the store.
pub fn flatten_tags(tags: &Tags) -> Vec<String> {
    tags.iter()
        .flat_map(|(key, value)| [key.clone(), value.clone()])
        .collect()
}

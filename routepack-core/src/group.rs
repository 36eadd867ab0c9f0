//! Groups of resolved route relations handed to the bundle writer.

use geo::LineString;

use crate::{RouteKey, Tags};

/// A member way together with its resolved line, if any.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupWay {
    /// Source way id. Never written to output bundles.
    pub way_id: i64,
    /// Way tags; empty when the way row was missing.
    pub tags: Tags,
    /// WGS84 line (`x = longitude`, `y = latitude`); `None` when fewer than
    /// two node positions resolved.
    pub line: Option<LineString<f64>>,
}

impl GroupWay {
    /// Number of coordinates carried by the way's line.
    pub fn coordinate_count(&self) -> usize {
        self.line.as_ref().map_or(0, |line| line.0.len())
    }
}

/// One relation folded into a group.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupEntry {
    /// Source relation id.
    pub relation_id: i64,
    /// Key the relation was sorted under.
    pub key: RouteKey,
    /// Relation tags.
    pub tags: Tags,
    /// Ways reachable from the relation, in ascending way id order.
    pub ways: Vec<GroupWay>,
}

impl GroupEntry {
    /// Total number of coordinates across all resolved ways.
    pub fn coordinate_count(&self) -> usize {
        self.ways.iter().map(GroupWay::coordinate_count).sum()
    }
}

/// Contiguous run of relations in `(RouteKey, id)` order.
///
/// Relations sharing a key are never split across groups, so a group may
/// exceed the coordinate budget that triggered its flush.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RouteGroup {
    entries: Vec<GroupEntry>,
}

impl RouteGroup {
    /// Create an empty group.
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Append a relation to the end of the group.
    pub fn push(&mut self, entry: GroupEntry) {
        self.entries.push(entry);
    }

    /// Relations in sort order.
    pub fn entries(&self) -> &[GroupEntry] {
        &self.entries
    }

    /// Number of relations in the group.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the group holds no relations.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Total coordinates across the group.
    pub fn coordinate_count(&self) -> usize {
        self.entries.iter().map(GroupEntry::coordinate_count).sum()
    }

    /// Consume the group and return its relations.
    pub fn into_entries(self) -> Vec<GroupEntry> {
        self.entries
    }
}

impl FromIterator<GroupEntry> for RouteGroup {
    fn from_iter<I: IntoIterator<Item = GroupEntry>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

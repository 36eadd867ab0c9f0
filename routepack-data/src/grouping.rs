//! Streaming of sorted route relations into bounded groups.
//!
//! Relations are ordered by `(RouteKey, id)`. A group is flushed once its
//! running coordinate count exceeds the threshold, but only at a key
//! boundary, so relations sharing a key always land in the same group.

use std::iter::Peekable;
use std::mem;
use std::vec;

use log::debug;
use routepack_core::{GroupEntry, RelationRecord, RouteGroup, RouteKey, RouteStore};

use crate::geometry::GeometryFetcher;
use crate::membership::resolve_way_ids;
use crate::PipelineError;

/// Coordinate count above which a group is flushed at the next key change.
pub const DEFAULT_COORDINATE_THRESHOLD: usize = 100_000;

/// Tuning for [`RouteGroups`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GroupingOptions {
    /// Soft per-group coordinate budget.
    pub coordinate_threshold: usize,
}

impl Default for GroupingOptions {
    fn default() -> Self {
        Self {
            coordinate_threshold: DEFAULT_COORDINATE_THRESHOLD,
        }
    }
}

/// Pair each relation with its key and sort by `(key, id)`.
pub fn sort_by_route_key(relations: Vec<RelationRecord>) -> Vec<(RouteKey, RelationRecord)> {
    let mut keyed: Vec<_> = relations
        .into_iter()
        .map(|relation| (RouteKey::from_tags(&relation.tags), relation))
        .collect();
    keyed.sort_by(|(left_key, left), (right_key, right)| {
        left_key.cmp(right_key).then(left.id.cmp(&right.id))
    });
    keyed
}

/// Lazy sequence of route groups.
///
/// Each step reads the store, so the sequence can be consumed only once.
/// The final group is yielded even when empty. After an error no further
/// items are produced.
pub struct RouteGroups<'s, S: ?Sized> {
    store: &'s S,
    fetcher: GeometryFetcher<'s, S>,
    pending: Peekable<vec::IntoIter<(RouteKey, RelationRecord)>>,
    options: GroupingOptions,
    current: RouteGroup,
    coordinates: usize,
    last_key: Option<RouteKey>,
    finished: bool,
}

impl<'s, S: RouteStore + ?Sized> RouteGroups<'s, S> {
    /// Sort `relations` and prepare to stream them from `store`.
    ///
    /// # Errors
    ///
    /// Fails if the store's coordinate system cannot be read or is not
    /// supported.
    pub fn new(
        store: &'s S,
        relations: Vec<RelationRecord>,
        options: GroupingOptions,
    ) -> Result<Self, PipelineError> {
        let fetcher = GeometryFetcher::detect(store)?;
        Ok(Self::with_fetcher(fetcher, store, relations, options))
    }

    /// Stream with an already configured geometry fetcher.
    pub fn with_fetcher(
        fetcher: GeometryFetcher<'s, S>,
        store: &'s S,
        relations: Vec<RelationRecord>,
        options: GroupingOptions,
    ) -> Self {
        Self {
            store,
            fetcher,
            pending: sort_by_route_key(relations).into_iter().peekable(),
            options,
            current: RouteGroup::new(),
            coordinates: 0,
            last_key: None,
            finished: false,
        }
    }

    fn build_entry(
        &self,
        key: RouteKey,
        relation: RelationRecord,
    ) -> Result<GroupEntry, PipelineError> {
        let way_ids = resolve_way_ids(self.store, relation.id)?;
        let ways = way_ids
            .into_iter()
            .map(|way_id| self.fetcher.fetch(way_id))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(GroupEntry {
            relation_id: relation.id,
            key,
            tags: relation.tags,
            ways,
        })
    }
}

impl<S: RouteStore + ?Sized> Iterator for RouteGroups<'_, S> {
    type Item = Result<RouteGroup, PipelineError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        loop {
            let Some((next_key, _)) = self.pending.peek() else {
                self.finished = true;
                return Some(Ok(mem::take(&mut self.current)));
            };
            let over_budget = self.coordinates > self.options.coordinate_threshold;
            if over_budget && self.last_key.as_ref() != Some(next_key) {
                self.coordinates = 0;
                return Some(Ok(mem::take(&mut self.current)));
            }
            let (key, relation) = self.pending.next()?;
            match self.build_entry(key.clone(), relation) {
                Ok(entry) => {
                    let relation_coordinates = entry.coordinate_count();
                    debug!("{key} -- {relation_coordinates} nodes");
                    self.coordinates += relation_coordinates;
                    self.current.push(entry);
                    self.last_key = Some(key);
                }
                Err(err) => {
                    self.finished = true;
                    return Some(Err(err));
                }
            }
        }
    }
}

impl<S: RouteStore + ?Sized> std::iter::FusedIterator for RouteGroups<'_, S> {}

//! Transitive expansion of relation membership into way ids.

use std::collections::{BTreeSet, HashSet, VecDeque};

use log::debug;
use routepack_core::{Member, RouteStore, StoreError};

/// Collect every way reachable from relation `root` through nested relation
/// members.
///
/// Expansion is breadth-first over an explicit work list. A relation id is
/// expanded at most once, so membership cycles terminate. Missing relations
/// contribute no members and node members are ignored.
pub fn resolve_way_ids<S: RouteStore + ?Sized>(
    store: &S,
    root: i64,
) -> Result<BTreeSet<i64>, StoreError> {
    let mut pending = VecDeque::from([root]);
    let mut visited = HashSet::new();
    let mut ways = BTreeSet::new();

    while let Some(relation_id) = pending.pop_front() {
        if !visited.insert(relation_id) {
            continue;
        }
        let Some(members) = store.relation_members(relation_id)? else {
            debug!("relation {relation_id} is missing; treating it as empty");
            continue;
        };
        for member in members {
            match member {
                Member::Relation(child) => pending.push_back(child),
                Member::Way(way_id) => {
                    ways.insert(way_id);
                }
                Member::Node(_) => {}
            }
        }
    }

    Ok(ways)
}

#[cfg(test)]
mod tests {
    use super::*;
    use routepack_core::{Tags, test_support::MemoryRouteStore};
    use rstest::rstest;

    #[rstest]
    fn terminates_on_membership_cycle() {
        let store = MemoryRouteStore::wgs84()
            .with_relation(1, Tags::new(), vec![Member::Way(10), Member::Relation(2)])
            .with_relation(2, Tags::new(), vec![Member::Way(20), Member::Relation(1)]);

        let ways = resolve_way_ids(&store, 1).expect("resolve cycle");

        assert_eq!(ways.into_iter().collect::<Vec<_>>(), vec![10, 20]);
        assert_eq!(store.membership_lookups(), 2, "each relation expanded once");
    }

    #[rstest]
    fn self_reference_is_expanded_once() {
        let store = MemoryRouteStore::wgs84().with_relation(
            1,
            Tags::new(),
            vec![Member::Relation(1), Member::Way(5)],
        );

        let ways = resolve_way_ids(&store, 1).expect("resolve self reference");

        assert_eq!(ways.into_iter().collect::<Vec<_>>(), vec![5]);
        assert_eq!(store.membership_lookups(), 1);
    }

    #[rstest]
    fn shared_children_and_ways_are_deduplicated() {
        let store = MemoryRouteStore::wgs84()
            .with_relation(
                1,
                Tags::new(),
                vec![Member::Relation(2), Member::Relation(3), Member::Way(7)],
            )
            .with_relation(2, Tags::new(), vec![Member::Relation(4), Member::Way(7)])
            .with_relation(3, Tags::new(), vec![Member::Relation(4), Member::Way(8)])
            .with_relation(4, Tags::new(), vec![Member::Way(9), Member::Way(8)]);

        let ways = resolve_way_ids(&store, 1).expect("resolve diamond");

        assert_eq!(ways.into_iter().collect::<Vec<_>>(), vec![7, 8, 9]);
        assert_eq!(store.membership_lookups(), 4);
    }

    #[rstest]
    fn missing_relations_are_empty() {
        let store = MemoryRouteStore::wgs84().with_relation(
            1,
            Tags::new(),
            vec![Member::Relation(99), Member::Way(3)],
        );

        let ways = resolve_way_ids(&store, 1).expect("resolve with gap");
        assert_eq!(ways.into_iter().collect::<Vec<_>>(), vec![3]);

        let root_missing = resolve_way_ids(&store, 42).expect("resolve missing root");
        assert!(root_missing.is_empty());
    }

    #[rstest]
    fn node_members_are_ignored() {
        let store = MemoryRouteStore::wgs84().with_relation(
            1,
            Tags::new(),
            vec![Member::Node(100), Member::Way(3), Member::Node(101)],
        );

        let ways = resolve_way_ids(&store, 1).expect("resolve");
        assert_eq!(ways.into_iter().collect::<Vec<_>>(), vec![3]);
    }
}

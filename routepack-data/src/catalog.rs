//! Selection of top-level route relations.
//!
//! Candidates are relations carrying both `network` and `ref`. Cycle and
//! hiking networks are dropped along with public-transport and cycling
//! classifications, leaving road-style routes.

use std::collections::BTreeSet;

use log::info;
use routepack_core::{RelationRecord, RouteStore, StoreError, Tags};

/// Tag keys every candidate relation must carry.
pub const REQUIRED_KEYS: [&str; 2] = ["network", "ref"];

const BICYCLE_NETWORKS: [&str; 5] = ["lcn", "rcn", "ncn", "icn", "mtb"];
const PEDESTRIAN_NETWORKS: [&str; 4] = ["lwn", "rwn", "nwn", "iwn"];
const EXCLUDED_CLASSIFICATIONS: [&str; 6] =
    ["bus", "bicycle", "tram", "train", "subway", "light_rail"];

/// Resolve the route classification of a relation.
///
/// The `route` tag is used unless it reads `route_master` and a
/// `route_master` tag is present, in which case that tag wins.
///
/// # Examples
///
/// ```rust
/// use routepack_core::tags_from_flat;
/// use routepack_data::route_classification;
///
/// let tags = tags_from_flat(["route", "route_master", "route_master", "bus"]);
/// assert_eq!(route_classification(&tags), Some("bus"));
/// ```
pub fn route_classification(tags: &Tags) -> Option<&str> {
    let route = tags.get("route").map(String::as_str);
    match (route, tags.get("route_master")) {
        (Some("route_master"), Some(master)) => Some(master.as_str()),
        _ => route,
    }
}

/// Exclusion rules applied to candidate relations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteFilter {
    excluded_networks: BTreeSet<String>,
    excluded_classifications: BTreeSet<String>,
}

impl Default for RouteFilter {
    fn default() -> Self {
        Self::new(
            BICYCLE_NETWORKS.into_iter().chain(PEDESTRIAN_NETWORKS),
            EXCLUDED_CLASSIFICATIONS,
        )
    }
}

impl RouteFilter {
    /// Build a filter from explicit network and classification exclusions.
    pub fn new<N, C>(networks: N, classifications: C) -> Self
    where
        N: IntoIterator,
        N::Item: Into<String>,
        C: IntoIterator,
        C::Item: Into<String>,
    {
        Self {
            excluded_networks: networks.into_iter().map(Into::into).collect(),
            excluded_classifications: classifications.into_iter().map(Into::into).collect(),
        }
    }

    /// Whether a relation with `tags` survives the exclusions.
    pub fn accepts(&self, tags: &Tags) -> bool {
        let network_excluded = tags
            .get("network")
            .is_some_and(|network| self.excluded_networks.contains(network));
        let classification_excluded = route_classification(tags)
            .is_some_and(|class| self.excluded_classifications.contains(class));
        !network_excluded && !classification_excluded
    }
}

/// Fetch candidate relations and keep those accepted by `filter`.
///
/// The result order is unspecified; grouping sorts it.
pub fn list_route_relations<S: RouteStore + ?Sized>(
    store: &S,
    filter: &RouteFilter,
) -> Result<Vec<RelationRecord>, StoreError> {
    let candidates = store.relations_with_keys(&REQUIRED_KEYS)?;
    let total = candidates.len();
    let accepted: Vec<_> = candidates
        .into_iter()
        .filter(|relation| filter.accepts(&relation.tags))
        .collect();
    info!(
        "Selected {} of {total} candidate route relations",
        accepted.len()
    );
    Ok(accepted)
}

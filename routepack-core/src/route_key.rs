//! Logical route identity derived from relation tags.

use std::fmt;

use crate::Tags;

/// Grouping key shared by relations describing the same logical route.
///
/// Field order defines the derived total order: network, then ref, then
/// modifier. Missing tags are represented by empty strings so keys stay
/// comparable.
///
/// # Examples
/// ```
/// use routepack_core::{RouteKey, tags_from_flat};
///
/// let key = RouteKey::from_tags(&tags_from_flat(["network", "US:I", "ref", "90"]));
/// assert_eq!(key.to_string(), "US:I, 90, ");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RouteKey {
    /// Value of the `network` tag.
    pub network: String,
    /// Value of the `ref` tag.
    pub reference: String,
    /// Value of the `modifier` tag.
    pub modifier: String,
}

impl RouteKey {
    /// Derive the key from a relation's tags.
    pub fn from_tags(tags: &Tags) -> Self {
        let lookup = |key: &str| tags.get(key).cloned().unwrap_or_default();
        Self {
            network: lookup("network"),
            reference: lookup("ref"),
            modifier: lookup("modifier"),
        }
    }
}

impl fmt::Display for RouteKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}, {}, {}", self.network, self.reference, self.modifier)
    }
}

//! Divide-and-conquer union of geometry sequences.

use geo::{Coord, MultiLineString, Rect};

/// Geometries that can be merged pairwise.
///
/// Implementations must be associative so [`cascaded_union`] returns the same
/// result regardless of where the sequence is split.
pub trait Union {
    /// Merge `self` with `other` into a new geometry.
    #[must_use]
    fn union(&self, other: &Self) -> Self;
}

impl Union for MultiLineString<f64> {
    /// Concatenate the member lines, keeping only the first copy of any
    /// repeated line.
    fn union(&self, other: &Self) -> Self {
        let mut lines: Vec<_> = Vec::with_capacity(self.0.len() + other.0.len());
        for line in self.0.iter().chain(&other.0) {
            if !lines.contains(line) {
                lines.push(line.clone());
            }
        }
        Self::new(lines)
    }
}

impl Union for Rect<f64> {
    /// Smallest rectangle covering both operands.
    fn union(&self, other: &Self) -> Self {
        Self::new(
            Coord {
                x: self.min().x.min(other.min().x),
                y: self.min().y.min(other.min().y),
            },
            Coord {
                x: self.max().x.max(other.max().x),
                y: self.max().y.max(other.max().y),
            },
        )
    }
}

/// Merge a sequence of optional geometries into one.
///
/// `None` entries are absorbed: the union of a geometry with `None` is the
/// geometry itself. Sequences longer than two are split at the midpoint and
/// each half is merged recursively, which keeps intermediate results small
/// compared with a left fold.
///
/// # Examples
/// ```
/// use geo::{Coord, Rect};
/// use routepack_core::cascaded_union;
///
/// let boxes = [
///     Some(Rect::new(Coord { x: 0.0, y: 0.0 }, Coord { x: 1.0, y: 1.0 })),
///     None,
///     Some(Rect::new(Coord { x: 2.0, y: -1.0 }, Coord { x: 3.0, y: 0.5 })),
/// ];
/// let merged = cascaded_union(&boxes).expect("two boxes present");
/// assert_eq!(merged.min(), Coord { x: 0.0, y: -1.0 });
/// assert_eq!(merged.max(), Coord { x: 3.0, y: 1.0 });
/// ```
pub fn cascaded_union<G>(shapes: &[Option<G>]) -> Option<G>
where
    G: Union + Clone,
{
    match shapes {
        [] => None,
        [only] => only.clone(),
        [first, second] => union_pair(first.as_ref(), second.as_ref()),
        _ => {
            let (left, right) = shapes.split_at(shapes.len() / 2);
            union_pair(cascaded_union(left).as_ref(), cascaded_union(right).as_ref())
        }
    }
}

fn union_pair<G>(first: Option<&G>, second: Option<&G>) -> Option<G>
where
    G: Union + Clone,
{
    match (first, second) {
        (Some(lhs), Some(rhs)) => Some(lhs.union(rhs)),
        (Some(shape), None) | (None, Some(shape)) => Some(shape.clone()),
        (None, None) => None,
    }
}

//! Typed relation membership references.
//!
//! Stores encode each member as a one-letter type marker followed by the
//! referenced id, e.g. `w4242` or `r17`.

use std::{fmt, str::FromStr};

use thiserror::Error;

/// A reference from a relation to one of its members.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Member {
    /// A point member; ignored when resolving line geometry.
    Node(i64),
    /// A line member.
    Way(i64),
    /// A nested relation whose members are resolved transitively.
    Relation(i64),
}

/// Errors raised when decoding a member marker.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MemberParseError {
    /// The marker did not start with `n`, `w` or `r`.
    #[error("unknown member type in marker {marker:?}")]
    UnknownType { marker: String },
    /// The id following the type letter was not an integer.
    #[error("invalid member id in marker {marker:?}")]
    InvalidId { marker: String },
}

impl Member {
    /// Identifier of the referenced element.
    pub const fn id(self) -> i64 {
        match self {
            Self::Node(id) | Self::Way(id) | Self::Relation(id) => id,
        }
    }

    const fn type_letter(self) -> char {
        match self {
            Self::Node(_) => 'n',
            Self::Way(_) => 'w',
            Self::Relation(_) => 'r',
        }
    }
}

impl FromStr for Member {
    type Err = MemberParseError;

    fn from_str(marker: &str) -> Result<Self, Self::Err> {
        let mut chars = marker.chars();
        let kind = chars.next();
        let id = chars.as_str().parse::<i64>().map_err(|_| MemberParseError::InvalidId {
            marker: marker.to_owned(),
        });
        match kind {
            Some('n') => id.map(Self::Node),
            Some('w') => id.map(Self::Way),
            Some('r') => id.map(Self::Relation),
            _ => Err(MemberParseError::UnknownType {
                marker: marker.to_owned(),
            }),
        }
    }
}

impl fmt::Display for Member {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.type_letter(), self.id())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("w42", Member::Way(42))]
    #[case("r7", Member::Relation(7))]
    #[case("n-3", Member::Node(-3))]
    fn parses_markers(#[case] marker: &str, #[case] expected: Member) {
        assert_eq!(marker.parse::<Member>(), Ok(expected));
        assert_eq!(expected.to_string(), marker);
    }

    #[rstest]
    #[case("x12")]
    #[case("")]
    fn rejects_unknown_types(#[case] marker: &str) {
        assert!(matches!(
            marker.parse::<Member>(),
            Err(MemberParseError::UnknownType { .. })
        ));
    }

    #[rstest]
    #[case("w")]
    #[case("rabc")]
    fn rejects_invalid_ids(#[case] marker: &str) {
        assert!(matches!(
            marker.parse::<Member>(),
            Err(MemberParseError::InvalidId { .. })
        ));
    }
}

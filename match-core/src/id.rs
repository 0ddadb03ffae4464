use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Declares a typed row identifier wrapping an integer primary key.
macro_rules! row_id {
    ($(#[$meta:meta])* $name:ident, $resource:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(i64);

        impl $name {
            /// Wraps a raw primary key.
            #[must_use]
            pub const fn new(raw: i64) -> Self {
                Self(raw)
            }

            /// Returns the raw primary key.
            #[must_use]
            pub const fn get(self) -> i64 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<i64> for $name {
            fn from(raw: i64) -> Self {
                Self(raw)
            }
        }

        impl FromStr for $name {
            type Err = CoreError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                s.trim()
                    .parse::<i64>()
                    .map(Self)
                    .map_err(|_| CoreError::InvalidId {
                        resource: $resource,
                        value: s.to_owned(),
                    })
            }
        }
    };
}

row_id!(
    /// Primary key of a [`User`](crate::User).
    UserId,
    "user"
);

row_id!(
    /// Primary key of a [`Programme`](crate::Programme).
    ProgrammeId,
    "programme"
);

row_id!(
    /// Primary key of a [`Cohort`](crate::Cohort).
    CohortId,
    "cohort"
);

row_id!(
    /// Primary key of a [`Tag`](crate::Tag).
    TagId,
    "tag"
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn row_id_parses_trimmed_integer() {
        let id: UserId = match " 42 ".parse() {
            Ok(id) => id,
            Err(e) => panic!("unexpected error: {e}"),
        };
        assert_eq!(id.get(), 42);
    }

    #[test]
    fn row_id_rejects_non_numeric() {
        let err = "abc".parse::<CohortId>().err();
        assert!(
            matches!(err, Some(CoreError::InvalidId { resource: "cohort", .. })),
            "non-numeric id must be rejected, got {err:?}"
        );
    }

    #[test]
    fn row_id_serializes_as_bare_integer() {
        let json = match serde_json::to_string(&TagId::new(7)) {
            Ok(s) => s,
            Err(e) => panic!("serialization failed: {e}"),
        };
        assert_eq!(json, "7");
    }
}

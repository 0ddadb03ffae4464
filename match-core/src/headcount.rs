use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Number of participants in a cohort, always at least one.
///
/// Used both for a cohort's actual size and a programme's default size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct HeadCount(u32);

impl HeadCount {
    /// Creates a `HeadCount` from a signed value.
    ///
    /// # Errors
    /// Returns [`CoreError::InvalidHeadCount`] if `value` is below 1 or does
    /// not fit in a `u32`.
    pub fn new(value: i64) -> Result<Self, CoreError> {
        match u32::try_from(value) {
            Ok(n) if n >= 1 => Ok(Self(n)),
            _ => Err(CoreError::InvalidHeadCount { value }),
        }
    }

    /// Returns the inner count.
    #[must_use]
    pub fn value(self) -> u32 {
        self.0
    }
}

impl TryFrom<i64> for HeadCount {
    type Error = CoreError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<HeadCount> for i64 {
    fn from(count: HeadCount) -> Self {
        i64::from(count.0)
    }
}

impl fmt::Display for HeadCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn head_count_rejects_zero_and_negative() {
        assert!(HeadCount::new(0).is_err());
        assert!(HeadCount::new(-5).is_err());
        assert!(HeadCount::new(i64::from(u32::MAX) + 1).is_err());
    }

    #[test]
    fn head_count_deserialize_enforces_minimum() {
        let ok: Result<HeadCount, _> = serde_json::from_str("100");
        assert!(matches!(ok, Ok(c) if c.value() == 100));
        let bad: Result<HeadCount, _> = serde_json::from_str("0");
        assert!(bad.is_err(), "zero must not deserialize into a HeadCount");
    }
}

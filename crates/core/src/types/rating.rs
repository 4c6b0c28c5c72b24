//! Review star rating.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when constructing a [`Rating`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum RatingError {
    /// The value is outside 1..=5.
    #[error("rating must be between {min} and {max}, got {value}")]
    OutOfRange {
        /// The rejected value.
        value: i64,
        /// Lowest allowed rating.
        min: u8,
        /// Highest allowed rating.
        max: u8,
    },
}

/// A review rating between one and five stars.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u8")]
pub struct Rating(u8);

impl Rating {
    /// Lowest rating.
    pub const MIN: u8 = 1;
    /// Highest rating.
    pub const MAX: u8 = 5;

    /// Create a rating.
    ///
    /// # Errors
    ///
    /// Returns [`RatingError::OutOfRange`] unless `value` is within 1..=5.
    pub fn new(value: i64) -> Result<Self, RatingError> {
        u8::try_from(value)
            .ok()
            .filter(|v| (Self::MIN..=Self::MAX).contains(v))
            .map(Self)
            .ok_or(RatingError::OutOfRange {
                value,
                min: Self::MIN,
                max: Self::MAX,
            })
    }

    /// The numeric value.
    #[must_use]
    pub const fn value(&self) -> u8 {
        self.0
    }

    /// Five star glyphs with the first `value` filled.
    #[must_use]
    pub fn stars(&self) -> String {
        (Self::MIN..=Self::MAX)
            .map(|i| if i <= self.0 { '★' } else { '☆' })
            .collect()
    }
}

impl TryFrom<i64> for Rating {
    type Error = RatingError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Rating> for u8 {
    fn from(rating: Rating) -> Self {
        rating.0
    }
}

impl fmt::Display for Rating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_range() {
        for v in 1..=5 {
            assert_eq!(Rating::new(v).unwrap().value(), u8::try_from(v).unwrap());
        }
    }

    #[test]
    fn test_out_of_range() {
        assert!(matches!(
            Rating::new(0),
            Err(RatingError::OutOfRange { value: 0, .. })
        ));
        assert!(Rating::new(6).is_err());
        assert!(Rating::new(-3).is_err());
        assert!(Rating::new(300).is_err());
    }

    #[test]
    fn test_stars() {
        assert_eq!(Rating::new(3).unwrap().stars(), "★★★☆☆");
        assert_eq!(Rating::new(5).unwrap().stars(), "★★★★★");
    }

    #[test]
    fn test_deserialize_rejects_invalid() {
        assert!(serde_json::from_str::<Rating>("4").is_ok());
        assert!(serde_json::from_str::<Rating>("9").is_err());
    }
}

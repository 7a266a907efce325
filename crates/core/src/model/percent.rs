use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("percent must be within 0..=100, got {0}")]
pub struct PercentError(pub u8);

/// A completion percentage in `[0, 100]`.
///
/// Validated at construction; values coming from storage go through the same
/// check via the `TryFrom<u8>` serde path.
#[derive(
    Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(try_from = "u8", into = "u8")]
pub struct Percent(u8);

impl Percent {
    pub const ZERO: Self = Self(0);
    pub const MAX: Self = Self(100);

    /// Creates a new `Percent`.
    ///
    /// # Errors
    ///
    /// Returns `PercentError` if `value` exceeds 100.
    pub fn new(value: u8) -> Result<Self, PercentError> {
        if value > 100 {
            return Err(PercentError(value));
        }
        Ok(Self(value))
    }

    /// Clamps an arbitrary value into `[0, 100]`.
    #[must_use]
    pub fn clamped(value: u8) -> Self {
        Self(value.min(100))
    }

    /// Converts a scroll-position ratio into a percent.
    ///
    /// Rounds `ratio * 100` to the nearest integer and caps it at 100, the
    /// same rule the reading screens apply before recording progress.
    /// Non-finite or negative ratios map to zero.
    #[must_use]
    pub fn from_scroll_ratio(ratio: f64) -> Self {
        if !ratio.is_finite() || ratio <= 0.0 {
            return Self::ZERO;
        }
        let scaled = (ratio * 100.0).round();
        if scaled >= 100.0 {
            return Self::MAX;
        }
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        Self(scaled as u8)
    }

    /// Returns the underlying u8 value
    #[must_use]
    pub fn value(self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for Percent {
    type Error = PercentError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Percent> for u8 {
    fn from(percent: Percent) -> Self {
        percent.0
    }
}

impl fmt::Debug for Percent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Percent({})", self.0)
    }
}

impl fmt::Display for Percent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_out_of_range() {
        assert_eq!(Percent::new(101).unwrap_err(), PercentError(101));
        assert_eq!(Percent::new(100).unwrap(), Percent::MAX);
        assert_eq!(Percent::new(0).unwrap(), Percent::ZERO);
    }

    #[test]
    fn clamps_overlarge_values() {
        assert_eq!(Percent::clamped(250), Percent::MAX);
        assert_eq!(Percent::clamped(42).value(), 42);
    }

    #[test]
    fn scroll_ratio_rounds_and_caps() {
        assert_eq!(Percent::from_scroll_ratio(0.374).value(), 37);
        assert_eq!(Percent::from_scroll_ratio(0.375).value(), 38);
        assert_eq!(Percent::from_scroll_ratio(1.6), Percent::MAX);
        assert_eq!(Percent::from_scroll_ratio(-0.2), Percent::ZERO);
        assert_eq!(Percent::from_scroll_ratio(f64::NAN), Percent::ZERO);
    }

    #[test]
    fn ordering_follows_value() {
        assert!(Percent::new(40).unwrap() < Percent::new(60).unwrap());
    }
}

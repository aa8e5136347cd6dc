//! Severity banding shared by observations, situations, and escalations.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// A severity score on a fixed `0..=10` band.
///
/// Bands follow the spec's four named tiers: `0..=2` is informational,
/// `3..=5` is a warning, `6..=8` is an error, and `9..=10` is critical.
/// The numeric value, not the tier name, is what policies and overrides
/// key on; the named constructors exist for readability at call sites.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Severity(u8);

impl Severity {
    /// Highest representable severity value.
    pub const MAX: u8 = 10;

    /// Builds a severity from a raw score.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidSeverity`] if `value` exceeds [`Severity::MAX`].
    pub fn new(value: u8) -> Result<Self> {
        if value > Self::MAX {
            return Err(Error::InvalidSeverity {
                value,
                reason: "severity must be in the range 0..=10",
            });
        }
        Ok(Self(value))
    }

    /// A low-priority, informational severity (value `1`).
    #[must_use]
    pub const fn info() -> Self {
        Self(1)
    }

    /// A warning-level severity (value `5`).
    #[must_use]
    pub const fn warning() -> Self {
        Self(5)
    }

    /// An error-level severity (value `7`).
    #[must_use]
    pub const fn error() -> Self {
        Self(7)
    }

    /// A critical severity (value `10`).
    #[must_use]
    pub const fn critical() -> Self {
        Self(10)
    }

    /// Returns the raw numeric score.
    #[must_use]
    pub const fn value(self) -> u8 {
        self.0
    }

    /// Returns `true` if this severity falls in the informational band (`0..=2`).
    #[must_use]
    pub const fn is_info(self) -> bool {
        self.0 <= 2
    }

    /// Returns `true` if this severity falls in the warning band (`3..=5`).
    #[must_use]
    pub const fn is_warning(self) -> bool {
        self.0 >= 3 && self.0 <= 5
    }

    /// Returns `true` if this severity falls in the error band (`6..=8`).
    #[must_use]
    pub const fn is_error(self) -> bool {
        self.0 >= 6 && self.0 <= 8
    }

    /// Returns `true` if this severity falls in the critical band (`9..=10`).
    #[must_use]
    pub const fn is_critical(self) -> bool {
        self.0 >= 9
    }
}

impl Default for Severity {
    fn default() -> Self {
        Self::info()
    }
}

impl PartialEq<u8> for Severity {
    fn eq(&self, other: &u8) -> bool {
        self.0 == *other
    }
}

impl PartialOrd<u8> for Severity {
    fn partial_cmp(&self, other: &u8) -> Option<std::cmp::Ordering> {
        self.0.partial_cmp(other)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_out_of_band_values() {
        let err = Severity::new(11).expect_err("11 is out of band");
        assert!(matches!(err, Error::InvalidSeverity { value: 11, .. }));
    }

    #[test]
    fn named_constructors_match_their_band() {
        assert!(Severity::info().is_info());
        assert!(Severity::warning().is_warning());
        assert!(Severity::error().is_error());
        assert!(Severity::critical().is_critical());
    }

    #[test]
    fn severities_order_numerically() {
        assert!(Severity::critical() > Severity::warning());
    }
}

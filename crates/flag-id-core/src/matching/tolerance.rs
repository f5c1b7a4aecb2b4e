//! Acceptance bands for ratio comparisons.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// How far a candidate's value may stray from the query's.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", content = "value", rename_all = "snake_case")]
pub enum Tolerance {
    /// Fixed offset: band is `[q - t, q + t]`.
    Absolute(f32),
    /// Fraction of the query value: band is `[q - q·t, q + q·t]`.
    Relative(f32),
}

impl Tolerance {
    /// The configured tolerance value.
    #[must_use]
    pub const fn value(self) -> f32 {
        match self {
            Self::Absolute(t) | Self::Relative(t) => t,
        }
    }

    /// Acceptance band around a query value.
    #[must_use]
    pub fn band(self, center: f32) -> AcceptanceBand {
        let delta = match self {
            Self::Absolute(t) => t,
            Self::Relative(t) => center.abs() * t,
        };
        AcceptanceBand {
            min: center - delta,
            max: center + delta,
        }
    }

    /// Checks the tolerance is finite and non-negative.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfiguration`] naming `field` otherwise.
    pub fn validate(self, field: &str) -> Result<()> {
        let t = self.value();
        if !t.is_finite() || t < 0.0 {
            return Err(Error::InvalidConfiguration(format!(
                "{field} must be a finite value >= 0, got {t}"
            )));
        }
        Ok(())
    }
}

impl Default for Tolerance {
    fn default() -> Self {
        Self::Absolute(0.006)
    }
}

/// Closed interval of accepted values.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AcceptanceBand {
    /// Lowest accepted value.
    pub min: f32,
    /// Highest accepted value.
    pub max: f32,
}

impl AcceptanceBand {
    /// Returns true if `value` lies inside the band, bounds included.
    #[must_use]
    pub fn contains(&self, value: f32) -> bool {
        value >= self.min && value <= self.max
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absolute_band() {
        let band = Tolerance::Absolute(0.1).band(0.5);
        assert!((band.min - 0.4).abs() < 1e-6);
        assert!((band.max - 0.6).abs() < 1e-6);
        assert!(band.contains(0.5));
        assert!(!band.contains(0.65));
    }

    #[test]
    fn test_relative_band_scales_with_query() {
        let band = Tolerance::Relative(0.5).band(0.2);
        assert!((band.min - 0.1).abs() < 1e-6);
        assert!((band.max - 0.3).abs() < 1e-6);
    }

    #[test]
    fn test_zero_tolerance_accepts_exact_value() {
        let band = Tolerance::Absolute(0.0).band(0.25);
        assert!(band.contains(0.25));
        assert!(!band.contains(0.250_001));
    }

    #[test]
    fn test_validate_rejects_negative_and_nan() {
        assert!(Tolerance::Absolute(-0.1).validate("ratio_tolerance").is_err());
        assert!(Tolerance::Relative(f32::NAN).validate("edge_tolerance").is_err());
        assert!(Tolerance::Absolute(0.0).validate("ratio_tolerance").is_ok());
    }

    #[test]
    fn test_default_is_absolute() {
        assert_eq!(Tolerance::default(), Tolerance::Absolute(0.006));
    }
}

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::eta::config::SeverityParams;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SeverityTier {
    Light,
    Moderate,
    Heavy,
}

impl SeverityTier {
    /// Tier of a pre-saturation impact sum, by magnitude.
    pub fn classify(raw_sum: f64, params: &SeverityParams) -> Self {
        let magnitude = raw_sum.abs();
        if magnitude >= params.heavy_threshold {
            Self::Heavy
        } else if magnitude >= params.moderate_threshold {
            Self::Moderate
        } else {
            Self::Light
        }
    }

    pub fn ceiling(&self, params: &SeverityParams) -> f64 {
        match self {
            Self::Light => params.light_cap,
            Self::Moderate => params.moderate_cap,
            Self::Heavy => params.heavy_cap,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Moderate => "moderate",
            Self::Heavy => "heavy",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SeverityOutcome {
    pub tier: SeverityTier,
    pub multiplier: f64,
    pub cap_applied: bool,
}

/// Clips the combined impact to the ceiling of the tier `raw_sum` falls in.
pub fn apply_severity_cap(combined: f64, raw_sum: f64, params: &SeverityParams) -> SeverityOutcome {
    let tier = SeverityTier::classify(raw_sum, params);
    let ceiling = tier.ceiling(params);
    let cap_applied = combined > ceiling;
    let multiplier = if cap_applied { ceiling } else { combined };

    if cap_applied {
        debug!(
            tier = tier.as_str(),
            combined,
            ceiling,
            "severity cap clipped combined impact"
        );
    }

    SeverityOutcome {
        tier,
        multiplier,
        cap_applied,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tier_boundaries_are_inclusive_on_the_upper_tier() {
        let p = SeverityParams::default();
        assert_eq!(SeverityTier::classify(0.349, &p), SeverityTier::Light);
        assert_eq!(SeverityTier::classify(0.35, &p), SeverityTier::Moderate);
        assert_eq!(SeverityTier::classify(0.499, &p), SeverityTier::Moderate);
        assert_eq!(SeverityTier::classify(0.50, &p), SeverityTier::Heavy);
        assert_eq!(SeverityTier::classify(-0.6, &p), SeverityTier::Heavy);
    }

    #[test]
    fn test_clips_only_above_the_ceiling() {
        let p = SeverityParams::default();
        let out = apply_severity_cap(0.7, 1.3, &p);
        assert_eq!(out.tier, SeverityTier::Heavy);
        assert_eq!(out.multiplier, 0.60);
        assert!(out.cap_applied);

        let out = apply_severity_cap(0.45, 0.9, &p);
        assert_eq!(out.multiplier, 0.45);
        assert!(!out.cap_applied);

        let out = apply_severity_cap(0.6, 0.9, &p);
        assert!(!out.cap_applied);
    }

    #[test]
    fn test_negative_impacts_pass_through() {
        let out = apply_severity_cap(-0.2, -0.25, &SeverityParams::default());
        assert_eq!(out.multiplier, -0.2);
        assert!(!out.cap_applied);
    }
}

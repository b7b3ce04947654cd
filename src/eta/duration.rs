use serde::{Deserialize, Serialize};

use crate::eta::config::DurationParams;
use crate::eta::types::ImpactEntry;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TripCategory {
    Short,
    Medium,
    Long,
    Extended,
}

impl TripCategory {
    pub fn classify(base_minutes: f64, params: &DurationParams) -> Self {
        if base_minutes <= params.short_threshold {
            Self::Short
        } else if base_minutes <= params.medium_threshold {
            Self::Medium
        } else if base_minutes <= params.long_threshold {
            Self::Long
        } else {
            Self::Extended
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Short => "short",
            Self::Medium => "medium",
            Self::Long => "long",
            Self::Extended => "extended",
        }
    }
}

/// Share of an impact a trip of `base_minutes` still feels.
///
/// Full effect up to the short threshold, a linear fall to
/// `short_to_medium_slope` at the medium threshold, then halving (by default)
/// every further hour. Non-increasing in `base_minutes`.
pub fn dampening_factor(base_minutes: f64, params: &DurationParams) -> f64 {
    let short = params.short_threshold;
    let medium = params.medium_threshold;
    let plateau = params.short_to_medium_slope;

    if base_minutes <= short {
        1.0
    } else if base_minutes <= medium {
        let progress = (base_minutes - short) / (medium - short);
        1.0 - (1.0 - plateau) * progress
    } else {
        let hours_past_medium = (base_minutes - medium) / 60.0;
        plateau * params.medium_to_long_slope.powf(hours_past_medium)
    }
}

pub fn apply_duration_scaling(
    entries: Vec<ImpactEntry>,
    base_minutes: f64,
    params: &DurationParams,
) -> Vec<ImpactEntry> {
    let factor = dampening_factor(base_minutes, params);
    entries
        .into_iter()
        .map(|mut entry| {
            entry.dampening = factor;
            entry
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-12;

    #[test]
    fn test_short_trips_feel_everything() {
        let p = DurationParams::default();
        assert_eq!(dampening_factor(5.0, &p), 1.0);
        assert_eq!(dampening_factor(30.0, &p), 1.0);
    }

    #[test]
    fn test_medium_trips_interpolate_linearly() {
        let p = DurationParams::default();
        assert!((dampening_factor(75.0, &p) - 0.9).abs() < EPS);
        assert!((dampening_factor(120.0, &p) - 0.8).abs() < EPS);
    }

    #[test]
    fn test_long_trips_decay_exponentially_from_the_plateau() {
        let p = DurationParams::default();
        assert!((dampening_factor(180.0, &p) - 0.4).abs() < EPS);
        assert!((dampening_factor(240.0, &p) - 0.2).abs() < EPS);
        assert!((dampening_factor(300.0, &p) - 0.1).abs() < EPS);
    }

    #[test]
    fn test_continuous_at_thresholds() {
        let p = DurationParams::default();
        let just_above_short = dampening_factor(30.0 + 1e-9, &p);
        assert!((just_above_short - 1.0).abs() < 1e-9);
        let just_above_medium = dampening_factor(120.0 + 1e-9, &p);
        assert!((just_above_medium - 0.8).abs() < 1e-9);
    }

    #[test]
    fn test_never_increases_with_trip_length() {
        let p = DurationParams::default();
        let mut prev = f64::INFINITY;
        let mut minutes = 1.0;
        while minutes < 1_000.0 {
            let f = dampening_factor(minutes, &p);
            assert!(f <= prev, "dampening rose at {minutes} min");
            assert!(f > 0.0);
            prev = f;
            minutes += 2.5;
        }
    }

    #[test]
    fn test_categories_follow_thresholds() {
        let p = DurationParams::default();
        assert_eq!(TripCategory::classify(30.0, &p), TripCategory::Short);
        assert_eq!(TripCategory::classify(31.0, &p), TripCategory::Medium);
        assert_eq!(TripCategory::classify(200.0, &p), TripCategory::Long);
        assert_eq!(TripCategory::classify(301.0, &p), TripCategory::Extended);
    }
}

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{EtaError, Result};
use crate::eta::catalog::ConditionCatalog;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ContextWeights {
    /// Applied at night to any weather whose catalog impact is positive.
    pub night_weather: f64,
    /// Applied to construction on a weekday.
    pub weekday_construction: f64,
    /// Applied to every manual factor during a peak period.
    pub peak_period: f64,
}

impl Default for ContextWeights {
    fn default() -> Self {
        Self {
            night_weather: 1.3,
            weekday_construction: 1.2,
            peak_period: 1.15,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DurationParams {
    pub short_threshold: f64,
    pub medium_threshold: f64,
    pub long_threshold: f64,
    /// Fraction of an impact still felt once a trip reaches `medium_threshold`.
    pub short_to_medium_slope: f64,
    /// Per-hour decay base beyond `medium_threshold`.
    pub medium_to_long_slope: f64,
}

impl Default for DurationParams {
    fn default() -> Self {
        Self {
            short_threshold: 30.0,
            medium_threshold: 120.0,
            long_threshold: 300.0,
            short_to_medium_slope: 0.8,
            medium_to_long_slope: 0.5,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TrafficParams {
    pub jam_weight: f64,
    pub jam_cap: f64,
    pub incident_weight: f64,
    pub incident_cap: f64,
    pub speed_weight: f64,
    pub max_impact: f64,
    pub min_confidence: f64,
    pub manual_suppression: f64,
}

impl Default for TrafficParams {
    fn default() -> Self {
        Self {
            jam_weight: 0.8,
            jam_cap: 0.8,
            incident_weight: 0.1,
            incident_cap: 0.4,
            speed_weight: 0.6,
            max_impact: 1.2,
            min_confidence: 0.3,
            manual_suppression: 0.3,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DiminishingParams {
    pub k: f64,
    pub min_denominator: f64,
}

impl Default for DiminishingParams {
    fn default() -> Self {
        Self {
            k: 0.7,
            min_denominator: 0.01,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SeverityParams {
    pub moderate_threshold: f64,
    pub heavy_threshold: f64,
    pub light_cap: f64,
    pub moderate_cap: f64,
    pub heavy_cap: f64,
}

impl Default for SeverityParams {
    fn default() -> Self {
        Self {
            moderate_threshold: 0.35,
            heavy_threshold: 0.50,
            light_cap: 0.35,
            moderate_cap: 0.50,
            heavy_cap: 0.60,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AdditiveRates {
    pub weather_per_hour: f64,
    pub traffic_per_hour: f64,
    pub road_per_hour: f64,
}

impl Default for AdditiveRates {
    fn default() -> Self {
        Self {
            weather_per_hour: 2.0,
            traffic_per_hour: 3.0,
            road_per_hour: 1.5,
        }
    }
}

/// Every tunable constant of the ETA pipeline.
///
/// Built once at startup and shared read-only; nothing in the pipeline
/// mutates it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EtaConfig {
    pub catalog: ConditionCatalog,
    pub context: ContextWeights,
    pub duration: DurationParams,
    pub traffic: TrafficParams,
    pub combine: DiminishingParams,
    pub severity: SeverityParams,
    pub additive: AdditiveRates,
    /// Lower bound on the adjusted duration as a fraction of the base.
    pub min_fraction: f64,
}

impl Default for EtaConfig {
    fn default() -> Self {
        Self {
            catalog: ConditionCatalog::default(),
            context: ContextWeights::default(),
            duration: DurationParams::default(),
            traffic: TrafficParams::default(),
            combine: DiminishingParams::default(),
            severity: SeverityParams::default(),
            additive: AdditiveRates::default(),
            min_fraction: 0.5,
        }
    }
}

impl EtaConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json_str(&raw)
    }

    pub fn from_env() -> Result<Self> {
        let mut config = match std::env::var("ETA_CONFIG_PATH") {
            Ok(path) if !path.trim().is_empty() => Self::from_file(path.trim())?,
            _ => Self::default(),
        };

        if let Some(val) = env_f64("ETA_MIN_FRACTION") {
            config.min_fraction = val;
        }
        if let Some(val) = env_f64("ETA_TRAFFIC_MIN_CONFIDENCE") {
            config.traffic.min_confidence = val;
        }
        if let Some(val) = env_f64("ETA_DIMINISHING_K") {
            config.combine.k = val;
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let d = &self.duration;
        if !(d.short_threshold > 0.0
            && d.short_threshold < d.medium_threshold
            && d.medium_threshold < d.long_threshold)
        {
            return Err(invalid(format!(
                "duration thresholds must be positive and ascending, got {}/{}/{}",
                d.short_threshold, d.medium_threshold, d.long_threshold
            )));
        }
        check_unit_open("duration.short_to_medium_slope", d.short_to_medium_slope)?;
        check_unit_open("duration.medium_to_long_slope", d.medium_to_long_slope)?;

        let t = &self.traffic;
        for (name, value) in [
            ("traffic.jam_weight", t.jam_weight),
            ("traffic.jam_cap", t.jam_cap),
            ("traffic.incident_weight", t.incident_weight),
            ("traffic.incident_cap", t.incident_cap),
            ("traffic.speed_weight", t.speed_weight),
            ("traffic.max_impact", t.max_impact),
        ] {
            check_non_negative(name, value)?;
        }
        check_unit_closed("traffic.min_confidence", t.min_confidence)?;
        check_unit_closed("traffic.manual_suppression", t.manual_suppression)?;

        check_non_negative("combine.k", self.combine.k)?;
        if !(self.combine.min_denominator > 0.0) {
            return Err(invalid(format!(
                "combine.min_denominator must be positive, got {}",
                self.combine.min_denominator
            )));
        }

        let s = &self.severity;
        if !(s.moderate_threshold >= 0.0 && s.moderate_threshold < s.heavy_threshold) {
            return Err(invalid(format!(
                "severity thresholds must be ascending, got {}/{}",
                s.moderate_threshold, s.heavy_threshold
            )));
        }
        if !(s.light_cap >= 0.0 && s.light_cap <= s.moderate_cap && s.moderate_cap <= s.heavy_cap) {
            return Err(invalid(format!(
                "severity caps must be non-negative and ascending, got {}/{}/{}",
                s.light_cap, s.moderate_cap, s.heavy_cap
            )));
        }

        for (name, value) in [
            ("additive.weather_per_hour", self.additive.weather_per_hour),
            ("additive.traffic_per_hour", self.additive.traffic_per_hour),
            ("additive.road_per_hour", self.additive.road_per_hour),
        ] {
            check_non_negative(name, value)?;
        }

        check_unit_open("min_fraction", self.min_fraction)?;
        self.catalog.validate()?;
        Ok(())
    }
}

fn env_f64(key: &str) -> Option<f64> {
    std::env::var(key).ok().and_then(|v| v.trim().parse::<f64>().ok())
}

fn invalid(msg: String) -> EtaError {
    EtaError::InvalidConfig(msg)
}

fn check_non_negative(name: &str, value: f64) -> Result<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(invalid(format!("{name} must be a non-negative number, got {value}")))
    }
}

fn check_unit_closed(name: &str, value: f64) -> Result<()> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(invalid(format!("{name} must lie in [0, 1], got {value}")))
    }
}

fn check_unit_open(name: &str, value: f64) -> Result<()> {
    if value > 0.0 && value <= 1.0 {
        Ok(())
    } else {
        Err(invalid(format!("{name} must lie in (0, 1], got {value}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        EtaConfig::default().validate().unwrap();
    }

    #[test]
    fn test_partial_json_keeps_other_defaults() {
        let config = EtaConfig::from_json_str(r#"{"combine": {"k": 0.5}, "min_fraction": 0.6}"#)
            .unwrap();
        assert_eq!(config.combine.k, 0.5);
        assert_eq!(config.combine.min_denominator, 0.01);
        assert_eq!(config.min_fraction, 0.6);
        assert_eq!(config.traffic.max_impact, 1.2);
    }

    #[test]
    fn test_rejects_unordered_thresholds() {
        let mut config = EtaConfig::default();
        config.duration.medium_threshold = 20.0;
        assert!(matches!(config.validate(), Err(EtaError::InvalidConfig(_))));
    }

    #[test]
    fn test_rejects_out_of_range_fractions() {
        let mut config = EtaConfig::default();
        config.traffic.manual_suppression = 1.5;
        assert!(config.validate().is_err());

        let mut config = EtaConfig::default();
        config.min_fraction = 0.0;
        assert!(config.validate().is_err());

        let mut config = EtaConfig::default();
        config.combine.min_denominator = 0.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_descending_caps() {
        let mut config = EtaConfig::default();
        config.severity.heavy_cap = 0.4;
        assert!(config.validate().is_err());
    }
}

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::eta::config::{AdditiveRates, TrafficParams};
use crate::eta::types::{FactorKind, ImpactEntry, TrafficSnapshot};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EtaWarning {
    /// Live traffic was supplied but too uncertain to use; the estimate
    /// falls back to manual conditions only.
    DegradedTraffic { confidence: f64, min_confidence: f64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrafficTerms {
    pub jam: f64,
    pub incident: f64,
    pub speed: f64,
    pub total: f64,
}

#[derive(Debug, Clone, Default)]
pub struct TrafficOutcome {
    pub used: bool,
    pub terms: Option<TrafficTerms>,
    pub warning: Option<EtaWarning>,
}

fn finite_or(value: f64, fallback: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        fallback
    }
}

/// Independent traffic impact from live telemetry, clamped to
/// `[0, params.max_impact]`. Never fails on odd readings.
pub fn traffic_terms(snapshot: &TrafficSnapshot, params: &TrafficParams) -> TrafficTerms {
    let jam_factor = finite_or(snapshot.jam_factor, 0.0).clamp(0.0, 1.0);
    let jam = (jam_factor * params.jam_weight).min(params.jam_cap);

    let incident =
        (snapshot.incident_count as f64 * params.incident_weight).min(params.incident_cap);

    let free_flow = finite_or(snapshot.free_flow_speed_kmh, 0.0);
    let speed = if free_flow > 0.0 {
        let average = finite_or(snapshot.average_speed_kmh, free_flow).max(0.0);
        let ratio = (average / free_flow).clamp(0.0, 1.0);
        (1.0 - ratio) * params.speed_weight
    } else {
        0.0
    };

    let total = (jam + incident + speed).clamp(0.0, params.max_impact);
    TrafficTerms {
        jam,
        incident,
        speed,
        total,
    }
}

/// Folds an optional snapshot into the impact list.
///
/// A usable snapshot appends a `live_traffic` entry (dampened like every
/// other entry) and scales every manual weight by `manual_suppression`.
/// A snapshot below `min_confidence` leaves the entries untouched and
/// reports a degradation warning instead.
pub fn fuse_traffic(
    entries: &mut Vec<ImpactEntry>,
    snapshot: Option<&TrafficSnapshot>,
    dampening: f64,
    params: &TrafficParams,
    rates: &AdditiveRates,
) -> TrafficOutcome {
    let Some(snapshot) = snapshot else {
        return TrafficOutcome::default();
    };

    let confidence = finite_or(snapshot.confidence, 0.0);
    if confidence < params.min_confidence {
        warn!(
            confidence,
            min_confidence = params.min_confidence,
            "traffic confidence too low, using manual conditions only"
        );
        return TrafficOutcome {
            used: false,
            terms: None,
            warning: Some(EtaWarning::DegradedTraffic {
                confidence,
                min_confidence: params.min_confidence,
            }),
        };
    }

    let terms = traffic_terms(snapshot, params);

    for entry in entries.iter_mut().filter(|e| e.factor.is_manual()) {
        entry.weight *= params.manual_suppression;
    }

    let mut live = ImpactEntry::new(FactorKind::LiveTraffic, "live", terms.total);
    live.dampening = dampening;
    if terms.total > 0.0 {
        live.additive_minutes_per_hour = rates.traffic_per_hour;
    }
    entries.push(live);

    TrafficOutcome {
        used: true,
        terms: Some(terms),
        warning: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(
        jam: f64,
        incidents: u32,
        speed: f64,
        free_flow: f64,
        confidence: f64,
    ) -> TrafficSnapshot {
        TrafficSnapshot {
            jam_factor: jam,
            incident_count: incidents,
            average_speed_kmh: speed,
            free_flow_speed_kmh: free_flow,
            confidence,
        }
    }

    fn manual_entries() -> Vec<ImpactEntry> {
        vec![
            ImpactEntry::new(FactorKind::Weather, "rain", 0.15),
            ImpactEntry::new(FactorKind::TimeOfDay, "midday", 0.0),
        ]
    }

    #[test]
    fn test_worst_case_clamps_at_max_impact() {
        let terms = traffic_terms(&snapshot(1.0, 10, 0.0, 60.0, 1.0), &TrafficParams::default());
        assert!((terms.jam - 0.8).abs() < 1e-12);
        assert!((terms.incident - 0.4).abs() < 1e-12);
        assert!((terms.speed - 0.6).abs() < 1e-12);
        assert!((terms.total - 1.2).abs() < 1e-12);
    }

    #[test]
    fn test_speed_above_free_flow_contributes_nothing() {
        let terms = traffic_terms(&snapshot(0.0, 0, 90.0, 60.0, 1.0), &TrafficParams::default());
        assert_eq!(terms.speed, 0.0);
        assert_eq!(terms.total, 0.0);
    }

    #[test]
    fn test_garbage_readings_are_clamped_not_rejected() {
        let params = TrafficParams::default();
        let terms = traffic_terms(&snapshot(f64::NAN, 0, -10.0, 0.0, 1.0), &params);
        assert_eq!(terms.total, 0.0);

        let terms = traffic_terms(&snapshot(3.0, 0, f64::NAN, 60.0, 1.0), &params);
        assert!((terms.jam - 0.8).abs() < 1e-12);
        assert_eq!(terms.speed, 0.0);
    }

    #[test]
    fn test_no_snapshot_means_no_change() {
        let mut entries = manual_entries();
        let outcome = fuse_traffic(
            &mut entries,
            None,
            1.0,
            &TrafficParams::default(),
            &AdditiveRates::default(),
        );
        assert!(!outcome.used);
        assert!(outcome.warning.is_none());
        assert_eq!(entries, manual_entries());
    }

    #[test]
    fn test_low_confidence_degrades_to_manual_only() {
        let mut entries = manual_entries();
        let snap = snapshot(0.9, 3, 10.0, 60.0, 0.1);
        let outcome = fuse_traffic(
            &mut entries,
            Some(&snap),
            1.0,
            &TrafficParams::default(),
            &AdditiveRates::default(),
        );
        assert!(!outcome.used);
        assert_eq!(
            outcome.warning,
            Some(EtaWarning::DegradedTraffic {
                confidence: 0.1,
                min_confidence: 0.3
            })
        );
        assert_eq!(entries, manual_entries());
    }

    #[test]
    fn test_usable_traffic_suppresses_manual_weights() {
        let mut entries = manual_entries();
        let snap = snapshot(0.5, 1, 30.0, 60.0, 0.9);
        let outcome = fuse_traffic(
            &mut entries,
            Some(&snap),
            0.8,
            &TrafficParams::default(),
            &AdditiveRates::default(),
        );
        assert!(outcome.used);
        assert_eq!(entries.len(), 3);
        assert!(entries[..2].iter().all(|e| (e.weight - 0.3).abs() < 1e-12));

        let live = &entries[2];
        assert_eq!(live.factor, FactorKind::LiveTraffic);
        assert_eq!(live.weight, 1.0);
        assert_eq!(live.dampening, 0.8);
        assert!((live.raw_impact - (0.4 + 0.1 + 0.3)).abs() < 1e-12);
        assert_eq!(live.additive_minutes_per_hour, 3.0);
    }

    #[test]
    fn test_free_flowing_traffic_carries_no_additive_rate() {
        let mut entries = manual_entries();
        let snap = snapshot(0.0, 0, 60.0, 60.0, 0.9);
        fuse_traffic(
            &mut entries,
            Some(&snap),
            1.0,
            &TrafficParams::default(),
            &AdditiveRates::default(),
        );
        assert_eq!(entries[2].additive_minutes_per_hour, 0.0);
    }
}

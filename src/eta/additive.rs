use serde::{Deserialize, Serialize};

use crate::eta::config::AdditiveRates;
use crate::eta::types::{FactorKind, ImpactEntry};

/// Fixed minutes added on top of the multiplicative adjustment, per cause.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct AdditivePenalty {
    pub weather: f64,
    pub traffic: f64,
    pub road: f64,
}

impl AdditivePenalty {
    pub fn total(&self) -> f64 {
        self.weather + self.traffic + self.road
    }
}

fn has_rate(entries: &[ImpactEntry], factor: FactorKind) -> bool {
    entries
        .iter()
        .any(|e| e.factor == factor && e.additive_minutes_per_hour > 0.0)
}

/// Per-hour penalties scaled by trip length.
///
/// The traffic penalty is charged once, whether it was triggered by a peak
/// period, a road problem or congested live traffic.
pub fn accumulate_additive(
    entries: &[ImpactEntry],
    base_minutes: f64,
    rates: &AdditiveRates,
) -> AdditivePenalty {
    let hours = base_minutes / 60.0;
    let weather_present = has_rate(entries, FactorKind::Weather);
    let road_present = has_rate(entries, FactorKind::RoadProblem);
    let traffic_present = road_present
        || has_rate(entries, FactorKind::TimeOfDay)
        || has_rate(entries, FactorKind::LiveTraffic);

    AdditivePenalty {
        weather: if weather_present { rates.weather_per_hour * hours } else { 0.0 },
        traffic: if traffic_present { rates.traffic_per_hour * hours } else { 0.0 },
        road: if road_present { rates.road_per_hour * hours } else { 0.0 },
    }
}

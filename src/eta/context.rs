use crate::eta::config::ContextWeights;
use crate::eta::types::{DayType, FactorKind, ImpactEntry, RoadProblem, TimeOfDay, TripContext};

/// Product of every interaction rule that fires for `entry` under `ctx`.
///
/// Rules are independent of one another, so the order they are checked in
/// does not matter and several may stack on one factor. The night rule keys
/// off the catalog impact, so any weather that slows the trip is amplified.
pub fn interaction_coefficient(
    entry: &ImpactEntry,
    ctx: &TripContext,
    weights: &ContextWeights,
) -> f64 {
    let factor = entry.factor;
    let mut coefficient = 1.0;

    if factor == FactorKind::Weather
        && entry.raw_impact > 0.0
        && ctx.time_of_day == TimeOfDay::Night
    {
        coefficient *= weights.night_weather;
    }

    if factor == FactorKind::RoadProblem
        && ctx.road_problem == RoadProblem::Construction
        && ctx.day_type == DayType::Weekday
    {
        coefficient *= weights.weekday_construction;
    }

    if factor.is_manual() && ctx.time_of_day.is_peak() {
        coefficient *= weights.peak_period;
    }

    coefficient
}

pub fn apply_context_weighting(
    entries: Vec<ImpactEntry>,
    ctx: &TripContext,
    weights: &ContextWeights,
) -> Vec<ImpactEntry> {
    entries
        .into_iter()
        .map(|mut entry| {
            let coefficient = interaction_coefficient(&entry, ctx, weights);
            entry.context_coefficient *= coefficient;
            entry
        })
        .collect()
}

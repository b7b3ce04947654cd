use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::Result;
use crate::eta::additive::{accumulate_additive, AdditivePenalty};
use crate::eta::combine::combine_impacts;
use crate::eta::config::EtaConfig;
use crate::eta::context::apply_context_weighting;
use crate::eta::duration::{apply_duration_scaling, dampening_factor, TripCategory};
use crate::eta::severity::{apply_severity_cap, SeverityTier};
use crate::eta::traffic::{fuse_traffic, EtaWarning, TrafficTerms};
use crate::eta::types::{format_minutes, ImpactEntry, TrafficSnapshot, TripContext};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CongestionLevel {
    Light,
    Moderate,
    Heavy,
}

impl CongestionLevel {
    /// Buckets the effective adjusted/base ratio.
    pub fn classify(ratio: f64) -> Self {
        if ratio < 1.2 {
            Self::Light
        } else if ratio < 1.6 {
            Self::Moderate
        } else {
            Self::Heavy
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EtaBreakdown {
    pub base_minutes: f64,
    pub adjusted_minutes: f64,
    /// Capped multiplicative impact; the trip takes `1 + applied_multiplier`
    /// times the base before additive minutes.
    pub applied_multiplier: f64,
    pub additive_minutes: f64,
    pub additive: AdditivePenalty,
    /// In evaluation order; live traffic, when used, comes last.
    pub per_factor: Vec<ImpactEntry>,
    pub severity_cap_applied: bool,
    pub severity_tier: SeverityTier,
    pub traffic_used: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub traffic: Option<TrafficTerms>,
    pub trip_category: TripCategory,
    pub dampening: f64,
    pub raw_sum: f64,
    pub scaled_sum: f64,
    pub combined_impact: f64,
    pub floor_applied: bool,
    pub total_inflation_percent: f64,
    pub congestion_level: CongestionLevel,
    pub warnings: Vec<EtaWarning>,
}

impl EtaBreakdown {
    pub fn traffic_impact(&self) -> Option<f64> {
        self.traffic.map(|t| t.total)
    }

    pub fn is_degraded(&self) -> bool {
        self.warnings
            .iter()
            .any(|w| matches!(w, EtaWarning::DegradedTraffic { .. }))
    }
}

impl fmt::Display for EtaBreakdown {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} (base {}, {:+.1}%, {} conditions",
            format_minutes(self.adjusted_minutes),
            format_minutes(self.base_minutes),
            self.total_inflation_percent,
            self.severity_tier.as_str(),
        )?;
        if self.traffic_used {
            f.write_str(", live traffic")?;
        }
        f.write_str(")")
    }
}

/// Adjusts `ctx.base_minutes` for the trip's conditions and optional live
/// traffic.
///
/// Pure: identical inputs give bit-identical output. Fails only on an invalid
/// trip or configuration; every numeric edge is clamped.
pub fn compute_eta(
    ctx: &TripContext,
    traffic: Option<&TrafficSnapshot>,
    config: &EtaConfig,
) -> Result<EtaBreakdown> {
    config.validate()?;
    run_pipeline(ctx, traffic, config)
}

/// `config` must already be validated.
fn run_pipeline(
    ctx: &TripContext,
    traffic: Option<&TrafficSnapshot>,
    config: &EtaConfig,
) -> Result<EtaBreakdown> {
    ctx.validate()?;
    let base = ctx.base_minutes;

    let entries = config.catalog.resolve(ctx, &config.additive);
    let entries = apply_context_weighting(entries, ctx, &config.context);

    let dampening = dampening_factor(base, &config.duration);
    let mut entries = apply_duration_scaling(entries, base, &config.duration);

    let outcome = fuse_traffic(
        &mut entries,
        traffic,
        dampening,
        &config.traffic,
        &config.additive,
    );

    let combined = combine_impacts(&entries, &config.combine);
    let severity = apply_severity_cap(combined.combined, combined.raw_sum, &config.severity);
    let additive = accumulate_additive(&entries, base, &config.additive);

    let uncapped = base * (1.0 + severity.multiplier) + additive.total();
    let floor = config.min_fraction * base;
    let floor_applied = uncapped < floor;
    let adjusted = if floor_applied { floor } else { uncapped };

    debug!(
        base_minutes = base,
        raw_sum = combined.raw_sum,
        scaled_sum = combined.scaled_sum,
        combined = combined.combined,
        tier = severity.tier.as_str(),
        traffic_used = outcome.used,
        adjusted_minutes = adjusted,
        "eta computed"
    );

    let ratio = adjusted / base;
    Ok(EtaBreakdown {
        base_minutes: base,
        adjusted_minutes: adjusted,
        applied_multiplier: severity.multiplier,
        additive_minutes: additive.total(),
        additive,
        per_factor: entries,
        severity_cap_applied: severity.cap_applied,
        severity_tier: severity.tier,
        traffic_used: outcome.used,
        traffic: outcome.terms,
        trip_category: TripCategory::classify(base, &config.duration),
        dampening,
        raw_sum: combined.raw_sum,
        scaled_sum: combined.scaled_sum,
        combined_impact: combined.combined,
        floor_applied,
        total_inflation_percent: (ratio - 1.0) * 100.0,
        congestion_level: CongestionLevel::classify(ratio),
        warnings: outcome.warning.into_iter().collect(),
    })
}

/// One candidate route from the routing provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateRoute {
    pub route_id: String,
    pub base_minutes: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distance_km: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub traffic: Option<TrafficSnapshot>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteEstimate {
    pub route_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distance_km: Option<f64>,
    pub breakdown: EtaBreakdown,
}

/// Holds one validated configuration and runs estimates against it.
#[derive(Debug, Clone, Default)]
pub struct EtaEngine {
    config: EtaConfig,
}

impl EtaEngine {
    pub fn new(config: EtaConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &EtaConfig {
        &self.config
    }

    pub fn estimate(
        &self,
        ctx: &TripContext,
        traffic: Option<&TrafficSnapshot>,
    ) -> Result<EtaBreakdown> {
        run_pipeline(ctx, traffic, &self.config)
    }

    /// Estimates every candidate under the same conditions and orders them
    /// fastest first. `conditions.base_minutes` is replaced by each route's own.
    pub fn rank_routes(
        &self,
        conditions: &TripContext,
        candidates: &[CandidateRoute],
    ) -> Result<Vec<RouteEstimate>> {
        let mut ranked = candidates
            .iter()
            .map(|route| -> Result<RouteEstimate> {
                let ctx = TripContext {
                    base_minutes: route.base_minutes,
                    ..conditions.clone()
                };
                let breakdown = self.estimate(&ctx, route.traffic.as_ref())?;
                Ok(RouteEstimate {
                    route_id: route.route_id.clone(),
                    distance_km: route.distance_km,
                    breakdown,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        ranked.sort_by(|a, b| {
            a.breakdown
                .adjusted_minutes
                .total_cmp(&b.breakdown.adjusted_minutes)
        });
        Ok(ranked)
    }
}

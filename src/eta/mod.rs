//! ETA adjustment pipeline.
//!
//! A trip's conditions are resolved against the catalog, weighted by their
//! interactions, dampened by trip length, optionally fused with live traffic,
//! merged with diminishing returns, capped by severity tier, and finally
//! topped up with per-hour penalties and floored.

pub mod additive;
pub mod catalog;
pub mod combine;
pub mod config;
pub mod context;
pub mod duration;
pub mod engine;
pub mod severity;
pub mod traffic;
pub mod types;

pub use additive::AdditivePenalty;
pub use catalog::ConditionCatalog;
pub use config::EtaConfig;
pub use duration::TripCategory;
pub use engine::{
    compute_eta, CandidateRoute, CongestionLevel, EtaBreakdown, EtaEngine, RouteEstimate,
};
pub use severity::SeverityTier;
pub use traffic::{EtaWarning, TrafficTerms};
pub use types::{
    format_minutes, DayType, DrivingHistory, FactorKind, ImpactEntry, PoliceActivity,
    RoadProblem, SegmentFlow, TimeOfDay, TrafficSnapshot, TripContext, TripRequest, Weather,
};

//! # eta-engine
//!
//! Turns a routing provider's free-flow travel time into a realistic ETA by
//! folding in weather, time of day, road problems, driver behaviour and live
//! traffic. Computation is pure and synchronous; a shared [`EtaConfig`] can be
//! used from any number of threads.
//!
//! ```
//! use eta_engine::{compute_eta, EtaConfig, TripContext, Weather};
//!
//! let ctx = TripContext::new(42.0).unwrap().with_weather(Weather::Rain);
//! let eta = compute_eta(&ctx, None, &EtaConfig::default()).unwrap();
//! assert!(eta.adjusted_minutes > 42.0);
//! ```

pub mod config;
pub mod error;
pub mod eta;
pub mod logging;

pub use error::{EtaError, Result};
pub use eta::{
    compute_eta, format_minutes, CandidateRoute, CongestionLevel, EtaBreakdown, EtaConfig,
    EtaEngine, EtaWarning, RouteEstimate, SeverityTier, TrafficSnapshot, TripCategory,
    TripContext, TripRequest, Weather,
};

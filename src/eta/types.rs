use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{EtaError, Result};

/// Declares a closed categorical condition domain.
///
/// Every variant gets a stable snake_case name used by serde, `as_str`,
/// `Display` and `FromStr`. Parsing never falls back to a default variant.
macro_rules! condition_enum {
    (
        $(#[$meta:meta])*
        $name:ident, $field:literal {
            $($variant:ident => $label:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(rename_all = "snake_case")]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub const FIELD: &'static str = $field;
            pub const ALL: &'static [$name] = &[$(Self::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $label),+
                }
            }
        }

        impl FromStr for $name {
            type Err = EtaError;

            fn from_str(s: &str) -> Result<Self> {
                let normalized = normalize_label(s);
                match normalized.as_str() {
                    $($label => Ok(Self::$variant),)+
                    _ => Err(EtaError::unknown($field, s)),
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

fn normalize_label(s: &str) -> String {
    s.trim()
        .to_lowercase()
        .chars()
        .map(|c| if c == '-' || c == ' ' { '_' } else { c })
        .collect()
}

condition_enum! {
    Weather, "weather" {
        Clear => "clear",
        Cloudy => "cloudy",
        Rain => "rain",
        Storm => "storm",
        Snow => "snow",
    }
}

impl Weather {
    /// Maps a WMO present-weather code (as reported by Open-Meteo style
    /// providers) onto a weather category.
    pub fn from_wmo_code(code: u16) -> Result<Self> {
        match code {
            0 => Ok(Self::Clear),
            1..=3 | 45 | 48 => Ok(Self::Cloudy),
            51 | 53 | 55 | 56 | 57 | 61 | 63 | 65 | 66 | 67 | 80..=82 => Ok(Self::Rain),
            71 | 73 | 75 | 77 | 85 | 86 => Ok(Self::Snow),
            95 | 96 | 99 => Ok(Self::Storm),
            _ => Err(EtaError::unknown("weather_code", code.to_string())),
        }
    }
}

condition_enum! {
    TimeOfDay, "time_of_day" {
        Night => "night",
        MorningPeak => "morning_peak",
        Midday => "midday",
        EveningPeak => "evening_peak",
    }
}

impl TimeOfDay {
    pub fn is_peak(&self) -> bool {
        matches!(self, Self::MorningPeak | Self::EveningPeak)
    }
}

condition_enum! {
    DayType, "day_type" {
        Weekday => "weekday",
        Weekend => "weekend",
        Holiday => "holiday",
    }
}

condition_enum! {
    RoadProblem, "road_problem" {
        None => "none",
        Accident => "accident",
        Construction => "construction",
        Closure => "closure",
    }
}

condition_enum! {
    PoliceActivity, "police_activity" {
        Low => "low",
        Medium => "medium",
        High => "high",
    }
}

condition_enum! {
    DrivingHistory, "driving_history" {
        Calm => "calm",
        Normal => "normal",
        Aggressive => "aggressive",
    }
}

/// Everything the caller knows about one trip, validated at construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TripContext {
    pub base_minutes: f64,
    pub weather: Weather,
    pub time_of_day: TimeOfDay,
    pub day_type: DayType,
    pub road_problem: RoadProblem,
    pub police_activity: PoliceActivity,
    pub driving_history: DrivingHistory,
}

impl TripContext {
    /// A trip under neutral conditions: clear midday weekday, no road problem,
    /// low police activity, normal driving.
    pub fn new(base_minutes: f64) -> Result<Self> {
        let ctx = Self {
            base_minutes,
            weather: Weather::Clear,
            time_of_day: TimeOfDay::Midday,
            day_type: DayType::Weekday,
            road_problem: RoadProblem::None,
            police_activity: PoliceActivity::Low,
            driving_history: DrivingHistory::Normal,
        };
        ctx.validate()?;
        Ok(ctx)
    }

    pub fn with_weather(mut self, weather: Weather) -> Self {
        self.weather = weather;
        self
    }

    pub fn with_time_of_day(mut self, time_of_day: TimeOfDay) -> Self {
        self.time_of_day = time_of_day;
        self
    }

    pub fn with_day_type(mut self, day_type: DayType) -> Self {
        self.day_type = day_type;
        self
    }

    pub fn with_road_problem(mut self, road_problem: RoadProblem) -> Self {
        self.road_problem = road_problem;
        self
    }

    pub fn with_police_activity(mut self, police_activity: PoliceActivity) -> Self {
        self.police_activity = police_activity;
        self
    }

    pub fn with_driving_history(mut self, driving_history: DrivingHistory) -> Self {
        self.driving_history = driving_history;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if !self.base_minutes.is_finite() {
            return Err(EtaError::InvalidTripContext(format!(
                "base_minutes must be finite, got {}",
                self.base_minutes
            )));
        }
        if self.base_minutes <= 0.0 {
            return Err(EtaError::InvalidTripContext(format!(
                "base_minutes must be positive, got {}",
                self.base_minutes
            )));
        }
        Ok(())
    }

    pub fn hours(&self) -> f64 {
        self.base_minutes / 60.0
    }
}

/// Live traffic telemetry for one route, as handed over by the traffic provider.
///
/// Out-of-range readings are tolerated here and clamped during fusion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrafficSnapshot {
    pub jam_factor: f64,
    pub incident_count: u32,
    pub average_speed_kmh: f64,
    pub free_flow_speed_kmh: f64,
    pub confidence: f64,
}

impl Default for TrafficSnapshot {
    fn default() -> Self {
        Self {
            jam_factor: 0.0,
            incident_count: 0,
            average_speed_kmh: 60.0,
            free_flow_speed_kmh: 60.0,
            confidence: 1.0,
        }
    }
}

/// Flow reading for a single road segment along a route.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentFlow {
    pub speed_kmh: f64,
    pub free_flow_speed_kmh: f64,
    pub jam_factor: f64,
    pub confidence: f64,
}

impl TrafficSnapshot {
    /// Collapses per-segment flows into one route-level snapshot.
    ///
    /// Jam factor and speeds are averaged; confidence is the weakest
    /// segment's confidence, with a non-finite reading counting as 0.
    /// Returns `None` for an empty route.
    pub fn from_segments(segments: &[SegmentFlow], incident_count: u32) -> Option<Self> {
        if segments.is_empty() {
            return None;
        }

        let n = segments.len() as f64;
        let mean = |f: fn(&SegmentFlow) -> f64| segments.iter().map(f).sum::<f64>() / n;
        let confidence = segments
            .iter()
            .map(|s| if s.confidence.is_finite() { s.confidence } else { 0.0 })
            .fold(f64::INFINITY, f64::min);

        Some(Self {
            jam_factor: mean(|s| s.jam_factor),
            incident_count,
            average_speed_kmh: mean(|s| s.speed_kmh),
            free_flow_speed_kmh: mean(|s| s.free_flow_speed_kmh),
            confidence,
        })
    }
}

/// String-typed trip request as it arrives from outside the process.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TripRequest {
    pub base_minutes: f64,
    pub weather: String,
    pub time_of_day: String,
    pub day_type: String,
    pub road_problem: String,
    pub police_activity: String,
    pub driving_history: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub traffic: Option<TrafficSnapshot>,
}

impl TryFrom<TripRequest> for TripContext {
    type Error = EtaError;

    fn try_from(req: TripRequest) -> Result<Self> {
        let ctx = Self {
            base_minutes: req.base_minutes,
            weather: req.weather.parse()?,
            time_of_day: req.time_of_day.parse()?,
            day_type: req.day_type.parse()?,
            road_problem: req.road_problem.parse()?,
            police_activity: req.police_activity.parse()?,
            driving_history: req.driving_history.parse()?,
        };
        ctx.validate()?;
        Ok(ctx)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FactorKind {
    Weather,
    TimeOfDay,
    DayType,
    RoadProblem,
    PoliceActivity,
    DrivingHistory,
    LiveTraffic,
}

impl FactorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Weather => "weather",
            Self::TimeOfDay => "time_of_day",
            Self::DayType => "day_type",
            Self::RoadProblem => "road_problem",
            Self::PoliceActivity => "police_activity",
            Self::DrivingHistory => "driving_history",
            Self::LiveTraffic => "live_traffic",
        }
    }

    pub fn is_manual(&self) -> bool {
        !matches!(self, Self::LiveTraffic)
    }
}

/// One factor's trip through the pipeline.
///
/// `raw_impact` comes from the catalog (or traffic fusion), `context_coefficient`
/// from interaction rules, `dampening` from trip length and `weight` from
/// traffic suppression.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImpactEntry {
    pub factor: FactorKind,
    pub value: String,
    pub raw_impact: f64,
    pub context_coefficient: f64,
    pub dampening: f64,
    pub weight: f64,
    pub additive_minutes_per_hour: f64,
}

impl ImpactEntry {
    pub fn new(factor: FactorKind, value: impl Into<String>, raw_impact: f64) -> Self {
        Self {
            factor,
            value: value.into(),
            raw_impact,
            context_coefficient: 1.0,
            dampening: 1.0,
            weight: 1.0,
            additive_minutes_per_hour: 0.0,
        }
    }

    /// Impact after interaction rules and suppression, before trip-length dampening.
    pub fn weighted_impact(&self) -> f64 {
        self.raw_impact * self.context_coefficient * self.weight
    }

    pub fn contribution(&self) -> f64 {
        self.weighted_impact() * self.dampening
    }
}

/// Renders minutes as `"1h 05m"` or `"42m"`.
pub fn format_minutes(minutes: f64) -> String {
    if !minutes.is_finite() || minutes < 0.0 {
        return "-".to_string();
    }
    let total = minutes.round() as u64;
    let (h, m) = (total / 60, total % 60);
    if h > 0 {
        format!("{h}h {m:02}m")
    } else {
        format!("{m}m")
    }
}

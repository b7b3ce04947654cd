use serde::{Deserialize, Serialize};

use crate::error::{EtaError, Result};
use crate::eta::config::AdditiveRates;
use crate::eta::types::{
    DayType, DrivingHistory, FactorKind, ImpactEntry, PoliceActivity, RoadProblem, TimeOfDay,
    TripContext, Weather,
};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WeatherImpacts {
    pub clear: f64,
    pub cloudy: f64,
    pub rain: f64,
    pub storm: f64,
    pub snow: f64,
}

impl Default for WeatherImpacts {
    fn default() -> Self {
        Self {
            clear: 0.0,
            cloudy: 0.05,
            rain: 0.15,
            storm: 0.30,
            snow: 0.40,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeOfDayImpacts {
    pub night: f64,
    pub morning_peak: f64,
    pub midday: f64,
    pub evening_peak: f64,
}

impl Default for TimeOfDayImpacts {
    fn default() -> Self {
        Self {
            night: -0.10,
            morning_peak: 0.25,
            midday: 0.0,
            evening_peak: 0.30,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DayTypeImpacts {
    pub weekday: f64,
    pub weekend: f64,
    pub holiday: f64,
}

impl Default for DayTypeImpacts {
    fn default() -> Self {
        Self {
            weekday: 0.0,
            weekend: -0.03,
            holiday: 0.12,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RoadProblemImpacts {
    pub none: f64,
    pub accident: f64,
    pub construction: f64,
    pub closure: f64,
}

impl Default for RoadProblemImpacts {
    fn default() -> Self {
        Self {
            none: 0.0,
            accident: 0.35,
            construction: 0.20,
            closure: 0.50,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PoliceActivityImpacts {
    pub low: f64,
    pub medium: f64,
    pub high: f64,
}

impl Default for PoliceActivityImpacts {
    fn default() -> Self {
        Self {
            low: 0.0,
            medium: 0.05,
            high: 0.10,
        }
    }
}

/// Aggressive driving shortens the prediction; that is intended.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DrivingHistoryImpacts {
    pub calm: f64,
    pub normal: f64,
    pub aggressive: f64,
}

impl Default for DrivingHistoryImpacts {
    fn default() -> Self {
        Self {
            calm: -0.05,
            normal: 0.0,
            aggressive: -0.08,
        }
    }
}

/// Signed base impact per condition value: 0 is neutral, positive slows
/// the trip down, negative speeds it up.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ConditionCatalog {
    pub version: String,
    pub weather: WeatherImpacts,
    pub time_of_day: TimeOfDayImpacts,
    pub day_type: DayTypeImpacts,
    pub road_problem: RoadProblemImpacts,
    pub police_activity: PoliceActivityImpacts,
    pub driving_history: DrivingHistoryImpacts,
}

impl Default for ConditionCatalog {
    fn default() -> Self {
        Self {
            version: "1.0.0".to_string(),
            weather: WeatherImpacts::default(),
            time_of_day: TimeOfDayImpacts::default(),
            day_type: DayTypeImpacts::default(),
            road_problem: RoadProblemImpacts::default(),
            police_activity: PoliceActivityImpacts::default(),
            driving_history: DrivingHistoryImpacts::default(),
        }
    }
}

impl ConditionCatalog {
    pub fn weather(&self, value: Weather) -> f64 {
        let t = &self.weather;
        match value {
            Weather::Clear => t.clear,
            Weather::Cloudy => t.cloudy,
            Weather::Rain => t.rain,
            Weather::Storm => t.storm,
            Weather::Snow => t.snow,
        }
    }

    pub fn time_of_day(&self, value: TimeOfDay) -> f64 {
        let t = &self.time_of_day;
        match value {
            TimeOfDay::Night => t.night,
            TimeOfDay::MorningPeak => t.morning_peak,
            TimeOfDay::Midday => t.midday,
            TimeOfDay::EveningPeak => t.evening_peak,
        }
    }

    pub fn day_type(&self, value: DayType) -> f64 {
        let t = &self.day_type;
        match value {
            DayType::Weekday => t.weekday,
            DayType::Weekend => t.weekend,
            DayType::Holiday => t.holiday,
        }
    }

    pub fn road_problem(&self, value: RoadProblem) -> f64 {
        let t = &self.road_problem;
        match value {
            RoadProblem::None => t.none,
            RoadProblem::Accident => t.accident,
            RoadProblem::Construction => t.construction,
            RoadProblem::Closure => t.closure,
        }
    }

    pub fn police_activity(&self, value: PoliceActivity) -> f64 {
        let t = &self.police_activity;
        match value {
            PoliceActivity::Low => t.low,
            PoliceActivity::Medium => t.medium,
            PoliceActivity::High => t.high,
        }
    }

    pub fn driving_history(&self, value: DrivingHistory) -> f64 {
        let t = &self.driving_history;
        match value {
            DrivingHistory::Calm => t.calm,
            DrivingHistory::Normal => t.normal,
            DrivingHistory::Aggressive => t.aggressive,
        }
    }

    /// Looks a condition up by its external field and value names.
    pub fn lookup(&self, field: &str, value: &str) -> Result<f64> {
        match field {
            "weather" => Ok(self.weather(value.parse()?)),
            "time_of_day" => Ok(self.time_of_day(value.parse()?)),
            "day_type" => Ok(self.day_type(value.parse()?)),
            "road_problem" => Ok(self.road_problem(value.parse()?)),
            "police_activity" => Ok(self.police_activity(value.parse()?)),
            "driving_history" => Ok(self.driving_history(value.parse()?)),
            _ => Err(EtaError::unknown("field", field)),
        }
    }

    /// Resolves every condition of the trip into an impact entry, in fixed
    /// evaluation order, tagging each with its per-hour additive rate.
    pub fn resolve(&self, ctx: &TripContext, rates: &AdditiveRates) -> Vec<ImpactEntry> {
        let mut weather = ImpactEntry::new(
            FactorKind::Weather,
            ctx.weather.as_str(),
            self.weather(ctx.weather),
        );
        if ctx.weather != Weather::Clear {
            weather.additive_minutes_per_hour = rates.weather_per_hour;
        }

        let mut time_of_day = ImpactEntry::new(
            FactorKind::TimeOfDay,
            ctx.time_of_day.as_str(),
            self.time_of_day(ctx.time_of_day),
        );
        if ctx.time_of_day.is_peak() {
            time_of_day.additive_minutes_per_hour = rates.traffic_per_hour;
        }

        let day_type = ImpactEntry::new(
            FactorKind::DayType,
            ctx.day_type.as_str(),
            self.day_type(ctx.day_type),
        );

        let mut road_problem = ImpactEntry::new(
            FactorKind::RoadProblem,
            ctx.road_problem.as_str(),
            self.road_problem(ctx.road_problem),
        );
        if ctx.road_problem != RoadProblem::None {
            road_problem.additive_minutes_per_hour = rates.road_per_hour;
        }

        let police_activity = ImpactEntry::new(
            FactorKind::PoliceActivity,
            ctx.police_activity.as_str(),
            self.police_activity(ctx.police_activity),
        );

        let driving_history = ImpactEntry::new(
            FactorKind::DrivingHistory,
            ctx.driving_history.as_str(),
            self.driving_history(ctx.driving_history),
        );

        vec![
            weather,
            time_of_day,
            day_type,
            road_problem,
            police_activity,
            driving_history,
        ]
    }

    pub fn validate(&self) -> Result<()> {
        let values = [
            self.weather.clear,
            self.weather.cloudy,
            self.weather.rain,
            self.weather.storm,
            self.weather.snow,
            self.time_of_day.night,
            self.time_of_day.morning_peak,
            self.time_of_day.midday,
            self.time_of_day.evening_peak,
            self.day_type.weekday,
            self.day_type.weekend,
            self.day_type.holiday,
            self.road_problem.none,
            self.road_problem.accident,
            self.road_problem.construction,
            self.road_problem.closure,
            self.police_activity.low,
            self.police_activity.medium,
            self.police_activity.high,
            self.driving_history.calm,
            self.driving_history.normal,
            self.driving_history.aggressive,
        ];
        if values.iter().all(|v| v.is_finite()) {
            Ok(())
        } else {
            Err(EtaError::InvalidConfig(
                "catalog impacts must be finite".to_string(),
            ))
        }
    }
}

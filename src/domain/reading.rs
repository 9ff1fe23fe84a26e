// Reading domain model - one telemetry sample as persisted and served
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

pub const OBSTACLE_ERROR_CODE: &str = "E01: Obstacle Detected";

/// Opaque identity of a persisted reading
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReadingId(String);

impl ReadingId {
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }
}

impl From<String> for ReadingId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for ReadingId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl fmt::Display for ReadingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reading {
    #[serde(rename = "_id")]
    pub id: ReadingId,
    #[serde(rename = "Timestamp")]
    pub timestamp: DateTime<Utc>,
    #[serde(rename = "Metrics")]
    pub metrics: Metrics,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Metrics {
    pub battery_level: f64,
    pub current_power_usage: f64,
    #[serde(rename = "CuttingBladeRPM")]
    pub cutting_blade_rpm: u32,
    pub speed: f64,
    pub grass_height: f64,
    pub area_covered: f64,
    #[serde(rename = "ProximityFrontSensor")]
    pub proximity_front: f64,
    #[serde(rename = "ProximityRearSensor")]
    pub proximity_rear: f64,
    pub obstacle_detected: bool,
    pub error_state: Option<String>,
}

impl Reading {
    pub fn new(timestamp: DateTime<Utc>, metrics: Metrics) -> Self {
        Self {
            id: ReadingId::generate(),
            timestamp,
            metrics,
        }
    }
}

/// Round to a fixed number of decimal places, the precision readings are reported at
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

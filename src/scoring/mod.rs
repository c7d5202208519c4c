//! Risk scoring for near-Earth objects.
//!
//! # Responsibilities
//! - Map physical attributes (size, speed, proximity) to a bounded score
//! - Classify scores into display bands
//!
//! # Design Decisions
//! - Pure functions, no failure modes: missing data scores 0
//! - Each dimension normalized to [0,1] before weighting

use serde::{Deserialize, Serialize};

/// Weighting of the three dimensions. Must sum to 1.
const SIZE_WEIGHT: f64 = 0.40;
const SPEED_WEIGHT: f64 = 0.25;
const PROXIMITY_WEIGHT: f64 = 0.35;

/// Scale references: a 2000 ft object, 60,000 mph approach, and a pass
/// inside ~10M miles each saturate their dimension.
const SIZE_SCALE_FT: f64 = 2000.0;
const SPEED_SCALE_MPH: f64 = 60_000.0;
const PROXIMITY_SCALE_MILES: f64 = 10_000_000.0;

/// Compute a risk score in [0, 100] from an object's physical attributes.
///
/// Returns 0 when any input is missing or non-finite.
pub fn risk_score(
    diameter_ft: Option<f64>,
    speed_mph: Option<f64>,
    distance_miles: Option<f64>,
) -> u8 {
    let (diameter_ft, speed_mph, distance_miles) = match (diameter_ft, speed_mph, distance_miles) {
        (Some(d), Some(s), Some(m)) if d.is_finite() && s.is_finite() && m.is_finite() => (d, s, m),
        _ => return 0,
    };

    let size = (diameter_ft / SIZE_SCALE_FT).clamp(0.0, 1.0);
    let speed = (speed_mph / SPEED_SCALE_MPH).clamp(0.0, 1.0);
    let proximity = (PROXIMITY_SCALE_MILES / (distance_miles + 1.0)).clamp(0.0, 1.0);

    let weighted = size * SIZE_WEIGHT + speed * SPEED_WEIGHT + proximity * PROXIMITY_WEIGHT;
    (weighted * 100.0).round() as u8
}

/// Display band for a risk score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskBand {
    Low,
    Medium,
    High,
}

impl RiskBand {
    /// Band thresholds: >= 70 is high, >= 40 is medium.
    pub fn from_score(score: u8) -> Self {
        match score {
            70..=u8::MAX => RiskBand::High,
            40..=69 => RiskBand::Medium,
            _ => RiskBand::Low,
        }
    }
}

//! Normalization of raw upstream feed objects.
//!
//! The feed nests objects per date under `near_earth_objects`; numeric
//! values inside approach records arrive as strings. Anything missing or
//! non-finite normalizes to `None` rather than failing the fetch.

use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;

use super::types::NeoRecord;
use crate::scoring::risk_score;

/// Raw feed response body, keyed by date.
#[derive(Debug, Deserialize)]
pub struct FeedResponse {
    #[serde(default)]
    pub near_earth_objects: HashMap<String, Vec<RawNeo>>,
}

#[derive(Debug, Deserialize)]
pub struct RawNeo {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub estimated_diameter: Option<EstimatedDiameter>,
    #[serde(default)]
    pub close_approach_data: Vec<CloseApproach>,
    #[serde(default)]
    pub is_potentially_hazardous_asteroid: bool,
    #[serde(default)]
    pub nasa_jpl_url: Option<String>,
    #[serde(default)]
    pub links: Option<Links>,
}

#[derive(Debug, Deserialize)]
pub struct Links {
    #[serde(rename = "self", default)]
    pub self_url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct EstimatedDiameter {
    #[serde(default)]
    pub feet: Option<DiameterRange>,
}

#[derive(Debug, Deserialize)]
pub struct DiameterRange {
    #[serde(default)]
    pub estimated_diameter_min: Option<f64>,
    #[serde(default)]
    pub estimated_diameter_max: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub struct CloseApproach {
    #[serde(default)]
    pub close_approach_date: Option<String>,
    #[serde(default)]
    pub relative_velocity: Option<RelativeVelocity>,
    #[serde(default)]
    pub miss_distance: Option<MissDistance>,
}

#[derive(Debug, Deserialize)]
pub struct RelativeVelocity {
    // String in practice, but the feed has been inconsistent; accept both.
    #[serde(default)]
    pub miles_per_hour: Option<Value>,
}

#[derive(Debug, Deserialize)]
pub struct MissDistance {
    #[serde(default)]
    pub miles: Option<Value>,
}

/// Normalize the feed objects for `date` into scored records.
pub fn normalize(date: &str, feed: FeedResponse) -> Vec<NeoRecord> {
    let mut objects = feed.near_earth_objects;
    let items = objects.remove(date).unwrap_or_default();

    items
        .into_iter()
        .map(|object| {
            let approach = pick_approach(&object.close_approach_data, date);

            let diameter_ft = average_feet_diameter(object.estimated_diameter.as_ref());
            let speed_mph = approach
                .and_then(|a| a.relative_velocity.as_ref())
                .and_then(|v| finite_number(v.miles_per_hour.as_ref()));
            let distance_miles = approach
                .and_then(|a| a.miss_distance.as_ref())
                .and_then(|m| finite_number(m.miles.as_ref()));

            NeoRecord {
                risk_score: risk_score(diameter_ft, speed_mph, distance_miles),
                id: object.id,
                name: object.name,
                diameter_ft,
                speed_mph,
                distance_miles,
                hazardous: object.is_potentially_hazardous_asteroid,
                nasa_jpl_url: object
                    .nasa_jpl_url
                    .or(object.links.and_then(|l| l.self_url)),
            }
        })
        .collect()
}

/// The approach record matching `date`, falling back to the first one.
fn pick_approach<'a>(approaches: &'a [CloseApproach], date: &str) -> Option<&'a CloseApproach> {
    approaches
        .iter()
        .find(|a| a.close_approach_date.as_deref() == Some(date))
        .or_else(|| approaches.first())
}

/// Mean of the min/max feet diameters; `None` unless both are finite.
fn average_feet_diameter(estimated: Option<&EstimatedDiameter>) -> Option<f64> {
    let feet = estimated?.feet.as_ref()?;
    let min = feet.estimated_diameter_min?;
    let max = feet.estimated_diameter_max?;
    (min.is_finite() && max.is_finite()).then(|| (min + max) / 2.0)
}

/// Parse a string-or-number JSON value into a finite f64.
fn finite_number(value: Option<&Value>) -> Option<f64> {
    let n = match value? {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    n.is_finite().then_some(n)
}

//! Normalized feed types shared by the server, the fetcher and the client.

use serde::{Deserialize, Serialize};

/// One near-Earth object, normalized from the upstream feed.
///
/// Derived once per fetch and immutable thereafter. Computed fields are
/// `None` when the source data is missing or non-finite.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NeoRecord {
    pub id: String,
    pub name: String,
    /// Mean of the min/max estimated diameters, in feet.
    pub diameter_ft: Option<f64>,
    /// Relative velocity at the closest approach, in miles per hour.
    pub speed_mph: Option<f64>,
    /// Miss distance at the closest approach, in miles.
    pub distance_miles: Option<f64>,
    pub hazardous: bool,
    pub nasa_jpl_url: Option<String>,
    /// Risk score in [0, 100]; 0 when any physical attribute is missing.
    pub risk_score: u8,
}

/// Result of one upstream fetch, before the serving envelope is added.
#[derive(Debug, Clone, PartialEq)]
pub struct FeedData {
    pub date: String,
    pub items: Vec<NeoRecord>,
}

/// Cache disposition of a served result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum CacheStatus {
    Hit,
    Miss,
    Stale,
}

/// The feed payload as served over the wire, one instance per queried date.
///
/// `cache`, `stale` and `error` are transient markers: the server tags
/// fresh responses `MISS`, the client tags cache reads `HIT` and degraded
/// reads `STALE` with the triggering error attached.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedResult {
    pub date: String,
    pub items: Vec<NeoRecord>,
    /// RFC 3339 timestamp of the fetch.
    pub fetched_at: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cache: Option<CacheStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stale: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

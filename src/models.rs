use chrono::{DateTime, Utc};
use serde::Serialize;

/// Normalized observation, one per upstream `results` entry.
///
/// Field order matches the table column order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SnowRecord {
    pub id: String,
    pub datetime_utc: DateTime<Utc>,
    pub latitude: f64,
    pub longitude: f64,
    pub author_name: Option<String>,
    pub obs_type: String,
    pub snow_depth: Option<f64>,
    pub description: String,
}

impl SnowRecord {
    /// True when the record carries a usable snow depth measurement.
    pub fn has_snow_depth(&self) -> bool {
        self.snow_depth.is_some()
    }
}

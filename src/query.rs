use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::utils;

/// Every publisher
pub const PUBLISHER_ALL: &str = "all";
/// Professional submitters only
pub const PUBLISHER_PRO: &str = "pro";

pub const DEFAULT_LIMIT: u32 = 1000;

const DEFAULT_OBS_TYPES: &[ObservationType] =
    &[ObservationType::SnowConditions, ObservationType::SnowpackTest];

#[derive(Error, Debug, Clone, PartialEq)]
pub enum BboxError {
    #[error("Bounding box is missing key: {0}")]
    MissingKey(&'static str),

    #[error("Bounding box value for {0} is not a number")]
    InvalidValue(&'static str),
}

/// Observation type tags accepted by the timeline `obs_type` filter.
///
/// Only snow depth values are extracted, but any of these can be requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObservationType {
    SnowpackTest,
    SnowConditions,
    Weather,
    Camera,
    DangerousWildlife,
    OtherHazard,
    PointOfInterest,
    WaterHazard,
    TrailConditions,
    TripReport,
    Incident,
    Avalanche,
}

impl ObservationType {
    pub const ALL: [ObservationType; 12] = [
        ObservationType::SnowpackTest,
        ObservationType::SnowConditions,
        ObservationType::Weather,
        ObservationType::Camera,
        ObservationType::DangerousWildlife,
        ObservationType::OtherHazard,
        ObservationType::PointOfInterest,
        ObservationType::WaterHazard,
        ObservationType::TrailConditions,
        ObservationType::TripReport,
        ObservationType::Incident,
        ObservationType::Avalanche,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ObservationType::SnowpackTest => "snowpack_test",
            ObservationType::SnowConditions => "snow_conditions",
            ObservationType::Weather => "weather",
            ObservationType::Camera => "camera",
            ObservationType::DangerousWildlife => "dangerous_wildlife",
            ObservationType::OtherHazard => "other_hazard",
            ObservationType::PointOfInterest => "point_of_interest",
            ObservationType::WaterHazard => "water_hazard",
            ObservationType::TrailConditions => "trail_conditions",
            ObservationType::TripReport => "trip_report",
            ObservationType::Incident => "incident",
            ObservationType::Avalanche => "avalanche",
        }
    }

    /// Join several types into the comma-separated form the API expects.
    pub fn join(types: &[ObservationType]) -> String {
        types
            .iter()
            .map(ObservationType::as_str)
            .collect::<Vec<_>>()
            .join(",")
    }
}

impl fmt::Display for ObservationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ObservationType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ObservationType::ALL
            .into_iter()
            .find(|t| t.as_str() == s.trim())
            .ok_or_else(|| format!("Unknown observation type: {s}"))
    }
}

/// Geographic rectangle used to restrict results, in degrees.
///
/// No check is made that the minimums are below the maximums.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub latmin: f64,
    pub latmax: f64,
    pub lonmin: f64,
    pub lonmax: f64,
}

impl BoundingBox {
    pub fn new(latmin: f64, latmax: f64, lonmin: f64, lonmax: f64) -> Self {
        Self {
            latmin,
            latmax,
            lonmin,
            lonmax,
        }
    }

    /// Build a box from a loosely-typed mapping with `latmin`, `latmax`,
    /// `lonmin` and `lonmax` entries. Numeric strings are accepted.
    pub fn from_json(value: &Value) -> Result<Self, BboxError> {
        let field = |key: &'static str| -> Result<f64, BboxError> {
            let raw = value.get(key).ok_or(BboxError::MissingKey(key))?;
            match raw {
                Value::Number(n) => n.as_f64(),
                Value::String(s) => s.trim().parse::<f64>().ok(),
                _ => None,
            }
            .ok_or(BboxError::InvalidValue(key))
        };

        Ok(Self {
            latmin: field("latmin")?,
            latmax: field("latmax")?,
            lonmin: field("lonmin")?,
            lonmax: field("lonmax")?,
        })
    }
}

/// Translate a bounding box into the API's corner-naming convention.
///
/// An absent box yields an empty mapping.
pub fn make_bbox(bbox: Option<&BoundingBox>) -> BTreeMap<&'static str, f64> {
    let mut params = BTreeMap::new();
    if let Some(bbox) = bbox {
        params.insert("north_east_lat", bbox.latmax);
        params.insert("north_east_lng", bbox.lonmax);
        params.insert("south_west_lat", bbox.latmin);
        params.insert("south_west_lng", bbox.lonmin);
    }
    params
}

/// What to do with a `results` entry that cannot be normalized
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RecordPolicy {
    /// Fail the whole request on the first bad record
    #[default]
    Strict,
    /// Log and skip bad records
    SkipInvalid,
}

/// Inputs for a single snow data request.
#[derive(Debug, Clone, PartialEq)]
pub struct SnowQuery {
    pub publisher: String,
    pub obs_type: String,
    pub limit: u32,
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
    pub bbox: Option<BoundingBox>,
    /// Drop rows with no snow depth
    pub filter: bool,
    pub record_policy: RecordPolicy,
}

impl Default for SnowQuery {
    fn default() -> Self {
        Self {
            publisher: PUBLISHER_ALL.to_string(),
            obs_type: ObservationType::join(DEFAULT_OBS_TYPES),
            limit: DEFAULT_LIMIT,
            start: None,
            end: None,
            bbox: None,
            filter: true,
            record_policy: RecordPolicy::Strict,
        }
    }
}

impl SnowQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn publisher(mut self, publisher: impl Into<String>) -> Self {
        self.publisher = publisher.into();
        self
    }

    /// Raw `obs_type` filter, a single tag or a comma-separated list.
    pub fn obs_type(mut self, obs_type: impl Into<String>) -> Self {
        self.obs_type = obs_type.into();
        self
    }

    pub fn obs_types(mut self, types: &[ObservationType]) -> Self {
        self.obs_type = ObservationType::join(types);
        self
    }

    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = limit;
        self
    }

    pub fn start(mut self, start: DateTime<Utc>) -> Self {
        self.start = Some(start);
        self
    }

    pub fn end(mut self, end: DateTime<Utc>) -> Self {
        self.end = Some(end);
        self
    }

    pub fn bbox(mut self, bbox: BoundingBox) -> Self {
        self.bbox = Some(bbox);
        self
    }

    pub fn filter(mut self, filter: bool) -> Self {
        self.filter = filter;
        self
    }

    pub fn record_policy(mut self, policy: RecordPolicy) -> Self {
        self.record_policy = policy;
        self
    }

    /// Query string parameters sent to the timeline endpoint.
    ///
    /// The time window goes out as `since`/`before` epoch milliseconds. Absent
    /// and empty values are left out entirely.
    pub fn to_params(&self) -> BTreeMap<String, String> {
        let limit = (self.limit > 0).then_some(self.limit);

        let mut params = utils::remove_empty_params([
            ("publisher", Some(self.publisher.clone())),
            ("obs_type", Some(self.obs_type.clone())),
            ("limit", limit.map(|l| l.to_string())),
            (
                "since",
                utils::datetime_to_timestamp_ms(self.start).map(|ms| ms.to_string()),
            ),
            (
                "before",
                utils::datetime_to_timestamp_ms(self.end).map(|ms| ms.to_string()),
            ),
        ]);

        params.extend(
            make_bbox(self.bbox.as_ref())
                .into_iter()
                .map(|(key, value)| (key.to_string(), value.to_string())),
        );

        params
    }
}

use serde_json::Value;
use thiserror::Error;
use tracing::{debug, instrument};

use crate::models::SnowRecord;
use crate::utils;

/// Actor keys holding the submitter's name, in lookup order.
/// Older records use `full_name`, newer ones `fullName`.
pub const AUTHOR_NAME_KEYS: &[&str] = &["full_name", "fullName"];

/// Placeholder the upstream form sends when no depth was entered
const UNDEFINED_DEPTH: &str = "undefined";

#[derive(Error, Debug, Clone, PartialEq)]
pub enum NormalizeError {
    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    #[error("Invalid reported_at timestamp: {0}")]
    InvalidTimestamp(String),

    #[error("reported_at timestamp out of range: {0}")]
    TimestampOutOfRange(i64),

    #[error("Location has {0} element(s), expected [longitude, latitude]")]
    LocationTooShort(usize),

    #[error("Invalid coordinate: {0}")]
    InvalidCoordinate(String),

    #[error("Invalid snowpack_depth: {0}")]
    InvalidSnowDepth(String),
}

/// Parse one `results` entry returned by the timeline endpoint into a [`SnowRecord`].
///
/// Required fields (`_id`, `reported_at`, `location`, `type`) produce an error when
/// missing or malformed. Optional fields (`details`, `description`, actor name)
/// never do.
#[instrument(skip(record), level = "trace")]
pub fn parse_snow(record: &Value) -> Result<SnowRecord, NormalizeError> {
    let obs = record
        .get("observation")
        .filter(|obs| obs.is_object())
        .ok_or(NormalizeError::MissingField("observation"))?;

    let id = required(obs, "_id", "observation._id").map(value_to_string)?;
    let snow_depth = parse_snow_depth(obs)?;

    let description = match obs.get("description") {
        None | Some(Value::Null) => String::new(),
        Some(value) => value_to_string(value),
    };

    let reported_at = required(obs, "reported_at", "observation.reported_at")?;
    let reported_ms = coerce_timestamp_ms(reported_at)?;
    let datetime_utc = utils::timestamp_ms_to_datetime(Some(reported_ms))
        .ok_or(NormalizeError::TimestampOutOfRange(reported_ms))?;

    let (longitude, latitude) = parse_location(obs)?;

    let author_name = record.get("actor").and_then(resolve_author_name);

    let obs_type = required(obs, "type", "observation.type").map(value_to_string)?;

    debug!("Parsed observation {} ({}), snow_depth={:?}", id, obs_type, snow_depth);

    Ok(SnowRecord {
        id,
        datetime_utc,
        latitude,
        longitude,
        author_name,
        obs_type,
        snow_depth,
        description,
    })
}

/// Coerce an epoch-millisecond value to an integer.
///
/// Accepts JSON integers, floats (truncated toward zero) and integer strings.
pub fn coerce_timestamp_ms(value: &Value) -> Result<i64, NormalizeError> {
    match value {
        Value::Number(n) => {
            if let Some(ms) = n.as_i64() {
                return Ok(ms);
            }
            match n.as_f64() {
                Some(f) if f.is_finite() && f.abs() < i64::MAX as f64 => Ok(f.trunc() as i64),
                _ => Err(NormalizeError::InvalidTimestamp(n.to_string())),
            }
        }
        Value::String(s) => s
            .trim()
            .parse::<i64>()
            .map_err(|_| NormalizeError::InvalidTimestamp(s.clone())),
        other => Err(NormalizeError::InvalidTimestamp(other.to_string())),
    }
}

/// First present, non-falsy value among [`AUTHOR_NAME_KEYS`].
pub fn resolve_author_name(actor: &Value) -> Option<String> {
    AUTHOR_NAME_KEYS
        .iter()
        .filter_map(|key| actor.get(key))
        .find(|value| is_truthy(value))
        .map(value_to_string)
}

fn parse_snow_depth(obs: &Value) -> Result<Option<f64>, NormalizeError> {
    let depth = obs
        .get("details")
        .and_then(Value::as_array)
        .and_then(|details| details.first())
        .and_then(|first| first.get("snowpack_depth"));

    let depth = match depth {
        None | Some(Value::Null) => return Ok(None),
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => {
            let trimmed = s.trim();
            // Blank depth is read as "not entered"; a bare float parse would reject it
            if trimmed.is_empty() || trimmed == UNDEFINED_DEPTH {
                return Ok(None);
            }
            Some(
                trimmed
                    .parse::<f64>()
                    .map_err(|_| NormalizeError::InvalidSnowDepth(s.clone()))?,
            )
        }
        Some(other) => return Err(NormalizeError::InvalidSnowDepth(other.to_string())),
    };

    // NaN is treated as a missing measurement
    Ok(depth.filter(|d| !d.is_nan()))
}

// Upstream stores coordinates as [longitude, latitude]
fn parse_location(obs: &Value) -> Result<(f64, f64), NormalizeError> {
    let location = obs
        .get("location")
        .ok_or(NormalizeError::MissingField("observation.location"))?;

    let points = location
        .as_array()
        .ok_or_else(|| NormalizeError::InvalidCoordinate(location.to_string()))?;

    if points.len() < 2 {
        return Err(NormalizeError::LocationTooShort(points.len()));
    }

    Ok((coordinate(&points[0])?, coordinate(&points[1])?))
}

fn coordinate(value: &Value) -> Result<f64, NormalizeError> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
    .ok_or_else(|| NormalizeError::InvalidCoordinate(value.to_string()))
}

fn required<'a>(
    obj: &'a Value,
    key: &str,
    name: &'static str,
) -> Result<&'a Value, NormalizeError> {
    obj.get(key)
        .filter(|value| !value.is_null())
        .ok_or(NormalizeError::MissingField(name))
}

fn value_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map_or(true, |f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

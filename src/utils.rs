//! Shared utility functions for building MountainHub requests

use chrono::{DateTime, Utc};
use std::collections::BTreeMap;

/// Return a copy of a parameter list with absent values removed
///
/// A value is absent when it is `None` or renders to an empty string. The
/// remaining entries are carried through unchanged, keyed by name.
///
/// # Examples
///
/// ```
/// use mtnhub_snow::utils::remove_empty_params;
///
/// let params = remove_empty_params([
///     ("publisher", Some("all".to_string())),
///     ("since", None),
///     ("obs_type", Some(String::new())),
/// ]);
/// assert_eq!(params.len(), 1);
/// assert_eq!(params["publisher"], "all");
/// ```
pub fn remove_empty_params<I, K, V>(params: I) -> BTreeMap<String, String>
where
    I: IntoIterator<Item = (K, Option<V>)>,
    K: Into<String>,
    V: ToString,
{
    params
        .into_iter()
        .filter_map(|(key, value)| {
            let value = value?.to_string();
            if value.is_empty() {
                None
            } else {
                Some((key.into(), value))
            }
        })
        .collect()
}

/// Convert a UTC instant to milliseconds since the Unix epoch.
///
/// ```
/// use chrono::{TimeZone, Utc};
/// use mtnhub_snow::utils::datetime_to_timestamp_ms;
///
/// let dt = Utc.with_ymd_and_hms(2018, 1, 1, 0, 0, 0).unwrap();
/// assert_eq!(datetime_to_timestamp_ms(Some(dt)), Some(1_514_764_800_000));
/// assert_eq!(datetime_to_timestamp_ms(None), None);
/// ```
pub fn datetime_to_timestamp_ms(dt: Option<DateTime<Utc>>) -> Option<i64> {
    dt.map(|dt| dt.timestamp_millis())
}

/// Convert milliseconds since the Unix epoch to a UTC instant.
///
/// The sub-second remainder is kept. Returns `None` for an absent timestamp
/// or one outside the representable range.
pub fn timestamp_ms_to_datetime(timestamp: Option<i64>) -> Option<DateTime<Utc>> {
    timestamp.and_then(DateTime::<Utc>::from_timestamp_millis)
}

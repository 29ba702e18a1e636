use serde_json::Value;
use std::collections::BTreeMap;
use std::time::Duration;
use tracing::{debug, error, info, instrument, warn};

use crate::config::Config;
use crate::fetch_error::FetchError;
use crate::models::SnowRecord;
use crate::normalizer;
use crate::query::{RecordPolicy, SnowQuery};
use crate::table::{Column, SnowTable};

pub const ACCEPT_VERSION_HEADER: &str = "Accept-version";
/// Timeline API version this crate parses
pub const API_VERSION: &str = "1";

/// Longest error body kept in `FetchError::Status`
const MAX_ERROR_BODY_CHARS: usize = 200;

/// Client for the MountainHub timeline endpoint
#[derive(Clone)]
pub struct MountainHubClient {
    client: reqwest::Client,
    url: String,
}

impl MountainHubClient {
    /// Client for the public endpoint with default settings
    pub fn new() -> Result<Self, FetchError> {
        Self::from_config(&Config::default())
    }

    /// Client for a different timeline URL (mirrors, test servers)
    pub fn with_base_url(url: impl Into<String>) -> Result<Self, FetchError> {
        Self::from_config(&Config {
            api_url: url.into(),
            ..Config::default()
        })
    }

    pub fn from_config(config: &Config) -> Result<Self, FetchError> {
        reqwest::Url::parse(&config.api_url)
            .map_err(|e| FetchError::InvalidUrl(format!("{}: {}", config.api_url, e)))?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs()))
            .build()?;

        Ok(Self {
            client,
            url: config.api_url.clone(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// GET the timeline with the given query parameters and return the parsed body.
    ///
    /// An empty body is returned as `Value::Null`.
    #[instrument(skip(self, params), fields(url = %self.url, param_count = params.len()))]
    pub async fn fetch_timeline(
        &self,
        params: &BTreeMap<String, String>,
    ) -> Result<Value, FetchError> {
        debug!("Sending HTTP request to timeline endpoint: {:?}", params);
        let response = self
            .client
            .get(&self.url)
            .header(ACCEPT_VERSION_HEADER, API_VERSION)
            .query(params)
            .send()
            .await?;

        let status = response.status();
        debug!("Received HTTP response with status: {}", status);

        let body = response.text().await?;
        debug!("Retrieved response body, size: {} bytes", body.len());

        if !status.is_success() {
            error!("Timeline request failed with status {}", status);
            return Err(FetchError::Status {
                status: status.as_u16(),
                body: body.chars().take(MAX_ERROR_BODY_CHARS).collect(),
            });
        }

        if body.trim().is_empty() {
            return Ok(Value::Null);
        }

        Ok(serde_json::from_str(&body)?)
    }

    /// Fetch snow observations matching `query` and normalize them into a table.
    ///
    /// Returns `Ok(None)` when the service has no results, or when no row
    /// survives the snow depth filter.
    #[instrument(skip(self, query), fields(publisher = %query.publisher, obs_type = %query.obs_type, limit = query.limit))]
    pub async fn snow_data(&self, query: &SnowQuery) -> Result<Option<SnowTable>, FetchError> {
        let data = self.fetch_timeline(&query.to_params()).await?;
        parse_timeline(&data, query)
    }
}

/// Fetch snow observations using a client configured from the environment
/// (see [`Config::from_env`]).
pub async fn snow_data(query: &SnowQuery) -> Result<Option<SnowTable>, FetchError> {
    let config = Config::from_env()?;
    MountainHubClient::from_config(&config)?
        .snow_data(query)
        .await
}

/// Turn a timeline response body into a table, applying the query's filter
/// and record policy.
pub fn parse_timeline(data: &Value, query: &SnowQuery) -> Result<Option<SnowTable>, FetchError> {
    let records = match data.get("results").and_then(Value::as_array) {
        Some(records) if !records.is_empty() => records,
        _ => {
            debug!("Response without results: {}", data);
            info!("No results");
            return Ok(None);
        }
    };

    let mut table = SnowTable::new(normalize_records(records, query.record_policy)?);

    if query.filter {
        table = table.drop_nulls(Column::SnowDepth);
    }

    if table.is_empty() {
        if query.filter {
            info!("No snow depth results");
        } else {
            info!("No results");
        }
        return Ok(None);
    }

    debug!("Returning {} of {} records", table.len(), records.len());
    Ok(Some(table))
}

fn normalize_records(
    records: &[Value],
    policy: RecordPolicy,
) -> Result<Vec<SnowRecord>, FetchError> {
    let mut parsed = Vec::with_capacity(records.len());
    let mut skipped = 0;

    for (index, record) in records.iter().enumerate() {
        match normalizer::parse_snow(record) {
            Ok(snow) => parsed.push(snow),
            Err(e) if policy == RecordPolicy::SkipInvalid => {
                warn!("Skipping result record {}: {}", index, e);
                skipped += 1;
            }
            Err(e) => {
                error!("Failed to parse result record {}: {}", index, e);
                return Err(FetchError::Record { index, source: e });
            }
        }
    }

    if skipped > 0 {
        warn!("Skipped {} unparseable records out of {}", skipped, records.len());
    }

    Ok(parsed)
}

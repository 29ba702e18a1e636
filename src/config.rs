use std::env;
use thiserror::Error;

pub const DEFAULT_API_URL: &str = "https://api.mountainhub.com/timeline";
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("MTNHUB_API_URL must not be empty")]
    EmptyApiUrl,
}

/// Connection settings for the MountainHub timeline endpoint
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub api_url: String,
    /// Request timeout; 0 means the default
    pub timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl Config {
    /// Read settings from the environment, falling back to defaults.
    ///
    /// Nothing is written to the environment. Applications that keep settings
    /// in a `.env` file should call `dotenvy::dotenv()` themselves at startup.
    pub fn from_env() -> Result<Self, ConfigError> {
        let api_url = env::var("MTNHUB_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string());
        if api_url.trim().is_empty() {
            return Err(ConfigError::EmptyApiUrl);
        }

        Ok(Config {
            api_url,
            timeout_secs: env::var("MTNHUB_TIMEOUT_SECS")
                .unwrap_or_else(|_| DEFAULT_TIMEOUT_SECS.to_string())
                .parse()
                .ok()
                .filter(|&secs| secs > 0)
                .unwrap_or(DEFAULT_TIMEOUT_SECS),
        })
    }

    /// Timeout to apply to requests, with 0 mapped to the default
    pub fn timeout_secs(&self) -> u64 {
        if self.timeout_secs == 0 {
            DEFAULT_TIMEOUT_SECS
        } else {
            self.timeout_secs
        }
    }
}

//! Simplified and standardized access to MountainHub snow depth observations.

pub mod config;
pub mod fetch_error;
pub mod fetcher;
pub mod models;
pub mod normalizer;
pub mod query;
pub mod table;
pub mod utils;

pub use config::Config;
pub use fetch_error::FetchError;
pub use fetcher::{snow_data, MountainHubClient};
pub use models::SnowRecord;
pub use query::{BoundingBox, ObservationType, RecordPolicy, SnowQuery};
pub use table::{Column, SnowTable};

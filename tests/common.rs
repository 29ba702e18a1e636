#![allow(dead_code)]

use mockito::Matcher;
use serde_json::{json, Value};

/// Install a test subscriber so `RUST_LOG=debug` shows library logs
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Path matcher for the timeline endpoint, with or without a query string
pub fn timeline_path() -> Matcher {
    Matcher::Regex(r"^/timeline".to_string())
}

pub fn timeline_url(server: &mockito::Server) -> String {
    format!("{}/timeline", server.url())
}

/// Minimal raw observation with the given snow depth value
pub fn raw_observation(id: &str, snow_depth: Value) -> Value {
    json!({
        "observation": {
            "_id": id,
            "reported_at": 1516125215000_i64,
            "location": [-121.7603, 46.8523],
            "type": "snow_conditions",
            "details": [{ "snowpack_depth": snow_depth }]
        },
        "actor": { "full_name": "Emma Snow" }
    })
}

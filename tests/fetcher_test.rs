// Tests for MountainHubClient against a mocked timeline endpoint
// Uses mockito for HTTP mocking

mod common;

use chrono::{TimeZone, Utc};
use mockito::{Matcher, Server};
use mtnhub_snow::normalizer::NormalizeError;
use mtnhub_snow::query::PUBLISHER_PRO;
use mtnhub_snow::{
    BoundingBox, Column, FetchError, MountainHubClient, ObservationType, RecordPolicy, SnowQuery,
};
use serde_json::{json, Value};

fn create_test_client(server: &Server) -> MountainHubClient {
    common::init_tracing();
    MountainHubClient::with_base_url(common::timeline_url(server))
        .expect("Failed to create test client")
}

#[tokio::test]
async fn test_snow_data_sends_default_params_and_version_header() {
    let mut server = Server::new_async().await;

    let mock = server
        .mock("GET", common::timeline_path())
        .match_header("accept-version", "1")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("publisher".into(), "all".into()),
            Matcher::UrlEncoded("obs_type".into(), "snow_conditions,snowpack_test".into()),
            Matcher::UrlEncoded("limit".into(), "1000".into()),
        ]))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(include_str!("fixtures/timeline_response.json"))
        .create_async()
        .await;

    let client = create_test_client(&server);
    let table = client
        .snow_data(&SnowQuery::default())
        .await
        .expect("request failed")
        .expect("expected a table");

    assert_eq!(table.len(), 2);

    let first = &table.records()[0];
    assert_eq!(first.id, "5a5e3c1f2e0b8a0014d3c6a1");
    assert_eq!(first.latitude, 46.8523);
    assert_eq!(first.longitude, -121.7603);
    assert_eq!(first.author_name.as_deref(), Some("Emma Snow"));
    assert_eq!(first.snow_depth, Some(120.0));
    assert_eq!(
        first.datetime_utc,
        Utc.with_ymd_and_hms(2018, 1, 16, 17, 53, 35).unwrap()
    );

    let second = &table.records()[1];
    assert_eq!(second.id, "5a61e7d02e0b8a0014d3cb11");
    assert_eq!(second.obs_type, "snowpack_test");
    assert_eq!(second.snow_depth, Some(35.5));
    assert_eq!(second.description, "");
    assert_eq!(second.author_name, None);
    assert_eq!(
        second.datetime_utc,
        Utc.with_ymd_and_hms(2018, 1, 19, 16, 40, 0).unwrap() + chrono::Duration::milliseconds(500)
    );

    mock.assert_async().await;
}

#[tokio::test]
async fn test_snow_data_without_filter_keeps_every_record() {
    let mut server = Server::new_async().await;

    let mock = server
        .mock("GET", common::timeline_path())
        .with_status(200)
        .with_body(include_str!("fixtures/timeline_response.json"))
        .create_async()
        .await;

    let client = create_test_client(&server);
    let table = client
        .snow_data(&SnowQuery::new().filter(false))
        .await
        .unwrap()
        .unwrap();

    assert_eq!(table.len(), 4);
    assert_eq!(
        table.column(Column::SnowDepth),
        vec![json!(120.0), Value::Null, Value::Null, json!(35.5)]
    );
    assert_eq!(
        table.column(Column::AuthorName),
        vec![
            json!("Emma Snow"),
            json!("Sam Powder"),
            json!("Lee Avalanche"),
            Value::Null
        ]
    );

    mock.assert_async().await;
}

#[tokio::test]
async fn test_snow_data_sends_time_window_and_bbox() {
    let mut server = Server::new_async().await;

    let mock = server
        .mock("GET", common::timeline_path())
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("publisher".into(), "pro".into()),
            Matcher::UrlEncoded("obs_type".into(), "snowpack_test".into()),
            Matcher::UrlEncoded("limit".into(), "50".into()),
            Matcher::UrlEncoded("since".into(), "1514764800000".into()),
            Matcher::UrlEncoded("before".into(), "1517443200000".into()),
            Matcher::UrlEncoded("north_east_lat".into(), "49".into()),
            Matcher::UrlEncoded("north_east_lng".into(), "-117".into()),
            Matcher::UrlEncoded("south_west_lat".into(), "45.5".into()),
            Matcher::UrlEncoded("south_west_lng".into(), "-124".into()),
        ]))
        .with_status(200)
        .with_body(json!({ "results": [] }).to_string())
        .create_async()
        .await;

    let query = SnowQuery::new()
        .publisher(PUBLISHER_PRO)
        .obs_types(&[ObservationType::SnowpackTest])
        .limit(50)
        .start(Utc.with_ymd_and_hms(2018, 1, 1, 0, 0, 0).unwrap())
        .end(Utc.with_ymd_and_hms(2018, 2, 1, 0, 0, 0).unwrap())
        .bbox(BoundingBox::new(45.5, 49.0, -124.0, -117.0));

    let client = create_test_client(&server);
    let result = client.snow_data(&query).await.unwrap();

    assert!(result.is_none());
    mock.assert_async().await;
}

#[tokio::test]
async fn test_snow_data_filters_null_depth() {
    let mut server = Server::new_async().await;

    let body = json!({
        "results": [
            common::raw_observation("a", json!("42.5")),
            common::raw_observation("b", Value::Null),
            common::raw_observation("c", json!("7")),
        ]
    });

    let mock = server
        .mock("GET", common::timeline_path())
        .with_status(200)
        .with_body(body.to_string())
        .create_async()
        .await;

    let client = create_test_client(&server);
    let table = client.snow_data(&SnowQuery::default()).await.unwrap().unwrap();

    assert_eq!(table.len(), 2);
    let ids: Vec<&str> = table.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, vec!["a", "c"]);

    mock.assert_async().await;
}

#[tokio::test]
async fn test_snow_data_empty_results_returns_none() {
    let mut server = Server::new_async().await;

    let mock = server
        .mock("GET", common::timeline_path())
        .with_status(200)
        .with_body(r#"{"results": []}"#)
        .create_async()
        .await;

    let client = create_test_client(&server);
    let result = client.snow_data(&SnowQuery::default()).await;

    assert!(matches!(result, Ok(None)));
    mock.assert_async().await;
}

#[tokio::test]
async fn test_snow_data_missing_results_returns_none() {
    let mut server = Server::new_async().await;

    let mock = server
        .mock("GET", common::timeline_path())
        .with_status(200)
        .with_body(r#"{"message": "limit must be positive"}"#)
        .create_async()
        .await;

    let client = create_test_client(&server);
    let result = client.snow_data(&SnowQuery::default()).await;

    assert!(matches!(result, Ok(None)));
    mock.assert_async().await;
}

#[tokio::test]
async fn test_snow_data_empty_body_returns_none() {
    let mut server = Server::new_async().await;

    let mock = server
        .mock("GET", common::timeline_path())
        .with_status(200)
        .with_body("")
        .create_async()
        .await;

    let client = create_test_client(&server);
    let result = client.snow_data(&SnowQuery::default()).await;

    assert!(matches!(result, Ok(None)));
    mock.assert_async().await;
}

#[tokio::test]
async fn test_snow_data_everything_filtered_returns_none() {
    let mut server = Server::new_async().await;

    let body = json!({
        "results": [
            common::raw_observation("a", json!("undefined")),
            common::raw_observation("b", Value::Null),
        ]
    });

    let mock = server
        .mock("GET", common::timeline_path())
        .with_status(200)
        .with_body(body.to_string())
        .create_async()
        .await;

    let client = create_test_client(&server);
    let result = client.snow_data(&SnowQuery::default()).await;

    assert!(matches!(result, Ok(None)));
    mock.assert_async().await;
}

#[tokio::test]
async fn test_snow_data_bad_record_fails_whole_batch() {
    let mut server = Server::new_async().await;

    let mut bad = common::raw_observation("b", json!("10"));
    bad["observation"].as_object_mut().unwrap().remove("type");
    let body = json!({ "results": [common::raw_observation("a", json!("1")), bad] });

    let mock = server
        .mock("GET", common::timeline_path())
        .with_status(200)
        .with_body(body.to_string())
        .create_async()
        .await;

    let client = create_test_client(&server);
    let result = client.snow_data(&SnowQuery::default()).await;

    match result {
        Err(FetchError::Record { index, source }) => {
            assert_eq!(index, 1);
            assert_eq!(source, NormalizeError::MissingField("observation.type"));
        }
        other => panic!("Expected Record error, got {:?}", other),
    }

    mock.assert_async().await;
}

#[tokio::test]
async fn test_snow_data_skip_invalid_isolates_bad_record() {
    let mut server = Server::new_async().await;

    let mut bad = common::raw_observation("b", json!("10"));
    bad["observation"]["reported_at"] = json!("not a timestamp");
    let body = json!({ "results": [common::raw_observation("a", json!("1")), bad] });

    let mock = server
        .mock("GET", common::timeline_path())
        .with_status(200)
        .with_body(body.to_string())
        .create_async()
        .await;

    let client = create_test_client(&server);
    let query = SnowQuery::new().record_policy(RecordPolicy::SkipInvalid);
    let table = client.snow_data(&query).await.unwrap().unwrap();

    assert_eq!(table.len(), 1);
    assert_eq!(table.records()[0].id, "a");

    mock.assert_async().await;
}

#[tokio::test]
async fn test_snow_data_server_error() {
    let mut server = Server::new_async().await;

    let mock = server
        .mock("GET", common::timeline_path())
        .with_status(500)
        .with_body("upstream exploded")
        .create_async()
        .await;

    let client = create_test_client(&server);
    let result = client.snow_data(&SnowQuery::default()).await;

    match result {
        Err(FetchError::Status { status, body }) => {
            assert_eq!(status, 500);
            assert_eq!(body, "upstream exploded");
        }
        other => panic!("Expected Status error, got {:?}", other),
    }

    mock.assert_async().await;
}

#[tokio::test]
async fn test_snow_data_invalid_json() {
    let mut server = Server::new_async().await;

    let mock = server
        .mock("GET", common::timeline_path())
        .with_status(200)
        .with_header("content-type", "text/html")
        .with_body("<html>Maintenance</html>")
        .create_async()
        .await;

    let client = create_test_client(&server);
    let result = client.snow_data(&SnowQuery::default()).await;

    assert!(matches!(result, Err(FetchError::InvalidJson(_))));
    mock.assert_async().await;
}

#[tokio::test]
async fn test_fetch_timeline_returns_raw_json() {
    let mut server = Server::new_async().await;

    let mock = server
        .mock("GET", common::timeline_path())
        .match_query(Matcher::UrlEncoded("limit".into(), "5".into()))
        .with_status(200)
        .with_body(r#"{"results": [], "next": null}"#)
        .create_async()
        .await;

    let client = create_test_client(&server);
    let params = SnowQuery::new().limit(5).to_params();
    let data = client.fetch_timeline(&params).await.unwrap();

    assert_eq!(data, json!({ "results": [], "next": null }));
    mock.assert_async().await;
}

//! WeatherAPI provider against a mock HTTP server.

use serde_json::json;
use weather_stream_core::{ApiDocument, WeatherApiProvider, WeatherProvider};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn current_sends_key_location_and_aqi() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/current.json"))
        .and(query_param("key", "KEY"))
        .and(query_param("q", "Tucson"))
        .and(query_param("aqi", "yes"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "location": { "name": "Tucson", "localtime": "2024-06-01 8:00" },
            "current": { "temp_c": 27.8 }
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let provider = WeatherApiProvider::new(format!("{}/v1/", mock_server.uri()));
    let doc = provider.current("KEY", "Tucson").await.unwrap();

    assert_eq!(doc.root().get("current").get("temp_c").value(), Some(&json!(27.8)));
}

#[tokio::test]
async fn forecast_sends_day_count() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/forecast.json"))
        .and(query_param("days", "3"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "forecast": { "forecastday": [{ "date": "2024-06-01" }] }
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let provider = WeatherApiProvider::new(format!("{}/v1", mock_server.uri()));
    let doc = provider.forecast("KEY", "Tucson", 3).await.unwrap();

    assert_eq!(doc.root().get("forecast").get("forecastday").items().count(), 1);
}

#[tokio::test]
async fn alerts_sends_alert_flag() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/alerts.json"))
        .and(query_param("alerts", "yes"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "alerts": { "alert": [] } })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let provider = WeatherApiProvider::new(format!("{}/v1/", mock_server.uri()));
    let doc = provider.alerts("KEY", "Tucson").await.unwrap();

    assert!(!doc.is_degraded());
}

#[tokio::test]
async fn non_200_becomes_degraded_document() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/current.json"))
        .respond_with(ResponseTemplate::new(401).set_body_string(
            r#"{"error":{"code":2006,"message":"API key is invalid."}}"#,
        ))
        .mount(&mock_server)
        .await;

    let provider = WeatherApiProvider::new(format!("{}/v1/", mock_server.uri()));
    let doc = provider.current("BAD", "Tucson").await.unwrap();

    match &doc {
        ApiDocument::Degraded(reason) => {
            assert!(reason.starts_with("Error 401, "));
            assert!(reason.contains("API key is invalid."));
        }
        other => panic!("expected degraded document, got {other:?}"),
    }
    assert!(doc.root().get("location").value().is_none());
}

#[tokio::test]
async fn unparseable_success_body_is_an_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/alerts.json"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
        .mount(&mock_server)
        .await;

    let provider = WeatherApiProvider::new(format!("{}/v1/", mock_server.uri()));
    let err = provider.alerts("KEY", "Tucson").await.unwrap_err();

    assert!(err.to_string().contains("Failed to parse WeatherAPI alerts JSON"));
}

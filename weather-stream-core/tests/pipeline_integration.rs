//! A full run against mock secret store, weather provider and event hub.

use serde_json::{Value, json};
use std::sync::Arc;
use weather_stream_core::{
    CollaboratorError, Endpoint, EventHubPublisher, EventPublisher, Pipeline, RunSettings,
    SecretProvider, VaultSecretProvider, WeatherApiProvider,
};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn current_body() -> Value {
    json!({
        "location": {
            "name": "Tucson",
            "region": "Arizona",
            "country": "United States of America",
            "lat": 32.22,
            "lon": -110.93,
            "localtime": "2024-06-01 8:00"
        },
        "current": {
            "temp_c": 27.8,
            "is_day": 1,
            "condition": { "text": "Sunny", "icon": "//cdn.weatherapi.com/weather/64x64/day/113.png" },
            "humidity": 18
        }
    })
}

fn forecast_body() -> Value {
    json!({
        "forecast": {
            "forecastday": [
                {
                    "date": "2024-06-01",
                    "day": { "maxtemp_c": 38.1, "mintemp_c": 22.4, "avgtemp_c": 30.2, "condition": { "text": "Sunny" } },
                    "astro": { "sunrise": "05:18 AM", "sunset": "07:26 PM" }
                },
                {
                    "date": "2024-06-02",
                    "day": { "maxtemp_c": 39.0, "mintemp_c": 23.0, "avgtemp_c": 31.0, "condition": { "text": "Sunny" } },
                    "astro": { "sunrise": "05:18 AM", "sunset": "07:27 PM" }
                }
            ]
        }
    })
}

async fn mount_vault(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/secrets/weatherapikey"))
        .and(query_param("api-version", "7.4"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "value": "KEY",
            "id": "https://kv.example.net/secrets/weatherapikey/1"
        })))
        .mount(server)
        .await;
}

async fn mount_weather(server: &MockServer, alerts_status: u16) {
    Mock::given(method("GET"))
        .and(path("/v1/current.json"))
        .and(query_param("key", "KEY"))
        .respond_with(ResponseTemplate::new(200).set_body_json(current_body()))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/v1/forecast.json"))
        .and(query_param("key", "KEY"))
        .respond_with(ResponseTemplate::new(200).set_body_json(forecast_body()))
        .mount(server)
        .await;

    let alerts = if alerts_status == 200 {
        ResponseTemplate::new(200).set_body_json(json!({
            "alerts": { "alert": [{
                "headline": "Excessive Heat Warning",
                "severity": "Severe",
                "desc": "Dangerously hot conditions",
                "instruction": "Drink plenty of fluids"
            }] }
        }))
    } else {
        ResponseTemplate::new(alerts_status).set_body_string("upstream unavailable")
    };

    Mock::given(method("GET")).and(path("/v1/alerts.json")).respond_with(alerts).mount(server).await;
}

fn pipeline(server: &MockServer) -> Pipeline {
    let secrets: Arc<dyn SecretProvider> =
        Arc::new(VaultSecretProvider::new(server.uri(), "weatherapikey".into(), None));
    let publisher: Arc<dyn EventPublisher> =
        Arc::new(EventHubPublisher::new(&server.uri(), "weatherstreameventhub", None));

    Pipeline::new(
        RunSettings { location: "Tucson".into(), forecast_days: 2 },
        Arc::new(WeatherApiProvider::new(format!("{}/v1/", server.uri()))),
        secrets,
        publisher,
    )
}

async fn published_events(server: &MockServer) -> Vec<Value> {
    server
        .received_requests()
        .await
        .unwrap()
        .into_iter()
        .filter(|r| r.url.path() == "/weatherstreameventhub/messages")
        .map(|r| serde_json::from_slice(&r.body).unwrap())
        .collect()
}

#[tokio::test]
async fn run_publishes_one_event_per_forecast_day() {
    let server = MockServer::start().await;
    mount_vault(&server).await;
    mount_weather(&server, 200).await;

    Mock::given(method("POST"))
        .and(path("/weatherstreameventhub/messages"))
        .respond_with(ResponseTemplate::new(201))
        .expect(2)
        .mount(&server)
        .await;

    let report = pipeline(&server).run_once().await.unwrap();
    assert_eq!(report.published, 2);
    assert!(report.degraded.is_empty());

    let events = published_events(&server).await;
    assert_eq!(events.len(), 2);

    assert_eq!(events[0]["forecast_key"], "2024-06-01 8:00 | 2024-06-01");
    assert_eq!(events[1]["forecast_key"], "2024-06-01 8:00 | 2024-06-02");
    assert_eq!(events[0]["localtime"], "2024-06-01 08:00:00");
    assert_eq!(events[1]["sunset"], "2024-06-02 19:27:00");
    assert_eq!(events[1]["sunset_today"], "2024-06-01 19:26:00");
    assert_eq!(events[0]["alert_headline"], "Excessive Heat Warning");
    assert_eq!(events[1]["alert_description"], "Dangerously hot conditions");
    assert_eq!(events[0]["humidity"], 18);
    assert_eq!(events[0]["air_quality_pm10"], Value::Null);
}

#[tokio::test]
async fn degraded_alerts_still_publish() {
    let server = MockServer::start().await;
    mount_vault(&server).await;
    mount_weather(&server, 503).await;

    Mock::given(method("POST"))
        .and(path("/weatherstreameventhub/messages"))
        .respond_with(ResponseTemplate::new(201))
        .expect(2)
        .mount(&server)
        .await;

    let report = pipeline(&server).run_once().await.unwrap();
    assert_eq!(report.degraded, vec![Endpoint::Alerts]);

    let events = published_events(&server).await;
    assert!(events.iter().all(|e| e["alert_headline"].is_null()));
}

#[tokio::test]
async fn vault_refusal_publishes_nothing() {
    let server = MockServer::start().await;
    mount_weather(&server, 200).await;

    Mock::given(method("GET"))
        .and(path("/secrets/weatherapikey"))
        .respond_with(ResponseTemplate::new(403).set_body_string("Forbidden"))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/weatherstreameventhub/messages"))
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&server)
        .await;

    let p = pipeline(&server);
    let err = p.run_once().await.unwrap_err();
    let root = err.root_cause().downcast_ref::<CollaboratorError>();
    assert!(matches!(root, Some(CollaboratorError::SecretUnavailable { .. })));

    assert_eq!(p.fire(false).await, None);
}

#[tokio::test]
async fn rejected_event_stops_the_run() {
    let server = MockServer::start().await;
    mount_vault(&server).await;
    mount_weather(&server, 200).await;

    Mock::given(method("POST"))
        .and(path("/weatherstreameventhub/messages"))
        .respond_with(ResponseTemplate::new(401).set_body_string("ExpiredToken"))
        .expect(1)
        .mount(&server)
        .await;

    let err = pipeline(&server).run_once().await.unwrap_err();

    let msg = format!("{err:#}");
    assert!(msg.contains("record 1 of 2"));
    assert!(msg.contains("status 401"));
    assert!(msg.contains("ExpiredToken"));
}

#[tokio::test]
async fn missing_token_variable_fails_before_sending() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/secrets/weatherapikey"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "value": "KEY" })))
        .expect(0)
        .mount(&server)
        .await;

    let vault = VaultSecretProvider::new(
        server.uri(),
        "weatherapikey".into(),
        Some("WEATHER_STREAM_TEST_SURELY_UNSET_TOKEN".into()),
    );
    let err = vault.resolve().await.unwrap_err();

    assert!(matches!(
        err.downcast_ref::<CollaboratorError>(),
        Some(CollaboratorError::MissingToken(_))
    ));
}

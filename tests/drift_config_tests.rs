//! Tests for drift configuration wiring: how the per-resource drift
//! controls in [`ResourceConfig`] shape what a read writes back into the
//! declared document.

use serde_json::{json, Value};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use apistate::{
    HttpTransport, ProviderSettings, ResourceConfig, ResourceError, ResourceLifecycle,
    ResourceRecord,
};

async fn serve_widget(server: &MockServer, body: Value) {
    Mock::given(method("GET"))
        .and(path("/widgets/42"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

fn record_with(config: ResourceConfig) -> ResourceRecord {
    ResourceRecord {
        id: "42".to_string(),
        config,
    }
}

fn widget_config(data: &str) -> ResourceConfig {
    ResourceConfig {
        path: "/widgets".to_string(),
        data: data.to_string(),
        ..ResourceConfig::default()
    }
}

#[tokio::test]
async fn test_drift_fields_limits_what_a_read_writes_back() {
    let server = MockServer::start().await;
    serve_widget(
        &server,
        json!({"id": "42", "name": "remote", "size": 9, "etag": "x"}),
    )
    .await;

    let mut config = widget_config(r#"{"id": "42", "name": "local", "size": 1}"#);
    config.drift_fields = Some(r#"{"size": true}"#.to_string());

    let lifecycle = ResourceLifecycle::new(HttpTransport::new(server.uri()), ProviderSettings::default());
    let mut record = record_with(config);
    lifecycle.read(&mut record).await.unwrap();

    let data: Value = serde_json::from_str(&record.config.data).unwrap();
    // Only size was in scope; the remote rename and etag never land.
    assert_eq!(data, json!({"id": "42", "name": "local", "size": 9}));
}

#[tokio::test]
async fn test_drift_fields_from_data_drops_server_generated_noise() {
    let server = MockServer::start().await;
    serve_widget(
        &server,
        json!({"id": "42", "name": "local", "last_modified": "2026-08-28"}),
    )
    .await;

    let declared = r#"{"id": "42", "name": "local"}"#;
    let mut config = widget_config(declared);
    config.drift_fields_from_data = true;

    let lifecycle = ResourceLifecycle::new(HttpTransport::new(server.uri()), ProviderSettings::default());
    let mut record = record_with(config);
    lifecycle.read(&mut record).await.unwrap();

    // Nothing the operator declared changed, so the document is untouched.
    assert_eq!(record.config.data, declared);
}

#[tokio::test]
async fn test_ignore_all_server_changes_pins_declared_document() {
    let server = MockServer::start().await;
    serve_widget(&server, json!({"id": "42", "name": "totally-different"})).await;

    let declared = r#"{"id": "42", "name": "local"}"#;
    let mut config = widget_config(declared);
    config.ignore_all_server_changes = true;

    let lifecycle = ResourceLifecycle::new(HttpTransport::new(server.uri()), ProviderSettings::default());
    let mut record = record_with(config);
    lifecycle.read(&mut record).await.unwrap();

    assert_eq!(record.config.data, declared);
}

#[tokio::test]
async fn test_malformed_drift_fields_fails_the_read() {
    let server = MockServer::start().await;
    serve_widget(&server, json!({"id": "42"})).await;

    let mut config = widget_config(r#"{"id": "42"}"#);
    config.drift_fields = Some("{not json".to_string());

    let lifecycle = ResourceLifecycle::new(HttpTransport::new(server.uri()), ProviderSettings::default());
    let mut record = record_with(config);

    let err = lifecycle.read(&mut record).await.unwrap_err();
    assert!(matches!(err, ResourceError::DriftParseFailure(_)));
}

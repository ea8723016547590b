//! API Integration Tests
//!
//! The router is driven in-process with fake classifiers; the recognizer and
//! rules are the built-in ones.

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use ixt_api::{create_router, state::AppState};
use ixt_core::{AppConfig, IxtError, TextClassifier};
use ixt_extractor::{GazetteerRecognizer, HybridExtractor, Pipeline, RuleSet};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;

// =============================================================================
// Fakes and helpers
// =============================================================================

/// Always predicts the same label
struct FixedClassifier(&'static str);

impl TextClassifier for FixedClassifier {
    fn predict(&self, _text: &str) -> ixt_core::Result<String> {
        Ok(self.0.to_string())
    }

    fn name(&self) -> &str {
        "fixed"
    }
}

/// Sleeps longer than any test timeout
struct SlowClassifier;

impl TextClassifier for SlowClassifier {
    fn predict(&self, _text: &str) -> ixt_core::Result<String> {
        std::thread::sleep(Duration::from_millis(500));
        Ok("address_change".to_string())
    }

    fn name(&self) -> &str {
        "slow"
    }
}

struct FailingClassifier;

impl TextClassifier for FailingClassifier {
    fn predict(&self, _text: &str) -> ixt_core::Result<String> {
        Err(IxtError::Classifier("model file corrupted".to_string()))
    }

    fn name(&self) -> &str {
        "failing"
    }
}

fn state_with(classifier: Arc<dyn TextClassifier>, config: AppConfig) -> Arc<AppState> {
    let extractor = HybridExtractor::new(
        Arc::new(GazetteerRecognizer::builtin().unwrap()),
        RuleSet::builtin().unwrap(),
    );
    let pipeline = Pipeline::new(classifier, extractor);
    Arc::new(AppState::new(config, Arc::new(pipeline)))
}

fn app_with(classifier: Arc<dyn TextClassifier>, config: AppConfig) -> Router {
    let state = state_with(classifier, config);
    state.set_ready(true);
    create_router(state)
}

fn app(label: &'static str) -> Router {
    app_with(Arc::new(FixedClassifier(label)), AppConfig::default())
}

/// Helper to create a test request
fn create_json_request(method: &str, uri: &str, body: Option<Value>) -> Request<Body> {
    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("Content-Type", "application/json");

    match body {
        Some(json_body) => builder
            .body(Body::from(serde_json::to_string(&json_body).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = serde_json::from_slice(&body).unwrap_or(Value::Null);
    (status, json)
}

// =============================================================================
// Extraction API Tests
// =============================================================================

#[tokio::test]
async fn test_extract_address_change() {
    let request = create_json_request(
        "POST",
        "/extract",
        Some(json!({
            "text": "Please update my address to 123 Main Street effective next month"
        })),
    );

    let (status, json) = send(app("address_change"), request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["predicted_class"], "address_change");
    assert_eq!(json["entities"]["new_address"], "123 Main Street");
    assert_eq!(json["entities"]["effective_date"], "effective next month");
    assert_eq!(json["entities"]["DATE"], json!(["next month"]));
}

#[tokio::test]
async fn test_extract_beneficiary_change() {
    let request = create_json_request(
        "POST",
        "/extract",
        Some(json!({
            "text": "Change beneficiary to my daughter Emma Stone on policy number 123456"
        })),
    );

    let (status, json) = send(app("beneficiary_change"), request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["predicted_class"], "beneficiary_change");
    assert_eq!(json["entities"]["policy_number"], "123456");
    assert_eq!(json["entities"]["beneficiary_name"], "Emma Stone");
    assert_eq!(json["entities"]["RELATIONSHIP"], json!(["daughter"]));
}

#[tokio::test]
async fn test_extract_other_category_only_global_fields() {
    let request = create_json_request(
        "POST",
        "/extract",
        Some(json!({
            "text": "policy number 123456, reach me at jane@example.com or +44 20 7946 0958"
        })),
    );

    let (status, json) = send(app("general_inquiry"), request).await;

    assert_eq!(status, StatusCode::OK);
    let entities = json["entities"].as_object().unwrap();
    assert_eq!(entities["email"], "jane@example.com");
    assert_eq!(entities["phone_number"], "+44 20 7946 0958");
    for field in ["policy_number", "beneficiary_name", "new_address", "effective_date"] {
        assert!(!entities.contains_key(field), "unexpected {field}");
    }
}

#[tokio::test]
async fn test_extract_via_get_with_body() {
    let request = create_json_request(
        "GET",
        "/extract",
        Some(json!({ "text": "my email is sam@example.org" })),
    );

    let (status, json) = send(app("contact_update"), request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["predicted_class"], "contact_update");
    assert_eq!(json["entities"]["email"], "sam@example.org");
}

#[tokio::test]
async fn test_extract_missing_text() {
    let request = create_json_request("POST", "/extract", Some(json!({ "message": "hi" })));

    let (status, json) = send(app("address_change"), request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn test_extract_without_body() {
    let request = create_json_request("GET", "/extract", None);

    let (status, json) = send(app("address_change"), request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn test_extract_whitespace_text() {
    let request = create_json_request("POST", "/extract", Some(json!({ "text": "   " })));

    let (status, json) = send(app("address_change"), request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["message"], "Text cannot be empty");
}

#[tokio::test]
async fn test_extract_classifier_failure() {
    let app = app_with(Arc::new(FailingClassifier), AppConfig::default());
    let request = create_json_request("POST", "/extract", Some(json!({ "text": "hello" })));

    let (status, json) = send(app, request).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["code"], "INTERNAL_ERROR");
    assert!(json["details"]
        .as_str()
        .unwrap()
        .contains("model file corrupted"));
}

#[tokio::test]
async fn test_extract_inference_timeout() {
    let mut config = AppConfig::default();
    config.models.inference_timeout_ms = 20;
    let app = app_with(Arc::new(SlowClassifier), config);
    let request = create_json_request("POST", "/extract", Some(json!({ "text": "hello" })));

    let (status, json) = send(app, request).await;

    assert_eq!(status, StatusCode::GATEWAY_TIMEOUT);
    assert_eq!(json["code"], "INFERENCE_TIMEOUT");
}

#[tokio::test]
async fn test_extract_body_limit() {
    let mut config = AppConfig::default();
    config.server.max_body_size = 64;
    let app = app_with(Arc::new(FixedClassifier("general_inquiry")), config);
    let request = create_json_request(
        "POST",
        "/extract",
        Some(json!({ "text": "x".repeat(256) })),
    );

    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
}

// =============================================================================
// Health Check Tests
// =============================================================================

#[tokio::test]
async fn test_health_check() {
    let request = Request::builder()
        .uri("/health")
        .body(Body::empty())
        .unwrap();

    let (status, json) = send(app("general_inquiry"), request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "ok");
    assert!(json["version"].is_string());
}

#[tokio::test]
async fn test_readiness_check() {
    let request = Request::builder()
        .uri("/ready")
        .body(Body::empty())
        .unwrap();

    let (status, json) = send(app("general_inquiry"), request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["ready"], true);
    assert_eq!(json["checks"]["classifier"], "fixed");
    assert_eq!(json["checks"]["recognizer"], "gazetteer");
    assert_eq!(json["checks"]["rules"], 6);
    assert_eq!(
        json["checks"]["rule_categories"],
        json!(["beneficiary_change", "address_change"])
    );
}

#[tokio::test]
async fn test_readiness_before_startup_completes() {
    let state = state_with(Arc::new(FixedClassifier("general_inquiry")), AppConfig::default());
    let app = create_router(state.clone());
    let ready_request = || {
        Request::builder()
            .uri("/ready")
            .body(Body::empty())
            .unwrap()
    };

    let (status, json) = send(app.clone(), ready_request()).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(json["ready"], false);

    state.set_ready(true);
    let (status, json) = send(app, ready_request()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["ready"], true);
}

#[tokio::test]
async fn test_metrics_count_extractions() {
    let app = app("address_change");

    for _ in 0..2 {
        let request = create_json_request(
            "POST",
            "/extract",
            Some(json!({ "text": "new address: 9 Ocean Drive" })),
        );
        let (status, _) = send(app.clone(), request).await;
        assert_eq!(status, StatusCode::OK);
    }

    let request = Request::builder()
        .uri("/metrics")
        .body(Body::empty())
        .unwrap();
    let (status, json) = send(app, request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["total_requests"], 2);
    assert_eq!(json["extractions_by_category"]["address_change"], 2);
    assert_eq!(json["endpoints"]["POST /extract"]["requests"], 2);
    assert_eq!(json["endpoints"]["POST /extract"]["status_counts"]["200"], 2);
}

// =============================================================================
// API Documentation Tests
// =============================================================================

#[tokio::test]
async fn test_swagger_ui_available() {
    let response = app("general_inquiry")
        .oneshot(
            Request::builder()
                .uri("/swagger-ui/")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    // Swagger UI should redirect or return HTML
    assert!(
        response.status() == StatusCode::OK || response.status() == StatusCode::MOVED_PERMANENTLY
    );
}

#[tokio::test]
async fn test_openapi_spec_available() {
    let request = Request::builder()
        .uri("/api-docs/openapi.json")
        .body(Body::empty())
        .unwrap();

    let (status, json) = send(app("general_inquiry"), request).await;

    assert_eq!(status, StatusCode::OK);
    assert!(json["openapi"].is_string());
    assert!(json["paths"]["/extract"]["post"].is_object());
    assert!(json["paths"]["/extract"]["get"].is_object());
    assert!(json["components"]["schemas"]["ExtractResponse"].is_object());
}

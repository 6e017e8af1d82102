use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use silentaid::{
    router, with_service_layers, AppState, ClassifierError, EmotionAnalyzer, EmotionReducer, RawScore, ScoreClassifier,
};

/// Returns fixed scores and records the text it was asked to classify
struct FixedClassifier {
    scores: Vec<RawScore>,
    seen: Mutex<Vec<String>>,
}

impl FixedClassifier {
    fn new(pairs: &[(&str, f64)]) -> Self {
        Self {
            scores: pairs.iter().map(|&(l, s)| RawScore::new(l, s)).collect(),
            seen: Mutex::new(Vec::new()),
        }
    }
}

impl ScoreClassifier for FixedClassifier {
    fn classify(&self, text: &str) -> Result<Vec<RawScore>, ClassifierError> {
        self.seen.lock().unwrap().push(text.to_string());
        Ok(self.scores.clone())
    }

    fn labels(&self) -> Vec<String> {
        self.scores.iter().map(|s| s.label.clone()).collect()
    }
}

struct FailingClassifier;

impl ScoreClassifier for FailingClassifier {
    fn classify(&self, _text: &str) -> Result<Vec<RawScore>, ClassifierError> {
        Err(ClassifierError::ModelError("Expected logits shaped [1, num_labels], got [3]".into()))
    }

    fn labels(&self) -> Vec<String> {
        Vec::new()
    }
}

struct PanickingClassifier;

impl ScoreClassifier for PanickingClassifier {
    fn classify(&self, _text: &str) -> Result<Vec<RawScore>, ClassifierError> {
        panic!("runtime exploded")
    }

    fn labels(&self) -> Vec<String> {
        Vec::new()
    }
}

struct SlowClassifier;

impl ScoreClassifier for SlowClassifier {
    fn classify(&self, _text: &str) -> Result<Vec<RawScore>, ClassifierError> {
        std::thread::sleep(Duration::from_millis(500));
        Ok(vec![RawScore::new("joy", 0.99)])
    }

    fn labels(&self) -> Vec<String> {
        vec!["joy".into()]
    }
}

fn app(classifier: Option<Arc<dyn ScoreClassifier>>) -> Router {
    let analyzer = EmotionAnalyzer::new(classifier, EmotionReducer::default());
    router(Arc::new(AppState::new(analyzer)))
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, serde_json::from_slice(&bytes).unwrap())
}

fn post_emotion(body: impl Into<Body>) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/emotion")
        .header("content-type", "application/json")
        .body(body.into())
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn fallback_fields(value: &Value) {
    assert_eq!(value["emotion"], "Neutral");
    assert_eq!(value["emoji"], "😐");
    assert_eq!(value["color"], "#6b7280");
    assert_eq!(value["confidence"], 0.5);
}

#[tokio::test]
async fn test_end_to_end_happy_path() {
    let classifier = Arc::new(FixedClassifier::new(&[
        ("anger", 0.01),
        ("joy", 0.93),
        ("neutral", 0.04),
        ("sadness", 0.02),
    ]));
    let app = app(Some(classifier.clone()));

    let body = json!({"text": "I am so um happy today!", "timestamp": "2024-05-01T10:00:00Z"});
    let (status, value) = send(app, post_emotion(body.to_string())).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(value, json!({
        "text": "I am so happy today!",
        "emotion": "Happy",
        "emoji": "😊",
        "color": "#22c55e",
        "confidence": 0.93,
        "timestamp": "2024-05-01T10:00:00Z"
    }));
    assert_eq!(*classifier.seen.lock().unwrap(), vec!["I am so happy today!".to_string()]);
}

#[tokio::test]
async fn test_timestamp_passed_through_unchanged() {
    let app = app(Some(Arc::new(FixedClassifier::new(&[("sadness", 0.8)]))));
    let body = json!({"text": "oh no", "timestamp": {"seq": 12, "clock": [1, 2]}});
    let (status, value) = send(app, post_emotion(body.to_string())).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(value["emotion"], "Sad");
    assert_eq!(value["timestamp"], json!({"seq": 12, "clock": [1, 2]}));
}

#[tokio::test]
async fn test_missing_timestamp_is_null() {
    let app = app(Some(Arc::new(FixedClassifier::new(&[("anger", 0.7)]))));
    let (status, value) = send(app, post_emotion(r#"{"text": "stop it"}"#)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(value["emotion"], "Angry");
    assert_eq!(value["timestamp"], Value::Null);
}

#[tokio::test]
async fn test_missing_text_field() {
    let (status, value) = send(app(None), post_emotion("{}")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(value, json!({"error": "No text provided"}));
}

#[tokio::test]
async fn test_null_body_is_missing_text() {
    let (status, value) = send(app(None), post_emotion("null")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(value, json!({"error": "No text provided"}));
}

#[tokio::test]
async fn test_malformed_body() {
    let (status, value) = send(app(None), post_emotion("{not json")).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(value, json!({"error": "Internal server error"}));
}

#[tokio::test]
async fn test_non_string_text_is_server_error() {
    let (status, value) = send(app(None), post_emotion(r#"{"text": 42}"#)).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(value, json!({"error": "Internal server error"}));

    let raw = value.to_string();
    assert!(!raw.contains("number"));
    assert!(!raw.contains("not a string"));
}

#[tokio::test]
async fn test_non_object_body_is_server_error() {
    let (status, value) = send(app(None), post_emotion(r#"["text"]"#)).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(value, json!({"error": "Internal server error"}));
}

async fn exploding_handler() -> &'static str {
    panic!("secret cause")
}

#[tokio::test]
async fn test_handler_panic_returns_internal_error() {
    let app = with_service_layers(Router::new().route("/boom", axum::routing::get(exploding_handler)));
    let response = app.oneshot(get("/boom")).await.unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    assert!(!String::from_utf8_lossy(&bytes).contains("secret cause"));
    let value: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(value, json!({"error": "Internal server error"}));
}

#[tokio::test]
async fn test_empty_after_cleaning() {
    let (status, value) = send(app(None), post_emotion(r#"{"text": "  um   uh \n"}"#)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(value, json!({"error": "Empty text after cleaning"}));
}

#[tokio::test]
async fn test_no_model_still_answers() {
    let (status, value) = send(app(None), get("/api/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(value, json!({"status": "healthy", "model_loaded": false}));

    let (status, value) = send(app(None), post_emotion(r#"{"text": "great news"}"#)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(value["text"], "great news");
    fallback_fields(&value);
}

#[tokio::test]
async fn test_health_with_model() {
    let app = app(Some(Arc::new(FixedClassifier::new(&[("joy", 1.0)]))));
    let (status, value) = send(app, get("/api/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(value["model_loaded"], true);
}

#[tokio::test]
async fn test_classifier_error_degrades_to_fallback() {
    let app = app(Some(Arc::new(FailingClassifier)));
    let (status, value) = send(app, post_emotion(r#"{"text": "hello"}"#)).await;
    assert_eq!(status, StatusCode::OK);
    fallback_fields(&value);
}

#[tokio::test]
async fn test_classifier_panic_degrades_to_fallback() {
    let app = app(Some(Arc::new(PanickingClassifier)));
    let (status, value) = send(app, post_emotion(r#"{"text": "hello"}"#)).await;
    assert_eq!(status, StatusCode::OK);
    fallback_fields(&value);
}

#[tokio::test]
async fn test_classifier_timeout_degrades_to_fallback() {
    let analyzer = EmotionAnalyzer::new(Some(Arc::new(SlowClassifier)), EmotionReducer::default())
        .with_timeout(Duration::from_millis(20));
    let app = router(Arc::new(AppState::new(analyzer)));

    let (status, value) = send(app, post_emotion(r#"{"text": "hello"}"#)).await;
    assert_eq!(status, StatusCode::OK);
    fallback_fields(&value);
}

#[tokio::test]
async fn test_root_lists_endpoints() {
    let (status, value) = send(app(None), get("/")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(value["message"], "SilentAid Backend API");
    assert_eq!(value["endpoints"], json!(["/api/health", "/api/emotion"]));
    assert_eq!(value["version"], "1.0.0");
}

#[tokio::test]
async fn test_cors_headers_present() {
    let request = Request::builder()
        .uri("/api/health")
        .header("origin", "http://localhost:3000")
        .body(Body::empty())
        .unwrap();
    let response = app(None).oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get("access-control-allow-origin").unwrap(),
        "*"
    );
}

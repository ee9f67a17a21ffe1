//! `HttpGenerator` against a throwaway generation service on localhost.

use std::sync::{Arc, Mutex};

use axum::{Json, Router, extract::State, http::StatusCode, routing::post};
use serde_json::{Value, json};

use squawk_gen::{GenerationRequest, HttpGenerator, TextGenerator};

// =============================================================================
// Test Helpers
// =============================================================================

type Received = Arc<Mutex<Vec<Value>>>;

/// Serve `app` on an ephemeral port and return the generate URL.
async fn serve(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}/generate")
}

/// A service that records each request body and answers with fixed text.
async fn recording_service() -> (String, Received) {
    let received = Received::default();
    let app = Router::new()
        .route(
            "/generate",
            post(
                |State(received): State<Received>, Json(body): Json<Value>| async move {
                    received.lock().unwrap().push(body);
                    Json(json!({ "text": "the model has spoken" }))
                },
            ),
        )
        .with_state(received.clone());
    (serve(app).await, received)
}

fn request(prompt: Option<&str>, temperature: Option<f64>) -> GenerationRequest {
    GenerationRequest {
        prompt: prompt.map(str::to_string),
        temperature,
    }
}

// =============================================================================
// Tests
// =============================================================================

#[tokio::test]
async fn sends_prompt_and_temperature_and_returns_text() {
    let (url, received) = recording_service().await;
    let generator = HttpGenerator::new(url);

    let text = generator
        .generate(&request(Some("tax cuts"), Some(0.7)))
        .await
        .unwrap();

    assert_eq!(text, "the model has spoken");
    assert_eq!(generator.name(), "http");
    let bodies = received.lock().unwrap();
    assert_eq!(bodies.len(), 1);
    assert_eq!(bodies[0], json!({ "prompt": "tax cuts", "temperature": 0.7 }));
}

#[tokio::test]
async fn missing_temperature_falls_back_to_default() {
    let (url, received) = recording_service().await;
    let generator = HttpGenerator::new(url);

    generator.generate(&request(None, None)).await.unwrap();

    let bodies = received.lock().unwrap();
    assert_eq!(bodies[0], json!({ "prompt": null, "temperature": 0.5 }));
}

#[tokio::test]
async fn out_of_range_temperature_is_passed_through() {
    let (url, received) = recording_service().await;
    let generator = HttpGenerator::new(url);

    generator.generate(&request(None, Some(9.9))).await.unwrap();

    assert_eq!(received.lock().unwrap()[0]["temperature"], 9.9);
}

#[tokio::test]
async fn error_status_is_an_error() {
    let app = Router::new().route(
        "/generate",
        post(|| async { (StatusCode::SERVICE_UNAVAILABLE, "model still loading") }),
    );
    let generator = HttpGenerator::new(serve(app).await);

    assert!(generator.generate(&request(None, None)).await.is_err());
}

#[tokio::test]
async fn malformed_reply_is_an_error() {
    let app = Router::new().route(
        "/generate",
        post(|| async { Json(json!({ "words": ["not", "text"] })) }),
    );
    let generator = HttpGenerator::new(serve(app).await);

    let err = generator.generate(&request(None, None)).await.unwrap_err();
    assert!(err.to_string().contains("malformed"));
}

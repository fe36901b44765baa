use veracity_api::{ApiError, ClaimPayload, PredictionClient, VerificationService};
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn claim() -> ClaimPayload {
    ClaimPayload {
        title: "https://example.com/a".to_string(),
        text: String::new(),
    }
}

#[tokio::test]
async fn predict_posts_title_and_text_and_decodes() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/prediction"))
        .and(body_json(serde_json::json!({
            "title": "https://example.com/a",
            "text": "",
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "verdict": "REAL",
            "confidence": 91,
            "explanation": "Corroborated by three outlets.",
            "style_analysis": "REAL",
            "sources": ["https://x.com/y"],
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = PredictionClient::new(&server.uri()).unwrap();
    let raw = client.predict(&claim()).await.unwrap();
    assert_eq!(raw.verdict.as_deref(), Some("REAL"));
    assert_eq!(raw.confidence, Some(91.0));
    assert_eq!(raw.sources.as_deref(), Some(&["https://x.com/y".to_string()][..]));
}

#[tokio::test]
async fn non_2xx_is_a_transport_failure_not_a_structured_error() {
    let server = MockServer::start().await;
    // The service historically answered 400 with an in-band error body;
    // status trumps body, so this surfaces as a status error.
    Mock::given(method("POST"))
        .and(path("/prediction"))
        .respond_with(
            ResponseTemplate::new(400).set_body_json(serde_json::json!({"error": "Scrape failed"})),
        )
        .mount(&server)
        .await;

    let client = PredictionClient::new(&server.uri()).unwrap();
    let err = client.predict(&claim()).await.unwrap_err();
    match err {
        ApiError::Status { status, body_snippet } => {
            assert_eq!(status.as_u16(), 400);
            assert!(body_snippet.contains("Scrape failed"));
        }
        other => panic!("expected status error, got {other:?}"),
    }
}

#[tokio::test]
async fn undecodable_body_is_a_decode_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/prediction"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>gateway</html>"))
        .mount(&server)
        .await;

    let client = PredictionClient::new(&server.uri()).unwrap();
    assert!(matches!(
        client.predict(&claim()).await,
        Err(ApiError::Decode(_))
    ));
}

#[tokio::test]
async fn in_band_error_with_2xx_status_still_decodes() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/prediction"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({"error": "All configured AI tokens failed"})),
        )
        .mount(&server)
        .await;

    let client = PredictionClient::new(&server.uri()).unwrap();
    let raw = client.predict(&claim()).await.unwrap();
    assert_eq!(raw.error.as_deref(), Some("All configured AI tokens failed"));
}

#[tokio::test]
async fn health_check_reads_the_root_route() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "status": "healthy",
            "ai": "READY",
            "tokens_active": 2,
            "requests_processed": 40,
        })))
        .mount(&server)
        .await;

    let client = PredictionClient::new(&server.uri()).unwrap();
    let health = client.health_check().await.unwrap();
    assert!(health.is_healthy());
    assert_eq!(health.ai, "READY");
}

#[tokio::test]
async fn unreachable_service_is_a_network_error() {
    // Port 9 (discard) is a safe bet for connection refusal.
    let client = PredictionClient::new("http://127.0.0.1:9").unwrap();
    assert!(matches!(
        client.predict(&claim()).await,
        Err(ApiError::Network(_))
    ));
}

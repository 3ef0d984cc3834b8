mod support;

use std::sync::atomic::Ordering;

use serde_json::json;
use wiremock::matchers::{body_partial_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use scenecraft::tiers::DEFAULT_ANALYSIS_STANDARD;
use scenecraft::types::content::Content;
use scenecraft::types::models::GenerateContentRequest;
use scenecraft::Error;

use support::{
    build_client, closed_port_url, method_path, product_image, text_candidate,
    RecordingBackoff, SequenceResponder,
};

fn hello_request() -> GenerateContentRequest {
    GenerateContentRequest {
        contents: vec![Content::user("hello")],
        generation_config: None,
    }
}

#[tokio::test]
async fn dispatch_retries_server_error_then_succeeds() {
    let server = MockServer::start().await;
    let responder = SequenceResponder::new(vec![
        ResponseTemplate::new(500).set_body_string("oops"),
        ResponseTemplate::new(200).set_body_json(text_candidate("ok")),
    ]);
    let calls = responder.calls();
    Mock::given(method("POST"))
        .and(path(method_path("gemini-2.5-pro")))
        .respond_with(responder)
        .mount(&server)
        .await;

    let backoff = RecordingBackoff::default();
    let client = build_client(&server.uri(), &backoff);
    let response = client
        .dispatcher()
        .dispatch("gemini-2.5-pro", &hello_request())
        .await
        .unwrap();

    assert_eq!(response.status, 200);
    assert_eq!(calls.load(Ordering::SeqCst), 2);
    assert_eq!(backoff.delay_secs(), vec![2]);
}

#[tokio::test]
async fn dispatch_returns_last_response_after_three_quota_errors() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(method_path("gemini-2.5-pro")))
        .respond_with(ResponseTemplate::new(429).set_body_string("slow down"))
        .expect(3)
        .mount(&server)
        .await;

    let backoff = RecordingBackoff::default();
    let client = build_client(&server.uri(), &backoff);
    let response = client
        .dispatcher()
        .dispatch("models/gemini-2.5-pro", &hello_request())
        .await
        .unwrap();

    assert_eq!(response.status, 429);
    assert_eq!(response.body, "slow down");
    assert_eq!(backoff.delay_secs(), vec![2, 4, 8]);
}

#[tokio::test]
async fn quota_on_standard_model_raises_after_three_attempts() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(method_path(DEFAULT_ANALYSIS_STANDARD)))
        .respond_with(ResponseTemplate::new(429).set_body_json(json!({
            "error": {"code": 429, "message": "Resource has been exhausted", "status": "RESOURCE_EXHAUSTED"}
        })))
        .expect(3)
        .mount(&server)
        .await;

    let backoff = RecordingBackoff::default();
    let client = build_client(&server.uri(), &backoff);
    let err = client
        .studio()
        .analyze(DEFAULT_ANALYSIS_STANDARD, &product_image())
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        Error::QuotaExceeded { ref model, ref message }
            if model == DEFAULT_ANALYSIS_STANDARD && message == "Resource has been exhausted"
    ));
    assert_eq!(backoff.delay_secs(), vec![2, 4, 8]);
    assert_eq!(backoff.delay_secs().iter().sum::<u64>(), 14);
}

#[tokio::test]
async fn client_error_is_not_retried() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(method_path("gemini-2.5-pro")))
        .respond_with(ResponseTemplate::new(400).set_body_string("bad request"))
        .expect(1)
        .mount(&server)
        .await;

    let backoff = RecordingBackoff::default();
    let client = build_client(&server.uri(), &backoff);
    let response = client
        .dispatcher()
        .dispatch("gemini-2.5-pro", &hello_request())
        .await
        .unwrap();

    assert_eq!(response.status, 400);
    assert!(backoff.delays().is_empty());
}

#[tokio::test]
async fn transport_failure_on_last_attempt_is_network_error() {
    let backoff = RecordingBackoff::default();
    let client = build_client(&closed_port_url(), &backoff);
    let err = client
        .dispatcher()
        .dispatch("gemini-2.5-pro", &hello_request())
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Network { attempts: 3, .. }));
    assert!(!err.to_string().contains("test-key"));
    assert_eq!(backoff.delay_secs(), vec![2, 4, 8]);
}

#[tokio::test]
async fn api_key_and_snake_case_body_are_sent() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(method_path("gemini-2.5-pro")))
        .and(query_param("key", "test-key"))
        .and(body_partial_json(json!({
            "generation_config": {"response_mime_type": "application/json"}
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(text_candidate("ok")))
        .expect(1)
        .mount(&server)
        .await;

    let backoff = RecordingBackoff::default();
    let client = build_client(&server.uri(), &backoff);
    let request = GenerateContentRequest {
        contents: vec![Content::user("hello")],
        generation_config: Some(scenecraft::types::config::GenerationConfig::json_output()),
    };
    let response = client
        .dispatcher()
        .dispatch("gemini-2.5-pro", &request)
        .await
        .unwrap();
    assert_eq!(response.status, 200);
}

#[tokio::test]
async fn custom_retry_budget_is_respected() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(method_path("gemini-2.5-pro")))
        .respond_with(ResponseTemplate::new(503))
        .expect(1)
        .mount(&server)
        .await;

    let backoff = RecordingBackoff::default();
    let client = scenecraft::Client::builder()
        .api_key("test-key")
        .base_url(server.uri())
        .retry_options(scenecraft::types::http::RetryOptions::immediate(1))
        .backoff(backoff.clone())
        .build()
        .unwrap();
    let response = client
        .dispatcher()
        .dispatch("gemini-2.5-pro", &hello_request())
        .await
        .unwrap();
    assert_eq!(response.status, 503);
    assert_eq!(backoff.delay_secs(), vec![0]);
}

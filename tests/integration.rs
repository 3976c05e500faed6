// SPDX-FileCopyrightText: 2026 Sephyi <me@sephy.io>
//
// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0

//! Integration tests for LLM providers and the extraction pipeline.
//!
//! Uses `wiremock` to mock HTTP endpoints so no real LLM servers are needed.

mod helpers;

use serde_json::json;
use wiremock::matchers::{body_partial_json, body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use splitzie::config::{Config, Provider};
use splitzie::error::Error;
use splitzie::services::extractor::BillExtractor;
use splitzie::services::image::ImageAttachment;
use splitzie::services::llm::LlmClient;
use splitzie::services::prompt::ExtractionPrompt;
use helpers::{PNG_BYTES, money, pizza_extraction};

// ─── Test helpers ────────────────────────────────────────────────────────────

fn ollama_config(server_url: &str) -> Config {
    Config {
        provider: Provider::Ollama,
        model: Some("llava:7b".into()),
        ollama_host: server_url.to_string(),
        timeout_secs: 5,
        ..Config::default()
    }
}

fn openai_config(server_url: &str) -> Config {
    Config {
        provider: Provider::OpenAI,
        model: Some("gpt-4o-mini".into()),
        openai_base_url: Some(server_url.to_string()),
        api_key: Some("test-key".into()),
        timeout_secs: 5,
        ..Config::default()
    }
}

fn anthropic_config(server_url: &str) -> Config {
    Config {
        provider: Provider::Anthropic,
        model: Some("claude-3-haiku-20240307".into()),
        anthropic_base_url: Some(format!("{server_url}/v1")),
        api_key: Some("test-key".into()),
        timeout_secs: 5,
        ..Config::default()
    }
}

fn png() -> ImageAttachment {
    ImageAttachment::from_bytes(PNG_BYTES, None).unwrap()
}

fn openai_reply(content: &str) -> serde_json::Value {
    json!({
        "id": "chatcmpl-1",
        "choices": [{
            "index": 0,
            "message": {"role": "assistant", "content": content},
            "finish_reason": "stop"
        }]
    })
}

async fn complete(config: &Config, context: &str) -> splitzie::Result<String> {
    let client = LlmClient::from_config(config).unwrap();
    let image = png();
    client.complete(&ExtractionPrompt::new(context, &image)).await
}

// ─── OpenAI ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn openai_sends_vision_request() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(header("authorization", "Bearer test-key"))
        .and(body_partial_json(json!({
            "model": "gpt-4o-mini",
            "response_format": {"type": "json_object"}
        })))
        .and(body_string_contains("data:image/png;base64,"))
        .and(body_string_contains("Alice had pizza"))
        .respond_with(ResponseTemplate::new(200).set_body_json(openai_reply("{\"ok\":true}")))
        .expect(1)
        .mount(&server)
        .await;

    let raw = complete(&openai_config(&server.uri()), "Alice had pizza")
        .await
        .unwrap();
    assert_eq!(raw, "{\"ok\":true}");
}

#[tokio::test]
async fn openai_server_error_is_retryable() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(500).set_body_string("Internal Server Error"))
        .mount(&server)
        .await;

    let err = complete(&openai_config(&server.uri()), "").await.unwrap_err();
    match err {
        Error::ProviderUnavailable {
            ref provider,
            ref message,
        } => {
            assert_eq!(provider, "openai");
            assert!(message.contains("500"), "got: {message}");
        }
        ref other => panic!("expected ProviderUnavailable, got: {other:?}"),
    }
    assert!(err.is_retryable());
}

#[tokio::test]
async fn openai_unauthorized_is_not_retryable() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(
            ResponseTemplate::new(401)
                .set_body_json(json!({"error": {"message": "Incorrect API key provided"}})),
        )
        .mount(&server)
        .await;

    let err = complete(&openai_config(&server.uri()), "").await.unwrap_err();
    match err {
        Error::Provider { ref message, .. } => {
            assert!(message.contains("401"), "got: {message}");
            assert!(message.contains("Incorrect API key"), "got: {message}");
        }
        ref other => panic!("expected Provider error, got: {other:?}"),
    }
    assert!(!err.is_retryable());
}

#[tokio::test]
async fn openai_rate_limit_is_retryable() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(429).set_body_string("slow down"))
        .mount(&server)
        .await;

    let err = complete(&openai_config(&server.uri()), "").await.unwrap_err();
    assert!(matches!(err, Error::ProviderUnavailable { .. }), "got: {err:?}");
}

#[tokio::test]
async fn openai_truncated_reply_is_malformed() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{
                "message": {"role": "assistant", "content": "{\"bill_item\":"},
                "finish_reason": "length"
            }]
        })))
        .mount(&server)
        .await;

    let err = complete(&openai_config(&server.uri()), "").await.unwrap_err();
    assert!(matches!(err, Error::MalformedExtraction(_)), "got: {err:?}");
}

#[tokio::test]
async fn openai_refusal_is_provider_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{
                "message": {"role": "assistant", "content": null, "refusal": "I can't help with that."},
                "finish_reason": "stop"
            }]
        })))
        .mount(&server)
        .await;

    let err = complete(&openai_config(&server.uri()), "").await.unwrap_err();
    assert!(matches!(err, Error::Provider { .. }), "got: {err:?}");
}

#[test]
fn http_client_errors_convert_and_are_not_retried() {
    let request_error = reqwest::Client::new()
        .get("not a url")
        .build()
        .unwrap_err();

    let err = Error::from(request_error);
    assert!(matches!(err, Error::Http(_)), "got: {err:?}");
    assert!(err.to_string().starts_with("HTTP client error"));
    assert!(!err.is_retryable());
}

#[test]
fn client_builds_from_each_provider_config() {
    assert!(LlmClient::from_config(&openai_config("http://localhost:1")).is_ok());
    assert!(LlmClient::from_config(&anthropic_config("http://localhost:1")).is_ok());
    assert!(LlmClient::from_config(&ollama_config("http://localhost:1")).is_ok());
}

#[test]
fn openai_requires_api_key() {
    let config = Config {
        api_key: None,
        ..openai_config("http://localhost:1")
    };
    assert!(LlmClient::from_config(&config).is_err());
}

// ─── Anthropic ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn anthropic_sends_vision_request() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/messages"))
        .and(header("x-api-key", "test-key"))
        .and(header("anthropic-version", "2023-06-01"))
        .and(body_partial_json(json!({
            "model": "claude-3-haiku-20240307",
            "max_tokens": 1024
        })))
        .and(body_string_contains("\"media_type\":\"image/png\""))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "msg_1",
            "type": "message",
            "content": [
                {"type": "text", "text": "{\"a\":"},
                {"type": "text", "text": "1}"}
            ],
            "stop_reason": "end_turn"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let raw = complete(&anthropic_config(&server.uri()), "Bob had soda")
        .await
        .unwrap();
    assert_eq!(raw, "{\"a\":1}");
}

#[tokio::test]
async fn anthropic_overloaded_is_retryable() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/messages"))
        .respond_with(ResponseTemplate::new(529).set_body_string("overloaded"))
        .mount(&server)
        .await;

    let err = complete(&anthropic_config(&server.uri()), "").await.unwrap_err();
    match err {
        Error::ProviderUnavailable { provider, .. } => assert_eq!(provider, "anthropic"),
        other => panic!("expected ProviderUnavailable, got: {other:?}"),
    }
}

#[tokio::test]
async fn anthropic_max_tokens_stop_is_malformed() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "content": [{"type": "text", "text": "{\"bill_item\":"}],
            "stop_reason": "max_tokens"
        })))
        .mount(&server)
        .await;

    let err = complete(&anthropic_config(&server.uri()), "").await.unwrap_err();
    assert!(matches!(err, Error::MalformedExtraction(_)), "got: {err:?}");
}

#[test]
fn anthropic_requires_api_key() {
    let config = Config {
        api_key: Some(String::new()),
        ..anthropic_config("http://localhost:1")
    };
    assert!(LlmClient::from_config(&config).is_err());
}

// ─── Ollama ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn ollama_sends_bare_base64_image() {
    let server = MockServer::start().await;
    let image = png();

    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .and(body_partial_json(json!({
            "model": "llava:7b",
            "stream": false,
            "format": "json"
        })))
        .and(body_string_contains(format!("\"images\":[\"{}\"]", image.data)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "model": "llava:7b",
            "message": {"role": "assistant", "content": " {\"x\":2} "},
            "done": true
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = LlmClient::from_config(&ollama_config(&server.uri())).unwrap();
    let raw = client
        .complete(&ExtractionPrompt::new("", &image))
        .await
        .unwrap();
    assert_eq!(raw, "{\"x\":2}");
}

#[tokio::test]
async fn ollama_trailing_slash_in_host() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "message": {"role": "assistant", "content": "{}"},
            "done": true
        })))
        .expect(1)
        .mount(&server)
        .await;

    let config = ollama_config(&format!("{}/", server.uri()));
    assert_eq!(complete(&config, "").await.unwrap(), "{}");
}

#[tokio::test]
async fn ollama_incomplete_reply_is_malformed() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "message": {"role": "assistant", "content": "{\"bill"},
            "done": false
        })))
        .mount(&server)
        .await;

    let err = complete(&ollama_config(&server.uri()), "").await.unwrap_err();
    assert!(matches!(err, Error::MalformedExtraction(_)), "got: {err:?}");
}

#[tokio::test]
async fn ollama_connection_refused_is_retryable() {
    // Port 1 is almost certainly closed
    let err = complete(&ollama_config("http://127.0.0.1:1"), "")
        .await
        .unwrap_err();
    assert!(matches!(err, Error::ProviderUnavailable { .. }), "got: {err:?}");
}

// ─── Extraction pipeline ─────────────────────────────────────────────────────

fn extractor(server_url: &str, max_attempts: u32) -> BillExtractor {
    let config = Config {
        max_attempts,
        ..openai_config(server_url)
    };
    BillExtractor::from_config(&config).unwrap()
}

#[tokio::test]
async fn extract_and_split_end_to_end() {
    let server = MockServer::start().await;

    let fenced = format!("```json\n{}\n```", pizza_extraction());
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(openai_reply(&fenced)))
        .expect(1)
        .mount(&server)
        .await;

    let (bill, calc) = extractor(&server.uri(), 3)
        .extract_and_split("Alice had pizza, Bob had pizza and soda", &png())
        .await
        .unwrap();

    assert_eq!(bill.bill_item.currency, "Dollars");
    assert_eq!(calc.total_amount, money("12.00"));
    let alice = calc
        .per_person_split
        .iter()
        .find(|p| p.name == "Alice")
        .unwrap();
    assert_eq!(alice.amount, money("5.00"));
    let bob = calc.per_person_split.iter().find(|p| p.name == "Bob").unwrap();
    assert_eq!(bob.amount, money("7.00"));
}

#[tokio::test]
async fn malformed_output_is_retried() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(openai_reply("Sorry, I can't read that.")),
        )
        .up_to_n_times(2)
        .expect(2)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(openai_reply(&pizza_extraction().to_string())),
        )
        .expect(1)
        .mount(&server)
        .await;

    let bill = extractor(&server.uri(), 5)
        .extract("", &png())
        .await
        .unwrap();
    assert_eq!(bill.people().len(), 2);
}

#[tokio::test]
async fn transient_provider_error_is_retried() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(503).set_body_string("unavailable"))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(openai_reply(&pizza_extraction().to_string())),
        )
        .expect(1)
        .mount(&server)
        .await;

    assert!(extractor(&server.uri(), 2).extract("", &png()).await.is_ok());
}

#[tokio::test]
async fn gives_up_after_max_attempts() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(openai_reply("not json")))
        .expect(3)
        .mount(&server)
        .await;

    let err = extractor(&server.uri(), 3)
        .extract("", &png())
        .await
        .unwrap_err();
    match err {
        Error::ExtractionFailed { attempts, last } => {
            assert_eq!(attempts, 3);
            assert!(matches!(*last, Error::MalformedExtraction(_)), "got: {last:?}");
        }
        other => panic!("expected ExtractionFailed, got: {other:?}"),
    }
}

#[tokio::test]
async fn client_errors_are_not_retried() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(400).set_body_string("bad request"))
        .expect(1)
        .mount(&server)
        .await;

    let err = extractor(&server.uri(), 5)
        .extract("", &png())
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Provider { .. }), "got: {err:?}");
}

#[tokio::test]
async fn validation_errors_are_not_retried() {
    let server = MockServer::start().await;

    let mut inconsistent = pizza_extraction();
    inconsistent["person"]["people"] = json!(["Alice", "Bob", "Carol"]);

    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(openai_reply(&inconsistent.to_string())),
        )
        .expect(1)
        .mount(&server)
        .await;

    let err = extractor(&server.uri(), 5)
        .extract_and_split("", &png())
        .await
        .unwrap_err();
    assert!(err.is_validation(), "got: {err:?}");
    match err {
        Error::PeopleMismatch { missing, .. } => assert_eq!(missing, vec!["Carol"]),
        other => panic!("expected PeopleMismatch, got: {other:?}"),
    }
}

//! Tests for the LLM client against a local stub endpoint.

use axum::{
    Json, Router,
    http::{HeaderMap, StatusCode},
    routing::post,
};
use rival::{
    LlmClient, LlmConfig, LlmProvider, MoveResolver, MoveSource, RivalConfig, build_service,
};
use rival_tictactoe::{Board, Player};
use serde_json::{Value, json};
use std::time::Duration;

/// Echoes the model, token budget, auth header and prompt back as content.
async fn echo_chat(headers: HeaderMap, Json(body): Json<Value>) -> Json<Value> {
    let auth = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("none");
    let content = format!(
        "{}|{}|{}|{}",
        body["model"].as_str().unwrap_or_default(),
        body["max_tokens"],
        auth,
        body["messages"][0]["content"].as_str().unwrap_or_default()
    );
    Json(json!({ "choices": [{ "message": { "role": "assistant", "content": content } }] }))
}

async fn suggest_five() -> Json<Value> {
    Json(json!({ "choices": [{ "message": { "content": "5" } }] }))
}

async fn server_error() -> (StatusCode, &'static str) {
    (StatusCode::INTERNAL_SERVER_ERROR, "boom")
}

async fn not_json() -> &'static str {
    "definitely not json"
}

async fn no_choices() -> Json<Value> {
    Json(json!({ "choices": [] }))
}

async fn slow() -> Json<Value> {
    tokio::time::sleep(Duration::from_secs(5)).await;
    suggest_five().await
}

async fn anthropic(headers: HeaderMap, Json(body): Json<Value>) -> (StatusCode, Json<Value>) {
    if headers.get("x-api-key").and_then(|v| v.to_str().ok()) != Some("test-key")
        || headers.get("anthropic-version").is_none()
    {
        return (StatusCode::UNAUTHORIZED, Json(json!({ "error": "bad key" })));
    }
    let model = body["model"].as_str().unwrap_or_default().to_string();
    (
        StatusCode::OK,
        Json(json!({ "content": [{ "type": "text", "text": format!("3 from {}", model) }] })),
    )
}

/// Starts the stub on an ephemeral port and returns its base URL.
async fn start_stub() -> String {
    let app = Router::new()
        .route("/chat", post(echo_chat))
        .route("/five", post(suggest_five))
        .route("/error", post(server_error))
        .route("/garbage", post(not_json))
        .route("/empty", post(no_choices))
        .route("/slow", post(slow))
        .route("/v1/messages", post(anthropic));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

fn chat_config(provider: LlmProvider, endpoint: String) -> LlmConfig {
    LlmConfig::new(provider, None, "stub-model".to_string(), 16).with_endpoint(endpoint)
}

#[tokio::test]
async fn test_chat_completion_round_trip() {
    let base = start_stub().await;
    let client =
        LlmClient::new(chat_config(LlmProvider::Blackbox, format!("{}/chat", base))).unwrap();

    let content = client.generate("pick a cell").await.unwrap();
    assert_eq!(content, "stub-model|16|none|pick a cell");
}

#[tokio::test]
async fn test_openai_sends_bearer_token() {
    let base = start_stub().await;
    let config = LlmConfig::new(
        LlmProvider::OpenAI,
        Some("sk-test".to_string()),
        "gpt-4o-mini".to_string(),
        8,
    )
    .with_endpoint(format!("{}/chat", base));
    let client = LlmClient::new(config).unwrap();

    let content = client.generate("hi").await.unwrap();
    assert_eq!(content, "gpt-4o-mini|8|Bearer sk-test|hi");
}

#[tokio::test]
async fn test_anthropic_messages_api() {
    let base = start_stub().await;
    let config = LlmConfig::new(
        LlmProvider::Anthropic,
        Some("test-key".to_string()),
        "claude-test".to_string(),
        8,
    )
    .with_endpoint(format!("{}/v1/messages", base));
    let client = LlmClient::new(config).unwrap();

    assert_eq!(client.generate("hi").await.unwrap(), "3 from claude-test");
}

#[tokio::test]
async fn test_anthropic_without_key_fails_before_sending() {
    let config = LlmConfig::new(LlmProvider::Anthropic, None, "claude-test".to_string(), 8)
        .with_endpoint("http://127.0.0.1:9/never");
    let client = LlmClient::new(config).unwrap();

    let err = client.generate("hi").await.unwrap_err();
    assert!(err.message.contains("API key"));
}

#[tokio::test]
async fn test_non_success_status_is_error() {
    let base = start_stub().await;
    let client =
        LlmClient::new(chat_config(LlmProvider::Blackbox, format!("{}/error", base))).unwrap();

    let err = client.generate("hi").await.unwrap_err();
    assert!(err.message.contains("500"));
    assert!(err.message.contains("boom"));
}

#[tokio::test]
async fn test_unparseable_body_is_error() {
    let base = start_stub().await;
    let client =
        LlmClient::new(chat_config(LlmProvider::Blackbox, format!("{}/garbage", base))).unwrap();

    let err = client.generate("hi").await.unwrap_err();
    assert!(err.message.contains("parse"));
}

#[tokio::test]
async fn test_missing_content_is_error() {
    let base = start_stub().await;
    let client =
        LlmClient::new(chat_config(LlmProvider::Blackbox, format!("{}/empty", base))).unwrap();

    let err = client.generate("hi").await.unwrap_err();
    assert!(err.message.contains("No content"));
}

#[tokio::test]
async fn test_timeout_is_error() {
    let base = start_stub().await;
    let config = chat_config(LlmProvider::Blackbox, format!("{}/slow", base))
        .with_timeout(Duration::from_millis(200));
    let client = LlmClient::new(config).unwrap();

    assert!(client.generate("hi").await.is_err());
}

#[tokio::test]
async fn test_unreachable_endpoint_is_error() {
    let client = LlmClient::new(chat_config(
        LlmProvider::Blackbox,
        "http://127.0.0.1:9/chat".to_string(),
    ))
    .unwrap();
    assert!(client.generate("hi").await.is_err());
}

#[tokio::test]
async fn test_offline_provider_never_answers() {
    let service = build_service(chat_config(LlmProvider::Offline, String::new())).unwrap();
    assert_eq!(service.name(), "offline");
    assert!(service.suggest("hi").await.is_err());
}

#[tokio::test]
async fn test_resolver_uses_configured_endpoint() {
    let base = start_stub().await;
    let config = RivalConfig::default()
        .with_llm_endpoint(format!("{}/five", base))
        .with_request_timeout_secs(5);
    let service = build_service(config.create_llm_config().unwrap()).unwrap();
    assert_eq!(service.name(), "blackbox");

    let mut resolver = MoveResolver::with_seed(service, 1);
    let resolved = resolver
        .resolve_move(&Board::new(), Player::O)
        .await
        .unwrap();
    assert_eq!(resolved.index, 5);
    assert_eq!(resolved.source, MoveSource::Suggested);
}

#[tokio::test]
async fn test_resolver_falls_back_on_server_error() {
    let base = start_stub().await;
    let config = RivalConfig::default().with_llm_endpoint(format!("{}/error", base));
    let service = build_service(config.create_llm_config().unwrap()).unwrap();

    let mut resolver = MoveResolver::with_seed(service, 1);
    let board: Board = "XO. ... ...".parse().unwrap();
    let resolved = resolver.resolve_move(&board, Player::X).await.unwrap();
    assert_eq!(resolved.source, MoveSource::Fallback);
    assert!(board.is_empty(resolved.index));
}

#[tokio::test]
#[cfg_attr(not(feature = "api"), ignore)]
async fn test_live_blackbox_suggestion() {
    dotenvy::dotenv().ok();

    let config = RivalConfig::default().with_request_timeout_secs(30);
    let service = build_service(config.create_llm_config().unwrap()).unwrap();
    let board: Board = "X.. .O. ...".parse().unwrap();

    let text = service
        .suggest(&rival::build_prompt(&board, Player::X))
        .await
        .expect("Blackbox request failed");
    println!("Blackbox answered: {:?}", text);
    assert!(!text.trim().is_empty());
}

//! WhisperBot client against a mocked inference provider.

use serde_json::json;
use wall_service::config::ChatConfig;
use wall_service::services::inference::{NO_SUGGESTION_REPLY, OFFLINE_REPLY};
use wall_service::services::{ChatClient, ChatError};
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer) -> ChatClient {
    let config = ChatConfig {
        api_url: format!("{}/v1/chat/completions", server.uri()),
        api_key: Some("test-key".to_string()),
        suggest_api_url: format!("{}/models/gpt2", server.uri()),
        timeout_ms: 2_000,
        ..ChatConfig::default()
    };
    ChatClient::new(config).expect("client")
}

#[tokio::test]
async fn chat_reply_is_cleaned_of_reasoning() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(header("authorization", "Bearer test-key"))
        .and(body_partial_json(json!({
            "model": "deepseek-ai/DeepSeek-R1:novita",
            "max_tokens": 120,
            "messages": [
                { "role": "system" },
                { "role": "user", "content": "why is the sky blue?" }
            ]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{
                "message": {
                    "role": "assistant",
                    "content": "<think>\nphysics, probably\n</think>\nBecause it saw your code."
                }
            }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let reply = client.reply("why is the sky blue?").await.expect("reply");
    assert_eq!(reply, "Because it saw your code.");
}

#[tokio::test]
async fn chat_without_choices_reports_no_response() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "choices": [] })))
        .mount(&server)
        .await;

    let client = client_for(&server);
    assert_eq!(
        client.reply("hello").await.expect("reply"),
        "No response from the model."
    );
}

#[tokio::test]
async fn upstream_failure_falls_back_to_offline_reply() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let client = client_for(&server);
    assert!(matches!(client.reply("hello").await, Err(ChatError::Status(503))));
    assert_eq!(client.reply_or_fallback("hello").await, OFFLINE_REPLY);
}

#[tokio::test]
async fn suggestion_strips_echoed_prompt() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/models/gpt2"))
        .and(body_partial_json(json!({
            "inputs": "Suggest a funny anonymous post idea about exams",
            "parameters": { "max_new_tokens": 50 }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
            "generated_text": "Suggest a funny anonymous post idea about exams: confessing you studied the wrong syllabus."
        }])))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let suggestion = client.suggest("exams").await.expect("suggestion");
    assert_eq!(suggestion, ": confessing you studied the wrong syllabus.");
}

#[tokio::test]
async fn empty_generation_falls_back() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/models/gpt2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
            "generated_text": "Suggest a funny anonymous post idea about cats"
        }])))
        .mount(&server)
        .await;

    let client = client_for(&server);
    assert!(matches!(client.suggest("cats").await, Err(ChatError::Decode(_))));
    assert_eq!(client.suggest_or_fallback("cats").await, NO_SUGGESTION_REPLY);
}

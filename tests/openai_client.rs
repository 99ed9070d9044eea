//! OpenAI client against a local chat-completions stand-in

mod common;

use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::routing::post;
use axum::{Json, Router};
use serde_json::{Value, json};
use tripmate::config::{HttpConfig, LlmConfig};
use tripmate::llm::{ChatMessage, CompletionRequest, LlmClient, OpenAiClient};
use tripmate::TripMateError;

async fn completions(headers: HeaderMap, Json(body): Json<Value>) -> impl IntoResponse {
    if headers.get("authorization").and_then(|v| v.to_str().ok()) != Some("Bearer sk-test-key-123") {
        return (StatusCode::UNAUTHORIZED, Json(json!({"error": {"message": "bad key"}}))).into_response();
    }

    let last = body["messages"].as_array().and_then(|m| m.last()).cloned().unwrap_or_default();
    if last["role"] == "tool" {
        return Json(json!({
            "id": "chatcmpl-2",
            "choices": [{
                "index": 0,
                "message": {"role": "assistant", "content": format!("Got: {}", last["content"].as_str().unwrap_or(""))},
                "finish_reason": "stop"
            }],
            "usage": {"prompt_tokens": 40, "completion_tokens": 6, "total_tokens": 46}
        }))
        .into_response();
    }

    if body["tools"].is_array() {
        return Json(json!({
            "id": "chatcmpl-1",
            "choices": [{
                "index": 0,
                "message": {
                    "role": "assistant",
                    "content": null,
                    "tool_calls": [{
                        "id": "call_1",
                        "type": "function",
                        "function": {"name": "get_weather_forecast", "arguments": "{\"location\":\"Rome\",\"start_date\":\"2026-10-20\"}"}
                    }]
                },
                "finish_reason": "tool_calls"
            }]
        }))
        .into_response();
    }

    (StatusCode::INTERNAL_SERVER_ERROR, "model overloaded").into_response()
}

async fn client(key: &str) -> OpenAiClient {
    let base = common::spawn(Router::new().route("/v1/chat/completions", post(completions))).await;
    let config = LlmConfig {
        api_key: Some(key.to_string()),
        base_url: format!("{base}/v1"),
        ..LlmConfig::default()
    };
    OpenAiClient::new(&config, &HttpConfig::default()).unwrap()
}

fn weather_tool() -> tripmate::llm::ToolDefinition {
    tripmate::agent::tools::definitions(false, 16).remove(0)
}

#[tokio::test]
async fn test_tool_call_round_trip() {
    let client = client("sk-test-key-123").await;

    let mut messages = vec![ChatMessage::system("travel"), ChatMessage::user("Rome tomorrow?")];
    let first = client
        .complete(CompletionRequest {
            messages: messages.clone(),
            tools: vec![weather_tool()],
            temperature: None,
        })
        .await
        .unwrap();
    assert!(first.wants_tools());
    assert_eq!(first.finish_reason.as_deref(), Some("tool_calls"));
    let call = first.tool_calls[0].clone();
    assert_eq!(call.name, "get_weather_forecast");

    messages.push(ChatMessage::assistant_tool_calls(None, vec![call.clone()]));
    messages.push(ChatMessage::tool_result(&call.id, "sunny"));
    let second = client
        .complete(CompletionRequest {
            messages,
            tools: vec![weather_tool()],
            temperature: Some(0.2),
        })
        .await
        .unwrap();
    assert_eq!(second.content.as_deref(), Some("Got: sunny"));
    assert_eq!(second.usage.completion_tokens, 6);
}

#[tokio::test]
async fn test_server_error_is_service_unavailable() {
    let client = client("sk-test-key-123").await;
    let err = client
        .complete(CompletionRequest {
            messages: vec![ChatMessage::user("hi")],
            ..CompletionRequest::default()
        })
        .await
        .unwrap_err();
    assert!(err.is_service_unavailable());
    assert!(err.to_string().contains("model overloaded"));
}

#[tokio::test]
async fn test_bad_key_is_service_unavailable() {
    let client = client("sk-wrong-key-000").await;
    let err = client
        .complete(CompletionRequest {
            messages: vec![ChatMessage::user("hi")],
            tools: vec![weather_tool()],
            temperature: None,
        })
        .await
        .unwrap_err();
    assert!(matches!(err, TripMateError::ServiceUnavailable { .. }));
}

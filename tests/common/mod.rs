#![allow(dead_code)]

use async_trait::async_trait;
use axum::Router;
use std::collections::VecDeque;
use std::sync::Mutex;
use tripmate::TripMateConfig;
use tripmate::llm::{CompletionRequest, CompletionResponse, LlmClient, ToolCallRequest};

/// Serve `router` on an ephemeral local port and return its base URL
pub async fn spawn(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{addr}")
}

/// Address nothing listens on
pub const UNREACHABLE: &str = "http://127.0.0.1:1";

pub fn test_config() -> TripMateConfig {
    let mut config = TripMateConfig::default();
    config.llm.api_key = Some("sk-test-key-123".to_string());
    config.weather.timeout_seconds = 5;
    config.events.timeout_seconds = 5;
    config
}

/// Language model that replays canned responses and keeps every request
#[derive(Default)]
pub struct ScriptedLlm {
    script: Mutex<VecDeque<tripmate::Result<CompletionResponse>>>,
    requests: Mutex<Vec<CompletionRequest>>,
}

impl ScriptedLlm {
    pub fn new(script: Vec<tripmate::Result<CompletionResponse>>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            requests: Mutex::default(),
        }
    }

    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl LlmClient for ScriptedLlm {
    async fn complete(&self, request: CompletionRequest) -> tripmate::Result<CompletionResponse> {
        let turn = self.requests.lock().unwrap().len();
        self.requests.lock().unwrap().push(request);
        self.script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(CompletionResponse::text(format!("reply {turn}"))))
    }
}

pub fn tool_call(name: &str, arguments: &str) -> tripmate::Result<CompletionResponse> {
    Ok(CompletionResponse {
        tool_calls: vec![ToolCallRequest {
            id: format!("call_{name}"),
            name: name.to_string(),
            arguments: arguments.to_string(),
        }],
        finish_reason: Some("tool_calls".to_string()),
        ..CompletionResponse::default()
    })
}

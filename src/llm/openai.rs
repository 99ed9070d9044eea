//! OpenAI Chat Completions client
//!
//! Works against any API that speaks the `/chat/completions` wire format
//! with function tools.

use async_trait::async_trait;
use reqwest_middleware::ClientWithMiddleware;
use serde::Deserialize;
use serde_json::{Value, json};
use std::time::Instant;
use tracing::{debug, info, instrument};

use super::{ChatMessage, CompletionRequest, CompletionResponse, LlmClient, Role, TokenUsage, ToolCallRequest};
use crate::config::{HttpConfig, LlmConfig};
use crate::{TripMateError, http};

const SERVICE: &str = "language model";

pub struct OpenAiClient {
    client: ClientWithMiddleware,
    api_key: String,
    base_url: String,
    model: String,
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct ChatCompletion {
    #[serde(default)]
    choices: Vec<Choice>,
    #[serde(default)]
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
    #[serde(default)]
    tool_calls: Option<Vec<WireToolCall>>,
}

#[derive(Debug, Deserialize)]
struct WireToolCall {
    id: String,
    function: WireFunction,
}

#[derive(Debug, Deserialize)]
struct WireFunction {
    name: String,
    #[serde(default)]
    arguments: String,
}

#[derive(Debug, Deserialize)]
struct Usage {
    #[serde(default)]
    prompt_tokens: u64,
    #[serde(default)]
    completion_tokens: u64,
}

impl OpenAiClient {
    pub fn new(config: &LlmConfig, http_config: &HttpConfig) -> crate::Result<Self> {
        let api_key = config
            .api_key
            .clone()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| TripMateError::config("OpenAI API key is required"))?;

        Ok(Self {
            client: http::build_client(http_config, config.timeout_seconds)?,
            api_key,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            temperature: config.temperature,
        })
    }

    fn build_request_body(&self, request: &CompletionRequest) -> Value {
        let messages: Vec<Value> = request.messages.iter().map(message_to_wire).collect();

        let mut body = json!({
            "model": self.model,
            "messages": messages,
            "temperature": request.temperature.unwrap_or(self.temperature),
        });

        if !request.tools.is_empty() {
            let tools: Vec<Value> = request
                .tools
                .iter()
                .map(|t| {
                    json!({
                        "type": "function",
                        "function": {
                            "name": t.name,
                            "description": t.description,
                            "parameters": t.parameters,
                        }
                    })
                })
                .collect();
            body["tools"] = json!(tools);
            body["tool_choice"] = json!("auto");
        }

        body
    }
}

fn message_to_wire(message: &ChatMessage) -> Value {
    let role = match message.role {
        Role::System => "system",
        Role::User => "user",
        Role::Assistant => "assistant",
        Role::Tool => "tool",
    };

    let mut wire = json!({
        "role": role,
        "content": message.content,
    });

    if !message.tool_calls.is_empty() {
        wire["tool_calls"] = message
            .tool_calls
            .iter()
            .map(|tc| {
                json!({
                    "id": tc.id,
                    "type": "function",
                    "function": {"name": tc.name, "arguments": tc.arguments},
                })
            })
            .collect();
    }
    if let Some(id) = &message.tool_call_id {
        wire["tool_call_id"] = json!(id);
    }

    wire
}

fn parse_completion(completion: ChatCompletion) -> crate::Result<CompletionResponse> {
    let choice = completion
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| TripMateError::llm("response contained no choices"))?;

    let tool_calls = choice
        .message
        .tool_calls
        .unwrap_or_default()
        .into_iter()
        .map(|tc| ToolCallRequest {
            id: tc.id,
            name: tc.function.name,
            arguments: tc.function.arguments,
        })
        .collect();

    Ok(CompletionResponse {
        content: choice.message.content,
        tool_calls,
        finish_reason: choice.finish_reason,
        usage: completion
            .usage
            .map(|u| TokenUsage {
                prompt_tokens: u.prompt_tokens,
                completion_tokens: u.completion_tokens,
            })
            .unwrap_or_default(),
    })
}

#[async_trait]
impl LlmClient for OpenAiClient {
    #[instrument(skip(self, request), fields(model = %self.model, messages = request.messages.len(), tools = request.tools.len()))]
    async fn complete(&self, request: CompletionRequest) -> crate::Result<CompletionResponse> {
        let url = format!("{}/chat/completions", self.base_url);
        let body = self.build_request_body(&request);

        let start_time = Instant::now();
        let response = http::send(
            SERVICE,
            self.client
                .post(url)
                .bearer_auth(&self.api_key)
                .json(&body),
        )
        .await?;
        let completion: ChatCompletion = http::read_json(SERVICE, response).await?;
        let parsed = parse_completion(completion)?;

        debug!(
            finish_reason = parsed.finish_reason.as_deref().unwrap_or("none"),
            tool_calls = parsed.tool_calls.len(),
            "completion parsed"
        );
        info!(
            "Completion finished in {:.3}s ({} prompt / {} completion tokens)",
            start_time.elapsed().as_secs_f64(),
            parsed.usage.prompt_tokens,
            parsed.usage.completion_tokens
        );
        Ok(parsed)
    }
}

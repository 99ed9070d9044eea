//! Planning agent
//!
//! Runs one chat turn: the model sees the system prompt, the recent
//! conversation and the user's message, may call the weather and events
//! tools, and eventually answers in text. The exchange is recorded in the
//! session's conversation whatever the outcome.

use chrono::{Local, NaiveDate};
use opentelemetry::KeyValue;
use opentelemetry::global;
use opentelemetry::metrics::Counter;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, error, info, instrument, warn};

use crate::config::TripMateConfig;
use crate::dates;
use crate::events::{EventProvider, EventsClient};
use crate::llm::{ChatMessage, CompletionRequest, LlmClient, OpenAiClient, ToolCallRequest, ToolDefinition};
use crate::models::TripQuery;
use crate::session::ConversationState;
use crate::weather::{WeatherClient, WeatherProvider};

pub mod prompt;
pub mod tools;

pub use tools::{ToolCall, ToolInvocation, ToolStatus};

const EMPTY_REPLY: &str = "I'm sorry, I couldn't put together an answer. Could you rephrase your request?";

/// Reply of one turn plus the tools used to produce it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TurnOutcome {
    pub reply: String,
    pub tools: Vec<ToolInvocation>,
}

#[derive(Debug, Clone)]
struct AgentSettings {
    temperature: f32,
    max_tool_rounds: u32,
    history_window: usize,
    max_forecast_days: u32,
}

struct AgentMetrics {
    turns: Counter<u64>,
    tool_calls: Counter<u64>,
}

impl AgentMetrics {
    fn new() -> Self {
        let meter = global::meter("tripmate");
        Self {
            turns: meter
                .u64_counter("tripmate.agent.turns")
                .with_description("Chat turns handled by the planning agent")
                .build(),
            tool_calls: meter
                .u64_counter("tripmate.agent.tool_calls")
                .with_description("Tool calls requested by the language model")
                .build(),
        }
    }
}

pub struct PlanningAgent {
    llm: Arc<dyn LlmClient>,
    weather: Arc<dyn WeatherProvider>,
    events: Option<Arc<dyn EventProvider>>,
    settings: AgentSettings,
    today: Option<NaiveDate>,
    metrics: AgentMetrics,
}

impl PlanningAgent {
    pub fn new(
        llm: Arc<dyn LlmClient>,
        weather: Arc<dyn WeatherProvider>,
        events: Option<Arc<dyn EventProvider>>,
        config: &TripMateConfig,
    ) -> Self {
        Self {
            llm,
            weather,
            events,
            settings: AgentSettings {
                temperature: config.llm.temperature,
                max_tool_rounds: config.llm.max_tool_rounds.max(1),
                history_window: config.llm.history_window,
                max_forecast_days: config.weather.max_forecast_days,
            },
            today: None,
            metrics: AgentMetrics::new(),
        }
    }

    /// Agent wired to the real OpenAI, `OpenMeteo` and Ticketmaster clients
    pub fn from_config(config: &TripMateConfig) -> crate::Result<Self> {
        let llm = Arc::new(OpenAiClient::new(&config.llm, &config.http)?);
        let weather = Arc::new(WeatherClient::new(&config.weather, &config.http)?);
        let events = EventsClient::from_config(&config.events, &config.http)?
            .map(|client| Arc::new(client) as Arc<dyn EventProvider>);
        Ok(Self::new(llm, weather, events, config))
    }

    /// Pin "today" instead of reading the local clock
    #[must_use]
    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = Some(today);
        self
    }

    #[must_use]
    pub fn events_enabled(&self) -> bool {
        self.events.is_some()
    }

    fn today(&self) -> NaiveDate {
        self.today.unwrap_or_else(|| Local::now().date_naive())
    }

    /// Handle a trip form by sending its rendered request through a normal turn
    pub async fn plan(&self, state: &mut ConversationState, query: &TripQuery) -> TurnOutcome {
        self.respond(state, &query.to_prompt()).await
    }

    /// Run one chat turn and record the exchange
    #[instrument(skip(self, state, message), fields(history = state.len()))]
    pub async fn respond(&self, state: &mut ConversationState, message: &str) -> TurnOutcome {
        let today = self.today();
        let mut system = prompt::system_prompt(today, self.events_enabled(), self.settings.max_forecast_days);
        if let Some(range) = dates::find_date_range(message, today) {
            debug!(%range, "resolved dates in message");
            system.push_str("\n\n");
            system.push_str(&prompt::date_hint(&range));
        }

        let mut messages = Vec::with_capacity(2 * self.settings.history_window + 2);
        messages.push(ChatMessage::system(system));
        messages.extend(state.recent_messages(self.settings.history_window));
        messages.push(ChatMessage::user(message));

        let tools = tools::definitions(self.events_enabled(), self.settings.max_forecast_days);
        let mut invocations = Vec::new();
        let mut failures = Vec::new();
        let mut reply = None;

        for round in 1..=self.settings.max_tool_rounds {
            let final_round = round == self.settings.max_tool_rounds;
            let request = CompletionRequest {
                messages: messages.clone(),
                tools: if final_round { Vec::new() } else { tools.clone() },
                temperature: Some(self.settings.temperature),
            };

            let response = match self.llm.complete(request).await {
                Ok(response) => response,
                Err(e) => {
                    error!(round, error = %e, "language model request failed");
                    reply = Some(format!("I encountered an error: {e}"));
                    break;
                }
            };

            if final_round || !response.wants_tools() {
                if response.wants_tools() {
                    warn!(round, "model requested tools after the round limit");
                }
                reply = response.content.filter(|c| !c.trim().is_empty());
                break;
            }

            debug!(round, calls = response.tool_calls.len(), "model requested tools");
            messages.push(ChatMessage::assistant_tool_calls(
                response.content.clone(),
                response.tool_calls.clone(),
            ));
            for request in &response.tool_calls {
                let (invocation, result, failure) = self.execute(request, &tools).await;
                self.metrics.tool_calls.add(
                    1,
                    &[
                        KeyValue::new("tool", invocation.tool.clone()),
                        KeyValue::new("status", status_label(invocation.status)),
                    ],
                );
                messages.push(ChatMessage::tool_result(&request.id, result));
                invocations.push(invocation);
                failures.extend(failure);
            }
        }

        let mut reply = reply.unwrap_or_else(|| EMPTY_REPLY.to_string());
        for failure in &failures {
            reply.push_str("\n\n");
            reply.push_str(failure);
        }

        state.record(message, reply.clone());
        self.metrics.turns.add(
            1,
            &[KeyValue::new("tool_failures", i64::try_from(failures.len()).unwrap_or(i64::MAX))],
        );
        info!(
            tools = invocations.len(),
            failures = failures.len(),
            exchanges = state.len(),
            "turn complete"
        );

        TurnOutcome {
            reply,
            tools: invocations,
        }
    }

    /// Validate and run one requested tool
    ///
    /// Returns the report, the text fed back to the model and, for failed
    /// lookups, the notice appended to the user's reply.
    async fn execute(
        &self,
        request: &ToolCallRequest,
        offered: &[ToolDefinition],
    ) -> (ToolInvocation, String, Option<String>) {
        let arguments = serde_json::from_str(&request.arguments)
            .unwrap_or_else(|_| serde_json::Value::String(request.arguments.clone()));
        let mut invocation = ToolInvocation {
            tool: request.name.clone(),
            arguments,
            status: ToolStatus::Ok,
            error: None,
        };

        let parsed = if offered.iter().any(|t| t.name == request.name) {
            ToolCall::parse(&request.name, &request.arguments, self.settings.max_forecast_days as usize)
        } else {
            Err(crate::TripMateError::validation(format!("tool '{}' is not available", request.name)))
        };

        let call = match parsed {
            Ok(call) => call,
            Err(e) => {
                warn!(tool = %request.name, error = %e, "rejected tool arguments");
                invocation.status = ToolStatus::Rejected;
                invocation.error = Some(e.to_string());
                let result = format!("Error: {e}. Correct the arguments or ask the user for the missing details.");
                return (invocation, result, None);
            }
        };

        let result = match &call {
            ToolCall::WeatherLookup { location, range } => self
                .weather
                .forecast(location, range)
                .await
                .map(|forecast| forecast.to_summary()),
            ToolCall::EventsLookup {
                location,
                range,
                category,
            } => match &self.events {
                Some(events) => events
                    .find_events(location, range, category.as_deref())
                    .await
                    .map(|list| list.to_summary(location, range)),
                None => Err(crate::TripMateError::validation("events lookups are not configured")),
            },
        };

        match result {
            Ok(summary) => {
                info!(tool = call.name(), "tool call succeeded");
                (invocation, summary, None)
            }
            Err(e) => {
                warn!(tool = call.name(), error = %e, "tool call failed");
                invocation.status = ToolStatus::Failed;
                invocation.error = Some(e.to_string());
                let notice = format!("Note: the {} failed: {}", call.describe(), e.user_message());
                (invocation, format!("Error: the {} failed: {e}", call.describe()), Some(notice))
            }
        }
    }
}

fn status_label(status: ToolStatus) -> &'static str {
    match status {
        ToolStatus::Ok => "ok",
        ToolStatus::Failed => "failed",
        ToolStatus::Rejected => "rejected",
    }
}

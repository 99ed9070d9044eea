//! `TripMate` - Conversational travel planning assistant
//!
//! This library provides the weather and events clients, the LLM planning
//! agent that decides when to call them, session-scoped conversation state
//! and the web API that ties them together.

pub mod agent;
pub mod api;
pub mod config;
pub mod dates;
pub mod error;
pub mod events;
pub mod http;
pub mod llm;
pub mod models;
pub mod session;
pub mod telemetry;
pub mod terminal;
pub mod weather;
pub mod web;

// Re-export core types for public API
pub use agent::{PlanningAgent, ToolCall, ToolInvocation, ToolStatus, TurnOutcome};
pub use api::AppState;
pub use config::TripMateConfig;
pub use error::TripMateError;
pub use events::{EventProvider, EventsClient};
pub use llm::{LlmClient, OpenAiClient};
pub use models::{DateRange, Event, EventList, Location, TripQuery, WeatherForecast};
pub use session::{ConversationState, SessionId, SessionStore};
pub use weather::{WeatherClient, WeatherProvider};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Core result type used throughout the library
pub type Result<T> = std::result::Result<T, TripMateError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }
}

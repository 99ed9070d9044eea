//! Planning agent turns with a scripted model and real HTTP clients

mod common;

use chrono::NaiveDate;
use common::{ScriptedLlm, UNREACHABLE, test_config, tool_call};
use rstest::rstest;
use std::sync::Arc;
use tripmate::agent::tools::WEATHER_TOOL;
use tripmate::llm::CompletionResponse;
use tripmate::{ConversationState, EventProvider, PlanningAgent, ToolStatus, WeatherClient, terminal};

fn agent_with(llm: Arc<ScriptedLlm>, weather_base: &str) -> PlanningAgent {
    let mut config = test_config();
    config.weather.forecast_url = format!("{weather_base}/v1/forecast");
    config.weather.geocoding_url = format!("{weather_base}/v1/search");
    let weather = Arc::new(WeatherClient::new(&config.weather, &config.http).unwrap());
    PlanningAgent::new(llm, weather, None::<Arc<dyn EventProvider>>, &config)
        .with_today(NaiveDate::from_ymd_opt(2026, 10, 19).unwrap())
}

#[rstest]
#[case(1)]
#[case(3)]
#[case(8)]
#[tokio::test]
async fn test_n_turns_record_n_exchanges(#[case] turns: usize) {
    let llm = Arc::new(ScriptedLlm::default());
    let agent = agent_with(llm.clone(), UNREACHABLE);
    let mut state = ConversationState::new();

    for i in 0..turns {
        agent.respond(&mut state, &format!("message {i}")).await;
    }

    assert_eq!(state.len(), turns);
    for (i, exchange) in state.exchanges().iter().enumerate() {
        assert_eq!(exchange.user, format!("message {i}"));
        assert_eq!(exchange.assistant, format!("reply {i}"));
    }
    assert!(state.exchanges().windows(2).all(|w| w[0].at <= w[1].at));
    assert_eq!(llm.requests().len(), turns);
}

#[tokio::test]
async fn test_unreachable_weather_is_reported() {
    let llm = Arc::new(ScriptedLlm::new(vec![
        tool_call(
            WEATHER_TOOL,
            r#"{"location":"Lisbon","start_date":"2026-10-21","end_date":"2026-10-23"}"#,
        ),
        Ok(CompletionResponse::text("Lisbon is lovely in October.")),
    ]));
    let agent = agent_with(llm.clone(), UNREACHABLE);
    let mut state = ConversationState::new();

    let outcome = agent.respond(&mut state, "What's the weather in Lisbon this week?").await;

    assert_eq!(outcome.tools.len(), 1);
    assert_eq!(outcome.tools[0].status, ToolStatus::Failed);
    assert!(outcome.reply.contains("weather lookup for Lisbon"));
    assert!(outcome.reply.contains("failed"));
    assert!(outcome.reply.contains("currently unavailable"));

    let fed_back = llm.requests()[1].messages.last().unwrap().content.clone().unwrap();
    assert!(fed_back.starts_with("Error: the weather lookup for Lisbon"));
    assert_eq!(state.len(), 1);
}

#[tokio::test]
async fn test_llm_failure_still_recorded() {
    let llm = Arc::new(ScriptedLlm::new(vec![Err(tripmate::TripMateError::service_unavailable(
        "language model",
        "request failed: connection refused",
    ))]));
    let agent = agent_with(llm, UNREACHABLE);
    let mut state = ConversationState::new();

    let outcome = agent.respond(&mut state, "Plan Rome").await;
    assert!(outcome.reply.starts_with("I encountered an error:"));
    assert_eq!(state.exchanges()[0].assistant, outcome.reply);
}

#[tokio::test]
async fn test_terminal_conversation() {
    let llm = Arc::new(ScriptedLlm::default());
    let agent = agent_with(llm, UNREACHABLE);
    let input: &[u8] = b"Hello\n\nI want to see Oslo\nbye\nnever read\n";
    let mut output = Vec::new();

    let exchanges = terminal::run(&agent, input, &mut output).await.unwrap();
    let transcript = String::from_utf8(output).unwrap();

    assert_eq!(exchanges, 2);
    assert!(transcript.starts_with("TripMate: Hi! I'm your AI travel assistant."));
    assert!(transcript.contains("TripMate: reply 0"));
    assert!(transcript.contains("TripMate: reply 1"));
    assert!(transcript.contains("Safe travels!"));
}

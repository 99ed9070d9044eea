//! Tools offered to the language model and validation of their arguments

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::TripMateError;
use crate::llm::ToolDefinition;
use crate::models::DateRange;

pub const WEATHER_TOOL: &str = "get_weather_forecast";
pub const EVENTS_TOOL: &str = "find_events";

/// A validated tool invocation
#[derive(Debug, Clone, PartialEq)]
pub enum ToolCall {
    WeatherLookup {
        location: String,
        range: DateRange,
    },
    EventsLookup {
        location: String,
        range: DateRange,
        category: Option<String>,
    },
}

#[derive(Debug, Deserialize)]
struct LookupArgs {
    location: String,
    #[serde(alias = "date")]
    start_date: NaiveDate,
    #[serde(default)]
    end_date: Option<NaiveDate>,
    #[serde(default)]
    category: Option<String>,
}

impl ToolCall {
    /// Validate the model's raw JSON arguments into a typed call
    pub fn parse(name: &str, arguments: &str, max_days: usize) -> crate::Result<Self> {
        let args: LookupArgs = serde_json::from_str(if arguments.trim().is_empty() { "{}" } else { arguments })
            .map_err(|e| TripMateError::validation(format!("invalid arguments for {name}: {e}")))?;

        let location = args.location.trim().to_string();
        if location.is_empty() {
            return Err(TripMateError::validation(format!("{name} requires a non-empty location")));
        }
        let range = DateRange::new(args.start_date, args.end_date.unwrap_or(args.start_date))?;

        match name {
            WEATHER_TOOL => {
                if range.num_days() > max_days {
                    return Err(TripMateError::validation(format!(
                        "forecasts cover at most {max_days} days, {} requested",
                        range.num_days()
                    )));
                }
                Ok(ToolCall::WeatherLookup { location, range })
            }
            EVENTS_TOOL => Ok(ToolCall::EventsLookup {
                location,
                range,
                category: args.category.map(|c| c.trim().to_string()).filter(|c| !c.is_empty()),
            }),
            other => Err(TripMateError::validation(format!("unknown tool '{other}'"))),
        }
    }

    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            ToolCall::WeatherLookup { .. } => WEATHER_TOOL,
            ToolCall::EventsLookup { .. } => EVENTS_TOOL,
        }
    }

    /// What the lookup was for, used in failure notices
    #[must_use]
    pub fn describe(&self) -> String {
        match self {
            ToolCall::WeatherLookup { location, range } => format!("weather lookup for {location} ({range})"),
            ToolCall::EventsLookup { location, range, .. } => format!("events lookup for {location} ({range})"),
        }
    }
}

/// How a requested tool call ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToolStatus {
    Ok,
    Failed,
    /// Arguments did not validate; nothing was executed
    Rejected,
}

/// Report of one tool call made during a turn
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolInvocation {
    pub tool: String,
    pub arguments: serde_json::Value,
    pub status: ToolStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// JSON schemas of the tools the agent offers
#[must_use]
pub fn definitions(events_enabled: bool, max_forecast_days: u32) -> Vec<ToolDefinition> {
    let mut tools = vec![ToolDefinition {
        name: WEATHER_TOOL.to_string(),
        description: format!(
            "Get the daily weather forecast for a location and date range. \
Dates must be within the next {max_forecast_days} days."
        ),
        parameters: json!({
            "type": "object",
            "properties": {
                "location": {"type": "string", "description": "City name, optionally followed by a comma and the country"},
                "start_date": {"type": "string", "format": "date", "description": "First day, YYYY-MM-DD"},
                "end_date": {"type": "string", "format": "date", "description": "Last day, YYYY-MM-DD; defaults to start_date"}
            },
            "required": ["location", "start_date"]
        }),
    }];

    if events_enabled {
        tools.push(ToolDefinition {
            name: EVENTS_TOOL.to_string(),
            description: "Find concerts, sports, theatre and other events in a city for a date range.".to_string(),
            parameters: json!({
                "type": "object",
                "properties": {
                    "location": {"type": "string", "description": "City name"},
                    "start_date": {"type": "string", "format": "date", "description": "First day, YYYY-MM-DD"},
                    "end_date": {"type": "string", "format": "date", "description": "Last day, YYYY-MM-DD; defaults to start_date"},
                    "category": {"type": "string", "description": "Optional classification such as Music, Sports or Arts & Theatre"}
                },
                "required": ["location", "start_date"]
            }),
        });
    }

    tools
}

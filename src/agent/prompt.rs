use chrono::NaiveDate;

use crate::models::DateRange;

/// System prompt for one turn
#[must_use]
pub fn system_prompt(today: NaiveDate, events_enabled: bool, max_forecast_days: u32) -> String {
    let events_line = if events_enabled {
        "Use find_events to look up concerts, sports, shows and other events during the stay."
    } else {
        "Event listings are not available; suggest well-known attractions instead."
    };

    format!(
        "You are a helpful travel assistant that helps users plan their trips. \
You can provide weather forecasts, find events, and create detailed itineraries. \
Be friendly, informative, and provide useful recommendations.\n\n\
Use get_weather_forecast for weather; forecasts reach at most {max_forecast_days} days ahead. \
{events_line} \
If a lookup fails, tell the user it failed instead of guessing.\n\n\
Date handling:\n\
- Today is {today}.\n\
- When the user gives a date without a year, assume the next occurrence of that date.\n\
- Date ranges that cross into a new year (for example December to January) end in the following year.\n\
- Always confirm the dates you are planning for.\n\
- Pass dates to tools as YYYY-MM-DD.",
        today = today.format("%B %d, %Y"),
    )
}

/// Hint appended to the system prompt when the message names explicit dates
#[must_use]
pub fn date_hint(range: &DateRange) -> String {
    format!(
        "The user's latest message refers to {} through {} ({} days).",
        range.start().format("%Y-%m-%d"),
        range.end().format("%Y-%m-%d"),
        range.num_days()
    )
}

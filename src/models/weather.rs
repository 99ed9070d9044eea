//! Daily weather forecast model and display methods

use super::{DateRange, Location};
use chrono::{DateTime, FixedOffset, NaiveDate, Offset, Utc};
use serde::{Deserialize, Serialize};

/// Forecast summary for one calendar day
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct DailyForecast {
    pub date: NaiveDate,
    /// Maximum temperature in Celsius
    pub temperature_max: Option<f32>,
    /// Minimum temperature in Celsius
    pub temperature_min: Option<f32>,
    /// Precipitation sum in mm
    pub precipitation_sum: Option<f32>,
    /// Highest hourly precipitation probability of the day (0-100)
    pub precipitation_probability: Option<u8>,
    /// WMO weather code
    pub weather_code: Option<u8>,
    /// Human-readable description of weather conditions
    pub description: String,
    /// None during polar day or night
    pub sunrise: Option<DateTime<Utc>>,
    pub sunset: Option<DateTime<Utc>>,
}

impl DailyForecast {
    /// Format temperature range with unit
    #[must_use]
    pub fn format_temperature_range(&self) -> String {
        match (self.temperature_max, self.temperature_min) {
            (Some(max), Some(min)) => format!("High: {max:.1}°C, Low: {min:.1}°C"),
            (Some(max), None) => format!("High: {max:.1}°C"),
            (None, Some(min)) => format!("Low: {min:.1}°C"),
            (None, None) => "Temperature: n/a".to_string(),
        }
    }

    #[must_use]
    pub fn format_precipitation(&self) -> String {
        let amount = self
            .precipitation_sum
            .map_or_else(|| "n/a".to_string(), |mm| format!("{mm:.1}mm"));
        match self.precipitation_probability {
            Some(chance) => format!("Precipitation: {amount} ({chance}% chance)"),
            None => format!("Precipitation: {amount}"),
        }
    }

    /// Sunrise and sunset in the destination's local time
    #[must_use]
    pub fn format_daylight(&self, offset: FixedOffset) -> Option<String> {
        let sunrise = self.sunrise?.with_timezone(&offset);
        let sunset = self.sunset?.with_timezone(&offset);
        Some(format!(
            "Daylight: {}-{}",
            sunrise.format("%H:%M"),
            sunset.format("%H:%M")
        ))
    }

    /// One line per day as handed to the language model
    #[must_use]
    pub fn summary_line(&self, offset: FixedOffset) -> String {
        let mut line = format!(
            "{}: {}, {}, {}",
            self.date,
            self.description,
            self.format_temperature_range(),
            self.format_precipitation()
        );
        if let Some(daylight) = self.format_daylight(offset) {
            line.push_str(", ");
            line.push_str(&daylight);
        }
        line
    }
}

/// Weather forecast for every day of a date range
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct WeatherForecast {
    /// Location for this forecast
    pub location: Location,
    pub range: DateRange,
    /// One entry per day of `range`, in order
    pub days: Vec<DailyForecast>,
    /// Offset of the destination's local time from UTC
    pub utc_offset_seconds: i32,
    /// When this forecast was retrieved
    pub retrieved_at: DateTime<Utc>,
}

impl WeatherForecast {
    /// True when there is exactly one entry for each day of `range`, in order
    #[must_use]
    pub fn covers_range(&self) -> bool {
        self.days.len() == self.range.num_days()
            && self
                .range
                .days()
                .zip(self.days.iter())
                .all(|(expected, day)| expected == day.date)
    }

    #[must_use]
    pub fn day(&self, date: NaiveDate) -> Option<&DailyForecast> {
        self.days.iter().find(|d| d.date == date)
    }

    fn offset(&self) -> FixedOffset {
        FixedOffset::east_opt(self.utc_offset_seconds)
            .unwrap_or_else(|| Utc.fix())
    }

    /// Plain-text forecast handed back to the language model
    #[must_use]
    pub fn to_summary(&self) -> String {
        let offset = self.offset();
        let lines: Vec<String> = self.days.iter().map(|d| d.summary_line(offset)).collect();
        format!(
            "Weather forecast for {} ({}):\n{}",
            self.location.display_name(),
            self.range,
            lines.join("\n")
        )
    }
}

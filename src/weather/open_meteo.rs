//! `OpenMeteo` API response structures and conversion utilities

use crate::models::Location;
use serde::Deserialize;

/// Daily forecast response from the `OpenMeteo` API
#[derive(Debug, Deserialize)]
pub struct ForecastResponse {
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default)]
    pub timezone: Option<String>,
    #[serde(default)]
    pub utc_offset_seconds: i32,
    pub daily: Option<DailyData>,
}

/// Daily weather data from `OpenMeteo`
#[derive(Debug, Deserialize)]
pub struct DailyData {
    pub time: Vec<String>,
    #[serde(rename = "temperature_2m_max")]
    pub temperature_max: Option<Vec<Option<f32>>>,
    #[serde(rename = "temperature_2m_min")]
    pub temperature_min: Option<Vec<Option<f32>>>,
    #[serde(rename = "precipitation_sum")]
    pub precipitation: Option<Vec<Option<f32>>>,
    #[serde(rename = "precipitation_probability_max")]
    pub precipitation_probability: Option<Vec<Option<u8>>>,
    #[serde(rename = "weathercode")]
    pub weather_code: Option<Vec<Option<u8>>>,
}

/// Safe indexed read of an optional column
pub fn column<T: Copy>(values: &Option<Vec<Option<T>>>, i: usize) -> Option<T> {
    values.as_ref().and_then(|v| v.get(i).copied().flatten())
}

/// Geocoding response from `OpenMeteo`
#[derive(Debug, Deserialize)]
pub struct GeocodingResponse {
    pub results: Option<Vec<GeocodingResult>>,
}

#[derive(Debug, Deserialize)]
pub struct GeocodingResult {
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub country: Option<String>,
    pub country_code: Option<String>,
    pub admin1: Option<String>,
    pub timezone: Option<String>,
}

impl GeocodingResult {
    /// Whether a qualifier like "France", "FR" or "Texas" names this result's country or region
    pub fn matches_qualifier(&self, qualifier: &str) -> bool {
        let qualifier = qualifier.trim().to_lowercase();
        [&self.country, &self.country_code, &self.admin1]
            .into_iter()
            .flatten()
            .any(|field| field.to_lowercase() == qualifier)
    }
}

impl From<GeocodingResult> for Location {
    fn from(result: GeocodingResult) -> Self {
        Location {
            latitude: result.latitude,
            longitude: result.longitude,
            name: result.name,
            country: result.country,
            timezone: result.timezone,
        }
    }
}

/// Convert `OpenMeteo` weather code to human-readable description
#[must_use]
pub fn weather_code_to_description(code: u8) -> &'static str {
    match code {
        0 => "Clear sky",
        1 => "Mainly clear",
        2 => "Partly cloudy",
        3 => "Overcast",
        45 => "Fog",
        48 => "Depositing rime fog",
        51 => "Light drizzle",
        53 => "Moderate drizzle",
        55 => "Dense drizzle",
        56 => "Light freezing drizzle",
        57 => "Dense freezing drizzle",
        61 => "Slight rain",
        63 => "Moderate rain",
        65 => "Heavy rain",
        66 => "Light freezing rain",
        67 => "Heavy freezing rain",
        71 => "Slight snow fall",
        73 => "Moderate snow fall",
        75 => "Heavy snow fall",
        77 => "Snow grains",
        80 => "Slight rain showers",
        81 => "Moderate rain showers",
        82 => "Violent rain showers",
        85 => "Slight snow showers",
        86 => "Heavy snow showers",
        95 => "Thunderstorm",
        96 => "Thunderstorm with slight hail",
        99 => "Thunderstorm with heavy hail",
        _ => "Unknown",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_weather_codes() {
        assert_eq!(weather_code_to_description(0), "Clear sky");
        assert_eq!(weather_code_to_description(63), "Moderate rain");
        assert_eq!(weather_code_to_description(42), "Unknown");
    }

    #[test]
    fn test_column_handles_gaps() {
        let values = Some(vec![Some(1.5_f32), None]);
        assert_eq!(column(&values, 0), Some(1.5));
        assert_eq!(column(&values, 1), None);
        assert_eq!(column(&values, 7), None);
        assert_eq!(column::<f32>(&None, 0), None);
    }

    #[test]
    fn test_qualifier_matching() {
        let result = GeocodingResult {
            name: "Paris".to_string(),
            latitude: 48.85,
            longitude: 2.35,
            country: Some("France".to_string()),
            country_code: Some("FR".to_string()),
            admin1: Some("Île-de-France".to_string()),
            timezone: Some("Europe/Paris".to_string()),
        };
        assert!(result.matches_qualifier(" france"));
        assert!(result.matches_qualifier("fr"));
        assert!(!result.matches_qualifier("Texas"));

        let location: Location = result.into();
        assert_eq!(location.display_name(), "Paris, France");
        assert_eq!(location.timezone.as_deref(), Some("Europe/Paris"));
    }
}

//! Weather client for `OpenMeteo`
//!
//! Resolves a free-form location through the `OpenMeteo` geocoding API and
//! fetches a daily forecast for a date range. No API key is required.

use anyhow::Context;
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use reqwest_middleware::ClientWithMiddleware;
use std::time::Instant;
use sunrise::{Coordinates, SolarDay, SolarEvent};
use tracing::{debug, info, instrument, warn};

use crate::TripMateError;
use crate::config::{HttpConfig, WeatherConfig};
use crate::http;
use crate::models::{DailyForecast, DateRange, Location, WeatherForecast};

pub mod open_meteo;

const SERVICE: &str = "weather";

/// Anything that can produce a forecast for a place and a date range
#[async_trait]
pub trait WeatherProvider: Send + Sync {
    /// Forecast covering every day of `range`, or `ServiceUnavailable`
    async fn forecast(&self, location: &str, range: &DateRange) -> crate::Result<WeatherForecast>;
}

/// Sunrise and sunset for a place; `None` during polar day or night
pub fn get_sunrise_sunset(
    location: &Location,
    date: NaiveDate,
) -> anyhow::Result<(Option<DateTime<Utc>>, Option<DateTime<Utc>>)> {
    let coordinates =
        Coordinates::new(location.latitude, location.longitude).with_context(|| {
            format!(
                "Invalid coordinates: lat={}, lng={}",
                location.latitude, location.longitude
            )
        })?;

    let solar_day = SolarDay::new(coordinates, date);

    let sunrise: Option<DateTime<Utc>> = solar_day.event_time(SolarEvent::Sunrise).into();
    let sunset: Option<DateTime<Utc>> = solar_day.event_time(SolarEvent::Sunset).into();

    Ok((sunrise, sunset))
}

pub struct WeatherClient {
    client: ClientWithMiddleware,
    forecast_url: String,
    geocoding_url: String,
}

impl WeatherClient {
    pub fn new(config: &WeatherConfig, http_config: &HttpConfig) -> crate::Result<Self> {
        Ok(Self {
            client: http::build_client(http_config, config.timeout_seconds)?,
            forecast_url: config.forecast_url.clone(),
            geocoding_url: config.geocoding_url.clone(),
        })
    }

    /// Geocode a location such as "Paris" or "Paris, France"
    ///
    /// The text before the first comma is searched; the remainder, when
    /// present, picks the result whose country or region it names.
    #[instrument(skip(self))]
    pub async fn geocode(&self, location_name: &str) -> crate::Result<Location> {
        let (name, qualifier) = match location_name.split_once(',') {
            Some((name, rest)) => (name.trim(), Some(rest.trim()).filter(|q| !q.is_empty())),
            None => (location_name.trim(), None),
        };
        if name.is_empty() {
            return Err(TripMateError::validation("Location cannot be empty"));
        }

        let url = format!(
            "{}?name={}&count=10&language=en&format=json",
            self.geocoding_url,
            urlencoding::encode(name)
        );
        let start_time = Instant::now();
        let response = http::send(SERVICE, self.client.get(url)).await?;
        let geocoding: open_meteo::GeocodingResponse = http::read_json(SERVICE, response).await?;

        let mut results = geocoding.results.unwrap_or_default();
        debug!(
            "Geocoding returned {} results in {:.3}s",
            results.len(),
            start_time.elapsed().as_secs_f64()
        );

        let index = qualifier
            .and_then(|q| results.iter().position(|r| r.matches_qualifier(q)))
            .unwrap_or(0);

        if results.is_empty() {
            warn!("No results found for location '{}'", location_name);
            return Err(TripMateError::not_found(format!(
                "Location '{location_name}' not found"
            )));
        }

        let location: Location = results.swap_remove(index).into();
        info!(
            "Resolved '{}' to {} ({})",
            location_name,
            location.display_name(),
            location.format_coordinates()
        );
        Ok(location)
    }

    /// Daily forecast for an already resolved location
    #[instrument(skip(self, location), fields(place = %location.name))]
    pub async fn forecast_for(
        &self,
        location: Location,
        range: &DateRange,
    ) -> crate::Result<WeatherForecast> {
        let url = format!(
            "{}?latitude={}&longitude={}&daily=weathercode,temperature_2m_max,temperature_2m_min,precipitation_sum,precipitation_probability_max&timezone=auto&start_date={}&end_date={}",
            self.forecast_url,
            location.latitude,
            location.longitude,
            range.start(),
            range.end()
        );

        let start_time = Instant::now();
        let response = http::send(SERVICE, self.client.get(url)).await?;
        let forecast_response: open_meteo::ForecastResponse =
            http::read_json(SERVICE, response).await?;

        let forecast = forecast_from_open_meteo(forecast_response, location, range)?;
        info!(
            "Retrieved {}-day forecast in {:.3}s",
            forecast.days.len(),
            start_time.elapsed().as_secs_f64()
        );
        Ok(forecast)
    }
}

#[async_trait]
impl WeatherProvider for WeatherClient {
    async fn forecast(&self, location: &str, range: &DateRange) -> crate::Result<WeatherForecast> {
        let resolved = self.geocode(location).await?;
        self.forecast_for(resolved, range).await
    }
}

/// Map the `OpenMeteo` daily block onto one `DailyForecast` per requested day
fn forecast_from_open_meteo(
    response: open_meteo::ForecastResponse,
    mut location: Location,
    range: &DateRange,
) -> crate::Result<WeatherForecast> {
    let daily = response.daily.ok_or_else(|| {
        TripMateError::service_unavailable(SERVICE, "response contained no daily forecast")
    })?;

    let mut days = Vec::with_capacity(range.num_days());
    for (i, raw_date) in daily.time.iter().enumerate() {
        let Ok(date) = NaiveDate::parse_from_str(raw_date, "%Y-%m-%d") else {
            warn!("Skipping unparsable forecast date '{}'", raw_date);
            continue;
        };
        if !range.contains(date) {
            continue;
        }

        let weather_code = open_meteo::column(&daily.weather_code, i);
        let description = weather_code
            .map_or("Unknown", open_meteo::weather_code_to_description)
            .to_string();
        let (sunrise, sunset) = get_sunrise_sunset(&location, date).unwrap_or((None, None));

        days.push(DailyForecast {
            date,
            temperature_max: open_meteo::column(&daily.temperature_max, i),
            temperature_min: open_meteo::column(&daily.temperature_min, i),
            precipitation_sum: open_meteo::column(&daily.precipitation, i),
            precipitation_probability: open_meteo::column(&daily.precipitation_probability, i),
            weather_code,
            description,
            sunrise,
            sunset,
        });
    }
    days.sort_by_key(|d| d.date);
    days.dedup_by_key(|d| d.date);

    if location.timezone.is_none() {
        location.timezone = response.timezone;
    }

    let forecast = WeatherForecast {
        location,
        range: *range,
        days,
        utc_offset_seconds: response.utc_offset_seconds,
        retrieved_at: Utc::now(),
    };

    if !forecast.covers_range() {
        return Err(TripMateError::service_unavailable(
            SERVICE,
            format!(
                "forecast covers {} of {} requested days",
                forecast.days.len(),
                range.num_days()
            ),
        ));
    }

    Ok(forecast)
}

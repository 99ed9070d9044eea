//! Ticketmaster Discovery API client

use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest_middleware::ClientWithMiddleware;
use serde::Deserialize;
use std::time::Instant;
use tracing::{debug, info, instrument, warn};

use crate::config::{EventsConfig, HttpConfig};
use crate::http;
use crate::models::{DateRange, Event, EventList};
use crate::TripMateError;

const SERVICE: &str = "events";

/// Anything that can list events in a city for a date range
#[async_trait]
pub trait EventProvider: Send + Sync {
    /// Events sorted by date then name; an empty list when nothing matches
    async fn find_events(
        &self,
        location: &str,
        range: &DateRange,
        category: Option<&str>,
    ) -> crate::Result<EventList>;
}

/// Search response from the Discovery API
#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(rename = "_embedded")]
    embedded: Option<EmbeddedEvents>,
}

#[derive(Debug, Deserialize)]
struct EmbeddedEvents {
    #[serde(default)]
    events: Vec<DiscoveryEvent>,
}

#[derive(Debug, Deserialize)]
struct DiscoveryEvent {
    name: String,
    url: Option<String>,
    dates: Option<EventDates>,
    #[serde(default)]
    classifications: Vec<Classification>,
    #[serde(rename = "_embedded")]
    embedded: Option<EmbeddedVenues>,
}

#[derive(Debug, Deserialize)]
struct EventDates {
    start: Option<EventStart>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EventStart {
    local_date: Option<NaiveDate>,
}

#[derive(Debug, Deserialize)]
struct Classification {
    segment: Option<Named>,
}

#[derive(Debug, Deserialize)]
struct EmbeddedVenues {
    #[serde(default)]
    venues: Vec<Named>,
}

#[derive(Debug, Deserialize)]
struct Named {
    name: Option<String>,
}

impl DiscoveryEvent {
    /// `None` when the listing carries no start date
    fn into_event(self) -> Option<Event> {
        let date = self.dates?.start?.local_date?;
        let venue = self
            .embedded
            .and_then(|e| e.venues.into_iter().next())
            .and_then(|v| v.name);
        let category = self
            .classifications
            .into_iter()
            .next()
            .and_then(|c| c.segment)
            .and_then(|s| s.name);

        Some(Event {
            name: self.name,
            date,
            venue,
            category,
            url: self.url,
        })
    }
}

pub struct EventsClient {
    client: ClientWithMiddleware,
    api_key: String,
    base_url: String,
    page_size: u32,
}

impl EventsClient {
    /// Returns `None` when no API key is configured
    pub fn from_config(config: &EventsConfig, http_config: &HttpConfig) -> crate::Result<Option<Self>> {
        let Some(api_key) = config.api_key.clone() else {
            info!("No events API key configured, events lookups disabled");
            return Ok(None);
        };

        Ok(Some(Self {
            client: http::build_client(http_config, config.timeout_seconds)?,
            api_key,
            base_url: config.base_url.clone(),
            page_size: config.page_size,
        }))
    }

    /// Listing query for `city`; the UTC window is one day wider than `range` on
    /// each side so edge-day events in any timezone are returned
    fn search_url(&self, city: &str, range: &DateRange, category: Option<&str>) -> String {
        let from = range.start().pred_opt().unwrap_or(range.start());
        let to = range.end().succ_opt().unwrap_or(range.end());
        let mut url = format!(
            "{}?apikey={}&city={}&startDateTime={}T00:00:00Z&endDateTime={}T23:59:59Z&size={}&sort=date,asc",
            self.base_url,
            urlencoding::encode(&self.api_key),
            urlencoding::encode(city),
            from.format("%Y-%m-%d"),
            to.format("%Y-%m-%d"),
            self.page_size
        );
        if let Some(category) = category.map(str::trim).filter(|c| !c.is_empty()) {
            url.push_str("&classificationName=");
            url.push_str(&urlencoding::encode(category));
        }
        url
    }
}

#[async_trait]
impl EventProvider for EventsClient {
    #[instrument(skip(self))]
    async fn find_events(
        &self,
        location: &str,
        range: &DateRange,
        category: Option<&str>,
    ) -> crate::Result<EventList> {
        let city = location.split(',').next().unwrap_or(location).trim();
        if city.is_empty() {
            return Err(TripMateError::validation("Location cannot be empty"));
        }

        let start_time = Instant::now();
        let response = http::send(SERVICE, self.client.get(self.search_url(city, range, category))).await?;
        let search: SearchResponse = http::read_json(SERVICE, response).await?;

        let Some(embedded) = search.embedded else {
            info!("No events found in {} for {}", city, range);
            return Ok(EventList::default());
        };

        let total = embedded.events.len();
        let events: Vec<Event> = embedded
            .events
            .into_iter()
            .filter_map(DiscoveryEvent::into_event)
            .filter(|e| range.contains(e.date))
            .collect();
        if events.len() < total {
            debug!("Dropped {} listings without a date in range", total - events.len());
        }

        info!(
            "Found {} events in {} in {:.3}s",
            events.len(),
            city,
            start_time.elapsed().as_secs_f64()
        );
        if events.is_empty() && total > 0 {
            warn!("Every listing for {} fell outside {}", city, range);
        }
        Ok(EventList::new(events))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> EventsClient {
        let config = EventsConfig {
            api_key: Some("tm-key-1234".to_string()),
            base_url: "https://app.ticketmaster.com/discovery/v2/events.json".to_string(),
            page_size: 5,
            timeout_seconds: 10,
        };
        EventsClient::from_config(&config, &HttpConfig::default())
            .unwrap()
            .unwrap()
    }

    fn august(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 8, day).unwrap()
    }

    #[test]
    fn test_no_key_disables_client() {
        let client = EventsClient::from_config(&EventsConfig::default(), &HttpConfig::default()).unwrap();
        assert!(client.is_none());
    }

    #[test]
    fn test_search_url() {
        let range = DateRange::new(august(1), august(3)).unwrap();
        let url = client().search_url("New York", &range, Some("Music"));
        assert!(url.contains("city=New%20York"));
        assert!(url.contains("startDateTime=2026-07-31T00:00:00Z"));
        assert!(url.contains("endDateTime=2026-08-04T23:59:59Z"));
        assert!(url.contains("size=5"));
        assert!(url.ends_with("&classificationName=Music"));

        let url = client().search_url("Berlin", &range, Some("  "));
        assert!(!url.contains("classificationName"));
    }

    #[test]
    fn test_parse_discovery_event() {
        let raw: DiscoveryEvent = serde_json::from_value(serde_json::json!({
            "name": "Summer Jazz",
            "url": "https://example.com/e/1",
            "dates": {"start": {"localDate": "2026-08-02", "localTime": "19:30:00"}},
            "classifications": [{"segment": {"name": "Music"}}],
            "_embedded": {"venues": [{"name": "Blue Note"}]}
        }))
        .unwrap();

        let event = raw.into_event().unwrap();
        assert_eq!(event.date, august(2));
        assert_eq!(event.venue.as_deref(), Some("Blue Note"));
        assert_eq!(event.category.as_deref(), Some("Music"));
    }

    #[test]
    fn test_event_without_date_is_skipped() {
        let raw: DiscoveryEvent =
            serde_json::from_value(serde_json::json!({"name": "TBA", "dates": {"start": {}}})).unwrap();
        assert!(raw.into_event().is_none());
    }

    #[test]
    fn test_missing_embedded_parses() {
        let search: SearchResponse =
            serde_json::from_value(serde_json::json!({"page": {"totalElements": 0}})).unwrap();
        assert!(search.embedded.is_none());
    }
}

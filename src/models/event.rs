//! Event listings for a stay

use super::DateRange;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt::Display;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub name: String,
    pub date: NaiveDate,
    pub venue: Option<String>,
    /// Provider classification such as "Music" or "Sports"
    pub category: Option<String>,
    pub url: Option<String>,
}

impl Display for Event {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.name, self.date)?;
        if let Some(venue) = &self.venue {
            write!(f, " at {venue}")?;
        }
        if let Some(category) = &self.category {
            write!(f, " [{category}]")?;
        }
        Ok(())
    }
}

/// Events ordered by date, then name
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EventList {
    events: Vec<Event>,
}

impl EventList {
    /// Sort the events into listing order
    #[must_use]
    pub fn new(mut events: Vec<Event>) -> Self {
        events.sort_by(|a, b| a.date.cmp(&b.date).then_with(|| a.name.cmp(&b.name)));
        Self { events }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Event> {
        self.events.iter()
    }

    /// Plain-text listing handed back to the language model
    #[must_use]
    pub fn to_summary(&self, location: &str, range: &DateRange) -> String {
        if self.events.is_empty() {
            return format!("No events found in {location} between {} and {}.", range.start(), range.end());
        }

        let lines: Vec<String> = self.events.iter().map(|e| format!("- {e}")).collect();
        format!(
            "Events in {location} between {} and {}:\n{}",
            range.start(),
            range.end(),
            lines.join("\n")
        )
    }
}

impl IntoIterator for EventList {
    type Item = Event;
    type IntoIter = std::vec::IntoIter<Event>;

    fn into_iter(self) -> Self::IntoIter {
        self.events.into_iter()
    }
}

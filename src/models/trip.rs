//! Trip request model

use crate::TripMateError;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Inclusive range of calendar days, `start <= end` is guaranteed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawDateRange")]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

#[derive(Deserialize)]
struct RawDateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl TryFrom<RawDateRange> for DateRange {
    type Error = TripMateError;

    fn try_from(raw: RawDateRange) -> Result<Self, Self::Error> {
        DateRange::new(raw.start, raw.end)
    }
}

impl DateRange {
    /// Create a range, rejecting `start > end`
    pub fn new(start: NaiveDate, end: NaiveDate) -> crate::Result<Self> {
        if start > end {
            return Err(TripMateError::validation(format!(
                "start date {start} is after end date {end}"
            )));
        }
        Ok(Self { start, end })
    }

    /// A range covering exactly one day
    #[must_use]
    pub fn single(day: NaiveDate) -> Self {
        Self {
            start: day,
            end: day,
        }
    }

    #[must_use]
    pub fn start(&self) -> NaiveDate {
        self.start
    }

    #[must_use]
    pub fn end(&self) -> NaiveDate {
        self.end
    }

    /// Number of days in the range, both ends included
    #[must_use]
    pub fn num_days(&self) -> usize {
        usize::try_from((self.end - self.start).num_days() + 1).unwrap_or(1)
    }

    /// Every day of the range in order
    pub fn days(&self) -> impl Iterator<Item = NaiveDate> {
        self.start.iter_days().take(self.num_days())
    }

    #[must_use]
    pub fn contains(&self, day: NaiveDate) -> bool {
        self.start <= day && day <= self.end
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} to {}", self.start, self.end)
    }
}

/// Spending level the traveler asked for
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BudgetTier {
    #[serde(alias = "low")]
    Budget,
    #[default]
    #[serde(alias = "medium")]
    Moderate,
    #[serde(alias = "high")]
    Luxury,
}

impl BudgetTier {
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            BudgetTier::Budget => "Budget",
            BudgetTier::Moderate => "Moderate",
            BudgetTier::Luxury => "Luxury",
        }
    }
}

/// Trip parameters collected by the form
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TripQuery {
    pub destination: String,
    pub dates: DateRange,
    pub travelers: u32,
    pub interests: Vec<String>,
    pub budget: BudgetTier,
}

impl TripQuery {
    /// Build a validated query
    pub fn new(
        destination: impl Into<String>,
        dates: DateRange,
        travelers: u32,
        interests: Vec<String>,
        budget: BudgetTier,
    ) -> crate::Result<Self> {
        let destination = destination.into().trim().to_string();
        if destination.is_empty() {
            return Err(TripMateError::validation("Destination cannot be empty"));
        }
        if travelers == 0 {
            return Err(TripMateError::validation("At least one traveler is required"));
        }

        let interests = interests
            .into_iter()
            .map(|i| i.trim().to_string())
            .filter(|i| !i.is_empty())
            .collect();

        Ok(Self {
            destination,
            dates,
            travelers,
            interests,
            budget,
        })
    }

    /// Render the query as the chat message sent to the planner
    #[must_use]
    pub fn to_prompt(&self) -> String {
        let interests = if self.interests.is_empty() {
            "no particular preference".to_string()
        } else {
            self.interests.join(", ")
        };

        format!(
            "I'm planning a trip to {destination} from {start} to {end} ({days} days). \
There will be {travelers} traveler(s).\n\n\
Interests: {interests}\n\
Budget: {budget}\n\n\
Please provide:\n\
1. A detailed daily itinerary\n\
2. Weather forecast for the travel dates\n\
3. Any interesting events or activities happening during my stay",
            destination = self.destination,
            start = self.dates.start().format("%B %d, %Y"),
            end = self.dates.end().format("%B %d, %Y"),
            days = self.dates.num_days(),
            travelers = self.travelers,
            budget = self.budget.label(),
        )
    }
}

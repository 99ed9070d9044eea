//! Data models for `TripMate`
//!
//! Plain request/response records organized by concern:
//! - Location: geocoded place with coordinates
//! - Trip: the trip request and its date range
//! - Weather: per-day forecast for a date range
//! - Event: events happening during a stay

pub mod event;
pub mod location;
pub mod trip;
pub mod weather;

// Re-export all public types for convenient access
pub use event::{Event, EventList};
pub use location::Location;
pub use trip::{BudgetTier, DateRange, TripQuery};
pub use weather::{DailyForecast, WeatherForecast};

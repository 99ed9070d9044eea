//! Location model for geographic coordinates and metadata

use serde::{Deserialize, Serialize};

/// A geocoded place
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Location {
    /// Latitude in decimal degrees
    pub latitude: f64,
    /// Longitude in decimal degrees
    pub longitude: f64,
    /// Location name (city, region, etc.)
    pub name: String,
    /// Country name as reported by the geocoder
    pub country: Option<String>,
    /// IANA timezone of the place, when known
    pub timezone: Option<String>,
}

impl Location {
    /// Create a new location
    #[must_use]
    pub fn new(latitude: f64, longitude: f64, name: String) -> Self {
        Self {
            latitude,
            longitude,
            name,
            country: None,
            timezone: None,
        }
    }

    /// Create location with country
    #[must_use]
    pub fn with_country(latitude: f64, longitude: f64, name: String, country: String) -> Self {
        Self {
            latitude,
            longitude,
            name,
            country: Some(country),
            timezone: None,
        }
    }

    /// Format location as coordinates string
    #[must_use]
    pub fn format_coordinates(&self) -> String {
        format!("{:.4}, {:.4}", self.latitude, self.longitude)
    }

    /// "Name, Country" when the country is known
    #[must_use]
    pub fn display_name(&self) -> String {
        match &self.country {
            Some(country) if !country.is_empty() => format!("{}, {}", self.name, country),
            _ => self.name.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_name() {
        let paris = Location::with_country(48.8566, 2.3522, "Paris".to_string(), "France".to_string());
        assert_eq!(paris.display_name(), "Paris, France");

        let unnamed = Location::new(48.8566, 2.3522, "Paris".to_string());
        assert_eq!(unnamed.display_name(), "Paris");
    }

    #[test]
    fn test_format_coordinates() {
        let location = Location::new(46.818_234, 8.227_456, "Interlaken".to_string());
        assert_eq!(location.format_coordinates(), "46.8182, 8.2275");
    }
}

//! Location model for geographic coordinates and metadata

use serde::{Deserialize, Serialize};
use std::fmt;

/// Plain latitude/longitude pair
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
pub struct Coordinates {
    /// Latitude in decimal degrees
    pub latitude: f64,
    /// Longitude in decimal degrees
    pub longitude: f64,
}

/// Coarse kind of place a geocoding result refers to
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PlaceCategory {
    Beach,
    Mountain,
    City,
    Water,
    /// Generic place reported by a provider without finer typing
    Place,
    Other,
}

impl PlaceCategory {
    /// Derive a category from a Nominatim-style `class:type` pair
    #[must_use]
    pub fn from_class_type(class: &str, kind: &str) -> Self {
        let class_type = format!("{class}:{kind}").to_lowercase();
        let has = |needle: &str| class_type.contains(needle);

        if has("beach") {
            PlaceCategory::Beach
        } else if ["peak", "mountain", "hill", "ridge", "valley", "mountain_range"]
            .iter()
            .any(|n| has(n))
        {
            PlaceCategory::Mountain
        } else if ["city", "town", "village", "county"].iter().any(|n| has(n)) {
            PlaceCategory::City
        } else if has("water") || has("river") {
            PlaceCategory::Water
        } else {
            PlaceCategory::Other
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            PlaceCategory::Beach => "beach",
            PlaceCategory::Mountain => "mountain/hill",
            PlaceCategory::City => "city",
            PlaceCategory::Water => "water",
            PlaceCategory::Place => "place",
            PlaceCategory::Other => "other",
        }
    }
}

impl fmt::Display for PlaceCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Reference links for a coordinate pair
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct MapLinks {
    pub openstreetmap: String,
    pub google_maps: String,
    pub wikipedia_search: String,
}

impl MapLinks {
    /// Build OpenStreetMap, Google Maps and Wikipedia search links
    #[must_use]
    pub fn for_coordinates(latitude: f64, longitude: f64, name: Option<&str>) -> Self {
        let search = match name {
            Some(name) if !name.trim().is_empty() => name.trim().to_string(),
            _ => format!("{latitude},{longitude}"),
        };

        Self {
            openstreetmap: format!(
                "https://www.openstreetmap.org/?mlat={latitude}&mlon={longitude}#map=12/{latitude}/{longitude}"
            ),
            google_maps: format!(
                "https://www.google.com/maps/search/?api=1&query={latitude},{longitude}"
            ),
            wikipedia_search: format!(
                "https://en.wikipedia.org/w/index.php?search={}",
                urlencoding::encode(&search)
            ),
        }
    }

    /// Single-line rendering used in reports
    #[must_use]
    pub fn summary_line(&self) -> String {
        format!(
            "{} | {} | {}",
            self.openstreetmap, self.google_maps, self.wikipedia_search
        )
    }
}

/// A resolved destination. Created once per run and not mutated afterwards.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Location {
    /// Latitude in decimal degrees
    pub latitude: f64,
    /// Longitude in decimal degrees
    pub longitude: f64,
    /// Location name (display name from the geocoder)
    pub name: String,
    /// Country, when the provider reports one
    pub country: Option<String>,
    /// Coarse place kind
    pub category: PlaceCategory,
    /// Map and reference links
    pub links: MapLinks,
}

impl Location {
    /// Create a new location with links derived from its coordinates
    #[must_use]
    pub fn new(latitude: f64, longitude: f64, name: String, category: PlaceCategory) -> Self {
        let links = MapLinks::for_coordinates(latitude, longitude, Some(&name));
        Self {
            latitude,
            longitude,
            name,
            country: None,
            category,
            links,
        }
    }

    /// Set the country
    #[must_use]
    pub fn with_country(mut self, country: Option<String>) -> Self {
        self.country = country;
        self
    }

    #[must_use]
    pub fn coordinates(&self) -> Coordinates {
        Coordinates {
            latitude: self.latitude,
            longitude: self.longitude,
        }
    }

    /// Format location as coordinates string
    #[must_use]
    pub fn format_coordinates(&self) -> String {
        format!("{:.4}, {:.4}", self.latitude, self.longitude)
    }
}

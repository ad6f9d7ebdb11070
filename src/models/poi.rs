//! Points of interest near the destination

use serde::{Deserialize, Serialize};
use std::fmt;

use super::Coordinates;

/// Kinds that keep visitors indoors
const INDOOR_KINDS: [&str; 5] = ["museum", "theatre", "gallery", "library", "cinema"];

/// Category of a point of interest, derived from provider kinds/tags
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum PoiCategory {
    Beach,
    Mountain,
    Museum,
    Gallery,
    Theatre,
    Park,
    Historic,
    Religion,
    Marketplace,
    Attraction,
    Other,
}

impl PoiCategory {
    /// Classify from a comma-separated kinds string (OpenTripMap `kinds`,
    /// or the joined Overpass tag values)
    #[must_use]
    pub fn from_kinds(kinds: &str) -> Self {
        let kinds = kinds.to_lowercase();
        let has = |needle: &str| kinds.contains(needle);

        if has("beach") || has("coast") {
            PoiCategory::Beach
        } else if ["peak", "mountain", "volcano", "hill", "cliff", "rock", "viewpoint"]
            .iter()
            .any(|n| has(n))
        {
            PoiCategory::Mountain
        } else if has("museum") {
            PoiCategory::Museum
        } else if has("gallery") {
            PoiCategory::Gallery
        } else if has("theatre") || has("cinema") {
            PoiCategory::Theatre
        } else if has("park") || has("garden") || has("nature_reserve") {
            PoiCategory::Park
        } else if has("religion") || has("church") || has("temple") || has("mosque") {
            PoiCategory::Religion
        } else if has("historic")
            || has("monument")
            || has("memorial")
            || has("castle")
            || has("fort")
        {
            PoiCategory::Historic
        } else if has("marketplace") || has("market") {
            PoiCategory::Marketplace
        } else if has("attraction") || has("interesting_places") || has("tourist") {
            PoiCategory::Attraction
        } else {
            PoiCategory::Other
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            PoiCategory::Beach => "beach",
            PoiCategory::Mountain => "mountain",
            PoiCategory::Museum => "museum",
            PoiCategory::Gallery => "gallery",
            PoiCategory::Theatre => "theatre",
            PoiCategory::Park => "park",
            PoiCategory::Historic => "historic",
            PoiCategory::Religion => "religion",
            PoiCategory::Marketplace => "marketplace",
            PoiCategory::Attraction => "attraction",
            PoiCategory::Other => "other",
        }
    }
}

impl fmt::Display for PoiCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A named attraction near the destination
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct PointOfInterest {
    pub name: String,
    pub category: PoiCategory,
    /// Raw kinds as reported by the source, comma separated
    pub kinds: String,
    pub coordinates: Option<Coordinates>,
    /// Distance from the destination centre in metres
    pub distance_m: Option<f64>,
}

impl PointOfInterest {
    /// Create a POI, deriving its category from `kinds`
    #[must_use]
    pub fn new(name: impl Into<String>, kinds: impl Into<String>) -> Self {
        let kinds = kinds.into();
        Self {
            name: name.into(),
            category: PoiCategory::from_kinds(&kinds),
            kinds,
            coordinates: None,
            distance_m: None,
        }
    }

    #[must_use]
    pub fn with_coordinates(mut self, coordinates: Coordinates) -> Self {
        self.coordinates = Some(coordinates);
        self
    }

    #[must_use]
    pub fn with_distance(mut self, distance_m: Option<f64>) -> Self {
        self.distance_m = distance_m;
        self
    }

    /// Whether the attraction can be visited in bad weather
    #[must_use]
    pub fn is_indoor(&self) -> bool {
        let kinds = self.kinds.to_lowercase();
        INDOOR_KINDS.iter().any(|kind| kinds.contains(kind))
    }

    /// Case-insensitive key used for de-duplication
    #[must_use]
    pub fn dedup_key(&self) -> String {
        self.name.trim().to_lowercase()
    }
}

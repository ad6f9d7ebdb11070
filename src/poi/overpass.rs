//! Overpass API provider, used when OpenTripMap has nothing

use std::collections::HashMap;

use async_trait::async_trait;
use haversine::{Location as HaversinePoint, Units, distance};
use reqwest::Client;
use serde::Deserialize;
use tracing::instrument;

use super::{PoiProvider, PoiQuery};
use crate::Result;
use crate::config::ServicesConfig;
use crate::http::fetch_json;
use crate::models::{Coordinates, Location, PointOfInterest};

/// Tag keys whose values make up a POI's kinds, in order
const KIND_TAGS: [&str; 4] = ["tourism", "historic", "leisure", "amenity"];

#[derive(Debug, Deserialize)]
pub struct OverpassResponse {
    #[serde(default)]
    pub elements: Vec<Element>,
}

#[derive(Debug, Deserialize)]
pub struct Element {
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    /// Present on ways when queried with `out center`
    pub center: Option<Center>,
    #[serde(default)]
    pub tags: HashMap<String, String>,
}

#[derive(Debug, Deserialize)]
pub struct Center {
    pub lat: f64,
    pub lon: f64,
}

impl Element {
    fn coordinates(&self) -> Option<Coordinates> {
        match (self.lat, self.lon, &self.center) {
            (Some(latitude), Some(longitude), _) => Some(Coordinates { latitude, longitude }),
            (_, _, Some(center)) => Some(Coordinates {
                latitude: center.lat,
                longitude: center.lon,
            }),
            _ => None,
        }
    }

    fn into_poi(self, origin: Coordinates) -> Option<PointOfInterest> {
        let name = self.tags.get("name").filter(|n| !n.trim().is_empty())?.clone();
        let kinds = KIND_TAGS
            .iter()
            .filter_map(|key| self.tags.get(*key))
            .filter(|value| !value.is_empty())
            .cloned()
            .collect::<Vec<_>>()
            .join(",");
        let kinds = if kinds.is_empty() { "unknown".to_string() } else { kinds };

        let mut poi = PointOfInterest::new(name, kinds);
        if let Some(coordinates) = self.coordinates() {
            poi = poi
                .with_coordinates(coordinates)
                .with_distance(Some(distance_m(origin, coordinates)));
        }
        Some(poi)
    }
}

/// Great-circle distance in metres
#[must_use]
pub fn distance_m(from: Coordinates, to: Coordinates) -> f64 {
    let km = distance(
        HaversinePoint {
            latitude: from.latitude,
            longitude: from.longitude,
        },
        HaversinePoint {
            latitude: to.latitude,
            longitude: to.longitude,
        },
        Units::Kilometers,
    );
    (km * 1000.0).round()
}

/// Overpass QL for attractions within `radius_m` of a point
#[must_use]
pub fn build_query(location: &Location, query: &PoiQuery) -> String {
    let around = format!(
        "around:{},{},{}",
        query.radius_m, location.latitude, location.longitude
    );
    format!(
        "[out:json][timeout:15];\n(\n  node({around})[\"tourism\"];\n  way({around})[\"tourism\"];\n  node({around})[\"historic\"];\n  way({around})[\"historic\"];\n  node({around})[\"leisure\"];\n  way({around})[\"leisure\"];\n  node({around})[\"amenity\"~\"museum|theatre|gallery|marketplace|park\"];\n);\nout center {};",
        query.limit
    )
}

/// Fallback POI source backed by OpenStreetMap data
#[derive(Debug, Clone)]
pub struct OverpassProvider {
    client: Client,
    url: String,
}

impl OverpassProvider {
    #[must_use]
    pub fn new(client: Client, services: &ServicesConfig) -> Self {
        Self {
            client,
            url: services.overpass_url.clone(),
        }
    }
}

#[async_trait]
impl PoiProvider for OverpassProvider {
    fn name(&self) -> &'static str {
        "Overpass"
    }

    #[instrument(skip(self, location), fields(location = %location.name))]
    async fn fetch(&self, location: &Location, query: &PoiQuery) -> Result<Vec<PointOfInterest>> {
        let request = self
            .client
            .post(&self.url)
            .form(&[("data", build_query(location, query))]);

        let response: OverpassResponse = fetch_json(request, "Overpass").await?;
        let origin = location.coordinates();
        Ok(response
            .elements
            .into_iter()
            .filter_map(|element| element.into_poi(origin))
            .collect())
    }
}

//! OpenTripMap `places/radius` provider

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, instrument};

use super::{PoiProvider, PoiQuery};
use crate::Result;
use crate::config::ServicesConfig;
use crate::http::fetch_json;
use crate::models::{Coordinates, Location, PointOfInterest};

/// GeoJSON feature collection returned by `radius?format=geojson`
#[derive(Debug, Deserialize)]
pub struct FeatureCollection {
    #[serde(default)]
    pub features: Vec<Feature>,
}

#[derive(Debug, Deserialize)]
pub struct Feature {
    pub geometry: Option<Geometry>,
    #[serde(default)]
    pub properties: Properties,
}

#[derive(Debug, Deserialize)]
pub struct Geometry {
    /// `[lon, lat]`
    pub coordinates: Vec<f64>,
}

#[derive(Debug, Default, Deserialize)]
pub struct Properties {
    pub name: Option<String>,
    pub dist: Option<f64>,
    pub kinds: Option<String>,
}

impl Feature {
    fn into_poi(self) -> Option<PointOfInterest> {
        let name = self.properties.name.filter(|n| !n.trim().is_empty())?;
        let kinds = self.properties.kinds.unwrap_or_default();
        let mut poi = PointOfInterest::new(name, kinds).with_distance(self.properties.dist);

        if let Some(geometry) = self.geometry {
            if let [longitude, latitude, ..] = geometry.coordinates[..] {
                poi = poi.with_coordinates(Coordinates { latitude, longitude });
            }
        }
        Some(poi)
    }
}

/// Primary POI source; inert without an API key
#[derive(Debug, Clone)]
pub struct OpenTripMapProvider {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl OpenTripMapProvider {
    #[must_use]
    pub fn new(client: Client, services: &ServicesConfig, api_key: Option<String>) -> Self {
        Self {
            client,
            base_url: services.opentripmap_url.trim_end_matches('/').to_string(),
            api_key,
        }
    }
}

#[async_trait]
impl PoiProvider for OpenTripMapProvider {
    fn name(&self) -> &'static str {
        "OpenTripMap"
    }

    #[instrument(skip(self, location), fields(location = %location.name))]
    async fn fetch(&self, location: &Location, query: &PoiQuery) -> Result<Vec<PointOfInterest>> {
        let Some(api_key) = &self.api_key else {
            debug!("No OpenTripMap API key configured, skipping");
            return Ok(Vec::new());
        };

        let url = format!("{}/radius", self.base_url);
        let request = self.client.get(url).query(&[
            ("apikey", api_key.clone()),
            ("radius", query.radius_m.to_string()),
            ("lon", location.longitude.to_string()),
            ("lat", location.latitude.to_string()),
            ("limit", query.limit.to_string()),
            ("rate", "3".to_string()),
            ("format", "geojson".to_string()),
        ]);

        let collection: FeatureCollection = fetch_json(request, "OpenTripMap").await?;
        Ok(collection
            .features
            .into_iter()
            .filter_map(Feature::into_poi)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{PlaceCategory, PoiCategory};

    #[test]
    fn test_parse_feature_collection() {
        let json = r#"{
            "type": "FeatureCollection",
            "features": [
                {
                    "type": "Feature",
                    "id": "1",
                    "geometry": {"type": "Point", "coordinates": [73.7512, 15.5437]},
                    "properties": {"xid": "N1", "name": "Calangute Beach", "dist": 412.7, "rate": 3, "kinds": "beaches,natural,interesting_places"}
                },
                {
                    "type": "Feature",
                    "id": "2",
                    "geometry": {"type": "Point", "coordinates": [73.76, 15.55]},
                    "properties": {"xid": "N2", "name": "", "dist": 900.0, "kinds": "other"}
                }
            ]
        }"#;

        let collection: FeatureCollection = serde_json::from_str(json).unwrap();
        let pois: Vec<_> = collection.features.into_iter().filter_map(Feature::into_poi).collect();

        assert_eq!(pois.len(), 1);
        assert_eq!(pois[0].category, PoiCategory::Beach);
        assert_eq!(pois[0].distance_m, Some(412.7));
        let coordinates = pois[0].coordinates.unwrap();
        assert!((coordinates.latitude - 15.5437).abs() < 1e-9);
        assert!((coordinates.longitude - 73.7512).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_without_key_returns_empty_without_network() {
        let services = ServicesConfig {
            opentripmap_url: "http://127.0.0.1:9".to_string(),
            ..ServicesConfig::default()
        };
        let provider = OpenTripMapProvider::new(Client::new(), &services, None);
        let location = Location::new(15.54, 73.75, "Calangute".to_string(), PlaceCategory::Beach);
        let pois = provider
            .fetch(&location, &PoiQuery { radius_m: 2000, limit: 8 })
            .await
            .unwrap();
        assert!(pois.is_empty());
    }
}

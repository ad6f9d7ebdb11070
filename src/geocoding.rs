//! Place-name geocoding
//!
//! Lookup order: OpenTripMap `geoname` (only with an API key), then
//! Nominatim. Nominatim results are disambiguated by preferring the first
//! result whose display name contains the query's leading token.

use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, info, instrument, warn};

use crate::config::ServicesConfig;
use crate::http::{fetch_json, fetch_optional_json};
use crate::models::{Location, PlaceCategory};
use crate::{PlannerError, Result};

/// Geocoder backed by OpenTripMap and Nominatim
#[derive(Debug, Clone)]
pub struct Geocoder {
    client: Client,
    nominatim_url: String,
    opentripmap_url: String,
    opentripmap_key: Option<String>,
    country_hint: Option<String>,
}

/// OpenTripMap `geoname` response
#[derive(Debug, Deserialize)]
struct GeonameResponse {
    name: Option<String>,
    country: Option<String>,
    lat: Option<f64>,
    lon: Option<f64>,
    #[serde(rename = "type")]
    kind: Option<String>,
}

/// One Nominatim `search` result
#[derive(Debug, Clone, Deserialize)]
pub struct NominatimPlace {
    pub lat: String,
    pub lon: String,
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub class: String,
    #[serde(default, rename = "type")]
    pub kind: String,
}

impl NominatimPlace {
    fn to_location(&self) -> Result<Location> {
        let latitude = self
            .lat
            .parse::<f64>()
            .map_err(|_| PlannerError::api(format!("Invalid latitude from Nominatim: {}", self.lat)))?;
        let longitude = self
            .lon
            .parse::<f64>()
            .map_err(|_| PlannerError::api(format!("Invalid longitude from Nominatim: {}", self.lon)))?;

        Ok(Location::new(
            latitude,
            longitude,
            self.display_name.clone(),
            PlaceCategory::from_class_type(&self.class, &self.kind),
        ))
    }
}

/// Leading token of a place query: text before the first comma, lowercased
#[must_use]
pub fn query_token(place: &str) -> String {
    place.split(',').next().unwrap_or("").trim().to_lowercase()
}

/// Prefer the first result whose display name contains the query token
#[must_use]
pub fn choose_result<'a>(results: &'a [NominatimPlace], place: &str) -> Option<&'a NominatimPlace> {
    let token = query_token(place);
    results
        .iter()
        .find(|r| !token.is_empty() && r.display_name.to_lowercase().contains(&token))
        .or_else(|| results.first())
}

impl Geocoder {
    #[must_use]
    pub fn new(
        client: Client,
        services: &ServicesConfig,
        opentripmap_key: Option<String>,
        country_hint: Option<String>,
    ) -> Self {
        Self {
            client,
            nominatim_url: services.nominatim_url.trim_end_matches('/').to_string(),
            opentripmap_url: services.opentripmap_url.trim_end_matches('/').to_string(),
            opentripmap_key,
            country_hint,
        }
    }

    /// Resolve a free-text place name to a [`Location`]
    #[instrument(skip(self))]
    pub async fn geocode(&self, place: &str) -> Result<Location> {
        let place = place.trim();
        if place.is_empty() {
            return Err(PlannerError::validation("Location cannot be empty"));
        }

        if let Some(api_key) = &self.opentripmap_key {
            if let Some(location) = self.geocode_opentripmap(place, api_key).await? {
                return Ok(location);
            }
            debug!("OpenTripMap had no match for '{}', trying Nominatim", place);
        }

        let location = self
            .geocode_nominatim(place)
            .await?
            .ok_or_else(|| PlannerError::not_found(format!("Could not geocode '{place}'.")))?;

        let token = query_token(place);
        let display = location.name.to_lowercase();
        if let Some(hint) = &self.country_hint {
            if !token.is_empty() && !display.contains(&token) && !display.contains(&hint.to_lowercase()) {
                info!(
                    "'{}' resolved to '{}', retrying with country hint '{}'",
                    place, location.name, hint
                );
                if let Some(hinted) = self.geocode_nominatim(&format!("{place}, {hint}")).await? {
                    return Ok(hinted);
                }
            }
        }

        info!(
            "Geocoded '{}' to {} ({:.4}, {:.4})",
            place, location.name, location.latitude, location.longitude
        );
        Ok(location)
    }

    async fn geocode_opentripmap(&self, place: &str, api_key: &str) -> Result<Option<Location>> {
        let url = format!("{}/geoname", self.opentripmap_url);
        let request = self
            .client
            .get(url)
            .query(&[("name", place), ("apikey", api_key)]);

        let Some(response) =
            fetch_optional_json::<GeonameResponse>(request, "OpenTripMap").await?
        else {
            return Ok(None);
        };

        let (Some(latitude), Some(longitude)) = (response.lat, response.lon) else {
            return Ok(None);
        };

        let name = response.name.unwrap_or_else(|| place.to_string());
        let category = response
            .kind
            .as_deref()
            .map(|kind| PlaceCategory::from_class_type("place", kind))
            .filter(|category| *category != PlaceCategory::Other)
            .unwrap_or(PlaceCategory::Place);

        Ok(Some(
            Location::new(latitude, longitude, name, category).with_country(response.country),
        ))
    }

    async fn geocode_nominatim(&self, place: &str) -> Result<Option<Location>> {
        let url = format!("{}/search", self.nominatim_url);
        let request = self.client.get(url).query(&[
            ("q", place),
            ("format", "json"),
            ("limit", "3"),
            ("addressdetails", "0"),
        ]);

        let results: Vec<NominatimPlace> = fetch_json(request, "Nominatim").await?;
        if results.is_empty() {
            warn!("No Nominatim results for '{}'", place);
            return Ok(None);
        }

        choose_result(&results, place)
            .map(NominatimPlace::to_location)
            .transpose()
    }
}

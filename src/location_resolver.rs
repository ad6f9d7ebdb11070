//! Location Resolution Module
//!
//! Turns a [`LocationInput`] (coordinates or a place name) into a
//! [`Location`] for the rest of the run.

use tracing::debug;

use crate::Result;
use crate::geocoding::Geocoder;
use crate::input::LocationInput;
use crate::models::{Location, PlaceCategory};

/// Service for resolving location inputs
pub struct LocationResolver;

impl LocationResolver {
    /// Resolve a location input into a structured Location
    pub async fn resolve(geocoder: &Geocoder, location_input: LocationInput) -> Result<Location> {
        debug!("Resolving location input: {:?}", location_input);

        let location = match location_input {
            LocationInput::Coordinates(lat, lon) => Self::resolve_coordinates(lat, lon),
            LocationInput::Name(name) => geocoder.geocode(&name).await?,
        };

        debug!(
            "Resolved location: {} at ({}, {})",
            location.name, location.latitude, location.longitude
        );

        Ok(location)
    }

    /// Coordinates are used as-is and named after themselves
    fn resolve_coordinates(lat: f64, lon: f64) -> Location {
        Location::new(lat, lon, format!("{lat:.4}, {lon:.4}"), PlaceCategory::Other)
    }
}

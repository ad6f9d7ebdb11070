//! Data models for the travel planner
//!
//! This module contains the core domain models organized by concern:
//! - Location: Geographic coordinates, place category and map links
//! - Forecast: Daily weather forecast for the trip dates
//! - Poi: Points of interest near the destination

pub mod forecast;
pub mod location;
pub mod poi;

// Re-export all public types for convenient access
pub use forecast::{DailyForecast, ForecastDay, PrecipitationLevel};
pub use location::{Coordinates, Location, MapLinks, PlaceCategory};
pub use poi::{PoiCategory, PointOfInterest};

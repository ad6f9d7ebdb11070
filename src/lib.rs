//! `travel-planner` - day-by-day trip itineraries from weather and nearby attractions
//!
//! The library resolves a destination, fetches its forecast and points of
//! interest, renders markdown summaries and exposes these as tools to an
//! OpenAI-compatible language model.

pub mod agent;
pub mod config;
pub mod error;
pub mod geocoding;
pub mod http;
pub mod input;
pub mod itinerary;
pub mod llm;
pub mod location_resolver;
pub mod models;
pub mod planner;
pub mod poi;
pub mod telemetry;
pub mod tools;
pub mod weather;

// Re-export core types for public API
pub use agent::TravelAgent;
pub use config::{Credentials, PlannerConfig};
pub use error::PlannerError;
pub use geocoding::Geocoder;
pub use input::{LocationInput, LocationParser, TripRequest};
pub use llm::{ChatModel, OpenAiCompatibleClient};
pub use models::{DailyForecast, ForecastDay, Location, PointOfInterest};
pub use planner::TripPlanner;
pub use poi::{PoiProvider, PoiQuery, PoiService};
pub use tools::ToolRegistry;
pub use weather::WeatherClient;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Core result type used throughout the library
pub type Result<T> = std::result::Result<T, PlannerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }
}

//! Trip planning operations shared by the agent tools and `--direct` mode

use chrono::NaiveDate;
use tracing::{info, instrument};

use crate::config::{Credentials, DefaultsConfig, PlannerConfig};
use crate::geocoding::Geocoder;
use crate::http::build_client;
use crate::input::{LocationParser, TripRequest};
use crate::itinerary::{compose_itinerary, render_poi_summary, render_weather_summary};
use crate::location_resolver::LocationResolver;
use crate::models::Location;
use crate::poi::{OpenTripMapProvider, OverpassProvider, PoiQuery, PoiService};
use crate::weather::WeatherClient;
use crate::{PlannerError, Result};

/// POI lookup used for the summary section in `--direct` mode
const DIRECT_POI_QUERY: PoiQuery = PoiQuery {
    radius_m: 2500,
    limit: 10,
};

/// Bounds on the POI pool an itinerary draws from
const MIN_ITINERARY_POOL: usize = 20;
pub const MAX_ITINERARY_POOL: usize = 100;

/// Two candidates per slot, kept within the pool bounds so long ranges
/// don't turn into huge provider queries
#[must_use]
pub fn itinerary_pool_size(daily_limit: usize, num_days: usize) -> usize {
    daily_limit
        .saturating_mul(num_days)
        .saturating_mul(2)
        .clamp(MIN_ITINERARY_POOL, MAX_ITINERARY_POOL)
}

/// Geocoding, weather and POI lookups plus the renderers on top of them
pub struct TripPlanner {
    geocoder: Geocoder,
    weather: WeatherClient,
    pois: PoiService,
    defaults: DefaultsConfig,
}

impl TripPlanner {
    #[must_use]
    pub fn new(
        geocoder: Geocoder,
        weather: WeatherClient,
        pois: PoiService,
        defaults: DefaultsConfig,
    ) -> Self {
        Self {
            geocoder,
            weather,
            pois,
            defaults,
        }
    }

    /// Wire up the real services from configuration and credentials
    pub fn from_config(config: &PlannerConfig, credentials: &Credentials) -> Result<Self> {
        let client = build_client(&config.services)?;
        let otm_key = credentials.opentripmap_api_key.clone();

        let geocoder = Geocoder::new(
            client.clone(),
            &config.services,
            otm_key.clone(),
            config.defaults.country_hint.clone(),
        );
        let weather = WeatherClient::new(client.clone(), &config.services);
        let pois = PoiService::new(
            Box::new(OpenTripMapProvider::new(client.clone(), &config.services, otm_key)),
            Box::new(OverpassProvider::new(client, &config.services)),
        );

        Ok(Self::new(geocoder, weather, pois, config.defaults.clone()))
    }

    #[must_use]
    pub fn defaults(&self) -> &DefaultsConfig {
        &self.defaults
    }

    /// Resolve a place name or `lat,lon` string
    pub async fn resolve(&self, place: &str) -> Result<Location> {
        if place.trim().is_empty() {
            return Err(PlannerError::validation("Location cannot be empty"));
        }
        LocationResolver::resolve(&self.geocoder, LocationParser::parse(place)).await
    }

    /// Weather summary for a place and date range
    #[instrument(skip(self))]
    pub async fn weather_report(&self, place: &str, start: NaiveDate, end: NaiveDate) -> Result<String> {
        let location = self.resolve(place).await?;
        self.weather_for(&location, start, end).await
    }

    /// Numbered list of attractions near a place
    #[instrument(skip(self))]
    pub async fn poi_report(&self, place: &str, query: PoiQuery) -> Result<String> {
        let location = self.resolve(place).await?;
        self.pois_for(&location, query).await
    }

    /// Day-by-day markdown itinerary
    #[instrument(skip(self))]
    pub async fn itinerary(
        &self,
        place: &str,
        start: NaiveDate,
        end: NaiveDate,
        daily_limit: usize,
    ) -> Result<String> {
        let location = self.resolve(place).await?;
        self.itinerary_for(&location, start, end, daily_limit).await
    }

    /// Weather, POIs and itinerary without the language model
    #[instrument(skip(self, request), fields(place = %request.place))]
    pub async fn direct_plan(&self, request: &TripRequest) -> Result<String> {
        let location = self.resolve(&request.place).await?;
        info!("Planning {} directly for {} day(s)", location.name, request.num_days());

        let weather = self.weather_for(&location, request.start, request.end).await?;
        let pois = self.pois_for(&location, DIRECT_POI_QUERY).await?;
        let itinerary = self
            .itinerary_for(
                &location,
                request.start,
                request.end,
                self.defaults.daily_limit as usize,
            )
            .await?;

        Ok(format!("{weather}\n\n{pois}\n\n{itinerary}"))
    }

    async fn weather_for(&self, location: &Location, start: NaiveDate, end: NaiveDate) -> Result<String> {
        let forecast = self.weather.daily_forecast(location, start, end).await?;
        Ok(render_weather_summary(location, start, end, &forecast))
    }

    async fn pois_for(&self, location: &Location, query: PoiQuery) -> Result<String> {
        let pois = self.pois.nearby(location, query).await?;
        Ok(render_poi_summary(location, &pois))
    }

    async fn itinerary_for(
        &self,
        location: &Location,
        start: NaiveDate,
        end: NaiveDate,
        daily_limit: usize,
    ) -> Result<String> {
        if end < start {
            return Err(PlannerError::validation(
                "end_date must be same or after start_date",
            ));
        }
        let num_days = crate::itinerary::trip_length(start, end);
        let query = PoiQuery {
            radius_m: self.defaults.itinerary_radius_m,
            limit: itinerary_pool_size(daily_limit, num_days),
        };

        let pois = self.pois.nearby(location, query).await?;
        let forecast = self.weather.daily_forecast(location, start, end).await?;
        Ok(compose_itinerary(location, start, end, &forecast, &pois, daily_limit))
    }
}

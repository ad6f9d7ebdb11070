//! Open-Meteo daily forecasts and local sunrise/sunset times

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use reqwest::Client;
use sunrise::{Coordinates, SolarDay, SolarEvent};
use tracing::{info, instrument};

use crate::config::ServicesConfig;
use crate::http::fetch_json;
use crate::models::{DailyForecast, Location};
use crate::{PlannerError, Result};

pub mod open_meteo;

/// Daily forecast client for the Open-Meteo API
#[derive(Debug, Clone)]
pub struct WeatherClient {
    client: Client,
    base_url: String,
}

impl WeatherClient {
    #[must_use]
    pub fn new(client: Client, services: &ServicesConfig) -> Self {
        Self {
            client,
            base_url: services.open_meteo_url.trim_end_matches('/').to_string(),
        }
    }

    /// Fetch one forecast entry per day between `start` and `end` (inclusive)
    #[instrument(skip(self, location), fields(location = %location.name))]
    pub async fn daily_forecast(
        &self,
        location: &Location,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<DailyForecast> {
        if end < start {
            return Err(PlannerError::validation(
                "end_date must be same or after start_date",
            ));
        }

        let url = format!("{}/forecast", self.base_url);
        let request = self.client.get(url).query(&[
            ("latitude", location.latitude.to_string()),
            ("longitude", location.longitude.to_string()),
            ("daily", open_meteo::DAILY_FIELDS.to_string()),
            ("start_date", start.to_string()),
            ("end_date", end.to_string()),
            ("timezone", "auto".to_string()),
        ]);

        let response: open_meteo::ForecastResponse = fetch_json(request, "Open-Meteo").await?;
        let days = match response.daily {
            Some(daily) => daily.into_forecast_days()?,
            None => Vec::new(),
        };

        info!(
            "Retrieved {} forecast days for {} ({} to {})",
            days.len(),
            location.name,
            start,
            end
        );

        Ok(DailyForecast {
            utc_offset_seconds: response.utc_offset_seconds,
            days,
        })
    }
}

/// Sunrise and sunset (UTC) for a location and date.
///
/// Polar day/night has no event; those fall back to 06:00 / 19:00 UTC.
pub fn get_sunrise_sunset(
    location: &Location,
    date: NaiveDate,
) -> Result<(DateTime<Utc>, DateTime<Utc>)> {
    let coordinates = Coordinates::new(location.latitude, location.longitude).ok_or_else(|| {
        PlannerError::validation(format!(
            "Invalid coordinates: lat={}, lng={}",
            location.latitude, location.longitude
        ))
    })?;

    let solar_day = SolarDay::new(coordinates, date);

    let sunrise = solar_day
        .event_time(SolarEvent::Sunrise)
        .unwrap_or_else(|| date.and_time(NaiveTime::MIN + chrono::Duration::hours(6)).and_utc());

    let sunset = solar_day
        .event_time(SolarEvent::Sunset)
        .unwrap_or_else(|| date.and_time(NaiveTime::MIN + chrono::Duration::hours(19)).and_utc());

    Ok((sunrise, sunset))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PlaceCategory;
    use chrono::Timelike;

    #[test]
    fn test_sunrise_before_sunset() {
        let location = Location::new(38.72, -9.14, "Lisbon".to_string(), PlaceCategory::City);
        let date = NaiveDate::from_ymd_opt(2025, 6, 21).unwrap();
        let (sunrise, sunset) = get_sunrise_sunset(&location, date).unwrap();
        assert!(sunrise < sunset);
        // Lisbon midsummer sunrise is a little after 05:00 UTC
        assert!((4..=6).contains(&sunrise.hour()));
    }

    #[test]
    fn test_invalid_coordinates_rejected() {
        let location = Location::new(123.0, 0.0, "Nowhere".to_string(), PlaceCategory::Other);
        let date = NaiveDate::from_ymd_opt(2025, 6, 21).unwrap();
        assert!(matches!(
            get_sunrise_sunset(&location, date),
            Err(PlannerError::Validation { .. })
        ));
    }

    #[tokio::test]
    async fn test_reversed_range_is_rejected_without_network() {
        let services = ServicesConfig {
            open_meteo_url: "http://127.0.0.1:9".to_string(),
            ..ServicesConfig::default()
        };
        let client = WeatherClient::new(Client::new(), &services);
        let location = Location::new(15.5, 73.8, "Goa".to_string(), PlaceCategory::Other);
        let result = client
            .daily_forecast(
                &location,
                NaiveDate::from_ymd_opt(2025, 7, 3).unwrap(),
                NaiveDate::from_ymd_opt(2025, 7, 1).unwrap(),
            )
            .await;
        assert!(matches!(result, Err(PlannerError::Validation { .. })));
    }
}

//! Daily weather forecast model

use chrono::{FixedOffset, NaiveDate, Offset, Utc};
use serde::{Deserialize, Serialize};

/// Precipitation (mm/day) at or above which a day counts as rainy
pub const RAIN_THRESHOLD_MM: f32 = 2.0;
/// Precipitation (mm/day) at or above which rain is considered heavy
pub const HEAVY_RAIN_THRESHOLD_MM: f32 = 10.0;

/// Forecast for a single day of the trip
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ForecastDay {
    /// Calendar date (local to the destination)
    pub date: NaiveDate,
    /// Human-readable condition summary
    pub condition: String,
    /// WMO weather code as reported by the provider
    pub weather_code: Option<u8>,
    /// Maximum temperature in Celsius
    pub temperature_max: Option<f32>,
    /// Minimum temperature in Celsius
    pub temperature_min: Option<f32>,
    /// Precipitation sum in mm
    pub precipitation_mm: Option<f32>,
}

/// Bucketed precipitation for the day
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrecipitationLevel {
    Dry,
    LightShowers,
    Rain,
    HeavyRain,
    Unknown,
}

impl ForecastDay {
    /// Whether the day should be planned around rain
    #[must_use]
    pub fn is_rainy(&self) -> bool {
        self.precipitation_mm
            .is_some_and(|mm| mm >= RAIN_THRESHOLD_MM)
    }

    #[must_use]
    pub fn precipitation_level(&self) -> PrecipitationLevel {
        match self.precipitation_mm {
            None => PrecipitationLevel::Unknown,
            Some(mm) if mm >= HEAVY_RAIN_THRESHOLD_MM => PrecipitationLevel::HeavyRain,
            Some(mm) if mm >= RAIN_THRESHOLD_MM => PrecipitationLevel::Rain,
            Some(mm) if mm > 0.0 => PrecipitationLevel::LightShowers,
            Some(_) => PrecipitationLevel::Dry,
        }
    }
}

/// Daily forecast for the requested date range
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
pub struct DailyForecast {
    /// Offset of the destination's local time from UTC, in seconds
    pub utc_offset_seconds: i32,
    /// One entry per day, ordered by date
    pub days: Vec<ForecastDay>,
}

impl DailyForecast {
    /// Forecast entry for the given date, if the provider returned one
    #[must_use]
    pub fn day(&self, date: NaiveDate) -> Option<&ForecastDay> {
        self.days.iter().find(|day| day.date == date)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }

    /// Destination time zone as a fixed offset (UTC when unknown or out of range)
    #[must_use]
    pub fn offset(&self) -> FixedOffset {
        FixedOffset::east_opt(self.utc_offset_seconds)
            .unwrap_or_else(|| Utc.fix())
    }
}

/// Format an optional measurement, falling back to "N/A"
pub(crate) fn format_optional(value: Option<f32>) -> String {
    value.map_or_else(|| "N/A".to_string(), |v| format!("{v:.1}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn day(precipitation: Option<f32>) -> ForecastDay {
        ForecastDay {
            date: NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(),
            condition: "Slight rain".to_string(),
            weather_code: Some(61),
            temperature_max: Some(18.0),
            temperature_min: Some(9.0),
            precipitation_mm: precipitation,
        }
    }

    #[rstest]
    #[case(None, PrecipitationLevel::Unknown, false)]
    #[case(Some(0.0), PrecipitationLevel::Dry, false)]
    #[case(Some(0.4), PrecipitationLevel::LightShowers, false)]
    #[case(Some(2.0), PrecipitationLevel::Rain, true)]
    #[case(Some(12.5), PrecipitationLevel::HeavyRain, true)]
    fn test_precipitation_levels(
        #[case] precipitation: Option<f32>,
        #[case] level: PrecipitationLevel,
        #[case] rainy: bool,
    ) {
        let forecast_day = day(precipitation);
        assert_eq!(forecast_day.precipitation_level(), level);
        assert_eq!(forecast_day.is_rainy(), rainy);
    }

    #[test]
    fn test_day_lookup_by_date() {
        let forecast = DailyForecast {
            utc_offset_seconds: 19_800,
            days: vec![day(Some(0.0))],
        };
        assert!(forecast.day(NaiveDate::from_ymd_opt(2025, 3, 1).unwrap()).is_some());
        assert!(forecast.day(NaiveDate::from_ymd_opt(2025, 3, 2).unwrap()).is_none());
        assert_eq!(forecast.offset().local_minus_utc(), 19_800);
    }

    #[test]
    fn test_format_optional() {
        assert_eq!(format_optional(Some(21.04)), "21.0");
        assert_eq!(format_optional(None), "N/A");
    }
}

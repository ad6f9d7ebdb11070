//! `OpenMeteo` API response structures and conversion utilities

use chrono::NaiveDate;
use serde::Deserialize;

use crate::models::ForecastDay;
use crate::{PlannerError, Result};

/// Daily fields requested from the forecast endpoint
pub const DAILY_FIELDS: &str = "temperature_2m_max,temperature_2m_min,precipitation_sum,weathercode";

/// Forecast response from the `OpenMeteo` API
#[derive(Debug, Deserialize)]
pub struct ForecastResponse {
    #[serde(default)]
    pub utc_offset_seconds: i32,
    pub daily: Option<DailyData>,
}

/// Daily weather data from `OpenMeteo`
#[derive(Debug, Deserialize)]
pub struct DailyData {
    pub time: Vec<String>,
    #[serde(rename = "temperature_2m_max")]
    pub temperature_max: Option<Vec<Option<f32>>>,
    #[serde(rename = "temperature_2m_min")]
    pub temperature_min: Option<Vec<Option<f32>>>,
    #[serde(rename = "precipitation_sum")]
    pub precipitation: Option<Vec<Option<f32>>>,
    #[serde(rename = "weathercode")]
    pub weather_code: Option<Vec<Option<u8>>>,
}

fn value_at<T: Copy>(series: Option<&Vec<Option<T>>>, i: usize) -> Option<T> {
    series.and_then(|values| values.get(i)).and_then(|&value| value)
}

impl DailyData {
    /// Convert the column-oriented payload into one [`ForecastDay`] per date
    pub fn into_forecast_days(self) -> Result<Vec<ForecastDay>> {
        self.time
            .iter()
            .enumerate()
            .map(|(i, time)| {
                let date = NaiveDate::parse_from_str(time, "%Y-%m-%d").map_err(|e| {
                    PlannerError::api(format!("Invalid date '{time}' in forecast response: {e}"))
                })?;
                let weather_code = value_at(self.weather_code.as_ref(), i);

                Ok(ForecastDay {
                    date,
                    condition: weather_code
                        .map_or("Unknown", weather_code_to_description)
                        .to_string(),
                    weather_code,
                    temperature_max: value_at(self.temperature_max.as_ref(), i),
                    temperature_min: value_at(self.temperature_min.as_ref(), i),
                    precipitation_mm: value_at(self.precipitation.as_ref(), i),
                })
            })
            .collect()
    }
}

/// Convert `OpenMeteo` weather code to human-readable description
#[must_use]
pub fn weather_code_to_description(code: u8) -> &'static str {
    match code {
        0 => "Clear sky",
        1 => "Mainly clear",
        2 => "Partly cloudy",
        3 => "Overcast",
        45 => "Fog",
        48 => "Depositing rime fog",
        51 => "Light drizzle",
        53 => "Moderate drizzle",
        55 => "Dense drizzle",
        56 => "Light freezing drizzle",
        57 => "Dense freezing drizzle",
        61 => "Slight rain",
        63 => "Moderate rain",
        65 => "Heavy rain",
        66 => "Light freezing rain",
        67 => "Heavy freezing rain",
        71 => "Slight snow fall",
        73 => "Moderate snow fall",
        75 => "Heavy snow fall",
        77 => "Snow grains",
        80 => "Slight rain showers",
        81 => "Moderate rain showers",
        82 => "Violent rain showers",
        85 => "Slight snow showers",
        86 => "Heavy snow showers",
        95 => "Thunderstorm",
        96 => "Thunderstorm with slight hail",
        99 => "Thunderstorm with heavy hail",
        _ => "Unknown",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_daily_response() {
        let json = r#"{
            "latitude": 15.5,
            "longitude": 73.75,
            "utc_offset_seconds": 19800,
            "timezone": "Asia/Kolkata",
            "daily": {
                "time": ["2025-07-01", "2025-07-02"],
                "temperature_2m_max": [29.8, 28.1],
                "temperature_2m_min": [25.0, null],
                "precipitation_sum": [14.2, 0.0],
                "weathercode": [63, 1]
            }
        }"#;

        let response: ForecastResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.utc_offset_seconds, 19_800);

        let days = response.daily.unwrap().into_forecast_days().unwrap();
        assert_eq!(days.len(), 2);
        assert_eq!(days[0].condition, "Moderate rain");
        assert!(days[0].is_rainy());
        assert_eq!(days[1].temperature_min, None);
        assert_eq!(days[1].condition, "Mainly clear");
        assert!(!days[1].is_rainy());
    }

    #[test]
    fn test_missing_series_become_none() {
        let data = DailyData {
            time: vec!["2025-01-01".to_string()],
            temperature_max: None,
            temperature_min: None,
            precipitation: Some(vec![]),
            weather_code: None,
        };
        let days = data.into_forecast_days().unwrap();
        assert_eq!(days[0].precipitation_mm, None);
        assert_eq!(days[0].condition, "Unknown");
    }

    #[test]
    fn test_invalid_date_is_an_api_error() {
        let data = DailyData {
            time: vec!["01/01/2025".to_string()],
            temperature_max: None,
            temperature_min: None,
            precipitation: None,
            weather_code: None,
        };
        assert!(matches!(
            data.into_forecast_days(),
            Err(PlannerError::Api { .. })
        ));
    }

    #[test]
    fn test_weather_code_descriptions() {
        assert_eq!(weather_code_to_description(0), "Clear sky");
        assert_eq!(weather_code_to_description(95), "Thunderstorm");
        assert_eq!(weather_code_to_description(42), "Unknown");
    }
}

//! Markdown rendering for forecasts, POI lists and day-by-day itineraries
//!
//! Everything here is pure: callers fetch the data, these functions only
//! arrange it.

use std::collections::HashSet;

use chrono::NaiveDate;

use crate::models::forecast::format_optional;
use crate::models::{
    DailyForecast, ForecastDay, Location, PlaceCategory, PoiCategory, PointOfInterest,
    PrecipitationLevel,
};
use crate::weather::get_sunrise_sunset;

/// Most POIs placed on one day (morning, afternoon, evening)
pub const MAX_DAILY_SLOTS: usize = 3;

pub const INDOOR_SUGGESTION: &str = "Indoor suggestion";
pub const OUTDOOR_SUGGESTION: &str = "Good weather for walking";
pub const SUNRISE_WALK: &str = "Sunrise/sunset walk";
pub const HIKING_SUGGESTION: &str = "Hiking/trekking";

const FREE_SLOT: &str = "Free / explore locally";
const EVENING_SLOT: &str = "Dinner / relax";

/// One planned day
#[derive(Debug, Clone, PartialEq)]
pub struct DayPlan {
    pub date: NaiveDate,
    pub rainy: bool,
    /// POI names in slot order; at most the daily limit
    pub activities: Vec<String>,
    pub notes: Vec<String>,
}

impl DayPlan {
    fn slot(&self, index: usize) -> &str {
        self.activities
            .get(index)
            .map(String::as_str)
            .unwrap_or(if index < 2 { FREE_SLOT } else { EVENING_SLOT })
    }
}

/// Dates from `start` to `end`, inclusive
fn trip_dates(start: NaiveDate, end: NaiveDate) -> Vec<NaiveDate> {
    start
        .iter_days()
        .take_while(|date| *date <= end)
        .collect()
}

/// Weather remarks for a single day
fn weather_notes(day: Option<&ForecastDay>) -> Vec<String> {
    let Some(day) = day else {
        return vec!["No specific weather notes".to_string()];
    };

    let mut notes = Vec::new();
    match day.precipitation_level() {
        PrecipitationLevel::HeavyRain => {
            notes.push("Heavy rain expected, favor indoor activities".to_string());
        }
        PrecipitationLevel::Rain => notes.push("Chance of rain, have indoor alternatives".to_string()),
        PrecipitationLevel::LightShowers => notes.push("Light showers possible".to_string()),
        PrecipitationLevel::Dry => notes.push(OUTDOOR_SUGGESTION.to_string()),
        PrecipitationLevel::Unknown => {}
    }

    match day.temperature_max {
        Some(max) if max >= 30.0 => notes.push("Hot during day".to_string()),
        Some(max) if max <= 15.0 => notes.push("Cool day, bring a jacket".to_string()),
        _ => {}
    }

    if notes.is_empty() {
        notes.push("No specific weather notes".to_string());
    }
    notes
}

/// Assign POIs to days and annotate each day.
///
/// POIs are handed out round-robin without repeats. On rainy days outdoor
/// POIs are skipped in the first pass; any slots still empty are then filled
/// from whatever has not been assigned yet.
#[must_use]
pub fn plan_days(
    location: &Location,
    start: NaiveDate,
    end: NaiveDate,
    forecast: &DailyForecast,
    pois: &[PointOfInterest],
    daily_limit: usize,
) -> Vec<DayPlan> {
    let daily_limit = daily_limit.clamp(1, MAX_DAILY_SLOTS);
    let has_beach = location.category == PlaceCategory::Beach
        || pois.iter().any(|poi| poi.category == PoiCategory::Beach);
    let mountain_poi = pois.iter().find(|poi| poi.category == PoiCategory::Mountain);
    let has_mountain = location.category == PlaceCategory::Mountain || mountain_poi.is_some();

    let mut assigned: HashSet<&str> = HashSet::new();
    let mut cursor = 0usize;
    let mut plans = Vec::new();

    for date in trip_dates(start, end) {
        let day = forecast.day(date);
        let rainy = day.is_some_and(ForecastDay::is_rainy);

        let mut activities: Vec<&PointOfInterest> = Vec::new();
        let max_attempts = pois.len().max(1) * 2;
        let mut attempts = 0;
        while !pois.is_empty() && activities.len() < daily_limit && attempts < max_attempts {
            let poi = &pois[cursor % pois.len()];
            cursor += 1;
            attempts += 1;
            if assigned.contains(poi.name.as_str()) || (rainy && !poi.is_indoor()) {
                continue;
            }
            assigned.insert(&poi.name);
            activities.push(poi);
        }

        for poi in pois {
            if activities.len() >= daily_limit {
                break;
            }
            if assigned.insert(&poi.name) {
                activities.push(poi);
            }
        }

        let mut notes = weather_notes(day);
        if rainy {
            let indoor = activities
                .iter()
                .find(|poi| poi.is_indoor())
                .map_or("museums, galleries or a long lunch", |poi| poi.name.as_str());
            notes.push(format!("{INDOOR_SUGGESTION}: {indoor}"));
        } else {
            if has_beach {
                notes.push(sunrise_walk_note(location, date, forecast));
            }
            if has_mountain {
                let target = mountain_poi.map_or("nearby trails", |poi| poi.name.as_str());
                notes.push(format!("{HIKING_SUGGESTION} around {target}"));
            }
        }

        plans.push(DayPlan {
            date,
            rainy,
            activities: activities.iter().map(|poi| poi.name.clone()).collect(),
            notes,
        });
    }

    plans
}

fn sunrise_walk_note(location: &Location, date: NaiveDate, forecast: &DailyForecast) -> String {
    match get_sunrise_sunset(location, date) {
        Ok((sunrise, sunset)) => {
            let offset = forecast.offset();
            format!(
                "{SUNRISE_WALK} (sunrise {}, sunset {})",
                sunrise.with_timezone(&offset).format("%H:%M"),
                sunset.with_timezone(&offset).format("%H:%M")
            )
        }
        Err(_) => SUNRISE_WALK.to_string(),
    }
}

fn escape_cell(text: &str) -> String {
    text.replace('|', "\\|").replace('\n', " ")
}

/// Render the full markdown itinerary
#[must_use]
pub fn compose_itinerary(
    location: &Location,
    start: NaiveDate,
    end: NaiveDate,
    forecast: &DailyForecast,
    pois: &[PointOfInterest],
    daily_limit: usize,
) -> String {
    let plans = plan_days(location, start, end, forecast, pois, daily_limit);

    let rows: Vec<String> = plans
        .iter()
        .enumerate()
        .map(|(i, plan)| {
            format!(
                "| {} ({}) | {} | {} | {} | {} |",
                i + 1,
                plan.date,
                escape_cell(plan.slot(0)),
                escape_cell(plan.slot(1)),
                escape_cell(plan.slot(2)),
                escape_cell(&plan.notes.join("; "))
            )
        })
        .collect();

    let considered = if pois.is_empty() {
        "No POIs found.".to_string()
    } else {
        pois.iter()
            .map(|poi| format!("- {} ({})", poi.name, poi.kinds))
            .collect::<Vec<_>>()
            .join("\n")
    };

    let mut md = format!("# Itinerary for {}\nDates: {start} to {end}\n\n", location.name);
    md.push_str(&format!("**Place type:** {}\n", location.category));
    md.push_str(&format!("**Links:** {}\n\n", location.links.summary_line()));
    md.push_str("## Travel Itinerary\n\n");
    md.push_str("| Day | Morning | Afternoon | Evening | Notes |\n");
    md.push_str("|---:|---|---|---|---|\n");
    md.push_str(&rows.join("\n"));
    md.push_str("\n\n## POIs considered\n");
    md.push_str(&considered);
    md.push('\n');
    md
}

/// Per-day weather lines followed by the location links
#[must_use]
pub fn render_weather_summary(
    location: &Location,
    start: NaiveDate,
    end: NaiveDate,
    forecast: &DailyForecast,
) -> String {
    if forecast.is_empty() {
        return format!(
            "WARNING: No weather data for {} between {start} and {end}. Links: {} | {}",
            location.name, location.links.openstreetmap, location.links.google_maps
        );
    }

    let lines: Vec<String> = forecast
        .days
        .iter()
        .map(|day| {
            format!(
                "- {}: {}, max {}°C, min {}°C, precipitation {} mm",
                day.date,
                day.condition,
                format_optional(day.temperature_max),
                format_optional(day.temperature_min),
                format_optional(day.precipitation_mm)
            )
        })
        .collect();

    format!(
        "Weather for {} ({start} to {end}):\n{}\n\nLocation links: {}",
        location.name,
        lines.join("\n"),
        location.links.summary_line()
    )
}

/// Numbered POI list followed by the location links
#[must_use]
pub fn render_poi_summary(location: &Location, pois: &[PointOfInterest]) -> String {
    if pois.is_empty() {
        return format!("WARNING: No POIs found for {}.", location.name);
    }

    let lines: Vec<String> = pois
        .iter()
        .enumerate()
        .map(|(i, poi)| {
            let distance = poi
                .distance_m
                .map_or_else(|| "N/A".to_string(), |d| format!("{d:.0} m"));
            format!(
                "{}. {} ({}), kinds: {}, dist: {}",
                i + 1,
                poi.name,
                poi.category,
                poi.kinds,
                distance
            )
        })
        .collect();

    format!(
        "Top {} POIs near {}:\n{}\n\nLocation links: {}",
        pois.len(),
        location.name,
        lines.join("\n"),
        location.links.summary_line()
    )
}

/// Number of days from `start` to `end`, inclusive
#[must_use]
pub fn trip_length(start: NaiveDate, end: NaiveDate) -> usize {
    if end < start {
        return 0;
    }
    usize::try_from((end - start).num_days() + 1).unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 7, day).unwrap()
    }

    fn forecast_day(day: u32, precipitation: f32, max: f32) -> ForecastDay {
        ForecastDay {
            date: date(day),
            condition: "Partly cloudy".to_string(),
            weather_code: Some(2),
            temperature_max: Some(max),
            temperature_min: Some(max - 8.0),
            precipitation_mm: Some(precipitation),
        }
    }

    fn goa() -> Location {
        Location::new(15.5439, 73.7553, "Calangute, Goa".to_string(), PlaceCategory::City)
    }

    fn row_for<'a>(markdown: &'a str, date: NaiveDate) -> &'a str {
        markdown
            .lines()
            .find(|line| line.contains(&format!("({date})")))
            .expect("row for date")
    }

    #[test]
    fn test_rainy_day_gets_indoor_marker_only() {
        let forecast = DailyForecast {
            utc_offset_seconds: 19_800,
            days: vec![forecast_day(1, 14.0, 28.0), forecast_day(2, 0.0, 27.0)],
        };
        let pois = vec![
            PointOfInterest::new("Fort Aguada", "fortifications,historic"),
            PointOfInterest::new("Goa State Museum", "museums,cultural"),
            PointOfInterest::new("Anjuna Flea Market", "marketplace"),
        ];

        let md = compose_itinerary(&goa(), date(1), date(2), &forecast, &pois, 3);
        let rainy_row = row_for(&md, date(1));
        assert!(rainy_row.contains(INDOOR_SUGGESTION));
        assert!(rainy_row.contains("Goa State Museum"));
        assert!(!rainy_row.contains(OUTDOOR_SUGGESTION));

        let dry_row = row_for(&md, date(2));
        assert!(dry_row.contains(OUTDOOR_SUGGESTION));
        assert!(!dry_row.contains(INDOOR_SUGGESTION));
    }

    #[test]
    fn test_rainy_day_prefers_indoor_pois_then_tops_up() {
        let forecast = DailyForecast {
            utc_offset_seconds: 0,
            days: vec![forecast_day(1, 5.0, 20.0)],
        };
        let pois = vec![
            PointOfInterest::new("City Park", "park"),
            PointOfInterest::new("Art Gallery", "gallery"),
            PointOfInterest::new("Old Bridge", "historic"),
        ];

        let plans = plan_days(&goa(), date(1), date(1), &forecast, &pois, 3);
        assert!(plans[0].rainy);
        assert_eq!(plans[0].activities[0], "Art Gallery");
        assert_eq!(plans[0].activities.len(), 3);
    }

    #[test]
    fn test_beach_poi_adds_sunrise_walk() {
        let forecast = DailyForecast {
            utc_offset_seconds: 19_800,
            days: vec![forecast_day(1, 0.0, 31.0)],
        };
        let pois = vec![PointOfInterest::new("Baga Beach", "beaches,natural")];

        let md = compose_itinerary(&goa(), date(1), date(1), &forecast, &pois, 3);
        let row = row_for(&md, date(1));
        assert!(row.contains(SUNRISE_WALK));
        assert!(row.contains("sunrise 06:"));
        assert!(row.contains("Hot during day"));
    }

    #[test]
    fn test_mountain_poi_adds_hiking() {
        let location = Location::new(32.24, 77.19, "Manali".to_string(), PlaceCategory::City);
        let forecast = DailyForecast {
            utc_offset_seconds: 19_800,
            days: vec![forecast_day(1, 0.4, 14.0)],
        };
        let pois = vec![PointOfInterest::new("Hampta Pass", "mountain_peaks,natural")];

        let md = compose_itinerary(&location, date(1), date(1), &forecast, &pois, 2);
        let row = row_for(&md, date(1));
        assert!(row.contains(HIKING_SUGGESTION));
        assert!(row.contains("Hampta Pass"));
        assert!(row.contains("Light showers possible"));
        assert!(row.contains("Cool day, bring a jacket"));
    }

    #[test]
    fn test_viewpoint_poi_adds_hiking() {
        let location = Location::new(46.69, 7.86, "Interlaken".to_string(), PlaceCategory::City);
        let forecast = DailyForecast {
            utc_offset_seconds: 7_200,
            days: vec![forecast_day(1, 0.0, 21.0)],
        };
        let pois = vec![PointOfInterest::new("Summit Lookout", "viewpoint")];

        let plans = plan_days(&location, date(1), date(1), &forecast, &pois, 1);
        assert_eq!(pois[0].category, PoiCategory::Mountain);
        assert!(
            plans[0]
                .notes
                .iter()
                .any(|note| note == &format!("{HIKING_SUGGESTION} around Summit Lookout")),
            "{:?}",
            plans[0].notes
        );
    }

    #[test]
    fn test_rainy_day_suppresses_outdoor_suggestions() {
        let forecast = DailyForecast {
            utc_offset_seconds: 0,
            days: vec![forecast_day(1, 3.0, 22.0)],
        };
        let pois = vec![
            PointOfInterest::new("Baga Beach", "beaches"),
            PointOfInterest::new("Hill Top", "mountain_peaks"),
        ];
        let plans = plan_days(&goa(), date(1), date(1), &forecast, &pois, 3);
        let notes = plans[0].notes.join("; ");
        assert!(notes.contains(INDOOR_SUGGESTION));
        assert!(!notes.contains(SUNRISE_WALK));
        assert!(!notes.contains(HIKING_SUGGESTION));
    }

    #[test]
    fn test_no_pois_and_no_weather() {
        let md = compose_itinerary(&goa(), date(1), date(3), &DailyForecast::default(), &[], 3);
        let row = row_for(&md, date(2));
        assert!(row.contains("Free / explore locally"));
        assert!(row.contains("Dinner / relax"));
        assert!(row.contains("No specific weather notes"));
        assert!(md.contains("No POIs found."));
        assert!(md.starts_with("# Itinerary for Calangute, Goa"));
    }

    #[test]
    fn test_pois_are_not_repeated_across_days() {
        let pois: Vec<_> = (0..4)
            .map(|i| PointOfInterest::new(format!("Spot {i}"), "attraction"))
            .collect();
        let plans = plan_days(&goa(), date(1), date(3), &DailyForecast::default(), &pois, 2);
        let all: Vec<_> = plans.iter().flat_map(|p| p.activities.clone()).collect();
        assert_eq!(all.len(), 4);
        assert_eq!(all.iter().collect::<HashSet<_>>().len(), 4);
        assert!(plans[2].activities.is_empty());
    }

    #[test]
    fn test_cells_are_escaped() {
        let pois = vec![PointOfInterest::new("Bar | Grill", "attraction")];
        let md = compose_itinerary(&goa(), date(1), date(1), &DailyForecast::default(), &pois, 1);
        assert!(md.contains("Bar \\| Grill"));
    }

    #[test]
    fn test_weather_summary() {
        let forecast = DailyForecast {
            utc_offset_seconds: 0,
            days: vec![forecast_day(1, 0.0, 25.0)],
        };
        let summary = render_weather_summary(&goa(), date(1), date(1), &forecast);
        assert!(summary.starts_with("Weather for Calangute, Goa (2025-07-01 to 2025-07-01):"));
        assert!(summary.contains("max 25.0°C, min 17.0°C, precipitation 0.0 mm"));
        assert!(summary.contains("Location links: https://www.openstreetmap.org/"));

        let empty = render_weather_summary(&goa(), date(1), date(1), &DailyForecast::default());
        assert!(empty.starts_with("WARNING: No weather data"));
    }

    #[test]
    fn test_poi_summary() {
        let pois = vec![PointOfInterest::new("Fort Aguada", "historic").with_distance(Some(1234.4))];
        let summary = render_poi_summary(&goa(), &pois);
        assert!(summary.starts_with("Top 1 POIs near Calangute, Goa:"));
        assert!(summary.contains("1. Fort Aguada (historic), kinds: historic, dist: 1234 m"));
        assert_eq!(render_poi_summary(&goa(), &[]), "WARNING: No POIs found for Calangute, Goa.");
    }

    #[test]
    fn test_trip_length() {
        assert_eq!(trip_length(date(1), date(3)), 3);
        assert_eq!(trip_length(date(3), date(1)), 0);
    }
}

//! Trip input: place and date parsing, plus interactive prompting for
//! whatever the command line left out

use chrono::NaiveDate;
use inquire::{InquireError, Text};
use tracing::debug;

use crate::{PlannerError, Result};

/// Date formats accepted on the command line and in tool arguments
const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%Y/%m/%d", "%d.%m.%Y"];

/// Location input that can be coordinates or a place name
#[derive(Debug, Clone, PartialEq)]
pub enum LocationInput {
    Coordinates(f64, f64),
    Name(String),
}

/// Location parser for user input
pub struct LocationParser;

impl LocationParser {
    /// Parse location input: `lat,lon` / `lat lon` within valid ranges, else a name
    #[must_use]
    pub fn parse(input: &str) -> LocationInput {
        let input = input.trim();

        if let Ok((lat, lon)) = Self::parse_coordinates(input) {
            return LocationInput::Coordinates(lat, lon);
        }

        LocationInput::Name(input.to_string())
    }

    /// Parse coordinates from string like "46.8182,8.2275" or "46.8182 8.2275"
    fn parse_coordinates(input: &str) -> Result<(f64, f64)> {
        let parts: Vec<&str> = input
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|s| !s.is_empty())
            .collect();

        if parts.len() != 2 {
            return Err(PlannerError::validation(
                "Coordinates must be in format 'lat,lon'",
            ));
        }

        let lat = parts[0]
            .parse::<f64>()
            .map_err(|_| PlannerError::validation(format!("Invalid latitude: {}", parts[0])))?;
        let lon = parts[1]
            .parse::<f64>()
            .map_err(|_| PlannerError::validation(format!("Invalid longitude: {}", parts[1])))?;

        if !(-90.0..=90.0).contains(&lat) {
            return Err(PlannerError::validation(format!(
                "Latitude must be between -90 and 90, got: {lat}"
            )));
        }

        if !(-180.0..=180.0).contains(&lon) {
            return Err(PlannerError::validation(format!(
                "Longitude must be between -180 and 180, got: {lon}"
            )));
        }

        Ok((lat, lon))
    }
}

/// Parse a calendar date in one of the accepted formats
pub fn parse_date(input: &str) -> Result<NaiveDate> {
    let input = input.trim();
    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(input, format).ok())
        .ok_or_else(|| {
            PlannerError::validation(format!("Dates must be YYYY-MM-DD, got '{input}'"))
        })
}

/// A validated trip request
#[derive(Debug, Clone, PartialEq)]
pub struct TripRequest {
    pub place: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl TripRequest {
    /// Build a request, rejecting empty places and reversed date ranges
    pub fn new(place: impl Into<String>, start: NaiveDate, end: NaiveDate) -> Result<Self> {
        let place = place.into().trim().to_string();
        if place.is_empty() {
            return Err(PlannerError::validation("No place provided"));
        }
        if end < start {
            return Err(PlannerError::validation(
                "end_date must be same or after start_date",
            ));
        }
        Ok(Self { place, start, end })
    }

    #[must_use]
    pub fn location_input(&self) -> LocationInput {
        LocationParser::parse(&self.place)
    }

    /// Trip length in days, inclusive of both ends
    #[must_use]
    pub fn num_days(&self) -> usize {
        crate::itinerary::trip_length(self.start, self.end)
    }

    /// Query sent to the language model for this trip
    #[must_use]
    pub fn user_query(&self) -> String {
        format!(
            "I want a trip plan to {} from {} to {}. Provide weather, POIs, and an itinerary table with Notes.",
            self.place, self.start, self.end
        )
    }
}

/// Source of answers for values missing from the command line
pub trait Prompter {
    /// Ask for a value; an empty answer means "use the default"
    fn ask(&self, message: &str, default: Option<&str>) -> Result<String>;
}

/// Terminal prompts via `inquire`
#[derive(Debug, Default)]
pub struct InquirePrompter;

impl Prompter for InquirePrompter {
    fn ask(&self, message: &str, default: Option<&str>) -> Result<String> {
        let mut prompt = Text::new(message);
        if let Some(default) = default {
            prompt = prompt.with_default(default);
        }
        prompt.prompt().map_err(|e| match e {
            InquireError::OperationCanceled | InquireError::OperationInterrupted => {
                PlannerError::validation("Input cancelled")
            }
            InquireError::IO(source) => PlannerError::Io { source },
            other => PlannerError::validation(format!("Could not read input: {other}")),
        })
    }
}

/// Combine command-line values with prompts for anything missing.
///
/// The start date defaults to `today`, the end date to the start date.
pub fn resolve_trip_request(
    city: Option<String>,
    start: Option<String>,
    end: Option<String>,
    today: NaiveDate,
    prompter: &dyn Prompter,
) -> Result<TripRequest> {
    let city = match city.filter(|c| !c.trim().is_empty()) {
        Some(city) => city,
        None => prompter.ask("Enter place:", None)?,
    };
    if city.trim().is_empty() {
        return Err(PlannerError::validation("No place provided"));
    }

    let start = match start {
        Some(start) => start,
        None => prompter.ask("Start date (YYYY-MM-DD):", Some(&today.to_string()))?,
    };
    let start = if start.trim().is_empty() {
        today
    } else {
        parse_date(&start)?
    };

    let end = match end {
        Some(end) => end,
        None => prompter.ask("End date (YYYY-MM-DD):", Some(&start.to_string()))?,
    };
    let end = if end.trim().is_empty() {
        start
    } else {
        parse_date(&end)?
    };

    debug!("Trip request: {} from {} to {}", city, start, end);
    TripRequest::new(city, start, end)
}

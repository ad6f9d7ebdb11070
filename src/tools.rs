//! Tools exposed to the language model
//!
//! Arguments arrive as loosely typed JSON: numbers may come as strings and
//! anything unparseable falls back to the documented default.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Local, NaiveDate};
use serde_json::{Value, json};
use tracing::{debug, info};

use crate::input::parse_date;
use crate::itinerary::MAX_DAILY_SLOTS;
use crate::llm::ToolDefinition;
use crate::planner::TripPlanner;
use crate::poi::PoiQuery;
use crate::{PlannerError, Result};

#[async_trait]
pub trait Tool: Send + Sync {
    fn definition(&self) -> ToolDefinition;
    async fn execute(&self, arguments: Value) -> Result<String>;
}

/// Tools by name, listed in name order
#[derive(Default)]
pub struct ToolRegistry {
    tools: BTreeMap<String, Arc<dyn Tool>>,
}

impl ToolRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the weather, POI and itinerary tools
    #[must_use]
    pub fn for_planner(planner: Arc<TripPlanner>) -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(WeatherTool::new(planner.clone())));
        registry.register(Arc::new(PoiTool::new(planner.clone())));
        registry.register(Arc::new(ItineraryTool::new(planner)));
        registry
    }

    pub fn register(&mut self, tool: Arc<dyn Tool>) {
        let name = tool.definition().name;
        self.tools.insert(name, tool);
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools.get(name).cloned()
    }

    #[must_use]
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.tools.values().map(|tool| tool.definition()).collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

/// Required string argument; numbers are accepted and stringified
pub fn string_arg(arguments: &Value, key: &str) -> Result<String> {
    optional_string_arg(arguments, key)
        .ok_or_else(|| PlannerError::validation(format!("Missing required argument '{key}'")))
}

#[must_use]
pub fn optional_string_arg(arguments: &Value, key: &str) -> Option<String> {
    match arguments.get(key)? {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Positive integer argument given as a number or numeric string, else `default`
#[must_use]
pub fn int_arg(arguments: &Value, key: &str, default: u64) -> u64 {
    let parsed = match arguments.get(key) {
        Some(Value::Number(n)) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| *f >= 0.0).map(|f| f as u64)),
        Some(Value::String(s)) => {
            let s = s.trim();
            s.parse::<u64>()
                .ok()
                .or_else(|| s.parse::<f64>().ok().filter(|f| *f >= 0.0).map(|f| f as u64))
        }
        _ => None,
    };
    parsed.filter(|value| *value > 0).unwrap_or(default)
}

/// Optional date argument; present but malformed is a validation error
pub fn date_arg(arguments: &Value, key: &str) -> Result<Option<NaiveDate>> {
    optional_string_arg(arguments, key)
        .map(|raw| {
            parse_date(&raw).map_err(|_| PlannerError::validation("Dates must be YYYY-MM-DD."))
        })
        .transpose()
}

fn city_schema() -> Value {
    json!({"type": "string", "description": "City or place name, or 'lat,lon'"})
}

fn date_schema() -> Value {
    json!({"type": "string", "description": "Date as YYYY-MM-DD"})
}

/// `weather_tool(city, start_date, end_date)`
pub struct WeatherTool {
    planner: Arc<TripPlanner>,
}

impl WeatherTool {
    #[must_use]
    pub fn new(planner: Arc<TripPlanner>) -> Self {
        Self { planner }
    }
}

#[async_trait]
impl Tool for WeatherTool {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: "weather_tool".to_string(),
            description: "Return weather summary for a city and date range. Start date defaults to today, end date to the start date.".to_string(),
            parameters: json!({
                "type": "object",
                "properties": {
                    "city": city_schema(),
                    "start_date": date_schema(),
                    "end_date": date_schema()
                },
                "required": ["city"]
            }),
        }
    }

    async fn execute(&self, arguments: Value) -> Result<String> {
        let city = string_arg(&arguments, "city")?;
        let start = date_arg(&arguments, "start_date")?.unwrap_or_else(|| Local::now().date_naive());
        let end = date_arg(&arguments, "end_date")?.unwrap_or(start);
        info!("weather_tool: {} {} to {}", city, start, end);
        self.planner.weather_report(&city, start, end).await
    }
}

/// `poi_tool(city, radius, limit)`
pub struct PoiTool {
    planner: Arc<TripPlanner>,
}

impl PoiTool {
    #[must_use]
    pub fn new(planner: Arc<TripPlanner>) -> Self {
        Self { planner }
    }
}

#[async_trait]
impl Tool for PoiTool {
    fn definition(&self) -> ToolDefinition {
        let defaults = self.planner.defaults();
        ToolDefinition {
            name: "poi_tool".to_string(),
            description: "Return points of interest near a city. radius is in meters.".to_string(),
            parameters: json!({
                "type": "object",
                "properties": {
                    "city": city_schema(),
                    "radius": {"type": "integer", "description": "Search radius in meters", "default": defaults.poi_radius_m},
                    "limit": {"type": "integer", "description": "Maximum number of POIs", "default": defaults.poi_limit}
                },
                "required": ["city"]
            }),
        }
    }

    async fn execute(&self, arguments: Value) -> Result<String> {
        let defaults = self.planner.defaults();
        let city = string_arg(&arguments, "city")?;
        let radius = int_arg(&arguments, "radius", defaults.poi_radius_m.into()).min(50_000);
        let limit = int_arg(&arguments, "limit", defaults.poi_limit.into()).min(100);
        let query = PoiQuery {
            radius_m: u32::try_from(radius).unwrap_or(defaults.poi_radius_m),
            limit: usize::try_from(limit).unwrap_or(8),
        };
        info!("poi_tool: {} radius={}m limit={}", city, query.radius_m, query.limit);
        self.planner.poi_report(&city, query).await
    }
}

/// `itinerary_tool(city, start_date, end_date, daily_limit)`
pub struct ItineraryTool {
    planner: Arc<TripPlanner>,
}

impl ItineraryTool {
    #[must_use]
    pub fn new(planner: Arc<TripPlanner>) -> Self {
        Self { planner }
    }
}

#[async_trait]
impl Tool for ItineraryTool {
    fn definition(&self) -> ToolDefinition {
        let defaults = self.planner.defaults();
        ToolDefinition {
            name: "itinerary_tool".to_string(),
            description: "Return a markdown day-by-day itinerary table with a Notes column.".to_string(),
            parameters: json!({
                "type": "object",
                "properties": {
                    "city": city_schema(),
                    "start_date": date_schema(),
                    "end_date": date_schema(),
                    "daily_limit": {"type": "integer", "description": "Activities per day (1-3)", "default": defaults.daily_limit}
                },
                "required": ["city", "start_date", "end_date"]
            }),
        }
    }

    async fn execute(&self, arguments: Value) -> Result<String> {
        let city = string_arg(&arguments, "city")?;
        let start = date_arg(&arguments, "start_date")?
            .ok_or_else(|| PlannerError::validation("Missing required argument 'start_date'"))?;
        let end = date_arg(&arguments, "end_date")?
            .ok_or_else(|| PlannerError::validation("Missing required argument 'end_date'"))?;
        if end < start {
            return Err(PlannerError::validation(
                "end_date must be same or after start_date.",
            ));
        }
        let daily_limit = int_arg(&arguments, "daily_limit", self.planner.defaults().daily_limit.into())
            .clamp(1, MAX_DAILY_SLOTS as u64) as usize;

        debug!("itinerary_tool: {} {} to {} ({} per day)", city, start, end, daily_limit);
        self.planner.itinerary(&city, start, end, daily_limit).await
    }
}

//! Tool-calling loop between the language model and the trip tools

use serde_json::Value;
use tracing::{debug, info, instrument, warn};

use crate::llm::{ChatMessage, ChatModel, ToolCall};
use crate::tools::ToolRegistry;
use crate::{PlannerError, Result};

pub const SYSTEM_PROMPT: &str = "You are a travel-planning supervisor. Tools available:\n\
- weather_tool(city, start_date, end_date) -> returns weather summary\n\
- poi_tool(city, radius, limit) -> returns POIs list\n\
- itinerary_tool(city, start_date, end_date, daily_limit) -> returns itinerary\n\n\
When calling tools, send city names and dates as strings and numeric values as integers.\n\
Produce a final reply containing weather, POIs, and a day-by-day itinerary table with a Notes column.";

/// Drives the model until it answers without requesting tools
pub struct TravelAgent<M: ChatModel> {
    model: M,
    tools: ToolRegistry,
    max_tool_rounds: u32,
}

impl<M: ChatModel> TravelAgent<M> {
    #[must_use]
    pub fn new(model: M, tools: ToolRegistry, max_tool_rounds: u32) -> Self {
        Self {
            model,
            tools,
            max_tool_rounds,
        }
    }

    /// Run the conversation for `query` and return the model's final text
    #[instrument(skip(self, query))]
    pub async fn run(&self, query: &str) -> Result<String> {
        let definitions = self.tools.definitions();
        let mut messages = vec![ChatMessage::system(SYSTEM_PROMPT), ChatMessage::user(query)];

        for round in 0..=self.max_tool_rounds {
            let reply = self.model.complete(&messages, &definitions).await?;
            let calls = reply.requested_tools().to_vec();

            if calls.is_empty() {
                let answer = reply.content.as_deref().unwrap_or("").trim().to_string();
                if answer.is_empty() {
                    return Err(PlannerError::llm("Model returned an empty answer"));
                }
                info!("Model answered after {} tool round(s)", round);
                return Ok(answer);
            }

            if round == self.max_tool_rounds {
                break;
            }

            messages.push(reply);
            for call in &calls {
                let output = self.dispatch(call).await?;
                messages.push(ChatMessage::tool(call.id.clone(), output));
            }
        }

        Err(PlannerError::llm(format!(
            "Model did not finish within {} tool rounds",
            self.max_tool_rounds
        )))
    }

    /// Execute one tool call. Problems the model can fix (unknown tool, bad
    /// arguments, unknown place) are returned to it as `ERROR: ...` text.
    async fn dispatch(&self, call: &ToolCall) -> Result<String> {
        let name = call.function.name.as_str();
        debug!("Tool call {} -> {}({})", call.id, name, call.function.arguments);

        let Some(tool) = self.tools.get(name) else {
            warn!("Model requested unknown tool '{}'", name);
            return Ok(format!("ERROR: Unknown tool '{name}'."));
        };

        let arguments = if call.function.arguments.trim().is_empty() {
            Value::Object(serde_json::Map::new())
        } else {
            match serde_json::from_str::<Value>(&call.function.arguments) {
                Ok(value) => value,
                Err(e) => return Ok(format!("ERROR: Arguments must be a JSON object: {e}")),
            }
        };

        match tool.execute(arguments).await {
            Ok(output) => Ok(output),
            Err(PlannerError::Validation { message } | PlannerError::NotFound { message }) => {
                warn!("Tool {} rejected its input: {}", name, message);
                Ok(format!("ERROR: {message}"))
            }
            Err(e) => Err(e),
        }
    }
}

//! OpenAI-compatible chat-completions client with function calling

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, instrument, warn};

use crate::config::LlmConfig;
use crate::{PlannerError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
    Tool,
}

/// A function invocation requested by the model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionCall {
    pub name: String,
    /// JSON-encoded arguments, as sent by the model
    #[serde(default)]
    pub arguments: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    pub id: String,
    #[serde(rename = "type", default = "function_type")]
    pub kind: String,
    pub function: FunctionCall,
}

fn function_type() -> String {
    "function".to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_calls: Option<Vec<ToolCall>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
}

impl ChatMessage {
    fn text(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: Some(content.into()),
            tool_calls: None,
            tool_call_id: None,
        }
    }

    #[must_use]
    pub fn system(content: impl Into<String>) -> Self {
        Self::text(Role::System, content)
    }

    #[must_use]
    pub fn user(content: impl Into<String>) -> Self {
        Self::text(Role::User, content)
    }

    #[must_use]
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::text(Role::Assistant, content)
    }

    /// Result of a tool call, answering `tool_call_id`
    #[must_use]
    pub fn tool(tool_call_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            tool_call_id: Some(tool_call_id.into()),
            ..Self::text(Role::Tool, content)
        }
    }

    /// Tool calls requested by this message, if any
    #[must_use]
    pub fn requested_tools(&self) -> &[ToolCall] {
        self.tool_calls.as_deref().unwrap_or_default()
    }
}

/// A function the model may call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    /// JSON schema of the arguments object
    pub parameters: Value,
}

/// Anything that can produce the next assistant message
#[async_trait]
pub trait ChatModel: Send + Sync {
    async fn complete(&self, messages: &[ChatMessage], tools: &[ToolDefinition]) -> Result<ChatMessage>;
}

#[derive(Serialize)]
struct ToolSpec<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    function: &'a ToolDefinition,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    temperature: f32,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<ToolSpec<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_choice: Option<&'static str>,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChatMessage,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    message: String,
}

/// Client for `POST {api_base}/chat/completions`
#[derive(Debug, Clone)]
pub struct OpenAiCompatibleClient {
    client: Client,
    api_key: String,
    api_base: String,
    model: String,
    temperature: f32,
}

impl OpenAiCompatibleClient {
    pub fn new(config: &LlmConfig, api_key: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds.into()))
            .build()
            .map_err(|e| PlannerError::config(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            api_key: api_key.into(),
            api_base: config.api_base.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            temperature: config.temperature,
        })
    }

    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl ChatModel for OpenAiCompatibleClient {
    #[instrument(skip_all, fields(model = %self.model, messages = messages.len()))]
    async fn complete(&self, messages: &[ChatMessage], tools: &[ToolDefinition]) -> Result<ChatMessage> {
        let request = ChatRequest {
            model: &self.model,
            messages,
            temperature: self.temperature,
            tools: tools
                .iter()
                .map(|function| ToolSpec {
                    kind: "function",
                    function,
                })
                .collect(),
            tool_choice: (!tools.is_empty()).then_some("auto"),
        };

        let url = format!("{}/chat/completions", self.api_base);
        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| PlannerError::network(format!("LLM endpoint is unreachable: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let detail = serde_json::from_str::<ApiErrorBody>(&body)
                .map(|parsed| parsed.error.message)
                .unwrap_or_else(|_| body.chars().take(300).collect());
            warn!("LLM request failed with HTTP {}: {}", status, detail);

            return Err(match status.as_u16() {
                401 | 403 => PlannerError::config(format!("LLM endpoint rejected the API key: {detail}")),
                _ => PlannerError::llm(format!("HTTP {status}: {detail}")),
            });
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| PlannerError::llm(format!("Failed to parse chat completion: {e}")))?;

        let choice = parsed
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| PlannerError::llm("Chat completion contained no choices"))?;

        debug!(
            "Model finished with {:?}, {} tool call(s)",
            choice.finish_reason,
            choice.message.requested_tools().len()
        );
        Ok(choice.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{Json, Router, extract::State, http::StatusCode, routing::post};
    use serde_json::json;
    use std::sync::{Arc, Mutex};
    use tokio::net::TcpListener;

    type Recorded = Arc<Mutex<Vec<Value>>>;

    async fn spawn_server(status: StatusCode, reply: Value) -> (String, Recorded) {
        let recorded: Recorded = Arc::new(Mutex::new(Vec::new()));
        let app = Router::new()
            .route(
                "/v1/chat/completions",
                post(
                    move |State(recorded): State<Recorded>, Json(body): Json<Value>| {
                        let reply = reply.clone();
                        async move {
                            recorded.lock().unwrap().push(body);
                            (status, Json(reply))
                        }
                    },
                ),
            )
            .with_state(recorded.clone());

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        (format!("http://{addr}/v1"), recorded)
    }

    fn config(api_base: String) -> LlmConfig {
        LlmConfig {
            api_base,
            ..LlmConfig::default()
        }
    }

    fn weather_tool() -> ToolDefinition {
        ToolDefinition {
            name: "weather_tool".to_string(),
            description: "Weather".to_string(),
            parameters: json!({"type": "object", "properties": {}}),
        }
    }

    #[tokio::test]
    async fn test_tool_call_round_trip() {
        let (base, recorded) = spawn_server(
            StatusCode::OK,
            json!({
                "id": "chatcmpl-1",
                "choices": [{
                    "index": 0,
                    "finish_reason": "tool_calls",
                    "message": {
                        "role": "assistant",
                        "content": null,
                        "tool_calls": [{
                            "id": "call_1",
                            "type": "function",
                            "function": {"name": "weather_tool", "arguments": "{\"city\":\"Goa\"}"}
                        }]
                    }
                }]
            }),
        )
        .await;

        let client = OpenAiCompatibleClient::new(&config(base), "test-key").unwrap();
        let reply = client
            .complete(&[ChatMessage::user("Plan Goa")], &[weather_tool()])
            .await
            .unwrap();

        assert_eq!(reply.role, Role::Assistant);
        assert_eq!(reply.requested_tools()[0].function.name, "weather_tool");

        let body = recorded.lock().unwrap()[0].clone();
        assert_eq!(body["model"], "llama-3.3-70b-versatile");
        assert_eq!(body["tool_choice"], "auto");
        assert_eq!(body["tools"][0]["type"], "function");
        assert_eq!(body["tools"][0]["function"]["name"], "weather_tool");
        assert_eq!(body["messages"][0]["role"], "user");
    }

    #[tokio::test]
    async fn test_error_body_is_surfaced() {
        let (base, _) = spawn_server(
            StatusCode::BAD_REQUEST,
            json!({"error": {"message": "model not found", "type": "invalid_request_error"}}),
        )
        .await;

        let client = OpenAiCompatibleClient::new(&config(base), "test-key").unwrap();
        let err = client.complete(&[ChatMessage::user("hi")], &[]).await.unwrap_err();
        assert!(matches!(err, PlannerError::Llm { .. }));
        assert!(err.to_string().contains("model not found"));
    }

    #[tokio::test]
    async fn test_rejected_key_is_a_config_error() {
        let (base, _) = spawn_server(
            StatusCode::UNAUTHORIZED,
            json!({"error": {"message": "Invalid API Key"}}),
        )
        .await;

        let client = OpenAiCompatibleClient::new(&config(base), "bad").unwrap();
        let err = client.complete(&[ChatMessage::user("hi")], &[]).await.unwrap_err();
        assert!(matches!(err, PlannerError::Config { .. }));
    }

    #[test]
    fn test_tool_message_serialization() {
        let message = ChatMessage::tool("call_9", "sunny");
        let value = serde_json::to_value(&message).unwrap();
        assert_eq!(value["role"], "tool");
        assert_eq!(value["tool_call_id"], "call_9");
        assert!(value.get("tool_calls").is_none());
    }
}

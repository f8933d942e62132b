//! Chat client for a local Ollama-compatible model endpoint.
//!
//! One capability: send role-tagged messages, optionally with declared
//! tools, and receive either plain text or tool-invocation requests back.
//! The capability is a trait so the orchestrator takes an explicitly
//! constructed client and tests can substitute a scripted double.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::types::{AgentError, Result};

/// One role-tagged message in a chat exchange.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    /// "system", "user", "assistant", or "tool".
    pub role: String,

    /// Message text; may be empty on assistant turns that only carry tool
    /// calls.
    #[serde(default)]
    pub content: String,

    /// Tool invocations requested by the model, if any.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tool_calls: Vec<ToolCall>,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self::tagged("system", content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::tagged("user", content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::tagged("assistant", content)
    }

    /// A tool-result message, fed back to the model after dispatch.
    pub fn tool(content: impl Into<String>) -> Self {
        Self::tagged("tool", content)
    }

    fn tagged(role: &str, content: impl Into<String>) -> Self {
        Self {
            role: role.to_string(),
            content: content.into(),
            tool_calls: Vec::new(),
        }
    }

    pub fn has_tool_calls(&self) -> bool {
        !self.tool_calls.is_empty()
    }
}

/// A tool invocation requested by the model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCall {
    pub function: FunctionCall,
}

/// Function name plus model-provided arguments.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FunctionCall {
    pub name: String,

    /// JSON object of arguments; the dispatcher validates the fields it
    /// needs.
    #[serde(default)]
    pub arguments: JsonValue,
}

impl ToolCall {
    pub fn new(name: impl Into<String>, arguments: JsonValue) -> Self {
        Self {
            function: FunctionCall {
                name: name.into(),
                arguments,
            },
        }
    }
}

/// Declaration of a callable tool, advertised to the model.
#[derive(Debug, Clone, Serialize)]
pub struct ToolSpec {
    #[serde(rename = "type")]
    pub kind: String,
    pub function: FunctionSpec,
}

/// Name, description, and JSON-Schema parameters of a declared tool.
#[derive(Debug, Clone, Serialize)]
pub struct FunctionSpec {
    pub name: String,
    pub description: String,
    pub parameters: JsonValue,
}

impl ToolSpec {
    pub fn function(
        name: impl Into<String>,
        description: impl Into<String>,
        parameters: JsonValue,
    ) -> Self {
        Self {
            kind: "function".to_string(),
            function: FunctionSpec {
                name: name.into(),
                description: description.into(),
                parameters,
            },
        }
    }
}

/// Send messages, optionally with declared tools, receive text or tool-call
/// requests.
#[async_trait]
pub trait ChatClient: Send + Sync {
    async fn chat(&self, messages: &[ChatMessage], tools: &[ToolSpec]) -> Result<ChatMessage>;
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<&'a [ToolSpec]>,
}

#[derive(Deserialize)]
struct ChatResponse {
    message: ChatMessage,
    #[allow(dead_code)]
    #[serde(default)]
    done: bool,
}

/// Client for the Ollama chat API (`POST <base_url>/api/chat`).
#[derive(Clone)]
pub struct OllamaClient {
    client: Client,
    base_url: String,
    model: String,
}

impl OllamaClient {
    pub fn new(base_url: &str, model: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl ChatClient for OllamaClient {
    async fn chat(&self, messages: &[ChatMessage], tools: &[ToolSpec]) -> Result<ChatMessage> {
        let url = format!("{}/api/chat", self.base_url);
        let request = ChatRequest {
            model: &self.model,
            messages,
            stream: false,
            tools: if tools.is_empty() { None } else { Some(tools) },
        };

        tracing::debug!(model = %self.model, messages = messages.len(), "chat request");

        let response = self.client.post(&url).json(&request).send().await?;

        if !response.status().is_success() {
            return Err(AgentError::model(format!(
                "chat request failed with status {}. Make sure the model server is running (ollama serve)",
                response.status()
            )));
        }

        let body: ChatResponse = response.json().await?;

        tracing::debug!(
            tool_calls = body.message.tool_calls.len(),
            "chat response"
        );
        Ok(body.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_message_serialization_omits_empty_tool_calls() {
        let value = serde_json::to_value(ChatMessage::user("hi")).unwrap();

        assert_eq!(value, json!({"role": "user", "content": "hi"}));
    }

    #[test]
    fn test_response_with_tool_calls_deserializes() {
        let raw = json!({
            "message": {
                "role": "assistant",
                "content": "",
                "tool_calls": [
                    {"function": {"name": "execute_sql", "arguments": {"sql_query": "SELECT 1"}}}
                ]
            },
            "done": true
        });

        let response: ChatResponse = serde_json::from_value(raw).unwrap();

        assert!(response.message.has_tool_calls());
        assert_eq!(response.message.tool_calls[0].function.name, "execute_sql");
        assert_eq!(
            response.message.tool_calls[0].function.arguments["sql_query"],
            "SELECT 1"
        );
    }

    #[test]
    fn test_tool_spec_shape() {
        let spec = ToolSpec::function("list_tables", "List tables", json!({"type": "object"}));
        let value = serde_json::to_value(&spec).unwrap();

        assert_eq!(value["type"], "function");
        assert_eq!(value["function"]["name"], "list_tables");
        assert_eq!(value["function"]["parameters"]["type"], "object");
    }
}

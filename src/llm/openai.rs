//! OpenAI chat-completions backend for [`LlmProvider`].

use async_trait::async_trait;
use secrecy::ExposeSecret;
use serde::Deserialize;
use serde_json::json;

use crate::config::ChatbotConfig;
use crate::error::LlmError;
use crate::llm::provider::{
    ChatMessage, CompletionRequest, CompletionResponse, LlmProvider, ToolCall,
    ToolCompletionRequest, ToolCompletionResponse,
};

const PROVIDER: &str = "openai";

/// Hard cap on one completion round trip. A hung upstream call must not
/// park a conversation indefinitely.
const REQUEST_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(30);

/// Talks to an OpenAI-compatible chat-completions endpoint.
pub struct OpenAiProvider {
    client: reqwest::Client,
    api_key: secrecy::SecretString,
    api_url: String,
    model: String,
}

impl OpenAiProvider {
    pub fn new(config: &ChatbotConfig) -> Result<Self, LlmError> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| LlmError::RequestFailed {
                provider: PROVIDER.to_string(),
                reason: e.to_string(),
            })?;
        Ok(Self {
            client,
            api_key: config.api_key.clone(),
            api_url: config.api_url.clone(),
            model: config.model.clone(),
        })
    }

    async fn post(&self, body: serde_json::Value) -> Result<WireResponse, LlmError> {
        let response = self
            .client
            .post(&self.api_url)
            .bearer_auth(self.api_key.expose_secret())
            .json(&body)
            .send()
            .await
            .map_err(|e| LlmError::RequestFailed {
                provider: PROVIDER.to_string(),
                reason: e.to_string(),
            })?;

        let status = response.status();
        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(LlmError::AuthFailed {
                provider: PROVIDER.to_string(),
            });
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(LlmError::RequestFailed {
                provider: PROVIDER.to_string(),
                reason: format!("status {status}: {body}"),
            });
        }

        response
            .json::<WireResponse>()
            .await
            .map_err(|e| LlmError::InvalidResponse {
                provider: PROVIDER.to_string(),
                reason: e.to_string(),
            })
    }

    fn base_body(&self, messages: &[ChatMessage], max_tokens: Option<u32>, temperature: Option<f32>) -> serde_json::Value {
        let mut body = json!({
            "model": self.model,
            "messages": messages,
        });
        if let Some(max_tokens) = max_tokens {
            body["max_tokens"] = json!(max_tokens);
        }
        if let Some(temperature) = temperature {
            body["temperature"] = json!(temperature);
        }
        body
    }
}

#[async_trait]
impl LlmProvider for OpenAiProvider {
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError> {
        let body = self.base_body(&request.messages, request.max_tokens, request.temperature);
        let response = self.post(body).await?;
        let choice = response.first_choice()?;
        Ok(CompletionResponse {
            content: choice.message.content.clone().unwrap_or_default(),
        })
    }

    async fn complete_with_tools(
        &self,
        request: ToolCompletionRequest,
    ) -> Result<ToolCompletionResponse, LlmError> {
        let mut body = self.base_body(&request.messages, request.max_tokens, request.temperature);
        body["tools"] = request
            .tools
            .iter()
            .map(|tool| {
                json!({
                    "type": "function",
                    "function": {
                        "name": tool.name,
                        "description": tool.description,
                        "parameters": tool.parameters,
                    }
                })
            })
            .collect();
        body["tool_choice"] = json!("auto");

        let response = self.post(body).await?;
        let choice = response.first_choice()?;

        let mut tool_calls = Vec::new();
        for call in choice.message.tool_calls.as_deref().unwrap_or_default() {
            // Arguments arrive as a JSON-encoded string.
            let arguments = serde_json::from_str(&call.function.arguments).map_err(|e| {
                LlmError::InvalidResponse {
                    provider: PROVIDER.to_string(),
                    reason: format!("tool call arguments: {e}"),
                }
            })?;
            tool_calls.push(ToolCall {
                id: call.id.clone(),
                name: call.function.name.clone(),
                arguments,
            });
        }

        Ok(ToolCompletionResponse {
            content: choice.message.content.clone(),
            tool_calls,
        })
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

// ── Wire types ──────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct WireResponse {
    choices: Vec<WireChoice>,
}

impl WireResponse {
    fn first_choice(&self) -> Result<&WireChoice, LlmError> {
        self.choices.first().ok_or_else(|| LlmError::InvalidResponse {
            provider: PROVIDER.to_string(),
            reason: "response has no choices".to_string(),
        })
    }
}

#[derive(Debug, Deserialize)]
struct WireChoice {
    message: WireMessage,
}

#[derive(Debug, Deserialize)]
struct WireMessage {
    content: Option<String>,
    tool_calls: Option<Vec<WireToolCall>>,
}

#[derive(Debug, Deserialize)]
struct WireToolCall {
    id: String,
    function: WireFunction,
}

#[derive(Debug, Deserialize)]
struct WireFunction {
    name: String,
    arguments: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_response_parses_tool_call() {
        let raw = r#"{
            "choices": [{
                "message": {
                    "content": null,
                    "tool_calls": [{
                        "id": "call_1",
                        "type": "function",
                        "function": {
                            "name": "query_wizard_stats",
                            "arguments": "{\"metric\":\"sessions_started\"}"
                        }
                    }]
                }
            }]
        }"#;
        let parsed: WireResponse = serde_json::from_str(raw).unwrap();
        let choice = parsed.first_choice().unwrap();
        let calls = choice.message.tool_calls.as_ref().unwrap();
        assert_eq!(calls[0].function.name, "query_wizard_stats");
    }

    #[test]
    fn empty_choices_is_invalid_response() {
        let parsed: WireResponse = serde_json::from_str(r#"{"choices": []}"#).unwrap();
        assert!(matches!(
            parsed.first_choice().unwrap_err(),
            LlmError::InvalidResponse { .. }
        ));
    }
}

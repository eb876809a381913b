// Per-provider transport adapters
//
// Each adapter builds the provider-native request, performs exactly one
// HTTP call (no retries), and extracts the single textual completion from
// that provider's response shape. The shapes are strongly typed per
// provider; nothing outside this file knows what they look like.

use std::collections::HashMap;

use async_trait::async_trait;
use reqwest::{header, Client};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::gateway::LlmError;

const DASHSCOPE_API_URL: &str =
    "https://dashscope.aliyuncs.com/api/v1/services/aigc/text-generation/generation";

/// One remote call per invocation. Implementors own the provider-native
/// request/response handling end to end and report failures as [`LlmError`].
#[async_trait]
pub trait TransportAdapter: Send + Sync {
    async fn complete(
        &self,
        model: &str,
        prompt: &str,
        params: &HashMap<String, Value>,
    ) -> Result<String, LlmError>;
}

// ---- DashScope (managed service) ----

#[derive(Debug, Serialize)]
struct DashScopeRequest<'a> {
    model: &'a str,
    input: DashScopeInput<'a>,
    parameters: &'a HashMap<String, Value>,
}

#[derive(Debug, Serialize)]
struct DashScopeInput<'a> {
    prompt: &'a str,
}

#[derive(Debug, Deserialize)]
struct DashScopeResponse {
    output: Option<DashScopeOutput>,
}

#[derive(Debug, Deserialize)]
struct DashScopeOutput {
    text: Option<String>,
}

fn extract_dashscope_text(response: DashScopeResponse) -> Result<String, LlmError> {
    response
        .output
        .and_then(|output| output.text)
        .ok_or_else(|| LlmError::Malformed("DashScope response missing output.text".to_string()))
}

pub struct DashScopeTransport {
    api_key: Option<String>,
    client: Client,
}

impl DashScopeTransport {
    pub fn new(api_key: Option<String>, client: Client) -> Self {
        Self { api_key, client }
    }
}

#[async_trait]
impl TransportAdapter for DashScopeTransport {
    async fn complete(
        &self,
        model: &str,
        prompt: &str,
        params: &HashMap<String, Value>,
    ) -> Result<String, LlmError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| LlmError::Unconfigured("DashScope API key is not set".to_string()))?;

        let request = DashScopeRequest {
            model,
            input: DashScopeInput { prompt },
            parameters: params,
        };

        let response = self
            .client
            .post(DASHSCOPE_API_URL)
            .header(header::CONTENT_TYPE, "application/json")
            .bearer_auth(api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| LlmError::Transport(format!("API request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(LlmError::Transport(format!("API error {}: {}", status, error_text)));
        }

        let body: DashScopeResponse = response
            .json()
            .await
            .map_err(|e| LlmError::Malformed(format!("Failed to parse response: {}", e)))?;

        extract_dashscope_text(body)
    }
}

// ---- OpenAI-compatible chat completions (Ollama and friends) ----

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    #[serde(flatten)]
    params: HashMap<String, Value>,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

fn extract_chat_completion_text(response: ChatCompletionResponse) -> Result<String, LlmError> {
    response
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .ok_or_else(|| {
            LlmError::Malformed("chat completion has no choice with content".to_string())
        })
}

pub struct OpenAiCompatTransport {
    endpoint: String,
    api_key: String,
    client: Client,
}

impl OpenAiCompatTransport {
    pub fn new(endpoint: String, api_key: String, client: Client) -> Self {
        Self { endpoint, api_key, client }
    }
}

#[async_trait]
impl TransportAdapter for OpenAiCompatTransport {
    async fn complete(
        &self,
        model: &str,
        prompt: &str,
        params: &HashMap<String, Value>,
    ) -> Result<String, LlmError> {
        let url = format!("{}/chat/completions", self.endpoint.trim_end_matches('/'));

        let request = ChatCompletionRequest {
            model,
            messages: vec![ChatMessage { role: "user", content: prompt }],
            params: params.clone(),
        };

        let response = self
            .client
            .post(url)
            .header(header::CONTENT_TYPE, "application/json")
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| LlmError::Transport(format!("API request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(LlmError::Transport(format!("API error {}: {}", status, error_text)));
        }

        let body: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| LlmError::Malformed(format!("Failed to parse response: {}", e)))?;

        extract_chat_completion_text(body)
    }
}

// ---- Unrecognized provider ----

/// Placeholder adapter for a provider name we don't know. The gateway still
/// constructs, but every call reports the misconfiguration.
pub struct UnconfiguredTransport {
    pub provider: String,
}

#[async_trait]
impl TransportAdapter for UnconfiguredTransport {
    async fn complete(
        &self,
        _model: &str,
        _prompt: &str,
        _params: &HashMap<String, Value>,
    ) -> Result<String, LlmError> {
        Err(LlmError::Unconfigured(format!(
            "unknown LLM provider '{}'",
            self.provider
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_dashscope_text() {
        let response: DashScopeResponse =
            serde_json::from_str(r#"{"output":{"text":"hi"}}"#).unwrap();
        assert_eq!(extract_dashscope_text(response).unwrap(), "hi");
    }

    #[test]
    fn test_extract_chat_completion_text() {
        let response: ChatCompletionResponse =
            serde_json::from_str(r#"{"choices":[{"message":{"content":"hi"}}]}"#).unwrap();
        assert_eq!(extract_chat_completion_text(response).unwrap(), "hi");
    }

    #[test]
    fn test_normalization_is_provider_invariant() {
        // The same completion text must come out identical regardless of
        // which provider shape carried it.
        let a: DashScopeResponse = serde_json::from_str(r#"{"output":{"text":"hi"}}"#).unwrap();
        let b: ChatCompletionResponse =
            serde_json::from_str(r#"{"choices":[{"message":{"content":"hi"}}]}"#).unwrap();
        assert_eq!(
            extract_dashscope_text(a).unwrap(),
            extract_chat_completion_text(b).unwrap()
        );
    }

    #[test]
    fn test_missing_output_is_malformed() {
        let response: DashScopeResponse =
            serde_json::from_str(r#"{"request_id":"abc"}"#).unwrap();
        assert!(matches!(
            extract_dashscope_text(response),
            Err(LlmError::Malformed(_))
        ));
    }

    #[test]
    fn test_empty_choices_is_malformed() {
        let response: ChatCompletionResponse =
            serde_json::from_str(r#"{"choices":[]}"#).unwrap();
        assert!(matches!(
            extract_chat_completion_text(response),
            Err(LlmError::Malformed(_))
        ));
    }

    #[tokio::test]
    async fn test_dashscope_without_key_is_unconfigured() {
        let transport = DashScopeTransport::new(None, Client::new());
        let result = transport.complete("qwen-turbo", "hello", &HashMap::new()).await;
        assert!(matches!(result, Err(LlmError::Unconfigured(_))));
    }

    #[tokio::test]
    async fn test_unknown_provider_is_unconfigured() {
        let transport = UnconfiguredTransport { provider: "bedrock".to_string() };
        let result = transport.complete("any", "hello", &HashMap::new()).await;
        assert!(matches!(result, Err(LlmError::Unconfigured(_))));
    }

    #[test]
    fn test_chat_request_flattens_params() {
        let mut params = HashMap::new();
        params.insert("temperature".to_string(), serde_json::json!(0.7));
        let request = ChatCompletionRequest {
            model: "qwen2.5:7b",
            messages: vec![ChatMessage { role: "user", content: "hello" }],
            params,
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["temperature"], serde_json::json!(0.7));
        assert_eq!(json["messages"][0]["role"], "user");
    }
}

// LLM gateway: one contract over heterogeneous backends
//
// generate() never fails past this boundary. Every transport or parse
// failure is logged and collapsed into a reply with success = false, so
// the chat endpoint always has something renderable and never branches
// on which provider is configured.

use std::collections::HashMap;
use std::time::Duration;

use reqwest::Client;
use serde_json::Value;
use thiserror::Error;

use super::provider::ProviderIdentity;
use super::transport::{
    DashScopeTransport, OpenAiCompatTransport, TransportAdapter, UnconfiguredTransport,
};

const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Failure taxonomy internal to the gateway. Callers never see these;
/// they only see the success flag on [`NormalizedReply`].
#[derive(Debug, Error)]
pub enum LlmError {
    #[error("provider not configured: {0}")]
    Unconfigured(String),
    #[error("transport failure: {0}")]
    Transport(String),
    #[error("malformed response: {0}")]
    Malformed(String),
}

/// A single generation call. The parameter bag is passed through to the
/// transport untouched; the gateway never interprets it.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub prompt: String,
    pub model: Option<String>,
    pub params: HashMap<String, Value>,
}

impl GenerationRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            model: None,
            params: HashMap::new(),
        }
    }
}

/// The one reply shape every backend normalizes to. Constructed per call,
/// immutable, never cached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedReply {
    pub text: String,
    pub success: bool,
    pub provider: String,
}

pub struct LlmGateway {
    provider: String,
    model: String,
    transport: Box<dyn TransportAdapter>,
}

impl LlmGateway {
    /// Build a gateway for the resolved provider identity. Always succeeds
    /// for a known identity; an unrecognized one still constructs but every
    /// call will report the misconfiguration.
    pub fn new(identity: ProviderIdentity) -> Result<Self, String> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| format!("Failed to create HTTP client: {}", e))?;

        let provider = identity.label().to_string();
        let (model, transport): (String, Box<dyn TransportAdapter>) = match identity {
            ProviderIdentity::OpenAiCompatible { endpoint, api_key, model } => (
                model,
                Box::new(OpenAiCompatTransport::new(endpoint, api_key, client)),
            ),
            ProviderIdentity::DashScope { api_key, model } => {
                (model, Box::new(DashScopeTransport::new(api_key, client)))
            }
            ProviderIdentity::Unrecognized(name) => {
                eprintln!("[llm] Error: unknown provider '{}'; generation calls will fail", name);
                (String::new(), Box::new(UnconfiguredTransport { provider: name }))
            }
        };

        Ok(Self { provider, model, transport })
    }

    #[cfg(test)]
    pub(crate) fn with_transport(
        provider: &str,
        model: &str,
        transport: Box<dyn TransportAdapter>,
    ) -> Self {
        Self {
            provider: provider.to_string(),
            model: model.to_string(),
            transport,
        }
    }

    pub fn provider(&self) -> &str {
        &self.provider
    }

    /// Generate text for the request. Model resolution: explicit override,
    /// else the identity's default. Failures never propagate — they come
    /// back as a reply with success = false and empty text.
    pub async fn generate(&self, request: GenerationRequest) -> NormalizedReply {
        let model = request.model.as_deref().unwrap_or(&self.model);

        match self
            .transport
            .complete(model, &request.prompt, &request.params)
            .await
        {
            Ok(text) => NormalizedReply {
                text,
                success: true,
                provider: self.provider.clone(),
            },
            Err(e) => {
                eprintln!("[llm] Generation failed ({}): {}", self.provider, e);
                NormalizedReply {
                    text: String::new(),
                    success: false,
                    provider: self.provider.clone(),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::{Arc, Mutex};

    /// Deterministic transport stub: records every call, answers with a
    /// fixed text or a fixed transport failure.
    #[derive(Clone)]
    struct StubTransport {
        text: Option<String>,
        calls: Arc<Mutex<Vec<String>>>,
    }

    impl StubTransport {
        fn replying(text: &str) -> Self {
            Self {
                text: Some(text.to_string()),
                calls: Arc::new(Mutex::new(Vec::new())),
            }
        }

        fn failing() -> Self {
            Self {
                text: None,
                calls: Arc::new(Mutex::new(Vec::new())),
            }
        }
    }

    #[async_trait]
    impl TransportAdapter for StubTransport {
        async fn complete(
            &self,
            model: &str,
            _prompt: &str,
            _params: &HashMap<String, Value>,
        ) -> Result<String, LlmError> {
            self.calls.lock().unwrap().push(model.to_string());
            match &self.text {
                Some(text) => Ok(text.clone()),
                None => Err(LlmError::Transport("connection refused".to_string())),
            }
        }
    }

    #[tokio::test]
    async fn test_generate_success() {
        let gateway =
            LlmGateway::with_transport("ollama", "qwen2.5:7b", Box::new(StubTransport::replying("hello there")));
        let reply = gateway.generate(GenerationRequest::new("hi")).await;
        assert!(reply.success);
        assert_eq!(reply.text, "hello there");
        assert_eq!(reply.provider, "ollama");
    }

    #[tokio::test]
    async fn test_generate_absorbs_transport_failure() {
        let gateway =
            LlmGateway::with_transport("dashscope", "qwen-turbo", Box::new(StubTransport::failing()));
        let reply = gateway.generate(GenerationRequest::new("hi")).await;
        assert!(!reply.success);
        assert_eq!(reply.text, "");
        assert_eq!(reply.provider, "dashscope");
    }

    #[tokio::test]
    async fn test_generate_is_idempotent_against_deterministic_stub() {
        let gateway =
            LlmGateway::with_transport("ollama", "qwen2.5:7b", Box::new(StubTransport::replying("same")));
        let request = GenerationRequest::new("hi");
        let first = gateway.generate(request.clone()).await;
        let second = gateway.generate(request).await;
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_model_override_wins_over_default() {
        let stub = StubTransport::replying("ok");
        let calls = stub.calls.clone();
        let gateway = LlmGateway::with_transport("ollama", "qwen2.5:7b", Box::new(stub));

        gateway.generate(GenerationRequest::new("hi")).await;
        let mut request = GenerationRequest::new("hi");
        request.model = Some("llama3.1:8b".to_string());
        gateway.generate(request).await;

        let seen = calls.lock().unwrap();
        assert_eq!(*seen, vec!["qwen2.5:7b".to_string(), "llama3.1:8b".to_string()]);
    }

    #[tokio::test]
    async fn test_unrecognized_provider_fails_per_call() {
        let gateway = LlmGateway::new(ProviderIdentity::Unrecognized("bedrock".to_string()))
            .expect("gateway should construct even for an unknown provider");
        let reply = gateway.generate(GenerationRequest::new("hi")).await;
        assert!(!reply.success);
        assert_eq!(reply.provider, "bedrock");
    }
}

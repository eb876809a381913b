// LLM provider selection and per-provider defaults
//
// Resolves which backend the gateway talks to from configuration inputs.
// Resolution is total: an unknown provider name is carried through verbatim
// and rejected at dispatch time inside the gateway, not here.

const DASHSCOPE_DEFAULT_MODEL: &str = "qwen-turbo";
const OLLAMA_DEFAULT_ENDPOINT: &str = "http://localhost:11434/v1";
const OLLAMA_DEFAULT_MODEL: &str = "qwen2.5:7b";
// Local endpoints don't check the key, but the wire format requires one
const OLLAMA_DUMMY_KEY: &str = "ollama";

/// The active LLM backend. Resolved once at startup, immutable afterwards;
/// exactly one identity per gateway instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderIdentity {
    /// Locally hosted OpenAI-compatible server (Ollama by default).
    OpenAiCompatible {
        endpoint: String,
        api_key: String,
        model: String,
    },
    /// DashScope managed service. The key is required for calls, but its
    /// absence is only a warning here — the failure surfaces per call.
    DashScope {
        api_key: Option<String>,
        model: String,
    },
    /// A selector we don't recognize, kept so the gateway can report it.
    Unrecognized(String),
}

impl ProviderIdentity {
    /// Resolve a provider identity from raw configuration values.
    /// Missing optional values fall back to the per-provider defaults.
    pub fn resolve(
        selector: &str,
        api_key: Option<String>,
        endpoint: Option<String>,
        model: Option<String>,
    ) -> Self {
        match selector.trim().to_ascii_lowercase().as_str() {
            "ollama" => ProviderIdentity::OpenAiCompatible {
                endpoint: endpoint.unwrap_or_else(|| OLLAMA_DEFAULT_ENDPOINT.to_string()),
                api_key: api_key.unwrap_or_else(|| OLLAMA_DUMMY_KEY.to_string()),
                model: model.unwrap_or_else(|| OLLAMA_DEFAULT_MODEL.to_string()),
            },
            "dashscope" => {
                if api_key.is_none() {
                    eprintln!(
                        "[llm] Warning: no DashScope API key configured; generation calls will fail"
                    );
                }
                ProviderIdentity::DashScope {
                    api_key,
                    model: model.unwrap_or_else(|| DASHSCOPE_DEFAULT_MODEL.to_string()),
                }
            }
            other => ProviderIdentity::Unrecognized(other.to_string()),
        }
    }

    /// Short provider name, for logs and the status endpoint.
    pub fn label(&self) -> &str {
        match self {
            ProviderIdentity::OpenAiCompatible { .. } => "ollama",
            ProviderIdentity::DashScope { .. } => "dashscope",
            ProviderIdentity::Unrecognized(name) => name,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ollama_defaults() {
        let identity = ProviderIdentity::resolve("ollama", None, None, None);
        assert_eq!(
            identity,
            ProviderIdentity::OpenAiCompatible {
                endpoint: "http://localhost:11434/v1".to_string(),
                api_key: "ollama".to_string(),
                model: "qwen2.5:7b".to_string(),
            }
        );
    }

    #[test]
    fn test_ollama_overrides() {
        let identity = ProviderIdentity::resolve(
            "ollama",
            None,
            Some("http://192.168.1.10:11434/v1".to_string()),
            Some("llama3.1:8b".to_string()),
        );
        match identity {
            ProviderIdentity::OpenAiCompatible { endpoint, model, .. } => {
                assert_eq!(endpoint, "http://192.168.1.10:11434/v1");
                assert_eq!(model, "llama3.1:8b");
            }
            other => panic!("unexpected identity: {:?}", other),
        }
    }

    #[test]
    fn test_dashscope_without_key_still_resolves() {
        let identity = ProviderIdentity::resolve("dashscope", None, None, None);
        assert_eq!(
            identity,
            ProviderIdentity::DashScope {
                api_key: None,
                model: "qwen-turbo".to_string(),
            }
        );
    }

    #[test]
    fn test_selector_is_case_insensitive() {
        let identity = ProviderIdentity::resolve("DashScope", Some("sk-test".to_string()), None, None);
        assert_eq!(identity.label(), "dashscope");
    }

    #[test]
    fn test_unknown_selector_carried_through() {
        let identity = ProviderIdentity::resolve("bedrock", None, None, None);
        assert_eq!(identity, ProviderIdentity::Unrecognized("bedrock".to_string()));
        assert_eq!(identity.label(), "bedrock");
    }
}

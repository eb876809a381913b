// Startup configuration
//
// Everything comes from the environment, read exactly once in main and
// passed down explicitly. No module reads env vars on its own.

use std::path::PathBuf;

const DEFAULT_PORT: u16 = 8000;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub port: u16,
    /// Optional frontend directory served at the root when it exists.
    pub static_dir: Option<PathBuf>,
    pub spotify_access_token: Option<String>,
    /// Provider selector ("ollama", "dashscope"). Unknown names are kept
    /// and rejected inside the LLM gateway.
    pub llm_provider: String,
    pub llm_api_key: Option<String>,
    pub llm_endpoint: Option<String>,
    pub llm_model: Option<String>,
}

impl AppConfig {
    pub fn from_env() -> Self {
        AppConfig {
            port: env_var("PORT")
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_PORT),
            static_dir: env_var("STATIC_DIR").map(PathBuf::from),
            spotify_access_token: env_var("SPOTIFY_ACCESS_TOKEN"),
            llm_provider: env_var("LLM_PROVIDER").unwrap_or_else(|| "ollama".to_string()),
            llm_api_key: env_var("DASHSCOPE_API_KEY"),
            llm_endpoint: env_var("OLLAMA_BASE_URL"),
            llm_model: env_var("LLM_MODEL").or_else(|| env_var("OLLAMA_MODEL")),
        }
    }
}

/// Treat empty values the same as unset ones.
fn env_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}

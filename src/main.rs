// PersonalAIs — music assistant web service
//
// Composition root: reads configuration once, constructs the Spotify and
// LLM clients explicitly, and hands them to the HTTP server. No client
// is constructed at import time; a missing optional credential leaves
// that dependency unset and its endpoints answer 503.

mod config;
mod context;
mod llm;
mod server;
mod spotify;

use std::sync::Arc;

use config::AppConfig;
use llm::{LlmGateway, ProviderIdentity};
use server::AppState;
use spotify::{MusicService, SpotifyClient};

#[tokio::main]
async fn main() {
    // .env is optional; the real environment wins
    let _ = dotenvy::dotenv();
    let config = AppConfig::from_env();

    if let Err(e) = run(config).await {
        eprintln!("[server] Startup failed: {}", e);
        std::process::exit(1);
    }
}

async fn run(config: AppConfig) -> Result<(), String> {
    let music: Option<Arc<dyn MusicService>> = match &config.spotify_access_token {
        Some(token) => {
            let client = SpotifyClient::new(token.clone())?;
            eprintln!("[spotify] Client initialized");
            Some(Arc::new(client))
        }
        None => {
            eprintln!(
                "[spotify] Warning: SPOTIFY_ACCESS_TOKEN not set; playback endpoints disabled"
            );
            None
        }
    };

    let identity = ProviderIdentity::resolve(
        &config.llm_provider,
        config.llm_api_key.clone(),
        config.llm_endpoint.clone(),
        config.llm_model.clone(),
    );
    let gateway = LlmGateway::new(identity)?;
    eprintln!("[llm] Client initialized (provider: {})", gateway.provider());

    let state = Arc::new(AppState {
        llm: Some(Arc::new(gateway)),
        music,
    });

    let app = server::build_app(state, config.static_dir.clone());
    server::serve(app, config.port).await
}

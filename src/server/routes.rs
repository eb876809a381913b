// REST API routes
//
// /api/chat is the assistant flow: best-effort now-playing lookup →
// prompt assembly → LLM gateway → rendered reply. The playback, playlist
// and profile endpoints are thin pass-throughs over the music service.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};

use super::AppState;
use crate::context::{ContextSnippet, PromptBuilder};
use crate::llm::GenerationRequest;
use crate::spotify::{NowPlaying, PlaylistSummary, UserProfile};

/// Rendered in place of a reply when the gateway reports a failed
/// generation. The chat flow itself still answers 200.
const NO_RESPONSE_SENTINEL: &str = "I couldn't generate a response.";

// ---- Request/Response types ----

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub response: String,
}

#[derive(Serialize)]
pub struct StatusResponse {
    pub name: String,
    pub version: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,
}

#[derive(Serialize)]
pub struct NowPlayingResponse {
    pub is_playing: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub track_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub artist_names: Option<Vec<String>>,
}

#[derive(Deserialize)]
pub struct PlaylistParams {
    pub limit: Option<u32>,
}

// ---- Route registration ----

pub fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/status", get(get_status))
        .route("/api/me", get(get_profile))
        .route("/api/now_playing", get(get_now_playing))
        .route("/api/playlists", get(get_playlists))
        .route("/api/chat", post(chat))
}

// ---- Handlers ----

type ApiError = (StatusCode, String);

fn service_unavailable(what: &str) -> ApiError {
    (StatusCode::SERVICE_UNAVAILABLE, format!("{} not initialized", what))
}

fn upstream_error(detail: String) -> ApiError {
    (StatusCode::BAD_REQUEST, detail)
}

async fn get_status(State(state): State<Arc<AppState>>) -> Json<StatusResponse> {
    Json(StatusResponse {
        name: "PersonalAIs".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        provider: state.llm.as_ref().map(|g| g.provider().to_string()),
    })
}

async fn get_profile(
    State(state): State<Arc<AppState>>,
) -> Result<Json<UserProfile>, ApiError> {
    let music = state
        .music
        .as_ref()
        .ok_or_else(|| service_unavailable("Spotify client"))?;

    let profile = music.user_profile().await.map_err(upstream_error)?;
    Ok(Json(profile))
}

async fn get_now_playing(
    State(state): State<Arc<AppState>>,
) -> Result<Json<NowPlayingResponse>, ApiError> {
    let music = state
        .music
        .as_ref()
        .ok_or_else(|| service_unavailable("Spotify client"))?;

    let playback = music.current_playback().await.map_err(upstream_error)?;

    Ok(Json(match playback {
        Some(now) => NowPlayingResponse {
            is_playing: now.is_playing,
            track_name: Some(now.track_name),
            artist_names: Some(now.artist_names),
        },
        None => NowPlayingResponse {
            is_playing: false,
            track_name: None,
            artist_names: None,
        },
    }))
}

async fn get_playlists(
    State(state): State<Arc<AppState>>,
    Query(params): Query<PlaylistParams>,
) -> Result<Json<Vec<PlaylistSummary>>, ApiError> {
    let music = state
        .music
        .as_ref()
        .ok_or_else(|| service_unavailable("Spotify client"))?;

    let limit = params.limit.unwrap_or(50).min(50);
    let playlists = music.playlists(limit).await.map_err(upstream_error)?;
    Ok(Json(playlists))
}

fn snippet_from(now: NowPlaying) -> ContextSnippet {
    ContextSnippet {
        track_name: now.track_name,
        artist_names: now.artist_names,
    }
}

async fn chat(
    State(state): State<Arc<AppState>>,
    Json(body): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, ApiError> {
    let gateway = state
        .llm
        .as_ref()
        .ok_or_else(|| service_unavailable("LLM client"))?;

    // Best effort: a playback failure never aborts the chat, it just
    // means no context line in the prompt.
    let snippet = match state.music.as_ref() {
        Some(music) => match music.current_playback().await {
            Ok(playback) => playback.map(snippet_from),
            Err(e) => {
                eprintln!("[server] Playback lookup failed, continuing without context: {}", e);
                None
            }
        },
        None => None,
    };

    let prompt = PromptBuilder::assemble(&body.message, snippet.as_ref());
    let reply = gateway.generate(GenerationRequest::new(prompt)).await;

    let response = if reply.success {
        reply.text
    } else {
        NO_RESPONSE_SENTINEL.to_string()
    };

    Ok(Json(ChatResponse { response }))
}

// HTTP server for the music assistant
//
// Axum app serving the REST API plus an optional static frontend. All
// clients are constructed up front by main and shared read-only across
// request tasks; nothing here holds mutable state.

pub mod routes;

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    Router,
    http::{HeaderValue, Method},
};
use tower_http::cors::CorsLayer;
use tower_http::services::{ServeDir, ServeFile};

use crate::llm::LlmGateway;
use crate::spotify::MusicService;

/// Shared, read-only state for all request handlers. A missing client
/// means its endpoints answer 503 until the service is restarted with
/// the right credentials.
pub struct AppState {
    pub llm: Option<Arc<LlmGateway>>,
    pub music: Option<Arc<dyn MusicService>>,
}

/// Assemble the router: API routes, CORS, and the frontend directory as
/// a fallback when one is configured and present on disk.
pub fn build_app(state: Arc<AppState>, static_dir: Option<PathBuf>) -> Router {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(["content-type".parse().unwrap()])
        .allow_origin("*".parse::<HeaderValue>().unwrap());

    let app = routes::api_routes().with_state(state);

    let app = if let Some(dir) = static_dir.filter(|p| p.exists()) {
        eprintln!("[server] Serving frontend from {:?}", dir);
        let index = dir.join("index.html");
        app.fallback_service(ServeDir::new(&dir).fallback(ServeFile::new(index)))
    } else {
        app
    };

    app.layer(cors)
}

/// Bind and serve until the process is stopped.
pub async fn serve(app: Router, port: u16) -> Result<(), String> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| format!("Failed to bind to {}: {}", addr, e))?;
    let actual_addr = listener
        .local_addr()
        .map_err(|e| format!("Failed to get local addr: {}", e))?;

    eprintln!("[server] Listening on {}", actual_addr);

    axum::serve(listener, app)
        .await
        .map_err(|e| format!("Server error: {}", e))
}

// Spotify Web API wrapper
//
// Thin read-only client over the few endpoints the service exposes. Auth
// is a pre-obtained bearer token from the environment; the OAuth flow
// itself lives outside this service. Wire shapes stay private — handlers
// only see the sanitized DTOs below.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};

const SPOTIFY_API_URL: &str = "https://api.spotify.com/v1";

/// What the user is playing right now.
#[derive(Debug, Clone, Serialize)]
pub struct NowPlaying {
    pub track_name: String,
    pub artist_names: Vec<String>,
    pub is_playing: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct UserProfile {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PlaylistSummary {
    pub id: String,
    pub name: String,
    pub total_tracks: u32,
}

/// Seam for the music-streaming collaborator so handlers can be tested
/// without the network. `Ok(None)` from `current_playback` means nothing
/// is playing — not an error.
#[async_trait]
pub trait MusicService: Send + Sync {
    async fn current_playback(&self) -> Result<Option<NowPlaying>, String>;
    async fn user_profile(&self) -> Result<UserProfile, String>;
    async fn playlists(&self, limit: u32) -> Result<Vec<PlaylistSummary>, String>;
}

// ---- Spotify wire shapes ----

#[derive(Debug, Deserialize)]
struct PlaybackStateBody {
    item: Option<PlaybackItem>,
    #[serde(default)]
    is_playing: bool,
}

#[derive(Debug, Deserialize)]
struct PlaybackItem {
    name: String,
    #[serde(default)]
    artists: Vec<ArtistRef>,
}

#[derive(Debug, Deserialize)]
struct ArtistRef {
    name: String,
}

#[derive(Debug, Deserialize)]
struct ProfileBody {
    id: String,
    display_name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PlaylistPage {
    items: Vec<PlaylistEntry>,
}

#[derive(Debug, Deserialize)]
struct PlaylistEntry {
    id: String,
    name: String,
    tracks: PlaylistTracksRef,
}

#[derive(Debug, Deserialize)]
struct PlaylistTracksRef {
    total: u32,
}

fn now_playing_from(body: PlaybackStateBody) -> Option<NowPlaying> {
    body.item.map(|item| NowPlaying {
        track_name: item.name,
        artist_names: item.artists.into_iter().map(|a| a.name).collect(),
        is_playing: body.is_playing,
    })
}

pub struct SpotifyClient {
    access_token: String,
    client: Client,
}

impl SpotifyClient {
    pub fn new(access_token: String) -> Result<Self, String> {
        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| format!("Failed to create HTTP client: {}", e))?;

        Ok(Self { access_token, client })
    }

    async fn get(&self, path: &str) -> Result<reqwest::Response, String> {
        self.client
            .get(format!("{}{}", SPOTIFY_API_URL, path))
            .bearer_auth(&self.access_token)
            .send()
            .await
            .map_err(|e| format!("Spotify request failed: {}", e))
    }
}

#[async_trait]
impl MusicService for SpotifyClient {
    async fn current_playback(&self) -> Result<Option<NowPlaying>, String> {
        let response = self.get("/me/player").await?;

        // 204 = no active device, nothing playing
        if response.status() == StatusCode::NO_CONTENT {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(format!("Spotify API error {}", response.status()));
        }

        let body: PlaybackStateBody = response
            .json()
            .await
            .map_err(|e| format!("Failed to parse playback state: {}", e))?;

        Ok(now_playing_from(body))
    }

    async fn user_profile(&self) -> Result<UserProfile, String> {
        let response = self.get("/me").await?;
        if !response.status().is_success() {
            return Err(format!("Spotify API error {}", response.status()));
        }

        let body: ProfileBody = response
            .json()
            .await
            .map_err(|e| format!("Failed to parse user profile: {}", e))?;

        Ok(UserProfile {
            id: body.id,
            display_name: body.display_name,
        })
    }

    async fn playlists(&self, limit: u32) -> Result<Vec<PlaylistSummary>, String> {
        let response = self.get(&format!("/me/playlists?limit={}", limit)).await?;
        if !response.status().is_success() {
            return Err(format!("Spotify API error {}", response.status()));
        }

        let page: PlaylistPage = response
            .json()
            .await
            .map_err(|e| format!("Failed to parse playlists: {}", e))?;

        Ok(page
            .items
            .into_iter()
            .map(|entry| PlaylistSummary {
                id: entry.id,
                name: entry.name,
                total_tracks: entry.tracks.total,
            })
            .collect())
    }
}

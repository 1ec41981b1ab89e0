//! Harmoura backend API client wrapper with all API methods

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Result, anyhow};
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tokio::sync::RwLock;

use crate::player::{Track, TrackId};
use super::types::CategoryKind;

#[derive(Clone, Debug, Deserialize)]
pub struct AuthTokens {
    pub refresh: String,
    pub access: String,
}

/// Reply of both the login and register endpoints
#[derive(Clone, Debug, Deserialize)]
pub struct AuthResponse {
    #[serde(default)]
    pub message: String,
    pub username: String,
    pub tokens: AuthTokens,
}

#[derive(Clone, Debug, Deserialize)]
pub struct Playlist {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub songs: Vec<Track>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct SearchResults {
    #[serde(default)]
    pub songs: Vec<Track>,
    #[serde(default)]
    pub artists: Vec<String>,
    #[serde(default)]
    pub emotions: Vec<String>,
    #[serde(default)]
    pub languages: Vec<String>,
}

impl SearchResults {
    pub fn is_empty(&self) -> bool {
        self.songs.is_empty() && self.artists.is_empty() && self.emotions.is_empty() && self.languages.is_empty()
    }
}

/// Listening statistics kept by the backend
#[derive(Clone, Debug, Default, Deserialize)]
pub struct Profile {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub profile_picture_url: Option<String>,
    #[serde(default)]
    pub emotion_stats: HashMap<String, u64>,
    #[serde(default)]
    pub artist_stats: HashMap<String, u64>,
}

impl Profile {
    /// Stats sorted by play count, highest first, ties by name
    pub fn ranked(stats: &HashMap<String, u64>) -> Vec<(String, u64)> {
        let mut ranked: Vec<(String, u64)> = stats.iter().map(|(k, v)| (k.clone(), *v)).collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        ranked
    }
}

#[derive(Deserialize)]
struct SongsEnvelope {
    #[serde(default)]
    songs: Vec<Track>,
}

#[derive(Serialize)]
struct PlaylistSongRequest {
    playlist_id: i64,
    song_id: TrackId,
}

/// Pull a readable message out of an error response body.
///
/// The backend answers `{"error": ...}` for its own checks and field maps
/// like `{"email": ["..."]}` for validation failures.
pub fn error_message(status: u16, body: &str) -> String {
    let detail = serde_json::from_str::<Value>(body).ok().and_then(|value| {
        for key in ["error", "detail", "message"] {
            if let Some(text) = value.get(key).and_then(Value::as_str) {
                return Some(text.to_string());
            }
        }
        value.as_object().and_then(|fields| {
            fields.iter().find_map(|(field, errors)| {
                let first = match errors {
                    Value::Array(items) => items.first().and_then(Value::as_str),
                    Value::String(text) => Some(text.as_str()),
                    _ => None,
                }?;
                Some(format!("{}: {}", field, first))
            })
        })
    });

    match detail {
        Some(detail) => format!("{} {}", status, detail),
        None => format!("{} request failed", status),
    }
}

/// Harmoura API client sharing its connection pool with the audio backend
#[derive(Clone)]
pub struct HarmouraClient {
    http: reqwest::Client,
    base_url: String,
    timeout: Duration,
    access_token: Arc<RwLock<Option<String>>>,
}

impl HarmouraClient {
    pub fn new(http: reqwest::Client, base_url: &str, timeout: Duration) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout,
            access_token: Arc::new(RwLock::new(None)),
        }
    }

    pub async fn set_access_token(&self, token: Option<String>) {
        *self.access_token.write().await = token;
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api/users/{}", self.base_url, path)
    }

    fn category_url(&self, kind: CategoryKind, value: &str) -> Result<reqwest::Url> {
        let mut url = reqwest::Url::parse(&self.url("songs/"))?;
        url.path_segments_mut()
            .map_err(|_| anyhow!("Backend URL {} cannot hold a path", self.base_url))?
            .pop_if_empty()
            .push(kind.path_segment())
            .push(value)
            .push("");
        Ok(url)
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> Result<reqwest::Response> {
        let request = match self.access_token.read().await.as_deref() {
            Some(token) => request.bearer_auth(token),
            None => request,
        };
        let response = request.timeout(self.timeout).send().await?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(anyhow!(error_message(status.as_u16(), &body)))
    }

    async fn get_json<T: DeserializeOwned>(&self, request: reqwest::RequestBuilder) -> Result<T> {
        Ok(self.send(request).await?.json::<T>().await?)
    }

    pub async fn login(&self, email: &str, password: &str, remember_me: bool) -> Result<AuthResponse> {
        crate::log_api_request!("login", email);
        let body = json!({ "email": email, "password": password, "remember_me": remember_me });
        let result = self.get_json(self.http.post(self.url("login/")).json(&body)).await;
        crate::log_api_result!("login", result);
        result
    }

    pub async fn register(&self, username: &str, email: &str, password: &str) -> Result<AuthResponse> {
        crate::log_api_request!("register", username, email);
        let body = json!({ "username": username, "email": email, "password": password });
        let result = self.get_json(self.http.post(self.url("register/")).json(&body)).await;
        crate::log_api_result!("register", result);
        result
    }

    pub async fn all_songs(&self) -> Result<Vec<Track>> {
        crate::log_api_request!("all_songs", url = %self.url("songs/"));
        let result = self.get_json(self.http.get(self.url("songs/"))).await;
        crate::log_api_result!("all_songs", result);
        result
    }

    pub async fn search(&self, query: &str) -> Result<SearchResults> {
        crate::log_api_request!("search", query);
        let request = self.http.get(self.url("songs/search/")).query(&[("q", query)]);
        let result = self.get_json(request).await;
        crate::log_api_result!("search", result);
        result
    }

    pub async fn category_songs(&self, kind: CategoryKind, value: &str) -> Result<Vec<Track>> {
        crate::log_api_request!("category_songs", kind = ?kind, value);
        let url = self.category_url(kind, value)?;
        let result = self
            .get_json::<SongsEnvelope>(self.http.get(url))
            .await
            .map(|envelope| envelope.songs);
        crate::log_api_result!("category_songs", result);
        result
    }

    pub async fn playlists(&self) -> Result<Vec<Playlist>> {
        crate::log_api_request!("playlists", url = %self.url("playlists/"));
        let result = self.get_json(self.http.get(self.url("playlists/"))).await;
        crate::log_api_result!("playlists", result);
        result
    }

    pub async fn create_playlist(&self, name: &str, song_ids: &[TrackId]) -> Result<Playlist> {
        if name.trim().is_empty() {
            return Err(anyhow!("Playlist name is required"));
        }
        crate::log_api_request!("create_playlist", name, songs = song_ids.len());
        let body = json!({ "name": name.trim(), "song_ids": song_ids });
        let result = self.get_json(self.http.post(self.url("playlists/create/")).json(&body)).await;
        crate::log_api_result!("create_playlist", result);
        result
    }

    pub async fn add_song_to_playlist(&self, playlist_id: i64, song_id: TrackId) -> Result<Playlist> {
        crate::log_api_request!("add_song_to_playlist", playlist_id, song_id = %song_id);
        let body = PlaylistSongRequest { playlist_id, song_id };
        let result = self.get_json(self.http.post(self.url("playlists/add_song/")).json(&body)).await;
        crate::log_api_result!("add_song_to_playlist", result);
        result
    }

    pub async fn remove_song_from_playlist(&self, playlist_id: i64, song_id: TrackId) -> Result<Playlist> {
        crate::log_api_request!("remove_song_from_playlist", playlist_id, song_id = %song_id);
        let body = PlaylistSongRequest { playlist_id, song_id };
        let result = self.get_json(self.http.post(self.url("playlists/remove_song/")).json(&body)).await;
        crate::log_api_result!("remove_song_from_playlist", result);
        result
    }

    pub async fn delete_playlist(&self, playlist_id: i64) -> Result<()> {
        crate::log_api_request!("delete_playlist", playlist_id);
        let url = self.url(&format!("playlists/delete/{}/", playlist_id));
        let result = self.send(self.http.delete(url)).await.map(|_| ());
        crate::log_api_result!("delete_playlist", result);
        result
    }

    pub async fn profile(&self) -> Result<Profile> {
        crate::log_api_request!("profile", url = %self.url("profile/"));
        let result = self.get_json(self.http.get(self.url("profile/"))).await;
        crate::log_api_result!("profile", result);
        result
    }

    /// Tell the backend a song was played so it can update listening stats.
    pub async fn record_play(&self, song_id: TrackId) -> Result<()> {
        tracing::trace!(song_id = %song_id, "Recording play");
        let body = json!({ "song_id": song_id });
        self.send(self.http.post(self.url("play_song/")).json(&body)).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> HarmouraClient {
        HarmouraClient::new(reqwest::Client::new(), "http://127.0.0.1:8000/", Duration::from_secs(5))
    }

    #[test]
    fn builds_endpoint_urls() {
        let client = client();
        assert_eq!(client.url("songs/"), "http://127.0.0.1:8000/api/users/songs/");
        assert_eq!(
            client.url("playlists/delete/3/"),
            "http://127.0.0.1:8000/api/users/playlists/delete/3/"
        );
    }

    #[test]
    fn category_url_encodes_value() {
        let url = client().category_url(CategoryKind::Artist, "Arijit Singh").unwrap();
        assert_eq!(
            url.as_str(),
            "http://127.0.0.1:8000/api/users/songs/artist/Arijit%20Singh/"
        );

        let url = client().category_url(CategoryKind::Emotion, "Love").unwrap();
        assert_eq!(url.as_str(), "http://127.0.0.1:8000/api/users/songs/emotion/Love/");
    }

    #[test]
    fn error_message_prefers_backend_error_field() {
        assert_eq!(
            error_message(401, r#"{"error": "Invalid credentials"}"#),
            "401 Invalid credentials"
        );
        assert_eq!(
            error_message(401, r#"{"detail": "Given token not valid for any token type"}"#),
            "401 Given token not valid for any token type"
        );
    }

    #[test]
    fn error_message_reads_validation_errors() {
        assert_eq!(
            error_message(400, r#"{"email": ["Enter a valid email address."]}"#),
            "400 email: Enter a valid email address."
        );
    }

    #[test]
    fn error_message_falls_back_on_status() {
        assert_eq!(error_message(502, "<html>Bad gateway</html>"), "502 request failed");
        assert_eq!(error_message(500, ""), "500 request failed");
    }

    #[test]
    fn decodes_playlist_with_songs() {
        let json = r#"[{
            "id": 3, "name": "Road trip",
            "songs": [{"id": 1, "title": "A", "artist": "X", "src": "/media/songs/a.mp3"}],
            "created_at": "2025-03-14T09:26:53.589793Z"
        }]"#;
        let playlists: Vec<Playlist> = serde_json::from_str(json).unwrap();

        assert_eq!(playlists.len(), 1);
        assert_eq!(playlists[0].name, "Road trip");
        assert_eq!(playlists[0].songs[0].id, TrackId(1));
        assert!(playlists[0].created_at.is_some());
    }

    #[test]
    fn decodes_partial_search_results() {
        let results: SearchResults = serde_json::from_str(r#"{"songs": [], "artists": ["Nila"]}"#).unwrap();
        assert_eq!(results.artists, vec!["Nila".to_string()]);
        assert!(results.emotions.is_empty());
        assert!(!results.is_empty());
        assert!(SearchResults::default().is_empty());
    }

    #[test]
    fn decodes_category_envelope() {
        let envelope: SongsEnvelope = serde_json::from_str(
            r#"{"songs": [{"id": 2, "title": "B", "artist": "Y", "src": "/media/b.mp3", "emotion": "Love"}]}"#,
        )
        .unwrap();
        assert_eq!(envelope.songs[0].emotion.as_deref(), Some("Love"));

        let empty: SongsEnvelope = serde_json::from_str("{}").unwrap();
        assert!(empty.songs.is_empty());
    }

    #[test]
    fn ranks_profile_stats() {
        let profile: Profile = serde_json::from_str(
            r#"{"username": "asha", "emotion_stats": {"Calmness": 2, "Love": 5, "Happiness": 2}}"#,
        )
        .unwrap();
        let ranked = Profile::ranked(&profile.emotion_stats);

        assert_eq!(
            ranked,
            vec![
                ("Love".to_string(), 5),
                ("Calmness".to_string(), 2),
                ("Happiness".to_string(), 2),
            ]
        );
        assert!(profile.artist_stats.is_empty());
    }

    #[test]
    fn serializes_playlist_song_request() {
        let body = serde_json::to_value(PlaylistSongRequest { playlist_id: 3, song_id: TrackId(9) }).unwrap();
        assert_eq!(body, json!({ "playlist_id": 3, "song_id": 9 }));
    }
}

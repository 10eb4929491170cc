#![allow(dead_code)]

use std::{
    collections::{HashMap, VecDeque},
    net::SocketAddr,
    path::PathBuf,
    sync::{
        Arc, Mutex,
        atomic::{AtomicUsize, Ordering},
    },
    time::Duration as StdDuration,
};

use async_trait::async_trait;
use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, Response, StatusCode, header},
};
use chrono::{Duration, Utc};
use spotisearch::{
    config::{AlbumMode, AppConfig, RetryPolicy, SpotifyConfig},
    server::{AppState, router},
    spotify::{AuthenticationError, SpotifyApi, SpotifyError},
    store::SqliteAccountStore,
    types::{
        Album, AlbumArtist, Artist, ClientToken, ExternalUrls, Followers, Image, Track, TrackAlbum,
    },
};
use tower::ServiceExt;

pub const DRAKE_URI: &str = "spotify:artist:3TVXtAsR1Inumwj472S9r4";

/// Spotify stand-in serving canned data and counting requests.
#[derive(Default)]
pub struct FakeSpotify {
    pub rejected_exchanges: Mutex<VecDeque<StatusCode>>,
    pub artists: Vec<Artist>,
    pub top_tracks: HashMap<String, Vec<Track>>,
    pub albums: HashMap<String, Vec<Album>>,
    token_requests: AtomicUsize,
    search_requests: AtomicUsize,
}

impl FakeSpotify {
    pub fn token_requests(&self) -> usize {
        self.token_requests.load(Ordering::SeqCst)
    }

    pub fn search_requests(&self) -> usize {
        self.search_requests.load(Ordering::SeqCst)
    }

    pub fn reject_next_exchange(&self, status: StatusCode) {
        self.rejected_exchanges.lock().unwrap().push_back(status);
    }

    /// One artist, three top tracks of which two have a preview, five albums
    /// with one repeated name.
    pub fn drake() -> Self {
        FakeSpotify {
            artists: vec![artist(DRAKE_URI, "Drake")],
            top_tracks: HashMap::from([(
                DRAKE_URI.to_string(),
                vec![
                    track("God's Plan", Some("https://p.scdn.co/mp3-preview/gp")),
                    track("Hotline Bling", None),
                    track("One Dance", Some("https://p.scdn.co/mp3-preview/od")),
                ],
            )]),
            albums: HashMap::from([(
                DRAKE_URI.to_string(),
                vec![
                    album("Scorpion", "https://open.spotify.com/album/1"),
                    album("Views", "https://open.spotify.com/album/2"),
                    album("Scorpion", "https://open.spotify.com/album/3"),
                    album("Nothing Was the Same", "https://open.spotify.com/album/4"),
                    album("Take Care", "https://open.spotify.com/album/5"),
                ],
            )]),
            ..Default::default()
        }
    }

    /// Two artists, each with its own albums.
    pub fn two_artists() -> Self {
        FakeSpotify {
            artists: vec![
                artist("spotify:artist:first", "First"),
                artist("spotify:artist:second", "Second"),
            ],
            albums: HashMap::from([
                (
                    "spotify:artist:first".to_string(),
                    vec![album("Early", "https://open.spotify.com/album/e")],
                ),
                (
                    "spotify:artist:second".to_string(),
                    vec![
                        album("Late", "https://open.spotify.com/album/l"),
                        album("Later", "https://open.spotify.com/album/ll"),
                        album("Late", "https://open.spotify.com/album/l2"),
                    ],
                ),
            ]),
            ..Default::default()
        }
    }
}

#[async_trait]
impl SpotifyApi for FakeSpotify {
    async fn request_client_token(&self) -> Result<ClientToken, AuthenticationError> {
        let n = self.token_requests.fetch_add(1, Ordering::SeqCst) + 1;
        if let Some(status) = self.rejected_exchanges.lock().unwrap().pop_front() {
            return Err(AuthenticationError::Rejected(status));
        }
        Ok(ClientToken {
            access_token: format!("client-token-{}", n),
            expiration: Utc::now() + Duration::seconds(3600),
        })
    }

    async fn search_artists(&self, _token: &str, _query: &str) -> Result<Vec<Artist>, SpotifyError> {
        self.search_requests.fetch_add(1, Ordering::SeqCst);
        Ok(self.artists.clone())
    }

    async fn artist_top_tracks(&self, artist_uri: &str) -> Result<Vec<Track>, SpotifyError> {
        Ok(self.top_tracks.get(artist_uri).cloned().unwrap_or_default())
    }

    async fn artist_albums(&self, artist_uri: &str) -> Result<Vec<Album>, SpotifyError> {
        Ok(self.albums.get(artist_uri).cloned().unwrap_or_default())
    }
}

pub fn artist(uri: &str, name: &str) -> Artist {
    Artist {
        id: uri.rsplit(':').next().unwrap_or_default().to_string(),
        uri: uri.to_string(),
        name: name.to_string(),
        external_urls: ExternalUrls {
            spotify: Some(format!("https://open.spotify.com/artist/{}", name)),
        },
        followers: Followers { total: 42 },
        images: vec![],
        popularity: 90,
    }
}

pub fn track(name: &str, preview_url: Option<&str>) -> Track {
    Track {
        id: name.to_string(),
        name: name.to_string(),
        album: TrackAlbum {
            release_date: "2018-06-29".to_string(),
            images: vec![Image {
                url: "https://i.scdn.co/image/cover".to_string(),
                height: Some(640),
                width: Some(640),
            }],
        },
        artists: vec![AlbumArtist {
            id: "drake".to_string(),
            name: "Drake".to_string(),
        }],
        external_urls: ExternalUrls {
            spotify: Some(format!("https://open.spotify.com/track/{}", name)),
        },
        preview_url: preview_url.map(str::to_string),
    }
}

pub fn album(name: &str, url: &str) -> Album {
    Album {
        id: url.to_string(),
        name: name.to_string(),
        artists: vec![AlbumArtist {
            id: "drake".to_string(),
            name: "Drake".to_string(),
        }],
        external_urls: ExternalUrls {
            spotify: Some(url.to_string()),
        },
        images: vec![],
    }
}

pub fn test_config(album_mode: AlbumMode) -> AppConfig {
    AppConfig {
        spotify: SpotifyConfig {
            client_id: "client".to_string(),
            client_secret: "secret".to_string(),
            redirect_uri: None,
            token_url: "http://127.0.0.1:9/api/token".to_string(),
            api_url: "http://127.0.0.1:9/v1".to_string(),
            market: "US".to_string(),
        },
        server_address: SocketAddr::from(([127, 0, 0, 1], 0)),
        database_path: PathBuf::from(":memory:"),
        album_mode,
        token_retry: RetryPolicy {
            max_attempts: 2,
            initial_backoff: StdDuration::ZERO,
        },
        session_max_age: StdDuration::from_secs(3600),
    }
}

pub struct TestApp {
    pub app: Router,
    pub spotify: Arc<FakeSpotify>,
    pub store: Arc<SqliteAccountStore>,
}

impl TestApp {
    pub fn new(spotify: FakeSpotify) -> Self {
        Self::with_mode(spotify, AlbumMode::LastArtist)
    }

    pub fn with_mode(spotify: FakeSpotify, album_mode: AlbumMode) -> Self {
        let spotify = Arc::new(spotify);
        let store = Arc::new(SqliteAccountStore::in_memory().unwrap());
        let state = AppState::with_parts(test_config(album_mode), store.clone(), spotify.clone());
        TestApp {
            app: router(state),
            spotify,
            store,
        }
    }

    pub async fn get(&self, uri: &str, cookie: Option<&str>) -> Response<Body> {
        let mut request = Request::builder().method("GET").uri(uri);
        if let Some(cookie) = cookie {
            request = request.header(header::COOKIE, cookie);
        }
        self.app
            .clone()
            .oneshot(request.body(Body::empty()).unwrap())
            .await
            .unwrap()
    }

    pub async fn post_form(&self, uri: &str, body: &str, cookie: Option<&str>) -> Response<Body> {
        let mut request = Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
        if let Some(cookie) = cookie {
            request = request.header(header::COOKIE, cookie);
        }
        self.app
            .clone()
            .oneshot(request.body(Body::from(body.to_string())).unwrap())
            .await
            .unwrap()
    }

    /// Signs up `ada@example.com` and returns the session cookie to send back.
    pub async fn signup_ada(&self) -> String {
        let response = self
            .post_form(
                "/signup",
                "email=Ada%40Example.com&username=ada&password1=pw&password2=pw",
                None,
            )
            .await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        session_cookie(&response).expect("signup sets the session cookie")
    }
}

/// `name=value` pair of the session cookie set by a response.
pub fn session_cookie(response: &Response<Body>) -> Option<String> {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .find(|value| value.starts_with("session_token="))
        .and_then(|value| value.split(';').next())
        .map(str::to_string)
}

pub fn location(response: &Response<Body>) -> Option<&str> {
    response
        .headers()
        .get(header::LOCATION)
        .and_then(|value| value.to_str().ok())
}

pub async fn body_string(response: Response<Body>) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

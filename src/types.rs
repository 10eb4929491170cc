use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tabled::Tabled;

/// Access token obtained through the client-credentials grant.
///
/// Only ever persisted column by column through the account store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientToken {
    pub access_token: String,
    pub expiration: DateTime<Utc>,
}

impl ClientToken {
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        !self.access_token.is_empty() && self.expiration > now
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenResponse {
    #[serde(default)]
    pub access_token: Option<String>,
    pub expires_in: i64,
    #[serde(default)]
    pub token_type: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExternalUrls {
    #[serde(default)]
    pub spotify: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Image {
    pub url: String,
    #[serde(default)]
    pub height: Option<u32>,
    #[serde(default)]
    pub width: Option<u32>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Followers {
    #[serde(default)]
    pub total: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Artist {
    #[serde(default)]
    pub id: String,
    pub uri: String,
    pub name: String,
    #[serde(default)]
    pub external_urls: ExternalUrls,
    #[serde(default)]
    pub followers: Followers,
    #[serde(default)]
    pub images: Vec<Image>,
    #[serde(default)]
    pub popularity: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtistsContainer {
    pub items: Vec<Artist>,
    #[serde(default)]
    pub next: Option<String>,
    #[serde(default)]
    pub total: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtistSearchResponse {
    pub artists: ArtistsContainer,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlbumArtist {
    #[serde(default)]
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackAlbum {
    #[serde(default)]
    pub release_date: String,
    #[serde(default)]
    pub images: Vec<Image>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Track {
    #[serde(default)]
    pub id: String,
    pub name: String,
    pub album: TrackAlbum,
    #[serde(default)]
    pub artists: Vec<AlbumArtist>,
    #[serde(default)]
    pub external_urls: ExternalUrls,
    #[serde(default)]
    pub preview_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopTracksResponse {
    pub tracks: Vec<Track>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Album {
    #[serde(default)]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub artists: Vec<AlbumArtist>,
    #[serde(default)]
    pub external_urls: ExternalUrls,
    #[serde(default)]
    pub images: Vec<Image>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlbumResponse {
    pub items: Vec<Album>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArtistSummary {
    pub uri: String,
    pub url: String,
    pub followers: u64,
    pub image_url: String,
    pub name: String,
    pub popularity: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackSummary {
    pub release_date: String,
    pub preview_url: String,
    pub image_url: String,
    pub track: String,
    pub url: String,
    pub artists: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlbumSummary {
    pub artists: String,
    pub url: String,
    pub image_url: String,
    pub name: String,
}

/// Album section of a [`SearchPayload`], shaped by the configured album mode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AlbumList {
    /// Albums of the last processed artist only.
    Flat(Vec<AlbumSummary>),
    /// One deduplicated album list per artist, artists without albums omitted.
    PerArtist(Vec<Vec<AlbumSummary>>),
}

impl AlbumList {
    pub fn len(&self) -> usize {
        match self {
            AlbumList::Flat(albums) => albums.len(),
            AlbumList::PerArtist(groups) => groups.iter().map(Vec::len).sum(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn iter(&self) -> Box<dyn Iterator<Item = &AlbumSummary> + '_> {
        match self {
            AlbumList::Flat(albums) => Box::new(albums.iter()),
            AlbumList::PerArtist(groups) => Box::new(groups.iter().flatten()),
        }
    }
}

/// Aggregated answer of the search endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchPayload {
    pub artists: Vec<ArtistSummary>,
    pub tracks: Vec<Vec<TrackSummary>>,
    pub album: AlbumList,
}

/// Structured rejection returned by the search endpoint with HTTP 200.
///
/// Serializes to a single-key object such as `{"no_token": "Authorization error."}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SearchRejection {
    #[serde(rename = "no_token")]
    NoToken(String),
    #[serde(rename = "no_query")]
    NoQuery(String),
    #[serde(rename = "no_get")]
    NoGet(String),
}

impl SearchRejection {
    pub fn no_token() -> Self {
        SearchRejection::NoToken("Authorization error.".to_string())
    }

    pub fn no_query() -> Self {
        SearchRejection::NoQuery("Query missing.".to_string())
    }

    pub fn no_get() -> Self {
        SearchRejection::NoGet("Cannot get response.".to_string())
    }
}

#[derive(Tabled)]
pub struct ArtistTableRow {
    pub name: String,
    pub followers: u64,
    pub popularity: u32,
    pub url: String,
}

#[derive(Tabled)]
pub struct TrackTableRow {
    pub track: String,
    pub artists: String,
    pub release_date: String,
    pub preview_url: String,
}

#[derive(Tabled)]
pub struct AlbumTableRow {
    pub name: String,
    pub artists: String,
    pub url: String,
}

#[derive(Tabled)]
pub struct AccountTableRow {
    pub email: String,
    pub username: String,
    pub date_joined: String,
    pub is_admin: bool,
}

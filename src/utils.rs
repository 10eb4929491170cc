use std::collections::HashMap;

use base64::{
    Engine,
    engine::general_purpose::{STANDARD, URL_SAFE_NO_PAD},
};
use rand::{Rng, distr::Alphanumeric};
use sha2::{Digest, Sha256};

use crate::types::{AlbumArtist, AlbumSummary, Image};

/// Placeholder used in payloads when Spotify returns no image.
pub const NO_IMAGE: &str = "no-image";

pub fn generate_session_token() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(64)
        .map(char::from)
        .collect()
}

/// Digest under which a session token is stored, so the database never holds usable tokens.
pub fn hash_session_token(token: &str) -> String {
    let hash = Sha256::digest(token.as_bytes());
    URL_SAFE_NO_PAD.encode(hash)
}

/// Value of the `Authorization` header for the client-credentials exchange.
pub fn basic_auth_header(client_id: &str, client_secret: &str) -> String {
    let credentials = format!("{}:{}", client_id, client_secret);
    format!("Basic {}", STANDARD.encode(credentials.as_bytes()))
}

/// Extracts the artist id from a `spotify:artist:<id>` URI, an
/// `open.spotify.com/artist/<id>` URL or a bare id.
pub fn artist_id_from_uri(uri: &str) -> Option<&str> {
    let uri = uri.trim();
    if uri.is_empty() {
        return None;
    }

    if let Some(id) = uri.strip_prefix("spotify:artist:") {
        return Some(id).filter(|id| !id.is_empty());
    }

    if uri.starts_with("http://") || uri.starts_with("https://") {
        let path = uri.split('?').next().unwrap_or(uri);
        let mut segments = path.split('/').skip_while(|segment| *segment != "artist");
        return segments.nth(1).filter(|id| !id.is_empty());
    }

    if uri.contains(':') || uri.contains('/') {
        return None;
    }
    Some(uri)
}

pub fn first_image_url(images: &[Image]) -> String {
    images
        .first()
        .map(|image| image.url.clone())
        .unwrap_or_else(|| NO_IMAGE.to_string())
}

pub fn join_artist_names(artists: &[AlbumArtist]) -> String {
    artists
        .iter()
        .map(|artist| artist.name.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Removes albums sharing a name.
///
/// A repeated name keeps the position where it first appeared but takes the
/// values of its last occurrence.
pub fn dedup_albums_by_name(albums: Vec<AlbumSummary>) -> Vec<AlbumSummary> {
    let mut positions: HashMap<String, usize> = HashMap::new();
    let mut unique: Vec<AlbumSummary> = Vec::with_capacity(albums.len());

    for album in albums {
        match positions.get(&album.name) {
            Some(&index) => unique[index] = album,
            None => {
                positions.insert(album.name.clone(), unique.len());
                unique.push(album);
            }
        }
    }

    unique
}

/// Escapes text for inclusion in HTML element content or attribute values.
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#x27;"),
            other => escaped.push(other),
        }
    }
    escaped
}

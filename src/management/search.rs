use std::sync::Arc;

use tracing::debug;

use crate::{
    config::AlbumMode,
    spotify::{SpotifyApi, SpotifyError},
    types::{
        Album, AlbumList, AlbumSummary, Artist, ArtistSummary, SearchPayload, Track, TrackSummary,
    },
    utils,
};

pub const MAX_ARTISTS: usize = 10;
pub const MAX_TRACKS: usize = 10;
pub const MAX_ALBUMS: usize = 10;

/// Turns a query into artists plus their top tracks and albums.
#[derive(Clone)]
pub struct SearchAggregator {
    spotify: Arc<dyn SpotifyApi>,
    album_mode: AlbumMode,
}

impl SearchAggregator {
    pub fn new(spotify: Arc<dyn SpotifyApi>, album_mode: AlbumMode) -> Self {
        SearchAggregator {
            spotify,
            album_mode,
        }
    }

    /// Runs the artist search with `token`, then looks up top tracks and
    /// albums of every artist found, one artist after the other.
    ///
    /// Any failing call aborts the whole search, nothing is retried.
    pub async fn search(&self, query: &str, token: &str) -> Result<SearchPayload, SpotifyError> {
        let found = self.spotify.search_artists(token, query).await?;
        let found: Vec<Artist> = found.into_iter().take(MAX_ARTISTS).collect();
        debug!(query, artists = found.len(), "Artist search done");

        let artists = found.iter().map(summarize_artist).collect();
        let mut tracks = Vec::new();
        let mut last_albums = Vec::new();
        let mut album_groups = Vec::new();

        for artist in found.iter().filter(|artist| !artist.uri.is_empty()) {
            let top_tracks = self.spotify.artist_top_tracks(&artist.uri).await?;
            let previews = summarize_tracks(top_tracks);
            if !previews.is_empty() {
                tracks.push(previews);
            }

            let albums = self.spotify.artist_albums(&artist.uri).await?;
            let albums = summarize_albums(albums);
            match self.album_mode {
                AlbumMode::LastArtist => last_albums = albums,
                AlbumMode::PerArtist => {
                    if !albums.is_empty() {
                        album_groups.push(albums);
                    }
                }
            }
        }

        let album = match self.album_mode {
            AlbumMode::LastArtist => AlbumList::Flat(last_albums),
            AlbumMode::PerArtist => AlbumList::PerArtist(album_groups),
        };

        Ok(SearchPayload {
            artists,
            tracks,
            album,
        })
    }
}

fn summarize_artist(artist: &Artist) -> ArtistSummary {
    ArtistSummary {
        uri: artist.uri.clone(),
        url: artist.external_urls.spotify.clone().unwrap_or_default(),
        followers: artist.followers.total,
        image_url: utils::first_image_url(&artist.images),
        name: artist.name.clone(),
        popularity: artist.popularity,
    }
}

/// First tracks that come with a preview.
fn summarize_tracks(tracks: Vec<Track>) -> Vec<TrackSummary> {
    tracks
        .into_iter()
        .take(MAX_TRACKS)
        .filter_map(|track| {
            let preview_url = track.preview_url.filter(|url| !url.is_empty())?;
            Some(TrackSummary {
                release_date: track.album.release_date,
                preview_url,
                image_url: utils::first_image_url(&track.album.images),
                track: track.name,
                url: track.external_urls.spotify.unwrap_or_default(),
                artists: utils::join_artist_names(&track.artists),
            })
        })
        .collect()
}

fn summarize_albums(albums: Vec<Album>) -> Vec<AlbumSummary> {
    let albums = albums
        .into_iter()
        .take(MAX_ALBUMS)
        .map(|album| AlbumSummary {
            artists: utils::join_artist_names(&album.artists),
            url: album.external_urls.spotify.unwrap_or_default(),
            image_url: utils::first_image_url(&album.images),
            name: album.name,
        })
        .collect();
    utils::dedup_albums_by_name(albums)
}

#[cfg(test)]
mod tests {
    use std::{collections::HashMap, sync::atomic::Ordering};

    use super::*;
    use crate::management::testing::{FakeSpotify, album, artist, track};

    fn drake() -> FakeSpotify {
        let uri = "spotify:artist:3TVXtAsR1Inumwj472S9r4";
        FakeSpotify {
            artists: vec![artist(uri, "Drake")],
            top_tracks: HashMap::from([(
                uri.to_string(),
                vec![
                    track("God's Plan", Some("https://p.scdn.co/mp3-preview/1"), &["Drake"]),
                    track("In My Feelings", None, &["Drake"]),
                    track(
                        "Nice For What",
                        Some("https://p.scdn.co/mp3-preview/2"),
                        &["Drake", "Big Freedia"],
                    ),
                ],
            )]),
            albums: HashMap::from([(
                uri.to_string(),
                vec![
                    album("Scorpion", "a1"),
                    album("Views", "a2"),
                    album("Scorpion", "a3"),
                    album("More Life", "a4"),
                    album("Care Package", "a5"),
                ],
            )]),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn drake_search_keeps_previews_and_dedups_albums() {
        let spotify = Arc::new(drake());
        let aggregator = SearchAggregator::new(spotify.clone(), AlbumMode::LastArtist);

        let payload = aggregator.search("Drake", "user-token").await.unwrap();

        assert_eq!(payload.artists.len(), 1);
        assert_eq!(payload.artists[0].name, "Drake");
        assert_eq!(payload.tracks.len(), 1);
        assert_eq!(payload.tracks[0].len(), 2);
        assert_eq!(payload.tracks[0][1].artists, "Drake, Big Freedia");
        assert_eq!(payload.tracks[0][0].image_url, utils::NO_IMAGE);

        let AlbumList::Flat(albums) = &payload.album else {
            panic!("expected a flat album list");
        };
        let names: Vec<&str> = albums.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, vec!["Scorpion", "Views", "More Life", "Care Package"]);
        assert_eq!(albums[0].url, "a3");
        assert_eq!(
            spotify.search_tokens.lock().unwrap().as_slice(),
            ["user-token".to_string()]
        );
    }

    fn two_artists() -> FakeSpotify {
        FakeSpotify {
            artists: vec![artist("spotify:artist:A", "A"), artist("spotify:artist:B", "B")],
            top_tracks: HashMap::from([
                (
                    "spotify:artist:A".to_string(),
                    vec![track("a-song", Some("https://p/a"), &["A"])],
                ),
                ("spotify:artist:B".to_string(), vec![track("b-song", None, &["B"])]),
            ]),
            albums: HashMap::from([
                ("spotify:artist:A".to_string(), vec![album("First", "x1")]),
                (
                    "spotify:artist:B".to_string(),
                    vec![album("Second", "y1"), album("Third", "y2")],
                ),
            ]),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn last_artist_mode_keeps_only_last_albums() {
        let aggregator = SearchAggregator::new(Arc::new(two_artists()), AlbumMode::LastArtist);

        let payload = aggregator.search("x", "t").await.unwrap();

        let names: Vec<&str> = payload.artists.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, vec!["A", "B"]);
        assert_eq!(payload.tracks.len(), 1);
        let albums: Vec<&str> = payload.album.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(albums, vec!["Second", "Third"]);
    }

    #[tokio::test]
    async fn per_artist_mode_groups_albums() {
        let aggregator = SearchAggregator::new(Arc::new(two_artists()), AlbumMode::PerArtist);

        let payload = aggregator.search("x", "t").await.unwrap();

        let AlbumList::PerArtist(groups) = payload.album else {
            panic!("expected grouped albums");
        };
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0][0].name, "First");
        assert_eq!(groups[1].len(), 2);
    }

    #[tokio::test]
    async fn results_are_capped() {
        let artists = (0..15)
            .map(|i| artist(&format!("spotify:artist:{}", i), &format!("artist-{}", i)))
            .collect();
        let tracks = (0..15)
            .map(|i| track(&format!("t{}", i), Some("https://p"), &["x"]))
            .collect();
        let albums = (0..15)
            .map(|i| album(&format!("album-{}", i), &format!("u{}", i)))
            .collect();
        let spotify = Arc::new(FakeSpotify {
            artists,
            top_tracks: HashMap::from([("spotify:artist:9".to_string(), tracks)]),
            albums: HashMap::from([("spotify:artist:9".to_string(), albums)]),
            ..Default::default()
        });
        let aggregator = SearchAggregator::new(spotify.clone(), AlbumMode::LastArtist);

        let payload = aggregator.search("x", "t").await.unwrap();

        assert_eq!(payload.artists.len(), MAX_ARTISTS);
        assert_eq!(payload.tracks[0].len(), MAX_TRACKS);
        assert_eq!(payload.album.len(), MAX_ALBUMS);
        assert_eq!(spotify.album_requests.load(Ordering::SeqCst), MAX_ARTISTS);
    }

    #[tokio::test]
    async fn artists_without_uri_are_not_looked_up() {
        let spotify = Arc::new(FakeSpotify {
            artists: vec![artist("", "Nameless")],
            ..Default::default()
        });
        let aggregator = SearchAggregator::new(spotify.clone(), AlbumMode::LastArtist);

        let payload = aggregator.search("x", "t").await.unwrap();

        assert_eq!(payload.artists.len(), 1);
        assert!(payload.tracks.is_empty());
        assert!(payload.album.is_empty());
        assert_eq!(spotify.album_requests.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn payload_serializes_flat_albums() {
        let payload = SearchPayload {
            artists: vec![],
            tracks: vec![],
            album: AlbumList::Flat(vec![AlbumSummary {
                artists: "Drake".to_string(),
                url: "u".to_string(),
                image_url: utils::NO_IMAGE.to_string(),
                name: "Views".to_string(),
            }]),
        };
        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["album"][0]["name"], "Views");
        assert_eq!(json["album"][0]["image_url"], "no-image");
        assert!(json["tracks"].as_array().unwrap().is_empty());
    }
}

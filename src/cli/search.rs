use std::{sync::Arc, time::Duration};

use indicatif::{ProgressBar, ProgressStyle};
use tabled::Table;

use crate::{
    Res,
    config::AppConfig,
    error, info,
    management::SearchAggregator,
    spotify::{SpotifyApi, SpotifyClient},
    success,
    types::{AlbumTableRow, ArtistTableRow, SearchPayload, TrackTableRow},
    warning,
};

pub async fn search(query: String) {
    let query = query.trim().to_string();
    if query.is_empty() {
        error!("Query missing.");
    }

    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => error!("Invalid configuration. Err: {}", e),
    };

    let pb = ProgressBar::new_spinner();
    pb.set_message(format!("Searching Spotify for {}...", query));
    pb.enable_steady_tick(Duration::from_millis(100));
    pb.set_style(
        ProgressStyle::with_template("{spinner:.blue} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"),
    );

    let result = run_search(config, &query).await;
    pb.finish_and_clear();

    match result {
        Ok(payload) => print_payload(&query, payload),
        Err(e) => error!("Search failed. Err: {}", e),
    }
}

async fn run_search(config: AppConfig, query: &str) -> Res<SearchPayload> {
    let spotify = Arc::new(SpotifyClient::new(config.spotify.clone()));
    let token = spotify.request_client_token().await?;
    let aggregator = SearchAggregator::new(spotify, config.album_mode);
    Ok(aggregator.search(query, &token.access_token).await?)
}

fn print_payload(query: &str, payload: SearchPayload) {
    if payload.artists.is_empty() {
        warning!("No artists found for {}.", query);
        return;
    }

    success!("Found {} artists", payload.artists.len());
    let artist_rows: Vec<ArtistTableRow> = payload
        .artists
        .into_iter()
        .map(|a| ArtistTableRow {
            name: a.name,
            followers: a.followers,
            popularity: a.popularity,
            url: a.url,
        })
        .collect();
    println!("{}", Table::new(artist_rows));

    let track_rows: Vec<TrackTableRow> = payload
        .tracks
        .into_iter()
        .flatten()
        .map(|t| TrackTableRow {
            track: t.track,
            artists: t.artists,
            release_date: t.release_date,
            preview_url: t.preview_url,
        })
        .collect();
    if track_rows.is_empty() {
        warning!("No top tracks with a preview.");
    } else {
        info!("Top tracks with a preview");
        println!("{}", Table::new(track_rows));
    }

    let album_rows: Vec<AlbumTableRow> = payload
        .album
        .iter()
        .map(|a| AlbumTableRow {
            name: a.name.clone(),
            artists: a.artists.clone(),
            url: a.url.clone(),
        })
        .collect();
    if album_rows.is_empty() {
        warning!("No albums.");
    } else {
        info!("Albums");
        println!("{}", Table::new(album_rows));
    }
}

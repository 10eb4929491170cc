use super::{SpotifyClient, SpotifyError, ensure_success};
use crate::{
    types::{Artist, ArtistSearchResponse, TopTracksResponse, Track},
    utils,
};

impl SpotifyClient {
    /// Searches artists matching a free-text query.
    ///
    /// Calls `GET {api}/search?q=<query>&type=artist` with `token` as bearer
    /// token. The query is URL-encoded by the HTTP client.
    ///
    /// # Returns
    ///
    /// The artist items of the first result page, in the order Spotify ranks
    /// them. Non-2xx answers map to [`SpotifyError::Status`].
    pub async fn get_artists_by_query(
        &self,
        token: &str,
        query: &str,
    ) -> Result<Vec<Artist>, SpotifyError> {
        let api_url = format!("{uri}/search", uri = self.config.api_url);

        let response = self
            .http
            .get(&api_url)
            .query(&[("q", query), ("type", "artist")])
            .bearer_auth(token)
            .send()
            .await?;
        let response = ensure_success(response, "search")?;

        let res = response.json::<ArtistSearchResponse>().await?;
        Ok(res.artists.items)
    }

    /// Retrieves the top tracks of an artist in the configured market.
    ///
    /// Authenticated with the client's app session, not with an account token.
    pub async fn get_top_tracks_for_artist(
        &self,
        artist_uri: &str,
    ) -> Result<Vec<Track>, SpotifyError> {
        let id = utils::artist_id_from_uri(artist_uri)
            .ok_or_else(|| SpotifyError::InvalidArtistUri(artist_uri.to_string()))?;
        let api_url = format!(
            "{uri}/artists/{id}/top-tracks",
            uri = self.config.api_url,
            id = id
        );

        let token = self.app_token().await?;
        let response = self
            .http
            .get(&api_url)
            .query(&[("market", self.config.market.as_str())])
            .bearer_auth(token)
            .send()
            .await?;
        let response = ensure_success(response, "artist top tracks")?;

        let res = response.json::<TopTracksResponse>().await?;
        Ok(res.tracks)
    }
}

use super::{SpotifyClient, SpotifyError, ensure_success};
use crate::{
    types::{Album, AlbumResponse},
    utils,
};

impl SpotifyClient {
    /// Retrieves the albums of an artist.
    ///
    /// Uses Spotify's `/artists/{id}/albums` endpoint with its default
    /// filters, authenticated with the client's app session. Only the first
    /// result page is fetched.
    pub async fn get_albums_for_artist(&self, artist_uri: &str) -> Result<Vec<Album>, SpotifyError> {
        let id = utils::artist_id_from_uri(artist_uri)
            .ok_or_else(|| SpotifyError::InvalidArtistUri(artist_uri.to_string()))?;
        let api_url = format!(
            "{uri}/artists/{id}/albums",
            uri = self.config.api_url,
            id = id
        );

        let token = self.app_token().await?;
        let response = self.http.get(&api_url).bearer_auth(token).send().await?;
        let response = ensure_success(response, "artist albums")?;

        let json = response.json::<AlbumResponse>().await?;
        Ok(json.items)
    }
}

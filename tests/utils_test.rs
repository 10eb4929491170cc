use spotisearch::types::{AlbumArtist, AlbumSummary, Image};
use spotisearch::utils::*;

// Helper function to create a test album summary
fn create_test_album(name: &str, url: &str) -> AlbumSummary {
    AlbumSummary {
        artists: "Drake".to_string(),
        url: url.to_string(),
        image_url: NO_IMAGE.to_string(),
        name: name.to_string(),
    }
}

fn create_test_image(url: &str) -> Image {
    Image {
        url: url.to_string(),
        height: Some(300),
        width: Some(300),
    }
}

#[test]
fn test_generate_session_token() {
    let token = generate_session_token();

    // Should be exactly 64 characters
    assert_eq!(token.len(), 64);

    // Should contain only alphanumeric characters
    assert!(token.chars().all(|c| c.is_ascii_alphanumeric()));

    // Two generated tokens should be different
    assert_ne!(token, generate_session_token());
}

#[test]
fn test_hash_session_token() {
    let hash = hash_session_token("abc");

    // SHA-256 is 32 bytes, 43 characters in unpadded base64
    assert_eq!(hash.len(), 43);
    assert!(!hash.contains('='));
    assert!(!hash.contains('+'));
    assert!(!hash.contains('/'));

    // Same token, same digest
    assert_eq!(hash, hash_session_token("abc"));
    assert_ne!(hash, hash_session_token("abd"));
}

#[test]
fn test_basic_auth_header() {
    // base64("client:secret")
    assert_eq!(
        basic_auth_header("client", "secret"),
        "Basic Y2xpZW50OnNlY3JldA=="
    );
}

#[test]
fn test_artist_id_from_uri() {
    assert_eq!(
        artist_id_from_uri("spotify:artist:3TVXtAsR1Inumwj472S9r4"),
        Some("3TVXtAsR1Inumwj472S9r4")
    );
    assert_eq!(
        artist_id_from_uri("https://open.spotify.com/artist/3TVXtAsR1Inumwj472S9r4?si=abc"),
        Some("3TVXtAsR1Inumwj472S9r4")
    );
    assert_eq!(
        artist_id_from_uri("3TVXtAsR1Inumwj472S9r4"),
        Some("3TVXtAsR1Inumwj472S9r4")
    );
}

#[test]
fn test_artist_id_from_invalid_uri() {
    assert_eq!(artist_id_from_uri(""), None);
    assert_eq!(artist_id_from_uri("   "), None);
    assert_eq!(artist_id_from_uri("spotify:artist:"), None);
    assert_eq!(artist_id_from_uri("spotify:track:123"), None);
    assert_eq!(artist_id_from_uri("https://open.spotify.com/album/123"), None);
}

#[test]
fn test_first_image_url() {
    let images = vec![create_test_image("first"), create_test_image("second")];
    assert_eq!(first_image_url(&images), "first");

    // Missing images fall back to the sentinel
    assert_eq!(first_image_url(&[]), "no-image");
}

#[test]
fn test_join_artist_names() {
    let artists = vec![
        AlbumArtist {
            id: "1".to_string(),
            name: "Drake".to_string(),
        },
        AlbumArtist {
            id: "2".to_string(),
            name: "Future".to_string(),
        },
    ];
    assert_eq!(join_artist_names(&artists), "Drake, Future");
    assert_eq!(join_artist_names(&[]), "");
}

#[test]
fn test_dedup_albums_by_name() {
    let albums = vec![
        create_test_album("Scorpion", "first"),
        create_test_album("Views", "views"),
        create_test_album("Scorpion", "second"),
        create_test_album("Scorpion", "third"),
        create_test_album("More Life", "more-life"),
    ];

    let unique = dedup_albums_by_name(albums);

    let names: Vec<&str> = unique.iter().map(|a| a.name.as_str()).collect();
    assert_eq!(names, vec!["Scorpion", "Views", "More Life"]);

    // First position, last value
    assert_eq!(unique[0].url, "third");
}

#[test]
fn test_dedup_albums_without_duplicates() {
    let albums = vec![create_test_album("A", "a"), create_test_album("B", "b")];
    assert_eq!(dedup_albums_by_name(albums.clone()), albums);
    assert!(dedup_albums_by_name(Vec::new()).is_empty());
}

#[test]
fn test_escape_html() {
    assert_eq!(
        escape_html(r#"<a href="x">Tom & 'Jerry'</a>"#),
        "&lt;a href=&quot;x&quot;&gt;Tom &amp; &#x27;Jerry&#x27;&lt;/a&gt;"
    );
    assert_eq!(escape_html("plain"), "plain");
}

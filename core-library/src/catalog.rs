//! Built-in catalog
//!
//! The client has no backend; every track, comic and playlist shown outside
//! the artist dashboard comes from this fixture set.

use crate::error::{LibraryError, Result};
use crate::models::{Comic, Playlist, Track};
use std::sync::OnceLock;

/// Stream used by every fixture track.
pub const FIXTURE_AUDIO_URL: &str = "https://www.soundhelix.com/examples/mp3/SoundHelix-Song-1.mp3";

/// Track that seeds an empty artist catalog.
pub const SEED_ARTIST_TRACK_ID: &str = "6";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Catalog {
    tracks: Vec<Track>,
    comics: Vec<Comic>,
    playlists: Vec<Playlist>,
}

impl Catalog {
    pub fn new(tracks: Vec<Track>, comics: Vec<Comic>, playlists: Vec<Playlist>) -> Self {
        Self {
            tracks,
            comics,
            playlists,
        }
    }

    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    pub fn comics(&self) -> &[Comic] {
        &self.comics
    }

    pub fn playlists(&self) -> &[Playlist] {
        &self.playlists
    }

    pub fn track(&self, id: &str) -> Result<&Track> {
        self.tracks
            .iter()
            .find(|t| t.id.as_str() == id)
            .ok_or_else(|| LibraryError::not_found("Track", id))
    }

    pub fn comic(&self, id: &str) -> Result<&Comic> {
        self.comics
            .iter()
            .find(|c| c.id == id)
            .ok_or_else(|| LibraryError::not_found("Comic", id))
    }

    pub fn playlist(&self, id: &str) -> Result<&Playlist> {
        self.playlists
            .iter()
            .find(|p| p.id == id)
            .ok_or_else(|| LibraryError::not_found("Playlist", id))
    }

    /// Initial artist catalog used when nothing was saved yet.
    pub fn seed_artist_tracks(&self) -> Vec<Track> {
        self.track(SEED_ARTIST_TRACK_ID)
            .map(|t| vec![t.clone()])
            .unwrap_or_default()
    }
}

/// Shared fixture catalog, built on first use.
pub fn fixture_catalog() -> &'static Catalog {
    static CATALOG: OnceLock<Catalog> = OnceLock::new();
    CATALOG.get_or_init(build_fixture_catalog)
}

fn picsum(id: u32, width: u32, height: u32) -> String {
    format!("https://picsum.photos/id/{}/{}/{}", id, width, height)
}

fn fixture_track(id: &str, title: &str, artist: &str, cover_id: u32, duration: u32) -> Track {
    Track::new(
        id,
        title,
        artist,
        picsum(cover_id, 300, 300),
        FIXTURE_AUDIO_URL,
        duration,
    )
}

fn fixture_comic(id: &str, title: &str, author: &str, first_image: u32) -> Comic {
    Comic {
        id: id.to_string(),
        title: title.to_string(),
        author: author.to_string(),
        cover_url: picsum(first_image, 400, 600),
        pages: (first_image..first_image + 3)
            .map(|image| picsum(image, 800, 1200))
            .collect(),
    }
}

fn build_fixture_catalog() -> Catalog {
    let tracks = vec![
        fixture_track("1", "Midnight City", "M83", 10, 240),
        fixture_track("2", "Blinding Lights", "The Weeknd", 11, 200),
        fixture_track("3", "Levitating", "Dua Lipa", 12, 210),
        fixture_track("4", "Space Oddity", "David Bowie", 13, 300),
        fixture_track("5", "Bohemian Rhapsody", "Queen", 14, 355),
        fixture_track(SEED_ARTIST_TRACK_ID, "High In You", "Karan Ahuja", 18, 215),
    ];

    // c1 uses images 20..=22; c2 starts its covers at 24
    let comics = vec![
        fixture_comic("c1", "Cyberpunk Chronicles", "Neo Tokyo", 20),
        fixture_comic("c2", "The Silent Void", "A. Space", 24),
    ];

    let pick = |ids: &[&str]| -> Vec<Track> {
        ids.iter()
            .filter_map(|id| tracks.iter().find(|t| t.id.as_str() == *id).cloned())
            .collect()
    };

    let playlists = vec![
        Playlist {
            id: "p1".to_string(),
            title: "Top Hits 2024".to_string(),
            description: "The hottest tracks right now.".to_string(),
            cover_url: picsum(30, 300, 300),
            tracks: pick(&["6", "1", "2", "3"]),
        },
        Playlist {
            id: "p2".to_string(),
            title: "Comic Reading Vibes".to_string(),
            description: "Ambient sounds for your reading session.".to_string(),
            cover_url: picsum(31, 300, 300),
            tracks: pick(&["4", "1"]),
        },
        Playlist {
            id: "p3".to_string(),
            title: "Deep Focus".to_string(),
            description: "Music to help you concentrate.".to_string(),
            cover_url: picsum(32, 300, 300),
            tracks: pick(&["2", "5"]),
        },
    ];

    Catalog::new(tracks, comics, playlists)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixture_contents() {
        let catalog = fixture_catalog();
        assert_eq!(catalog.tracks().len(), 6);
        assert_eq!(catalog.comics().len(), 2);
        assert_eq!(catalog.playlists().len(), 3);

        for track in catalog.tracks() {
            track.validate().unwrap();
        }
    }

    #[test]
    fn test_seed_track() {
        let seed = fixture_catalog().seed_artist_tracks();
        assert_eq!(seed.len(), 1);
        assert_eq!(seed[0].title, "High In You");
        assert_eq!(seed[0].artist, "Karan Ahuja");
        assert_eq!(seed[0].cover_url, "https://picsum.photos/id/18/300/300");
        assert_eq!(seed[0].duration, 215);
    }

    #[test]
    fn test_comic_pages() {
        let comic = fixture_catalog().comic("c2").unwrap();
        assert_eq!(comic.page_count(), 3);
        assert_eq!(comic.cover_url, "https://picsum.photos/id/24/400/600");
        assert_eq!(comic.pages[2], "https://picsum.photos/id/26/800/1200");
    }

    #[test]
    fn test_playlist_order_is_preserved() {
        let playlist = fixture_catalog().playlist("p1").unwrap();
        let ids: Vec<&str> = playlist.tracks.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["6", "1", "2", "3"]);
        assert_eq!(playlist.total_duration(), 215 + 240 + 200 + 210);
    }

    #[test]
    fn test_lookup_miss() {
        let err = fixture_catalog().track("missing").unwrap_err();
        assert!(matches!(
            err,
            LibraryError::NotFound { ref entity_type, ref id } if entity_type == "Track" && id == "missing"
        ));
    }
}

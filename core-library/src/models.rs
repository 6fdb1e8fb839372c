//! Domain models for the media client
//!
//! Field names on the wire follow the persisted JSON format, hence the
//! camelCase renames.

use crate::error::{LibraryError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

// =============================================================================
// ID Types
// =============================================================================

/// Unique identifier for a track.
///
/// Fixture tracks use short numeric ids (`"6"`); artist uploads use
/// `art-<unix millis>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TrackId(String);

impl TrackId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TrackId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TrackId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for TrackId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl AsRef<str> for TrackId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

// =============================================================================
// Domain Models
// =============================================================================

/// A playable track. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Track {
    pub id: TrackId,
    pub title: String,
    /// Artist display name
    pub artist: String,
    pub cover_url: String,
    pub audio_url: String,
    /// Nominal length in seconds
    pub duration: u32,
}

impl Track {
    pub fn new(
        id: impl Into<TrackId>,
        title: impl Into<String>,
        artist: impl Into<String>,
        cover_url: impl Into<String>,
        audio_url: impl Into<String>,
        duration: u32,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            artist: artist.into(),
            cover_url: cover_url.into(),
            audio_url: audio_url.into(),
            duration,
        }
    }

    /// Validate track data
    pub fn validate(&self) -> Result<()> {
        if self.id.as_str().trim().is_empty() {
            return Err(LibraryError::invalid("id", "Track id cannot be empty"));
        }
        if self.title.trim().is_empty() {
            return Err(LibraryError::invalid("title", "Track title cannot be empty"));
        }
        if self.audio_url.trim().is_empty() {
            return Err(LibraryError::invalid("audioUrl", "Track audio URL cannot be empty"));
        }
        Ok(())
    }
}

/// Role of the signed-in user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UserRole {
    /// A listener. Persisted as `"user"`.
    #[serde(rename = "user")]
    Listener,
    #[serde(rename = "artist")]
    Artist,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Listener => "user",
            UserRole::Artist => "artist",
        }
    }

    /// Display name given to the demo account of this role.
    pub fn default_display_name(&self) -> &'static str {
        match self {
            UserRole::Listener => "Music Fan",
            UserRole::Artist => "Karan Ahuja",
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The active user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub role: UserRole,
    pub avatar_url: String,
}

impl User {
    pub fn is_artist(&self) -> bool {
        self.role == UserRole::Artist
    }
}

/// A comic: an ordered list of page image URLs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comic {
    pub id: String,
    pub title: String,
    pub author: String,
    pub cover_url: String,
    pub pages: Vec<String>,
}

impl Comic {
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }
}

/// Curated list of tracks shown on the home screen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Playlist {
    pub id: String,
    pub title: String,
    pub description: String,
    pub cover_url: String,
    pub tracks: Vec<Track>,
}

impl Playlist {
    /// Sum of the nominal track durations, in seconds.
    pub fn total_duration(&self) -> u64 {
        self.tracks.iter().map(|t| u64::from(t.duration)).sum()
    }
}

//! # Core Library Module
//!
//! Domain model for MusicPod: tracks, users, comics and playlists, the
//! built-in fixture catalog and the `m:ss` time formatter shared by every view.
//!
//! Types serialize with the field names the client persists to storage
//! (`coverUrl`, `audioUrl`, `avatarUrl`, `"type": "artist"`), so saved
//! sessions stay readable across versions.

pub mod catalog;
pub mod error;
pub mod format;
pub mod models;

pub use catalog::{fixture_catalog, Catalog, SEED_ARTIST_TRACK_ID};
pub use error::{LibraryError, Result};
pub use format::format_time;
pub use models::{Comic, Playlist, Track, TrackId, User, UserRole};

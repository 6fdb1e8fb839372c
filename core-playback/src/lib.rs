//! # Playback & Offline Cache Module
//!
//! Drives the single audio output and keeps downloaded tracks available
//! without network access.
//!
//! ## Overview
//!
//! - [`PlaybackController`] owns the host [`AudioTransport`](bridge_traits::AudioTransport)
//!   and the [`PlaybackState`]. It prefers a cached payload over the network
//!   URL when starting a track.
//! - [`OfflineCacheManager`] downloads payloads into the host
//!   [`ObjectStore`](bridge_traits::ObjectStore) and tracks which ids are
//!   available offline.

pub mod cache;
pub mod controller;
pub mod error;
pub mod state;

pub use cache::{DownloadOutcome, OfflineCache, OfflineCacheManager};
pub use controller::PlaybackController;
pub use error::{PlaybackError, Result};
pub use state::{PlayOutcome, PlaybackState};

//! Durable session storage
//!
//! Thin JSON layer over the host [`SettingsStore`]. Every value is written as
//! a complete document; there are no partial updates.
//!
//! ## Example
//!
//! ```ignore
//! use core_session::storage::{SessionStorage, HISTORY_KEY};
//!
//! let storage = SessionStorage::new(settings_store);
//! storage.write_json(HISTORY_KEY, &history).await?;
//! let history: Vec<Track> = storage.read_json(HISTORY_KEY).await?.into_option().unwrap_or_default();
//! ```

use crate::error::{Result, SessionError};
use bridge_traits::SettingsStore;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, warn};

pub const USER_KEY: &str = "musicpod_user";
pub const HISTORY_KEY: &str = "musicpod_history";
pub const ARTIST_TRACKS_KEY: &str = "musicpod_artist_tracks";
pub const COMIC_PROGRESS_KEY: &str = "musicpod_comic_progress";

/// Keys removed when the user signs out, identity last. The artist catalog survives.
pub const SIGN_OUT_KEYS: [&str; 3] = [HISTORY_KEY, COMIC_PROGRESS_KEY, USER_KEY];

/// Outcome of reading one key.
#[derive(Debug, Clone, PartialEq)]
pub enum Persisted<T> {
    /// Nothing stored under the key.
    Absent,
    /// A value exists but does not parse. Carries the parse error text.
    Corrupt(String),
    Present(T),
}

impl<T> Persisted<T> {
    /// Corrupt values count as "no saved state".
    pub fn into_option(self) -> Option<T> {
        match self {
            Persisted::Present(value) => Some(value),
            Persisted::Absent | Persisted::Corrupt(_) => None,
        }
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, Persisted::Absent)
    }
}

#[derive(Clone)]
pub struct SessionStorage {
    settings: Arc<dyn SettingsStore>,
}

impl SessionStorage {
    pub fn new(settings: Arc<dyn SettingsStore>) -> Self {
        Self { settings }
    }

    /// Read and decode `key`.
    ///
    /// Storage failures are errors. Undecodable content is reported as
    /// [`Persisted::Corrupt`] and left in place; the next write replaces it.
    pub async fn read_json<T: DeserializeOwned>(&self, key: &str) -> Result<Persisted<T>> {
        let raw = self.settings.get_string(key).await.map_err(|e| {
            warn!(key, error = %e, "Failed to read session value");
            SessionError::StorageUnavailable {
                key: key.to_string(),
                message: e.to_string(),
            }
        })?;

        let Some(raw) = raw else {
            debug!(key, "No saved value");
            return Ok(Persisted::Absent);
        };

        match serde_json::from_str(&raw) {
            Ok(value) => Ok(Persisted::Present(value)),
            Err(e) => {
                warn!(key, error = %e, "Saved value is corrupt, ignoring it");
                Ok(Persisted::Corrupt(e.to_string()))
            }
        }
    }

    pub async fn write_json<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<()> {
        let json = serde_json::to_string(value).map_err(|e| SessionError::SerializationFailed {
            key: key.to_string(),
            source: e,
        })?;

        self.settings.set_string(key, &json).await.map_err(|e| {
            warn!(key, error = %e, "Failed to write session value");
            SessionError::StorageUnavailable {
                key: key.to_string(),
                message: e.to_string(),
            }
        })?;

        debug!(key, bytes = json.len(), "Session value written");
        Ok(())
    }

    pub async fn remove(&self, key: &str) -> Result<()> {
        self.settings.delete(key).await.map_err(|e| {
            warn!(key, error = %e, "Failed to remove session value");
            SessionError::StorageUnavailable {
                key: key.to_string(),
                message: e.to_string(),
            }
        })
    }
}

//! # Session Module
//!
//! The signed-in user, their listening history and, for artists, the catalog
//! of uploaded releases.
//!
//! ## Overview
//!
//! [`SessionManager`] is the single owner of session state. Every mutation is
//! written to the host [`SettingsStore`](bridge_traits::SettingsStore) as a
//! full JSON document before it becomes visible in memory, so a failed write
//! leaves both copies as they were.
//!
//! | Key | Content |
//! |-----|---------|
//! | `musicpod_user` | active [`User`](core_library::User) |
//! | `musicpod_history` | most recent tracks first, at most 50 |
//! | `musicpod_artist_tracks` | artist catalog, newest first |
//! | `musicpod_comic_progress` | cleared on logout |

pub mod error;
pub mod manager;
pub mod storage;

pub use error::{Result, SessionError};
pub use manager::{SessionManager, SessionSnapshot, DEFAULT_AVATAR_URL, DEFAULT_COVER_URL, HISTORY_LIMIT};
pub use storage::{Persisted, SessionStorage};

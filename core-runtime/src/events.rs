//! # Event Bus System
//!
//! Typed, broadcast-based notifications from the core to its views, built on
//! `tokio::sync::broadcast`.
//!
//! ## Overview
//!
//! - **Event Types**: one enum per domain (session, playback, offline cache)
//!   wrapped in [`CoreEvent`]
//! - **EventBus**: cloneable publisher handle
//! - **EventStream**: receiver wrapper with optional filtering
//!
//! ```text
//! ┌────────────────┐   emit   ┌──────────┐  subscribe  ┌────────────┐
//! │ SessionManager ├─────────>│          ├────────────>│ Player bar │
//! └────────────────┘          │ EventBus │             └────────────┘
//! ┌────────────────┐   emit   │          │  subscribe  ┌────────────┐
//! │   Controller   ├─────────>│          ├────────────>│  Profile   │
//! └────────────────┘          └──────────┘             └────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust
//! use core_runtime::events::{CacheEvent, CoreEvent, EventBus, EventStream};
//!
//! # #[tokio::main]
//! # async fn main() {
//! let bus = EventBus::new(32);
//! let mut failures = EventStream::new(bus.subscribe())
//!     .filter(|event| matches!(event, CoreEvent::Cache(CacheEvent::DownloadFailed { .. })));
//!
//! bus.emit(CoreEvent::Cache(CacheEvent::download_failed("6", "HTTP 404"))).ok();
//!
//! let event = failures.recv().await.unwrap();
//! assert_eq!(event.description(), "Offline download failed");
//! # }
//! ```
//!
//! ## Error Handling
//!
//! - **`RecvError::Lagged(n)`**: the subscriber fell behind and missed `n`
//!   events. Non-fatal; keep receiving.
//! - **`RecvError::Closed`**: every publisher is gone. Treat as shutdown.
//!
//! Emitting with no subscribers returns `Err`; publishers ignore that with `.ok()`.

use serde::{Deserialize, Serialize};
use std::fmt;
use tokio::sync::broadcast;

pub use tokio::sync::broadcast::error::{RecvError, SendError};
pub use tokio::sync::broadcast::Receiver;

/// Default buffer size for the event bus channel.
pub const DEFAULT_EVENT_BUFFER_SIZE: usize = 100;

/// Notice shown to the user when an offline download fails.
pub const DOWNLOAD_FAILED_NOTICE: &str =
    "Failed to download track. Check your connection or CORS settings.";

// ============================================================================
// Core Event Types
// ============================================================================

/// Top-level event enum published on the bus.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", content = "payload")]
pub enum CoreEvent {
    Session(SessionEvent),
    Playback(PlaybackEvent),
    Cache(CacheEvent),
}

impl CoreEvent {
    /// Returns a human-readable description of the event.
    pub fn description(&self) -> &str {
        match self {
            CoreEvent::Session(e) => e.description(),
            CoreEvent::Playback(e) => e.description(),
            CoreEvent::Cache(e) => e.description(),
        }
    }

    /// Returns the severity level of the event.
    pub fn severity(&self) -> EventSeverity {
        match self {
            CoreEvent::Cache(CacheEvent::DownloadFailed { .. }) => EventSeverity::Error,
            CoreEvent::Playback(PlaybackEvent::Error { .. }) => EventSeverity::Error,
            CoreEvent::Cache(CacheEvent::RemoveFailed { .. }) => EventSeverity::Warning,
            CoreEvent::Session(SessionEvent::PersistenceFailed { .. }) => EventSeverity::Warning,
            CoreEvent::Session(SessionEvent::SignedIn { .. }) => EventSeverity::Info,
            CoreEvent::Session(SessionEvent::SignedOut { .. }) => EventSeverity::Info,
            CoreEvent::Cache(CacheEvent::DownloadCompleted { .. }) => EventSeverity::Info,
            CoreEvent::Playback(PlaybackEvent::TrackChanged { .. }) => EventSeverity::Info,
            _ => EventSeverity::Debug,
        }
    }
}

/// Event severity levels for filtering and logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EventSeverity {
    Debug,
    Info,
    Warning,
    Error,
}

// ============================================================================
// Session Events
// ============================================================================

/// Changes to the active user, history and artist catalog.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "event")]
pub enum SessionEvent {
    SignedIn {
        user_id: String,
        /// `"user"` or `"artist"`.
        role: String,
    },
    SignedOut { user_id: String },
    AvatarUpdated { user_id: String },
    HistoryUpdated {
        /// Track at the front of the history.
        latest_track_id: String,
        len: usize,
    },
    CatalogUpdated { track_count: usize },
    /// Writing `key` to durable storage failed; in-memory state was left unchanged.
    PersistenceFailed { key: String, message: String },
}

impl SessionEvent {
    fn description(&self) -> &str {
        match self {
            SessionEvent::SignedIn { .. } => "User signed in",
            SessionEvent::SignedOut { .. } => "User signed out",
            SessionEvent::AvatarUpdated { .. } => "Avatar updated",
            SessionEvent::HistoryUpdated { .. } => "Listening history updated",
            SessionEvent::CatalogUpdated { .. } => "Artist catalog updated",
            SessionEvent::PersistenceFailed { .. } => "Failed to persist session state",
        }
    }
}

// ============================================================================
// Playback Events
// ============================================================================

/// Player state transitions. Positions are in milliseconds.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "event")]
pub enum PlaybackEvent {
    TrackChanged {
        track_id: String,
        title: String,
        /// `"network"` or `"offline"`.
        source: String,
    },
    Started { track_id: String },
    Paused { track_id: String },
    Ended { track_id: String },
    PositionChanged {
        track_id: String,
        position_ms: u64,
        duration_ms: u64,
    },
    VolumeChanged { volume_percent: u8 },
    Error {
        track_id: Option<String>,
        message: String,
    },
}

impl PlaybackEvent {
    fn description(&self) -> &str {
        match self {
            PlaybackEvent::TrackChanged { .. } => "Active track changed",
            PlaybackEvent::Started { .. } => "Playback started",
            PlaybackEvent::Paused { .. } => "Playback paused",
            PlaybackEvent::Ended { .. } => "Track ended",
            PlaybackEvent::PositionChanged { .. } => "Playback position updated",
            PlaybackEvent::VolumeChanged { .. } => "Volume changed",
            PlaybackEvent::Error { .. } => "Playback error",
        }
    }
}

// ============================================================================
// Offline Cache Events
// ============================================================================

/// Offline cache activity.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "event")]
pub enum CacheEvent {
    DownloadStarted { track_id: String },
    DownloadCompleted { track_id: String, bytes: u64 },
    DownloadFailed {
        track_id: String,
        /// Text shown to the user.
        notice: String,
        /// Underlying failure, for logs and diagnostics.
        reason: String,
    },
    Removed { track_id: String },
    RemoveFailed { track_id: String, message: String },
}

impl CacheEvent {
    /// Download failure carrying the standard user-facing notice.
    pub fn download_failed(track_id: impl Into<String>, reason: impl Into<String>) -> Self {
        CacheEvent::DownloadFailed {
            track_id: track_id.into(),
            notice: DOWNLOAD_FAILED_NOTICE.to_string(),
            reason: reason.into(),
        }
    }

    fn description(&self) -> &str {
        match self {
            CacheEvent::DownloadStarted { .. } => "Offline download started",
            CacheEvent::DownloadCompleted { .. } => "Track available offline",
            CacheEvent::DownloadFailed { .. } => "Offline download failed",
            CacheEvent::Removed { .. } => "Offline copy removed",
            CacheEvent::RemoveFailed { .. } => "Failed to remove offline copy",
        }
    }
}

// ============================================================================
// Event Bus
// ============================================================================

/// Central event bus for publishing and subscribing to core events.
///
/// Cloning the bus yields another publisher on the same channel; each
/// `subscribe()` creates an independent receiver.
#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<CoreEvent>,
}

impl EventBus {
    /// Creates a new event bus. A subscriber that falls more than `capacity`
    /// events behind receives `RecvError::Lagged`.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publishes an event, returning the number of subscribers that received it.
    pub fn emit(&self, event: CoreEvent) -> Result<usize, SendError<CoreEvent>> {
        self.sender.send(event)
    }

    pub fn subscribe(&self) -> Receiver<CoreEvent> {
        self.sender.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_EVENT_BUFFER_SIZE)
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("subscriber_count", &self.subscriber_count())
            .finish()
    }
}

// ============================================================================
// Event Stream Wrapper
// ============================================================================

type EventFilter = Box<dyn Fn(&CoreEvent) -> bool + Send + Sync>;

/// Receiver that skips events rejected by an optional predicate.
pub struct EventStream {
    receiver: Receiver<CoreEvent>,
    filter: Option<EventFilter>,
}

impl EventStream {
    pub fn new(receiver: Receiver<CoreEvent>) -> Self {
        Self {
            receiver,
            filter: None,
        }
    }

    pub fn filter<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&CoreEvent) -> bool + Send + Sync + 'static,
    {
        self.filter = Some(Box::new(predicate));
        self
    }

    fn accepts(&self, event: &CoreEvent) -> bool {
        self.filter.as_ref().map_or(true, |filter| filter(event))
    }

    /// Waits for the next matching event.
    pub async fn recv(&mut self) -> Result<CoreEvent, RecvError> {
        loop {
            let event = self.receiver.recv().await?;
            if self.accepts(&event) {
                return Ok(event);
            }
        }
    }

    /// Returns the next buffered matching event, or `None` when nothing matching is queued.
    pub fn try_recv(&mut self) -> Option<Result<CoreEvent, RecvError>> {
        loop {
            match self.receiver.try_recv() {
                Ok(event) => {
                    if self.accepts(&event) {
                        return Some(Ok(event));
                    }
                }
                Err(broadcast::error::TryRecvError::Empty) => return None,
                Err(broadcast::error::TryRecvError::Lagged(n)) => {
                    return Some(Err(RecvError::Lagged(n)))
                }
                Err(broadcast::error::TryRecvError::Closed) => return Some(Err(RecvError::Closed)),
            }
        }
    }

    /// Drains every buffered matching event.
    pub fn drain(&mut self) -> Vec<CoreEvent> {
        let mut events = Vec::new();
        while let Some(result) = self.try_recv() {
            match result {
                Ok(event) => events.push(event),
                Err(RecvError::Lagged(_)) => continue,
                Err(RecvError::Closed) => break,
            }
        }
        events
    }
}

impl fmt::Debug for EventStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventStream")
            .field("has_filter", &self.filter.is_some())
            .finish()
    }
}

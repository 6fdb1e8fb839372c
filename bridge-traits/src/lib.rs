//! # Host Bridge Traits
//!
//! Platform abstraction traits that must be implemented by each host platform.
//!
//! ## Overview
//!
//! This crate defines the contract between the MusicPod core and the platform
//! it runs on. Each trait represents a capability that the core requires but
//! that is implemented differently in a browser and in a native shell.
//!
//! ## Traits
//!
//! ### Audio
//! - [`AudioTransport`](playback::AudioTransport) - The single audio output handle
//!   (source, play/pause, position, volume, transport signals)
//!
//! ### Storage
//! - [`SettingsStore`](storage::SettingsStore) - String key-value storage
//!   (`localStorage` in the browser)
//! - [`ObjectStore`](storage::ObjectStore) - Binary payload storage keyed by
//!   identifier (IndexedDB in the browser)
//!
//! ### Networking
//! - [`HttpClient`](http::HttpClient) - Async HTTP requests used to fetch audio
//!   payloads for offline use
//!
//! ### Utilities
//! - [`Clock`](time::Clock) - Time source for deterministic testing
//! - [`LoggerSink`](time::LoggerSink) - Forward structured logs to host logging
//!
//! ## Platform Requirements
//!
//! | Platform | Implementation Crate |
//! |----------|---------------------|
//! | Native   | `bridge-desktop`    |
//! | Browser  | `bridge-wasm`       |
//!
//! The core fails fast with `CapabilityMissing` when a required bridge is not
//! supplied to the configuration builder.
//!
//! ## Error Handling
//!
//! All bridge traits use [`BridgeError`](error::BridgeError). Platform
//! implementations convert their native errors into it and include enough
//! context (key, URL, status) to make log lines actionable.
//!
//! ## Thread Safety
//!
//! On native targets every bridge is `Send + Sync` so it can be shared across
//! tokio tasks. Browser objects are single-threaded, so on `wasm32` the bounds
//! collapse through the helpers in [`platform`].

pub mod error;
pub mod http;
pub mod platform;
pub mod playback;
pub mod storage;
pub mod time;

pub use error::BridgeError;

// Re-export commonly used types
pub use http::{HttpClient, HttpMethod, HttpRequest, HttpResponse};
pub use playback::{AudioSource, AudioTransport, SignalHandler, TransportSignal};
pub use storage::{ObjectStore, SettingsStore};
pub use time::{Clock, LogEntry, LogLevel, LoggerSink, ManualClock, SystemClock};

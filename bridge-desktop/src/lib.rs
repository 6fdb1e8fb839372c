//! # Desktop Bridge Implementations
//!
//! Default implementations of bridge traits for native hosts
//! (macOS, Windows, Linux) and for headless test harnesses.
//!
//! ## Overview
//!
//! - `HttpClient` using `reqwest`
//! - `SettingsStore` using an SQLite-backed key-value table
//! - `ObjectStore` using one file per payload under the platform cache directory
//! - In-memory `ObjectStore` and `AudioTransport` for tests and headless runs
//!
//! Native hosts that play sound supply their own [`AudioTransport`]; the
//! [`NullAudioTransport`] here only tracks commands and replays signals.
//!
//! ## Usage
//!
//! ```ignore
//! use bridge_desktop::{FileObjectStore, ReqwestHttpClient, SqliteSettingsStore};
//!
//! #[tokio::main]
//! async fn main() -> bridge_traits::error::Result<()> {
//!     let http_client = ReqwestHttpClient::new()?;
//!     let settings = SqliteSettingsStore::in_default_location().await?;
//!     let offline = FileObjectStore::in_cache_dir();
//!
//!     // Use in core configuration
//!     Ok(())
//! }
//! ```
//!
//! [`AudioTransport`]: bridge_traits::AudioTransport

mod audio;
mod http;
mod object_store;
mod settings;

pub use audio::{NullAudioTransport, TransportCommand};
pub use http::{ReqwestHttpClient, RetryPolicy};
pub use object_store::{FileObjectStore, MemoryObjectStore};
pub use settings::SqliteSettingsStore;

//! WebAssembly Bridge Implementations
//!
//! Browser implementations of the traits defined in `bridge-traits`, built on
//! `web-sys` and `wasm-bindgen`.
//!
//! # Platform Support
//!
//! This crate is designed exclusively for the `wasm32-unknown-unknown` target.
//! On native targets it compiles to an empty crate.
//!
//! # Implementations
//!
//! - `WasmSettingsStore`: namespaced `localStorage`
//! - `IdbObjectStore`: offline payloads in IndexedDB (`musicpod_db` / `offline_tracks`)
//! - `WasmHttpClient`: `fetch`
//! - `HtmlAudioTransport`: a detached `HTMLAudioElement`
//!
//! # Examples
//!
//! ```ignore
//! use bridge_wasm::{build_wasm_bridges, WasmBridgeConfig};
//!
//! let bridges = build_wasm_bridges(WasmBridgeConfig::default())?;
//! bridges.settings_store.set_string("musicpod_user", "{}").await?;
//! ```

#![cfg(target_arch = "wasm32")]
#![warn(missing_docs)]

pub mod audio;
pub mod bootstrap;
pub mod error;
pub mod http;
pub mod object_store;
pub mod storage;

// Re-export commonly used types
pub use audio::HtmlAudioTransport;
pub use bootstrap::{build_wasm_bridges, WasmBridgeConfig, WasmBridgeSet};
pub use error::{WasmError, WasmResult};
pub use http::WasmHttpClient;
pub use object_store::IdbObjectStore;
pub use storage::WasmSettingsStore;

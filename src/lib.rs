//! Workspace placeholder crate.
//!
//! This crate exists to expose the host-facing feature flags that map onto
//! `core-service`. Host applications can depend on `musicpod-workspace` and
//! pick either the native bridges (`desktop-shims`, the default) or the browser
//! bridges (`wasm`) without wiring each crate individually.

#[cfg(any(feature = "desktop-shims", feature = "wasm"))]
pub use core_service::*;

//! Platform-specific helper abstractions used to keep trait bounds aligned with
//! the threading guarantees of each target.
//!
//! Native hosts share bridges across tokio worker threads and therefore need
//! `Send + Sync`. Browser objects (`HtmlAudioElement`, `IdbDatabase`, the
//! `Storage` handle) are tied to the UI thread and can never satisfy those
//! bounds, so on `wasm32` the markers below are blanket no-ops.

/// Marker trait that applies `Send + Sync` on native targets while becoming a
/// no-op on `wasm32`.
#[cfg(not(target_arch = "wasm32"))]
pub trait PlatformSendSync: Send + Sync {}

#[cfg(not(target_arch = "wasm32"))]
impl<T> PlatformSendSync for T where T: Send + Sync {}

#[cfg(target_arch = "wasm32")]
pub trait PlatformSendSync {}

#[cfg(target_arch = "wasm32")]
impl<T> PlatformSendSync for T {}

//! View models.
//!
//! Each page of the client is a plain serializable struct built from the
//! [`CoreService`](crate::CoreService). Shells (desktop or browser) render them
//! and call back into the service for actions; nothing here touches a DOM.

pub mod boundary;
pub mod diagnostics;
pub mod home;
pub mod player_bar;
pub mod profile;
pub mod reader;
pub mod routes;

pub use boundary::{ErrorBoundary, Fallback, RecoveryAction, Rendered};
pub use diagnostics::{DiagnosticsView, FormatterCase, SystemCheck};
pub use home::{greeting_for_hour, HomeView, PlaylistCard, TrackCard};
pub use player_bar::{DownloadAction, PlayerBarView};
pub use profile::{ArtistDashboard, ListenerProfile, ProfileView, TrackRow};
pub use reader::{comic_shelf, ComicCard, ComicReader, ReaderKey};
pub use routes::{normalize_path, resolve, LoginView, Route, Screen};

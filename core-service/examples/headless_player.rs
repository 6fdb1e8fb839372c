//! Drive the core from a terminal.
//!
//! Signs in as a listener, plays the first track of a playlist, fakes some
//! transport progress and prints the resulting view models as JSON.
//!
//! ```text
//! cargo run -p core-service --example headless_player
//! ```

use std::sync::Arc;

use anyhow::Context;
use bridge_desktop::{MemoryObjectStore, NullAudioTransport, SqliteSettingsStore};
use bridge_traits::time::LogLevel;
use bridge_traits::TransportSignal;
use core_library::UserRole;
use core_runtime::config::CoreConfig;
use core_runtime::logging::{init_logging, LogFormat, LoggingConfig};
use core_service::views::{DiagnosticsView, HomeView, PlayerBarView, ProfileView};
use core_service::CoreService;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging(
        LoggingConfig::default()
            .with_format(LogFormat::Compact)
            .with_level(LogLevel::Debug),
    )
    .context("logging")?;

    let transport = Arc::new(NullAudioTransport::new());
    let config = CoreConfig::builder()
        .settings_store(Arc::new(SqliteSettingsStore::in_memory().await?))
        .object_store(Arc::new(MemoryObjectStore::new()))
        .audio_transport(transport.clone())
        .build()?;
    let core = CoreService::new(config).await?;

    core.session().login(UserRole::Listener).await?;
    core.play_playlist("p1").await?;
    transport.emit(TransportSignal::DurationKnown(215.0));
    transport.emit(TransportSignal::PositionChanged(42.5));

    println!("{}", serde_json::to_string_pretty(&HomeView::build(&core))?);
    if let Some(bar) = PlayerBarView::build(core.player()) {
        println!("{}", serde_json::to_string_pretty(&bar)?);
    }
    if let Some(profile) = ProfileView::build(core.session(), core.player()).await {
        println!("{}", serde_json::to_string_pretty(&profile)?);
    }

    let diagnostics = DiagnosticsView::build(&core).await;
    println!("{}", serde_json::to_string_pretty(&diagnostics.player_state)?);

    Ok(())
}

//! Silent audio transport for headless hosts.

use async_trait::async_trait;
use bridge_traits::{
    error::Result,
    playback::{AudioSource, AudioTransport, SignalHandler, TransportSignal},
};
use parking_lot::Mutex;
use tracing::trace;

/// Instruction received by [`NullAudioTransport`].
#[derive(Debug, Clone, PartialEq)]
pub enum TransportCommand {
    SetSource(AudioSource),
    Play,
    Pause,
    SetPosition(f64),
    SetVolume(f32),
}

/// Transport that produces no sound. It records every command and lets the
/// host push [`TransportSignal`]s as if a real engine had produced them.
#[derive(Default)]
pub struct NullAudioTransport {
    commands: Mutex<Vec<TransportCommand>>,
    handler: Mutex<Option<SignalHandler>>,
}

impl NullAudioTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn commands(&self) -> Vec<TransportCommand> {
        self.commands.lock().clone()
    }

    pub fn last_source(&self) -> Option<AudioSource> {
        self.commands.lock().iter().rev().find_map(|command| match command {
            TransportCommand::SetSource(source) => Some(source.clone()),
            _ => None,
        })
    }

    /// Deliver a signal to the installed handler. Returns `false` when none is installed.
    pub fn emit(&self, signal: TransportSignal) -> bool {
        // Clone out of the lock so the handler may call back into the transport.
        let handler = self.handler.lock().clone();
        match handler {
            Some(handler) => {
                handler(signal);
                true
            }
            None => false,
        }
    }

    fn record(&self, command: TransportCommand) {
        trace!(?command, "Transport command");
        self.commands.lock().push(command);
    }
}

#[async_trait]
impl AudioTransport for NullAudioTransport {
    fn set_source(&self, source: AudioSource) -> Result<()> {
        self.record(TransportCommand::SetSource(source));
        Ok(())
    }

    async fn play(&self) -> Result<()> {
        self.record(TransportCommand::Play);
        Ok(())
    }

    fn pause(&self) -> Result<()> {
        self.record(TransportCommand::Pause);
        Ok(())
    }

    fn set_position(&self, seconds: f64) -> Result<()> {
        self.record(TransportCommand::SetPosition(seconds));
        Ok(())
    }

    fn set_volume(&self, volume: f32) -> Result<()> {
        self.record(TransportCommand::SetVolume(volume));
        Ok(())
    }

    fn set_signal_handler(&self, handler: SignalHandler) {
        *self.handler.lock() = Some(handler);
    }
}

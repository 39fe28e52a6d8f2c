//! Audio backend trait
//!
//! The decoding and output pipeline is owned by the backend. The player
//! only tells it what to do and listens for status reports.

/// Commands the player sends to the audio backend
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AudioCommand {
    /// Start playing a track from the beginning (1-based index)
    Play { track: u16 },
    /// Pause the current track
    Pause,
    /// Resume a paused track
    Resume,
    /// Stop playback
    Stop,
    /// Set output volume (0-100)
    SetVolume(u8),
}

/// Unsolicited status reported by the audio backend
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PipelineStatus {
    /// The current track played to its end
    TrackFinished { track: u16 },
    /// Storage card became available
    CardInserted,
    /// Storage card was pulled
    CardRemoved,
    /// Backend reported a fault (backend-specific code)
    Error(u16),
}

/// Trait for audio playback backends
///
/// Implementations translate [`AudioCommand`]s into whatever the hardware
/// understands (serial MP3 module, codec + decoder, ...).
#[allow(async_fn_in_trait)]
pub trait AudioPipeline {
    /// Backend error type
    type Error;

    /// Apply a single command
    async fn apply(&mut self, command: AudioCommand) -> Result<(), Self::Error>;

    /// Wait for the next status report from the backend
    async fn next_status(&mut self) -> Result<PipelineStatus, Self::Error>;
}

//! Playback state machine

/// Playback states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PlaybackState {
    /// Nothing played since boot
    #[default]
    Init,
    /// A track is playing
    Running,
    /// Playback paused mid-track
    Paused,
    /// Stopped by the card going away or a module error
    Stopped,
    /// Ran out of tracks
    Finished,
}

/// Events that move the playback state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PlayerEvent {
    /// A track was started from the beginning
    Start,
    /// Pause requested
    Pause,
    /// Resume requested
    Resume,
    /// Playback halted
    Stop,
    /// Last track ended with nothing to follow
    PlaylistEnded,
}

impl PlaybackState {
    /// Returns true while a track is loaded on the module
    pub fn is_active(&self) -> bool {
        matches!(self, PlaybackState::Running | PlaybackState::Paused)
    }

    /// Process an event and return the next state
    pub fn transition(self, event: PlayerEvent) -> Self {
        use PlaybackState::*;
        use PlayerEvent::*;

        match (self, event) {
            // Starting a track always lands in Running
            (_, Start) => Running,

            (Running, Pause) => Paused,
            (Paused, Resume) => Running,

            (Running | Paused, Stop) => Stopped,
            (Running, PlaylistEnded) => Finished,

            _ => self,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_to_running() {
        let state = PlaybackState::Init;
        assert_eq!(state.transition(PlayerEvent::Start), PlaybackState::Running);
    }

    #[test]
    fn test_pause_resume() {
        let running = PlaybackState::Running;

        let paused = running.transition(PlayerEvent::Pause);
        assert_eq!(paused, PlaybackState::Paused);

        let resumed = paused.transition(PlayerEvent::Resume);
        assert_eq!(resumed, PlaybackState::Running);
    }

    #[test]
    fn test_stop_from_active_states() {
        for state in [PlaybackState::Running, PlaybackState::Paused] {
            assert_eq!(state.transition(PlayerEvent::Stop), PlaybackState::Stopped);
        }
        // Nothing to stop
        assert_eq!(
            PlaybackState::Init.transition(PlayerEvent::Stop),
            PlaybackState::Init
        );
    }

    #[test]
    fn test_restart_after_stop_or_finish() {
        for state in [PlaybackState::Stopped, PlaybackState::Finished] {
            assert_eq!(state.transition(PlayerEvent::Start), PlaybackState::Running);
        }
    }

    #[test]
    fn test_playlist_end() {
        assert_eq!(
            PlaybackState::Running.transition(PlayerEvent::PlaylistEnded),
            PlaybackState::Finished
        );
        assert_eq!(
            PlaybackState::Paused.transition(PlayerEvent::PlaylistEnded),
            PlaybackState::Paused
        );
    }

    #[test]
    fn test_ignored_events() {
        assert_eq!(
            PlaybackState::Init.transition(PlayerEvent::Pause),
            PlaybackState::Init
        );
        assert_eq!(
            PlaybackState::Running.transition(PlayerEvent::Resume),
            PlaybackState::Running
        );
        assert_eq!(
            PlaybackState::Finished.transition(PlayerEvent::Resume),
            PlaybackState::Finished
        );
    }

    #[test]
    fn test_is_active() {
        assert!(PlaybackState::Running.is_active());
        assert!(PlaybackState::Paused.is_active());
        assert!(!PlaybackState::Init.is_active());
        assert!(!PlaybackState::Stopped.is_active());
    }
}

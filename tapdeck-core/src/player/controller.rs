//! Player controller
//!
//! Turns key envelopes and module status into audio commands. Pure and
//! synchronous; the audio task applies the commands and updates the label.

use heapless::Vec;
use tapdeck_protocol::{KeyAction, KeyEvent, KeyId};

use crate::config::{AudioConfig, MAX_VOLUME};
use crate::traits::{AudioCommand, PipelineStatus};

use super::machine::{PlaybackState, PlayerEvent};
use super::playlist::{basename, Playlist};

/// Commands per reaction (stop + play + volume is the worst case)
pub const MAX_COMMANDS: usize = 4;

/// Output volume in percent, always within 0..=100
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Volume(u8);

impl Volume {
    pub fn new(percent: u8) -> Self {
        Self(percent.min(MAX_VOLUME))
    }

    pub fn percent(self) -> u8 {
        self.0
    }

    /// Step up or down by `step * direction`, clamped
    pub fn adjust(self, step: u8, direction: i8) -> Self {
        let next = self.0 as i16 + step as i16 * direction as i16;
        Self(next.clamp(0, MAX_VOLUME as i16) as u8)
    }
}

/// What the audio task should do in response to one input
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Reaction {
    /// Commands to apply, in order
    pub commands: Vec<AudioCommand, MAX_COMMANDS>,
    /// A new track started; the file label should show [`PlayerController::now_playing`]
    pub label_changed: bool,
}

impl Reaction {
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty() && !self.label_changed
    }

    fn push(&mut self, command: AudioCommand) {
        // Capacity covers every path through the controller
        let _ = self.commands.push(command);
    }
}

pub struct PlayerController {
    state: PlaybackState,
    playlist: Playlist,
    volume: Volume,
    volume_step: u8,
}

impl PlayerController {
    pub fn new(playlist: Playlist, audio: &AudioConfig) -> Self {
        Self {
            state: PlaybackState::Init,
            playlist,
            volume: Volume::new(audio.initial_volume),
            volume_step: audio.volume_step,
        }
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn volume(&self) -> Volume {
        self.volume
    }

    pub fn playlist(&self) -> &Playlist {
        &self.playlist
    }

    /// File name of the loaded track, without directories
    pub fn now_playing(&self) -> Option<&str> {
        if self.state == PlaybackState::Init {
            return None;
        }
        self.playlist.current().map(basename)
    }

    /// Commands to bring the module to the configured volume at boot
    pub fn start_up(&self) -> Reaction {
        let mut reaction = Reaction::default();
        reaction.push(AudioCommand::SetVolume(self.volume.percent()));
        reaction
    }

    /// React to a key envelope
    ///
    /// Only click-release envelopes are acted upon.
    pub fn handle_key(&mut self, event: KeyEvent) -> Reaction {
        let mut reaction = Reaction::default();
        if event.action != KeyAction::ClickRelease {
            return reaction;
        }

        match event.key {
            KeyId::Play => match self.state {
                PlaybackState::Running => {
                    reaction.push(AudioCommand::Pause);
                    self.state = self.state.transition(PlayerEvent::Pause);
                }
                PlaybackState::Paused => {
                    reaction.push(AudioCommand::Resume);
                    self.state = self.state.transition(PlayerEvent::Resume);
                }
                PlaybackState::Init | PlaybackState::Stopped | PlaybackState::Finished => {
                    self.play_current(&mut reaction);
                }
            },
            KeyId::Set => {
                if self.playlist.is_empty() {
                    return reaction;
                }
                if self.state.is_active() {
                    reaction.push(AudioCommand::Stop);
                    self.state = self.state.transition(PlayerEvent::Stop);
                }
                self.playlist.advance();
                self.play_current(&mut reaction);
            }
            key if key.is_volume() => {
                self.volume = self
                    .volume
                    .adjust(self.volume_step, event.key.volume_delta());
                reaction.push(AudioCommand::SetVolume(self.volume.percent()));
            }
            _ => {}
        }

        reaction
    }

    /// React to a status report from the module
    pub fn handle_status(&mut self, status: PipelineStatus) -> Reaction {
        let mut reaction = Reaction::default();

        match status {
            PipelineStatus::TrackFinished { track } => {
                // The module reports the end of a track twice
                if self.state != PlaybackState::Running
                    || self.playlist.track_number() != Some(track)
                {
                    return reaction;
                }
                if self.playlist.is_empty() {
                    self.state = self.state.transition(PlayerEvent::PlaylistEnded);
                } else {
                    self.playlist.advance();
                    self.play_current(&mut reaction);
                }
            }
            PipelineStatus::CardRemoved => {
                if self.state.is_active() {
                    reaction.push(AudioCommand::Stop);
                }
                self.state = self.state.transition(PlayerEvent::Stop);
            }
            PipelineStatus::Error(_) => {
                self.state = self.state.transition(PlayerEvent::Stop);
            }
            PipelineStatus::CardInserted => {}
        }

        reaction
    }

    fn play_current(&mut self, reaction: &mut Reaction) {
        let Some(track) = self.playlist.track_number() else {
            return;
        };
        reaction.push(AudioCommand::Play { track });
        reaction.label_changed = true;
        self.state = self.state.transition(PlayerEvent::Start);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PlaylistConfig;
    use heapless::String;
    use proptest::prelude::*;

    fn controller(names: &[&str]) -> PlayerController {
        let mut config = PlaylistConfig::default();
        for name in names {
            config.tracks.push(String::try_from(*name).unwrap()).unwrap();
        }
        PlayerController::new(Playlist::new(&config), &AudioConfig::default())
    }

    fn click(key: KeyId) -> KeyEvent {
        KeyEvent::click_release(key)
    }

    fn commands(reaction: &Reaction) -> &[AudioCommand] {
        &reaction.commands
    }

    #[test]
    fn test_play_starts_first_track() {
        let mut player = controller(&["one.mp3", "two.mp3"]);
        assert_eq!(player.now_playing(), None);

        let reaction = player.handle_key(click(KeyId::Play));
        assert_eq!(commands(&reaction), &[AudioCommand::Play { track: 1 }]);
        assert!(reaction.label_changed);
        assert_eq!(player.state(), PlaybackState::Running);
        assert_eq!(player.now_playing(), Some("one.mp3"));
    }

    #[test]
    fn test_play_toggles_pause() {
        let mut player = controller(&["one.mp3"]);
        player.handle_key(click(KeyId::Play));

        let reaction = player.handle_key(click(KeyId::Play));
        assert_eq!(commands(&reaction), &[AudioCommand::Pause]);
        assert!(!reaction.label_changed);
        assert_eq!(player.state(), PlaybackState::Paused);

        let reaction = player.handle_key(click(KeyId::Play));
        assert_eq!(commands(&reaction), &[AudioCommand::Resume]);
        assert_eq!(player.state(), PlaybackState::Running);
    }

    #[test]
    fn test_skip_stops_and_plays_next() {
        let mut player = controller(&["/music/one.mp3", "/music/two.mp3"]);
        player.handle_key(click(KeyId::Play));

        let reaction = player.handle_key(click(KeyId::Set));
        assert_eq!(
            commands(&reaction),
            &[AudioCommand::Stop, AudioCommand::Play { track: 2 }]
        );
        assert!(reaction.label_changed);
        assert_eq!(player.now_playing(), Some("two.mp3"));

        // Wraps back to the first track
        let reaction = player.handle_key(click(KeyId::Set));
        assert_eq!(
            commands(&reaction),
            &[AudioCommand::Stop, AudioCommand::Play { track: 1 }]
        );
    }

    #[test]
    fn test_skip_before_play() {
        let mut player = controller(&["one.mp3", "two.mp3"]);
        let reaction = player.handle_key(click(KeyId::Set));
        assert_eq!(commands(&reaction), &[AudioCommand::Play { track: 2 }]);
        assert_eq!(player.state(), PlaybackState::Running);
    }

    #[test]
    fn test_volume_steps_and_clamps() {
        let mut player = controller(&["one.mp3"]);
        assert_eq!(player.volume().percent(), 50);

        let reaction = player.handle_key(click(KeyId::VolDown));
        assert_eq!(commands(&reaction), &[AudioCommand::SetVolume(40)]);

        for _ in 0..10 {
            player.handle_key(click(KeyId::VolUp));
        }
        assert_eq!(player.volume().percent(), 100);

        for _ in 0..20 {
            player.handle_key(click(KeyId::VolDown));
        }
        assert_eq!(player.volume().percent(), 0);

        // Volume never changes playback state
        assert_eq!(player.state(), PlaybackState::Init);
    }

    #[test]
    fn test_two_vol_down_clicks() {
        let mut player = controller(&["one.mp3"]);
        let first = player.handle_key(click(KeyId::VolDown));
        let second = player.handle_key(click(KeyId::VolDown));
        assert_eq!(commands(&first), &[AudioCommand::SetVolume(40)]);
        assert_eq!(commands(&second), &[AudioCommand::SetVolume(30)]);
    }

    #[test]
    fn test_non_release_actions_ignored() {
        let mut player = controller(&["one.mp3"]);
        for action in [KeyAction::Click, KeyAction::Press, KeyAction::PressRelease] {
            let event = KeyEvent {
                action,
                ..click(KeyId::Play)
            };
            assert!(player.handle_key(event).is_empty());
        }
        assert!(player.handle_key(click(KeyId::Mute)).is_empty());
        assert_eq!(player.state(), PlaybackState::Init);
    }

    #[test]
    fn test_empty_playlist_is_noop() {
        let mut player = controller(&[]);
        assert!(player.handle_key(click(KeyId::Play)).is_empty());
        assert!(player.handle_key(click(KeyId::Set)).is_empty());
        assert_eq!(player.state(), PlaybackState::Init);
        assert_eq!(player.now_playing(), None);
    }

    #[test]
    fn test_track_finished_advances() {
        let mut player = controller(&["one.mp3", "two.mp3"]);
        player.handle_key(click(KeyId::Play));

        let reaction = player.handle_status(PipelineStatus::TrackFinished { track: 1 });
        assert_eq!(commands(&reaction), &[AudioCommand::Play { track: 2 }]);
        assert!(reaction.label_changed);
        assert_eq!(player.now_playing(), Some("two.mp3"));
    }

    #[test]
    fn test_repeated_track_finished_plays_next_once() {
        let mut player = controller(&["one.mp3", "two.mp3", "three.mp3"]);
        player.handle_key(click(KeyId::Play));

        let first = player.handle_status(PipelineStatus::TrackFinished { track: 1 });
        assert_eq!(commands(&first), &[AudioCommand::Play { track: 2 }]);

        let second = player.handle_status(PipelineStatus::TrackFinished { track: 1 });
        assert!(second.is_empty());
        assert_eq!(player.now_playing(), Some("two.mp3"));
        assert_eq!(player.state(), PlaybackState::Running);
    }

    #[test]
    fn test_track_finished_when_idle_ignored() {
        let mut player = controller(&["one.mp3"]);
        let reaction = player.handle_status(PipelineStatus::TrackFinished { track: 1 });
        assert!(reaction.is_empty());
        assert_eq!(player.state(), PlaybackState::Init);
    }

    #[test]
    fn test_card_removed_stops() {
        let mut player = controller(&["one.mp3"]);
        player.handle_key(click(KeyId::Play));

        let reaction = player.handle_status(PipelineStatus::CardRemoved);
        assert_eq!(commands(&reaction), &[AudioCommand::Stop]);
        assert_eq!(player.state(), PlaybackState::Stopped);

        // Play restarts the current track
        let reaction = player.handle_key(click(KeyId::Play));
        assert_eq!(commands(&reaction), &[AudioCommand::Play { track: 1 }]);
        assert_eq!(player.state(), PlaybackState::Running);
    }

    #[test]
    fn test_module_error_stops() {
        let mut player = controller(&["one.mp3"]);
        player.handle_key(click(KeyId::Play));
        let reaction = player.handle_status(PipelineStatus::Error(3));
        assert!(reaction.commands.is_empty());
        assert_eq!(player.state(), PlaybackState::Stopped);
    }

    #[test]
    fn test_start_up_sets_volume() {
        let player = controller(&["one.mp3"]);
        assert_eq!(
            commands(&player.start_up()),
            &[AudioCommand::SetVolume(50)]
        );
    }

    proptest! {
        #[test]
        fn volume_stays_in_range(start in 0u8..=255, step in 1u8..=100, ups in proptest::collection::vec(any::<bool>(), 0..50)) {
            let mut volume = Volume::new(start);
            for up in ups {
                volume = volume.adjust(step, if up { 1 } else { -1 });
                prop_assert!(volume.percent() <= MAX_VOLUME);
            }
        }

        #[test]
        fn keys_never_overflow_reaction(keys in proptest::collection::vec(0u8..8, 0..64)) {
            let mut player = controller(&["one.mp3", "two.mp3", "three.mp3"]);
            for byte in keys {
                if let Some(key) = KeyId::from_byte(byte) {
                    let reaction = player.handle_key(click(key));
                    prop_assert!(reaction.commands.len() <= 2);
                }
            }
        }
    }
}

//! Playback control
//!
//! What the audio task does with key envelopes: a small state machine over
//! a wrapping playlist, emitting commands for the MP3 module.

pub mod controller;
pub mod machine;
pub mod playlist;

pub use controller::{PlayerController, Reaction, Volume};
pub use machine::{PlaybackState, PlayerEvent};
pub use playlist::{basename, Playlist};

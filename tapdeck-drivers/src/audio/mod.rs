//! Audio backends
//!
//! - `dfplayer`: serial MP3 module that decodes from its own SD card

pub mod dfplayer;

pub use dfplayer::{Mp3Error, Mp3Module};

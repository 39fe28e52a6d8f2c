//! Track list
//!
//! Tracks are addressed on the MP3 module by their position on the card,
//! so the list order is the card order.

use heapless::{String, Vec};

use crate::config::{PlaylistConfig, MAX_NAME_LEN, MAX_TRACKS};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Playlist {
    tracks: Vec<String<MAX_NAME_LEN>, MAX_TRACKS>,
    index: usize,
}

impl Playlist {
    pub fn new(config: &PlaylistConfig) -> Self {
        Self {
            tracks: config.tracks.clone(),
            index: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    /// Zero-based position of the current track
    pub fn index(&self) -> usize {
        self.index
    }

    /// File name of the current track
    pub fn current(&self) -> Option<&str> {
        self.tracks.get(self.index).map(|t| t.as_str())
    }

    /// Module track number of the current track (1-based)
    pub fn track_number(&self) -> Option<u16> {
        if self.is_empty() {
            None
        } else {
            Some(self.index as u16 + 1)
        }
    }

    /// Move to the next track, wrapping to the first
    pub fn advance(&mut self) {
        if !self.is_empty() {
            self.index = (self.index + 1) % self.tracks.len();
        }
    }
}

/// Strip any directories from a track path
pub fn basename(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

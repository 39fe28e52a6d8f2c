//! Configuration type definitions
//!
//! These types mirror the sections of `board.toml`. Every field has a
//! default so a partial file is still a valid board description.

use heapless::{String, Vec};

/// Maximum track file name length
pub const MAX_NAME_LEN: usize = 48;

/// Maximum tracks in the playlist
pub const MAX_TRACKS: usize = 32;

/// Volume ceiling (percent)
pub const MAX_VOLUME: u8 = 100;

/// Panel orientation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Rotation {
    /// 0° (connector on the left)
    #[default]
    Landscape,
    /// 180°
    LandscapeFlipped,
    /// 90°
    Portrait,
    /// 270°
    PortraitFlipped,
}

impl Rotation {
    /// Parse the `rotation` value used in `board.toml`
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "landscape" => Some(Rotation::Landscape),
            "landscape-flipped" => Some(Rotation::LandscapeFlipped),
            "portrait" => Some(Rotation::Portrait),
            "portrait-flipped" => Some(Rotation::PortraitFlipped),
            _ => None,
        }
    }

    /// Returns true when width and height are exchanged
    pub fn is_portrait(&self) -> bool {
        matches!(self, Rotation::Portrait | Rotation::PortraitFlipped)
    }
}

/// What the key channel does when the audio task falls behind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum QueuePolicy {
    /// Refuse the new event
    #[default]
    DropNewest,
    /// Evict the oldest queued event to make room
    DropOldest,
}

impl QueuePolicy {
    /// Parse the `queue_policy` value used in `board.toml`
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "drop-newest" => Some(QueuePolicy::DropNewest),
            "drop-oldest" => Some(QueuePolicy::DropOldest),
            _ => None,
        }
    }
}

/// Display configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DisplayConfig {
    /// Horizontal resolution after rotation
    pub width: u16,
    /// Vertical resolution after rotation
    pub height: u16,
    /// Rows per draw band
    pub draw_buffer_lines: u16,
    /// Render the next band while the previous one is flushed
    pub double_buffer: bool,
    /// Panel orientation
    pub rotation: Rotation,
    /// SPI clock for the panel
    pub spi_hz: u32,
    /// Bounded wait for the display mutex when updating widgets
    pub lock_timeout_ms: u32,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            width: 480,
            height: 320,
            draw_buffer_lines: 32,
            double_buffer: true,
            rotation: Rotation::Landscape,
            spi_hz: 40_000_000,
            lock_timeout_ms: 500,
        }
    }
}

impl DisplayConfig {
    /// Pixels in one draw band
    pub fn band_pixels(&self) -> usize {
        self.width as usize * self.draw_buffer_lines as usize
    }
}

/// Resistive touch calibration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TouchConfig {
    /// Raw reading at the left edge
    pub x_min: u16,
    /// Raw reading at the right edge
    pub x_max: u16,
    /// Raw reading at the top edge
    pub y_min: u16,
    /// Raw reading at the bottom edge
    pub y_max: u16,
    /// Exchange raw X and Y before mapping
    pub swap_xy: bool,
    /// Mirror the X axis
    pub invert_x: bool,
    /// Mirror the Y axis
    pub invert_y: bool,
    /// Minimum Z1 pressure reading counted as a touch
    pub pressure_threshold: u16,
}

impl Default for TouchConfig {
    fn default() -> Self {
        Self {
            x_min: 200,
            x_max: 3900,
            y_min: 200,
            y_max: 3900,
            swap_xy: true,
            invert_x: false,
            invert_y: true,
            pressure_threshold: 100,
        }
    }
}

/// Audio control configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AudioConfig {
    /// Volume at boot (0-100)
    pub initial_volume: u8,
    /// Change per Vol+/Vol- press
    pub volume_step: u8,
    /// Key channel backpressure
    pub queue_policy: QueuePolicy,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            initial_volume: 50,
            volume_step: 10,
            queue_policy: QueuePolicy::DropNewest,
        }
    }
}

/// Playlist configuration
///
/// Track order must match the order the files were copied to the card,
/// since the MP3 module addresses tracks by index.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlaylistConfig {
    /// File names in playback order
    pub tracks: Vec<String<MAX_NAME_LEN>, MAX_TRACKS>,
}

/// Complete board configuration
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BoardConfig {
    /// `[display]`
    pub display: DisplayConfig,
    /// `[touch]`
    pub touch: TouchConfig,
    /// `[audio]`
    pub audio: AudioConfig,
    /// `[playlist]`
    pub playlist: PlaylistConfig,
}

impl BoardConfig {
    /// Create a configuration with all defaults
    pub fn new() -> Self {
        Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_fit_the_panel() {
        let config = BoardConfig::default();
        assert_eq!(config.display.lock_timeout_ms, 500);
        assert!(config.display.draw_buffer_lines <= config.display.height);
        assert_eq!(config.display.band_pixels(), 480 * 32);
        assert!(config.playlist.tracks.is_empty());
    }

    #[test]
    fn test_rotation_names() {
        assert_eq!(Rotation::from_name("portrait"), Some(Rotation::Portrait));
        assert_eq!(Rotation::from_name("sideways"), None);
        assert!(Rotation::PortraitFlipped.is_portrait());
        assert!(!Rotation::Landscape.is_portrait());
    }

    #[test]
    fn test_queue_policy_names() {
        assert_eq!(
            QueuePolicy::from_name("drop-oldest"),
            Some(QueuePolicy::DropOldest)
        );
        assert_eq!(QueuePolicy::from_name("block"), None);
    }
}

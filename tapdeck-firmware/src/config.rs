//! Board configuration loading
//!
//! `board.toml` is compiled into the firmware. build.rs has already checked
//! it, so a parse failure here means the file and the parser disagree.

use defmt::*;
use tapdeck_core::config::{parse_config, BoardConfig};

/// Embedded board configuration
/// Edit board.toml and rebuild to customize
const EMBEDDED_CONFIG: &str = include_str!("../board.toml");

/// Parse the embedded configuration, falling back to defaults
pub fn load_config() -> BoardConfig {
    match parse_config(EMBEDDED_CONFIG) {
        Ok(config) => {
            info!(
                "Board config: {}x{} panel, {} tracks",
                config.display.width,
                config.display.height,
                config.playlist.tracks.len()
            );
            config
        }
        Err(e) => {
            error!("Failed to parse board.toml: {:?}", e);
            error!("Using default configuration");
            BoardConfig::default()
        }
    }
}

//! Panel backend trait
//!
//! Defines the interface the renderer flushes bands through.

use embedded_graphics::pixelcolor::Rgb666;

/// Display backend errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DisplayError {
    /// Communication error with the panel
    Communication,
    /// Band does not fit on the panel
    InvalidWindow,
    /// Draw buffer smaller than one band
    BufferTooSmall,
}

/// Panel backend trait
///
/// A backend receives full-width horizontal bands of pixels, top to bottom.
/// Implementations handle the wire format and windowing of the panel.
#[allow(async_fn_in_trait)]
pub trait PanelBackend {
    /// Panel dimensions after rotation (width, height)
    fn dimensions(&self) -> (u16, u16);

    /// Write `pixels` to rows `y..y + lines`, each row full panel width
    ///
    /// `pixels.len()` equals `width * lines`.
    async fn write_band(&mut self, y: u16, lines: u16, pixels: &[Rgb666]) -> Result<(), DisplayError>;
}

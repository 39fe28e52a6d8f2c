//! Touch controller trait

/// One raw reading from a touch controller
///
/// Coordinates are in controller units (12-bit for resistive panels)
/// and still need calibration before they mean anything on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RawTouch {
    /// Raw X reading
    pub x: u16,
    /// Raw Y reading
    pub y: u16,
    /// Pressure reading (higher = firmer)
    pub z: u16,
}

/// Trait for touch controllers
#[allow(async_fn_in_trait)]
pub trait TouchInput {
    /// Controller error type
    type Error;

    /// Sample the panel
    ///
    /// Returns `Ok(Some(touch))` while the panel is pressed and
    /// `Ok(None)` when it is not.
    async fn read(&mut self) -> Result<Option<RawTouch>, Self::Error>;
}

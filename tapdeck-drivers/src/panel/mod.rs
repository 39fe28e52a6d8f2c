//! Display panels
//!
//! - `ili9488`: 480x320 TFT over SPI, 18-bit colour

pub mod ili9488;

pub use ili9488::{Ili9488, PanelError};

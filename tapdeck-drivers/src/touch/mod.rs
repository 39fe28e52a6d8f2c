//! Touch controllers
//!
//! - `xpt2046`: 12-bit resistive touch over SPI

pub mod xpt2046;

pub use xpt2046::{TouchError, Xpt2046};

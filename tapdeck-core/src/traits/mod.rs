//! Hardware abstraction traits
//!
//! These traits define the interface between the application logic
//! and hardware-specific implementations.

pub mod audio;
pub mod touch;

pub use audio::{AudioCommand, AudioPipeline, PipelineStatus};
pub use touch::{RawTouch, TouchInput};

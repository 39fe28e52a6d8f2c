//! Control surface
//!
//! - `widget`: fixed-capacity widget tree with alignment and hit testing
//! - `surface`: the player screen (file label and four buttons)
//! - `touch`: raw touch calibration and click detection
//! - `context`: the display lock and the operations that mutate the screen

pub mod context;
pub mod surface;
pub mod touch;
pub mod widget;

pub use context::UiContext;
pub use surface::{Button, UiSurface, NO_FILE_TEXT};
pub use touch::{ClickDetector, TouchCalibration};
pub use widget::{Align, Font, Rect, WidgetId, WidgetKind, WidgetTree};

/// UI errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum UiError {
    /// No room for another widget
    TreeFull,
    /// Handle does not name a widget
    InvalidWidget,
    /// Text operation on something that is not a label
    NotALabel,
    /// Display lock not acquired within the timeout
    DisplayBusy,
}

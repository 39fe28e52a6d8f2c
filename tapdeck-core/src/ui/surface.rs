//! Player screen
//!
//! One title, one file-name label and four buttons. Built once at start-up
//! and never torn down.

use tapdeck_protocol::KeyId;

use super::widget::{Align, Font, WidgetId, WidgetTree};
use super::UiError;

/// File label text before anything has played
pub const NO_FILE_TEXT: &str = "No file playing";

/// Title above the file label
pub const TITLE_TEXT: &str = "Current File:";

/// Button size in pixels
pub const BUTTON_WIDTH: u32 = 100;
pub const BUTTON_HEIGHT: u32 = 50;

/// On-screen buttons
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Button {
    Play,
    Skip,
    VolUp,
    VolDown,
}

impl Button {
    /// All buttons in creation order
    pub const ALL: [Button; 4] = [Button::Play, Button::Skip, Button::VolUp, Button::VolDown];

    /// Key code forwarded when the button is clicked
    pub const fn key(self) -> KeyId {
        match self {
            Button::Play => KeyId::Play,
            Button::Skip => KeyId::Set,
            Button::VolUp => KeyId::VolUp,
            Button::VolDown => KeyId::VolDown,
        }
    }

    /// Text drawn on the button
    pub const fn caption(self) -> &'static str {
        match self {
            Button::Play => "Play",
            Button::Skip => "Skip",
            Button::VolUp => "Vol+",
            Button::VolDown => "Vol-",
        }
    }

    /// Diagnostic logged on click
    pub const fn pressed_message(self) -> &'static str {
        match self {
            Button::Play => "Play button pressed",
            Button::Skip => "Skip button pressed",
            Button::VolUp => "Volume Up button pressed",
            Button::VolDown => "Volume Down button pressed",
        }
    }

    const fn placement(self) -> (Align, i32, i32) {
        match self {
            Button::Play => (Align::BottomLeft, 25, -25),
            Button::Skip => (Align::BottomLeft, 135, -25),
            Button::VolUp => (Align::BottomRight, -135, -25),
            Button::VolDown => (Align::BottomRight, -25, -25),
        }
    }
}

/// Handles to the player screen widgets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UiSurface {
    title: WidgetId,
    file_label: WidgetId,
    buttons: [WidgetId; 4],
}

impl UiSurface {
    /// Create the player screen on `tree`
    ///
    /// The caller must hold the display lock.
    pub fn build(tree: &mut WidgetTree) -> Result<Self, UiError> {
        let file_label = tree.create_label(None)?;
        tree.set_font(file_label, Font::Large)?;
        tree.align(file_label, Align::TopMid, 0, 25)?;

        let title = tree.create_label(None)?;
        tree.set_text(title, TITLE_TEXT)?;
        tree.align(title, Align::TopMid, 0, 5)?;

        let mut buttons = [file_label; 4];
        for (slot, button) in buttons.iter_mut().zip(Button::ALL) {
            let (align, x, y) = button.placement();
            let id = tree.create_button(None, BUTTON_WIDTH, BUTTON_HEIGHT)?;
            tree.align(id, align, x, y)?;

            let caption = tree.create_label(Some(id))?;
            tree.set_text(caption, button.caption())?;
            tree.center(caption)?;

            *slot = id;
        }

        tree.set_text(file_label, NO_FILE_TEXT)?;

        Ok(Self {
            title,
            file_label,
            buttons,
        })
    }

    /// The file-name label
    pub fn file_label(&self) -> WidgetId {
        self.file_label
    }

    /// The title label
    pub fn title(&self) -> WidgetId {
        self.title
    }

    /// Widget for a button
    pub fn button(&self, button: Button) -> WidgetId {
        self.buttons[button as usize]
    }

    /// Which button a widget is, if any
    pub fn button_at(&self, id: WidgetId) -> Option<Button> {
        Button::ALL.into_iter().find(|b| self.button(*b) == id)
    }
}

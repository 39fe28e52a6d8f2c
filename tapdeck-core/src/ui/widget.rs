//! Widget tree
//!
//! A fixed-capacity arena of labels and buttons with LVGL-style alignment.
//! The tree only stores what to draw and where; pixels are produced by the
//! display crate.

use heapless::{String, Vec};

use super::UiError;

/// Maximum widgets per screen
pub const MAX_WIDGETS: usize = 16;

/// Maximum label text length in bytes
pub const MAX_TEXT_LEN: usize = 64;

/// Handle to a widget in a [`WidgetTree`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct WidgetId(u8);

impl WidgetId {
    /// Position of the widget in creation order
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Monospace font sizes
///
/// Metrics match the `embedded-graphics` mono fonts the renderer uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Font {
    /// 7x13 body text
    #[default]
    Normal,
    /// 10x20 headline text
    Large,
}

impl Font {
    /// Glyph advance in pixels
    pub const fn char_width(self) -> u32 {
        match self {
            Font::Normal => 7,
            Font::Large => 10,
        }
    }

    /// Line height in pixels
    pub const fn line_height(self) -> u32 {
        match self {
            Font::Normal => 13,
            Font::Large => 20,
        }
    }
}

/// Alignment relative to the parent (or the screen)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Align {
    /// Horizontally centered, top edge
    TopMid,
    /// Bottom-left corner
    BottomLeft,
    /// Bottom-right corner
    BottomRight,
    /// Centered on both axes
    #[default]
    Center,
}

/// Axis-aligned rectangle in screen pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl Rect {
    pub const fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Check if a point lies inside (right and bottom edges exclusive)
    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= self.x
            && y >= self.y
            && x < self.x + self.width as i32
            && y < self.y + self.height as i32
    }

    /// Bottom edge (exclusive)
    pub fn bottom(&self) -> i32 {
        self.y + self.height as i32
    }
}

/// Widget kinds
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WidgetKind {
    /// Text sized to its content
    Label {
        text: String<MAX_TEXT_LEN>,
        font: Font,
    },
    /// Fixed-size clickable box
    Button { width: u32, height: u32 },
}

/// A single widget
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Widget {
    pub kind: WidgetKind,
    pub parent: Option<WidgetId>,
    pub align: Align,
    /// Offset from the aligned position (x, y)
    pub offset: (i32, i32),
}

impl Widget {
    /// Returns true if touches on this widget produce clicks
    pub fn is_clickable(&self) -> bool {
        matches!(self.kind, WidgetKind::Button { .. })
    }

    /// Label text, if this is a label
    pub fn text(&self) -> Option<&str> {
        match &self.kind {
            WidgetKind::Label { text, .. } => Some(text.as_str()),
            WidgetKind::Button { .. } => None,
        }
    }

    fn size(&self) -> (u32, u32) {
        match &self.kind {
            WidgetKind::Label { text, font } => (
                text.chars().count() as u32 * font.char_width(),
                font.line_height(),
            ),
            WidgetKind::Button { width, height } => (*width, *height),
        }
    }
}

/// The widget tree of the single active screen
#[derive(Debug, Clone)]
pub struct WidgetTree {
    width: u32,
    height: u32,
    widgets: Vec<Widget, MAX_WIDGETS>,
    dirty: bool,
}

impl WidgetTree {
    /// Create an empty screen of the given size
    pub const fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            widgets: Vec::new(),
            dirty: true,
        }
    }

    /// Screen size in pixels (width, height)
    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// The whole screen as a rectangle
    pub fn screen_rect(&self) -> Rect {
        Rect::new(0, 0, self.width, self.height)
    }

    /// Number of widgets
    pub fn len(&self) -> usize {
        self.widgets.len()
    }

    /// Check if the screen has no widgets
    pub fn is_empty(&self) -> bool {
        self.widgets.is_empty()
    }

    fn insert(&mut self, parent: Option<WidgetId>, kind: WidgetKind) -> Result<WidgetId, UiError> {
        if let Some(parent) = parent {
            self.get(parent).ok_or(UiError::InvalidWidget)?;
        }
        let id = WidgetId(self.widgets.len() as u8);
        self.widgets
            .push(Widget {
                kind,
                parent,
                align: Align::Center,
                offset: (0, 0),
            })
            .map_err(|_| UiError::TreeFull)?;
        self.dirty = true;
        Ok(id)
    }

    /// Create an empty label on `parent` (`None` = the screen)
    pub fn create_label(&mut self, parent: Option<WidgetId>) -> Result<WidgetId, UiError> {
        self.insert(
            parent,
            WidgetKind::Label {
                text: String::new(),
                font: Font::Normal,
            },
        )
    }

    /// Create a button of fixed size on `parent` (`None` = the screen)
    pub fn create_button(
        &mut self,
        parent: Option<WidgetId>,
        width: u32,
        height: u32,
    ) -> Result<WidgetId, UiError> {
        self.insert(parent, WidgetKind::Button { width, height })
    }

    /// Get a widget by handle
    pub fn get(&self, id: WidgetId) -> Option<&Widget> {
        self.widgets.get(id.index())
    }

    /// Iterate widgets in creation (paint) order
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = (WidgetId, &Widget)> {
        self.widgets
            .iter()
            .enumerate()
            .map(|(i, w)| (WidgetId(i as u8), w))
    }

    /// Replace a label's text
    ///
    /// Text beyond [`MAX_TEXT_LEN`] bytes is cut at a char boundary.
    /// Setting the text it already shows leaves the tree clean.
    pub fn set_text(&mut self, id: WidgetId, text: &str) -> Result<(), UiError> {
        let widget = self.widgets.get_mut(id.index()).ok_or(UiError::InvalidWidget)?;
        let WidgetKind::Label { text: current, .. } = &mut widget.kind else {
            return Err(UiError::NotALabel);
        };

        let text = truncate(text, MAX_TEXT_LEN);
        if current.as_str() == text {
            return Ok(());
        }

        current.clear();
        // Cannot fail: truncated to capacity above
        let _ = current.push_str(text);
        self.dirty = true;
        Ok(())
    }

    /// Label text
    pub fn text(&self, id: WidgetId) -> Option<&str> {
        self.get(id).and_then(Widget::text)
    }

    /// Change a label's font
    pub fn set_font(&mut self, id: WidgetId, new_font: Font) -> Result<(), UiError> {
        let widget = self.widgets.get_mut(id.index()).ok_or(UiError::InvalidWidget)?;
        match &mut widget.kind {
            WidgetKind::Label { font, .. } => {
                *font = new_font;
                self.dirty = true;
                Ok(())
            }
            WidgetKind::Button { .. } => Err(UiError::NotALabel),
        }
    }

    /// Align a widget inside its parent with an extra offset
    pub fn align(&mut self, id: WidgetId, align: Align, x: i32, y: i32) -> Result<(), UiError> {
        let widget = self.widgets.get_mut(id.index()).ok_or(UiError::InvalidWidget)?;
        widget.align = align;
        widget.offset = (x, y);
        self.dirty = true;
        Ok(())
    }

    /// Center a widget in its parent
    pub fn center(&mut self, id: WidgetId) -> Result<(), UiError> {
        self.align(id, Align::Center, 0, 0)
    }

    /// Resolve a widget's absolute geometry
    pub fn layout(&self, id: WidgetId) -> Option<Rect> {
        let widget = self.get(id)?;
        let parent = match widget.parent {
            Some(parent) => self.layout(parent)?,
            None => self.screen_rect(),
        };

        let (w, h) = widget.size();
        let (ox, oy) = widget.offset;
        let free_x = parent.width as i32 - w as i32;
        let free_y = parent.height as i32 - h as i32;

        let (x, y) = match widget.align {
            Align::TopMid => (free_x / 2, 0),
            Align::BottomLeft => (0, free_y),
            Align::BottomRight => (free_x, free_y),
            Align::Center => (free_x / 2, free_y / 2),
        };

        Some(Rect::new(parent.x + x + ox, parent.y + y + oy, w, h))
    }

    /// Find the topmost clickable widget under a screen point
    ///
    /// A point on a button's child label resolves to the button.
    pub fn hit_test(&self, x: i32, y: i32) -> Option<WidgetId> {
        self.iter()
            .rev()
            .filter(|(_, w)| w.is_clickable())
            .find(|(id, _)| self.layout(*id).is_some_and(|r| r.contains(x, y)))
            .map(|(id, _)| id)
    }

    /// Check if the screen needs redrawing
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Mark the screen as clean (after rendering)
    pub fn mark_clean(&mut self) {
        self.dirty = false;
    }

    /// Force a full redraw
    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }
}

/// Cut `text` to at most `max` bytes without splitting a char
fn truncate(text: &str, max: usize) -> &str {
    if text.len() <= max {
        return text;
    }
    let mut end = max;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    &text[..end]
}

//! Widget tree renderer
//!
//! Draws the tree through `embedded-graphics` into full-width bands of a
//! few rows each, and hands every band to a [`PanelBackend`]. With two
//! buffers the next band is drawn while the previous one is on the wire.

use embassy_futures::join::join;
use embedded_graphics::mono_font::ascii::{FONT_10X20, FONT_7X13};
use embedded_graphics::mono_font::{MonoFont, MonoTextStyle};
use embedded_graphics::pixelcolor::Rgb666;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::{
    PrimitiveStyle, PrimitiveStyleBuilder, Rectangle, RoundedRectangle, StrokeAlignment,
};
use embedded_graphics::text::{Baseline, Text};
use tapdeck_core::ui::{Font, Rect, WidgetKind, WidgetTree};

use crate::backend::{DisplayError, PanelBackend};

pub const COL_BACKGROUND: Rgb666 = Rgb666::BLACK;
pub const COL_TEXT: Rgb666 = Rgb666::WHITE;
pub const COL_BUTTON: Rgb666 = Rgb666::new(0, 24, 48);
pub const COL_BUTTON_BORDER: Rgb666 = Rgb666::new(0, 63, 63);

const BUTTON_RADIUS: u32 = 6;
const BUTTON_BORDER: u32 = 2;

/// Font used to draw a widget font
pub fn mono_font(font: Font) -> &'static MonoFont<'static> {
    match font {
        Font::Normal => &FONT_7X13,
        Font::Large => &FONT_10X20,
    }
}

fn to_rectangle(rect: Rect) -> Rectangle {
    Rectangle::new(Point::new(rect.x, rect.y), Size::new(rect.width, rect.height))
}

/// Draw target covering rows `top..top + lines` of the screen
pub struct BandTarget<'a> {
    buffer: &'a mut [Rgb666],
    width: u32,
    top: i32,
    lines: u32,
}

impl<'a> BandTarget<'a> {
    /// `buffer` must hold at least `width * lines` pixels
    pub fn new(buffer: &'a mut [Rgb666], width: u32, top: i32, lines: u32) -> Self {
        Self {
            buffer,
            width,
            top,
            lines,
        }
    }
}

impl Dimensions for BandTarget<'_> {
    fn bounding_box(&self) -> Rectangle {
        Rectangle::new(Point::new(0, self.top), Size::new(self.width, self.lines))
    }
}

impl DrawTarget for BandTarget<'_> {
    type Color = Rgb666;
    type Error = core::convert::Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(pt, color) in pixels {
            let y = pt.y - self.top;
            if pt.x >= 0 && pt.x < self.width as i32 && y >= 0 && y < self.lines as i32 {
                let idx = y as usize * self.width as usize + pt.x as usize;
                if let Some(px) = self.buffer.get_mut(idx) {
                    *px = color;
                }
            }
        }
        Ok(())
    }

    fn clear(&mut self, color: Self::Color) -> Result<(), Self::Error> {
        let len = (self.width * self.lines) as usize;
        let end = len.min(self.buffer.len());
        self.buffer[..end].fill(color);
        Ok(())
    }
}

/// Draw every widget of `tree` that overlaps `target`
pub fn draw_tree<D>(tree: &WidgetTree, target: &mut D) -> Result<(), D::Error>
where
    D: DrawTarget<Color = Rgb666>,
{
    target.clear(COL_BACKGROUND)?;
    let area = target.bounding_box();

    let button_style: PrimitiveStyle<Rgb666> = PrimitiveStyleBuilder::new()
        .fill_color(COL_BUTTON)
        .stroke_color(COL_BUTTON_BORDER)
        .stroke_width(BUTTON_BORDER)
        .stroke_alignment(StrokeAlignment::Inside)
        .build();

    for (id, widget) in tree.iter() {
        let Some(rect) = tree.layout(id) else {
            continue;
        };
        let bounds = to_rectangle(rect);
        if area.intersection(&bounds).size == Size::zero() {
            continue;
        }

        match &widget.kind {
            WidgetKind::Button { .. } => {
                RoundedRectangle::with_equal_corners(bounds, Size::new(BUTTON_RADIUS, BUTTON_RADIUS))
                    .into_styled(button_style)
                    .draw(target)?;
            }
            WidgetKind::Label { text, font } => {
                let style = MonoTextStyle::new(mono_font(*font), COL_TEXT);
                Text::with_baseline(text, bounds.top_left, style, Baseline::Top).draw(target)?;
            }
        }
    }

    Ok(())
}

fn draw_band(tree: &WidgetTree, buffer: &mut [Rgb666], width: u16, top: u16, lines: u16) {
    let mut band = BandTarget::new(buffer, width as u32, top as i32, lines as u32);
    draw_tree(tree, &mut band).ok();
}

/// Banded renderer
pub struct BandRenderer {
    lines: u16,
}

impl BandRenderer {
    /// Renderer drawing `lines` rows per band
    pub fn new(lines: u16) -> Self {
        Self {
            lines: lines.max(1),
        }
    }

    /// Pixels one band buffer must hold for a panel `width` wide
    pub fn band_len(&self, width: u16) -> usize {
        width as usize * self.lines as usize
    }

    /// Draw the whole tree to `panel`
    ///
    /// With a `back` buffer, drawing the next band overlaps flushing the
    /// current one.
    pub async fn render<P: PanelBackend>(
        &self,
        tree: &WidgetTree,
        panel: &mut P,
        front: &mut [Rgb666],
        back: Option<&mut [Rgb666]>,
    ) -> Result<(), DisplayError> {
        let (width, height) = panel.dimensions();
        let band_len = self.band_len(width);
        if front.len() < band_len || back.as_ref().is_some_and(|b| b.len() < band_len) {
            return Err(DisplayError::BufferTooSmall);
        }

        let Some(back) = back else {
            let mut y = 0;
            while y < height {
                let lines = self.lines.min(height - y);
                let band = &mut front[..width as usize * lines as usize];
                draw_band(tree, band, width, y, lines);
                panel.write_band(y, lines, band).await?;
                y += lines;
            }
            return Ok(());
        };

        let mut ready: &mut [Rgb666] = front;
        let mut spare: &mut [Rgb666] = back;

        let mut y = 0;
        let mut lines = self.lines.min(height);
        draw_band(tree, &mut ready[..width as usize * lines as usize], width, 0, lines);

        while y < height {
            let next_y = y + lines;
            let next_lines = self.lines.min(height - next_y);
            let len = width as usize * lines as usize;
            let next_len = width as usize * next_lines as usize;

            let (flushed, ()) = join(panel.write_band(y, lines, &ready[..len]), async {
                if next_lines > 0 {
                    draw_band(tree, &mut spare[..next_len], width, next_y, next_lines);
                }
            })
            .await;
            flushed?;

            core::mem::swap(&mut ready, &mut spare);
            y = next_y;
            lines = next_lines;
        }

        Ok(())
    }
}

//! Touch to click translation
//!
//! A click is a press that lands on a button and is released while still
//! over the same button. Sliding off the button cancels the click until the
//! finger is lifted.

use crate::config::TouchConfig;
use crate::traits::RawTouch;

use super::widget::{WidgetId, WidgetTree};

/// Maps raw controller readings to screen pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TouchCalibration {
    config: TouchConfig,
    width: u32,
    height: u32,
}

impl TouchCalibration {
    pub fn new(config: TouchConfig, width: u32, height: u32) -> Self {
        Self {
            config,
            width,
            height,
        }
    }

    /// Map a raw sample to a screen point
    ///
    /// Returns `None` if the pressure is below the threshold.
    pub fn map(&self, raw: RawTouch) -> Option<(i32, i32)> {
        let c = &self.config;
        if raw.z < c.pressure_threshold {
            return None;
        }

        let (rx, ry) = if c.swap_xy { (raw.y, raw.x) } else { (raw.x, raw.y) };
        let mut x = scale(rx, c.x_min, c.x_max, self.width);
        let mut y = scale(ry, c.y_min, c.y_max, self.height);

        if c.invert_x {
            x = self.width as i32 - 1 - x;
        }
        if c.invert_y {
            y = self.height as i32 - 1 - y;
        }

        Some((x, y))
    }
}

/// Scale `value` in `min..=max` to `0..span`, clamped
fn scale(value: u16, min: u16, max: u16, span: u32) -> i32 {
    if span == 0 || max <= min {
        return 0;
    }
    let value = value.clamp(min, max);
    let offset = (value - min) as u32;
    let range = (max - min) as u32;
    ((offset * (span - 1)) / range) as i32
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Idle,
    Pressed(WidgetId),
    /// Finger is down but no click can result
    Cancelled,
}

/// Press/release tracker
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClickDetector {
    state: State,
}

impl Default for ClickDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl ClickDetector {
    pub const fn new() -> Self {
        Self { state: State::Idle }
    }

    /// Feed one sample (`None` = not touched)
    ///
    /// Returns the clicked widget on release.
    pub fn feed(&mut self, point: Option<(i32, i32)>, tree: &WidgetTree) -> Option<WidgetId> {
        match (self.state, point) {
            (State::Idle, Some((x, y))) => {
                self.state = match tree.hit_test(x, y) {
                    Some(id) => State::Pressed(id),
                    None => State::Cancelled,
                };
                None
            }
            (State::Pressed(id), Some((x, y))) => {
                if tree.hit_test(x, y) != Some(id) {
                    self.state = State::Cancelled;
                }
                None
            }
            (State::Pressed(id), None) => {
                self.state = State::Idle;
                Some(id)
            }
            (State::Cancelled, None) => {
                self.state = State::Idle;
                None
            }
            (State::Cancelled, Some(_)) | (State::Idle, None) => None,
        }
    }

    /// Returns true while a press is being tracked
    pub fn is_pressed(&self) -> bool {
        matches!(self.state, State::Pressed(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::surface::{Button, UiSurface};
    use proptest::prelude::*;

    fn screen() -> (WidgetTree, UiSurface) {
        let mut tree = WidgetTree::new(480, 320);
        let surface = UiSurface::build(&mut tree).unwrap();
        (tree, surface)
    }

    fn center(tree: &WidgetTree, surface: &UiSurface, button: Button) -> (i32, i32) {
        let r = tree.layout(surface.button(button)).unwrap();
        (r.x + r.width as i32 / 2, r.y + r.height as i32 / 2)
    }

    #[test]
    fn test_press_release_on_button_clicks() {
        let (tree, surface) = screen();
        let mut detector = ClickDetector::new();
        let p = center(&tree, &surface, Button::Play);

        assert_eq!(detector.feed(Some(p), &tree), None);
        assert!(detector.is_pressed());
        assert_eq!(detector.feed(Some(p), &tree), None);
        assert_eq!(
            detector.feed(None, &tree),
            Some(surface.button(Button::Play))
        );
        assert!(!detector.is_pressed());
    }

    #[test]
    fn test_slide_off_cancels() {
        let (tree, surface) = screen();
        let mut detector = ClickDetector::new();

        detector.feed(Some(center(&tree, &surface, Button::Skip)), &tree);
        detector.feed(Some(center(&tree, &surface, Button::VolUp)), &tree);
        // Sliding back does not revive the click
        detector.feed(Some(center(&tree, &surface, Button::Skip)), &tree);
        assert_eq!(detector.feed(None, &tree), None);
    }

    #[test]
    fn test_press_outside_buttons() {
        let (tree, surface) = screen();
        let mut detector = ClickDetector::new();

        detector.feed(Some((240, 100)), &tree);
        // Sliding onto a button after pressing elsewhere is not a click
        detector.feed(Some(center(&tree, &surface, Button::Play)), &tree);
        assert_eq!(detector.feed(None, &tree), None);
    }

    #[test]
    fn test_release_without_press() {
        let (tree, _) = screen();
        let mut detector = ClickDetector::new();
        assert_eq!(detector.feed(None, &tree), None);
        assert_eq!(detector.feed(None, &tree), None);
    }

    #[test]
    fn test_two_clicks_two_results() {
        let (tree, surface) = screen();
        let mut detector = ClickDetector::new();
        let p = center(&tree, &surface, Button::VolDown);
        let id = surface.button(Button::VolDown);

        for _ in 0..2 {
            detector.feed(Some(p), &tree);
            assert_eq!(detector.feed(None, &tree), Some(id));
        }
    }

    #[test]
    fn test_calibration_corners() {
        let config = TouchConfig {
            swap_xy: false,
            invert_x: false,
            invert_y: false,
            ..TouchConfig::default()
        };
        let cal = TouchCalibration::new(config, 480, 320);

        let min = RawTouch { x: 200, y: 200, z: 500 };
        let max = RawTouch { x: 3900, y: 3900, z: 500 };
        assert_eq!(cal.map(min), Some((0, 0)));
        assert_eq!(cal.map(max), Some((479, 319)));

        // Readings outside the calibrated range clamp to the edge
        let beyond = RawTouch { x: 4095, y: 0, z: 500 };
        assert_eq!(cal.map(beyond), Some((479, 0)));
    }

    #[test]
    fn test_calibration_swap_and_invert() {
        let config = TouchConfig {
            swap_xy: true,
            invert_x: false,
            invert_y: true,
            ..TouchConfig::default()
        };
        let cal = TouchCalibration::new(config, 480, 320);
        // Raw y drives screen x, raw x drives (inverted) screen y
        let raw = RawTouch { x: 200, y: 3900, z: 500 };
        assert_eq!(cal.map(raw), Some((479, 319)));
    }

    #[test]
    fn test_light_touch_ignored() {
        let cal = TouchCalibration::new(TouchConfig::default(), 480, 320);
        let raw = RawTouch { x: 1000, y: 1000, z: 10 };
        assert_eq!(cal.map(raw), None);
    }

    proptest! {
        #[test]
        fn mapped_points_stay_on_screen(x in any::<u16>(), y in any::<u16>(), swap in any::<bool>(), inv in any::<bool>()) {
            let config = TouchConfig {
                swap_xy: swap,
                invert_x: inv,
                invert_y: !inv,
                ..TouchConfig::default()
            };
            let cal = TouchCalibration::new(config, 480, 320);
            let (sx, sy) = cal.map(RawTouch { x, y, z: 4095 }).unwrap();
            prop_assert!((0..480).contains(&sx));
            prop_assert!((0..320).contains(&sy));
        }
    }
}

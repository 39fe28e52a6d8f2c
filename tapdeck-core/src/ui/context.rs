//! UI context
//!
//! Ties the display lock, the player screen and the key dispatcher together.
//! Every widget mutation outside start-up goes through here and takes the
//! lock first.

use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::mutex::Mutex;
use embassy_time::{with_timeout, Duration};
use tapdeck_protocol::KeyEvent;

use crate::forward::{forward, DispatchError, KeyDispatcher};

use super::surface::{Button, UiSurface};
use super::widget::{WidgetId, WidgetTree};
use super::UiError;

pub struct UiContext<'a, M: RawMutex, D: KeyDispatcher> {
    display: &'a Mutex<M, WidgetTree>,
    surface: UiSurface,
    dispatcher: D,
    lock_timeout: Duration,
}

impl<'a, M: RawMutex, D: KeyDispatcher> UiContext<'a, M, D> {
    /// Build the player screen and return the context owning its handles
    ///
    /// Waits for the display lock without a bound; nothing else should be
    /// touching the screen this early.
    pub async fn start(
        display: &'a Mutex<M, WidgetTree>,
        dispatcher: D,
        lock_timeout: Duration,
    ) -> Result<Self, UiError> {
        let surface = {
            let mut tree = display.lock().await;
            UiSurface::build(&mut tree)?
        };

        Ok(Self {
            display,
            surface,
            dispatcher,
            lock_timeout,
        })
    }

    /// Show `name` in the file label
    ///
    /// Gives up after the lock timeout, leaving the label as it was.
    pub async fn set_file_label(&self, name: &str) -> Result<(), UiError> {
        match with_timeout(self.lock_timeout, self.display.lock()).await {
            Ok(mut tree) => tree.set_text(self.surface.file_label(), name),
            Err(_) => {
                #[cfg(feature = "defmt")]
                defmt::error!("Failed to get display mutex, cannot modify UI");
                Err(UiError::DisplayBusy)
            }
        }
    }

    /// Forward a button press to the dispatcher
    pub fn press(&self, button: Button) -> Result<KeyEvent, DispatchError> {
        forward(button, &self.dispatcher)
    }

    /// Forward a click on `widget` if it is one of the buttons
    pub fn click(&self, widget: WidgetId) -> Option<Result<KeyEvent, DispatchError>> {
        self.surface.button_at(widget).map(|button| self.press(button))
    }

    /// The display lock
    pub fn display(&self) -> &'a Mutex<M, WidgetTree> {
        self.display
    }

    pub fn surface(&self) -> &UiSurface {
        &self.surface
    }

    pub fn dispatcher(&self) -> &D {
        &self.dispatcher
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::surface::NO_FILE_TEXT;
    use core::cell::RefCell;
    use embassy_futures::block_on;
    use embassy_sync::blocking_mutex::raw::NoopRawMutex;
    use std::vec::Vec;
    use tapdeck_protocol::{KeyAction, KeyId};

    #[derive(Default)]
    struct Recorder {
        events: RefCell<Vec<KeyEvent>>,
    }

    impl KeyDispatcher for Recorder {
        fn dispatch(&self, event: KeyEvent) -> Result<(), DispatchError> {
            self.events.borrow_mut().push(event);
            Ok(())
        }
    }

    type TestUi<'a> = UiContext<'a, NoopRawMutex, &'a Recorder>;

    fn label_text(display: &Mutex<NoopRawMutex, WidgetTree>, ui: &TestUi<'_>) -> String {
        let tree = display.try_lock().unwrap();
        tree.text(ui.surface().file_label()).unwrap().into()
    }

    #[test]
    fn test_start_shows_placeholder() {
        let display = Mutex::<NoopRawMutex, _>::new(WidgetTree::new(480, 320));
        let recorder = Recorder::default();
        let ui = block_on(UiContext::start(&display, &recorder, Duration::from_millis(500))).unwrap();

        assert_eq!(label_text(&display, &ui), NO_FILE_TEXT);
        assert!(recorder.events.borrow().is_empty());
    }

    #[test]
    fn test_set_file_label() {
        let display = Mutex::<NoopRawMutex, _>::new(WidgetTree::new(480, 320));
        let recorder = Recorder::default();
        let ui = block_on(UiContext::start(&display, &recorder, Duration::from_millis(500))).unwrap();

        block_on(ui.set_file_label("track.mp3")).unwrap();
        assert_eq!(label_text(&display, &ui), "track.mp3");

        // Same text twice leaves the same state
        display.try_lock().unwrap().mark_clean();
        block_on(ui.set_file_label("track.mp3")).unwrap();
        assert_eq!(label_text(&display, &ui), "track.mp3");
        assert!(!display.try_lock().unwrap().is_dirty());
    }

    #[test]
    fn test_set_file_label_times_out_when_locked() {
        let display = Mutex::<NoopRawMutex, _>::new(WidgetTree::new(480, 320));
        let recorder = Recorder::default();
        let ui = block_on(UiContext::start(&display, &recorder, Duration::from_millis(20))).unwrap();

        {
            let _held = display.try_lock().unwrap();
            assert_eq!(
                block_on(ui.set_file_label("track.mp3")),
                Err(UiError::DisplayBusy)
            );
        }
        assert_eq!(label_text(&display, &ui), NO_FILE_TEXT);
    }

    #[test]
    fn test_click_forwards_buttons_only() {
        let display = Mutex::<NoopRawMutex, _>::new(WidgetTree::new(480, 320));
        let recorder = Recorder::default();
        let ui = block_on(UiContext::start(&display, &recorder, Duration::from_millis(500))).unwrap();

        let play = ui.surface().button(Button::Play);
        let sent = ui.click(play).unwrap().unwrap();
        assert_eq!(sent.key, KeyId::Play);
        assert_eq!(sent.action, KeyAction::ClickRelease);

        assert!(ui.click(ui.surface().file_label()).is_none());
        assert_eq!(recorder.events.borrow().len(), 1);
    }
}

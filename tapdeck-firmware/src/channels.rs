//! Inter-task communication
//!
//! Defines the static channels and signals shared between Embassy tasks,
//! and the concrete types that tie the UI context to them.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use embassy_sync::mutex::Mutex;
use embassy_sync::signal::Signal;

use tapdeck_core::forward::ChannelDispatcher;
use tapdeck_core::ui::{UiContext, WidgetTree};
use tapdeck_protocol::KeyEvent;

/// Channel capacity for key envelopes from the control surface
pub const KEY_CHANNEL_SIZE: usize = 8;

/// Key envelopes from the touch task to the audio task
pub static KEY_CHANNEL: Channel<CriticalSectionRawMutex, KeyEvent, KEY_CHANNEL_SIZE> =
    Channel::new();

/// Signal that the widget tree changed and the panel needs redrawing
pub static REDRAW: Signal<CriticalSectionRawMutex, ()> = Signal::new();

/// The widget tree behind the display lock
pub type DisplayMutex = Mutex<CriticalSectionRawMutex, WidgetTree>;

/// Dispatcher feeding [`KEY_CHANNEL`]
pub type KeyDispatch = ChannelDispatcher<'static, CriticalSectionRawMutex, KEY_CHANNEL_SIZE>;

/// UI context shared by the touch and audio tasks
pub type Ui = UiContext<'static, CriticalSectionRawMutex, &'static KeyDispatch>;

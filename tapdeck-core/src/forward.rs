//! Button click forwarding
//!
//! Each click becomes one [`KeyEvent`] envelope handed to a [`KeyDispatcher`].
//! Nothing is coalesced or debounced here.

use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::channel::Channel;
use portable_atomic::{AtomicU32, Ordering};
use tapdeck_protocol::KeyEvent;

use crate::config::QueuePolicy;
use crate::ui::Button;

/// Dispatch errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DispatchError {
    /// The consumer's queue had no room and the event was refused
    QueueFull,
}

/// Delivers key envelopes to the audio side
pub trait KeyDispatcher {
    fn dispatch(&self, event: KeyEvent) -> Result<(), DispatchError>;
}

impl<T: KeyDispatcher + ?Sized> KeyDispatcher for &T {
    fn dispatch(&self, event: KeyEvent) -> Result<(), DispatchError> {
        (**self).dispatch(event)
    }
}

/// Dispatcher backed by a bounded channel
pub struct ChannelDispatcher<'a, M: RawMutex, const N: usize> {
    channel: &'a Channel<M, KeyEvent, N>,
    policy: QueuePolicy,
    dropped: AtomicU32,
}

impl<'a, M: RawMutex, const N: usize> ChannelDispatcher<'a, M, N> {
    pub const fn new(channel: &'a Channel<M, KeyEvent, N>, policy: QueuePolicy) -> Self {
        Self {
            channel,
            policy,
            dropped: AtomicU32::new(0),
        }
    }

    /// Events lost to a full queue (refused or evicted)
    pub fn dropped(&self) -> u32 {
        self.dropped.load(Ordering::Relaxed)
    }

    pub fn policy(&self) -> QueuePolicy {
        self.policy
    }
}

impl<M: RawMutex, const N: usize> KeyDispatcher for ChannelDispatcher<'_, M, N> {
    fn dispatch(&self, event: KeyEvent) -> Result<(), DispatchError> {
        if self.channel.try_send(event).is_ok() {
            return Ok(());
        }

        self.dropped.fetch_add(1, Ordering::Relaxed);
        match self.policy {
            QueuePolicy::DropNewest => Err(DispatchError::QueueFull),
            QueuePolicy::DropOldest => {
                let _ = self.channel.try_receive();
                self.channel
                    .try_send(event)
                    .map_err(|_| DispatchError::QueueFull)
            }
        }
    }
}

/// Forward a button click: log it, build its envelope and dispatch it once
pub fn forward<D: KeyDispatcher>(button: Button, dispatcher: &D) -> Result<KeyEvent, DispatchError> {
    #[cfg(feature = "defmt")]
    defmt::info!("{=str}", button.pressed_message());

    let event = KeyEvent::click_release(button.key());
    dispatcher.dispatch(event)?;
    Ok(event)
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::cell::RefCell;
    use embassy_sync::blocking_mutex::raw::NoopRawMutex;
    use std::vec::Vec;
    use tapdeck_protocol::{KeyAction, KeyId};

    /// Records everything it is handed
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

    #[test]
    fn test_each_button_dispatches_once() {
        for button in Button::ALL {
            let recorder = Recorder::default();
            let sent = forward(button, &recorder).unwrap();

            let events = recorder.events.borrow();
            assert_eq!(events.len(), 1);
            assert_eq!(events[0], sent);
            assert_eq!(sent.action, KeyAction::ClickRelease);
            assert_eq!(sent.key, button.key());
            assert_eq!(sent.len, 1);
            assert_eq!(sent.source, 0);
        }
    }

    #[test]
    fn test_repeated_clicks_not_coalesced() {
        let recorder = Recorder::default();
        forward(Button::VolDown, &recorder).unwrap();
        forward(Button::VolDown, &recorder).unwrap();

        let events = recorder.events.borrow();
        assert_eq!(events.len(), 2);
        assert!(events.iter().all(|e| e.key == KeyId::VolDown));
    }

    #[test]
    fn test_drop_newest_refuses_when_full() {
        let channel: Channel<NoopRawMutex, KeyEvent, 2> = Channel::new();
        let dispatcher = ChannelDispatcher::new(&channel, QueuePolicy::DropNewest);

        forward(Button::Play, &dispatcher).unwrap();
        forward(Button::Skip, &dispatcher).unwrap();
        assert_eq!(
            forward(Button::VolUp, &dispatcher),
            Err(DispatchError::QueueFull)
        );
        assert_eq!(dispatcher.dropped(), 1);

        assert_eq!(channel.try_receive().unwrap().key, KeyId::Play);
        assert_eq!(channel.try_receive().unwrap().key, KeyId::Set);
        assert!(channel.try_receive().is_err());
    }

    #[test]
    fn test_drop_oldest_evicts() {
        let channel: Channel<NoopRawMutex, KeyEvent, 2> = Channel::new();
        let dispatcher = ChannelDispatcher::new(&channel, QueuePolicy::DropOldest);
        assert_eq!(dispatcher.policy(), QueuePolicy::DropOldest);

        forward(Button::Play, &dispatcher).unwrap();
        forward(Button::Skip, &dispatcher).unwrap();
        forward(Button::VolUp, &dispatcher).unwrap();
        assert_eq!(dispatcher.dropped(), 1);

        assert_eq!(channel.try_receive().unwrap().key, KeyId::Set);
        assert_eq!(channel.try_receive().unwrap().key, KeyId::VolUp);
        assert!(channel.try_receive().is_err());
    }

    #[test]
    fn test_dispatch_through_reference() {
        let recorder = Recorder::default();
        let by_ref = &recorder;
        forward(Button::Play, &by_ref).unwrap();
        assert_eq!(recorder.events.borrow().len(), 1);
    }
}

//! Tapdeck key event envelope
//!
//! The UI task and the audio task never share state directly. Everything a
//! button press means travels as a [`KeyEvent`]: a four-field envelope
//! carrying the action type, which key fired, a payload length and a source
//! tag.
//!
//! ```text
//! ┌────────────┬───────────┬─────┬────────┐
//! │ ACTION     │ KEY       │ LEN │ SOURCE │
//! │ KeyAction  │ KeyId     │ 1   │ 0      │
//! └────────────┴───────────┴─────┴────────┘
//! ```
//!
//! The numeric codes match the input key service used by common audio
//! development frameworks, so envelopes can be logged or bridged as bytes.

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod events;

pub use events::{KeyAction, KeyEvent, KeyId, ENVELOPE_LEN, SOURCE_NONE};

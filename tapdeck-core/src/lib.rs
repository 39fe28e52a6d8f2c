//! Board-agnostic core logic for the Tapdeck player
//!
//! This crate contains all application logic that does not depend on
//! specific hardware implementations:
//!
//! - Hardware abstraction traits (audio backend, touch input)
//! - Widget tree and the fixed control surface
//! - Touch-to-click translation
//! - Key event forwarding over a bounded channel
//! - Playback state machine and playlist
//! - Board configuration types and parser

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod config;
pub mod forward;
pub mod player;
pub mod traits;
pub mod ui;

//! Rendering for the Tapdeck control surface
//!
//! This crate provides:
//! - `PanelBackend` trait for panels that accept full-width pixel bands
//! - `BandRenderer`, which draws a `WidgetTree` band by band through
//!   `embedded-graphics`, optionally double buffered
//!
//! The tree itself (layout, hit testing, text) lives in `tapdeck-core`; this
//! crate only turns it into pixels.

#![cfg_attr(not(test), no_std)]

pub mod backend;
pub mod render;

pub use backend::{DisplayError, PanelBackend};
pub use render::{draw_tree, mono_font, BandRenderer, BandTarget};

//! Hardware driver implementations
//!
//! This crate provides concrete implementations of the traits defined
//! in tapdeck-core and tapdeck-display:
//!
//! - Panel (ILI9488, 18-bit colour over SPI)
//! - Touch controller (XPT2046 resistive)
//! - Audio backend (DFPlayer-compatible serial MP3 module)

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod audio;
pub mod panel;
pub mod touch;

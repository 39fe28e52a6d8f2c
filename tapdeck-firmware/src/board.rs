//! Board wiring
//!
//! Pin assignments for a Raspberry Pi Pico with a 3.5" ILI9488/XPT2046
//! SPI module and a DFPlayer Mini:
//!
//! | Function      | Peripheral | Pins                                  |
//! |---------------|------------|---------------------------------------|
//! | Panel         | SPI0       | SCK 18, MOSI 19, CS 17, DC 20, RST 21 |
//! | Backlight     | GPIO       | 22                                    |
//! | Touch         | SPI1       | SCK 10, MOSI 11, MISO 12, CS 13       |
//! | MP3 module    | UART0      | TX 0, RX 1 (9600 baud)                |

use embassy_rp::gpio::Output;
use embassy_rp::peripherals::{SPI0, SPI1};
use embassy_rp::spi::{Async, Spi};
use embassy_rp::uart::BufferedUart;
use embassy_time::Delay;
use embedded_hal_bus::spi::ExclusiveDevice;

use tapdeck_drivers::audio::Mp3Module;
use tapdeck_drivers::panel::Ili9488;
use tapdeck_drivers::touch::Xpt2046;

/// Touch controller SPI clock (XPT2046 tops out around 2.5 MHz)
pub const TOUCH_SPI_HZ: u32 = 2_000_000;

/// MP3 module UART baud rate
pub const MP3_BAUD: u32 = 9600;

/// Largest band buffer, in pixels
pub const MAX_BAND_PIXELS: usize = 480 * 32;

pub type PanelSpi = ExclusiveDevice<Spi<'static, SPI0, Async>, Output<'static>, Delay>;
pub type Panel = Ili9488<PanelSpi, Output<'static>, Output<'static>>;

pub type TouchSpi = ExclusiveDevice<Spi<'static, SPI1, Async>, Output<'static>, Delay>;
pub type Touch = Xpt2046<TouchSpi>;

pub type Mp3 = Mp3Module<BufferedUart>;

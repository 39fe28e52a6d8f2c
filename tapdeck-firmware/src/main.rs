//! Tapdeck - touch-panel MP3 player firmware
//!
//! Shows the name of the file that is playing and four buttons (Play, Skip,
//! Vol+, Vol-) on an ILI9488 panel. Button clicks become key events that the
//! audio task turns into commands for a serial MP3 module.

#![no_std]
#![no_main]

use defmt::*;
use embassy_executor::Spawner;
use embassy_rp::bind_interrupts;
use embassy_rp::gpio::{Level, Output};
use embassy_rp::peripherals::UART0;
use embassy_rp::spi::{self, Spi};
use embassy_rp::uart::{BufferedInterruptHandler, Config as UartConfig, Uart};
use embassy_time::{Delay, Duration};
use embedded_graphics::pixelcolor::Rgb666;
use embedded_graphics::prelude::RgbColor;
use embedded_hal_bus::spi::ExclusiveDevice;
use static_cell::{ConstStaticCell, StaticCell};
use {defmt_rtt as _, panic_probe as _};

use tapdeck_core::forward::ChannelDispatcher;
use tapdeck_core::player::{PlayerController, Playlist};
use tapdeck_core::ui::{TouchCalibration, UiContext, WidgetTree};
use tapdeck_display::BandRenderer;
use tapdeck_drivers::audio::Mp3Module;
use tapdeck_drivers::panel::Ili9488;
use tapdeck_drivers::touch::Xpt2046;

use crate::board::{Panel, MAX_BAND_PIXELS, MP3_BAUD, TOUCH_SPI_HZ};
use crate::channels::{DisplayMutex, KeyDispatch, Ui, KEY_CHANNEL, REDRAW};
use crate::config::load_config;

mod board;
mod channels;
mod config;
mod tasks;

bind_interrupts!(struct Irqs {
    UART0_IRQ => BufferedInterruptHandler<UART0>;
});

// Static cells for UART buffers (must live forever)
static TX_BUF: StaticCell<[u8; 64]> = StaticCell::new();
static RX_BUF: StaticCell<[u8; 64]> = StaticCell::new();

// Band buffers, too large for the stack
static FRONT_BUF: ConstStaticCell<[Rgb666; MAX_BAND_PIXELS]> =
    ConstStaticCell::new([Rgb666::new(0, 0, 0); MAX_BAND_PIXELS]);
static BACK_BUF: ConstStaticCell<[Rgb666; MAX_BAND_PIXELS]> =
    ConstStaticCell::new([Rgb666::new(0, 0, 0); MAX_BAND_PIXELS]);

// Shared state handed to the tasks
static DISPLAY: StaticCell<DisplayMutex> = StaticCell::new();
static DISPATCHER: StaticCell<KeyDispatch> = StaticCell::new();
static UI: StaticCell<Ui> = StaticCell::new();

/// Main entry point
#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("Tapdeck firmware starting...");

    let p = embassy_rp::init(Default::default());
    info!("Peripherals initialized");

    let config = load_config();

    // Panel on SPI0 (write only, no chip select readback needed)
    let mut panel_spi_config = spi::Config::default();
    panel_spi_config.frequency = config.display.spi_hz;
    let panel_spi = Spi::new_txonly(p.SPI0, p.PIN_18, p.PIN_19, p.DMA_CH0, panel_spi_config);
    let panel_cs = Output::new(p.PIN_17, Level::High);
    let panel_dev = unwrap!(ExclusiveDevice::new(panel_spi, panel_cs, Delay));
    let dc = Output::new(p.PIN_20, Level::Low);
    let rst = Output::new(p.PIN_21, Level::High);
    let mut backlight = Output::new(p.PIN_22, Level::Low);

    let mut panel: Panel = Ili9488::new(panel_dev, dc, rst);
    if let Err(e) = panel.init(&mut Delay, config.display.rotation).await {
        error!("Panel init failed: {:?}", e);
    }
    if let Err(e) = panel.clear(Rgb666::BLACK).await {
        warn!("Panel clear failed: {:?}", e);
    }
    backlight.set_high();

    let (width, height) = panel.size();
    if (width, height) != (config.display.width, config.display.height) {
        warn!(
            "Configured {}x{} but panel is {}x{} in this rotation",
            config.display.width, config.display.height, width, height
        );
    }
    info!("Panel initialized ({}x{})", width, height);

    // Touch controller on SPI1
    let mut touch_spi_config = spi::Config::default();
    touch_spi_config.frequency = TOUCH_SPI_HZ;
    let touch_spi = Spi::new(
        p.SPI1,
        p.PIN_10,
        p.PIN_11,
        p.PIN_12,
        p.DMA_CH1,
        p.DMA_CH2,
        touch_spi_config,
    );
    let touch_cs = Output::new(p.PIN_13, Level::High);
    let touch_dev = unwrap!(ExclusiveDevice::new(touch_spi, touch_cs, Delay));
    let touch = Xpt2046::new(touch_dev, config.touch.pressure_threshold);
    let calibration = TouchCalibration::new(config.touch, width as u32, height as u32);
    info!("Touch initialized");

    // MP3 module on UART0
    let mut uart_config = UartConfig::default();
    uart_config.baudrate = MP3_BAUD;
    let tx_buf = TX_BUF.init([0u8; 64]);
    let rx_buf = RX_BUF.init([0u8; 64]);
    let uart = Uart::new_blocking(p.UART0, p.PIN_0, p.PIN_1, uart_config);
    let uart = uart.into_buffered(Irqs, tx_buf, rx_buf);
    let module = Mp3Module::new(uart);
    info!("MP3 UART initialized");

    // Widget tree and control surface
    let display: &'static DisplayMutex =
        DISPLAY.init(DisplayMutex::new(WidgetTree::new(width as u32, height as u32)));
    let dispatcher: &'static KeyDispatch =
        DISPATCHER.init(ChannelDispatcher::new(&KEY_CHANNEL, config.audio.queue_policy));
    let lock_timeout = Duration::from_millis(config.display.lock_timeout_ms as u64);
    let ui: &'static Ui =
        UI.init(unwrap!(UiContext::start(display, dispatcher, lock_timeout).await));
    info!("Key queue policy: {:?}", dispatcher.policy());
    REDRAW.signal(());

    // Band height limited by the static buffers
    let max_lines = (MAX_BAND_PIXELS / width.max(1) as usize) as u16;
    if config.display.band_pixels() > MAX_BAND_PIXELS {
        warn!(
            "draw_buffer_lines {} exceeds the band buffer, using {}",
            config.display.draw_buffer_lines, max_lines
        );
    }
    let renderer = BandRenderer::new(config.display.draw_buffer_lines.min(max_lines));
    let front: &'static mut [Rgb666] = FRONT_BUF.take();
    let back: Option<&'static mut [Rgb666]> = if config.display.double_buffer {
        Some(BACK_BUF.take())
    } else {
        None
    };

    let playlist = Playlist::new(&config.playlist);
    if playlist.is_empty() {
        warn!("Playlist is empty, Play and Skip will do nothing");
    }
    let player = PlayerController::new(playlist, &config.audio);

    // Spawn tasks
    spawner
        .spawn(tasks::ui_task(display, panel, backlight, renderer, front, back))
        .unwrap();
    spawner.spawn(tasks::touch_task(ui, touch, calibration)).unwrap();
    spawner.spawn(tasks::audio_task(ui, module, player)).unwrap();

    info!("All tasks spawned, firmware running");

    loop {
        embassy_time::Timer::after_secs(60).await;
        trace!(
            "Main loop heartbeat ({} key events dropped)",
            dispatcher.dropped()
        );
    }
}

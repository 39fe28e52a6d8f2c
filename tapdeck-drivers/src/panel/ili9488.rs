//! ILI9488 TFT panel (SPI, 18-bit colour)
//!
//! The controller is 320x480 natively; landscape orientations exchange rows
//! and columns through MADCTL. Over SPI it only accepts 18-bit pixels, sent
//! as three bytes with the colour in the top six bits.

use embedded_graphics::pixelcolor::Rgb666;
use embedded_graphics::prelude::RgbColor;
use embedded_hal::digital::OutputPin;
use embedded_hal_async::delay::DelayNs;
use embedded_hal_async::spi::SpiDevice;
use tapdeck_core::config::Rotation;
use tapdeck_display::{DisplayError, PanelBackend};

/// Command codes
pub mod reg {
    pub const SWRESET: u8 = 0x01;
    pub const SLPOUT: u8 = 0x11;
    pub const INVOFF: u8 = 0x20;
    pub const DISPON: u8 = 0x29;
    /// Column address set
    pub const CASET: u8 = 0x2A;
    /// Page (row) address set
    pub const PASET: u8 = 0x2B;
    /// Memory write
    pub const RAMWR: u8 = 0x2C;
    /// Memory access control (scan direction, row/column exchange)
    pub const MADCTL: u8 = 0x36;
    /// Pixel format
    pub const COLMOD: u8 = 0x3A;
    pub const PWCTRL1: u8 = 0xC0;
    pub const PWCTRL2: u8 = 0xC1;
    pub const VMCTRL: u8 = 0xC5;
    pub const IFMODE: u8 = 0xB0;
    pub const FRMCTR1: u8 = 0xB1;
}

/// MADCTL bits
mod madctl {
    pub const MY: u8 = 0x80;
    pub const MX: u8 = 0x40;
    pub const MV: u8 = 0x20;
    pub const BGR: u8 = 0x08;
}

/// 18 bits per pixel on the SPI interface
const COLMOD_18BIT: u8 = 0x66;

/// Native panel size (portrait)
pub const NATIVE_WIDTH: u16 = 320;
pub const NATIVE_HEIGHT: u16 = 480;

/// Pixels converted per SPI write
const CHUNK_PIXELS: usize = 64;

/// Panel errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PanelError {
    /// SPI transfer failed
    Spi,
    /// D/C or reset pin failed
    Pin,
    /// Window outside the panel
    OutOfBounds,
}

impl From<PanelError> for DisplayError {
    fn from(e: PanelError) -> Self {
        match e {
            PanelError::OutOfBounds => DisplayError::InvalidWindow,
            PanelError::Spi | PanelError::Pin => DisplayError::Communication,
        }
    }
}

/// MADCTL value for a rotation
pub fn madctl_for(rotation: Rotation) -> u8 {
    use madctl::*;
    match rotation {
        Rotation::Portrait => MX | BGR,
        Rotation::Landscape => MV | BGR,
        Rotation::PortraitFlipped => MY | BGR,
        Rotation::LandscapeFlipped => MY | MX | MV | BGR,
    }
}

/// Encode one pixel as it goes on the wire
pub fn pixel_bytes(color: Rgb666) -> [u8; 3] {
    [color.r() << 2, color.g() << 2, color.b() << 2]
}

/// ILI9488 over an SPI device with a data/command pin
pub struct Ili9488<SPI, DC, RST> {
    spi: SPI,
    dc: DC,
    rst: RST,
    rotation: Rotation,
}

impl<SPI, DC, RST> Ili9488<SPI, DC, RST>
where
    SPI: SpiDevice,
    DC: OutputPin,
    RST: OutputPin,
{
    pub fn new(spi: SPI, dc: DC, rst: RST) -> Self {
        Self {
            spi,
            dc,
            rst,
            rotation: Rotation::Landscape,
        }
    }

    /// Panel size for the current rotation (width, height)
    pub fn size(&self) -> (u16, u16) {
        if self.rotation.is_portrait() {
            (NATIVE_WIDTH, NATIVE_HEIGHT)
        } else {
            (NATIVE_HEIGHT, NATIVE_WIDTH)
        }
    }

    pub fn rotation(&self) -> Rotation {
        self.rotation
    }

    async fn command(&mut self, cmd: u8, params: &[u8]) -> Result<(), PanelError> {
        self.dc.set_low().map_err(|_| PanelError::Pin)?;
        self.spi.write(&[cmd]).await.map_err(|_| PanelError::Spi)?;
        if !params.is_empty() {
            self.dc.set_high().map_err(|_| PanelError::Pin)?;
            self.spi.write(params).await.map_err(|_| PanelError::Spi)?;
        }
        Ok(())
    }

    /// Reset and configure the controller, then switch the display on
    pub async fn init<D: DelayNs>(&mut self, delay: &mut D, rotation: Rotation) -> Result<(), PanelError> {
        self.rst.set_low().map_err(|_| PanelError::Pin)?;
        delay.delay_ms(10).await;
        self.rst.set_high().map_err(|_| PanelError::Pin)?;
        delay.delay_ms(120).await;

        self.command(reg::SWRESET, &[]).await?;
        delay.delay_ms(120).await;

        self.command(reg::PWCTRL1, &[0x17, 0x15]).await?;
        self.command(reg::PWCTRL2, &[0x41]).await?;
        self.command(reg::VMCTRL, &[0x00, 0x12, 0x80]).await?;
        self.command(reg::COLMOD, &[COLMOD_18BIT]).await?;
        self.command(reg::IFMODE, &[0x00]).await?;
        // 60 Hz
        self.command(reg::FRMCTR1, &[0xA0]).await?;
        self.command(reg::INVOFF, &[]).await?;
        self.set_rotation(rotation).await?;

        self.command(reg::SLPOUT, &[]).await?;
        delay.delay_ms(120).await;
        self.command(reg::DISPON, &[]).await?;
        delay.delay_ms(20).await;

        #[cfg(feature = "defmt")]
        defmt::debug!("ILI9488 ready, rotation {}", rotation);
        Ok(())
    }

    pub async fn set_rotation(&mut self, rotation: Rotation) -> Result<(), PanelError> {
        self.command(reg::MADCTL, &[madctl_for(rotation)]).await?;
        self.rotation = rotation;
        Ok(())
    }

    /// Select the inclusive rectangle `(x0, y0)..=(x1, y1)` and start a memory write
    pub async fn set_window(&mut self, x0: u16, y0: u16, x1: u16, y1: u16) -> Result<(), PanelError> {
        let (width, height) = self.size();
        if x0 > x1 || y0 > y1 || x1 >= width || y1 >= height {
            return Err(PanelError::OutOfBounds);
        }

        let [x0h, x0l] = x0.to_be_bytes();
        let [x1h, x1l] = x1.to_be_bytes();
        let [y0h, y0l] = y0.to_be_bytes();
        let [y1h, y1l] = y1.to_be_bytes();
        self.command(reg::CASET, &[x0h, x0l, x1h, x1l]).await?;
        self.command(reg::PASET, &[y0h, y0l, y1h, y1l]).await?;
        self.command(reg::RAMWR, &[]).await
    }

    /// Stream pixels into the current window
    pub async fn write_pixels(&mut self, pixels: &[Rgb666]) -> Result<(), PanelError> {
        self.dc.set_high().map_err(|_| PanelError::Pin)?;

        let mut bytes = [0u8; CHUNK_PIXELS * 3];
        for chunk in pixels.chunks(CHUNK_PIXELS) {
            for (px, out) in chunk.iter().zip(bytes.chunks_exact_mut(3)) {
                out.copy_from_slice(&pixel_bytes(*px));
            }
            self.spi
                .write(&bytes[..chunk.len() * 3])
                .await
                .map_err(|_| PanelError::Spi)?;
        }
        Ok(())
    }

    /// Fill the whole panel with one colour
    pub async fn clear(&mut self, color: Rgb666) -> Result<(), PanelError> {
        let (width, height) = self.size();
        self.set_window(0, 0, width - 1, height - 1).await?;

        let row = [color; CHUNK_PIXELS];
        let mut remaining = width as usize * height as usize;
        while remaining > 0 {
            let n = remaining.min(CHUNK_PIXELS);
            self.write_pixels(&row[..n]).await?;
            remaining -= n;
        }
        Ok(())
    }

    pub fn release(self) -> (SPI, DC, RST) {
        (self.spi, self.dc, self.rst)
    }
}

impl<SPI, DC, RST> PanelBackend for Ili9488<SPI, DC, RST>
where
    SPI: SpiDevice,
    DC: OutputPin,
    RST: OutputPin,
{
    fn dimensions(&self) -> (u16, u16) {
        self.size()
    }

    async fn write_band(&mut self, y: u16, lines: u16, pixels: &[Rgb666]) -> Result<(), DisplayError> {
        let (width, _) = self.size();
        if lines == 0 {
            return Ok(());
        }
        if pixels.len() != width as usize * lines as usize {
            return Err(DisplayError::InvalidWindow);
        }
        self.set_window(0, y, width - 1, y + lines - 1).await?;
        self.write_pixels(pixels).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::cell::{Cell, RefCell};
    use embassy_futures::block_on;
    use embedded_hal_async::spi::{ErrorType, Operation};
    use std::rc::Rc;
    use std::vec::Vec;

    /// Shared record of (dc_high, bytes) per SPI write
    #[derive(Default)]
    struct Bus {
        dc: Cell<bool>,
        writes: RefCell<Vec<(bool, Vec<u8>)>>,
    }

    struct FakeSpi(Rc<Bus>);
    struct FakePin(Rc<Bus>);
    struct NoPin;
    struct NoDelay;

    impl ErrorType for FakeSpi {
        type Error = core::convert::Infallible;
    }

    impl SpiDevice for FakeSpi {
        async fn transaction(&mut self, operations: &mut [Operation<'_, u8>]) -> Result<(), Self::Error> {
            for op in operations {
                if let Operation::Write(bytes) = op {
                    self.0
                        .writes
                        .borrow_mut()
                        .push((self.0.dc.get(), bytes.to_vec()));
                }
            }
            Ok(())
        }
    }

    impl embedded_hal::digital::ErrorType for FakePin {
        type Error = core::convert::Infallible;
    }

    impl OutputPin for FakePin {
        fn set_low(&mut self) -> Result<(), Self::Error> {
            self.0.dc.set(false);
            Ok(())
        }
        fn set_high(&mut self) -> Result<(), Self::Error> {
            self.0.dc.set(true);
            Ok(())
        }
    }

    impl embedded_hal::digital::ErrorType for NoPin {
        type Error = core::convert::Infallible;
    }

    impl OutputPin for NoPin {
        fn set_low(&mut self) -> Result<(), Self::Error> {
            Ok(())
        }
        fn set_high(&mut self) -> Result<(), Self::Error> {
            Ok(())
        }
    }

    impl DelayNs for NoDelay {
        async fn delay_ns(&mut self, _ns: u32) {}
    }

    fn panel() -> (Ili9488<FakeSpi, FakePin, NoPin>, Rc<Bus>) {
        let bus = Rc::new(Bus::default());
        (Ili9488::new(FakeSpi(bus.clone()), FakePin(bus.clone()), NoPin), bus)
    }

    /// Commands sent (bytes written with D/C low)
    fn commands(bus: &Bus) -> Vec<u8> {
        bus.writes
            .borrow()
            .iter()
            .filter(|(dc, _)| !dc)
            .map(|(_, b)| b[0])
            .collect()
    }

    #[test]
    fn test_init_sequence() {
        let (mut lcd, bus) = panel();
        block_on(lcd.init(&mut NoDelay, Rotation::Landscape)).unwrap();

        let cmds = commands(&bus);
        assert_eq!(cmds.first(), Some(&reg::SWRESET));
        assert_eq!(cmds.last(), Some(&reg::DISPON));
        assert!(cmds.contains(&reg::COLMOD));

        let writes = bus.writes.borrow();
        let madctl = writes
            .iter()
            .position(|(dc, b)| !dc && b[0] == reg::MADCTL)
            .unwrap();
        assert_eq!(writes[madctl + 1], (true, std::vec![0x28]));
    }

    #[test]
    fn test_rotation_size() {
        let (mut lcd, _) = panel();
        assert_eq!(lcd.size(), (480, 320));
        block_on(lcd.set_rotation(Rotation::Portrait)).unwrap();
        assert_eq!(lcd.size(), (320, 480));
    }

    #[test]
    fn test_set_window_bytes() {
        let (mut lcd, bus) = panel();
        block_on(lcd.set_window(0, 32, 479, 63)).unwrap();

        let writes = bus.writes.borrow();
        assert_eq!(writes[0], (false, std::vec![reg::CASET]));
        assert_eq!(writes[1], (true, std::vec![0x00, 0x00, 0x01, 0xDF]));
        assert_eq!(writes[2], (false, std::vec![reg::PASET]));
        assert_eq!(writes[3], (true, std::vec![0x00, 0x20, 0x00, 0x3F]));
        assert_eq!(writes[4], (false, std::vec![reg::RAMWR]));
    }

    #[test]
    fn test_window_out_of_bounds() {
        let (mut lcd, bus) = panel();
        assert_eq!(
            block_on(lcd.set_window(0, 0, 480, 10)),
            Err(PanelError::OutOfBounds)
        );
        assert!(bus.writes.borrow().is_empty());
    }

    #[test]
    fn test_write_band_streams_pixel_data() {
        let (mut lcd, bus) = panel();
        let band = std::vec![Rgb666::new(63, 0, 1); 480 * 2];
        block_on(lcd.write_band(10, 2, &band)).unwrap();

        let writes = bus.writes.borrow();
        let data: Vec<u8> = writes[5..]
            .iter()
            .inspect(|(dc, _)| assert!(*dc))
            .flat_map(|(_, b)| b.iter().copied())
            .collect();
        assert_eq!(data.len(), 480 * 2 * 3);
        assert_eq!(&data[..3], &[0xFC, 0x00, 0x04]);
    }

    #[test]
    fn test_write_band_rejects_short_buffer() {
        let (mut lcd, _) = panel();
        let band = std::vec![Rgb666::BLACK; 100];
        assert_eq!(
            block_on(lcd.write_band(0, 2, &band)),
            Err(DisplayError::InvalidWindow)
        );
    }

    #[test]
    fn test_pixel_encoding() {
        assert_eq!(pixel_bytes(Rgb666::WHITE), [0xFC, 0xFC, 0xFC]);
        assert_eq!(pixel_bytes(Rgb666::BLACK), [0, 0, 0]);
    }

    #[test]
    fn test_madctl_values() {
        assert_eq!(madctl_for(Rotation::Landscape), 0x28);
        assert_eq!(madctl_for(Rotation::Portrait), 0x48);
        assert_eq!(madctl_for(Rotation::PortraitFlipped), 0x88);
        assert_eq!(madctl_for(Rotation::LandscapeFlipped), 0xE8);
    }
}

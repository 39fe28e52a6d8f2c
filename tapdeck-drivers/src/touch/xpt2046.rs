//! XPT2046 resistive touch controller (SPI)
//!
//! Each conversion is a control byte followed by two clocked bytes holding
//! a 12-bit result, MSB first, starting one bit after the control byte.

use embedded_hal_async::spi::SpiDevice;
use tapdeck_core::traits::{RawTouch, TouchInput};

/// Control bytes: start bit, channel, 12-bit, differential, power-down between reads
pub mod ctrl {
    pub const READ_X: u8 = 0xD0;
    pub const READ_Y: u8 = 0x90;
    pub const READ_Z1: u8 = 0xB0;
}

/// Samples averaged per axis
const SAMPLES: u32 = 4;

/// Touch controller errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TouchError {
    /// SPI transfer failed
    Spi,
}

/// Extract the 12-bit result from the two bytes after the control byte
pub fn decode_sample(hi: u8, lo: u8) -> u16 {
    ((u16::from(hi) << 8 | u16::from(lo)) >> 3) & 0x0FFF
}

pub struct Xpt2046<SPI> {
    spi: SPI,
    pressure_threshold: u16,
}

impl<SPI: SpiDevice> Xpt2046<SPI> {
    pub fn new(spi: SPI, pressure_threshold: u16) -> Self {
        Self {
            spi,
            pressure_threshold,
        }
    }

    async fn sample(&mut self, control: u8) -> Result<u16, TouchError> {
        let tx = [control, 0, 0];
        let mut rx = [0u8; 3];
        self.spi
            .transfer(&mut rx, &tx)
            .await
            .map_err(|_| TouchError::Spi)?;
        Ok(decode_sample(rx[1], rx[2]))
    }

    async fn average(&mut self, control: u8) -> Result<u16, TouchError> {
        let mut sum = 0u32;
        for _ in 0..SAMPLES {
            sum += self.sample(control).await? as u32;
        }
        Ok((sum / SAMPLES) as u16)
    }

    pub fn release(self) -> SPI {
        self.spi
    }
}

impl<SPI: SpiDevice> TouchInput for Xpt2046<SPI> {
    type Error = TouchError;

    async fn read(&mut self) -> Result<Option<RawTouch>, TouchError> {
        let z = self.sample(ctrl::READ_Z1).await?;
        if z < self.pressure_threshold {
            return Ok(None);
        }

        let x = self.average(ctrl::READ_X).await?;
        let y = self.average(ctrl::READ_Y).await?;

        // Finger lifted during the conversion
        let z = self.sample(ctrl::READ_Z1).await?;
        if z < self.pressure_threshold {
            return Ok(None);
        }

        Ok(Some(RawTouch { x, y, z }))
    }
}

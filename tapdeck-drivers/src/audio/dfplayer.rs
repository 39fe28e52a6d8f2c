//! Serial MP3 module (DFPlayer Mini and compatibles)
//!
//! The module decodes MP3 files from its own SD card and is controlled over
//! a 9600 baud (8N1) UART.
//!
//! # Frame format
//!
//! Every command and report is 10 bytes:
//!
//! ```text
//! 7E FF 06 CMD FB PH PL CKH CKL EF
//! ```
//!
//! - `FB`: 1 to request an acknowledge, 0 otherwise
//! - `PH PL`: 16-bit parameter, big-endian
//! - `CKH CKL`: two's complement of the sum of `FF 06 CMD FB PH PL`

use embedded_io_async::{Read, Write};
use heapless::Vec;
use tapdeck_core::config::MAX_VOLUME;
use tapdeck_core::traits::{AudioCommand, AudioPipeline, PipelineStatus};

/// Command and report codes
pub mod cmd {
    /// Play track N from the card root (1-based)
    pub const PLAY_TRACK: u8 = 0x03;
    /// Set volume (0-30)
    pub const SET_VOLUME: u8 = 0x06;
    /// Reset the module
    pub const RESET: u8 = 0x0C;
    /// Resume after pause
    pub const RESUME: u8 = 0x0D;
    /// Pause playback
    pub const PAUSE: u8 = 0x0E;
    /// Stop playback
    pub const STOP: u8 = 0x16;

    /// Card inserted (report)
    pub const CARD_INSERTED: u8 = 0x3A;
    /// Card removed (report)
    pub const CARD_REMOVED: u8 = 0x3B;
    /// Track on the SD card finished (report)
    pub const TRACK_FINISHED: u8 = 0x3D;
    /// Module finished power-on (report)
    pub const READY: u8 = 0x3F;
    /// Error (report, parameter is the error code)
    pub const ERROR: u8 = 0x40;
    /// Acknowledge (report)
    pub const ACK: u8 = 0x41;
}

const START: u8 = 0x7E;
const VERSION: u8 = 0xFF;
const LENGTH: u8 = 0x06;
const END: u8 = 0xEF;

/// Frame length on the wire
pub const FRAME_LEN: usize = 10;

/// Volume ceiling on the module's own scale
pub const MODULE_MAX_VOLUME: u8 = 30;

/// MP3 module errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Mp3Error {
    /// UART read or write failed
    Io,
    /// UART closed (read returned no data)
    Closed,
    /// Bad version, length or end byte
    InvalidFrame,
    /// Checksum mismatch
    ChecksumMismatch,
}

/// Checksum over `VERSION LENGTH CMD FB PH PL`
pub fn checksum(body: &[u8]) -> u16 {
    let sum = body.iter().fold(0u16, |acc, &b| acc.wrapping_add(b as u16));
    sum.wrapping_neg()
}

/// Build a command frame
pub fn build_frame(command: u8, param: u16) -> [u8; FRAME_LEN] {
    let mut frame = [0u8; FRAME_LEN];
    frame[0] = START;
    frame[1] = VERSION;
    frame[2] = LENGTH;
    frame[3] = command;
    frame[4] = 0x00; // No acknowledge
    frame[5] = (param >> 8) as u8;
    frame[6] = param as u8;
    let ck = checksum(&frame[1..7]);
    frame[7] = (ck >> 8) as u8;
    frame[8] = ck as u8;
    frame[9] = END;
    frame
}

/// Map a 0-100 volume to the module's 0-30 scale, rounding to nearest
pub fn module_volume(percent: u8) -> u8 {
    let percent = percent.min(MAX_VOLUME) as u16;
    ((percent * MODULE_MAX_VOLUME as u16 + MAX_VOLUME as u16 / 2) / MAX_VOLUME as u16) as u8
}

/// Wire frame for an audio command
pub fn command_frame(command: AudioCommand) -> [u8; FRAME_LEN] {
    match command {
        AudioCommand::Play { track } => build_frame(cmd::PLAY_TRACK, track),
        AudioCommand::Pause => build_frame(cmd::PAUSE, 0),
        AudioCommand::Resume => build_frame(cmd::RESUME, 0),
        AudioCommand::Stop => build_frame(cmd::STOP, 0),
        AudioCommand::SetVolume(percent) => {
            build_frame(cmd::SET_VOLUME, module_volume(percent) as u16)
        }
    }
}

/// A decoded frame from the module
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Mp3Frame {
    pub command: u8,
    pub param: u16,
}

impl Mp3Frame {
    /// Status report carried by this frame, if any
    ///
    /// Acknowledges and query replies return `None`.
    pub fn status(&self) -> Option<PipelineStatus> {
        match self.command {
            cmd::TRACK_FINISHED => Some(PipelineStatus::TrackFinished { track: self.param }),
            cmd::CARD_INSERTED => Some(PipelineStatus::CardInserted),
            cmd::CARD_REMOVED => Some(PipelineStatus::CardRemoved),
            cmd::ERROR => Some(PipelineStatus::Error(self.param)),
            _ => None,
        }
    }
}

/// Byte-at-a-time frame parser
///
/// Resynchronises on the next start byte after garbage or a bad frame.
#[derive(Debug, Default)]
pub struct FrameParser {
    buffer: Vec<u8, FRAME_LEN>,
}

impl FrameParser {
    pub const fn new() -> Self {
        Self { buffer: Vec::new() }
    }

    /// Drop any partial frame
    pub fn reset(&mut self) {
        self.buffer.clear();
    }

    /// Feed a single byte
    ///
    /// Returns `Ok(Some(frame))` when a complete valid frame is parsed,
    /// `Ok(None)` when more bytes are needed, or `Err` on a bad frame.
    pub fn feed(&mut self, byte: u8) -> Result<Option<Mp3Frame>, Mp3Error> {
        if self.buffer.is_empty() && byte != START {
            return Ok(None);
        }

        // Cannot overflow: cleared below once full
        let _ = self.buffer.push(byte);
        if self.buffer.len() < FRAME_LEN {
            return Ok(None);
        }

        let frame = core::mem::take(&mut self.buffer);
        if frame[1] != VERSION || frame[2] != LENGTH || frame[9] != END {
            return Err(Mp3Error::InvalidFrame);
        }

        let expected = checksum(&frame[1..7]);
        let received = u16::from_be_bytes([frame[7], frame[8]]);
        if expected != received {
            return Err(Mp3Error::ChecksumMismatch);
        }

        Ok(Some(Mp3Frame {
            command: frame[3],
            param: u16::from_be_bytes([frame[5], frame[6]]),
        }))
    }
}

/// MP3 module on a UART
pub struct Mp3Module<U> {
    uart: U,
    parser: FrameParser,
}

impl<U: Read + Write> Mp3Module<U> {
    pub fn new(uart: U) -> Self {
        Self {
            uart,
            parser: FrameParser::new(),
        }
    }

    /// Send a raw command frame
    pub async fn send(&mut self, command: u8, param: u16) -> Result<(), Mp3Error> {
        let frame = build_frame(command, param);
        self.uart.write_all(&frame).await.map_err(|_| Mp3Error::Io)?;
        self.uart.flush().await.map_err(|_| Mp3Error::Io)
    }

    /// Reset the module (it reports ready about a second later)
    ///
    /// Bytes already half-way through the parser are discarded.
    pub async fn reset(&mut self) -> Result<(), Mp3Error> {
        self.parser.reset();
        self.send(cmd::RESET, 0).await
    }

    /// Wait for the next complete frame
    ///
    /// Reads one byte at a time so that dropping the future between bytes
    /// loses nothing; the partial frame stays in the parser.
    pub async fn next_frame(&mut self) -> Result<Mp3Frame, Mp3Error> {
        let mut byte = [0u8; 1];
        loop {
            let n = self.uart.read(&mut byte).await.map_err(|_| Mp3Error::Io)?;
            if n == 0 {
                return Err(Mp3Error::Closed);
            }
            if let Some(frame) = self.parser.feed(byte[0])? {
                return Ok(frame);
            }
        }
    }

    pub fn release(self) -> U {
        self.uart
    }
}

impl<U: Read + Write> AudioPipeline for Mp3Module<U> {
    type Error = Mp3Error;

    async fn apply(&mut self, command: AudioCommand) -> Result<(), Mp3Error> {
        let frame = command_frame(command);
        self.uart.write_all(&frame).await.map_err(|_| Mp3Error::Io)?;
        self.uart.flush().await.map_err(|_| Mp3Error::Io)
    }

    async fn next_status(&mut self) -> Result<PipelineStatus, Mp3Error> {
        loop {
            let frame = self.next_frame().await?;
            if let Some(status) = frame.status() {
                return Ok(status);
            }
            #[cfg(feature = "defmt")]
            defmt::trace!("MP3 frame {=u8:#x} ignored", frame.command);
        }
    }
}

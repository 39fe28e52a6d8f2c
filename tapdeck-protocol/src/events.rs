//! Key events sent from the control surface to the audio task

/// Payload length carried by every key envelope
pub const ENVELOPE_LEN: u8 = 1;

/// Source tag meaning "no distinguishing source"
pub const SOURCE_NONE: u8 = 0;

/// Symbolic key identifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum KeyId {
    /// Record
    Rec,
    /// Set (used as "skip to next track")
    Set,
    /// Play / pause toggle
    Play,
    /// Mode
    Mode,
    /// Volume down
    VolDown,
    /// Volume up
    VolUp,
    /// Mute
    Mute,
}

// Wire format values
const KEY_REC: u8 = 0x01;
const KEY_SET: u8 = 0x02;
const KEY_PLAY: u8 = 0x03;
const KEY_MODE: u8 = 0x04;
const KEY_VOLDOWN: u8 = 0x05;
const KEY_VOLUP: u8 = 0x06;
const KEY_MUTE: u8 = 0x07;

impl KeyId {
    /// Parse a key from its wire format byte
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            KEY_REC => Some(KeyId::Rec),
            KEY_SET => Some(KeyId::Set),
            KEY_PLAY => Some(KeyId::Play),
            KEY_MODE => Some(KeyId::Mode),
            KEY_VOLDOWN => Some(KeyId::VolDown),
            KEY_VOLUP => Some(KeyId::VolUp),
            KEY_MUTE => Some(KeyId::Mute),
            _ => None,
        }
    }

    /// Convert to wire format byte
    pub fn to_byte(self) -> u8 {
        match self {
            KeyId::Rec => KEY_REC,
            KeyId::Set => KEY_SET,
            KeyId::Play => KEY_PLAY,
            KeyId::Mode => KEY_MODE,
            KeyId::VolDown => KEY_VOLDOWN,
            KeyId::VolUp => KEY_VOLUP,
            KeyId::Mute => KEY_MUTE,
        }
    }

    /// Returns true for the volume keys
    pub fn is_volume(&self) -> bool {
        matches!(self, KeyId::VolUp | KeyId::VolDown)
    }

    /// Volume direction as a signed step multiplier (-1, 0, or +1)
    pub fn volume_delta(&self) -> i8 {
        match self {
            KeyId::VolUp => 1,
            KeyId::VolDown => -1,
            _ => 0,
        }
    }
}

/// What happened to the key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum KeyAction {
    /// Key went down (short)
    Click,
    /// Key released after a short press
    ClickRelease,
    /// Key held (long press)
    Press,
    /// Key released after a long press
    PressRelease,
}

const ACTION_CLICK: u8 = 0x01;
const ACTION_CLICK_RELEASE: u8 = 0x02;
const ACTION_PRESS: u8 = 0x03;
const ACTION_PRESS_RELEASE: u8 = 0x04;

impl KeyAction {
    /// Parse an action from its wire format byte
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            ACTION_CLICK => Some(KeyAction::Click),
            ACTION_CLICK_RELEASE => Some(KeyAction::ClickRelease),
            ACTION_PRESS => Some(KeyAction::Press),
            ACTION_PRESS_RELEASE => Some(KeyAction::PressRelease),
            _ => None,
        }
    }

    /// Convert to wire format byte
    pub fn to_byte(self) -> u8 {
        match self {
            KeyAction::Click => ACTION_CLICK,
            KeyAction::ClickRelease => ACTION_CLICK_RELEASE,
            KeyAction::Press => ACTION_PRESS,
            KeyAction::PressRelease => ACTION_PRESS_RELEASE,
        }
    }
}

/// Key event envelope
///
/// Built fresh for every press and consumed once by the dispatcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct KeyEvent {
    /// Action type
    pub action: KeyAction,
    /// Which key fired
    pub key: KeyId,
    /// Payload length (always [`ENVELOPE_LEN`] for key events)
    pub len: u8,
    /// Source tag ([`SOURCE_NONE`] for on-screen buttons)
    pub source: u8,
}

impl KeyEvent {
    /// Envelope for a short press released on `key`
    pub const fn click_release(key: KeyId) -> Self {
        Self {
            action: KeyAction::ClickRelease,
            key,
            len: ENVELOPE_LEN,
            source: SOURCE_NONE,
        }
    }
}

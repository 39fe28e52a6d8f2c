//! Parser for `board.toml`
//!
//! A minimal line-based parser for the TOML subset the board file uses.
//!
//! Supported features:
//! - `[section]` headers (`display`, `touch`, `audio`, `playlist`)
//! - `key = value` pairs (string, integer, boolean)
//! - Single-line string arrays: `tracks = ["a.mp3", "b.mp3"]`
//! - Underscore digit separators: `40_000_000`
//! - Comments (`# ...`), including trailing ones
//!
//! Unknown keys are skipped so older firmware accepts newer files.

use heapless::String;

use super::types::{BoardConfig, QueuePolicy, Rotation, MAX_NAME_LEN, MAX_VOLUME};

/// Parse error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ParseError {
    /// Unknown or malformed section header
    InvalidSection,
    /// Value has the wrong type or syntax
    InvalidValue,
    /// Numeric value outside the accepted range
    OutOfRange,
    /// String longer than its fixed capacity
    TooLong,
    /// Too many items (exceeded heapless capacity)
    TooManyItems,
}

/// Current parsing context
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Root,
    Display,
    Touch,
    Audio,
    Playlist,
}

/// Parse `board.toml` content into a [`BoardConfig`]
pub fn parse_config(input: &str) -> Result<BoardConfig, ParseError> {
    let mut config = BoardConfig::new();
    let mut section = Section::Root;

    for line in input.lines() {
        let line = line.trim();

        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        if line.starts_with('[') {
            let header = strip_comment(line).trim();
            if !header.ends_with(']') {
                return Err(ParseError::InvalidSection);
            }
            section = parse_section_header(&header[1..header.len() - 1])?;
            continue;
        }

        let (key, value) = parse_key_value(line).ok_or(ParseError::InvalidValue)?;
        apply_value(section, key, value, &mut config)?;
    }

    validate(&config)?;
    Ok(config)
}

fn parse_section_header(header: &str) -> Result<Section, ParseError> {
    match header.trim() {
        "display" => Ok(Section::Display),
        "touch" => Ok(Section::Touch),
        "audio" => Ok(Section::Audio),
        "playlist" => Ok(Section::Playlist),
        _ => Err(ParseError::InvalidSection),
    }
}

/// Cut a trailing `# comment` that is not inside a string
fn strip_comment(value: &str) -> &str {
    let mut in_string = false;
    for (i, ch) in value.char_indices() {
        match ch {
            '"' => in_string = !in_string,
            '#' if !in_string => return &value[..i],
            _ => {}
        }
    }
    value
}

fn parse_key_value(line: &str) -> Option<(&str, &str)> {
    let (key, value) = line.split_once('=')?;
    let key = key.trim();
    let value = strip_comment(value).trim();

    if key.is_empty() || value.is_empty() {
        return None;
    }

    Some((key, value))
}

fn parse_string(value: &str) -> Result<&str, ParseError> {
    let inner = value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .ok_or(ParseError::InvalidValue)?;
    if inner.contains('"') {
        return Err(ParseError::InvalidValue);
    }
    Ok(inner)
}

fn parse_int<T: TryFrom<u64>>(value: &str) -> Result<T, ParseError> {
    let mut digits = 0usize;
    let mut acc: u64 = 0;

    for ch in value.chars() {
        if ch == '_' {
            continue;
        }
        let digit = ch.to_digit(10).ok_or(ParseError::InvalidValue)?;
        acc = acc
            .checked_mul(10)
            .and_then(|a| a.checked_add(u64::from(digit)))
            .ok_or(ParseError::OutOfRange)?;
        digits += 1;
    }

    if digits == 0 {
        return Err(ParseError::InvalidValue);
    }

    T::try_from(acc).map_err(|_| ParseError::OutOfRange)
}

fn parse_bool(value: &str) -> Result<bool, ParseError> {
    match value {
        "true" => Ok(true),
        "false" => Ok(false),
        _ => Err(ParseError::InvalidValue),
    }
}

/// Call `f` for each string in a one-line array like `["a", "b",]`
fn parse_string_array<'a>(
    value: &'a str,
    mut f: impl FnMut(&'a str) -> Result<(), ParseError>,
) -> Result<(), ParseError> {
    let inner = value
        .strip_prefix('[')
        .and_then(|v| v.strip_suffix(']'))
        .ok_or(ParseError::InvalidValue)?;

    let mut rest = inner.trim_start();
    while !rest.is_empty() {
        let body = rest.strip_prefix('"').ok_or(ParseError::InvalidValue)?;
        let end = body.find('"').ok_or(ParseError::InvalidValue)?;
        f(&body[..end])?;

        rest = body[end + 1..].trim_start();
        match rest.strip_prefix(',') {
            Some(after) => rest = after.trim_start(),
            None if rest.is_empty() => {}
            None => return Err(ParseError::InvalidValue),
        }
    }

    Ok(())
}

fn bounded_string<const N: usize>(value: &str) -> Result<String<N>, ParseError> {
    let mut s = String::new();
    s.push_str(value).map_err(|_| ParseError::TooLong)?;
    Ok(s)
}

fn apply_value(
    section: Section,
    key: &str,
    value: &str,
    config: &mut BoardConfig,
) -> Result<(), ParseError> {
    match section {
        Section::Display => {
            let display = &mut config.display;
            match key {
                "width" => display.width = parse_int(value)?,
                "height" => display.height = parse_int(value)?,
                "draw_buffer_lines" => display.draw_buffer_lines = parse_int(value)?,
                "double_buffer" => display.double_buffer = parse_bool(value)?,
                "rotation" => {
                    display.rotation =
                        Rotation::from_name(parse_string(value)?).ok_or(ParseError::InvalidValue)?
                }
                "spi_hz" => display.spi_hz = parse_int(value)?,
                "lock_timeout_ms" => display.lock_timeout_ms = parse_int(value)?,
                _ => {}
            }
        }
        Section::Touch => {
            let touch = &mut config.touch;
            match key {
                "x_min" => touch.x_min = parse_int(value)?,
                "x_max" => touch.x_max = parse_int(value)?,
                "y_min" => touch.y_min = parse_int(value)?,
                "y_max" => touch.y_max = parse_int(value)?,
                "swap_xy" => touch.swap_xy = parse_bool(value)?,
                "invert_x" => touch.invert_x = parse_bool(value)?,
                "invert_y" => touch.invert_y = parse_bool(value)?,
                "pressure_threshold" => touch.pressure_threshold = parse_int(value)?,
                _ => {}
            }
        }
        Section::Audio => {
            let audio = &mut config.audio;
            match key {
                "initial_volume" => audio.initial_volume = parse_int(value)?,
                "volume_step" => audio.volume_step = parse_int(value)?,
                "queue_policy" => {
                    audio.queue_policy = QueuePolicy::from_name(parse_string(value)?)
                        .ok_or(ParseError::InvalidValue)?
                }
                _ => {}
            }
        }
        Section::Playlist => {
            if key == "tracks" {
                let tracks = &mut config.playlist.tracks;
                tracks.clear();
                parse_string_array(value, |name| {
                    let name = bounded_string::<MAX_NAME_LEN>(name)?;
                    tracks.push(name).map_err(|_| ParseError::TooManyItems)
                })?;
            }
        }
        // Keys before the first header are not part of the board format
        Section::Root => {}
    }

    Ok(())
}

fn validate(config: &BoardConfig) -> Result<(), ParseError> {
    let display = &config.display;
    if display.width == 0 || display.height == 0 {
        return Err(ParseError::OutOfRange);
    }
    if display.draw_buffer_lines == 0 || display.draw_buffer_lines > display.height {
        return Err(ParseError::OutOfRange);
    }

    let touch = &config.touch;
    if touch.x_min >= touch.x_max || touch.y_min >= touch.y_max {
        return Err(ParseError::OutOfRange);
    }

    let audio = &config.audio;
    if audio.initial_volume > MAX_VOLUME || audio.volume_step == 0 || audio.volume_step > MAX_VOLUME
    {
        return Err(ParseError::OutOfRange);
    }

    Ok(())
}

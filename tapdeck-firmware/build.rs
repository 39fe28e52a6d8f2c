//! Build script for tapdeck-firmware
//!
//! - Sets up linker search paths for memory.x
//! - Validates board.toml at compile time

use std::env;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Sections the firmware understands
const SECTIONS: [&str; 4] = ["display", "touch", "audio", "playlist"];

/// Playlist capacity in the firmware
const MAX_TRACKS: usize = 32;

/// Longest track name the firmware stores
const MAX_NAME_LEN: usize = 48;

fn main() {
    setup_linker();
    validate_config();
}

/// Set up linker search paths and scripts
fn setup_linker() {
    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());

    // Copy memory.x to the output directory
    let memory_x = include_bytes!("memory.x");
    let mut f = File::create(out_dir.join("memory.x")).unwrap();
    f.write_all(memory_x).unwrap();

    // Tell rustc where to find memory.x
    println!("cargo:rustc-link-search={}", out_dir.display());

    println!("cargo:rustc-link-arg-bins=--nmagic");
    println!("cargo:rustc-link-arg-bins=-Tlink.x");
    println!("cargo:rustc-link-arg-bins=-Tlink-rp.x");
    if env::var_os("CARGO_FEATURE_DEFMT").is_some() {
        println!("cargo:rustc-link-arg-bins=-Tdefmt.x");
    }

    // Re-run if memory.x changes
    println!("cargo:rerun-if-changed=memory.x");
    println!("cargo:rerun-if-changed=build.rs");
}

/// Validate board.toml configuration at compile time
fn validate_config() {
    println!("cargo:rerun-if-changed=board.toml");

    let config_path = Path::new("board.toml");

    if !config_path.exists() {
        panic!(
            "\n\
            ╔══════════════════════════════════════════════════════════════════╗\n\
            ║  ERROR: board.toml not found!                                    ║\n\
            ║                                                                  ║\n\
            ║  The firmware embeds board.toml at build time.                   ║\n\
            ║  Please create one in the tapdeck-firmware directory.            ║\n\
            ╚══════════════════════════════════════════════════════════════════╝\n"
        );
    }

    let config_content = match fs::read_to_string(config_path) {
        Ok(content) => content,
        Err(e) => {
            panic!(
                "\n\
                ╔══════════════════════════════════════════════════════════════════╗\n\
                ║  ERROR: Failed to read board.toml                                ║\n\
                ║                                                                  ║\n\
                ║  Error: {:<56} ║\n\
                ╚══════════════════════════════════════════════════════════════════╝\n",
                e
            );
        }
    };

    let config: toml::Value = match toml::from_str(&config_content) {
        Ok(value) => value,
        Err(e) => {
            let error_msg = e.to_string();
            panic!(
                "\n\
                ╔══════════════════════════════════════════════════════════════════╗\n\
                ║  ERROR: Invalid TOML syntax in board.toml                        ║\n\
                ╠══════════════════════════════════════════════════════════════════╣\n\
                ║                                                                  ║\n\
                {}\n\
                ║                                                                  ║\n\
                ╚══════════════════════════════════════════════════════════════════╝\n",
                format_error_lines(&error_msg)
            );
        }
    };

    let mut errors = Vec::new();
    validate_sections(&config, &mut errors);
    validate_display(&config, &mut errors);
    validate_touch(&config, &mut errors);
    validate_audio(&config, &mut errors);
    validate_playlist(&config, &mut errors);

    if !errors.is_empty() {
        panic!(
            "\n\
            ╔══════════════════════════════════════════════════════════════════╗\n\
            ║  ERROR: Invalid board configuration                              ║\n\
            ╠══════════════════════════════════════════════════════════════════╣\n\
            {}\n\
            ╚══════════════════════════════════════════════════════════════════╝\n",
            errors
                .iter()
                .map(|e| format!("║  • {:<62} ║", e))
                .collect::<Vec<_>>()
                .join("\n")
        );
    }

    println!("cargo:warning=board.toml validated successfully");
}

/// Format error message lines with box drawing
fn format_error_lines(msg: &str) -> String {
    msg.lines()
        .map(|line| {
            let truncated = if line.chars().count() > 64 {
                format!("{}...", line.chars().take(61).collect::<String>())
            } else {
                line.to_string()
            };
            format!("║  {:<64} ║", truncated)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn section<'a>(config: &'a toml::Value, name: &str) -> Option<&'a toml::value::Table> {
    config.get(name).and_then(|v| v.as_table())
}

fn check_int(
    table: &toml::value::Table,
    section: &str,
    key: &str,
    min: i64,
    max: i64,
    errors: &mut Vec<String>,
) -> Option<i64> {
    match table.get(key) {
        None => None,
        Some(toml::Value::Integer(v)) if (min..=max).contains(v) => Some(*v),
        Some(toml::Value::Integer(_)) => {
            errors.push(format!("[{}] {} must be {}-{}", section, key, min, max));
            None
        }
        Some(_) => {
            errors.push(format!("[{}] {} must be an integer", section, key));
            None
        }
    }
}

fn check_bool(table: &toml::value::Table, section: &str, key: &str, errors: &mut Vec<String>) {
    if let Some(v) = table.get(key) {
        if !v.is_bool() {
            errors.push(format!("[{}] {} must be true or false", section, key));
        }
    }
}

fn check_choice(
    table: &toml::value::Table,
    section: &str,
    key: &str,
    choices: &[&str],
    errors: &mut Vec<String>,
) {
    match table.get(key) {
        None => {}
        Some(toml::Value::String(s)) if choices.contains(&s.as_str()) => {}
        Some(_) => errors.push(format!("[{}] {} must be one of {}", section, key, choices.join(", "))),
    }
}

/// Reject sections the firmware does not know
fn validate_sections(config: &toml::Value, errors: &mut Vec<String>) {
    let Some(root) = config.as_table() else {
        return;
    };
    for (name, value) in root {
        if !SECTIONS.contains(&name.as_str()) {
            errors.push(format!("unknown section [{}]", name));
        } else if !value.is_table() {
            errors.push(format!("[{}] must be a table", name));
        }
    }
}

fn validate_display(config: &toml::Value, errors: &mut Vec<String>) {
    let Some(display) = section(config, "display") else {
        return;
    };

    check_int(display, "display", "width", 1, 480, errors);
    let height = check_int(display, "display", "height", 1, 480, errors).unwrap_or(320);
    check_int(display, "display", "draw_buffer_lines", 1, height, errors);
    check_int(display, "display", "spi_hz", 1, 62_500_000, errors);
    check_int(display, "display", "lock_timeout_ms", 1, 60_000, errors);
    check_bool(display, "display", "double_buffer", errors);
    check_choice(
        display,
        "display",
        "rotation",
        &["landscape", "landscape-flipped", "portrait", "portrait-flipped"],
        errors,
    );
}

fn validate_touch(config: &toml::Value, errors: &mut Vec<String>) {
    let Some(touch) = section(config, "touch") else {
        return;
    };

    let x_min = check_int(touch, "touch", "x_min", 0, 4095, errors).unwrap_or(200);
    let x_max = check_int(touch, "touch", "x_max", 0, 4095, errors).unwrap_or(3900);
    let y_min = check_int(touch, "touch", "y_min", 0, 4095, errors).unwrap_or(200);
    let y_max = check_int(touch, "touch", "y_max", 0, 4095, errors).unwrap_or(3900);
    if x_min >= x_max {
        errors.push("[touch] x_min must be below x_max".to_string());
    }
    if y_min >= y_max {
        errors.push("[touch] y_min must be below y_max".to_string());
    }
    check_int(touch, "touch", "pressure_threshold", 0, 4095, errors);
    for key in ["swap_xy", "invert_x", "invert_y"] {
        check_bool(touch, "touch", key, errors);
    }
}

fn validate_audio(config: &toml::Value, errors: &mut Vec<String>) {
    let Some(audio) = section(config, "audio") else {
        return;
    };

    check_int(audio, "audio", "initial_volume", 0, 100, errors);
    check_int(audio, "audio", "volume_step", 1, 100, errors);
    check_choice(
        audio,
        "audio",
        "queue_policy",
        &["drop-newest", "drop-oldest"],
        errors,
    );
}

fn validate_playlist(config: &toml::Value, errors: &mut Vec<String>) {
    let Some(playlist) = section(config, "playlist") else {
        return;
    };

    match playlist.get("tracks") {
        None => {}
        Some(toml::Value::Array(tracks)) => {
            if tracks.len() > MAX_TRACKS {
                errors.push(format!("[playlist] at most {} tracks", MAX_TRACKS));
            }
            for (i, track) in tracks.iter().enumerate() {
                match track.as_str() {
                    Some(name) if name.is_empty() => {
                        errors.push(format!("[playlist] track {} is empty", i));
                    }
                    Some(name) if name.len() > MAX_NAME_LEN => {
                        errors.push(format!(
                            "[playlist] track {} longer than {} bytes",
                            i, MAX_NAME_LEN
                        ));
                    }
                    Some(_) => {}
                    None => errors.push(format!("[playlist] track {} must be a string", i)),
                }
            }
        }
        Some(_) => errors.push("[playlist] tracks must be an array".to_string()),
    }
}

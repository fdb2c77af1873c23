//! Build script for ionos-firmware
//!
//! - Sets up linker search paths for memory.x
//! - Validates device.toml at compile time
//! - Emits the validated values as constants (`device_config.rs` in OUT_DIR)

use std::env;
use std::fmt::Write as _;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

const BUTTONS: [&str; 6] = ["up", "down", "left", "right", "select", "back"];

const EASINGS: [(&str, &str); 7] = [
    ("linear", "Linear"),
    ("in_quad", "InQuad"),
    ("out_quad", "OutQuad"),
    ("in_out_quad", "InOutQuad"),
    ("in_cubic", "InCubic"),
    ("out_cubic", "OutCubic"),
    ("in_out_cubic", "InOutCubic"),
];

fn main() {
    setup_linker();
    let config = validate_config();
    generate_constants(&config);
}

/// Set up linker search paths for memory.x
fn setup_linker() {
    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());

    // Copy memory.x to the output directory
    let memory_x = include_bytes!("memory.x");
    let mut f = File::create(out_dir.join("memory.x")).unwrap();
    f.write_all(memory_x).unwrap();

    // Tell rustc where to find memory.x
    println!("cargo:rustc-link-search={}", out_dir.display());

    println!("cargo:rerun-if-changed=memory.x");
    println!("cargo:rerun-if-changed=build.rs");
}

/// Validate device.toml configuration at compile time
fn validate_config() -> toml::Value {
    println!("cargo:rerun-if-changed=device.toml");

    let config_path = Path::new("device.toml");

    if !config_path.exists() {
        panic!(
            "\n\
            ╔══════════════════════════════════════════════════════════════════╗\n\
            ║  ERROR: device.toml not found!                                   ║\n\
            ║                                                                  ║\n\
            ║  The firmware requires a device.toml configuration file.         ║\n\
            ║  Please create one in the ionos-firmware directory.              ║\n\
            ╚══════════════════════════════════════════════════════════════════╝\n"
        );
    }

    let config_content = match fs::read_to_string(config_path) {
        Ok(content) => content,
        Err(e) => {
            panic!(
                "\n\
                ╔══════════════════════════════════════════════════════════════════╗\n\
                ║  ERROR: Failed to read device.toml                               ║\n\
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
                ║  ERROR: Invalid TOML syntax in device.toml                       ║\n\
                ╠══════════════════════════════════════════════════════════════════╣\n\
                ║                                                                  ║\n\
                {}\n\
                ║                                                                  ║\n\
                ╚══════════════════════════════════════════════════════════════════╝\n",
                format_error_lines(&error_msg)
            );
        }
    };

    validate_required_sections(&config);

    validate_display(&config);
    validate_timing(&config);
    validate_buttons(&config);
    validate_battery(&config);

    println!("cargo:warning=device.toml validated successfully");
    config
}

/// Format error message lines with box drawing
fn format_error_lines(msg: &str) -> String {
    msg.lines()
        .map(|line| {
            let truncated = if line.len() > 64 {
                format!("{}...", &line[..61])
            } else {
                line.to_string()
            };
            format!("║  {:<64} ║", truncated)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Abort the build listing every problem found in one section
fn report_errors(title: &str, errors: &[String]) {
    if errors.is_empty() {
        return;
    }

    panic!(
        "\n\
        ╔══════════════════════════════════════════════════════════════════╗\n\
        ║  ERROR: {:<56} ║\n\
        ╠══════════════════════════════════════════════════════════════════╣\n\
        {}\n\
        ╚══════════════════════════════════════════════════════════════════╝\n",
        title,
        errors
            .iter()
            .map(|e| format!("║  • {:<62} ║", e))
            .collect::<Vec<_>>()
            .join("\n")
    );
}

/// Validate that required sections exist
fn validate_required_sections(config: &toml::Value) {
    let errors: Vec<String> = ["device", "display", "timing", "buttons", "battery"]
        .iter()
        .filter(|section| !matches!(config.get(**section), Some(toml::Value::Table(_))))
        .map(|section| format!("Missing [{}] section", section))
        .collect();

    report_errors("Missing required sections in device.toml", &errors);
}

fn section<'a>(config: &'a toml::Value, name: &str) -> &'a toml::value::Table {
    // Presence was checked by validate_required_sections
    config.get(name).and_then(|v| v.as_table()).unwrap()
}

/// Check an integer field is present and within `min..=max`
fn check_range(
    errors: &mut Vec<String>,
    table: &toml::value::Table,
    section: &str,
    key: &str,
    min: i64,
    max: i64,
) {
    match table.get(key) {
        Some(toml::Value::Integer(v)) if (min..=max).contains(v) => {}
        Some(toml::Value::Integer(_)) => {
            errors.push(format!("[{}] {} must be {}-{}", section, key, min, max))
        }
        Some(_) => errors.push(format!("[{}] {} must be an integer", section, key)),
        None => errors.push(format!("[{}] missing '{}'", section, key)),
    }
}

fn int(table: &toml::value::Table, key: &str) -> i64 {
    table.get(key).and_then(|v| v.as_integer()).unwrap_or(0)
}

fn validate_display(config: &toml::Value) {
    let display = section(config, "display");
    let mut errors = Vec::new();

    check_range(&mut errors, display, "display", "i2c_address", 0x08, 0x77);
    check_range(&mut errors, display, "display", "column_offset", 0, 4);
    check_range(&mut errors, display, "display", "contrast", 0, 255);

    report_errors("Invalid display configuration", &errors);
}

fn validate_timing(config: &toml::Value) {
    let timing = section(config, "timing");
    let mut errors = Vec::new();

    check_range(&mut errors, timing, "timing", "tick_ms", 1, 1000);
    check_range(&mut errors, timing, "timing", "transition_ms", 0, 5000);
    check_range(&mut errors, timing, "timing", "max_events_per_tick", 1, 32);

    match timing.get("easing") {
        Some(toml::Value::String(name)) => {
            if !EASINGS.iter().any(|(key, _)| key == name) {
                errors.push(format!("[timing] unknown easing '{}'", name));
            }
        }
        Some(_) => errors.push("[timing] easing must be a string".to_string()),
        None => errors.push("[timing] missing 'easing'".to_string()),
    }

    report_errors("Invalid timing configuration", &errors);
}

fn validate_buttons(config: &toml::Value) {
    let buttons = section(config, "buttons");
    let mut errors = Vec::new();

    check_range(&mut errors, buttons, "buttons", "debounce_ms", 1, 200);
    check_range(&mut errors, buttons, "buttons", "long_press_ms", 100, 5000);
    check_range(&mut errors, buttons, "buttons", "repeat_delay_ms", 0, 5000);
    check_range(&mut errors, buttons, "buttons", "repeat_rate_ms", 10, 2000);

    if int(buttons, "debounce_ms") >= int(buttons, "long_press_ms") {
        errors.push("[buttons] debounce_ms must be below long_press_ms".to_string());
    }

    match buttons.get("repeat") {
        Some(toml::Value::Array(names)) => {
            for name in names {
                match name.as_str() {
                    Some(n) if BUTTONS.contains(&n) => {}
                    _ => errors.push(format!("[buttons] unknown repeat button {}", name)),
                }
            }
        }
        Some(_) => errors.push("[buttons] repeat must be an array".to_string()),
        None => {}
    }

    match buttons.get("polarity").and_then(|v| v.as_str()) {
        Some("active_low") | Some("active_high") => {}
        _ => errors.push("[buttons] polarity must be 'active_low' or 'active_high'".to_string()),
    }

    report_errors("Invalid button configuration", &errors);
}

fn validate_battery(config: &toml::Value) {
    let battery = section(config, "battery");
    let mut errors = Vec::new();

    check_range(&mut errors, battery, "battery", "divider", 1, 10);
    check_range(&mut errors, battery, "battery", "sample_ms", 100, 60_000);
    check_range(&mut errors, battery, "battery", "low_mv", 2500, 4500);
    check_range(&mut errors, battery, "battery", "recover_mv", 2500, 4500);

    if int(battery, "recover_mv") <= int(battery, "low_mv") {
        errors.push("[battery] recover_mv must be above low_mv".to_string());
    }

    report_errors("Invalid battery configuration", &errors);
}

/// Write the validated values as Rust constants
fn generate_constants(config: &toml::Value) {
    let device = section(config, "device");
    let display = section(config, "display");
    let timing = section(config, "timing");
    let buttons = section(config, "buttons");
    let battery = section(config, "battery");

    let name = device
        .get("name")
        .and_then(|v| v.as_str())
        .unwrap_or("ionOS");

    let easing = timing
        .get("easing")
        .and_then(|v| v.as_str())
        .and_then(|key| EASINGS.iter().find(|(k, _)| *k == key))
        .map(|(_, variant)| *variant)
        .unwrap();

    let repeat_bits = buttons
        .get("repeat")
        .and_then(|v| v.as_array())
        .map(|names| {
            names
                .iter()
                .filter_map(|n| n.as_str())
                .filter_map(|n| BUTTONS.iter().position(|b| *b == n))
                .fold(0u8, |bits, i| bits | (1 << i))
        })
        .unwrap_or(0);

    let active_low = buttons.get("polarity").and_then(|v| v.as_str()) == Some("active_low");

    let mut out = String::new();
    writeln!(out, "// Generated from device.toml by build.rs").unwrap();
    writeln!(out, "pub const DEVICE_NAME: &str = {:?};", name).unwrap();
    writeln!(out, "pub const DISPLAY_I2C_ADDRESS: u8 = {};", int(display, "i2c_address")).unwrap();
    writeln!(out, "pub const DISPLAY_COLUMN_OFFSET: u8 = {};", int(display, "column_offset")).unwrap();
    writeln!(out, "pub const DISPLAY_CONTRAST: u8 = {};", int(display, "contrast")).unwrap();
    writeln!(out, "pub const TICK_MS: u32 = {};", int(timing, "tick_ms")).unwrap();
    writeln!(out, "pub const TRANSITION_MS: u32 = {};", int(timing, "transition_ms")).unwrap();
    writeln!(out, "pub const EASING: Easing = Easing::{};", easing).unwrap();
    writeln!(out, "pub const MAX_EVENTS_PER_TICK: usize = {};", int(timing, "max_events_per_tick")).unwrap();
    writeln!(out, "pub const DEBOUNCE_MS: u32 = {};", int(buttons, "debounce_ms")).unwrap();
    writeln!(out, "pub const LONG_PRESS_MS: u32 = {};", int(buttons, "long_press_ms")).unwrap();
    writeln!(out, "pub const REPEAT_DELAY_MS: u32 = {};", int(buttons, "repeat_delay_ms")).unwrap();
    writeln!(out, "pub const REPEAT_RATE_MS: u32 = {};", int(buttons, "repeat_rate_ms")).unwrap();
    writeln!(out, "pub const REPEAT_MASK_BITS: u8 = {:#08b};", repeat_bits).unwrap();
    writeln!(out, "pub const BUTTONS_ACTIVE_LOW: bool = {};", active_low).unwrap();
    writeln!(out, "pub const BATTERY_DIVIDER: u32 = {};", int(battery, "divider")).unwrap();
    writeln!(out, "pub const BATTERY_SAMPLE_MS: u64 = {};", int(battery, "sample_ms")).unwrap();
    writeln!(out, "pub const BATTERY_LOW_MV: u32 = {};", int(battery, "low_mv")).unwrap();
    writeln!(out, "pub const BATTERY_RECOVER_MV: u32 = {};", int(battery, "recover_mv")).unwrap();

    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());
    fs::write(out_dir.join("device_config.rs"), out).unwrap();
}

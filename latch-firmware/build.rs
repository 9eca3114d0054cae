//! Build script for latch-firmware
//!
//! - Sets up linker search paths for memory.x
//! - Validates board.toml at compile time
//! - Generates `board.rs` with the board constants

use std::env;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Highest absolute pin number on the nRF52840 (P1.15)
const MAX_PIN: i64 = 47;

/// Port-event slots available to low-accuracy inputs
const MAX_GPIO_SLOTS: i64 = 4;

/// Lowest NVIC priority with 3 priority bits
const MAX_PRIORITY: i64 = 7;

/// Label capacity of the firmware configuration types
const MAX_LABEL_LEN: usize = 16;

const SENSES: [(&str, &str); 4] = [
    ("none", "Polarity::None"),
    ("lotohi", "Polarity::LoToHi"),
    ("hitolo", "Polarity::HiToLo"),
    ("toggle", "Polarity::Toggle"),
];

const REGIONS: [(&str, &str); 6] = [
    ("user0", "Region::User0"),
    ("user1", "Region::User1"),
    ("user2", "Region::User2"),
    ("user3", "Region::User3"),
    ("peripheral0", "Region::Peripheral0"),
    ("peripheral1", "Region::Peripheral1"),
];

fn main() {
    setup_linker();
    let config = load_config();
    validate_config(&config);
    generate_board(&config);
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
    println!("cargo:rustc-link-arg-bins=--nmagic");
    println!("cargo:rustc-link-arg-bins=-Tlink.x");
    if env::var_os("CARGO_FEATURE_DEFMT").is_some() {
        println!("cargo:rustc-link-arg-bins=-Tdefmt.x");
    }

    println!("cargo:rerun-if-changed=memory.x");
    println!("cargo:rerun-if-changed=build.rs");
}

/// Read and parse board.toml
fn load_config() -> toml::Value {
    println!("cargo:rerun-if-changed=board.toml");

    let config_path = Path::new("board.toml");
    if !config_path.exists() {
        panic!(
            "\n\
            ╔══════════════════════════════════════════════════════════════════╗\n\
            ║  ERROR: board.toml not found!                                    ║\n\
            ║                                                                  ║\n\
            ║  The firmware requires a board.toml configuration file.          ║\n\
            ║  Please create one in the latch-firmware directory.              ║\n\
            ╚══════════════════════════════════════════════════════════════════╝\n"
        );
    }

    let content = match fs::read_to_string(config_path) {
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

    match toml::from_str(&content) {
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
    }
}

/// Validate board.toml at compile time
fn validate_config(config: &toml::Value) {
    if config.get("board").and_then(|b| b.as_table()).is_none() {
        report("Missing required sections in board.toml", &["Missing [board] section".to_string()]);
    }

    validate_board(config);
    validate_gpiote(config);
    validate_pins(config);
    validate_watches(config);

    println!("cargo:warning=board.toml validated successfully");
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

/// Abort the build with a boxed list of errors
fn report(title: &str, errors: &[String]) {
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

fn validate_board(config: &toml::Value) {
    let mut errors = Vec::new();

    match config.get("board").and_then(|b| b.get("name")) {
        Some(toml::Value::String(name)) => {
            if name.is_empty() || name.len() > MAX_LABEL_LEN {
                errors.push(format!("[board] name must be 1-{} characters", MAX_LABEL_LEN));
            }
        }
        Some(_) => errors.push("[board] name must be a string".to_string()),
        None => errors.push("[board] missing 'name'".to_string()),
    }

    report("Invalid board configuration", &errors);
}

fn validate_gpiote(config: &toml::Value) {
    let gpiote = match config.get("gpiote") {
        Some(toml::Value::Table(t)) => t,
        Some(_) => {
            report("Invalid gpiote configuration", &["[gpiote] must be a table".to_string()]);
            return;
        }
        None => return,
    };

    let mut errors = Vec::new();

    match gpiote.get("gpio_slots") {
        Some(toml::Value::Integer(slots)) if (0..=MAX_GPIO_SLOTS).contains(slots) => {}
        Some(_) => errors.push(format!("[gpiote] gpio_slots must be 0-{}", MAX_GPIO_SLOTS)),
        None => {}
    }

    match gpiote.get("irq_priority") {
        Some(toml::Value::Integer(priority)) if (0..=MAX_PRIORITY).contains(priority) => {}
        Some(_) => errors.push(format!("[gpiote] irq_priority must be 0-{}", MAX_PRIORITY)),
        None => {}
    }

    report("Invalid gpiote configuration", &errors);
}

/// Validate [button] and [led]
fn validate_pins(config: &toml::Value) {
    let mut errors = Vec::new();
    let mut used: Vec<(i64, &str)> = Vec::new();

    for section in ["button", "led"] {
        let table = match config.get(section) {
            Some(toml::Value::Table(t)) => t,
            Some(_) => {
                errors.push(format!("[{}] must be a table", section));
                continue;
            }
            None => continue,
        };

        match table.get("pin") {
            Some(toml::Value::Integer(pin)) if (0..=MAX_PIN).contains(pin) => {
                if let Some((_, other)) = used.iter().find(|(p, _)| p == pin) {
                    errors.push(format!("[{}] pin {} is already used by [{}]", section, pin, other));
                }
                used.push((*pin, section));
            }
            Some(_) => errors.push(format!("[{}] pin must be 0-{}", section, MAX_PIN)),
            None => errors.push(format!("[{}] missing 'pin'", section)),
        }

        for flag in ["inverted", "pull_up", "hi_accuracy"] {
            if table.get(flag).is_some_and(|v| v.as_bool().is_none()) {
                errors.push(format!("[{}] {} must be true or false", section, flag));
            }
        }

        if let Some(sense) = table.get("sense") {
            let known = sense
                .as_str()
                .is_some_and(|s| SENSES.iter().any(|(name, _)| *name == s));
            if !known {
                errors.push(format!(
                    "[{}] sense must be 'none', 'lotohi', 'hitolo' or 'toggle'",
                    section
                ));
            }
        }
    }

    report("Invalid pin configuration", &errors);
}

/// Validate [watch.*]
fn validate_watches(config: &toml::Value) {
    let watches = match config.get("watch") {
        Some(toml::Value::Table(t)) => t,
        _ => return,
    };

    let mut errors = Vec::new();
    let mut regions: Vec<&str> = Vec::new();

    for (name, watch) in watches {
        let watch = match watch {
            toml::Value::Table(t) => t,
            _ => {
                errors.push(format!("[watch.{}] must be a table", name));
                continue;
            }
        };

        if name.len() > MAX_LABEL_LEN {
            errors.push(format!("[watch.{}] name is longer than {}", name, MAX_LABEL_LEN));
        }

        let region = match watch.get("region").and_then(|r| r.as_str()) {
            Some(region) if REGIONS.iter().any(|(n, _)| *n == region) => region,
            Some(_) => {
                errors.push(format!("[watch.{}] unknown region", name));
                continue;
            }
            None => {
                errors.push(format!("[watch.{}] missing 'region'", name));
                continue;
            }
        };
        if regions.contains(&region) {
            errors.push(format!("[watch.{}] region {} is watched twice", name, region));
        }
        regions.push(region);

        let address = |key: &str| match watch.get(key) {
            Some(toml::Value::Integer(v)) if (0..=u32::MAX as i64).contains(v) => Ok(Some(*v)),
            Some(_) => Err(format!("[watch.{}] {} must be a 32-bit address", name, key)),
            None => Ok(None),
        };

        if region.starts_with("user") {
            match (address("start"), address("end")) {
                (Ok(Some(start)), Ok(Some(end))) => {
                    if start > end {
                        errors.push(format!("[watch.{}] start must not be after end", name));
                    }
                }
                (Err(e), _) | (_, Err(e)) => errors.push(e),
                _ => errors.push(format!("[watch.{}] user regions need 'start' and 'end'", name)),
            }
            if watch.contains_key("subregions") {
                errors.push(format!("[watch.{}] subregions apply to peripheral regions", name));
            }
        } else {
            if watch.contains_key("start") || watch.contains_key("end") {
                errors.push(format!("[watch.{}] peripheral regions have fixed ranges", name));
            }
            if let Err(e) = address("subregions") {
                errors.push(e);
            }
        }

        for flag in ["reads", "writes", "interrupt"] {
            if watch.get(flag).is_some_and(|v| v.as_bool().is_none()) {
                errors.push(format!("[watch.{}] {} must be true or false", name, flag));
            }
        }
    }

    report("Invalid watch configuration", &errors);
}

/// Write `board.rs` into OUT_DIR
/// Constructor expression for a button or LED pin
fn pin_config(pin: i64, inverted: bool, pull_up: bool) -> String {
    match (inverted, pull_up) {
        (false, false) => format!("PinConfig::new({})", pin),
        (true, false) => format!("PinConfig::inverted({})", pin),
        (true, true) => format!("PinConfig::active_low_pullup({})", pin),
        (false, true) => format!("PinConfig {{ pull_up: true, ..PinConfig::new({}) }}", pin),
    }
}

fn generate_board(config: &toml::Value) {
    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());
    let mut out = String::new();

    let name = config
        .get("board")
        .and_then(|b| b.get("name"))
        .and_then(|n| n.as_str())
        .unwrap_or_default();
    out.push_str(&format!("pub const BOARD_NAME: &str = {:?};\n", name));

    let gpiote = config.get("gpiote");
    let int = |key: &str, default: i64| {
        gpiote
            .and_then(|g| g.get(key))
            .and_then(|v| v.as_integer())
            .unwrap_or(default)
    };
    out.push_str(&format!("pub const GPIO_SLOTS: u8 = {};\n", int("gpio_slots", MAX_GPIO_SLOTS)));
    out.push_str(&format!("pub const IRQ_PRIORITY: u8 = {};\n", int("irq_priority", 6)));

    for section in ["button", "led"] {
        let upper = section.to_uppercase();
        let table = config.get(section);
        let flag = |key: &str| {
            table
                .and_then(|t| t.get(key))
                .and_then(|v| v.as_bool())
                .unwrap_or(false)
        };
        match table.and_then(|t| t.get("pin")).and_then(|p| p.as_integer()) {
            Some(pin) => out.push_str(&format!(
                "pub const {}: Option<PinConfig> = Some({});\n",
                upper,
                pin_config(pin, flag("inverted"), flag("pull_up"))
            )),
            None => out.push_str(&format!("pub const {}: Option<PinConfig> = None;\n", upper)),
        }
    }

    let button = config.get("button");
    let sense = button
        .and_then(|b| b.get("sense"))
        .and_then(|s| s.as_str())
        .and_then(|s| SENSES.iter().find(|(name, _)| *name == s))
        .map(|(_, path)| *path)
        .unwrap_or("Polarity::HiToLo");
    let hi_accuracy = button
        .and_then(|b| b.get("hi_accuracy"))
        .and_then(|v| v.as_bool())
        .unwrap_or(true);
    out.push_str(&format!("pub const BUTTON_SENSE: Polarity = {};\n", sense));
    out.push_str(&format!("pub const BUTTON_HI_ACCURACY: bool = {};\n", hi_accuracy));

    out.push_str("pub const WATCHES: &[WatchEntry] = &[\n");
    if let Some(watches) = config.get("watch").and_then(|w| w.as_table()) {
        for (label, watch) in watches {
            let region = watch
                .get("region")
                .and_then(|r| r.as_str())
                .and_then(|r| REGIONS.iter().find(|(name, _)| *name == r))
                .map(|(_, path)| *path)
                .unwrap_or("Region::User0");
            let int = |key: &str| watch.get(key).and_then(|v| v.as_integer()).unwrap_or(0);
            let flag = |key: &str, default: bool| {
                watch.get(key).and_then(|v| v.as_bool()).unwrap_or(default)
            };
            out.push_str(&format!(
                "    WatchEntry {{ label: {:?}, region: {}, start: {:#010x}, end: {:#010x}, reads: {}, writes: {}, subregions: {:#010x}, interrupt: {} }},\n",
                label,
                region,
                int("start"),
                int("end"),
                flag("reads", false),
                flag("writes", true),
                int("subregions"),
                flag("interrupt", true)
            ));
        }
    }
    out.push_str("];\n");

    fs::write(out_dir.join("board.rs"), out).unwrap();
}

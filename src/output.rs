//! User-facing output. Diagnostics go through `tracing`; everything the user
//! is meant to read goes through these helpers.

use std::io::IsTerminal;

use colored::*;

pub const ICON_SUCCESS: &str = "\u{2713}"; // ✓
pub const ICON_ERROR: &str = "\u{2717}"; // ✗
pub const ICON_WARN: &str = "\u{26a0}"; // ⚠
pub const ICON_INFO: &str = "\u{25b6}"; // ▶
pub const ICON_HINT: &str = "\u{00b7}"; // ·

const RULE_WIDTH: usize = 55;

/// Colour only when allowed by config and stdout is a terminal.
pub fn set_color(enabled: bool) {
    colored::control::set_override(enabled && std::io::stdout().is_terminal());
}

/// ✓ message
pub fn success(msg: &str) {
    println!("{} {}", ICON_SUCCESS.green(), msg);
}

/// ✗ message, on stderr
pub fn error(msg: &str) {
    eprintln!("{} {}", ICON_ERROR.red(), msg);
}

/// ⚠ message
pub fn warn(msg: &str) {
    println!("{} {}", ICON_WARN.yellow(), msg);
}

/// ▶ message
pub fn info(msg: &str) {
    println!("{} {}", ICON_INFO.cyan(), msg);
}

pub fn hint(msg: &str) {
    println!("  {} {}", ICON_HINT.dimmed(), msg.dimmed());
}

pub fn header(msg: &str) {
    println!("{}", msg.cyan().bold());
}

pub fn rule() {
    println!("{}", "\u{2501}".repeat(RULE_WIDTH).dimmed());
}

/// Key/value line used by `status` and the `info` commands.
pub fn field(label: &str, value: &str) {
    println!("  {:<18}{}", format!("{label}:").bold(), value);
}

/// Empty-state message with an optional tip.
pub fn empty(msg: &str, tip: Option<&str>) {
    println!("{}", msg.yellow());
    if let Some(t) = tip {
        hint(t);
    }
}

//! Hex color parsing.
//!
//! Colors arrive as `RRGGBB` or `#RRGGBB` in any case. DrawingML wants bare
//! upper-case `RRGGBB`.

use regex::Regex;
use std::sync::LazyLock;

/// Color used for text when a run declares none or an unreadable one.
pub const DEFAULT_TEXT_COLOR: &str = "000000";

/// Regex matching a six digit hex color with an optional leading `#`.
static HEX_COLOR_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^#?([0-9A-Fa-f]{6})$").unwrap());

/// Normalize a hex color, returning `None` when it cannot be read.
pub fn normalize_hex(color: &str) -> Option<String> {
    HEX_COLOR_REGEX
        .captures(color.trim())
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_ascii_uppercase())
}

/// Normalize a hex color, substituting `fallback` when it cannot be read.
pub fn normalize_hex_or(color: &str, fallback: &str) -> String {
    normalize_hex(color).unwrap_or_else(|| {
        if !color.is_empty() {
            log::debug!("Unreadable color {:?}, using {}", color, fallback);
        }
        fallback.to_string()
    })
}

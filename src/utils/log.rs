//! Terminal logging with colored module prefixes.
//!
//! Provides the `log!` macro used across the crate:
//!
//! ```ignore
//! log!("scan"; "loaded {} namespaces", count);
//! ```
//!
//! Output is `[module] message` with the prefix colored per module and the
//! message truncated to the terminal width.

use colored::{ColoredString, Colorize};
use crossterm::terminal::size;
use std::{
    io::{Write, stdout},
    sync::OnceLock,
};

/// Cached terminal width (fetched once on first use)
static TERMINAL_WIDTH: OnceLock<u16> = OnceLock::new();

/// Display length of "[" + "]" + trailing space around a module name.
const PREFIX_DECORATION_LEN: usize = 3;

/// Get terminal width, cached after first call.
/// Falls back to 120 columns if detection fails.
fn get_terminal_width() -> u16 {
    *TERMINAL_WIDTH.get_or_init(|| size().map(|(w, _)| w).unwrap_or(120))
}

/// Log a message with a colored module prefix.
///
/// # Usage
/// ```ignore
/// log!("module"; "message with {} formatting", args);
/// ```
#[macro_export]
macro_rules! log {
    ($module:expr; $($arg:tt)*) => {{
        $crate::utils::log::log($module, &format!($($arg)*))
    }};
}

/// Log a message with a colored module prefix, truncated to fit the
/// terminal width.
pub fn log(module: &str, message: &str) {
    let prefix = colorize_prefix(module);
    let width = get_terminal_width() as usize;

    let max_msg_len = width.saturating_sub(module.len() + PREFIX_DECORATION_LEN);
    let message = truncate_str(message, max_msg_len);

    let mut stdout = stdout().lock();
    writeln!(stdout, "{prefix} {message}").ok();
    stdout.flush().ok();
}

/// Apply color to a module prefix based on module name.
fn colorize_prefix(module: &str) -> ColoredString {
    let prefix = format!("[{module}]");
    match module.to_ascii_lowercase().as_str() {
        "serve" => prefix.bright_blue().bold(),
        "watch" => prefix.bright_green().bold(),
        "check" => prefix.bright_cyan().bold(),
        "error" => prefix.bright_red().bold(),
        _ => prefix.bright_yellow().bold(),
    }
}

/// Truncate a string to fit within max_len bytes.
///
/// Ensures the result is valid UTF-8 by finding the nearest character boundary.
fn truncate_str(s: &str, max_len: usize) -> &str {
    if s.len() <= max_len {
        return s;
    }
    let mut end = max_len;
    while end > 0 && !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_str_short_string() {
        assert_eq!(truncate_str("hello", 10), "hello");
    }

    #[test]
    fn test_truncate_str_exact_length() {
        assert_eq!(truncate_str("hello", 5), "hello");
    }

    #[test]
    fn test_truncate_str_needs_truncation() {
        assert_eq!(truncate_str("hello world", 5), "hello");
    }

    #[test]
    fn test_truncate_str_unicode_boundary() {
        // "你好" is 6 bytes; byte 4 is mid-character, boundary is at 3
        assert_eq!(truncate_str("你好", 4), "你");
        assert_eq!(truncate_str("你好", 6), "你好");
    }

    #[test]
    fn test_truncate_str_zero_limit() {
        assert_eq!(truncate_str("hello", 0), "");
    }

    #[test]
    fn test_colorize_known_modules() {
        // Colored output nests ANSI codes; the raw text must survive
        for module in ["scan", "serve", "watch", "check", "error"] {
            let prefix = colorize_prefix(module);
            assert!(prefix.to_string().contains(&format!("[{module}]")));
        }
    }
}

//! VT/ANSI terminal emulation engine.
//!
//! Parses a raw PTY-style byte stream into a styled, grid-addressable
//! screen buffer and extracts it as a structured JSON document, a plain
//! text projection, or a styled HTML projection. Also exposes a
//! process-wide registry of long-lived instances for streaming input.
//!
//! This crate does not translate input, emulate a pseudo-terminal, or
//! render pixels — it only turns bytes already produced by a program into
//! structured, styled text.

pub mod emulator;
pub mod error;
pub mod extract;
pub mod parser;
pub mod registry;
pub mod terminal;

pub use emulator::{Emulator, EmulatorOptions};
pub use error::{Error, Result};
pub use extract::{JsonDocument, Span};

/// Default grid used by the stateless JSON entry point.
const DEFAULT_JSON_COLS: u16 = 120;
const DEFAULT_JSON_ROWS: u16 = 40;

/// Default grid used by the stateless text/HTML entry points. Wider and
/// taller than the JSON default to minimize false soft-wraps in a
/// one-shot, no-reflow extraction of arbitrary program output.
const DEFAULT_TEXT_COLS: u16 = 500;
const DEFAULT_TEXT_ROWS: u16 = 256;

/// Parse `input` into a transient emulator and return the bit-exact JSON
/// document. Builds and tears down a fresh emulator every call.
pub fn to_json(input: &[u8], offset: u32, limit: u32) -> Result<String> {
    let mut emulator = Emulator::new(EmulatorOptions {
        cols: DEFAULT_JSON_COLS,
        rows: DEFAULT_JSON_ROWS,
        max_scrollback: None,
    });
    emulator.feed_bounded(input, offset, limit)?;
    emulator
        .to_json_string(offset, limit)
        .map_err(|e| Error::InvalidInput(e.to_string()))
}

/// Parse `input` into a transient emulator and return the plain-text
/// projection.
pub fn to_text(input: &[u8], offset: u32, limit: u32) -> Result<String> {
    let mut emulator = Emulator::new(EmulatorOptions {
        cols: DEFAULT_TEXT_COLS,
        rows: DEFAULT_TEXT_ROWS,
        max_scrollback: None,
    });
    emulator.feed_bounded(input, offset, limit)?;
    Ok(emulator.to_text(offset, limit))
}

/// Parse `input` into a transient emulator and return the styled HTML
/// projection.
pub fn to_html(input: &[u8], offset: u32, limit: u32) -> Result<String> {
    let mut emulator = Emulator::new(EmulatorOptions {
        cols: DEFAULT_TEXT_COLS,
        rows: DEFAULT_TEXT_ROWS,
        max_scrollback: None,
    });
    emulator.feed_bounded(input, offset, limit)?;
    Ok(emulator.to_html(offset, limit))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn to_json_uses_default_dimensions() {
        let json = to_json(b"hi", 0, 0).unwrap();
        assert!(json.contains("\"cols\":120"));
        assert!(json.contains("\"rows\":40"));
    }

    #[test]
    fn to_text_uses_wide_default_dimensions() {
        let text = to_text(b"hello world", 0, 0).unwrap();
        assert_eq!(text, "hello world");
    }

    #[test]
    fn to_html_wraps_styled_text() {
        let html = to_html(b"\x1b[1mhi\x1b[0m", 0, 0).unwrap();
        assert!(html.contains("font-weight:bold"));
    }

    #[test]
    fn stateless_entry_points_are_independent_per_call() {
        let first = to_json(b"first", 0, 0).unwrap();
        let second = to_json(b"second", 0, 0).unwrap();
        assert!(first.contains("first"));
        assert!(second.contains("second"));
        assert!(!second.contains("first"));
    }
}

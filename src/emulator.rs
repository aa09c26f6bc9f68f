//! Bundles a [`Parser`] with the [`Screen`] it drives. This is the unit the
//! registry stores and the stateless entry points construct transiently.

use crate::error::Result;
use crate::extract::{self, JsonDocument};
use crate::parser::Parser;
use crate::terminal::Screen;

/// Configuration surface for a new emulator instance.
#[derive(Debug, Clone, Copy)]
pub struct EmulatorOptions {
    pub cols: u16,
    pub rows: u16,
    /// Maximum retained scrollback rows beyond the visible screen. `None`
    /// means unbounded, the documented default.
    pub max_scrollback: Option<usize>,
}

impl Default for EmulatorOptions {
    fn default() -> Self {
        Self {
            cols: 120,
            rows: 40,
            max_scrollback: None,
        }
    }
}

/// Bytes fed per chunk while hunting for an early-exit point during bounded
/// extraction. Small enough to check `has_at_least` often, large enough
/// that the per-chunk UTF-8/parser overhead doesn't dominate.
const FEED_CHUNK: usize = 4096;
/// Extra rows beyond `offset + limit` required before stopping early — a
/// late sequence earlier in the stream could still restyle or rewrite rows
/// near the boundary, so a small buffer is kept before trusting the cut.
const EARLY_EXIT_SLACK: usize = 16;

pub struct Emulator {
    screen: Screen,
    parser: Parser,
}

impl Emulator {
    pub fn new(options: EmulatorOptions) -> Self {
        Self {
            screen: Screen::new(options.cols, options.rows, options.max_scrollback),
            parser: Parser::new(),
        }
    }

    pub fn screen(&self) -> &Screen {
        &self.screen
    }

    pub fn is_ready(&self) -> bool {
        self.parser.is_ready()
    }

    pub fn feed(&mut self, bytes: &[u8]) -> Result<()> {
        self.parser.feed(&mut self.screen, bytes)
    }

    /// Feed `bytes`, but stop as soon as enough rows exist to satisfy a
    /// bounded read of `offset + limit` rows (plus slack), checked only at
    /// a safe parser boundary (ground state). `limit == 0` means
    /// unbounded — the whole input is always fed in that case, matching
    /// the stateless entry points' "feed the whole input" contract.
    pub fn feed_bounded(&mut self, bytes: &[u8], offset: u32, limit: u32) -> Result<()> {
        if limit == 0 {
            return self.feed(bytes);
        }
        let target = offset as usize + limit as usize + EARLY_EXIT_SLACK;

        let mut pos = 0;
        while pos < bytes.len() {
            let end = (pos + FEED_CHUNK).min(bytes.len());
            self.parser.feed(&mut self.screen, &bytes[pos..end])?;
            pos = end;
            if self.parser.is_ready() && self.screen.has_at_least(target) {
                return Ok(());
            }
        }
        Ok(())
    }

    pub fn resize(&mut self, cols: u16, rows: u16) {
        self.screen.resize(cols, rows);
    }

    pub fn reset(&mut self) {
        self.screen.reset();
        self.parser.reset();
    }

    pub fn cursor(&self) -> [u32; 2] {
        [self.screen.cursor_col() as u32, self.screen.cursor_row() as u32]
    }

    pub fn to_json(&self, offset: u32, limit: u32) -> JsonDocument {
        extract::extract_json(&self.screen, offset, limit)
    }

    pub fn to_json_string(&self, offset: u32, limit: u32) -> serde_json::Result<String> {
        extract::to_json_string(&self.screen, offset, limit)
    }

    pub fn to_text(&self, offset: u32, limit: u32) -> String {
        extract::extract_text(&self.screen, offset, limit)
    }

    pub fn to_html(&self, offset: u32, limit: u32) -> String {
        extract::extract_html(&self.screen, offset, limit)
    }
}

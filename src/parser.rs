//! The escape-sequence state machine: a classical DEC-derived parser that
//! turns a byte stream into mutations of a [`Screen`].
//!
//! The state names (ground, escape, CSI-entry, CSI-param, ...) follow the
//! usual VT100/ECMA-48 state diagram. Dispatch is a match over the final
//! byte rather than a generated lookup table — at our sequence volume a
//! table buys nothing a branch predictor doesn't already give us for free.

use crate::error::Result;
use crate::terminal::{Attrs, Color, Screen, Style};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Ground,
    Escape,
    EscapeIntermediate,
    CsiEntry,
    CsiParam,
    CsiIntermediate,
    CsiIgnore,
    OscString,
    DcsIgnore,
}

/// Incremental UTF-8 decoder that tolerates a multi-byte sequence split
/// across two `feed` calls, and replaces malformed bytes with U+FFFD rather
/// than failing the whole call.
#[derive(Debug, Default, Clone)]
struct Utf8Decoder {
    pending: Vec<u8>,
}

impl Utf8Decoder {
    fn feed(&mut self, bytes: &[u8], mut on_char: impl FnMut(char)) {
        self.pending.extend_from_slice(bytes);
        loop {
            match std::str::from_utf8(&self.pending) {
                Ok(s) => {
                    s.chars().for_each(&mut on_char);
                    self.pending.clear();
                    return;
                }
                Err(e) => {
                    let valid_len = e.valid_up_to();
                    if valid_len > 0 {
                        // SAFETY-free: slice is valid UTF-8 by construction.
                        let s = std::str::from_utf8(&self.pending[..valid_len]).unwrap();
                        s.chars().for_each(&mut on_char);
                    }
                    match e.error_len() {
                        Some(bad_len) => {
                            tracing::warn!(bad_len, "replacing malformed UTF-8 byte sequence with U+FFFD");
                            on_char('\u{FFFD}');
                            self.pending.drain(..valid_len + bad_len);
                        }
                        None => {
                            self.pending.drain(..valid_len);
                            if self.pending.len() >= 4 {
                                tracing::warn!("dropping over-long incomplete UTF-8 sequence, replacing with U+FFFD");
                                on_char('\u{FFFD}');
                                self.pending.clear();
                            }
                            return;
                        }
                    }
                }
            }
        }
    }
}

/// The VT state machine. Holds only parser-transient state: FSM state,
/// in-progress parameters, and the small amount of cursor/pen memory that
/// DECSC/DECRC and REP need. The screen it mutates is passed in explicitly.
#[derive(Debug, Clone)]
pub struct Parser {
    state: State,
    params: Vec<u16>,
    current: Option<u16>,
    intermediates: Vec<u8>,
    private_marker: Option<u8>,
    last_printed: Option<char>,
    saved_cursor: Option<(u16, u16, Style)>,
    utf8: Utf8Decoder,
}

impl Default for Parser {
    fn default() -> Self {
        Self::new()
    }
}

impl Parser {
    pub fn new() -> Self {
        Self {
            state: State::Ground,
            params: Vec::new(),
            current: None,
            intermediates: Vec::new(),
            private_marker: None,
            last_printed: None,
            saved_cursor: None,
            utf8: Utf8Decoder::default(),
        }
    }

    /// True iff the parser is in ground state: no escape sequence is in
    /// progress, so the screen is safe to read.
    pub fn is_ready(&self) -> bool {
        self.state == State::Ground
    }

    /// Reset the parser's own state machine to ground. Does not touch the
    /// screen — callers resetting a whole instance call `Screen::reset`
    /// alongside this.
    pub fn reset(&mut self) {
        *self = Parser::new();
    }

    /// Feed a chunk of bytes, mutating `screen` as sequences are
    /// recognized. Safe to call repeatedly with arbitrary chunk boundaries,
    /// including boundaries that split a multi-byte UTF-8 sequence or an
    /// escape sequence in the middle.
    pub fn feed(&mut self, screen: &mut Screen, bytes: &[u8]) -> Result<()> {
        // Decoding happens through a small owned buffer so `on_char` can
        // still borrow `self` mutably afterward.
        let mut decoded = Vec::new();
        self.utf8.feed(bytes, |c| decoded.push(c));
        for c in decoded {
            self.advance_char(screen, c);
        }
        Ok(())
    }

    fn to_ground(&mut self) {
        self.state = State::Ground;
        self.params.clear();
        self.current = None;
        self.intermediates.clear();
        self.private_marker = None;
    }

    fn enter_escape(&mut self) {
        self.state = State::Escape;
        self.params.clear();
        self.current = None;
        self.intermediates.clear();
        self.private_marker = None;
    }

    fn advance_char(&mut self, screen: &mut Screen, c: char) {
        // CAN/SUB abort whatever sequence is in progress, from any state.
        if matches!(c, '\u{18}' | '\u{1a}') {
            self.to_ground();
            return;
        }
        // An ESC seen mid-sequence aborts it and starts a fresh one, same
        // as an ESC seen from ground.
        if c == '\u{1b}' && self.state != State::Ground {
            self.enter_escape();
            return;
        }

        match self.state {
            State::Ground => self.ground_char(screen, c),
            State::Escape => self.escape_char(screen, c),
            State::EscapeIntermediate => self.escape_intermediate_char(screen, c),
            State::CsiEntry | State::CsiParam | State::CsiIntermediate => {
                self.csi_char(screen, c)
            }
            State::CsiIgnore => self.csi_ignore_char(c),
            State::OscString => self.osc_char(c),
            State::DcsIgnore => self.dcs_char(c),
        }
    }

    fn ground_char(&mut self, screen: &mut Screen, c: char) {
        if c == '\u{1b}' {
            self.enter_escape();
            return;
        }
        if (c as u32) < 0x20 {
            self.execute_control(screen, c);
            return;
        }
        if c == '\u{7f}' {
            return; // DEL: ignored
        }
        screen.write_char(c);
        self.last_printed = Some(c);
    }

    fn execute_control(&mut self, screen: &mut Screen, c: char) {
        match c {
            '\u{7}' => {}  // BEL: ignored, no bell device here
            '\u{8}' => screen.set_cursor(screen.cursor_row(), screen.cursor_col().saturating_sub(1)),
            '\u{9}' => {
                let next = screen.next_tab_stop(screen.cursor_col());
                screen.set_cursor(screen.cursor_row(), next);
            }
            '\u{a}' | '\u{b}' | '\u{c}' => screen.linefeed(), // LF, VT, FF
            '\u{d}' => screen.carriage_return(),
            _ => {}
        }
    }

    fn escape_char(&mut self, screen: &mut Screen, c: char) {
        let Some(byte) = ascii_byte(c) else {
            self.to_ground();
            return;
        };
        match byte {
            b'[' => {
                self.to_ground();
                self.state = State::CsiEntry;
            }
            b']' => {
                self.to_ground();
                self.state = State::OscString;
            }
            b'P' | b'X' | b'^' | b'_' => {
                self.to_ground();
                self.state = State::DcsIgnore;
            }
            0x20..=0x2f => {
                self.intermediates.push(byte);
                self.state = State::EscapeIntermediate;
            }
            0x30..=0x7e => {
                self.esc_dispatch(screen, byte);
                self.to_ground();
            }
            _ => self.to_ground(),
        }
    }

    fn escape_intermediate_char(&mut self, screen: &mut Screen, c: char) {
        let Some(byte) = ascii_byte(c) else {
            self.to_ground();
            return;
        };
        match byte {
            0x20..=0x2f => self.intermediates.push(byte),
            0x30..=0x7e => {
                self.esc_dispatch(screen, byte);
                self.to_ground();
            }
            _ => self.to_ground(),
        }
    }

    fn esc_dispatch(&mut self, screen: &mut Screen, byte: u8) {
        match byte {
            b'c' => screen.reset(),
            b'D' => screen.index(),
            b'E' => {
                screen.index();
                screen.carriage_return();
            }
            b'M' => screen.reverse_linefeed(),
            b'7' => self.save_cursor(screen),
            b'8' => self.restore_cursor(screen),
            _ => {} // charset selection (SCS) and keypad modes: no-op
        }
    }

    fn save_cursor(&mut self, screen: &Screen) {
        self.saved_cursor = Some((screen.cursor_row(), screen.cursor_col(), screen.pen));
    }

    fn restore_cursor(&mut self, screen: &mut Screen) {
        if let Some((row, col, pen)) = self.saved_cursor {
            screen.set_cursor(row, col);
            screen.pen = pen;
        }
    }

    fn csi_char(&mut self, screen: &mut Screen, c: char) {
        let Some(byte) = ascii_byte(c) else {
            self.state = State::CsiIgnore;
            return;
        };
        if byte < 0x20 {
            self.execute_control(screen, c);
            return;
        }
        match byte {
            b'0'..=b'9' => {
                let d = (byte - b'0') as u16;
                self.current = Some(self.current.unwrap_or(0).saturating_mul(10).saturating_add(d));
                self.state = State::CsiParam;
            }
            b';' | b':' => {
                self.params.push(self.current.take().unwrap_or(0));
                self.state = State::CsiParam;
            }
            b'<' | b'=' | b'>' | b'?' if self.state == State::CsiEntry => {
                self.private_marker = Some(byte);
            }
            0x20..=0x2f => {
                self.commit_pending_param();
                self.intermediates.push(byte);
                self.state = State::CsiIntermediate;
            }
            0x40..=0x7e => {
                self.commit_pending_param();
                self.csi_dispatch(screen, byte);
                self.to_ground();
            }
            _ => self.state = State::CsiIgnore,
        }
    }

    fn csi_ignore_char(&mut self, c: char) {
        if let Some(byte) = ascii_byte(c) {
            if (0x40..=0x7e).contains(&byte) {
                self.to_ground();
            }
        }
    }

    fn osc_char(&mut self, c: char) {
        if c == '\u{7}' {
            self.to_ground();
        }
        // Every other byte (including the content of the OSC string) is
        // accepted and discarded: this engine models no title/hyperlink
        // state on the screen, so there is nothing to apply it to.
    }

    fn dcs_char(&mut self, c: char) {
        if c == '\u{7}' {
            self.to_ground();
        }
    }

    fn commit_pending_param(&mut self) {
        if self.current.is_some() || !self.params.is_empty() {
            self.params.push(self.current.take().unwrap_or(0));
        }
    }

    /// Parameter `idx`, with `0` treated the same as "omitted" — the usual
    /// VT convention where an explicit 0 and an absent parameter both mean
    /// "use the default" for motion/erase commands.
    fn param_or(&self, idx: usize, default: u16) -> u16 {
        match self.params.get(idx) {
            None | Some(0) => default,
            Some(&v) => v,
        }
    }

    fn raw_param(&self, idx: usize) -> Option<u16> {
        self.params.get(idx).copied()
    }

    fn csi_dispatch(&mut self, screen: &mut Screen, byte: u8) {
        match byte {
            b'A' => self.cursor_up(screen, self.param_or(0, 1)),
            b'B' => self.cursor_down(screen, self.param_or(0, 1)),
            b'C' => self.cursor_forward(screen, self.param_or(0, 1)),
            b'D' => self.cursor_backward(screen, self.param_or(0, 1)),
            b'H' | b'f' => {
                let row = self.param_or(0, 1).saturating_sub(1);
                let col = self.param_or(1, 1).saturating_sub(1);
                screen.set_cursor(row, col);
            }
            b'G' => {
                let col = self.param_or(0, 1).saturating_sub(1);
                screen.set_cursor(screen.cursor_row(), col);
            }
            b'd' => {
                let row = self.param_or(0, 1).saturating_sub(1);
                screen.set_cursor(row, screen.cursor_col());
            }
            b'J' => self.erase_display(screen),
            b'K' => self.erase_line(screen),
            b'S' => screen.scroll_up_in_margins(self.param_or(0, 1)),
            b'T' => screen.scroll_down_in_margins(self.param_or(0, 1)),
            b'r' => {
                let rows = screen.rows();
                let top = self.param_or(0, 1).saturating_sub(1);
                let bottom = self.param_or(1, rows).saturating_sub(1).min(rows - 1);
                if top < bottom {
                    screen.scroll_top = top;
                    screen.scroll_bottom = bottom;
                    screen.set_cursor(0, 0);
                }
            }
            b'm' => self.handle_sgr(screen),
            b'h' => self.set_mode(screen, true),
            b'l' => self.set_mode(screen, false),
            b'L' => screen.insert_lines(self.param_or(0, 1)),
            b'M' => screen.delete_lines(self.param_or(0, 1)),
            b'P' => {
                let n = self.param_or(0, 1);
                screen.delete_chars_at(screen.cursor_row(), screen.cursor_col(), n);
            }
            b'@' => {
                let n = self.param_or(0, 1);
                screen.insert_chars_at(screen.cursor_row(), screen.cursor_col(), n);
            }
            b'X' => {
                let n = self.param_or(0, 1);
                screen.erase_chars_at(screen.cursor_row(), screen.cursor_col(), n);
            }
            b'b' => {
                let n = self.param_or(0, 1);
                if let Some(c) = self.last_printed {
                    for _ in 0..n {
                        screen.write_char(c);
                    }
                }
            }
            b's' if self.private_marker.is_none() => self.save_cursor(screen),
            b'u' if self.private_marker.is_none() => self.restore_cursor(screen),
            _ => {} // DA/DSR and anything else unrecognized: no-op, no reply channel
        }
    }

    /// CUU: move up `n` rows. Stops at the top scroll margin if the cursor
    /// started inside the scrolling region, otherwise at row 0 — a cursor
    /// positioned above the region is unconstrained by it.
    fn cursor_up(&self, screen: &mut Screen, n: u16) {
        let floor = if screen.cursor_row() >= screen.scroll_top {
            screen.scroll_top
        } else {
            0
        };
        let row = screen.cursor_row().saturating_sub(n).max(floor);
        screen.set_cursor(row, screen.cursor_col());
    }

    /// CUD: move down `n` rows. Stops at the bottom scroll margin if the
    /// cursor started inside the scrolling region, otherwise at the last
    /// row — mirrors `cursor_up`.
    fn cursor_down(&self, screen: &mut Screen, n: u16) {
        let ceil = if screen.cursor_row() <= screen.scroll_bottom {
            screen.scroll_bottom
        } else {
            screen.rows() - 1
        };
        let row = (screen.cursor_row() + n).min(ceil);
        screen.set_cursor(row, screen.cursor_col());
    }

    fn cursor_forward(&self, screen: &mut Screen, n: u16) {
        let col = (screen.cursor_col() + n).min(screen.cols() - 1);
        screen.set_cursor(screen.cursor_row(), col);
    }

    fn cursor_backward(&self, screen: &mut Screen, n: u16) {
        let col = screen.cursor_col().saturating_sub(n);
        screen.set_cursor(screen.cursor_row(), col);
    }

    fn erase_display(&self, screen: &mut Screen) {
        match self.param_or(0, 0) {
            0 => screen.erase_display_from_cursor(),
            1 => screen.erase_display_to_cursor(),
            _ => screen.erase_display_all(), // 2 and 3 both clear the visible screen
        }
    }

    fn erase_line(&self, screen: &mut Screen) {
        let row = screen.cursor_row();
        let col = screen.cursor_col();
        match self.param_or(0, 0) {
            0 => screen.erase_line_from(row, col),
            1 => screen.erase_line_to(row, col),
            _ => screen.erase_line_all(row),
        }
    }

    fn set_mode(&mut self, screen: &mut Screen, enable: bool) {
        let params: Vec<u16> = if self.params.is_empty() {
            vec![0]
        } else {
            self.params.clone()
        };
        for p in params {
            match self.private_marker {
                Some(b'?') => match p {
                    7 => screen.modes.autowrap = enable,
                    25 => screen.modes.cursor_visible = enable,
                    _ => {}
                },
                _ => match p {
                    4 => screen.modes.insert = enable,
                    20 => screen.modes.linefeed_newline = enable,
                    _ => {}
                },
            }
        }
    }

    fn handle_sgr(&mut self, screen: &mut Screen) {
        let params: Vec<u16> = if self.params.is_empty() {
            vec![0]
        } else {
            self.params.clone()
        };
        let mut i = 0;
        while i < params.len() {
            match params[i] {
                0 => screen.pen = Style::new(),
                1 => screen.pen.attrs.insert(Attrs::BOLD),
                2 => screen.pen.attrs.insert(Attrs::FAINT),
                3 => screen.pen.attrs.insert(Attrs::ITALIC),
                4 => screen.pen.attrs.insert(Attrs::UNDERLINE),
                7 => screen.pen.attrs.insert(Attrs::INVERSE),
                9 => screen.pen.attrs.insert(Attrs::STRIKETHROUGH),
                22 => screen.pen.attrs.remove(Attrs::BOLD | Attrs::FAINT),
                23 => screen.pen.attrs.remove(Attrs::ITALIC),
                24 => screen.pen.attrs.remove(Attrs::UNDERLINE),
                27 => screen.pen.attrs.remove(Attrs::INVERSE),
                29 => screen.pen.attrs.remove(Attrs::STRIKETHROUGH),
                n @ 30..=37 => screen.pen.fg = Color::Indexed((n - 30) as u8),
                39 => screen.pen.fg = Color::Default,
                n @ 40..=47 => screen.pen.bg = Color::Indexed((n - 40) as u8),
                49 => screen.pen.bg = Color::Default,
                n @ 90..=97 => screen.pen.fg = Color::Indexed((n - 90 + 8) as u8),
                n @ 100..=107 => screen.pen.bg = Color::Indexed((n - 100 + 8) as u8),
                sel @ (38 | 48) => {
                    let is_fg = sel == 38;
                    match self.raw_param(i + 1) {
                        Some(5) => {
                            if let Some(idx) = self.raw_param(i + 2) {
                                let color = Color::Indexed(idx as u8);
                                if is_fg {
                                    screen.pen.fg = color;
                                } else {
                                    screen.pen.bg = color;
                                }
                                i += 2;
                            }
                        }
                        Some(2) => {
                            if let (Some(r), Some(g), Some(b)) =
                                (self.raw_param(i + 2), self.raw_param(i + 3), self.raw_param(i + 4))
                            {
                                let color = Color::Rgb(r as u8, g as u8, b as u8);
                                if is_fg {
                                    screen.pen.fg = color;
                                } else {
                                    screen.pen.bg = color;
                                }
                                i += 4;
                            }
                        }
                        _ => {}
                    }
                }
                _ => {}
            }
            i += 1;
        }
    }
}

fn ascii_byte(c: char) -> Option<u8> {
    if (c as u32) <= 0x7f {
        Some(c as u8)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::terminal::Screen;

    fn feed(screen: &mut Screen, parser: &mut Parser, s: &str) {
        parser.feed(screen, s.as_bytes()).unwrap();
    }

    #[test]
    fn plain_text_advances_cursor_and_writes_cells() {
        let mut screen = Screen::new(80, 24, None);
        let mut parser = Parser::new();
        feed(&mut screen, &mut parser, "Hi");
        assert_eq!(screen.cursor_col(), 2);
        assert_eq!(screen.visible_row(0).cells[0].codepoint, 'H');
        assert_eq!(screen.visible_row(0).cells[1].codepoint, 'i');
        assert!(parser.is_ready());
    }

    #[test]
    fn sgr_sets_color_and_attrs() {
        let mut screen = Screen::new(80, 24, None);
        let mut parser = Parser::new();
        feed(&mut screen, &mut parser, "\x1b[1;3;4mstyles\x1b[0m");
        let cell = screen.visible_row(0).cells[0];
        assert_eq!(cell.style.flags(), 1 | 2 | 4);
    }

    #[test]
    fn truecolor_sgr_sets_rgb() {
        let mut screen = Screen::new(80, 24, None);
        let mut parser = Parser::new();
        feed(&mut screen, &mut parser, "\x1b[38;2;255;0;128mrgb");
        assert_eq!(screen.visible_row(0).cells[0].style.fg, Color::Rgb(255, 0, 128));
    }

    #[test]
    fn split_escape_sequence_resumes_across_feeds() {
        let mut screen = Screen::new(80, 24, None);
        let mut parser = Parser::new();
        parser.feed(&mut screen, b"\x1b[3").unwrap();
        assert!(!parser.is_ready());
        parser.feed(&mut screen, b"1mRed\x1b[0m").unwrap();
        assert!(parser.is_ready());
        assert_eq!(screen.visible_row(0).cells[0].style.fg, Color::Indexed(1));
    }

    #[test]
    fn split_utf8_sequence_resumes_across_feeds() {
        let mut screen = Screen::new(80, 24, None);
        let mut parser = Parser::new();
        let bytes = "\u{4e16}".as_bytes(); // 3-byte UTF-8 sequence
        parser.feed(&mut screen, &bytes[..1]).unwrap();
        parser.feed(&mut screen, &bytes[1..]).unwrap();
        assert_eq!(screen.visible_row(0).cells[0].codepoint, '\u{4e16}');
    }

    #[test]
    fn lnm_default_resets_column_on_bare_lf() {
        let mut screen = Screen::new(80, 24, None);
        let mut parser = Parser::new();
        feed(&mut screen, &mut parser, "line1\nline2\nline3");
        assert_eq!(screen.cursor_row(), 2);
        assert_eq!(screen.cursor_col(), 5);
        assert_eq!(screen.visible_row(1).cells[0].codepoint, 'l');
    }

    #[test]
    fn cursor_position_report_moves_cursor() {
        let mut screen = Screen::new(80, 24, None);
        let mut parser = Parser::new();
        feed(&mut screen, &mut parser, "\x1b[6;6H");
        assert_eq!((screen.cursor_row(), screen.cursor_col()), (5, 5));
        feed(&mut screen, &mut parser, "X");
        assert_eq!((screen.cursor_row(), screen.cursor_col()), (5, 6));
        assert_eq!(screen.visible_row(5).cells[5].codepoint, 'X');
    }

    #[test]
    fn reset_clears_screen_and_parser() {
        let mut screen = Screen::new(80, 24, None);
        let mut parser = Parser::new();
        feed(&mut screen, &mut parser, "Old Content");
        feed(&mut screen, &mut parser, "\x1bc");
        feed(&mut screen, &mut parser, "New Content");
        assert_eq!(screen.visible_row(0).cells[0].codepoint, 'N');
        assert_eq!(screen.cursor_col(), 11);
        assert!(parser.is_ready());
    }

    #[test]
    fn unknown_csi_sequence_is_a_no_op() {
        let mut screen = Screen::new(80, 24, None);
        let mut parser = Parser::new();
        feed(&mut screen, &mut parser, "\x1b[42zHello");
        assert!(parser.is_ready());
        assert_eq!(screen.visible_row(0).cells[0].codepoint, 'H');
    }

    #[test]
    fn cursor_up_down_stop_at_scroll_margins() {
        let mut screen = Screen::new(80, 24, None);
        let mut parser = Parser::new();
        feed(&mut screen, &mut parser, "\x1b[5;10r"); // margins rows 5-10 (1-indexed)
        feed(&mut screen, &mut parser, "\x1b[7;1H"); // inside the region
        feed(&mut screen, &mut parser, "\x1b[10A"); // CUU 10, should stop at row index 4
        assert_eq!(screen.cursor_row(), 4);
        feed(&mut screen, &mut parser, "\x1b[7;1H");
        feed(&mut screen, &mut parser, "\x1b[10B"); // CUD 10, should stop at row index 9
        assert_eq!(screen.cursor_row(), 9);
    }

    #[test]
    fn linefeed_at_bottom_margin_rotates_within_region_on_a_fresh_screen() {
        // Partial region (not full-screen) on a screen with no scrollback
        // yet: this is exactly the state that used to underflow inside
        // `scroll_up_in_margins`'s non-full-screen branch.
        let mut screen = Screen::new(10, 24, None);
        let mut parser = Parser::new();
        feed(&mut screen, &mut parser, "\x1b[1;10r"); // margins rows 1-10 (1-indexed) => 0..=9
        for row in 0..10u16 {
            let letter = (b'A' + row as u8) as char;
            feed(&mut screen, &mut parser, &format!("\x1b[{};1H{}", row + 1, letter));
        }
        feed(&mut screen, &mut parser, "\x1b[10;1H\n"); // bottom margin row, then LF
        let top_of_region: Vec<char> = (0..9).map(|r| screen.visible_row(r).cells[0].codepoint).collect();
        assert_eq!(top_of_region, vec!['B', 'C', 'D', 'E', 'F', 'G', 'H', 'I', 'J']);
        assert_eq!(screen.visible_row(9).cells[0].codepoint, '\0');
        // Rows outside the margin are untouched.
        assert_eq!(screen.visible_row(10).cells[0].codepoint, '\0');
        assert_eq!(screen.row_count(), 24);
    }

    #[test]
    fn insert_lines_mid_screen_does_not_panic_on_a_fresh_screen() {
        // `CSI L` with the cursor off row 0 makes `insert_lines` set
        // `scroll_top` to the cursor row, so `scroll_down_in_margins` runs
        // its remove/insert dance even though no scrollback exists yet.
        let mut screen = Screen::new(10, 24, None);
        let mut parser = Parser::new();
        feed(&mut screen, &mut parser, "\x1b[6;1HX"); // row index 5, col 0
        feed(&mut screen, &mut parser, "\x1b[6;1H\x1b[L"); // back to row 5, insert one line
        assert_eq!(screen.row_count(), 24);
        assert_eq!(screen.visible_row(5).cells[0].codepoint, '\0');
        assert_eq!(screen.visible_row(6).cells[0].codepoint, 'X');
    }

    #[test]
    fn colon_delimited_sgr_subparams_equivalent_to_semicolon() {
        let mut colon_screen = Screen::new(80, 24, None);
        let mut parser = Parser::new();
        feed(&mut colon_screen, &mut parser, "\x1b[38:2:255:0:128mrgb");

        let mut semi_screen = Screen::new(80, 24, None);
        let mut parser2 = Parser::new();
        feed(&mut semi_screen, &mut parser2, "\x1b[38;2;255;0;128mrgb");

        assert_eq!(
            colon_screen.visible_row(0).cells[0].style.fg,
            semi_screen.visible_row(0).cells[0].style.fg
        );
        assert_eq!(colon_screen.visible_row(0).cells[0].style.fg, Color::Rgb(255, 0, 128));
    }

    /// Property 4 (chunk invariance): feeding a byte sequence split at any
    /// set of boundaries into a single persistent parser must produce the
    /// same final screen as feeding it whole, including splits that land
    /// mid-escape-sequence and mid-UTF-8-sequence.
    #[test]
    fn chunk_invariance_across_arbitrary_partitions() {
        let input = "\x1b[32mHello\x1b[0m \u{4e16}\u{754c}\r\n\x1b[1;3;4mstyled\x1b[0mtext\x1b[6;6HX";
        let bytes = input.as_bytes();

        let mut whole_screen = Screen::new(40, 10, None);
        let mut whole_parser = Parser::new();
        whole_parser.feed(&mut whole_screen, bytes).unwrap();

        // Every possible single split point, plus a handful of multi-point
        // partitions chosen to land inside multi-byte constructs.
        let mut partitions: Vec<Vec<usize>> = (1..bytes.len()).map(|i| vec![i]).collect();
        partitions.push(vec![3, 7, 12, 20, 28]);
        partitions.push((0..bytes.len()).step_by(2).skip(1).collect());

        for splits in partitions {
            let mut screen = Screen::new(40, 10, None);
            let mut parser = Parser::new();
            let mut start = 0;
            for &split in &splits {
                let split = split.min(bytes.len());
                if split > start {
                    parser.feed(&mut screen, &bytes[start..split]).unwrap();
                    start = split;
                }
            }
            parser.feed(&mut screen, &bytes[start..]).unwrap();

            assert_eq!(
                screen.cursor_row(),
                whole_screen.cursor_row(),
                "cursor row mismatch for splits {splits:?}"
            );
            assert_eq!(
                screen.cursor_col(),
                whole_screen.cursor_col(),
                "cursor col mismatch for splits {splits:?}"
            );
            for (r, (left, right)) in screen.iter_rows().zip(whole_screen.iter_rows()).enumerate() {
                assert_eq!(
                    left.cells.iter().map(|c| c.codepoint).collect::<Vec<_>>(),
                    right.cells.iter().map(|c| c.codepoint).collect::<Vec<_>>(),
                    "row {r} content mismatch for splits {splits:?}"
                );
            }
        }
        assert!(whole_parser.is_ready());
    }
}

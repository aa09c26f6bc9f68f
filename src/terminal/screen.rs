//! Screen: the grid buffer a parser writes into and an extractor reads from.
//!
//! Scrollback and the visible screen share one deque. The visible screen is
//! always the last `rows` entries; everything before that is scrollback.
//! This keeps "how many lines exist" and "iterate from the oldest line" both
//! O(1)/O(n)-linear without a second data structure to keep in sync.

use std::collections::VecDeque;

use super::cell::{Cell, Row, Width};
use super::color::{Color, Palette};
use super::modes::TerminalModes;
use super::style::Style;

#[derive(Debug, Clone)]
pub struct Screen {
    lines: VecDeque<Row>,
    cols: u16,
    rows: u16,
    max_scrollback: Option<usize>,

    cursor_row: u16,
    cursor_col: u16,
    /// Armed when a printable character was written into the last column
    /// under autowrap; the *next* printable character wraps first, matching
    /// real terminals' "deferred wrap" behavior rather than wrapping the
    /// moment the last column is filled.
    pending_wrap: bool,

    /// Style applied to the next printed character, and the background used
    /// when erasing (ECMA-48: erase paints the *current* background).
    pub pen: Style,
    pub palette: Palette,
    pub modes: TerminalModes,
    /// The terminal's configured "no background" color. A cell whose
    /// resolved background equals this is reported as absent (`null`) on
    /// extraction rather than as a concrete color — see
    /// `extract::resolve_bg`.
    pub default_bg: Color,

    /// Scroll region, 0-based and inclusive, within the visible rows.
    pub scroll_top: u16,
    pub scroll_bottom: u16,
    tab_stops: Vec<bool>,
}

impl Screen {
    pub fn new(cols: u16, rows: u16, max_scrollback: Option<usize>) -> Self {
        let cols = cols.max(1);
        let rows = rows.max(1);
        let mut lines = VecDeque::with_capacity(rows as usize);
        for _ in 0..rows {
            lines.push_back(Row::new(cols));
        }
        Self {
            lines,
            cols,
            rows,
            max_scrollback,
            cursor_row: 0,
            cursor_col: 0,
            pending_wrap: false,
            pen: Style::new(),
            palette: Palette::default(),
            modes: TerminalModes::default(),
            default_bg: Color::Default,
            scroll_top: 0,
            scroll_bottom: rows - 1,
            tab_stops: default_tab_stops(cols),
        }
    }

    pub fn cols(&self) -> u16 {
        self.cols
    }

    pub fn rows(&self) -> u16 {
        self.rows
    }

    pub fn cursor_row(&self) -> u16 {
        self.cursor_row
    }

    pub fn cursor_col(&self) -> u16 {
        self.cursor_col
    }

    pub fn cursor_visible(&self) -> bool {
        self.modes.cursor_visible
    }

    /// Index into `lines` of the first visible row.
    fn visible_start(&self) -> usize {
        self.lines.len() - self.rows as usize
    }

    /// Total number of buffered lines (scrollback plus visible).
    pub fn row_count(&self) -> usize {
        self.lines.len()
    }

    /// Whether at least `n` lines are buffered, without walking the whole
    /// deque: `VecDeque::len` is O(1), so this is too.
    pub fn has_at_least(&self, n: usize) -> bool {
        self.lines.len() >= n
    }

    /// All buffered rows, oldest (furthest back in scrollback) first.
    pub fn iter_rows(&self) -> impl Iterator<Item = &Row> {
        self.lines.iter()
    }

    /// The visible row at `r` (0-based, 0 is the top of the screen).
    pub fn visible_row(&self, r: u16) -> &Row {
        &self.lines[self.visible_start() + r as usize]
    }

    fn visible_row_mut(&mut self, r: u16) -> &mut Row {
        let idx = self.visible_start() + r as usize;
        &mut self.lines[idx]
    }

    pub fn set_cursor(&mut self, row: u16, col: u16) {
        self.cursor_row = row.min(self.rows - 1);
        self.cursor_col = col.min(self.cols.saturating_sub(1));
        self.pending_wrap = false;
    }

    pub fn carriage_return(&mut self) {
        self.cursor_col = 0;
        self.pending_wrap = false;
    }

    /// Write one printable character at the cursor, advancing it.
    /// Handles autowrap, insert mode, and wide-character spacer cells.
    pub fn write_char(&mut self, c: char) {
        let width = Cell::char_width(c);

        if self.pending_wrap && self.modes.autowrap {
            self.cursor_row_wrap();
        }

        if width == 2 && self.cursor_col + 1 >= self.cols && self.modes.autowrap {
            // Not enough room for a wide character in the remaining
            // columns: pad the last column blank and wrap first.
            self.cursor_row_wrap();
        }

        if self.modes.insert {
            self.insert_chars(width);
        }

        let row = self.cursor_row;
        let col = self.cursor_col;
        let style = self.pen;
        let line = self.visible_row_mut(row);

        if width == 2 {
            line.cells[col as usize] = Cell {
                codepoint: c,
                style,
                width: Width::Wide,
            };
            if (col as usize + 1) < line.cells.len() {
                line.cells[col as usize + 1] = Cell::spacer_tail();
            }
        } else {
            line.cells[col as usize] = Cell {
                codepoint: c,
                style,
                width: Width::Narrow,
            };
        }

        let advance = width.max(1);
        if self.cursor_col as u32 + advance as u32 >= self.cols as u32 {
            self.cursor_col = self.cols - 1;
            self.pending_wrap = true;
        } else {
            self.cursor_col += advance;
        }
    }

    fn cursor_row_wrap(&mut self) {
        self.cursor_col = 0;
        self.pending_wrap = false;
        if self.cursor_row >= self.scroll_bottom {
            self.scroll_up_in_margins(1);
        } else {
            self.cursor_row += 1;
        }
    }

    /// Move down one row, scrolling the margin region if already at the
    /// bottom. Never touches the column — this is IND's behavior and is
    /// also NEL's first half, independent of LNM.
    pub fn index(&mut self) {
        self.pending_wrap = false;
        if self.cursor_row >= self.scroll_bottom {
            self.scroll_up_in_margins(1);
        } else {
            self.cursor_row += 1;
        }
    }

    /// C0 line feed: `index`, plus a column reset when LNM is on (the
    /// default here — see `TerminalModes::linefeed_newline`).
    pub fn linefeed(&mut self) {
        self.index();
        if self.modes.linefeed_newline {
            self.cursor_col = 0;
        }
    }

    pub fn reverse_linefeed(&mut self) {
        self.pending_wrap = false;
        if self.cursor_row <= self.scroll_top {
            self.scroll_down_in_margins(1);
        } else {
            self.cursor_row -= 1;
        }
    }

    /// Scroll the margin region up by `n`, pushing rows that leave the top
    /// of a full-screen region into scrollback. Partial margins (set by
    /// DECSTBM) rotate within the region and never touch scrollback.
    pub fn scroll_up_in_margins(&mut self, n: u16) {
        let full_screen = self.scroll_top == 0 && self.scroll_bottom == self.rows - 1;
        for _ in 0..n {
            if full_screen {
                let mut blank = Row::new(self.cols);
                blank.erase_with_bg(self.pen.bg);
                self.lines.push_back(blank);
                if let Some(max) = self.max_scrollback {
                    let scrollback_len = self.lines.len() - self.rows as usize;
                    if scrollback_len > max {
                        self.lines.pop_front();
                    }
                }
            } else {
                // Both indices must come from one `visible_start()` taken
                // before the `remove` below shrinks the deque — querying it
                // again afterward would be off by one (and underflow when
                // there's no scrollback yet, since `visible_start()` is
                // `lines.len() - rows`).
                let vstart = self.visible_start();
                let top_idx = vstart + self.scroll_top as usize;
                let bottom_idx = vstart + self.scroll_bottom as usize;
                let mut row = self.lines.remove(top_idx).unwrap();
                row.clear();
                row.erase_with_bg(self.pen.bg);
                self.lines.insert(bottom_idx, row);
            }
        }
    }

    pub fn scroll_down_in_margins(&mut self, n: u16) {
        for _ in 0..n {
            let vstart = self.visible_start();
            let top_idx = vstart + self.scroll_top as usize;
            let bottom_idx = vstart + self.scroll_bottom as usize;
            let mut row = self.lines.remove(bottom_idx).unwrap();
            row.clear();
            row.erase_with_bg(self.pen.bg);
            self.lines.insert(top_idx, row);
        }
    }

    pub fn insert_lines(&mut self, n: u16) {
        if self.cursor_row < self.scroll_top || self.cursor_row > self.scroll_bottom {
            return;
        }
        let saved_top = self.scroll_top;
        self.scroll_top = self.cursor_row;
        self.scroll_down_in_margins(n.min(self.scroll_bottom - self.cursor_row + 1));
        self.scroll_top = saved_top;
    }

    pub fn delete_lines(&mut self, n: u16) {
        if self.cursor_row < self.scroll_top || self.cursor_row > self.scroll_bottom {
            return;
        }
        let saved_top = self.scroll_top;
        self.scroll_top = self.cursor_row;
        self.scroll_up_in_margins(n.min(self.scroll_bottom - self.cursor_row + 1));
        self.scroll_top = saved_top;
    }

    /// Shift cells at and after the cursor on the current row right by
    /// `width` columns, dropping what falls off the end (used by insert
    /// mode before placing a new character).
    fn insert_chars(&mut self, width: u16) {
        self.insert_chars_at(self.cursor_row, self.cursor_col, width);
    }

    pub fn insert_chars_at(&mut self, row: u16, col: u16, n: u16) {
        let bg = self.pen.bg;
        let line = self.visible_row_mut(row);
        let col = col as usize;
        let n = n as usize;
        if col >= line.cells.len() {
            return;
        }
        let len = line.cells.len();
        for i in (col..len).rev() {
            if i + n < len {
                line.cells[i + n] = line.cells[i];
            }
        }
        for cell in line.cells[col..(col + n).min(len)].iter_mut() {
            cell.erase(bg);
        }
    }

    pub fn delete_chars_at(&mut self, row: u16, col: u16, n: u16) {
        let bg = self.pen.bg;
        let line = self.visible_row_mut(row);
        let col = col as usize;
        let n = n as usize;
        let len = line.cells.len();
        if col >= len {
            return;
        }
        for i in col..len {
            if i + n < len {
                line.cells[i] = line.cells[i + n];
            } else {
                line.cells[i].erase(bg);
            }
        }
    }

    pub fn erase_chars_at(&mut self, row: u16, col: u16, n: u16) {
        let bg = self.pen.bg;
        let line = self.visible_row_mut(row);
        let col = col as usize;
        let end = (col + n as usize).min(line.cells.len());
        for cell in line.cells[col..end].iter_mut() {
            cell.erase(bg);
        }
    }

    /// Erase the whole visible screen (does not touch scrollback).
    pub fn erase_display_all(&mut self) {
        let bg = self.pen.bg;
        for r in 0..self.rows {
            self.visible_row_mut(r).erase_with_bg(bg);
        }
    }

    pub fn erase_display_from_cursor(&mut self) {
        let (row, col) = (self.cursor_row, self.cursor_col);
        self.erase_line_from(row, col);
        let bg = self.pen.bg;
        for r in (row + 1)..self.rows {
            self.visible_row_mut(r).erase_with_bg(bg);
        }
    }

    pub fn erase_display_to_cursor(&mut self) {
        let (row, col) = (self.cursor_row, self.cursor_col);
        let bg = self.pen.bg;
        for r in 0..row {
            self.visible_row_mut(r).erase_with_bg(bg);
        }
        self.erase_line_to(row, col);
    }

    pub fn erase_line_all(&mut self, row: u16) {
        let bg = self.pen.bg;
        self.visible_row_mut(row).erase_with_bg(bg);
    }

    pub fn erase_line_from(&mut self, row: u16, col: u16) {
        let n = self.cols.saturating_sub(col);
        self.erase_chars_at(row, col, n);
    }

    pub fn erase_line_to(&mut self, row: u16, col: u16) {
        self.erase_chars_at(row, 0, col + 1);
    }

    pub fn tab_stop_at(&self, col: u16) -> bool {
        self.tab_stops.get(col as usize).copied().unwrap_or(false)
    }

    pub fn set_tab_stop(&mut self, col: u16) {
        if let Some(slot) = self.tab_stops.get_mut(col as usize) {
            *slot = true;
        }
    }

    pub fn clear_tab_stop(&mut self, col: u16) {
        if let Some(slot) = self.tab_stops.get_mut(col as usize) {
            *slot = false;
        }
    }

    pub fn clear_all_tab_stops(&mut self) {
        self.tab_stops.iter_mut().for_each(|t| *t = false);
    }

    pub fn next_tab_stop(&self, from: u16) -> u16 {
        ((from + 1)..self.cols)
            .find(|&c| self.tab_stop_at(c))
            .unwrap_or(self.cols - 1)
    }

    /// Resize the visible grid. No reflow: rows are clipped or padded with
    /// blank cells, never re-wrapped to the new width (see Open Questions).
    pub fn resize(&mut self, cols: u16, rows: u16) {
        let cols = cols.max(1);
        let rows = rows.max(1);

        for row in self.lines.iter_mut() {
            row.resize(cols);
        }

        if rows > self.rows {
            let grow = rows - self.rows;
            let available = self.lines.len() - self.rows as usize;
            let pull = grow.min(available as u16);
            for _ in 0..(grow - pull) {
                self.lines.push_front(Row::new(cols));
            }
        }
        // Shrinking just redraws fewer of the trailing rows as "visible";
        // the rows above remain buffered as scrollback.

        self.cols = cols;
        self.rows = rows;
        self.scroll_top = 0;
        self.scroll_bottom = rows - 1;
        self.tab_stops = default_tab_stops(cols);
        self.cursor_row = self.cursor_row.min(rows - 1);
        self.cursor_col = self.cursor_col.min(cols - 1);
        self.pending_wrap = false;
    }

    /// Reset to a blank screen at the current dimensions, discarding
    /// scrollback, cursor state, pen, modes, and tab stops. The color
    /// palette is reset to its default 256-entry table as well (see Open
    /// Questions: a full RIS clears palette customizations, matching real
    /// terminal behavior rather than leaving stale palette edits behind).
    pub fn reset(&mut self) {
        *self = Screen::new(self.cols, self.rows, self.max_scrollback);
    }
}

fn default_tab_stops(cols: u16) -> Vec<bool> {
    (0..cols).map(|c| c % 8 == 0).collect()
}

//! Cell and Row: the grid's atomic unit of content and one line of them.

use unicode_width::UnicodeWidthChar;

use super::color::Color;
use super::style::Style;

/// Which visual column a cell occupies for a (possibly wide) character.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Width {
    /// Occupies exactly one column.
    #[default]
    Narrow,
    /// Occupies this column and forces the next column into `SpacerTail`.
    Wide,
    /// The right half of a wide character. Never independently styled; a
    /// spacer-tail is always immediately preceded by a `Wide` cell in the
    /// same row.
    SpacerTail,
}

/// One grid column in one row.
///
/// `codepoint == '\0'` means "never written" (distinct from a written
/// space). A spacer-tail cell always carries `'\0'` and `Width::SpacerTail`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cell {
    pub codepoint: char,
    pub style: Style,
    pub width: Width,
}

impl Default for Cell {
    fn default() -> Self {
        Self {
            codepoint: '\0',
            style: Style::new(),
            width: Width::Narrow,
        }
    }
}

impl Cell {
    /// Create the trailing spacer half of a wide character.
    pub fn spacer_tail() -> Self {
        Self {
            codepoint: '\0',
            style: Style::new(),
            width: Width::SpacerTail,
        }
    }

    /// Reset to the default, unwritten blank cell.
    pub fn clear(&mut self) {
        *self = Cell::default();
    }

    /// Erase this cell, painting it with `bg` (ECMA-48 erase semantics:
    /// erased cells carry the current background). When `bg` is absent
    /// (no color set), the cell is left trimmable — `codepoint` goes back
    /// to `'\0'` just like an unwritten cell, so a trailing `CSI K`/`CSI J`
    /// against the default background doesn't pad extracted rows out to
    /// full width with written spaces. A concrete `bg` (e.g. `\x1b[41m`)
    /// keeps `codepoint == ' '` so the painted span survives trailing trim.
    pub fn erase(&mut self, bg: Color) {
        self.codepoint = if bg == Color::Default { '\0' } else { ' ' };
        self.style = Style {
            fg: Color::Default,
            bg,
            attrs: Default::default(),
        };
        self.width = Width::Narrow;
    }

    /// East-Asian-Width-derived display width of `c`: 2 for wide
    /// characters, 1 otherwise. Ambiguous-width characters are treated as
    /// narrow.
    pub fn char_width(c: char) -> u16 {
        match UnicodeWidthChar::width(c) {
            Some(2) => 2,
            _ => 1,
        }
    }
}

/// One row of exactly `cols` cells.
#[derive(Debug, Clone)]
pub struct Row {
    pub cells: Vec<Cell>,
}

impl Row {
    pub fn new(cols: u16) -> Self {
        Self {
            cells: vec![Cell::default(); cols as usize],
        }
    }

    pub fn resize(&mut self, cols: u16) {
        self.cells.resize(cols as usize, Cell::default());
    }

    pub fn clear(&mut self) {
        for cell in &mut self.cells {
            cell.clear();
        }
    }

    pub fn erase_with_bg(&mut self, bg: Color) {
        for cell in &mut self.cells {
            cell.erase(bg);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_row_has_exactly_cols_cells() {
        let row = Row::new(10);
        assert_eq!(row.cells.len(), 10);
    }

    #[test]
    fn default_cell_is_unwritten() {
        let cell = Cell::default();
        assert_eq!(cell.codepoint, '\0');
        assert_eq!(cell.width, Width::Narrow);
    }

    #[test]
    fn wide_char_width_is_two() {
        assert_eq!(Cell::char_width('a'), 1);
        assert_eq!(Cell::char_width('\u{4e16}'), 2); // 世
    }

    #[test]
    fn erase_paints_current_background() {
        let mut cell = Cell::default();
        cell.erase(Color::Rgb(1, 2, 3));
        assert_eq!(cell.codepoint, ' ');
        assert_eq!(cell.style.bg, Color::Rgb(1, 2, 3));
        assert_eq!(cell.style.fg, Color::Default);
    }

    #[test]
    fn erase_with_default_background_is_trimmable() {
        let mut cell = Cell::default();
        cell.codepoint = 'x';
        cell.erase(Color::Default);
        assert_eq!(cell.codepoint, '\0');
        assert_eq!(cell.style.bg, Color::Default);
    }

    #[test]
    fn erase_with_concrete_background_survives_trim() {
        let mut cell = Cell::default();
        cell.erase(Color::Indexed(1));
        assert_eq!(cell.codepoint, ' ');
        assert_eq!(cell.style.bg, Color::Indexed(1));
    }
}

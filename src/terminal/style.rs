//! Style: the resolved appearance of a cell (colors + attribute flags).

use bitflags::bitflags;

use super::color::Color;

bitflags! {
    /// Text attributes as a compact bitflag set.
    ///
    /// The bit values are part of the external contract and must not
    /// change: bold=1, italic=2, underline=4, strikethrough=8,
    /// inverse=16, faint=32.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
    pub struct Attrs: u8 {
        const BOLD          = 1 << 0;
        const ITALIC        = 1 << 1;
        const UNDERLINE     = 1 << 2;
        const STRIKETHROUGH = 1 << 3;
        const INVERSE       = 1 << 4;
        const FAINT         = 1 << 5;
    }
}

/// Foreground, background, and attributes for one cell (or the cursor's
/// pending write style). Two styles are equal iff all three fields are
/// equal; `Color::Default` never compares equal to a concrete color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Style {
    pub fg: Color,
    pub bg: Color,
    pub attrs: Attrs,
}

impl Style {
    pub const fn new() -> Self {
        Self {
            fg: Color::Default,
            bg: Color::Default,
            attrs: Attrs::empty(),
        }
    }

    /// The numeric attribute bitmask used in the JSON `flags` field.
    pub fn flags(&self) -> u32 {
        self.attrs.bits() as u32
    }
}

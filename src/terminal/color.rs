//! Terminal color representation: absent/indexed/truecolor, plus the
//! 256-entry palette that resolves an index to concrete RGB.

/// A color as recorded on a cell or cursor.
///
/// `Default` (absent) is not the same as any concrete color — two `Style`s
/// differ if one has `Default` and the other has, say, `Rgb(0, 0, 0)`, even
/// though black often renders identically to "no color set".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Color {
    Default,
    Indexed(u8),
    Rgb(u8, u8, u8),
}

impl Default for Color {
    fn default() -> Self {
        Color::Default
    }
}

impl Color {
    /// Resolve this color to concrete RGB using `palette`, or `None` if
    /// this color is absent (the caller decides what "default" means).
    pub fn resolve(&self, palette: &Palette) -> Option<(u8, u8, u8)> {
        match *self {
            Color::Default => None,
            Color::Indexed(i) => Some(palette.get(i)),
            Color::Rgb(r, g, b) => Some((r, g, b)),
        }
    }
}

/// A configurable 256-entry color table owned by the emulator.
///
/// Changing an entry takes effect on future reads (re-extracting JSON or
/// HTML resolves colors against the current table) but does not rewrite
/// cells that already recorded a palette index — cells store the index, not
/// the resolved color, so a later palette mutation changes how old content
/// is displayed, matching real terminal palette-swap behavior.
#[derive(Debug, Clone, PartialEq)]
pub struct Palette {
    entries: [(u8, u8, u8); 256],
}

impl Palette {
    pub fn get(&self, index: u8) -> (u8, u8, u8) {
        self.entries[index as usize]
    }

    pub fn set(&mut self, index: u8, rgb: (u8, u8, u8)) {
        self.entries[index as usize] = rgb;
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            entries: default_entries(),
        }
    }
}

/// Build the standard xterm 256-color table: 16 ANSI colors, a 6x6x6 color
/// cube, and a 24-step grayscale ramp.
fn default_entries() -> [(u8, u8, u8); 256] {
    let mut entries = [(0u8, 0u8, 0u8); 256];

    const ANSI_16: [(u8, u8, u8); 16] = [
        (0x00, 0x00, 0x00),
        (0x80, 0x00, 0x00),
        (0x00, 0x80, 0x00),
        (0x80, 0x80, 0x00),
        (0x00, 0x00, 0x80),
        (0x80, 0x00, 0x80),
        (0x00, 0x80, 0x80),
        (0xc0, 0xc0, 0xc0),
        (0x80, 0x80, 0x80),
        (0xff, 0x00, 0x00),
        (0x00, 0xff, 0x00),
        (0xff, 0xff, 0x00),
        (0x00, 0x00, 0xff),
        (0xff, 0x00, 0xff),
        (0x00, 0xff, 0xff),
        (0xff, 0xff, 0xff),
    ];
    entries[..16].copy_from_slice(&ANSI_16);

    for idx in 16..232u16 {
        let i = idx - 16;
        let r = i / 36;
        let g = (i % 36) / 6;
        let b = i % 6;
        let to_val = |v: u16| if v == 0 { 0 } else { (55 + 40 * v) as u8 };
        entries[idx as usize] = (to_val(r), to_val(g), to_val(b));
    }

    for idx in 232..256u16 {
        let v = (8 + 10 * (idx - 232)) as u8;
        entries[idx as usize] = (v, v, v);
    }

    entries
}

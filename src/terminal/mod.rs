//! Data model: colors, styles, cells, rows, and the screen buffer that
//! arranges them. No parsing lives here — this module only describes state.

pub mod cell;
pub mod color;
pub mod modes;
pub mod screen;
pub mod style;

pub use cell::{Cell, Row, Width};
pub use color::{Color, Palette};
pub use modes::TerminalModes;
pub use screen::Screen;
pub use style::{Attrs, Style};

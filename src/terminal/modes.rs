//! Terminal modes: the small set of toggles that change how the parser and
//! screen interpret subsequent input.

/// Mode toggles relevant to a non-interactive emulator.
///
/// This is a deliberately trimmed set compared to a full interactive
/// terminal (no mouse tracking, bracketed paste, or focus events — this
/// engine never forwards input, so those modes would have no observer).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TerminalModes {
    /// DECTCEM. Whether the cursor should be considered visible.
    pub cursor_visible: bool,
    /// DECAWM. Whether writing into the last column arms pending-wrap
    /// instead of silently stopping.
    pub autowrap: bool,
    /// LNM. When set, a bare line feed also returns the cursor to column 0.
    ///
    /// Defaults to `true` here, diverging from a typical interactive
    /// terminal's `false` default: callers feeding line-oriented program
    /// output (the common case for this engine) almost always expect `\n`
    /// alone to behave like a newline, and defaulting to `false` reproduces
    /// the classic "staircase" bug where text marches rightward with each
    /// line.
    pub linefeed_newline: bool,
    /// IRM. When set, printed characters push existing content right
    /// instead of overwriting it.
    pub insert: bool,
}

impl Default for TerminalModes {
    fn default() -> Self {
        Self {
            cursor_visible: true,
            autowrap: true,
            linefeed_newline: true,
            insert: false,
        }
    }
}

//! Walks a [`Screen`] and emits JSON, plain text, or HTML.
//!
//! All three share the span-merging cell walk in [`row_spans`]; they differ
//! only in how a row's spans are serialized.

use serde::Serialize;

use crate::terminal::{Color, Row, Screen, Style, Width};

/// `(text, fg, bg, flags, width)` — serde serializes tuples as JSON arrays,
/// so this hits the bit-exact 5-element span contract with no hand-written
/// `Serialize` impl.
pub type Span = (String, Option<String>, Option<String>, u32, u32);

#[derive(Debug, Serialize)]
pub struct JsonDocument {
    pub cols: u32,
    pub rows: u32,
    pub cursor: [u32; 2],
    #[serde(rename = "cursorVisible")]
    pub cursor_visible: bool,
    pub offset: u32,
    #[serde(rename = "totalLines")]
    pub total_lines: u32,
    pub lines: Vec<Vec<Span>>,
}

fn to_hex((r, g, b): (u8, u8, u8)) -> String {
    format!("#{r:02x}{g:02x}{b:02x}")
}

fn resolve_bg(bg: Color, screen: &Screen) -> Option<String> {
    let resolved = bg.resolve(&screen.palette)?;
    if screen.default_bg.resolve(&screen.palette) == Some(resolved) {
        None
    } else {
        Some(to_hex(resolved))
    }
}

/// The merge key: a style's *resolved* appearance, not its raw
/// representation. Two cells with different `Color` representations that
/// resolve to the same concrete RGB (e.g. `Indexed(196)` against the
/// default palette and a literal `Rgb(255,0,0)` both resolving to
/// `#ff0000`) must merge into one span per spec §4.3 — comparing raw
/// `Style` equality would split them since `Indexed(196) != Rgb(255,0,0)`.
type ResolvedKey = (Option<String>, Option<String>, u32);

fn resolve_key(style: Style, screen: &Screen) -> ResolvedKey {
    let fg = style.fg.resolve(&screen.palette).map(to_hex);
    let bg = resolve_bg(style.bg, screen);
    (fg, bg, style.flags())
}

fn finalize_span(key: ResolvedKey, text: String, width: u32) -> Span {
    let (fg, bg, flags) = key;
    (text, fg, bg, flags, width)
}

/// Trim trailing never-written cells, then merge consecutive cells sharing
/// a resolved style into spans. Internal never-written cells (a gap left by
/// e.g. a tab) render as spaces so column alignment survives.
pub fn row_spans(row: &Row, screen: &Screen) -> Vec<Span> {
    let Some(last) = row.cells.iter().rposition(|c| c.codepoint != '\0') else {
        return Vec::new();
    };

    let mut spans = Vec::new();
    let mut current: Option<(ResolvedKey, String, u32)> = None;

    for cell in &row.cells[..=last] {
        if cell.width == Width::SpacerTail {
            continue;
        }
        let ch = if cell.codepoint == '\0' { ' ' } else { cell.codepoint };
        let width = if cell.width == Width::Wide { 2 } else { 1 };
        let key = resolve_key(cell.style, screen);

        match &mut current {
            Some((current_key, text, total_width)) if *current_key == key => {
                text.push(ch);
                *total_width += width;
            }
            _ => {
                if let Some((key, text, total_width)) = current.take() {
                    spans.push(finalize_span(key, text, total_width));
                }
                current = Some((key, ch.to_string(), width));
            }
        }
    }
    if let Some((key, text, total_width)) = current.take() {
        spans.push(finalize_span(key, text, total_width));
    }
    spans
}

fn row_range(total: usize, offset: u32, limit: u32) -> (usize, usize) {
    let offset = offset as usize;
    let take = if limit == 0 { usize::MAX } else { limit as usize };
    let end = offset.saturating_add(take).min(total);
    (offset.min(total), end)
}

/// Build the bit-exact JSON document for `screen`.
pub fn extract_json(screen: &Screen, offset: u32, limit: u32) -> JsonDocument {
    let total_lines = screen.row_count() as u32;
    let (start, end) = row_range(screen.row_count(), offset, limit);
    let lines = screen
        .iter_rows()
        .skip(start)
        .take(end - start)
        .map(|row| row_spans(row, screen))
        .collect();

    JsonDocument {
        cols: screen.cols() as u32,
        rows: screen.rows() as u32,
        cursor: [screen.cursor_col() as u32, screen.cursor_row() as u32],
        cursor_visible: screen.cursor_visible(),
        offset,
        total_lines,
        lines,
    }
}

/// Serialize `screen` directly to a JSON string.
pub fn to_json_string(screen: &Screen, offset: u32, limit: u32) -> serde_json::Result<String> {
    serde_json::to_string(&extract_json(screen, offset, limit))
}

/// Plain-text projection: rows trimmed of trailing never-written cells,
/// joined with `\n`. No escape sequences, no ANSI reconstruction.
pub fn extract_text(screen: &Screen, offset: u32, limit: u32) -> String {
    let (start, end) = row_range(screen.row_count(), offset, limit);
    let mut out = String::new();
    for (i, row) in screen.iter_rows().skip(start).take(end - start).enumerate() {
        if i > 0 {
            out.push('\n');
        }
        if let Some(last) = row.cells.iter().rposition(|c| c.codepoint != '\0') {
            for cell in &row.cells[..=last] {
                if cell.width == Width::SpacerTail {
                    continue;
                }
                out.push(if cell.codepoint == '\0' { ' ' } else { cell.codepoint });
            }
        }
    }
    out
}

/// HTML projection: one inline-styled `<span>` per merged span, rows joined
/// with `\n`. Not a bit-exact contract — only required to round-trip
/// visually.
pub fn extract_html(screen: &Screen, offset: u32, limit: u32) -> String {
    let (start, end) = row_range(screen.row_count(), offset, limit);
    let mut out = String::new();
    for (i, row) in screen.iter_rows().skip(start).take(end - start).enumerate() {
        if i > 0 {
            out.push('\n');
        }
        for span in row_spans(row, screen) {
            out.push_str(&span_to_html(&span));
        }
    }
    out
}

fn span_to_html(span: &Span) -> String {
    let (text, fg, bg, flags, _width) = span;
    let inverse = flags & 16 != 0;
    let (fg, bg) = if inverse {
        (bg.clone(), fg.clone())
    } else {
        (fg.clone(), bg.clone())
    };

    let mut style = String::new();
    if let Some(fg) = fg {
        style.push_str(&format!("color:{fg};"));
    }
    if let Some(bg) = bg {
        style.push_str(&format!("background-color:{bg};"));
    }
    if flags & 1 != 0 {
        style.push_str("font-weight:bold;");
    }
    if flags & 32 != 0 {
        style.push_str("opacity:0.7;");
    }
    if flags & 2 != 0 {
        style.push_str("font-style:italic;");
    }
    let mut decorations = Vec::new();
    if flags & 4 != 0 {
        decorations.push("underline");
    }
    if flags & 8 != 0 {
        decorations.push("line-through");
    }
    if !decorations.is_empty() {
        style.push_str(&format!("text-decoration:{};", decorations.join(" ")));
    }

    format!("<span style=\"{}\">{}</span>", style, html_escape(text))
}

fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::Parser;
    use pretty_assertions::assert_eq;

    fn emulate(input: &str, cols: u16, rows: u16) -> Screen {
        let mut screen = Screen::new(cols, rows, None);
        let mut parser = Parser::new();
        parser.feed(&mut screen, input.as_bytes()).unwrap();
        screen
    }

    #[test]
    fn scenario_a_colored_span_and_cursor() {
        let screen = emulate("\x1b[32mHello\x1b[0m World", 80, 24);
        let doc = extract_json(&screen, 0, 0);
        let first_line = &doc.lines[0];
        assert_eq!(first_line[0].0, "Hello");
        assert_eq!(first_line[0].1.as_deref(), Some("#008000"));
        assert_eq!(first_line[0].3, 0);
        assert_eq!(first_line[1], (" World".to_string(), None, None, 0, 6));
        assert_eq!(doc.cursor, [11, 0]);
    }

    #[test]
    fn erase_line_with_default_background_trims_trailing_tail() {
        let screen = emulate("\x1b[31mERROR\x1b[0m\x1b[K", 120, 24);
        let doc = extract_json(&screen, 0, 0);
        assert_eq!(doc.lines[0].len(), 1);
        assert_eq!(doc.lines[0][0].0, "ERROR");
        let text = extract_text(&screen, 0, 0);
        assert_eq!(text.lines().next(), Some("ERROR"));
    }

    #[test]
    fn scenario_b_combined_attribute_flags() {
        let screen = emulate("\x1b[1;3;4mstyles\x1b[0m", 80, 24);
        let doc = extract_json(&screen, 0, 0);
        assert_eq!(doc.lines[0][0], ("styles".to_string(), None, None, 7, 6));
    }

    #[test]
    fn scenario_c_truecolor_hex() {
        let screen = emulate("\x1b[38;2;255;0;128mrgb\x1b[0m", 80, 24);
        let doc = extract_json(&screen, 0, 0);
        assert_eq!(doc.lines[0][0].1.as_deref(), Some("#ff0080"));
    }

    #[test]
    fn scenario_e_limit_caps_emitted_lines() {
        let mut input = String::new();
        for n in 1..=1000 {
            input.push_str(&format!("Line {n}\n"));
        }
        let screen = emulate(&input, 80, 24);
        let doc = extract_json(&screen, 0, 10);
        assert_eq!(doc.lines.len(), 10);
        assert!(doc.lines[9][0].0.contains("Line 10"));
    }

    #[test]
    fn limit_preserves_prefix_of_unlimited_output() {
        let mut input = String::new();
        for n in 1..=50 {
            input.push_str(&format!("Line {n}\n"));
        }
        let screen = emulate(&input, 80, 24);
        let full = extract_json(&screen, 0, 0);
        let limited = extract_json(&screen, 0, 20);
        assert_eq!(&full.lines[..20], &limited.lines[..]);
    }

    #[test]
    fn span_merging_never_emits_adjacent_equal_styles() {
        let screen = emulate("\x1b[31mred\x1b[32mgreen\x1b[0mplain", 80, 24);
        let spans = row_spans(screen.visible_row(0), &screen);
        for pair in spans.windows(2) {
            let a = (&pair[0].1, &pair[0].2, pair[0].3);
            let b = (&pair[1].1, &pair[1].2, pair[1].3);
            assert_ne!(a, b);
        }
    }

    #[test]
    fn merges_indexed_and_truecolor_cells_that_resolve_to_the_same_rgb() {
        // Index 196 resolves to (255,0,0) under the default palette's cube
        // math, identical to the literal truecolor RGB set for the second
        // character. The two cells must merge into one span: merging keys
        // off resolved appearance, not raw `Color` representation.
        let screen = emulate("\x1b[38;5;196mA\x1b[38;2;255;0;0mB\x1b[0m", 80, 24);
        let doc = extract_json(&screen, 0, 0);
        assert_eq!(doc.lines[0].len(), 1);
        assert_eq!(doc.lines[0][0], ("AB".to_string(), Some("#ff0000".to_string()), None, 0, 2));
    }

    #[test]
    fn flags_never_set_bits_outside_defined_six() {
        let screen = emulate("\x1b[1;2;3;4;7;9mloud\x1b[0m", 80, 24);
        let doc = extract_json(&screen, 0, 0);
        assert_eq!(doc.lines[0][0].3 & !63, 0);
    }

    #[test]
    fn palette_mutation_after_write_changes_reextraction() {
        let mut screen = emulate("\x1b[31mred\x1b[0m", 80, 24);
        screen.palette.set(1, (9, 9, 9));
        let doc = extract_json(&screen, 0, 0);
        assert_eq!(doc.lines[0][0].1.as_deref(), Some("#090909"));
    }

    #[test]
    fn background_equal_to_default_reports_null() {
        let mut screen = Screen::new(10, 2, None);
        screen.default_bg = Color::Rgb(0, 0, 0);
        screen.pen.bg = Color::Rgb(0, 0, 0);
        screen.write_char('x');
        let doc = extract_json(&screen, 0, 0);
        assert_eq!(doc.lines[0][0].2, None);
    }

    #[test]
    fn plain_text_has_no_escape_bytes() {
        let screen = emulate("\x1b[32mHello\x1b[0m World", 80, 24);
        let text = extract_text(&screen, 0, 0);
        assert_eq!(text.lines().next(), Some("Hello World"));
        assert!(!text.contains('\x1b'));
    }

    #[test]
    fn span_widths_never_exceed_cols() {
        let screen = emulate(
            "\x1b[31mred\x1b[0m \u{4e16}\u{754c} plain text padding out the row",
            20,
            3,
        );
        let doc = extract_json(&screen, 0, 0);
        for line in &doc.lines {
            let total_width: u32 = line.iter().map(|s| s.4).sum();
            assert!(total_width <= doc.cols, "row exceeded cols: {total_width} > {}", doc.cols);
        }
    }

    #[test]
    fn html_wraps_each_span_and_keeps_text() {
        let screen = emulate("\x1b[1mbold\x1b[0m", 80, 24);
        let html = extract_html(&screen, 0, 0);
        assert!(html.contains("font-weight:bold"));
        assert!(html.contains("bold</span>"));
    }
}

//! Terminal text helpers: cursor control, alignment, sizes.

/// Hides the cursor.
pub const HIDE_CURSOR: &str = "\x1b[?25l";

/// Shows the cursor.
pub const SHOW_CURSOR: &str = "\x1b[?25h";

const SIZE_UNITS: &[&str] = &["B", "kB", "MB", "GB", "TB", "PB", "EB", "ZB", "YB"];

/// Display width of `s`, ignoring escape sequences.
pub fn visible_width(s: &str) -> usize {
    console::measure_text_width(s)
}

/// Prefix that moves the cursor back to the top of the previous frame.
///
/// `previous_lines` is the number of body lines drawn last time, or `None`
/// before the first frame. The header line is included in the move.
pub fn cursor_reposition(previous_lines: Option<usize>) -> String {
    match previous_lines {
        None => "\r".to_string(),
        Some(lines) => format!("\x1b[{}A\r", lines + 1),
    }
}

/// Place `left` and `right` on one line of `width` columns.
///
/// The right text is pushed to the edge with spaces. If both don't fit, only
/// `left` is returned.
pub fn align(left: &str, right: &str, width: usize) -> String {
    let used = visible_width(left) + visible_width(right);
    if width == 0 || used > width {
        return left.to_string();
    }
    format!("{}{}{}", left, " ".repeat(width - used), right)
}

/// Cut `text` to `max` characters, marking the cut with `...`.
///
/// A `max` of zero leaves the text alone.
pub fn truncate_status(text: &str, max: usize) -> String {
    if max == 0 || text.chars().count() <= max {
        return text.to_string();
    }
    let kept: String = text.chars().take(max).collect();
    format!("{}...", kept)
}

/// Human readable byte count with decimal units, e.g. `1.5MB`.
pub fn human_size(bytes: u64) -> String {
    let mut size = bytes as f64;
    let mut unit = 0;
    while size >= 1000.0 && unit < SIZE_UNITS.len() - 1 {
        size /= 1000.0;
        unit += 1;
    }
    format!("{}{}", significant(size, 4), SIZE_UNITS[unit])
}

/// Format `value` with at most `digits` significant digits, trailing zeros
/// removed.
fn significant(value: f64, digits: usize) -> String {
    if value == 0.0 {
        return "0".to_string();
    }
    let integer_digits = (value.abs().log10().floor() as i64 + 1).max(1) as usize;
    let decimals = digits.saturating_sub(integer_digits);
    let formatted = format!("{:.*}", decimals, value);
    if formatted.contains('.') {
        formatted
            .trim_end_matches('0')
            .trim_end_matches('.')
            .to_string()
    } else {
        formatted
    }
}

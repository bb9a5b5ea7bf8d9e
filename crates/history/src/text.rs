//! Pure text helpers: normalization, previews, human-readable sizes

/// Longest rendered preview in characters, ellipsis included.
pub const PREVIEW_MAX_CHARS: usize = 120;

/// Canonicalize line endings and strip trailing junk.
///
/// CRLF pairs become LF, then any trailing run of newlines, carriage
/// returns, tabs and spaces is removed. Leading and interior whitespace
/// is left alone.
pub fn normalize(input: &str) -> String {
    let unified = input.replace("\r\n", "\n");
    unified.trim_end_matches(['\n', '\r', '\t', ' ']).to_string()
}

/// True when the text is empty or whitespace-only.
pub fn is_blank(text: &str) -> bool {
    text.trim().is_empty()
}

/// Text before the first line break (the whole text when single-line).
pub fn first_line(text: &str) -> &str {
    text.split('\n').next().unwrap_or("")
}

/// Number of lines in the text: `\n` occurrences plus one.
pub fn line_count(text: &str) -> usize {
    text.bytes().filter(|&b| b == b'\n').count() + 1
}

/// Render a byte count as `B`, `KB` or `MB`, one decimal above 1 KiB.
pub fn human_bytes(bytes: usize) -> String {
    if bytes < 1024 {
        format!("{bytes}B")
    } else if bytes < 1024 * 1024 {
        format!("{:.1}KB", bytes as f64 / 1024.0)
    } else {
        format!("{:.1}MB", bytes as f64 / (1024.0 * 1024.0))
    }
}

/// Escape a preview for a quoted list row: tabs become spaces, double
/// quotes are escaped, and text longer than [`PREVIEW_MAX_CHARS`] is cut
/// to 119 characters plus an ellipsis.
pub fn escape_preview(text: &str) -> String {
    let escaped = text.replace('\t', " ").replace('"', "\\\"");
    if escaped.chars().count() > PREVIEW_MAX_CHARS {
        let mut cut: String = escaped.chars().take(PREVIEW_MAX_CHARS - 1).collect();
        cut.push('…');
        cut
    } else {
        escaped
    }
}

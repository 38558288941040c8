//! Utility functions for the Nota compiler

use crate::core::constants::{MAX_FRACTION_DIGITS, SOURCE_EXTENSION};
use std::path::{Path, PathBuf};

/// Escape text for use as HTML content or a double-quoted attribute value
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

/// Escape text so it can sit inside a JS template literal within a `<script>` block
pub fn escape_template_literal(text: &str) -> String {
    text.replace('\\', "\\\\")
        .replace('`', "\\`")
        .replace("${", "\\${")
        .replace("</", "<\\/")
}

/// Escape text for a single-quoted JS string within a `<script>` block
pub fn escape_js_string(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    while let Some(ch) = chars.next() {
        match ch {
            '\\' => escaped.push_str("\\\\"),
            '\'' => escaped.push_str("\\'"),
            '\n' => escaped.push_str("\\n"),
            '\r' => escaped.push_str("\\r"),
            '\u{2028}' => escaped.push_str("\\u2028"),
            '\u{2029}' => escaped.push_str("\\u2029"),
            '<' if chars.peek() == Some(&'/') => escaped.push_str("<\\"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

/// Convert an import path to a filesystem path relative to `base_dir`.
///
/// Paths that already name a file (`"widgets/button.nota"`, `"../x.nota"`)
/// are taken literally. Dotted module paths such as `ui.widgets` map to
/// `ui/widgets.nota`.
pub fn resolve_import_path(base_dir: &Path, import_path: &str) -> PathBuf {
    let is_literal = import_path.contains('/')
        || import_path.contains('\\')
        || import_path.ends_with(&format!(".{}", SOURCE_EXTENSION));

    if is_literal {
        return base_dir.join(import_path);
    }

    let mut path = base_dir.to_path_buf();
    for segment in import_path.split('.') {
        path.push(segment);
    }
    path.set_extension(SOURCE_EXTENSION);
    path
}

/// Format a number with at most four fractional digits, trailing zeros trimmed
pub fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        return format!("{}", value as i64);
    }

    let formatted = format!("{:.*}", MAX_FRACTION_DIGITS, value);
    let trimmed = formatted.trim_end_matches('0').trim_end_matches('.');
    if trimmed == "-0" {
        "0".to_string()
    } else {
        trimmed.to_string()
    }
}

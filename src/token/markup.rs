//! The renderable markup the editor's rich-text surface works with.
//!
//! References render as non-editable badge spans, newlines as `<br>`, and all other
//! text is entity escaped.

use once_cell::sync::Lazy;
use regex::Regex;

pub(super) const LINE_BREAK: &str = "<br>";
const CARRIAGE_RETURN: &str = "&#13;";

/// Matches a badge span (capturing its class and inner text), a `<br>` variant, or a
/// raw carriage-return line ending. The class attribute may appear anywhere in the tag.
pub(super) static RENDERED_PATTERN: Lazy<Regex> = Lazy::new(|| {
    static_regex!(
        r#"(?s)<span\b[^>]*?\sclass="([^"]*)"[^>]*>(.*?)</span>|<br\s*/?>|\r\n?"#,
        "RENDERED_PATTERN"
    )
});

pub(super) fn badge(class: &str, label: &str) -> String {
    format!(
        r#"<span class="{}" contenteditable="false">{}</span>"#,
        class,
        escape(label)
    )
}

pub(super) fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '\r' => out.push_str(CARRIAGE_RETURN),
            _ => out.push(ch),
        }
    }
    out
}

/// Reverses `escape` and folds the editor's non-breaking spaces into plain spaces.
pub(super) fn unescape(text: &str) -> String {
    if !text.contains('&') {
        return text.to_string();
    }
    text.replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace(CARRIAGE_RETURN, "\r")
        .replace("&amp;", "&")
}

/// Escapes text and renders its newlines as line breaks. A stored `\r` becomes a
/// character reference so it is not read back as a line ending.
pub(super) fn render_text(text: &str) -> String {
    escape(text).replace('\n', LINE_BREAK)
}

//! Formatting utilities for Telegram MarkdownV2.

/// Characters with special meaning in Telegram MarkdownV2.
pub const MARKDOWN_V2_RESERVED: &str = "*_[]()~`>#+-=|{}.!";

/// Escape MarkdownV2 special characters by prefixing each with `\`.
///
/// Not idempotent: escaping twice double-escapes. Escape each piece of
/// untrusted text exactly once, then glue pieces together with markup.
pub fn escape_markdown(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + text.len() / 4);
    for c in text.chars() {
        if MARKDOWN_V2_RESERVED.contains(c) {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// Plain-text reply for any operation that failed on the video store.
pub const STORE_UNAVAILABLE_TEXT: &str =
    "⚠ Storage is unavailable right now. Please try again later.";

/// Bold span with escaped content.
///
/// `\` is not in the reserved set, so text ending in `\` escapes the closing
/// `*` and Telegram rejects the message.
pub fn bold(text: &str) -> String {
    format!("*{}*", escape_markdown(text))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_every_reserved_char() {
        for c in MARKDOWN_V2_RESERVED.chars() {
            assert_eq!(escape_markdown(&c.to_string()), format!("\\{c}"));
        }
    }

    #[test]
    fn leaves_other_chars_alone() {
        let s = "Hello world, 123 ? привет 🎥 \\ / @ $ % ^ & : ; ' \"";
        assert_eq!(escape_markdown(s), s);
    }

    #[test]
    fn escapes_url_and_title() {
        assert_eq!(
            escape_markdown("https://youtu.be/a_b-c?x=1"),
            "https://youtu\\.be/a\\_b\\-c?x\\=1"
        );
        assert_eq!(
            escape_markdown("Rust (2024) - intro!"),
            "Rust \\(2024\\) \\- intro\\!"
        );
    }

    #[test]
    fn escaping_twice_double_escapes() {
        assert_eq!(escape_markdown(&escape_markdown(".")), "\\\\.");
    }

    #[test]
    fn bold_wraps_escaped_text() {
        assert_eq!(bold("a.b"), "*a\\.b*");
    }

    #[test]
    fn backslash_passes_through_unescaped() {
        assert_eq!(escape_markdown("C:\\dir\\"), "C:\\dir\\");
        // Closing marker ends up escaped.
        assert_eq!(bold("dir\\"), "*dir\\*");
        assert!(bold("dir\\").ends_with("\\*"));
    }
}

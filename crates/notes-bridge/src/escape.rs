//! Embedding caller text in AppleScript string literals.

/// Escape a string for use inside a double-quoted AppleScript literal.
///
/// Backslashes are doubled before quotes are escaped; the reverse order
/// would double the backslashes introduced for the quotes.
pub fn escape(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}

/// Escape a note body and turn its line breaks into `<br>` markup.
pub fn format_body(value: &str) -> String {
    if value.is_empty() {
        return String::new();
    }
    escape(value)
        .replace("\r\n", "<br>")
        .replace(['\n', '\r'], "<br>")
}

/// Reverse of [`escape`], following AppleScript's literal rules for `\\`
/// and `\"`. Other escapes are kept verbatim.
pub fn unescape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut chars = value.chars();
    while let Some(ch) = chars.next() {
        if ch != '\\' {
            out.push(ch);
            continue;
        }
        match chars.next() {
            Some(next @ ('\\' | '"')) => out.push(next),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_stays_empty() {
        assert_eq!(escape(""), "");
        assert_eq!(format_body(""), "");
    }

    #[test]
    fn escape_simple() {
        assert_eq!(escape("hello"), "hello");
    }

    #[test]
    fn escape_quotes() {
        assert_eq!(escape("He said \"hi\""), "He said \\\"hi\\\"");
    }

    #[test]
    fn escape_backslashes() {
        assert_eq!(escape("C:\\Path\\To\\File"), "C:\\\\Path\\\\To\\\\File");
    }

    #[test]
    fn escape_backslash_before_quote() {
        // One backslash then a quote: both survive as distinct escapes.
        assert_eq!(escape("a\\\"b"), "a\\\\\\\"b");
    }

    #[test]
    fn body_line_breaks_become_markup() {
        assert_eq!(format_body("a\nb\nc"), "a<br>b<br>c");
        assert_eq!(format_body("a\r\nb"), "a<br>b");
    }

    #[test]
    fn body_is_escaped_too() {
        assert_eq!(format_body("say \"x\"\nnext"), "say \\\"x\\\"<br>next");
    }

    #[test]
    fn unescape_round_trips() {
        for sample in [
            "",
            "plain",
            "quote \" inside",
            "trailing backslash \\",
            "\\\"\\\\\"",
            "multi\nline",
        ] {
            let escaped = escape(sample);
            assert!(!has_unescaped_quote(&escaped), "{escaped:?}");
            assert_eq!(unescape(&escaped), sample);
        }
    }

    fn has_unescaped_quote(escaped: &str) -> bool {
        let mut backslashes = 0;
        for ch in escaped.chars() {
            match ch {
                '\\' => backslashes += 1,
                '"' if backslashes % 2 == 0 => return true,
                _ => backslashes = 0,
            }
            if ch != '\\' {
                backslashes = 0;
            }
        }
        backslashes % 2 == 1
    }
}

//! Quote handling and backslash escapes.
//!
//! Decoding understands `\n \r \t \b \f \" \\ \$ \~` and `\u{HEX}` code
//! points. Any other backslash sequence is kept as written.

/// Strips one pair of surrounding double quotes, if present.
///
/// # Examples
///
/// ```rust
/// use lacon::escape::unwrap_quotes;
///
/// assert_eq!(unwrap_quotes("\"hi\""), "hi");
/// assert_eq!(unwrap_quotes("hi"), "hi");
/// assert_eq!(unwrap_quotes("\""), "\"");
/// ```
#[must_use]
pub fn unwrap_quotes(text: &str) -> &str {
    if is_quoted(text) {
        &text[1..text.len() - 1]
    } else {
        text
    }
}

/// Returns `true` when `text` starts and ends with a double quote.
#[inline]
#[must_use]
pub fn is_quoted(text: &str) -> bool {
    text.len() >= 2 && text.starts_with('"') && text.ends_with('"')
}

/// Decodes backslash escapes.
///
/// # Examples
///
/// ```rust
/// use lacon::escape::unescape;
///
/// assert_eq!(unescape(r"a\tb"), "a\tb");
/// assert_eq!(unescape(r"\u{1F600}"), "\u{1F600}");
/// assert_eq!(unescape(r"cost \$5"), "cost $5");
/// assert_eq!(unescape(r"\q"), r"\q");
/// ```
#[must_use]
pub fn unescape(text: &str) -> String {
    if !text.contains('\\') {
        return text.to_string();
    }

    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(pos) = rest.find('\\') {
        out.push_str(&rest[..pos]);
        let tail = &rest[pos + 1..];
        let (decoded, used) = decode_escape(tail);
        match decoded {
            Some(ch) => {
                out.push(ch);
                rest = &tail[used..];
            }
            None => {
                out.push('\\');
                rest = tail;
            }
        }
    }
    out.push_str(rest);
    out
}

/// Decodes the escape following a backslash, returning the character and
/// the number of bytes it spans after the backslash.
fn decode_escape(tail: &str) -> (Option<char>, usize) {
    let mut chars = tail.chars();
    let ch = match chars.next() {
        Some(ch) => ch,
        None => return (None, 0),
    };
    let simple = match ch {
        'n' => Some('\n'),
        'r' => Some('\r'),
        't' => Some('\t'),
        'b' => Some('\u{0008}'),
        'f' => Some('\u{000C}'),
        '"' => Some('"'),
        '\\' => Some('\\'),
        '$' => Some('$'),
        '~' => Some('~'),
        _ => None,
    };
    if simple.is_some() {
        return (simple, 1);
    }

    if ch == 'u' && tail[1..].starts_with('{') {
        if let Some(close) = tail[2..].find('}') {
            let hex = &tail[2..2 + close];
            if !hex.is_empty() && hex.bytes().all(|b| b.is_ascii_hexdigit()) {
                if let Some(c) = u32::from_str_radix(hex, 16).ok().and_then(char::from_u32) {
                    return (Some(c), close + 3);
                }
            }
        }
    }
    (None, 0)
}

/// Escapes `text` so that [`unescape`] returns it unchanged.
///
/// Besides `$`, the openers of `@f(` calls and `<emit:` directives are
/// written with a `\u{..}` escape so a written document never expands them.
///
/// # Examples
///
/// ```rust
/// use lacon::escape::{escape, unescape};
///
/// let original = "line\n\"quoted\" $HOME";
/// assert_eq!(escape(original), r#"line\n\"quoted\" \$HOME"#);
/// assert_eq!(unescape(&escape(original)), original);
/// ```
#[must_use]
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    for ch in text.chars() {
        match ch {
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\u{0008}' => out.push_str("\\b"),
            '\u{000C}' => out.push_str("\\f"),
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '$' => out.push_str("\\$"),
            c if c.is_control() => out.push_str(&format!("\\u{{{:X}}}", c as u32)),
            c => out.push(c),
        }
    }
    if out.contains("@f(") {
        out = out.replace("@f(", "@\\u{66}(");
    }
    if out.contains("<emit:") {
        out = out.replace("<emit:", "\\u{3C}emit:");
    }
    out
}

/// Parses an integer written in decimal or with a `0x` prefix.
pub(crate) fn parse_int(text: &str) -> Option<i64> {
    let text = text.trim();
    let (negative, digits) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text),
    };
    let value = match digits
        .strip_prefix("0x")
        .or_else(|| digits.strip_prefix("0X"))
    {
        Some(hex) => i64::from_str_radix(hex, 16).ok()?,
        None => {
            if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
                return None;
            }
            digits.parse::<i64>().ok()?
        }
    };
    Some(if negative { -value } else { value })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unescape_all_simple_escapes() {
        assert_eq!(
            unescape(r#"\n\r\t\b\f\"\\\$\~"#),
            "\n\r\t\u{0008}\u{000C}\"\\$~"
        );
    }

    #[test]
    fn test_unescape_unicode_code_points() {
        assert_eq!(unescape(r"\u{41}\u{42}"), "AB");
        assert_eq!(unescape(r"\u{2603} snow"), "\u{2603} snow");
    }

    #[test]
    fn test_unescape_keeps_malformed_sequences() {
        assert_eq!(unescape(r"\u{}"), r"\u{}");
        assert_eq!(unescape(r"\u{zz}"), r"\u{zz}");
        assert_eq!(unescape(r"\u{D800}"), r"\u{D800}");
        assert_eq!(unescape("trailing\\"), "trailing\\");
        assert_eq!(unescape(r"C:\path"), r"C:\path");
    }

    #[test]
    fn test_escaped_backslash_before_n() {
        assert_eq!(unescape(r"\\n"), r"\n");
    }

    #[test]
    fn test_escape_control_characters() {
        assert_eq!(escape("\u{1}"), r"\u{1}");
        assert_eq!(unescape(&escape("\u{1}x")), "\u{1}x");
    }

    #[test]
    fn test_escape_hides_directives() {
        let text = "<emit: 0 to +1>@f({}, 1)";
        let escaped = escape(text);
        assert_eq!(escaped, r"\u{3C}emit: 0 to +1>@\u{66}({}, 1)");
        assert_eq!(unescape(&escaped), text);
    }

    #[test]
    fn test_parse_int() {
        assert_eq!(parse_int("42"), Some(42));
        assert_eq!(parse_int("-7"), Some(-7));
        assert_eq!(parse_int("0x1F"), Some(31));
        assert_eq!(parse_int("0XfF"), Some(255));
        assert_eq!(parse_int("1.5"), None);
        assert_eq!(parse_int("abc"), None);
        assert_eq!(parse_int(""), None);
    }
}

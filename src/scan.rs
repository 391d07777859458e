//! Quote and bracket aware scanning.
//!
//! Every place that needs to know whether a character sits inside a quoted
//! string or a nested `[...]`/`{...}` goes through [`Scan`]: list splitting,
//! inline key detection, `+`/`>` operator lookup and comment stripping.

use std::str::CharIndices;

/// Nesting state *before* a character is consumed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ScanState {
    pub depth: i32,
    pub in_quotes: bool,
}

impl ScanState {
    /// Outside quotes and not nested in any bracket.
    #[inline]
    #[must_use]
    pub fn is_top_level(&self) -> bool {
        self.depth == 0 && !self.in_quotes
    }
}

/// Iterator over `(byte offset, char, state)` triples.
///
/// A backslash escapes the character after it, which then never opens or
/// closes a quote or bracket. Escaped characters are reported with
/// `in_quotes` forced on so that callers never treat them as operators.
pub struct Scan<'a> {
    chars: CharIndices<'a>,
    state: ScanState,
    escaped: bool,
}

impl<'a> Scan<'a> {
    #[must_use]
    pub fn new(text: &'a str) -> Self {
        Scan {
            chars: text.char_indices(),
            state: ScanState::default(),
            escaped: false,
        }
    }

    /// State after everything yielded so far.
    #[must_use]
    pub fn state(&self) -> ScanState {
        self.state
    }
}

impl<'a> Iterator for Scan<'a> {
    type Item = (usize, char, ScanState);

    fn next(&mut self) -> Option<Self::Item> {
        let (idx, ch) = self.chars.next()?;
        let before = self.state;

        if self.escaped {
            self.escaped = false;
            let shielded = ScanState {
                in_quotes: true,
                ..before
            };
            return Some((idx, ch, shielded));
        }

        match ch {
            '\\' => self.escaped = true,
            '"' => self.state.in_quotes = !self.state.in_quotes,
            '[' | '{' if !before.in_quotes => self.state.depth += 1,
            ']' | '}' if !before.in_quotes => self.state.depth -= 1,
            _ => {}
        }
        Some((idx, ch, before))
    }
}

/// Splits `text` on `sep` wherever it occurs at top level.
///
/// # Examples
///
/// ```rust
/// use lacon::scan::split_top_level;
///
/// let parts = split_top_level(r#"1, "a,b", [2, 3], {x=1, y=2}"#, ',');
/// assert_eq!(parts, vec!["1", r#" "a,b""#, " [2, 3]", " {x=1, y=2}"]);
/// ```
#[must_use]
pub fn split_top_level(text: &str, sep: char) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut start = 0;
    for (idx, ch, state) in Scan::new(text) {
        if ch == sep && state.is_top_level() {
            parts.push(&text[start..idx]);
            start = idx + ch.len_utf8();
        }
    }
    parts.push(&text[start..]);
    parts
}

/// Byte offset of the first top-level character matching `pred`.
#[must_use]
pub fn find_top_level(text: &str, mut pred: impl FnMut(usize, char) -> bool) -> Option<usize> {
    Scan::new(text)
        .find(|(idx, ch, state)| state.is_top_level() && pred(*idx, *ch))
        .map(|(idx, _, _)| idx)
}

/// Returns `true` if `ch` appears anywhere at top level.
#[must_use]
pub fn contains_top_level(text: &str, ch: char) -> bool {
    find_top_level(text, |_, c| c == ch).is_some()
}

/// The nesting state in effect at byte `offset`.
#[must_use]
pub fn state_at(text: &str, offset: usize) -> ScanState {
    let mut scan = Scan::new(text);
    for (idx, _, state) in scan.by_ref() {
        if idx >= offset {
            return state;
        }
    }
    scan.state()
}

/// Byte offset of `pat` where it starts outside a quoted string.
#[must_use]
pub fn find_unquoted(text: &str, pat: &str) -> Option<usize> {
    Scan::new(text)
        .find(|(idx, _, state)| !state.in_quotes && text[*idx..].starts_with(pat))
        .map(|(idx, _, _)| idx)
}

/// Removes a trailing `//` comment that is not inside a quoted string.
///
/// # Examples
///
/// ```rust
/// use lacon::scan::strip_line_comment;
///
/// assert_eq!(strip_line_comment("port 80 // http"), "port 80 ");
/// assert_eq!(strip_line_comment(r#"url "http://x""#), r#"url "http://x""#);
/// ```
#[must_use]
pub fn strip_line_comment(text: &str) -> &str {
    match find_unquoted(text, "//") {
        Some(idx) => &text[..idx],
        None => text,
    }
}

/// Number of leading whitespace characters.
#[inline]
#[must_use]
pub fn indent_of(line: &str) -> usize {
    line.chars().take_while(|c| c.is_whitespace()).count()
}

/// The leading whitespace of `line`.
#[inline]
#[must_use]
pub fn indent_str(line: &str) -> &str {
    &line[..line.len() - line.trim_start().len()]
}

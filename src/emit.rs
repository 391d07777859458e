//! `<emit: START to ±COUNT [as local $NAME[=EXPR]]>REST` range directives.
//!
//! A directive repeats one line, or one `{ ... }` block, once per value of a
//! counter. Each repetition can bind a local variable that shadows any
//! global of the same name while that repetition is rendered.
//!
//! ```text
//! <emit: 0x41 to +3 as local $c>glyph_$c "\u{$c}"
//! ```
//!
//! expands to
//!
//! ```text
//! glyph_0041 "\u{0041}"
//! glyph_0042 "\u{0042}"
//! glyph_0043 "\u{0043}"
//! ```
//!
//! The same expansion backs both the parser and [`preprocess`](crate::preprocess).

use crate::escape::parse_int;
use crate::format::{expand_calls, FormatCall};
use crate::scan::{find_unquoted, indent_of, indent_str};
use crate::vars::{substitute, substitute_except, Variables};
use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;
use std::ops::Range;

static HEADER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"<emit:\s*(.+?)\s+to\s+([+-])(\d+)(?:\s+as\s+local\s+(\$[\w-]+)(?:\s*=\s*(.+?))?)?>\s*(.*)$",
    )
    .expect("valid emit regex")
});

/// Counting direction of a directive.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    Increment,
    Decrement,
}

impl Direction {
    #[must_use]
    pub const fn step(self) -> i64 {
        match self {
            Direction::Increment => 1,
            Direction::Decrement => -1,
        }
    }
}

/// How `@current` renders: follows the way START was written.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Base {
    Decimal,
    Hex,
}

/// A parsed emit header.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EmitDirective {
    pub start: i64,
    /// Exclusive bound: `start + count` or `start - count`.
    pub end: i64,
    pub direction: Direction,
    /// Local variable name, without the `$`.
    pub local_var: Option<String>,
    /// Expression bound to the local each iteration (`@current` by default).
    pub local_expr: Option<String>,
    /// Template text after the closing `>`.
    pub rest: String,
    pub base: Base,
}

impl EmitDirective {
    /// Parses the directive on one line, ignoring any text before `<emit:`.
    /// A `<emit:` inside a quoted string is not a directive.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use lacon::emit::{Base, Direction, EmitDirective};
    ///
    /// let d = EmitDirective::parse("  <emit: 0x10 to +3 as local $i>key_$i true").unwrap();
    /// assert_eq!((d.start, d.end, d.count()), (16, 19, 3));
    /// assert_eq!(d.direction, Direction::Increment);
    /// assert_eq!(d.base, Base::Hex);
    /// assert_eq!(d.local_var.as_deref(), Some("i"));
    /// assert_eq!(d.local_expr.as_deref(), Some("@current"));
    /// assert_eq!(d.rest, "key_$i true");
    ///
    /// assert!(EmitDirective::parse("<emit: 1 to 3>").is_none());
    /// assert!(EmitDirective::parse(r#"note "<emit: 0 to +2>x""#).is_none());
    /// ```
    #[must_use]
    pub fn parse(line: &str) -> Option<EmitDirective> {
        let cleaned = line.replace('\r', "");
        let at = find_unquoted(&cleaned, "<emit:")?;
        let caps = HEADER.captures(cleaned[at..].trim())?;

        let start_text = caps[1].trim();
        let start = parse_int(start_text)?;
        let base = if start_text.starts_with("0x") || start_text.starts_with("0X") {
            Base::Hex
        } else {
            Base::Decimal
        };
        let direction = if &caps[2] == "+" {
            Direction::Increment
        } else {
            Direction::Decrement
        };
        let count = caps[3].parse::<i64>().ok()?;
        let end = start.checked_add(count * direction.step())?;

        let local_var = caps.get(4).map(|m| m.as_str()[1..].to_string());
        let local_expr = match (&local_var, caps.get(5)) {
            (Some(_), Some(expr)) => Some(expr.as_str().trim().to_string()),
            (Some(_), None) => Some("@current".to_string()),
            (None, _) => None,
        };

        Some(EmitDirective {
            start,
            end,
            direction,
            local_var,
            local_expr,
            rest: caps[6].trim_end().to_string(),
            base,
        })
    }

    /// Number of iterations.
    #[must_use]
    pub fn count(&self) -> u64 {
        (self.end - self.start).unsigned_abs()
    }

    /// The counter value of the final iteration, if there is one.
    #[must_use]
    pub fn last(&self) -> Option<i64> {
        if self.count() == 0 {
            None
        } else {
            Some(self.end - self.direction.step())
        }
    }

    /// Counter values in iteration order.
    ///
    /// ```rust
    /// use lacon::emit::EmitDirective;
    ///
    /// let d = EmitDirective::parse("<emit: 5 to -3>x").unwrap();
    /// assert_eq!(d.values().collect::<Vec<_>>(), vec![5, 4, 3]);
    /// ```
    pub fn values(&self) -> impl Iterator<Item = i64> {
        let (start, step) = (self.start, self.direction.step());
        (0..self.count() as i64).map(move |i| start + i * step)
    }

    /// Renders a counter value the way `@current` does: four digit upper
    /// case hex for hex directives, plain decimal otherwise.
    #[must_use]
    pub fn format_current(&self, value: i64) -> String {
        match self.base {
            Base::Decimal => value.to_string(),
            Base::Hex => {
                let sign = if value < 0 { "-" } else { "" };
                format!("{}{:04X}", sign, value.unsigned_abs())
            }
        }
    }

    /// Value bound to the local variable for one iteration.
    fn local_value(&self, current: i64, vars: &Variables) -> Option<String> {
        let expr = self.local_expr.as_deref()?;
        if expr == "@current" {
            return Some(self.format_current(current));
        }
        let expr = substitute(expr, vars);
        let rendered = match FormatCall::parse(&expr) {
            Some(call) if call_spans(&expr) => call.render(vars, Some(current)),
            _ => None,
        };
        Some(rendered.unwrap_or_else(|| expand_calls(&expr, vars, Some(current))))
    }
}

/// `true` when `expr` is exactly one `@f(...)` call.
fn call_spans(expr: &str) -> bool {
    expr.starts_with("@f(") && expr.ends_with(')') && expr.matches("@f(").count() == 1
}

impl fmt::Display for EmitDirective {
    /// Short summary used for inline annotations, e.g. `3 entries [0010...0012]`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.last() {
            Some(last) => write!(
                f,
                "{} entries [{}...{}]",
                self.count(),
                self.format_current(self.start),
                self.format_current(last)
            ),
            None => write!(f, "0 entries"),
        }
    }
}

/// Parses one line for an emit directive without any document context.
///
/// # Examples
///
/// ```rust
/// use lacon::parse_directive_fragment;
///
/// let d = parse_directive_fragment("<emit: 0x10 to +3>").unwrap();
/// assert_eq!(d.to_string(), "3 entries [0010...0012]");
/// assert!(parse_directive_fragment("key value").is_none());
/// ```
#[must_use]
pub fn parse_directive_fragment(line: &str) -> Option<EmitDirective> {
    EmitDirective::parse(line)
}

/// `true` when `line` holds an unquoted `<emit:` marker.
#[must_use]
pub fn has_directive(line: &str) -> bool {
    find_unquoted(line, "<emit:").is_some()
}

/// Result of expanding the directive at one line.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Expansion {
    /// Generated lines.
    pub lines: Vec<String>,
    /// Source lines replaced, starting at the directive line.
    pub consumed: usize,
}

/// Where the parts of one directive sit in the source lines.
struct Layout {
    header: String,
    body: Range<usize>,
    is_block: bool,
    /// First line after the directive.
    next: usize,
}

impl Layout {
    fn of(lines: &[String], idx: usize, directive: &EmitDirective) -> Layout {
        let base_indent = lines.get(idx).map_or(0, |l| indent_of(l));
        let line_at = |i: usize| lines.get(i).map(String::as_str);
        let mut next = idx + 1;

        let mut header = directive.rest.trim().to_string();
        if header.is_empty() {
            if let Some(following) = line_at(next) {
                let t = following.trim();
                if !t.is_empty() && !t.starts_with("//") && !t.starts_with("/*") {
                    header = t.to_string();
                    next += 1;
                }
            }
        }
        if !header.ends_with('{') && line_at(next).map(str::trim) == Some("{") {
            header.push_str(" {");
            next += 1;
        }

        let is_block = header.ends_with('{');
        let body_start = next;
        let mut body_end = next;
        if is_block {
            while let Some(l) = line_at(next) {
                next += 1;
                if l.trim() == "}" && indent_of(l) <= base_indent {
                    break;
                }
                body_end = next;
            }
        }

        Layout {
            header,
            body: body_start..body_end,
            is_block,
            next,
        }
    }
}

/// Renders template lines for one iteration.
///
/// A nested directive is left for its own expansion: its header and body
/// only get `$name` substitution, never of the names it binds itself, and
/// their `@f` calls wait for the nested counter.
fn render_lines(
    lines: &[String],
    vars: &Variables,
    current: Option<i64>,
    bound_inside: &[String],
    out: &mut Vec<String>,
) {
    let mut i = 0;
    while i < lines.len() {
        let line = &lines[i];
        match EmitDirective::parse(line) {
            Some(nested) => {
                let end = Layout::of(lines, i, &nested).next.min(lines.len());
                let mut inner = bound_inside.to_vec();
                inner.extend(nested.local_var);
                out.push(substitute_except(line, vars, &inner));
                render_lines(&lines[i + 1..end], vars, None, &inner, out);
                i = end;
            }
            None => {
                let text = substitute_except(line, vars, bound_inside);
                out.push(match current {
                    Some(c) => expand_calls(&text, vars, Some(c)),
                    None => text,
                });
                i += 1;
            }
        }
    }
}

/// Expands the directive at `lines[idx]`.
///
/// The template is the text after `>`, or the following non-comment line
/// when that is empty. A template ending in `{`, or followed by a line that
/// is only `{`, starts a block whose body runs to the first `}` line
/// indented no deeper than the directive. Each iteration emits the header
/// at the directive's indentation, the body, and a closing `}`. An empty
/// template expands to nothing.
///
/// Returns `None` when the line holds no well-formed directive.
///
/// # Examples
///
/// ```rust
/// use lacon::emit::expand;
/// use lacon::vars::Variables;
///
/// let lines: Vec<String> = ["<emit: 1 to +2 as local $n>", "item_$n {", "  id $n", "}"]
///     .iter()
///     .map(|s| s.to_string())
///     .collect();
/// let out = expand(&lines, 0, &mut Variables::new()).unwrap();
///
/// assert_eq!(out.consumed, 4);
/// assert_eq!(out.lines, vec!["item_1 {", "  id 1", "}", "item_2 {", "  id 2", "}"]);
/// ```
pub fn expand(lines: &[String], idx: usize, vars: &mut Variables) -> Option<Expansion> {
    let line = lines.get(idx)?;
    let directive = EmitDirective::parse(line)?;
    let indent = indent_str(line);
    let layout = Layout::of(lines, idx, &directive);
    let consumed = layout.next - idx;

    if layout.header.is_empty() {
        tracing::debug!(line = idx + 1, "emit directive without a template");
        return Some(Expansion {
            lines: Vec::new(),
            consumed,
        });
    }

    let mut template = vec![format!("{}{}", indent, layout.header)];
    template.extend(lines[layout.body.clone()].iter().cloned());

    let mut out = Vec::new();
    for current in directive.values() {
        let bound = match (&directive.local_var, directive.local_value(current, vars)) {
            (Some(name), Some(value)) => {
                vars.push_local(name.as_str(), value);
                true
            }
            _ => false,
        };

        render_lines(&template, vars, Some(current), &[], &mut out);
        if layout.is_block {
            out.push(format!("{}}}", indent));
        }

        if bound {
            vars.pop_local();
        }
    }

    tracing::debug!(
        start = directive.start,
        count = directive.count(),
        base = ?directive.base,
        block = layout.is_block,
        consumed,
        "expanded emit directive"
    );
    Some(Expansion {
        lines: out,
        consumed,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(src: &str) -> Vec<String> {
        src.lines().map(str::to_string).collect()
    }

    #[test]
    fn test_hex_directive_arithmetic() {
        let d = EmitDirective::parse("<emit: 0x10 to +3 as local $i>k$i 1").unwrap();
        let values: Vec<String> = d.values().map(|v| d.format_current(v)).collect();
        assert_eq!(values, vec!["0010", "0011", "0012"]);
        assert_eq!(d.last(), Some(0x12));
    }

    #[test]
    fn test_decrement_bounds() {
        let d = EmitDirective::parse("<emit: 5 to -3>x").unwrap();
        assert_eq!(d.end, 2);
        assert_eq!(d.last(), Some(3));
        assert_eq!(d.to_string(), "3 entries [5...3]");
    }

    #[test]
    fn test_zero_count_expands_to_nothing() {
        let src = lines("<emit: 1 to +0>key 1\nafter 1");
        let out = expand(&src, 0, &mut Variables::new()).unwrap();
        assert!(out.lines.is_empty());
        assert_eq!(out.consumed, 1);
        assert_eq!(EmitDirective::parse("<emit: 1 to +0>").unwrap().to_string(), "0 entries");
    }

    #[test]
    fn test_single_line_keeps_indent() {
        let src = lines("    <emit: 0 to +2 as local $i>port_$i 80$i");
        let out = expand(&src, 0, &mut Variables::new()).unwrap();
        assert_eq!(out.lines, vec!["    port_0 800", "    port_1 801"]);
    }

    #[test]
    fn test_empty_rest_takes_next_line() {
        let src = lines("<emit: 1 to +2 as local $i>\n  name_$i true\nother 1");
        let out = expand(&src, 0, &mut Variables::new()).unwrap();
        assert_eq!(out.consumed, 2);
        assert_eq!(out.lines, vec!["name_1 true", "name_2 true"]);
    }

    #[test]
    fn test_brace_on_following_line() {
        let src = lines("<emit: 0 to +1 as local $i>key_$i\n{\n  v $i\n}");
        let out = expand(&src, 0, &mut Variables::new()).unwrap();
        assert_eq!(out.consumed, 4);
        assert_eq!(out.lines, vec!["key_0 {", "  v 0", "}"]);
    }

    #[test]
    fn test_block_without_close_runs_to_end() {
        let src = lines("<emit: 0 to +1>b {\n  x 1");
        let out = expand(&src, 0, &mut Variables::new()).unwrap();
        assert_eq!(out.consumed, 2);
        assert_eq!(out.lines, vec!["b {", "  x 1", "}"]);
    }

    #[test]
    fn test_local_shadows_global_only_inside() {
        let mut vars = Variables::new();
        vars.define("i", "G");
        let src = lines("<emit: 7 to +1 as local $i>k $i");
        let out = expand(&src, 0, &mut vars).unwrap();
        assert_eq!(out.lines, vec!["k 7"]);
        assert_eq!(vars.get("i"), Some("G"));
    }

    #[test]
    fn test_local_expression_uses_format() {
        let src = lines(r#"<emit: 10 to +2 as local $h=@f("{:02X}", @current)>k_$h 1"#);
        let out = expand(&src, 0, &mut Variables::new()).unwrap();
        assert_eq!(out.lines, vec!["k_0A 1", "k_0B 1"]);
    }

    #[test]
    fn test_format_calls_in_template() {
        let src = lines("<emit: 1 to +2>id_@f({:03}, @current) true");
        let out = expand(&src, 0, &mut Variables::new()).unwrap();
        assert_eq!(out.lines, vec!["id_001 true", "id_002 true"]);
    }

    #[test]
    fn test_nested_local_wins_over_global() {
        let mut vars = Variables::new();
        vars.define("j", "G");
        let src = lines("<emit: 0 to +1 as local $i>\nblk_$i {\n  <emit: 0 to +2 as local $j>k$j $i @f({:02}, @current)\n}");
        let out = expand(&src, 0, &mut vars).unwrap();
        assert_eq!(
            out.lines,
            vec![
                "blk_0 {",
                "  <emit: 0 to +2 as local $j>k$j 0 @f({:02}, @current)",
                "}"
            ]
        );

        let inner = expand(&out.lines, 1, &mut vars).unwrap();
        assert_eq!(inner.lines, vec!["  k0 0 00", "  k1 0 01"]);
    }

    #[test]
    fn test_nested_block_body_keeps_inner_names() {
        let mut vars = Variables::new();
        vars.define("n", "G");
        let src = lines("<emit: 1 to +1 as local $m>\ng$m {\n  <emit: 0 to +1 as local $n>\n  k$n {\n    v $n~x $m\n  }\n}");
        let out = expand(&src, 0, &mut vars).unwrap();
        assert_eq!(out.consumed, 7);
        assert_eq!(
            out.lines,
            vec![
                "g1 {",
                "  <emit: 0 to +1 as local $n>",
                "  k$n {",
                "    v $n~x 1",
                "  }",
                "}"
            ]
        );
    }

    #[test]
    fn test_quoted_marker_is_not_a_directive() {
        assert!(!has_directive(r#"desc "see <emit: 0 to +2>x""#));
        assert!(has_directive("  <emit: 0 to +2>x // note"));
        let src = lines(r#"desc "see <emit: 0 to +2>x""#);
        assert!(expand(&src, 0, &mut Variables::new()).is_none());
    }

    #[test]
    fn test_empty_template_with_huge_count() {
        let src = lines("<emit: 0 to +9223372036854775807>");
        let out = expand(&src, 0, &mut Variables::new()).unwrap();
        assert!(out.lines.is_empty());
        assert_eq!(out.consumed, 1);
    }

    #[test]
    fn test_malformed_header() {
        assert!(EmitDirective::parse("<emit: abc to +3>x").is_none());
        assert!(EmitDirective::parse("<emit: 1 to 3>x").is_none());
        let src = lines("<emit: nope>");
        assert!(expand(&src, 0, &mut Variables::new()).is_none());
    }
}

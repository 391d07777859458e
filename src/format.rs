//! The `@f(FORMAT, ARG)` format function.
//!
//! `FORMAT` is a template with `{}` or `{:[0][WIDTH][x|X][(OFFSET)]}`
//! placeholders. `ARG` is a literal, `@current` (the emit loop counter) or
//! a `$variable`.
//!
//! | Placeholder | Effect |
//! |---|---|
//! | `{}` | the argument exactly as written |
//! | `{:}` | the argument as a decimal integer |
//! | `{:4}` / `{:04}` | zero padded to 4 characters |
//! | `{:x}` / `{:X}` | lower / upper case hex |
//! | `{:(0x10)}` | offset added before rendering (decimal or hex) |
//!
//! ```rust
//! use lacon::format::evaluate;
//! use lacon::vars::Variables;
//!
//! let vars = Variables::new();
//! assert_eq!(evaluate(r#"@f("{:04X}", 10)"#, &vars, None), "000A");
//! assert_eq!(evaluate(r#"@f("{:(0x10)}", 5)"#, &vars, None), "21");
//! assert_eq!(evaluate(r#"@f("{}", "hello")"#, &vars, None), "hello");
//! assert_eq!(evaluate(r#"@f("U+{:04X}", @current)"#, &vars, Some(0x263A)), "U+263A");
//! ```

use crate::escape::{is_quoted, parse_int, unwrap_quotes};
use crate::vars::Variables;
use crate::Number;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};

static CALL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"@f\((.*?),\s*([^)]+)\)").expect("valid call regex"));

static PLACEHOLDER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\{(:0?(\d+)?([xX])?(?:\(([^)]+)\))?)?\}").expect("valid placeholder regex")
});

/// A parsed `@f(...)` call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FormatCall {
    /// The template as written, quotes included.
    pub format: String,
    /// The argument as written, trimmed.
    pub arg: String,
}

impl FormatCall {
    /// Finds the first `@f(...)` call in `text`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use lacon::format::FormatCall;
    ///
    /// let call = FormatCall::parse(r#"key @f("{:X}", $n) tail"#).unwrap();
    /// assert_eq!(call.format, r#""{:X}""#);
    /// assert_eq!(call.arg, "$n");
    /// assert!(FormatCall::parse("@f(no comma)").is_none());
    /// ```
    #[must_use]
    pub fn parse(text: &str) -> Option<FormatCall> {
        CALL.captures(text).map(|caps| FormatCall::from_captures(&caps))
    }

    fn from_captures(caps: &Captures<'_>) -> FormatCall {
        FormatCall {
            format: caps[1].trim().to_string(),
            arg: caps[2].trim().to_string(),
        }
    }

    /// Resolves the argument text, or `None` when it needs a loop counter
    /// that is not available.
    fn resolve_arg(&self, vars: &Variables, current: Option<i64>) -> Option<String> {
        if self.arg == "@current" {
            return current.map(|c| c.to_string());
        }
        if let Some(name) = self.arg.strip_prefix('$') {
            if let Some(value) = vars.get(name) {
                return Some(value.to_string());
            }
        }
        Some(unwrap_quotes(&self.arg).to_string())
    }

    /// Renders the call, or `None` when `@current` has no counter.
    #[must_use]
    pub fn render(&self, vars: &Variables, current: Option<i64>) -> Option<String> {
        let arg = self.resolve_arg(vars, current)?;
        Some(format_value(unwrap_quotes(&self.format), &arg))
    }
}

/// Applies a template to one argument.
///
/// Integers (decimal or `0x` hex) and decimal fractions are numeric.
/// Anything else is returned unchanged and the template is ignored. Hex
/// placeholders render the integer part of a fraction.
///
/// # Examples
///
/// ```rust
/// use lacon::format::format_value;
///
/// assert_eq!(format_value("0x{:04x}", "255"), "0x00ff");
/// assert_eq!(format_value("{:X(1)}", "0xFE"), "FF");
/// assert_eq!(format_value("{:04}", "-5"), "-005");
/// assert_eq!(format_value("{:(1)}", "1.5"), "2.5");
/// assert_eq!(format_value("{:X}", "abc"), "abc");
/// assert_eq!(format_value("raw={} dec={:}", "0x10"), "raw=0x10 dec=16");
/// ```
#[must_use]
pub fn format_value(format: &str, arg: &str) -> String {
    let number = match parse_int(arg)
        .map(Number::Integer)
        .or_else(|| Number::parse(arg.trim()))
    {
        Some(n) => n,
        None => return arg.to_string(),
    };

    PLACEHOLDER
        .replace_all(format, |caps: &Captures<'_>| {
            if caps.get(1).is_none() {
                return arg.to_string();
            }
            let offset = caps
                .get(4)
                .and_then(|m| parse_int(m.as_str()))
                .unwrap_or(0);
            let width = caps
                .get(2)
                .and_then(|m| m.as_str().parse::<usize>().ok())
                .unwrap_or(0);
            let radix = caps.get(3).map(|m| m.as_str());
            match number {
                Number::Integer(n) => render_number(n.saturating_add(offset), radix, width),
                Number::Float(f) => match (Number::from_f64(f + offset as f64), radix) {
                    (Number::Integer(n), _) => render_number(n, radix, width),
                    (Number::Float(v), Some(_)) => render_number(v.trunc() as i64, radix, width),
                    (Number::Float(v), None) => {
                        let sign = if v < 0.0 { "-" } else { "" };
                        pad_digits(sign, &v.abs().to_string(), width)
                    }
                },
            }
        })
        .into_owned()
}

fn render_number(value: i64, radix: Option<&str>, width: usize) -> String {
    let magnitude = value.unsigned_abs();
    let digits = match radix {
        Some("x") => format!("{:x}", magnitude),
        Some(_) => format!("{:X}", magnitude),
        None => magnitude.to_string(),
    };
    let sign = if value < 0 { "-" } else { "" };
    pad_digits(sign, &digits, width)
}

fn pad_digits(sign: &str, digits: &str, width: usize) -> String {
    let pad = width.saturating_sub(sign.len() + digits.len());
    format!("{}{}{}", sign, "0".repeat(pad), digits)
}

/// Evaluates a single `@f(...)` call.
///
/// Text that is not a call, or a call on `@current` without a counter, is
/// returned as given.
#[must_use]
pub fn evaluate(call: &str, vars: &Variables, current: Option<i64>) -> String {
    FormatCall::parse(call)
        .and_then(|c| c.render(vars, current))
        .unwrap_or_else(|| call.to_string())
}

/// Replaces every `@f(...)` call in `text` with its rendering.
///
/// When the template was quoted the result is quoted again, so a call in
/// value position still reads as a string literal.
///
/// # Examples
///
/// ```rust
/// use lacon::format::expand_calls;
/// use lacon::vars::Variables;
///
/// let vars = Variables::new();
/// assert_eq!(expand_calls(r#"code @f("{:04X}", 10)"#, &vars, None), r#"code "000A""#);
/// assert_eq!(expand_calls("id_@f({:02}, @current)", &vars, Some(3)), "id_03");
/// assert_eq!(expand_calls("id_@f({:02}, @current)", &vars, None), "id_@f({:02}, @current)");
/// ```
#[must_use]
pub fn expand_calls(text: &str, vars: &Variables, current: Option<i64>) -> String {
    if !text.contains("@f(") {
        return text.to_string();
    }

    let expanded = CALL.replace_all(text, |caps: &Captures<'_>| {
        let call = FormatCall::from_captures(caps);
        match call.render(vars, current) {
            Some(rendered) if is_quoted(&call.format) => format!("\"{}\"", rendered),
            Some(rendered) => rendered,
            None => caps[0].to_string(),
        }
    });
    if expanded == text {
        tracing::debug!(text, "@f call left unexpanded");
    }
    expanded.into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_rendering() {
        assert_eq!(format_value("{:x}", "255"), "ff");
        assert_eq!(format_value("{:X}", "255"), "FF");
        assert_eq!(format_value("{:2X}", "1"), "01");
        assert_eq!(format_value("{:X}", "-255"), "-FF");
    }

    #[test]
    fn test_padding_never_truncates() {
        assert_eq!(format_value("{:2}", "12345"), "12345");
    }

    #[test]
    fn test_multiple_placeholders() {
        assert_eq!(format_value("{:X}-{:(1)}-{}", "10"), "A-11-10");
    }

    #[test]
    fn test_invalid_offset_ignored() {
        assert_eq!(format_value("{:(abc)}", "3"), "3");
    }

    #[test]
    fn test_fractional_argument() {
        assert_eq!(format_value("{:(1)}", "1.5"), "2.5");
        assert_eq!(format_value("{:05}", "-1.25"), "-1.25");
        assert_eq!(format_value("{:06}", "1.25"), "001.25");
        assert_eq!(format_value("{:X(0x10)}", "1.5"), "11");
        assert_eq!(format_value("{} {:}", "2.0"), "2.0 2");
        assert_eq!(format_value("{:}", "1.5.2"), "1.5.2");
    }

    #[test]
    fn test_variable_argument() {
        let mut vars = Variables::new();
        vars.define("base", "0x20");
        assert_eq!(evaluate("@f({:}, $base)", &vars, None), "32");
        assert_eq!(evaluate("@f({}, $nope)", &vars, None), "$nope");
    }

    #[test]
    fn test_expand_multiple_calls() {
        let vars = Variables::new();
        assert_eq!(
            expand_calls("@f({:X}, 10)/@f({:X}, 11)", &vars, None),
            "A/B"
        );
    }

    #[test]
    fn test_not_a_call() {
        let vars = Variables::new();
        assert_eq!(evaluate("plain", &vars, Some(1)), "plain");
    }
}

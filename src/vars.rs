//! Variable registry and `$name` substitution.
//!
//! Globals are declared with `$name value` or `$name = value` and live for
//! the whole parse. Locals are bound by `<emit: ... as local $name>` for the
//! lines one directive generates and shadow globals of the same name.
//!
//! ```rust
//! use lacon::vars::{substitute, Variables};
//!
//! let mut vars = Variables::new();
//! vars.define("host", "example.org");
//! vars.define("i", "global");
//!
//! vars.push_local("i", "7");
//! assert_eq!(substitute("$host:$i", &vars), "example.org:7");
//! vars.pop_local();
//!
//! assert_eq!(substitute("$i $missing", &vars), "global $missing");
//! ```

use crate::escape::{unescape, unwrap_quotes};
use indexmap::IndexMap;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

static DECLARATION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*\$([\p{L}\d._-]+)(?:\s*=\s*|\s+)(.+)$").expect("valid declaration regex")
});

/// Name -> value bindings with a stack of local overrides.
#[derive(Clone, Debug, Default)]
pub struct Variables {
    globals: IndexMap<String, String>,
    locals: Vec<(String, String)>,
}

impl Variables {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a global variable, replacing any earlier value.
    pub fn define(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.globals.insert(name.into(), value.into());
    }

    /// Binds a local that shadows globals until the matching [`pop_local`](Self::pop_local).
    pub fn push_local(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.locals.push((name.into(), value.into()));
    }

    pub fn pop_local(&mut self) {
        self.locals.pop();
    }

    /// Looks a name up, innermost local first.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.locals
            .iter()
            .rev()
            .find(|(local, _)| local == name)
            .map(|(_, value)| value.as_str())
            .or_else(|| self.globals.get(name).map(String::as_str))
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.globals.is_empty() && self.locals.is_empty()
    }

    /// Global bindings in declaration order.
    pub fn globals(&self) -> impl Iterator<Item = (&str, &str)> {
        self.globals.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

#[inline]
pub(crate) fn is_name_char(c: char) -> bool {
    c.is_alphabetic() || c.is_ascii_digit() || matches!(c, '.' | '_' | '-')
}

/// Replaces `$name` references with their current values.
///
/// Unknown names are left as written. A `~` right after a known name ends
/// the reference and is dropped. `\$` is passed through untouched so that
/// escape decoding later turns it into a literal `$`. Substituted text is
/// not scanned again.
///
/// # Examples
///
/// ```rust
/// use lacon::vars::{substitute, Variables};
///
/// let mut vars = Variables::new();
/// vars.define("n", "4");
///
/// assert_eq!(substitute("$n~px", &vars), "4px");
/// assert_eq!(substitute(r"\$n", &vars), r"\$n");
/// ```
#[must_use]
pub fn substitute(text: &str, vars: &Variables) -> String {
    substitute_except(text, vars, &[])
}

/// Like [`substitute`], but names listed in `skip` are left as written.
///
/// ```rust
/// use lacon::vars::{substitute_except, Variables};
///
/// let mut vars = Variables::new();
/// vars.define("i", "1");
/// vars.define("j", "2");
///
/// assert_eq!(substitute_except("$i $j~x", &vars, &["j".to_string()]), "1 $j~x");
/// ```
#[must_use]
pub fn substitute_except(text: &str, vars: &Variables, skip: &[String]) -> String {
    if !text.contains('$') || vars.is_empty() {
        return text.to_string();
    }

    let mut out = String::with_capacity(text.len());
    let mut chars = text.char_indices().peekable();
    while let Some((idx, ch)) = chars.next() {
        match ch {
            '\\' => {
                out.push(ch);
                if let Some((_, next)) = chars.next() {
                    out.push(next);
                }
            }
            '$' => {
                let start = idx + 1;
                let mut end = start;
                while let Some(&(i, c)) = chars.peek() {
                    if !is_name_char(c) {
                        break;
                    }
                    end = i + c.len_utf8();
                    chars.next();
                }
                let name = &text[start..end];
                match vars
                    .get(name)
                    .filter(|_| !name.is_empty() && !skip.iter().any(|s| s == name))
                {
                    Some(value) => {
                        out.push_str(value);
                        if let Some(&(_, '~')) = chars.peek() {
                            chars.next();
                        }
                    }
                    None => {
                        out.push('$');
                        out.push_str(name);
                    }
                }
            }
            _ => out.push(ch),
        }
    }
    out
}

/// Recognises a `$name value` declaration, returning the name and the
/// decoded value.
#[must_use]
pub fn parse_declaration(line: &str) -> Option<(String, String)> {
    let caps = DECLARATION.captures(line)?;
    let value = unescape(unwrap_quotes(caps[2].trim()));
    Some((caps[1].to_string(), value))
}

/// A global declaration found by [`collect_variables`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct VariableInfo {
    pub name: String,
    pub value: String,
    /// Zero-based line of the declaration.
    pub line: usize,
    /// Text of a `/** ... */` comment directly above the declaration.
    pub doc: Option<String>,
}

/// Lists global variable declarations without parsing the document.
///
/// Lines inside block comments and `//` comment lines are ignored. A
/// `/** ... */` block that precedes a declaration (blank lines allowed in
/// between) becomes its `doc`, with leading `*` decorations removed.
///
/// # Examples
///
/// ```rust
/// use lacon::collect_variables;
///
/// let text = "/** Base port\n * for services */\n$port 8080\n// $skip 1\n$name = \"api\"";
/// let vars = collect_variables(text);
///
/// assert_eq!(vars.len(), 2);
/// assert_eq!(vars[0].name, "port");
/// assert_eq!(vars[0].doc.as_deref(), Some("Base port\nfor services"));
/// assert_eq!(vars[1].value, "api");
/// assert_eq!(vars[1].line, 4);
/// assert_eq!(vars[1].doc, None);
/// ```
#[must_use]
pub fn collect_variables(text: &str) -> Vec<VariableInfo> {
    let mut found = Vec::new();
    let mut doc: Option<String> = None;
    // (is a doc comment, lines so far)
    let mut comment: Option<(bool, Vec<String>)> = None;

    for (line_no, raw) in text.lines().enumerate() {
        let trimmed = raw.trim();

        if let Some((is_doc, body)) = comment.as_mut() {
            match trimmed.find("*/") {
                Some(close) => {
                    body.push(trimmed[..close].to_string());
                    doc = if *is_doc { clean_doc(body) } else { None };
                    comment = None;
                }
                None => body.push(trimmed.to_string()),
            }
            continue;
        }

        if trimmed.is_empty() {
            continue;
        }
        if let Some(rest) = trimmed.strip_prefix("/*") {
            let is_doc = rest.starts_with('*') && !rest.starts_with("*/");
            let rest = if is_doc { &rest[1..] } else { rest };
            match rest.find("*/") {
                Some(close) => {
                    doc = if is_doc {
                        clean_doc(&[rest[..close].to_string()])
                    } else {
                        None
                    };
                }
                None => {
                    comment = Some((is_doc, vec![rest.to_string()]));
                    doc = None;
                }
            }
            continue;
        }
        if trimmed.starts_with("//") {
            continue;
        }

        if let Some((name, value)) = parse_declaration(trimmed) {
            found.push(VariableInfo {
                name,
                value,
                line: line_no,
                doc: doc.take(),
            });
        } else {
            doc = None;
        }
    }
    found
}

fn clean_doc(lines: &[String]) -> Option<String> {
    let cleaned: Vec<&str> = lines
        .iter()
        .map(|l| {
            let l = l.trim();
            l.strip_prefix('*').unwrap_or(l).trim()
        })
        .filter(|l| !l.is_empty())
        .collect();
    if cleaned.is_empty() {
        None
    } else {
        Some(cleaned.join("\n"))
    }
}

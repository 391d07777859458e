//! The line-driven LACON parser.
//!
//! Documents are processed one line at a time. A line is first checked
//! against the open capture (multiline string or array), then against
//! comments, emit directives and imports, and finally classified
//! structurally: closing by dedent or `}`, variable declarations, the
//! openers for arrays, multiline strings and blocks, multi-key assignments,
//! the bare-key block shorthand and, as the fallback, inline `key value` /
//! `key=value` pairs with the `+` (append) and `>` (path) operators.
//!
//! The current object is tracked by a stack of frames, each holding the
//! indentation of the line that opened it and the key path from the root.

use crate::emit;
use crate::escape::{is_quoted, unescape, unwrap_quotes};
use crate::format::expand_calls;
use crate::import::{self, ImportStack};
use crate::scan::{
    contains_top_level, find_top_level, indent_of, split_top_level, state_at,
    strip_line_comment,
};
use crate::vars::{is_name_char, parse_declaration, substitute, Variables};
use crate::{Map, Number, Result, Value};
use once_cell::sync::Lazy;
use regex::Regex;
use std::path::{Path, PathBuf};

static IMPORT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"^@import\s+(?:"([^"]+)"|([^\s"{}|\[\]]+))"#).expect("valid import regex")
});

static ARRAY_OPEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*([\p{L}\d._-]+)\s*=?\s*\[\s*$").expect("valid array regex"));

static MULTILINE_OPEN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*([\p{L}\d._-]+)\s*=?\s*(@?\()\s*$").expect("valid multiline regex")
});

static BLOCK_OPEN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*([\p{L}\d._-]+)\s*(?:>\s*([\p{L}\d._-]+)\s*)?=?\s*\{\s*$")
        .expect("valid block regex")
});

static MULTI_KEY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*\[([\p{L}\d\s,.*_-]+)\]\s*=?\s*(.+)$").expect("valid multi-key regex")
});

static INLINE_KEY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:^|\s+)(?:([\p{L}\d._-]+)|\[([\p{L}\d\s,.*_-]+)\])\s*=")
        .expect("valid inline key regex")
});

/// Parses a whole document. `base_dir` anchors relative imports.
pub(crate) fn parse_document(
    text: &str,
    base_dir: &Path,
    imports: &mut ImportStack,
) -> Result<Value> {
    Parser::new(text, base_dir, imports).parse()
}

/// An object opened by a block line, closed by dedent or `}`.
#[derive(Debug)]
struct Frame {
    indent: usize,
    path: Vec<String>,
}

#[derive(Debug)]
enum Capture {
    Multiline {
        key: String,
        raw: bool,
        lines: Vec<String>,
    },
    Array {
        key: String,
        items: Vec<Value>,
    },
}

/// What values are evaluated against: variables, the import base and the
/// import stack.
struct Context<'a> {
    vars: Variables,
    base_dir: PathBuf,
    imports: &'a mut ImportStack,
}

pub(crate) struct Parser<'a> {
    lines: Vec<String>,
    index: usize,
    root: Map,
    frames: Vec<Frame>,
    capture: Option<Capture>,
    in_block_comment: bool,
    ctx: Context<'a>,
}

/// The object the innermost frame points at, created on demand.
fn scope_mut<'m>(root: &'m mut Map, frames: &[Frame]) -> &'m mut Map {
    match frames.last() {
        Some(frame) => frame
            .path
            .iter()
            .fold(root, |map, key| map.object_entry(key)),
        None => root,
    }
}

fn is_key_token(text: &str) -> bool {
    !text.is_empty() && text.chars().all(is_name_char)
}

impl<'a> Parser<'a> {
    pub(crate) fn new(text: &str, base_dir: &Path, imports: &'a mut ImportStack) -> Self {
        Parser {
            lines: text.split('\n').map(|l| l.replace('\r', "")).collect(),
            index: 0,
            root: Map::new(),
            frames: Vec::new(),
            capture: None,
            in_block_comment: false,
            ctx: Context {
                vars: Variables::new(),
                base_dir: base_dir.to_path_buf(),
                imports,
            },
        }
    }

    pub(crate) fn parse(mut self) -> Result<Value> {
        while self.index < self.lines.len() {
            let idx = self.index;
            self.index += 1;
            self.line(idx)?;
        }
        self.finish()
    }

    fn finish(mut self) -> Result<Value> {
        if let Some(capture) = self.capture.take() {
            tracing::debug!("unterminated capture closed at end of input");
            self.close_capture(capture);
        }
        Ok(Value::Object(self.root))
    }

    fn line(&mut self, idx: usize) -> Result<()> {
        let line = self.lines[idx].clone();
        let trimmed = line.trim();

        if self.capture.is_some() {
            let closes = matches!(
                (&self.capture, trimmed),
                (Some(Capture::Multiline { .. }), ")") | (Some(Capture::Array { .. }), "]")
            );
            if closes {
                if let Some(capture) = self.capture.take() {
                    self.close_capture(capture);
                }
                return Ok(());
            }
            if emit::has_directive(strip_line_comment(trimmed)) && self.expand_at(idx) {
                return Ok(());
            }
            match self.capture.as_mut() {
                Some(Capture::Multiline { lines, .. }) => lines.push(line.clone()),
                Some(Capture::Array { items, .. }) => {
                    let item = strip_line_comment(trimmed).trim();
                    let item = item.strip_suffix(',').unwrap_or(item).trim();
                    if !item.is_empty() {
                        let resolved = self.ctx.resolve(item);
                        items.push(self.ctx.parse_value(&resolved)?);
                    }
                }
                None => {}
            }
            return Ok(());
        }

        if trimmed.is_empty() {
            return Ok(());
        }
        if self.in_block_comment {
            if trimmed.contains("*/") {
                self.in_block_comment = false;
            }
            return Ok(());
        }
        if let Some(rest) = trimmed.strip_prefix("/*") {
            self.in_block_comment = !rest.contains("*/");
            return Ok(());
        }

        let clean = strip_line_comment(trimmed).trim();
        if clean.is_empty() {
            return Ok(());
        }

        if emit::has_directive(clean) {
            if self.expand_at(idx) {
                return Ok(());
            }
            tracing::warn!(line = idx + 1, text = clean, "malformed emit directive");
        }

        if clean.starts_with("@import") && self.import_line(clean, idx)? {
            return Ok(());
        }

        let indent = indent_of(&line);
        if clean != "}" {
            while self.frames.last().map_or(false, |f| indent <= f.indent) {
                self.frames.pop();
                tracing::debug!(line = idx + 1, depth = self.frames.len(), "block closed by dedent");
            }
        }

        if clean == "}" {
            if self.frames.pop().is_some() {
                tracing::debug!(line = idx + 1, depth = self.frames.len(), "block closed");
            }
            return Ok(());
        }

        self.structural(clean, indent, idx)
    }

    /// Replaces the emit directive at `idx` with its expansion, which is
    /// scanned next. Returns `false` when the directive is malformed.
    fn expand_at(&mut self, idx: usize) -> bool {
        match emit::expand(&self.lines, idx, &mut self.ctx.vars) {
            Some(expansion) => {
                let tail = self.lines.split_off(idx + expansion.consumed);
                self.lines.truncate(idx);
                self.lines.extend(expansion.lines);
                self.lines.extend(tail);
                self.index = idx;
                true
            }
            None => false,
        }
    }

    /// Merges an `@import` into the current scope. Runs ahead of dedent
    /// handling, so the import lands in the block that is open above it.
    fn import_line(&mut self, clean: &str, idx: usize) -> Result<bool> {
        let caps = match IMPORT.captures(clean) {
            Some(caps) => caps,
            None => return Ok(false),
        };
        let reference = caps.get(1).or_else(|| caps.get(2)).map_or("", |m| m.as_str());
        tracing::trace!(line = idx + 1, reference, "import line");
        let imported = import::import(reference, &self.ctx.base_dir, self.ctx.imports)?;
        if let Value::Object(map) = imported {
            scope_mut(&mut self.root, &self.frames).merge(map);
        }
        Ok(true)
    }

    fn structural(&mut self, clean: &str, indent: usize, idx: usize) -> Result<()> {
        if clean.starts_with('$') {
            if let Some((name, value)) = parse_declaration(clean) {
                tracing::trace!(line = idx + 1, name = %name, "variable declaration");
                let value = substitute(&value, &self.ctx.vars);
                self.ctx.vars.define(name, value);
                return Ok(());
            }
        }

        if let Some(caps) = ARRAY_OPEN.captures(clean) {
            tracing::trace!(line = idx + 1, "array capture");
            self.capture = Some(Capture::Array {
                key: caps[1].to_string(),
                items: Vec::new(),
            });
            return Ok(());
        }

        if let Some(caps) = MULTILINE_OPEN.captures(clean) {
            tracing::trace!(line = idx + 1, "multiline capture");
            self.capture = Some(Capture::Multiline {
                key: caps[1].to_string(),
                raw: caps[2].starts_with('@'),
                lines: Vec::new(),
            });
            return Ok(());
        }

        if let Some(caps) = BLOCK_OPEN.captures(clean) {
            let keys: Vec<String> = [caps.get(1), caps.get(2)]
                .into_iter()
                .flatten()
                .map(|m| m.as_str().to_string())
                .collect();
            self.open_block(keys, indent, idx);
            return Ok(());
        }

        if let Some(caps) = MULTI_KEY.captures(clean) {
            tracing::trace!(line = idx + 1, "multi-key assignment");
            let scope = scope_mut(&mut self.root, &self.frames);
            return self.ctx.assign_multi(scope, &caps[1], &caps[2]);
        }

        if !clean.contains(|c: char| c == '=' || c == '>' || c.is_whitespace()) {
            let next = self.lines[idx + 1..].iter().find(|l| !l.trim().is_empty());
            if next.map_or(false, |l| indent_of(l) > indent) {
                self.open_block(vec![clean.to_string()], indent, idx);
                return Ok(());
            }
        }

        let scope = scope_mut(&mut self.root, &self.frames);
        self.ctx.complex_line(clean, scope)
    }

    /// Resets `keys` (one key, or `key > subkey`) to an empty object and
    /// makes it the current scope.
    fn open_block(&mut self, keys: Vec<String>, indent: usize, idx: usize) {
        let scope = scope_mut(&mut self.root, &self.frames);
        let (last, parents) = match keys.split_last() {
            Some(split) => split,
            None => return,
        };
        let target = parents.iter().fold(scope, |map, key| map.object_entry(key));
        target.insert(last.clone(), Value::Object(Map::new()));

        let mut path = self.frames.last().map(|f| f.path.clone()).unwrap_or_default();
        path.extend(keys);
        tracing::debug!(line = idx + 1, path = %path.join("."), "block opened");
        self.frames.push(Frame { indent, path });
    }

    fn close_capture(&mut self, capture: Capture) {
        let scope = scope_mut(&mut self.root, &self.frames);
        match capture {
            Capture::Array { key, items } => {
                scope.insert(key, Value::Array(items));
            }
            Capture::Multiline { key, raw, lines } => {
                let text = if raw {
                    raw_block(&lines)
                } else {
                    quoted_block(&lines)
                };
                let text = unescape(&self.ctx.resolve(&text));
                match scope.get_mut(&key) {
                    Some(Value::String(existing)) if !existing.is_empty() => {
                        existing.push('\n');
                        existing.push_str(&text);
                    }
                    _ => {
                        scope.insert(key, Value::String(text));
                    }
                }
            }
        }
    }
}

/// Joins raw multiline content after removing the common indentation.
fn raw_block(lines: &[String]) -> String {
    let min_indent = lines
        .iter()
        .filter(|l| !l.trim().is_empty())
        .map(|l| indent_of(l))
        .min();
    let min_indent = match min_indent {
        Some(n) => n,
        None => return lines.join("\n").trim().to_string(),
    };

    lines
        .iter()
        .map(|l| match l.char_indices().nth(min_indent) {
            Some((offset, _)) => &l[offset..],
            None if l.chars().count() == min_indent => "",
            None => l.trim(),
        })
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}

/// Joins quoted multiline content: one (optionally quoted) fragment per line.
fn quoted_block(lines: &[String]) -> String {
    lines
        .iter()
        .map(|l| l.trim())
        .filter(|l| !l.is_empty())
        .map(|l| {
            let l = l.strip_suffix(',').map_or(l, str::trim);
            unwrap_quotes(l)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// A key found inside an inline pair list.
struct KeyAt {
    key: String,
    start: usize,
    value_start: usize,
    multi: bool,
}

/// Keys of `key=value` pairs at top level of `text`.
fn find_keys(text: &str) -> Vec<KeyAt> {
    INLINE_KEY
        .captures_iter(text)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            let (key, start, multi) = match (caps.get(1), caps.get(2)) {
                (Some(k), _) => (k.as_str().to_string(), k.start(), false),
                (None, Some(k)) => (k.as_str().to_string(), k.start() - 1, true),
                (None, None) => return None,
            };
            if !state_at(text, start).is_top_level() {
                return None;
            }
            Some(KeyAt {
                key,
                start,
                value_start: whole.end(),
                multi,
            })
        })
        .collect()
}

impl<'a> Context<'a> {
    /// Substitutes variables and expands `@f` calls.
    fn resolve(&self, text: &str) -> String {
        expand_calls(&substitute(text, &self.vars), &self.vars, None)
    }

    /// Turns a value expression into a [`Value`].
    fn parse_value(&mut self, text: &str) -> Result<Value> {
        let text = text.trim();

        if let Some(reference) = text.strip_prefix("@import=") {
            return import::import(unwrap_quotes(reference.trim()), &self.base_dir, self.imports);
        }
        if is_quoted(text) {
            return Ok(Value::String(unescape(&text[1..text.len() - 1])));
        }
        match text {
            "true" => return Ok(Value::Bool(true)),
            "false" => return Ok(Value::Bool(false)),
            "auto" => return Ok(Value::String("auto".to_string())),
            _ => {}
        }
        if text.starts_with('{') && text.ends_with('}') {
            let mut object = Map::new();
            self.inline_pairs(text[1..text.len() - 1].trim(), &mut object, false)?;
            return Ok(Value::Object(object));
        }
        if text.starts_with('[') && text.ends_with(']') {
            let inner = text[1..text.len() - 1].trim();
            if inner.is_empty() {
                return Ok(Value::Array(Vec::new()));
            }
            let mut parts = split_top_level(inner, ',');
            if parts.len() > 1 && parts.last().map_or(false, |p| p.trim().is_empty()) {
                parts.pop();
            }
            return parts
                .into_iter()
                .map(|part| self.parse_value(part))
                .collect::<Result<Vec<_>>>()
                .map(Value::Array);
        }
        if let Some(number) = Number::parse(text) {
            return Ok(Value::Number(number));
        }
        Ok(Value::String(unescape(text)))
    }

    /// Parses `key value`, `k1=v1 k2=v2` or a lone flag into `target`.
    ///
    /// With `overwrite` unset, a lone flag does not clobber an existing
    /// object or array, and lead text merges into an existing object.
    fn inline_pairs(&mut self, text: &str, target: &mut Map, overwrite: bool) -> Result<()> {
        let text = text.trim();
        if text.is_empty() {
            return Ok(());
        }

        for (suffix, empty) in [
            ("{}", Value::Object(Map::new())),
            ("[]", Value::Array(Vec::new())),
        ] {
            if let Some(head) = text.strip_suffix(suffix) {
                let head = head.trim_end();
                let key = head.strip_suffix('=').unwrap_or(head).trim();
                if is_key_token(key) {
                    target.insert(key.to_string(), empty);
                    return Ok(());
                }
            }
        }

        if text.contains('=') {
            let keys = find_keys(text);
            if let Some(first) = keys.first() {
                let lead = text[..first.start].trim();
                let target = if lead.is_empty() {
                    target
                } else {
                    if overwrite {
                        target.insert(lead.to_string(), Value::Object(Map::new()));
                    }
                    target.object_entry(lead)
                };
                for (i, key) in keys.iter().enumerate() {
                    let end = keys.get(i + 1).map_or(text.len(), |next| next.start);
                    let raw = text[key.value_start..end].trim();
                    if key.multi {
                        self.assign_multi(target, &key.key, raw)?;
                    } else {
                        let value = self.parse_value(&self.resolve(raw))?;
                        target.insert(key.key.clone(), value);
                    }
                }
                return Ok(());
            }
        }

        match text.find(char::is_whitespace) {
            None => {
                if !overwrite
                    && matches!(target.get(text), Some(Value::Object(_) | Value::Array(_)))
                {
                    return Ok(());
                }
                target.insert(text.to_string(), Value::Bool(true));
            }
            Some(split) => {
                let value = self.parse_value(&self.resolve(text[split..].trim()))?;
                target.insert(text[..split].to_string(), value);
            }
        }
        Ok(())
    }

    /// `[a, b*c, d] = value`: zips an array of matching length, otherwise
    /// assigns the same value to every key. `prefix*rest` makes `prefix`
    /// apply to the keys after it.
    fn assign_multi(&mut self, target: &mut Map, keys: &str, raw: &str) -> Result<()> {
        let value = self.parse_value(&self.resolve(raw))?;

        let mut prefix = String::new();
        let keys: Vec<String> = keys
            .split(',')
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .map(|k| match k.split_once('*') {
                Some((head, tail)) => {
                    prefix = head.to_string();
                    format!("{}{}", head, tail.split('*').next().unwrap_or(""))
                }
                None => format!("{}{}", prefix, k),
            })
            .collect();

        match value {
            Value::Array(items) if items.len() == keys.len() => {
                for (key, item) in keys.into_iter().zip(items) {
                    target.insert(key, item);
                }
            }
            value => {
                for key in keys {
                    target.insert(key, value.clone());
                }
            }
        }
        Ok(())
    }

    /// `key + value`: push onto arrays, join scalars with a newline,
    /// otherwise set.
    fn append(&mut self, target: &mut Map, key: &str, raw: &str) -> Result<()> {
        let value = self.parse_value(&self.resolve(raw))?;
        match target.get_mut(key) {
            None => {
                target.insert(key.to_string(), value);
            }
            Some(Value::Array(items)) => items.push(value),
            Some(slot @ (Value::String(_) | Value::Number(_) | Value::Bool(_))) => {
                let existing = slot.to_text();
                let addition = value.to_text();
                *slot = Value::String(if existing.is_empty() {
                    addition
                } else {
                    format!("{}\n{}", existing, addition)
                });
            }
            Some(slot) => *slot = value,
        }
        Ok(())
    }

    /// Fallback for lines no opener matched: `+` appends, `>` walks a key
    /// path, anything else is a list of inline pairs.
    fn complex_line(&mut self, line: &str, scope: &mut Map) -> Result<()> {
        let plus = find_top_level(line, |i, c| {
            if c != '+' {
                return false;
            }
            let before = &line[..i];
            if contains_top_level(before, '=') {
                return false;
            }
            !before.trim().contains(char::is_whitespace)
                || before.ends_with(' ')
                || line[i + 1..].starts_with(' ')
        });

        if let Some(plus) = plus {
            let key_path = line[..plus].trim();
            let raw = line[plus + 1..].trim();
            let parts: Vec<&str> = split_top_level(key_path, '>')
                .into_iter()
                .map(str::trim)
                .collect();
            let (last, parents) = match parts.split_last() {
                Some(split) => split,
                None => return Ok(()),
            };
            let target = parents.iter().fold(scope, |map, key| map.object_entry(key));
            return self.append(target, last, raw);
        }

        if contains_top_level(line, '>') {
            let parts: Vec<&str> = split_top_level(line, '>').into_iter().map(str::trim).collect();
            let (last, parents) = match parts.split_last() {
                Some(split) => split,
                None => return Ok(()),
            };
            let target = parents.iter().fold(scope, |map, key| map.object_entry(key));
            let is_assignment = !last.ends_with("{}")
                && !last.ends_with("[]")
                && (last.contains('=') || last.contains(char::is_whitespace));
            return self.inline_pairs(last, target, is_assignment);
        }

        self.inline_pairs(line, scope, true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lacon;

    fn parse(text: &str) -> Value {
        parse_document(text, Path::new("."), &mut ImportStack::new()).unwrap()
    }

    #[test]
    fn test_scalars() {
        let doc = parse("a 1\nb -2.5\nc true\nd auto\ne \"x y\"\nf plain text");
        assert_eq!(
            doc,
            lacon!({
                "a": 1,
                "b": -2.5,
                "c": true,
                "d": "auto",
                "e": "x y",
                "f": "plain text"
            })
        );
    }

    #[test]
    fn test_flags_and_equals() {
        let doc = parse("debug\nname = app\nport=80");
        assert_eq!(doc, lacon!({ "debug": true, "name": "app", "port": 80 }));
    }

    #[test]
    fn test_inline_pairs_with_lead_object() {
        let doc = parse("server host=localhost port=8080 tags=[a, b]");
        assert_eq!(
            doc,
            lacon!({ "server": { "host": "localhost", "port": 8080, "tags": ["a", "b"] } })
        );
    }

    #[test]
    fn test_equals_inside_quotes_and_nesting() {
        let doc = parse(r#"a="x=1 y=2" b={c=1 d={}} e=[1, [2, 3]]"#);
        assert_eq!(
            doc,
            lacon!({ "a": "x=1 y=2", "b": { "c": 1, "d": {} }, "e": [1, [2, 3]] })
        );
    }

    #[test]
    fn test_empty_shorthands() {
        let doc = parse("obj {}\nlist = []");
        assert_eq!(doc, lacon!({ "obj": {}, "list": [] }));
    }

    #[test]
    fn test_braced_blocks() {
        let doc = parse("server {\n  port 80\n  tls {\n    on true\n  }\n}\nafter 1");
        assert_eq!(
            doc,
            lacon!({ "server": { "port": 80, "tls": { "on": true } }, "after": 1 })
        );
    }

    #[test]
    fn test_indentation_blocks() {
        let doc = parse("server\n  port 80\n  tls\n    on true\nafter 1");
        assert_eq!(
            doc,
            lacon!({ "server": { "port": 80, "tls": { "on": true } }, "after": 1 })
        );
    }

    #[test]
    fn test_block_with_subkey() {
        let doc = parse("a > b {\n  c 1\n}");
        assert_eq!(doc, lacon!({ "a": { "b": { "c": 1 } } }));
    }

    #[test]
    fn test_path_operator() {
        let doc = parse("a > b > c 1\na > b > d=2\na > flag");
        assert_eq!(
            doc,
            lacon!({ "a": { "b": { "c": 1, "d": 2 }, "flag": true } })
        );
    }

    #[test]
    fn test_path_flag_keeps_existing_object() {
        let doc = parse("a > b > c 1\na > b");
        assert_eq!(doc, lacon!({ "a": { "b": { "c": 1 } } }));
    }

    #[test]
    fn test_append_to_scalar_joins_lines() {
        let doc = parse("a + 1\na + 2");
        assert_eq!(doc, lacon!({ "a": "1\n2" }));
    }

    #[test]
    fn test_append_to_array_pushes() {
        let doc = parse("a []\na + 1\na + 2\nb > list []\nb > list + x");
        assert_eq!(doc, lacon!({ "a": [1, 2], "b": { "list": ["x"] } }));
    }

    #[test]
    fn test_plus_inside_value_is_not_append() {
        let doc = parse("formula=x+y\nversion 1.0+build");
        assert_eq!(doc, lacon!({ "formula": "x+y", "version": "1.0+build" }));
    }

    #[test]
    fn test_multi_key() {
        let doc = parse("[a, b] = [1, 2]\n[c, d] = 5\n[net*ip, mask] 0");
        assert_eq!(
            doc,
            lacon!({ "a": 1, "b": 2, "c": 5, "d": 5, "netip": 0, "netmask": 0 })
        );
    }

    #[test]
    fn test_variables() {
        let doc = parse("$host example.org\n$url = \"https://$host/\"\nsite $url\nraw \\$host\nmissing $nope");
        assert_eq!(
            doc,
            lacon!({ "site": "https://example.org/", "raw": "$host", "missing": "$nope" })
        );
    }

    #[test]
    fn test_escapes() {
        let doc = parse(r#"s "tab\there \u{263A} \"q\"""#);
        assert_eq!(doc, lacon!({ "s": "tab\there \u{263A} \"q\"" }));
    }

    #[test]
    fn test_comments() {
        let doc = parse("// top\na 1 // trailing\n/* block\nb 2\n*/\nc \"not // comment\"\n/* one line */\nd 4");
        assert_eq!(doc, lacon!({ "a": 1, "c": "not // comment", "d": 4 }));
    }

    #[test]
    fn test_multiline_quoted() {
        let doc = parse("text (\n  \"first\",\n\n  \"second\"\n)");
        assert_eq!(doc, lacon!({ "text": "first\nsecond" }));
    }

    #[test]
    fn test_multiline_raw_dedents() {
        let doc = parse("code @(\n    fn main() {\n        run();\n    }\n)");
        assert_eq!(doc, lacon!({ "code": "fn main() {\n    run();\n}" }));
    }

    #[test]
    fn test_multiline_appends_to_existing_string() {
        let doc = parse("t \"a\"\nt (\n  b\n)");
        assert_eq!(doc, lacon!({ "t": "a\nb" }));
    }

    #[test]
    fn test_array_capture() {
        let doc = parse("$v 3\nlist [\n  1,\n  \"two\", // note\n  $v\n  {a=1}\n]");
        assert_eq!(doc, lacon!({ "list": [1, "two", 3, { "a": 1 }] }));
    }

    #[test]
    fn test_unterminated_array_flushed() {
        let doc = parse("list [\n  1\n  2");
        assert_eq!(doc, lacon!({ "list": [1, 2] }));
    }

    #[test]
    fn test_emit_inline() {
        let doc = parse("ports\n  <emit: 0 to +3 as local $i>p$i 800$i");
        assert_eq!(doc, lacon!({ "ports": { "p0": 8000, "p1": 8001, "p2": 8002 } }));
    }

    #[test]
    fn test_emit_block() {
        let doc = parse("<emit: 0x10 to +2 as local $h>\nslot_$h {\n  id \"$h\"\n}");
        assert_eq!(
            doc,
            lacon!({ "slot_0010": { "id": "0010" }, "slot_0011": { "id": "0011" } })
        );
    }

    #[test]
    fn test_format_call_in_value() {
        let doc = parse(r#"code @f("{:04X}", 10)
plain @f({:}, 0x10)"#);
        assert_eq!(doc, lacon!({ "code": "000A", "plain": 16 }));
    }

    #[test]
    fn test_later_assignment_overwrites_in_place() {
        let doc = parse("a 1\nb 2\na 3");
        let keys: Vec<_> = doc.as_object().unwrap().keys().cloned().collect();
        assert_eq!(keys, vec!["a", "b"]);
        assert_eq!(doc.pointer(&["a"]).and_then(Value::as_i64), Some(3));
    }

    #[test]
    fn test_emit_inside_array_capture() {
        let doc = parse("list [\n  <emit: 0 to +3 as local $i>$i\n]\nafter 1");
        assert_eq!(doc, lacon!({ "list": [0, 1, 2], "after": 1 }));
    }

    #[test]
    fn test_nested_emit_ignores_global_of_inner_name() {
        let doc = parse("$j G\n<emit: 0 to +1 as local $i>\nblk_$i {\n  <emit: 0 to +2 as local $j>k$j $i\n}\nafter $j");
        assert_eq!(
            doc,
            lacon!({ "blk_0": { "k0": 0, "k1": 0 }, "after": "G" })
        );
    }

    #[test]
    fn test_quoted_emit_marker_is_text() {
        let doc = parse(r#"desc "see <emit: 0 to +2>x""#);
        assert_eq!(doc, lacon!({ "desc": "see <emit: 0 to +2>x" }));
    }

    #[test]
    fn test_huge_count_without_template() {
        assert_eq!(parse("a 1\n<emit: 0 to +9223372036854775807>"), lacon!({ "a": 1 }));
    }

    #[test]
    fn test_raw_block_helpers() {
        let lines = vec!["  a".to_string(), "".to_string(), "    b".to_string()];
        assert_eq!(raw_block(&lines), "a\n\n  b");
        assert_eq!(raw_block(&["   ".to_string()]), "");
    }
}

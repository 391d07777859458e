//! Whole-document emit expansion.
//!
//! [`preprocess`] rewrites every `<emit:>` directive into the lines it
//! generates and leaves everything else as written, which is useful for
//! inspecting what the parser will actually see. Expanded text is scanned
//! again, so directives produced by another directive are expanded too.
//! Global variables are bound in document order, so a directive sees the
//! declarations above it, as it does when the document is parsed.

use crate::emit;
use crate::scan::strip_line_comment;
use crate::vars::{parse_declaration, substitute, Variables};

/// Expands all emit directives in `text`.
///
/// # Examples
///
/// ```rust
/// use lacon::preprocess;
///
/// let text = "$prefix port\n<emit: 1 to +2 as local $i>$prefix~_$i 80$i\n// <emit: 0 to +9>skipped";
/// assert_eq!(
///     preprocess(text),
///     "$prefix port\nport_1 801\nport_2 802\n// <emit: 0 to +9>skipped"
/// );
/// ```
#[must_use]
pub fn preprocess(text: &str) -> String {
    let mut lines: Vec<String> = text.split('\n').map(|l| l.replace('\r', "")).collect();
    let mut vars = Variables::new();
    let mut out = Vec::with_capacity(lines.len());
    let mut in_block_comment = false;
    let mut i = 0;

    while i < lines.len() {
        let trimmed = lines[i].trim();

        if in_block_comment {
            in_block_comment = !trimmed.contains("*/");
        } else if let Some(rest) = trimmed.strip_prefix("/*") {
            in_block_comment = !rest.contains("*/");
        } else if emit::has_directive(strip_line_comment(trimmed)) {
            match emit::expand(&lines, i, &mut vars) {
                Some(expansion) => {
                    let tail = lines.split_off(i + expansion.consumed);
                    lines.truncate(i);
                    lines.extend(expansion.lines);
                    lines.extend(tail);
                    continue;
                }
                None => tracing::warn!(line = i + 1, "malformed emit directive left as text"),
            }
        } else if let Some((name, value)) = parse_declaration(strip_line_comment(trimmed).trim()) {
            let value = substitute(&value, &vars);
            vars.define(name, value);
        }

        out.push(lines[i].clone());
        i += 1;
    }
    out.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_block_expansion() {
        let text = "root {\n  <emit: 0x0A to -2 as local $n>\n  item_$n {\n    v $n\n  }\n}";
        assert_eq!(
            preprocess(text),
            "root {\n  item_000A {\n    v 000A\n  }\n  item_0009 {\n    v 0009\n  }\n}"
        );
    }

    #[test]
    fn test_block_comment_untouched() {
        let text = "/*\n<emit: 0 to +2>x\n*/\ny 1";
        assert_eq!(preprocess(text), text);
    }

    #[test]
    fn test_malformed_directive_kept() {
        let text = "<emit: lots>x";
        assert_eq!(preprocess(text), text);
    }

    #[test]
    fn test_directive_sees_declarations_above_it() {
        let text = "$p a\n<emit: 0 to +1>k $p\n$p b\n<emit: 0 to +1>m $p\n<emit: 0 to +1>n $later\n$later x";
        assert_eq!(preprocess(text), "$p a\nk a\n$p b\nm b\nn $later\n$later x");
    }

    #[test]
    fn test_nested_directives() {
        let text = "<emit: 0 to +2 as local $a>\ng$a {\n  <emit: 0 to +2 as local $b>k$b 1\n}";
        assert_eq!(
            preprocess(text),
            "g0 {\n  k0 1\n  k1 1\n}\ng1 {\n  k0 1\n  k1 1\n}"
        );
    }
}

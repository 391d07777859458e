//! Output configuration shared by the JSON renderer and the source writer.
//!
//! ## Examples
//!
//! ```rust
//! use lacon::{convert_with_options, Options};
//!
//! let json = convert_with_options("a 1\nb 2", None, &Options::compact()).unwrap();
//! assert_eq!(json, r#"{"a":1,"b":2}"#);
//!
//! let json = convert_with_options("a 1", None, &Options::new().with_indent(4)).unwrap();
//! assert_eq!(json, "{\n    \"a\": 1\n}");
//! ```

/// Formatting options for rendered output.
///
/// `indent` is the number of spaces per nesting level. `pretty` switches
/// between multi-line and single-line output.
///
/// # Examples
///
/// ```rust
/// use lacon::Options;
///
/// let options = Options::new();
/// assert_eq!(options.indent, 2);
/// assert!(options.pretty);
///
/// let options = Options::compact();
/// assert!(!options.pretty);
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Options {
    pub indent: usize,
    pub pretty: bool,
}

impl Default for Options {
    fn default() -> Self {
        Options {
            indent: 2,
            pretty: true,
        }
    }
}

impl Options {
    /// Creates default options (pretty output, 2-space indent).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates options for single-line output.
    #[must_use]
    pub fn compact() -> Self {
        Options {
            pretty: false,
            ..Default::default()
        }
    }

    /// Sets the indentation size (number of spaces per level).
    ///
    /// Only affects pretty output.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use lacon::Options;
    ///
    /// let options = Options::new().with_indent(4);
    /// assert_eq!(options.indent, 4);
    /// ```
    #[must_use]
    pub fn with_indent(mut self, indent: usize) -> Self {
        self.indent = indent;
        self
    }

    /// Switches pretty output on or off.
    #[must_use]
    pub fn with_pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }

    /// One nesting level of source text. Never empty: a zero-width indent
    /// would close each block on its first line.
    pub(crate) fn indent_str(&self) -> String {
        " ".repeat(self.indent.max(1))
    }
}

//! # lacon
//!
//! A parser and JSON converter for LACON, an indentation-based configuration
//! language.
//!
//! ## What is LACON?
//!
//! LACON reads like a relaxed mix of INI files and JSON: one `key value`
//! per line, nesting by indentation or braces, and no mandatory quoting. On
//! top of that it has a small amount of generativity:
//!
//! - **Variables**: `$name value` declares, `$name` substitutes.
//! - **Imports**: `@import other.lacon` merges another file, with cycle detection.
//! - **Emit directives**: `<emit: 0 to +4 as local $i>` repeats a line or block.
//! - **Format calls**: `@f("{:04X}", 255)` renders numbers.
//!
//! See the [`syntax`] module for the full format.
//!
//! ## Quick Start
//!
//! ```rust
//! use lacon::convert;
//!
//! let text = "\
//! $host example.org
//! server
//!   url \"https://$host/\"
//!   ports [80, 443]
//! ";
//!
//! let json = convert(text, None).unwrap();
//! assert_eq!(json, r#"{
//!   "server": {
//!     "url": "https://example.org/",
//!     "ports": [
//!       80,
//!       443
//!     ]
//!   }
//! }"#);
//! ```
//!
//! ### Typed configuration
//!
//! ```rust
//! use lacon::from_str;
//! use serde::Deserialize;
//!
//! #[derive(Deserialize)]
//! struct Config { name: String, workers: u32 }
//!
//! let config: Config = from_str("name demo\nworkers 4").unwrap();
//! assert_eq!(config.name, "demo");
//! assert_eq!(config.workers, 4);
//! ```
//!
//! ### Working with trees
//!
//! ```rust
//! use lacon::{lacon, parse_str, Value};
//!
//! let doc = parse_str("a > b 1").unwrap();
//! assert_eq!(doc, lacon!({ "a": { "b": 1 } }));
//! assert_eq!(doc.pointer(&["a", "b"]).and_then(Value::as_i64), Some(1));
//! ```
//!
//! ## Errors
//!
//! Only imports can fail a parse: a missing file, an unreadable file or an
//! import cycle. Everything else that does not parse is kept as literal text.
//! The library logs through `tracing` and never installs a subscriber.

pub mod de;
pub mod emit;
pub mod error;
pub mod escape;
pub mod format;
pub mod import;
pub mod macros;
pub mod map;
pub mod options;
mod parser;
pub mod preprocess;
pub mod scan;
pub mod ser;
pub mod syntax;
pub mod value;
pub mod vars;

pub use de::from_value;
pub use emit::{parse_directive_fragment, EmitDirective};
pub use error::{Error, Result};
pub use map::Map;
pub use options::Options;
pub use preprocess::preprocess;
pub use ser::{to_value, ValueSerializer};
pub use value::{Number, Value};
pub use vars::{collect_variables, VariableInfo};

use import::ImportStack;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::Path;

/// Parses a document, resolving imports against the working directory.
///
/// # Examples
///
/// ```rust
/// use lacon::{lacon, parse_str};
///
/// let doc = parse_str("name demo\nlimits cpu=2 mem=512").unwrap();
/// assert_eq!(doc, lacon!({ "name": "demo", "limits": { "cpu": 2, "mem": 512 } }));
/// ```
///
/// # Errors
///
/// Returns an error if an import is missing, unreadable or circular.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn parse_str(text: &str) -> Result<Value> {
    parse_with_base(text, Path::new("."))
}

/// Parses a document, resolving imports against `base_dir`.
///
/// # Errors
///
/// Returns an error if an import is missing, unreadable or circular.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn parse_with_base(text: &str, base_dir: &Path) -> Result<Value> {
    parser::parse_document(text, base_dir, &mut ImportStack::new())
}

/// Reads and parses the file at `path`.
///
/// The file counts as being imported while it is parsed, so a file that
/// imports itself is reported as a cycle.
///
/// # Errors
///
/// Returns [`Error::FileNotFound`] or [`Error::Io`] if the file cannot be
/// read, and any error its imports produce.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn from_path(path: impl AsRef<Path>) -> Result<Value> {
    let path = import::resolve(&path.as_ref().to_string_lossy(), Path::new("."));
    import::parse_file(&path, &mut ImportStack::new())
}

/// Parses a document and deserializes it into `T`.
///
/// # Errors
///
/// Returns an error if parsing fails or the tree does not fit `T`.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn from_str<T: DeserializeOwned>(text: &str) -> Result<T> {
    from_value(parse_str(text)?)
}

/// Converts a document to pretty JSON with a 2-space indent.
///
/// Imports resolve against the directory of `origin`, or the working
/// directory when it is `None`.
///
/// # Examples
///
/// ```rust
/// use lacon::convert;
///
/// assert_eq!(convert("a 1", None).unwrap(), "{\n  \"a\": 1\n}");
/// ```
///
/// # Errors
///
/// Returns an error if an import is missing, unreadable or circular.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn convert(text: &str, origin: Option<&Path>) -> Result<String> {
    convert_with_options(text, origin, &Options::default())
}

/// Converts a document to JSON formatted according to `options`.
///
/// # Errors
///
/// Returns an error if an import is missing, unreadable or circular.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn convert_with_options(text: &str, origin: Option<&Path>, options: &Options) -> Result<String> {
    let base_dir = origin
        .and_then(Path::parent)
        .filter(|dir| !dir.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let value = parse_with_base(text, base_dir)?;
    to_json_with_options(&value, options)
}

/// Renders a tree as pretty JSON with a 2-space indent.
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_json(value: &Value) -> Result<String> {
    to_json_with_options(value, &Options::default())
}

/// Renders a tree as JSON formatted according to `options`.
///
/// # Examples
///
/// ```rust
/// use lacon::{lacon, to_json_with_options, Options};
///
/// let value = lacon!({ "a": [1, 2] });
/// let json = to_json_with_options(&value, &Options::compact()).unwrap();
/// assert_eq!(json, r#"{"a":[1,2]}"#);
/// ```
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_json_with_options(value: &Value, options: &Options) -> Result<String> {
    if !options.pretty {
        return serde_json::to_string(value).map_err(Error::custom);
    }
    let indent = " ".repeat(options.indent);
    let formatter = serde_json::ser::PrettyFormatter::with_indent(indent.as_bytes());
    let mut out = Vec::new();
    let mut serializer = serde_json::Serializer::with_formatter(&mut out, formatter);
    value.serialize(&mut serializer).map_err(Error::custom)?;
    String::from_utf8(out).map_err(Error::custom)
}

/// Writes any `T: Serialize` as LACON source text.
///
/// # Examples
///
/// ```rust
/// use lacon::{from_str, to_string};
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Serialize, Deserialize, PartialEq, Debug)]
/// struct Point { x: i32, y: i32 }
///
/// let text = to_string(&Point { x: 1, y: 2 }).unwrap();
/// assert_eq!(text, "x 1\ny 2");
/// assert_eq!(from_str::<Point>(&text).unwrap(), Point { x: 1, y: 2 });
/// ```
///
/// # Errors
///
/// Returns an error if `value` is not a map or struct, holds `None` or unit
/// values, or has keys outside the key alphabet.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_string<T>(value: &T) -> Result<String>
where
    T: ?Sized + Serialize,
{
    to_string_with_options(value, &Options::default())
}

/// Writes any `T: Serialize` as LACON source text formatted according to
/// `options`.
///
/// # Errors
///
/// Same as [`to_string`].
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_string_with_options<T>(value: &T, options: &Options) -> Result<String>
where
    T: ?Sized + Serialize,
{
    ser::write_document(&to_value(value)?, options)
}

//! Error types for LACON parsing and writing.
//!
//! Only a handful of conditions are fatal while converting a document:
//!
//! - **Missing imports**: an `@import` target that does not exist
//! - **Circular imports**: a file that (transitively) imports itself
//! - **I/O failures**: an import target that exists but cannot be read
//!
//! Everything else degrades gracefully. Malformed `<emit:>` headers and `@f`
//! calls are left in the output as literal text, undefined `$variables` are
//! kept verbatim and unrecognised lines fall back to plain key/value
//! assignments.
//!
//! The remaining variants are produced by the writer side of the crate, when a
//! value cannot be expressed in LACON source text.
//!
//! ## Examples
//!
//! ```rust
//! use lacon::{parse_str, Error};
//!
//! let result = parse_str("@import \"definitely-missing.lacon\"");
//! assert!(matches!(result, Err(Error::FileNotFound { .. })));
//! ```

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Represents all possible errors that can occur while reading or writing LACON.
#[derive(Debug, Clone, Error)]
pub enum Error {
    /// An imported file does not exist.
    #[error("File not found: {}", .path.display())]
    FileNotFound { path: PathBuf },

    /// A file is imported while it is already being resolved.
    #[error("Circular import detected: {}{}", .path.display(), render_chain(.chain))]
    CircularImport { path: PathBuf, chain: Vec<PathBuf> },

    /// A file exists but could not be read.
    #[error("IO error reading {}: {message}", .path.display())]
    Io { path: PathBuf, message: String },

    /// A key that cannot be written as a LACON key token.
    #[error("Unsupported key: {0:?}")]
    UnsupportedKey(String),

    /// A value that has no LACON representation (for example `null`).
    #[error("Unsupported value: {0}")]
    UnsupportedValue(String),

    /// Custom error
    #[error("Error: {0}")]
    Custom(String),
}

fn render_chain(chain: &[PathBuf]) -> String {
    if chain.is_empty() {
        return String::new();
    }
    let names: Vec<String> = chain.iter().map(|p| p.display().to_string()).collect();
    format!(" (import chain: {})", names.join(" -> "))
}

impl Error {
    /// Creates a file-not-found error for an import target.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use lacon::Error;
    ///
    /// let err = Error::file_not_found("/tmp/missing.lacon");
    /// assert!(err.to_string().contains("missing.lacon"));
    /// ```
    pub fn file_not_found(path: impl Into<PathBuf>) -> Self {
        Error::FileNotFound { path: path.into() }
    }

    /// Creates a circular import error.
    ///
    /// `chain` lists the files being resolved, outermost first.
    pub fn circular_import(path: impl Into<PathBuf>, chain: Vec<PathBuf>) -> Self {
        Error::CircularImport {
            path: path.into(),
            chain,
        }
    }

    /// Creates an I/O error for a file that could not be read.
    pub fn io(path: impl Into<PathBuf>, message: impl fmt::Display) -> Self {
        Error::Io {
            path: path.into(),
            message: message.to_string(),
        }
    }

    /// Creates an unsupported key error for keys outside the LACON key alphabet.
    pub fn unsupported_key(key: &str) -> Self {
        Error::UnsupportedKey(key.to_string())
    }

    /// Creates an unsupported value error.
    pub fn unsupported_value(msg: &str) -> Self {
        Error::UnsupportedValue(msg.to_string())
    }

    /// Creates a custom error with a display message.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use lacon::Error;
    ///
    /// let err = Error::custom("something went wrong");
    /// assert!(err.to_string().contains("something went wrong"));
    /// ```
    pub fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::Custom(msg.to_string())
    }

    /// Returns the file path this error refers to, if any.
    #[must_use]
    pub fn path(&self) -> Option<&PathBuf> {
        match self {
            Error::FileNotFound { path }
            | Error::CircularImport { path, .. }
            | Error::Io { path, .. } => Some(path),
            _ => None,
        }
    }
}

impl serde::ser::Error for Error {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::Custom(msg.to_string())
    }
}

impl serde::de::Error for Error {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::Custom(msg.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;

//! `@import` resolution.
//!
//! Import references are resolved against the directory of the importing
//! document. Every file being parsed sits on an [`ImportStack`] until its
//! parse finishes, so re-entering a file is reported as
//! [`Error::CircularImport`] instead of recursing forever. Nothing is cached:
//! importing the same file twice reads and parses it twice.

use crate::parser::parse_document;
use crate::{Error, Result, Value};
use indexmap::IndexSet;
use std::fs;
use std::path::{Component, Path, PathBuf};

/// Files currently being parsed, outermost first.
#[derive(Clone, Debug, Default)]
pub struct ImportStack {
    files: IndexSet<PathBuf>,
}

impl ImportStack {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn contains(&self, path: &Path) -> bool {
        self.files.contains(path)
    }

    #[must_use]
    pub fn depth(&self) -> usize {
        self.files.len()
    }

    /// The files on the stack, outermost first.
    #[must_use]
    pub fn chain(&self) -> Vec<PathBuf> {
        self.files.iter().cloned().collect()
    }

    fn push(&mut self, path: PathBuf) {
        self.files.insert(path);
    }

    fn pop(&mut self) {
        self.files.pop();
    }
}

/// Turns an import reference into an absolute, lexically normalised path.
///
/// # Examples
///
/// ```rust
/// use lacon::import::resolve;
/// use std::path::{Path, PathBuf};
///
/// let p = resolve("../shared/./base.lacon", Path::new("/etc/app/conf"));
/// assert_eq!(p, PathBuf::from("/etc/app/shared/base.lacon"));
/// ```
#[must_use]
pub fn resolve(reference: &str, base_dir: &Path) -> PathBuf {
    let joined = base_dir.join(reference);
    let absolute = if joined.is_absolute() {
        joined
    } else {
        match std::env::current_dir() {
            Ok(cwd) => cwd.join(joined),
            Err(_) => joined,
        }
    };
    normalize(&absolute)
}

fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

/// Parses the file at `path`, which must already be absolute and normalised.
///
/// The cycle check runs before the existence check.
pub fn parse_file(path: &Path, stack: &mut ImportStack) -> Result<Value> {
    if stack.contains(path) {
        return Err(Error::circular_import(path, stack.chain()));
    }
    if !path.exists() {
        return Err(Error::file_not_found(path));
    }
    let text = fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
    let base_dir = path.parent().unwrap_or_else(|| Path::new("/"));

    tracing::debug!(path = %path.display(), depth = stack.depth(), "importing");
    stack.push(path.to_path_buf());
    let result = parse_document(&text, base_dir, stack);
    stack.pop();
    result
}

/// Resolves `reference` against `base_dir` and parses the target.
pub fn import(reference: &str, base_dir: &Path, stack: &mut ImportStack) -> Result<Value> {
    parse_file(&resolve(reference, base_dir), stack)
}

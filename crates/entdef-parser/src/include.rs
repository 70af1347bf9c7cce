//! Bookkeeping for nested `@include` directives.

use std::path::{Path, PathBuf};

use log::debug;

use crate::file_system::normalize_path;

/// Files currently being parsed, outermost first.
#[derive(Debug, Default)]
pub(crate) struct IncludeStack {
    files: Vec<PathBuf>,
}

impl IncludeStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.files.iter().any(|file| file == path)
    }

    pub fn depth(&self) -> usize {
        self.files.len()
    }

    /// Runs `f` with `path` pushed on the stack.
    ///
    /// The entry is popped again whatever `f` returns.
    pub fn with_file<T>(&mut self, path: PathBuf, f: impl FnOnce(&mut Self) -> T) -> T {
        debug!(path = path.display().to_string(), depth = self.depth(); "Entering file");
        self.files.push(path);
        let result = f(self);
        self.files.pop();
        result
    }
}

/// Resolves an include target against the directory of the including file.
///
/// Without an including file the target is used as given.
pub(crate) fn resolve_include_path(origin: Option<&Path>, target: &str) -> PathBuf {
    let target = Path::new(target);
    let joined = match origin.and_then(Path::parent) {
        Some(directory) if target.is_relative() => directory.join(target),
        _ => target.to_path_buf(),
    };
    normalize_path(&joined)
}

//! Class path handling
//!
//! A [`ClassPath`] is an immutable, ordered list of path entries rendered with
//! the platform path separator. Empty entries are dropped on construction and
//! nothing is ever de-duplicated.
//!
//! On Windows, where the command line length is limited, a class path with
//! more than one entry prefers to be passed through an argument file
//! (`@file`) when the caller allows it.

use std::fmt;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tempfile::TempPath;
use tracing::debug;

/// Platform path separator used to join entries
pub const PATH_SEPARATOR: &str = if cfg!(windows) { ";" } else { ":" };

/// Argument files created during this process, deleted by [`cleanup_arg_files`]
static ARG_FILES: Mutex<Vec<TempPath>> = Mutex::new(Vec::new());

#[derive(Debug, Clone, Default)]
pub struct ClassPath {
    prefer_arg_file: bool,
    path: String,
}

impl ClassPath {
    /// An empty class path
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a class path from entries, silently dropping empty ones
    pub fn of<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let filtered: Vec<String> = entries
            .into_iter()
            .filter(|e| !e.as_ref().is_empty())
            .map(|e| e.as_ref().to_string())
            .collect();

        if filtered.is_empty() {
            return Self::empty();
        }

        Self {
            prefer_arg_file: filtered.len() > 1 && cfg!(windows),
            path: filtered.join(PATH_SEPARATOR),
        }
    }

    /// Build a class path from filesystem paths, using each one's absolute form
    pub fn of_paths<I, P>(paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        let entries: Vec<String> = paths
            .into_iter()
            .map(|p| absolute(p.as_ref()).display().to_string())
            .collect();
        Self::of(entries)
    }

    pub fn is_empty(&self) -> bool {
        self.path.is_empty()
    }

    /// Rendered entries in order
    pub fn entries(&self) -> Vec<&str> {
        if self.is_empty() {
            return Vec::new();
        }
        self.path.split(PATH_SEPARATOR).collect()
    }

    /// Append another class path to this one
    ///
    /// Either side being empty returns the other side unchanged.
    pub fn append(&self, other: &ClassPath) -> ClassPath {
        if other.is_empty() {
            return self.clone();
        }
        if self.is_empty() {
            return other.clone();
        }
        ClassPath {
            prefer_arg_file: self.prefer_arg_file || other.prefer_arg_file,
            path: format!("{}{}{}", self.path, PATH_SEPARATOR, other.path),
        }
    }

    /// Command line arguments for this class path under `flag`, never using an argument file
    pub fn args(&self, flag: &str) -> Vec<String> {
        self.args_with(flag, false)
    }

    /// Command line arguments for this class path under `flag`
    ///
    /// Returns an empty list when the class path is empty.
    pub fn args_with(&self, flag: &str, allow_arg_file: bool) -> Vec<String> {
        if self.is_empty() {
            return Vec::new();
        }
        vec![flag.to_string(), self.path_arg(allow_arg_file)]
    }

    fn path_arg(&self, allow_arg_file: bool) -> String {
        if self.prefer_arg_file && allow_arg_file {
            match self.create_arg_file() {
                Ok(file) => return format!("@{}", file.display()),
                Err(e) => debug!("Falling back to literal class path, argument file failed: {}", e),
            }
        }
        self.path.clone()
    }

    fn create_arg_file(&self) -> std::io::Result<PathBuf> {
        let mut file = tempfile::Builder::new()
            .prefix("modbuild-")
            .suffix(".argfile")
            .tempfile()?;
        write!(file, "\"{}\"", self.path.replace('\\', "\\\\"))?;
        file.flush()?;

        let temp_path = file.into_temp_path();
        let path = temp_path.to_path_buf();
        if let Ok(mut files) = ARG_FILES.lock() {
            files.push(temp_path);
        } else {
            // Registry unavailable: keep the file rather than delete it under the child
            temp_path.keep().map_err(|e| e.error)?;
        }
        Ok(path)
    }
}

impl PartialEq for ClassPath {
    fn eq(&self, other: &Self) -> bool {
        self.path == other.path
    }
}

impl Eq for ClassPath {}

impl fmt::Display for ClassPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path)
    }
}

/// Delete every argument file created so far (best effort)
pub fn cleanup_arg_files() {
    if let Ok(mut files) = ARG_FILES.lock() {
        files.clear();
    }
}

/// Absolute form of `path` without touching the filesystem
pub fn absolute(path: &Path) -> PathBuf {
    if path.is_absolute() {
        return path.to_path_buf();
    }
    match std::env::current_dir() {
        Ok(cwd) => cwd.join(path),
        Err(_) => path.to_path_buf(),
    }
}

//! Source collection and the shared sourcepath

use crate::core::classpath::absolute;
use crate::core::module::ResolvedModule;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

/// Extension of compilable source files
pub const SOURCE_EXTENSION: &str = "java";

/// Every source file under `dirs`, walking each tree recursively
///
/// Missing directories yield nothing.
pub fn collect_sources<P: AsRef<Path>>(dirs: &[P]) -> Vec<PathBuf> {
    let mut sources = Vec::new();
    for dir in dirs {
        let dir = dir.as_ref();
        if !dir.is_dir() {
            debug!("Source directory {} does not exist, skipping", dir.display());
            continue;
        }
        for entry in WalkDir::new(dir).sort_by_file_name() {
            match entry {
                Ok(entry) if entry.file_type().is_file() && is_source_file(entry.path()) => {
                    sources.push(entry.into_path());
                }
                Ok(_) => {}
                Err(e) => debug!("Skipping unreadable entry under {}: {}", dir.display(), e),
            }
        }
    }
    sources
}

fn is_source_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e == SOURCE_EXTENSION)
}

/// The directories among `dirs` that exist
pub fn existing_directories(dirs: &[PathBuf]) -> Vec<PathBuf> {
    dirs.iter().filter(|d| d.is_dir()).cloned().collect()
}

/// Existing source directories of every module, de-duplicated in first-seen order
///
/// Two entries are the same directory when their canonical paths match;
/// the first spelling seen is kept.
pub fn collect_shared_sourcepath(modules: &[ResolvedModule]) -> Vec<PathBuf> {
    let mut seen = HashSet::new();
    let mut sourcepath = Vec::new();
    for module in modules {
        for dir in existing_directories(&module.source_directories) {
            let key = dir.canonicalize().unwrap_or_else(|_| absolute(&dir));
            if seen.insert(key) {
                sourcepath.push(absolute(&dir));
            }
        }
    }
    sourcepath
}

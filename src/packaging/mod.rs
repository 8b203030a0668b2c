//! Web archive packaging
//!
//! Layout of the written archive:
//!
//! - files of the source directory at their relative paths
//! - files of each additional content directory at their relative paths
//! - compiled classes under `WEB-INF/classes/` when `include_classes` is set
//! - library files under `WEB-INF/lib/`
//!
//! Entries are written in sorted walk order with `/` separators. The first
//! entry written under a name wins; later duplicates are skipped.

use crate::core::error::{BuildError, Result};
use crate::core::settings::PackageSettings;
use std::collections::HashSet;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use walkdir::WalkDir;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

pub const CLASSES_PREFIX: &str = "WEB-INF/classes/";
pub const LIB_PREFIX: &str = "WEB-INF/lib/";
pub const DESCRIPTOR: &str = "WEB-INF/web.xml";

/// What the package step did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PackageOutcome {
    Written { destination: PathBuf, entries: usize },
    /// The source directory is unset or missing; nothing was written
    SkippedMissingSource { source: Option<PathBuf> },
}

/// Package a module according to `settings`
///
/// A missing destination is a configuration error. A missing source
/// directory skips the step without writing anything.
pub fn package(settings: &PackageSettings, module_output: Option<&Path>) -> Result<PackageOutcome> {
    let destination = settings.destination.as_ref().ok_or_else(|| {
        BuildError::Configuration("package step requires a destination".to_string())
    })?;

    let source = match settings.source_directory.as_ref() {
        Some(source) if source.is_dir() => source,
        other => {
            warn!(
                "Package source directory {} does not exist, skipping",
                other.map(|p| p.display().to_string()).unwrap_or_else(|| "(unset)".to_string())
            );
            return Ok(PackageOutcome::SkippedMissingSource {
                source: other.cloned(),
            });
        }
    };

    if let Some(parent) = destination.parent() {
        std::fs::create_dir_all(parent).map_err(|e| {
            BuildError::io(format!("failed to create {}", parent.display()), e)
        })?;
    }

    let file = File::create(destination)
        .map_err(|e| BuildError::io(format!("failed to create {}", destination.display()), e))?;
    let mut archive = ArchiveWriter::new(BufWriter::new(file));
    // the destination may sit inside one of the trees being archived
    archive.exclude = destination.canonicalize().ok();

    archive.add_tree(source, "")?;

    for dir in settings.additional_content_directories.iter().flatten() {
        if dir.is_dir() {
            archive.add_tree(dir, "")?;
        } else {
            warn!("Additional content directory {} does not exist, skipping", dir.display());
        }
    }

    if settings.include_classes {
        let classes = settings.classes_directory.as_deref().or(module_output);
        match classes {
            Some(classes) if classes.is_dir() => archive.add_tree(classes, CLASSES_PREFIX)?,
            Some(classes) => debug!("Classes directory {} does not exist", classes.display()),
            None => debug!("No classes directory to include"),
        }
    }

    for lib in settings.lib_entries.iter().flatten() {
        match lib.file_name().and_then(|n| n.to_str()) {
            Some(name) if lib.is_file() => {
                archive.add_file(lib, &format!("{}{}", LIB_PREFIX, name))?;
            }
            _ => warn!("Library {} does not exist, skipping", lib.display()),
        }
    }

    let entries = archive.finish()?;
    info!("Wrote {} ({} entries)", destination.display(), entries);

    Ok(PackageOutcome::Written {
        destination: destination.clone(),
        entries,
    })
}

/// Zip writer that tracks entry names
struct ArchiveWriter<W: Write + std::io::Seek> {
    zip: ZipWriter<W>,
    names: HashSet<String>,
    options: SimpleFileOptions,
    /// Never archived, even when found in a tree
    exclude: Option<PathBuf>,
}

impl<W: Write + std::io::Seek> ArchiveWriter<W> {
    fn new(writer: W) -> Self {
        Self {
            zip: ZipWriter::new(writer),
            names: HashSet::new(),
            options: SimpleFileOptions::default().compression_method(CompressionMethod::Deflated),
            exclude: None,
        }
    }

    fn is_excluded(&self, path: &Path) -> bool {
        match &self.exclude {
            Some(exclude) if path.file_name() == exclude.file_name() => {
                path.canonicalize().is_ok_and(|p| p == *exclude)
            }
            _ => false,
        }
    }

    /// Add every file and directory under `root`, named `prefix` + relative path
    fn add_tree(&mut self, root: &Path, prefix: &str) -> Result<()> {
        if !prefix.is_empty() {
            self.add_directory(prefix)?;
        }
        for entry in WalkDir::new(root).min_depth(1).sort_by_file_name() {
            let entry = entry.map_err(|e| {
                BuildError::io(format!("failed to read {}", root.display()), e.into())
            })?;
            let relative = match entry.path().strip_prefix(root) {
                Ok(relative) => relative,
                Err(_) => continue,
            };
            let name = format!("{}{}", prefix, entry_name(relative));
            if entry.file_type().is_dir() {
                self.add_directory(&format!("{}/", name))?;
            } else if entry.file_type().is_file() {
                self.add_file(entry.path(), &name)?;
            }
        }
        Ok(())
    }

    /// Add a directory entry and any missing parents; `name` ends with `/`
    fn add_directory(&mut self, name: &str) -> Result<()> {
        let trimmed = name.trim_end_matches('/');
        if let Some((parent, _)) = trimmed.rsplit_once('/') {
            self.add_directory(&format!("{}/", parent))?;
        }
        let name = format!("{}/", trimmed);
        if !self.names.insert(name.clone()) {
            return Ok(());
        }
        self.zip
            .add_directory(name.as_str(), self.options)
            .map_err(|e| zip_error(&name, e))
    }

    fn add_file(&mut self, path: &Path, name: &str) -> Result<()> {
        if self.is_excluded(path) {
            debug!("Skipping {}, it is the archive being written", path.display());
            return Ok(());
        }
        if let Some((parent, _)) = name.rsplit_once('/') {
            self.add_directory(&format!("{}/", parent))?;
        }
        if !self.names.insert(name.to_string()) {
            debug!("Skipping duplicate archive entry {}", name);
            return Ok(());
        }
        self.zip
            .start_file(name, self.options)
            .map_err(|e| zip_error(name, e))?;
        let mut input = File::open(path)
            .map_err(|e| BuildError::io(format!("failed to open {}", path.display()), e))?;
        std::io::copy(&mut input, &mut self.zip)
            .map_err(|e| BuildError::io(format!("failed to write {}", name), e))?;
        Ok(())
    }

    fn finish(self) -> Result<usize> {
        let entries = self.names.len();
        let mut writer = self.zip.finish().map_err(|e| zip_error("archive", e))?;
        writer
            .flush()
            .map_err(|e| BuildError::io("failed to flush archive", e))?;
        Ok(entries)
    }
}

/// Archive entry name for a relative path, always `/` separated
fn entry_name(relative: &Path) -> String {
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

fn zip_error(name: &str, e: zip::result::ZipError) -> BuildError {
    BuildError::io(format!("failed to write archive entry {}", name), std::io::Error::other(e))
}

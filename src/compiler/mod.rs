//! Pluggable compiler backends
//!
//! A backend turns compiler options plus a list of source files into a
//! success flag and a list of diagnostics. Backends are looked up by name in
//! a [`CompilerRegistry`] once, before any module runs.

pub mod ecj;
pub mod javac;

use crate::core::error::{BuildError, Result};
use crate::core::toolchain::Toolchain;
use crate::execution::executor::ProcessExecutor;
use async_trait::async_trait;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use tempfile::TempPath;
use tracing::{error, info, warn};

pub use ecj::EcjBackend;
pub use javac::JavacBackend;

/// Names accepted for `compiler.backend`
pub const BUILTIN_BACKENDS: &[&str] = &["javac", "ecj"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
    Info,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => f.write_str("error"),
            Severity::Warning => f.write_str("warning"),
            Severity::Info => f.write_str("info"),
        }
    }
}

/// One compiler message
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub message: String,
}

impl Diagnostic {
    pub fn new(severity: Severity, message: impl Into<String>) -> Self {
        Self {
            severity,
            message: message.into(),
        }
    }

    /// Route to the log channel matching the severity
    pub fn log(&self, module: &str) {
        match self.severity {
            Severity::Error => error!("[{}] {}", module, self.message),
            Severity::Warning => warn!("[{}] {}", module, self.message),
            Severity::Info => info!("[{}] {}", module, self.message),
        }
    }
}

/// Result of one compiler invocation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompileOutcome {
    pub success: bool,
    pub diagnostics: Vec<Diagnostic>,
}

impl CompileOutcome {
    pub fn count(&self, severity: Severity) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == severity)
            .count()
    }
}

/// A source-to-bytecode compiler
#[async_trait]
pub trait CompilerBackend: Send + Sync {
    fn name(&self) -> &str;

    /// Whether `-properties <file>` is understood
    fn accepts_properties_file(&self) -> bool {
        false
    }

    /// Compile `sources` with `options`
    ///
    /// Compiler-reported errors come back as an unsuccessful outcome; `Err`
    /// is reserved for failing to run the compiler at all.
    async fn compile(&self, options: &[String], sources: &[PathBuf]) -> Result<CompileOutcome>;
}

type BackendFactory =
    Box<dyn Fn(&Toolchain, &ProcessExecutor) -> Result<Arc<dyn CompilerBackend>> + Send + Sync>;

/// Backend constructors keyed by name
pub struct CompilerRegistry {
    factories: BTreeMap<String, BackendFactory>,
}

impl CompilerRegistry {
    /// An empty registry
    pub fn new() -> Self {
        Self {
            factories: BTreeMap::new(),
        }
    }

    /// Registry with the `javac` and `ecj` backends
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register("javac", |toolchain, executor| {
            Ok(Arc::new(JavacBackend::new(toolchain, executor.clone())?))
        });
        registry.register("ecj", |toolchain, executor| {
            Ok(Arc::new(EcjBackend::locate(toolchain, executor.clone())?))
        });
        registry
    }

    /// Register a backend, replacing any existing one with the same name
    pub fn register<F>(&mut self, name: impl Into<String>, factory: F)
    where
        F: Fn(&Toolchain, &ProcessExecutor) -> Result<Arc<dyn CompilerBackend>>
            + Send
            + Sync
            + 'static,
    {
        self.factories.insert(name.into(), Box::new(factory));
    }

    pub fn names(&self) -> Vec<&str> {
        self.factories.keys().map(String::as_str).collect()
    }

    /// Construct the backend registered under `name`
    pub fn resolve(
        &self,
        name: &str,
        toolchain: &Toolchain,
        executor: &ProcessExecutor,
    ) -> Result<Arc<dyn CompilerBackend>> {
        let factory = self.factories.get(name).ok_or_else(|| {
            BuildError::Configuration(format!(
                "Unknown compiler backend '{}' (registered: {})",
                name,
                self.names().join(", ")
            ))
        })?;
        factory(toolchain, executor)
    }
}

impl Default for CompilerRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

/// Write `sources` to an argument file, one quoted path per line
///
/// The file is deleted when the returned path is dropped.
pub(crate) fn source_list_file(sources: &[PathBuf]) -> Result<TempPath> {
    let mut file = tempfile::Builder::new()
        .prefix("modbuild-sources-")
        .suffix(".txt")
        .tempfile()
        .map_err(|e| BuildError::io("failed to create source list", e))?;
    for source in sources {
        let escaped = source.display().to_string().replace('\\', "\\\\");
        writeln!(file, "\"{}\"", escaped)
            .map_err(|e| BuildError::io("failed to write source list", e))?;
    }
    file.flush()
        .map_err(|e| BuildError::io("failed to write source list", e))?;
    Ok(file.into_temp_path())
}

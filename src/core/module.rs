//! Resolved modules and their build steps

use crate::core::settings::{CompileSettings, DocumentSettings, PackageSettings, TranslateSettings};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// The four build steps, in the order they always run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StepKind {
    Compile,
    Translate,
    Document,
    Package,
}

impl StepKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            StepKind::Compile => "compile",
            StepKind::Translate => "translate",
            StepKind::Document => "document",
            StepKind::Package => "package",
        }
    }
}

impl fmt::Display for StepKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An enabled build step with its merged settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildStep {
    Compile(CompileSettings),
    Translate(TranslateSettings),
    Document(DocumentSettings),
    Package(PackageSettings),
}

impl BuildStep {
    pub fn kind(&self) -> StepKind {
        match self {
            BuildStep::Compile(_) => StepKind::Compile,
            BuildStep::Translate(_) => StepKind::Translate,
            BuildStep::Document(_) => StepKind::Document,
            BuildStep::Package(_) => StepKind::Package,
        }
    }

    /// Whether a failure of this step aborts the run
    ///
    /// Compile and document failures always do; translate and package
    /// failures only when their `fail_on_error` flag is set.
    pub fn is_fatal_on_failure(&self) -> bool {
        match self {
            BuildStep::Compile(_) | BuildStep::Document(_) => true,
            BuildStep::Translate(settings) => settings.fail_on_error,
            BuildStep::Package(settings) => settings.fail_on_error,
        }
    }
}

/// Build steps assembled from merged settings, keeping only enabled ones in run order
pub fn enabled_steps(
    compile: Option<CompileSettings>,
    translate: Option<TranslateSettings>,
    document: Option<DocumentSettings>,
    package: Option<PackageSettings>,
) -> Vec<BuildStep> {
    let mut steps = Vec::new();
    if let Some(settings) = compile.filter(|s| s.enabled) {
        steps.push(BuildStep::Compile(settings));
    }
    if let Some(settings) = translate.filter(|s| s.enabled) {
        steps.push(BuildStep::Translate(settings));
    }
    if let Some(settings) = document.filter(|s| s.enabled) {
        steps.push(BuildStep::Document(settings));
    }
    if let Some(settings) = package.filter(|s| s.enabled) {
        steps.push(BuildStep::Package(settings));
    }
    steps
}

/// A module that passed resolution
///
/// Read-only once the run starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedModule {
    pub name: String,
    /// Declared source directories (absolute; not all of them need to exist)
    pub source_directories: Vec<PathBuf>,
    pub output_directory: Option<PathBuf>,
    pub classpath_entries: Vec<String>,
    /// Enabled steps, in run order
    pub steps: Vec<BuildStep>,
}

impl ResolvedModule {
    pub fn step(&self, kind: StepKind) -> Option<&BuildStep> {
        self.steps.iter().find(|s| s.kind() == kind)
    }

    pub fn has_steps(&self) -> bool {
        !self.steps.is_empty()
    }

    pub fn step_kinds(&self) -> Vec<StepKind> {
        self.steps.iter().map(BuildStep::kind).collect()
    }
}

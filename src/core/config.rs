//! Build configuration from YAML

use crate::compiler::BUILTIN_BACKENDS;
use crate::core::classpath::ClassPath;
use crate::core::error::{BuildError, Result};
use crate::core::settings::{
    CompileSettings, DocumentSettings, PackageSettings, StepDefaults, TranslateSettings,
};
use crate::core::toolchain::Toolchain;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Top-level build configuration loaded from YAML
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BuildConfig {
    /// Build name (optional)
    #[serde(default)]
    pub name: Option<String>,

    /// Skip the whole run
    #[serde(default)]
    pub skip: bool,

    /// JDK location; `$JAVA_HOME` when unset
    #[serde(default)]
    pub java_home: Option<PathBuf>,

    /// Working directory for forked tools; the build file's directory when unset
    #[serde(default)]
    pub working_directory: Option<PathBuf>,

    /// Global source level, used when no compile settings set one
    #[serde(default)]
    pub source: Option<String>,

    /// Global target level, used when no compile settings set one
    #[serde(default)]
    pub target: Option<String>,

    /// Externally supplied dependency class path
    #[serde(default)]
    pub dependency_classpath: Vec<PathBuf>,

    #[serde(default)]
    pub compiler: CompilerConfig,

    /// Step defaults layered under every module
    #[serde(default)]
    pub defaults: StepDefaults,

    /// Modules in declaration order
    #[serde(default)]
    pub modules: Vec<ModuleConfig>,

    /// Standalone forked Java programs, run with `modbuild exec`
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub java_processes: Vec<JavaProcessConfig>,

    /// Directory relative paths were resolved against
    #[serde(skip)]
    base_dir: PathBuf,
}

/// Compiler backend selection
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CompilerConfig {
    /// Registry key of the backend
    #[serde(default = "default_backend")]
    pub backend: String,

    /// Extra locations searched for backends that are not part of the JDK
    #[serde(default)]
    pub artifacts: Vec<PathBuf>,
}

fn default_backend() -> String {
    "javac".to_string()
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self {
            backend: default_backend(),
            artifacts: Vec::new(),
        }
    }
}

/// A module as declared in YAML
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ModuleConfig {
    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub source_directories: Vec<PathBuf>,

    #[serde(default)]
    pub output_directory: Option<PathBuf>,

    /// Extra class path entries for this module only
    #[serde(default)]
    pub classpath_entries: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compile: Option<CompileSettings>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub translate: Option<TranslateSettings>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document: Option<DocumentSettings>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub package: Option<PackageSettings>,
}

/// A forked Java program declared in YAML
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct JavaProcessConfig {
    pub name: String,

    /// Fully qualified main class
    pub main_class: String,

    #[serde(default)]
    pub classpath_entries: Vec<String>,

    /// Put the project class path (existing module outputs, then
    /// dependencies) before `classpath_entries`
    #[serde(default = "default_true")]
    pub include_project_classpath: bool,

    #[serde(default)]
    pub jvm_arguments: Vec<String>,

    #[serde(default)]
    pub system_properties: BTreeMap<String, String>,

    #[serde(default)]
    pub arguments: Vec<String>,

    /// Defaults to the build's working directory
    #[serde(default)]
    pub working_directory: Option<PathBuf>,

    #[serde(default = "default_true")]
    pub fail_on_error: bool,

    #[serde(default)]
    pub skip: bool,
}

fn default_true() -> bool {
    true
}

impl ModuleConfig {
    /// Name used in logs: the declared name, else the output directory's name
    pub fn display_name(&self) -> String {
        if let Some(name) = self.name.as_deref().filter(|n| !n.trim().is_empty()) {
            return name.to_string();
        }
        self.output_directory
            .as_ref()
            .and_then(|dir| dir.file_name())
            .and_then(|n| n.to_str())
            .map(str::to_string)
            .unwrap_or_else(|| "unnamed".to_string())
    }
}

impl BuildConfig {
    /// Load build configuration from a YAML file
    ///
    /// Relative paths are resolved against the file's directory.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| BuildError::io(format!("failed to read {}", path.display()), e))?;
        let base_dir = path
            .parent()
            .map(crate::core::classpath::absolute)
            .unwrap_or_else(|| crate::core::classpath::absolute(Path::new(".")));
        Self::from_yaml_in(&content, &base_dir)
    }

    /// Parse build configuration from a YAML string, resolving paths against the current directory
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        Self::from_yaml_in(yaml, &crate::core::classpath::absolute(Path::new(".")))
    }

    /// Parse build configuration from a YAML string, resolving paths against `base_dir`
    pub fn from_yaml_in(yaml: &str, base_dir: &Path) -> Result<Self> {
        let mut config: BuildConfig = serde_yaml::from_str(yaml)
            .map_err(|e| BuildError::Configuration(format!("invalid build file: {}", e)))?;
        config.resolve_paths(base_dir);
        config.validate()?;
        Ok(config)
    }

    /// Validate the build configuration
    pub fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for module in &self.modules {
            let name = module.display_name();
            if !seen.insert(name.clone()) {
                return Err(BuildError::Configuration(format!(
                    "Duplicate module name: {}",
                    name
                )));
            }
        }

        let mut seen = HashSet::new();
        for process in &self.java_processes {
            if !seen.insert(process.name.as_str()) {
                return Err(BuildError::Configuration(format!(
                    "Duplicate java process name: {}",
                    process.name
                )));
            }
            if process.main_class.trim().is_empty() {
                return Err(BuildError::Configuration(format!(
                    "java process {} requires a main_class",
                    process.name
                )));
            }
        }

        if !BUILTIN_BACKENDS.contains(&self.compiler.backend.as_str()) {
            return Err(BuildError::Configuration(format!(
                "Unknown compiler backend '{}' (expected one of: {})",
                self.compiler.backend,
                BUILTIN_BACKENDS.join(", ")
            )));
        }

        Ok(())
    }

    /// Build name for display
    pub fn display_name(&self) -> String {
        self.name
            .clone()
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| {
                self.base_dir
                    .file_name()
                    .and_then(|n| n.to_str())
                    .unwrap_or("build")
                    .to_string()
            })
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Working directory for forked tools
    pub fn working_directory(&self) -> PathBuf {
        self.working_directory
            .clone()
            .unwrap_or_else(|| self.base_dir.clone())
    }

    /// The externally supplied dependency class path, in declaration order
    ///
    /// Entries that do not exist are dropped.
    pub fn dependency_classpath(&self) -> ClassPath {
        let existing: Vec<&PathBuf> = self
            .dependency_classpath
            .iter()
            .filter(|entry| {
                let exists = entry.exists();
                if !exists {
                    debug!("Dependency {} does not exist, leaving it off the class path", entry.display());
                }
                exists
            })
            .collect();
        ClassPath::of_paths(existing)
    }

    pub fn toolchain(&self) -> Toolchain {
        Toolchain::new(self.java_home.clone(), self.compiler.artifacts.clone())
    }

    pub fn module(&self, name: &str) -> Option<&ModuleConfig> {
        self.modules.iter().find(|m| m.display_name() == name)
    }

    pub fn java_process(&self, name: &str) -> Option<&JavaProcessConfig> {
        self.java_processes.iter().find(|p| p.name == name)
    }

    /// Module output directories that exist, then the dependency class path
    pub fn project_classpath(&self) -> ClassPath {
        let outputs: Vec<&PathBuf> = self
            .modules
            .iter()
            .filter_map(|m| m.output_directory.as_ref())
            .filter(|dir| dir.exists())
            .collect();
        ClassPath::of_paths(outputs).append(&self.dependency_classpath())
    }

    fn resolve_paths(&mut self, base_dir: &Path) {
        self.base_dir = base_dir.to_path_buf();

        resolve_opt(base_dir, &mut self.java_home);
        resolve_opt(base_dir, &mut self.working_directory);
        resolve_all(base_dir, &mut self.dependency_classpath);
        resolve_all(base_dir, &mut self.compiler.artifacts);

        let defaults = &mut self.defaults;
        resolve_compile(base_dir, defaults.compile.as_mut());
        resolve_translate(base_dir, defaults.translate.as_mut());
        resolve_document(base_dir, defaults.document.as_mut());
        resolve_package(base_dir, defaults.package.as_mut());

        for module in &mut self.modules {
            resolve_all(base_dir, &mut module.source_directories);
            resolve_opt(base_dir, &mut module.output_directory);
            resolve_entries(base_dir, &mut module.classpath_entries);
            resolve_compile(base_dir, module.compile.as_mut());
            resolve_translate(base_dir, module.translate.as_mut());
            resolve_document(base_dir, module.document.as_mut());
            resolve_package(base_dir, module.package.as_mut());
        }

        for process in &mut self.java_processes {
            resolve_opt(base_dir, &mut process.working_directory);
            resolve_entries(base_dir, &mut process.classpath_entries);
        }
    }
}

fn resolve(base_dir: &Path, path: &mut PathBuf) {
    if path.is_relative() {
        *path = base_dir.join(&*path);
    }
}

fn resolve_opt(base_dir: &Path, path: &mut Option<PathBuf>) {
    if let Some(path) = path {
        resolve(base_dir, path);
    }
}

fn resolve_all(base_dir: &Path, paths: &mut [PathBuf]) {
    for path in paths {
        resolve(base_dir, path);
    }
}

fn resolve_entries(base_dir: &Path, entries: &mut [String]) {
    for entry in entries.iter_mut().filter(|e| !e.is_empty()) {
        if Path::new(entry.as_str()).is_relative() {
            *entry = base_dir.join(entry.as_str()).display().to_string();
        }
    }
}

fn resolve_compile(base_dir: &Path, settings: Option<&mut CompileSettings>) {
    if let Some(settings) = settings {
        resolve_opt(base_dir, &mut settings.properties_file);
        if let Some(entries) = settings.classpath_entries.as_mut() {
            resolve_entries(base_dir, entries);
        }
    }
}

fn resolve_translate(base_dir: &Path, settings: Option<&mut TranslateSettings>) {
    if let Some(settings) = settings {
        if let Some(entries) = settings.classpath_entries.as_mut() {
            resolve_entries(base_dir, entries);
        }
    }
}

fn resolve_document(base_dir: &Path, settings: Option<&mut DocumentSettings>) {
    if let Some(settings) = settings {
        resolve_opt(base_dir, &mut settings.output_directory);
        if let Some(entries) = settings.classpath_entries.as_mut() {
            resolve_entries(base_dir, entries);
        }
    }
}

fn resolve_package(base_dir: &Path, settings: Option<&mut PackageSettings>) {
    if let Some(settings) = settings {
        resolve_opt(base_dir, &mut settings.source_directory);
        resolve_opt(base_dir, &mut settings.destination);
        resolve_opt(base_dir, &mut settings.classes_directory);
        if let Some(dirs) = settings.additional_content_directories.as_mut() {
            resolve_all(base_dir, dirs);
        }
        if let Some(libs) = settings.lib_entries.as_mut() {
            resolve_all(base_dir, libs);
        }
    }
}

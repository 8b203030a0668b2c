//! Module resolution - decides which declared modules take part in a run

use crate::core::config::{BuildConfig, ModuleConfig};
use crate::core::error::{BuildError, Result};
use crate::core::module::{enabled_steps, ResolvedModule};
use crate::core::settings::{merge, CompileSettings};
use crate::execution::sources::existing_directories;
use serde::Serialize;
use tracing::{debug, warn};

/// A declared module that was left out of the run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedModule {
    pub name: String,
    pub reason: String,
}

/// Outcome of resolving every declared module
#[derive(Debug, Clone, Default)]
pub struct Resolution {
    /// Kept modules, in declaration order
    pub modules: Vec<ResolvedModule>,
    pub skipped: Vec<SkippedModule>,
}

impl Resolution {
    pub fn module(&self, name: &str) -> Option<&ResolvedModule> {
        self.modules.iter().find(|m| m.name == name)
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }
}

/// Merges step settings and filters declared modules
pub struct ModuleResolver<'a> {
    config: &'a BuildConfig,
}

impl<'a> ModuleResolver<'a> {
    pub fn new(config: &'a BuildConfig) -> Self {
        Self { config }
    }

    /// Resolve every declared module, skipping the ones with nothing to build
    pub fn resolve(&self) -> Resolution {
        let mut resolution = Resolution::default();
        for declared in &self.config.modules {
            match self.resolve_module(declared) {
                Ok(module) => {
                    debug!(
                        "Resolved module {} with steps {:?}",
                        module.name,
                        module.step_kinds()
                    );
                    resolution.modules.push(module);
                }
                Err(e) => {
                    let name = declared.display_name();
                    warn!("Skipping module {}: {}", name, e);
                    resolution.skipped.push(SkippedModule {
                        name,
                        reason: e.to_string(),
                    });
                }
            }
        }
        resolution
    }

    /// Merge one module's settings over the defaults
    ///
    /// A module is kept when it has an existing source directory, an
    /// output directory, or an enabled package step. Anything else is a
    /// [`BuildError::Validation`].
    pub fn resolve_module(&self, declared: &ModuleConfig) -> Result<ResolvedModule> {
        let defaults = &self.config.defaults;
        let compile = merge(defaults.compile.as_ref(), declared.compile.as_ref())
            .map(|settings| self.with_global_levels(settings));
        let translate = merge(defaults.translate.as_ref(), declared.translate.as_ref());
        let document = merge(defaults.document.as_ref(), declared.document.as_ref());
        let package = merge(defaults.package.as_ref(), declared.package.as_ref());

        let has_sources = !existing_directories(&declared.source_directories).is_empty();
        let has_output = declared.output_directory.is_some();
        let packages = package.as_ref().is_some_and(|p| p.enabled);

        if !(has_sources || has_output || packages) {
            return Err(BuildError::Validation(
                "no existing source directory, no output directory and packaging disabled"
                    .to_string(),
            ));
        }

        Ok(ResolvedModule {
            name: declared.display_name(),
            source_directories: declared.source_directories.clone(),
            output_directory: declared.output_directory.clone(),
            classpath_entries: declared.classpath_entries.clone(),
            steps: enabled_steps(compile, translate, document, package),
        })
    }

    fn with_global_levels(&self, mut settings: CompileSettings) -> CompileSettings {
        if settings.source.is_none() {
            settings.source = self.config.source.clone();
        }
        if settings.target.is_none() {
            settings.target = self.config.target.clone();
        }
        settings
    }
}

//! Build engine - runs every resolved module's steps in order

use crate::{
    compiler::{CompilerBackend, CompilerRegistry, Severity},
    core::{
        classpath::ClassPath,
        config::BuildConfig,
        error::{BuildError, Result},
        module::{BuildStep, ResolvedModule, StepKind},
        state::{ModuleReport, ModuleState, RunReport, RunStatus, StepOutcome},
        toolchain::Toolchain,
    },
    execution::{
        executor::{Interrupt, LogSink, ProcessExecutor},
        resolver::Resolution,
        sources::{collect_shared_sourcepath, collect_sources},
        steps,
    },
    packaging::{self, PackageOutcome},
};
use chrono::Utc;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{error, info, warn};
use uuid::Uuid;

/// Events that can occur during a build run
#[derive(Debug, Clone)]
pub enum BuildEvent {
    RunStarted {
        run_id: Uuid,
        build_name: String,
        modules: usize,
    },
    ModuleSkipped {
        module: String,
        reason: String,
    },
    ModuleStarted {
        module: String,
        steps: Vec<StepKind>,
    },
    StepStarted {
        module: String,
        step: StepKind,
    },
    StepSucceeded {
        module: String,
        step: StepKind,
    },
    /// The step had nothing to do
    StepSkipped {
        module: String,
        step: StepKind,
        reason: String,
    },
    /// The step failed but the run continues
    StepWarning {
        module: String,
        step: StepKind,
        message: String,
    },
    /// The step failed and aborts the run
    StepFailed {
        module: String,
        step: StepKind,
        error: String,
    },
    ModuleFinished {
        module: String,
        aborted: bool,
    },
    RunFinished {
        run_id: Uuid,
        status: RunStatus,
    },
}

/// Type for event handlers
pub type EventHandler = Arc<dyn Fn(BuildEvent) + Send + Sync>;

/// How a step that did not fail ended
enum StepRun {
    Completed,
    Skipped(String),
}

/// Main build engine
pub struct BuildEngine {
    compiler: Arc<dyn CompilerBackend>,
    executor: ProcessExecutor,
    toolchain: Toolchain,
    dependency_classpath: ClassPath,
    working_directory: Option<PathBuf>,
    build_name: String,
    module_filter: Option<Vec<String>>,
    event_handlers: Arc<Mutex<Vec<EventHandler>>>,
}

impl BuildEngine {
    pub fn new(
        compiler: Arc<dyn CompilerBackend>,
        executor: ProcessExecutor,
        toolchain: Toolchain,
    ) -> Self {
        Self {
            compiler,
            executor,
            toolchain,
            dependency_classpath: ClassPath::empty(),
            working_directory: None,
            build_name: "build".to_string(),
            module_filter: None,
            event_handlers: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Engine for a loaded build file
    ///
    /// The compiler backend is resolved here, so an unusable backend fails
    /// before any module runs.
    pub fn from_config(
        config: &BuildConfig,
        registry: &CompilerRegistry,
        interrupt: Interrupt,
    ) -> Result<Self> {
        let executor = ProcessExecutor::new(interrupt);
        let toolchain = config.toolchain();
        let compiler = registry.resolve(&config.compiler.backend, &toolchain, &executor)?;
        info!("Using compiler backend: {}", compiler.name());

        Ok(Self::new(compiler, executor, toolchain)
            .with_dependency_classpath(config.dependency_classpath())
            .with_working_directory(config.working_directory())
            .with_build_name(config.display_name()))
    }

    pub fn with_dependency_classpath(mut self, classpath: ClassPath) -> Self {
        self.dependency_classpath = classpath;
        self
    }

    pub fn with_working_directory(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_directory = Some(dir.into());
        self
    }

    pub fn with_build_name(mut self, name: impl Into<String>) -> Self {
        self.build_name = name.into();
        self
    }

    /// Only run the named modules; class paths still cover every resolved module
    pub fn with_module_filter(mut self, names: Vec<String>) -> Self {
        self.module_filter = if names.is_empty() { None } else { Some(names) };
        self
    }

    /// Add an event handler
    pub async fn add_event_handler<F>(&self, handler: F)
    where
        F: Fn(BuildEvent) + Send + Sync + 'static,
    {
        self.event_handlers.lock().await.push(Arc::new(handler));
    }

    /// Emit an event to all handlers
    async fn emit_event(&self, event: BuildEvent) {
        let handlers = self.event_handlers.lock().await;
        for handler in handlers.iter() {
            handler(event.clone());
        }
    }

    pub fn module_classpath(&self, all: &[ResolvedModule], module: &ResolvedModule) -> ClassPath {
        module_classpath(all, &self.dependency_classpath, module)
    }

    fn is_selected(&self, module: &ResolvedModule) -> bool {
        self.module_filter
            .as_ref()
            .map_or(true, |names| names.iter().any(|n| *n == module.name))
    }

    /// Run every resolved module in declaration order
    ///
    /// The first fatal failure stops the run; the returned report carries it.
    pub async fn execute(&self, resolution: &Resolution) -> RunReport {
        let mut report = RunReport::new();
        report.start();
        let run_id = report.run_id;

        info!("Starting build {} ({})", self.build_name, run_id);
        self.emit_event(BuildEvent::RunStarted {
            run_id,
            build_name: self.build_name.clone(),
            modules: resolution.modules.len(),
        })
        .await;

        for skipped in &resolution.skipped {
            report.modules.push(ModuleReport {
                name: skipped.name.clone(),
                state: ModuleState::Skipped {
                    reason: skipped.reason.clone(),
                },
                steps: Vec::new(),
            });
            self.emit_event(BuildEvent::ModuleSkipped {
                module: skipped.name.clone(),
                reason: skipped.reason.clone(),
            })
            .await;
        }

        let sourcepath = collect_shared_sourcepath(&resolution.modules);

        for module in &resolution.modules {
            if !self.is_selected(module) {
                let reason = "not selected";
                report.modules.push(skipped_report(&module.name, reason));
                self.emit_event(BuildEvent::ModuleSkipped {
                    module: module.name.clone(),
                    reason: reason.to_string(),
                })
                .await;
                continue;
            }

            if !module.has_steps() {
                warn!("Module {} has no build steps enabled, skipping", module.name);
                let reason = "no build steps enabled";
                report.modules.push(skipped_report(&module.name, reason));
                self.emit_event(BuildEvent::ModuleSkipped {
                    module: module.name.clone(),
                    reason: reason.to_string(),
                })
                .await;
                continue;
            }

            let classpath = self.module_classpath(&resolution.modules, module);
            let (module_report, failure) = self.run_module(module, &classpath, &sourcepath).await;
            report.modules.push(module_report);

            if let Some(error) = failure {
                error!("Build aborted: {}", error);
                report.fail(error.to_string());
                self.emit_event(BuildEvent::RunFinished {
                    run_id,
                    status: report.status,
                })
                .await;
                return report;
            }
        }

        info!("Build {} completed", self.build_name);
        report.complete();
        self.emit_event(BuildEvent::RunFinished {
            run_id,
            status: report.status,
        })
        .await;
        report
    }

    async fn run_module(
        &self,
        module: &ResolvedModule,
        classpath: &ClassPath,
        sourcepath: &[PathBuf],
    ) -> (ModuleReport, Option<BuildError>) {
        info!("Processing module: {}", module.name);
        self.emit_event(BuildEvent::ModuleStarted {
            module: module.name.clone(),
            steps: module.step_kinds(),
        })
        .await;

        let mut report = ModuleReport::new(&module.name);
        let started_at = Utc::now();

        for step in &module.steps {
            let kind = step.kind();
            report.state = ModuleState::Running {
                step: kind,
                started_at: Utc::now(),
            };
            info!("[{}] {} starting", module.name, kind);
            self.emit_event(BuildEvent::StepStarted {
                module: module.name.clone(),
                step: kind,
            })
            .await;

            match self.run_step(module, step, classpath, sourcepath).await {
                Ok(StepRun::Completed) => {
                    info!("[{}] {} successful", module.name, kind);
                    report.steps.push((kind, StepOutcome::Success));
                    self.emit_event(BuildEvent::StepSucceeded {
                        module: module.name.clone(),
                        step: kind,
                    })
                    .await;
                }
                Ok(StepRun::Skipped(reason)) => {
                    report.steps.push((kind, StepOutcome::Skipped {
                        reason: reason.clone(),
                    }));
                    self.emit_event(BuildEvent::StepSkipped {
                        module: module.name.clone(),
                        step: kind,
                        reason,
                    })
                    .await;
                }
                Err(e) if e.is_configuration() || step.is_fatal_on_failure() => {
                    error!("[{}] {} failed: {}", module.name, kind, e);
                    report.steps.push((kind, StepOutcome::FailedFatal {
                        error: e.to_string(),
                    }));
                    report.state = ModuleState::Aborted {
                        step: kind,
                        error: e.to_string(),
                        aborted_at: Utc::now(),
                    };
                    self.emit_event(BuildEvent::StepFailed {
                        module: module.name.clone(),
                        step: kind,
                        error: e.to_string(),
                    })
                    .await;
                    self.emit_event(BuildEvent::ModuleFinished {
                        module: module.name.clone(),
                        aborted: true,
                    })
                    .await;
                    return (report, Some(e));
                }
                Err(e) => {
                    warn!("[{}] {} failed, continuing: {}", module.name, kind, e);
                    report.steps.push((kind, StepOutcome::FailedNonFatal {
                        error: e.to_string(),
                    }));
                    self.emit_event(BuildEvent::StepWarning {
                        module: module.name.clone(),
                        step: kind,
                        message: e.to_string(),
                    })
                    .await;
                }
            }
        }

        report.state = ModuleState::Completed {
            started_at,
            completed_at: Utc::now(),
        };
        self.emit_event(BuildEvent::ModuleFinished {
            module: module.name.clone(),
            aborted: false,
        })
        .await;
        (report, None)
    }

    async fn run_step(
        &self,
        module: &ResolvedModule,
        step: &BuildStep,
        classpath: &ClassPath,
        sourcepath: &[PathBuf],
    ) -> Result<StepRun> {
        match step {
            BuildStep::Compile(settings) => {
                let output = steps::require_output_directory(
                    &module.name,
                    module.output_directory.as_deref(),
                )?;
                let sources = collect_sources(&module.source_directories);
                if sources.is_empty() {
                    info!("[{}] No source files found, skipping compile", module.name);
                    return Ok(StepRun::Skipped("no source files".to_string()));
                }

                std::fs::create_dir_all(&output).map_err(|e| {
                    BuildError::io(format!("failed to create {}", output.display()), e)
                })?;

                let options = steps::compile_options(
                    settings,
                    &output,
                    classpath,
                    sourcepath,
                    self.compiler.accepts_properties_file(),
                );
                info!(
                    "[{}] Compiling {} source files with {}",
                    module.name,
                    sources.len(),
                    self.compiler.name()
                );

                let outcome = self.compiler.compile(&options, &sources).await?;
                for diagnostic in &outcome.diagnostics {
                    diagnostic.log(&module.name);
                }
                if !outcome.success {
                    return Err(BuildError::tool_failure(
                        &module.name,
                        StepKind::Compile,
                        format!(
                            "{} error(s), {} warning(s)",
                            outcome.count(Severity::Error),
                            outcome.count(Severity::Warning)
                        ),
                    ));
                }
                Ok(StepRun::Completed)
            }
            BuildStep::Translate(settings) => {
                if !steps::has_translation_units(settings) {
                    warn!("[{}] No translation units specified, skipping", module.name);
                    return Ok(StepRun::Skipped("no translation units".to_string()));
                }
                let command = steps::translate_command(
                    &self.toolchain.java_executable(),
                    settings,
                    classpath,
                    &module.source_directories,
                )?;
                self.fork(module, StepKind::Translate, &command).await
            }
            BuildStep::Document(settings) => {
                if settings.service_class.as_deref().map_or(true, str::is_empty) {
                    warn!("[{}] No service class specified, skipping", module.name);
                    return Ok(StepRun::Skipped("no service class".to_string()));
                }
                let command =
                    steps::document_command(&self.toolchain.java_executable(), settings, classpath)?;
                self.fork(module, StepKind::Document, &command).await
            }
            BuildStep::Package(settings) => {
                match packaging::package(settings, module.output_directory.as_deref())? {
                    PackageOutcome::Written { .. } => Ok(StepRun::Completed),
                    PackageOutcome::SkippedMissingSource { .. } => {
                        Ok(StepRun::Skipped("source directory missing".to_string()))
                    }
                }
            }
        }
    }

    async fn fork(&self, module: &ResolvedModule, step: StepKind, command: &[String]) -> Result<StepRun> {
        info!("[{}] {} command: {}", module.name, step, command.join(" "));
        let code = self
            .executor
            .run(command, self.working_directory.as_deref(), &LogSink::default())
            .await?;
        if code != 0 {
            return Err(BuildError::tool_failure(
                &module.name,
                step,
                format!("exited with code {}", code),
            ));
        }
        Ok(StepRun::Completed)
    }
}

/// Class path for `module`: every module's output directory, then the
/// dependency class path, then the module's own entries
///
/// Only declared paths are used, whether or not anything has been
/// compiled into them yet.
pub fn module_classpath(
    all: &[ResolvedModule],
    dependency_classpath: &ClassPath,
    module: &ResolvedModule,
) -> ClassPath {
    let outputs: Vec<&PathBuf> = all
        .iter()
        .filter_map(|m| m.output_directory.as_ref())
        .collect();
    ClassPath::of_paths(outputs)
        .append(dependency_classpath)
        .append(&ClassPath::of(&module.classpath_entries))
}

fn skipped_report(name: &str, reason: &str) -> ModuleReport {
    ModuleReport {
        name: name.to_string(),
        state: ModuleState::Skipped {
            reason: reason.to_string(),
        },
        steps: Vec::new(),
    }
}

//! Standalone forked Java programs declared under `java_processes`

use crate::core::classpath::ClassPath;
use crate::core::command_line::CommandLineBuilder;
use crate::core::config::{BuildConfig, JavaProcessConfig};
use crate::core::error::{BuildError, Result};
use crate::execution::executor::{Interrupt, LogSink, ProcessExecutor};
use std::path::PathBuf;
use tracing::{debug, info, warn};

/// How a declared process ended, when it did not fail the build
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessOutcome {
    Skipped,
    Succeeded,
    /// Nonzero exit with `fail_on_error` off
    FailedLenient { code: i32 },
}

/// Runs `java_processes` entries one at a time
pub struct JavaProcessRunner {
    executor: ProcessExecutor,
    java: String,
    project_classpath: ClassPath,
    working_directory: PathBuf,
}

impl JavaProcessRunner {
    pub fn new(
        executor: ProcessExecutor,
        java: impl Into<String>,
        project_classpath: ClassPath,
        working_directory: impl Into<PathBuf>,
    ) -> Self {
        Self {
            executor,
            java: java.into(),
            project_classpath,
            working_directory: working_directory.into(),
        }
    }

    pub fn from_config(config: &BuildConfig, interrupt: Interrupt) -> Self {
        Self::new(
            ProcessExecutor::new(interrupt),
            config.toolchain().java_executable(),
            config.project_classpath(),
            config.working_directory(),
        )
    }

    /// Full command line, launcher first
    pub fn command(&self, process: &JavaProcessConfig) -> Result<Vec<String>> {
        let mut classpath = if process.include_project_classpath {
            self.project_classpath.clone()
        } else {
            ClassPath::empty()
        };
        classpath = classpath.append(&ClassPath::of(&process.classpath_entries));

        let builder = CommandLineBuilder::for_entry_point(process.main_class.as_str())?
            .with_vm_arguments(process.jvm_arguments.iter().cloned())
            .with_system_properties(process.system_properties.iter())
            .with_classpath(&classpath)
            .with_arguments(process.arguments.iter().cloned())
            .use_arg_file(true);

        let mut command = vec![self.java.clone()];
        command.extend(builder.build());
        Ok(command)
    }

    pub async fn run(&self, process: &JavaProcessConfig) -> Result<ProcessOutcome> {
        if process.skip {
            info!("Skipping java process {} (skip=true)", process.name);
            return Ok(ProcessOutcome::Skipped);
        }

        let command = self.command(process)?;
        info!("Executing: {}", process.main_class);
        debug!("Full command: {}", command.join(" "));

        let working_directory = process
            .working_directory
            .as_deref()
            .unwrap_or(self.working_directory.as_path());
        let code = self
            .executor
            .run(&command, Some(working_directory), &LogSink::new(&process.name))
            .await?;

        match code {
            0 => {
                info!("Java process completed successfully: {}", process.main_class);
                Ok(ProcessOutcome::Succeeded)
            }
            code if process.fail_on_error => Err(BuildError::ProcessFailure {
                name: process.name.clone(),
                main_class: process.main_class.clone(),
                code,
            }),
            code => {
                warn!("Java process exited with code {}: {}", code, process.main_class);
                Ok(ProcessOutcome::FailedLenient { code })
            }
        }
    }
}

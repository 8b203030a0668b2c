//! Error types for module builds

use crate::core::module::StepKind;
use thiserror::Error;

/// Errors raised while running an external process
#[derive(Debug, Error)]
pub enum ProcessError {
    #[error("empty command line")]
    EmptyCommand,

    #[error("failed to launch {program}: {source}")]
    Launch {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("interrupted while waiting for {program}")]
    Interrupted { program: String },

    #[error("failed waiting for {program}: {source}")]
    Wait {
        program: String,
        #[source]
        source: std::io::Error,
    },
}

/// Error taxonomy for a build run
#[derive(Debug, Error)]
pub enum BuildError {
    /// Required field missing, unknown backend, unresolvable compiler.
    /// Always aborts the run.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Something was not buildable. Recovered locally by skipping.
    #[error("validation error: {0}")]
    Validation(String),

    #[error(transparent)]
    Process(#[from] ProcessError),

    /// A tool ran but reported failure (nonzero exit, compile errors)
    #[error("[{module}] {step} failed: {message}")]
    ToolFailure {
        module: String,
        step: StepKind,
        message: String,
    },

    /// A standalone Java process exited nonzero with `fail_on_error` set
    #[error("java process {name} ({main_class}) failed with exit code {code}")]
    ProcessFailure {
        name: String,
        main_class: String,
        code: i32,
    },

    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },
}

impl BuildError {
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        BuildError::Io {
            context: context.into(),
            source,
        }
    }

    pub fn tool_failure(module: &str, step: StepKind, message: impl Into<String>) -> Self {
        BuildError::ToolFailure {
            module: module.to_string(),
            step,
            message: message.into(),
        }
    }

    /// Configuration errors abort the run no matter which step raised them
    pub fn is_configuration(&self) -> bool {
        matches!(self, BuildError::Configuration(_))
    }
}

pub type Result<T> = std::result::Result<T, BuildError>;

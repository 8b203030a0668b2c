//! modbuild - a multi-module build orchestrator for Java source trees

pub mod cli;
pub mod compiler;
pub mod core;
pub mod execution;
pub mod packaging;

// Re-export commonly used types
pub use compiler::{CompileOutcome, CompilerBackend, CompilerRegistry, Diagnostic, Severity};
pub use core::config::{BuildConfig, JavaProcessConfig, ModuleConfig};
pub use core::{BuildError, ClassPath, CommandLineBuilder, RunReport, RunStatus, StepKind};
pub use execution::{
    BuildEngine, BuildEvent, Interrupt, JavaProcessRunner, ModuleResolver, ProcessExecutor,
    ProcessOutcome, Resolution,
};

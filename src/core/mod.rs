//! Core domain models for modbuild
//!
//! Class paths, command lines, layered step settings, modules, and the
//! build file they are loaded from.

pub mod classpath;
pub mod command_line;
pub mod config;
pub mod error;
pub mod module;
pub mod settings;
pub mod state;
pub mod toolchain;

pub use classpath::ClassPath;
pub use command_line::CommandLineBuilder;
pub use error::{BuildError, ProcessError};
pub use module::*;
pub use settings::*;
pub use state::*;
pub use toolchain::Toolchain;

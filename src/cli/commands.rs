//! CLI command definitions

use clap::Args;

/// Run the build
#[derive(Debug, Args, Clone)]
pub struct RunCommand {
    /// Path to build YAML file
    #[arg(short, long)]
    pub file: String,

    /// Only run these modules (repeatable)
    #[arg(long)]
    pub module: Vec<String>,

    /// Skip the run
    #[arg(long)]
    pub skip: bool,
}

/// Validate a build file
#[derive(Debug, Args, Clone)]
pub struct ValidateCommand {
    /// Path to build YAML file
    #[arg(short, long)]
    pub file: String,

    /// Output in JSON format
    #[arg(long)]
    pub json: bool,
}

/// Show resolved modules, steps and class paths
#[derive(Debug, Args, Clone)]
pub struct PlanCommand {
    /// Path to build YAML file
    #[arg(short, long)]
    pub file: String,
}

/// Print or write a module's class path
#[derive(Debug, Args, Clone)]
pub struct ClasspathCommand {
    /// Path to build YAML file
    #[arg(short, long)]
    pub file: String,

    /// Module name
    #[arg(long)]
    pub module: String,

    /// Write to this file instead of stdout
    #[arg(short, long)]
    pub output: Option<String>,

    /// Put the module's source directories first
    #[arg(long)]
    pub sources: bool,
}

/// Run processes declared under `java_processes`
#[derive(Debug, Args, Clone)]
pub struct ExecCommand {
    /// Path to build YAML file
    #[arg(short, long)]
    pub file: String,

    /// Processes to run, in order (default: all, in declaration order)
    pub names: Vec<String>,

    /// Skip execution
    #[arg(long)]
    pub skip: bool,
}

//! Command-line interface

pub mod commands;
pub mod output;

use clap::{Parser, Subcommand};
use commands::{ClasspathCommand, ExecCommand, PlanCommand, RunCommand, ValidateCommand};
use std::ffi::OsString;

/// Multi-module build orchestrator for Java source trees
#[derive(Debug, Parser, Clone)]
#[command(name = "modbuild")]
#[command(version)]
#[command(about = "Compile, translate, document and package Java modules", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

/// Available commands
#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Run the build
    Run(RunCommand),

    /// Validate a build file
    Validate(ValidateCommand),

    /// Show what a run would do without running anything
    Plan(PlanCommand),

    /// Print or write a module's class path
    Classpath(ClasspathCommand),

    /// Run declared Java processes against the project class path
    Exec(ExecCommand),
}

impl Cli {
    /// Parse CLI arguments from environment
    pub fn from_args() -> Self {
        Self::parse()
    }

    /// Parse CLI arguments from a slice
    pub fn try_parse_from<I, T>(itr: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        <Self as Parser>::try_parse_from(itr)
    }
}

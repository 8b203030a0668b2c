//! Scenario tests for modbuild
//!
//! Each scenario builds a small module tree in a temporary directory and
//! drives the engine with a fake compiler backend.

#[path = "../helpers.rs"]
mod helpers;

mod circular_modules;
mod classpath_composition;
mod compiler_options;
mod config_end_to_end;
mod failure_policy;
mod java_process;

//! Build execution: module resolution, the engine, and forked processes

pub mod engine;
pub mod executor;
pub mod java_process;
pub mod resolver;
pub mod sources;
pub mod steps;

pub use engine::{module_classpath, BuildEngine, BuildEvent, EventHandler};
pub use executor::{CollectingSink, Interrupt, LogSink, OutputSink, ProcessExecutor};
pub use java_process::{JavaProcessRunner, ProcessOutcome};
pub use resolver::{ModuleResolver, Resolution, SkippedModule};
pub use sources::{collect_shared_sourcepath, collect_sources};

//! The Eclipse batch compiler, located among declared artifacts

use crate::compiler::{source_list_file, CompileOutcome, CompilerBackend, Diagnostic, Severity};
use crate::core::error::{BuildError, Result};
use crate::core::toolchain::Toolchain;
use crate::execution::executor::{CollectingSink, ProcessExecutor};
use async_trait::async_trait;
use regex::Regex;
use std::path::PathBuf;
use tracing::{debug, info};

/// Maven coordinates of the supported compiler release
pub const ECJ_COORDINATES: &str = "org.eclipse.jdt:ecj:3.13.101";

const ECJ_MAIN: &str = "org.eclipse.jdt.internal.compiler.batch.Main";

/// Runs ECJ's batch entry point on the configured JVM
pub struct EcjBackend {
    java: String,
    jar: PathBuf,
    executor: ProcessExecutor,
    parser: EcjOutputParser,
}

impl EcjBackend {
    /// Find the ECJ jar among the toolchain's artifacts
    pub fn locate(toolchain: &Toolchain, executor: ProcessExecutor) -> Result<Self> {
        let jar = toolchain.find_artifact("ecj").ok_or_else(|| {
            BuildError::Configuration(format!(
                "ECJ compiler not found. Add {} to compiler.artifacts",
                ECJ_COORDINATES
            ))
        })?;
        info!("Using ECJ from {}", jar.display());
        Ok(Self {
            java: toolchain.java_executable(),
            jar: jar.to_path_buf(),
            executor,
            parser: EcjOutputParser::new()?,
        })
    }
}

#[async_trait]
impl CompilerBackend for EcjBackend {
    fn name(&self) -> &str {
        "ecj"
    }

    fn accepts_properties_file(&self) -> bool {
        true
    }

    async fn compile(&self, options: &[String], sources: &[PathBuf]) -> Result<CompileOutcome> {
        let list = source_list_file(sources)?;

        let mut command = vec![
            self.java.clone(),
            "-cp".to_string(),
            self.jar.display().to_string(),
            ECJ_MAIN.to_string(),
        ];
        command.extend(options.iter().cloned());
        command.push(format!("@{}", list.display()));

        let sink = CollectingSink::new();
        let code = self.executor.run(&command, None, &sink).await?;
        debug!("ecj exited with code {}", code);

        let mut diagnostics = self.parser.parse(&sink.lines());
        let success = code == 0;
        if !success && !diagnostics.iter().any(|d| d.severity == Severity::Error) {
            diagnostics.push(Diagnostic::new(
                Severity::Error,
                format!("ecj exited with code {}", code),
            ));
        }

        Ok(CompileOutcome {
            success,
            diagnostics,
        })
    }
}

/// Splits ECJ's `----------` delimited problem blocks into diagnostics
pub struct EcjOutputParser {
    header: Regex,
    summary: Regex,
}

impl EcjOutputParser {
    pub fn new() -> Result<Self> {
        let compile = |pattern: &str| {
            Regex::new(pattern).map_err(|e| BuildError::Configuration(e.to_string()))
        };
        Ok(Self {
            header: compile(r"^\d+\. (ERROR|WARNING|INFO) in (.*)$")?,
            summary: compile(r"^\d+ problems? \(")?,
        })
    }

    pub fn parse(&self, lines: &[String]) -> Vec<Diagnostic> {
        let mut diagnostics = Vec::new();
        let mut current: Option<Diagnostic> = None;

        for line in lines {
            if line.starts_with("----------") {
                diagnostics.extend(current.take());
                continue;
            }
            if let Some(caps) = self.header.captures(line) {
                diagnostics.extend(current.take());
                let severity = match &caps[1] {
                    "ERROR" => Severity::Error,
                    "WARNING" => Severity::Warning,
                    _ => Severity::Info,
                };
                current = Some(Diagnostic::new(severity, caps[2].to_string()));
                continue;
            }
            match current.as_mut() {
                Some(diagnostic) => {
                    diagnostic.message.push('\n');
                    diagnostic.message.push_str(line);
                }
                None if self.summary.is_match(line) || line.trim().is_empty() => {}
                None => diagnostics.push(Diagnostic::new(Severity::Info, line.clone())),
            }
        }
        diagnostics.extend(current);
        diagnostics
    }
}

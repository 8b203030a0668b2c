//! The JDK's own compiler, run as a child process

use crate::compiler::{source_list_file, CompileOutcome, CompilerBackend, Diagnostic, Severity};
use crate::core::error::{BuildError, Result};
use crate::core::toolchain::Toolchain;
use crate::execution::executor::{CollectingSink, ProcessExecutor};
use async_trait::async_trait;
use regex::Regex;
use std::path::PathBuf;
use tracing::debug;

/// Runs `javac` from the configured JDK, or from PATH
pub struct JavacBackend {
    javac: String,
    executor: ProcessExecutor,
    parser: JavacOutputParser,
}

impl JavacBackend {
    pub fn new(toolchain: &Toolchain, executor: ProcessExecutor) -> Result<Self> {
        Ok(Self {
            javac: toolchain.tool_executable("javac"),
            executor,
            parser: JavacOutputParser::new()?,
        })
    }
}

#[async_trait]
impl CompilerBackend for JavacBackend {
    fn name(&self) -> &str {
        "javac"
    }

    async fn compile(&self, options: &[String], sources: &[PathBuf]) -> Result<CompileOutcome> {
        let list = source_list_file(sources)?;

        let mut command = vec![self.javac.clone()];
        command.extend(options.iter().cloned());
        command.push(format!("@{}", list.display()));

        let sink = CollectingSink::new();
        let code = self.executor.run(&command, None, &sink).await?;
        debug!("javac exited with code {}", code);

        let mut diagnostics = self.parser.parse(&sink.lines());
        let success = code == 0;
        if !success && !diagnostics.iter().any(|d| d.severity == Severity::Error) {
            diagnostics.push(Diagnostic::new(
                Severity::Error,
                format!("javac exited with code {}", code),
            ));
        }

        Ok(CompileOutcome {
            success,
            diagnostics,
        })
    }
}

/// Groups javac's output lines into diagnostics
///
/// A `file:line: kind: message` header starts a diagnostic; the source
/// excerpt and caret lines that follow are appended to it.
pub struct JavacOutputParser {
    located: Regex,
    bare: Regex,
    summary: Regex,
}

impl JavacOutputParser {
    pub fn new() -> Result<Self> {
        let compile = |pattern: &str| {
            Regex::new(pattern).map_err(|e| BuildError::Configuration(e.to_string()))
        };
        Ok(Self {
            located: compile(r"^(.+?):(\d+): (error|warning): (.*)$")?,
            bare: compile(r"^(error|warning|Note): (.*)$")?,
            summary: compile(r"^\d+ (error|warning)s?$")?,
        })
    }

    pub fn parse(&self, lines: &[String]) -> Vec<Diagnostic> {
        let mut diagnostics: Vec<Diagnostic> = Vec::new();
        for line in lines {
            if line.trim().is_empty() || self.summary.is_match(line) {
                continue;
            }
            if let Some(caps) = self.located.captures(line) {
                diagnostics.push(Diagnostic::new(
                    severity(&caps[3]),
                    format!("{}:{}: {}", &caps[1], &caps[2], &caps[4]),
                ));
            } else if let Some(caps) = self.bare.captures(line) {
                diagnostics.push(Diagnostic::new(severity(&caps[1]), caps[2].to_string()));
            } else if let Some(last) = diagnostics.last_mut() {
                last.message.push('\n');
                last.message.push_str(line);
            } else {
                diagnostics.push(Diagnostic::new(Severity::Info, line.clone()));
            }
        }
        diagnostics
    }
}

fn severity(kind: &str) -> Severity {
    match kind {
        "error" => Severity::Error,
        "warning" => Severity::Warning,
        _ => Severity::Info,
    }
}

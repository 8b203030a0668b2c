//! Process executor - runs forked tools and streams their output

use crate::core::error::ProcessError;
use std::path::Path;
use std::process::Stdio;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader, Split};
use tokio::process::Command;
use tokio::sync::Notify;
use tracing::{debug, info, warn};

/// Receives each output line of a child process as it arrives
///
/// This trait is object-safe and can be used as `&dyn OutputSink`.
pub trait OutputSink: Send + Sync {
    /// Called once per line, stdout and stderr interleaved in arrival order
    fn on_line(&self, line: &str);
}

/// Logs every line at info level under a prefix
#[derive(Debug, Clone)]
pub struct LogSink {
    prefix: String,
}

impl LogSink {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }
}

impl Default for LogSink {
    fn default() -> Self {
        Self::new("process")
    }
}

impl OutputSink for LogSink {
    fn on_line(&self, line: &str) {
        info!("[{}] {}", self.prefix, line);
    }
}

/// Keeps every line for later inspection
#[derive(Debug, Default)]
pub struct CollectingSink {
    lines: Mutex<Vec<String>>,
}

impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().map(|l| l.clone()).unwrap_or_default()
    }
}

impl OutputSink for CollectingSink {
    fn on_line(&self, line: &str) {
        if let Ok(mut lines) = self.lines.lock() {
            lines.push(line.to_string());
        }
    }
}

/// Shared interruption flag, triggered by Ctrl-C in the binary
///
/// Once triggered the flag stays set: every later process wait fails
/// immediately until [`Interrupt::clear`] is called.
#[derive(Debug, Clone, Default)]
pub struct Interrupt {
    flag: Arc<AtomicBool>,
    notify: Arc<Notify>,
}

impl Interrupt {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn trigger(&self) {
        self.flag.store(true, Ordering::SeqCst);
        self.notify.notify_waiters();
    }

    pub fn is_set(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }

    pub fn clear(&self) {
        self.flag.store(false, Ordering::SeqCst);
    }

    /// Resolves once the flag is set
    pub async fn wait(&self) {
        loop {
            let notified = self.notify.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();
            if self.is_set() {
                return;
            }
            notified.await;
        }
    }
}

type LineSegments = Split<BufReader<Box<dyn AsyncRead + Unpin + Send>>>;

fn segments<R: AsyncRead + Unpin + Send + 'static>(stream: Option<R>) -> LineSegments {
    let reader: Box<dyn AsyncRead + Unpin + Send> = match stream {
        Some(stream) => Box::new(stream),
        None => Box::new(tokio::io::empty()),
    };
    BufReader::new(reader).split(b'\n')
}

fn emit(segment: &[u8], sink: &dyn OutputSink) {
    let line = String::from_utf8_lossy(segment);
    sink.on_line(line.trim_end_matches('\r'));
}

/// Runs external commands one at a time
///
/// No timeout is applied: a child that never exits blocks the caller until
/// the interrupt fires.
#[derive(Debug, Clone, Default)]
pub struct ProcessExecutor {
    interrupt: Interrupt,
}

impl ProcessExecutor {
    pub fn new(interrupt: Interrupt) -> Self {
        Self { interrupt }
    }

    /// Run `command` (program first) and return its exit code
    ///
    /// Stdout and stderr are streamed line by line into `sink` while the
    /// child runs. A process killed by a signal reports `-1`. On interrupt
    /// the child is left running and [`ProcessError::Interrupted`] is returned.
    pub async fn run(
        &self,
        command: &[String],
        working_dir: Option<&Path>,
        sink: &dyn OutputSink,
    ) -> Result<i32, ProcessError> {
        let (program, args) = command.split_first().ok_or(ProcessError::EmptyCommand)?;

        if self.interrupt.is_set() {
            return Err(ProcessError::Interrupted {
                program: program.clone(),
            });
        }

        debug!("Spawning: {}", command.join(" "));

        let mut cmd = Command::new(program);
        cmd.args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        if let Some(dir) = working_dir.filter(|d| d.is_dir()) {
            cmd.current_dir(dir);
        }

        let mut child = cmd.spawn().map_err(|source| ProcessError::Launch {
            program: program.clone(),
            source,
        })?;

        let mut stdout = segments(child.stdout.take());
        let mut stderr = segments(child.stderr.take());

        let completion = async {
            let mut stdout_open = true;
            let mut stderr_open = true;
            while stdout_open || stderr_open {
                tokio::select! {
                    segment = stdout.next_segment(), if stdout_open => match segment {
                        Ok(Some(segment)) => emit(&segment, sink),
                        Ok(None) => stdout_open = false,
                        Err(e) => {
                            debug!("Stopped reading stdout of {}: {}", program, e);
                            stdout_open = false;
                        }
                    },
                    segment = stderr.next_segment(), if stderr_open => match segment {
                        Ok(Some(segment)) => emit(&segment, sink),
                        Ok(None) => stderr_open = false,
                        Err(e) => {
                            debug!("Stopped reading stderr of {}: {}", program, e);
                            stderr_open = false;
                        }
                    },
                }
            }
            child.wait().await
        };

        let status = tokio::select! {
            status = completion => status.map_err(|source| ProcessError::Wait {
                program: program.clone(),
                source,
            })?,
            _ = self.interrupt.wait() => {
                warn!("Interrupted while waiting for {}", program);
                return Err(ProcessError::Interrupted {
                    program: program.clone(),
                });
            }
        };

        let code = status.code().unwrap_or(-1);
        debug!("{} exited with code {}", program, code);
        Ok(code)
    }
}

//! Baseline token snapshots taken when a session starts.

use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread;
use std::time::{Duration, Instant};

use memento_token::ProjectAnalyzer;

use crate::config::DEFAULT_BASELINE_TIMEOUT_SECS;
use crate::error::{MementoError, MementoResult};

/// Supplies the baseline token total for a project.
pub trait BaselineProvider {
    fn baseline_tokens(&self, project: &Path) -> MementoResult<u64>;
}

/// Runs the project analysis in-process.
pub struct AnalyzerBaseline {
    analyzer: ProjectAnalyzer,
}

impl AnalyzerBaseline {
    pub fn new(analyzer: ProjectAnalyzer) -> Self {
        Self { analyzer }
    }
}

impl BaselineProvider for AnalyzerBaseline {
    fn baseline_tokens(&self, project: &Path) -> MementoResult<u64> {
        Ok(self.analyzer.analyze(project).baseline_total())
    }
}

/// Runs an external analyzer and reads `estimates.baseline_total` from its
/// JSON output. The project path is appended as the last argument.
pub struct SubprocessBaseline {
    program: PathBuf,
    args: Vec<String>,
    timeout: Duration,
}

const POLL_INTERVAL: Duration = Duration::from_millis(25);

impl SubprocessBaseline {
    pub fn new(program: impl Into<PathBuf>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
            timeout: Duration::from_secs(DEFAULT_BASELINE_TIMEOUT_SECS),
        }
    }

    /// Build from a `[program, args...]` list. Returns `None` when empty.
    pub fn from_command_line(command: &[String]) -> Option<Self> {
        let (program, args) = command.split_first()?;
        Some(Self::new(program, args.to_vec()))
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn run(&self, project: &Path) -> MementoResult<String> {
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .arg(project)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| {
                MementoError::baseline(format!("failed to run {}: {e}", self.program.display()))
            })?;

        // Drain stdout on a separate thread so a chatty child cannot block on a full pipe
        let mut stdout = child
            .stdout
            .take()
            .ok_or_else(|| MementoError::baseline("child stdout unavailable"))?;
        let (tx, rx) = mpsc::channel();
        thread::spawn(move || {
            let mut out = String::new();
            let _ = tx.send(stdout.read_to_string(&mut out).map(|_| out));
        });

        let deadline = Instant::now() + self.timeout;
        let status = loop {
            if let Some(status) = child.try_wait()? {
                break status;
            }
            if Instant::now() >= deadline {
                let _ = child.kill();
                let _ = child.wait();
                return Err(MementoError::baseline(format!(
                    "timed out after {:?}",
                    self.timeout
                )));
            }
            thread::sleep(POLL_INTERVAL);
        };

        // Descendants that inherited stdout can keep the pipe open after the child exits
        let output = match rx.recv_timeout(deadline.saturating_duration_since(Instant::now())) {
            Ok(read) => read?,
            Err(RecvTimeoutError::Timeout) => {
                return Err(MementoError::baseline(format!(
                    "output not closed after {:?}",
                    self.timeout
                )));
            }
            Err(RecvTimeoutError::Disconnected) => {
                return Err(MementoError::baseline("stdout reader stopped"));
            }
        };

        if !status.success() {
            return Err(MementoError::baseline(format!("exited with {status}")));
        }
        Ok(output)
    }
}

impl BaselineProvider for SubprocessBaseline {
    fn baseline_tokens(&self, project: &Path) -> MementoResult<u64> {
        let output = self.run(project)?;
        let doc: serde_json::Value = serde_json::from_str(&output)?;
        doc.pointer("/estimates/baseline_total")
            .and_then(serde_json::Value::as_u64)
            .ok_or_else(|| MementoError::baseline("output has no estimates.baseline_total"))
    }
}

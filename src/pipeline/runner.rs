//! External process seam.
//!
//! Every call to `ffmpeg` or `yt-dlp` goes through [`CommandRunner`], so the
//! pipeline never touches `std::process` directly and tests can script the
//! tools' behaviour.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::ffi::{OsStr, OsString};
use std::fmt;
use std::process::Stdio;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command;
use tracing::debug;

use crate::common::error::{ConvertError, ConvertResult};

/// Number of trailing stderr lines kept for error reporting.
const STDERR_TAIL_LINES: usize = 20;

/// A program plus its literal argument vector. Never passed through a shell.
///
/// Arguments are OS strings so paths reach the tool byte for byte.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandInvocation {
    pub program: String,
    pub args: Vec<OsString>,
}

impl CommandInvocation {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl AsRef<OsStr>) -> Self {
        self.args.push(arg.as_ref().to_os_string());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        self.args
            .extend(args.into_iter().map(|arg| arg.as_ref().to_os_string()));
        self
    }
}

impl fmt::Display for CommandInvocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {}", arg.to_string_lossy())?;
        }
        Ok(())
    }
}

/// How an external process terminated.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExitOutcome {
    /// `None` when the process was terminated by a signal.
    pub code: Option<i32>,
    pub stderr_tail: String,
}

impl ExitOutcome {
    pub fn success() -> Self {
        Self {
            code: Some(0),
            stderr_tail: String::new(),
        }
    }

    pub fn failure(code: i32, stderr_tail: impl Into<String>) -> Self {
        Self {
            code: Some(code),
            stderr_tail: stderr_tail.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.code == Some(0)
    }
}

#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Whether `program` can be launched in this environment.
    fn is_available(&self, program: &str) -> bool {
        which::which(program).is_ok()
    }

    /// Run the invocation to completion. `Err` means the process could not be
    /// spawned at all; a non-zero exit is reported through [`ExitOutcome`].
    async fn run(&self, invocation: &CommandInvocation) -> std::io::Result<ExitOutcome>;
}

/// Spawns real processes with `tokio::process`.
///
/// Stdout is discarded. Stderr is read line by line and only the last
/// [`STDERR_TAIL_LINES`] lines are kept.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessRunner;

#[async_trait]
impl CommandRunner for ProcessRunner {
    async fn run(&self, invocation: &CommandInvocation) -> std::io::Result<ExitOutcome> {
        debug!("Running: {}", invocation);

        let mut child = Command::new(&invocation.program)
            .args(&invocation.args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()?;

        let mut tail = StderrTail::new(STDERR_TAIL_LINES);
        if let Some(stderr) = child.stderr.take() {
            let mut reader = BufReader::new(stderr);
            let mut line = Vec::new();
            while reader.read_until(b'\n', &mut line).await? > 0 {
                tail.push(&String::from_utf8_lossy(&line));
                line.clear();
            }
        }

        let status = child.wait().await?;

        Ok(ExitOutcome {
            code: status.code(),
            stderr_tail: tail.into_string(),
        })
    }
}

/// Fail with `ToolUnavailable` unless `program` can be found.
pub fn ensure_available(runner: &dyn CommandRunner, program: &str) -> ConvertResult<()> {
    if runner.is_available(program) {
        Ok(())
    } else {
        Err(ConvertError::ToolUnavailable(program.to_string()))
    }
}

/// Bounded window over the most recent lines of a stream.
struct StderrTail {
    lines: VecDeque<String>,
    capacity: usize,
}

impl StderrTail {
    fn new(capacity: usize) -> Self {
        Self {
            lines: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    fn push(&mut self, line: &str) {
        if self.capacity == 0 {
            return;
        }
        if self.lines.len() == self.capacity {
            self.lines.pop_front();
        }
        self.lines.push_back(line.trim_end_matches(['\r', '\n']).to_string());
    }

    fn into_string(self) -> String {
        Vec::from(self.lines).join("\n")
    }
}

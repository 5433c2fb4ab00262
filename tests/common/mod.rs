//! Shared test harness.
//!
//! [`ScriptedRunner`] stands in for `ffmpeg` and `yt-dlp`: it records every
//! invocation, writes the files the real tools would write, and fails where
//! a test tells it to. [`TestHarness`] wires it into an [`AppState`] whose
//! storage roots live in a temporary directory.

#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::HashSet;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

use mediaforge::config::settings::AppConfig;
use mediaforge::pipeline::runner::{CommandInvocation, CommandRunner, ExitOutcome};
use mediaforge::state::AppState;

pub const FFMPEG: &str = "ffmpeg";
pub const YTDLP: &str = "yt-dlp";

/// What the fake downloader does when invoked.
#[derive(Debug, Clone)]
pub enum Download {
    /// Exit 0 and write `source.<ext>`.
    Produce(&'static str),
    /// Exit 0 without writing anything.
    NoFile,
    /// Exit with the given code.
    Fail(i32),
}

#[derive(Debug)]
pub struct ScriptedRunner {
    missing: HashSet<String>,
    /// Zero-based index of the transcode call that fails.
    fail_transcode_at: Option<usize>,
    /// Whether a failing transcode leaves a partial file behind.
    partial_on_failure: bool,
    download: Download,
    calls: Mutex<Vec<CommandInvocation>>,
}

impl Default for ScriptedRunner {
    fn default() -> Self {
        Self {
            missing: HashSet::new(),
            fail_transcode_at: None,
            partial_on_failure: false,
            download: Download::Produce("mp4"),
            calls: Mutex::new(Vec::new()),
        }
    }
}

impl ScriptedRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn without(mut self, program: &str) -> Self {
        self.missing.insert(program.to_string());
        self
    }

    pub fn failing_transcode_at(mut self, index: usize, partial: bool) -> Self {
        self.fail_transcode_at = Some(index);
        self.partial_on_failure = partial;
        self
    }

    pub fn with_download(mut self, download: Download) -> Self {
        self.download = download;
        self
    }

    pub fn calls(&self) -> Vec<CommandInvocation> {
        self.calls.lock().unwrap().clone()
    }

    pub fn calls_to(&self, program: &str) -> Vec<CommandInvocation> {
        self.calls()
            .into_iter()
            .filter(|c| c.program == program)
            .collect()
    }
}

#[async_trait]
impl CommandRunner for ScriptedRunner {
    fn is_available(&self, program: &str) -> bool {
        !self.missing.contains(program)
    }

    async fn run(&self, invocation: &CommandInvocation) -> std::io::Result<ExitOutcome> {
        let transcode_index = {
            let mut calls = self.calls.lock().unwrap();
            let index = calls.iter().filter(|c| c.program == FFMPEG).count();
            calls.push(invocation.clone());
            index
        };

        match invocation.program.as_str() {
            FFMPEG => {
                let output = PathBuf::from(invocation.args.last().expect("output path"));
                if Some(transcode_index) == self.fail_transcode_at {
                    if self.partial_on_failure {
                        std::fs::write(&output, b"partial")?;
                    }
                    return Ok(ExitOutcome::failure(1, "Error while opening encoder"));
                }
                std::fs::write(&output, b"variant")?;
                Ok(ExitOutcome::success())
            }
            YTDLP => match self.download {
                Download::Produce(ext) => {
                    let template = option_value(&invocation.args, "-o").expect("output template");
                    std::fs::write(template.to_string_lossy().replace("%(ext)s", ext), b"downloaded")?;
                    Ok(ExitOutcome::success())
                }
                Download::NoFile => Ok(ExitOutcome::success()),
                Download::Fail(code) => Ok(ExitOutcome::failure(code, "ERROR: Unsupported URL")),
            },
            other => panic!("unexpected program {other}"),
        }
    }
}

fn option_value(args: &[OsString], flag: &str) -> Option<OsString> {
    args.iter()
        .position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .cloned()
}

pub struct TestHarness {
    pub dir: TempDir,
    pub runner: Arc<ScriptedRunner>,
    pub state: AppState,
}

impl TestHarness {
    pub fn new() -> Self {
        Self::with_runner(ScriptedRunner::new())
    }

    pub fn with_runner(runner: ScriptedRunner) -> Self {
        Self::with_config(runner, |_| {})
    }

    /// Harness whose config is adjusted by `configure` after rooting.
    pub fn with_config(runner: ScriptedRunner, configure: impl FnOnce(&mut AppConfig)) -> Self {
        let dir = TempDir::new().expect("tempdir");
        let runner = Arc::new(runner);
        let mut config = AppConfig::default().rooted_at(dir.path());
        configure(&mut config);
        let state = AppState::with_runner(config, runner.clone());
        Self { dir, runner, state }
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    /// Names of everything directly under the storage root.
    pub fn root_entries(&self) -> Vec<String> {
        let mut names: Vec<String> = std::fs::read_dir(self.root())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    /// Names of the entries in `dir` under the storage root, empty if absent.
    pub fn entries_in(&self, dir: &str) -> Vec<String> {
        let Ok(read) = std::fs::read_dir(self.root().join(dir)) else {
            return Vec::new();
        };
        let mut names: Vec<String> = read
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    /// Write a source file outside the managed storage roots.
    pub fn source_file(&self, name: &str) -> PathBuf {
        let dir = self.root().join("sources");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join(name);
        std::fs::write(&path, b"source").unwrap();
        path
    }
}

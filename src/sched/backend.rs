// src/sched/backend.rs

//! Pluggable scheduler backend abstraction.
//!
//! Jobs render an [`Invocation`] and hand it to a [`SchedulerBackend`]
//! instead of spawning processes themselves. This makes it easy to swap in
//! a recording fake in tests while keeping the production implementation
//! here.
//!
//! - [`ProcessScheduler`] is the default implementation: it runs the
//!   submission command as a child process, blocking until it exits, with
//!   both output streams captured in full.
//! - Tests can provide their own `SchedulerBackend` that records
//!   invocations and returns scripted outputs.

use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Stdio};

use tracing::debug;

use crate::errors::{QchainError, Result};

/// Known scheduler families: logical name, submission executable, script
/// file extension.
const KNOWN_SCHEDULERS: &[(&str, &str, &str)] = &[("pbs", "qsub", "pbs")];

/// The executable used to submit a job, either looked up from a known
/// scheduler family or supplied verbatim by the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitCommand {
    program: String,
}

impl SubmitCommand {
    /// Look up the submission command for a logical scheduler name.
    pub fn for_kind(kind: &str) -> Result<Self> {
        KNOWN_SCHEDULERS
            .iter()
            .find(|(name, _, _)| *name == kind)
            .map(|(_, program, _)| Self {
                program: (*program).to_string(),
            })
            .ok_or_else(|| {
                QchainError::InvalidArgument(format!("'{kind}' is not a known scheduler kind"))
            })
    }

    /// Use `program` verbatim as the submission command, no validation.
    pub fn raw(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    pub fn program(&self) -> &str {
        &self.program
    }
}

/// Script file extension for a known scheduler kind.
pub fn script_extension(kind: &str) -> Option<&'static str> {
    KNOWN_SCHEDULERS
        .iter()
        .find(|(name, _, _)| *name == kind)
        .map(|(_, _, ext)| *ext)
}

/// A fully rendered scheduler invocation.
#[derive(Debug, Clone)]
pub struct Invocation {
    pub program: String,
    pub args: Vec<String>,
    /// Working directory for the child process, if any.
    pub cwd: Option<PathBuf>,
}

impl Invocation {
    /// The invocation as a single display string, for logs and dry runs.
    pub fn command_line(&self) -> String {
        let mut line = self.program.clone();
        for arg in &self.args {
            line.push(' ');
            line.push_str(arg);
        }
        line
    }
}

/// Captured result of one scheduler invocation.
#[derive(Debug, Clone)]
pub struct SubmitOutput {
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
}

impl SubmitOutput {
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }
}

/// Optional caller-supplied sinks that receive the captured streams of
/// every invocation, regardless of whether the submission succeeded.
#[derive(Default)]
pub struct OutputSinks<'a> {
    pub stdout: Option<&'a mut dyn Write>,
    pub stderr: Option<&'a mut dyn Write>,
}

impl OutputSinks<'_> {
    pub(crate) fn forward(&mut self, output: &SubmitOutput) {
        if let Some(sink) = self.stdout.as_mut() {
            let _ = sink.write_all(output.stdout.as_bytes());
        }
        if let Some(sink) = self.stderr.as_mut() {
            let _ = sink.write_all(output.stderr.as_bytes());
        }
    }
}

/// Trait abstracting how rendered invocations reach the scheduler.
///
/// Production code uses [`ProcessScheduler`]; tests can provide their own
/// implementation that doesn't spawn real processes.
pub trait SchedulerBackend {
    /// Run the invocation to completion and capture its streams.
    fn submit(&mut self, invocation: &Invocation) -> Result<SubmitOutput>;
}

/// Real backend used in production: spawns the submission command and
/// blocks until it exits.
#[derive(Debug, Clone, Default)]
pub struct ProcessScheduler;

impl ProcessScheduler {
    pub fn new() -> Self {
        Self
    }
}

impl SchedulerBackend for ProcessScheduler {
    fn submit(&mut self, invocation: &Invocation) -> Result<SubmitOutput> {
        let mut cmd = Command::new(&invocation.program);
        cmd.args(&invocation.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        if let Some(cwd) = &invocation.cwd {
            cmd.current_dir(cwd);
        }

        let output = cmd.output()?;
        let exit_code = output.status.code().unwrap_or(-1);

        debug!(
            program = %invocation.program,
            exit_code,
            "scheduler process exited"
        );

        Ok(SubmitOutput {
            exit_code,
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}

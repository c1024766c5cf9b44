// src/chain/job.rs

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::Deserialize;
use tracing::{debug, info};
use uuid::Uuid;

use crate::chain::dependency::{Dependency, DepKind, ResolvedDependency};
use crate::errors::{QchainError, Result};
use crate::sched::{Invocation, OutputSinks, SchedulerBackend, SubmitCommand};

/// Process-unique identity of a job, generated at creation.
///
/// This is the graph vertex key; it is unrelated to the scheduler-assigned
/// id, which does not exist until the job has been submitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct JobId(Uuid);

impl JobId {
    fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// How the `script` argument of [`Job::new`] should be interpreted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScriptKind {
    /// Treat the string as a path when such a file exists, else as literal
    /// script text.
    #[default]
    Auto,
    /// The string is a path to an existing script file.
    File,
    /// The string is the script body itself and will be written to a file.
    Literal,
}

impl FromStr for ScriptKind {
    type Err = QchainError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "auto" => Ok(ScriptKind::Auto),
            "file" => Ok(ScriptKind::File),
            "literal" => Ok(ScriptKind::Literal),
            other => Err(QchainError::InvalidArgument(format!(
                "'{other}' is not a valid script kind (expected \"auto\", \"file\" or \"literal\")"
            ))),
        }
    }
}

/// Where and how literal script bodies are materialized.
#[derive(Debug, Clone)]
pub struct ScriptSettings {
    /// Directory that receives generated script files. Created on demand.
    pub dir: PathBuf,
    /// File extension for generated scripts (`pbs` for the PBS family).
    pub extension: String,
}

impl Default for ScriptSettings {
    fn default() -> Self {
        Self {
            dir: PathBuf::from(".qchain"),
            extension: "pbs".to_string(),
        }
    }
}

/// Resource requests forwarded to the scheduler as `-l` flags.
///
/// `ppn` and `node_type` only make sense combined with `nodes` (PBS has no
/// standalone syntax for them); config validation rejects the combination,
/// and rendering ignores them when `nodes` is absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Resources {
    #[serde(default)]
    pub nodes: Option<u32>,
    #[serde(default)]
    pub ppn: Option<u32>,
    #[serde(default)]
    pub node_type: Option<String>,
    #[serde(default)]
    pub walltime: Option<String>,
}

impl Resources {
    pub fn is_empty(&self) -> bool {
        self.nodes.is_none()
            && self.ppn.is_none()
            && self.node_type.is_none()
            && self.walltime.is_none()
    }

    fn push_flags(&self, args: &mut Vec<String>) {
        if let Some(nodes) = self.nodes {
            let mut value = format!("nodes={nodes}");
            if let Some(ppn) = self.ppn {
                value.push_str(&format!(":ppn={ppn}"));
            }
            if let Some(node_type) = &self.node_type {
                value.push(':');
                value.push_str(node_type);
            }
            args.push("-l".to_string());
            args.push(value);
        }
        if let Some(walltime) = &self.walltime {
            args.push("-l".to_string());
            args.push(format!("walltime={walltime}"));
        }
    }
}

/// A single schedulable unit of work.
///
/// A job owns its script file reference, the edges to the jobs it depends
/// on, and (after submission) the id the external scheduler assigned to it.
#[derive(Debug, Clone)]
pub struct Job {
    id: JobId,
    script: PathBuf,
    account: Option<String>,
    resources: Resources,
    submit_cmd: Option<SubmitCommand>,
    sched_id: Option<String>,
    deps: Vec<Dependency>,
}

impl Job {
    /// Create a job from a script path or literal script text.
    ///
    /// Literal text is written verbatim to
    /// `<settings.dir>/<job id>.<settings.extension>`; the directory is
    /// created if absent. After construction the script reference is an
    /// absolute path to an existing file.
    pub fn new(script: &str, kind: ScriptKind, settings: &ScriptSettings) -> Result<Self> {
        let id = JobId::new();

        let is_file = match kind {
            ScriptKind::File => {
                if !Path::new(script).is_file() {
                    return Err(QchainError::InvalidArgument(format!(
                        "script file '{script}' does not exist"
                    )));
                }
                true
            }
            ScriptKind::Literal => false,
            ScriptKind::Auto => Path::new(script).is_file(),
        };

        let script = if is_file {
            fs::canonicalize(script)?
        } else {
            fs::create_dir_all(&settings.dir)?;
            let path = settings
                .dir
                .join(format!("{}.{}", id, settings.extension));
            fs::write(&path, script)?;
            debug!(job = %id, path = %path.display(), "wrote literal script");
            fs::canonicalize(&path)?
        };

        Ok(Self {
            id,
            script,
            account: None,
            resources: Resources::default(),
            submit_cmd: None,
            sched_id: None,
            deps: Vec::new(),
        })
    }

    pub fn id(&self) -> JobId {
        self.id
    }

    /// Absolute path of this job's script file.
    pub fn script(&self) -> &Path {
        &self.script
    }

    /// The id assigned by the external scheduler. `None` until this job has
    /// been submitted.
    pub fn sched_id(&self) -> Option<&str> {
        self.sched_id.as_deref()
    }

    /// Outgoing edges, in declaration order.
    pub fn dependencies(&self) -> &[Dependency] {
        &self.deps
    }

    pub fn set_account(&mut self, account: impl Into<String>) {
        self.account = Some(account.into());
    }

    pub fn set_resources(&mut self, resources: Resources) {
        self.resources = resources;
    }

    /// Choose the scheduler this job is submitted to.
    ///
    /// With `raw_override` false, `kind` must be a known scheduler family
    /// (`pbs`). With `raw_override` true, `kind` is used verbatim as the
    /// submission command and the caller asserts it is correct.
    pub fn set_scheduler(&mut self, kind: &str, raw_override: bool) -> Result<()> {
        self.submit_cmd = Some(if raw_override {
            SubmitCommand::raw(kind)
        } else {
            SubmitCommand::for_kind(kind)?
        });
        Ok(())
    }

    pub(crate) fn ensure_submit_command(&mut self, default: &SubmitCommand) {
        if self.submit_cmd.is_none() {
            self.submit_cmd = Some(default.clone());
        }
    }

    pub(crate) fn declare_dependency(&mut self, target: JobId, kind: DepKind) {
        self.deps.push(Dependency::new(self.id, target, kind));
    }

    /// Submit this job through the given backend.
    ///
    /// `deps` must be this job's own edges, each resolved against the
    /// scheduler-id table; the chain guarantees, via topological order,
    /// that every target id is already known. On success (or dry run) the
    /// job's scheduler id is set.
    pub fn submit(
        &mut self,
        deps: &[ResolvedDependency],
        backend: &mut dyn SchedulerBackend,
        extra_args: &[String],
        sinks: &mut OutputSinks<'_>,
        dry_run: bool,
    ) -> Result<()> {
        let invocation = self.build_invocation(deps, extra_args)?;

        if dry_run {
            info!(
                job = %self.id,
                command = %invocation.command_line(),
                "dry-run submission"
            );
            self.sched_id = Some(self.id.to_string());
            return Ok(());
        }

        debug!(
            job = %self.id,
            command = %invocation.command_line(),
            "invoking scheduler"
        );

        let output = backend.submit(&invocation)?;
        sinks.forward(&output);

        if !output.success() {
            return Err(QchainError::SchedulerRejected {
                job: self.id,
                code: output.exit_code,
                stdout: output.stdout,
                stderr: output.stderr,
            });
        }

        let sched_id = output.stdout.trim().to_string();
        info!(job = %self.id, sched_id = %sched_id, "scheduler accepted job");
        self.sched_id = Some(sched_id);
        Ok(())
    }

    /// Render the full command line for this job.
    ///
    /// Argument order is fixed: dependency flags, resource flags, account,
    /// extra arguments, script path (PBS requires the script operand last).
    fn build_invocation(
        &self,
        deps: &[ResolvedDependency],
        extra_args: &[String],
    ) -> Result<Invocation> {
        // Group targets by relation kind, keeping first-seen kind order and
        // stored target order within a kind.
        let mut groups: Vec<(DepKind, Vec<&ResolvedDependency>)> = Vec::new();
        for resolved in deps {
            if resolved.dep.base() != self.id {
                return Err(QchainError::ForeignDependency {
                    job: self.id,
                    base: resolved.dep.base(),
                });
            }
            match groups.iter().position(|(kind, _)| *kind == resolved.dep.kind()) {
                Some(idx) => groups[idx].1.push(resolved),
                None => groups.push((resolved.dep.kind(), vec![resolved])),
            }
        }

        let mut args = Vec::new();
        for (kind, list) in &groups {
            let mut flag = format!("depend={kind}");
            for resolved in list {
                let sched_id = resolved.sched_id.as_deref().ok_or(
                    QchainError::UnresolvedDependency {
                        job: self.id,
                        target: resolved.dep.target(),
                    },
                )?;
                flag.push(':');
                flag.push_str(sched_id);
            }
            args.push("-W".to_string());
            args.push(flag);
        }

        self.resources.push_flags(&mut args);

        if let Some(account) = &self.account {
            args.push("-A".to_string());
            args.push(account.clone());
        }

        args.extend(extra_args.iter().cloned());
        args.push(self.script.display().to_string());

        let program = self
            .submit_cmd
            .as_ref()
            .ok_or_else(|| {
                QchainError::InvalidArgument(format!(
                    "job {} has no scheduler configured",
                    self.id
                ))
            })?
            .program()
            .to_string();

        // Scheduler log files land in the working directory of the submit
        // command; keep them next to the script.
        let cwd = self.script.parent().map(Path::to_path_buf);

        Ok(Invocation { program, args, cwd })
    }
}

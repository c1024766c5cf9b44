// src/config/model.rs

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::Deserialize;

use crate::chain::{DepKind, Resources, ScriptKind};

/// Top-level chain definition as read from a TOML file, before semantic
/// validation. Use `ConfigFile::try_from` (or
/// [`loader::load_and_validate`](crate::config::loader::load_and_validate))
/// to obtain a validated [`ConfigFile`].
///
/// ```toml
/// [scheduler]
/// kind = "pbs"
/// account = "ABC123"
///
/// [job.prepare]
/// script = "jobs/prepare.pbs"
///
/// [job.render]
/// script = "jobs/render.pbs"
/// afterok = ["prepare"]
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct RawConfigFile {
    /// `[scheduler]` section.
    #[serde(default)]
    pub scheduler: SchedulerSection,

    /// All jobs from `[job.<name>]`, keyed by job name.
    #[serde(default)]
    pub job: BTreeMap<String, JobSection>,
}

/// A [`RawConfigFile`] that has passed semantic validation: at least one
/// job, a known scheduler kind (unless raw), no unknown or self dependency
/// references, and an acyclic dependency graph.
#[derive(Debug, Clone)]
pub struct ConfigFile {
    pub scheduler: SchedulerSection,
    pub job: BTreeMap<String, JobSection>,
}

impl ConfigFile {
    pub(crate) fn new_unchecked(
        scheduler: SchedulerSection,
        job: BTreeMap<String, JobSection>,
    ) -> Self {
        Self { scheduler, job }
    }
}

/// `[scheduler]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct SchedulerSection {
    /// Logical scheduler family (`"pbs"`), or a verbatim submission
    /// command when `raw` is set.
    #[serde(default = "default_sched_kind")]
    pub kind: String,

    /// Use `kind` verbatim as the submission command, skipping the
    /// known-scheduler lookup.
    #[serde(default)]
    pub raw: bool,

    /// Account every job is submitted under, unless the job overrides it.
    #[serde(default)]
    pub account: Option<String>,

    /// Directory that receives materialized literal scripts.
    #[serde(default = "default_script_dir")]
    pub script_dir: PathBuf,
}

fn default_sched_kind() -> String {
    "pbs".to_string()
}

fn default_script_dir() -> PathBuf {
    PathBuf::from(".qchain")
}

impl Default for SchedulerSection {
    fn default() -> Self {
        Self {
            kind: default_sched_kind(),
            raw: false,
            account: None,
            script_dir: default_script_dir(),
        }
    }
}

/// `[job.<name>]` section.
///
/// One optional array per dependency relation, naming the jobs this one
/// depends on (or, for the `before*` arrays, the jobs that depend on it).
#[derive(Debug, Clone, Deserialize)]
pub struct JobSection {
    /// Path to the script file, or the script body itself (see
    /// `script_kind`).
    pub script: String,

    /// `"auto"`, `"file"` or `"literal"`; defaults to auto-detection.
    #[serde(default)]
    pub script_kind: Option<ScriptKind>,

    /// Account override for this job.
    #[serde(default)]
    pub account: Option<String>,

    /// Extra command-line arguments appended to the submission call.
    #[serde(default)]
    pub extra_args: Vec<String>,

    /// `[job.<name>.resources]` table, rendered as `-l` flags.
    #[serde(default)]
    pub resources: Option<Resources>,

    #[serde(default)]
    pub after: Vec<String>,
    #[serde(default)]
    pub afterany: Vec<String>,
    #[serde(default)]
    pub afterok: Vec<String>,
    #[serde(default)]
    pub afternotok: Vec<String>,
    #[serde(default)]
    pub before: Vec<String>,
    #[serde(default)]
    pub beforeany: Vec<String>,
    #[serde(default)]
    pub beforeok: Vec<String>,
    #[serde(default)]
    pub beforenotok: Vec<String>,
}

impl JobSection {
    /// All declared dependencies as (kind, referenced job name) pairs, in
    /// field order then array order.
    pub fn dependencies(&self) -> impl Iterator<Item = (DepKind, &str)> {
        [
            (DepKind::After, &self.after),
            (DepKind::AfterAny, &self.afterany),
            (DepKind::AfterOk, &self.afterok),
            (DepKind::AfterNotOk, &self.afternotok),
            (DepKind::Before, &self.before),
            (DepKind::BeforeAny, &self.beforeany),
            (DepKind::BeforeOk, &self.beforeok),
            (DepKind::BeforeNotOk, &self.beforenotok),
        ]
        .into_iter()
        .flat_map(|(kind, names)| names.iter().map(move |name| (kind, name.as_str())))
    }

    pub fn script_kind(&self) -> ScriptKind {
        self.script_kind.unwrap_or_default()
    }
}

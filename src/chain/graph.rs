// src/chain/graph.rs

use std::collections::HashMap;

use tracing::{debug, info};

use crate::chain::dependency::{DepKind, ResolvedDependency};
use crate::chain::job::{Job, JobId};
use crate::errors::{QchainError, Result};
use crate::sched::{OutputSinks, SchedulerBackend, SubmitCommand};

/// Separator line between job blocks in the submission report.
const REPORT_SEPARATOR: &str = "-------------------------------";

/// Options for one [`JobChain::submit`] call.
#[derive(Default)]
pub struct SubmitOptions<'a> {
    /// Skip the scheduler invocation and assign placeholder ids.
    pub dry_run: bool,
    /// Return a plain-text submission report.
    pub report: bool,
    /// Extra command-line arguments, per job.
    pub extra_args: HashMap<JobId, Vec<String>>,
    /// Sinks that receive the captured streams of every invocation.
    pub sinks: OutputSinks<'a>,
}

/// Vertex colour during the depth-first sort.
///
/// - white: unvisited
/// - grey: on the current recursion path
/// - black: finished
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Colour {
    White,
    Grey,
    Black,
}

/// A collection of jobs plus their dependency edges; the unit of
/// topological ordering and batch submission.
///
/// Jobs are registered by value and from then on addressed by [`JobId`].
/// Edges are declared through the chain (never directly on a job), which
/// lets the chain enforce that both endpoints are registered and rewrite
/// `before*` relations into their `after*` counterparts so that every
/// stored edge means "base runs after target".
#[derive(Debug)]
pub struct JobChain {
    submit_cmd: SubmitCommand,
    jobs: HashMap<JobId, Job>,
    /// Registration order; drives deterministic traversal and submission.
    order: Vec<JobId>,
}

impl JobChain {
    /// Create a chain for a known scheduler family (`pbs`).
    pub fn new(sched_kind: &str) -> Result<Self> {
        Ok(Self::with_command(SubmitCommand::for_kind(sched_kind)?))
    }

    /// Create a chain whose submission command is used verbatim.
    pub fn with_raw_command(program: impl Into<String>) -> Self {
        Self::with_command(SubmitCommand::raw(program))
    }

    fn with_command(submit_cmd: SubmitCommand) -> Self {
        Self {
            submit_cmd,
            jobs: HashMap::new(),
            order: Vec::new(),
        }
    }

    /// Register a job, taking ownership. Returns the id it is addressed by
    /// from now on.
    pub fn register(&mut self, job: Job) -> JobId {
        let id = job.id();
        self.order.push(id);
        self.jobs.insert(id, job);
        debug!(job = %id, "job registered");
        id
    }

    pub fn job(&self, id: JobId) -> Option<&Job> {
        self.jobs.get(&id)
    }

    /// Registered jobs, in registration order.
    pub fn jobs(&self) -> impl Iterator<Item = &Job> {
        self.order.iter().filter_map(|id| self.jobs.get(id))
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Declare that `base` depends on `target` with the given relation.
    ///
    /// `beforeX(base, target)` is rewritten to `afterX(target, base)`, so
    /// edges always point backward in submission time and a forward scan of
    /// the sorted order respects them.
    pub fn declare_dependency(
        &mut self,
        base: JobId,
        target: JobId,
        kind: DepKind,
    ) -> Result<()> {
        let (base, target, kind) = if kind.is_before() {
            (target, base, kind.after_counterpart())
        } else {
            (base, target, kind)
        };

        if !self.jobs.contains_key(&base) {
            return Err(QchainError::MissingRegistration(base));
        }
        if !self.jobs.contains_key(&target) {
            return Err(QchainError::MissingRegistration(target));
        }

        debug!(base = %base, target = %target, kind = %kind, "dependency declared");
        if let Some(job) = self.jobs.get_mut(&base) {
            job.declare_dependency(target, kind);
        }
        Ok(())
    }

    /// Order the jobs so that every job appears after all jobs it depends
    /// on. Fails with `CycleDetected` if the edge set contains a cycle.
    ///
    /// Depth-first with three-colouring; a vertex is appended once all of
    /// its dependency targets are finished, so dependencies land first and
    /// no reversal is needed. Deterministic for a fixed registration order
    /// and fixed edge lists.
    pub fn topological_sort(&self) -> Result<Vec<JobId>> {
        let mut colours: HashMap<JobId, Colour> = HashMap::new();
        let mut sorted = Vec::with_capacity(self.order.len());

        for id in &self.order {
            self.visit(*id, &mut colours, &mut sorted)?;
        }

        Ok(sorted)
    }

    fn visit(
        &self,
        id: JobId,
        colours: &mut HashMap<JobId, Colour>,
        sorted: &mut Vec<JobId>,
    ) -> Result<()> {
        match colours.get(&id).copied().unwrap_or(Colour::White) {
            Colour::Grey => return Err(QchainError::CycleDetected(id.to_string())),
            Colour::Black => return Ok(()),
            Colour::White => {}
        }

        colours.insert(id, Colour::Grey);

        if let Some(job) = self.jobs.get(&id) {
            for dep in job.dependencies() {
                self.visit(dep.target(), colours, sorted)?;
            }
        }

        colours.insert(id, Colour::Black);
        sorted.push(id);
        Ok(())
    }

    /// Submit every job, in topological order, through the given backend.
    ///
    /// Submission halts at the first failure: earlier jobs stay submitted,
    /// later jobs are left untouched. Returns the submission report when
    /// `options.report` is set.
    pub fn submit(
        &mut self,
        backend: &mut dyn SchedulerBackend,
        mut options: SubmitOptions<'_>,
    ) -> Result<Option<String>> {
        let order = self.topological_sort()?;
        info!(jobs = order.len(), dry_run = options.dry_run, "submitting job chain");

        for id in &order {
            let resolved = self.resolve_dependencies(*id);
            let extra = options
                .extra_args
                .get(id)
                .map(Vec::as_slice)
                .unwrap_or(&[]);

            let Some(job) = self.jobs.get_mut(id) else {
                continue;
            };
            job.ensure_submit_command(&self.submit_cmd);
            job.submit(
                &resolved,
                backend,
                extra,
                &mut options.sinks,
                options.dry_run,
            )?;
        }

        if options.report {
            Ok(Some(self.render_report(&order)))
        } else {
            Ok(None)
        }
    }

    /// Pair each of a job's edges with the target's scheduler id as
    /// currently known.
    fn resolve_dependencies(&self, id: JobId) -> Vec<ResolvedDependency> {
        let Some(job) = self.jobs.get(&id) else {
            return Vec::new();
        };
        job.dependencies()
            .iter()
            .map(|dep| ResolvedDependency {
                dep: *dep,
                sched_id: self
                    .jobs
                    .get(&dep.target())
                    .and_then(|target| target.sched_id().map(str::to_string)),
            })
            .collect()
    }

    /// One block per job, in submission order: script base-name, scheduler
    /// id, and a line per outgoing edge.
    fn render_report(&self, order: &[JobId]) -> String {
        let mut report = String::new();

        for id in order {
            let Some(job) = self.jobs.get(id) else {
                continue;
            };
            let script_name = job
                .script()
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_default();

            report.push_str(REPORT_SEPARATOR);
            report.push('\n');
            report.push_str(&format!(
                "Script: {}\nID: {}\n",
                script_name,
                job.sched_id().unwrap_or("-")
            ));
            for dep in job.dependencies() {
                let target_id = self
                    .jobs
                    .get(&dep.target())
                    .and_then(|target| target.sched_id())
                    .unwrap_or("-");
                report.push_str(&format!("{} {}\n", dep.kind(), target_id));
            }
            report.push_str(REPORT_SEPARATOR);
            report.push('\n');
        }

        report
    }
}

#![allow(dead_code)]

use std::collections::BTreeMap;
use std::path::PathBuf;

use qchain::chain::{DepKind, Resources, ScriptKind};
use qchain::config::{ConfigFile, JobSection, RawConfigFile, SchedulerSection};

/// Builder for `ConfigFile` to simplify test setup.
pub struct ConfigFileBuilder {
    config: RawConfigFile,
}

impl ConfigFileBuilder {
    pub fn new() -> Self {
        Self {
            config: RawConfigFile {
                scheduler: SchedulerSection::default(),
                job: BTreeMap::new(),
            },
        }
    }

    pub fn with_job(mut self, name: &str, job: JobSection) -> Self {
        self.config.job.insert(name.to_string(), job);
        self
    }

    pub fn with_scheduler_kind(mut self, kind: &str) -> Self {
        self.config.scheduler.kind = kind.to_string();
        self
    }

    /// Use `program` verbatim as the submission command.
    pub fn with_raw_command(mut self, program: &str) -> Self {
        self.config.scheduler.kind = program.to_string();
        self.config.scheduler.raw = true;
        self
    }

    pub fn with_account(mut self, account: &str) -> Self {
        self.config.scheduler.account = Some(account.to_string());
        self
    }

    pub fn with_script_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.scheduler.script_dir = dir.into();
        self
    }

    /// The raw, unvalidated config, for tests that exercise validation
    /// failures themselves.
    pub fn into_raw(self) -> RawConfigFile {
        self.config
    }

    pub fn build(self) -> ConfigFile {
        ConfigFile::try_from(self.config).expect("Failed to build valid config from builder")
    }
}

impl Default for ConfigFileBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for `JobSection`.
pub struct JobSectionBuilder {
    job: JobSection,
}

impl JobSectionBuilder {
    pub fn new(script: &str) -> Self {
        Self {
            job: JobSection {
                script: script.to_string(),
                script_kind: None,
                account: None,
                extra_args: vec![],
                resources: None,
                after: vec![],
                afterany: vec![],
                afterok: vec![],
                afternotok: vec![],
                before: vec![],
                beforeany: vec![],
                beforeok: vec![],
                beforenotok: vec![],
            },
        }
    }

    pub fn script_kind(mut self, kind: ScriptKind) -> Self {
        self.job.script_kind = Some(kind);
        self
    }

    pub fn account(mut self, account: &str) -> Self {
        self.job.account = Some(account.to_string());
        self
    }

    pub fn extra_arg(mut self, arg: &str) -> Self {
        self.job.extra_args.push(arg.to_string());
        self
    }

    pub fn resources(mut self, resources: Resources) -> Self {
        self.job.resources = Some(resources);
        self
    }

    /// Add a dependency of the given kind on `name`.
    pub fn depends(mut self, kind: DepKind, name: &str) -> Self {
        let list = match kind {
            DepKind::After => &mut self.job.after,
            DepKind::AfterAny => &mut self.job.afterany,
            DepKind::AfterOk => &mut self.job.afterok,
            DepKind::AfterNotOk => &mut self.job.afternotok,
            DepKind::Before => &mut self.job.before,
            DepKind::BeforeAny => &mut self.job.beforeany,
            DepKind::BeforeOk => &mut self.job.beforeok,
            DepKind::BeforeNotOk => &mut self.job.beforenotok,
        };
        list.push(name.to_string());
        self
    }

    pub fn afterany(self, name: &str) -> Self {
        self.depends(DepKind::AfterAny, name)
    }

    pub fn afterok(self, name: &str) -> Self {
        self.depends(DepKind::AfterOk, name)
    }

    pub fn beforeany(self, name: &str) -> Self {
        self.depends(DepKind::BeforeAny, name)
    }

    pub fn build(self) -> JobSection {
        self.job
    }
}

// src/lib.rs

pub mod chain;
pub mod cli;
pub mod config;
pub mod errors;
pub mod logging;
pub mod sched;

use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;

use tracing::info;

use crate::chain::{Job, JobChain, JobId, ScriptSettings, SubmitOptions};
use crate::cli::CliArgs;
use crate::config::loader::load_and_validate;
use crate::config::model::ConfigFile;
use crate::errors::Result;
use crate::sched::{script_extension, OutputSinks, ProcessScheduler};

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - chain definition loading
/// - job construction and registration
/// - dependency declaration
/// - submission (real or dry-run) with an optional report
pub fn run(args: CliArgs) -> Result<()> {
    let config_path = PathBuf::from(&args.config);
    let cfg = load_and_validate(&config_path)?;

    let (mut chain, ids) = build_chain(&cfg)?;
    info!(
        jobs = chain.len(),
        config = %config_path.display(),
        "job chain built"
    );

    let mut extra_args = HashMap::new();
    for (name, job) in cfg.job.iter() {
        if job.extra_args.is_empty() {
            continue;
        }
        if let Some(id) = ids.get(name) {
            extra_args.insert(*id, job.extra_args.clone());
        }
    }

    let options = SubmitOptions {
        dry_run: args.dry_run,
        report: args.report,
        extra_args,
        sinks: OutputSinks::default(),
    };

    let mut backend = ProcessScheduler::new();
    let report = chain.submit(&mut backend, options)?;

    if let Some(report) = report {
        println!("{report}");
    }

    Ok(())
}

/// Build a [`JobChain`] from a validated chain definition.
///
/// Returns the chain plus the name → id mapping, so callers can address
/// jobs by their config names afterwards.
pub fn build_chain(cfg: &ConfigFile) -> Result<(JobChain, BTreeMap<String, JobId>)> {
    let settings = ScriptSettings {
        dir: cfg.scheduler.script_dir.clone(),
        extension: script_extension(&cfg.scheduler.kind)
            .unwrap_or("pbs")
            .to_string(),
    };

    let mut chain = if cfg.scheduler.raw {
        JobChain::with_raw_command(&cfg.scheduler.kind)
    } else {
        JobChain::new(&cfg.scheduler.kind)?
    };

    // First pass: create and register every job.
    let mut ids = BTreeMap::new();
    for (name, section) in cfg.job.iter() {
        let mut job = Job::new(&section.script, section.script_kind(), &settings)?;

        if let Some(account) = section.account.as_ref().or(cfg.scheduler.account.as_ref()) {
            job.set_account(account);
        }
        if let Some(resources) = &section.resources {
            job.set_resources(resources.clone());
        }

        ids.insert(name.clone(), chain.register(job));
    }

    // Second pass: declare dependencies now that every endpoint exists.
    for (name, section) in cfg.job.iter() {
        for (kind, dep) in section.dependencies() {
            let (Some(&base), Some(&target)) = (ids.get(name), ids.get(dep)) else {
                continue;
            };
            chain.declare_dependency(base, target, kind)?;
        }
    }

    Ok((chain, ids))
}

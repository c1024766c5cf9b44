// src/config/validate.rs

use petgraph::algo::toposort;
use petgraph::graphmap::DiGraphMap;

use crate::config::model::{ConfigFile, RawConfigFile};
use crate::errors::{QchainError, Result};
use crate::sched::SubmitCommand;

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = QchainError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        validate_raw_config(&raw)?;
        Ok(ConfigFile::new_unchecked(raw.scheduler, raw.job))
    }
}

fn validate_raw_config(cfg: &RawConfigFile) -> Result<()> {
    ensure_has_jobs(cfg)?;
    validate_scheduler(cfg)?;
    validate_job_sections(cfg)?;
    validate_dag(cfg)?;
    Ok(())
}

fn ensure_has_jobs(cfg: &RawConfigFile) -> Result<()> {
    if cfg.job.is_empty() {
        return Err(QchainError::ConfigError(
            "config must contain at least one [job.<name>] section".to_string(),
        ));
    }
    Ok(())
}

fn validate_scheduler(cfg: &RawConfigFile) -> Result<()> {
    if !cfg.scheduler.raw && SubmitCommand::for_kind(&cfg.scheduler.kind).is_err() {
        return Err(QchainError::ConfigError(format!(
            "unknown scheduler kind '{}' in [scheduler] (set raw = true to use it verbatim)",
            cfg.scheduler.kind
        )));
    }
    Ok(())
}

fn validate_job_sections(cfg: &RawConfigFile) -> Result<()> {
    for (name, job) in cfg.job.iter() {
        if job.script.is_empty() {
            return Err(QchainError::ConfigError(format!(
                "job '{}' has an empty `script`",
                name
            )));
        }

        if let Some(resources) = &job.resources {
            let node_scoped = resources.ppn.is_some() || resources.node_type.is_some();
            if node_scoped && resources.nodes.is_none() {
                return Err(QchainError::ConfigError(format!(
                    "job '{}' sets ppn/node_type without nodes in [job.{}.resources]",
                    name, name
                )));
            }
        }

        for (kind, dep) in job.dependencies() {
            if !cfg.job.contains_key(dep) {
                return Err(QchainError::ConfigError(format!(
                    "job '{}' has unknown dependency '{}' in `{}`",
                    name, dep, kind
                )));
            }
            if dep == name {
                return Err(QchainError::ConfigError(format!(
                    "job '{}' cannot depend on itself in `{}`",
                    name, kind
                )));
            }
        }
    }
    Ok(())
}

fn validate_dag(cfg: &RawConfigFile) -> Result<()> {
    // Build a petgraph graph over the normalized edges.
    //
    // Edge direction: dependency -> dependent. A `before` relation is the
    // reversed edge, so for
    //   [job.b]
    //   after = ["a"]
    // we add a -> b, and for
    //   [job.a]
    //   before = ["b"]
    // we also add a -> b.
    let mut graph: DiGraphMap<&str, ()> = DiGraphMap::new();

    for name in cfg.job.keys() {
        graph.add_node(name.as_str());
    }

    for (name, job) in cfg.job.iter() {
        for (kind, dep) in job.dependencies() {
            if kind.is_before() {
                graph.add_edge(name.as_str(), dep, ());
            } else {
                graph.add_edge(dep, name.as_str(), ());
            }
        }
    }

    // A topological sort will fail if there is a cycle.
    match toposort(&graph, None) {
        Ok(_order) => Ok(()),
        Err(cycle) => Err(QchainError::CycleDetected(format!(
            "job '{}'",
            cycle.node_id()
        ))),
    }
}

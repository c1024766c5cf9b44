#![allow(dead_code)]

use qchain::chain::{Job, JobChain, JobId, ScriptKind, ScriptSettings};
use tempfile::TempDir;

pub fn script_settings(tmp: &TempDir) -> ScriptSettings {
    ScriptSettings {
        dir: tmp.path().join("scripts"),
        extension: "pbs".to_string(),
    }
}

/// A pbs chain with `n` registered literal jobs (`echo job<i>`), no edges.
pub fn literal_chain(tmp: &TempDir, n: usize) -> (JobChain, Vec<JobId>) {
    let settings = script_settings(tmp);
    let mut chain = JobChain::new("pbs").expect("pbs is a known scheduler");

    let ids = (0..n)
        .map(|i| {
            let job = Job::new(&format!("echo job{i}"), ScriptKind::Literal, &settings)
                .expect("literal job");
            chain.register(job)
        })
        .collect();

    (chain, ids)
}

mod common;

use common::script_settings;
use qchain::chain::{Job, JobChain, ScriptKind, SubmitOptions};
use qchain::errors::QchainError;
use qchain::sched::ProcessScheduler;

// These tests exercise the real process backend through harmless commands
// via the raw-override submission path.

#[test]
fn raw_override_runs_the_real_command() {
    let tmp = tempfile::tempdir().unwrap();
    let settings = script_settings(&tmp);

    // `echo` plays the scheduler: it prints its argument (the script path),
    // which becomes the job's scheduler id.
    let mut chain = JobChain::with_raw_command("echo");
    let id = chain.register(Job::new("echo hi", ScriptKind::Literal, &settings).unwrap());

    let mut backend = ProcessScheduler::new();
    chain
        .submit(&mut backend, SubmitOptions::default())
        .unwrap();

    let job = chain.job(id).unwrap();
    assert_eq!(job.sched_id(), Some(job.script().display().to_string().as_str()));
}

#[test]
fn nonzero_exit_is_a_rejection() {
    let tmp = tempfile::tempdir().unwrap();
    let settings = script_settings(&tmp);

    let mut chain = JobChain::with_raw_command("false");
    let id = chain.register(Job::new("echo hi", ScriptKind::Literal, &settings).unwrap());

    let mut backend = ProcessScheduler::new();
    let err = chain
        .submit(&mut backend, SubmitOptions::default())
        .unwrap_err();

    match err {
        QchainError::SchedulerRejected { code, .. } => assert_eq!(code, 1),
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(chain.job(id).unwrap().sched_id().is_none());
}

#[test]
fn missing_executable_surfaces_as_io_error() {
    let tmp = tempfile::tempdir().unwrap();
    let settings = script_settings(&tmp);

    let mut chain = JobChain::with_raw_command("qchain-no-such-executable-9e1b");
    chain.register(Job::new("echo hi", ScriptKind::Literal, &settings).unwrap());

    let mut backend = ProcessScheduler::new();
    let err = chain
        .submit(&mut backend, SubmitOptions::default())
        .unwrap_err();

    assert!(matches!(err, QchainError::Io(_)));
}

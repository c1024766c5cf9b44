mod common;

use common::literal_chain;
use qchain::chain::{DepKind, SubmitOptions};
use qchain::errors::QchainError;
use qchain_test_utils::fake_scheduler::FakeScheduler;

#[test]
fn three_job_cycle_fails_sort() {
    // j0 -> j1 -> j2 -> j0
    let tmp = tempfile::tempdir().unwrap();
    let (mut chain, ids) = literal_chain(&tmp, 3);

    chain
        .declare_dependency(ids[0], ids[1], DepKind::AfterAny)
        .unwrap();
    chain
        .declare_dependency(ids[1], ids[2], DepKind::AfterAny)
        .unwrap();
    chain
        .declare_dependency(ids[2], ids[0], DepKind::AfterAny)
        .unwrap();

    let err = chain.topological_sort().unwrap_err();
    assert!(matches!(err, QchainError::CycleDetected(_)));
}

#[test]
fn cycle_behind_clean_roots_is_still_detected() {
    // j0 and j1 are clean; the cycle is j2 -> j3 -> j4 -> j2.
    let tmp = tempfile::tempdir().unwrap();
    let (mut chain, ids) = literal_chain(&tmp, 5);

    chain
        .declare_dependency(ids[1], ids[0], DepKind::AfterAny)
        .unwrap();
    chain
        .declare_dependency(ids[2], ids[3], DepKind::AfterAny)
        .unwrap();
    chain
        .declare_dependency(ids[3], ids[4], DepKind::AfterAny)
        .unwrap();
    chain
        .declare_dependency(ids[4], ids[2], DepKind::AfterAny)
        .unwrap();

    let err = chain.topological_sort().unwrap_err();
    assert!(matches!(err, QchainError::CycleDetected(_)));
}

#[test]
fn self_dependency_is_a_cycle() {
    let tmp = tempfile::tempdir().unwrap();
    let (mut chain, ids) = literal_chain(&tmp, 1);

    chain
        .declare_dependency(ids[0], ids[0], DepKind::AfterAny)
        .unwrap();

    let err = chain.topological_sort().unwrap_err();
    assert!(matches!(err, QchainError::CycleDetected(_)));
}

#[test]
fn mixed_before_after_cycle_is_detected() {
    // "j0 afterany j1" plus "j0 beforeany j1" (== "j1 afterany j0").
    let tmp = tempfile::tempdir().unwrap();
    let (mut chain, ids) = literal_chain(&tmp, 2);

    chain
        .declare_dependency(ids[0], ids[1], DepKind::AfterAny)
        .unwrap();
    chain
        .declare_dependency(ids[0], ids[1], DepKind::BeforeAny)
        .unwrap();

    let err = chain.topological_sort().unwrap_err();
    assert!(matches!(err, QchainError::CycleDetected(_)));
}

#[test]
fn submission_never_starts_on_a_cycle() {
    let tmp = tempfile::tempdir().unwrap();
    let (mut chain, ids) = literal_chain(&tmp, 3);

    chain
        .declare_dependency(ids[0], ids[1], DepKind::AfterAny)
        .unwrap();
    chain
        .declare_dependency(ids[1], ids[2], DepKind::AfterAny)
        .unwrap();
    chain
        .declare_dependency(ids[2], ids[0], DepKind::AfterAny)
        .unwrap();

    let mut backend = FakeScheduler::new();
    let err = chain
        .submit(&mut backend, SubmitOptions::default())
        .unwrap_err();

    assert!(matches!(err, QchainError::CycleDetected(_)));
    assert!(backend.invocations().is_empty());
    for id in ids {
        assert!(chain.job(id).unwrap().sched_id().is_none());
    }

    // Dry run takes the same path.
    let err = chain
        .submit(
            &mut backend,
            SubmitOptions {
                dry_run: true,
                ..Default::default()
            },
        )
        .unwrap_err();
    assert!(matches!(err, QchainError::CycleDetected(_)));
}

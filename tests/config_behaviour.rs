use std::fs;

use qchain::chain::DepKind;
use qchain::cli::CliArgs;
use qchain::config::{load_and_validate, ConfigFile};
use qchain::errors::QchainError;
use qchain_test_utils::builders::{ConfigFileBuilder, JobSectionBuilder};

#[test]
fn valid_config_builds_a_matching_chain() {
    let tmp = tempfile::tempdir().unwrap();

    let cfg = ConfigFileBuilder::new()
        .with_script_dir(tmp.path().join("scripts"))
        .with_job("prepare", JobSectionBuilder::new("echo prepare").build())
        .with_job(
            "render",
            JobSectionBuilder::new("echo render").afterany("prepare").build(),
        )
        .build();

    let (chain, ids) = qchain::build_chain(&cfg).unwrap();
    assert_eq!(chain.len(), 2);

    let order = chain.topological_sort().unwrap();
    assert_eq!(order, vec![ids["prepare"], ids["render"]]);

    let deps = chain.job(ids["render"]).unwrap().dependencies();
    assert_eq!(deps.len(), 1);
    assert_eq!(deps[0].target(), ids["prepare"]);
    assert_eq!(deps[0].kind(), DepKind::AfterAny);
}

#[test]
fn before_arrays_normalize_during_build() {
    let tmp = tempfile::tempdir().unwrap();

    let cfg = ConfigFileBuilder::new()
        .with_script_dir(tmp.path().join("scripts"))
        .with_job(
            "prepare",
            JobSectionBuilder::new("echo prepare").beforeany("render").build(),
        )
        .with_job("render", JobSectionBuilder::new("echo render").build())
        .build();

    let (chain, ids) = qchain::build_chain(&cfg).unwrap();

    // The edge lands on "render", rewritten to afterany.
    assert!(chain.job(ids["prepare"]).unwrap().dependencies().is_empty());
    let deps = chain.job(ids["render"]).unwrap().dependencies();
    assert_eq!(deps.len(), 1);
    assert_eq!(deps[0].target(), ids["prepare"]);
    assert_eq!(deps[0].kind(), DepKind::AfterAny);
}

#[test]
fn unknown_dependency_reference_is_rejected() {
    let raw = ConfigFileBuilder::new()
        .with_job(
            "render",
            JobSectionBuilder::new("echo render").afterany("ghost").build(),
        )
        .into_raw();

    let err = ConfigFile::try_from(raw).unwrap_err();
    assert!(matches!(err, QchainError::ConfigError(_)));
}

#[test]
fn self_dependency_is_rejected() {
    let raw = ConfigFileBuilder::new()
        .with_job(
            "render",
            JobSectionBuilder::new("echo render").afterany("render").build(),
        )
        .into_raw();

    let err = ConfigFile::try_from(raw).unwrap_err();
    assert!(matches!(err, QchainError::ConfigError(_)));
}

#[test]
fn dependency_cycle_is_rejected_at_load_time() {
    let raw = ConfigFileBuilder::new()
        .with_job("a", JobSectionBuilder::new("echo a").afterany("b").build())
        .with_job("b", JobSectionBuilder::new("echo b").afterany("a").build())
        .into_raw();

    let err = ConfigFile::try_from(raw).unwrap_err();
    assert!(matches!(err, QchainError::CycleDetected(_)));
}

#[test]
fn before_edges_participate_in_the_cycle_check() {
    // "a afterany b" plus "a beforeany b" is a two-job cycle.
    let raw = ConfigFileBuilder::new()
        .with_job(
            "a",
            JobSectionBuilder::new("echo a")
                .afterany("b")
                .beforeany("b")
                .build(),
        )
        .with_job("b", JobSectionBuilder::new("echo b").build())
        .into_raw();

    let err = ConfigFile::try_from(raw).unwrap_err();
    assert!(matches!(err, QchainError::CycleDetected(_)));
}

#[test]
fn empty_config_is_rejected() {
    let err = ConfigFile::try_from(ConfigFileBuilder::new().into_raw()).unwrap_err();
    assert!(matches!(err, QchainError::ConfigError(_)));
}

#[test]
fn unknown_scheduler_kind_is_rejected_unless_raw() {
    let raw = ConfigFileBuilder::new()
        .with_scheduler_kind("slurm")
        .with_job("a", JobSectionBuilder::new("echo a").build())
        .into_raw();
    let err = ConfigFile::try_from(raw).unwrap_err();
    assert!(matches!(err, QchainError::ConfigError(_)));

    let raw = ConfigFileBuilder::new()
        .with_raw_command("sbatch")
        .with_job("a", JobSectionBuilder::new("echo a").build())
        .into_raw();
    assert!(ConfigFile::try_from(raw).is_ok());
}

#[test]
fn ppn_without_nodes_is_rejected() {
    let raw = ConfigFileBuilder::new()
        .with_job(
            "a",
            JobSectionBuilder::new("echo a")
                .resources(qchain::chain::Resources {
                    ppn: Some(16),
                    ..Default::default()
                })
                .build(),
        )
        .into_raw();

    let err = ConfigFile::try_from(raw).unwrap_err();
    assert!(matches!(err, QchainError::ConfigError(_)));
}

#[test]
fn toml_file_parses_sections_and_dependency_arrays() {
    let tmp = tempfile::tempdir().unwrap();
    let config_path = tmp.path().join("Qchain.toml");

    fs::write(
        &config_path,
        r#"
[scheduler]
kind = "pbs"
account = "ABC123"
script_dir = ".qchain"

[job.prepare]
script = "echo prepare"
script_kind = "literal"

[job.render]
script = "echo render"
afterok = ["prepare"]
extra_args = ["-q", "debug"]

[job.render.resources]
nodes = 4
ppn = 32
walltime = "02:00:00"

[job.publish]
script = "echo publish"
afterany = ["render"]
"#,
    )
    .unwrap();

    let cfg = load_and_validate(&config_path).unwrap();
    assert_eq!(cfg.scheduler.kind, "pbs");
    assert_eq!(cfg.scheduler.account.as_deref(), Some("ABC123"));
    assert_eq!(cfg.job.len(), 3);

    let render = &cfg.job["render"];
    let deps: Vec<_> = render.dependencies().collect();
    assert_eq!(deps, vec![(DepKind::AfterOk, "prepare")]);
    assert_eq!(render.extra_args, vec!["-q", "debug"]);
    let resources = render.resources.as_ref().unwrap();
    assert_eq!(resources.nodes, Some(4));
    assert_eq!(resources.walltime.as_deref(), Some("02:00:00"));
}

#[test]
fn end_to_end_dry_run_from_a_config_file() {
    let tmp = tempfile::tempdir().unwrap();
    let config_path = tmp.path().join("Qchain.toml");
    let script_dir = tmp.path().join("scripts");

    fs::write(
        &config_path,
        format!(
            r#"
[scheduler]
kind = "pbs"
script_dir = "{}"

[job.first]
script = "echo first"

[job.second]
script = "echo second"
afterany = ["first"]
"#,
            script_dir.display()
        ),
    )
    .unwrap();

    let args = CliArgs {
        config: config_path.display().to_string(),
        dry_run: true,
        report: true,
        log_level: None,
    };

    qchain::run(args).unwrap();

    // Both literal scripts were materialized.
    let entries: Vec<_> = fs::read_dir(&script_dir).unwrap().collect();
    assert_eq!(entries.len(), 2);
}

// src/cli.rs

//! CLI argument parsing using `clap`.

use clap::{Parser, ValueEnum};

/// Command-line arguments for `qchain`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "qchain",
    version,
    about = "Submit a chain of batch jobs to a scheduler in dependency order.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to the chain definition (TOML).
    ///
    /// Default: `Qchain.toml` in the current working directory.
    #[arg(long, value_name = "PATH", default_value = "Qchain.toml")]
    pub config: String,

    /// Skip scheduler invocation; assign placeholder ids and log the
    /// would-be command lines.
    #[arg(long)]
    pub dry_run: bool,

    /// Print the submission report (script, scheduler id and dependency
    /// lines per job).
    #[arg(long)]
    pub report: bool,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `QCHAIN_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}

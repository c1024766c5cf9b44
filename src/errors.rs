// src/errors.rs

//! Crate-wide error type and `Result` alias.

use thiserror::Error;

use crate::chain::JobId;

#[derive(Error, Debug)]
pub enum QchainError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("job {0} is not registered in this chain")]
    MissingRegistration(JobId),

    #[error("cycle detected in job chain involving {0}")]
    CycleDetected(String),

    #[error("job {job} was handed a dependency whose base is {base}")]
    ForeignDependency { job: JobId, base: JobId },

    #[error("job {job} depends on {target}, which has no scheduler id yet")]
    UnresolvedDependency { job: JobId, target: JobId },

    #[error("scheduler rejected job {job} with exit code {code}")]
    SchedulerRejected {
        job: JobId,
        code: i32,
        stdout: String,
        stderr: String,
    },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, QchainError>;

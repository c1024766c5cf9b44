// src/config/mod.rs

//! Chain definition loading and validation.
//!
//! Responsibilities:
//! - Define the TOML-backed data model (`model.rs`).
//! - Load a chain definition from disk (`loader.rs`).
//! - Validate semantic invariants like DAG correctness (`validate.rs`).

pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{default_config_path, load_and_validate, load_from_path};
pub use model::{ConfigFile, JobSection, RawConfigFile, SchedulerSection};

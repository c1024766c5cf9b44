// src/chain/mod.rs

//! Job-chain model: jobs, typed dependency edges, and the chain that
//! orders and submits them.
//!
//! - [`job`] holds a single schedulable unit and its submission protocol.
//! - [`dependency`] holds the typed edge and the eight relation kinds.
//! - [`graph`] holds the chain itself: registration, edge normalization,
//!   topological ordering and the ordered submission loop.

pub mod dependency;
pub mod graph;
pub mod job;

pub use dependency::{DepKind, Dependency, ResolvedDependency};
pub use graph::{JobChain, SubmitOptions};
pub use job::{Job, JobId, Resources, ScriptKind, ScriptSettings};

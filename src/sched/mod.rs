// src/sched/mod.rs

//! Scheduler adapter: rendered invocations and the backends that run them.

pub mod backend;

pub use backend::{
    script_extension, Invocation, OutputSinks, ProcessScheduler, SchedulerBackend,
    SubmitCommand, SubmitOutput,
};

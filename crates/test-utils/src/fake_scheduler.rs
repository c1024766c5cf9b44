use std::collections::VecDeque;

use qchain::errors::Result;
use qchain::sched::{Invocation, SchedulerBackend, SubmitOutput};

/// A fake scheduler backend that:
/// - records every invocation it receives
/// - answers with scripted outputs when queued, else accepts the job with
///   a generated id (`1000.fake`, `1001.fake`, ...).
pub struct FakeScheduler {
    invocations: Vec<Invocation>,
    responses: VecDeque<SubmitOutput>,
    next_id: u64,
}

impl FakeScheduler {
    pub fn new() -> Self {
        Self {
            invocations: Vec::new(),
            responses: VecDeque::new(),
            next_id: 1000,
        }
    }

    /// Queue a scripted output for the next invocation.
    pub fn push_response(&mut self, output: SubmitOutput) {
        self.responses.push_back(output);
    }

    /// Queue an acceptance whose stdout carries the given scheduler id.
    pub fn accept_next(&mut self, sched_id: &str) {
        self.push_response(SubmitOutput {
            exit_code: 0,
            stdout: format!("{sched_id}\n"),
            stderr: String::new(),
        });
    }

    /// Queue a rejection with the given exit code and stderr text.
    pub fn reject_next(&mut self, code: i32, stderr: &str) {
        self.push_response(SubmitOutput {
            exit_code: code,
            stdout: String::new(),
            stderr: stderr.to_string(),
        });
    }

    /// Every invocation received so far, in order.
    pub fn invocations(&self) -> &[Invocation] {
        &self.invocations
    }

    pub fn command_lines(&self) -> Vec<String> {
        self.invocations
            .iter()
            .map(Invocation::command_line)
            .collect()
    }
}

impl Default for FakeScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl SchedulerBackend for FakeScheduler {
    fn submit(&mut self, invocation: &Invocation) -> Result<SubmitOutput> {
        self.invocations.push(invocation.clone());

        if let Some(response) = self.responses.pop_front() {
            return Ok(response);
        }

        let sched_id = format!("{}.fake", self.next_id);
        self.next_id += 1;
        Ok(SubmitOutput {
            exit_code: 0,
            stdout: format!("{sched_id}\n"),
            stderr: String::new(),
        })
    }
}

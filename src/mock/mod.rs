//! Mock implementations for testing
//!
//! Provides a recording stand-in for the production invoker so handler and
//! controller tests can assert what would have been dispatched without
//! touching the network or spawning processes.

use crate::invoker::{CommandInvoker, CommandResult, Invocation};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

/// Invoker fake that records every invocation and replays scripted results.
///
/// Results queued with [`push_result`](Self::push_result) are returned in
/// order; once the queue is empty every call succeeds with a generic message.
#[derive(Default)]
pub struct RecordingInvoker {
    calls: Mutex<Vec<(Invocation, Duration)>>,
    results: Mutex<VecDeque<CommandResult>>,
}

impl RecordingInvoker {
    /// Create a recording invoker that answers success to everything
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue the result for an upcoming invocation
    pub fn push_result(&self, result: CommandResult) {
        self.results.lock().unwrap().push_back(result);
    }

    /// All invocations seen so far
    pub fn calls(&self) -> Vec<Invocation> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .map(|(invocation, _)| invocation.clone())
            .collect()
    }

    /// Deadlines attached to the invocations seen so far
    pub fn deadlines(&self) -> Vec<Duration> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .map(|(_, deadline)| *deadline)
            .collect()
    }

    /// Number of invocations seen so far
    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl CommandInvoker for RecordingInvoker {
    async fn invoke(&self, invocation: Invocation, deadline: Duration) -> CommandResult {
        self.calls.lock().unwrap().push((invocation, deadline));
        self.results
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| CommandResult::success("ok"))
    }
}

//! Scripted command runner for exercising probes without spawning processes.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use metalbridge_core::ProbeCommand;

use crate::runner::{CommandOutput, CommandRunner};

/// Returns canned output keyed by the full command line. Commands without a
/// script behave like a missing binary.
#[derive(Debug, Clone, Default)]
pub struct ScriptedRunner {
    outputs: HashMap<String, CommandOutput>,
    calls: Arc<AtomicUsize>,
}

impl ScriptedRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, command: &ProbeCommand, output: CommandOutput) -> Self {
        self.outputs.insert(command.to_string(), output);
        self
    }

    /// Total `run` calls across every clone of this runner
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CommandRunner for ScriptedRunner {
    async fn run(&self, command: &ProbeCommand) -> CommandOutput {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.outputs
            .get(&command.to_string())
            .cloned()
            .unwrap_or_default()
    }
}

// src/system/diagnostics.rs

use crate::system::descriptor::CommandDescriptor;
use std::fmt::Debug;
use std::time::Duration;

/// Structured diagnostics emitted by the [`Runner`](crate::system::runner::Runner).
///
/// The runner receives an implementation at construction time instead of reaching for
/// a global logger, which keeps it testable and lets embedders route events anywhere.
/// Command lines are reported verbatim, secrets included.
pub trait Diagnostics: Send + Sync + Debug {
    /// A command is about to be spawned.
    fn command_started(&self, descriptor: &CommandDescriptor, through_pty: bool);

    /// A command terminated (or failed to start).
    fn command_finished(&self, descriptor: &CommandDescriptor, took: Duration, success: bool);

    /// Free-form debug detail.
    fn debug(&self, message: &str);
}

/// Forwards diagnostics to the `log` facade under a fixed target.
#[derive(Debug, Clone)]
pub struct LogDiagnostics {
    target: &'static str,
}

impl LogDiagnostics {
    /// Logs under `target`.
    pub fn new(target: &'static str) -> Self {
        Self { target }
    }
}

impl Default for LogDiagnostics {
    fn default() -> Self {
        Self::new("relay::runner")
    }
}

impl Diagnostics for LogDiagnostics {
    fn command_started(&self, descriptor: &CommandDescriptor, through_pty: bool) {
        let channel = if through_pty { "PTY" } else { "pipes" };
        log::debug!(target: self.target, "starting command through {}: {}", channel, descriptor);
    }

    fn command_finished(&self, descriptor: &CommandDescriptor, took: Duration, success: bool) {
        log::debug!(
            target: self.target,
            "run of command terminated: command={} took={:?} success={}",
            descriptor,
            took,
            success
        );
    }

    fn debug(&self, message: &str) {
        log::debug!(target: self.target, "{}", message);
    }
}

// src/system/executor.rs

use crate::{
    core::cleanup::CleanupRegistry,
    system::{
        descriptor::CommandDescriptor,
        error::ExecutionError,
        runner::{Echo, ExecutionResult, Runner},
    },
};
use colored::Colorize;
use std::convert::Infallible;

/// What a command printed and how it ended.
///
/// A command that could not be parsed has an empty descriptor, no output and a fatal
/// error.
#[derive(Debug)]
pub struct Captured {
    /// The parsed command.
    pub descriptor: CommandDescriptor,
    /// Captured output.
    pub output: String,
    /// Why the command failed, if it did.
    pub error: Option<ExecutionError>,
    command: String,
}

impl Captured {
    /// `true` when the command ran and exited successfully.
    pub fn success(&self) -> bool {
        self.error.is_none()
    }

    /// Whether the captured output mentions any of `needles`. Used to downgrade
    /// known failures such as `no upstream configured` to a soft outcome.
    pub fn contains_any(&self, needles: &[&str]) -> bool {
        needles.iter().any(|needle| self.output.contains(needle))
    }

    /// The command as the user typed it when it could not even be parsed.
    pub fn command(&self) -> &str {
        &self.command
    }

    fn unparsable<S: AsRef<str>>(inputs: &[S], error: ExecutionError) -> Self {
        Self {
            descriptor: CommandDescriptor::default(),
            output: String::new(),
            error: Some(error),
            command: raw_command(inputs),
        }
    }

    fn finished(
        descriptor: CommandDescriptor,
        outcome: Result<ExecutionResult, ExecutionError>,
        pick: fn(ExecutionResult) -> (String, Option<ExecutionError>),
    ) -> Self {
        let command = descriptor.to_string();
        let (output, error) = match outcome {
            Ok(result) => pick(result),
            Err(error) => (String::new(), Some(error)),
        };
        Self {
            descriptor,
            output,
            error,
            command,
        }
    }
}

fn raw_command<S: AsRef<str>>(inputs: &[S]) -> String {
    inputs
        .iter()
        .map(|input| input.as_ref())
        .collect::<Vec<_>>()
        .join(" ")
}

/// The calling conventions release steps use to run external commands.
///
/// Every helper takes one or more raw command strings. The "or die" helpers print the
/// failure, run the registered cleanups and terminate the process with status 1,
/// mirroring how a release aborts on the first broken step.
#[derive(Debug, Clone, Default)]
pub struct Executor {
    runner: Runner,
    cleanups: CleanupRegistry,
}

impl Executor {
    /// Wraps a runner and the cleanups to run before terminating.
    pub fn new(runner: Runner, cleanups: CleanupRegistry) -> Self {
        Self { runner, cleanups }
    }

    /// The underlying runner.
    pub fn runner(&self) -> &Runner {
        &self.runner
    }

    /// Cleanups run by [`shutdown`](Self::shutdown).
    pub fn cleanups(&self) -> &CleanupRegistry {
        &self.cleanups
    }

    /// Runs the command and captures its combined output, never terminating.
    pub async fn capture<S: AsRef<str>>(&self, inputs: &[S], echo: Echo) -> Captured {
        let descriptor = match CommandDescriptor::parse(inputs) {
            Ok(descriptor) => descriptor,
            Err(error) => return Captured::unparsable(inputs, error),
        };
        let outcome = self.runner.run(&descriptor, echo).await;
        Captured::finished(descriptor, outcome, |result| {
            (result.combined, result.exit_error)
        })
    }

    /// Runs the command with live output and returns what it printed. Any failure,
    /// a non-zero exit included, terminates the program.
    pub async fn run<S: AsRef<str>>(&self, inputs: &[S]) -> String {
        let captured = self.capture(inputs, Echo::Live).await;
        match captured.error {
            None => captured.output,
            Some(ref error) => match self.die(&captured, error).await {},
        }
    }

    /// Like [`run`](Self::run) without echoing anything. On failure the captured output
    /// is only logged at debug level before terminating.
    pub async fn run_silent<S: AsRef<str>>(&self, inputs: &[S]) -> String {
        let captured = self.capture(inputs, Echo::Silent).await;
        match captured.error {
            None => captured.output,
            Some(ref error) => {
                log::debug!(
                    "run command failed: cmd={} error={} output={:?}",
                    captured.command,
                    error,
                    captured.output
                );
                match self.die(&captured, error).await {}
            }
        }
    }

    /// Runs the command with live output, handing a non-zero exit back to the caller.
    /// Errors meaning the command never ran still terminate the program.
    pub async fn maybe_run<S: AsRef<str>>(
        &self,
        inputs: &[S],
    ) -> (String, CommandDescriptor, Result<(), ExecutionError>) {
        let captured = self.capture(inputs, Echo::Live).await;
        match captured.error {
            Some(ref error) if error.is_fatal() => match self.die(&captured, error).await {},
            _ => {
                let result = captured.error.map_or(Ok(()), Err);
                (captured.output, captured.descriptor, result)
            }
        }
    }

    /// Runs the command without echo, keeping its streams apart.
    ///
    /// # Errors
    /// On success the command's standard output is returned. On failure the `Err`
    /// carries the combined output and the error, so the caller can look for known
    /// messages with [`Captured::contains_any`].
    pub async fn maybe_result_of<S: AsRef<str>>(&self, inputs: &[S]) -> Result<String, Captured> {
        let descriptor = match CommandDescriptor::parse(inputs) {
            Ok(descriptor) => descriptor,
            Err(error) => return Err(Captured::unparsable(inputs, error)),
        };
        let outcome = self.runner.run_split(&descriptor).await;
        let captured = Captured::finished(descriptor, outcome, |result| match result.exit_error {
            None => (result.stdout.unwrap_or_default(), None),
            Some(error) => (result.combined, Some(error)),
        });
        if captured.success() {
            Ok(captured.output)
        } else {
            Err(captured)
        }
    }

    /// [`maybe_result_of`](Self::maybe_result_of) that terminates on failure.
    pub async fn result_of<S: AsRef<str>>(&self, inputs: &[S]) -> String {
        match self.maybe_result_of(inputs).await {
            Ok(stdout) => stdout,
            Err(captured) => match &captured.error {
                Some(error) => match self.die(&captured, error).await {},
                None => captured.output,
            },
        }
    }

    async fn die(&self, captured: &Captured, error: &ExecutionError) -> Infallible {
        eprintln!(
            "{} {}",
            "Unable to run command:".red().bold(),
            captured.command.red()
        );
        eprintln!("{}", error.to_string().red());
        self.shutdown(1).await
    }

    /// Runs the registered cleanups and exits with `code`.
    pub async fn shutdown(&self, code: i32) -> Infallible {
        let ran = self.cleanups.run_all().await;
        log::debug!("Ran {} cleanup(s) before exiting with code {}", ran, code);
        std::process::exit(code)
    }
}

// src/system/error.rs

use thiserror::Error;

/// Everything that can go wrong while turning a command line into a finished process.
///
/// Only [`ExecutionError::NonZeroExit`] is a "soft" failure: the process ran and the
/// caller gets to decide what the exit status means. Every other variant means the
/// command never ran as intended and should abort the calling command.
#[derive(Error, Debug)]
pub enum ExecutionError {
    /// A raw command string has unterminated quoting.
    #[error("Command could not be parsed, quoting is not terminated: {input}")]
    MalformedShellSyntax {
        /// The offending raw string.
        input: String,
    },

    /// Tokenization produced no executable.
    #[error("No command specified to run in '{input}'.")]
    EmptyCommand {
        /// The rendered (environment-only or blank) descriptor.
        input: String,
    },

    /// The operating system refused to start the child.
    #[error("Command '{command}' could not be started: {source}")]
    Spawn {
        /// The command line.
        command: String,
        /// Cause reported by the OS.
        #[source]
        source: std::io::Error,
    },

    /// No pseudo-terminal could be allocated or configured.
    #[error("Unable to create PTY for command '{command}': {message}")]
    Pty {
        /// The command line.
        command: String,
        /// Cause reported by the PTY layer.
        message: String,
    },

    /// Waiting for the child or copying its output failed.
    #[error("I/O failure while running command '{command}': {source}")]
    Io {
        /// The command line.
        command: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The child ran and exited unsuccessfully.
    #[error("Command '{command}' exited with {}.", describe_code(*.code))]
    NonZeroExit {
        /// The command line.
        command: String,
        /// Exit code, `None` when killed by a signal.
        code: Option<i32>,
    },
}

impl ExecutionError {
    /// Returns `true` when the error means the command could not be run at all.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, Self::NonZeroExit { .. })
    }

    /// The exit code of the child, when it exited with one.
    pub fn exit_code(&self) -> Option<i32> {
        match self {
            Self::NonZeroExit { code, .. } => *code,
            _ => None,
        }
    }
}

fn describe_code(code: Option<i32>) -> String {
    match code {
        Some(code) => format!("exit code {code}"),
        None => "no exit code (terminated by signal)".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_non_zero_exit_is_not_fatal() {
        let err = ExecutionError::NonZeroExit {
            command: "false".to_string(),
            code: Some(1),
        };
        assert!(!err.is_fatal());
        assert_eq!(err.exit_code(), Some(1));
        assert_eq!(err.to_string(), "Command 'false' exited with exit code 1.");
    }

    #[test]
    fn test_signal_termination_message() {
        let err = ExecutionError::NonZeroExit {
            command: "sleep 10".to_string(),
            code: None,
        };
        assert!(err.to_string().contains("terminated by signal"));
    }

    #[test]
    fn test_parse_errors_are_fatal() {
        let err = ExecutionError::MalformedShellSyntax {
            input: "echo 'oops".to_string(),
        };
        assert!(err.is_fatal());
        assert!(err.to_string().contains("echo 'oops"));
        assert_eq!(err.exit_code(), None);
    }
}

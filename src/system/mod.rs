//! # System Interaction Layer
//!
//! Everything that turns a command line into a finished child process.
//!
//! ## Modules
//!
//! - **`tokenizer`**: POSIX-style word splitting of raw command strings.
//! - **`descriptor`**: separates leading `KEY=VALUE` assignments from the command.
//! - **`runner`**: spawns a descriptor on a pseudo-terminal or with pipes, streaming its
//!   output live while capturing a full copy.
//! - **`executor`**: the "run it or die" calling conventions used by release steps,
//!   built on the runner and the cleanup registry.
//! - **`tee`** and **`diagnostics`**: output fan-out and the logging capability the
//!   runner is given.

/// Command descriptors.
pub mod descriptor;
/// Runner diagnostics.
pub mod diagnostics;
/// Execution errors.
pub mod error;
/// Run-or-die calling conventions.
pub mod executor;
/// PTY and pipe process runner.
pub mod runner;
/// Output fan-out.
pub mod tee;
/// Shell word splitting.
pub mod tokenizer;

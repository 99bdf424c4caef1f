//! # relay
//!
//! Building blocks for release orchestration: a PTY-aware process runner with
//! shell-like command parsing, calling conventions for the common "run it or die"
//! patterns, and changelog section extraction for release notes.

/// Command-line front end.
pub mod cli;
/// Environment variable names and defaults.
pub mod constants;
/// Changelog parsing, configuration and cleanup callbacks.
pub mod core;
/// Process execution.
pub mod system;

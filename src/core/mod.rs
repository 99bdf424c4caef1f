// src/core/mod.rs

/// Changelog sections, release notes and GitHub Actions output.
pub mod changelog;
/// Cleanup callbacks run on termination.
pub mod cleanup;
/// Runner settings from the configuration file and environment.
pub mod config;

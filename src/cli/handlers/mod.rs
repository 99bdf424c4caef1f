// src/cli/handlers/mod.rs

// One module per subcommand. Handlers return `anyhow::Result` and leave exit codes to
// the binary.

/// `relay changelog ...`
pub mod changelog;
/// `relay result-of`
pub mod result_of;
/// `relay run`
pub mod run;

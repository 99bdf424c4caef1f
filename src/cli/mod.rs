// src/cli/mod.rs

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Subcommand implementations.
pub mod handlers;

/// relay: run release steps through a PTY and extract release notes from changelogs.
#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about,
    styles = clap::builder::Styles::styled()
        .header(clap::builder::styling::AnsiColor::Yellow.on_default().bold())
        .usage(clap::builder::styling::AnsiColor::Yellow.on_default().bold())
        .literal(clap::builder::styling::AnsiColor::Cyan.on_default().bold())
        .placeholder(clap::builder::styling::AnsiColor::Green.on_default()),
)]
#[command(disable_help_subcommand = true)]
pub struct Cli {
    /// Run commands with plain pipes instead of a pseudo-terminal.
    #[arg(long, global = true)]
    pub no_pty: bool,

    /// Working directory for every spawned command.
    #[arg(long, global = true, value_name = "DIR")]
    pub root: Option<PathBuf>,

    /// The subcommand to run.
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run a command, streaming its output; abort on failure.
    Run(RunArgs),
    /// Run a command quietly and print its standard output.
    ResultOf(ResultOfArgs),
    /// Changelog helpers.
    #[command(subcommand)]
    Changelog(ChangelogCommands),
}

/// Arguments of `relay run`.
#[derive(Args, Debug)]
pub struct RunArgs {
    /// Capture output without echoing it.
    #[arg(long)]
    pub silent: bool,

    /// Command to run when relay terminates, normally or on Ctrl+C. Repeatable.
    #[arg(long, value_name = "COMMAND")]
    pub cleanup: Vec<String>,

    /// The command line. Leading `KEY=VALUE` words set environment variables.
    #[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true)]
    pub command: Vec<String>,
}

/// Arguments of `relay result-of`.
#[derive(Args, Debug)]
pub struct ResultOfArgs {
    /// The command line.
    #[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true)]
    pub command: Vec<String>,
}

/// `relay changelog` subcommands.
#[derive(Subcommand, Debug)]
pub enum ChangelogCommands {
    /// Extract a section from a changelog file, the latest by default.
    ExtractSection(ExtractSectionArgs),
    /// Print the notes of the latest release section.
    ReleaseNotes(ChangelogFileArgs),
    /// Print the version of the latest release section.
    Version(ChangelogFileArgs),
}

/// Arguments of `relay changelog extract-section`.
#[derive(Args, Debug)]
pub struct ExtractSectionArgs {
    /// Path to the changelog file.
    #[arg(default_value = crate::constants::DEFAULT_CHANGELOG)]
    pub file: PathBuf,

    /// Version to extract (defaults to the first section found).
    pub version: Option<String>,

    /// Regex matching the section start header (defaults to '^## .+' or '^## .*<version>.*').
    #[arg(long)]
    pub start_header_regex: Option<String>,

    /// Regex matching the header that ends the section.
    #[arg(long, default_value = crate::constants::DEFAULT_SECTION_HEADER)]
    pub end_header_regex: String,

    /// GitHub Actions output file, as 'path' or 'variable:path' (variable defaults to 'changelog').
    #[arg(long, value_name = "[VAR:]PATH")]
    pub github_output: Option<String>,
}

/// Arguments of commands reading a single changelog.
#[derive(Args, Debug)]
pub struct ChangelogFileArgs {
    /// Path to the changelog file.
    #[arg(default_value = crate::constants::DEFAULT_CHANGELOG)]
    pub file: PathBuf,
}

// src/bin/relay.rs

use anyhow::Result;
use clap::Parser;
use colored::*;
use relay::{
    cli::{Cli, Commands, handlers},
    constants::INTERRUPTED_EXIT_CODE,
    core::{cleanup::CleanupRegistry, config::Settings},
    system::{diagnostics::LogDiagnostics, executor::Executor, runner::Runner},
};
use std::sync::Arc;

/// The main entry point of the `relay` application.
/// It sets up logging, parses arguments, dispatches to the correct handler,
/// and performs centralized error handling.
#[tokio::main]
async fn main() {
    env_logger::init();
    let cli = Cli::parse();
    log::debug!("CLI args parsed: {:?}", cli);

    let executor = match build_executor(&cli) {
        Ok(executor) => executor,
        Err(e) => {
            eprintln!("\n{}: {}", "Error".red().bold(), e);
            std::process::exit(1);
        }
    };

    let outcome = tokio::select! {
        outcome = run_cli(cli.command, &executor) => outcome,
        _ = tokio::signal::ctrl_c() => {
            // Same cleanups as a normal exit, then the shell's code for SIGINT.
            eprintln!("\n{}", "Interrupted, running cleanups...".yellow());
            match executor.shutdown(INTERRUPTED_EXIT_CODE).await {}
        }
    };

    if let Err(e) = outcome {
        eprintln!("\n{}: {}", "Error".red().bold(), e);
        match executor.shutdown(1).await {}
    }
    executor.cleanups().run_all().await;
}

/// Resolves settings (file, then environment, then flags) into the executor.
fn build_executor(cli: &Cli) -> Result<Executor> {
    let mut settings = Settings::load()?;
    if cli.no_pty {
        settings.runner.use_pty = false;
    }
    if let Some(root) = &cli.root {
        settings.runner.working_directory = Some(root.clone());
    }
    log::debug!("Runner settings: {:?}", settings.runner);

    let runner = Runner::new(&settings.runner, Arc::new(LogDiagnostics::default()));
    Ok(Executor::new(runner, CleanupRegistry::new()))
}

async fn run_cli(command: Commands, executor: &Executor) -> Result<()> {
    match command {
        Commands::Run(args) => handlers::run::handle(args, executor).await,
        Commands::ResultOf(args) => handlers::result_of::handle(args, executor).await,
        Commands::Changelog(command) => handlers::changelog::handle(command),
    }
}

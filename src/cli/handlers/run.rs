// src/cli/handlers/run.rs

use crate::{
    cli::RunArgs,
    system::{
        descriptor::CommandDescriptor,
        executor::Executor,
        runner::{Echo, Runner},
    },
};
use anyhow::Result;

/// Main entry point for the 'run' command.
///
/// Cleanup commands are registered before the main command starts, so they also run
/// when it fails or when the user hits Ctrl+C.
pub async fn handle(args: RunArgs, executor: &Executor) -> Result<()> {
    for (index, cleanup) in args.cleanup.into_iter().enumerate() {
        register_cleanup(executor, format!("cleanup-{index}"), cleanup);
    }

    if args.silent {
        executor.run_silent(&args.command).await;
    } else {
        executor.run(&args.command).await;
    }
    Ok(())
}

fn register_cleanup(executor: &Executor, id: String, command: String) {
    let runner: Runner = executor.runner().clone();
    executor.cleanups().register(id, move || async move {
        let descriptor = match CommandDescriptor::parse(&[&command]) {
            Ok(descriptor) => descriptor,
            Err(e) => {
                log::warn!("Skipping cleanup: {}", e);
                return;
            }
        };
        match runner.run(&descriptor, Echo::Silent).await {
            Ok(result) if result.success() => {}
            Ok(result) => log::warn!(
                "Cleanup '{}' failed: {}",
                descriptor,
                result.combined.trim_end()
            ),
            Err(e) => log::warn!("Cleanup '{}' could not run: {}", descriptor, e),
        }
    });
}

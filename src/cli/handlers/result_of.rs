// src/cli/handlers/result_of.rs

use crate::{cli::ResultOfArgs, system::executor::Executor};
use anyhow::{Result, anyhow};

/// Prints the standard output of the command. On failure the combined output goes to
/// stderr and the command's error is returned.
pub async fn handle(args: ResultOfArgs, executor: &Executor) -> Result<()> {
    match executor.maybe_result_of(&args.command).await {
        Ok(stdout) => {
            print!("{stdout}");
            Ok(())
        }
        Err(captured) => {
            eprint!("{}", captured.output);
            let command = captured.command().to_string();
            Err(captured
                .error
                .map_or_else(|| anyhow!("Command '{}' failed", command), Into::into))
        }
    }
}

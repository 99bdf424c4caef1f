// src/cli/handlers/changelog.rs

use crate::{
    cli::{ChangelogCommands, ChangelogFileArgs, ExtractSectionArgs},
    core::changelog::{
        self, GitHubOutputTarget, SectionBounds, extract_section_from_file, write_github_output,
    },
};
use anyhow::{Context, Result, bail};
use colored::Colorize;

/// Dispatches the `relay changelog` subcommands.
pub fn handle(command: ChangelogCommands) -> Result<()> {
    match command {
        ChangelogCommands::ExtractSection(args) => extract_section(args),
        ChangelogCommands::ReleaseNotes(args) => release_notes(args),
        ChangelogCommands::Version(args) => version(args),
    }
}

fn extract_section(args: ExtractSectionArgs) -> Result<()> {
    let bounds = SectionBounds::for_version(
        args.version.as_deref(),
        args.start_header_regex.as_deref(),
        &args.end_header_regex,
    )?;
    log::debug!("Extracting section from '{}' with {:?}", args.file.display(), bounds);

    let section = extract_section_from_file(&args.file, &bounds)?.unwrap_or_default();
    if section.is_empty() {
        match &args.version {
            Some(version) => bail!(
                "No section found for version '{}' in {}",
                version,
                args.file.display()
            ),
            None => bail!("No section found in {}", args.file.display()),
        }
    }

    match args.github_output {
        Some(raw) => {
            let target = GitHubOutputTarget::parse(&raw);
            write_github_output(&target, &section).context("Failed to write GitHub output")?;
            eprintln!(
                "Changelog section written to GitHub Actions output as variable '{}'",
                target.variable.cyan()
            );
        }
        None => print!("{section}"),
    }
    Ok(())
}

fn release_notes(args: ChangelogFileArgs) -> Result<()> {
    let notes = changelog::read_release_notes(&args.file)?;
    if notes.is_empty() {
        eprintln!("{}", "No release notes found.".yellow());
    } else {
        println!("{notes}");
    }
    Ok(())
}

fn version(args: ChangelogFileArgs) -> Result<()> {
    match changelog::read_version(&args.file)? {
        Some(version) => println!("{version}"),
        None => bail!(
            "No released version found in {} (is the latest section still unreleased?)",
            args.file.display()
        ),
    }
    Ok(())
}

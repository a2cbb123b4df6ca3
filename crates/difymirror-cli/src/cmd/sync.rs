use crate::output;
use anyhow::Context;
use difymirror_core::config::{Config, WarnLevel};
use difymirror_core::job::{self, RunOptions};
use std::path::Path;
use tracing::warn;

/// `difymirror sync` — one run of the mirror job (the manual trigger).
pub fn run(root: &Path, no_push: bool, dry_run: bool, json: bool) -> anyhow::Result<()> {
    let config = Config::load(root).context("failed to load config")?;

    let warnings = config.validate();
    for w in &warnings {
        warn!("config: {}", w.message);
    }
    if warnings.iter().any(|w| w.level == WarnLevel::Error) {
        anyhow::bail!("invalid config: fix the errors above and re-run");
    }

    let outcome = job::run_once(
        root,
        &config,
        RunOptions {
            push: !no_push,
            dry_run,
        },
    )?;

    if json {
        return output::print_json(&outcome);
    }

    println!(
        "Fetched {} collections, {} plugins ({} packages downloaded, {} already mirrored).",
        outcome.report.collections,
        outcome.report.plugins,
        outcome.report.packages_downloaded,
        outcome.report.packages_skipped
    );
    for failure in &outcome.report.failures {
        println!("  failed: {} ({})", failure.subject, failure.error);
    }

    match &outcome.commit {
        Some(message) if outcome.pushed => println!("Committed and pushed: {message}"),
        Some(message) => println!("Committed: {message}"),
        None if dry_run && !outcome.changed.is_empty() => {
            println!("Dry run: {} file(s) would be committed.", outcome.changed.len());
        }
        None => println!("No changes."),
    }

    Ok(())
}

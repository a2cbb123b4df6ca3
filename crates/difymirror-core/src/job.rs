use crate::config::Config;
use crate::error::Result;
use crate::git::{GitRepo, Identity};
use crate::lock::RunLock;
use crate::market::MarketClient;
use crate::snapshot::{self, SyncReport};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

// ---------------------------------------------------------------------------
// RunOptions / RunOutcome
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy)]
pub struct RunOptions {
    /// Push after committing. Overrides `git.push` from config when false.
    pub push: bool,
    /// Stop after change detection and report what would be committed.
    pub dry_run: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunOutcome {
    pub report: SyncReport,
    /// The change set: uncommitted paths under the two output directories.
    pub changed: Vec<String>,
    /// Subject of the created commit, if one was created.
    pub commit: Option<String>,
    pub pushed: bool,
}

pub fn commit_message(date: NaiveDate) -> String {
    format!("{}: Some plugins have been updated", date.format("%Y-%m-%d"))
}

// ---------------------------------------------------------------------------
// Pipeline
// ---------------------------------------------------------------------------

/// One run of the mirror job: lock → fetch/snapshot → change detection →
/// commit (and optionally push), or no-op when nothing changed.
///
/// Linear with no retries; any failing step aborts the run with no commit
/// and the next trigger retries from scratch. Manual and scheduled triggers
/// both go through this function.
pub fn run_once(root: &Path, config: &Config, options: RunOptions) -> Result<RunOutcome> {
    let _lock = RunLock::acquire(root)?;
    let repo = GitRepo::open(root)?;
    let client = MarketClient::new(&config.marketplace)?;

    let report = snapshot::run(&client, config, root)?;

    let dirs = [
        config.output.collections_dir.as_str(),
        config.output.packages_dir.as_str(),
    ];
    let changed = repo.changed_paths(&dirs)?;

    if changed.is_empty() {
        info!("no changes, skipping commit");
        return Ok(RunOutcome {
            report,
            changed,
            commit: None,
            pushed: false,
        });
    }

    if options.dry_run {
        info!(files = changed.len(), "dry run, skipping commit");
        return Ok(RunOutcome {
            report,
            changed,
            commit: None,
            pushed: false,
        });
    }

    let message = commit_message(chrono::Local::now().date_naive());
    let identity = Identity {
        name: config.git.author_name.clone(),
        email: config.git.author_email.clone(),
    };

    repo.stage(&dirs)?;
    repo.commit(&message, &identity)?;
    info!(%message, files = changed.len(), "committed");

    let pushed = if options.push && config.git.push {
        repo.push()?;
        info!("pushed to origin");
        true
    } else {
        false
    };

    Ok(RunOutcome {
        report,
        changed,
        commit: Some(message),
        pushed,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

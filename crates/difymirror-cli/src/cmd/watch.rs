use difymirror_core::config::Config;
use difymirror_core::job::{self, RunOptions, RunOutcome};
use std::path::Path;
use std::time::Duration;
use tracing::{error, info};

/// `difymirror watch` — run the sync job on a fixed recurrence.
///
/// The scheduled trigger: each tick executes the exact same pipeline as a
/// manual `sync`. A failed tick is logged and the next tick retries from
/// scratch; there is no per-step retry.
pub fn run(root: &Path, every: Duration) -> anyhow::Result<()> {
    info!(interval = ?every, root = %root.display(), "watching marketplace");

    loop {
        match run_tick(root) {
            Ok(outcome) => match &outcome.commit {
                Some(message) => info!(%message, "run committed"),
                None => info!("run finished, no changes"),
            },
            Err(e) => error!(error = %e, "run failed, will retry next tick"),
        }

        std::thread::sleep(every);
    }
}

/// One scheduled run: the same pipeline a manual `sync` executes.
/// Reloads config so edits take effect without restarting the watcher.
fn run_tick(root: &Path) -> anyhow::Result<RunOutcome> {
    let config = Config::load(root)?;
    let outcome = job::run_once(
        root,
        &config,
        RunOptions {
            push: true,
            dry_run: false,
        },
    )?;
    Ok(outcome)
}

/// Parse an interval like `30s`, `15m`, or `6h`.
pub fn parse_interval(s: &str) -> Result<Duration, String> {
    let s = s.trim();
    let (value, per_unit) = if let Some(v) = s.strip_suffix('s') {
        (v, 1)
    } else if let Some(v) = s.strip_suffix('m') {
        (v, 60)
    } else if let Some(v) = s.strip_suffix('h') {
        (v, 3600)
    } else {
        return Err(format!("invalid interval '{s}': use a unit suffix, e.g. 30s, 15m, 6h"));
    };
    let value: u64 = value
        .parse()
        .map_err(|_| format!("invalid interval '{s}': expected e.g. 30s, 15m, 6h"))?;
    if value == 0 {
        return Err("interval must be positive".to_string());
    }
    Ok(Duration::from_secs(value * per_unit))
}

use crate::config::Config;
use crate::error::Result;
use crate::io;
use crate::market::MarketClient;
use crate::paths;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info, warn};

// ---------------------------------------------------------------------------
// SyncReport
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncFailure {
    /// What was being fetched, e.g. "collection 'agent'" or a plugin id.
    pub subject: String,
    pub error: String,
}

/// Outcome of one pass over the marketplace. Per-item failures are recorded
/// here rather than aborting the run; only the initial collections listing
/// is fatal.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SyncReport {
    pub collections: usize,
    pub plugins: usize,
    pub packages_downloaded: usize,
    pub packages_skipped: usize,
    pub failures: Vec<SyncFailure>,
}

impl SyncReport {
    fn fail(&mut self, subject: impl Into<String>, error: impl ToString) {
        let subject = subject.into();
        let error = error.to_string();
        warn!(%subject, %error, "sync step failed");
        self.failures.push(SyncFailure { subject, error });
    }
}

// ---------------------------------------------------------------------------
// Sync pass
// ---------------------------------------------------------------------------

/// Fetch the marketplace state and rewrite the two output directories.
///
/// Writes `collections/index.json`, one `collections/<name>.json` per
/// collection, and any missing `difypkg/<collection>/<id>_<version>.difypkg`
/// bundles. Already-mirrored bundles are never re-downloaded, so an
/// unchanged upstream leaves the working tree untouched.
pub fn run(client: &MarketClient, config: &Config, root: &Path) -> Result<SyncReport> {
    let collections_dir = config.collections_dir(root);
    let packages_dir = config.packages_dir(root);
    let throttle = Duration::from_millis(config.marketplace.throttle_ms);

    let collections = client.collections()?;
    info!(count = collections.len(), "fetched collection list");

    io::write_json(&paths::index_path(&collections_dir), &collections)?;

    let mut report = SyncReport {
        collections: collections.len(),
        ..SyncReport::default()
    };

    for collection in &collections {
        if let Err(e) = paths::validate_name(&collection.name) {
            report.fail(format!("collection '{}'", collection.name), e);
            continue;
        }

        pause(throttle);
        let plugins = match client.collection_plugins(&collection.name) {
            Ok(plugins) => plugins,
            Err(e) => {
                report.fail(format!("collection '{}'", collection.name), e);
                continue;
            }
        };

        io::write_json(
            &paths::collection_path(&collections_dir, &collection.name),
            &plugins,
        )?;
        debug!(collection = %collection.name, plugins = plugins.len(), "collection saved");
        report.plugins += plugins.len();

        for plugin in &plugins {
            let subject = format!("{}@{}", plugin.plugin_id, plugin.latest_version);
            if let Err(e) = paths::validate_name(&plugin.plugin_id)
                .and_then(|_| paths::validate_name(&plugin.latest_version))
            {
                report.fail(subject, e);
                continue;
            }

            let package = paths::package_path(
                &packages_dir,
                &collection.name,
                &plugin.plugin_id,
                &plugin.latest_version,
            );
            if package.exists() {
                debug!(package = %package.display(), "already mirrored");
                report.packages_skipped += 1;
                continue;
            }

            pause(throttle);
            match client.download_package(&plugin.plugin_id, &plugin.latest_version) {
                Ok(bytes) => {
                    io::atomic_write(&package, &bytes)?;
                    info!(package = %package.display(), "package downloaded");
                    report.packages_downloaded += 1;
                }
                Err(e) => report.fail(subject, e),
            }
        }
    }

    Ok(report)
}

fn pause(throttle: Duration) {
    if !throttle.is_zero() {
        std::thread::sleep(throttle);
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

use anyhow::Context;
use difymirror_core::{config::Config, io, paths};
use std::path::Path;

/// `difymirror init` — write the default config and create the two output
/// directories. Idempotent; an existing config is left untouched.
pub fn run(root: &Path) -> anyhow::Result<()> {
    let config_path = paths::config_path(root);
    let config = if config_path.exists() {
        println!("Config already exists: {}", config_path.display());
        Config::load(root).context("failed to load existing config")?
    } else {
        let config = Config::default();
        config.save(root).context("failed to write config")?;
        println!("Created {}", config_path.display());
        config
    };

    io::ensure_dir(&config.collections_dir(root))?;
    io::ensure_dir(&config.packages_dir(root))?;

    // The run lock is per-invocation state, never history.
    io::ensure_gitignore_entry(root, paths::LOCK_FILE)?;

    println!(
        "Mirror ready: {} and {} will be committed on change.",
        config.output.collections_dir, config.output.packages_dir
    );
    if !root.join(".git").is_dir() {
        println!("Note: {} is not a git repository yet; run 'git init' before syncing.", root.display());
    }

    Ok(())
}

use crate::output;
use difymirror_core::config::Config;
use difymirror_core::error::MirrorError;
use difymirror_core::git::GitRepo;
use difymirror_core::paths;
use serde::Serialize;
use std::path::Path;

#[derive(Debug, Serialize)]
struct Status {
    initialized: bool,
    git_repository: bool,
    collections: usize,
    packages: usize,
    /// Subject of the most recent commit, if any.
    last_commit: Option<String>,
    /// Uncommitted paths under the two output directories.
    pending: Vec<String>,
}

/// `difymirror status` — mirror contents and pending change set.
pub fn run(root: &Path, json: bool) -> anyhow::Result<()> {
    let config = match Config::load(root) {
        Ok(config) => config,
        Err(MirrorError::NotInitialized) => {
            let status = Status {
                initialized: false,
                git_repository: root.join(".git").is_dir(),
                collections: 0,
                packages: 0,
                last_commit: None,
                pending: Vec::new(),
            };
            return print(&status, json);
        }
        Err(e) => return Err(e.into()),
    };

    let collections = count_files(&config.collections_dir(root), |name| {
        name.ends_with(".json") && name != paths::INDEX_FILE
    });
    let packages = count_files(&config.packages_dir(root), |name| {
        name.ends_with(".difypkg")
    });

    let (git_repository, last_commit, pending) = match GitRepo::open(root) {
        Ok(repo) => {
            let dirs = [
                config.output.collections_dir.as_str(),
                config.output.packages_dir.as_str(),
            ];
            (true, repo.head_subject()?, repo.changed_paths(&dirs)?)
        }
        Err(MirrorError::NotARepository(_)) => (false, None, Vec::new()),
        Err(e) => return Err(e.into()),
    };

    let status = Status {
        initialized: true,
        git_repository,
        collections,
        packages,
        last_commit,
        pending,
    };
    print(&status, json)
}

fn print(status: &Status, json: bool) -> anyhow::Result<()> {
    if json {
        return output::print_json(status);
    }

    if !status.initialized {
        println!("Not initialized (run 'difymirror init').");
        return Ok(());
    }

    println!("Collections mirrored: {}", status.collections);
    println!("Packages mirrored:    {}", status.packages);
    if let Some(subject) = &status.last_commit {
        println!("Last commit:          {subject}");
    }
    if !status.git_repository {
        println!("Not a git repository; changes cannot be committed.");
    } else if status.pending.is_empty() {
        println!("Working tree clean; next sync commits only if upstream changed.");
    } else {
        println!("Pending changes ({} file(s)):", status.pending.len());
        for path in &status.pending {
            println!("  {path}");
        }
    }

    Ok(())
}

/// Count files under `dir` (recursively) whose name matches `keep`.
fn count_files(dir: &Path, keep: impl Fn(&str) -> bool + Copy) -> usize {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return 0;
    };
    let mut count = 0;
    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            count += count_files(&path, keep);
        } else if path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(keep)
        {
            count += 1;
        }
    }
    count
}

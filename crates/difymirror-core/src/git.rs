use crate::error::{MirrorError, Result};
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::debug;

// ---------------------------------------------------------------------------
// Identity
// ---------------------------------------------------------------------------

/// Fixed author/committer identity for commits created by the mirror job.
#[derive(Debug, Clone)]
pub struct Identity {
    pub name: String,
    pub email: String,
}

// ---------------------------------------------------------------------------
// GitRepo
// ---------------------------------------------------------------------------

/// Thin wrapper over the `git` binary, scoped to one working copy.
#[derive(Debug, Clone)]
pub struct GitRepo {
    root: PathBuf,
}

impl GitRepo {
    pub fn open(root: &Path) -> Result<Self> {
        let repo = Self {
            root: root.to_path_buf(),
        };
        match repo.run(&["rev-parse", "--is-inside-work-tree"]) {
            Ok(out) if out.trim() == "true" => Ok(repo),
            Ok(_) | Err(MirrorError::GitCommand { .. }) => {
                Err(MirrorError::NotARepository(root.display().to_string()))
            }
            Err(e) => Err(e),
        }
    }

    /// Uncommitted paths (modified or untracked) under the given directories.
    /// The change set of one run: a commit is created iff this is non-empty.
    pub fn changed_paths(&self, dirs: &[&str]) -> Result<Vec<String>> {
        // quotePath off: git would otherwise C-quote non-ASCII file names.
        let mut args = vec![
            "-c",
            "core.quotePath=false",
            "status",
            "--porcelain",
            "--untracked-files=all",
            "--",
        ];
        args.extend_from_slice(dirs);
        let stdout = self.run(&args)?;
        let paths = stdout
            .lines()
            .filter(|line| line.len() > 3)
            .map(|line| {
                let path = &line[3..];
                // Rename entries read "old -> new"; the new path is the one
                // that exists in the working tree.
                match path.rsplit_once(" -> ") {
                    Some((_, new)) => new.to_string(),
                    None => path.to_string(),
                }
            })
            .collect();
        Ok(paths)
    }

    /// Stage everything under the given directories.
    pub fn stage(&self, dirs: &[&str]) -> Result<()> {
        let mut args = vec!["add", "--all", "--"];
        args.extend_from_slice(dirs);
        self.run(&args)?;
        Ok(())
    }

    /// Create a commit authored by the automation identity.
    pub fn commit(&self, message: &str, identity: &Identity) -> Result<()> {
        let name = format!("user.name={}", identity.name);
        let email = format!("user.email={}", identity.email);
        self.run(&["-c", &name, "-c", &email, "commit", "-m", message])?;
        Ok(())
    }

    /// Push the current branch to `origin`.
    pub fn push(&self) -> Result<()> {
        self.run(&["push", "origin", "HEAD"])?;
        Ok(())
    }

    /// Subject line of the latest commit, if any commit exists.
    pub fn head_subject(&self) -> Result<Option<String>> {
        match self.run(&["log", "-1", "--pretty=%s"]) {
            Ok(out) => Ok(Some(out.trim().to_string())),
            // An empty repository has no HEAD yet.
            Err(MirrorError::GitCommand { .. }) => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn run(&self, args: &[&str]) -> Result<String> {
        let command = format!("git {}", args.join(" "));
        debug!(%command, "running");
        let output = Command::new("git")
            .args(args)
            .current_dir(&self.root)
            .output()
            .map_err(|source| MirrorError::GitSpawn {
                command: command.clone(),
                source,
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            let stderr = if stderr.is_empty() {
                String::from_utf8_lossy(&output.stdout).trim().to_string()
            } else {
                stderr
            };
            return Err(MirrorError::GitCommand {
                command,
                code: output.status.code(),
                stderr,
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

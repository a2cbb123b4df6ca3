use thiserror::Error;

#[derive(Debug, Error)]
pub enum MirrorError {
    #[error("not initialized: run 'difymirror init'")]
    NotInitialized,

    #[error("not a git repository: {0}")]
    NotARepository(String),

    #[error("marketplace request to {url} failed with status {status}: {body}")]
    Api {
        url: String,
        status: u16,
        body: String,
    },

    #[error("invalid marketplace name '{0}': must be alphanumeric with '.', '_', '-' or '/'")]
    InvalidName(String),

    #[error("another run holds the lock at {path} (pid {pid})")]
    LockHeld { path: String, pid: String },

    #[error("`{command}` failed with code {code:?}: {stderr}")]
    GitCommand {
        command: String,
        code: Option<i32>,
        stderr: String,
    },

    #[error("failed to spawn `{command}`: {source}")]
    GitSpawn {
        command: String,
        source: std::io::Error,
    },

    #[error(transparent)]
    Http(#[from] reqwest::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, MirrorError>;

use crate::error::{MirrorError, Result};
use crate::paths;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// ConfigWarning / WarnLevel
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigWarning {
    pub level: WarnLevel,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarnLevel {
    Warning,
    Error,
}

// ---------------------------------------------------------------------------
// MarketplaceConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketplaceConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Collections fetched per listing request.
    #[serde(default = "default_page_size")]
    pub page_size: u32,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Pause between consecutive marketplace requests.
    #[serde(default = "default_throttle_ms")]
    pub throttle_ms: u64,
}

fn default_base_url() -> String {
    "https://marketplace.dify.ai".to_string()
}

fn default_page_size() -> u32 {
    100
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_throttle_ms() -> u64 {
    1000
}

impl Default for MarketplaceConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            page_size: default_page_size(),
            timeout_secs: default_timeout_secs(),
            throttle_ms: default_throttle_ms(),
        }
    }
}

// ---------------------------------------------------------------------------
// OutputConfig
// ---------------------------------------------------------------------------

/// The two tracked output directories, relative to the mirror root.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "default_collections_dir")]
    pub collections_dir: String,
    #[serde(default = "default_packages_dir")]
    pub packages_dir: String,
}

fn default_collections_dir() -> String {
    "collections".to_string()
}

fn default_packages_dir() -> String {
    "difypkg".to_string()
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            collections_dir: default_collections_dir(),
            packages_dir: default_packages_dir(),
        }
    }
}

// ---------------------------------------------------------------------------
// GitConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitConfig {
    /// Automation identity used as commit author.
    #[serde(default = "default_author_name")]
    pub author_name: String,
    #[serde(default = "default_author_email")]
    pub author_email: String,
    /// Push after committing.
    #[serde(default = "default_push")]
    pub push: bool,
}

fn default_author_name() -> String {
    "difymirror-bot".to_string()
}

fn default_author_email() -> String {
    "difymirror-bot@users.noreply.github.com".to_string()
}

fn default_push() -> bool {
    true
}

impl Default for GitConfig {
    fn default() -> Self {
        Self {
            author_name: default_author_name(),
            author_email: default_author_email(),
            push: default_push(),
        }
    }
}

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub marketplace: MarketplaceConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub git: GitConfig,
}

impl Config {
    pub fn load(root: &Path) -> Result<Self> {
        let path = paths::config_path(root);
        if !path.exists() {
            return Err(MirrorError::NotInitialized);
        }
        let data = std::fs::read_to_string(&path)?;
        let cfg: Config = serde_yaml::from_str(&data)?;
        Ok(cfg)
    }

    pub fn save(&self, root: &Path) -> Result<()> {
        let path = paths::config_path(root);
        let data = serde_yaml::to_string(self)?;
        crate::io::atomic_write(&path, data.as_bytes())
    }

    pub fn collections_dir(&self, root: &Path) -> PathBuf {
        root.join(&self.output.collections_dir)
    }

    pub fn packages_dir(&self, root: &Path) -> PathBuf {
        root.join(&self.output.packages_dir)
    }

    // -----------------------------------------------------------------------
    // Validation
    // -----------------------------------------------------------------------

    pub fn validate(&self) -> Vec<ConfigWarning> {
        let mut warnings = Vec::new();

        if !self.marketplace.base_url.starts_with("http://")
            && !self.marketplace.base_url.starts_with("https://")
        {
            warnings.push(ConfigWarning {
                level: WarnLevel::Error,
                message: format!(
                    "marketplace.base_url '{}' is not an http(s) URL",
                    self.marketplace.base_url
                ),
            });
        }

        if self.marketplace.page_size == 0 {
            warnings.push(ConfigWarning {
                level: WarnLevel::Error,
                message: "marketplace.page_size must be at least 1".to_string(),
            });
        }

        if self.marketplace.timeout_secs == 0 {
            warnings.push(ConfigWarning {
                level: WarnLevel::Error,
                message: "marketplace.timeout_secs must be at least 1".to_string(),
            });
        }

        if self.marketplace.throttle_ms > 60_000 {
            warnings.push(ConfigWarning {
                level: WarnLevel::Warning,
                message: format!(
                    "marketplace.throttle_ms={} (>60s between requests is unusual)",
                    self.marketplace.throttle_ms
                ),
            });
        }

        for (key, dir) in [
            ("output.collections_dir", &self.output.collections_dir),
            ("output.packages_dir", &self.output.packages_dir),
        ] {
            if dir.trim().is_empty() || dir.starts_with('/') || dir.contains("..") {
                warnings.push(ConfigWarning {
                    level: WarnLevel::Error,
                    message: format!("{key} '{dir}' must be a relative path inside the mirror"),
                });
            }
        }

        if self.output.collections_dir == self.output.packages_dir {
            warnings.push(ConfigWarning {
                level: WarnLevel::Error,
                message: "output.collections_dir and output.packages_dir must differ".to_string(),
            });
        }

        if self.git.author_name.trim().is_empty() || self.git.author_email.trim().is_empty() {
            warnings.push(ConfigWarning {
                level: WarnLevel::Error,
                message: "git.author_name and git.author_email must be non-empty".to_string(),
            });
        }

        warnings
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

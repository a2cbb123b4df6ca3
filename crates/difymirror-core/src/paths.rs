use crate::error::{MirrorError, Result};
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

// ---------------------------------------------------------------------------
// Directory constants
// ---------------------------------------------------------------------------

pub const MIRROR_DIR: &str = ".difymirror";
pub const CONFIG_FILE: &str = ".difymirror/config.yaml";
pub const LOCK_FILE: &str = ".difymirror/run.lock";

/// Index of all collections, kept inside the collections directory so the
/// commit stays scoped to the two tracked directories.
pub const INDEX_FILE: &str = "index.json";

pub fn mirror_dir(root: &Path) -> PathBuf {
    root.join(MIRROR_DIR)
}

pub fn config_path(root: &Path) -> PathBuf {
    root.join(CONFIG_FILE)
}

pub fn lock_path(root: &Path) -> PathBuf {
    root.join(LOCK_FILE)
}

pub fn index_path(collections_dir: &Path) -> PathBuf {
    collections_dir.join(INDEX_FILE)
}

pub fn collection_path(collections_dir: &Path, name: &str) -> PathBuf {
    collections_dir.join(format!("{name}.json"))
}

/// Package file for one plugin version: `<plugin_id with '/'→'_'>_<version>.difypkg`.
pub fn package_path(
    packages_dir: &Path,
    collection: &str,
    plugin_id: &str,
    version: &str,
) -> PathBuf {
    let flat_id = plugin_id.replace('/', "_");
    packages_dir
        .join(collection)
        .join(format!("{flat_id}_{version}.difypkg"))
}

// ---------------------------------------------------------------------------
// Name validation
// ---------------------------------------------------------------------------

// Collection names, plugin ids ("org/plugin"), and versions all come from the
// marketplace API and end up in filesystem paths, so they are validated
// before any path is built from them.

static NAME_RE: OnceLock<Regex> = OnceLock::new();

fn name_re() -> &'static Regex {
    NAME_RE.get_or_init(|| Regex::new(r"^[A-Za-z0-9][A-Za-z0-9._\-]*(/[A-Za-z0-9][A-Za-z0-9._\-]*)?$").unwrap())
}

pub fn validate_name(name: &str) -> Result<()> {
    if name.is_empty() || name.len() > 128 || name.contains("..") || !name_re().is_match(name) {
        return Err(MirrorError::InvalidName(name.to_string()));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_names() {
        for name in ["agent", "langgenius/openai", "model-providers", "a.b_c", "0.0.3"] {
            validate_name(name).unwrap_or_else(|_| panic!("expected valid: {name}"));
        }
    }

    #[test]
    fn invalid_names() {
        for name in [
            "",
            "../etc",
            "a/../b",
            "/rooted",
            "trailing/",
            "has space",
            "two/deep/segments",
            ".hidden",
        ] {
            assert!(validate_name(name).is_err(), "expected invalid: {name}");
        }
    }

    #[test]
    fn package_path_flattens_plugin_id() {
        let p = package_path(Path::new("difypkg"), "agent", "langgenius/openai", "0.2.1");
        assert_eq!(p, PathBuf::from("difypkg/agent/langgenius_openai_0.2.1.difypkg"));
    }

    #[test]
    fn path_helpers() {
        let root = Path::new("/tmp/mirror");
        assert_eq!(
            config_path(root),
            PathBuf::from("/tmp/mirror/.difymirror/config.yaml")
        );
        assert_eq!(
            collection_path(Path::new("collections"), "agent"),
            PathBuf::from("collections/agent.json")
        );
    }
}

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn difymirror(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("difymirror").unwrap();
    cmd.current_dir(dir.path()).env("DIFYMIRROR_ROOT", dir.path());
    cmd
}

fn git(dir: &TempDir, args: &[&str]) -> String {
    let output = std::process::Command::new("git")
        .args(args)
        .current_dir(dir.path())
        .output()
        .expect("git should run");
    assert!(output.status.success(), "git {args:?} failed");
    String::from_utf8_lossy(&output.stdout).into_owned()
}

/// Point the mirror at a mock marketplace and disable pushing.
fn write_test_config(dir: &TempDir, base_url: &str) {
    std::fs::write(
        dir.path().join(".difymirror/config.yaml"),
        format!(
            "marketplace:\n  base_url: {base_url}\n  throttle_ms: 0\ngit:\n  push: false\n"
        ),
    )
    .unwrap();
}

fn mock_marketplace(server: &mut mockito::ServerGuard) {
    server
        .mock("GET", "/api/v1/collections")
        .match_query(mockito::Matcher::Any)
        .with_body(r#"{"data": {"collections": [{"name": "agent"}]}}"#)
        .create();
    server
        .mock("POST", "/api/v1/collections/agent/plugins")
        .with_body(
            r#"{"data": {"plugins": [
                {"plugin_id": "langgenius/openai", "latest_version": "0.2.1"}
            ]}}"#,
        )
        .create();
    server
        .mock("GET", "/api/v1/plugins/langgenius/openai/0.2.1/download")
        .with_body("difypkg-bytes")
        .create();
}

// ---------------------------------------------------------------------------
// difymirror init
// ---------------------------------------------------------------------------

#[test]
fn init_creates_mirror_layout() {
    let dir = TempDir::new().unwrap();
    difymirror(&dir).arg("init").assert().success();

    assert!(dir.path().join(".difymirror/config.yaml").exists());
    assert!(dir.path().join("collections").is_dir());
    assert!(dir.path().join("difypkg").is_dir());

    let gitignore = std::fs::read_to_string(dir.path().join(".gitignore")).unwrap();
    assert!(gitignore.lines().any(|l| l == ".difymirror/run.lock"));
}

#[test]
fn init_preserves_existing_config() {
    let dir = TempDir::new().unwrap();
    difymirror(&dir).arg("init").assert().success();
    std::fs::write(
        dir.path().join(".difymirror/config.yaml"),
        "marketplace:\n  page_size: 25\n",
    )
    .unwrap();

    difymirror(&dir).arg("init").assert().success();
    let config = std::fs::read_to_string(dir.path().join(".difymirror/config.yaml")).unwrap();
    assert!(config.contains("page_size: 25"));
}

// ---------------------------------------------------------------------------
// difymirror status
// ---------------------------------------------------------------------------

#[test]
fn status_reports_uninitialized() {
    let dir = TempDir::new().unwrap();
    difymirror(&dir)
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("Not initialized"));
}

#[test]
fn status_json_on_fresh_mirror() {
    let dir = TempDir::new().unwrap();
    difymirror(&dir).arg("init").assert().success();

    let output = difymirror(&dir).args(["status", "--json"]).output().unwrap();
    let status: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(status["initialized"], true);
    assert_eq!(status["collections"], 0);
    assert_eq!(status["packages"], 0);
}

// ---------------------------------------------------------------------------
// difymirror sync
// ---------------------------------------------------------------------------

#[test]
fn sync_without_init_fails() {
    let dir = TempDir::new().unwrap();
    difymirror(&dir)
        .arg("sync")
        .assert()
        .failure()
        .stderr(predicate::str::contains("not initialized"));
}

#[test]
fn sync_commits_once_then_noops() {
    let mut server = mockito::Server::new();
    mock_marketplace(&mut server);

    let dir = TempDir::new().unwrap();
    git(&dir, &["init", "--quiet"]);
    difymirror(&dir).arg("init").assert().success();
    write_test_config(&dir, &server.url());

    difymirror(&dir)
        .arg("sync")
        .assert()
        .success()
        .stdout(predicate::str::contains("Committed:"));

    assert!(dir.path().join("collections/index.json").exists());
    assert!(dir.path().join("collections/agent.json").exists());
    assert!(dir
        .path()
        .join("difypkg/agent/langgenius_openai_0.2.1.difypkg")
        .exists());

    let subject = git(&dir, &["log", "-1", "--pretty=%s"]);
    assert!(
        subject.trim().ends_with(": Some plugins have been updated"),
        "unexpected subject: {subject}"
    );
    // Date prefix is YYYY-MM-DD.
    assert_eq!(subject.as_bytes()[4], b'-');
    assert_eq!(subject.as_bytes()[7], b'-');

    // The commit contains only the two tracked directories.
    let files = git(&dir, &["show", "--name-only", "--pretty=format:", "HEAD"]);
    for file in files.lines().filter(|l| !l.is_empty()) {
        assert!(
            file.starts_with("collections/") || file.starts_with("difypkg/"),
            "unexpected file in commit: {file}"
        );
    }

    // Unchanged upstream: second run is a no-op.
    difymirror(&dir)
        .arg("sync")
        .assert()
        .success()
        .stdout(predicate::str::contains("No changes."));
    let count = git(&dir, &["rev-list", "--all", "--count"]);
    assert_eq!(count.trim(), "1");

    // Status reflects the commit and a clean tree.
    let output = difymirror(&dir).args(["status", "--json"]).output().unwrap();
    let status: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert!(status["last_commit"]
        .as_str()
        .unwrap()
        .ends_with(": Some plugins have been updated"));
    assert_eq!(status["pending"].as_array().unwrap().len(), 0);
    assert_eq!(status["collections"], 1);
    assert_eq!(status["packages"], 1);
}

#[test]
fn sync_dry_run_does_not_commit() {
    let mut server = mockito::Server::new();
    mock_marketplace(&mut server);

    let dir = TempDir::new().unwrap();
    git(&dir, &["init", "--quiet"]);
    difymirror(&dir).arg("init").assert().success();
    write_test_config(&dir, &server.url());

    difymirror(&dir)
        .args(["sync", "--dry-run"])
        .assert()
        .success()
        .stdout(predicate::str::contains("would be committed"));

    let count = git(&dir, &["rev-list", "--all", "--count"]);
    assert_eq!(count.trim(), "0");
}

#[test]
fn sync_failure_leaves_no_commit() {
    let mut server = mockito::Server::new();
    server
        .mock("GET", "/api/v1/collections")
        .match_query(mockito::Matcher::Any)
        .with_status(500)
        .create();

    let dir = TempDir::new().unwrap();
    git(&dir, &["init", "--quiet"]);
    difymirror(&dir).arg("init").assert().success();
    write_test_config(&dir, &server.url());

    difymirror(&dir).arg("sync").assert().failure();
    let count = git(&dir, &["rev-list", "--all", "--count"]);
    assert_eq!(count.trim(), "0");
}

#[test]
fn sync_rejects_invalid_config() {
    let dir = TempDir::new().unwrap();
    difymirror(&dir).arg("init").assert().success();
    std::fs::write(
        dir.path().join(".difymirror/config.yaml"),
        "marketplace:\n  base_url: ftp://example.com\n",
    )
    .unwrap();

    difymirror(&dir)
        .arg("sync")
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid config"));
}

// ---------------------------------------------------------------------------
// difymirror watch
// ---------------------------------------------------------------------------

#[test]
fn watch_rejects_bad_interval() {
    let dir = TempDir::new().unwrap();
    difymirror(&dir)
        .args(["watch", "--every", "5d"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid interval"));
}

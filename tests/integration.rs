use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

fn startit_binary() -> PathBuf {
    let mut path = std::env::current_exe().unwrap();
    path.pop(); // remove test binary name
    path.pop(); // remove deps/
    path.push("startit");
    path
}

fn fixture_path() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/listing_python.html")
}

fn setup_test_env() -> (TempDir, PathBuf) {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path().to_path_buf();

    let config_dir = root.join("config");
    fs::create_dir_all(&config_dir).unwrap();

    let config_content = format!(
        r#"[db]
path = "{}/data/startit.sqlite"

[scrape]
url = "https://startit.rs/poslovi/pretraga/python/"

[fetch]
timeout_secs = 5
"#,
        root.display()
    );

    let config_path = config_dir.join("startit.toml");
    fs::write(&config_path, config_content).unwrap();

    (tmp, config_path)
}

fn run_startit(config_path: &Path, args: &[&str]) -> (String, String, bool) {
    let binary = startit_binary();
    let output = Command::new(&binary)
        .arg("--config")
        .arg(config_path.to_str().unwrap())
        .args(args)
        .output()
        .unwrap_or_else(|e| panic!("Failed to run startit binary at {:?}: {}", binary, e));

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let success = output.status.success();
    (stdout, stderr, success)
}

#[test]
fn test_init_creates_database() {
    let (tmp, config_path) = setup_test_env();

    let (stdout, stderr, success) = run_startit(&config_path, &["init"]);
    assert!(success, "init failed: stdout={}, stderr={}", stdout, stderr);
    assert!(stdout.contains("initialized"));
    assert!(tmp.path().join("data/startit.sqlite").exists());
}

#[test]
fn test_init_idempotent() {
    let (_tmp, config_path) = setup_test_env();

    let (_, _, success1) = run_startit(&config_path, &["init"]);
    assert!(success1, "First init failed");

    let (_, _, success2) = run_startit(&config_path, &["init"]);
    assert!(success2, "Second init failed (not idempotent)");
}

#[test]
fn test_extract_fixture() {
    // extract does not need a config file
    let missing = Path::new("/nonexistent/startit.toml");
    let fixture = fixture_path();
    let (stdout, stderr, success) = run_startit(missing, &["extract", fixture.to_str().unwrap()]);
    assert!(success, "extract failed: stdout={}, stderr={}", stdout, stderr);
    assert!(stdout.contains("4 postings"));
    assert!(stdout.contains("[0] Senior Python Developer"));
    assert!(stdout.contains("tags:    .net, chrarp, node.js, python"));
    assert!(stdout.contains("[3] Junior Data Engineer"));
}

#[test]
fn test_extract_json() {
    let (_tmp, config_path) = setup_test_env();
    let fixture = fixture_path();
    let (stdout, _, success) = run_startit(
        &config_path,
        &["extract", fixture.to_str().unwrap(), "--json"],
    );
    assert!(success);

    let parsed: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    let jobs = parsed.as_array().unwrap();
    assert_eq!(jobs.len(), 4);
    assert_eq!(jobs[2]["company_title"], "Gamma & Co");
    assert_eq!(jobs[3]["tags"], serde_json::json!(["python", "sql"]));
}

#[test]
fn test_extract_malformed_page_fails() {
    let (tmp, config_path) = setup_test_env();
    let page = tmp.path().join("broken.html");
    fs::write(
        &page,
        r#"<html><body><div class="oglas-mini"><h1><a href="/x/">X</a></h1>
           <div>XCo</div><div class="oglas-mini-tagovi"><small>rust</small></div>
           </div></body></html>"#,
    )
    .unwrap();

    let (_, stderr, success) = run_startit(&config_path, &["extract", page.to_str().unwrap()]);
    assert!(!success);
    assert!(stderr.contains("mini posting #0: missing tag link"));
}

#[test]
fn test_scrape_rejects_invalid_link() {
    let (tmp, config_path) = setup_test_env();

    let (_, stderr, success) = run_startit(
        &config_path,
        &["scrape", "https://startit.rs/poslovi/pretraga/python/qa/"],
    );
    assert!(!success);
    assert!(stderr.contains("invalid link"));
    // Nothing is created for a rejected link
    assert!(!tmp.path().join("data/startit.sqlite").exists());
}

#[test]
fn test_scrape_rejects_bad_recipient() {
    let (tmp, config_path) = setup_test_env();
    let mut content = fs::read_to_string(&config_path).unwrap();
    content.push_str(
        r#"
[notify]
to = "me@example.com"
from = "spider@example.com"
"#,
    );
    fs::write(&config_path, content).unwrap();

    let (_, stderr, success) = run_startit(&config_path, &["scrape", "--to", "not-an-address"]);
    assert!(!success);
    assert!(stderr.contains("invalid recipient address"));
    assert!(!tmp.path().join("data/startit.sqlite").exists());
}

#[test]
fn test_jobs_empty_database() {
    let (_tmp, config_path) = setup_test_env();

    run_startit(&config_path, &["init"]);
    let (stdout, stderr, success) = run_startit(&config_path, &["jobs", "--all"]);
    assert!(success, "jobs failed: stdout={}, stderr={}", stdout, stderr);
    assert!(stdout.contains("0 jobs"));
}

#[test]
fn test_missing_config_fails() {
    let missing = Path::new("/nonexistent/startit.toml");
    let (_, stderr, success) = run_startit(missing, &["jobs"]);
    assert!(!success);
    assert!(stderr.contains("Failed to read config file"));
}

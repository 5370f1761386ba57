#![allow(dead_code)]

use assert_cmd::Command;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Test harness for running CLI commands against a temporary database
pub struct CliTestHarness {
    temp_dir: TempDir,
    db_path: PathBuf,
}

impl CliTestHarness {
    /// Create a new test harness with a temporary database
    pub fn new() -> Self {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp directory");
        let db_path = temp_dir.path().join("test.db");

        Self { temp_dir, db_path }
    }

    /// Get a Command instance configured for testing
    pub fn command(&self) -> Command {
        let mut cmd = Command::cargo_bin("smartflow").expect("Failed to find smartflow binary");

        // Run inside the temp dir so no stray config.toml is picked up
        cmd.current_dir(self.temp_dir.path());
        cmd.env("SMARTFLOW_DATABASE_PATH", &self.db_path);
        cmd.env("SMARTFLOW_DISPLAY_TIMEZONE", "UTC");
        cmd.env("SMARTFLOW_LEGACY_TIMEZONE", "UTC");
        cmd.env("SMARTFLOW_NOTIFICATIONS__PERMISSION", "denied");
        // Nothing listens on the discard port, so the network is always down
        cmd.env("SMARTFLOW_CACHE__ORIGIN", "http://127.0.0.1:9");
        cmd.env_remove("RUST_LOG");

        cmd
    }

    pub fn db_path(&self) -> &Path {
        &self.db_path
    }

    pub fn dir(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Helper to run a command and assert success
    pub fn run_success(&self, args: &[&str]) -> assert_cmd::assert::Assert {
        self.command().args(args).assert().success()
    }

    /// Helper to run a command and assert failure
    pub fn run_failure(&self, args: &[&str]) -> assert_cmd::assert::Assert {
        self.command().args(args).assert().failure()
    }

    /// Current tasks, read back through `export --format json`
    pub fn tasks(&self) -> Vec<serde_json::Value> {
        let output = self
            .command()
            .args(["export", "--format", "json"])
            .output()
            .expect("Failed to run export");
        if !output.status.success() {
            return Vec::new();
        }
        serde_json::from_slice(&output.stdout).expect("export emits a JSON array")
    }

    pub fn task_ids(&self) -> Vec<String> {
        self.tasks()
            .iter()
            .map(|t| t["id"].as_str().expect("id is a string").to_string())
            .collect()
    }
}

/// Common test fixtures
pub struct TestFixtures;

impl TestFixtures {
    /// A due date comfortably in the future
    pub const FUTURE: &'static str = "2099-06-01T09:00:00Z";

    pub fn sample_task_args(text: &str) -> Vec<&str> {
        vec!["add", text, "--due", Self::FUTURE]
    }
}

/// Utility functions for test assertions
pub mod assertions {
    use predicates::prelude::*;

    /// Predicate to check if output contains task table headers
    pub fn has_task_table_headers() -> impl Predicate<str> {
        predicate::str::contains("ID")
            .and(predicate::str::contains("Task"))
            .and(predicate::str::contains("Status"))
    }

    pub fn task_created_successfully() -> impl Predicate<str> {
        predicate::str::contains("Created task").or(predicate::str::contains("Created recurring task"))
    }

    pub fn empty_result() -> impl Predicate<str> {
        predicate::str::contains("No tasks found")
    }

    pub fn has_error() -> impl Predicate<str> {
        predicate::str::contains("Error").or(predicate::str::contains("error"))
    }
}

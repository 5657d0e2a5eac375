use assert_cmd::Command;
use std::path::PathBuf;
use tempfile::TempDir;

/// Test harness for running CLI commands with temporary databases
pub struct CliTestHarness {
    _temp_dir: TempDir,
    db_path: PathBuf,
}

impl CliTestHarness {
    /// Create a new test harness with a temporary database
    pub fn new() -> Self {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp directory");
        let db_path = temp_dir.path().join("test.db");

        Self {
            _temp_dir: temp_dir,
            db_path,
        }
    }

    /// Get a Command instance configured for testing
    pub fn command(&self) -> Command {
        let mut cmd = Command::cargo_bin("reserva").expect("Failed to find reserva binary");

        // Point the binary at the temporary database
        cmd.env("RESERVA_DATABASE_PATH", &self.db_path);
        cmd.env("RESERVA_DEFAULT_TIMEZONE", "UTC");

        cmd
    }

    /// Helper to run a command and assert success
    pub fn run_success(&self, args: &[&str]) -> assert_cmd::assert::Assert {
        self.command().args(args).assert().success()
    }

    /// Helper to run a command and assert failure
    pub fn run_failure(&self, args: &[&str]) -> assert_cmd::assert::Assert {
        self.command().args(args).assert().failure()
    }

    /// Seed a service and a staff member most booking tests need
    pub fn seed_catalog(&self) {
        self.run_success(&[
            "service", "add", "Coaching", "--duration", "60", "--price", "9000",
        ]);
        self.run_success(&[
            "staff",
            "add",
            "Grace Hopper",
            "--email",
            "grace@example.com",
            "--timezone",
            "UTC",
        ]);
    }
}

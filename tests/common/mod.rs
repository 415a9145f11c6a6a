#![allow(dead_code)]

use std::fs;
use std::path::PathBuf;
use std::process::{Command, Output};

use serde_json::Value;
use tempfile::TempDir;

pub const FIXTURE: &str = "desk.json";

/// Runs the projectdesk binary in an isolated temp directory against a
/// JSON fixture instead of a live backend
pub struct DeskTest {
    pub temp_dir: TempDir,
    binary_path: PathBuf,
}

impl DeskTest {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        DeskTest {
            temp_dir,
            binary_path: PathBuf::from(env!("CARGO_BIN_EXE_projectdesk")),
        }
    }

    /// A desk whose fixture holds a few projects, users and allocations
    pub fn with_sample_data() -> Self {
        let desk = Self::new();
        desk.write_fixture(&sample_data());
        desk
    }

    pub fn fixture_path(&self) -> PathBuf {
        self.temp_dir.path().join(FIXTURE)
    }

    pub fn write_fixture(&self, data: &Value) {
        let content = serde_json::to_string_pretty(data).expect("Failed to encode fixture");
        fs::write(self.fixture_path(), content).expect("Failed to write fixture");
    }

    pub fn read_fixture(&self) -> Value {
        let content = fs::read_to_string(self.fixture_path()).expect("Failed to read fixture");
        serde_json::from_str(&content).expect("Fixture is not valid JSON")
    }

    /// Records of one resource as currently stored in the fixture
    pub fn collection(&self, resource: &str) -> Vec<Value> {
        match &self.read_fixture()[resource] {
            Value::Array(items) => items.clone(),
            Value::Object(envelope) => envelope
                .get("data")
                .and_then(Value::as_array)
                .cloned()
                .unwrap_or_default(),
            _ => Vec::new(),
        }
    }

    /// Run a command without the fixture flag
    pub fn run_raw(&self, args: &[&str]) -> Output {
        Command::new(&self.binary_path)
            .args(args)
            .current_dir(self.temp_dir.path())
            .env_remove("PROJECTDESK_ROOT")
            .env_remove("PROJECTDESK_API_URL")
            .env_remove("PROJECTDESK_TOKEN")
            .env("NO_COLOR", "1")
            .output()
            .expect("Failed to execute projectdesk command")
    }

    /// Run a command against the fixture file
    pub fn run(&self, args: &[&str]) -> Output {
        let mut full = vec!["--fixture", FIXTURE];
        full.extend_from_slice(args);
        self.run_raw(&full)
    }

    pub fn run_success(&self, args: &[&str]) -> String {
        let output = self.run(args);
        expect_success(args, &output)
    }

    pub fn run_failure(&self, args: &[&str]) -> String {
        let output = self.run(args);
        expect_failure(args, &output)
    }

    pub fn run_json(&self, args: &[&str]) -> Value {
        let mut full = args.to_vec();
        full.push("--json");
        let output = self.run_success(&full);
        serde_json::from_str(&output).expect("Command output is not valid JSON")
    }
}

pub fn expect_success(args: &[&str], output: &Output) -> String {
    if !output.status.success() {
        panic!(
            "Command {:?} failed with status {:?}\nstdout: {}\nstderr: {}",
            args,
            output.status,
            String::from_utf8_lossy(&output.stdout),
            String::from_utf8_lossy(&output.stderr)
        );
    }
    String::from_utf8_lossy(&output.stdout).to_string()
}

pub fn expect_failure(args: &[&str], output: &Output) -> String {
    assert!(
        !output.status.success(),
        "Expected command {:?} to fail, but it succeeded",
        args
    );
    String::from_utf8_lossy(&output.stderr).to_string()
}

pub fn sample_data() -> Value {
    serde_json::json!({
        "projects": {
            "data": [
                {
                    "id": 1,
                    "project_code": "PRJ-001",
                    "name": "Jembatan Cikapundung",
                    "client": "PT Maju Jaya",
                    "start_date": "2024-02-01",
                    "contract_value": 1500000,
                    "progress": 40,
                    "status": "O"
                },
                {
                    "id": 2,
                    "project_code": "PRJ-002",
                    "name": "Gudang Cikarang",
                    "client": "CV Sentosa",
                    "start_date": "2023-11-15",
                    "contract_value": 820000,
                    "progress": 100,
                    "status": "A"
                },
                {
                    "id": 3,
                    "project_code": "PRJ-003",
                    "name": "Kantor Cabang",
                    "client": "PT Maju Jaya",
                    "start_date": null,
                    "contract_value": null,
                    "progress": null,
                    "status": "D"
                }
            ],
            "availableYears": [2023, 2024]
        },
        "users": [
            {"id": 1, "name": "Siti", "email": "siti@example.com", "role": "admin", "active": 1},
            {"id": 2, "name": "Budi", "email": "budi@example.com", "role": "staff", "active": 0}
        ],
        "man-power": [
            {"project_id": 1, "user_id": 1, "user_name": "Siti", "role": "Engineer", "allocation": 50},
            {"project_id": 1, "user_id": 2, "user_name": "Budi", "role": "Foreman", "allocation": 100}
        ]
    })
}

use brecha::clock::FixedClock;
use brecha::config::{default_config_content, Config};
use brecha::engine::Engine;
use brecha::repository::FileProjectRepository;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

use super::builders::date;

/// TestHarness provides an isolated brecha workspace.
/// Each harness creates a temporary directory with .brecha/projects/,
/// .brecha/.locks/ and .brecha/config.md.
pub struct TestHarness {
    pub dir: TempDir,
    pub projects_dir: PathBuf,
    pub locks_dir: PathBuf,
    pub config_path: PathBuf,
    pub brecha_binary: PathBuf,
}

impl TestHarness {
    pub fn new() -> Self {
        Self::with_config(&default_config_content("Test Org"))
    }

    /// Creates a harness with custom config content.
    pub fn with_config(config_content: &str) -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let base_path = temp_dir.path();

        let projects_dir = base_path.join(".brecha/projects");
        let locks_dir = base_path.join(".brecha/.locks");
        let config_path = base_path.join(".brecha/config.md");

        fs::create_dir_all(&projects_dir).expect("Failed to create projects dir");
        fs::create_dir_all(&locks_dir).expect("Failed to create locks dir");
        fs::write(&config_path, config_content).expect("Failed to write config");

        TestHarness {
            dir: temp_dir,
            projects_dir,
            locks_dir,
            config_path,
            brecha_binary: PathBuf::from(env!("CARGO_BIN_EXE_brecha")),
        }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Engine over this workspace's files, clock pinned to 2026-02-01.
    pub fn engine(&self) -> Engine<FileProjectRepository> {
        let config = Config::load_from(&self.config_path).expect("Failed to load config");
        Engine::with_clock(
            FileProjectRepository::new(self.projects_dir.clone(), self.locks_dir.clone()),
            config,
            FixedClock::on(date(2026, 2, 1)),
        )
    }

    /// Executes the brecha binary in the harness directory.
    ///
    /// HOME points into the temp dir so no global config leaks in.
    pub fn run(&self, args: &[&str]) -> Output {
        Command::new(&self.brecha_binary)
            .args(args)
            .current_dir(self.path())
            .env("HOME", self.path())
            .env("XDG_CONFIG_HOME", self.path().join(".config"))
            .env_remove("BRECHA_LOG")
            .output()
            .expect("Failed to run brecha")
    }

    /// Runs with `--json` and parses the envelope.
    pub fn run_json(&self, args: &[&str]) -> (bool, Value) {
        let mut full = vec!["--json"];
        full.extend_from_slice(args);
        let output = self.run(&full);
        let stdout = String::from_utf8_lossy(&output.stdout);
        let envelope: Value = serde_json::from_str(&stdout)
            .unwrap_or_else(|e| panic!("stdout is not a JSON envelope ({}): {}", e, stdout));
        (output.status.success(), envelope)
    }

    pub fn project_files(&self) -> Vec<PathBuf> {
        let mut files: Vec<PathBuf> = fs::read_dir(&self.projects_dir)
            .expect("Failed to read projects dir")
            .filter_map(|e| e.ok().map(|e| e.path()))
            .filter(|p| p.extension().is_some_and(|ext| ext == "md"))
            .collect();
        files.sort();
        files
    }
}

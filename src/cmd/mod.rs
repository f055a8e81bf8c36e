//! Command module structure for brecha CLI

use anyhow::{Context, Result};
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;

use brecha::config::Config;
use brecha::engine::Engine;
use brecha::paths::{LOCKS_DIR, PROJECTS_DIR};
use brecha::repository::FileProjectRepository;
use brecha::views::Envelope;
use brecha::EngineError;

pub mod approval;
pub mod init;
pub mod item;
pub mod project;
pub mod ui;

/// Ensure brecha is initialized and return the projects directory path.
pub fn ensure_initialized() -> Result<PathBuf> {
    let projects_dir = PathBuf::from(PROJECTS_DIR);
    if !projects_dir.exists() {
        anyhow::bail!("Brecha not initialized. Run `brecha init` first.");
    }
    Ok(projects_dir)
}

/// Open the engine over the workspace in the current directory.
pub fn open_engine() -> Result<Engine<FileProjectRepository>> {
    let projects_dir = ensure_initialized()?;
    let config = Config::load().context("Failed to load configuration")?;
    let repo = FileProjectRepository::new(projects_dir, PathBuf::from(LOCKS_DIR));
    Ok(Engine::new(repo, config))
}

/// Marker error: the failure was already written as a JSON envelope.
#[derive(Debug)]
pub struct Reported;

impl fmt::Display for Reported {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "error already reported")
    }
}

impl std::error::Error for Reported {}

/// Output mode shared by every command.
#[derive(Debug, Clone, Copy)]
pub struct Output {
    pub json: bool,
}

impl Output {
    /// Print `result` as an envelope or via `render`.
    pub fn emit<T: Serialize>(
        &self,
        result: Result<T, EngineError>,
        render: impl FnOnce(&T),
    ) -> Result<()> {
        if self.json {
            let failed = result.is_err();
            let envelope = Envelope::from_result(result);
            println!("{}", serde_json::to_string_pretty(&envelope)?);
            if failed {
                return Err(Reported.into());
            }
            return Ok(());
        }

        let value = result?;
        render(&value);
        Ok(())
    }
}

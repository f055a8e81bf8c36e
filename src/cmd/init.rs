//! `brecha init`

use anyhow::{Context, Result};
use colored::Colorize;
use std::fs;
use std::path::Path;

use brecha::config::default_config_content;
use brecha::paths::{CONFIG_FILE, LOCKS_DIR, PROJECTS_DIR};

pub fn cmd_init(org: Option<String>, force: bool) -> Result<()> {
    let config_path = Path::new(CONFIG_FILE);
    if config_path.exists() && !force {
        anyhow::bail!(
            "{} already exists. Use --force to overwrite it.",
            config_path.display()
        );
    }

    fs::create_dir_all(PROJECTS_DIR)
        .with_context(|| format!("Failed to create {}", PROJECTS_DIR))?;
    fs::create_dir_all(LOCKS_DIR).with_context(|| format!("Failed to create {}", LOCKS_DIR))?;

    let org = org.unwrap_or_else(|| {
        std::env::current_dir()
            .ok()
            .and_then(|p| p.file_name().map(|n| n.to_string_lossy().to_string()))
            .unwrap_or_else(|| "brecha".to_string())
    });
    fs::write(config_path, default_config_content(&org))
        .with_context(|| format!("Failed to write {}", config_path.display()))?;

    println!("{} Initialized .brecha/ for {}", "✓".green(), org.bold());
    Ok(())
}

//! Configuration management for brecha workspaces.
//!
//! Configuration lives in the YAML frontmatter of `.brecha/config.md`,
//! optionally layered over a global `~/.config/brecha/config.md`.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::paths::CONFIG_FILE;
use crate::project::split_frontmatter;

pub mod defaults;
pub mod validation;

pub use defaults::*;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub organization: OrganizationConfig,
    #[serde(default)]
    pub approval: ApprovalConfig,
    #[serde(default)]
    pub budget: BudgetConfig,
    #[serde(default)]
    pub items: ItemsConfig,
    #[serde(default)]
    pub risk: RiskConfig,
}

impl Config {
    /// Load configuration with full merge semantics.
    /// Merge order (later overrides earlier):
    /// 1. Global config (~/.config/brecha/config.md)
    /// 2. Project config (.brecha/config.md)
    ///
    /// Missing files fall back to defaults. An existing project file must
    /// name the organization.
    pub fn load() -> Result<Self> {
        Self::load_merged_from(global_config_path().as_deref(), Path::new(CONFIG_FILE))
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config from {}", path.display()))?;

        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self> {
        let (frontmatter, _body) = split_frontmatter(content);
        let frontmatter = frontmatter.context("Failed to extract frontmatter from config")?;

        let config: Config =
            serde_yaml::from_str(&frontmatter).context("Failed to parse config frontmatter")?;

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.organization.name.trim().is_empty() {
            anyhow::bail!("organization.name cannot be empty");
        }
        self.approval.validate()?;
        self.risk.validate()
    }

    /// Load merged configuration from specified global and project config paths.
    /// Project config values override global config values section by section.
    pub fn load_merged_from(global_path: Option<&Path>, project_path: &Path) -> Result<Self> {
        let global_config = global_path
            .filter(|p| p.exists())
            .map(PartialConfig::load_from)
            .transpose()?
            .unwrap_or_default();

        let project_config = Some(project_path)
            .filter(|p| p.exists())
            .map(PartialConfig::load_from)
            .transpose()?;
        if project_config.as_ref().is_some_and(|c| c.organization.is_none()) {
            anyhow::bail!(
                "organization.name is required in {}",
                project_path.display()
            );
        }
        let project_config = project_config.unwrap_or_default();

        let config = global_config.merge_with(project_config);
        config.validate()?;
        Ok(config)
    }
}

/// Returns the path to the global config file at ~/.config/brecha/config.md
pub fn global_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("brecha").join("config.md"))
}

/// Partial config for merging - all fields optional
#[derive(Debug, Deserialize, Default)]
struct PartialConfig {
    pub organization: Option<OrganizationConfig>,
    pub approval: Option<ApprovalConfig>,
    pub budget: Option<BudgetConfig>,
    pub items: Option<ItemsConfig>,
    pub risk: Option<RiskConfig>,
}

impl PartialConfig {
    fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config from {}", path.display()))?;

        Self::parse(&content)
    }

    fn parse(content: &str) -> Result<Self> {
        let (frontmatter, _body) = split_frontmatter(content);
        let frontmatter = frontmatter.context("Failed to extract frontmatter from config")?;

        serde_yaml::from_str(&frontmatter).context("Failed to parse config frontmatter")
    }

    /// Merge this global config with a project config, returning the merged result.
    /// Values from the project config take precedence over global.
    fn merge_with(self, project: PartialConfig) -> Config {
        Config {
            organization: project
                .organization
                .or(self.organization)
                .unwrap_or_default(),
            approval: project.approval.or(self.approval).unwrap_or_default(),
            budget: project.budget.or(self.budget).unwrap_or_default(),
            items: project.items.or(self.items).unwrap_or_default(),
            risk: project.risk.or(self.risk).unwrap_or_default(),
        }
    }
}

/// Initial content written by `brecha init`.
pub fn default_config_content(organization: &str) -> String {
    format!(
        r#"---
organization:
  name: {}
approval:
  validators: []
  allow_self_approval: false
budget:
  overrun: warn
items:
  remove_with_dependents: reject
risk:
  spend_threshold: 80
  time_threshold: 80
---

# Brecha Configuration

Remediation projects live in `.brecha/projects`.
"#,
        organization
    )
}

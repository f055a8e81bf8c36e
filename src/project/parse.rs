//! Project file parsing functions.

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

use super::frontmatter::{ApprovalRequest, BudgetMode, Item, ItemState, ProjectFrontmatter};

/// A remediation project as stored on disk: YAML frontmatter followed by a
/// markdown description.
#[derive(Debug, Clone, PartialEq)]
pub struct Project {
    pub id: String,
    pub frontmatter: ProjectFrontmatter,
    pub body: String,
}

/// Split content into frontmatter and body.
///
/// If the content starts with `---`, extracts the YAML frontmatter between
/// the first and second `---` delimiters, and returns the body after.
/// Otherwise returns None for frontmatter and the entire content as body.
pub fn split_frontmatter(content: &str) -> (Option<String>, &str) {
    let content = content.trim();

    if !content.starts_with("---") {
        return (None, content);
    }

    let rest = &content[3..];
    if let Some(end) = rest.find("\n---") {
        let frontmatter = rest[..end].to_string();
        let body = rest[end + 4..].trim_start();
        (Some(frontmatter), body)
    } else {
        (None, content)
    }
}

impl Project {
    pub fn new(id: &str, frontmatter: ProjectFrontmatter, descripcion: &str) -> Self {
        Self {
            id: id.to_string(),
            frontmatter,
            body: descripcion.trim().to_string(),
        }
    }

    /// Parse a project from file content.
    pub fn parse(id: &str, content: &str) -> Result<Self> {
        let (frontmatter_str, body) = split_frontmatter(content);
        let frontmatter_str = frontmatter_str
            .with_context(|| format!("Project {} has no frontmatter", id))?;

        let frontmatter: ProjectFrontmatter = serde_yaml::from_str(&frontmatter_str)
            .with_context(|| format!("Failed to parse frontmatter of project {}", id))?;

        Ok(Self {
            id: id.to_string(),
            frontmatter,
            body: body.to_string(),
        })
    }

    /// Load a project from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read project from {}", path.display()))?;

        let id = path
            .file_stem()
            .and_then(|s| s.to_str())
            .ok_or_else(|| anyhow::anyhow!("Invalid project filename: {}", path.display()))?;

        Self::parse(id, &content)
    }

    /// Render the file content.
    pub fn render(&self) -> Result<String> {
        let frontmatter = serde_yaml::to_string(&self.frontmatter)?;
        Ok(format!("---\n{}---\n{}\n", frontmatter, self.body))
    }

    /// Save the project to a file via a temp file and rename.
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = self.render()?;
        let tmp_path = path.with_extension("md.tmp");
        fs::write(&tmp_path, &content)
            .with_context(|| format!("Failed to write {}", tmp_path.display()))?;
        fs::rename(&tmp_path, path)
            .with_context(|| format!("Failed to replace {}", path.display()))?;
        Ok(())
    }

    pub fn descripcion(&self) -> &str {
        &self.body
    }

    pub fn tracks_items(&self) -> bool {
        self.frontmatter.modo_presupuesto == BudgetMode::PorItems
    }

    pub fn item(&self, numero: u32) -> Option<&Item> {
        self.frontmatter.items.iter().find(|i| i.numero_item == numero)
    }

    pub fn item_mut(&mut self, numero: u32) -> Option<&mut Item> {
        self.frontmatter
            .items
            .iter_mut()
            .find(|i| i.numero_item == numero)
    }

    /// Number of items whose stored state is `completado`.
    pub fn completed_items(&self) -> usize {
        self.frontmatter
            .items
            .iter()
            .filter(|i| i.estado == ItemState::Completado)
            .count()
    }

    /// The pending approval request, if any.
    pub fn active_request(&self) -> Option<&ApprovalRequest> {
        self.frontmatter.solicitudes.iter().find(|r| r.is_pending())
    }

    pub fn request(&self, id: u32) -> Option<&ApprovalRequest> {
        self.frontmatter.solicitudes.iter().find(|r| r.id == id)
    }

    pub fn request_mut(&mut self, id: u32) -> Option<&mut ApprovalRequest> {
        self.frontmatter.solicitudes.iter_mut().find(|r| r.id == id)
    }
}

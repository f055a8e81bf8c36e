use std::fs;
use std::path::PathBuf;

use anyhow::Context;
use chrono::NaiveDate;
use tracing::debug;

use crate::error::EngineError;
use crate::id;
use crate::lock::ProjectLock;
use crate::project::Project;

/// A trait for loading and saving projects from a storage backend.
///
/// `save` is a compare-and-swap on `frontmatter.version`: the stored
/// version must equal the one carried by `project`, and on success both
/// are incremented.
pub trait ProjectRepository: Send + Sync {
    /// Load a project by its ID.
    fn load(&self, id: &str) -> Result<Project, EngineError>;

    /// Persist a brand-new project. Fails if the ID is taken.
    fn create(&self, project: &Project) -> Result<(), EngineError>;

    /// Save a project, checking and bumping its version.
    fn save(&self, project: &mut Project) -> Result<(), EngineError>;

    /// List all projects from storage, ordered by ID.
    fn list_all(&self) -> Result<Vec<Project>, EngineError>;

    /// Allocate an unused project ID.
    fn next_id(&self, today: NaiveDate) -> Result<String, EngineError>;

    /// Find a project by ID or by `codigo` (case-insensitive).
    fn resolve(&self, key: &str) -> Result<Project, EngineError> {
        if id::looks_like_id(key) {
            match self.load(key) {
                Err(EngineError::NotFound(_)) => {}
                other => return other,
            }
        }

        self.list_all()?
            .into_iter()
            .find(|p| p.frontmatter.codigo.eq_ignore_ascii_case(key.trim()))
            .ok_or_else(|| EngineError::not_found(format!("project '{}' does not exist", key)))
    }
}

pub(crate) fn version_conflict(id: &str, expected: u64, found: u64) -> EngineError {
    EngineError::StateConflict(format!(
        "project {} was modified concurrently (expected version {}, found {})",
        id, expected, found
    ))
}

/// File-based implementation of ProjectRepository.
pub struct FileProjectRepository {
    projects_dir: PathBuf,
    locks_dir: PathBuf,
}

impl FileProjectRepository {
    /// Create a new FileProjectRepository for the given directories.
    pub fn new(projects_dir: PathBuf, locks_dir: PathBuf) -> Self {
        Self {
            projects_dir,
            locks_dir,
        }
    }

    fn path_for(&self, id: &str) -> PathBuf {
        self.projects_dir.join(format!("{}.md", id))
    }
}

impl ProjectRepository for FileProjectRepository {
    fn load(&self, id: &str) -> Result<Project, EngineError> {
        let path = self.path_for(id);
        if !path.exists() {
            return Err(EngineError::not_found(format!("project '{}' does not exist", id)));
        }
        Ok(Project::load(&path)?)
    }

    fn create(&self, project: &Project) -> Result<(), EngineError> {
        fs::create_dir_all(&self.projects_dir).with_context(|| {
            format!(
                "Failed to create projects directory {}",
                self.projects_dir.display()
            )
        })?;
        let _lock = ProjectLock::acquire(&self.locks_dir, &project.id)?;

        let path = self.path_for(&project.id);
        if path.exists() {
            return Err(EngineError::StateConflict(format!(
                "project {} already exists",
                project.id
            )));
        }
        project.save(&path)?;
        debug!(project = %project.id, path = %path.display(), "Created project file");
        Ok(())
    }

    fn save(&self, project: &mut Project) -> Result<(), EngineError> {
        let _lock = ProjectLock::acquire(&self.locks_dir, &project.id)?;

        let stored = self.load(&project.id)?;
        let expected = project.frontmatter.version;
        if stored.frontmatter.version != expected {
            return Err(version_conflict(
                &project.id,
                expected,
                stored.frontmatter.version,
            ));
        }

        project.frontmatter.version = expected + 1;
        if let Err(e) = project.save(&self.path_for(&project.id)) {
            project.frontmatter.version = expected;
            return Err(e.into());
        }
        debug!(project = %project.id, version = project.frontmatter.version, "Saved project");
        Ok(())
    }

    fn list_all(&self) -> Result<Vec<Project>, EngineError> {
        let mut projects = Vec::new();
        if !self.projects_dir.exists() {
            return Ok(projects);
        }

        let entries = fs::read_dir(&self.projects_dir).with_context(|| {
            format!(
                "Failed to read projects directory {}",
                self.projects_dir.display()
            )
        })?;
        for entry in entries {
            let path = entry.context("Failed to read directory entry")?.path();
            if path.extension().and_then(|e| e.to_str()) == Some("md") {
                projects.push(Project::load(&path)?);
            }
        }

        projects.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(projects)
    }

    fn next_id(&self, today: NaiveDate) -> Result<String, EngineError> {
        Ok(id::generate_id(&self.projects_dir, today)?)
    }
}

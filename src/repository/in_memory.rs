use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use chrono::NaiveDate;

use crate::error::EngineError;
use crate::id;
use crate::project::Project;

use super::project_repository::{version_conflict, ProjectRepository};

/// In-memory implementation of ProjectRepository for tests and embedding.
pub struct InMemoryProjectRepository {
    projects: Mutex<HashMap<String, Project>>,
}

impl Default for InMemoryProjectRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryProjectRepository {
    /// Create a new empty InMemoryProjectRepository.
    pub fn new() -> Self {
        Self {
            projects: Mutex::new(HashMap::new()),
        }
    }

    /// Create a new InMemoryProjectRepository with pre-populated projects.
    pub fn with_projects(projects: Vec<Project>) -> Self {
        let map = projects.into_iter().map(|p| (p.id.clone(), p)).collect();
        Self {
            projects: Mutex::new(map),
        }
    }

    fn guard(&self) -> Result<MutexGuard<'_, HashMap<String, Project>>, EngineError> {
        self.projects
            .lock()
            .map_err(|_| EngineError::Storage(anyhow::anyhow!("project store lock poisoned")))
    }
}

impl ProjectRepository for InMemoryProjectRepository {
    fn load(&self, id: &str) -> Result<Project, EngineError> {
        self.guard()?
            .get(id)
            .cloned()
            .ok_or_else(|| EngineError::not_found(format!("project '{}' does not exist", id)))
    }

    fn create(&self, project: &Project) -> Result<(), EngineError> {
        let mut projects = self.guard()?;
        if projects.contains_key(&project.id) {
            return Err(EngineError::StateConflict(format!(
                "project {} already exists",
                project.id
            )));
        }
        projects.insert(project.id.clone(), project.clone());
        Ok(())
    }

    fn save(&self, project: &mut Project) -> Result<(), EngineError> {
        let mut projects = self.guard()?;
        let stored = projects
            .get(&project.id)
            .ok_or_else(|| EngineError::not_found(format!("project '{}' does not exist", project.id)))?;

        let expected = project.frontmatter.version;
        if stored.frontmatter.version != expected {
            return Err(version_conflict(
                &project.id,
                expected,
                stored.frontmatter.version,
            ));
        }

        project.frontmatter.version = expected + 1;
        projects.insert(project.id.clone(), project.clone());
        Ok(())
    }

    fn list_all(&self) -> Result<Vec<Project>, EngineError> {
        let mut all: Vec<Project> = self.guard()?.values().cloned().collect();
        all.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(all)
    }

    fn next_id(&self, today: NaiveDate) -> Result<String, EngineError> {
        let projects = self.guard()?;
        Ok(id::generate_id_among(
            projects.keys().map(String::as_str),
            today,
        ))
    }
}

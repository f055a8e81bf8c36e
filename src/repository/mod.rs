//! Storage backends for projects.

pub mod in_memory;
pub mod project_repository;

pub use in_memory::InMemoryProjectRepository;
pub use project_repository::{FileProjectRepository, ProjectRepository};

//! # Brecha - Remediation Engine
//!
//! Brecha tracks remediation projects opened to close compliance gaps: the
//! work items of each project, their dependency chain and budget, and the
//! approval workflow that closes a project once its work is done.
//!
//! ## Overview
//!
//! Projects are stored as markdown files with YAML frontmatter under
//! `.brecha/projects`. Every command goes through the [`engine::Engine`],
//! which serializes mutations per project, validates them against the
//! current ledger and lifecycle state, and persists the result with an
//! optimistic version check.
//!
//! ## Core Concepts
//!
//! - **Items**: units of remediation work with schedule, budget and an
//!   optional predecessor
//! - **Dependency gate**: an item cannot start or complete before its
//!   predecessor is complete
//! - **Approval requests**: closure proposals resolved by a validator
//!
//! ## Modules
//!
//! - [`project`] - Project data model, file format and lifecycle state machine
//! - [`domain`] - Pure dependency gate, budget aggregation and validation
//! - [`operations`] - Item ledger, approval and lifecycle mutations
//! - [`engine`] - Command/query API with per-project serialization
//! - [`repository`] - Storage backends
//! - [`config`] - Policy configuration
//! - [`rpc`] - JSON-RPC server over stdio
//!
//! ## Example
//!
//! ```no_run
//! use brecha::config::Config;
//! use brecha::engine::Engine;
//! use brecha::repository::FileProjectRepository;
//!
//! let config = Config::load().expect("Failed to load config");
//! let repo = FileProjectRepository::new(".brecha/projects".into(), ".brecha/.locks".into());
//! let engine = Engine::new(repo, config);
//!
//! for project in engine.list_projects().expect("Failed to list projects") {
//!     println!("{} {}", project.proyecto.codigo, project.resumen.porcentaje_gastado);
//! }
//! ```

pub mod clock;
pub mod config;
pub mod domain;
pub mod engine;
pub mod error;
pub mod id;
pub mod lock;
pub mod operations;
pub mod project;
pub mod repository;
pub mod rpc;
pub mod views;

pub use error::EngineError;

/// Default path constants for the brecha directory structure.
pub mod paths {
    /// Directory containing project files: `.brecha/projects`
    pub const PROJECTS_DIR: &str = ".brecha/projects";
    /// Project configuration file: `.brecha/config.md`
    pub const CONFIG_FILE: &str = ".brecha/config.md";
    /// Directory containing lock files: `.brecha/.locks`
    pub const LOCKS_DIR: &str = ".brecha/.locks";
}

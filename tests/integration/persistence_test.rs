//! File-backed repository behavior.

use brecha::project::{ItemState, Project, ProjectState};
use brecha::repository::ProjectRepository;
use rust_decimal::Decimal;
use std::fs;

use crate::support::builders::{set_state, ItemBuilder, ProjectBuilder};
use crate::support::harness::TestHarness;

#[test]
fn test_project_round_trips_through_markdown() {
    let harness = TestHarness::new();
    let engine = harness.engine();
    let id = engine.create_project(ProjectBuilder::new("F1").build()).unwrap().proyecto.id;
    engine.start_project(&id).unwrap();
    engine
        .add_item(&id, ItemBuilder::new("a").planned(1500).executed(250).build())
        .unwrap();
    engine.update_item(&id, 1, set_state(ItemState::EnProceso)).unwrap();

    let files = harness.project_files();
    assert_eq!(files.len(), 1);
    let content = fs::read_to_string(&files[0]).unwrap();
    assert!(content.starts_with("---\n"));
    assert!(content.contains("codigo: F1"));

    let project = Project::load(&files[0]).unwrap();
    assert_eq!(project.frontmatter.estado, ProjectState::EnEjecucion);
    assert_eq!(project.frontmatter.items[0].estado, ItemState::EnProceso);
    assert_eq!(
        project.frontmatter.items[0].presupuesto_planificado,
        Decimal::from(1500)
    );
}

#[test]
fn test_fresh_engine_sees_prior_writes() {
    let harness = TestHarness::new();
    let id = {
        let engine = harness.engine();
        let id = engine.create_project(ProjectBuilder::new("F2").build()).unwrap().proyecto.id;
        engine.start_project(&id).unwrap();
        id
    };

    let engine = harness.engine();
    let view = engine.get_project("f2").unwrap();
    assert_eq!(view.proyecto.id, id);
    assert_eq!(view.proyecto.estado, ProjectState::EnEjecucion);
    assert_eq!(engine.repository().list_all().unwrap().len(), 1);
}

#[test]
fn test_locks_are_released_after_commands() {
    let harness = TestHarness::new();
    let engine = harness.engine();
    let id = engine.create_project(ProjectBuilder::new("F3").build()).unwrap().proyecto.id;
    engine.start_project(&id).unwrap();
    assert!(!harness.locks_dir.join(format!("{}.lock", id)).exists());
}

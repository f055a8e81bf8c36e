//! Concurrent commands against one project.

use brecha::config::Config;
use brecha::lock::ProjectLock;
use brecha::project::{ItemState, ProjectState};
use brecha::repository::ProjectRepository;
use brecha::EngineError;
use std::thread;

use crate::support::builders::{memory_engine, set_state, ItemBuilder, ProjectBuilder};
use crate::support::harness::TestHarness;

#[test]
fn test_parallel_item_updates_are_serialized() {
    let engine = memory_engine(Config::default());
    let id = engine.create_project(ProjectBuilder::new("P1").build()).unwrap().proyecto.id;
    engine.start_project(&id).unwrap();
    for n in 0..8 {
        engine
            .add_item(&id, ItemBuilder::new(&format!("item {}", n)).build())
            .unwrap();
    }

    thread::scope(|s| {
        for numero in 1..=8 {
            let engine = &engine;
            let id = &id;
            s.spawn(move || {
                engine
                    .update_item(id, numero, set_state(ItemState::Completado))
                    .unwrap();
            });
        }
    });

    let view = engine.get_project(&id).unwrap();
    assert_eq!(view.resumen.items_completados, 8);
    assert!(view.elegible_para_cierre);
    // create + start + 8 adds + 8 updates
    assert_eq!(view.proyecto.version, 18);
}

#[test]
fn test_racing_approval_requests_yield_one_pending() {
    let engine = memory_engine(Config::default());
    let id = engine.create_project(ProjectBuilder::new("P2").build()).unwrap().proyecto.id;
    engine.start_project(&id).unwrap();
    engine.add_item(&id, ItemBuilder::new("a").build()).unwrap();
    engine.update_item(&id, 1, set_state(ItemState::Completado)).unwrap();

    let results: Vec<Result<_, EngineError>> = thread::scope(|s| {
        let handles: Vec<_> = (0..4)
            .map(|_| s.spawn(|| engine.request_approval(&id, "ana", None, None)))
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
    assert!(results
        .iter()
        .filter_map(|r| r.as_ref().err())
        .all(|e| matches!(e, EngineError::PreconditionNotMet(_))));

    let status = engine.get_approval_status(&id).unwrap();
    assert_eq!(status.estado_proyecto, ProjectState::EnValidacion);
    assert!(status.solicitud_activa.is_some());
}

#[test]
fn test_stale_version_save_is_a_conflict() {
    let harness = TestHarness::new();
    let engine = harness.engine();
    let id = engine.create_project(ProjectBuilder::new("P3").build()).unwrap().proyecto.id;
    let repo = engine.repository();

    let mut first = repo.load(&id).unwrap();
    let mut second = repo.load(&id).unwrap();
    repo.save(&mut first).unwrap();

    let err = repo.save(&mut second).unwrap_err();
    assert!(matches!(err, EngineError::StateConflict(_)));
    assert_eq!(repo.load(&id).unwrap().frontmatter.version, 2);
}

#[test]
fn test_held_lock_blocks_other_writer() {
    let harness = TestHarness::new();
    let engine = harness.engine();
    let id = engine.create_project(ProjectBuilder::new("P4").build()).unwrap().proyecto.id;

    let lock = ProjectLock::acquire(&harness.locks_dir, &id).unwrap();
    let err = engine.start_project(&id).unwrap_err();
    assert!(matches!(err, EngineError::StateConflict(_)));
    assert!(err.detail().contains("locked"), "{}", err);

    drop(lock);
    let view = engine.start_project(&id).unwrap();
    assert_eq!(view.proyecto.estado, ProjectState::EnEjecucion);
}

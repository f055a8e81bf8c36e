//! Suspension, cancellation, removal policy and config-driven behavior.

use brecha::config::Config;
use brecha::project::{ApprovalState, ItemState, ProjectState};
use brecha::EngineError;

use crate::support::builders::{memory_engine, set_state, ItemBuilder, ProjectBuilder};

fn config(yaml: &str) -> Config {
    Config::parse(&format!("---\n{}---\n", yaml)).unwrap()
}

#[test]
fn test_suspend_during_validation_withdraws_request() {
    let engine = memory_engine(Config::default());
    let id = engine.create_project(ProjectBuilder::new("S1").build()).unwrap().proyecto.id;
    engine.start_project(&id).unwrap();
    engine.add_item(&id, ItemBuilder::new("a").build()).unwrap();
    engine.update_item(&id, 1, set_state(ItemState::Completado)).unwrap();
    engine.request_approval(&id, "ana", None, None).unwrap();

    let suspended = engine.suspend_project(&id).unwrap();
    assert_eq!(suspended.proyecto.estado, ProjectState::Suspendido);
    assert!(suspended.solicitud_activa.is_none());

    let status = engine.get_approval_status(&id).unwrap();
    assert_eq!(status.historial[0].estado, ApprovalState::Rechazado);

    let resumed = engine.resume_project(&id).unwrap();
    assert_eq!(resumed.proyecto.estado, ProjectState::EnEjecucion);
}

#[test]
fn test_cancelled_project_rejects_item_changes() {
    let engine = memory_engine(Config::default());
    let id = engine.create_project(ProjectBuilder::new("K1").build()).unwrap().proyecto.id;
    engine.start_project(&id).unwrap();
    engine.add_item(&id, ItemBuilder::new("a").build()).unwrap();
    engine.cancel_project(&id).unwrap();

    let err = engine.update_item(&id, 1, set_state(ItemState::EnProceso)).unwrap_err();
    assert!(matches!(err, EngineError::PreconditionNotMet(_)));
    assert!(engine.cancel_project(&id).is_err());
}

#[test]
fn test_remove_with_dependents_rejected_by_default() {
    let engine = memory_engine(Config::default());
    let id = engine.create_project(ProjectBuilder::new("R1").build()).unwrap().proyecto.id;
    engine.add_item(&id, ItemBuilder::new("a").build()).unwrap();
    engine.add_item(&id, ItemBuilder::new("b").depends_on(1).build()).unwrap();

    let err = engine.remove_item(&id, 1).unwrap_err();
    assert!(err.detail().contains("dependent items (2)"), "{}", err);
    assert_eq!(engine.list_items(&id).unwrap().len(), 2);
}

#[test]
fn test_remove_with_dependents_detaches_when_configured() {
    let engine = memory_engine(config("items:\n  remove_with_dependents: detach\n"));
    let id = engine.create_project(ProjectBuilder::new("R2").build()).unwrap().proyecto.id;
    engine.add_item(&id, ItemBuilder::new("a").build()).unwrap();
    engine.add_item(&id, ItemBuilder::new("b").depends_on(1).build()).unwrap();

    let removal = engine.remove_item(&id, 1).unwrap();
    assert_eq!(removal.detached, vec![2]);

    let remaining = engine.get_item(&id, 2).unwrap();
    assert!(remaining.puede_iniciar);
    assert!(!remaining.item.tiene_dependencia);

    let next = engine.add_item(&id, ItemBuilder::new("c").build()).unwrap();
    assert_eq!(next.item.numero_item, 3);
}

#[test]
fn test_overrun_rejected_when_configured() {
    let engine = memory_engine(config("budget:\n  overrun: reject\n"));
    let id = engine.create_project(ProjectBuilder::new("O1").build()).unwrap().proyecto.id;
    let err = engine
        .add_item(&id, ItemBuilder::new("a").planned(100).executed(150).build())
        .unwrap_err();
    assert!(matches!(err, EngineError::Validation(_)));
}

#[test]
fn test_designated_validator_enforced() {
    let engine = memory_engine(config("approval:\n  validators: [luis]\n"));
    let id = engine.create_project(ProjectBuilder::new("V1").build()).unwrap().proyecto.id;
    engine.start_project(&id).unwrap();
    engine.add_item(&id, ItemBuilder::new("a").build()).unwrap();
    engine.update_item(&id, 1, set_state(ItemState::Completado)).unwrap();
    let req = engine.request_approval(&id, "ana", None, None).unwrap();

    let err = engine.approve(&id, req.solicitud.id, "marta", None).unwrap_err();
    assert!(matches!(err, EngineError::PreconditionNotMet(_)));

    let ok = engine.approve(&id, req.solicitud.id, "luis", None).unwrap();
    assert_eq!(ok.solicitud.estado, ApprovalState::Aprobado);
}

#[test]
fn test_self_approval_refused_by_default() {
    let engine = memory_engine(config("approval:\n  validators: [ana, luis]\n"));
    let id = engine.create_project(ProjectBuilder::new("V2").build()).unwrap().proyecto.id;
    engine.start_project(&id).unwrap();
    engine.add_item(&id, ItemBuilder::new("a").build()).unwrap();
    engine.update_item(&id, 1, set_state(ItemState::Completado)).unwrap();
    let req = engine.request_approval(&id, "ana", None, None).unwrap();

    let err = engine.approve(&id, req.solicitud.id, "ana", None).unwrap_err();
    assert!(err.detail().contains("cannot resolve it"), "{}", err);
}

#[test]
fn test_duplicate_codigo_rejected() {
    let engine = memory_engine(Config::default());
    engine.create_project(ProjectBuilder::new("DUP").build()).unwrap();
    let err = engine.create_project(ProjectBuilder::new("dup").build()).unwrap_err();
    assert!(matches!(err, EngineError::Validation(_)));
    assert_eq!(engine.list_projects().unwrap().len(), 1);
}

#[test]
fn test_unknown_project_is_not_found() {
    let engine = memory_engine(Config::default());
    let err = engine.get_project("missing").unwrap_err();
    assert!(matches!(err, EngineError::NotFound(_)));
}

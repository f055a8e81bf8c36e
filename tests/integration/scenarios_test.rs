//! End-to-end engine scenarios over the in-memory repository.

use brecha::config::Config;
use brecha::operations::{ItemPatch, NewItem};
use brecha::project::{ItemState, ProjectState};
use brecha::EngineError;
use rust_decimal::Decimal;

use crate::support::builders::{date, memory_engine, set_state, ItemBuilder, ProjectBuilder};

#[test]
fn test_completing_predecessor_unblocks_dependent_without_reevaluation() {
    let engine = memory_engine(Config::default());
    let id = engine.create_project(ProjectBuilder::new("A9").build()).unwrap().proyecto.id;
    engine.start_project(&id).unwrap();
    engine.add_item(&id, ItemBuilder::new("Politica").build()).unwrap();
    engine.add_item(&id, ItemBuilder::new("Despliegue").depends_on(1).build()).unwrap();
    engine.add_item(&id, ItemBuilder::new("Auditoria").build()).unwrap();

    let before = engine.get_item(&id, 2).unwrap();
    assert!(!before.puede_iniciar);
    assert_eq!(before.bloqueado_por, Some(1));

    engine.update_item(&id, 1, set_state(ItemState::Completado)).unwrap();

    let after = engine.get_item(&id, 2).unwrap();
    assert!(after.puede_iniciar);
    assert_eq!(after.bloqueado_por, None);
    assert_eq!(after.item.estado, ItemState::Pendiente);
}

#[test]
fn test_budget_totals_with_overrun_item() {
    let engine = memory_engine(Config::default());
    let id = engine.create_project(ProjectBuilder::new("B1").build()).unwrap().proyecto.id;
    engine.start_project(&id).unwrap();
    engine
        .add_item(&id, ItemBuilder::new("a").planned(1000).executed(500).build())
        .unwrap();
    let overrun = engine
        .add_item(&id, ItemBuilder::new("b").planned(2000).executed(2500).build())
        .unwrap();
    assert!(overrun.sobrecosto);

    let resumen = engine.get_project(&id).unwrap().resumen;
    assert_eq!(resumen.total_planificado, Decimal::from(3000));
    assert_eq!(resumen.total_ejecutado, Decimal::from(3000));
    assert_eq!(resumen.porcentaje_gastado, Decimal::from(100));
    assert_eq!(resumen.disponible, Decimal::ZERO);
    assert_eq!(resumen.items_con_sobrecosto, 1);
}

#[test]
fn test_request_with_incomplete_item_cites_count() {
    let engine = memory_engine(Config::default());
    let id = engine.create_project(ProjectBuilder::new("C1").build()).unwrap().proyecto.id;
    engine.start_project(&id).unwrap();
    engine.add_item(&id, ItemBuilder::new("a").build()).unwrap();
    engine.add_item(&id, ItemBuilder::new("b").build()).unwrap();
    engine.update_item(&id, 1, set_state(ItemState::Completado)).unwrap();

    let err = engine.request_approval(&id, "ana", None, None).unwrap_err();
    assert!(matches!(err, EngineError::PreconditionNotMet(_)));
    assert!(err.detail().contains("1 of 2 items incomplete"), "{}", err);

    let view = engine.get_project(&id).unwrap();
    assert_eq!(view.proyecto.estado, ProjectState::EnEjecucion);
    assert!(view.solicitud_activa.is_none());
}

#[test]
fn test_approval_sets_closure_date_and_second_approve_fails() {
    let engine = memory_engine(Config::default());
    let id = engine.create_project(ProjectBuilder::new("D1").build()).unwrap().proyecto.id;
    engine.start_project(&id).unwrap();
    engine.add_item(&id, ItemBuilder::new("a").build()).unwrap();
    engine.update_item(&id, 1, set_state(ItemState::Completado)).unwrap();

    let requested = engine
        .request_approval(&id, "ana", Some("listo".into()), Some("luis".into()))
        .unwrap();
    assert_eq!(requested.proyecto.proyecto.estado, ProjectState::EnValidacion);

    let approved = engine.approve(&id, requested.solicitud.id, "luis", None).unwrap();
    assert_eq!(approved.proyecto.proyecto.estado, ProjectState::Cerrado);
    assert_eq!(approved.proyecto.proyecto.fecha_fin_real, Some(date(2026, 2, 1)));

    let err = engine.approve(&id, requested.solicitud.id, "luis", None).unwrap_err();
    assert!(matches!(
        err,
        EngineError::PreconditionNotMet(_) | EngineError::StateConflict(_)
    ));

    let view = engine.get_project(&id).unwrap();
    assert_eq!(view.proyecto.fecha_fin_real, Some(date(2026, 2, 1)));
}

#[test]
fn test_rejection_returns_to_execution_and_allows_new_request() {
    let engine = memory_engine(Config::default());
    let id = engine.create_project(ProjectBuilder::new("E1").build()).unwrap().proyecto.id;
    engine.start_project(&id).unwrap();
    engine.add_item(&id, ItemBuilder::new("a").build()).unwrap();
    engine.update_item(&id, 1, set_state(ItemState::Completado)).unwrap();

    let first = engine
        .request_approval(&id, "ana", None, Some("luis".into()))
        .unwrap();
    let rejected = engine
        .reject(&id, first.solicitud.id, "luis", "falta evidencia")
        .unwrap();
    assert_eq!(rejected.proyecto.proyecto.estado, ProjectState::EnEjecucion);
    assert_eq!(
        engine.get_item(&id, 1).unwrap().item.estado,
        ItemState::Completado
    );

    let second = engine.request_approval(&id, "ana", None, None).unwrap();
    assert_eq!(second.solicitud.id, first.solicitud.id + 1);

    let status = engine.get_approval_status(&id).unwrap();
    assert_eq!(status.historial.len(), 1);
    assert_eq!(
        status.historial[0].observaciones.as_deref(),
        Some("falta evidencia")
    );
    assert_eq!(status.solicitud_activa.map(|r| r.id), Some(second.solicitud.id));
}

#[test]
fn test_reject_without_observations_is_validation_error() {
    let engine = memory_engine(Config::default());
    let id = engine.create_project(ProjectBuilder::new("E2").build()).unwrap().proyecto.id;
    engine.start_project(&id).unwrap();
    engine.add_item(&id, ItemBuilder::new("a").build()).unwrap();
    engine.update_item(&id, 1, set_state(ItemState::Completado)).unwrap();
    let req = engine.request_approval(&id, "ana", None, None).unwrap();

    let err = engine.reject(&id, req.solicitud.id, "luis", "  ").unwrap_err();
    assert!(matches!(err, EngineError::Validation(_)));
    assert_eq!(
        engine.get_project(&id).unwrap().proyecto.estado,
        ProjectState::EnValidacion
    );
}

#[test]
fn test_blocked_dependent_cannot_start() {
    let engine = memory_engine(Config::default());
    let id = engine.create_project(ProjectBuilder::new("G1").build()).unwrap().proyecto.id;
    engine.start_project(&id).unwrap();
    engine.add_item(&id, ItemBuilder::new("a").build()).unwrap();
    engine.add_item(&id, ItemBuilder::new("b").depends_on(1).build()).unwrap();

    let err = engine
        .update_item(&id, 2, set_state(ItemState::EnProceso))
        .unwrap_err();
    assert!(matches!(err, EngineError::PreconditionNotMet(_)));
    assert!(err.detail().contains("item 2 is blocked"), "{}", err);
    assert_eq!(engine.get_item(&id, 2).unwrap().item.estado, ItemState::Pendiente);
}

#[test]
fn test_global_project_closes_without_items() {
    let engine = memory_engine(Config::default());
    let id = engine
        .create_project(ProjectBuilder::new("H1").global(5000).build())
        .unwrap()
        .proyecto
        .id;
    engine.start_project(&id).unwrap();

    let view = engine.record_spend(&id, Decimal::from(1000)).unwrap();
    assert_eq!(view.resumen.porcentaje_gastado, Decimal::from(20));
    assert!(engine.add_item(&id, ItemBuilder::new("a").build()).is_err());

    let req = engine
        .request_approval(&id, "ana", None, Some("luis".into()))
        .unwrap();
    let closed = engine.approve(&id, req.solicitud.id, "luis", None).unwrap();
    assert_eq!(closed.proyecto.proyecto.estado, ProjectState::Cerrado);
}

#[test]
fn test_approval_without_any_designated_validator_is_refused() {
    let engine = memory_engine(Config::default());
    let id = engine.create_project(ProjectBuilder::new("J1").build()).unwrap().proyecto.id;
    engine.start_project(&id).unwrap();
    engine.add_item(&id, ItemBuilder::new("a").build()).unwrap();
    engine.update_item(&id, 1, set_state(ItemState::Completado)).unwrap();
    let req = engine.request_approval(&id, "ana", None, None).unwrap();

    let err = engine.approve(&id, req.solicitud.id, "cualquiera", None).unwrap_err();
    assert!(matches!(err, EngineError::PreconditionNotMet(_)));
    assert!(err.detail().contains("no validator designated"), "{}", err);

    let view = engine.get_project(&id).unwrap();
    assert_eq!(view.proyecto.estado, ProjectState::EnValidacion);
    assert!(view.proyecto.fecha_fin_real.is_none());
}

#[test]
fn test_repointing_completed_item_at_open_predecessor_is_blocked() {
    let engine = memory_engine(Config::default());
    let id = engine.create_project(ProjectBuilder::new("K1").build()).unwrap().proyecto.id;
    engine.start_project(&id).unwrap();
    engine.add_item(&id, ItemBuilder::new("a").build()).unwrap();
    engine.add_item(&id, ItemBuilder::new("b").build()).unwrap();
    engine.update_item(&id, 2, set_state(ItemState::Completado)).unwrap();

    let repoint = ItemPatch {
        item_dependencia: Some(1),
        ..Default::default()
    };
    let err = engine.update_item(&id, 2, repoint).unwrap_err();
    assert!(matches!(err, EngineError::PreconditionNotMet(_)));

    let stored = engine.get_item(&id, 2).unwrap().item;
    assert_eq!(stored.estado, ItemState::Completado);
    assert_eq!(stored.item_dependencia, None);
}

#[test]
fn test_ledger_beyond_decimal_range_is_refused_and_project_stays_readable() {
    let engine = memory_engine(Config::default());
    let id = engine.create_project(ProjectBuilder::new("L1").build()).unwrap().proyecto.id;
    engine.start_project(&id).unwrap();
    let huge = || NewItem {
        presupuesto_planificado: Decimal::MAX,
        ..ItemBuilder::new("enorme").build()
    };
    engine.add_item(&id, huge()).unwrap();

    let err = engine.add_item(&id, huge()).unwrap_err();
    assert!(matches!(err, EngineError::Validation(_)));
    assert!(err.detail().contains("ledger total exceeds representable range"), "{}", err);

    let view = engine.get_project(&id).unwrap();
    assert_eq!(view.resumen.total_items, 1);
    assert_eq!(view.resumen.total_planificado, Decimal::MAX);
}

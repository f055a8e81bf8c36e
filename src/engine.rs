//! Command/query API over the project store.
//!
//! Every command runs the same cycle: take the per-project mutex, load the
//! project, apply the operation to that copy, then save it with the
//! version it was loaded at. A rejected command returns before the save,
//! so the stored project is never touched. Different projects never share
//! a mutex and proceed in parallel.

use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use rust_decimal::Decimal;
use tracing::{debug, info, warn};

use crate::clock::{Clock, SystemClock};
use crate::config::Config;
use crate::error::EngineError;
use crate::operations::{self, ItemPatch, NewItem, NewProject, Removal};
use crate::project::Project;
use crate::repository::ProjectRepository;
use crate::views::{closure_blocker, ApprovalOutcome, ApprovalStatusView, ItemView, ProjectView};

pub struct Engine<R: ProjectRepository> {
    repo: R,
    config: Config,
    clock: Box<dyn Clock>,
    locks: DashMap<String, Arc<Mutex<()>>>,
    create_lock: Mutex<()>,
}

fn acquire(mutex: &Mutex<()>) -> MutexGuard<'_, ()> {
    // The guarded value is (), so a poisoned mutex carries no broken state.
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl<R: ProjectRepository> Engine<R> {
    pub fn new(repo: R, config: Config) -> Self {
        Self::with_clock(repo, config, SystemClock)
    }

    pub fn with_clock(repo: R, config: Config, clock: impl Clock + 'static) -> Self {
        Self {
            repo,
            config,
            clock: Box::new(clock),
            locks: DashMap::new(),
            create_lock: Mutex::new(()),
        }
    }

    pub fn repository(&self) -> &R {
        &self.repo
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    fn project_mutex(&self, id: &str) -> Arc<Mutex<()>> {
        self.locks.entry(id.to_string()).or_default().clone()
    }

    fn view(&self, project: &Project) -> ProjectView {
        ProjectView::build(project, self.clock.today(), &self.config.risk)
    }

    /// Run `apply` against a fresh copy of the project and persist it.
    fn mutate<T>(
        &self,
        key: &str,
        command: &str,
        apply: impl FnOnce(&mut Project, &Config, DateTime<Utc>) -> Result<T, EngineError>,
    ) -> Result<(T, Project), EngineError> {
        let id = self.repo.resolve(key)?.id;
        let mutex = self.project_mutex(&id);
        let _guard = acquire(&mutex);
        debug!(project = %id, command, "Acquired project mutex");

        let mut project = self.repo.load(&id)?;
        let outcome = apply(&mut project, &self.config, self.clock.now())
            .and_then(|value| self.repo.save(&mut project).map(|_| value));

        match outcome {
            Ok(value) => Ok((value, project)),
            Err(e) => {
                warn!(project = %id, command, kind = e.kind(), error = %e.detail(), "Command rejected");
                Err(e)
            }
        }
    }

    // ========================================================================
    // QUERIES
    // ========================================================================

    pub fn get_project(&self, key: &str) -> Result<ProjectView, EngineError> {
        Ok(self.view(&self.repo.resolve(key)?))
    }

    pub fn list_projects(&self) -> Result<Vec<ProjectView>, EngineError> {
        Ok(self.repo.list_all()?.iter().map(|p| self.view(p)).collect())
    }

    pub fn list_items(&self, key: &str) -> Result<Vec<ItemView>, EngineError> {
        let project = self.repo.resolve(key)?;
        Ok(ItemView::all(&project, self.clock.today()))
    }

    pub fn get_item(&self, key: &str, numero: u32) -> Result<ItemView, EngineError> {
        let project = self.repo.resolve(key)?;
        let item = project.item(numero).ok_or_else(|| {
            EngineError::not_found(format!(
                "item {} does not exist in project {}",
                numero, project.frontmatter.codigo
            ))
        })?;
        Ok(ItemView::build(
            item,
            &project.frontmatter.items,
            self.clock.today(),
        ))
    }

    pub fn get_approval_status(&self, key: &str) -> Result<ApprovalStatusView, EngineError> {
        Ok(ApprovalStatusView::build(&self.repo.resolve(key)?))
    }

    // ========================================================================
    // COMMANDS
    // ========================================================================

    pub fn create_project(&self, data: NewProject) -> Result<ProjectView, EngineError> {
        let _guard = acquire(&self.create_lock);

        let id = self.repo.next_id(self.clock.today())?;
        let existing = self.repo.list_all()?;
        let project = operations::build_project(&id, data, &existing).map_err(|e| {
            warn!(command = "create_project", error = %e.detail(), "Command rejected");
            e
        })?;
        self.repo.create(&project)?;

        info!(
            project = %project.id,
            codigo = %project.frontmatter.codigo,
            modo = %project.frontmatter.modo_presupuesto,
            "Created project"
        );
        Ok(self.view(&project))
    }

    pub fn add_item(&self, key: &str, data: NewItem) -> Result<ItemView, EngineError> {
        let (item, project) = self.mutate(key, "add_item", |p, config, _| {
            operations::add_item(p, data, config.budget.overrun)
        })?;
        info!(project = %project.id, item = item.numero_item, "Added item");
        Ok(ItemView::build(
            &item,
            &project.frontmatter.items,
            self.clock.today(),
        ))
    }

    pub fn update_item(
        &self,
        key: &str,
        numero: u32,
        patch: ItemPatch,
    ) -> Result<ItemView, EngineError> {
        let (item, project) = self.mutate(key, "update_item", |p, config, _| {
            operations::update_item(p, numero, patch, config.budget.overrun)
        })?;
        info!(
            project = %project.id,
            item = item.numero_item,
            estado = %item.estado,
            avance = item.porcentaje_avance,
            "Updated item"
        );
        if closure_blocker(&project).is_none() {
            info!(project = %project.id, "All items completed; project is eligible for closure");
        }
        Ok(ItemView::build(
            &item,
            &project.frontmatter.items,
            self.clock.today(),
        ))
    }

    pub fn remove_item(&self, key: &str, numero: u32) -> Result<Removal, EngineError> {
        let (removal, project) = self.mutate(key, "remove_item", |p, config, _| {
            operations::remove_item(p, numero, config.items.remove_with_dependents)
        })?;
        info!(
            project = %project.id,
            item = numero,
            detached = ?removal.detached,
            "Removed item"
        );
        Ok(removal)
    }

    pub fn request_approval(
        &self,
        key: &str,
        solicitante: &str,
        comentarios: Option<String>,
        validador: Option<String>,
    ) -> Result<ApprovalOutcome, EngineError> {
        let (solicitud, project) = self.mutate(key, "request_approval", |p, config, now| {
            operations::request_approval(p, solicitante, comentarios, validador, &config.approval, now)
        })?;
        info!(project = %project.id, request = solicitud.id, solicitante, "Approval requested");
        Ok(ApprovalOutcome {
            solicitud,
            proyecto: self.view(&project),
        })
    }

    pub fn approve(
        &self,
        key: &str,
        request_id: u32,
        validador: &str,
        observaciones: Option<String>,
    ) -> Result<ApprovalOutcome, EngineError> {
        let (solicitud, project) = self.mutate(key, "approve", |p, config, now| {
            operations::approve(p, request_id, validador, observaciones, &config.approval, now)
        })?;
        info!(project = %project.id, request = request_id, validador, "Approval granted; project closed");
        Ok(ApprovalOutcome {
            solicitud,
            proyecto: self.view(&project),
        })
    }

    pub fn reject(
        &self,
        key: &str,
        request_id: u32,
        validador: &str,
        observaciones: &str,
    ) -> Result<ApprovalOutcome, EngineError> {
        let (solicitud, project) = self.mutate(key, "reject", |p, config, now| {
            operations::reject(p, request_id, validador, observaciones, &config.approval, now)
        })?;
        info!(project = %project.id, request = request_id, validador, "Approval rejected; project back in execution");
        Ok(ApprovalOutcome {
            solicitud,
            proyecto: self.view(&project),
        })
    }

    pub fn start_project(&self, key: &str) -> Result<ProjectView, EngineError> {
        let ((), project) = self.mutate(key, "start", |p, _, _| operations::start(p))?;
        info!(project = %project.id, "Project started");
        Ok(self.view(&project))
    }

    pub fn suspend_project(&self, key: &str) -> Result<ProjectView, EngineError> {
        let ((), project) = self.mutate(key, "suspend", |p, _, now| operations::suspend(p, now))?;
        info!(project = %project.id, "Project suspended");
        Ok(self.view(&project))
    }

    pub fn resume_project(&self, key: &str) -> Result<ProjectView, EngineError> {
        let (estado, project) = self.mutate(key, "resume", |p, _, _| operations::resume(p))?;
        info!(project = %project.id, estado = %estado, "Project resumed");
        Ok(self.view(&project))
    }

    pub fn cancel_project(&self, key: &str) -> Result<ProjectView, EngineError> {
        let ((), project) = self.mutate(key, "cancel", |p, _, now| operations::cancel(p, now))?;
        info!(project = %project.id, "Project cancelled");
        Ok(self.view(&project))
    }

    pub fn record_spend(&self, key: &str, gastado: Decimal) -> Result<ProjectView, EngineError> {
        let ((), project) = self.mutate(key, "record_spend", |p, _, _| {
            operations::record_spend(p, gastado)
        })?;
        info!(project = %project.id, gastado = %gastado, "Recorded spend");
        Ok(self.view(&project))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::project::{BudgetMode, ItemState, Priority, ProjectState};
    use crate::repository::InMemoryProjectRepository;
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn engine() -> Engine<InMemoryProjectRepository> {
        Engine::with_clock(
            InMemoryProjectRepository::new(),
            Config::default(),
            FixedClock::on(date(2026, 2, 1)),
        )
    }

    fn new_project(codigo: &str) -> NewProject {
        NewProject {
            codigo: codigo.to_string(),
            nombre: "Accesos".to_string(),
            descripcion: String::new(),
            prioridad: Priority::Media,
            categoria: None,
            fecha_inicio: date(2026, 1, 1),
            fecha_fin_estimada: date(2026, 6, 30),
            modo_presupuesto: BudgetMode::PorItems,
            presupuesto_asignado: Decimal::ZERO,
        }
    }

    fn new_item(nombre: &str) -> NewItem {
        NewItem {
            nombre_item: nombre.to_string(),
            descripcion: None,
            requiere_proveedor: false,
            proveedor: None,
            responsable: "ana".to_string(),
            presupuesto_planificado: Decimal::from(100),
            presupuesto_ejecutado: Decimal::ZERO,
            fecha_inicio: date(2026, 1, 10),
            duracion_dias: 5,
            item_dependencia: None,
        }
    }

    fn complete() -> ItemPatch {
        ItemPatch {
            estado: Some(ItemState::Completado),
            ..Default::default()
        }
    }

    #[test]
    fn test_rejected_command_leaves_state_intact() {
        let engine = engine();
        let id = engine.create_project(new_project("A9")).unwrap().proyecto.id;
        engine.start_project(&id).unwrap();
        engine.add_item(&id, new_item("a")).unwrap();
        let before = engine.repository().load(&id).unwrap();

        let bad = NewItem {
            duracion_dias: 0,
            ..new_item("b")
        };
        assert!(engine.add_item(&id, bad).is_err());
        assert_eq!(engine.repository().load(&id).unwrap(), before);
    }

    #[test]
    fn test_resolves_by_codigo() {
        let engine = engine();
        engine.create_project(new_project("A9")).unwrap();
        let view = engine.start_project("a9").unwrap();
        assert_eq!(view.proyecto.estado, ProjectState::EnEjecucion);
        assert_eq!(view.proyecto.version, 2);
    }

    #[test]
    fn test_versions_increment_per_command() {
        let engine = engine();
        let id = engine.create_project(new_project("A9")).unwrap().proyecto.id;
        engine.start_project(&id).unwrap();
        engine.add_item(&id, new_item("a")).unwrap();
        assert_eq!(engine.get_project(&id).unwrap().proyecto.version, 3);
    }

    #[test]
    fn test_concurrent_completion_of_last_items() {
        let engine = engine();
        let id = engine.create_project(new_project("A9")).unwrap().proyecto.id;
        engine.start_project(&id).unwrap();
        engine.add_item(&id, new_item("a")).unwrap();
        engine.add_item(&id, new_item("b")).unwrap();

        std::thread::scope(|s| {
            let handles: Vec<_> = [1, 2]
                .into_iter()
                .map(|n| {
                    let engine = &engine;
                    let id = id.as_str();
                    s.spawn(move || engine.update_item(id, n, complete()))
                })
                .collect();
            for h in handles {
                assert!(h.join().unwrap().is_ok());
            }
        });

        let view = engine.get_project(&id).unwrap();
        assert_eq!(view.resumen.items_completados, 2);
        assert!(view.elegible_para_cierre);
        assert_eq!(view.proyecto.version, 6);
    }

    #[test]
    fn test_duplicate_codigo_rejected() {
        let engine = engine();
        engine.create_project(new_project("A9")).unwrap();
        let err = engine.create_project(new_project("A9")).unwrap_err();
        assert_eq!(err.kind(), "validation_error");
        assert_eq!(engine.list_projects().unwrap().len(), 1);
    }
}

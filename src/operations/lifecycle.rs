//! Project creation and administrative lifecycle commands.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::warn;

use super::approval::withdraw_pending;
use crate::domain::validation;
use crate::error::EngineError;
use crate::project::{
    BudgetMode, Priority, Project, ProjectFrontmatter, ProjectState, TransitionBuilder,
};

/// Data for a new project.
#[derive(Debug, Clone, Deserialize)]
pub struct NewProject {
    pub codigo: String,
    pub nombre: String,
    #[serde(default)]
    pub descripcion: String,
    #[serde(default)]
    pub prioridad: Priority,
    #[serde(default)]
    pub categoria: Option<String>,
    pub fecha_inicio: NaiveDate,
    pub fecha_fin_estimada: NaiveDate,
    #[serde(default)]
    pub modo_presupuesto: BudgetMode,
    #[serde(default)]
    pub presupuesto_asignado: Decimal,
}

/// Build and validate a new `planificado` project.
///
/// `existing` is used to enforce `codigo` uniqueness.
pub fn build_project(
    id: &str,
    data: NewProject,
    existing: &[Project],
) -> Result<Project, EngineError> {
    let codigo = data.codigo.trim();
    let mut fm = ProjectFrontmatter::new(
        codigo,
        data.nombre.trim(),
        data.fecha_inicio,
        data.fecha_fin_estimada,
        data.modo_presupuesto,
    );
    fm.prioridad = data.prioridad;
    fm.categoria = data.categoria.filter(|c| !c.trim().is_empty());
    fm.presupuesto_asignado = data.presupuesto_asignado;

    let project = Project::new(id, fm, &data.descripcion);
    validation::validate_project_fields(&project)?;

    if let Some(other) = existing
        .iter()
        .find(|p| p.frontmatter.codigo.eq_ignore_ascii_case(codigo))
    {
        return Err(EngineError::validation(format!(
            "codigo '{}' is already used by project {}",
            codigo, other.id
        )));
    }

    Ok(project)
}

/// `planificado → en_ejecucion`
pub fn start(project: &mut Project) -> Result<(), EngineError> {
    let estado = project.frontmatter.estado;
    if estado != ProjectState::Planificado {
        return Err(EngineError::precondition(format!(
            "only planificado projects can be started (currently {})",
            estado
        )));
    }
    TransitionBuilder::new(project).to(ProjectState::EnEjecucion)?;
    Ok(())
}

/// Suspend a non-terminal project, remembering where it was.
///
/// A project awaiting validation has its pending request rejected and will
/// resume into `en_ejecucion`.
pub fn suspend(project: &mut Project, now: DateTime<Utc>) -> Result<(), EngineError> {
    let previous = project.frontmatter.estado;
    TransitionBuilder::new(project).to(ProjectState::Suspendido)?;

    if previous == ProjectState::EnValidacion {
        withdraw_pending(project, "suspended", now);
    }
    project.frontmatter.estado_previo = Some(match previous {
        ProjectState::EnValidacion => ProjectState::EnEjecucion,
        other => other,
    });
    Ok(())
}

/// `suspendido →` the state held before suspension.
pub fn resume(project: &mut Project) -> Result<ProjectState, EngineError> {
    let estado = project.frontmatter.estado;
    if estado != ProjectState::Suspendido {
        return Err(EngineError::precondition(format!(
            "only suspendido projects can be resumed (currently {})",
            estado
        )));
    }

    let target = project
        .frontmatter
        .estado_previo
        .unwrap_or(ProjectState::Planificado);
    TransitionBuilder::new(project).to(target)?;
    project.frontmatter.estado_previo = None;
    Ok(target)
}

/// Cancel a non-terminal project.
pub fn cancel(project: &mut Project, now: DateTime<Utc>) -> Result<(), EngineError> {
    let previous = project.frontmatter.estado;
    TransitionBuilder::new(project).to(ProjectState::Cancelado)?;

    if previous == ProjectState::EnValidacion {
        withdraw_pending(project, "cancelled", now);
    }
    project.frontmatter.estado_previo = None;
    Ok(())
}

/// Record total spend on a global-budget project.
pub fn record_spend(project: &mut Project, gastado: Decimal) -> Result<(), EngineError> {
    if project.tracks_items() {
        return Err(EngineError::precondition(format!(
            "project {} derives spend from its items; update item presupuesto_ejecutado instead",
            project.frontmatter.codigo
        )));
    }

    let estado = project.frontmatter.estado;
    if estado.is_terminal() {
        return Err(EngineError::precondition(format!(
            "spend cannot change on a {} project",
            estado
        )));
    }

    validation::validate_amount("presupuesto_gastado", gastado)?;
    if gastado > project.frontmatter.presupuesto_asignado {
        warn!(
            project = %project.id,
            asignado = %project.frontmatter.presupuesto_asignado,
            gastado = %gastado,
            "Project budget overrun"
        );
    }
    project.frontmatter.presupuesto_gastado = gastado;
    Ok(())
}

//! Read models returned by engine queries and commands.
//!
//! Views are rebuilt from the stored project on every call, so aggregates
//! and gate states are never stale.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::config::RiskConfig;
use crate::domain::{budget, dependency};
use crate::error::EngineError;
use crate::project::{
    check_closure_eligibility, ApprovalRequest, BudgetMode, Item, ItemState, Priority, Project,
    ProjectState,
};

/// Project header fields.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectSummary {
    pub id: String,
    pub codigo: String,
    pub nombre: String,
    pub descripcion: String,
    pub estado: ProjectState,
    pub prioridad: Priority,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub categoria: Option<String>,
    pub fecha_inicio: NaiveDate,
    pub fecha_fin_estimada: NaiveDate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fecha_fin_real: Option<NaiveDate>,
    pub modo_presupuesto: BudgetMode,
    pub presupuesto_asignado: Decimal,
    pub presupuesto_gastado: Decimal,
    pub version: u64,
}

impl From<&Project> for ProjectSummary {
    fn from(project: &Project) -> Self {
        let fm = &project.frontmatter;
        Self {
            id: project.id.clone(),
            codigo: fm.codigo.clone(),
            nombre: fm.nombre.clone(),
            descripcion: project.descripcion().to_string(),
            estado: fm.estado,
            prioridad: fm.prioridad,
            categoria: fm.categoria.clone(),
            fecha_inicio: fm.fecha_inicio,
            fecha_fin_estimada: fm.fecha_fin_estimada,
            fecha_fin_real: fm.fecha_fin_real,
            modo_presupuesto: fm.modo_presupuesto,
            presupuesto_asignado: fm.presupuesto_asignado,
            presupuesto_gastado: fm.presupuesto_gastado,
            version: fm.version,
        }
    }
}

/// A project with recomputed aggregates.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectView {
    pub proyecto: ProjectSummary,
    pub resumen: budget::BudgetSummary,
    /// Whether an approval request could be raised right now.
    pub elegible_para_cierre: bool,
    /// The unmet condition when not eligible.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub condicion_pendiente: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub solicitud_activa: Option<ApprovalRequest>,
}

impl ProjectView {
    pub fn build(project: &Project, today: NaiveDate, risk: &RiskConfig) -> Self {
        let condicion_pendiente = closure_blocker(project);
        Self {
            proyecto: ProjectSummary::from(project),
            resumen: budget::summarize(project, today, risk),
            elegible_para_cierre: condicion_pendiente.is_none(),
            condicion_pendiente,
            solicitud_activa: project.active_request().cloned(),
        }
    }
}

/// An item with its gate and schedule figures.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ItemView {
    #[serde(flatten)]
    pub item: Item,
    pub fecha_fin: NaiveDate,
    pub puede_iniciar: bool,
    pub estado_efectivo: ItemState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bloqueado_por: Option<u32>,
    pub sobrecosto: bool,
    pub dias_restantes: i64,
}

impl ItemView {
    pub fn build(item: &Item, items: &[Item], today: NaiveDate) -> Self {
        let fecha_fin = item.fecha_fin();
        Self {
            item: item.clone(),
            fecha_fin,
            puede_iniciar: dependency::can_start(item, items),
            estado_efectivo: dependency::effective_state(item, items),
            bloqueado_por: dependency::blocking_predecessor(item, items).map(|p| p.numero_item),
            sobrecosto: item.is_overrun(),
            dias_restantes: (fecha_fin - today).num_days(),
        }
    }

    /// Views for every item of `project`, in ledger order.
    pub fn all(project: &Project, today: NaiveDate) -> Vec<Self> {
        let items = &project.frontmatter.items;
        items.iter().map(|i| Self::build(i, items, today)).collect()
    }
}

/// Approval state of a project.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ApprovalStatusView {
    pub proyecto_id: String,
    pub codigo: String,
    pub estado_proyecto: ProjectState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub solicitud_activa: Option<ApprovalRequest>,
    /// Resolved requests, newest first.
    pub historial: Vec<ApprovalRequest>,
    pub puede_solicitar: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub condicion_pendiente: Option<String>,
}

impl ApprovalStatusView {
    pub fn build(project: &Project) -> Self {
        let condicion_pendiente = closure_blocker(project);
        Self {
            proyecto_id: project.id.clone(),
            codigo: project.frontmatter.codigo.clone(),
            estado_proyecto: project.frontmatter.estado,
            solicitud_activa: project.active_request().cloned(),
            historial: project
                .frontmatter
                .solicitudes
                .iter()
                .rev()
                .filter(|r| !r.is_pending())
                .cloned()
                .collect(),
            puede_solicitar: condicion_pendiente.is_none(),
            condicion_pendiente,
        }
    }
}

/// Result of an approval command.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ApprovalOutcome {
    pub solicitud: ApprovalRequest,
    pub proyecto: ProjectView,
}

/// Why an approval request cannot be raised now, if anything.
pub fn closure_blocker(project: &Project) -> Option<String> {
    if let Some(active) = project.active_request() {
        return Some(format!("approval request #{} is already pending", active.id));
    }

    let estado = project.frontmatter.estado;
    if estado != ProjectState::EnEjecucion {
        return Some(format!(
            "approval can only be requested while en_ejecucion (currently {})",
            estado
        ));
    }

    check_closure_eligibility(project).err().map(|e| e.to_string())
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorBody {
    pub kind: String,
    pub message: String,
}

impl From<&EngineError> for ErrorBody {
    fn from(err: &EngineError) -> Self {
        Self {
            kind: err.kind().to_string(),
            message: err.detail(),
        }
    }
}

/// The single response shape for machine-readable output.
///
/// `{"ok": true, "data": ...}` or `{"ok": false, "error": {"kind", "message"}}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Envelope<T: Serialize> {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorBody>,
}

impl<T: Serialize> Envelope<T> {
    pub fn success(data: T) -> Self {
        Self {
            ok: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn failure(err: &EngineError) -> Self {
        Self {
            ok: false,
            data: None,
            error: Some(ErrorBody::from(err)),
        }
    }

    pub fn from_result(result: Result<T, EngineError>) -> Self {
        match result {
            Ok(data) => Self::success(data),
            Err(err) => Self::failure(&err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::project::ProjectFrontmatter;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn item(numero: u32, estado: ItemState, dependencia: Option<u32>) -> Item {
        Item {
            numero_item: numero,
            nombre_item: format!("item {}", numero),
            descripcion: None,
            requiere_proveedor: false,
            proveedor: None,
            responsable: "ana".to_string(),
            presupuesto_planificado: Decimal::from(100),
            presupuesto_ejecutado: Decimal::ZERO,
            fecha_inicio: date(2026, 1, 10),
            duracion_dias: 10,
            estado,
            porcentaje_avance: if estado == ItemState::Completado { 100 } else { 0 },
            tiene_dependencia: dependencia.is_some(),
            item_dependencia: dependencia,
        }
    }

    fn project(estado: ProjectState, items: Vec<Item>) -> Project {
        let mut fm = ProjectFrontmatter::new(
            "A9",
            "Accesos",
            date(2026, 1, 1),
            date(2026, 6, 30),
            BudgetMode::PorItems,
        );
        fm.estado = estado;
        fm.items = items;
        Project::new("p1", fm, "desc")
    }

    #[test]
    fn test_item_view_gate_fields() {
        let p = project(
            ProjectState::EnEjecucion,
            vec![
                item(1, ItemState::EnProceso, None),
                item(2, ItemState::EnProceso, Some(1)),
            ],
        );
        let views = ItemView::all(&p, date(2026, 1, 15));
        assert!(views[0].puede_iniciar);
        assert!(!views[1].puede_iniciar);
        assert_eq!(views[1].estado_efectivo, ItemState::Bloqueado);
        assert_eq!(views[1].bloqueado_por, Some(1));
        assert_eq!(views[1].fecha_fin, date(2026, 1, 20));
        assert_eq!(views[1].dias_restantes, 5);
    }

    #[test]
    fn test_closure_blocker_reasons() {
        let planned = project(ProjectState::Planificado, vec![]);
        assert!(closure_blocker(&planned).unwrap().contains("currently planificado"));

        let empty = project(ProjectState::EnEjecucion, vec![]);
        assert!(closure_blocker(&empty).unwrap().contains("has none"));

        let partial = project(
            ProjectState::EnEjecucion,
            vec![
                item(1, ItemState::Completado, None),
                item(2, ItemState::Pendiente, None),
            ],
        );
        assert_eq!(closure_blocker(&partial).unwrap(), "1 of 2 items incomplete");

        let done = project(
            ProjectState::EnEjecucion,
            vec![item(1, ItemState::Completado, None)],
        );
        assert_eq!(closure_blocker(&done), None);
        assert!(ProjectView::build(&done, date(2026, 2, 1), &RiskConfig::default()).elegible_para_cierre);
    }

    #[test]
    fn test_envelope_shapes() {
        let ok = serde_json::to_value(Envelope::success(1)).unwrap();
        assert_eq!(ok, serde_json::json!({"ok": true, "data": 1}));

        let err = EngineError::not_found("project 'x' does not exist");
        let failed = serde_json::to_value(Envelope::<()>::failure(&err)).unwrap();
        assert_eq!(
            failed,
            serde_json::json!({
                "ok": false,
                "error": {"kind": "not_found", "message": "project 'x' does not exist"}
            })
        );
    }

    #[test]
    fn test_item_view_serializes_flat() {
        let p = project(ProjectState::EnEjecucion, vec![item(1, ItemState::Pendiente, None)]);
        let value = serde_json::to_value(&ItemView::all(&p, date(2026, 1, 1))[0]).unwrap();
        assert_eq!(value["numero_item"], 1);
        assert_eq!(value["estado_efectivo"], "pendiente");
        assert_eq!(value["puede_iniciar"], true);
    }
}

//! Frontmatter types and defaults for project files.

use chrono::{DateTime, Days, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Project lifecycle state.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum ProjectState {
    #[default]
    Planificado,
    EnEjecucion,
    EnValidacion,
    Cerrado,
    Suspendido,
    Cancelado,
}

impl ProjectState {
    /// Terminal states accept no further transitions.
    pub fn is_terminal(&self) -> bool {
        matches!(self, ProjectState::Cerrado | ProjectState::Cancelado)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ProjectState::Planificado => "planificado",
            ProjectState::EnEjecucion => "en_ejecucion",
            ProjectState::EnValidacion => "en_validacion",
            ProjectState::Cerrado => "cerrado",
            ProjectState::Suspendido => "suspendido",
            ProjectState::Cancelado => "cancelado",
        }
    }
}

impl fmt::Display for ProjectState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where budget and completion figures come from.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum BudgetMode {
    /// Budget fields apply directly to the project; no item ledger.
    Global,
    /// Budget and completion are derived from the item ledger.
    #[default]
    PorItems,
}

impl fmt::Display for BudgetMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BudgetMode::Global => write!(f, "global"),
            BudgetMode::PorItems => write!(f, "por_items"),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Baja,
    #[default]
    Media,
    Alta,
    Critica,
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Priority::Baja => write!(f, "baja"),
            Priority::Media => write!(f, "media"),
            Priority::Alta => write!(f, "alta"),
            Priority::Critica => write!(f, "critica"),
        }
    }
}

/// Stored state of a work item.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum ItemState {
    #[default]
    Pendiente,
    EnProceso,
    Completado,
    Bloqueado,
}

impl ItemState {
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemState::Pendiente => "pendiente",
            ItemState::EnProceso => "en_proceso",
            ItemState::Completado => "completado",
            ItemState::Bloqueado => "bloqueado",
        }
    }

    /// States that require the dependency gate to be open.
    pub fn requires_open_gate(&self) -> bool {
        matches!(self, ItemState::EnProceso | ItemState::Completado)
    }
}

impl fmt::Display for ItemState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Approval request state.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum ApprovalState {
    #[default]
    Pendiente,
    Aprobado,
    Rechazado,
}

impl fmt::Display for ApprovalState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApprovalState::Pendiente => write!(f, "pendiente"),
            ApprovalState::Aprobado => write!(f, "aprobado"),
            ApprovalState::Rechazado => write!(f, "rechazado"),
        }
    }
}

/// A unit of remediation work owned by exactly one project.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Item {
    /// Stable ordinal assigned at creation, never reused.
    pub numero_item: u32,
    pub nombre_item: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub descripcion: Option<String>,
    #[serde(default)]
    pub requiere_proveedor: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proveedor: Option<String>,
    pub responsable: String,
    pub presupuesto_planificado: Decimal,
    #[serde(default)]
    pub presupuesto_ejecutado: Decimal,
    pub fecha_inicio: NaiveDate,
    pub duracion_dias: u32,
    #[serde(default)]
    pub estado: ItemState,
    #[serde(default)]
    pub porcentaje_avance: u8,
    #[serde(default)]
    pub tiene_dependencia: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item_dependencia: Option<u32>,
}

impl Item {
    /// `fecha_inicio + duracion_dias`.
    pub fn fecha_fin(&self) -> NaiveDate {
        self.fecha_inicio
            .checked_add_days(Days::new(u64::from(self.duracion_dias)))
            .unwrap_or(NaiveDate::MAX)
    }

    /// The predecessor item number, if this item is gated.
    pub fn predecessor(&self) -> Option<u32> {
        if self.tiene_dependencia {
            self.item_dependencia
        } else {
            None
        }
    }

    /// Executed spend exceeds planned spend.
    pub fn is_overrun(&self) -> bool {
        self.presupuesto_ejecutado > self.presupuesto_planificado
    }
}

/// A closure proposal for a project.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ApprovalRequest {
    pub id: u32,
    #[serde(default)]
    pub estado: ApprovalState,
    pub solicitante: String,
    /// Assigned at request time or recorded at decision time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validador: Option<String>,
    pub fecha_solicitud: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fecha_resolucion: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comentarios: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub observaciones: Option<String>,
}

impl ApprovalRequest {
    pub fn is_pending(&self) -> bool {
        self.estado == ApprovalState::Pendiente
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProjectFrontmatter {
    pub codigo: String,
    pub nombre: String,
    #[serde(default)]
    pub estado: ProjectState,
    #[serde(default)]
    pub prioridad: Priority,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub categoria: Option<String>,
    pub fecha_inicio: NaiveDate,
    pub fecha_fin_estimada: NaiveDate,
    /// Set once on closure; immutable afterwards.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fecha_fin_real: Option<NaiveDate>,
    #[serde(default)]
    pub modo_presupuesto: BudgetMode,
    #[serde(default)]
    pub presupuesto_asignado: Decimal,
    #[serde(default)]
    pub presupuesto_gastado: Decimal,
    /// Optimistic concurrency version, incremented on every save.
    #[serde(default = "default_version")]
    pub version: u64,
    #[serde(default = "default_next_item")]
    pub siguiente_numero_item: u32,
    /// State held before a suspension, used by resume.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estado_previo: Option<ProjectState>,
    #[serde(default)]
    pub items: Vec<Item>,
    /// Approval requests, oldest first. Resolved requests are kept for audit.
    #[serde(default)]
    pub solicitudes: Vec<ApprovalRequest>,
}

fn default_version() -> u64 {
    1
}

fn default_next_item() -> u32 {
    1
}

impl ProjectFrontmatter {
    /// Create frontmatter for a new project in `planificado`.
    pub fn new(
        codigo: &str,
        nombre: &str,
        fecha_inicio: NaiveDate,
        fecha_fin_estimada: NaiveDate,
        modo_presupuesto: BudgetMode,
    ) -> Self {
        Self {
            codigo: codigo.to_string(),
            nombre: nombre.to_string(),
            estado: ProjectState::Planificado,
            prioridad: Priority::default(),
            categoria: None,
            fecha_inicio,
            fecha_fin_estimada,
            fecha_fin_real: None,
            modo_presupuesto,
            presupuesto_asignado: Decimal::ZERO,
            presupuesto_gastado: Decimal::ZERO,
            version: default_version(),
            siguiente_numero_item: default_next_item(),
            estado_previo: None,
            items: Vec::new(),
            solicitudes: Vec::new(),
        }
    }
}

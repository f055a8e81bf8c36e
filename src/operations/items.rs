//! Item ledger operations.
//!
//! Each function mutates a `Project` in place. Callers work on a clone and
//! persist it only on success, so a rejected command leaves nothing behind.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::{OverrunPolicy, RemovalPolicy};
use crate::domain::{dependency, validation};
use crate::error::EngineError;
use crate::project::{Item, ItemState, Project, ProjectState};

/// Data for a new item. New items start `pendiente` at 0%.
#[derive(Debug, Clone, Deserialize)]
pub struct NewItem {
    pub nombre_item: String,
    #[serde(default)]
    pub descripcion: Option<String>,
    #[serde(default)]
    pub requiere_proveedor: bool,
    #[serde(default)]
    pub proveedor: Option<String>,
    pub responsable: String,
    pub presupuesto_planificado: Decimal,
    #[serde(default)]
    pub presupuesto_ejecutado: Decimal,
    pub fecha_inicio: NaiveDate,
    pub duracion_dias: u32,
    #[serde(default)]
    pub item_dependencia: Option<u32>,
}

/// Partial update for an item. Absent fields are left untouched.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ItemPatch {
    pub nombre_item: Option<String>,
    /// An empty string clears the description.
    pub descripcion: Option<String>,
    pub requiere_proveedor: Option<bool>,
    /// An empty string clears the provider.
    pub proveedor: Option<String>,
    pub responsable: Option<String>,
    pub presupuesto_planificado: Option<Decimal>,
    pub presupuesto_ejecutado: Option<Decimal>,
    pub fecha_inicio: Option<NaiveDate>,
    pub duracion_dias: Option<u32>,
    pub estado: Option<ItemState>,
    pub porcentaje_avance: Option<u8>,
    pub item_dependencia: Option<u32>,
    /// Drop the dependency pointer.
    pub sin_dependencia: bool,
}

impl ItemPatch {
    pub fn is_empty(&self) -> bool {
        self.nombre_item.is_none()
            && self.descripcion.is_none()
            && self.requiere_proveedor.is_none()
            && self.proveedor.is_none()
            && self.responsable.is_none()
            && self.presupuesto_planificado.is_none()
            && self.presupuesto_ejecutado.is_none()
            && self.fecha_inicio.is_none()
            && self.duracion_dias.is_none()
            && self.estado.is_none()
            && self.porcentaje_avance.is_none()
            && self.item_dependencia.is_none()
            && !self.sin_dependencia
    }
}

/// Result of removing an item.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Removal {
    pub removed: Item,
    /// Items whose dependency on the removed item was cleared.
    pub detached: Vec<u32>,
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Items can only change while the project is planned or executing.
fn ensure_ledger_open(project: &Project) -> Result<(), EngineError> {
    if !project.tracks_items() {
        return Err(EngineError::precondition(format!(
            "project {} uses a global budget and does not track items",
            project.frontmatter.codigo
        )));
    }

    match project.frontmatter.estado {
        ProjectState::Planificado | ProjectState::EnEjecucion => Ok(()),
        other => Err(EngineError::precondition(format!(
            "items can only change while the project is planificado or en_ejecucion (currently {})",
            other
        ))),
    }
}

fn lookup(project: &Project, numero: u32) -> Result<&Item, EngineError> {
    project.item(numero).ok_or_else(|| {
        EngineError::not_found(format!(
            "item {} does not exist in project {}",
            numero, project.frontmatter.codigo
        ))
    })
}

fn ensure_gate_open(item: &Item, items: &[Item]) -> Result<(), EngineError> {
    if let Some(blocker) = dependency::blocking_predecessor(item, items) {
        return Err(EngineError::precondition(format!(
            "item {} is blocked: predecessor item {} is {}, not completado",
            item.numero_item, blocker.numero_item, blocker.estado
        )));
    }
    debug!(item = item.numero_item, "Dependency gate open");
    Ok(())
}

fn note_overrun(project: &Project, item: &Item) {
    if item.is_overrun() {
        warn!(
            project = %project.id,
            item = item.numero_item,
            planificado = %item.presupuesto_planificado,
            ejecutado = %item.presupuesto_ejecutado,
            "Item budget overrun"
        );
    }
}

/// Add an item to the ledger, assigning the next `numero_item`.
pub fn add_item(
    project: &mut Project,
    data: NewItem,
    overrun: OverrunPolicy,
) -> Result<Item, EngineError> {
    ensure_ledger_open(project)?;

    let numero = project.frontmatter.siguiente_numero_item;
    if let Some(target) = data.item_dependencia {
        dependency::validate_dependency_target(numero, target, &project.frontmatter.items)?;
    }

    let item = Item {
        numero_item: numero,
        nombre_item: data.nombre_item.trim().to_string(),
        descripcion: non_blank(data.descripcion),
        requiere_proveedor: data.requiere_proveedor,
        proveedor: non_blank(data.proveedor),
        responsable: data.responsable.trim().to_string(),
        presupuesto_planificado: data.presupuesto_planificado,
        presupuesto_ejecutado: data.presupuesto_ejecutado,
        fecha_inicio: data.fecha_inicio,
        duracion_dias: data.duracion_dias,
        estado: ItemState::Pendiente,
        porcentaje_avance: 0,
        tiene_dependencia: data.item_dependencia.is_some(),
        item_dependencia: data.item_dependencia,
    };

    validation::validate_item(&item, project, overrun)?;
    validation::validate_ledger_totals(&project.frontmatter.items, &item)?;
    note_overrun(project, &item);

    project.frontmatter.items.push(item.clone());
    project.frontmatter.siguiente_numero_item = numero + 1;
    Ok(item)
}

/// Apply a patch to an item.
///
/// Moving into `en_proceso` or `completado` requires an open dependency
/// gate. `completado` forces 100% progress and `pendiente` forces 0%; an
/// explicit progress value that contradicts the resulting state is rejected.
pub fn update_item(
    project: &mut Project,
    numero: u32,
    patch: ItemPatch,
    overrun: OverrunPolicy,
) -> Result<Item, EngineError> {
    ensure_ledger_open(project)?;
    if patch.is_empty() {
        return Err(EngineError::validation("no updates specified"));
    }
    if patch.sin_dependencia && patch.item_dependencia.is_some() {
        return Err(EngineError::validation(
            "item_dependencia and sin_dependencia cannot be combined",
        ));
    }

    let current = lookup(project, numero)?;
    let previous_state = current.estado;
    let previous_predecessor = current.predecessor();
    let mut item = current.clone();

    if let Some(nombre) = patch.nombre_item {
        item.nombre_item = nombre.trim().to_string();
    }
    if let Some(descripcion) = patch.descripcion {
        item.descripcion = non_blank(Some(descripcion));
    }
    if let Some(requiere) = patch.requiere_proveedor {
        item.requiere_proveedor = requiere;
    }
    if let Some(proveedor) = patch.proveedor {
        item.proveedor = non_blank(Some(proveedor));
    }
    if let Some(responsable) = patch.responsable {
        item.responsable = responsable.trim().to_string();
    }
    if let Some(planificado) = patch.presupuesto_planificado {
        item.presupuesto_planificado = planificado;
    }
    if let Some(ejecutado) = patch.presupuesto_ejecutado {
        item.presupuesto_ejecutado = ejecutado;
    }
    if let Some(inicio) = patch.fecha_inicio {
        item.fecha_inicio = inicio;
    }
    if let Some(duracion) = patch.duracion_dias {
        item.duracion_dias = duracion;
    }

    if patch.sin_dependencia {
        item.tiene_dependencia = false;
        item.item_dependencia = None;
    } else if let Some(target) = patch.item_dependencia {
        dependency::validate_dependency_target(numero, target, &project.frontmatter.items)?;
        item.tiene_dependencia = true;
        item.item_dependencia = Some(target);
    }

    if let Some(estado) = patch.estado {
        item.estado = estado;
        match estado {
            ItemState::Completado => item.porcentaje_avance = 100,
            ItemState::Pendiente => item.porcentaje_avance = 0,
            _ => {}
        }
    }
    if let Some(avance) = patch.porcentaje_avance {
        item.porcentaje_avance = avance;
    }

    let state_changed = item.estado != previous_state;
    let predecessor_changed = item.predecessor() != previous_predecessor;
    if (state_changed || predecessor_changed) && item.estado.requires_open_gate() {
        ensure_gate_open(&item, &project.frontmatter.items)?;
    }

    validation::validate_item(&item, project, overrun)?;
    validation::validate_ledger_totals(&project.frontmatter.items, &item)?;
    note_overrun(project, &item);

    if let Some(slot) = project.item_mut(numero) {
        *slot = item.clone();
    }
    Ok(item)
}

/// Remove a `pendiente` item.
///
/// Items that depend on it are handled per `policy`: `Reject` refuses the
/// removal and names them, `Detach` clears their dependency first.
pub fn remove_item(
    project: &mut Project,
    numero: u32,
    policy: RemovalPolicy,
) -> Result<Removal, EngineError> {
    ensure_ledger_open(project)?;

    let item = lookup(project, numero)?;
    if item.estado != ItemState::Pendiente {
        return Err(EngineError::precondition(format!(
            "item {} can only be removed while pendiente (currently {})",
            numero, item.estado
        )));
    }

    let dependents = dependency::dependents_of(numero, &project.frontmatter.items);
    if !dependents.is_empty() && policy == RemovalPolicy::Reject {
        let list = dependents
            .iter()
            .map(|n| n.to_string())
            .collect::<Vec<_>>()
            .join(", ");
        return Err(EngineError::precondition(format!(
            "item {} has dependent items ({}); detach them first",
            numero, list
        )));
    }

    for dependent in &dependents {
        if let Some(d) = project.item_mut(*dependent) {
            d.tiene_dependencia = false;
            d.item_dependencia = None;
        }
    }

    let index = project
        .frontmatter
        .items
        .iter()
        .position(|i| i.numero_item == numero)
        .ok_or_else(|| EngineError::not_found(format!("item {} does not exist", numero)))?;
    let removed = project.frontmatter.items.remove(index);

    Ok(Removal {
        removed,
        detached: dependents,
    })
}

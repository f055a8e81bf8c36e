//! Pure field validation for projects and items.

use chrono::NaiveDate;
use regex::Regex;
use rust_decimal::Decimal;

use crate::config::OverrunPolicy;
use crate::domain::budget;
use crate::error::EngineError;
use crate::project::{Item, ItemState, Project};

const CODIGO_PATTERN: &str = r"^[A-Za-z0-9][A-Za-z0-9._-]{0,63}$";

fn require_text(field: &str, value: &str) -> Result<(), EngineError> {
    if value.trim().is_empty() {
        return Err(EngineError::validation(format!("{} is required", field)));
    }
    Ok(())
}

/// Money amounts must be non-negative.
pub fn validate_amount(field: &str, value: Decimal) -> Result<(), EngineError> {
    if value.is_sign_negative() && !value.is_zero() {
        return Err(EngineError::validation(format!(
            "{} must be >= 0, got {}",
            field, value
        )));
    }
    Ok(())
}

/// Project code: alphanumeric start, then letters, digits, `.`, `_` or `-`.
pub fn validate_codigo(codigo: &str) -> Result<(), EngineError> {
    let re = Regex::new(CODIGO_PATTERN)
        .map_err(|e| EngineError::validation(format!("invalid codigo pattern: {}", e)))?;
    if !re.is_match(codigo) {
        return Err(EngineError::validation(format!(
            "codigo '{}' must start with a letter or digit and contain only letters, digits, '.', '_' or '-' (max 64)",
            codigo
        )));
    }
    Ok(())
}

/// `fecha_fin_estimada > fecha_inicio`
pub fn validate_project_schedule(
    fecha_inicio: NaiveDate,
    fecha_fin_estimada: NaiveDate,
) -> Result<(), EngineError> {
    if fecha_fin_estimada <= fecha_inicio {
        return Err(EngineError::validation(format!(
            "fecha_fin_estimada ({}) must be after fecha_inicio ({})",
            fecha_fin_estimada, fecha_inicio
        )));
    }
    Ok(())
}

pub fn validate_project_fields(project: &Project) -> Result<(), EngineError> {
    let fm = &project.frontmatter;
    validate_codigo(&fm.codigo)?;
    require_text("nombre", &fm.nombre)?;
    validate_project_schedule(fm.fecha_inicio, fm.fecha_fin_estimada)?;
    validate_amount("presupuesto_asignado", fm.presupuesto_asignado)?;
    validate_amount("presupuesto_gastado", fm.presupuesto_gastado)
}

/// Validate a complete item against its project.
///
/// Runs on the item as it would be persisted, after any patch is applied.
pub fn validate_item(
    item: &Item,
    project: &Project,
    overrun: OverrunPolicy,
) -> Result<(), EngineError> {
    let fm = &project.frontmatter;

    require_text("nombre_item", &item.nombre_item)?;
    require_text("responsable", &item.responsable)?;
    validate_amount("presupuesto_planificado", item.presupuesto_planificado)?;
    validate_amount("presupuesto_ejecutado", item.presupuesto_ejecutado)?;

    if item.duracion_dias == 0 {
        return Err(EngineError::validation("duracion_dias must be > 0"));
    }

    if item.fecha_inicio < fm.fecha_inicio {
        return Err(EngineError::validation(format!(
            "item fecha_inicio ({}) is before project fecha_inicio ({})",
            item.fecha_inicio, fm.fecha_inicio
        )));
    }

    let fecha_fin = item.fecha_fin();
    if fecha_fin > fm.fecha_fin_estimada {
        return Err(EngineError::validation(format!(
            "item fecha_fin ({}) is after project fecha_fin_estimada ({})",
            fecha_fin, fm.fecha_fin_estimada
        )));
    }

    if item.requiere_proveedor
        && item
            .proveedor
            .as_deref()
            .map(|p| p.trim().is_empty())
            .unwrap_or(true)
    {
        return Err(EngineError::validation(
            "proveedor is required when requiere_proveedor is set",
        ));
    }

    if item.porcentaje_avance > 100 {
        return Err(EngineError::validation(format!(
            "porcentaje_avance must be within 0..=100, got {}",
            item.porcentaje_avance
        )));
    }

    match item.estado {
        ItemState::Completado if item.porcentaje_avance != 100 => {
            return Err(EngineError::validation(format!(
                "completado items must be at 100% progress, got {}%",
                item.porcentaje_avance
            )));
        }
        ItemState::Pendiente if item.porcentaje_avance != 0 => {
            return Err(EngineError::validation(format!(
                "pendiente items must be at 0% progress, got {}%",
                item.porcentaje_avance
            )));
        }
        _ => {}
    }

    if item.tiene_dependencia && item.item_dependencia.is_none() {
        return Err(EngineError::validation(
            "item_dependencia is required when tiene_dependencia is set",
        ));
    }

    if overrun == OverrunPolicy::Reject && item.is_overrun() {
        return Err(EngineError::validation(format!(
            "presupuesto_ejecutado ({}) exceeds presupuesto_planificado ({})",
            item.presupuesto_ejecutado, item.presupuesto_planificado
        )));
    }

    Ok(())
}

/// The ledger with `candidate` in place must still have representable totals.
pub fn validate_ledger_totals(items: &[Item], candidate: &Item) -> Result<(), EngineError> {
    let others = items
        .iter()
        .filter(|i| i.numero_item != candidate.numero_item);
    if budget::checked_spend(others.chain(std::iter::once(candidate))).is_none() {
        return Err(EngineError::validation(
            "ledger total exceeds representable range",
        ));
    }
    Ok(())
}

//! Pure dependency gate functions over an item ledger.
//!
//! Each item has at most one predecessor. The gate is evaluated from the
//! predecessor's stored state on every read, so completing a predecessor
//! unblocks its dependents without any explicit unblocking step.

use crate::error::EngineError;
use crate::project::{Item, ItemState};

/// Find an item by its number.
fn find(items: &[Item], numero: u32) -> Option<&Item> {
    items.iter().find(|i| i.numero_item == numero)
}

/// Returns the predecessor that keeps `item` from starting, if any.
///
/// A predecessor that no longer exists in the ledger does not block.
pub fn blocking_predecessor<'a>(item: &Item, items: &'a [Item]) -> Option<&'a Item> {
    let predecessor = find(items, item.predecessor()?)?;
    if predecessor.estado == ItemState::Completado {
        None
    } else {
        Some(predecessor)
    }
}

/// `!tiene_dependencia || predecessor.estado == completado`
pub fn can_start(item: &Item, items: &[Item]) -> bool {
    blocking_predecessor(item, items).is_none()
}

/// The state surfaced to callers.
///
/// An item whose gate is closed and whose stored state is not `pendiente`
/// reads as `bloqueado`; otherwise the stored state is returned.
pub fn effective_state(item: &Item, items: &[Item]) -> ItemState {
    if item.estado != ItemState::Pendiente && !can_start(item, items) {
        ItemState::Bloqueado
    } else {
        item.estado
    }
}

/// Numbers of the items whose dependency points at `numero`.
pub fn dependents_of(numero: u32, items: &[Item]) -> Vec<u32> {
    items
        .iter()
        .filter(|i| i.predecessor() == Some(numero))
        .map(|i| i.numero_item)
        .collect()
}

/// Validate a dependency pointer for item `numero`.
///
/// The target must exist in the same ledger and must have been created
/// earlier (lower ordinal), which rules out self-references and cycles.
pub fn validate_dependency_target(
    numero: u32,
    target: u32,
    items: &[Item],
) -> Result<(), EngineError> {
    if target == numero {
        return Err(EngineError::validation(format!(
            "item {} cannot depend on itself",
            numero
        )));
    }

    if find(items, target).is_none() {
        return Err(EngineError::not_found(format!(
            "dependency target item {} does not exist in this project",
            target
        )));
    }

    if target > numero {
        return Err(EngineError::validation(format!(
            "item {} can only depend on an item created before it (got item {})",
            numero, target
        )));
    }

    Ok(())
}

//! Budget aggregation over an item ledger.
//!
//! All figures are derived fresh from the items on every call; nothing here
//! caches across mutations.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::config::RiskConfig;
use crate::domain::dependency;
use crate::project::{Item, ItemState, Project};

/// Percentages are reported with two decimal places.
const PERCENT_SCALE: u32 = 2;

/// Sums over an item collection. Independent of item order.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct ItemTotals {
    pub total_planificado: Decimal,
    pub total_ejecutado: Decimal,
    pub total_items: usize,
    pub items_completados: usize,
    pub items_pendientes: usize,
    pub items_en_proceso: usize,
    pub items_bloqueados: usize,
    pub items_con_sobrecosto: usize,
}

/// Project-level budget, progress and risk figures.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BudgetSummary {
    pub total_planificado: Decimal,
    pub total_ejecutado: Decimal,
    /// May be negative; a negative value signals an overrun.
    pub disponible: Decimal,
    pub porcentaje_gastado: Decimal,
    pub total_items: usize,
    pub items_completados: usize,
    pub items_pendientes: usize,
    pub items_en_proceso: usize,
    pub items_bloqueados: usize,
    pub items_con_sobrecosto: usize,
    pub porcentaje_avance_items: Decimal,
    pub porcentaje_tiempo_transcurrido: Decimal,
    pub dias_restantes: i64,
    pub en_riesgo: bool,
}

/// `part / whole * 100`, defined as 0 when `whole` is 0.
pub fn percentage(part: Decimal, whole: Decimal) -> Decimal {
    if whole.is_zero() {
        return Decimal::ZERO;
    }
    part.checked_div(whole)
        .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED))
        .map(|pct| pct.round_dp(PERCENT_SCALE))
        .unwrap_or(Decimal::ZERO)
}

/// Planned and executed sums, or `None` if either leaves the `Decimal` range.
pub fn checked_spend<'a>(items: impl IntoIterator<Item = &'a Item>) -> Option<(Decimal, Decimal)> {
    items
        .into_iter()
        .try_fold((Decimal::ZERO, Decimal::ZERO), |(planned, executed), item| {
            Some((
                planned.checked_add(item.presupuesto_planificado)?,
                executed.checked_add(item.presupuesto_ejecutado)?,
            ))
        })
}

/// Sum planned/executed spend and count items by effective state.
///
/// Sums saturate at `Decimal::MAX`; the ledger commands refuse items that
/// would push a total past it.
pub fn item_totals(items: &[Item]) -> ItemTotals {
    let mut totals = ItemTotals {
        total_items: items.len(),
        ..Default::default()
    };

    for item in items {
        totals.total_planificado = totals
            .total_planificado
            .checked_add(item.presupuesto_planificado)
            .unwrap_or(Decimal::MAX);
        totals.total_ejecutado = totals
            .total_ejecutado
            .checked_add(item.presupuesto_ejecutado)
            .unwrap_or(Decimal::MAX);

        if item.is_overrun() {
            totals.items_con_sobrecosto += 1;
        }

        if item.estado == ItemState::Completado {
            // Completion follows the stored state so it matches the closure gate.
            totals.items_completados += 1;
            continue;
        }

        match dependency::effective_state(item, items) {
            ItemState::Pendiente => totals.items_pendientes += 1,
            ItemState::EnProceso => totals.items_en_proceso += 1,
            ItemState::Bloqueado | ItemState::Completado => totals.items_bloqueados += 1,
        }
    }

    totals
}

/// Reference date for time figures: the closure date once set, else today.
fn reference_date(project: &Project, today: NaiveDate) -> NaiveDate {
    project.frontmatter.fecha_fin_real.unwrap_or(today)
}

/// Elapsed share of the planned schedule, clamped to `[0, 100]`.
///
/// Once `fecha_fin_real` is set the value is computed against the closure
/// date, so it stays frozen at what it was when the project closed.
pub fn elapsed_time_percentage(project: &Project, today: NaiveDate) -> Decimal {
    let fm = &project.frontmatter;
    let reference = reference_date(project, today);
    let planned_days = (fm.fecha_fin_estimada - fm.fecha_inicio).num_days();

    if planned_days <= 0 {
        return if reference >= fm.fecha_fin_estimada {
            Decimal::ONE_HUNDRED
        } else {
            Decimal::ZERO
        };
    }

    let elapsed_days = (reference - fm.fecha_inicio).num_days();
    percentage(Decimal::from(elapsed_days), Decimal::from(planned_days))
        .clamp(Decimal::ZERO, Decimal::ONE_HUNDRED)
}

/// Days until `fecha_fin_estimada`; negative once the deadline has passed.
pub fn remaining_days(project: &Project, today: NaiveDate) -> i64 {
    (project.frontmatter.fecha_fin_estimada - reference_date(project, today)).num_days()
}

/// Summarize a project.
///
/// Item-tracked projects derive every figure from the ledger; global-budget
/// projects use `presupuesto_asignado` / `presupuesto_gastado` directly.
pub fn summarize(project: &Project, today: NaiveDate, risk: &RiskConfig) -> BudgetSummary {
    let fm = &project.frontmatter;

    let totals = if project.tracks_items() {
        item_totals(&fm.items)
    } else {
        ItemTotals {
            total_planificado: fm.presupuesto_asignado,
            total_ejecutado: fm.presupuesto_gastado,
            ..Default::default()
        }
    };

    let porcentaje_gastado = percentage(totals.total_ejecutado, totals.total_planificado);
    let porcentaje_avance_items = percentage(
        Decimal::from(totals.items_completados as u64),
        Decimal::from(totals.total_items as u64),
    );
    let porcentaje_tiempo_transcurrido = elapsed_time_percentage(project, today);
    let en_riesgo = porcentaje_gastado > risk.spend_threshold
        && porcentaje_tiempo_transcurrido < risk.time_threshold;

    BudgetSummary {
        disponible: totals
            .total_planificado
            .checked_sub(totals.total_ejecutado)
            .unwrap_or(Decimal::MIN),
        total_planificado: totals.total_planificado,
        total_ejecutado: totals.total_ejecutado,
        porcentaje_gastado,
        total_items: totals.total_items,
        items_completados: totals.items_completados,
        items_pendientes: totals.items_pendientes,
        items_en_proceso: totals.items_en_proceso,
        items_bloqueados: totals.items_bloqueados,
        items_con_sobrecosto: totals.items_con_sobrecosto,
        porcentaje_avance_items,
        porcentaje_tiempo_transcurrido,
        dias_restantes: remaining_days(project, today),
        en_riesgo,
    }
}

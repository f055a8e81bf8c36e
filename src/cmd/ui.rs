//! Terminal rendering helpers.

use colored::{ColoredString, Colorize};
use rust_decimal::Decimal;

use brecha::domain::budget::BudgetSummary;
use brecha::project::{ApprovalRequest, ApprovalState, ItemState, ProjectState};
use brecha::views::{ItemView, ProjectView};

pub fn project_state(estado: ProjectState) -> ColoredString {
    let s = estado.as_str();
    match estado {
        ProjectState::Planificado => s.white(),
        ProjectState::EnEjecucion => s.yellow(),
        ProjectState::EnValidacion => s.cyan(),
        ProjectState::Cerrado => s.green(),
        ProjectState::Suspendido => s.magenta(),
        ProjectState::Cancelado => s.dimmed(),
    }
}

pub fn item_state(estado: ItemState) -> ColoredString {
    let s = estado.as_str();
    match estado {
        ItemState::Pendiente => s.white(),
        ItemState::EnProceso => s.yellow(),
        ItemState::Completado => s.green(),
        ItemState::Bloqueado => s.red(),
    }
}

pub fn approval_state(estado: ApprovalState) -> ColoredString {
    let s = estado.to_string();
    match estado {
        ApprovalState::Pendiente => s.yellow(),
        ApprovalState::Aprobado => s.green(),
        ApprovalState::Rechazado => s.red(),
    }
}

pub fn money(amount: Decimal) -> String {
    format!("{:.2}", amount)
}

pub fn percent(value: Decimal) -> String {
    format!("{}%", value.normalize())
}

pub fn print_project_line(view: &ProjectView) {
    let p = &view.proyecto;
    let risk = if view.resumen.en_riesgo {
        " RIESGO".red().bold().to_string()
    } else {
        String::new()
    };
    println!(
        "{} {} {} [{}] {} gastado{}",
        p.id.cyan(),
        p.codigo.bold(),
        p.nombre,
        project_state(p.estado),
        percent(view.resumen.porcentaje_gastado),
        risk
    );
}

pub fn print_summary(resumen: &BudgetSummary) {
    println!(
        "  Presupuesto: {} planificado, {} ejecutado, {} disponible ({} gastado)",
        money(resumen.total_planificado),
        money(resumen.total_ejecutado),
        if resumen.disponible < Decimal::ZERO {
            money(resumen.disponible).red()
        } else {
            money(resumen.disponible).normal()
        },
        percent(resumen.porcentaje_gastado)
    );
    if resumen.total_items > 0 {
        println!(
            "  Items: {} total, {} completados, {} en proceso, {} pendientes, {} bloqueados ({} avance)",
            resumen.total_items,
            resumen.items_completados,
            resumen.items_en_proceso,
            resumen.items_pendientes,
            resumen.items_bloqueados,
            percent(resumen.porcentaje_avance_items)
        );
    }
    println!(
        "  Tiempo: {} transcurrido, {} dias restantes",
        percent(resumen.porcentaje_tiempo_transcurrido),
        resumen.dias_restantes
    );
    if resumen.en_riesgo {
        println!("  {}", "En riesgo: el gasto supera el avance en el tiempo".red());
    }
}

pub fn print_item(view: &ItemView) {
    let item = &view.item;
    let gate = match view.bloqueado_por {
        Some(n) => format!(" (espera item {})", n).red().to_string(),
        None => String::new(),
    };
    let overrun = if view.sobrecosto {
        " SOBRECOSTO".red().bold().to_string()
    } else {
        String::new()
    };
    println!(
        "  #{} {} [{}] {}% {} / {} {} → {}{}{}",
        item.numero_item,
        item.nombre_item.bold(),
        item_state(view.estado_efectivo),
        item.porcentaje_avance,
        money(item.presupuesto_ejecutado),
        money(item.presupuesto_planificado),
        item.fecha_inicio,
        view.fecha_fin,
        gate,
        overrun
    );
}

pub fn print_request(request: &ApprovalRequest) {
    println!(
        "  #{} [{}] por {} el {}",
        request.id,
        approval_state(request.estado),
        request.solicitante,
        request.fecha_solicitud.format("%Y-%m-%d %H:%M")
    );
    if let Some(validador) = &request.validador {
        println!("    validador: {}", validador);
    }
    if let Some(comentarios) = &request.comentarios {
        println!("    comentarios: {}", comentarios);
    }
    if let Some(observaciones) = &request.observaciones {
        println!("    observaciones: {}", observaciones);
    }
}

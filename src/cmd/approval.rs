//! Approval command handlers for brecha CLI

use anyhow::Result;
use colored::Colorize;

use brecha::views::ApprovalOutcome;

use super::ui;
use super::{open_engine, Output};

fn print_outcome(outcome: &ApprovalOutcome, headline: &str) {
    println!(
        "{} {} {} [{}]",
        "✓".green(),
        headline,
        outcome.proyecto.proyecto.codigo.cyan(),
        ui::project_state(outcome.proyecto.proyecto.estado)
    );
    ui::print_request(&outcome.solicitud);
}

pub fn cmd_request(
    out: Output,
    key: &str,
    by: &str,
    comentarios: Option<String>,
    validador: Option<String>,
) -> Result<()> {
    let engine = open_engine()?;
    out.emit(
        engine.request_approval(key, by, comentarios, validador),
        |o| print_outcome(o, "Closure requested for"),
    )
}

pub fn cmd_approve(
    out: Output,
    key: &str,
    request: u32,
    by: &str,
    observaciones: Option<String>,
) -> Result<()> {
    let engine = open_engine()?;
    out.emit(engine.approve(key, request, by, observaciones), |o| {
        print_outcome(o, "Approved and closed")
    })
}

pub fn cmd_reject(
    out: Output,
    key: &str,
    request: u32,
    by: &str,
    observaciones: &str,
) -> Result<()> {
    let engine = open_engine()?;
    out.emit(engine.reject(key, request, by, observaciones), |o| {
        print_outcome(o, "Rejected; back in execution:")
    })
}

pub fn cmd_status(out: Output, key: &str) -> Result<()> {
    let engine = open_engine()?;
    out.emit(engine.get_approval_status(key), |status| {
        println!(
            "{} [{}]",
            status.codigo.cyan().bold(),
            ui::project_state(status.estado_proyecto)
        );
        match &status.solicitud_activa {
            Some(active) => {
                println!("\n{}", "Solicitud activa".bold());
                ui::print_request(active);
            }
            None if status.puede_solicitar => {
                println!("  {}", "Eligible for a closure request".green());
            }
            None => {
                if let Some(cond) = &status.condicion_pendiente {
                    println!("  Not eligible: {}", cond.dimmed());
                }
            }
        }
        if !status.historial.is_empty() {
            println!("\n{}", "Historial".bold());
            for request in &status.historial {
                ui::print_request(request);
            }
        }
    })
}

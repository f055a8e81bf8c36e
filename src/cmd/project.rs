//! Project command handlers for brecha CLI
//!
//! Covers creation, listing, inspection and the lifecycle transitions that
//! do not involve approval (start, suspend, resume, cancel) plus spend
//! recording for global-budget projects.

use anyhow::Result;
use colored::Colorize;
use rust_decimal::Decimal;

use brecha::operations::NewProject;
use brecha::views::{ItemView, ProjectView};

use super::ui;
use super::{open_engine, Output};
use crate::cli::ProjectAddArgs;

pub fn cmd_add(out: Output, args: ProjectAddArgs) -> Result<()> {
    let engine = open_engine()?;
    let data = NewProject {
        codigo: args.codigo,
        nombre: args.nombre,
        descripcion: args.descripcion,
        prioridad: args.prioridad.into(),
        categoria: args.categoria,
        fecha_inicio: args.inicio,
        fecha_fin_estimada: args.fin,
        modo_presupuesto: args.modo.into(),
        presupuesto_asignado: args.presupuesto,
    };
    out.emit(engine.create_project(data), |view| {
        println!(
            "{} Created project {} ({})",
            "✓".green(),
            view.proyecto.id.cyan(),
            view.proyecto.codigo.bold()
        );
    })
}

pub fn cmd_list(out: Output) -> Result<()> {
    let engine = open_engine()?;
    out.emit(engine.list_projects(), |views| {
        if views.is_empty() {
            println!("No projects. Create one with `brecha project add`.");
            return;
        }
        for view in views {
            ui::print_project_line(view);
        }
    })
}

#[derive(serde::Serialize)]
struct ProjectDetail {
    #[serde(flatten)]
    view: ProjectView,
    items: Vec<ItemView>,
}

pub fn cmd_show(out: Output, key: &str) -> Result<()> {
    let engine = open_engine()?;
    let result = engine
        .get_project(key)
        .and_then(|view| Ok(ProjectDetail { items: engine.list_items(key)?, view }));
    out.emit(result, |detail| print_detail(&detail.view, &detail.items))
}

fn print_detail(view: &ProjectView, items: &[ItemView]) {
    let p = &view.proyecto;
    println!("{} {}", p.codigo.cyan().bold(), p.nombre.bold());
    println!(
        "  ID: {}  Estado: {}  Prioridad: {}  Modo: {}",
        p.id,
        ui::project_state(p.estado),
        p.prioridad,
        p.modo_presupuesto
    );
    if let Some(categoria) = &p.categoria {
        println!("  Categoria: {}", categoria);
    }
    match p.fecha_fin_real {
        Some(real) => println!(
            "  Fechas: {} → {} (cerrado {})",
            p.fecha_inicio, p.fecha_fin_estimada, real
        ),
        None => println!("  Fechas: {} → {}", p.fecha_inicio, p.fecha_fin_estimada),
    }
    if p.presupuesto_asignado > Decimal::ZERO {
        println!("  Asignado: {}", ui::money(p.presupuesto_asignado));
    }
    ui::print_summary(&view.resumen);

    if let Some(active) = &view.solicitud_activa {
        println!("\n{}", "Solicitud activa".bold());
        ui::print_request(active);
    } else if let Some(cond) = &view.condicion_pendiente {
        println!("  Cierre: {}", cond.dimmed());
    } else {
        println!("  Cierre: {}", "elegible".green());
    }

    if !items.is_empty() {
        println!("\n{}", "Items".bold());
        for item in items {
            ui::print_item(item);
        }
    }
    if !p.descripcion.is_empty() {
        println!("\n{}", p.descripcion);
    }
}

fn print_transition(view: &ProjectView, verb: &str) {
    println!(
        "{} {} {} [{}]",
        "✓".green(),
        verb,
        view.proyecto.codigo.cyan(),
        ui::project_state(view.proyecto.estado)
    );
}

pub fn cmd_start(out: Output, key: &str) -> Result<()> {
    let engine = open_engine()?;
    out.emit(engine.start_project(key), |v| print_transition(v, "Started"))
}

pub fn cmd_suspend(out: Output, key: &str) -> Result<()> {
    let engine = open_engine()?;
    out.emit(engine.suspend_project(key), |v| {
        print_transition(v, "Suspended")
    })
}

pub fn cmd_resume(out: Output, key: &str) -> Result<()> {
    let engine = open_engine()?;
    out.emit(engine.resume_project(key), |v| print_transition(v, "Resumed"))
}

pub fn cmd_cancel(out: Output, key: &str) -> Result<()> {
    let engine = open_engine()?;
    out.emit(engine.cancel_project(key), |v| {
        print_transition(v, "Cancelled")
    })
}

pub fn cmd_spend(out: Output, key: &str, amount: Decimal) -> Result<()> {
    let engine = open_engine()?;
    out.emit(engine.record_spend(key, amount), |view| {
        println!(
            "{} Recorded spend on {}",
            "✓".green(),
            view.proyecto.codigo.cyan()
        );
        ui::print_summary(&view.resumen);
    })
}

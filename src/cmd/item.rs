//! Item command handlers for brecha CLI

use anyhow::Result;
use colored::Colorize;

use brecha::operations::{ItemPatch, NewItem};

use super::ui;
use super::{open_engine, Output};
use crate::cli::{ItemAddArgs, ItemUpdateArgs};

pub fn cmd_add(out: Output, args: ItemAddArgs) -> Result<()> {
    let engine = open_engine()?;
    let data = NewItem {
        nombre_item: args.nombre,
        descripcion: args.descripcion,
        requiere_proveedor: args.proveedor.is_some(),
        proveedor: args.proveedor,
        responsable: args.responsable,
        presupuesto_planificado: args.planificado,
        presupuesto_ejecutado: args.ejecutado,
        fecha_inicio: args.inicio,
        duracion_dias: args.duracion,
        item_dependencia: args.depende_de,
    };
    out.emit(engine.add_item(&args.project, data), |view| {
        println!(
            "{} Added item #{} to {}",
            "✓".green(),
            view.item.numero_item,
            args.project.cyan()
        );
        ui::print_item(view);
    })
}

fn patch_from(args: &ItemUpdateArgs) -> ItemPatch {
    ItemPatch {
        nombre_item: args.nombre.clone(),
        descripcion: args.descripcion.clone(),
        requiere_proveedor: args.requiere_proveedor,
        proveedor: args.proveedor.clone(),
        responsable: args.responsable.clone(),
        presupuesto_planificado: args.planificado,
        presupuesto_ejecutado: args.ejecutado,
        fecha_inicio: args.inicio,
        duracion_dias: args.duracion,
        estado: args.estado.map(Into::into),
        porcentaje_avance: args.avance,
        item_dependencia: args.depende_de,
        sin_dependencia: args.sin_dependencia,
    }
}

pub fn cmd_update(out: Output, args: ItemUpdateArgs) -> Result<()> {
    let patch = patch_from(&args);
    if patch.is_empty() {
        anyhow::bail!("Nothing to update. Pass at least one field, e.g. --estado or --avance.");
    }
    let engine = open_engine()?;
    out.emit(engine.update_item(&args.project, args.numero, patch), |view| {
        println!("{} Updated item #{}", "✓".green(), view.item.numero_item);
        ui::print_item(view);
    })
}

pub fn cmd_remove(out: Output, key: &str, numero: u32) -> Result<()> {
    let engine = open_engine()?;
    out.emit(engine.remove_item(key, numero), |removal| {
        println!(
            "{} Removed item #{} ({})",
            "✓".green(),
            removal.removed.numero_item,
            removal.removed.nombre_item
        );
        if !removal.detached.is_empty() {
            let list: Vec<String> = removal.detached.iter().map(|n| n.to_string()).collect();
            println!("  Dependency cleared on items {}", list.join(", "));
        }
    })
}

pub fn cmd_list(out: Output, key: &str) -> Result<()> {
    let engine = open_engine()?;
    out.emit(engine.list_items(key), |views| {
        if views.is_empty() {
            println!("No items.");
            return;
        }
        for view in views {
            ui::print_item(view);
        }
    })
}

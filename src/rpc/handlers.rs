//! RPC method implementations.

use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::engine::Engine;
use crate::error::EngineError;
use crate::operations::{ItemPatch, NewItem, NewProject};
use crate::repository::ProjectRepository;

use super::protocol::{SERVER_NAME, SERVER_VERSION};

/// Methods served, in the order `initialize` lists them.
pub const METHODS: &[&str] = &[
    "initialize",
    "listProjects",
    "getProject",
    "listItems",
    "getItem",
    "getApprovalStatus",
    "createProject",
    "startProject",
    "suspendProject",
    "resumeProject",
    "cancelProject",
    "recordSpend",
    "addItem",
    "updateItem",
    "removeItem",
    "requestApproval",
    "approve",
    "reject",
];

#[derive(Debug)]
pub enum HandlerError {
    MethodNotFound(String),
    InvalidParams(String),
    Engine(EngineError),
    Internal(String),
}

impl From<EngineError> for HandlerError {
    fn from(err: EngineError) -> Self {
        HandlerError::Engine(err)
    }
}

type HandlerResult = Result<Value, HandlerError>;

#[derive(Deserialize)]
struct ProjectParams {
    proyecto: String,
}

#[derive(Deserialize)]
struct ItemParams {
    proyecto: String,
    numero_item: u32,
}

#[derive(Deserialize)]
struct AddItemParams {
    proyecto: String,
    #[serde(flatten)]
    item: NewItem,
}

#[derive(Deserialize)]
struct UpdateItemParams {
    proyecto: String,
    numero_item: u32,
    #[serde(flatten)]
    patch: ItemPatch,
}

#[derive(Deserialize)]
struct SpendParams {
    proyecto: String,
    presupuesto_gastado: Decimal,
}

#[derive(Deserialize)]
struct RequestApprovalParams {
    proyecto: String,
    solicitante: String,
    #[serde(default)]
    comentarios: Option<String>,
    #[serde(default)]
    validador: Option<String>,
}

#[derive(Deserialize)]
struct ResolveParams {
    proyecto: String,
    solicitud: u32,
    validador: String,
    #[serde(default)]
    observaciones: Option<String>,
}

fn parse<T: DeserializeOwned>(params: Option<&Value>) -> Result<T, HandlerError> {
    let value = params.cloned().unwrap_or_else(|| json!({}));
    serde_json::from_value(value).map_err(|e| HandlerError::InvalidParams(e.to_string()))
}

fn to_value<T: Serialize>(value: T) -> HandlerResult {
    serde_json::to_value(value).map_err(|e| HandlerError::Internal(e.to_string()))
}

pub fn handle_method<R: ProjectRepository>(
    engine: &Engine<R>,
    method: &str,
    params: Option<&Value>,
) -> HandlerResult {
    match method {
        "initialize" => Ok(json!({
            "serverInfo": {
                "name": SERVER_NAME,
                "version": SERVER_VERSION
            },
            "organization": engine.config().organization.name,
            "methods": METHODS,
        })),

        // Queries
        "listProjects" => to_value(engine.list_projects()?),
        "getProject" => {
            let p: ProjectParams = parse(params)?;
            to_value(engine.get_project(&p.proyecto)?)
        }
        "listItems" => {
            let p: ProjectParams = parse(params)?;
            to_value(engine.list_items(&p.proyecto)?)
        }
        "getItem" => {
            let p: ItemParams = parse(params)?;
            to_value(engine.get_item(&p.proyecto, p.numero_item)?)
        }
        "getApprovalStatus" => {
            let p: ProjectParams = parse(params)?;
            to_value(engine.get_approval_status(&p.proyecto)?)
        }

        // Project commands
        "createProject" => {
            let data: NewProject = parse(params)?;
            to_value(engine.create_project(data)?)
        }
        "startProject" => {
            let p: ProjectParams = parse(params)?;
            to_value(engine.start_project(&p.proyecto)?)
        }
        "suspendProject" => {
            let p: ProjectParams = parse(params)?;
            to_value(engine.suspend_project(&p.proyecto)?)
        }
        "resumeProject" => {
            let p: ProjectParams = parse(params)?;
            to_value(engine.resume_project(&p.proyecto)?)
        }
        "cancelProject" => {
            let p: ProjectParams = parse(params)?;
            to_value(engine.cancel_project(&p.proyecto)?)
        }
        "recordSpend" => {
            let p: SpendParams = parse(params)?;
            to_value(engine.record_spend(&p.proyecto, p.presupuesto_gastado)?)
        }

        // Item commands
        "addItem" => {
            let p: AddItemParams = parse(params)?;
            to_value(engine.add_item(&p.proyecto, p.item)?)
        }
        "updateItem" => {
            let p: UpdateItemParams = parse(params)?;
            to_value(engine.update_item(&p.proyecto, p.numero_item, p.patch)?)
        }
        "removeItem" => {
            let p: ItemParams = parse(params)?;
            to_value(engine.remove_item(&p.proyecto, p.numero_item)?)
        }

        // Approval commands
        "requestApproval" => {
            let p: RequestApprovalParams = parse(params)?;
            to_value(engine.request_approval(
                &p.proyecto,
                &p.solicitante,
                p.comentarios,
                p.validador,
            )?)
        }
        "approve" => {
            let p: ResolveParams = parse(params)?;
            to_value(engine.approve(&p.proyecto, p.solicitud, &p.validador, p.observaciones)?)
        }
        "reject" => {
            let p: ResolveParams = parse(params)?;
            let observaciones = p.observaciones.unwrap_or_default();
            to_value(engine.reject(&p.proyecto, p.solicitud, &p.validador, &observaciones)?)
        }

        _ => Err(HandlerError::MethodNotFound(method.to_string())),
    }
}

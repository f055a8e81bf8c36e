//! Closure approval workflow.
//!
//! A request is raised against a project in `en_ejecucion` whose items are
//! all complete. It drives the project into `en_validacion`; approval
//! closes the project and rejection sends it back to `en_ejecucion`.

use chrono::{DateTime, Utc};

use crate::config::ApprovalConfig;
use crate::error::EngineError;
use crate::project::{
    transition_to_closed, transition_to_execution, transition_to_validation, ApprovalRequest,
    ApprovalState, Project, ProjectState,
};

fn trimmed(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn next_request_id(project: &Project) -> u32 {
    project
        .frontmatter
        .solicitudes
        .iter()
        .map(|r| r.id)
        .max()
        .unwrap_or(0)
        + 1
}

fn pending_request(project: &Project, request_id: u32) -> Result<&ApprovalRequest, EngineError> {
    let request = project.request(request_id).ok_or_else(|| {
        EngineError::not_found(format!(
            "approval request #{} does not exist for project {}",
            request_id, project.frontmatter.codigo
        ))
    })?;

    if !request.is_pending() {
        return Err(EngineError::precondition(format!(
            "approval request #{} is already {}",
            request_id, request.estado
        )));
    }
    Ok(request)
}

/// Check that `validador` may resolve `request`.
fn authorize(
    request: &ApprovalRequest,
    validador: &str,
    config: &ApprovalConfig,
) -> Result<(), EngineError> {
    if validador.trim().is_empty() {
        return Err(EngineError::validation("validador is required"));
    }

    if config.validators.is_empty() && request.validador.is_none() {
        return Err(EngineError::precondition(format!(
            "no validator designated for approval request #{}; set approval.validators or name a validador when requesting",
            request.id
        )));
    }

    if !config.is_validator(validador) {
        return Err(EngineError::precondition(format!(
            "{} is not a designated validator",
            validador
        )));
    }

    if let Some(assigned) = &request.validador {
        if !assigned.eq_ignore_ascii_case(validador.trim()) {
            return Err(EngineError::precondition(format!(
                "approval request #{} is assigned to {}",
                request.id, assigned
            )));
        }
    }

    if !config.allow_self_approval && request.solicitante.eq_ignore_ascii_case(validador.trim()) {
        return Err(EngineError::precondition(format!(
            "{} requested approval #{} and cannot resolve it",
            validador, request.id
        )));
    }

    Ok(())
}

fn resolve(
    project: &mut Project,
    request_id: u32,
    estado: ApprovalState,
    validador: &str,
    observaciones: Option<String>,
    now: DateTime<Utc>,
) -> Result<ApprovalRequest, EngineError> {
    let request = project
        .request_mut(request_id)
        .ok_or_else(|| EngineError::not_found(format!("approval request #{} does not exist", request_id)))?;
    request.estado = estado;
    request.validador = Some(validador.trim().to_string());
    request.fecha_resolucion = Some(now);
    request.observaciones = observaciones;
    Ok(request.clone())
}

/// Raise a closure request and move the project into validation.
pub fn request_approval(
    project: &mut Project,
    solicitante: &str,
    comentarios: Option<String>,
    validador: Option<String>,
    config: &ApprovalConfig,
    now: DateTime<Utc>,
) -> Result<ApprovalRequest, EngineError> {
    if solicitante.trim().is_empty() {
        return Err(EngineError::validation("solicitante is required"));
    }

    if let Some(active) = project.active_request() {
        return Err(EngineError::precondition(format!(
            "approval request #{} is already pending for project {}",
            active.id, project.frontmatter.codigo
        )));
    }

    let estado = project.frontmatter.estado;
    if estado != ProjectState::EnEjecucion {
        return Err(EngineError::precondition(format!(
            "approval can only be requested while en_ejecucion (currently {})",
            estado
        )));
    }

    let validador = trimmed(validador);
    if let Some(v) = &validador {
        if !config.is_validator(v) {
            return Err(EngineError::validation(format!(
                "{} is not a designated validator",
                v
            )));
        }
    }

    transition_to_validation(project)?;

    let request = ApprovalRequest {
        id: next_request_id(project),
        estado: ApprovalState::Pendiente,
        solicitante: solicitante.trim().to_string(),
        validador,
        fecha_solicitud: now,
        fecha_resolucion: None,
        comentarios: trimmed(comentarios),
        observaciones: None,
    };
    project.frontmatter.solicitudes.push(request.clone());
    Ok(request)
}

/// Approve a pending request, closing the project.
pub fn approve(
    project: &mut Project,
    request_id: u32,
    validador: &str,
    observaciones: Option<String>,
    config: &ApprovalConfig,
    now: DateTime<Utc>,
) -> Result<ApprovalRequest, EngineError> {
    authorize(pending_request(project, request_id)?, validador, config)?;

    transition_to_closed(project, now.date_naive())?;
    resolve(
        project,
        request_id,
        ApprovalState::Aprobado,
        validador,
        trimmed(observaciones),
        now,
    )
}

/// Reject a pending request, returning the project to execution.
///
/// Observations are mandatory. Item states are left untouched.
pub fn reject(
    project: &mut Project,
    request_id: u32,
    validador: &str,
    observaciones: &str,
    config: &ApprovalConfig,
    now: DateTime<Utc>,
) -> Result<ApprovalRequest, EngineError> {
    let request = pending_request(project, request_id)?;

    let observaciones = observaciones.trim();
    if observaciones.is_empty() {
        return Err(EngineError::validation(
            "observaciones are required to reject an approval request",
        ));
    }
    authorize(request, validador, config)?;

    transition_to_execution(project)?;
    resolve(
        project,
        request_id,
        ApprovalState::Rechazado,
        validador,
        Some(observaciones.to_string()),
        now,
    )
}

/// Resolve the pending request as `rechazado` on behalf of an
/// administrative action that takes the project out of validation.
pub(crate) fn withdraw_pending(
    project: &mut Project,
    action: &str,
    now: DateTime<Utc>,
) -> Option<ApprovalRequest> {
    let id = project.active_request()?.id;
    let request = project.request_mut(id)?;
    request.estado = ApprovalState::Rechazado;
    request.fecha_resolucion = Some(now);
    request.observaciones = Some(format!(
        "Administrative override: project {} while awaiting validation",
        action
    ));
    Some(request.clone())
}

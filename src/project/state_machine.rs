//! State machine for project lifecycle transitions.
//!
//! Provides centralized validation of status transitions with precondition checks.

use chrono::NaiveDate;
use std::fmt;

use super::frontmatter::ProjectState;
use super::parse::Project;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransitionError {
    InvalidTransition { from: ProjectState, to: ProjectState },
    IncompleteItems { incomplete: usize, total: usize },
    NoItems,
    ApprovalPending(u32),
    ClosureDateAlreadySet(NaiveDate),
}

impl fmt::Display for TransitionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransitionError::InvalidTransition { from, to } => {
                write!(f, "invalid transition from {} to {}", from, to)
            }
            TransitionError::IncompleteItems { incomplete, total } => {
                write!(f, "{} of {} items incomplete", incomplete, total)
            }
            TransitionError::NoItems => {
                write!(f, "project tracks items but has none; add at least one item")
            }
            TransitionError::ApprovalPending(id) => {
                write!(f, "approval request #{} is still pending", id)
            }
            TransitionError::ClosureDateAlreadySet(date) => {
                write!(f, "fecha_fin_real is already set to {}", date)
            }
        }
    }
}

impl std::error::Error for TransitionError {}

/// Builder for validated state transitions.
pub struct TransitionBuilder<'a> {
    project: &'a mut Project,
    require_items_completed: bool,
    require_no_pending_approval: bool,
    closure_date: Option<NaiveDate>,
}

impl<'a> TransitionBuilder<'a> {
    /// Create a new transition builder for a project.
    pub fn new(project: &'a mut Project) -> Self {
        Self {
            project,
            require_items_completed: false,
            require_no_pending_approval: false,
            closure_date: None,
        }
    }

    /// Require every item to be completed (item-tracked projects only).
    pub fn require_items_completed(mut self) -> Self {
        self.require_items_completed = true;
        self
    }

    /// Require that no approval request is pending.
    pub fn require_no_pending_approval(mut self) -> Self {
        self.require_no_pending_approval = true;
        self
    }

    /// Record the closure date; required for transitions into `cerrado`.
    pub fn closing_on(mut self, date: NaiveDate) -> Self {
        self.closure_date = Some(date);
        self
    }

    /// Execute the transition to the target state.
    pub fn to(self, target: ProjectState) -> Result<(), TransitionError> {
        let current = self.project.frontmatter.estado;

        if !is_valid_transition(current, target) {
            return Err(TransitionError::InvalidTransition {
                from: current,
                to: target,
            });
        }

        self.check_preconditions(target)?;

        if target == ProjectState::Cerrado {
            if let Some(existing) = self.project.frontmatter.fecha_fin_real {
                return Err(TransitionError::ClosureDateAlreadySet(existing));
            }
            self.project.frontmatter.fecha_fin_real = self.closure_date;
        }

        self.project.frontmatter.estado = target;
        Ok(())
    }

    fn check_preconditions(&self, _target: ProjectState) -> Result<(), TransitionError> {
        if self.require_no_pending_approval {
            if let Some(request) = self.project.active_request() {
                return Err(TransitionError::ApprovalPending(request.id));
            }
        }

        if self.require_items_completed {
            check_closure_eligibility(self.project)?;
        }

        Ok(())
    }
}

/// Check the item-completion precondition for moving into validation.
///
/// Global-budget projects are always eligible. Item-tracked projects need at
/// least one item and every item completed.
pub fn check_closure_eligibility(project: &Project) -> Result<(), TransitionError> {
    if !project.tracks_items() {
        return Ok(());
    }

    let total = project.frontmatter.items.len();
    if total == 0 {
        return Err(TransitionError::NoItems);
    }

    let incomplete = total - project.completed_items();
    if incomplete > 0 {
        return Err(TransitionError::IncompleteItems { incomplete, total });
    }

    Ok(())
}

/// Check if a transition from one state to another is valid.
pub fn is_valid_transition(from: ProjectState, to: ProjectState) -> bool {
    use ProjectState::*;

    match (from, to) {
        // Main line
        (Planificado, EnEjecucion) => true,
        (EnEjecucion, EnValidacion) => true,
        (EnValidacion, Cerrado) => true,
        (EnValidacion, EnEjecucion) => true,

        // Administrative overrides from any non-terminal state
        (Planificado | EnEjecucion | EnValidacion, Suspendido) => true,
        (Planificado | EnEjecucion | EnValidacion | Suspendido, Cancelado) => true,

        // Resume
        (Suspendido, Planificado | EnEjecucion) => true,

        _ => false,
    }
}

// ============================================================================
// PUBLIC TRANSITION HELPERS
// ============================================================================

/// Move a project into validation, gated on item completion.
pub fn transition_to_validation(project: &mut Project) -> Result<(), TransitionError> {
    TransitionBuilder::new(project)
        .require_no_pending_approval()
        .require_items_completed()
        .to(ProjectState::EnValidacion)
}

/// Close a project, setting `fecha_fin_real`.
pub fn transition_to_closed(project: &mut Project, today: NaiveDate) -> Result<(), TransitionError> {
    TransitionBuilder::new(project)
        .closing_on(today)
        .to(ProjectState::Cerrado)
}

/// Move a project into (or back into) execution.
pub fn transition_to_execution(project: &mut Project) -> Result<(), TransitionError> {
    TransitionBuilder::new(project).to(ProjectState::EnEjecucion)
}

//! Project data model, file format and lifecycle state machine.

// Submodules
mod frontmatter;
mod parse;
mod state_machine;

// Re-export types from submodules
pub use frontmatter::{
    ApprovalRequest, ApprovalState, BudgetMode, Item, ItemState, Priority, ProjectFrontmatter,
    ProjectState,
};
pub use parse::{split_frontmatter, Project};
pub use state_machine::{
    check_closure_eligibility, is_valid_transition, transition_to_closed,
    transition_to_execution, transition_to_validation, TransitionBuilder, TransitionError,
};

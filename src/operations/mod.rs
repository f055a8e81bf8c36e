//! Shared business logic layer for project operations.
//!
//! This module provides the canonical implementation of every mutation,
//! used by the engine for both CLI commands and RPC handlers.

pub mod approval;
pub mod items;
pub mod lifecycle;

pub use approval::{approve, reject, request_approval};
pub use items::{add_item, remove_item, update_item, ItemPatch, NewItem, Removal};
pub use lifecycle::{build_project, cancel, record_spend, resume, start, suspend, NewProject};

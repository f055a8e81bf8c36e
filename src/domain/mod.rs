//! Domain logic module containing pure functions.
//!
//! This module provides the dependency gate, budget aggregation and field
//! validation used by the engine. Nothing here touches storage.

pub mod budget;
pub mod dependency;
pub mod validation;

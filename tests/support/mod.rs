//! Shared test support: builders for engine inputs and a CLI harness.

#![allow(dead_code)]

pub mod builders;
pub mod harness;

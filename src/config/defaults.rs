//! Default values and configuration structs with default implementations.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Macro to generate default functions for serde attributes
macro_rules! default_fn {
    ($name:ident, $type:ty, $value:expr) => {
        pub(crate) fn $name() -> $type {
            $value
        }
    };
}

// =========================================================================
// DEFAULT VALUE FUNCTIONS
// =========================================================================

default_fn!(default_spend_threshold, Decimal, Decimal::from(80));
default_fn!(default_time_threshold, Decimal, Decimal::from(80));
default_fn!(default_organization_name, String, "brecha".to_string());

// =========================================================================
// CONFIG STRUCTS WITH DEFAULTS
// =========================================================================

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OrganizationConfig {
    pub name: String,
}

impl Default for OrganizationConfig {
    fn default() -> Self {
        Self {
            name: default_organization_name(),
        }
    }
}

/// What to do when executed spend exceeds planned spend on an item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OverrunPolicy {
    /// Accept and flag the item
    #[default]
    Warn,
    /// Refuse the update with a validation error
    Reject,
}

impl fmt::Display for OverrunPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OverrunPolicy::Warn => write!(f, "warn"),
            OverrunPolicy::Reject => write!(f, "reject"),
        }
    }
}

/// What to do when removing an item that other items depend on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RemovalPolicy {
    /// Refuse the removal and name the dependents
    #[default]
    Reject,
    /// Clear the dependency on every dependent, then remove
    Detach,
}

impl fmt::Display for RemovalPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RemovalPolicy::Reject => write!(f, "reject"),
            RemovalPolicy::Detach => write!(f, "detach"),
        }
    }
}

/// Approval workflow configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ApprovalConfig {
    /// Designated validators. When empty, only the validador named on a
    /// request may resolve it.
    #[serde(default)]
    pub validators: Vec<String>,
    /// Whether the requester may resolve their own request
    #[serde(default)]
    pub allow_self_approval: bool,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct BudgetConfig {
    #[serde(default)]
    pub overrun: OverrunPolicy,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ItemsConfig {
    #[serde(default)]
    pub remove_with_dependents: RemovalPolicy,
}

/// Thresholds for the spend-vs-time risk flag, in percent.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RiskConfig {
    /// Spend percentage above which a project may be at risk (default: 80)
    #[serde(default = "default_spend_threshold")]
    pub spend_threshold: Decimal,
    /// Elapsed time percentage below which high spend is a risk (default: 80)
    #[serde(default = "default_time_threshold")]
    pub time_threshold: Decimal,
}

impl Default for RiskConfig {
    fn default() -> Self {
        Self {
            spend_threshold: default_spend_threshold(),
            time_threshold: default_time_threshold(),
        }
    }
}

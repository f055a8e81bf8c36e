//! Validation logic for configuration.

use anyhow::Result;
use rust_decimal::Decimal;

use super::defaults::{ApprovalConfig, RiskConfig};

fn check_percentage(name: &str, value: Decimal) -> Result<()> {
    if value < Decimal::ZERO || value > Decimal::ONE_HUNDRED {
        anyhow::bail!("{} must be between 0 and 100, got {}", name, value);
    }
    Ok(())
}

impl RiskConfig {
    /// Validate risk thresholds
    pub fn validate(&self) -> Result<()> {
        check_percentage("risk.spend_threshold", self.spend_threshold)?;
        check_percentage("risk.time_threshold", self.time_threshold)
    }
}

impl ApprovalConfig {
    /// Validate approval configuration
    pub fn validate(&self) -> Result<()> {
        if let Some(blank) = self.validators.iter().position(|v| v.trim().is_empty()) {
            anyhow::bail!("approval.validators[{}] must not be empty", blank);
        }
        Ok(())
    }

    /// Whether `name` may resolve approval requests.
    pub fn is_validator(&self, name: &str) -> bool {
        self.validators.is_empty()
            || self
                .validators
                .iter()
                .any(|v| v.eq_ignore_ascii_case(name.trim()))
    }
}

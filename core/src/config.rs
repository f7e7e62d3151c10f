//! Engine configuration.
//!
//! Window parameters default to the production policy (D-3 exclusive to
//! D+60 inclusive, £1 tolerance) and may be overridden from a JSON file.

use crate::error::{EngineError, EngineResult};
use crate::resolver::WindowPolicy;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Days before the due date at which the window opens (exclusive).
    #[serde(default = "default_lead_days")]
    pub lead_days: i64,
    /// Days after the due date at which the window closes (inclusive).
    #[serde(default = "default_grace_days")]
    pub grace_days: i64,
    /// Shortfall absorbed before a bill counts as defaulted.
    #[serde(default = "default_tolerance")]
    pub tolerance: f64,
    /// Abort the run on referential-integrity violations instead of
    /// excluding and reporting the offending rows.
    #[serde(default)]
    pub strict: bool,
}

fn default_lead_days() -> i64 {
    3
}

fn default_grace_days() -> i64 {
    60
}

fn default_tolerance() -> f64 {
    1.0
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            lead_days: default_lead_days(),
            grace_days: default_grace_days(),
            tolerance: default_tolerance(),
            strict: false,
        }
    }
}

impl EngineConfig {
    /// Load a config from a JSON file, falling back to defaults for
    /// missing fields. Validates before returning.
    pub fn from_file(path: &Path) -> EngineResult<Self> {
        let raw = fs::read_to_string(path).map_err(|e| EngineError::Config {
            reason: format!("cannot read {}: {e}", path.display()),
        })?;
        let config: EngineConfig = serde_json::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> EngineResult<()> {
        if self.lead_days < 0 {
            return Err(EngineError::Config {
                reason: format!("lead_days must be >= 0, got {}", self.lead_days),
            });
        }
        if self.grace_days < 1 {
            return Err(EngineError::Config {
                reason: format!("grace_days must be >= 1, got {}", self.grace_days),
            });
        }
        if !self.tolerance.is_finite() || self.tolerance < 0.0 {
            return Err(EngineError::Config {
                reason: format!("tolerance must be finite and >= 0, got {}", self.tolerance),
            });
        }
        Ok(())
    }

    pub fn window_policy(&self) -> WindowPolicy {
        WindowPolicy {
            lead_days: self.lead_days,
            grace_days: self.grace_days,
            tolerance: self.tolerance,
        }
    }
}

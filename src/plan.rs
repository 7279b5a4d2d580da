//! Plan record: the static configuration a session runs against.
//!
//! The record is read once at startup, either from the built-in
//! `data/plan.json` or from a user-supplied JSON file with the same shape.
//! It is never mutated afterwards.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

// ============================================================================
// CONSTANTS
// ============================================================================

/// Built-in plan used when no `--plan` file is given.
pub const BUILTIN_PLAN_JSON: &str = include_str!("../data/plan.json");

// ============================================================================
// TYPES
// ============================================================================

/// Data allowance and its display metadata.
///
/// Amounts are in megabytes. `currency` is a display label only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanRecord {
    pub user_id: String,
    pub user_name: String,
    pub plan_name: String,
    #[serde(rename = "totalDataMB")]
    pub total_data_mb: f64,
    #[serde(rename = "initialUsedMB")]
    pub initial_used_mb: f64,
    pub currency: String,
}

/// Error while loading a plan record.
#[derive(Debug, Error)]
pub enum PlanError {
    #[error("cannot read plan file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed plan JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid plan: {0}")]
    Invalid(String),
}

// ============================================================================
// LOADING
// ============================================================================

impl PlanRecord {
    /// Parse and validate a plan from JSON text.
    pub fn from_json(text: &str) -> Result<Self, PlanError> {
        let plan: PlanRecord = serde_json::from_str(text)?;
        plan.validate()?;
        Ok(plan)
    }

    /// The plan compiled into the binary.
    pub fn builtin() -> Result<Self, PlanError> {
        Self::from_json(BUILTIN_PLAN_JSON)
    }

    fn validate(&self) -> Result<(), PlanError> {
        if !self.total_data_mb.is_finite() || self.total_data_mb < 0.0 {
            return Err(PlanError::Invalid(format!(
                "totalDataMB must be a non-negative number, got {}",
                self.total_data_mb
            )));
        }
        if !self.initial_used_mb.is_finite() || self.initial_used_mb < 0.0 {
            return Err(PlanError::Invalid(format!(
                "initialUsedMB must be a non-negative number, got {}",
                self.initial_used_mb
            )));
        }
        Ok(())
    }
}

/// Load the plan from `path`, or the built-in plan when `path` is None.
pub fn load_plan(path: Option<&Path>) -> Result<PlanRecord, PlanError> {
    match path {
        Some(path) => {
            let text = fs::read_to_string(path).map_err(|source| PlanError::Io {
                path: path.to_path_buf(),
                source,
            })?;
            let plan = PlanRecord::from_json(&text)?;
            tracing::info!(path = %path.display(), plan = %plan.plan_name, "loaded plan file");
            Ok(plan)
        }
        None => PlanRecord::builtin(),
    }
}

// ============================================================================
// TESTS
// ============================================================================

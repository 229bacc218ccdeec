//! Core types for the simulation engine

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Defect identifier, unique within one trial.
///
/// Ids are assigned from a monotonic per-trial counter; a resumed trial
/// continues from one past the highest id in the loaded ledger.
pub type DefectId = u64;

/// The full lifecycle ledger of a trial, keyed by defect id.
pub type DefectLog = BTreeMap<DefectId, DefectRecord>;

/// A category of defect with a fixed service priority
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefectType {
    pub name: String,
    /// Lower rank is serviced first
    pub priority: i32,
    /// Defects of this type already backlogged when the simulation starts
    pub initial_backlog: usize,
}

/// Lifecycle record for a single defect
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DefectRecord {
    pub defect_type: String,
    /// Simulated hour at which the defect was created
    pub created_at: f64,
    /// Service time in hours, sampled once at creation and fixed for life
    pub remediation_time: f64,
    /// Set when the defect is first admitted into a resource slot
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub processing_start_time: Option<f64>,
    /// Set when service completes; absent means still unresolved
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub processing_end_time: Option<f64>,
    /// Index of the resource slot servicing (or last servicing) the defect
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_resource: Option<usize>,
}

impl DefectRecord {
    pub fn new(defect_type: impl Into<String>, created_at: f64, remediation_time: f64) -> Self {
        DefectRecord {
            defect_type: defect_type.into(),
            created_at,
            remediation_time,
            processing_start_time: None,
            processing_end_time: None,
            assigned_resource: None,
        }
    }

    pub fn is_completed(&self) -> bool {
        self.processing_end_time.is_some()
    }

    pub fn has_started(&self) -> bool {
        self.processing_start_time.is_some()
    }
}

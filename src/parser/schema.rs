//! Output JSON schema definitions for stack reports.
//!
//! This module defines the structure of JSON files we write to disk.
//! Schema is versioned to allow future evolution.

use serde::{Deserialize, Serialize};

/// Top-level report structure written to JSON
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StackReport {
    /// Schema version for compatibility checking
    pub version: String,

    /// Entry point the estimate is computed from
    pub root: String,

    /// Worst-case stack bytes reachable from the root
    pub total_stack_usage: u64,

    /// Stack budget the estimate was checked against
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub budget: Option<u64>,

    /// Deepest call chain, root first
    pub worst_case_path: Vec<PathEntry>,

    /// Largest individual frames reachable from the root
    pub heaviest_frames: Vec<PathEntry>,

    /// Functions in the call listing without a usage record (assumed 0 bytes)
    pub unknown_functions: Vec<String>,

    /// Functions whose recorded frame size is only a lower bound
    pub dynamic_frames: Vec<String>,

    /// Number of functions known to the analysis
    pub function_count: usize,

    /// Number of distinct call edges
    pub edge_count: usize,

    /// Timestamp when report was generated
    pub generated_at: String,
}

impl StackReport {
    /// Whether the estimate fits in the budget (true if no budget was given)
    pub fn within_budget(&self) -> bool {
        self.budget
            .map_or(true, |budget| self.total_stack_usage <= budget)
    }
}

/// One function in a reported path or ranking
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathEntry {
    pub function: String,

    /// Own frame in bytes, absent if unknown
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub own_usage: Option<u64>,

    /// Worst-case bytes from this function down
    pub total_usage: u64,

    /// Share of the root's total taken by this function's own frame
    pub percentage: f64,
}

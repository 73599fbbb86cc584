//! Calculate metrics over the estimated call graph.
//!
//! The worst-case path is the call chain that produces the headline figure.
//! It and the heaviest individual frames are the primary targets when the
//! firmware does not fit its stack.

use crate::parser::schema::PathEntry;
use crate::parser::usage::{FunctionRecord, UsageTable};
use indexmap::IndexSet;
use log::debug;

/// Follow the deepest callee from `root` down to a leaf
///
/// **Public** - main entry point for path reporting
///
/// Must run after the estimator; functions without a total stop the walk.
/// Ties go to the callee seen first in the listing.
///
/// # Returns
/// Path entries from the root to the leaf, empty if `root` has no total
pub fn worst_case_path(table: &UsageTable, root: &str) -> Vec<PathEntry> {
    let Some(root_total) = table.get(root).and_then(|r| r.total_usage) else {
        return Vec::new();
    };

    let mut path = Vec::new();
    let mut seen: IndexSet<&str> = IndexSet::new();
    let mut current = table.get(root);

    while let Some(record) = current {
        if !seen.insert(record.name.as_str()) {
            break;
        }
        path.push(create_path_entry(record, root_total));

        current = record
            .callees
            .iter()
            .filter_map(|name| table.get(name))
            .filter(|callee| callee.total_usage.is_some())
            .fold(None, |best: Option<&FunctionRecord>, callee| match best {
                Some(b) if b.total_usage >= callee.total_usage => Some(b),
                _ => Some(callee),
            });
    }

    debug!("Worst-case path from {} has {} frames", root, path.len());

    path
}

/// Largest own frames among functions reachable from `root`
///
/// **Public** - ranking for the report
///
/// # Arguments
/// * `table` - Estimated function table
/// * `root` - Entry point
/// * `top_n` - Number of entries to return
pub fn heaviest_frames(table: &UsageTable, root: &str, top_n: usize) -> Vec<PathEntry> {
    let root_total = table
        .get(root)
        .and_then(|r| r.total_usage)
        .unwrap_or(0);

    let mut records: Vec<&FunctionRecord> = reachable_functions(table, root)
        .into_iter()
        .filter_map(|name| table.get(name))
        .filter(|r| r.own_usage.is_some())
        .collect();

    // Stable sort keeps listing order among equal frames
    records.sort_by(|a, b| b.own_usage.cmp(&a.own_usage));

    records
        .into_iter()
        .take(top_n)
        .map(|r| create_path_entry(r, root_total))
        .collect()
}

/// Names reachable from `root`, root first, in depth-first discovery order
pub fn reachable_functions<'a>(table: &'a UsageTable, root: &'a str) -> Vec<&'a str> {
    let mut visited: IndexSet<&str> = IndexSet::new();
    let mut pending = vec![root];

    while let Some(name) = pending.pop() {
        let Some(record) = table.get(name) else {
            continue;
        };
        if !visited.insert(record.name.as_str()) {
            continue;
        }
        pending.extend(record.callees.iter().rev().map(String::as_str));
    }

    visited.into_iter().collect()
}

/// Create a PathEntry from a function record
///
/// **Public** - used by tests and the report builder
pub fn create_path_entry(record: &FunctionRecord, root_total: u64) -> PathEntry {
    let percentage = if root_total > 0 {
        (record.effective_usage() as f64 / root_total as f64) * 100.0
    } else {
        0.0
    };

    PathEntry {
        function: record.name.clone(),
        own_usage: record.own_usage,
        total_usage: record.total_usage.unwrap_or(0),
        percentage,
    }
}

/// Calculate frame size statistics over the functions reachable from `root`
///
/// **Public** - provides summary statistics
pub fn calculate_frame_distribution(table: &UsageTable, root: &str) -> FrameDistribution {
    let reachable = reachable_functions(table, root);
    if reachable.is_empty() {
        return FrameDistribution::default();
    }

    let mut frames: Vec<u64> = Vec::new();
    let mut unknown_count = 0;
    for record in reachable.iter().filter_map(|name| table.get(name)) {
        match record.own_usage {
            Some(usage) => frames.push(usage),
            None => unknown_count += 1,
        }
    }
    frames.sort_unstable();

    let total: u64 = frames.iter().sum();
    let mean = total / frames.len().max(1) as u64;
    let median = if frames.is_empty() {
        0
    } else {
        frames[frames.len() / 2]
    };

    FrameDistribution {
        function_count: reachable.len(),
        known_count: frames.len(),
        unknown_count,
        mean_frame: mean,
        median_frame: median,
        max_frame: frames.last().copied().unwrap_or(0),
        path_depth: worst_case_path(table, root).len(),
    }
}

/// Frame size statistics
///
/// **Public** - returned from calculate_frame_distribution
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrameDistribution {
    /// Functions reachable from the root
    pub function_count: usize,

    /// Reachable functions with a usage record
    pub known_count: usize,

    /// Reachable functions assumed to use 0 bytes
    pub unknown_count: usize,

    /// Mean own frame over known functions
    pub mean_frame: u64,

    /// Median own frame over known functions
    pub median_frame: u64,

    /// Largest own frame
    pub max_frame: u64,

    /// Number of frames on the worst-case path
    pub path_depth: usize,
}

impl FrameDistribution {
    /// Get human-readable summary
    ///
    /// **Public** - for logging and debugging
    pub fn summary(&self) -> String {
        format!(
            "Functions: {} ({} unknown) | Mean frame: {} | Median: {} | Max: {} | Worst path depth: {}",
            self.function_count,
            self.unknown_count,
            self.mean_frame,
            self.median_frame,
            self.max_frame,
            self.path_depth
        )
    }
}

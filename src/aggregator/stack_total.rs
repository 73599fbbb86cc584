//! Worst-case stack totals over the call graph.
//!
//! For every function reachable from the entry point:
//!
//! ```text
//! total(f) = own(f) + max(total(c) for c in callees(f), default 0)
//! ```
//!
//! Callees run one after another, so only the deepest one counts. Totals are
//! memoized in [`FunctionRecord::total_usage`] and never recomputed.
//!
//! The walk is an explicit depth-first traversal rather than host recursion.
//! Functions currently on the walk path are "in progress"; reaching one of
//! them again means the graph recurses and there is no finite bound.
//!
//! [`FunctionRecord::total_usage`]: crate::parser::usage::FunctionRecord::total_usage

use crate::parser::usage::UsageTable;
use crate::utils::error::EstimateError;
use indexmap::IndexSet;
use log::debug;

/// A function whose callees are still being visited
struct Frame {
    name: String,
    callees: Vec<String>,
    next: usize,
    deepest: u64,
}

impl Frame {
    fn new(name: String, table: &UsageTable) -> Result<Self, EstimateError> {
        let record = table
            .get(&name)
            .ok_or_else(|| EstimateError::UnknownFunction(name.clone()))?;
        Ok(Self {
            callees: record.callees.iter().cloned().collect(),
            name,
            next: 0,
            deepest: 0,
        })
    }
}

/// Compute `total_usage` for every function reachable from `root`
///
/// Returns the root's total, the headline stack estimate. Calling this again
/// on the same table returns the memoized value without touching any record.
///
/// # Errors
/// * `EstimateError::UnknownFunction` - `root` (or a callee) is not in `table`
/// * `EstimateError::RecursionDetected` - a function is reachable from itself;
///   the cycle is reported starting and ending at the re-entered function
pub fn estimate_stack_usage(table: &mut UsageTable, root: &str) -> Result<u64, EstimateError> {
    let record = table
        .get(root)
        .ok_or_else(|| EstimateError::UnknownFunction(root.to_string()))?;
    if let Some(total) = record.total_usage {
        return Ok(total);
    }

    // Names on the current walk path, in order
    let mut in_progress: IndexSet<String> = IndexSet::new();
    in_progress.insert(root.to_string());

    let mut frames = vec![Frame::new(root.to_string(), table)?];
    let mut computed = 0usize;
    let mut root_total = 0u64;

    while let Some(frame) = frames.last_mut() {
        if frame.next < frame.callees.len() {
            let callee = frame.callees[frame.next].clone();
            frame.next += 1;

            let record = table
                .get(&callee)
                .ok_or_else(|| EstimateError::UnknownFunction(callee.clone()))?;

            if let Some(total) = record.total_usage {
                frame.deepest = frame.deepest.max(total);
                continue;
            }

            if let Some(start) = in_progress.get_index_of(&callee) {
                let mut cycle: Vec<String> = in_progress.iter().skip(start).cloned().collect();
                cycle.push(callee);
                return Err(EstimateError::RecursionDetected { cycle });
            }

            in_progress.insert(callee.clone());
            frames.push(Frame::new(callee, table)?);
            continue;
        }

        let Some(done) = frames.pop() else { break };
        in_progress.shift_remove(&done.name);

        let record = table
            .get_mut(&done.name)
            .ok_or_else(|| EstimateError::UnknownFunction(done.name.clone()))?;
        let total = record.effective_usage().saturating_add(done.deepest);
        record.total_usage = Some(total);
        computed += 1;

        match frames.last_mut() {
            Some(parent) => parent.deepest = parent.deepest.max(total),
            None => root_total = total,
        }
    }

    debug!(
        "Computed stack totals for {} functions, {} = {} bytes",
        computed, root, root_total
    );

    Ok(root_total)
}

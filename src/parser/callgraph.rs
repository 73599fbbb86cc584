//! Call graph reconstruction from an indented cflow listing.
//!
//! cflow prints a depth-first walk of the call tree, one function per line,
//! nesting encoded as leading whitespace:
//!
//! ```text
//! main() <int main (void) at msmpdbg.c:300>:
//!     SystemInit() <void SystemInit (void) at ch32fun.c:1200>:
//!     StartTransmit() <void StartTransmit (void) at msmpdbg.c:330>:
//!         printf()
//! ```
//!
//! The builder walks the lines while keeping the current call path, turning
//! each line into an edge from its parent on that path.

use crate::parser::usage::UsageTable;
use crate::utils::error::ParseError;
use log::{debug, warn};
use once_cell::sync::Lazy;
use regex::Regex;

static CALL_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?P<indent>\s*)(?P<name>[_0-9a-zA-Z]+)\(\)").expect("call line pattern is valid")
});

/// Result of building the call graph
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallGraph {
    /// Entry point: the first function named in the listing
    pub root: String,

    /// Functions referenced by the listing without a usage record, in first-seen order
    pub unknown_functions: Vec<String>,

    /// Later top-level entries; they get no incoming edge and their
    /// callees are attached to the root
    pub extra_roots: Vec<String>,

    /// Number of listing lines consumed
    pub line_count: usize,
}

impl CallGraph {
    /// Warning text naming every function assumed to use 0 bytes
    pub fn unknown_summary(&self) -> Option<String> {
        if self.unknown_functions.is_empty() {
            return None;
        }
        Some(format!(
            "No stack usage record, assuming 0 bytes: {}",
            self.unknown_functions.join(", ")
        ))
    }

    /// Note naming later top-level entries
    ///
    /// Only their own frames are left out; their callees hang off the root.
    pub fn extra_roots_summary(&self) -> Option<String> {
        if self.extra_roots.is_empty() {
            return None;
        }
        Some(format!(
            "Top-level entries whose callees were attached to {}: {}",
            self.root,
            self.extra_roots.join(", ")
        ))
    }
}

/// One matched listing line
struct CallLine<'a> {
    indent: usize,
    name: &'a str,
}

fn match_call_line(line: &str) -> Option<CallLine<'_>> {
    let caps = CALL_LINE.captures(line)?;
    let indent = caps.name("indent")?.as_str().len();
    let name = caps.name("name")?.as_str();
    Some(CallLine { indent, name })
}

/// Converts raw indentation into nesting depth
///
/// The unit is learned from the first line that is deeper than the entry
/// point and then enforced for every following line.
struct IndentTracker {
    baseline: usize,
    unit: Option<usize>,
}

impl IndentTracker {
    fn new(baseline: usize) -> Self {
        Self {
            baseline,
            unit: None,
        }
    }

    fn depth(&mut self, indent: usize, line_no: usize, line: &str) -> Result<usize, ParseError> {
        let inconsistent = |reason: String| ParseError::InconsistentIndent {
            line_no,
            line: line.to_string(),
            reason,
        };

        if indent < self.baseline {
            return Err(inconsistent(format!(
                "indented {} columns, entry point is at {}",
                indent, self.baseline
            )));
        }

        let offset = indent - self.baseline;
        if offset == 0 {
            return Ok(0);
        }

        let unit = *self.unit.get_or_insert_with(|| {
            debug!("Inferred call listing indent unit: {} columns", offset);
            offset
        });

        if offset % unit != 0 {
            return Err(inconsistent(format!(
                "offset {} is not a multiple of the indent unit {}",
                offset, unit
            )));
        }

        Ok(offset / unit)
    }
}

/// Build the call graph from listing lines into `table`
///
/// Functions not already in `table` are inserted with unknown own usage and
/// reported in [`CallGraph::unknown_functions`]. Callee sets are deduplicated,
/// so a function calling the same callee from several call sites gets a single
/// edge.
///
/// # Errors
/// * `ParseError::EmptyListing` - no non-blank lines
/// * `ParseError::MalformedCallLine` - a line without a `name()` entry
/// * `ParseError::InconsistentIndent` - indentation that does not fit the
///   inferred unit, drops below the entry point, or skips a nesting level
pub fn build_call_graph<S: AsRef<str>>(
    table: &mut UsageTable,
    lines: &[S],
) -> Result<CallGraph, ParseError> {
    let mut call_path: Vec<String> = Vec::new();
    let mut indents: Option<IndentTracker> = None;
    let mut prev_depth = 0usize;
    let mut unknown_functions = Vec::new();
    let mut extra_roots = Vec::new();
    let mut line_count = 0usize;

    for (idx, raw) in lines.iter().enumerate() {
        let line = raw.as_ref();
        if line.trim().is_empty() {
            continue;
        }
        let line_no = idx + 1;
        line_count += 1;

        let call = match_call_line(line).ok_or_else(|| ParseError::MalformedCallLine {
            line_no,
            line: line.to_string(),
        })?;

        if table.ensure(call.name) {
            unknown_functions.push(call.name.to_string());
        }

        let tracker = match indents.as_mut() {
            Some(tracker) => tracker,
            None => {
                // First line anchors the listing
                indents = Some(IndentTracker::new(call.indent));
                call_path.push(call.name.to_string());
                continue;
            }
        };

        let depth = tracker.depth(call.indent, line_no, line)?;

        if depth > prev_depth + 1 {
            return Err(ParseError::InconsistentIndent {
                line_no,
                line: line.to_string(),
                reason: format!("jumps from depth {} to {}", prev_depth, depth),
            });
        }
        prev_depth = depth;

        if depth == 0 {
            debug!("Additional top-level entry: {}", call.name);
            call_path.truncate(1);
            extra_roots.push(call.name.to_string());
            continue;
        }

        // Drop everything at or below the new line's level; what remains on
        // top is its parent.
        call_path.truncate(depth);
        if let Some(parent) = call_path.last() {
            table.add_call(parent, call.name);
        }
        call_path.push(call.name.to_string());
    }

    let root = call_path
        .into_iter()
        .next()
        .ok_or(ParseError::EmptyListing)?;

    debug!(
        "Built call graph rooted at {}: {} functions, {} edges",
        root,
        table.len(),
        table.edge_count()
    );

    let graph = CallGraph {
        root,
        unknown_functions,
        extra_roots,
        line_count,
    };

    if let Some(summary) = graph.unknown_summary() {
        warn!("{}", summary);
    }

    Ok(graph)
}

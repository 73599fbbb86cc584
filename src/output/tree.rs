//! Annotated call tree for human inspection.
//!
//! Every call path is expanded, so a shared callee appears once under each
//! caller. Each line carries the function's own frame and its worst-case total:
//!
//! ```text
//! main        [8 total=32]
//!   init      [16 total=16]
//!   run       [24 total=24]
//!     printf  [? total=0]
//! ```

use crate::parser::usage::{FunctionRecord, UsageTable};
use crate::utils::config::{TREE_INDENT, UNKNOWN_USAGE_MARK};
use std::fmt::Write;

/// Visit every node of the call tree below `root` in print order
///
/// The callback gets the nesting depth, the record, and whether the node
/// re-enters a function already on its own path (its children are then not
/// expanded).
fn walk_tree<'a, F>(table: &'a UsageTable, root: &str, mut visit: F)
where
    F: FnMut(usize, &'a FunctionRecord, bool),
{
    let mut pending: Vec<(usize, &str)> = vec![(0, root)];
    let mut path: Vec<&str> = Vec::new();

    while let Some((depth, name)) = pending.pop() {
        let Some(record) = table.get(name) else {
            continue;
        };
        path.truncate(depth);

        let recursive = path.contains(&record.name.as_str());
        visit(depth, record, recursive);
        if recursive {
            continue;
        }

        path.push(record.name.as_str());
        pending.extend(
            record
                .callees
                .iter()
                .rev()
                .map(|callee| (depth + 1, callee.as_str())),
        );
    }
}

/// Width of the widest indented name in the tree
pub fn calculate_print_width(table: &UsageTable, root: &str) -> usize {
    let mut width = 0;
    walk_tree(table, root, |depth, record, _| {
        width = width.max(TREE_INDENT.len() * depth + record.name.len());
    });
    width
}

/// Render the call tree below `root`, one function per line
///
/// Names are padded to a common column so the annotations line up. Unknown
/// own usage shows as `?`, a missing total as `-`.
pub fn render_tree(table: &UsageTable, root: &str) -> String {
    let width = calculate_print_width(table, root);
    let mut out = String::new();

    walk_tree(table, root, |depth, record, recursive| {
        let indent = TREE_INDENT.repeat(depth);
        let own = record
            .own_usage
            .map_or_else(|| UNKNOWN_USAGE_MARK.to_string(), |u| u.to_string());
        let total = record
            .total_usage
            .map_or_else(|| "-".to_string(), |t| t.to_string());
        let pad = width - indent.len() - record.name.len();

        // Writing into a String cannot fail
        let _ = write!(
            out,
            "{}{}{}  [{} total={}]",
            indent,
            record.name,
            " ".repeat(pad),
            own,
            total
        );
        if recursive {
            out.push_str(" (recursive)");
        }
        out.push('\n');
    });

    out
}

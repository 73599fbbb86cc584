//! Output writers for stack reports.
//!
//! This module handles:
//! - JSON reports
//! - The annotated call tree printed under `--verbose`

pub mod json;
pub mod tree;

// Re-export main functions
pub use json::{read_report, report_to_string, write_report};
pub use tree::{calculate_print_width, render_tree};

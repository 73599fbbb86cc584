//! Input parsing and report schema definitions.
//!
//! This module handles:
//! - Parsing GCC `.su` stack usage records
//! - Rebuilding the call graph from an indented cflow listing
//! - Defining the JSON report schema

pub mod callgraph;
pub mod schema;
pub mod usage;

// Re-export main types
pub use callgraph::{build_call_graph, CallGraph};
pub use schema::{PathEntry, StackReport};
pub use usage::{parse_usage_line, parse_usage_lines, FrameKind, FunctionRecord, UsageTable};

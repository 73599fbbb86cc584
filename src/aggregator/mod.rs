//! Aggregation of the call graph into stack totals and metrics.
//!
//! This module transforms the parsed call graph into:
//! - Worst-case stack totals per function
//! - The worst-case call path
//! - Frame size statistics

pub mod metrics;
pub mod stack_total;

// Re-export main types and functions
pub use metrics::{
    calculate_frame_distribution, heaviest_frames, reachable_functions, worst_case_path,
    FrameDistribution,
};
pub use stack_total::estimate_stack_usage;

//! Stack Estimate
//!
//! Worst-case call-stack depth estimation for embedded firmware.
//!
//! Combines GCC `-fstack-usage` records (`.su` files) with a cflow call
//! listing and computes, for the entry point, the largest sum of frame sizes
//! along any call path.
//!
//! This crate provides the core implementation for the
//! `stack-estimate` CLI tool.
//!
//! ## Getting Started
//!
//! ```bash
//! stack-estimate -v analyze --su-file build/main.su main.c driver.c
//! ```
//!
//! ## Library use
//!
//! ```
//! use stack_estimate::commands::analyze_lines;
//!
//! let usage = ["main.c:3:5:main 16 static", "main.c:9:6:work 40 static"];
//! let listing = ["main() <int main (void) at main.c:3>:", "    work() <void work (void) at main.c:9>:"];
//! let analysis = analyze_lines(&usage, &listing).unwrap();
//! assert_eq!(analysis.total, 56);
//! ```

pub mod aggregator;
pub mod commands;
pub mod output;
pub mod parser;
pub mod toolchain;
pub mod utils;

//! External tools and files the analysis consumes.
//!
//! - `.su` file selection (GCC `-fstack-usage` output)
//! - cflow, the call listing generator
//! - make, for sources whose path only the build knows

pub mod cflow;
pub mod make;
pub mod process;
pub mod su_files;

pub use cflow::CflowRunner;
pub use make::resolve_make_path;
pub use su_files::{find_latest_usage_file, read_lines};

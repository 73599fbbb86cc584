//! Configuration and constants for the CLI.

/// Current report schema version
pub const SCHEMA_VERSION: &str = "1.0.0";

/// Where GCC leaves `-fstack-usage` output when building through a temp dir
pub const DEFAULT_SU_DIR: &str = "/tmp";

/// File-name glob for stack usage records
pub const DEFAULT_SU_PATTERN: &str = "*.su";

/// Call-graph generator invoked when no pre-generated listing is given
pub const DEFAULT_CFLOW_PROGRAM: &str = "cflow";

/// Build tool used to resolve the extra source path
pub const MAKE_PROGRAM: &str = "make";

// Tree rendering
pub const TREE_INDENT: &str = "  ";
pub const UNKNOWN_USAGE_MARK: &str = "?";

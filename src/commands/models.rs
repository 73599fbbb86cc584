use crate::utils::config::{DEFAULT_CFLOW_PROGRAM, DEFAULT_SU_DIR, DEFAULT_SU_PATTERN};
use std::path::PathBuf;

/// Arguments for the analyze command
///
/// **Public** - used by main.rs to construct from CLI args
#[derive(Debug, Clone)]
pub struct AnalyzeArgs {
    /// C sources handed to the call listing generator
    pub sources: Vec<PathBuf>,

    /// Directory searched for the newest usage file
    pub su_dir: PathBuf,

    /// File-name glob for usage files
    pub su_pattern: String,

    /// Explicit usage file; skips the newest-file search
    pub su_file: Option<PathBuf>,

    /// Pre-generated call listing; skips running the generator
    pub listing: Option<PathBuf>,

    /// Call listing generator program
    pub cflow_program: String,

    /// Makefile fragment for the extra source query
    pub env_mk: Option<PathBuf>,

    /// Make expression naming one extra source
    pub extra_source: Option<String>,

    /// Stack budget in bytes
    pub budget: Option<u64>,

    /// Output path for the JSON report (optional)
    pub output_json: Option<PathBuf>,

    /// Number of heaviest frames to include in the report
    pub top_frames: usize,

    /// Print the annotated tree and the missing-usage list
    pub verbose: bool,
}

impl Default for AnalyzeArgs {
    fn default() -> Self {
        Self {
            sources: Vec::new(),
            su_dir: PathBuf::from(DEFAULT_SU_DIR),
            su_pattern: DEFAULT_SU_PATTERN.to_string(),
            su_file: None,
            listing: None,
            cflow_program: DEFAULT_CFLOW_PROGRAM.to_string(),
            env_mk: None,
            extra_source: None,
            budget: None,
            output_json: None,
            top_frames: 10,
            verbose: false,
        }
    }
}

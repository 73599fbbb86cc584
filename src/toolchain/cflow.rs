//! GNU cflow invocation.

use super::process::run_captured;
use crate::utils::config::DEFAULT_CFLOW_PROGRAM;
use crate::utils::error::CollaboratorError;
use log::{debug, info};
use std::path::PathBuf;

/// Runs cflow over a set of C sources
#[derive(Debug, Clone)]
pub struct CflowRunner {
    program: String,
}

impl Default for CflowRunner {
    fn default() -> Self {
        Self::new(DEFAULT_CFLOW_PROGRAM)
    }
}

impl CflowRunner {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    /// Produce the indented call listing for `sources`
    ///
    /// # Errors
    /// * `CollaboratorError` - cflow could not run, failed, or printed non-UTF-8
    pub fn call_listing(&self, sources: &[PathBuf]) -> Result<Vec<String>, CollaboratorError> {
        info!(
            "Generating call listing with {} over {}",
            self.program,
            sources
                .iter()
                .map(|p| p.display().to_string())
                .collect::<Vec<_>>()
                .join(" ")
        );

        let stdout = run_captured(&self.program, sources, None)?;
        let lines: Vec<String> = stdout.lines().map(str::to_string).collect();

        debug!("{} printed {} lines", self.program, lines.len());

        Ok(lines)
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[test]
    fn test_failing_generator_is_reported() {
        // `false` ignores its arguments and exits 1
        let runner = CflowRunner::new("false");
        let err = runner.call_listing(&[PathBuf::from("main.c")]).unwrap_err();
        assert!(matches!(err, CollaboratorError::CommandFailed { .. }));
    }

    #[test]
    fn test_listing_lines_are_split() {
        // `echo` stands in for the generator and prints its arguments
        let runner = CflowRunner::new("echo");
        let lines = runner.call_listing(&[PathBuf::from("main()")]).unwrap();
        assert_eq!(lines, vec!["main()"]);
    }
}

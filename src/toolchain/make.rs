//! Build-system query for an extra source path.
//!
//! Some sources live outside the project (a vendor HAL, for instance) and
//! their location is only known to the build's makefile fragment. The query
//! includes that fragment in a throwaway makefile that echoes one expression
//! and pipes it to `make -f -`.

use super::process::run_captured;
use crate::utils::config::MAKE_PROGRAM;
use crate::utils::error::CollaboratorError;
use log::debug;
use std::path::{Path, PathBuf};

/// Build the throwaway makefile text
pub fn query_makefile(env_mk: &Path, expr: &str) -> String {
    format!(
        "include {}\nall:\n\t@echo {}\n",
        env_mk.display(),
        expr
    )
}

/// Evaluate `expr` in the context of `env_mk` and return it as a path
///
/// # Errors
/// * `CollaboratorError` - make failed or printed nothing usable
pub fn resolve_make_path(env_mk: &Path, expr: &str) -> Result<PathBuf, CollaboratorError> {
    let makefile = query_makefile(env_mk, expr);
    let stdout = run_captured(MAKE_PROGRAM, ["-f", "-", "all"], Some(&makefile))?;
    let path = stdout.trim();

    if path.is_empty() {
        return Err(CollaboratorError::InvalidOutput {
            program: MAKE_PROGRAM.to_string(),
            reason: format!("{} expanded to an empty path", expr),
        });
    }

    debug!("{} resolved to {}", expr, path);

    Ok(PathBuf::from(path))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_makefile() {
        let text = query_makefile(Path::new("../env.mk"), "$(HAL)/hal.c");
        assert_eq!(text, "include ../env.mk\nall:\n\t@echo $(HAL)/hal.c\n");
    }
}

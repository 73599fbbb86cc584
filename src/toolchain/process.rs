//! Blocking subprocess execution with fully buffered output.

use crate::utils::error::CollaboratorError;
use log::debug;
use std::ffi::OsStr;
use std::io::{ErrorKind, Write};
use std::process::{Command, Stdio};

/// Run `program` with `args`, optionally feeding `stdin`, and return its stdout
///
/// Output is collected in full before returning.
///
/// # Errors
/// * `CollaboratorError::Spawn` - the program could not be started
/// * `CollaboratorError::CommandFailed` - non-zero exit, with captured stderr
/// * `CollaboratorError::InvalidOutput` - stdout is not UTF-8
pub fn run_captured<I, S>(
    program: &str,
    args: I,
    stdin: Option<&str>,
) -> Result<String, CollaboratorError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let spawn_error = |source| CollaboratorError::Spawn {
        program: program.to_string(),
        source,
    };

    let mut command = Command::new(program);
    command
        .args(args)
        .stdin(if stdin.is_some() { Stdio::piped() } else { Stdio::null() })
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());

    debug!("Running {:?}", command);

    let mut child = command.spawn().map_err(spawn_error)?;

    if let (Some(input), Some(mut pipe)) = (stdin, child.stdin.take()) {
        match pipe.write_all(input.as_bytes()) {
            Ok(()) => {}
            // The child exited without reading everything; its status decides
            Err(e) if e.kind() == ErrorKind::BrokenPipe => {
                debug!("{} closed stdin early", program);
            }
            Err(e) => {
                let _ = child.kill();
                let _ = child.wait();
                return Err(spawn_error(e));
            }
        }
        // Dropping the pipe closes it so the child sees EOF
    }

    let output = child.wait_with_output().map_err(spawn_error)?;

    if !output.status.success() {
        return Err(CollaboratorError::CommandFailed {
            program: program.to_string(),
            status: output.status,
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }

    String::from_utf8(output.stdout).map_err(|e| CollaboratorError::InvalidOutput {
        program: program.to_string(),
        reason: e.to_string(),
    })
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[test]
    fn test_captures_stdout() {
        let out = run_captured("sh", ["-c", "echo hello"], None).unwrap();
        assert_eq!(out.trim(), "hello");
    }

    #[test]
    fn test_feeds_stdin() {
        let out = run_captured("cat", std::iter::empty::<&str>(), Some("piped")).unwrap();
        assert_eq!(out, "piped");
    }

    #[test]
    fn test_non_zero_exit_is_failure() {
        let err = run_captured("sh", ["-c", "echo oops >&2; exit 3"], None).unwrap_err();
        match err {
            CollaboratorError::CommandFailed { stderr, status, .. } => {
                assert_eq!(stderr, "oops");
                assert_eq!(status.code(), Some(3));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_exit_before_reading_stdin_keeps_status() {
        let input = "x".repeat(1 << 20);
        let err = run_captured("sh", ["-c", "echo early >&2; exit 2"], Some(&input)).unwrap_err();
        match err {
            CollaboratorError::CommandFailed { stderr, status, .. } => {
                assert_eq!(stderr, "early");
                assert_eq!(status.code(), Some(2));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_missing_program() {
        let err = run_captured("definitely-not-a-real-program-xyz", ["--help"], None).unwrap_err();
        assert!(matches!(err, CollaboratorError::Spawn { .. }));
    }
}

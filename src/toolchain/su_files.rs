//! Locating and reading `.su` stack usage files.
//!
//! GCC writes one `.su` file per translation unit next to the object file.
//! When the build goes through a temp directory the newest matching file is
//! taken as the input. A concurrent unrelated build writing a newer file
//! into the same directory would win this selection; pass an explicit file
//! to avoid that.

use crate::utils::error::CollaboratorError;
use chrono::{DateTime, Local};
use globset::Glob;
use log::{debug, info};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// Newest file in `dir` whose name matches the glob `pattern`
///
/// # Errors
/// * `CollaboratorError::InvalidPattern` - `pattern` is not a valid glob
/// * `CollaboratorError::NoInputFound` - nothing in `dir` matches
/// * `CollaboratorError::Io` - `dir` cannot be listed
pub fn find_latest_usage_file(dir: &Path, pattern: &str) -> Result<PathBuf, CollaboratorError> {
    let matcher = Glob::new(pattern)?.compile_matcher();
    let mut latest: Option<(SystemTime, PathBuf)> = None;

    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        if !matcher.is_match(entry.file_name()) {
            continue;
        }

        let metadata = entry.metadata()?;
        if !metadata.is_file() {
            continue;
        }

        let modified = metadata.modified()?;
        debug!("Candidate usage file: {}", entry.path().display());

        if latest.as_ref().map_or(true, |(newest, _)| modified > *newest) {
            latest = Some((modified, entry.path()));
        }
    }

    let (modified, path) = latest.ok_or_else(|| CollaboratorError::NoInputFound {
        dir: dir.to_path_buf(),
        pattern: pattern.to_string(),
    })?;

    info!(
        "Reading stack usage from {} (mtime={})",
        path.display(),
        DateTime::<Local>::from(modified).format("%Y-%m-%d %H:%M:%S")
    );

    Ok(path)
}

/// Read a text file into lines
pub fn read_lines(path: &Path) -> Result<Vec<String>, CollaboratorError> {
    let text = fs::read_to_string(path)?;
    Ok(text.lines().map(str::to_string).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::time::Duration;

    fn touch(path: &Path, age_secs: u64) {
        let file = File::create(path).unwrap();
        file.set_modified(SystemTime::now() - Duration::from_secs(age_secs))
            .unwrap();
    }

    #[test]
    fn test_picks_newest_match() {
        let dir = tempfile::tempdir().unwrap();
        touch(&dir.path().join("fw.1.su"), 300);
        touch(&dir.path().join("fw.2.su"), 10);
        touch(&dir.path().join("fw.3.su"), 100);
        touch(&dir.path().join("newer.txt"), 0);

        let found = find_latest_usage_file(dir.path(), "fw.*.su").unwrap();
        assert_eq!(found, dir.path().join("fw.2.su"));
    }

    #[test]
    fn test_no_match() {
        let dir = tempfile::tempdir().unwrap();
        touch(&dir.path().join("notes.txt"), 0);

        let err = find_latest_usage_file(dir.path(), "*.su").unwrap_err();
        assert!(matches!(err, CollaboratorError::NoInputFound { .. }));
    }

    #[test]
    fn test_invalid_pattern() {
        let dir = tempfile::tempdir().unwrap();
        let err = find_latest_usage_file(dir.path(), "[").unwrap_err();
        assert!(matches!(err, CollaboratorError::InvalidPattern(_)));
    }

    #[test]
    fn test_read_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.su");
        fs::write(&path, "a.c:1:1:foo 4 static\na.c:2:1:bar 6 static\n").unwrap();
        assert_eq!(read_lines(&path).unwrap().len(), 2);
    }
}

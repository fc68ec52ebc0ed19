//! Pattern Source
//!
//! Patterns are whitespace-delimited tokens, usually one word per line in a
//! `patterns.txt`. A missing or unreadable source is never fatal: the
//! built-in defaults are used instead.

use std::error::Error as _;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use log::{info, warn};
use thiserror::Error;

use crate::matching::{PatternAutomaton, DEFAULT_PATTERNS};

/// Errors reading a pattern source
#[derive(Debug, Error)]
pub enum PatternSourceError {
    #[error("could not read pattern file {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Where a pattern set came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PatternOrigin {
    /// Read from this file
    File(PathBuf),
    /// Built-in defaults
    Defaults,
}

impl fmt::Display for PatternOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PatternOrigin::File(path) => write!(f, "{}", path.display()),
            PatternOrigin::Defaults => write!(f, "built-in defaults"),
        }
    }
}

/// Normalized patterns plus their origin
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatternSet {
    pub patterns: Vec<String>,
    pub origin: PatternOrigin,
}

impl PatternSet {
    /// The built-in default set
    pub fn defaults() -> Self {
        Self {
            patterns: DEFAULT_PATTERNS.iter().map(|p| p.to_string()).collect(),
            origin: PatternOrigin::Defaults,
        }
    }

    /// Read patterns from `path`
    pub fn from_file(path: &Path) -> Result<Self, PatternSourceError> {
        Ok(Self {
            patterns: load_patterns(path)?,
            origin: PatternOrigin::File(path.to_path_buf()),
        })
    }

    /// Read patterns from `path`, falling back to the defaults
    pub fn load_or_default(path: &Path) -> Self {
        match Self::from_file(path) {
            Ok(set) => {
                info!("Loaded {} patterns from {}", set.patterns.len(), path.display());
                set
            }
            Err(e) => {
                match e.source() {
                    Some(cause) => warn!("{} ({}). Using default patterns.", e, cause),
                    None => warn!("{}. Using default patterns.", e),
                }
                Self::defaults()
            }
        }
    }

    /// Build the automaton for this set
    pub fn build(&self) -> PatternAutomaton {
        PatternAutomaton::from_patterns(&self.patterns)
    }
}

/// Split `text` on whitespace and lowercase every token
pub fn parse_patterns(text: &str) -> Vec<String> {
    text.split_whitespace()
        .map(|word| word.to_ascii_lowercase())
        .collect()
}

/// Read and parse a pattern file
pub fn load_patterns(path: &Path) -> Result<Vec<String>, PatternSourceError> {
    let bytes = fs::read(path).map_err(|source| PatternSourceError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(parse_patterns(&String::from_utf8_lossy(&bytes)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;
    use std::io::Write;

    #[test]
    fn test_parse_patterns() {
        let patterns = parse_patterns("UNION\n  select\tAdmin\n\n");
        assert_eq!(patterns, vec!["union", "select", "admin"]);
    }

    #[test]
    fn test_parse_keeps_duplicates() {
        // Deduplication happens on insert
        let patterns = parse_patterns("drop drop");
        assert_eq!(patterns.len(), 2);
        let automaton = PatternAutomaton::from_patterns(&patterns);
        assert_eq!(automaton.patterns(), ["drop"]);
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "drop\nexec").unwrap();

        let set = PatternSet::from_file(file.path()).unwrap();
        assert_eq!(set.patterns, vec!["drop", "exec"]);
        assert_eq!(set.origin, PatternOrigin::File(file.path().to_path_buf()));
    }

    #[test]
    fn test_missing_file_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        let set = PatternSet::load_or_default(&dir.path().join("patterns.txt"));
        assert_eq!(set, PatternSet::defaults());
        assert_eq!(set.build().patterns(), DEFAULT_PATTERNS);
    }

    #[test]
    fn test_missing_file_error() {
        let err = load_patterns(Path::new("/nonexistent/patterns.txt")).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/patterns.txt"));
    }

    #[test]
    fn test_io_cause_reported_once() {
        let err = load_patterns(Path::new("/nonexistent/patterns.txt")).unwrap_err();
        let cause = err.source().unwrap().to_string();
        assert!(!err.to_string().contains(&cause));

        let chain = format!("{:#}", anyhow::Error::new(err));
        assert_eq!(chain.matches(&cause).count(), 1);
    }

    #[test]
    fn test_empty_file_has_no_patterns() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let set = PatternSet::load_or_default(file.path());
        assert!(set.patterns.is_empty());
        assert!(set.build().is_empty());
    }
}

//! Configuration module for Word-Guard
//!
//! Configuration is a small JSON document. Every field has a default, so an
//! empty object (or no file at all) is a valid configuration.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

/// Guard configuration
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
pub struct GuardConfig {
    /// File of whitespace-delimited forbidden words
    #[serde(default = "default_pattern_file")]
    pub pattern_file: PathBuf,

    /// Whether to emit audit events for scans and handshakes
    #[serde(default = "default_log_matches")]
    pub log_matches: bool,

    /// Whether to print the buffered transition trace for each match
    #[serde(default = "default_show_trace")]
    pub show_trace: bool,

    /// Output file for the automaton diagram
    #[serde(default = "default_automaton_diagram")]
    pub automaton_diagram: PathBuf,

    /// Output file for the handshake diagram
    #[serde(default = "default_handshake_diagram")]
    pub handshake_diagram: PathBuf,
}

fn default_pattern_file() -> PathBuf {
    PathBuf::from("patterns.txt")
}

fn default_log_matches() -> bool {
    true
}

fn default_show_trace() -> bool {
    true
}

fn default_automaton_diagram() -> PathBuf {
    PathBuf::from("dfa_visual.dot")
}

fn default_handshake_diagram() -> PathBuf {
    PathBuf::from("pda_visual.dot")
}

impl Default for GuardConfig {
    fn default() -> Self {
        Self {
            pattern_file: default_pattern_file(),
            log_matches: default_log_matches(),
            show_trace: default_show_trace(),
            automaton_diagram: default_automaton_diagram(),
            handshake_diagram: default_handshake_diagram(),
        }
    }
}

impl GuardConfig {
    /// Parse configuration from JSON bytes
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ConfigError> {
        let config_str = std::str::from_utf8(bytes)?;
        Ok(serde_json::from_str(config_str)?)
    }

    /// Read and parse a JSON configuration file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let bytes = fs::read(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_bytes(&bytes)
    }
}

/// Configuration parsing errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid UTF-8: {0}")]
    InvalidUtf8(#[from] std::str::Utf8Error),
    #[error("Invalid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),
}

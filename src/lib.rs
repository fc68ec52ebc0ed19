//! Word-Guard: forbidden word scanner and handshake validator
//!
//! Two small state machines:
//! - a shared-prefix trie used as a scanning DFA to flag forbidden words
//!   (SQL keywords and the like) in free text
//! - a pushdown validator that checks a token sequence against the TCP
//!   three-way handshake
//!
//! [`Guard`] ties them to a configuration and a pattern source. The
//! automaton is built once and never mutated, so a `Guard` can be shared
//! across threads behind an `Arc`.

pub mod config;
pub mod diagram;
pub mod matching;
pub mod patterns;
pub mod protocols;
pub mod telemetry;

use std::path::{Path, PathBuf};

use log::{debug, info};

pub use config::{ConfigError, GuardConfig};
pub use diagram::DiagramError;
pub use matching::{PatternAutomaton, PatternMatch, ScanReport, Scanner, DEFAULT_PATTERNS};
pub use patterns::{PatternOrigin, PatternSet, PatternSourceError};
pub use protocols::{HandshakeOutcome, HandshakeReport, HandshakeValidator};

/// Frozen automaton, validator and configuration
#[derive(Debug, Clone)]
pub struct Guard {
    config: GuardConfig,
    automaton: PatternAutomaton,
    origin: PatternOrigin,
    validator: HandshakeValidator,
}

impl Guard {
    /// Build from configuration, reading `config.pattern_file` or falling
    /// back to the default patterns
    pub fn new(config: GuardConfig) -> Self {
        let set = PatternSet::load_or_default(&config.pattern_file);
        Self::with_patterns(config, set)
    }

    /// Build from an explicit pattern set
    pub fn with_patterns(config: GuardConfig, set: PatternSet) -> Self {
        let automaton = set.build();
        info!(
            "Automaton constructed: {} patterns, {} states",
            automaton.patterns().len(),
            automaton.len()
        );
        if config.log_matches {
            telemetry::audit_automaton_built(
                &set.origin.to_string(),
                automaton.patterns().len(),
                automaton.len(),
            )
            .emit();
        }

        Self {
            config,
            automaton,
            origin: set.origin,
            validator: HandshakeValidator::new(),
        }
    }

    /// Active configuration
    pub fn config(&self) -> &GuardConfig {
        &self.config
    }

    /// The frozen automaton
    pub fn automaton(&self) -> &PatternAutomaton {
        &self.automaton
    }

    /// Where the patterns came from
    pub fn origin(&self) -> &PatternOrigin {
        &self.origin
    }

    /// Scan text for forbidden words
    pub fn scan(&self, text: &str) -> ScanReport {
        self.scan_bytes(text.as_bytes())
    }

    /// Scan raw bytes for forbidden words
    pub fn scan_bytes(&self, bytes: &[u8]) -> ScanReport {
        let report = Scanner::new(&self.automaton).scan(bytes);
        debug!(
            "Scanned {} bytes, {} threats",
            report.bytes_scanned,
            report.threat_count()
        );
        if self.config.log_matches {
            telemetry::audit_scan(&report).emit();
        }
        report
    }

    /// Validate a handshake token sequence
    pub fn handshake<S: AsRef<str>>(&self, tokens: &[S]) -> HandshakeReport {
        let report = self.validator.simulate_traced(tokens);
        if self.config.log_matches {
            telemetry::audit_handshake(&report.outcome).emit();
        }
        report
    }

    /// Write both diagrams into `dir` using the configured file names
    pub fn export_diagrams(&self, dir: &Path) -> Result<Vec<PathBuf>, DiagramError> {
        let automaton_path = dir.join(&self.config.automaton_diagram);
        diagram::write_dot(&automaton_path, &diagram::automaton_dot(&self.automaton))?;

        let handshake_path = dir.join(&self.config.handshake_diagram);
        diagram::write_dot(&handshake_path, &diagram::handshake_dot())?;

        Ok(vec![automaton_path, handshake_path])
    }
}

impl Default for Guard {
    fn default() -> Self {
        Self::with_patterns(GuardConfig::default(), PatternSet::defaults())
    }
}

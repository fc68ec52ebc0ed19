//! Telemetry Module for Word-Guard
//!
//! Every scan and handshake verdict can be emitted as a structured audit
//! event: a single JSON line on the `log` facade, so whatever logger the
//! host installs decides where it goes.

use log::{info, warn};
use serde::Serialize;

use crate::matching::ScanReport;
use crate::protocols::HandshakeOutcome;

/// Audit event types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditEventType {
    /// Patterns loaded and automaton built
    AutomatonBuilt,
    /// Scan found no forbidden words
    CleanTraffic,
    /// Scan found one or more forbidden words
    ThreatDetected,
    /// Handshake completed
    HandshakeEstablished,
    /// Handshake failed or stopped short
    HandshakeRejected,
}

/// Audit event for logging
#[derive(Debug, Clone, Serialize)]
pub struct AuditEvent {
    /// Event type
    pub event_type: AuditEventType,
    /// Number of forbidden words found
    #[serde(skip_serializing_if = "Option::is_none")]
    pub threat_count: Option<usize>,
    /// Patterns matched, in input order
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub matched_patterns: Vec<String>,
    /// Bytes inspected
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bytes_scanned: Option<usize>,
    /// Handshake outcome name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outcome: Option<String>,
    /// Reason for action
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    /// Additional metadata
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Value>,
}

impl AuditEvent {
    /// Create a new audit event
    pub fn new(event_type: AuditEventType) -> Self {
        Self {
            event_type,
            threat_count: None,
            matched_patterns: Vec::new(),
            bytes_scanned: None,
            outcome: None,
            reason: None,
            metadata: None,
        }
    }

    /// Set reason
    pub fn with_reason(mut self, reason: &str) -> Self {
        self.reason = Some(reason.to_string());
        self
    }

    /// Set handshake outcome
    pub fn with_outcome(mut self, outcome: &str) -> Self {
        self.outcome = Some(outcome.to_string());
        self
    }

    /// Attach metadata
    pub fn with_metadata(mut self, metadata: serde_json::Value) -> Self {
        self.metadata = Some(metadata);
        self
    }

    /// Whether the event reports something that was refused
    pub fn is_alert(&self) -> bool {
        matches!(
            self.event_type,
            AuditEventType::ThreatDetected | AuditEventType::HandshakeRejected
        )
    }

    /// Log the event
    pub fn emit(&self) {
        match serde_json::to_string(self) {
            Ok(json) => {
                if self.is_alert() {
                    warn!("[WORD-GUARD-AUDIT] {}", json);
                } else {
                    info!("[WORD-GUARD-AUDIT] {}", json);
                }
            }
            Err(e) => {
                warn!("Failed to serialize audit event: {}", e);
            }
        }
    }
}

/// Create an audit event for a finished scan
pub fn audit_scan(report: &ScanReport) -> AuditEvent {
    let event_type = if report.is_clean() {
        AuditEventType::CleanTraffic
    } else {
        AuditEventType::ThreatDetected
    };

    let mut event = AuditEvent::new(event_type);
    event.threat_count = Some(report.threat_count());
    event.matched_patterns = report.patterns().map(String::from).collect();
    event.bytes_scanned = Some(report.bytes_scanned);
    event
}

/// Create an audit event for a handshake verdict
pub fn audit_handshake(outcome: &HandshakeOutcome) -> AuditEvent {
    if outcome.is_successful() {
        AuditEvent::new(AuditEventType::HandshakeEstablished).with_outcome(outcome.as_str())
    } else {
        AuditEvent::new(AuditEventType::HandshakeRejected)
            .with_outcome(outcome.as_str())
            .with_reason(&outcome.to_string())
    }
}

/// Create an audit event for a freshly built automaton
pub fn audit_automaton_built(origin: &str, patterns: usize, states: usize) -> AuditEvent {
    AuditEvent::new(AuditEventType::AutomatonBuilt)
        .with_reason(&format!("patterns loaded from {}", origin))
        .with_metadata(serde_json::json!({
            "patterns": patterns,
            "states": states,
        }))
}

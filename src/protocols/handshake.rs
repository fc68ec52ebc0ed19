//! TCP Handshake Validator
//!
//! Pushdown check of the three-way handshake. The expected symbols are
//! pushed in reverse so the first one sits on top, and each input token
//! must equal the current top to pop it. The stack is rebuilt on every call.

use std::fmt;

use log::debug;
use serde::Serialize;

/// Symbols of the handshake protocol
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING-KEBAB-CASE")]
pub enum HandshakeSymbol {
    /// Client opens
    Syn,
    /// Server acknowledges and opens
    SynAck,
    /// Client acknowledges
    Ack,
}

impl HandshakeSymbol {
    /// Wire spelling of the symbol
    pub fn as_str(&self) -> &'static str {
        match self {
            HandshakeSymbol::Syn => "SYN",
            HandshakeSymbol::SynAck => "SYN-ACK",
            HandshakeSymbol::Ack => "ACK",
        }
    }
}

impl fmt::Display for HandshakeSymbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Expected order, first to last
pub const HANDSHAKE_SEQUENCE: [HandshakeSymbol; 3] = [
    HandshakeSymbol::Syn,
    HandshakeSymbol::SynAck,
    HandshakeSymbol::Ack,
];

/// Connection phases of the pushdown machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandshakePhase {
    /// Waiting for SYN
    Listen,
    /// SYN seen, handshake in progress
    SynReceived,
    /// All three symbols consumed
    Established,
}

impl HandshakePhase {
    /// All phases in protocol order
    pub const ALL: [HandshakePhase; 3] = [
        HandshakePhase::Listen,
        HandshakePhase::SynReceived,
        HandshakePhase::Established,
    ];

    /// Conventional TCP state name
    pub fn name(&self) -> &'static str {
        match self {
            HandshakePhase::Listen => "LISTEN",
            HandshakePhase::SynReceived => "SYN_RCVD",
            HandshakePhase::Established => "ESTABLISHED",
        }
    }

    /// Stack marker held while in this phase
    pub fn stack_marker(&self) -> &'static str {
        match self {
            HandshakePhase::SynReceived => "A",
            HandshakePhase::Listen | HandshakePhase::Established => "Empty",
        }
    }
}

/// Result of validating a token sequence
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HandshakeOutcome {
    /// Every symbol consumed in order
    Successful,
    /// Input ran out with symbols still expected
    Incomplete {
        /// Symbols still on the stack, top first
        remaining: Vec<HandshakeSymbol>,
    },
    /// A token differed from the top of the stack
    Mismatch {
        /// Position of the offending token
        index: usize,
        /// Symbol on top of the stack
        expected: HandshakeSymbol,
        /// Normalized token that was read
        found: String,
    },
    /// A token arrived after the stack was exhausted
    EmptyStackError {
        /// Position of the extra token
        index: usize,
    },
}

impl HandshakeOutcome {
    /// Check if the handshake completed
    pub fn is_successful(&self) -> bool {
        matches!(self, HandshakeOutcome::Successful)
    }

    /// Short status name
    pub fn as_str(&self) -> &'static str {
        match self {
            HandshakeOutcome::Successful => "SUCCESSFUL",
            HandshakeOutcome::Incomplete { .. } => "INCOMPLETE",
            HandshakeOutcome::Mismatch { .. } => "MISMATCH",
            HandshakeOutcome::EmptyStackError { .. } => "EMPTY_STACK_ERROR",
        }
    }

    /// Phase the connection ended in
    pub fn phase(&self) -> HandshakePhase {
        match self {
            HandshakeOutcome::Successful => HandshakePhase::Established,
            HandshakeOutcome::Incomplete { remaining }
                if remaining.len() == HANDSHAKE_SEQUENCE.len() =>
            {
                HandshakePhase::Listen
            }
            HandshakeOutcome::Mismatch { index: 0, .. } => HandshakePhase::Listen,
            HandshakeOutcome::EmptyStackError { .. } => HandshakePhase::Established,
            _ => HandshakePhase::SynReceived,
        }
    }
}

impl fmt::Display for HandshakeOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HandshakeOutcome::Successful => write!(f, "HANDSHAKE SUCCESSFUL"),
            HandshakeOutcome::Incomplete { remaining } => {
                let names: Vec<&str> = remaining.iter().map(HandshakeSymbol::as_str).collect();
                write!(f, "INCOMPLETE (still expecting {})", names.join(", "))
            }
            HandshakeOutcome::Mismatch { index, expected, found } => {
                write!(
                    f,
                    "MISMATCH at token {}: expected {}, got {}",
                    index + 1,
                    expected,
                    found
                )
            }
            HandshakeOutcome::EmptyStackError { index } => {
                write!(f, "EMPTY_STACK_ERROR at token {}: stack empty", index + 1)
            }
        }
    }
}

/// One comparison against the stack top
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HandshakeStep {
    /// Normalized input token
    pub token: String,
    /// Symbol that was on top of the stack
    pub expected: HandshakeSymbol,
    /// Whether the token popped the symbol
    pub matched: bool,
}

impl fmt::Display for HandshakeStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let verdict = if self.matched { "MATCH" } else { "MISMATCH" };
        write!(
            f,
            "Input: {} | Expected: {} -> {}.",
            self.token, self.expected, verdict
        )
    }
}

/// Outcome plus the per-token comparisons that produced it
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HandshakeReport {
    pub outcome: HandshakeOutcome,
    pub steps: Vec<HandshakeStep>,
}

/// Stack-based validator for the three-way handshake
#[derive(Debug, Clone, Copy, Default)]
pub struct HandshakeValidator;

impl HandshakeValidator {
    /// Create a new validator
    pub fn new() -> Self {
        Self
    }

    /// Validate `tokens` and return only the outcome
    pub fn simulate<S: AsRef<str>>(&self, tokens: &[S]) -> HandshakeOutcome {
        self.simulate_traced(tokens).outcome
    }

    /// Validate `tokens`, recording every comparison.
    ///
    /// Tokens are compared case-insensitively. Processing stops at the first
    /// failure; trailing tokens are never looked at.
    pub fn simulate_traced<S: AsRef<str>>(&self, tokens: &[S]) -> HandshakeReport {
        let mut stack: Vec<HandshakeSymbol> = HANDSHAKE_SEQUENCE.iter().rev().copied().collect();
        let mut steps = Vec::with_capacity(tokens.len().min(HANDSHAKE_SEQUENCE.len()));

        for (index, token) in tokens.iter().enumerate() {
            let Some(&expected) = stack.last() else {
                debug!("Token {} arrived after handshake completed", index);
                return HandshakeReport {
                    outcome: HandshakeOutcome::EmptyStackError { index },
                    steps,
                };
            };

            let found = token.as_ref().to_ascii_uppercase();
            let matched = found == expected.as_str();
            steps.push(HandshakeStep {
                token: found.clone(),
                expected,
                matched,
            });

            if !matched {
                return HandshakeReport {
                    outcome: HandshakeOutcome::Mismatch { index, expected, found },
                    steps,
                };
            }
            stack.pop();
        }

        let outcome = if stack.is_empty() {
            HandshakeOutcome::Successful
        } else {
            stack.reverse();
            HandshakeOutcome::Incomplete { remaining: stack }
        };

        HandshakeReport { outcome, steps }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn simulate(tokens: &[&str]) -> HandshakeOutcome {
        HandshakeValidator::new().simulate(tokens)
    }

    #[test]
    fn test_successful_handshake() {
        assert_eq!(simulate(&["syn", "syn-ack", "ack"]), HandshakeOutcome::Successful);
        assert_eq!(simulate(&["SYN", "Syn-Ack", "aCk"]), HandshakeOutcome::Successful);
    }

    #[test]
    fn test_mismatch_on_second_token() {
        assert_eq!(
            simulate(&["syn", "ack"]),
            HandshakeOutcome::Mismatch {
                index: 1,
                expected: HandshakeSymbol::SynAck,
                found: "ACK".to_string(),
            }
        );
    }

    #[test]
    fn test_incomplete() {
        assert_eq!(
            simulate(&["syn"]),
            HandshakeOutcome::Incomplete {
                remaining: vec![HandshakeSymbol::SynAck, HandshakeSymbol::Ack],
            }
        );
    }

    #[test]
    fn test_no_tokens_is_incomplete() {
        let outcome = simulate(&[]);
        assert_eq!(outcome.as_str(), "INCOMPLETE");
        assert_eq!(outcome.phase(), HandshakePhase::Listen);
    }

    #[test]
    fn test_extra_token_empty_stack() {
        assert_eq!(
            simulate(&["syn", "syn-ack", "ack", "extra"]),
            HandshakeOutcome::EmptyStackError { index: 3 }
        );
    }

    #[test]
    fn test_mismatch_stops_processing() {
        let report = HandshakeValidator::new().simulate_traced(&["ack", "syn", "syn-ack", "ack"]);
        assert_eq!(report.outcome.as_str(), "MISMATCH");
        assert_eq!(report.steps.len(), 1);
        assert!(!report.steps[0].matched);
    }

    #[test]
    fn test_trace_lines() {
        let report = HandshakeValidator::new().simulate_traced(&["syn", "syn-ack"]);
        let lines: Vec<String> = report.steps.iter().map(|s| s.to_string()).collect();
        assert_eq!(
            lines,
            [
                "Input: SYN | Expected: SYN -> MATCH.",
                "Input: SYN-ACK | Expected: SYN-ACK -> MATCH.",
            ]
        );
        assert_eq!(report.outcome.phase(), HandshakePhase::SynReceived);
    }

    #[test]
    fn test_each_call_starts_fresh() {
        let validator = HandshakeValidator::new();
        assert_eq!(validator.simulate(&["syn"]).as_str(), "INCOMPLETE");
        assert!(validator.simulate(&["syn", "syn-ack", "ack"]).is_successful());
    }

    #[test]
    fn test_outcome_serialization() {
        let json = serde_json::to_string(&simulate(&["syn", "ack"])).unwrap();
        assert!(json.contains("\"outcome\":\"MISMATCH\""));
        assert!(json.contains("\"expected\":\"SYN-ACK\""));
    }
}

//! Trie Scanner
//!
//! Walks input text over a frozen [`PatternAutomaton`]. Each call to
//! [`Scanner::scan`] owns its cursor and trace buffer, so one automaton can
//! serve any number of concurrent scans.
//!
//! Mismatch recovery is a one-level restart: the cursor drops back to root
//! and only the root's transitions are tried for the offending byte. A
//! candidate whose tail is the head of another pattern is lost, not resumed.

use std::fmt;

use log::debug;
use serde::Serialize;

use super::automaton::{PatternAutomaton, StateId};

/// One recorded step of the cursor
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct Transition {
    /// Depth of the state the step left
    pub from_depth: usize,
    /// Input byte consumed (lowercased)
    pub symbol: u8,
    /// Depth of the state the step entered
    pub to_depth: usize,
}

impl fmt::Display for Transition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "State q{} --({})--> q{}",
            self.from_depth,
            char::from(self.symbol),
            self.to_depth
        )
    }
}

/// A confirmed occurrence of a forbidden word
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PatternMatch {
    /// The full pattern that matched
    pub pattern: String,
    /// Byte offset of the first matched byte
    pub start: usize,
    /// Byte offset one past the last matched byte
    pub end: usize,
    /// Transitions buffered since the last reset
    pub trace: Vec<Transition>,
}

/// Outcome of scanning one input
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ScanReport {
    /// Matches in input order
    pub matches: Vec<PatternMatch>,
    /// Total bytes consumed
    pub bytes_scanned: usize,
}

impl ScanReport {
    /// Number of confirmed matches
    pub fn threat_count(&self) -> usize {
        self.matches.len()
    }

    /// True when nothing matched
    pub fn is_clean(&self) -> bool {
        self.matches.is_empty()
    }

    /// Matched patterns in input order
    pub fn patterns(&self) -> impl Iterator<Item = &str> + '_ {
        self.matches.iter().map(|m| m.pattern.as_str())
    }
}

/// Matching engine over a shared automaton
#[derive(Clone, Copy, Debug)]
pub struct Scanner<'a> {
    automaton: &'a PatternAutomaton,
}

impl<'a> Scanner<'a> {
    /// Create a scanner borrowing `automaton`
    pub fn new(automaton: &'a PatternAutomaton) -> Self {
        Self { automaton }
    }

    /// Scan a string
    pub fn scan_str(&self, text: &str) -> ScanReport {
        self.scan(text.as_bytes())
    }

    /// Scan raw bytes, case-insensitively.
    ///
    /// A final state only counts when the following byte is not ASCII
    /// alphanumeric (end of input counts as a boundary). An unconfirmed
    /// final state is left in place and abandoned on the next mismatch.
    pub fn scan(&self, text: &[u8]) -> ScanReport {
        let input = text.to_ascii_lowercase();
        let mut report = ScanReport {
            matches: Vec::new(),
            bytes_scanned: input.len(),
        };

        let mut current: StateId = 0;
        let mut trace: Vec<Transition> = Vec::new();

        for (i, &byte) in input.iter().enumerate() {
            if let Some(next) = self.automaton.next_state(current, byte) {
                trace.push(self.step(current, byte, next));
                current = next;
            } else {
                // No partial match is ever surfaced
                trace.clear();
                current = 0;
                if let Some(next) = self.automaton.next_state(0, byte) {
                    trace.push(self.step(0, byte, next));
                    current = next;
                }
            }

            let state = self.automaton.state_at(current);
            if !state.is_final() {
                continue;
            }

            let at_boundary = input
                .get(i + 1)
                .map_or(true, |next| !next.is_ascii_alphanumeric());
            if at_boundary {
                let end = i + 1;
                debug!("Pattern '{}' confirmed at byte {}", state.label(), end);
                report.matches.push(PatternMatch {
                    pattern: state.label().to_string(),
                    start: end - state.depth(),
                    end,
                    trace: std::mem::take(&mut trace),
                });
                current = 0;
            }
        }

        report
    }

    fn step(&self, from: StateId, symbol: u8, to: StateId) -> Transition {
        Transition {
            from_depth: self.automaton.state_at(from).depth(),
            symbol,
            to_depth: self.automaton.state_at(to).depth(),
        }
    }
}

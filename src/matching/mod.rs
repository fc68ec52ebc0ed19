//! Matching module for forbidden word detection
//!
//! This module provides:
//! - A shared-prefix trie built from the pattern set
//! - A scanner that walks text over the trie with a word-boundary check

pub mod automaton;
pub mod scanner;

pub use automaton::{PatternAutomaton, State, StateId, DEFAULT_PATTERNS};
pub use scanner::{PatternMatch, ScanReport, Scanner, Transition};

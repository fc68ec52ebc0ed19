//! Shared-Prefix Pattern Automaton
//!
//! Every forbidden word is converted into a chain of transitions hanging off
//! a single root state. Words that share a prefix share the states that spell
//! it, so the whole pattern set forms a tree.
//!
//! The automaton is built once and then only read:
//! - Byte-indexed transition tables (one lookup per input byte)
//! - Case-insensitive (patterns are stored lowercase)
//! - `Send + Sync`, so one instance can back any number of scans

use std::fmt;

/// Number of entries in a per-state transition table
pub const ALPHABET_SIZE: usize = 256;

/// Label carried by the root state until an empty pattern overwrites it
pub const ROOT_LABEL: &str = "Start";

/// Forbidden words used when no pattern source is available
pub const DEFAULT_PATTERNS: [&str; 3] = ["union", "select", "admin"];

/// Index of a state inside its automaton
pub type StateId = u32;

/// A single state of the trie
#[derive(Clone)]
pub struct State {
    id: StateId,
    depth: usize,
    is_final: bool,
    /// Prefix spelled by the path from root, or the full pattern once final
    label: String,
    transitions: Box<[Option<StateId>; ALPHABET_SIZE]>,
}

impl State {
    fn new(id: StateId, depth: usize, label: String) -> Self {
        Self {
            id,
            depth,
            is_final: false,
            label,
            transitions: Box::new([None; ALPHABET_SIZE]),
        }
    }

    /// Sequential identifier (root is 0)
    pub fn id(&self) -> StateId {
        self.id
    }

    /// Number of transitions from root to this state
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Whether a complete pattern ends here
    pub fn is_final(&self) -> bool {
        self.is_final
    }

    /// Prefix chunk for intermediate states, full pattern for final ones
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Target of the transition on `byte`, if any
    pub fn next(&self, byte: u8) -> Option<StateId> {
        self.transitions[byte as usize]
    }

    /// Outgoing transitions ordered by byte value
    pub fn transitions(&self) -> impl Iterator<Item = (u8, StateId)> + '_ {
        self.transitions
            .iter()
            .enumerate()
            .filter_map(|(byte, target)| target.map(|t| (byte as u8, t)))
    }

    /// Number of outgoing transitions
    pub fn out_degree(&self) -> usize {
        self.transitions.iter().filter(|t| t.is_some()).count()
    }
}

impl fmt::Debug for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("State")
            .field("id", &self.id)
            .field("depth", &self.depth)
            .field("is_final", &self.is_final)
            .field("label", &self.label)
            .field("transitions", &self.transitions().collect::<Vec<_>>())
            .finish()
    }
}

/// Trie of forbidden words used as a scanning DFA
#[derive(Clone, Debug)]
pub struct PatternAutomaton {
    states: Vec<State>,
    /// Distinct patterns in insertion order
    patterns: Vec<String>,
}

impl PatternAutomaton {
    /// Create an automaton holding only the root state
    pub fn new() -> Self {
        Self {
            states: vec![State::new(0, 0, ROOT_LABEL.to_string())],
            patterns: Vec::new(),
        }
    }

    /// Build an automaton from any collection of patterns
    pub fn from_patterns<I, S>(patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut automaton = Self::new();
        for pattern in patterns {
            automaton.insert(pattern.as_ref());
        }
        automaton
    }

    /// Build an automaton from [`DEFAULT_PATTERNS`]
    pub fn with_defaults() -> Self {
        Self::from_patterns(DEFAULT_PATTERNS)
    }

    /// Insert a pattern, sharing any prefix already present.
    ///
    /// The pattern is lowercased first. Re-inserting a pattern creates no
    /// states. The empty pattern marks the root itself final.
    pub fn insert(&mut self, pattern: &str) {
        let word = pattern.to_ascii_lowercase();
        let mut current: StateId = 0;

        for &byte in word.as_bytes() {
            current = match self.states[current as usize].next(byte) {
                Some(next) => next,
                None => self.add_child(current, byte),
            };
        }

        let state = &mut self.states[current as usize];
        state.is_final = true;
        state.label.clone_from(&word);

        if !self.patterns.contains(&word) {
            self.patterns.push(word);
        }
    }

    fn add_child(&mut self, parent: StateId, byte: u8) -> StateId {
        let next = self.states.len() as StateId;
        let parent_state = &self.states[parent as usize];
        let depth = parent_state.depth + 1;

        let mut chunk = if parent == 0 {
            String::new()
        } else {
            parent_state.label.clone()
        };
        chunk.push(char::from(byte));

        self.states.push(State::new(next, depth, chunk));
        self.states[parent as usize].transitions[byte as usize] = Some(next);
        next
    }

    /// The root state
    pub fn root(&self) -> &State {
        &self.states[0]
    }

    /// Look up a state by id
    pub fn state(&self, id: StateId) -> Option<&State> {
        self.states.get(id as usize)
    }

    /// All states in creation order
    pub fn states(&self) -> &[State] {
        &self.states
    }

    /// Target of the transition from `from` on `byte`
    pub fn next_state(&self, from: StateId, byte: u8) -> Option<StateId> {
        self.state(from).and_then(|s| s.next(byte))
    }

    /// Outgoing transitions of a state, ordered by byte
    pub fn transitions(&self, id: StateId) -> Vec<(u8, StateId)> {
        self.state(id)
            .map(|s| s.transitions().collect())
            .unwrap_or_default()
    }

    /// States at which a complete pattern ends
    pub fn final_states(&self) -> impl Iterator<Item = &State> + '_ {
        self.states.iter().filter(|s| s.is_final)
    }

    /// Distinct patterns in insertion order
    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }

    /// Number of states, root included
    pub fn len(&self) -> usize {
        self.states.len()
    }

    /// True when only the root exists
    pub fn is_empty(&self) -> bool {
        self.states.len() == 1
    }

    pub(crate) fn state_at(&self, id: StateId) -> &State {
        &self.states[id as usize]
    }
}

impl Default for PatternAutomaton {
    fn default() -> Self {
        Self::new()
    }
}

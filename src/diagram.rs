//! Graphviz Diagram Export
//!
//! Renders the automaton and the handshake pushdown machine as DOT text.
//! Only the public, read-only views of both are used.

use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

use log::info;
use thiserror::Error;

use crate::matching::{PatternAutomaton, State, StateId};
use crate::protocols::{HandshakePhase, HandshakeSymbol};

/// Errors writing a diagram
#[derive(Debug, Error)]
pub enum DiagramError {
    #[error("could not write diagram {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Escape text for use inside a quoted DOT label
fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            _ => out.push(c),
        }
    }
    out
}

fn symbol_label(byte: u8) -> String {
    if byte.is_ascii_graphic() {
        escape(&char::from(byte).to_string())
    } else {
        format!("0x{:02x}", byte)
    }
}

fn node_name(id: StateId) -> String {
    if id == 0 {
        "q0".to_string()
    } else {
        format!("node{}", id)
    }
}

fn node_attrs(state: &State) -> String {
    let shape = if state.is_final() { "doublecircle" } else { "circle" };
    if state.id() == 0 {
        return format!(
            "shape={}, fillcolor=lightgrey, label=\"q0\\n(START)\"",
            shape
        );
    }
    if state.is_final() {
        format!(
            "shape={}, fillcolor=lightpink, label=\"DETECTED:\\n{}\"",
            shape,
            escape(state.label())
        )
    } else {
        format!(
            "shape={}, fillcolor=white, label=\"q{}\\n({})\"",
            shape,
            state.depth(),
            escape(state.label())
        )
    }
}

/// Render the automaton as a left-to-right DOT graph with a pattern legend
pub fn automaton_dot(automaton: &PatternAutomaton) -> String {
    let mut out = String::new();
    out.push_str("digraph mDFA {\n");
    out.push_str("  rankdir=LR;\n");
    out.push_str("  node [shape = circle, style=filled, fillcolor=white, fontname=\"Arial\"];\n");

    for state in automaton.states() {
        let _ = writeln!(out, "  {} [{}];", node_name(state.id()), node_attrs(state));
    }

    for state in automaton.states() {
        for (byte, target) in state.transitions() {
            let _ = writeln!(
                out,
                "  {} -> {} [label=\"{}\"];",
                node_name(state.id()),
                node_name(target),
                symbol_label(byte)
            );
        }
    }

    out.push_str("  subgraph cluster_legend {\n");
    out.push_str("    label = \"Active Patterns\";\n");
    out.push_str("    style=filled; color=lightyellow;\n");
    out.push_str("    node [shape=box, style=filled, fillcolor=white];\n");
    let legend: String = automaton
        .patterns()
        .iter()
        .map(|p| format!("{}\\n", escape(p)))
        .collect();
    let _ = writeln!(out, "    Legend [label=\"{}\"];", legend);
    out.push_str("  }\n");

    out.push_str("}\n");
    out
}

/// Render the handshake pushdown machine as a DOT graph
pub fn handshake_dot() -> String {
    let mut out = String::new();
    out.push_str("digraph PDA {\n rankdir=TB;\n node [shape=record];\n");

    for (i, phase) in HandshakePhase::ALL.iter().enumerate() {
        let style = if *phase == HandshakePhase::Established {
            ", style=filled, fillcolor=lightgreen"
        } else {
            ""
        };
        let _ = writeln!(
            out,
            "  State{} [label=\"{{State: {} | Stack: {}}}\"{}];",
            i,
            phase.name(),
            phase.stack_marker(),
            style
        );
    }

    let _ = writeln!(
        out,
        "  State0 -> State1 [label=\"In: {}\\nPush: A\"];",
        HandshakeSymbol::Syn
    );
    let _ = writeln!(
        out,
        "  State1 -> State1 [label=\"In: {}\\nPop: A, Push: B\"];",
        HandshakeSymbol::SynAck
    );
    let _ = writeln!(
        out,
        "  State1 -> State2 [label=\"In: {}\\nPop: B\"];",
        HandshakeSymbol::Ack
    );
    out.push_str("}\n");
    out
}

/// Write DOT text to `path`
pub fn write_dot(path: &Path, contents: &str) -> Result<(), DiagramError> {
    fs::write(path, contents).map_err(|source| DiagramError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    info!("Generated '{}'", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_automaton_dot_nodes_and_edges() {
        let automaton = PatternAutomaton::from_patterns(["ad", "admin"]);
        let dot = automaton_dot(&automaton);

        assert!(dot.starts_with("digraph mDFA {"));
        assert!(dot.contains("q0 [shape=circle, fillcolor=lightgrey"));
        assert!(dot.contains("q0 -> node1 [label=\"a\"];"));
        assert!(dot.contains(
            "node2 [shape=doublecircle, fillcolor=lightpink, label=\"DETECTED:\\nad\"];"
        ));
        assert!(dot.contains("node3 [shape=circle, fillcolor=white, label=\"q3\\n(adm)\"];"));
        assert!(dot.contains("Legend [label=\"ad\\nadmin\\n\"];"));
        assert!(dot.trim_end().ends_with('}'));
    }

    #[test]
    fn test_shared_prefix_drawn_once() {
        let automaton = PatternAutomaton::from_patterns(["select", "selfish"]);
        let dot = automaton_dot(&automaton);
        assert_eq!(dot.matches("q0 -> ").count(), 1);
        assert_eq!(dot.matches(" -> ").count(), automaton.len() - 1);
    }

    #[test]
    fn test_escaping() {
        let automaton = PatternAutomaton::from_patterns(["a\"b"]);
        let dot = automaton_dot(&automaton);
        assert!(dot.contains("label=\"\\\"\""));
        assert!(dot.contains("DETECTED:\\na\\\"b"));
    }

    #[test]
    fn test_handshake_dot() {
        let dot = handshake_dot();
        assert!(dot.contains("State0 [label=\"{State: LISTEN | Stack: Empty}\"];"));
        assert!(dot.contains("State1 [label=\"{State: SYN_RCVD | Stack: A}\"];"));
        assert!(dot.contains("ESTABLISHED | Stack: Empty}\", style=filled, fillcolor=lightgreen"));
        assert!(dot.contains("In: SYN-ACK\\nPop: A, Push: B"));
    }

    #[test]
    fn test_write_dot() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pda_visual.dot");
        write_dot(&path, &handshake_dot()).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), handshake_dot());
    }

    #[test]
    fn test_write_dot_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("out.dot");
        assert!(write_dot(&path, "digraph {}").is_err());
    }
}

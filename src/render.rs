//! Text rendering of scan and handshake reports

use std::io::{self, Write};

use word_guard::{HandshakeOutcome, HandshakeReport, ScanReport};

const RULE: &str = "=========================================";

/// Print a scan report; traces only when `show_trace` is set
pub fn write_scan_report<W: Write>(
    out: &mut W,
    text: &str,
    report: &ScanReport,
    show_trace: bool,
) -> io::Result<()> {
    writeln!(out, "\n--- SCANNING INPUT: {} ---", text)?;

    for m in &report.matches {
        if show_trace {
            for step in &m.trace {
                writeln!(out, "  {}", step)?;
            }
        }
        writeln!(out, "  >>> [ALARM] MALICIOUS WORD FOUND: {} <<<", m.pattern)?;
        writeln!(out, "   [Scan Complete] -------------------")?;
    }

    writeln!(out, "\n{}", RULE)?;
    if report.is_clean() {
        writeln!(out, "  >>> Result: Clean Traffic.")?;
    } else {
        writeln!(out, "  >>> Result: {} threats detected!", report.threat_count())?;
    }
    Ok(())
}

/// Print a handshake report step by step
pub fn write_handshake_report<W: Write>(out: &mut W, report: &HandshakeReport) -> io::Result<()> {
    writeln!(out, "\n--- PDA SIMULATION ---")?;
    for step in &report.steps {
        writeln!(out, "  {}", step)?;
    }
    if let HandshakeOutcome::EmptyStackError { .. } = report.outcome {
        writeln!(out, "  Error: Stack empty!")?;
    }
    writeln!(out, ">>> {} <<<", report.outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use word_guard::{HandshakeValidator, PatternAutomaton, Scanner};

    fn render_scan(text: &str, show_trace: bool) -> String {
        let automaton = PatternAutomaton::with_defaults();
        let report = Scanner::new(&automaton).scan_str(text);
        let mut out = Vec::new();
        write_scan_report(&mut out, text, &report, show_trace).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_clean_scan() {
        let out = render_scan("hello world", true);
        assert!(out.contains("--- SCANNING INPUT: hello world ---"));
        assert!(out.contains(">>> Result: Clean Traffic."));
        assert!(!out.contains("ALARM"));
    }

    #[test]
    fn test_threat_scan_with_trace() {
        let out = render_scan("hello union", true);
        assert!(out.contains("  State q0 --(u)--> q1\n"));
        assert!(out.contains(">>> [ALARM] MALICIOUS WORD FOUND: union <<<"));
        assert!(out.contains(">>> Result: 1 threats detected!"));
    }

    #[test]
    fn test_trace_hidden() {
        let out = render_scan("union", false);
        assert!(!out.contains("State q0"));
        assert!(out.contains("MALICIOUS WORD FOUND: union"));
    }

    #[test]
    fn test_handshake_rendering() {
        let report = HandshakeValidator::new().simulate_traced(&["syn", "syn-ack", "ack", "extra"]);
        let mut out = Vec::new();
        write_handshake_report(&mut out, &report).unwrap();
        let out = String::from_utf8(out).unwrap();

        assert!(out.contains("Input: ACK | Expected: ACK -> MATCH."));
        assert!(out.contains("Error: Stack empty!"));
        assert!(out.contains(">>> EMPTY_STACK_ERROR at token 4"));
    }
}

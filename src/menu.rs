//! Interactive menu

use std::io::{self, BufRead, Write};

use word_guard::Guard;

use crate::render;

const MENU: &str = concat!(
    "\nMENU:\n",
    "1. Test DFA Malicious Word/s Scanner\n",
    "2. PDA Validation TCP Handshake\n",
    "0. Exit\n",
    "Choice: ",
);

fn prompt<R: BufRead, W: Write>(
    input: &mut R,
    out: &mut W,
    text: &str,
) -> io::Result<Option<String>> {
    write!(out, "{}", text)?;
    out.flush()?;

    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
}

/// Run the menu until `0` or end of input
pub fn run<R: BufRead, W: Write>(guard: &Guard, input: &mut R, out: &mut W) -> io::Result<()> {
    loop {
        let Some(choice) = prompt(input, out, MENU)? else {
            return Ok(());
        };

        match choice.trim() {
            "0" => return Ok(()),
            "1" => {
                let Some(text) = prompt(input, out, "Enter text: ")? else {
                    return Ok(());
                };
                let report = guard.scan(&text);
                render::write_scan_report(out, &text, &report, guard.config().show_trace)?;
            }
            "2" => {
                let Some(line) = prompt(input, out, "Enter sequence: ")? else {
                    return Ok(());
                };
                let tokens: Vec<&str> = line.split_whitespace().collect();
                let report = guard.handshake(&tokens);
                render::write_handshake_report(out, &report)?;
            }
            other => writeln!(out, "Unknown choice '{}'", other)?,
        }
    }
}

//! word-guard command line

use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use log::{debug, info};

use word_guard::{Guard, GuardConfig};

mod menu;
mod render;

/// Forbidden word scanner and TCP handshake validator
#[derive(Debug, Parser)]
#[command(name = "word-guard", version, about)]
struct Cli {
    /// JSON configuration file
    #[arg(short, long, value_name = "FILE", env = "WORD_GUARD_CONFIG")]
    config: Option<PathBuf>,

    /// Pattern file, overrides the configured one
    #[arg(short, long, value_name = "FILE")]
    patterns: Option<PathBuf>,

    /// Increase verbosity
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Scan text for forbidden words
    Scan {
        /// Text to scan; multiple words are joined with spaces
        #[arg(required = true)]
        text: Vec<String>,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Validate a SYN, SYN-ACK, ACK token sequence
    Handshake {
        /// Tokens in arrival order
        tokens: Vec<String>,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Write DOT diagrams of the automaton and the handshake machine
    Diagram {
        /// Directory for the generated files
        #[arg(short, long, value_name = "DIR", default_value = ".")]
        out_dir: PathBuf,
    },

    /// Interactive menu (default)
    Menu,
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
}

fn load_config(cli: &Cli) -> Result<GuardConfig> {
    let mut config = match &cli.config {
        Some(path) => GuardConfig::from_file(path)
            .with_context(|| format!("loading configuration from {}", path.display()))?,
        None => GuardConfig::default(),
    };
    if let Some(patterns) = &cli.patterns {
        config.pattern_file = patterns.clone();
    }
    debug!("Configuration: {:?}", config);
    Ok(config)
}

fn run(cli: Cli) -> Result<ExitCode> {
    let config = load_config(&cli)?;
    let guard = Guard::new(config);
    info!("Patterns loaded from {}", guard.origin());

    let stdout = io::stdout();
    let mut out = stdout.lock();

    match cli.command.unwrap_or(Commands::Menu) {
        Commands::Scan { text, json } => {
            let text = text.join(" ");
            let report = guard.scan(&text);
            if json {
                serde_json::to_writer_pretty(&mut out, &report)?;
                writeln!(out)?;
            } else {
                render::write_scan_report(&mut out, &text, &report, guard.config().show_trace)?;
            }
            Ok(if report.is_clean() {
                ExitCode::SUCCESS
            } else {
                ExitCode::from(1)
            })
        }
        Commands::Handshake { tokens, json } => {
            let tokens: Vec<&str> = tokens.iter().flat_map(|t| t.split_whitespace()).collect();
            let report = guard.handshake(&tokens);
            if json {
                serde_json::to_writer_pretty(&mut out, &report)?;
                writeln!(out)?;
            } else {
                render::write_handshake_report(&mut out, &report)?;
            }
            Ok(if report.outcome.is_successful() {
                ExitCode::SUCCESS
            } else {
                ExitCode::from(1)
            })
        }
        Commands::Diagram { out_dir } => {
            for path in guard.export_diagrams(&out_dir)? {
                writeln!(out, "[System] Generated '{}'.", path.display())?;
            }
            Ok(ExitCode::SUCCESS)
        }
        Commands::Menu => {
            writeln!(out, "=========================================")?;
            writeln!(out, "   WORD-GUARD: MALICIOUS WORD SCANNER AND HANDSHAKE VALIDATION")?;
            writeln!(out, "=========================================")?;
            writeln!(out, "[System] Patterns loaded from {}.", guard.origin())?;
            let stdin = io::stdin();
            menu::run(&guard, &mut stdin.lock(), &mut out)?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::from(2)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_scan() {
        let cli = Cli::parse_from(["word-guard", "scan", "hello", "union", "--json"]);
        match cli.command {
            Some(Commands::Scan { text, json }) => {
                assert_eq!(text, vec!["hello", "union"]);
                assert!(json);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_missing_pattern_file_is_not_fatal() {
        let cli = Cli::parse_from([
            "word-guard",
            "--patterns",
            "/nonexistent/words.txt",
            "scan",
            "admin",
        ]);
        let config = load_config(&cli).unwrap();
        assert_eq!(config.pattern_file, PathBuf::from("/nonexistent/words.txt"));

        let guard = Guard::new(config);
        assert_eq!(guard.origin(), &word_guard::PatternOrigin::Defaults);
        assert_eq!(guard.scan("admin").threat_count(), 1);
    }

    #[test]
    fn test_no_subcommand_means_menu() {
        let cli = Cli::parse_from(["word-guard", "-vv"]);
        assert!(cli.command.is_none());
        assert_eq!(cli.verbose, 2);
    }
}

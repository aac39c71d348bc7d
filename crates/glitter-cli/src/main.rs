//! Command-line driver for Glitter: with no arguments, starts an
//! interactive REPL; given a file path, runs it once and exits.

mod config;
mod diagnostics;
mod natives;
mod repl;

use std::io::BufReader;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::warn;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use glitter::Session;

use config::Config;
use diagnostics::print_diagnostic;

/// Glitter — a small dynamically-typed scripting language.
#[derive(Parser, Debug)]
#[command(name = "glitter")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Run a Glitter script, or start the REPL with no arguments")]
struct Cli {
    /// Script to run. Omit to start the REPL.
    script: Option<PathBuf>,

    /// Enable verbose (debug-level) logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Disable colored diagnostic output.
    #[arg(long, global = true, env = "GLITTER_NO_COLOR")]
    no_color: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let mut config = Config::load();
    if cli.no_color && config.color {
        config.color = false;
        if let Err(err) = config.save() {
            warn!("failed to persist color preference: {err}");
        }
    }
    let use_color = config.color;

    let mut session = Session::new(
        Box::new(BufReader::new(std::io::stdin())),
        Box::new(std::io::stdout()),
    );
    natives::register_natives(&mut session);

    match cli.script {
        Some(path) => run_file(&mut session, &path, use_color),
        None => {
            repl::run(&mut session, use_color).expect("stdin/stdout should stay available");
            ExitCode::SUCCESS
        }
    }
}

fn run_file(session: &mut Session, path: &PathBuf, use_color: bool) -> ExitCode {
    let source = match std::fs::read_to_string(path) {
        Ok(source) => source,
        Err(err) => {
            eprintln!("glitter: could not read {}: {err}", path.display());
            return ExitCode::FAILURE;
        }
    };

    let outcome = session.run(&source, path);
    for diagnostic in &outcome.diagnostics {
        print_diagnostic(&source, diagnostic, use_color);
    }

    if outcome.has_errors() {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("warn")
    };

    let subscriber = fmt::layer()
        .with_target(false)
        .with_thread_ids(false)
        .with_thread_names(false);

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(subscriber)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_parses_with_no_arguments() {
        let cli = Cli::parse_from(["glitter"]);
        assert!(cli.script.is_none());
        assert!(!cli.no_color);
    }

    #[test]
    fn cli_parses_script_path() {
        let cli = Cli::parse_from(["glitter", "main.glit"]);
        assert_eq!(cli.script, Some(PathBuf::from("main.glit")));
    }

    #[test]
    fn cli_parses_no_color_flag() {
        let cli = Cli::parse_from(["glitter", "--no-color", "main.glit"]);
        assert!(cli.no_color);
    }
}

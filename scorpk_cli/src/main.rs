//! Scorpk command-line runner
//!
//! Loads one program, runs it to completion and optionally dumps the final
//! context. Program errors are part of the transcript and never change the
//! exit status; only load failures do.

use clap::{ArgAction, Parser};
use scorpk_core::{Interpreter, InterpreterConfig, ScriptLoader, StdoutSink};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "scorpk")]
#[command(about = "Run a Scorpk program", long_about = None, version)]
struct Cli {
    /// Program to run (.scpk)
    file: PathBuf,

    /// YAML interpreter configuration
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Print the final variables, functions and intents as JSON
    #[arg(long)]
    dump_state: bool,

    /// Log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

/// Filter used when `RUST_LOG` is unset
fn filter_directive(verbose: u8, config: &InterpreterConfig) -> String {
    match verbose {
        0 => config.log_filter.clone(),
        1 => "debug".to_string(),
        _ => "trace".to_string(),
    }
}

fn init_tracing(verbose: u8, config: &InterpreterConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter_directive(verbose, config)));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: &Cli, loader: &ScriptLoader, config: InterpreterConfig) -> scorpk_core::Result<()> {
    let program = loader.load_file(&cli.file)?;
    let interpreter = Interpreter::with_config(config, Arc::new(StdoutSink));

    let summary = interpreter.run(&program);
    tracing::info!(
        "{}: {} statements, {} errors in {:.3}ms",
        cli.file.display(),
        summary.statements,
        summary.errors,
        summary.duration_ms
    );

    if cli.dump_state {
        let snapshot = interpreter.context().snapshot();
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
    }
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let loader = ScriptLoader::new();

    let config = match &cli.config {
        Some(path) => match loader.load_config_file(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("scorpk: cannot load config {}: {}", path.display(), e);
                return ExitCode::FAILURE;
            }
        },
        None => InterpreterConfig::default(),
    };
    init_tracing(cli.verbose, &config);

    match run(&cli, &loader, config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("scorpk: {}", e);
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_args() {
        let cli = Cli::try_parse_from(["scorpk", "prog.scpk", "--dump-state", "-vv"]).unwrap();
        assert_eq!(cli.file, PathBuf::from("prog.scpk"));
        assert!(cli.dump_state);
        assert_eq!(cli.verbose, 2);
        assert!(cli.config.is_none());
    }

    #[test]
    fn test_file_is_required() {
        assert!(Cli::try_parse_from(["scorpk"]).is_err());
    }

    #[test]
    fn test_filter_precedence() {
        let config = InterpreterConfig {
            log_filter: "info".to_string(),
            ..InterpreterConfig::default()
        };
        assert_eq!(filter_directive(0, &config), "info");
        assert_eq!(filter_directive(1, &config), "debug");
        assert_eq!(filter_directive(3, &config), "trace");
    }
}

// File: src/main.rs
//
// Main entry point for the DCL interpreter.
// Handles command-line argument parsing, logging setup and dispatches to the
// appropriate subcommand (run, check, ast, tokens or repl).

use clap::{Parser as ClapParser, Subcommand};
use colored::Colorize;
use dcl::check::check_labels;
use dcl::config::DclConfig;
use dcl::errors::LangError;
use dcl::interpreter::Interpreter;
use dcl::lexer::tokenize;
use dcl::parser::parse_source;
use dcl::repl::Repl;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[derive(ClapParser)]
#[command(
    name = "dcl",
    about = "DCL: labeled loops, multi-level BREAK and numeric READ/PRINT",
    version = env!("CARGO_PKG_VERSION"),
    long_about = None
)]
struct Cli {
    /// TOML configuration file (defaults to ./dcl.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
#[command(arg_required_else_help = true)]
enum Commands {
    /// Run a DCL program, reading numbers from stdin
    Run {
        /// Path to the .dcl file
        file: PathBuf,
    },

    /// Parse a program and validate its BREAK targets without running it
    Check {
        file: PathBuf,
    },

    /// Print the parsed syntax tree as JSON
    Ast {
        file: PathBuf,
    },

    /// Print the token stream, one token per line
    Tokens {
        file: PathBuf,
    },

    /// Launch interactive DCL REPL
    Repl,
}

fn init_logging(filter: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn read_source(file: &Path) -> Result<String, String> {
    fs::read_to_string(file).map_err(|e| format!("Failed to read {}: {}", file.display(), e))
}

fn report(errors: &[LangError]) {
    for err in errors {
        eprint!("{}", err);
    }
}

fn run(cli: Cli, config: DclConfig) -> Result<(), ExitCode> {
    let load = |file: &Path| {
        read_source(file).map_err(|msg| {
            eprintln!("{} {}", "Error:".bright_red().bold(), msg);
            ExitCode::FAILURE
        })
    };
    let file_name = |file: &Path| file.display().to_string();

    match cli.command {
        Commands::Run { file } => {
            let source = load(&file)?;
            let mut interpreter = Interpreter::with_config(&config.run);
            interpreter.set_source_file(file_name(&file));
            interpreter.run_source(&source).map_err(|err| {
                report(&[err]);
                ExitCode::FAILURE
            })
        }

        Commands::Check { file } => {
            let source = load(&file)?;
            let name = file_name(&file);
            let program = parse_source(&source).map_err(|err| {
                report(&[err.attach_source(Some(&name), &source)]);
                ExitCode::FAILURE
            })?;
            check_labels(&program).map_err(|errors| {
                let errors: Vec<LangError> =
                    errors.into_iter().map(|e| e.attach_source(Some(&name), &source)).collect();
                report(&errors);
                eprintln!("{} {} error(s)", "Check failed:".bright_red().bold(), errors.len());
                ExitCode::FAILURE
            })?;
            println!("{} {}", "✓".bright_green(), name);
            Ok(())
        }

        Commands::Ast { file } => {
            let source = load(&file)?;
            let program = parse_source(&source).map_err(|err| {
                report(&[err.attach_source(Some(&file_name(&file)), &source)]);
                ExitCode::FAILURE
            })?;
            match serde_json::to_string_pretty(&program) {
                Ok(json) => {
                    println!("{}", json);
                    Ok(())
                }
                Err(e) => {
                    eprintln!("{} {}", "Error:".bright_red().bold(), e);
                    Err(ExitCode::FAILURE)
                }
            }
        }

        Commands::Tokens { file } => {
            let source = load(&file)?;
            let tokens = tokenize(&source).map_err(|err| {
                report(&[err.attach_source(Some(&file_name(&file)), &source)]);
                ExitCode::FAILURE
            })?;
            for token in tokens {
                match token.text {
                    Some(text) => println!("{}\t{}\t{}", token.location, token.code, text),
                    None => println!("{}\t{}", token.location, token.code),
                }
            }
            Ok(())
        }

        Commands::Repl => {
            let mut repl = Repl::new(&config.run).map_err(|e| {
                eprintln!("{} {}", "Error:".bright_red().bold(), e);
                ExitCode::FAILURE
            })?;
            repl.run().map_err(|e| {
                eprintln!("{} {}", "Error:".bright_red().bold(), e);
                ExitCode::FAILURE
            })
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match DclConfig::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{} {}", "Error:".bright_red().bold(), e);
            return ExitCode::FAILURE;
        }
    };
    init_logging(&config.log.filter);
    tracing::debug!(?config, "configuration loaded");

    match run(cli, config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(code) => code,
    }
}

//! Contour CLI
//!
//! Validate, parse and check type definitions from the command line.
//! Values are given as JSON; strings written `":name"` are symbols.

#![warn(missing_docs)]
#![warn(clippy::all)]

use clap::{Parser, Subcommand, ValueEnum};
use color_eyre::Result;
use color_eyre::eyre::WrapErr;
use contour_check::{describe, matches_definition};
use contour_match::{StandardIntrospector, StandardRegistry, Value};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter
const LOG_ENV: &str = "CONTOUR_LOG";

#[derive(Parser)]
#[command(name = "contour")]
#[command(about = "Contour - type definitions for dynamic values", long_about = None)]
struct Cli {
    /// Log at debug level
    #[arg(short, long, global = true)]
    verbose: bool,
    /// Log output format
    #[arg(long, value_enum, default_value_t = LogFormat::Text, global = true)]
    log_format: LogFormat,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum LogFormat {
    /// Human-readable lines
    Text,
    /// One JSON object per line
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Check that a definition is well-formed
    Validate {
        /// Type definition
        definition: String,
    },
    /// Parse a definition and print its canonical form
    Parse {
        /// Type definition
        definition: String,
        /// Print the tree as JSON
        #[arg(long)]
        json: bool,
        /// Pretty-print the JSON tree
        #[arg(long)]
        pretty: bool,
    },
    /// Match a JSON value against a definition
    Check {
        /// Type definition
        definition: String,
        /// Value as JSON
        value: String,
    },
    /// Describe the type of a JSON value
    Describe {
        /// Value as JSON
        value: String,
    },
}

fn main() -> Result<ExitCode> {
    color_eyre::install()?;
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.log_format);

    match cli.command {
        Commands::Validate { definition } => match contour_lang::validate(&definition) {
            Ok(()) => {
                println!("ok");
                Ok(ExitCode::SUCCESS)
            }
            Err(err) => {
                println!("{}", err);
                Ok(ExitCode::FAILURE)
            }
        },
        Commands::Parse {
            definition,
            json,
            pretty,
        } => {
            let expr = contour_lang::parse(&definition)?;
            if pretty {
                println!("{}", serde_json::to_string_pretty(&expr)?);
            } else if json {
                println!("{}", serde_json::to_string(&expr)?);
            } else {
                println!("{}", expr);
            }
            Ok(ExitCode::SUCCESS)
        }
        Commands::Check { definition, value } => {
            let value = read_value(&value)?;
            let registry = StandardRegistry::new();
            tracing::debug!(%definition, "checking value");
            if matches_definition(&definition, &value, &registry, &StandardIntrospector)? {
                println!("match");
                Ok(ExitCode::SUCCESS)
            } else {
                println!("no match: value is {}", describe(&value, &StandardIntrospector));
                Ok(ExitCode::FAILURE)
            }
        }
        Commands::Describe { value } => {
            let value = read_value(&value)?;
            println!("{}", describe(&value, &StandardIntrospector));
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn read_value(text: &str) -> Result<Value> {
    let json: serde_json::Value =
        serde_json::from_str(text).wrap_err_with(|| format!("invalid JSON value: {}", text))?;
    Ok(Value::from_json(json))
}

fn init_tracing(verbose: bool, format: LogFormat) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    match format {
        LogFormat::Text => subscriber.init(),
        LogFormat::Json => subscriber.json().init(),
    }
}

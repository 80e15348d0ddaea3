//! jsoncheck CLI
//!
//! Command-line interface for validating JSON documents against a schema.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use jsoncheck::{load_json, validate_against_schema, SchemaCompiler, ValidateError};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "jsoncheck")]
#[command(about = "Validate JSON documents against a schema")]
#[command(version)]
struct Cli {
    /// Log schema compilation details to stderr
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a document against a schema
    Validate {
        /// Document file to validate
        document: PathBuf,

        /// Schema file
        #[arg(long, short)]
        schema: PathBuf,

        /// Output results as JSON (for automation)
        #[arg(long)]
        json: bool,
    },

    /// Compile a schema without validating anything
    Check {
        /// Schema file
        schema: PathBuf,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Commands::Validate {
            document,
            schema,
            json,
        } => run_validate(&document, &schema, json),
        Commands::Check { schema } => run_check(&schema),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(code) => ExitCode::from(code),
    }
}

/// `RUST_LOG` wins; otherwise warnings only, or debug with `--verbose`.
fn init_tracing(verbose: bool) {
    let default = if verbose { "jsoncheck=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run_validate(document_path: &Path, schema_path: &Path, json_output: bool) -> Result<(), u8> {
    let schema = SchemaCompiler::new()
        .compile_file(schema_path)
        .map_err(|e| {
            report_error(json_output, &format!("loading schema: {}", e));
            e.exit_code() as u8
        })?;

    let document = load_json(document_path).map_err(|e| {
        report_error(json_output, &format!("loading document: {}", e));
        e.exit_code() as u8
    })?;

    match validate_against_schema(&schema, &document) {
        Ok(()) => {
            if json_output {
                println!(r#"{{"valid":true}}"#);
            } else {
                println!("Valid");
            }
            Ok(())
        }
        Err(ValidateError::Invalid { errors }) => {
            if json_output {
                let output = serde_json::json!({
                    "valid": false,
                    "errors": errors
                });
                println!("{}", output);
            } else {
                eprintln!("Validation failed:");
                for error in errors {
                    eprintln!("  {}", error);
                }
            }
            Err(1)
        }
        Err(e @ ValidateError::Load(_)) => {
            report_error(json_output, &e.to_string());
            Err(e.exit_code() as u8)
        }
    }
}

fn run_check(schema_path: &Path) -> Result<(), u8> {
    match SchemaCompiler::new().compile_file(schema_path) {
        Ok(_) => {
            println!("OK");
            Ok(())
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            Err(e.exit_code() as u8)
        }
    }
}

/// Output an error message in plain text or JSON format.
fn report_error(json_output: bool, msg: &str) {
    if json_output {
        println!(
            "{}",
            serde_json::json!({ "valid": false, "error": msg })
        );
    } else {
        eprintln!("Error: {}", msg);
    }
}

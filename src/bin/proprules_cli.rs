//! PropRules CLI - Bridge interface for scripts
//!
//! Commands: kinds, check
//! Outputs JSON to stdout, logs to stderr (RUST_LOG)
//! Returns 2 when a rule is broken, 1 when rules could not run

use clap::{Parser, Subcommand};
use serde_json::{json, Value};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

use proprules_core::{CheckStatus, RuleCatalog, RuleSpec, ScalarKind};

#[derive(Parser)]
#[command(name = "proprules-cli")]
#[command(about = "PropRules CLI - Property Validation Rule Engine")]
#[command(version = proprules_core::ENGINE_VERSION)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List supported scalar kinds
    Kinds,

    /// Evaluate rules against a target object
    Check {
        /// JSON object holding the target's properties
        #[arg(short, long)]
        target: String,

        /// Single rule as JSON (RuleSpec)
        #[arg(short, long, conflicts_with = "rules")]
        rule: Option<String>,

        /// Rule file, or directory of rule files
        #[arg(long)]
        rules: Option<PathBuf>,
    },
}

fn fail(message: String) -> ExitCode {
    println!("{}", json!({ "success": false, "error": message }));
    ExitCode::FAILURE
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Kinds => {
            let kinds: Vec<_> = ScalarKind::ALL
                .iter()
                .map(|k| {
                    json!({
                        "kind": k,
                        "integer": k.is_integer(),
                        "float": k.is_float(),
                    })
                })
                .collect();
            println!("{:#}", Value::Array(kinds));
            ExitCode::SUCCESS
        }

        Commands::Check {
            target,
            rule,
            rules,
        } => {
            let target: Value = match serde_json::from_str(&target) {
                Ok(Value::Object(map)) => Value::Object(map),
                Ok(_) => return fail("Target must be a JSON object".to_string()),
                Err(e) => return fail(format!("Invalid target: {}", e)),
            };

            let catalog = match (rule, rules) {
                (Some(rule), _) => {
                    let spec: RuleSpec = match serde_json::from_str(&rule) {
                        Ok(s) => s,
                        Err(e) => return fail(format!("Invalid rule: {}", e)),
                    };
                    match RuleCatalog::from_specs(&[spec]) {
                        Ok(c) => c,
                        Err(e) => return fail(e.to_string()),
                    }
                }
                (None, Some(path)) => match RuleCatalog::load(&path) {
                    Ok(c) => c,
                    Err(e) => return fail(e.to_string()),
                },
                (None, None) => return fail("Either --rule or --rules is required".to_string()),
            };

            let report = catalog.check(&target);
            match serde_json::to_string_pretty(&report.results) {
                Ok(out) => println!("{}", out),
                Err(e) => return fail(format!("Failed to encode results: {}", e)),
            }
            match report.status {
                CheckStatus::Passed => ExitCode::SUCCESS,
                CheckStatus::Broken => ExitCode::from(2), // Broken rule
                CheckStatus::Failed => ExitCode::FAILURE,
            }
        }
    }
}

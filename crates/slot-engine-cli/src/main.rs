//! `slots` CLI — compute bookable appointment slots from the command line.
//!
//! ## Usage
//!
//! ```sh
//! # Request on stdin, slots on stdout
//! cat request.json | slots find
//!
//! # From file to file, pretty-printed
//! slots find -i request.json -o slots.json --pretty
//!
//! # Override the request's engine configuration with a TOML file
//! slots find -i request.json --config engine.toml
//!
//! # Validate a TOML configuration and print its normalized JSON form
//! slots check-config -i engine.toml
//!
//! # Per-shift debug logging on stderr
//! slots -v find -i request.json
//! ```

mod logging;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use slot_engine::{slots_to_json, AvailabilityRequest, EngineConfiguration};
use std::io::{self, Read};
use tracing::info;

#[derive(Parser)]
#[command(
    name = "slots",
    version,
    about = "Compute bookable appointment slots with priorities"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log engine decisions to stderr (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Find available slots for a JSON availability request
    Find {
        /// Request file (reads from stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,
        /// Output file (writes to stdout if omitted)
        #[arg(short, long)]
        output: Option<String>,
        /// TOML engine configuration replacing the request's `config`
        #[arg(long)]
        config: Option<String>,
        /// Pretty-print the JSON output
        #[arg(long)]
        pretty: bool,
    },
    /// Validate a TOML engine configuration
    CheckConfig {
        /// Configuration file (reads from stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    match cli.command {
        Commands::Find {
            input,
            output,
            config,
            pretty,
        } => {
            let json = read_input(input.as_deref(), "request")?;
            let mut request =
                AvailabilityRequest::from_json(&json).context("Failed to parse availability request")?;

            if let Some(path) = config {
                request.config = load_config(&path)?;
            }

            let slots = request.run().context("Failed to compute available slots")?;
            info!(slots = slots.len(), "slots computed");

            let out = slots_to_json(&slots, pretty)?;
            write_output(output.as_deref(), &out)?;
        }
        Commands::CheckConfig { input } => {
            let toml = read_input(input.as_deref(), "config")?;
            let config = EngineConfiguration::from_toml_str(&toml)
                .context("Invalid engine configuration")?;
            println!("{}", serde_json::to_string_pretty(&config)?);
        }
    }

    Ok(())
}

fn load_config(path: &str) -> Result<EngineConfiguration> {
    let toml = read_input(Some(path), "config")?;
    EngineConfiguration::from_toml_str(&toml)
        .with_context(|| format!("Invalid engine configuration in {}", path))
}

/// Read a whole `what` document from `path`, or from stdin when absent.
fn read_input(path: Option<&str>, what: &str) -> Result<String> {
    let Some(path) = path else {
        let mut buf = String::new();
        io::stdin()
            .read_to_string(&mut buf)
            .with_context(|| format!("Failed to read {} from stdin", what))?;
        return Ok(buf);
    };
    std::fs::read_to_string(path).with_context(|| format!("Failed to read {} file: {}", what, path))
}

/// Write `body` plus a trailing newline to `path`, or to stdout when absent.
fn write_output(path: Option<&str>, body: &str) -> Result<()> {
    match path {
        Some(path) => {
            std::fs::write(path, format!("{}\n", body))
                .with_context(|| format!("Failed to write slots file: {}", path))?;
            info!(path, "slots written");
        }
        None => println!("{}", body),
    }
    Ok(())
}

//! # tandem
//!
//! CLI tool for simulating and inspecting the Tandem protocol.
//!
//! ## Commands
//!
//! - `simulate`: Play one round between an in-process phone and watch
//! - `resolve`: Compute the outcome of two choices
//! - `decode`: Parse a wire command
//! - `config`: Show the effective configuration
//!
//! ## Example
//!
//! ```bash
//! # Phone plays rock, watch plays scissors
//! tandem simulate --primary rock --peer scissors
//!
//! # Watch chooses first over a lossy link
//! tandem simulate --primary paper --peer paper --peer-first --loss 0.2 --seed 7
//!
//! # Inspect a command
//! tandem decode RPS:RESULT:WATCH
//! ```

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tandem_client::{Config, DEFAULT_CONFIG_FILE};
use tandem_types::Choice;
use tracing_subscriber::EnvFilter;

mod commands;

use commands::{config, decode, parse_choice, resolve, simulate};

/// CLI tool for simulating and inspecting the Tandem protocol.
#[derive(Parser, Debug)]
#[command(name = "tandem")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Configuration file
    #[arg(long, global = true, default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    /// Log filter (overrides RUST_LOG and the config file)
    #[arg(long, global = true)]
    log: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Play one round between an in-process phone and watch
    Simulate {
        /// Phone choice (rock, paper, scissors)
        #[arg(long, value_parser = parse_choice)]
        primary: Choice,

        /// Watch choice (rock, paper, scissors)
        #[arg(long, value_parser = parse_choice)]
        peer: Choice,

        /// Let the watch choose before the phone
        #[arg(long)]
        peer_first: bool,

        /// Probability that the link loses a message (overrides config)
        #[arg(long)]
        loss: Option<f64>,

        /// Maximum per-message delay in milliseconds (overrides config)
        #[arg(long)]
        max_delay_ms: Option<u64>,

        /// RNG seed for the link (overrides config)
        #[arg(long)]
        seed: Option<u64>,

        /// How long to wait for the round to resolve
        #[arg(long, default_value = "1000")]
        timeout_ms: u64,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Compute the outcome of a phone choice against a watch choice
    Resolve {
        /// Phone choice
        #[arg(value_parser = parse_choice)]
        primary: Choice,

        /// Watch choice
        #[arg(value_parser = parse_choice)]
        peer: Choice,
    },

    /// Parse a wire command such as RPS:WATCH:PAPER
    Decode {
        /// Command text
        command: String,
    },

    /// Show the effective configuration
    Config {
        /// Only print the config file location
        #[arg(long)]
        path: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = Config::load_or_default(&cli.config)
        .with_context(|| format!("Failed to load {}", cli.config.display()))?;

    init_logging(cli.log.as_deref(), &config)?;

    match cli.command {
        Commands::Simulate {
            primary,
            peer,
            peer_first,
            loss,
            max_delay_ms,
            seed,
            timeout_ms,
            json,
        } => {
            let mut config = config;
            if let Some(loss) = loss {
                config.channel.loss_rate = loss;
            }
            if let Some(delay) = max_delay_ms {
                config.channel.max_delay_ms = delay;
            }
            if seed.is_some() {
                config.channel.seed = seed;
            }
            config.validate().context("Invalid simulation settings")?;

            let plan = simulate::Plan {
                primary,
                peer,
                peer_first,
                timeout: std::time::Duration::from_millis(timeout_ms),
            };
            simulate::run(&config, plan, json).await?;
        }
        Commands::Resolve { primary, peer } => {
            resolve::run(primary, peer);
        }
        Commands::Decode { command } => {
            decode::run(&command)?;
        }
        Commands::Config { path } => {
            config::run(&cli.config, &config, path)?;
        }
    }

    Ok(())
}

/// Install the tracing subscriber: `--log`, then `RUST_LOG`, then config.
fn init_logging(flag: Option<&str>, config: &Config) -> Result<()> {
    let filter = match flag {
        Some(directive) => EnvFilter::try_new(directive)
            .with_context(|| format!("Invalid log filter {:?}", directive))?,
        None => match EnvFilter::try_from_default_env() {
            Ok(filter) => filter,
            Err(_) => EnvFilter::try_new(&config.logging.filter).with_context(|| {
                format!("Invalid log filter {:?} in config", config.logging.filter)
            })?,
        },
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
    Ok(())
}

//! Token Launcher
//!
//! Command line entry point. `launch` issues a new token from a TOML
//! configuration; `keygen` creates a new keypair.

#![deny(unused_imports)]
#![deny(unused_mut)]
#![deny(unused_variables)]
#![warn(unused_must_use)]

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::time::Duration;
use token_launch::{config::LaunchConfig, launch_token, wallet, SolanaRpc};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Command line arguments
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Issue a new token in a single transaction
    Launch {
        /// Path to configuration file
        #[arg(short, long, default_value = "launch.toml")]
        config: String,
    },
    /// Generate a new keypair and print both halves
    Keygen {
        /// Also write the keypair to this file
        #[arg(short, long)]
        outfile: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    init_logging(args.verbose)?;

    match args.command {
        Command::Launch { config } => run_launch(&config).await,
        Command::Keygen { outfile } => run_keygen(outfile.as_deref()),
    }
}

/// Initialize logging subsystem
fn init_logging(verbose: bool) -> Result<()> {
    let env_filter = if verbose {
        "token_launch=debug,info"
    } else {
        "token_launch=info,warn"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| env_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_target(true))
        .try_init()
        .context("Failed to initialize logging")?;

    Ok(())
}

async fn run_launch(config_path: &str) -> Result<()> {
    info!("Loading configuration from: {}", config_path);
    let config = LaunchConfig::from_file_with_env(config_path)
        .with_context(|| format!("Failed to load config from {}", config_path))?;

    let payer = wallet::load_payer(&config.payer).context("Failed to load payer keypair")?;

    let commitment = config.network.commitment_config()?;
    let rpc = SolanaRpc::with_timeout(
        config.network.rpc_url.clone(),
        commitment,
        Duration::from_secs(config.network.timeout_secs),
    );
    info!(endpoint = %rpc.url(), commitment = %config.network.commitment, "Connecting");

    let receipt = launch_token(&rpc, &payer, &config.token)
        .await
        .context("Token launch failed")?;

    println!("Token address: {}", receipt.mint);
    println!("Transaction signature: {}", receipt.signature);
    Ok(())
}

fn run_keygen(outfile: Option<&str>) -> Result<()> {
    let generated = wallet::GeneratedKeypair::generate();

    println!("Public key: {}", generated.public_key());
    println!("Private key: {}", generated.secret_key_json()?);

    if let Some(path) = outfile {
        generated.write_to(path)?;
        info!("Keypair written to {}", path);
    }
    Ok(())
}

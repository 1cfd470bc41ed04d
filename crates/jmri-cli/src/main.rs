//! JMRI CLI - Command-line tool for driving a JMRI layout
//!
//! Lists reporters over HTTP, reads reporter state and runs trains over the
//! JMRI WebSocket session.

mod commands;
mod config;
mod output;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use jmri_client::JmriClient;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::config::Config;
use crate::output::{OutputContext, OutputFormat};

#[derive(Parser)]
#[command(name = "jmri-cli")]
#[command(author, version, about = "JMRI layout control CLI")]
#[command(propagate_version = true)]
struct Cli {
    /// JMRI web server host
    #[arg(long, env = "JMRI_HOST")]
    host: Option<String>,

    /// JMRI web server port
    #[arg(short, long, env = "JMRI_PORT")]
    port: Option<u16>,

    /// Configuration file path
    #[arg(short, long, env = "JMRI_CONFIG")]
    config: Option<PathBuf>,

    /// Throttle name used when running trains
    #[arg(long)]
    throttle_name: Option<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    output: OutputFormat,

    /// Disable colored output
    #[arg(long)]
    no_color: bool,

    /// Minimal output (for scripting)
    #[arg(short, long)]
    quiet: bool,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List all reporters
    Reporters,

    /// Show the current state of a reporter
    Reporter {
        /// Reporter system name (e.g. MR001)
        name: String,
    },

    /// Bind a throttle to a locomotive and set its speed and direction
    RunTrain {
        /// DCC address of the locomotive
        address: u32,

        /// Speed as a fraction between 0.0 and 1.0
        speed: f64,

        /// "forward"; anything else runs in reverse
        #[arg(default_value = "forward")]
        direction: String,
    },

    /// List reporters, read MR001 and run address 138 forward at half speed
    Demo,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("warn")
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false))
        .with(filter)
        .init();

    // Load config file
    let config = if let Some(config_path) = &cli.config {
        Config::load_from(config_path)?
    } else {
        Config::load().unwrap_or_default()
    };

    // Merge CLI args with config
    let client_config = config.merge_with_args(
        cli.host.as_deref(),
        cli.port,
        cli.throttle_name.as_deref(),
    );

    let ctx = OutputContext::new(cli.output, cli.no_color, cli.quiet);

    let client = JmriClient::connect(client_config.clone())
        .await
        .with_context(|| format!("Failed to connect to JMRI at {}", client_config.endpoint))?;

    let result = match &cli.command {
        Commands::Reporters => commands::reporters(&client, &ctx).await,
        Commands::Reporter { name } => commands::reporter(&client, name, &ctx).await,
        Commands::RunTrain {
            address,
            speed,
            direction,
        } => commands::run_train(&client, *address, *speed, direction, &ctx).await,
        Commands::Demo => commands::demo(&client, &ctx).await,
    };

    client.close().await;
    result
}

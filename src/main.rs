//! hemerton: register action lists and open/close evidence requests on the
//! hemerton contract.
//!
//! Usage:
//!   hemerton lists new
//!   hemerton lists get
//!   hemerton test new
//!   hemerton test upload
//!   hemerton test get

use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};
use hemerton::clients::NodeosClient;
use hemerton::commands::{self, Context};
use hemerton::config::{Config, RuntimeConfig};
use hemerton::error::HemertonError;
use hemerton::form::TerminalBackend;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "hemerton")]
#[command(about = "Action lists and evidence requests on the hemerton contract", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to hemerton.toml
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// More logging on stderr (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Sign transactions without pushing them to the network
    #[arg(long, global = true)]
    no_broadcast: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Action list commands
    Lists {
        #[command(subcommand)]
        command: ListsCommand,
    },
    /// Request commands
    Test {
        #[command(subcommand)]
        command: TestCommand,
    },
}

#[derive(Subcommand)]
enum ListsCommand {
    /// Register a new action list
    New,
    /// Show every registered action list
    Get,
}

#[derive(Subcommand)]
enum TestCommand {
    /// Open a new request against an action list
    New,
    /// Upload the evidence of an open request
    Upload,
    /// Show every request
    Get,
}

fn init_logging(directive: &str) {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(directive))
        .with_writer(io::stderr)
        .init();
}

async fn run(cli: Cli) -> Result<()> {
    let config = Config::load(cli.config.as_deref())?;
    if let Some(source) = &config.runtime.source {
        tracing::info!("configuration loaded from {}", source.display());
    }

    let client = NodeosClient::from_config(&config)?;
    let ctx = Context::new(&config, &client).with_broadcast(!cli.no_broadcast);
    let backend = || TerminalBackend::new(config.prompt.clone());
    let mut out = io::stdout();

    match cli.command {
        Commands::Lists { command } => match command {
            ListsCommand::New => commands::lists::new(&ctx, backend(), &mut out).await?,
            ListsCommand::Get => commands::lists::get(&ctx, &mut out).await?,
        },
        Commands::Test { command } => match command {
            TestCommand::New => commands::requests::new(&ctx, backend(), &mut out).await?,
            TestCommand::Upload => commands::requests::upload(&ctx, backend(), &mut out).await?,
            TestCommand::Get => commands::requests::get(&ctx, &mut out).await?,
        },
    }
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    // Config::load logs, so the subscriber is installed first.
    init_logging(&RuntimeConfig::load_from_env().log_filter(cli.verbose));

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => match err.downcast_ref::<HemertonError>() {
            Some(HemertonError::Interrupted) => {
                println!("Aborted.");
                ExitCode::from(130)
            }
            // The workflow already printed its guidance.
            Some(HemertonError::RequiredContextEmpty { .. }) => ExitCode::FAILURE,
            Some(e) => {
                eprintln!("Error: {}", e);
                ExitCode::from(e.exit_code() as u8)
            }
            None => {
                eprintln!("Error: {:#}", err);
                ExitCode::FAILURE
            }
        },
    }
}

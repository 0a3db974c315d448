//! LM Studio CLI
//!
//! Connection bootstrap front end:
//! - status: find or launch LM Studio and report the connection
//! - probe: check the candidate ports without launching anything
//! - wake: launch LM Studio in service mode
//! - config: inspect or create the configuration file

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::builder::FalseyValueParser;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use lms_cli::commands;
use lms_cli::connect::Connector;
use lms_cli::output::print_error;
use lms_core::config::{self, ConfigFile};
use lms_core::{BuildConfig, ConnectionRequest, LmStudioPaths};

#[derive(Parser)]
#[command(name = "lms")]
#[command(author, version, about = "Find, wake and connect to LM Studio")]
#[command(propagate_version = true)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Host of a remote LM Studio server (no scheme, no port)
    #[arg(long, global = true)]
    host: Option<String>,

    /// Port of the LM Studio server
    #[arg(long, global = true)]
    port: Option<u16>,

    /// LM Studio home directory
    #[arg(long, global = true, env = "LMSTUDIO_HOME")]
    lmstudio_home: Option<PathBuf>,

    /// Use privileged local credentials even in development builds
    #[arg(
        long,
        global = true,
        hide = true,
        env = "LMS_FORCE_PROD",
        value_parser = FalseyValueParser::new()
    )]
    force_prod: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Clone)]
enum Commands {
    /// Connect to LM Studio, launching it if needed, and show the result
    Status,

    /// Check every candidate port for a running LM Studio server
    Probe,

    /// Launch LM Studio in service mode
    Wake,

    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Clone)]
enum ConfigAction {
    /// Show the effective configuration
    Show,
    /// Show the config file path
    Path,
    /// Write a config file with the defaults
    Init {
        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    let log_level = match (cli.quiet, cli.verbose) {
        (true, _) => "error",
        (false, 0) => "warn",
        (false, 1) => "info",
        (false, 2) => "debug",
        (false, _) => "trace",
    };

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| log_level.into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    match cli.command.clone().unwrap_or(Commands::Status) {
        Commands::Status => {
            let (request, file, paths) = prepare(&cli)?;
            let build = BuildConfig::from_embedded(option_env!("LMS_PRODUCTION_KEY"));
            tracing::debug!(
                production = build.is_production(),
                force_prod = cli.force_prod,
                home = %paths.home().display(),
                "Starting connection bootstrap"
            );

            let connector =
                Connector::new(file.discovery, &paths, build).with_force_production(cli.force_prod);

            if let Err(e) = commands::status_command(&connector, &request).await {
                print_error(&e.to_string());
                std::process::exit(e.exit_code());
            }
        }
        Commands::Probe => {
            let (request, file, _) = prepare(&cli)?;
            commands::probe_command(&file.discovery, request.resolved_host()).await?;
        }
        Commands::Wake => {
            let (_, _, paths) = prepare(&cli)?;
            if !commands::wake_command(&paths).await {
                std::process::exit(1);
            }
        }
        Commands::Config { action } => {
            let path = cli.config.as_deref();
            match action {
                ConfigAction::Show => commands::config_show(path)?,
                ConfigAction::Path => commands::config_path(path)?,
                ConfigAction::Init { force } => commands::config_init(path, force)?,
            }
        }
    }

    Ok(())
}

/// Validate the target and load configuration for the connection commands
///
/// Malformed hosts exit with status 1 before any file or network I/O.
fn prepare(cli: &Cli) -> Result<(ConnectionRequest, ConfigFile, LmStudioPaths)> {
    let request = ConnectionRequest::new(cli.host.clone(), cli.port);
    if let Err(e) = request.validate() {
        print_error(&e.to_string());
        std::process::exit(e.exit_code());
    }

    let file = config::load_or_default(cli.config.as_deref())
        .context("Failed to load configuration")?;
    let paths = file.paths.resolve(cli.lmstudio_home.clone());

    Ok((request, file, paths))
}

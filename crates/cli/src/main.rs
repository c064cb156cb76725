//! poliqa CLI
//!
//! Main entry point for the poliqa command-line tool.
//! Answers questions against an indexed policy corpus with per-passage
//! provenance.

mod commands;

use clap::{Parser, Subcommand};
use commands::{AskCommand, BuildCommand, CleanCommand, StatsCommand};
use poliqa_core::{config::AppConfig, logging, AppResult};
use std::path::PathBuf;

/// poliqa - cited answers over a policy-document corpus
#[derive(Parser, Debug)]
#[command(name = "poliqa")]
#[command(about = "Answer questions against indexed policy documents, with citations", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to workspace directory (default: current directory)
    #[arg(short, long, global = true, env = "POLIQA_WORKSPACE")]
    workspace: Option<PathBuf>,

    /// Path to config file
    #[arg(short, long, global = true, env = "POLIQA_CONFIG")]
    config: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, global = true, env = "RUST_LOG")]
    log_level: Option<String>,

    /// Enable verbose output (sets log level to debug)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Disable colored output
    #[arg(long, global = true, env = "NO_COLOR")]
    no_color: bool,

    /// Generator provider (e.g., ollama)
    #[arg(short, long, global = true, env = "POLIQA_PROVIDER")]
    provider: Option<String>,

    /// Generator model identifier
    #[arg(short, long, global = true, env = "POLIQA_MODEL")]
    model: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Index the policy corpus into the persisted vector index
    Build(BuildCommand),

    /// Ask a question against the indexed corpus
    Ask(AskCommand),

    /// Show the persisted index manifest
    Stats(StatsCommand),

    /// Delete the persisted index
    Clean(CleanCommand),
}

#[tokio::main]
async fn main() -> AppResult<()> {
    // Parse command-line arguments first (needed for logging config)
    let cli = Cli::parse();

    // Load base configuration from environment
    let config = AppConfig::load()?;

    // Apply CLI overrides
    let config = config.with_overrides(
        cli.workspace,
        cli.config,
        cli.provider,
        cli.model,
        cli.log_level,
        cli.verbose,
        cli.no_color,
    );

    // Initialize logging with final configuration
    logging::init_logging(config.log_level.as_deref(), config.no_color)?;

    tracing::info!("poliqa starting");
    tracing::debug!("Workspace: {:?}", config.workspace);
    tracing::debug!("Provider: {}", config.provider);
    tracing::debug!("Model: {}", config.model);

    config.ensure_poliqa_dir()?;

    let command_name = match &cli.command {
        Commands::Build(_) => "build",
        Commands::Ask(_) => "ask",
        Commands::Stats(_) => "stats",
        Commands::Clean(_) => "clean",
    };
    let _span = tracing::info_span!("command", name = command_name).entered();

    let result = match cli.command {
        Commands::Build(cmd) => cmd.execute(&config).await,
        Commands::Ask(cmd) => cmd.execute(&config).await,
        Commands::Stats(cmd) => cmd.execute(&config).await,
        Commands::Clean(cmd) => cmd.execute(&config).await,
    };

    match &result {
        Ok(_) => tracing::info!("Command completed successfully"),
        Err(e) => tracing::error!("Command failed: {}", e),
    }

    result
}

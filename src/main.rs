use clap::{Parser, Subcommand};

mod cli;
mod config;
mod core;
mod error;
mod services;
mod utils;

use cli::*;
use config::Config;
use error::Result;
use services::SimpleServices;

#[derive(Parser)]
#[command(name = "altfill")]
#[command(about = "Batch-fill missing ALT text on media assets")]
#[command(version)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Config file path (optional)
    #[arg(short, long)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create or upgrade the content database
    Init(init::InitArgs),

    /// List assets missing ALT text with suggestions
    List(list::ListArgs),

    /// Show the suggested ALT text for one asset
    Suggest(suggest::SuggestArgs),

    /// Apply operator decisions from a batch file
    Apply(apply::ApplyArgs),

    /// Accept the suggested ALT text for every listed asset
    Autofill(autofill::AutofillArgs),

    /// Show configuration
    Config(cli::config::ConfigArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    utils::logging::init_logging(cli.verbose)?;

    let config = Config::load(cli.config.as_deref())?;
    let services = SimpleServices::new(config);
    let config = services.config();

    match cli.command {
        Commands::Init(args) => init::execute(args, &services).await,
        Commands::List(args) => list::execute(args, &services).await,
        Commands::Suggest(args) => suggest::execute(args, &services).await,
        Commands::Apply(args) => apply::execute(args, &services).await,
        Commands::Autofill(args) => autofill::execute(args, &services).await,
        Commands::Config(args) => cli::config::execute(args, &config).await,
    }
}

// billsplit: terminal front end for the household bill splitter.
use clap::Parser;
use engine::{BillStore, EngineSettings, HttpBillStore, MemoryBillStore};
use std::path::PathBuf;
use tracing::{error, info};

mod commands;
mod display;

use commands::{handle_command, Commands};

#[derive(Parser)]
#[command(name = "billsplit")]
#[command(about = "Split shared utility bills among household members")]
struct Cli {
    #[arg(short, long, help = "Path to a JSON settings file")]
    config: Option<PathBuf>,

    #[arg(
        long,
        help = "Run without the bills API; only `utilities` and `calculate` without --save are allowed"
    )]
    offline: bool,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let settings = match EngineSettings::load(cli.config.as_deref()) {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new(&settings.logging.level))
        .with_writer(std::io::stderr)
        .init();

    if cli.offline && cli.command.uses_bills_api() {
        eprintln!("Error: this command reads or writes saved bills and needs the bills API; drop --offline");
        std::process::exit(1);
    }

    let store: Box<dyn BillStore> = if cli.offline {
        info!("Using in-memory bill store");
        Box::new(MemoryBillStore::new())
    } else {
        info!(api = %settings.api.base_url, "Using bills API");
        Box::new(HttpBillStore::new(settings.api.base_url.clone()))
    };

    if let Err(e) = handle_command(cli.command, &settings, store.as_ref()).await {
        error!("Command failed: {:#}", e);
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

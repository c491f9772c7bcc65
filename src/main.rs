mod billing;
mod config;
mod error;
mod export;
mod history;
mod model;
mod opener;
mod pricing;
mod render;
mod session;
mod share;
mod state;
mod store;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::Level;

use crate::billing::format_price;
use crate::render::presets_table;
use crate::session::Session;
use crate::share::SystemShare;

// ==========================================
// CLI
// ==========================================

#[derive(Parser)]
#[command(name = "sr-xerox", about = "Photocopy shop price calculator")]
struct Cli {
    /// Show debug logs on stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start an interactive billing session
    Run,
    /// List the configured pricing presets
    Presets,
    /// Price a single job
    Quote {
        /// Preset name, e.g. "A4 B/W"
        #[arg(short = 't', long = "type")]
        job_type: String,
        #[arg(short, long)]
        pages: u32,
        #[arg(short, long, default_value_t = 1)]
        sets: u32,
        /// Round up to a whole amount
        #[arg(short, long)]
        round: bool,
    },
    /// Show where settings live (writes defaults if missing)
    Config,
}

// ==========================================
// Main Function
// ==========================================

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose { Level::DEBUG } else { Level::WARN };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    let Some(command) = cli.command else {
        use clap::CommandFactory;
        Cli::command().print_help()?;
        return Ok(());
    };

    let settings_path = config::get_config_path();
    let settings = config::load_or_init(&settings_path)
        .with_context(|| format!("Failed to load settings from {:?}", settings_path))?;

    match command {
        Commands::Run => {
            let surface = SystemShare;
            Session::new(settings, settings_path, &surface)?.run()?;
        }
        Commands::Presets => {
            let catalog = settings.catalog()?;
            if catalog.is_empty() {
                println!("(No presets configured in {:?})", settings_path);
            } else {
                println!("{}", presets_table(&catalog, &settings.currency_symbol));
            }
        }
        Commands::Quote { job_type, pages, sets, round } => {
            let catalog = settings.catalog()?;
            if catalog.get(&job_type).is_none() {
                println!("⚠️  Unknown type '{}'. Known: {}", job_type, catalog.names().join(", "));
            }
            let price = catalog.calculate_price(&job_type, pages, sets.max(1));
            println!("{}{}", settings.currency_symbol, format_price(price, round));
        }
        Commands::Config => {
            println!("⚙️  Settings file: {:?}", settings_path);
            println!("📂 Output directory: {:?}", settings.output_dir());
        }
    }

    Ok(())
}

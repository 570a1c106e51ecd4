mod locate;
mod lookup;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "nagarmitra")]
#[command(about = "Report civic issues from the command line")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Resolve an issue location interactively and emit it as JSON.
    Locate(locate::LocateArgs),
    /// Print autocomplete suggestions for a partial query.
    Suggest { query: String },
    /// Geocode free-form address text.
    Geocode { address: String },
    /// Reverse geocode coordinates given as "lat, lng".
    Reverse { coordinates: String },
    /// List the issue categories a report accepts.
    Categories,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = nagarmitra_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let cli = Cli::parse();
    match cli.command {
        Some(Commands::Locate(args)) => locate::run_locate(&config, &args).await,
        Some(Commands::Suggest { query }) => lookup::run_suggest(&config, &query).await,
        Some(Commands::Geocode { address }) => lookup::run_geocode(&config, &address).await,
        Some(Commands::Reverse { coordinates }) => {
            lookup::run_reverse(&config, &coordinates).await
        }
        Some(Commands::Categories) => {
            lookup::print_categories();
            Ok(())
        }
        None => locate::run_locate(&config, &locate::LocateArgs::default()).await,
    }
}

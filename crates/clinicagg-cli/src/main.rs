mod display;
mod server;

use std::net::SocketAddr;
use std::time::Duration;

use anyhow::Context;
use clap::{Parser, Subcommand};
use clinicagg_core::ClinicQuery;
use clinicagg_sync::{ClinicAggregator, SourceFetcher};
use tracing_subscriber::EnvFilter;

const DEFAULT_SOURCES: [&str; 2] = [
    "https://storage.googleapis.com/scratchpay-code-challenge/dental-clinics.json",
    "https://storage.googleapis.com/scratchpay-code-challenge/vet-clinics.json",
];

#[derive(Parser)]
#[command(name = "clinicagg", version, about = "Search clinic availability across providers")]
struct Cli {
    /// Provider URL returning a JSON array of clinics (repeatable)
    #[arg(
        long = "source",
        env = "CLINICAGG_SOURCES",
        value_delimiter = ',',
        default_values = DEFAULT_SOURCES
    )]
    sources: Vec<String>,

    /// Per-request timeout for provider fetches, in seconds
    #[arg(long, env = "CLINICAGG_TIMEOUT_SECS")]
    timeout_secs: Option<u64>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Serve the search endpoint over HTTP
    Serve {
        #[arg(long, env = "CLINICAGG_LISTEN", default_value = "0.0.0.0:9000")]
        listen: SocketAddr,
    },
    /// Run a single search and print the matches
    Search {
        #[arg(long)]
        name: Option<String>,
        #[arg(long, alias = "region")]
        state: Option<String>,
        /// Exact opening time
        #[arg(long)]
        from: Option<String>,
        /// Exact closing time
        #[arg(long)]
        to: Option<String>,
        /// Print JSON instead of cards
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();
    tracing::info!("clinicagg v{}", env!("CARGO_PKG_VERSION"));

    let cli = Cli::parse();
    let fetcher = SourceFetcher::new(cli.sources, cli.timeout_secs.map(Duration::from_secs))
        .context("building HTTP client")?;
    let aggregator = ClinicAggregator::new(fetcher);

    match cli.command {
        Command::Serve { listen } => server::serve(aggregator, listen).await,
        Command::Search {
            name,
            state,
            from,
            to,
            json,
        } => {
            let query = ClinicQuery {
                name: name.unwrap_or_default(),
                region: state.unwrap_or_default(),
                from: from.unwrap_or_default(),
                to: to.unwrap_or_default(),
            };
            let matches = aggregator.search(&query).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&matches)?);
            } else {
                display::print_clinic_cards(&matches);
            }
            Ok(())
        }
    }
}

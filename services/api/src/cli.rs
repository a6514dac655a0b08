use crate::commands::{run_enrich, run_rank, EnrichArgs, RankArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use deal_radar::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "Deal Radar",
    about = "Score, rank and enrich residential investment listings",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Print the ranked listings as JSON
    Rank(RankArgs),
    /// Re-run enrichment over the dataset and rewrite the enriched file
    Enrich(EnrichArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Rank(args) => run_rank(args),
        Command::Enrich(args) => run_enrich(args).await,
    }
}

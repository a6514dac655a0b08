use std::path::PathBuf;
use std::sync::Arc;

use clap::Args;
use deal_radar::config::AppConfig;
use deal_radar::error::AppError;
use deal_radar::listings::{read_listings_from_path, write_listings, ListingRecord};
use deal_radar::pipeline::{PropertyService, QueryParams, DEFAULT_LIMIT};
use deal_radar::telemetry;
use serde_json::json;
use tracing::info;

use crate::infra::{build_router, open_catalog};

#[derive(Args, Debug)]
pub(crate) struct RankArgs {
    /// Maximum number of listings to print (1-500)
    #[arg(long, default_value_t = DEFAULT_LIMIT)]
    pub(crate) limit: usize,
    /// Field to sort by, e.g. deal_score, net_yield, suburb
    #[arg(long, default_value = "deal_score")]
    pub(crate) sort_by: String,
    /// asc or desc
    #[arg(long, default_value = "desc")]
    pub(crate) sort_dir: String,
    #[arg(long)]
    pub(crate) min_gross_yield: Option<f64>,
    #[arg(long)]
    pub(crate) min_net_yield: Option<f64>,
    #[arg(long)]
    pub(crate) min_cagr5: Option<f64>,
    #[arg(long)]
    pub(crate) max_vacancy: Option<f64>,
    /// Keep listings with a high flood risk band
    #[arg(long)]
    pub(crate) include_flood_high: bool,
    /// Keep listings with a high bushfire risk band
    #[arg(long)]
    pub(crate) include_bushfire_high: bool,
}

impl RankArgs {
    pub(crate) fn query_params(&self) -> QueryParams {
        QueryParams {
            limit: self.limit,
            min_gross_yield: self.min_gross_yield,
            min_net_yield: self.min_net_yield,
            min_cagr5: self.min_cagr5,
            max_vacancy: self.max_vacancy,
            exclude_flood_high: !self.include_flood_high,
            exclude_bushfire_high: !self.include_bushfire_high,
            sort_by: self.sort_by.clone(),
            sort_dir: self.sort_dir.clone(),
        }
    }
}

#[derive(Args, Debug)]
pub(crate) struct EnrichArgs {
    /// Listings to enrich. Defaults to the enriched file when present, else the raw listings.
    #[arg(long)]
    pub(crate) input: Option<PathBuf>,
    /// Destination file, replaced atomically. Defaults to the configured enriched file.
    #[arg(long)]
    pub(crate) output: Option<PathBuf>,
    /// Listings enriched concurrently; overrides APP_ENRICH_CONCURRENCY
    #[arg(long)]
    pub(crate) concurrency: Option<usize>,
}

pub(crate) fn run_rank(args: RankArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry)?;

    let service = PropertyService::new(Arc::new(open_catalog(&config)?));
    let ranked = service.list(&args.query_params())?;

    let rendered = serde_json::to_string_pretty(&ranked).map_err(std::io::Error::from)?;
    println!("{rendered}");
    Ok(())
}

pub(crate) async fn run_enrich(args: EnrichArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry)?;

    let input = args.input.unwrap_or_else(|| {
        if config.data.enriched_csv.exists() {
            config.data.enriched_csv.clone()
        } else {
            config.data.listings_csv.clone()
        }
    });
    let output = args.output.unwrap_or_else(|| config.data.enriched_csv.clone());
    let concurrency = args
        .concurrency
        .unwrap_or(config.enrichment.concurrency)
        .max(1);

    let listings = read_listings_from_path(&input)?;
    info!(input = %input.display(), listings = listings.len(), concurrency, "enriching listings");

    let router = build_router(&config)?;
    let (enriched, summary) = router.enrich_all(&listings, concurrency).await;
    let records: Vec<ListingRecord> = enriched.into_iter().map(|item| item.listing).collect();
    write_listings(&output, &records)?;

    let report = json!({
        "input": input.display().to_string(),
        "output": output.display().to_string(),
        "summary": summary,
    });
    let rendered = serde_json::to_string_pretty(&report).map_err(std::io::Error::from)?;
    println!("{rendered}");
    Ok(())
}

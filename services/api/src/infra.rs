use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use chrono::Utc;
use deal_radar::config::AppConfig;
use deal_radar::enrichment::{ArcGisClient, CrimeTable, EnrichmentRouter, SalesHistory};
use deal_radar::error::AppError;
use deal_radar::listings::ListingCatalog;
use metrics_exporter_prometheus::PrometheusHandle;
use tracing::{info, warn};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

pub(crate) fn open_catalog(config: &AppConfig) -> Result<ListingCatalog, AppError> {
    let catalog = ListingCatalog::open(&config.data.enriched_csv, &config.data.listings_csv)?;
    info!(
        source = ?catalog.source_path(),
        listings = catalog.snapshot().len(),
        "listing dataset loaded"
    );
    Ok(catalog)
}

/// Spatial chains for every supported state plus whichever local reference
/// tables are present. A missing table only disables its kind.
pub(crate) fn build_router(config: &AppConfig) -> Result<EnrichmentRouter, AppError> {
    let timeout = config.enrichment.provider_timeout;
    let client = ArcGisClient::new(timeout)?;
    let mut router = EnrichmentRouter::australian(Arc::new(client), timeout);

    match CrimeTable::from_path(&config.data.crime_csv) {
        Ok(table) => {
            info!(suburbs = table.len(), "crime table loaded");
            router = router.with_crime_table(table, timeout);
        }
        Err(err) => warn!(error = %err, "crime table unavailable; crime bands left as-is"),
    }

    let today = Utc::now().date_naive();
    match SalesHistory::from_path(&config.data.sales_csv, config.data.sales_window_years, today) {
        Ok(history) => {
            info!(suburbs = history.len(), "sales history loaded");
            router = router.with_sales_history(history, timeout);
        }
        Err(err) => warn!(error = %err, "sales history unavailable; median prices left as-is"),
    }

    Ok(router)
}

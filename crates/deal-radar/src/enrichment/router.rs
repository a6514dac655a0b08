use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::time::Duration;

use futures_util::stream::{self, StreamExt};
use serde::Serialize;
use tracing::{debug, info};

use super::arcgis::SpatialService;
use super::crime::CrimeTable;
use super::jurisdictions::{self, nsw, Jurisdiction, JurisdictionChains};
use super::provider::{ProviderChain, Resolution, ResolutionStatus, Site};
use super::sales::SalesHistory;
use crate::listings::{CrimeBand, ListingRecord, RiskBand};

/// Per-kind outcomes for one listing. A `None` kind was not attempted.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct EnrichmentReport {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flood: Option<Resolution<RiskBand>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zoning: Option<Resolution<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bushfire_prone: Option<Resolution<bool>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bushfire_category: Option<Resolution<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub crime: Option<Resolution<CrimeBand>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub median_sale_price: Option<Resolution<f64>>,
}

impl EnrichmentReport {
    pub fn statuses(&self) -> Vec<(&'static str, ResolutionStatus)> {
        [
            ("flood", self.flood.as_ref().map(Resolution::status)),
            ("zoning", self.zoning.as_ref().map(Resolution::status)),
            ("bushfire_prone", self.bushfire_prone.as_ref().map(Resolution::status)),
            ("bushfire_category", self.bushfire_category.as_ref().map(Resolution::status)),
            ("crime", self.crime.as_ref().map(Resolution::status)),
            ("median_sale_price", self.median_sale_price.as_ref().map(Resolution::status)),
        ]
        .into_iter()
        .filter_map(|(kind, status)| status.map(|status| (kind, status)))
        .collect()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EnrichedListing {
    pub listing: ListingRecord,
    pub report: EnrichmentReport,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct KindTally {
    pub found: usize,
    pub absent: usize,
    pub unknown: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EnrichmentSummary {
    pub listings: usize,
    pub kinds: BTreeMap<&'static str, KindTally>,
}

impl EnrichmentSummary {
    pub fn record(&mut self, report: &EnrichmentReport) {
        self.listings += 1;
        for (kind, status) in report.statuses() {
            let tally = self.kinds.entry(kind).or_default();
            match status {
                ResolutionStatus::Found => tally.found += 1,
                ResolutionStatus::Absent => tally.absent += 1,
                ResolutionStatus::Unknown => tally.unknown += 1,
            }
        }
    }

    pub fn tally(&self, kind: &str) -> KindTally {
        self.kinds.get(kind).copied().unwrap_or_default()
    }
}

/// Routes each listing to the chains configured for its state, plus the
/// jurisdiction-independent crime and sales lookups.
#[derive(Debug, Default)]
pub struct EnrichmentRouter {
    jurisdictions: HashMap<Jurisdiction, JurisdictionChains>,
    crime: Option<ProviderChain<CrimeBand>>,
    sales: Option<ProviderChain<f64>>,
}

impl EnrichmentRouter {
    pub fn new() -> Self {
        Self::default()
    }

    /// QLD flood, VIC zoning and bushfire-prone area, NSW zoning and
    /// bushfire category, all over one spatial client.
    pub fn australian(service: Arc<dyn SpatialService>, call_timeout: Duration) -> Self {
        Self::new()
            .with_jurisdiction(
                Jurisdiction::Qld,
                jurisdictions::queensland(service.clone(), call_timeout),
            )
            .with_jurisdiction(
                Jurisdiction::Vic,
                jurisdictions::victoria(service.clone(), call_timeout),
            )
            .with_jurisdiction(
                Jurisdiction::Nsw,
                jurisdictions::new_south_wales(service, call_timeout),
            )
    }

    pub fn with_jurisdiction(mut self, jurisdiction: Jurisdiction, chains: JurisdictionChains) -> Self {
        self.jurisdictions.insert(jurisdiction, chains);
        self
    }

    pub fn with_crime(mut self, chain: ProviderChain<CrimeBand>) -> Self {
        self.crime = Some(chain);
        self
    }

    pub fn with_sales(mut self, chain: ProviderChain<f64>) -> Self {
        self.sales = Some(chain);
        self
    }

    pub fn with_crime_table(self, table: CrimeTable, call_timeout: Duration) -> Self {
        self.with_crime(ProviderChain::new("crime", call_timeout).then(table))
    }

    pub fn with_sales_history(self, history: SalesHistory, call_timeout: Duration) -> Self {
        self.with_sales(ProviderChain::new("median_sale_price", call_timeout).then(history))
    }

    fn spatial_chains(&self, listing: &ListingRecord, site: &Site) -> Option<&JurisdictionChains> {
        site.point?;
        let jurisdiction = listing.state.as_deref().and_then(Jurisdiction::parse)?;
        self.jurisdictions.get(&jurisdiction)
    }

    /// Returns an enriched copy of `listing`; the input is never modified.
    /// Kinds run concurrently, providers within a kind run in order.
    pub async fn enrich(&self, listing: &ListingRecord) -> EnrichedListing {
        let site = Site::from_listing(listing);
        let spatial = self.spatial_chains(listing, &site);

        let (flood, zoning, bushfire_prone, bushfire_category, crime, median_sale_price) = tokio::join!(
            resolve(spatial.and_then(|chains| chains.flood.as_ref()), &site),
            resolve(spatial.and_then(|chains| chains.zoning.as_ref()), &site),
            resolve(spatial.and_then(|chains| chains.bushfire_prone.as_ref()), &site),
            resolve(spatial.and_then(|chains| chains.bushfire_category.as_ref()), &site),
            resolve(self.crime.as_ref(), &site),
            resolve(self.sales.as_ref(), &site),
        );
        let report = EnrichmentReport {
            flood,
            zoning,
            bushfire_prone,
            bushfire_category,
            crime,
            median_sale_price,
        };

        let mut enriched = listing.clone();
        apply(&mut enriched, &report);
        debug!(id = %listing.id, outcomes = ?report.statuses(), "listing enriched");

        EnrichedListing {
            listing: enriched,
            report,
        }
    }

    /// Enriches at most `concurrency` listings at a time; output keeps input order.
    pub async fn enrich_all(
        &self,
        listings: &[ListingRecord],
        concurrency: usize,
    ) -> (Vec<EnrichedListing>, EnrichmentSummary) {
        let enriched: Vec<EnrichedListing> = stream::iter(listings)
            .map(|listing| self.enrich(listing))
            .buffered(concurrency.max(1))
            .collect()
            .await;

        let mut summary = EnrichmentSummary::default();
        for item in &enriched {
            summary.record(&item.report);
        }
        info!(listings = summary.listings, "enrichment finished");

        (enriched, summary)
    }
}

async fn resolve<T: Send>(chain: Option<&ProviderChain<T>>, site: &Site) -> Option<Resolution<T>> {
    match chain {
        Some(chain) => Some(chain.resolve(site).await),
        None => None,
    }
}

fn apply(listing: &mut ListingRecord, report: &EnrichmentReport) {
    match &report.flood {
        Some(Resolution::Found(band)) => listing.flood_risk = Some(*band),
        Some(Resolution::Absent) => listing.flood_risk = Some(RiskBand::None),
        Some(Resolution::Unknown) => listing.flood_risk = Some(RiskBand::Unknown),
        None => {}
    }

    if let Some(Resolution::Found(zone)) = &report.zoning {
        listing.zoning_code = Some(zone.clone());
    }

    match &report.bushfire_prone {
        Some(Resolution::Found(true)) => listing.bushfire_risk = Some(RiskBand::High),
        Some(Resolution::Found(false) | Resolution::Absent) => {
            if listing.bushfire_risk.is_none() {
                listing.bushfire_risk = Some(RiskBand::None);
            }
        }
        Some(Resolution::Unknown) | None => {}
    }

    if let Some(Resolution::Found(category)) = &report.bushfire_category {
        listing.bushfire_category = Some(category.clone());
        if listing.bushfire_risk.is_none() {
            listing.bushfire_risk = Some(nsw::bushfire_band_from_category(category));
        }
    }

    if let Some(Resolution::Found(band)) = &report.crime {
        listing.crime_band = Some(*band);
    }

    if let Some(Resolution::Found(price)) = &report.median_sale_price {
        listing.median_sale_price = Some(*price);
    }
}

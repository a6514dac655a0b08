//! Best-effort enrichment of listings from spatial services and local tables.
//!
//! Every kind (flood, zoning, bushfire, crime, sales) resolves through an
//! ordered [`ProviderChain`]: the first provider that answers wins, failures
//! and timeouts fall through to the next, and an exhausted chain reports
//! `Unknown` rather than guessing. Nothing here ever fails a listing.

pub mod arcgis;
pub mod attributes;
pub mod crime;
pub mod jurisdictions;
pub mod provider;
pub mod router;
pub mod sales;

#[cfg(test)]
mod tests;

pub use arcgis::{ArcGisClient, FeatureSet, IdentifyResults, ServiceError, SpatialService};
pub use attributes::AttributeMatcher;
pub use crime::CrimeTable;
pub use jurisdictions::{Jurisdiction, JurisdictionChains};
pub use provider::{Lookup, Provider, ProviderChain, ProviderError, Resolution, ResolutionStatus, Site};
pub use router::{EnrichedListing, EnrichmentReport, EnrichmentRouter, EnrichmentSummary, KindTally};
pub use sales::{SalesHistory, SalesHistoryError};

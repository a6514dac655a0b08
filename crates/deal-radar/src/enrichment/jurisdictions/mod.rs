//! Per-state provider chains. Each chain is assembled from data (endpoints,
//! layer ids, attribute names) rather than branching code.

pub mod nsw;
pub mod qld;
pub mod vic;

use std::sync::Arc;
use std::time::Duration;

use super::arcgis::SpatialService;
use super::provider::ProviderChain;
use crate::listings::RiskBand;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Jurisdiction {
    Nsw,
    Vic,
    Qld,
    Sa,
    Wa,
    Tas,
    Act,
    Nt,
}

impl Jurisdiction {
    pub fn parse(raw: &str) -> Option<Self> {
        let value = raw.trim().to_ascii_uppercase();
        let jurisdiction = match value.as_str() {
            "NSW" | "NEW SOUTH WALES" => Self::Nsw,
            "VIC" | "VICTORIA" => Self::Vic,
            "QLD" | "QUEENSLAND" => Self::Qld,
            "SA" | "SOUTH AUSTRALIA" => Self::Sa,
            "WA" | "WESTERN AUSTRALIA" => Self::Wa,
            "TAS" | "TASMANIA" => Self::Tas,
            "ACT" | "AUSTRALIAN CAPITAL TERRITORY" => Self::Act,
            "NT" | "NORTHERN TERRITORY" => Self::Nt,
            _ => return None,
        };
        Some(jurisdiction)
    }

    pub const fn code(self) -> &'static str {
        match self {
            Self::Nsw => "NSW",
            Self::Vic => "VIC",
            Self::Qld => "QLD",
            Self::Sa => "SA",
            Self::Wa => "WA",
            Self::Tas => "TAS",
            Self::Act => "ACT",
            Self::Nt => "NT",
        }
    }
}

/// Spatial enrichment chains configured for one jurisdiction. Kinds without a
/// chain are left untouched.
#[derive(Debug, Default)]
pub struct JurisdictionChains {
    pub flood: Option<ProviderChain<RiskBand>>,
    pub zoning: Option<ProviderChain<String>>,
    pub bushfire_prone: Option<ProviderChain<bool>>,
    pub bushfire_category: Option<ProviderChain<String>>,
}

pub fn queensland(service: Arc<dyn SpatialService>, call_timeout: Duration) -> JurisdictionChains {
    JurisdictionChains {
        flood: Some(qld::flood_chain(service, call_timeout)),
        ..JurisdictionChains::default()
    }
}

pub fn victoria(service: Arc<dyn SpatialService>, call_timeout: Duration) -> JurisdictionChains {
    JurisdictionChains {
        zoning: Some(vic::zoning_chain(service.clone(), call_timeout)),
        bushfire_prone: Some(vic::bushfire_prone_chain(service, call_timeout)),
        ..JurisdictionChains::default()
    }
}

pub fn new_south_wales(service: Arc<dyn SpatialService>, call_timeout: Duration) -> JurisdictionChains {
    JurisdictionChains {
        zoning: Some(nsw::zoning_chain(service.clone(), call_timeout)),
        bushfire_category: Some(nsw::bushfire_category_chain(service, call_timeout)),
        ..JurisdictionChains::default()
    }
}

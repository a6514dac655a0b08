use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::enrichment::arcgis::SpatialService;
use crate::enrichment::attributes::AttributeMatcher;
use crate::enrichment::provider::{Lookup, Provider, ProviderChain, ProviderError, Site};
use crate::listings::RiskBand;

pub const SUNSHINE_COAST_FLOOD_LAYER: &str = "https://services-ap1.arcgis.com/YQyt7djuXN7rQyg4/ArcGIS/rest/services/Flood_Hazard_Overlay_i_Flood_Risk_Area/FeatureServer/0";
pub const GOLD_COAST_OVERLAYS: &str =
    "https://maps1.goldcoast.qld.gov.au/arcgis/rest/services/V8_Overlays/MapServer";
pub const GOLD_COAST_FLOOD_LAYERS: [u32; 2] = [79, 80];
pub const FLOODCHECK_HAZARD: &str = "https://spatial-gis.information.qld.gov.au/arcgis/rest/services/FloodCheck/RapidHazardAssessmentMapSeries/MapServer";
pub const FLOODCHECK_LAYERS: [u32; 1] = [0];

const FLOOD_GRADE: AttributeMatcher =
    AttributeMatcher::new(&["RISK", "FLOOD_RISK", "FLOOD_RISK_AREA"], &["RISK"]);

/// Regional overlays first, the statewide hazard assessment last.
pub fn flood_chain(service: Arc<dyn SpatialService>, call_timeout: Duration) -> ProviderChain<RiskBand> {
    ProviderChain::new("flood", call_timeout)
        .then(SunshineCoastFlood {
            service: service.clone(),
        })
        .then(GoldCoastFloodOverlay {
            service: service.clone(),
        })
        .then(FloodCheckHazard { service })
}

/// Maps a free-text grade. Any other text still signals a mapped flood area.
pub fn grade_flood(raw: &str) -> RiskBand {
    let value = raw.to_ascii_lowercase();
    if value.contains("high") {
        RiskBand::High
    } else if value.contains("moderate") || value.contains("medium") {
        RiskBand::Medium
    } else if value.contains("low") {
        RiskBand::Low
    } else {
        RiskBand::Medium
    }
}

/// Graded flood risk polygons. Outside the council area it has no say.
pub struct SunshineCoastFlood {
    pub service: Arc<dyn SpatialService>,
}

#[async_trait]
impl Provider<RiskBand> for SunshineCoastFlood {
    fn name(&self) -> &str {
        "qld-sunshine-coast-flood"
    }

    async fn lookup(&self, site: &Site) -> Result<Lookup<RiskBand>, ProviderError> {
        let point = site.require_point()?;
        let features = self
            .service
            .query_point(SUNSHINE_COAST_FLOOD_LAYER, point)
            .await?;

        Ok(match features.first_attributes() {
            Some(attributes) => {
                let grade = FLOOD_GRADE.pick(attributes).unwrap_or_default();
                Lookup::Found(grade_flood(&grade))
            }
            None => Lookup::NoMatch,
        })
    }
}

/// Council overlay identify; a hit on either flood layer is medium risk.
pub struct GoldCoastFloodOverlay {
    pub service: Arc<dyn SpatialService>,
}

#[async_trait]
impl Provider<RiskBand> for GoldCoastFloodOverlay {
    fn name(&self) -> &str {
        "qld-gold-coast-flood-overlay"
    }

    async fn lookup(&self, site: &Site) -> Result<Lookup<RiskBand>, ProviderError> {
        let point = site.require_point()?;
        let results = self
            .service
            .identify(GOLD_COAST_OVERLAYS, &GOLD_COAST_FLOOD_LAYERS, point)
            .await?;

        Ok(if results.layer_names_contain("flood") {
            Lookup::Found(RiskBand::Medium)
        } else {
            Lookup::NoMatch
        })
    }
}

/// Statewide fallback. Authoritative: no result means no mapped flood hazard.
pub struct FloodCheckHazard {
    pub service: Arc<dyn SpatialService>,
}

#[async_trait]
impl Provider<RiskBand> for FloodCheckHazard {
    fn name(&self) -> &str {
        "qld-floodcheck-hazard"
    }

    async fn lookup(&self, site: &Site) -> Result<Lookup<RiskBand>, ProviderError> {
        let point = site.require_point()?;
        let results = self
            .service
            .identify(FLOODCHECK_HAZARD, &FLOODCHECK_LAYERS, point)
            .await?;

        Ok(if results.results.is_empty() {
            Lookup::Absent
        } else {
            Lookup::Found(RiskBand::Medium)
        })
    }
}

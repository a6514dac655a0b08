use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::enrichment::arcgis::SpatialService;
use crate::enrichment::attributes::AttributeMatcher;
use crate::enrichment::provider::{Lookup, Provider, ProviderChain, ProviderError, Site};
use crate::listings::RiskBand;

pub const BUSHFIRE_PRONE_LAND: &str =
    "https://mapprod3.environment.nsw.gov.au/arcgis/rest/services/Fire/BFPL/MapServer";
pub const BUSHFIRE_CATEGORY_LAYERS: [u32; 4] = [0, 1, 2, 229];
pub const PLANNING_ZONE_LAYER: &str = "https://mapprod3.environment.nsw.gov.au/arcgis/rest/services/Planning/EPI_Primary_Planning_Layers/FeatureServer/2";

const BUSHFIRE_CATEGORY: AttributeMatcher = AttributeMatcher::new(
    &["CATEGORY", "Category", "VEG_CATEGORY", "BFPL_CATEGORY", "BUSHFIREPRONE"],
    &["CATEGORY", "BF"],
)
.text_only();
const LAND_ZONE: AttributeMatcher = AttributeMatcher::new(&["ZONE", "Zone", "LAND_ZONE"], &["ZONE"]);

/// One provider per layer, queried in the listed order.
pub fn bushfire_category_chain(
    service: Arc<dyn SpatialService>,
    call_timeout: Duration,
) -> ProviderChain<String> {
    BUSHFIRE_CATEGORY_LAYERS
        .into_iter()
        .fold(
            ProviderChain::new("bushfire_category", call_timeout),
            |chain, layer_id| chain.then(BushfireCategoryLayer::new(service.clone(), layer_id)),
        )
}

pub fn zoning_chain(service: Arc<dyn SpatialService>, call_timeout: Duration) -> ProviderChain<String> {
    ProviderChain::new("zoning", call_timeout).then(NswPlanningZone { service })
}

/// Derives a hazard band from a bushfire-prone-land category label.
/// Only a standalone `1` token marks category 1.
pub fn bushfire_band_from_category(category: &str) -> RiskBand {
    let value = category.to_ascii_lowercase();
    let category_one = value
        .split(|c: char| !c.is_ascii_alphanumeric())
        .any(|token| token == "1");
    if value.contains("buffer") {
        RiskBand::Low
    } else if category_one {
        RiskBand::High
    } else {
        RiskBand::Medium
    }
}

pub struct BushfireCategoryLayer {
    service: Arc<dyn SpatialService>,
    layer_id: u32,
    name: String,
}

impl BushfireCategoryLayer {
    pub fn new(service: Arc<dyn SpatialService>, layer_id: u32) -> Self {
        Self {
            service,
            layer_id,
            name: format!("nsw-bfpl-layer-{layer_id}"),
        }
    }
}

#[async_trait]
impl Provider<String> for BushfireCategoryLayer {
    fn name(&self) -> &str {
        &self.name
    }

    async fn lookup(&self, site: &Site) -> Result<Lookup<String>, ProviderError> {
        let point = site.require_point()?;
        let url = format!("{BUSHFIRE_PRONE_LAND}/{}", self.layer_id);
        let features = self.service.query_point(&url, point).await?;

        Ok(features
            .first_attributes()
            .and_then(|attributes| BUSHFIRE_CATEGORY.pick(attributes))
            .map_or(Lookup::NoMatch, Lookup::Found))
    }
}

pub struct NswPlanningZone {
    pub service: Arc<dyn SpatialService>,
}

#[async_trait]
impl Provider<String> for NswPlanningZone {
    fn name(&self) -> &str {
        "nsw-epi-land-zone"
    }

    async fn lookup(&self, site: &Site) -> Result<Lookup<String>, ProviderError> {
        let point = site.require_point()?;
        let features = self
            .service
            .query_point(PLANNING_ZONE_LAYER, point)
            .await?;

        Ok(features
            .first_attributes()
            .and_then(|attributes| LAND_ZONE.pick(attributes))
            .map_or(Lookup::NoMatch, Lookup::Found))
    }
}

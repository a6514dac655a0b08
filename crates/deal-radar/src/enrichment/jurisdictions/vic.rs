use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::enrichment::arcgis::SpatialService;
use crate::enrichment::attributes::AttributeMatcher;
use crate::enrichment::provider::{Lookup, Provider, ProviderChain, ProviderError, Site};

pub const VICMAP_PLANNING: &str =
    "https://services6.arcgis.com/GB33F62SbDxJjwEL/arcgis/rest/services/Vicmap_Planning/FeatureServer";
pub const PLANNING_ZONE_LAYER: u32 = 3;
pub const BUSHFIRE_PRONE_LAYER: u32 = 9;

const ZONE_CODE: AttributeMatcher =
    AttributeMatcher::new(&["ZONE_CODE", "ZONE", "ZONING", "MAINZONE"], &["ZONE"]);

fn layer_url(layer: u32) -> String {
    format!("{VICMAP_PLANNING}/{layer}")
}

/// Zoning and bushfire-prone status are separate chains over the same service,
/// so a failure on one layer never blocks the other.
pub fn zoning_chain(service: Arc<dyn SpatialService>, call_timeout: Duration) -> ProviderChain<String> {
    ProviderChain::new("zoning", call_timeout).then(VicPlanningZone { service })
}

pub fn bushfire_prone_chain(
    service: Arc<dyn SpatialService>,
    call_timeout: Duration,
) -> ProviderChain<bool> {
    ProviderChain::new("bushfire_prone", call_timeout).then(VicBushfireProneArea { service })
}

pub struct VicPlanningZone {
    pub service: Arc<dyn SpatialService>,
}

#[async_trait]
impl Provider<String> for VicPlanningZone {
    fn name(&self) -> &str {
        "vic-planning-zone"
    }

    async fn lookup(&self, site: &Site) -> Result<Lookup<String>, ProviderError> {
        let point = site.require_point()?;
        let features = self
            .service
            .query_point(&layer_url(PLANNING_ZONE_LAYER), point)
            .await?;

        Ok(features
            .first_attributes()
            .and_then(|attributes| ZONE_CODE.pick(attributes))
            .map_or(Lookup::NoMatch, Lookup::Found))
    }
}

/// Presence of a designated bushfire-prone-area polygon.
pub struct VicBushfireProneArea {
    pub service: Arc<dyn SpatialService>,
}

#[async_trait]
impl Provider<bool> for VicBushfireProneArea {
    fn name(&self) -> &str {
        "vic-bushfire-prone-area"
    }

    async fn lookup(&self, site: &Site) -> Result<Lookup<bool>, ProviderError> {
        let point = site.require_point()?;
        let features = self
            .service
            .query_point(&layer_url(BUSHFIRE_PRONE_LAYER), point)
            .await?;

        Ok(if features.features.is_empty() {
            Lookup::Absent
        } else {
            Lookup::Found(true)
        })
    }
}

use super::common::*;
use std::sync::Arc;
use std::time::Duration;

use serde_json::json;

use crate::enrichment::jurisdictions::{nsw, qld, vic, Jurisdiction};
use crate::enrichment::provider::Resolution;
use crate::listings::RiskBand;

const TIMEOUT: Duration = Duration::from_secs(1);

#[test]
fn jurisdictions_parse_codes_and_names() {
    assert_eq!(Jurisdiction::parse("qld"), Some(Jurisdiction::Qld));
    assert_eq!(Jurisdiction::parse(" Victoria "), Some(Jurisdiction::Vic));
    assert_eq!(Jurisdiction::parse("New South Wales"), Some(Jurisdiction::Nsw));
    assert_eq!(Jurisdiction::parse("Atlantis"), None);
    assert_eq!(Jurisdiction::Tas.code(), "TAS");
}

#[test]
fn flood_grades_map_to_bands() {
    assert_eq!(qld::grade_flood("High Risk"), RiskBand::High);
    assert_eq!(qld::grade_flood("Moderate"), RiskBand::Medium);
    assert_eq!(qld::grade_flood("LOW"), RiskBand::Low);
    assert_eq!(qld::grade_flood("Overland flow"), RiskBand::Low);
    assert_eq!(qld::grade_flood("Inundation"), RiskBand::Medium);
    assert_eq!(qld::grade_flood(""), RiskBand::Medium);
}

#[tokio::test]
async fn qld_flood_uses_sunshine_coast_grade_when_present() {
    let service = Arc::new(ScriptedService::default().with_features(
        qld::SUNSHINE_COAST_FLOOD_LAYER,
        feature(json!({ "FLOOD_RISK": "High" })),
    ));
    let chain = qld::flood_chain(service.clone(), TIMEOUT);

    assert_eq!(chain.resolve(&site()).await, Resolution::Found(RiskBand::High));
    assert_eq!(service.calls(), vec![qld::SUNSHINE_COAST_FLOOD_LAYER.to_string()]);
}

#[tokio::test]
async fn qld_flood_falls_back_to_gold_coast_overlay() {
    let service = Arc::new(
        ScriptedService::default()
            .failing_at(qld::SUNSHINE_COAST_FLOOD_LAYER)
            .with_hits(qld::GOLD_COAST_OVERLAYS, identify_hit(79, "Flood assessment required")),
    );
    let chain = qld::flood_chain(service.clone(), TIMEOUT);

    assert_eq!(chain.resolve(&site()).await, Resolution::Found(RiskBand::Medium));
    assert_eq!(service.calls().len(), 2);
}

#[tokio::test]
async fn qld_floodcheck_with_no_hits_confirms_absence() {
    let service = Arc::new(ScriptedService::default());
    let chain = qld::flood_chain(service.clone(), TIMEOUT);

    assert_eq!(chain.resolve(&site()).await, Resolution::Absent);
    assert_eq!(
        service.calls(),
        vec![
            qld::SUNSHINE_COAST_FLOOD_LAYER.to_string(),
            qld::GOLD_COAST_OVERLAYS.to_string(),
            qld::FLOODCHECK_HAZARD.to_string(),
        ]
    );
}

#[tokio::test]
async fn qld_flood_with_every_service_down_is_unknown() {
    let chain = qld::flood_chain(Arc::new(OfflineService), TIMEOUT);
    assert_eq!(chain.resolve(&site()).await, Resolution::Unknown);
}

#[tokio::test]
async fn vic_zone_and_bushfire_layers_are_independent() {
    let zone_layer = format!("{}/{}", vic::VICMAP_PLANNING, vic::PLANNING_ZONE_LAYER);
    let bpa_layer = format!("{}/{}", vic::VICMAP_PLANNING, vic::BUSHFIRE_PRONE_LAYER);
    let service = Arc::new(
        ScriptedService::default()
            .with_features(zone_layer, feature(json!({ "ZONE_CODE": "GRZ1", "LGA": "YARRA" })))
            .failing_at(bpa_layer),
    );

    let zoning = vic::zoning_chain(service.clone(), TIMEOUT);
    let bushfire = vic::bushfire_prone_chain(service, TIMEOUT);

    assert_eq!(zoning.resolve(&site()).await, Resolution::Found("GRZ1".to_string()));
    assert_eq!(bushfire.resolve(&site()).await, Resolution::Unknown);
}

#[tokio::test]
async fn vic_bushfire_prone_polygon_presence() {
    let bpa_layer = format!("{}/{}", vic::VICMAP_PLANNING, vic::BUSHFIRE_PRONE_LAYER);
    let inside = Arc::new(ScriptedService::default().with_features(bpa_layer, feature(json!({ "OBJECTID": 4 }))));
    let outside = Arc::new(ScriptedService::default());

    assert_eq!(
        vic::bushfire_prone_chain(inside, TIMEOUT).resolve(&site()).await,
        Resolution::Found(true)
    );
    assert_eq!(
        vic::bushfire_prone_chain(outside, TIMEOUT).resolve(&site()).await,
        Resolution::Absent
    );
}

#[tokio::test]
async fn nsw_bushfire_category_tries_layers_in_order() {
    let layer_2 = format!("{}/2", nsw::BUSHFIRE_PRONE_LAND);
    let service = Arc::new(
        ScriptedService::default()
            .failing_at(format!("{}/0", nsw::BUSHFIRE_PRONE_LAND))
            .with_features(layer_2, feature(json!({ "d_Category": "Vegetation Category 3" }))),
    );
    let chain = nsw::bushfire_category_chain(service.clone(), TIMEOUT);

    assert_eq!(
        chain.provider_names(),
        vec!["nsw-bfpl-layer-0", "nsw-bfpl-layer-1", "nsw-bfpl-layer-2", "nsw-bfpl-layer-229"]
    );
    assert_eq!(
        chain.resolve(&site()).await,
        Resolution::Found("Vegetation Category 3".to_string())
    );
    assert_eq!(service.calls().len(), 3);
}

#[tokio::test]
async fn nsw_zoning_reads_land_zone() {
    let service = Arc::new(
        ScriptedService::default().with_features(nsw::PLANNING_ZONE_LAYER, feature(json!({ "LAND_ZONE": "R2" }))),
    );
    let chain = nsw::zoning_chain(service, TIMEOUT);
    assert_eq!(chain.resolve(&site()).await, Resolution::Found("R2".to_string()));
}

#[test]
fn bushfire_categories_map_to_bands() {
    assert_eq!(nsw::bushfire_band_from_category("Vegetation Category 1"), RiskBand::High);
    assert_eq!(nsw::bushfire_band_from_category("Vegetation Category 2"), RiskBand::Medium);
    assert_eq!(nsw::bushfire_band_from_category("Vegetation Category 3"), RiskBand::Medium);
    assert_eq!(nsw::bushfire_band_from_category("Vegetation Buffer"), RiskBand::Low);
    assert_eq!(nsw::bushfire_band_from_category("Unmapped"), RiskBand::Medium);
    assert_eq!(nsw::bushfire_band_from_category("1"), RiskBand::High);
    assert_eq!(nsw::bushfire_band_from_category("17"), RiskBand::Medium);
    assert_eq!(nsw::bushfire_band_from_category("Category 10"), RiskBand::Medium);
}

#[tokio::test]
async fn nsw_not_prone_flag_falls_through_to_next_layer() {
    let service = Arc::new(
        ScriptedService::default()
            .with_features(
                format!("{}/0", nsw::BUSHFIRE_PRONE_LAND),
                feature(json!({ "BUSHFIREPRONE": 0 })),
            )
            .with_features(
                format!("{}/1", nsw::BUSHFIRE_PRONE_LAND),
                feature(json!({ "CATEGORY": "Vegetation Category 2" })),
            ),
    );
    let chain = nsw::bushfire_category_chain(service.clone(), TIMEOUT);

    assert_eq!(
        chain.resolve(&site()).await,
        Resolution::Found("Vegetation Category 2".to_string())
    );
    assert_eq!(service.calls().len(), 2);
}

#[tokio::test]
async fn nsw_numeric_bf_ids_are_not_categories() {
    let service = Arc::new(ScriptedService::default().with_features(
        format!("{}/0", nsw::BUSHFIRE_PRONE_LAND),
        feature(json!({ "OBJECTID": 4, "BF_AREA_ID": 17 })),
    ));
    let chain = nsw::bushfire_category_chain(service.clone(), TIMEOUT);

    assert_eq!(chain.resolve(&site()).await, Resolution::Unknown);
    assert_eq!(service.calls().len(), nsw::BUSHFIRE_CATEGORY_LAYERS.len());
}

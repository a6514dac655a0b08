use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};
use tracing::debug;

use crate::listings::GeoPoint;

const WGS84: u32 = 4326;
const IDENTIFY_TOLERANCE_PX: u32 = 3;
const IDENTIFY_EXTENT_DEG: f64 = 0.01;

pub type Attributes = Map<String, Value>;

fn null_as_empty<'de, D>(deserializer: D) -> Result<Attributes, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Attributes>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Feature {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub attributes: Attributes,
}

/// Result of a point query against one feature layer.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct FeatureSet {
    #[serde(default)]
    pub features: Vec<Feature>,
}

impl FeatureSet {
    pub fn first_attributes(&self) -> Option<&Attributes> {
        self.features.first().map(|feature| &feature.attributes)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdentifyHit {
    #[serde(default)]
    pub layer_id: i64,
    #[serde(default)]
    pub layer_name: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub attributes: Attributes,
}

/// Result of an identify call across several layers of a map service.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct IdentifyResults {
    #[serde(default)]
    pub results: Vec<IdentifyHit>,
}

impl IdentifyResults {
    pub fn layer_names_contain(&self, needle: &str) -> bool {
        let needle = needle.to_ascii_lowercase();
        self.results
            .iter()
            .any(|hit| hit.layer_name.to_ascii_lowercase().contains(&needle))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("spatial service request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("spatial service returned error {code}: {message}")]
    Remote { code: i64, message: String },
    #[error("spatial service response was not understood: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Point lookups against a remote feature or map service.
#[async_trait]
pub trait SpatialService: Send + Sync {
    /// `layer_url` addresses one layer, e.g. `.../FeatureServer/3`.
    async fn query_point(&self, layer_url: &str, point: GeoPoint) -> Result<FeatureSet, ServiceError>;

    /// `service_url` addresses a map service; `layer_ids` restricts the identify.
    async fn identify(
        &self,
        service_url: &str,
        layer_ids: &[u32],
        point: GeoPoint,
    ) -> Result<IdentifyResults, ServiceError>;
}

/// ArcGIS REST client. One attempt per call, bounded by the client timeout.
#[derive(Debug, Clone)]
pub struct ArcGisClient {
    client: reqwest::Client,
}

impl ArcGisClient {
    pub fn new(timeout: Duration) -> Result<Self, ServiceError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }

    async fn get_json(&self, url: &str, params: &[(&str, String)]) -> Result<Value, ServiceError> {
        debug!(url, "spatial service request");
        let body: Value = self
            .client
            .get(url)
            .query(params)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        reject_error_payload(body)
    }
}

/// ArcGIS reports failures as HTTP 200 with an `error` object.
fn reject_error_payload(body: Value) -> Result<Value, ServiceError> {
    match body.get("error") {
        Some(error) => Err(ServiceError::Remote {
            code: error.get("code").and_then(Value::as_i64).unwrap_or_default(),
            message: error
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or("unspecified error")
                .to_string(),
        }),
        None => Ok(body),
    }
}

fn point_geometry(point: GeoPoint) -> String {
    serde_json::json!({
        "x": point.x(),
        "y": point.y(),
        "spatialReference": { "wkid": WGS84 },
    })
    .to_string()
}

fn query_params(point: GeoPoint) -> Vec<(&'static str, String)> {
    vec![
        ("f", "json".to_string()),
        ("geometry", point_geometry(point)),
        ("geometryType", "esriGeometryPoint".to_string()),
        ("inSR", WGS84.to_string()),
        ("spatialRel", "esriSpatialRelIntersects".to_string()),
        ("outFields", "*".to_string()),
        ("returnGeometry", "false".to_string()),
    ]
}

fn identify_params(layer_ids: &[u32], point: GeoPoint) -> Vec<(&'static str, String)> {
    let (x, y) = (point.x(), point.y());
    let layers = layer_ids
        .iter()
        .map(u32::to_string)
        .collect::<Vec<_>>()
        .join(",");
    vec![
        ("f", "json".to_string()),
        ("geometry", point_geometry(point)),
        ("geometryType", "esriGeometryPoint".to_string()),
        ("sr", WGS84.to_string()),
        ("tolerance", IDENTIFY_TOLERANCE_PX.to_string()),
        (
            "mapExtent",
            format!(
                "{},{},{},{}",
                x - IDENTIFY_EXTENT_DEG,
                y - IDENTIFY_EXTENT_DEG,
                x + IDENTIFY_EXTENT_DEG,
                y + IDENTIFY_EXTENT_DEG
            ),
        ),
        ("imageDisplay", "400,400,96".to_string()),
        ("layers", format!("all:{layers}")),
        ("returnGeometry", "false".to_string()),
    ]
}

#[async_trait]
impl SpatialService for ArcGisClient {
    async fn query_point(&self, layer_url: &str, point: GeoPoint) -> Result<FeatureSet, ServiceError> {
        let url = format!("{}/query", layer_url.trim_end_matches('/'));
        let body = self.get_json(&url, &query_params(point)).await?;
        Ok(serde_json::from_value(body)?)
    }

    async fn identify(
        &self,
        service_url: &str,
        layer_ids: &[u32],
        point: GeoPoint,
    ) -> Result<IdentifyResults, ServiceError> {
        let url = format!("{}/identify", service_url.trim_end_matches('/'));
        let body = self
            .get_json(&url, &identify_params(layer_ids, point))
            .await?;
        Ok(serde_json::from_value(body)?)
    }
}

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::enrichment::arcgis::{Feature, FeatureSet, IdentifyHit, IdentifyResults, ServiceError, SpatialService};
use crate::enrichment::provider::{Lookup, Provider, ProviderError, Site};
use crate::listings::{GeoPoint, ListingRecord};

pub(super) fn site() -> Site {
    Site::at(-26.65, 153.09)
}

pub(super) fn listing_in(state: &str) -> ListingRecord {
    let mut listing = ListingRecord::new(format!("{state}-1"));
    listing.state = Some(state.to_string());
    listing.suburb = Some("Paddington".to_string());
    listing.postcode = Some("4064".to_string());
    listing.lat = Some(-27.46);
    listing.lng = Some(153.0);
    listing
}

pub(super) fn feature(attributes: Value) -> FeatureSet {
    FeatureSet {
        features: vec![Feature {
            attributes: attributes.as_object().cloned().expect("attribute object"),
        }],
    }
}

pub(super) fn identify_hit(layer_id: i64, layer_name: &str) -> IdentifyResults {
    IdentifyResults {
        results: vec![IdentifyHit {
            layer_id,
            layer_name: layer_name.to_string(),
            attributes: json!({ "OBJECTID": 1 })
                .as_object()
                .cloned()
                .expect("attribute object"),
        }],
    }
}

/// Answers from canned responses keyed by URL; unscripted URLs return empty
/// results, scripted failures return a remote error. Records every call.
#[derive(Default)]
pub(super) struct ScriptedService {
    queries: HashMap<String, FeatureSet>,
    identifies: HashMap<String, IdentifyResults>,
    failing: Vec<String>,
    calls: Mutex<Vec<String>>,
}

impl ScriptedService {
    pub(super) fn with_features(mut self, url: impl Into<String>, features: FeatureSet) -> Self {
        self.queries.insert(url.into(), features);
        self
    }

    pub(super) fn with_hits(mut self, url: impl Into<String>, results: IdentifyResults) -> Self {
        self.identifies.insert(url.into(), results);
        self
    }

    pub(super) fn failing_at(mut self, url: impl Into<String>) -> Self {
        self.failing.push(url.into());
        self
    }

    pub(super) fn calls(&self) -> Vec<String> {
        self.calls.lock().expect("call log poisoned").clone()
    }

    fn record(&self, url: &str) -> Result<(), ServiceError> {
        self.calls
            .lock()
            .expect("call log poisoned")
            .push(url.to_string());
        if self.failing.iter().any(|failing| failing == url) {
            return Err(ServiceError::Remote {
                code: 500,
                message: "scripted failure".to_string(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl SpatialService for ScriptedService {
    async fn query_point(&self, layer_url: &str, _point: GeoPoint) -> Result<FeatureSet, ServiceError> {
        self.record(layer_url)?;
        Ok(self.queries.get(layer_url).cloned().unwrap_or_default())
    }

    async fn identify(
        &self,
        service_url: &str,
        _layer_ids: &[u32],
        _point: GeoPoint,
    ) -> Result<IdentifyResults, ServiceError> {
        self.record(service_url)?;
        Ok(self.identifies.get(service_url).cloned().unwrap_or_default())
    }
}

/// Every call fails, as if the network were down.
pub(super) struct OfflineService;

#[async_trait]
impl SpatialService for OfflineService {
    async fn query_point(&self, _layer_url: &str, _point: GeoPoint) -> Result<FeatureSet, ServiceError> {
        Err(ServiceError::Remote {
            code: 503,
            message: "offline".to_string(),
        })
    }

    async fn identify(
        &self,
        _service_url: &str,
        _layer_ids: &[u32],
        _point: GeoPoint,
    ) -> Result<IdentifyResults, ServiceError> {
        Err(ServiceError::Remote {
            code: 503,
            message: "offline".to_string(),
        })
    }
}

#[derive(Clone)]
pub(super) enum Outcome<T> {
    Found(T),
    Absent,
    NoMatch,
    Fail,
    Hang,
}

/// Provider with a fixed outcome and a shared call counter.
pub(super) struct StubProvider<T> {
    name: &'static str,
    outcome: Outcome<T>,
    calls: Arc<AtomicUsize>,
}

impl<T> StubProvider<T> {
    pub(super) fn new(name: &'static str, outcome: Outcome<T>) -> (Self, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        (
            Self {
                name,
                outcome,
                calls: calls.clone(),
            },
            calls,
        )
    }
}

#[async_trait]
impl<T: Clone + Send + Sync> Provider<T> for StubProvider<T> {
    fn name(&self) -> &str {
        self.name
    }

    async fn lookup(&self, _site: &Site) -> Result<Lookup<T>, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.outcome {
            Outcome::Found(value) => Ok(Lookup::Found(value.clone())),
            Outcome::Absent => Ok(Lookup::Absent),
            Outcome::NoMatch => Ok(Lookup::NoMatch),
            Outcome::Fail => Err(ProviderError::Service(ServiceError::Remote {
                code: 500,
                message: "stub failure".to_string(),
            })),
            Outcome::Hang => {
                tokio::time::sleep(Duration::from_secs(60)).await;
                Ok(Lookup::NoMatch)
            }
        }
    }
}

pub(super) fn calls(counter: &Arc<AtomicUsize>) -> usize {
    counter.load(Ordering::SeqCst)
}

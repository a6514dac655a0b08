use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use tracing::{debug, warn};

use super::arcgis::ServiceError;
use crate::listings::{GeoPoint, ListingRecord};

/// Where a listing sits, as seen by enrichment providers.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Site {
    pub point: Option<GeoPoint>,
    pub suburb: Option<String>,
    pub state: Option<String>,
    pub postcode: Option<String>,
}

impl Site {
    pub fn from_listing(listing: &ListingRecord) -> Self {
        Self {
            point: listing.location(),
            suburb: listing.suburb.clone(),
            state: listing.state.clone(),
            postcode: listing.postcode.clone(),
        }
    }

    pub fn at(lat: f64, lng: f64) -> Self {
        Self {
            point: Some(GeoPoint { lat, lng }),
            ..Self::default()
        }
    }

    pub fn require_point(&self) -> Result<GeoPoint, ProviderError> {
        self.point.ok_or(ProviderError::MissingCoordinates)
    }
}

/// What a single provider reported for a site.
#[derive(Debug, Clone, PartialEq)]
pub enum Lookup<T> {
    /// A definitive value; the chain stops here.
    Found(T),
    /// Authoritative confirmation that nothing applies; the chain stops here.
    Absent,
    /// Nothing found, but this provider cannot vouch for absence.
    NoMatch,
}

/// Outcome of a whole provider chain. `Absent` is a confirmed negative;
/// `Unknown` means no provider could answer and must be treated as missing data.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", content = "value", rename_all = "snake_case")]
pub enum Resolution<T> {
    Found(T),
    Absent,
    Unknown,
}

impl<T> Resolution<T> {
    pub fn status(&self) -> ResolutionStatus {
        match self {
            Self::Found(_) => ResolutionStatus::Found,
            Self::Absent => ResolutionStatus::Absent,
            Self::Unknown => ResolutionStatus::Unknown,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionStatus {
    Found,
    Absent,
    Unknown,
}

#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error(transparent)]
    Service(#[from] ServiceError),
    #[error("site has no coordinates")]
    MissingCoordinates,
    #[error("lookup timed out after {0:?}")]
    Timeout(Duration),
}

/// One best-effort source for an enrichment kind.
#[async_trait]
pub trait Provider<T>: Send + Sync {
    fn name(&self) -> &str;

    async fn lookup(&self, site: &Site) -> Result<Lookup<T>, ProviderError>;
}

/// Ordered providers evaluated first-answer-wins. Failures are logged and
/// skipped, never surfaced; each call is attempted once under `call_timeout`.
pub struct ProviderChain<T> {
    kind: &'static str,
    call_timeout: Duration,
    providers: Vec<Box<dyn Provider<T>>>,
}

impl<T> std::fmt::Debug for ProviderChain<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderChain")
            .field("kind", &self.kind)
            .field("call_timeout", &self.call_timeout)
            .field(
                "providers",
                &self.providers.iter().map(|p| p.name()).collect::<Vec<_>>(),
            )
            .finish()
    }
}

impl<T: Send> ProviderChain<T> {
    pub fn new(kind: &'static str, call_timeout: Duration) -> Self {
        Self {
            kind,
            call_timeout,
            providers: Vec::new(),
        }
    }

    pub fn then(mut self, provider: impl Provider<T> + 'static) -> Self {
        self.providers.push(Box::new(provider));
        self
    }

    pub fn provider_names(&self) -> Vec<&str> {
        self.providers.iter().map(|provider| provider.name()).collect()
    }

    pub async fn resolve(&self, site: &Site) -> Resolution<T> {
        for provider in &self.providers {
            let attempt = tokio::time::timeout(self.call_timeout, provider.lookup(site))
                .await
                .unwrap_or(Err(ProviderError::Timeout(self.call_timeout)));

            match attempt {
                Ok(Lookup::Found(value)) => {
                    debug!(kind = self.kind, provider = provider.name(), "provider resolved");
                    return Resolution::Found(value);
                }
                Ok(Lookup::Absent) => {
                    debug!(kind = self.kind, provider = provider.name(), "provider confirmed absence");
                    return Resolution::Absent;
                }
                Ok(Lookup::NoMatch) => {
                    debug!(kind = self.kind, provider = provider.name(), "no match; trying next provider");
                }
                Err(err) => {
                    warn!(
                        kind = self.kind,
                        provider = provider.name(),
                        error = %err,
                        "provider lookup failed; falling back"
                    );
                }
            }
        }

        Resolution::Unknown
    }
}

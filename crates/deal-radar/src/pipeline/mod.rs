//! Filter, sort and truncate scored listings behind one request contract.

mod filter;
mod sort;

pub use filter::ListingFilters;
pub use sort::{SortDirection, SortField, SortSpec};

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::listings::{ListingCatalog, ListingRecord};
use crate::scoring::{score_all, score_listing, ScoredListing};

pub const DEFAULT_LIMIT: usize = 50;
pub const MAX_LIMIT: usize = 500;

fn default_true() -> bool {
    true
}

fn default_sort_by() -> String {
    "deal_score".to_string()
}

fn default_sort_dir() -> String {
    "desc".to_string()
}

fn default_limit() -> usize {
    DEFAULT_LIMIT
}

/// Flat, string-typed request parameters as received from a caller.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct QueryParams {
    #[serde(default = "default_limit")]
    pub limit: usize,
    #[serde(default)]
    pub min_gross_yield: Option<f64>,
    #[serde(default)]
    pub min_net_yield: Option<f64>,
    #[serde(default)]
    pub min_cagr5: Option<f64>,
    #[serde(default)]
    pub max_vacancy: Option<f64>,
    #[serde(default = "default_true")]
    pub exclude_flood_high: bool,
    #[serde(default = "default_true")]
    pub exclude_bushfire_high: bool,
    #[serde(default = "default_sort_by")]
    pub sort_by: String,
    #[serde(default = "default_sort_dir")]
    pub sort_dir: String,
}

impl Default for QueryParams {
    fn default() -> Self {
        Self {
            limit: DEFAULT_LIMIT,
            min_gross_yield: None,
            min_net_yield: None,
            min_cagr5: None,
            max_vacancy: None,
            exclude_flood_high: true,
            exclude_bushfire_high: true,
            sort_by: default_sort_by(),
            sort_dir: default_sort_dir(),
        }
    }
}

impl QueryParams {
    pub fn validate(&self) -> Result<PropertyQuery, PipelineError> {
        if !(1..=MAX_LIMIT).contains(&self.limit) {
            return Err(PipelineError::InvalidLimit {
                requested: self.limit,
                max: MAX_LIMIT,
            });
        }
        let field = SortField::parse(&self.sort_by)
            .ok_or_else(|| PipelineError::InvalidSortField(self.sort_by.clone()))?;
        let direction = SortDirection::parse(&self.sort_dir)
            .ok_or_else(|| PipelineError::InvalidSortDirection(self.sort_dir.clone()))?;

        Ok(PropertyQuery {
            filters: ListingFilters {
                min_gross_yield: self.min_gross_yield,
                min_net_yield: self.min_net_yield,
                min_cagr5: self.min_cagr5,
                max_vacancy: self.max_vacancy,
                exclude_flood_high: self.exclude_flood_high,
                exclude_bushfire_high: self.exclude_bushfire_high,
            },
            sort: SortSpec { field, direction },
            limit: self.limit,
        })
    }
}

/// Validated ranking request.
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyQuery {
    pub filters: ListingFilters,
    pub sort: SortSpec,
    pub limit: usize,
}

impl Default for PropertyQuery {
    fn default() -> Self {
        Self {
            filters: ListingFilters::default(),
            sort: SortSpec::default(),
            limit: DEFAULT_LIMIT,
        }
    }
}

/// Score, filter, stable-sort, then truncate.
pub fn rank(listings: &[ListingRecord], query: &PropertyQuery) -> Vec<ScoredListing> {
    let scored = score_all(listings);
    let mut matched = query.filters.apply(scored);
    query.sort.apply(&mut matched);
    matched.truncate(query.limit);
    matched
}

/// Failure at the pipeline boundary, reported with a stable code so callers
/// can tell "nothing matched" apart from "the request was unusable".
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PipelineError {
    #[error("cannot sort by unknown field '{0}'")]
    InvalidSortField(String),
    #[error("sort direction must be 'asc' or 'desc'")]
    InvalidSortDirection(String),
    #[error("limit must be between 1 and {max}")]
    InvalidLimit { requested: usize, max: usize },
}

impl PipelineError {
    pub const fn code(&self) -> &'static str {
        match self {
            Self::InvalidSortField(_) => "invalid_sort_field",
            Self::InvalidSortDirection(_) => "invalid_sort_direction",
            Self::InvalidLimit { .. } => "invalid_limit",
        }
    }

    pub fn detail(&self) -> String {
        match self {
            Self::InvalidSortField(field) => format!("sort_by={field}"),
            Self::InvalidSortDirection(direction) => format!("sort_dir={direction}"),
            Self::InvalidLimit { requested, .. } => format!("limit={requested}"),
        }
    }

    pub fn body(&self) -> ErrorBody {
        ErrorBody {
            code: self.code(),
            message: self.to_string(),
            detail: self.detail(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorBody {
    pub code: &'static str,
    pub message: String,
    pub detail: String,
}

/// Ranking facade over the shared listing catalog.
#[derive(Debug, Clone)]
pub struct PropertyService {
    catalog: Arc<ListingCatalog>,
}

impl PropertyService {
    pub fn new(catalog: Arc<ListingCatalog>) -> Self {
        Self { catalog }
    }

    pub fn list(&self, params: &QueryParams) -> Result<Vec<ScoredListing>, PipelineError> {
        let query = params.validate()?;
        self.refresh();
        let listings = self.catalog.snapshot();
        let ranked = rank(&listings, &query);
        debug!(
            candidates = listings.len(),
            returned = ranked.len(),
            "ranked listings"
        );
        Ok(ranked)
    }

    pub fn get(&self, id: &str) -> Option<ScoredListing> {
        self.refresh();
        self.catalog.find(id).map(|listing| score_listing(&listing))
    }

    /// A failed reload keeps serving the previous snapshot.
    fn refresh(&self) {
        if let Err(err) = self.catalog.refresh_if_stale() {
            warn!(error = %err, "listing dataset reload failed; serving previous snapshot");
        }
    }
}

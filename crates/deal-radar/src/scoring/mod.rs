//! Deal scoring: normalisation, risk banding, sub-score calculators and the
//! weighted aggregate.

mod aggregate;
pub mod metrics;
mod normalize;
mod risk;

pub use aggregate::{aggregate, ScoreBreakdown, ScoreFactor, SubScores};
pub use normalize::{clip_unit, normalize};
pub use risk::risk_score;

use serde::Serialize;

use crate::listings::ListingRecord;

/// A listing together with its derived metrics and deal score.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredListing {
    #[serde(flatten)]
    pub listing: ListingRecord,
    pub gross_yield: Option<f64>,
    pub net_yield: Option<f64>,
    pub risk_score: f64,
    pub value_add_score: f64,
    pub cash_on_cash: f64,
    pub affordability: f64,
    pub deal_score: f64,
    pub score_breakdown: ScoreBreakdown,
}

/// Scores a copy of `listing`; the input is left untouched.
pub fn score_listing(listing: &ListingRecord) -> ScoredListing {
    let sub_scores = SubScores::from_listing(listing);
    let (deal_score, score_breakdown) = aggregate(&sub_scores);

    ScoredListing {
        listing: listing.clone(),
        gross_yield: metrics::gross_yield(listing),
        net_yield: metrics::net_yield(listing),
        risk_score: risk_score(listing.flood_risk, listing.bushfire_risk, listing.crime_band),
        value_add_score: sub_scores.value_add,
        cash_on_cash: metrics::cash_on_cash(listing),
        affordability: sub_scores.affordability,
        deal_score,
        score_breakdown,
    }
}

pub fn score_all(listings: &[ListingRecord]) -> Vec<ScoredListing> {
    listings.iter().map(score_listing).collect()
}

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::metrics;
use super::normalize::{clip_unit, normalize};
use super::risk::risk_score;
use crate::listings::ListingRecord;

const NET_YIELD_RANGE: (f64, f64) = (0.01, 0.08);
const CAGR5_RANGE: (f64, f64) = (0.0, 0.10);
const VACANCY_RANGE: (f64, f64) = (0.5, 5.0);
const CASH_ON_CASH_RANGE: (f64, f64) = (0.0, 0.15);

/// Named input to the deal score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreFactor {
    NetYield,
    Cagr5,
    VacancyInverse,
    CashOnCash,
    ValueAdd,
    Amenities,
    Affordability,
    RiskInverse,
}

impl ScoreFactor {
    pub const fn ordered() -> [Self; 8] {
        [
            Self::NetYield,
            Self::Cagr5,
            Self::VacancyInverse,
            Self::CashOnCash,
            Self::ValueAdd,
            Self::Amenities,
            Self::Affordability,
            Self::RiskInverse,
        ]
    }

    /// Fixed weight. The eight weights total 1.0.
    pub const fn weight(self) -> f64 {
        match self {
            Self::NetYield => 0.25,
            Self::Cagr5 => 0.20,
            Self::VacancyInverse => 0.10,
            Self::CashOnCash => 0.10,
            Self::ValueAdd => 0.10,
            Self::Amenities => 0.10,
            Self::Affordability => 0.05,
            Self::RiskInverse => 0.10,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::NetYield => "net_yield",
            Self::Cagr5 => "cagr5",
            Self::VacancyInverse => "vacancy_inverse",
            Self::CashOnCash => "cash_on_cash",
            Self::ValueAdd => "value_add",
            Self::Amenities => "amenities",
            Self::Affordability => "affordability",
            Self::RiskInverse => "risk_inverse",
        }
    }
}

/// Weighted contribution of every factor; the values sum to the deal score.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScoreBreakdown(BTreeMap<ScoreFactor, f64>);

impl ScoreBreakdown {
    pub fn get(&self, factor: ScoreFactor) -> f64 {
        self.0.get(&factor).copied().unwrap_or(0.0)
    }

    pub fn total(&self) -> f64 {
        self.0.values().sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (ScoreFactor, f64)> + '_ {
        self.0.iter().map(|(factor, value)| (*factor, *value))
    }
}

/// Normalised `[0, 1]` sub-scores, ready for weighting.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SubScores {
    pub net_yield: f64,
    pub cagr5: f64,
    pub vacancy_inverse: f64,
    pub cash_on_cash: f64,
    pub value_add: f64,
    pub amenities: f64,
    pub affordability: f64,
    pub risk_inverse: f64,
}

impl SubScores {
    pub fn from_listing(listing: &ListingRecord) -> Self {
        let (net_lo, net_hi) = NET_YIELD_RANGE;
        let (cagr_lo, cagr_hi) = CAGR5_RANGE;
        let (vac_lo, vac_hi) = VACANCY_RANGE;
        let (coc_lo, coc_hi) = CASH_ON_CASH_RANGE;
        let risk = risk_score(listing.flood_risk, listing.bushfire_risk, listing.crime_band);

        Self {
            net_yield: normalize(metrics::net_yield(listing), net_lo, net_hi),
            cagr5: normalize(listing.cagr5, cagr_lo, cagr_hi),
            vacancy_inverse: 1.0 - normalize(listing.vacancy, vac_lo, vac_hi),
            cash_on_cash: normalize(Some(metrics::cash_on_cash(listing)), coc_lo, coc_hi),
            value_add: metrics::value_add_score(listing),
            amenities: metrics::amenities_score(listing),
            affordability: metrics::affordability(listing),
            risk_inverse: 1.0 - risk,
        }
    }

    pub fn get(&self, factor: ScoreFactor) -> f64 {
        match factor {
            ScoreFactor::NetYield => self.net_yield,
            ScoreFactor::Cagr5 => self.cagr5,
            ScoreFactor::VacancyInverse => self.vacancy_inverse,
            ScoreFactor::CashOnCash => self.cash_on_cash,
            ScoreFactor::ValueAdd => self.value_add,
            ScoreFactor::Amenities => self.amenities,
            ScoreFactor::Affordability => self.affordability,
            ScoreFactor::RiskInverse => self.risk_inverse,
        }
    }
}

/// Weighted sum of clipped sub-scores, with the per-factor contributions.
pub fn aggregate(scores: &SubScores) -> (f64, ScoreBreakdown) {
    let contributions: BTreeMap<ScoreFactor, f64> = ScoreFactor::ordered()
        .into_iter()
        .map(|factor| (factor, factor.weight() * clip_unit(scores.get(factor))))
        .collect();
    let breakdown = ScoreBreakdown(contributions);
    (breakdown.total(), breakdown)
}

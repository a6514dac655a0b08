//! Raw sub-score calculators. Each reads only the listing and resolves
//! missing inputs to a neutral default instead of failing.

use super::normalize::{clip_unit, normalize};
use crate::listings::ListingRecord;

const WEEKS_PER_YEAR: f64 = 52.0;
const EXPENSE_RATIO: f64 = 0.25;
const INTEREST_RATE: f64 = 0.065;
const LOAN_TO_VALUE: f64 = 0.80;
const DEPOSIT_RATIO: f64 = 0.20;

const GRANNY_FLAT_MIN_LAND_M2: f64 = 450.0;
const GRANNY_FLAT_BONUS: f64 = 0.6;
const DUAL_OCC_MIN_FRONTAGE_M: f64 = 12.5;
const DUAL_OCC_MIN_LAND_M2: f64 = 550.0;
const DUAL_OCC_BONUS: f64 = 0.4;

const DEFAULT_AMENITIES: f64 = 0.5;
const DEFAULT_BEDS: f64 = 3.0;
const NEUTRAL_AFFORDABILITY: f64 = 0.5;
const PRICE_PER_BED_RANGE: (f64, f64) = (120_000.0, 350_000.0);

fn finite(value: Option<f64>) -> Option<f64> {
    value.filter(|value| value.is_finite())
}

fn positive_price(listing: &ListingRecord) -> Option<f64> {
    finite(listing.list_price).filter(|price| *price > 0.0)
}

fn annual_rent(listing: &ListingRecord) -> Option<f64> {
    finite(listing.weekly_rent).map(|rent| rent * WEEKS_PER_YEAR)
}

pub fn gross_yield(listing: &ListingRecord) -> Option<f64> {
    let price = positive_price(listing)?;
    let rent = annual_rent(listing)?;
    Some(rent / price)
}

/// Gross yield less a flat expense ratio.
pub fn net_yield(listing: &ListingRecord) -> Option<f64> {
    gross_yield(listing).map(|gross| gross * (1.0 - EXPENSE_RATIO))
}

/// Leveraged return on the deposit. Left unclipped; may be negative.
pub fn cash_on_cash(listing: &ListingRecord) -> f64 {
    let (Some(price), Some(annual_rent)) = (positive_price(listing), annual_rent(listing)) else {
        return 0.0;
    };

    let expenses = EXPENSE_RATIO * annual_rent;
    let interest = INTEREST_RATE * LOAN_TO_VALUE * price;
    let noi = annual_rent - expenses - interest;
    let equity = DEPOSIT_RATIO * price;

    if equity > 0.0 {
        noi / equity
    } else {
        0.0
    }
}

/// Development upside from granny-flat and dual-occupancy allowances.
pub fn value_add_score(listing: &ListingRecord) -> f64 {
    let land = finite(listing.land_m2).unwrap_or(0.0);
    let frontage = finite(listing.frontage_m).unwrap_or(0.0);
    let mut score = 0.0;

    if listing.granny_flat_allowed && land >= GRANNY_FLAT_MIN_LAND_M2 {
        score += GRANNY_FLAT_BONUS;
    }
    if listing.dual_occ_allowed
        && frontage >= DUAL_OCC_MIN_FRONTAGE_M
        && land >= DUAL_OCC_MIN_LAND_M2
    {
        score += DUAL_OCC_BONUS;
    }

    clip_unit(score)
}

pub fn amenities_score(listing: &ListingRecord) -> f64 {
    clip_unit(finite(listing.amenities_score).unwrap_or(DEFAULT_AMENITIES))
}

/// Cheaper price per bedroom scores higher. Unknown price is neutral.
pub fn affordability(listing: &ListingRecord) -> f64 {
    let Some(price) = positive_price(listing) else {
        return NEUTRAL_AFFORDABILITY;
    };
    let beds = finite(listing.beds).unwrap_or(DEFAULT_BEDS).max(1.0);
    let (low, high) = PRICE_PER_BED_RANGE;
    1.0 - normalize(Some(price / beds), low, high)
}

use crate::listings::{CrimeBand, RiskBand};

/// Absent or unknown environmental data is not assumed safe.
const UNKNOWN_HAZARD: f64 = 0.5;
const UNKNOWN_CRIME: f64 = 0.5;

fn hazard_weight(band: Option<RiskBand>) -> f64 {
    match band {
        Some(RiskBand::None) => 0.0,
        Some(RiskBand::Low) => 0.25,
        Some(RiskBand::Medium) => 0.5,
        Some(RiskBand::High) => 1.0,
        Some(RiskBand::Unknown) | None => UNKNOWN_HAZARD,
    }
}

fn crime_weight(band: Option<CrimeBand>) -> f64 {
    match band {
        Some(CrimeBand::Low) => 0.1,
        Some(CrimeBand::Medium) => 0.5,
        Some(CrimeBand::High) => 1.0,
        None => UNKNOWN_CRIME,
    }
}

/// Unweighted mean of flood, bushfire and crime exposure. 1.0 is maximal risk.
pub fn risk_score(
    flood: Option<RiskBand>,
    bushfire: Option<RiskBand>,
    crime: Option<CrimeBand>,
) -> f64 {
    (hazard_weight(flood) + hazard_weight(bushfire) + crime_weight(crime)) / 3.0
}

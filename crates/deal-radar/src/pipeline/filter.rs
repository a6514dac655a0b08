use crate::listings::RiskBand;
use crate::scoring::ScoredListing;

/// Threshold predicates over scored listings. Unset thresholds never exclude;
/// a set threshold compares a missing metric as 0.
#[derive(Debug, Clone, PartialEq)]
pub struct ListingFilters {
    pub min_gross_yield: Option<f64>,
    pub min_net_yield: Option<f64>,
    pub min_cagr5: Option<f64>,
    pub max_vacancy: Option<f64>,
    pub exclude_flood_high: bool,
    pub exclude_bushfire_high: bool,
}

impl Default for ListingFilters {
    fn default() -> Self {
        Self {
            min_gross_yield: None,
            min_net_yield: None,
            min_cagr5: None,
            max_vacancy: None,
            exclude_flood_high: true,
            exclude_bushfire_high: true,
        }
    }
}

impl ListingFilters {
    pub fn matches(&self, scored: &ScoredListing) -> bool {
        let listing = &scored.listing;

        if below(self.min_gross_yield, scored.gross_yield)
            || below(self.min_net_yield, scored.net_yield)
            || below(self.min_cagr5, listing.cagr5)
        {
            return false;
        }
        if let Some(max_vacancy) = self.max_vacancy {
            if listing.vacancy.unwrap_or(0.0) > max_vacancy {
                return false;
            }
        }
        if self.exclude_flood_high && listing.flood_risk == Some(RiskBand::High) {
            return false;
        }
        if self.exclude_bushfire_high && listing.bushfire_risk == Some(RiskBand::High) {
            return false;
        }
        true
    }

    pub fn apply(&self, scored: Vec<ScoredListing>) -> Vec<ScoredListing> {
        scored
            .into_iter()
            .filter(|listing| self.matches(listing))
            .collect()
    }
}

fn below(minimum: Option<f64>, value: Option<f64>) -> bool {
    minimum.is_some_and(|minimum| value.unwrap_or(0.0) < minimum)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::listings::ListingRecord;
    use crate::scoring::score_listing;

    fn scored(configure: impl FnOnce(&mut ListingRecord)) -> ScoredListing {
        let mut listing = ListingRecord {
            list_price: Some(500_000.0),
            weekly_rent: Some(500.0),
            cagr5: Some(0.05),
            vacancy: Some(2.0),
            ..ListingRecord::new("f-1")
        };
        configure(&mut listing);
        score_listing(&listing)
    }

    #[test]
    fn net_yield_threshold_applies() {
        let candidate = scored(|_| {});
        let strict = ListingFilters {
            min_net_yield: Some(0.05),
            ..ListingFilters::default()
        };
        let relaxed = ListingFilters {
            min_net_yield: Some(0.03),
            ..ListingFilters::default()
        };
        assert!(!strict.matches(&candidate));
        assert!(relaxed.matches(&candidate));
    }

    #[test]
    fn missing_metrics_only_matter_when_threshold_set() {
        let bare = score_listing(&ListingRecord::new("bare"));
        assert!(ListingFilters::default().matches(&bare));

        let growth = ListingFilters {
            min_cagr5: Some(0.01),
            ..ListingFilters::default()
        };
        assert!(!growth.matches(&bare));

        let vacancy = ListingFilters {
            max_vacancy: Some(0.0),
            ..ListingFilters::default()
        };
        assert!(vacancy.matches(&bare));
    }

    #[test]
    fn max_vacancy_excludes_higher_values() {
        let candidate = scored(|listing| listing.vacancy = Some(3.5));
        let filters = ListingFilters {
            max_vacancy: Some(3.0),
            ..ListingFilters::default()
        };
        assert!(!filters.matches(&candidate));
    }

    #[test]
    fn high_hazard_exclusions_are_toggleable() {
        let flooded = scored(|listing| listing.flood_risk = Some(RiskBand::High));
        let burning = scored(|listing| listing.bushfire_risk = Some(RiskBand::High));

        assert!(!ListingFilters::default().matches(&flooded));
        assert!(!ListingFilters::default().matches(&burning));

        let permissive = ListingFilters {
            exclude_flood_high: false,
            exclude_bushfire_high: false,
            ..ListingFilters::default()
        };
        assert!(permissive.matches(&flooded));
        assert!(permissive.matches(&burning));

        let flood_only = ListingFilters {
            exclude_bushfire_high: false,
            ..ListingFilters::default()
        };
        assert!(!flood_only.matches(&flooded));
        assert!(flood_only.matches(&burning));
    }

    #[test]
    fn unknown_hazard_is_not_excluded() {
        let unknown = scored(|listing| listing.flood_risk = Some(RiskBand::Unknown));
        assert!(ListingFilters::default().matches(&unknown));
    }
}

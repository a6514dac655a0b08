use std::cmp::Ordering;

use crate::scoring::ScoredListing;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "asc" => Some(Self::Asc),
            "desc" => Some(Self::Desc),
            _ => None,
        }
    }
}

/// Field a result set can be ordered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    DealScore,
    GrossYield,
    NetYield,
    Cagr5,
    Vacancy,
    RiskScore,
    ValueAddScore,
    CashOnCash,
    Affordability,
    ListPrice,
    WeeklyRent,
    LandM2,
    FrontageM,
    Beds,
    AmenitiesScore,
    MedianSalePrice,
    Id,
    Suburb,
    State,
    Postcode,
    ZoningCode,
    DwellingType,
    Address,
}

impl SortField {
    pub fn parse(raw: &str) -> Option<Self> {
        let field = match raw.trim() {
            "deal_score" => Self::DealScore,
            "gross_yield" => Self::GrossYield,
            "net_yield" => Self::NetYield,
            "cagr5" => Self::Cagr5,
            "vacancy" => Self::Vacancy,
            "risk_score" => Self::RiskScore,
            "value_add_score" => Self::ValueAddScore,
            "cash_on_cash" => Self::CashOnCash,
            "affordability" => Self::Affordability,
            "list_price" => Self::ListPrice,
            "weekly_rent" => Self::WeeklyRent,
            "land_m2" => Self::LandM2,
            "frontage_m" => Self::FrontageM,
            "beds" => Self::Beds,
            "amenities_score" => Self::AmenitiesScore,
            "median_sale_price" => Self::MedianSalePrice,
            "id" => Self::Id,
            "suburb" => Self::Suburb,
            "state" => Self::State,
            "postcode" => Self::Postcode,
            "zoning_code" => Self::ZoningCode,
            "dwelling_type" => Self::DwellingType,
            "address" => Self::Address,
            _ => return None,
        };
        Some(field)
    }

    fn key(self, scored: &ScoredListing) -> Option<SortKey<'_>> {
        let listing = &scored.listing;

        match self {
            Self::DealScore => number(Some(scored.deal_score)),
            Self::GrossYield => number(scored.gross_yield),
            Self::NetYield => number(scored.net_yield),
            Self::Cagr5 => number(listing.cagr5),
            Self::Vacancy => number(listing.vacancy),
            Self::RiskScore => number(Some(scored.risk_score)),
            Self::ValueAddScore => number(Some(scored.value_add_score)),
            Self::CashOnCash => number(Some(scored.cash_on_cash)),
            Self::Affordability => number(Some(scored.affordability)),
            Self::ListPrice => number(listing.list_price),
            Self::WeeklyRent => number(listing.weekly_rent),
            Self::LandM2 => number(listing.land_m2),
            Self::FrontageM => number(listing.frontage_m),
            Self::Beds => number(listing.beds),
            Self::AmenitiesScore => number(listing.amenities_score),
            Self::MedianSalePrice => number(listing.median_sale_price),
            Self::Id => Some(SortKey::Text(&listing.id)),
            Self::Suburb => text(&listing.suburb),
            Self::State => text(&listing.state),
            Self::Postcode => text(&listing.postcode),
            Self::ZoningCode => text(&listing.zoning_code),
            Self::DwellingType => text(&listing.dwelling_type),
            Self::Address => text(&listing.address),
        }
    }
}

fn number<'a>(value: Option<f64>) -> Option<SortKey<'a>> {
    value.filter(|value| !value.is_nan()).map(SortKey::Number)
}

fn text(value: &Option<String>) -> Option<SortKey<'_>> {
    value.as_deref().map(SortKey::Text)
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum SortKey<'a> {
    Number(f64),
    Text(&'a str),
}

impl SortKey<'_> {
    fn compare(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::Number(a), Self::Number(b)) => a.total_cmp(b),
            (Self::Text(a), Self::Text(b)) => a.cmp(b),
            (Self::Number(_), Self::Text(_)) => Ordering::Less,
            (Self::Text(_), Self::Number(_)) => Ordering::Greater,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortSpec {
    pub field: SortField,
    pub direction: SortDirection,
}

impl Default for SortSpec {
    fn default() -> Self {
        Self {
            field: SortField::DealScore,
            direction: SortDirection::Desc,
        }
    }
}

impl SortSpec {
    /// Stable sort. Listings missing the key trail the rest in either
    /// direction; only the present values are reversed for `Desc`.
    pub fn apply(&self, listings: &mut [ScoredListing]) {
        listings.sort_by(|a, b| {
            match (self.field.key(a), self.field.key(b)) {
                (Some(left), Some(right)) => {
                    let ordering = left.compare(&right);
                    match self.direction {
                        SortDirection::Asc => ordering,
                        SortDirection::Desc => ordering.reverse(),
                    }
                }
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::listings::ListingRecord;
    use crate::scoring::score_listing;

    fn with_cagr(id: &str, cagr5: Option<f64>) -> ScoredListing {
        score_listing(&ListingRecord {
            cagr5,
            ..ListingRecord::new(id)
        })
    }

    fn ids(listings: &[ScoredListing]) -> Vec<&str> {
        listings.iter().map(|scored| scored.listing.id.as_str()).collect()
    }

    fn sample() -> Vec<ScoredListing> {
        vec![
            with_cagr("missing-a", None),
            with_cagr("low", Some(0.01)),
            with_cagr("high", Some(0.09)),
            with_cagr("missing-b", None),
            with_cagr("mid", Some(0.05)),
        ]
    }

    #[test]
    fn missing_keys_trail_in_both_directions() {
        let mut ascending = sample();
        SortSpec {
            field: SortField::Cagr5,
            direction: SortDirection::Asc,
        }
        .apply(&mut ascending);
        assert_eq!(ids(&ascending), ["low", "mid", "high", "missing-a", "missing-b"]);

        let mut descending = sample();
        SortSpec {
            field: SortField::Cagr5,
            direction: SortDirection::Desc,
        }
        .apply(&mut descending);
        assert_eq!(ids(&descending), ["high", "mid", "low", "missing-a", "missing-b"]);
    }

    #[test]
    fn ties_keep_input_order() {
        let mut listings = vec![
            with_cagr("first", Some(0.03)),
            with_cagr("second", Some(0.03)),
            with_cagr("third", Some(0.03)),
        ];
        SortSpec::default().apply(&mut listings);
        assert_eq!(ids(&listings), ["first", "second", "third"]);
    }

    #[test]
    fn text_fields_sort_lexically() {
        let mut listings: Vec<ScoredListing> = ["Richmond", "Albury", "Manly"]
            .into_iter()
            .map(|suburb| {
                score_listing(&ListingRecord {
                    suburb: Some(suburb.to_string()),
                    ..ListingRecord::new(suburb)
                })
            })
            .collect();
        SortSpec {
            field: SortField::Suburb,
            direction: SortDirection::Asc,
        }
        .apply(&mut listings);
        assert_eq!(ids(&listings), ["Albury", "Manly", "Richmond"]);
    }

    #[test]
    fn parses_names_and_directions() {
        assert_eq!(SortField::parse("net_yield"), Some(SortField::NetYield));
        assert_eq!(SortField::parse("score_breakdown"), None);
        assert_eq!(SortDirection::parse("DESC"), Some(SortDirection::Desc));
        assert_eq!(SortDirection::parse("sideways"), None);
    }
}

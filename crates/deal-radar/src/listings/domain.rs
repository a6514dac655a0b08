use serde::{Deserialize, Serialize};

use super::dataset::{lenient_bool, lenient_crime_band, lenient_f64, lenient_risk, lenient_text};

/// Categorical exposure band for environmental hazards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskBand {
    None,
    Low,
    Medium,
    High,
    Unknown,
}

impl RiskBand {
    /// Case-insensitive parse. Blank input is absent; unrecognised text is `Unknown`.
    pub fn parse(raw: &str) -> Option<Self> {
        let value = raw.trim().to_ascii_lowercase();
        let band = match value.as_str() {
            "" => return None,
            "none" => Self::None,
            "low" => Self::Low,
            "medium" | "moderate" => Self::Medium,
            "high" => Self::High,
            _ => Self::Unknown,
        };
        Some(band)
    }
}

/// Relative crime exposure of a suburb.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CrimeBand {
    Low,
    Medium,
    High,
}

impl CrimeBand {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "low" => Some(Self::Low),
            "medium" => Some(Self::Medium),
            "high" => Some(Self::High),
            _ => None,
        }
    }
}

/// WGS84 coordinate. `x` is longitude, `y` is latitude.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

impl GeoPoint {
    pub fn x(&self) -> f64 {
        self.lng
    }

    pub fn y(&self) -> f64 {
        self.lat
    }
}

/// Dataset columns bound to [`ListingRecord`] fields, in serialisation order.
pub const LISTING_COLUMNS: [&str; 24] = [
    "id",
    "list_price",
    "weekly_rent",
    "cagr5",
    "vacancy",
    "land_m2",
    "frontage_m",
    "granny_flat_allowed",
    "dual_occ_allowed",
    "amenities_score",
    "beds",
    "flood_risk",
    "bushfire_risk",
    "crime_band",
    "zoning_code",
    "dwelling_type",
    "address",
    "suburb",
    "state",
    "postcode",
    "lat",
    "lng",
    "bushfire_category",
    "median_sale_price",
];

/// One listing as loaded from the dataset. Absent cells stay `None` and are
/// resolved to neutral defaults by the scoring code, never rejected.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ListingRecord {
    pub id: String,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub list_price: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub weekly_rent: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub cagr5: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub vacancy: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub land_m2: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub frontage_m: Option<f64>,
    #[serde(default, deserialize_with = "lenient_bool")]
    pub granny_flat_allowed: bool,
    #[serde(default, deserialize_with = "lenient_bool")]
    pub dual_occ_allowed: bool,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub amenities_score: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub beds: Option<f64>,
    #[serde(default, deserialize_with = "lenient_risk")]
    pub flood_risk: Option<RiskBand>,
    #[serde(default, deserialize_with = "lenient_risk")]
    pub bushfire_risk: Option<RiskBand>,
    #[serde(default, deserialize_with = "lenient_crime_band")]
    pub crime_band: Option<CrimeBand>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub zoning_code: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub dwelling_type: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub address: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub suburb: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub state: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub postcode: Option<String>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub lat: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub lng: Option<f64>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub bushfire_category: Option<String>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub median_sale_price: Option<f64>,
    /// Input columns with no field above, in their original order. They are
    /// carried through a rewrite of the dataset but never scored or served.
    #[serde(skip)]
    pub extra_columns: Vec<(String, String)>,
}

impl ListingRecord {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }

    pub fn location(&self) -> Option<GeoPoint> {
        match (self.lat, self.lng) {
            (Some(lat), Some(lng)) if lat.is_finite() && lng.is_finite() => {
                Some(GeoPoint { lat, lng })
            }
            _ => None,
        }
    }
}

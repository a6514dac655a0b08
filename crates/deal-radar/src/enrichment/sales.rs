use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{Datelike, NaiveDate};
use tracing::debug;

use super::provider::{Lookup, Provider, ProviderError, Site};

const SUBURB_COLUMNS: &[&str] = &["suburb", "SUBURB"];
const POSTCODE_COLUMNS: &[&str] = &["postcode", "POSTCODE"];
const PRICE_COLUMNS: &[&str] = &["price", "PRICE"];
const DATE_COLUMNS: &[&str] = &["contract_date", "CONTRACT_DATE", "SETTLEMENT_DATE"];
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%d/%m/%Y", "%d-%m-%Y"];

#[derive(Debug, thiserror::Error)]
pub enum SalesHistoryError {
    #[error("failed to read sales file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid sales CSV data: {0}")]
    Csv(#[from] csv::Error),
}

/// Trailing-window median sale price per suburb and postcode.
#[derive(Debug, Clone, Default)]
pub struct SalesHistory {
    medians: HashMap<(String, String), f64>,
}

fn key(suburb: &str, postcode: &str) -> (String, String) {
    (suburb.trim().to_ascii_uppercase(), postcode.trim().to_string())
}

/// Returns the first aliased column holding a non-blank value.
fn aliased<'r>(
    headers: &csv::StringRecord,
    row: &'r csv::StringRecord,
    aliases: &[&str],
) -> Option<&'r str> {
    aliases.iter().find_map(|alias| {
        let index = headers.iter().position(|header| header == *alias)?;
        row.get(index).filter(|value| !value.is_empty())
    })
}

fn parse_price(raw: &str) -> Option<f64> {
    let cleaned: String = raw.chars().filter(|c| *c != ',' && *c != '$').collect();
    cleaned.trim().parse::<f64>().ok().filter(|price| price.is_finite())
}

fn parse_sale_date(raw: &str) -> Option<NaiveDate> {
    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(raw.trim(), format).ok())
}

fn median(mut prices: Vec<f64>) -> Option<f64> {
    if prices.is_empty() {
        return None;
    }
    prices.sort_by(f64::total_cmp);
    let mid = prices.len() / 2;
    Some(if prices.len() % 2 == 0 {
        (prices[mid - 1] + prices[mid]) / 2.0
    } else {
        prices[mid]
    })
}

impl SalesHistory {
    /// Keeps sales whose year is at least `today.year() - window_years`.
    /// Rows with an unparsable price or date are skipped.
    pub fn from_reader<R: Read>(
        reader: R,
        window_years: u32,
        today: NaiveDate,
    ) -> Result<Self, SalesHistoryError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(reader);
        let headers = csv_reader.headers()?.clone();
        let cutoff = today.year() - i32::try_from(window_years).unwrap_or(i32::MAX);
        let mut buckets: HashMap<(String, String), Vec<f64>> = HashMap::new();

        for row in csv_reader.records() {
            let row = row?;
            let Some(price) = aliased(&headers, &row, PRICE_COLUMNS).and_then(parse_price) else {
                debug!(line = ?row.position().map(|p| p.line()), "skipping sale without a usable price");
                continue;
            };
            let Some(date) = aliased(&headers, &row, DATE_COLUMNS).and_then(parse_sale_date) else {
                continue;
            };
            if date.year() < cutoff {
                continue;
            }

            let suburb = aliased(&headers, &row, SUBURB_COLUMNS).unwrap_or_default();
            let postcode = aliased(&headers, &row, POSTCODE_COLUMNS).unwrap_or_default();
            buckets.entry(key(suburb, postcode)).or_default().push(price);
        }

        let medians = buckets
            .into_iter()
            .filter_map(|(key, prices)| median(prices).map(|value| (key, value)))
            .collect();
        Ok(Self { medians })
    }

    pub fn from_path<P: AsRef<Path>>(
        path: P,
        window_years: u32,
        today: NaiveDate,
    ) -> Result<Self, SalesHistoryError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| SalesHistoryError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_reader(file, window_years, today)
    }

    pub fn median(&self, suburb: &str, postcode: &str) -> Option<f64> {
        self.medians.get(&key(suburb, postcode)).copied()
    }

    pub fn len(&self) -> usize {
        self.medians.len()
    }

    pub fn is_empty(&self) -> bool {
        self.medians.is_empty()
    }
}

#[async_trait]
impl Provider<f64> for SalesHistory {
    fn name(&self) -> &str {
        "local-sales-history"
    }

    async fn lookup(&self, site: &Site) -> Result<Lookup<f64>, ProviderError> {
        let Some(suburb) = site.suburb.as_deref() else {
            return Ok(Lookup::NoMatch);
        };
        let postcode = site.postcode.as_deref().unwrap_or_default();
        Ok(self
            .median(suburb, postcode)
            .map_or(Lookup::NoMatch, Lookup::Found))
    }
}

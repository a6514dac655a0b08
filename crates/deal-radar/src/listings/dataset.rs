use std::collections::HashSet;
use std::fs::File;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Deserializer};
use tracing::{debug, warn};

use super::domain::{CrimeBand, ListingRecord, RiskBand, LISTING_COLUMNS};

#[derive(Debug, thiserror::Error)]
pub enum DatasetError {
    #[error("failed to access listing file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid listing CSV data: {0}")]
    Csv(#[from] csv::Error),
}

impl DatasetError {
    pub(crate) fn io(path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Parses listings from CSV. Later rows reusing an id are dropped. Columns
/// outside [`LISTING_COLUMNS`] are kept verbatim on each record.
pub fn read_listings<R: Read>(reader: R) -> Result<Vec<ListingRecord>, DatasetError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);
    let headers = csv_reader.headers()?.clone();
    let mut seen = HashSet::new();
    let mut listings = Vec::new();

    for row in csv_reader.records() {
        let record = row?;
        let mut listing: ListingRecord = record.deserialize(Some(&headers))?;
        listing.extra_columns = headers
            .iter()
            .enumerate()
            .filter(|(_, name)| !LISTING_COLUMNS.contains(name))
            .map(|(index, name)| (name.to_string(), record.get(index).unwrap_or_default().to_string()))
            .collect();
        if !seen.insert(listing.id.clone()) {
            warn!(id = %listing.id, "duplicate listing id; keeping first occurrence");
            continue;
        }
        listings.push(listing);
    }

    Ok(listings)
}

pub fn read_listings_from_path<P: AsRef<Path>>(path: P) -> Result<Vec<ListingRecord>, DatasetError> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| DatasetError::io(path, source))?;
    read_listings(file)
}

/// Writes the known columns followed by every extra column seen on any
/// record. Records lacking an extra column get an empty cell.
pub fn write_listings_to<W: Write>(writer: W, listings: &[ListingRecord]) -> Result<(), DatasetError> {
    let extra_names = extra_column_names(listings);
    let mut csv_writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);
    csv_writer.write_record(
        LISTING_COLUMNS
            .iter()
            .copied()
            .chain(extra_names.iter().map(String::as_str)),
    )?;

    for listing in listings {
        let extras: Vec<&str> = extra_names
            .iter()
            .map(|name| {
                listing
                    .extra_columns
                    .iter()
                    .find(|(column, _)| column == name)
                    .map_or("", |(_, value)| value.as_str())
            })
            .collect();
        csv_writer.serialize((listing, extras))?;
    }
    csv_writer.flush().map_err(csv::Error::from)?;
    Ok(())
}

/// Writes to a sibling temp file then renames it over `path`, so readers see
/// either the old dataset or the new one, never a partial file.
pub fn write_listings<P: AsRef<Path>>(path: P, listings: &[ListingRecord]) -> Result<(), DatasetError> {
    let path = path.as_ref();
    let mut staging = path.as_os_str().to_owned();
    staging.push(".tmp");
    let staging = PathBuf::from(staging);

    let file = File::create(&staging).map_err(|source| DatasetError::io(&staging, source))?;
    write_listings_to(file, listings)?;
    std::fs::rename(&staging, path).map_err(|source| DatasetError::io(path, source))?;

    debug!(path = %path.display(), count = listings.len(), "listing dataset written");
    Ok(())
}

fn extra_column_names(listings: &[ListingRecord]) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    for (name, _) in listings.iter().flat_map(|listing| &listing.extra_columns) {
        if !names.contains(name) {
            names.push(name.clone());
        }
    }
    names
}

fn non_blank<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty()))
}

pub(crate) fn lenient_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    non_blank(deserializer)
}

pub(crate) fn lenient_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(non_blank(deserializer)?.and_then(|raw| match raw.parse::<f64>() {
        Ok(value) if value.is_finite() => Some(value),
        _ => {
            debug!(value = %raw, "ignoring malformed numeric cell");
            None
        }
    }))
}

pub(crate) fn lenient_bool<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let flag = non_blank(deserializer)?
        .map(|raw| parse_flag(&raw))
        .unwrap_or(false);
    Ok(flag)
}

pub(crate) fn lenient_risk<'de, D>(deserializer: D) -> Result<Option<RiskBand>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(non_blank(deserializer)?.and_then(|raw| RiskBand::parse(&raw)))
}

pub(crate) fn lenient_crime_band<'de, D>(deserializer: D) -> Result<Option<CrimeBand>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(non_blank(deserializer)?.and_then(|raw| CrimeBand::parse(&raw)))
}

fn parse_flag(raw: &str) -> bool {
    match raw.to_ascii_lowercase().as_str() {
        "true" | "1" | "1.0" | "yes" | "y" => true,
        "false" | "0" | "0.0" | "no" | "n" => false,
        other => {
            debug!(value = %other, "ignoring malformed boolean cell");
            false
        }
    }
}

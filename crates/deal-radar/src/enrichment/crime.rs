use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use super::provider::{Lookup, Provider, ProviderError, Site};
use crate::listings::dataset::lenient_text;
use crate::listings::{CrimeBand, DatasetError};

#[derive(Debug, Deserialize)]
struct CrimeRow {
    #[serde(default, deserialize_with = "lenient_text")]
    suburb: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    state: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    crime_band: Option<String>,
}

/// Suburb crime bands from a local `suburb,state,crime_band` table.
#[derive(Debug, Clone, Default)]
pub struct CrimeTable {
    bands: HashMap<(String, String), CrimeBand>,
}

fn key(suburb: &str, state: &str) -> (String, String) {
    (
        suburb.trim().to_ascii_uppercase(),
        state.trim().to_ascii_uppercase(),
    )
}

impl CrimeTable {
    /// The first row for a suburb and state wins.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, DatasetError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(reader);
        let mut bands = HashMap::new();

        for row in csv_reader.deserialize::<CrimeRow>() {
            let row = row?;
            let (Some(suburb), Some(state), Some(raw)) = (row.suburb, row.state, row.crime_band) else {
                continue;
            };
            match CrimeBand::parse(&raw) {
                Some(band) => {
                    bands.entry(key(&suburb, &state)).or_insert(band);
                }
                None => debug!(%suburb, %state, value = %raw, "ignoring unrecognised crime band"),
            }
        }

        Ok(Self { bands })
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, DatasetError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| DatasetError::io(path, source))?;
        Self::from_reader(file)
    }

    pub fn lookup(&self, suburb: &str, state: &str) -> Option<CrimeBand> {
        self.bands.get(&key(suburb, state)).copied()
    }

    pub fn len(&self) -> usize {
        self.bands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bands.is_empty()
    }
}

#[async_trait]
impl Provider<CrimeBand> for CrimeTable {
    fn name(&self) -> &str {
        "local-crime-table"
    }

    async fn lookup(&self, site: &Site) -> Result<Lookup<CrimeBand>, ProviderError> {
        let band = match (&site.suburb, &site.state) {
            (Some(suburb), Some(state)) => CrimeTable::lookup(self, suburb, state),
            _ => None,
        };
        Ok(band.map_or(Lookup::NoMatch, Lookup::Found))
    }
}

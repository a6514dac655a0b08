//! Listing records, their CSV persistence, and the shared in-memory catalog.

mod catalog;
pub mod dataset;
pub mod domain;

pub use catalog::ListingCatalog;
pub use dataset::{read_listings, read_listings_from_path, write_listings, DatasetError};
pub use domain::{CrimeBand, GeoPoint, ListingRecord, RiskBand};

pub mod config;
pub mod enrichment;
pub mod error;
pub mod listings;
pub mod pipeline;
pub mod scoring;
pub mod telemetry;

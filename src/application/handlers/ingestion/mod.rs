//! Ingestion command handlers.
//!
//! Both strategies end the same way: embed every passage, drop the old
//! collection, upsert the new one, then report counts and probe retrieval.

mod build_taxonomy;
mod indexing;
mod ingest_portfolio;

pub use build_taxonomy::{BuildTaxonomyCommand, BuildTaxonomyHandler};
pub use indexing::{IngestionError, IngestionReport, ProbeResult};
pub use ingest_portfolio::{IngestPortfolioCommand, IngestPortfolioHandler};

//! Pipeline services: ingestion and run orchestration.

mod ingest;
mod pipeline;

pub use ingest::{IngestOutcome, IngestionService};
pub use pipeline::{ScrapePipeline, ScrapeSummary};

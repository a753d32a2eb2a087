//! MarketPulse ingest pipeline: loads the ad-platform and business exports,
//! cleans them, derives ratio metrics, aggregates per day and joins the
//! result into the canonical dataset.

pub mod aggregator;
pub mod cache;
pub mod derive;
pub mod loader;
pub mod merger;
pub mod normalizer;
pub mod pipeline;

pub use cache::PipelineCache;
pub use loader::{DataLoader, LoadedSources, SourceManifest};
pub use pipeline::{DateRange, Pipeline, PipelineRun};

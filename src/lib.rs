pub mod config;
pub mod error;
pub mod logging;
pub mod pipeline;
pub mod report;
pub mod scan;

pub use config::IngestConfig;
pub use error::{IngestError, Result};
pub use pipeline::{IngestionOrchestrator, IngestionResult, PipelineState, TracingSink};
pub use scan::{PathScanner, ScanResult};

/// Run one ingestion with events logged through `tracing`.
///
/// Scans `<raw>/<category>/<item>/<label>/` once, checks every class has
/// images, optionally decodes every image, then writes `metadata.json`.
///
/// ```no_run
/// use freshness_ingest::{ingest, IngestConfig};
///
/// let config = IngestConfig::with_root(".");
/// let result = ingest(config, true)?;
/// println!("{} images", result.total_images);
/// # Ok::<(), freshness_ingest::IngestError>(())
/// ```
pub fn ingest(config: IngestConfig, check_integrity: bool) -> Result<IngestionResult> {
    IngestionOrchestrator::new(config, Box::new(TracingSink)).run(check_integrity)
}

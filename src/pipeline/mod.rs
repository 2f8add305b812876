/// Ingestion pipeline
///
/// This module handles:
/// - Structural validation and the validation report (validate.rs)
/// - Optional image integrity screening (integrity.rs)
/// - Dataset metadata generation (metadata.rs)
/// - Stage sequencing and failure propagation (orchestrator.rs)
/// - Structured events emitted by every stage (events.rs)

pub mod events;
pub mod integrity;
pub mod metadata;
pub mod orchestrator;
pub mod validate;

pub use events::{EventSink, IngestEvent, MemorySink, Stage, TracingSink};
pub use integrity::{verify_image, IntegrityChecker};
pub use metadata::{ClassDistribution, DatasetInfo, DatasetMetadata, MetadataGenerator};
pub use orchestrator::{IngestionOrchestrator, IngestionResult, PipelineState, RunStatus};
pub use validate::{ClassStatus, ClassValidation, ValidationReport, Validator};

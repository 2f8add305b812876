use std::path::PathBuf;
use std::sync::Mutex;

/// Pipeline stages, in run order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Validation,
    Integrity,
    Metadata,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Validation => "validation",
            Stage::Integrity => "integrity",
            Stage::Metadata => "metadata",
        }
    }
}

/// Something a stage wants the outside world to know.
#[derive(Debug, Clone, PartialEq)]
pub enum IngestEvent {
    /// An ingestion run began.
    RunStarted { check_integrity: bool },
    /// A stage began.
    StageStarted(Stage),
    /// A configured category folder doesn't exist and was skipped.
    CategoryMissing { path: PathBuf },
    /// An item folder not listed in the config was scanned anyway.
    UnlistedItem { category: String, item: String },
    /// A class was counted during validation.
    ClassCounted { class: String, count: usize },
    /// A class has no images.
    ClassMissing { class: String },
    /// The validation report was saved.
    ReportWritten { path: PathBuf },
    /// Validation finished.
    ValidationFinished { passed: bool, total_images: usize },
    /// An image failed to decode.
    CorruptedImage { path: PathBuf, reason: String },
    /// Integrity checking finished.
    IntegrityFinished { checked: usize, corrupted: usize },
    /// The metadata file was saved.
    MetadataWritten { path: PathBuf },
    /// The run succeeded.
    RunCompleted {
        total_images: usize,
        class_counts: Vec<(String, usize)>,
    },
    /// The run stopped with an error.
    RunFailed { message: String },
}

/// Receives pipeline events.
pub trait EventSink: Send + Sync {
    fn on_event(&self, event: &IngestEvent);
}

/// Forwards events to `tracing` at a level matching their severity.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl EventSink for TracingSink {
    fn on_event(&self, event: &IngestEvent) {
        match event {
            IngestEvent::RunStarted { check_integrity } => {
                tracing::info!(check_integrity, "Starting data ingestion pipeline");
            }
            IngestEvent::StageStarted(stage) => {
                tracing::info!(stage = stage.as_str(), "Stage started");
            }
            IngestEvent::CategoryMissing { path } => {
                tracing::debug!("Category folder missing, skipping: {}", path.display());
            }
            IngestEvent::UnlistedItem { category, item } => {
                tracing::debug!("Unlisted item folder '{}' in {}", item, category);
            }
            IngestEvent::ClassCounted { class, count } => {
                tracing::info!("Class '{}' contains {} images", class, count);
            }
            IngestEvent::ClassMissing { class } => {
                tracing::error!("No images found for class '{}'", class);
            }
            IngestEvent::ReportWritten { path } => {
                tracing::info!("Validation report saved to {}", path.display());
            }
            IngestEvent::ValidationFinished {
                passed: true,
                total_images,
            } => {
                tracing::info!("Data validation PASSED. Total images: {}", total_images);
            }
            IngestEvent::ValidationFinished { passed: false, .. } => {
                tracing::error!("Data validation FAILED. Check validation report for details.");
            }
            IngestEvent::CorruptedImage { path, reason } => {
                tracing::warn!("Corrupted image found: {} - {}", path.display(), reason);
            }
            IngestEvent::IntegrityFinished { checked, corrupted: 0 } => {
                tracing::info!("All {} image files passed integrity check", checked);
            }
            IngestEvent::IntegrityFinished { checked, corrupted } => {
                tracing::warn!(
                    "Found {} corrupted image files out of {}",
                    corrupted,
                    checked
                );
            }
            IngestEvent::MetadataWritten { path } => {
                tracing::info!("Metadata saved to {}", path.display());
            }
            IngestEvent::RunCompleted {
                total_images,
                class_counts,
            } => {
                tracing::info!("Data ingestion completed. Total images ingested: {}", total_images);
                for (class, count) in class_counts {
                    tracing::info!("{} images: {}", class, count);
                }
            }
            IngestEvent::RunFailed { message } => {
                tracing::error!("Data ingestion failed: {}", message);
            }
        }
    }
}

/// Collects events in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    events: Mutex<Vec<IngestEvent>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of everything received so far
    pub fn events(&self) -> Vec<IngestEvent> {
        self.events
            .lock()
            .map(|events| events.clone())
            .unwrap_or_default()
    }
}

impl EventSink for MemorySink {
    fn on_event(&self, event: &IngestEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event.clone());
        }
    }
}

/// Lets a shared sink (e.g. `Arc<MemorySink>`) be handed to the orchestrator
/// while the caller keeps a handle.
impl<T: EventSink + ?Sized> EventSink for std::sync::Arc<T> {
    fn on_event(&self, event: &IngestEvent) {
        (**self).on_event(event);
    }
}

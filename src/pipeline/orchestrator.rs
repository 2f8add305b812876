use serde::Serialize;
use std::path::PathBuf;

use super::events::{EventSink, IngestEvent};
use super::integrity::IntegrityChecker;
use super::metadata::{ClassDistribution, MetadataGenerator};
use super::validate::Validator;
use crate::config::IngestConfig;
use crate::error::{IngestError, Result};
use crate::scan::{PathScanner, ScanResult};

/// Where a run currently is.
///
/// `Failed` is only entered from `Validating`. An I/O error in a later
/// stage leaves the state on that stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    NotStarted,
    Validating,
    CheckingIntegrity,
    GeneratingMetadata,
    Completed,
    Failed,
}

/// Final status of a successful run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RunStatus {
    Success,
}

impl RunStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RunStatus::Success => "success",
        }
    }
}

/// What a completed run hands back to the caller
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IngestionResult {
    pub status: RunStatus,
    pub raw_data_dir: PathBuf,
    pub metadata_file: PathBuf,
    pub total_images: usize,
    pub class_distribution: ClassDistribution,
    /// Files that failed to decode. Informational, never fails the run.
    pub corrupted_files: Vec<PathBuf>,
    pub validation_passed: bool,
}

/// Sequences the pipeline stages for one dataset.
pub struct IngestionOrchestrator {
    config: IngestConfig,
    events: Box<dyn EventSink>,
    state: PipelineState,
}

impl IngestionOrchestrator {
    pub fn new(config: IngestConfig, events: Box<dyn EventSink>) -> Self {
        Self {
            config,
            events,
            state: PipelineState::NotStarted,
        }
    }

    pub fn config(&self) -> &IngestConfig {
        &self.config
    }

    pub fn state(&self) -> PipelineState {
        self.state
    }

    /// Run one ingestion.
    ///
    /// The dataset is scanned once and the same listing feeds every stage.
    /// Returns `IngestError::ValidationFailed` if any class is empty, in
    /// which case nothing after validation runs. Every error is reported to
    /// the event sink and returned as is.
    pub fn run(&mut self, check_integrity: bool) -> Result<IngestionResult> {
        self.state = PipelineState::NotStarted;
        self.events.on_event(&IngestEvent::RunStarted { check_integrity });

        let result = self.run_stages(check_integrity);
        if let Err(err) = &result {
            self.events.on_event(&IngestEvent::RunFailed {
                message: err.to_string(),
            });
        }
        result
    }

    fn run_stages(&mut self, check_integrity: bool) -> Result<IngestionResult> {
        self.state = PipelineState::Validating;
        let (scan, passed) = match self.scan_and_validate() {
            Ok(outcome) => outcome,
            Err(err) => {
                self.state = PipelineState::Failed;
                return Err(err);
            }
        };

        let events = self.events.as_ref();

        let corrupted_files = if check_integrity {
            self.state = PipelineState::CheckingIntegrity;
            IntegrityChecker::new(events).check_integrity(&scan)
        } else {
            Vec::new()
        };

        self.state = PipelineState::GeneratingMetadata;
        let metadata = MetadataGenerator::new(&self.config, events).generate_metadata(&scan)?;

        self.state = PipelineState::Completed;
        events.on_event(&IngestEvent::RunCompleted {
            total_images: metadata.total_images,
            class_counts: metadata.class_distribution.counts().to_vec(),
        });

        Ok(IngestionResult {
            status: RunStatus::Success,
            raw_data_dir: self.config.raw_data_dir.clone(),
            metadata_file: self.config.metadata_file.clone(),
            total_images: metadata.total_images,
            class_distribution: metadata.class_distribution,
            corrupted_files,
            validation_passed: passed,
        })
    }

    fn scan_and_validate(&self) -> Result<(ScanResult, bool)> {
        self.config.validate()?;
        let scan = PathScanner::new(&self.config, self.events.as_ref()).scan()?;

        let validator = Validator::new(&self.config, self.events.as_ref());
        let (passed, report) = validator.validate(&scan)?;
        if !passed {
            return Err(IngestError::ValidationFailed {
                report_path: validator.report_path(),
                empty_classes: report.empty_classes(),
            });
        }
        Ok((scan, passed))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::events::{MemorySink, Stage};
    use image::{Rgb, RgbImage};
    use std::fs;
    use std::path::Path;
    use std::sync::Arc;

    fn write_images(dir: &Path, n: usize) {
        fs::create_dir_all(dir).unwrap();
        for i in 0..n {
            RgbImage::from_pixel(2, 2, Rgb([i as u8, 0, 0]))
                .save(dir.join(format!("img_{i}.png")))
                .unwrap();
        }
    }

    fn orchestrator(root: &Path) -> (IngestionOrchestrator, Arc<MemorySink>) {
        let sink = Arc::new(MemorySink::new());
        let config = IngestConfig::with_root(root);
        let orch = IngestionOrchestrator::new(config, Box::new(Arc::clone(&sink)));
        (orch, sink)
    }

    #[test]
    fn completes_and_skips_integrity_when_not_requested() {
        let dir = tempfile::tempdir().unwrap();
        let (mut orch, sink) = orchestrator(dir.path());
        let raw = orch.config().raw_data_dir.clone();
        write_images(&raw.join("Fruits/Apple/Fresh"), 2);
        write_images(&raw.join("Fruits/Apple/Rotten"), 1);
        fs::write(raw.join("Fruits/Apple/Rotten/broken.png"), b"junk").unwrap();

        assert_eq!(orch.state(), PipelineState::NotStarted);
        let result = orch.run(false).unwrap();

        assert_eq!(orch.state(), PipelineState::Completed);
        assert_eq!(result.status, RunStatus::Success);
        assert!(result.validation_passed);
        assert_eq!(result.total_images, 4);
        assert!(result.corrupted_files.is_empty());
        assert!(!sink
            .events()
            .contains(&IngestEvent::StageStarted(Stage::Integrity)));
    }

    #[test]
    fn validation_failure_stops_before_metadata() {
        let dir = tempfile::tempdir().unwrap();
        let (mut orch, sink) = orchestrator(dir.path());
        write_images(&orch.config().raw_data_dir.join("Vegetables/Tomato/Fresh"), 3);

        let err = orch.run(true).unwrap_err();

        match &err {
            IngestError::ValidationFailed { empty_classes, .. } => {
                assert_eq!(empty_classes, &vec!["Rotten".to_string()]);
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(orch.state(), PipelineState::Failed);
        assert!(!orch.config().metadata_file.exists());

        let events = sink.events();
        assert!(!events.contains(&IngestEvent::StageStarted(Stage::Integrity)));
        assert!(!events.contains(&IngestEvent::StageStarted(Stage::Metadata)));
        assert!(matches!(events.last(), Some(IngestEvent::RunFailed { .. })));
    }

    #[test]
    fn invalid_config_fails_in_validation() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = IngestConfig::with_root(dir.path());
        config.class_names.clear();
        let mut orch = IngestionOrchestrator::new(config, Box::new(MemorySink::new()));

        let err = orch.run(false).unwrap_err();
        assert!(matches!(err, IngestError::InvalidConfig(_)));
        assert_eq!(orch.state(), PipelineState::Failed);
    }

    #[test]
    fn metadata_write_error_keeps_stage_state() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = IngestConfig::with_root(dir.path());
        let blocker = dir.path().join("blocker");
        fs::write(&blocker, b"file").unwrap();
        config.metadata_file = blocker.join("metadata.json");
        write_images(&config.raw_data_dir.join("Fruits/Mango/Fresh"), 1);
        write_images(&config.raw_data_dir.join("Fruits/Mango/Rotten"), 1);

        let mut orch = IngestionOrchestrator::new(config, Box::new(MemorySink::new()));
        let err = orch.run(false).unwrap_err();

        assert!(matches!(err, IngestError::Io { .. }));
        assert_eq!(orch.state(), PipelineState::GeneratingMetadata);
    }

    #[test]
    fn report_write_error_fails_the_run() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = IngestConfig::with_root(dir.path());
        let blocker = dir.path().join("blocker");
        fs::write(&blocker, b"file").unwrap();
        config.raw_data_dir = blocker.join("raw");
        let metadata_file = config.metadata_file.clone();

        let sink = Arc::new(MemorySink::new());
        let mut orch = IngestionOrchestrator::new(config, Box::new(Arc::clone(&sink)));
        let err = orch.run(true).unwrap_err();

        assert!(matches!(err, IngestError::Io { .. }));
        assert_eq!(orch.state(), PipelineState::Failed);
        assert!(!metadata_file.exists());
        assert!(matches!(
            sink.events().last(),
            Some(IngestEvent::RunFailed { .. })
        ));
    }

    #[test]
    fn stages_run_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let (mut orch, sink) = orchestrator(dir.path());
        let raw = orch.config().raw_data_dir.clone();
        write_images(&raw.join("Fruits/Apple/Fresh"), 1);
        write_images(&raw.join("Fruits/Apple/Rotten"), 1);

        orch.run(true).unwrap();

        let stages: Vec<Stage> = sink
            .events()
            .into_iter()
            .filter_map(|e| match e {
                IngestEvent::StageStarted(stage) => Some(stage),
                _ => None,
            })
            .collect();
        assert_eq!(
            stages,
            vec![Stage::Validation, Stage::Integrity, Stage::Metadata]
        );
    }
}

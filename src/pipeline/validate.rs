use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::events::{EventSink, IngestEvent, Stage};
use crate::config::IngestConfig;
use crate::error::Result;
use crate::report::write_json_pretty;
use crate::scan::ScanResult;

/// Outcome for a single class
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClassStatus {
    Success,
    Error,
}

/// Validation entry for one class
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassValidation {
    pub status: ClassStatus,
    pub message: String,
    pub image_count: usize,
}

/// Report persisted to `validation_report.json`.
///
/// `classes` keeps configured class order and is written as a JSON object in
/// that order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    #[serde(serialize_with = "serialize_in_order")]
    pub classes: Vec<(String, ClassValidation)>,
    pub total_images: usize,
    pub validation_passed: bool,
}

impl ValidationReport {
    pub fn class(&self, name: &str) -> Option<&ClassValidation> {
        self.classes
            .iter()
            .find(|(class, _)| class == name)
            .map(|(_, entry)| entry)
    }

    /// Classes with no images, in configured order
    pub fn empty_classes(&self) -> Vec<String> {
        self.classes
            .iter()
            .filter(|(_, v)| v.status == ClassStatus::Error)
            .map(|(name, _)| name.clone())
            .collect()
    }
}

fn serialize_in_order<S: Serializer>(
    classes: &[(String, ClassValidation)],
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    let mut map = serializer.serialize_map(Some(classes.len()))?;
    for (class, entry) in classes {
        map.serialize_entry(class, entry)?;
    }
    map.end()
}

/// Checks that the dataset has images for every configured class.
pub struct Validator<'a> {
    config: &'a IngestConfig,
    events: &'a dyn EventSink,
}

impl<'a> Validator<'a> {
    pub fn new(config: &'a IngestConfig, events: &'a dyn EventSink) -> Self {
        Self { config, events }
    }

    /// Where the report is written
    pub fn report_path(&self) -> PathBuf {
        self.config.validation_report_path()
    }

    /// Count images per class, write the report, return the verdict.
    ///
    /// An empty class is a reported failure, not an error: every class is
    /// still evaluated and the report is always written. Only a failed write
    /// returns `Err`.
    pub fn validate(&self, scan: &ScanResult) -> Result<(bool, ValidationReport)> {
        self.events.on_event(&IngestEvent::StageStarted(Stage::Validation));

        let mut passed = true;
        let mut total_images = 0;
        let mut classes = Vec::with_capacity(self.config.class_names.len());

        for class in &self.config.class_names {
            let count = scan.count(class);
            total_images += count;

            let entry = if count == 0 {
                passed = false;
                self.events.on_event(&IngestEvent::ClassMissing {
                    class: class.clone(),
                });
                ClassValidation {
                    status: ClassStatus::Error,
                    message: "No images found".to_string(),
                    image_count: 0,
                }
            } else {
                self.events.on_event(&IngestEvent::ClassCounted {
                    class: class.clone(),
                    count,
                });
                ClassValidation {
                    status: ClassStatus::Success,
                    message: format!("{count} images found"),
                    image_count: count,
                }
            };
            classes.push((class.clone(), entry));
        }

        let report = ValidationReport {
            classes,
            total_images,
            validation_passed: passed,
        };

        let report_path = self.report_path();
        write_json_pretty(&report_path, &report)?;
        self.events.on_event(&IngestEvent::ReportWritten { path: report_path });
        self.events.on_event(&IngestEvent::ValidationFinished {
            passed,
            total_images,
        });

        Ok((passed, report))
    }
}

use chrono::{DateTime, Local, SecondsFormat};
use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;

use super::events::{EventSink, IngestEvent, Stage};
use crate::config::IngestConfig;
use crate::error::Result;
use crate::report::write_json_pretty;
use crate::scan::ScanResult;

/// Suffix of the derived percentage keys in `class_distribution`
pub const PERCENTAGE_SUFFIX: &str = "_percentage";

/// Descriptive part of the metadata file
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DatasetInfo {
    pub name: String,
    pub classes: Vec<String>,
    pub task_type: String,
    /// ISO-8601 local timestamp
    pub ingestion_date: String,
}

/// Per-class counts, plus percentages when the dataset isn't empty.
///
/// Serializes as a flat map: `{"Fresh": 8, "Rotten": 12,
/// "Fresh_percentage": 40.0, "Rotten_percentage": 60.0}`.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassDistribution {
    counts: Vec<(String, usize)>,
    percentages: Option<Vec<(String, f64)>>,
}

impl ClassDistribution {
    /// Build from counts in class order. Percentages are only derived when
    /// the total is above zero.
    pub fn from_counts(counts: Vec<(String, usize)>) -> Self {
        let total: usize = counts.iter().map(|(_, n)| n).sum();
        let percentages = (total > 0).then(|| {
            counts
                .iter()
                .map(|(class, n)| (class.clone(), round2(*n as f64 / total as f64 * 100.0)))
                .collect()
        });
        Self {
            counts,
            percentages,
        }
    }

    pub fn count(&self, class: &str) -> Option<usize> {
        self.counts.iter().find(|(c, _)| c == class).map(|(_, n)| *n)
    }

    /// Rounded percentage for `class`, `None` if absent or the dataset is empty
    pub fn percentage(&self, class: &str) -> Option<f64> {
        self.percentages
            .as_ref()?
            .iter()
            .find(|(c, _)| c == class)
            .map(|(_, p)| *p)
    }

    pub fn has_percentages(&self) -> bool {
        self.percentages.is_some()
    }

    pub fn counts(&self) -> &[(String, usize)] {
        &self.counts
    }

    pub fn total(&self) -> usize {
        self.counts.iter().map(|(_, n)| n).sum()
    }
}

impl Serialize for ClassDistribution {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let extra = self.percentages.as_ref().map_or(0, Vec::len);
        let mut map = serializer.serialize_map(Some(self.counts.len() + extra))?;
        for (class, count) in &self.counts {
            map.serialize_entry(class, count)?;
        }
        if let Some(percentages) = &self.percentages {
            for (class, pct) in percentages {
                map.serialize_entry(&format!("{class}{PERCENTAGE_SUFFIX}"), pct)?;
            }
        }
        map.end()
    }
}

/// Contents of the metadata file
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DatasetMetadata {
    pub dataset_info: DatasetInfo,
    pub class_distribution: ClassDistribution,
    pub total_images: usize,
}

/// Summarizes a scan and writes `metadata.json`.
pub struct MetadataGenerator<'a> {
    config: &'a IngestConfig,
    events: &'a dyn EventSink,
}

impl<'a> MetadataGenerator<'a> {
    pub fn new(config: &'a IngestConfig, events: &'a dyn EventSink) -> Self {
        Self { config, events }
    }

    /// Build and persist metadata stamped with the current time.
    pub fn generate_metadata(&self, scan: &ScanResult) -> Result<DatasetMetadata> {
        self.generate_metadata_at(scan, Local::now())
    }

    /// Build and persist metadata stamped with `now`.
    pub fn generate_metadata_at(
        &self,
        scan: &ScanResult,
        now: DateTime<Local>,
    ) -> Result<DatasetMetadata> {
        self.events.on_event(&IngestEvent::StageStarted(Stage::Metadata));

        let counts = self
            .config
            .class_names
            .iter()
            .map(|class| (class.clone(), scan.count(class)))
            .collect();
        let class_distribution = ClassDistribution::from_counts(counts);

        let metadata = DatasetMetadata {
            dataset_info: DatasetInfo {
                name: self.config.dataset_name.clone(),
                classes: self.config.class_names.clone(),
                task_type: self.config.task_type.clone(),
                ingestion_date: now.to_rfc3339_opts(SecondsFormat::Micros, false),
            },
            total_images: class_distribution.total(),
            class_distribution,
        };

        write_json_pretty(&self.config.metadata_file, &metadata)?;
        self.events.on_event(&IngestEvent::MetadataWritten {
            path: self.config.metadata_file.clone(),
        });

        Ok(metadata)
    }
}

/// Round to 2 decimals using the exact binary value, ties to even.
/// `3.125` gives `3.12`, `2.675` (stored just below) gives `2.67`.
fn round2(value: f64) -> f64 {
    if !value.is_finite() || value == 0.0 {
        return value;
    }
    if value < 0.0 {
        return -round2(-value);
    }

    let bits = value.to_bits();
    let exp_bits = ((bits >> 52) & 0x7ff) as i32;
    let fraction = bits & ((1u64 << 52) - 1);
    let (mantissa, exponent) = if exp_bits == 0 {
        (fraction, -1074)
    } else {
        (fraction | (1u64 << 52), exp_bits - 1075)
    };
    // Integers are already exact
    if exponent >= 0 {
        return value;
    }
    let shift = exponent.unsigned_abs();
    if shift > 100 {
        return 0.0;
    }

    // value * 100 == scaled / 2^shift exactly
    let scaled = u128::from(mantissa) * 100;
    let whole = scaled >> shift;
    let rem = scaled & ((1u128 << shift) - 1);
    let half = 1u128 << (shift - 1);
    let rounded = if rem > half || (rem == half && whole % 2 == 1) {
        whole + 1
    } else {
        whole
    };
    rounded as f64 / 100.0
}

use serde::Deserialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::error::{IngestError, Result};
use crate::scan::normalize_label;

/// File name of the validation report, written next to the raw data folder
pub const VALIDATION_REPORT_FILE: &str = "validation_report.json";

/// Default image extensions (matched case-insensitively)
pub const DEFAULT_IMAGE_EXTENSIONS: [&str; 5] = ["jpg", "jpeg", "png", "bmp", "tiff"];

/// Everything the pipeline needs to know about where the dataset lives
/// and how it is labelled.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct IngestConfig {
    /// Root of the raw dataset (`<raw>/<category>/<item>/<label>/<image>`)
    pub raw_data_dir: PathBuf,
    /// Where the dataset metadata JSON is written
    pub metadata_file: PathBuf,
    /// Top-level category folders to walk (e.g. Fruits, Vegetables)
    pub category_names: Vec<String>,
    /// Known item folders. Informational only; unknown items are still scanned.
    pub item_names: Vec<String>,
    /// Classification targets, in report order
    pub class_names: Vec<String>,
    /// Accepted image extensions, without the dot
    pub image_extensions: Vec<String>,
    /// Name recorded in the metadata file
    pub dataset_name: String,
    /// Task tag recorded in the metadata file
    pub task_type: String,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self::with_root(".")
    }
}

impl IngestConfig {
    /// Default layout rooted at `root`:
    /// - raw images in `<root>/artifacts/data/raw`
    /// - metadata in `<root>/artifacts/data/metadata.json`
    pub fn with_root(root: impl AsRef<Path>) -> Self {
        let data_dir = root.as_ref().join("artifacts").join("data");
        let fruits = ["Apple", "Banana", "Mango", "Orange", "Strawberry"];
        let vegetables = ["Bellpepper", "Carrot", "Cucumber", "Potato", "Tomato"];

        Self {
            raw_data_dir: data_dir.join("raw"),
            metadata_file: data_dir.join("metadata.json"),
            category_names: to_strings(&["Fruits", "Vegetables"]),
            item_names: fruits
                .iter()
                .chain(vegetables.iter())
                .map(|s| s.to_string())
                .collect(),
            class_names: to_strings(&["Fresh", "Rotten"]),
            image_extensions: to_strings(&DEFAULT_IMAGE_EXTENSIONS),
            dataset_name: "Fruits and Vegetables Dataset".to_string(),
            task_type: "binary_classification".to_string(),
        }
    }

    /// Load a config from a TOML file.
    ///
    /// Missing fields fall back to the defaults of [`IngestConfig::with_root`]
    /// rooted at the file's directory. Relative paths are resolved against
    /// that directory too.
    pub fn from_toml_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|source| IngestError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        let base = path.parent().unwrap_or_else(|| Path::new("."));
        Self::from_toml_str(&text, base).map_err(|err| match err {
            ParseFailure::Toml(source) => IngestError::ConfigParse {
                path: path.to_path_buf(),
                source,
            },
            ParseFailure::Invalid(e) => e,
        })
    }

    fn from_toml_str(text: &str, base: &Path) -> std::result::Result<Self, ParseFailure> {
        let mut config: IngestConfig = toml::from_str(text).map_err(ParseFailure::Toml)?;

        // serde(default) roots missing paths at ".", so this covers both
        // defaulted and explicitly relative entries
        if config.raw_data_dir.is_relative() {
            config.raw_data_dir = base.join(&config.raw_data_dir);
        }
        if config.metadata_file.is_relative() {
            config.metadata_file = base.join(&config.metadata_file);
        }

        config.validate().map_err(ParseFailure::Invalid)?;
        Ok(config)
    }

    /// Path of the validation report: `<parent of raw_data_dir>/validation_report.json`
    pub fn validation_report_path(&self) -> PathBuf {
        self.raw_data_dir
            .parent()
            .unwrap_or_else(|| Path::new("."))
            .join(VALIDATION_REPORT_FILE)
    }

    /// Check the invariants the pipeline relies on.
    pub fn validate(&self) -> Result<()> {
        if self.class_names.is_empty() {
            return Err(IngestError::InvalidConfig(
                "at least one class name is required".to_string(),
            ));
        }

        let mut seen = HashSet::new();
        for class in &self.class_names {
            // Folder names are normalized before matching, so a class that
            // isn't already in normal form could never be found
            let normalized = normalize_label(class);
            if normalized != *class {
                return Err(IngestError::InvalidConfig(format!(
                    "class name '{class}' is not normalized (expected '{normalized}')"
                )));
            }
            if !seen.insert(class.as_str()) {
                return Err(IngestError::InvalidConfig(format!(
                    "duplicate class name '{class}'"
                )));
            }
        }

        if self.image_extensions.is_empty() {
            return Err(IngestError::InvalidConfig(
                "at least one image extension is required".to_string(),
            ));
        }

        Ok(())
    }

    /// True if `ext` (no dot) is one of the configured image extensions
    pub fn accepts_extension(&self, ext: &str) -> bool {
        self.image_extensions
            .iter()
            .any(|allowed| allowed.trim_start_matches('.').eq_ignore_ascii_case(ext))
    }
}

#[derive(Debug)]
enum ParseFailure {
    Toml(toml::de::Error),
    Invalid(IngestError),
}

fn to_strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use super::label::normalize_label;
use super::result::ScanResult;
use crate::config::IngestConfig;
use crate::error::Result;
use crate::pipeline::events::{EventSink, IngestEvent};

/// Enumerates the image files of a raw dataset, grouped by class.
///
/// Walks `<category>/<item>/<label>/` one level at a time. Only folders whose
/// normalized name is a configured class are ever opened, so unrelated
/// folders (unreadable, symlink loops) can't break a scan.
pub struct PathScanner<'a> {
    config: &'a IngestConfig,
    events: &'a dyn EventSink,
}

impl<'a> PathScanner<'a> {
    pub fn new(config: &'a IngestConfig, events: &'a dyn EventSink) -> Self {
        Self { config, events }
    }

    /// Scan every configured category under the raw data folder.
    ///
    /// Missing category folders are skipped. Files whose extension isn't
    /// accepted are ignored. Failing to read a category, item or label
    /// folder is returned as an error.
    pub fn scan(&self) -> Result<ScanResult> {
        let mut result = ScanResult::new(self.config.class_names.iter().cloned());
        let mut unknown_items = HashSet::new();

        for category in &self.config.category_names {
            let category_path = self.config.raw_data_dir.join(category);
            if !category_path.is_dir() {
                self.events.on_event(&IngestEvent::CategoryMissing {
                    path: category_path,
                });
                continue;
            }

            for item_dir in list_children(&category_path)? {
                if !item_dir.is_dir() {
                    continue;
                }

                let item = file_name(&item_dir);
                if !self.is_known_item(&item) && unknown_items.insert(item.clone()) {
                    self.events.on_event(&IngestEvent::UnlistedItem {
                        category: category.clone(),
                        item: item.clone(),
                    });
                }

                for label_dir in list_children(&item_dir)? {
                    let label = normalize_label(&file_name(&label_dir));
                    if !result.contains_class(&label) || !label_dir.is_dir() {
                        continue;
                    }

                    for path in self.label_files(&label_dir)? {
                        result.push(&label, path);
                    }
                }
            }
        }

        Ok(result)
    }

    /// Image files directly inside one label folder, sorted by name.
    pub fn label_files(&self, label_dir: &Path) -> Result<Vec<PathBuf>> {
        Ok(list_children(label_dir)?
            .into_iter()
            // Only image files (not directories); symlinked files count
            .filter(|path| path.is_file() && self.has_image_extension(path))
            .collect())
    }

    fn has_image_extension(&self, path: &Path) -> bool {
        path.extension()
            .map(|ext| self.config.accepts_extension(&ext.to_string_lossy()))
            .unwrap_or(false)
    }

    fn is_known_item(&self, item: &str) -> bool {
        self.config
            .item_names
            .iter()
            .any(|known| known.eq_ignore_ascii_case(item))
    }
}

/// Direct children of `dir`, sorted by file name.
///
/// Links are not followed here, so a child symlink is listed but never read.
fn list_children(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut children = Vec::new();
    for entry in WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
    {
        children.push(entry?.into_path());
    }
    Ok(children)
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}

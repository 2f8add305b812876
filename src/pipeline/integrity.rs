use image::ImageReader;
use std::path::{Path, PathBuf};

use super::events::{EventSink, IngestEvent, Stage};
use crate::scan::ScanResult;

/// Decode `path` fully to prove it is a readable image.
///
/// The format is guessed from the file contents, falling back to the
/// extension. The file handle is dropped before returning.
pub fn verify_image(path: &Path) -> Result<(), String> {
    let reader = ImageReader::open(path)
        .map_err(|e| format!("Failed to open: {}", e))?
        .with_guessed_format()
        .map_err(|e| format!("Failed to read header: {}", e))?;

    if reader.format().is_none() {
        return Err("Unrecognized image format".to_string());
    }

    reader
        .decode()
        .map(|_| ())
        .map_err(|e| format!("Failed to decode: {}", e))
}

/// Finds scanned files that don't decode as images.
pub struct IntegrityChecker<'a> {
    events: &'a dyn EventSink,
}

impl<'a> IntegrityChecker<'a> {
    pub fn new(events: &'a dyn EventSink) -> Self {
        Self { events }
    }

    /// Check every scanned file, class by class.
    ///
    /// Never stops early and never touches the files. The returned list is
    /// empty only if every file decoded.
    pub fn check_integrity(&self, scan: &ScanResult) -> Vec<PathBuf> {
        self.events.on_event(&IngestEvent::StageStarted(Stage::Integrity));

        let mut corrupted = Vec::new();
        let mut checked = 0;

        for path in scan.all_paths() {
            checked += 1;
            if let Err(reason) = verify_image(path) {
                self.events.on_event(&IngestEvent::CorruptedImage {
                    path: path.clone(),
                    reason,
                });
                corrupted.push(path.clone());
            }
        }

        self.events.on_event(&IngestEvent::IntegrityFinished {
            checked,
            corrupted: corrupted.len(),
        });

        corrupted
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::events::MemorySink;
    use image::{Rgb, RgbImage};
    use std::fs;

    fn write_png(path: &Path) {
        RgbImage::from_pixel(4, 4, Rgb([200, 40, 40])).save(path).unwrap();
    }

    #[test]
    fn valid_images_pass() {
        let dir = tempfile::tempdir().unwrap();
        let png = dir.path().join("ok.png");
        let jpg = dir.path().join("ok.jpg");
        write_png(&png);
        RgbImage::from_pixel(8, 8, Rgb([10, 200, 10])).save(&jpg).unwrap();

        assert!(verify_image(&png).is_ok());
        assert!(verify_image(&jpg).is_ok());
    }

    #[test]
    fn garbage_and_truncated_files_fail() {
        let dir = tempfile::tempdir().unwrap();

        let garbage = dir.path().join("garbage.jpg");
        fs::write(&garbage, b"definitely not an image").unwrap();
        assert!(verify_image(&garbage).is_err());

        let good = dir.path().join("good.png");
        write_png(&good);
        let bytes = fs::read(&good).unwrap();
        let truncated = dir.path().join("truncated.png");
        fs::write(&truncated, &bytes[..bytes.len() / 2]).unwrap();
        assert!(verify_image(&truncated).is_err());

        assert!(verify_image(&dir.path().join("missing.png")).is_err());
    }

    #[test]
    fn flipping_the_signature_byte_is_detected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("flipped.png");
        write_png(&path);

        let mut bytes = fs::read(&path).unwrap();
        bytes[0] ^= 0xFF;
        fs::write(&path, &bytes).unwrap();

        assert!(verify_image(&path).is_err());
    }

    #[test]
    fn collects_every_corrupted_file_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let good = dir.path().join("good.png");
        let bad_a = dir.path().join("bad_a.jpg");
        let bad_b = dir.path().join("bad_b.png");
        write_png(&good);
        fs::write(&bad_a, b"nope").unwrap();
        fs::write(&bad_b, b"").unwrap();

        let mut scan = ScanResult::new(["Fresh", "Rotten"]);
        scan.push("Fresh", bad_a.clone());
        scan.push("Fresh", good.clone());
        scan.push("Rotten", bad_b.clone());

        let sink = MemorySink::new();
        let corrupted = IntegrityChecker::new(&sink).check_integrity(&scan);

        assert_eq!(corrupted, vec![bad_a, bad_b]);
        assert!(good.exists());
        assert!(sink.events().contains(&IngestEvent::IntegrityFinished {
            checked: 3,
            corrupted: 2,
        }));
    }

    #[test]
    fn empty_scan_reports_nothing_corrupted() {
        let sink = MemorySink::new();
        let corrupted =
            IntegrityChecker::new(&sink).check_integrity(&ScanResult::new(["Fresh", "Rotten"]));
        assert!(corrupted.is_empty());
    }
}

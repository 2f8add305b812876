/// Dataset directory scanning
///
/// This module handles:
/// - Walking `<raw>/<category>/<item>/<label>/` folders (scanner.rs)
/// - Normalizing freshness label folder names (label.rs)
/// - The per-class file listing shared by all pipeline stages (result.rs)

pub mod label;
pub mod result;
pub mod scanner;

pub use label::normalize_label;
pub use result::{ClassImages, ScanResult};
pub use scanner::PathScanner;

use std::path::PathBuf;

/// Image files found for one class
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassImages {
    /// Class label (e.g., "Fresh")
    pub class: String,
    /// Matching image files, in scan order
    pub paths: Vec<PathBuf>,
}

/// Per-class image listing produced by one scan.
///
/// Every configured class is present, in configured order, even when no
/// images were found for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanResult {
    classes: Vec<ClassImages>,
}

impl ScanResult {
    /// Empty listing for the given classes
    pub fn new<I, S>(class_names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            classes: class_names
                .into_iter()
                .map(|class| ClassImages {
                    class: class.into(),
                    paths: Vec::new(),
                })
                .collect(),
        }
    }

    /// Append a file to `class`. Returns false (and drops the path) if the
    /// class is not part of this listing.
    pub fn push(&mut self, class: &str, path: PathBuf) -> bool {
        match self.classes.iter_mut().find(|c| c.class == class) {
            Some(entry) => {
                entry.paths.push(path);
                true
            }
            None => false,
        }
    }

    /// True if `class` is one of the listed classes
    pub fn contains_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c.class == class)
    }

    /// Files for `class`; empty for unknown classes
    pub fn images(&self, class: &str) -> &[PathBuf] {
        self.classes
            .iter()
            .find(|c| c.class == class)
            .map(|c| c.paths.as_slice())
            .unwrap_or(&[])
    }

    /// Number of files for `class`
    pub fn count(&self, class: &str) -> usize {
        self.images(class).len()
    }

    /// Total number of files across all classes
    pub fn total(&self) -> usize {
        self.classes.iter().map(|c| c.paths.len()).sum()
    }

    /// Classes in configured order
    pub fn iter(&self) -> impl Iterator<Item = &ClassImages> {
        self.classes.iter()
    }

    /// Every file, class by class
    pub fn all_paths(&self) -> impl Iterator<Item = &PathBuf> {
        self.classes.iter().flat_map(|c| c.paths.iter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_class_present_even_when_empty() {
        let scan = ScanResult::new(["Fresh", "Rotten"]);
        assert!(scan.contains_class("Fresh"));
        assert!(scan.contains_class("Rotten"));
        assert_eq!(scan.count("Rotten"), 0);
        assert_eq!(scan.total(), 0);
    }

    #[test]
    fn push_only_accepts_known_classes() {
        let mut scan = ScanResult::new(["Fresh", "Rotten"]);
        assert!(scan.push("Fresh", PathBuf::from("a.jpg")));
        assert!(scan.push("Rotten", PathBuf::from("b.png")));
        assert!(scan.push("Fresh", PathBuf::from("c.bmp")));
        assert!(!scan.push("Stale", PathBuf::from("d.jpg")));

        assert_eq!(scan.count("Fresh"), 2);
        assert_eq!(scan.count("Stale"), 0);
        assert_eq!(scan.total(), 3);

        let order: Vec<_> = scan.all_paths().map(|p| p.to_string_lossy().into_owned()).collect();
        assert_eq!(order, vec!["a.jpg", "c.bmp", "b.png"]);
    }
}

/// Normalize a folder name into a class label.
///
/// Trims surrounding whitespace, uppercases the first character and
/// lowercases the rest, so `fresh`, `FRESH` and ` fReSh ` all become
/// `Fresh`. `Fresh1` or `Not fresh` stay distinct.
pub fn normalize_label(name: &str) -> String {
    let trimmed = name.trim();
    let mut chars = trimmed.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}

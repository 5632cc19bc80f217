//! Field Extractor

use regex::Regex;

/// First capture group of the first line matching `pattern`.
pub fn find_first<S: AsRef<str>>(pattern: &Regex, lines: &[S]) -> Option<String> {
    lines.iter().find_map(|line| {
        pattern
            .captures(line.as_ref())
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().to_string())
    })
}

/// Every capture group of the first line matching `pattern`.
///
/// Groups that did not participate in the match come back as empty strings
/// so positions stay stable.
pub fn find_first_multi<S: AsRef<str>>(pattern: &Regex, lines: &[S]) -> Option<Vec<String>> {
    lines.iter().find_map(|line| {
        pattern.captures(line.as_ref()).map(|caps| {
            caps.iter()
                .skip(1)
                .map(|group| group.map(|m| m.as_str().to_string()).unwrap_or_default())
                .collect()
        })
    })
}

//! Block Splitter
//!
//! `wg show` output has no indentation we can rely on, so sections are
//! recovered by cutting the line stream at every line carrying a marker.

/// Split `lines` into groups that each start at a line containing `marker`.
///
/// A group runs up to, but not including, the next marker line. Lines before
/// the first marker belong to no group.
pub fn split_blocks<'a, S: AsRef<str>>(lines: &'a [S], marker: &str) -> Vec<&'a [S]> {
    let starts: Vec<usize> = lines
        .iter()
        .enumerate()
        .filter(|(_, line)| line.as_ref().contains(marker))
        .map(|(index, _)| index)
        .collect();

    starts
        .iter()
        .enumerate()
        .map(|(i, &start)| {
            let end = starts.get(i + 1).copied().unwrap_or(lines.len());
            &lines[start..end]
        })
        .collect()
}

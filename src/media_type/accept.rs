use tracing::debug;

use super::core::{split_quoted, MediaType};

/// Parse an `Accept` header into media ranges, most preferred first.
///
/// Malformed entries are skipped, `q=0` entries are dropped and entries with
/// equal quality keep their header order. An empty header yields an empty list;
/// callers treat that as `*/*`.
#[must_use]
pub fn parse_accept(header: &str) -> Vec<MediaType> {
    let mut ranges: Vec<MediaType> = split_quoted(header, ',')
        .into_iter()
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .filter_map(|entry| match MediaType::parse(entry) {
            Ok(range) => Some(range),
            Err(err) => {
                debug!(entry = %entry, error = %err, "Skipping malformed accept entry");
                None
            }
        })
        .filter(|range| range.quality() > 0.0)
        .collect();
    ranges.sort_by(|a, b| b.quality().total_cmp(&a.quality()));
    ranges
}

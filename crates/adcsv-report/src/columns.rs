//! Dynamic CSV header discovery for open-schema records.

use std::collections::HashSet;

use crate::record::FlatRecord;

/// Builds a header list: `always_first`, then every key seen across `records`
/// that is not in `excluded`.
///
/// Discovered keys keep first-seen order (record order, then key order within
/// a record), so repeated exports of the same data yield the same columns.
/// Each column appears once, even if a discovered key repeats a fixed one.
#[must_use]
pub fn discover_columns(
    records: &[FlatRecord],
    always_first: &[&str],
    excluded: &[&str],
) -> Vec<String> {
    let mut seen: HashSet<&str> = always_first.iter().chain(excluded).copied().collect();
    let mut headers: Vec<String> = always_first.iter().map(|h| (*h).to_owned()).collect();

    for record in records {
        for key in record.keys() {
            if seen.insert(key) {
                headers.push(key.to_owned());
            }
        }
    }

    headers
}

//! Cloud bucket mapping
//!
//! Maps counted tags into a fixed set of buckets (css classes, font sizes)
//! by each count's linear position within the observed range. Pure; any
//! rendering stays with the caller.

use super::types::TagCount;

/// Assign each tag to one of `buckets` by its count.
///
/// The observed count range is split linearly across the buckets, highest
/// count landing in the last bucket. When every count ties, or there is a
/// single tag, everything maps to the lowest bucket. An empty bucket slice
/// yields no assignments.
pub fn tag_cloud<'a, T>(counts: &'a [TagCount], buckets: &'a [T]) -> Vec<(&'a TagCount, &'a T)> {
    if counts.is_empty() || buckets.is_empty() {
        return Vec::new();
    }

    let min = counts.iter().map(|c| c.count).min().unwrap_or(0);
    let max = counts.iter().map(|c| c.count).max().unwrap_or(0);
    let divisor = (max - min) / buckets.len() as u64 + 1;

    counts
        .iter()
        .map(|c| {
            let idx = ((c.count - min) / divisor) as usize;
            (c, &buckets[idx])
        })
        .collect()
}

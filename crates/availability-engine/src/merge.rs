//! Coalesce overlapping opening windows.
//!
//! Two windows are merged when the end of either one falls inside the other,
//! bounds included, so windows that merely touch (`09:00-10:00` and
//! `10:00-11:00`) become one. Merging repeats until no pair qualifies.

use crate::time::TimeRange;

/// Whether two windows should be merged: the end of one lies inside the other.
pub fn ranges_overlap(a: &TimeRange, b: &TimeRange) -> bool {
    a.contains(b.to) || b.contains(a.to)
}

/// The smallest window covering both `a` and `b`.
fn span(a: &TimeRange, b: &TimeRange) -> TimeRange {
    TimeRange::new(a.from.min(b.from), a.to.max(b.to))
}

/// Merge overlapping or touching windows until a fixed point is reached.
///
/// The surviving window of each merge keeps its position, so the output
/// follows the order in which windows were first configured rather than
/// being sorted. Merging an already-merged list returns it unchanged.
pub fn merge_ranges(mut ranges: Vec<TimeRange>) -> Vec<TimeRange> {
    // Every merge removes one window, so this terminates.
    'scan: loop {
        for i in 0..ranges.len() {
            for j in 0..ranges.len() {
                if i != j && ranges_overlap(&ranges[i], &ranges[j]) {
                    ranges[i] = span(&ranges[i], &ranges[j]);
                    ranges.remove(j);
                    continue 'scan;
                }
            }
        }
        break;
    }

    ranges
}

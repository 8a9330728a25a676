//! Per-weekday opening windows for display.
//!
//! Gathers the windows of every rule for each weekday, shortens each window's
//! end by the booking offset, and merges what overlaps. The result is what a
//! calendar widget shows as "open hours" for a typical week.

use std::collections::BTreeMap;

use chrono::Weekday;
use serde::Serialize;
use tracing::debug;

use crate::merge::merge_ranges;
use crate::rule::{Rule, WEEK};
use crate::time::TimeRange;

/// Merged windows keyed by weekday index, `0` = Monday through `6` = Sunday.
///
/// Empty when no real rule is configured; otherwise every index is present,
/// possibly with no windows.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct WeeklyRanges {
    days: BTreeMap<u8, Vec<TimeRange>>,
}

impl WeeklyRanges {
    /// Build the weekly view for `rules`, subtracting `offset_minutes` from
    /// every window end before merging.
    pub fn build(rules: &[Rule], offset_minutes: u32) -> Self {
        if rules.iter().all(Rule::is_unrestricted) {
            return Self::default();
        }

        debug!(rules = rules.len(), offset_minutes, "computing weekly ranges");

        let days = (0u8..7)
            .map(|index| {
                let weekday = weekday_at(index);
                let collected = rules
                    .iter()
                    .filter_map(Rule::schedule)
                    .flat_map(|schedule| schedule.ranges(weekday))
                    .map(|range| TimeRange::new(range.from, range.to.sub_minutes(offset_minutes)))
                    .collect();
                (index, merge_ranges(collected))
            })
            .collect();

        Self { days }
    }

    /// True when there is no weekday data at all.
    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }

    /// Windows for weekday `index` (`0` = Monday). Empty for out-of-range
    /// indices.
    pub fn day(&self, index: u8) -> &[TimeRange] {
        self.days.get(&index).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn weekday(&self, weekday: Weekday) -> &[TimeRange] {
        self.day(weekday.num_days_from_monday() as u8)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Weekday, &[TimeRange])> {
        self.days
            .iter()
            .map(|(&index, ranges)| (weekday_at(index), ranges.as_slice()))
    }
}

fn weekday_at(index: u8) -> Weekday {
    WEEK[usize::from(index) % 7]
}

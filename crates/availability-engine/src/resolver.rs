//! Availability resolution: is a resource bookable on a date, at a time, for a
//! duration?
//!
//! An [`AvailabilityResolver`] owns an ordered list of [`Rule`]s and a booking
//! offset (buffer minutes). For every queried date it first narrows the rules
//! down to the ones that govern that date:
//!
//! 1. date-bounded rules whose period covers the date, if there are any;
//! 2. otherwise the always-on rules;
//! 3. otherwise a single [`Rule::Unrestricted`], so the set is never empty.
//!
//! The narrowed set is memoized per calendar day for the resolver's lifetime.
//!
//! `00:00` is both the start of a day and the end of the previous one, so a
//! point or duration check at `00:00` also succeeds when the previous day is
//! bookable at `24:00`. Overnight intervals are split at midnight and both
//! halves must be covered.

use std::collections::HashMap;
use std::sync::{Arc, OnceLock, PoisonError, RwLock};

use chrono::{NaiveDate, NaiveDateTime};
use tracing::{debug, trace};

use crate::error::Result;
use crate::rule::{Rule, RuleRecord, RulesDocument};
use crate::time::{TimeInterval, TimeOfDay};
use crate::weekly::WeeklyRanges;

/// Answers availability queries over a fixed set of rules.
///
/// Queries take `&self`; the per-date cache and the weekly view are filled
/// lazily behind interior locks, so a resolver can be shared for reads.
#[derive(Debug)]
pub struct AvailabilityResolver {
    rules: Vec<Rule>,
    offset_minutes: u32,
    subsets: RwLock<HashMap<NaiveDate, Arc<[Rule]>>>,
    weekly: OnceLock<WeeklyRanges>,
}

impl AvailabilityResolver {
    /// Create a resolver. An empty rule list is replaced by a single
    /// [`Rule::Unrestricted`], which accepts everything.
    pub fn new(rules: Vec<Rule>, offset_minutes: u32) -> Self {
        let rules = if rules.is_empty() {
            debug!("no availability rules configured, bookings are unrestricted");
            vec![Rule::Unrestricted]
        } else {
            rules
        };
        Self {
            rules,
            offset_minutes,
            subsets: RwLock::new(HashMap::new()),
            weekly: OnceLock::new(),
        }
    }

    /// Create a resolver from raw records, keeping their order.
    ///
    /// # Errors
    /// Returns the first record conversion error, see [`Rule::try_from`].
    pub fn from_records(
        records: impl IntoIterator<Item = RuleRecord>,
        offset_minutes: u32,
    ) -> Result<Self> {
        let rules = records
            .into_iter()
            .map(Rule::try_from)
            .collect::<Result<Vec<_>>>()?;
        Ok(Self::new(rules, offset_minutes))
    }

    /// Create a resolver from a parsed [`RulesDocument`], using its offset.
    pub fn from_document(document: &RulesDocument) -> Result<Self> {
        Ok(Self::new(document.to_rules()?, document.offset_minutes))
    }

    /// The configured rules. Holds a single [`Rule::Unrestricted`] when none
    /// were given.
    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn offset(&self) -> u32 {
        self.offset_minutes
    }

    /// Change the booking offset. The weekly view depends on it and is
    /// recomputed on next access; the per-date rule subsets do not.
    pub fn set_offset(&mut self, offset_minutes: u32) {
        self.offset_minutes = offset_minutes;
        self.weekly = OnceLock::new();
    }

    /// The rules that govern `date`. Never empty.
    pub fn resolve_applicable(&self, date: NaiveDate) -> Arc<[Rule]> {
        if let Some(hit) = self
            .subsets
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&date)
        {
            trace!(%date, "applicable rules served from cache");
            return Arc::clone(hit);
        }

        let resolved = self.compute_applicable(date);
        let mut subsets = self.subsets.write().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(subsets.entry(date).or_insert(resolved))
    }

    fn compute_applicable(&self, date: NaiveDate) -> Arc<[Rule]> {
        let bounded: Vec<Rule> = self
            .rules
            .iter()
            .filter(|rule| !rule.is_always_on() && rule.covers_period(date))
            .cloned()
            .collect();
        if !bounded.is_empty() {
            debug!(%date, rules = bounded.len(), "date-bounded rules apply");
            return bounded.into();
        }

        let always: Vec<Rule> = self
            .rules
            .iter()
            .filter(|rule| rule.is_always_on())
            .cloned()
            .collect();
        if !always.is_empty() {
            debug!(%date, rules = always.len(), "always-on rules apply");
            return always.into();
        }

        debug!(%date, "no rule covers date, falling back to unrestricted");
        Arc::from([Rule::Unrestricted])
    }

    /// Whether any rule governing `date` is active on it.
    pub fn is_valid_date(&self, date: NaiveDate) -> bool {
        self.resolve_applicable(date)
            .iter()
            .any(|rule| rule.is_valid_date(date))
    }

    /// Whether `time` on `date` is bookable.
    ///
    /// With a non-zero offset the check becomes "is `[time, time + offset]`
    /// bookable". At `00:00` the previous day is also tried at `24:00`.
    pub fn is_valid_date_time(&self, date: NaiveDate, time: TimeOfDay) -> bool {
        let valid = self.is_valid_time(date, time);
        if valid || !time.is_midnight() {
            return valid;
        }
        date.pred_opt()
            .is_some_and(|yesterday| self.is_valid_time(yesterday, TimeOfDay::END_OF_DAY))
    }

    /// [`is_valid_date_time`](Self::is_valid_date_time) for a timestamp,
    /// truncated to the minute.
    pub fn is_valid_at(&self, at: NaiveDateTime) -> bool {
        self.is_valid_date_time(at.date(), at.time().into())
    }

    /// Whether a booking of `duration_minutes` starting at `time` on `date` is
    /// fully covered. At `00:00` the booking may also be anchored at `24:00`
    /// of the previous day.
    ///
    /// A booking may continue into the next day but not beyond it; one that
    /// would end after `24:00` of the following day is never valid.
    pub fn is_valid_date_time_duration(
        &self,
        date: NaiveDate,
        time: TimeOfDay,
        duration_minutes: u32,
    ) -> bool {
        let valid = self.is_valid_time_duration(date, time, duration_minutes);
        if valid || !time.is_midnight() {
            return valid;
        }
        date.pred_opt().is_some_and(|yesterday| {
            self.is_valid_time_duration(yesterday, TimeOfDay::END_OF_DAY, duration_minutes)
        })
    }

    /// Whether `interval` starting on `date` is covered.
    ///
    /// A same-day interval must fit entirely inside one window of one
    /// governing rule. An overnight interval is split at midnight and both
    /// `[from, 23:59]` on `date` and `[00:00, to]` on the next day must be
    /// covered, each on its own.
    pub fn is_valid_time_interval(&self, date: NaiveDate, interval: TimeInterval) -> bool {
        if let Some((head, tail)) = interval.split_at_midnight() {
            let Some(tomorrow) = date.succ_opt() else {
                return false;
            };
            return head.is_none_or(|head| self.is_valid_time_interval(date, head))
                && self.is_valid_time_interval(tomorrow, tail);
        }

        self.resolve_applicable(date)
            .iter()
            .any(|rule| rule.is_valid_date(date) && rule.is_valid_time_interval(date, &interval))
    }

    fn is_valid_time(&self, date: NaiveDate, time: TimeOfDay) -> bool {
        if self.offset_minutes != 0 {
            return self.is_valid_time_duration(date, time, self.offset_minutes);
        }
        self.resolve_applicable(date)
            .iter()
            .any(|rule| rule.is_valid_date(date) && rule.is_valid_time(date, time))
    }

    fn is_valid_time_duration(&self, date: NaiveDate, time: TimeOfDay, duration_minutes: u32) -> bool {
        match TimeInterval::starting_at(time, duration_minutes) {
            Some(interval) => self.is_valid_time_interval(date, interval),
            None => {
                debug!(%date, %time, duration_minutes, "booking runs past the following day");
                false
            }
        }
    }

    /// Merged opening windows per weekday with the offset taken off every
    /// window end. Computed on first access.
    pub fn weekly_ranges(&self) -> &WeeklyRanges {
        self.weekly
            .get_or_init(|| WeeklyRanges::build(&self.rules, self.offset_minutes))
    }

    /// Earliest window start and latest window end across every rule and
    /// weekday. Windows closing at midnight end at `24:00`, so that is the
    /// latest end reported for them.
    ///
    /// Returns `None` when no rule has any window.
    pub fn time_span(&self) -> Option<(TimeOfDay, TimeOfDay)> {
        let earliest = self
            .rules
            .iter()
            .flat_map(|rule| rule.ranges())
            .map(|range| range.from)
            .min()?;
        let latest = self
            .rules
            .iter()
            .flat_map(|rule| rule.ranges())
            .map(|range| range.to)
            .max()?;
        Some((earliest, latest))
    }
}

//! Availability rules: weekly opening windows, optionally bounded by dates.
//!
//! A [`Rule`] is either always active, active between two calendar dates, or
//! the permissive [`Rule::Unrestricted`] placeholder that stands in when no
//! rule is configured. Rules are immutable once built.
//!
//! Raw input arrives as [`RuleRecord`]s (usually inside a [`RulesDocument`]),
//! already cleaned by whatever edits them. Converting a record into a rule is
//! the only fallible step in the crate.

use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

use crate::error::{AvailabilityError, Result};
use crate::time::{TimeInterval, TimeOfDay, TimeRange};

pub(crate) const WEEK: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

/// Opening windows per weekday.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WeekSchedule {
    days: [Vec<TimeRange>; 7],
}

impl WeekSchedule {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style variant of [`WeekSchedule::insert`] for several ranges.
    pub fn with(mut self, weekday: Weekday, ranges: impl IntoIterator<Item = TimeRange>) -> Self {
        for range in ranges {
            self.insert(weekday, range);
        }
        self
    }

    /// Add a window for `weekday`. A window ending at `00:00` closes at
    /// midnight and is stored as ending at `24:00`.
    pub fn insert(&mut self, weekday: Weekday, range: TimeRange) {
        let range = range.normalized();
        debug_assert!(range.from <= range.to, "window {range} ends before it starts");
        self.days[weekday.num_days_from_monday() as usize].push(range);
    }

    pub fn ranges(&self, weekday: Weekday) -> &[TimeRange] {
        &self.days[weekday.num_days_from_monday() as usize]
    }

    /// A weekday is open when it has at least one window.
    pub fn is_open(&self, weekday: Weekday) -> bool {
        !self.ranges(weekday).is_empty()
    }

    /// Weekdays Monday through Sunday with their windows.
    pub fn iter(&self) -> impl Iterator<Item = (Weekday, &[TimeRange])> {
        WEEK.iter().map(move |&day| (day, self.ranges(day)))
    }

    /// Every window of every weekday.
    pub fn all_ranges(&self) -> impl Iterator<Item = &TimeRange> {
        self.days.iter().flatten()
    }
}

/// One configured availability window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rule {
    /// Active on every date.
    AlwaysOn { schedule: WeekSchedule },
    /// Active between `from` and `to`, both inclusive. A missing bound leaves
    /// that side open.
    DateBounded {
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
        schedule: WeekSchedule,
    },
    /// No restriction configured: every date, time and interval is valid.
    Unrestricted,
}

impl Rule {
    pub fn always_on(schedule: WeekSchedule) -> Self {
        Rule::AlwaysOn { schedule }
    }

    pub fn date_bounded(
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
        schedule: WeekSchedule,
    ) -> Self {
        Rule::DateBounded { from, to, schedule }
    }

    /// Whether the rule ignores calendar dates. True for the unrestricted
    /// placeholder as well.
    pub fn is_always_on(&self) -> bool {
        !matches!(self, Rule::DateBounded { .. })
    }

    pub fn is_unrestricted(&self) -> bool {
        matches!(self, Rule::Unrestricted)
    }

    pub fn schedule(&self) -> Option<&WeekSchedule> {
        match self {
            Rule::AlwaysOn { schedule } | Rule::DateBounded { schedule, .. } => Some(schedule),
            Rule::Unrestricted => None,
        }
    }

    /// Whether `date` lies inside the rule's period, regardless of weekday.
    pub fn covers_period(&self, date: NaiveDate) -> bool {
        match self {
            Rule::AlwaysOn { .. } | Rule::Unrestricted => true,
            Rule::DateBounded { from, to, .. } => {
                from.is_none_or(|from| from <= date) && to.is_none_or(|to| date <= to)
            }
        }
    }

    /// Whether the rule is active on `date`: inside its period and open on
    /// that weekday.
    pub fn is_valid_date(&self, date: NaiveDate) -> bool {
        match self.schedule() {
            None => true,
            Some(schedule) => self.covers_period(date) && schedule.is_open(date.weekday()),
        }
    }

    /// Whether `time` falls inside one of the windows for `date`'s weekday.
    /// The rule's period is not checked.
    pub fn is_valid_time(&self, date: NaiveDate, time: TimeOfDay) -> bool {
        match self.schedule() {
            None => true,
            Some(schedule) => schedule
                .ranges(date.weekday())
                .iter()
                .any(|range| range.contains(time)),
        }
    }

    /// Whether a single window for `date`'s weekday contains the whole of
    /// `interval`. The rule's period is not checked.
    pub fn is_valid_time_interval(&self, date: NaiveDate, interval: &TimeInterval) -> bool {
        match self.schedule() {
            None => true,
            Some(schedule) => schedule
                .ranges(date.weekday())
                .iter()
                .any(|range| range.contains_interval(interval)),
        }
    }

    /// Every window of the rule across all weekdays.
    pub fn ranges(&self) -> impl Iterator<Item = &TimeRange> {
        self.schedule().into_iter().flat_map(|schedule| schedule.all_ranges())
    }
}

/// Raw rule as produced by the editing side.
///
/// `days` is keyed by ISO weekday number, `1` = Monday through `7` = Sunday.
/// A window ending at `00:00` is read as closing at midnight (`24:00`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleRecord {
    #[serde(default)]
    pub always: bool,
    #[serde(default)]
    pub from_date: Option<NaiveDate>,
    #[serde(default)]
    pub to_date: Option<NaiveDate>,
    #[serde(default)]
    pub days: BTreeMap<u8, Vec<TimeRange>>,
}

impl RuleRecord {
    /// Always-on records carry no dates.
    pub fn normalize(mut self) -> Self {
        if self.always {
            self.from_date = None;
            self.to_date = None;
        }
        self
    }
}

impl TryFrom<RuleRecord> for Rule {
    type Error = AvailabilityError;

    fn try_from(record: RuleRecord) -> Result<Self> {
        let record = record.normalize();

        let mut schedule = WeekSchedule::new();
        for (key, ranges) in record.days {
            let weekday = weekday_from_iso(key)?;
            for range in ranges.into_iter().map(TimeRange::normalized) {
                if range.from > range.to {
                    return Err(AvailabilityError::Configuration(format!(
                        "window {} on weekday {} ends before it starts",
                        range, key
                    )));
                }
                schedule.insert(weekday, range);
            }
        }

        if record.always {
            return Ok(Rule::always_on(schedule));
        }
        if let (Some(from), Some(to)) = (record.from_date, record.to_date) {
            if from > to {
                return Err(AvailabilityError::Configuration(format!(
                    "date range {} to {} is empty",
                    from, to
                )));
            }
        }
        Ok(Rule::date_bounded(record.from_date, record.to_date, schedule))
    }
}

fn weekday_from_iso(key: u8) -> Result<Weekday> {
    match key {
        1..=7 => Ok(WEEK[usize::from(key - 1)]),
        other => Err(AvailabilityError::InvalidWeekday(other.to_string())),
    }
}

/// A full rules configuration: the buffer offset plus the ordered records.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RulesDocument {
    #[serde(default)]
    pub offset_minutes: u32,
    #[serde(default)]
    pub rules: Vec<RuleRecord>,
}

impl RulesDocument {
    /// Parse a JSON rules document.
    ///
    /// # Errors
    /// Returns `AvailabilityError::Configuration` if the JSON does not match
    /// the document shape, including malformed dates and times.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| AvailabilityError::Configuration(e.to_string()))
    }

    /// Convert every record into a [`Rule`], keeping their order.
    pub fn to_rules(&self) -> Result<Vec<Rule>> {
        self.rules.iter().cloned().map(Rule::try_from).collect()
    }
}

//! Tests for rules and the raw record format.

use availability_engine::{
    AvailabilityError, Rule, RuleRecord, RulesDocument, TimeInterval, TimeOfDay, TimeRange,
    WeekSchedule,
};
use chrono::{NaiveDate, Weekday};

// ── Helpers ─────────────────────────────────────────────────────────────────

fn t(s: &str) -> TimeOfDay {
    s.parse().unwrap()
}

fn d(s: &str) -> NaiveDate {
    s.parse().unwrap()
}

fn range(from: &str, to: &str) -> TimeRange {
    TimeRange::new(t(from), t(to))
}

fn weekdays_nine_to_five() -> WeekSchedule {
    [Weekday::Mon, Weekday::Tue, Weekday::Wed, Weekday::Thu, Weekday::Fri]
        .into_iter()
        .fold(WeekSchedule::new(), |schedule, day| {
            schedule.with(day, [range("09:00", "17:00")])
        })
}

// ── Rule queries ────────────────────────────────────────────────────────────

#[test]
fn always_on_rule_is_valid_on_open_weekdays_only() {
    let rule = Rule::always_on(weekdays_nine_to_five());

    assert!(rule.is_always_on());
    assert!(rule.is_valid_date(d("2024-01-08"))); // Monday
    assert!(!rule.is_valid_date(d("2024-01-13"))); // Saturday
    assert!(rule.covers_period(d("2024-01-13")));
}

#[test]
fn date_bounded_rule_respects_inclusive_period() {
    let rule = Rule::date_bounded(
        Some(d("2024-01-01")),
        Some(d("2024-01-31")),
        weekdays_nine_to_five(),
    );

    assert!(!rule.is_always_on());
    assert!(rule.covers_period(d("2024-01-01")));
    assert!(rule.covers_period(d("2024-01-31")));
    assert!(!rule.covers_period(d("2023-12-31")));
    assert!(!rule.covers_period(d("2024-02-01")));

    assert!(rule.is_valid_date(d("2024-01-31"))); // Wednesday
    assert!(!rule.is_valid_date(d("2024-02-05"))); // Monday, outside period
}

#[test]
fn missing_bound_leaves_period_open() {
    let rule = Rule::date_bounded(Some(d("2024-06-01")), None, weekdays_nine_to_five());
    assert!(rule.covers_period(d("2030-01-01")));
    assert!(!rule.covers_period(d("2024-05-31")));
}

#[test]
fn time_checks_use_the_dates_weekday() {
    let schedule = WeekSchedule::new()
        .with(Weekday::Mon, [range("09:00", "12:00"), range("14:00", "18:00")])
        .with(Weekday::Tue, [range("10:00", "11:00")]);
    let rule = Rule::always_on(schedule);
    let monday = d("2024-01-08");
    let tuesday = d("2024-01-09");

    assert!(rule.is_valid_time(monday, t("09:00")));
    assert!(rule.is_valid_time(monday, t("15:00")));
    assert!(!rule.is_valid_time(monday, t("13:00")));
    assert!(!rule.is_valid_time(tuesday, t("15:00")));

    let interval = TimeInterval::new(t("11:00"), t("15:00"));
    assert!(
        !rule.is_valid_time_interval(monday, &interval),
        "an interval spanning the lunch gap is not inside a single window"
    );
    assert!(rule.is_valid_time_interval(monday, &TimeInterval::new(t("14:30"), t("18:00"))));
}

#[test]
fn unrestricted_rule_accepts_everything() {
    let rule = Rule::Unrestricted;
    let date = d("2024-01-13");

    assert!(rule.is_unrestricted());
    assert!(rule.is_valid_date(date));
    assert!(rule.is_valid_time(date, t("03:00")));
    assert!(rule.is_valid_time_interval(date, &TimeInterval::new(t("00:00"), t("24:00"))));
    assert_eq!(rule.ranges().count(), 0);
}

// ── Record conversion ───────────────────────────────────────────────────────

#[test]
fn record_converts_into_date_bounded_rule() {
    let json = r#"{
        "always": false,
        "from_date": "2024-01-01",
        "to_date": "2024-01-31",
        "days": { "1": [{ "from": "09:00", "to": "17:00" }] }
    }"#;
    let record: RuleRecord = serde_json::from_str(json).unwrap();
    let rule = Rule::try_from(record).unwrap();

    let expected = Rule::date_bounded(
        Some(d("2024-01-01")),
        Some(d("2024-01-31")),
        WeekSchedule::new().with(Weekday::Mon, [range("09:00", "17:00")]),
    );
    assert_eq!(rule, expected);
}

#[test]
fn always_on_record_drops_its_dates() {
    let record = RuleRecord {
        always: true,
        from_date: Some(d("2024-01-01")),
        to_date: Some(d("2024-01-31")),
        ..RuleRecord::default()
    };

    let normalized = record.clone().normalize();
    assert_eq!(normalized.from_date, None);
    assert_eq!(normalized.to_date, None);

    let rule = Rule::try_from(record).unwrap();
    assert!(matches!(rule, Rule::AlwaysOn { .. }));
    assert!(rule.covers_period(d("2030-01-01")));
}

#[test]
fn window_ending_at_midnight_closes_at_end_of_day() {
    let json = r#"{ "always": true, "days": { "7": [{ "from": "18:00", "to": "00:00" }] } }"#;
    let rule = Rule::try_from(serde_json::from_str::<RuleRecord>(json).unwrap()).unwrap();

    let sunday = d("2024-01-07");
    assert!(rule.is_valid_time(sunday, TimeOfDay::END_OF_DAY));
    assert_eq!(
        rule.schedule().unwrap().ranges(Weekday::Sun),
        &[TimeRange::new(t("18:00"), TimeOfDay::END_OF_DAY)]
    );
}

#[test]
fn schedule_stores_a_midnight_close_as_end_of_day() {
    let mut schedule = WeekSchedule::new().with(Weekday::Sun, [range("18:00", "00:00")]);
    schedule.insert(Weekday::Mon, range("00:00", "00:00"));

    assert_eq!(
        schedule.ranges(Weekday::Sun),
        &[TimeRange::new(t("18:00"), TimeOfDay::END_OF_DAY)]
    );
    assert_eq!(
        schedule.ranges(Weekday::Mon),
        &[TimeRange::new(TimeOfDay::MIDNIGHT, TimeOfDay::END_OF_DAY)]
    );
    assert_eq!(range("09:00", "17:00").normalized(), range("09:00", "17:00"));
}

#[test]
fn record_rejects_unknown_weekday() {
    let json = r#"{ "always": true, "days": { "8": [{ "from": "09:00", "to": "10:00" }] } }"#;
    let record: RuleRecord = serde_json::from_str(json).unwrap();
    assert_eq!(
        Rule::try_from(record),
        Err(AvailabilityError::InvalidWeekday("8".to_string()))
    );
}

#[test]
fn record_rejects_backwards_window_and_empty_period() {
    let backwards = RuleRecord {
        always: true,
        days: [(1, vec![range("17:00", "09:00")])].into_iter().collect(),
        ..RuleRecord::default()
    };
    assert!(matches!(
        Rule::try_from(backwards),
        Err(AvailabilityError::Configuration(_))
    ));

    let empty_period = RuleRecord {
        from_date: Some(d("2024-02-01")),
        to_date: Some(d("2024-01-01")),
        ..RuleRecord::default()
    };
    assert!(matches!(
        Rule::try_from(empty_period),
        Err(AvailabilityError::Configuration(_))
    ));
}

// ── Documents ───────────────────────────────────────────────────────────────

#[test]
fn document_parses_offset_and_rules_in_order() {
    let json = r#"{
        "offset_minutes": 15,
        "rules": [
            { "always": true, "days": { "1": [{ "from": "08:00", "to": "12:00" }] } },
            { "from_date": "2024-12-24", "to_date": "2024-12-26" }
        ]
    }"#;
    let document = RulesDocument::from_json(json).unwrap();
    assert_eq!(document.offset_minutes, 15);

    let rules = document.to_rules().unwrap();
    assert_eq!(rules.len(), 2);
    assert!(rules[0].is_always_on());
    assert!(!rules[1].is_always_on());
}

#[test]
fn document_defaults_to_no_offset_and_no_rules() {
    let document = RulesDocument::from_json("{}").unwrap();
    assert_eq!(document, RulesDocument::default());
}

#[test]
fn malformed_document_is_a_configuration_error() {
    let json = r#"{ "rules": [{ "always": true, "days": { "1": [{ "from": "25:00", "to": "26:00" }] } }] }"#;
    assert!(matches!(
        RulesDocument::from_json(json),
        Err(AvailabilityError::Configuration(_))
    ));
    let bad_date = r#"{ "rules": [{ "from_date": "2024-02-30", "days": {} }] }"#;
    assert!(matches!(
        RulesDocument::from_json(bad_date),
        Err(AvailabilityError::Configuration(_))
    ));
}

//! Cross-checks the engine against the `rrule` crate for rule shapes where both
//! agree on semantics (no month-end clamping, no COUNT/UNTIL bookkeeping).

use chrono::{DateTime, TimeZone, Utc};
use planner_core::recurrence::{compute_next_occurrence, RecurrenceSpec};
use proptest::prelude::*;
use rrule::{RRuleSet, Tz};

fn oracle_next(rule: &str, anchor: DateTime<Utc>) -> Option<DateTime<Utc>> {
    let text = format!("DTSTART:{}\nRRULE:{}", anchor.format("%Y%m%dT%H%M%SZ"), rule);
    let set: RRuleSet = text.parse().ok()?;
    set.into_iter()
        .find(|occurrence| *occurrence > anchor.with_timezone(&Tz::UTC))
        .map(|dt| dt.with_timezone(&Utc))
}

fn arb_anchor() -> impl Strategy<Value = DateTime<Utc>> {
    (2000i32..2030, 1u32..=12, 1u32..=28, 0u32..24)
        .prop_map(|(y, m, d, h)| Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap())
}

fn arb_weekdays() -> impl Strategy<Value = String> {
    prop::sample::subsequence(vec!["MO", "TU", "WE", "TH", "FR", "SA", "SU"], 1..=7)
        .prop_map(|days| days.join(","))
}

fn arb_rule() -> impl Strategy<Value = String> {
    prop_oneof![
        (1u32..=5).prop_map(|i| format!("FREQ=DAILY;INTERVAL={}", i)),
        (1u32..=3).prop_map(|i| format!("FREQ=WEEKLY;INTERVAL={}", i)),
        (1u32..=3, arb_weekdays()).prop_map(|(i, days)| format!("FREQ=WEEKLY;INTERVAL={};BYDAY={}", i, days)),
        (1i8..=28).prop_map(|d| format!("FREQ=MONTHLY;BYMONTHDAY={}", d)),
        arb_weekdays().prop_map(|days| format!("FREQ=MONTHLY;BYDAY={}", days)),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn engine_agrees_with_rrule(rule in arb_rule(), anchor in arb_anchor()) {
        let ours = compute_next_occurrence(&RecurrenceSpec::Custom(rule.clone()), &anchor).unwrap();
        prop_assert_eq!(ours, oracle_next(&rule, anchor), "rule {} anchor {}", rule, anchor);
    }
}

#[test]
fn test_weekdays_preset_matches_rrule_over_a_fortnight() {
    let rule = "FREQ=WEEKLY;BYDAY=MO,TU,WE,TH,FR";
    let mut anchor = Utc.with_ymd_and_hms(2025, 12, 15, 9, 0, 0).unwrap();
    for _ in 0..14 {
        let ours = compute_next_occurrence(
            &RecurrenceSpec::Preset(planner_core::models::RecurrencePreset::Weekdays),
            &anchor,
        )
        .unwrap();
        assert_eq!(ours, oracle_next(rule, anchor));
        anchor = ours.unwrap();
    }
}

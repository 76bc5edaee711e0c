//! Next-occurrence computation for recurring tasks.
//!
//! A task carries either a [`RecurrencePreset`] or a free-form RFC 5545 rule
//! string. Both are lowered to a [`RecurrenceRule`] and run through the same
//! search, which returns the first occurrence strictly after the anchor date.
//!
//! Month overflow: rules without `BY*` filters (every preset, and plain
//! `FREQ=MONTHLY`/`FREQ=YEARLY` strings) clamp to the last day of the target
//! month, so Jan 31 is followed by Feb 28 (or 29) and Feb 29 by Feb 28.
//! Rules with an explicit `BYMONTHDAY` skip months where that day is missing.

mod calendar;
mod rule;

pub use rule::{Frequency, RecurrenceRule, Rfc5545Parser, RuleParser, Until, WeekdaySpec};

use chrono::{DateTime, Datelike, Days, Duration, NaiveDate, NaiveDateTime, TimeZone, Utc, Weekday};
use std::fmt;

use crate::error::RecurrenceError;
use crate::models::RecurrencePreset;

/// Longest day-by-day scan, in days: one full Gregorian cycle.
const MAX_SCAN_DAYS: u64 = 400 * 366;
/// Shortest scan; long enough for a Feb 29 or 53rd-weekday filter to recur.
const MIN_SCAN_DAYS: u64 = 28 * 366;
/// Candidates that fall on wall-clock times a timezone removed outright before
/// the search gives up.
const MAX_SKIPPED_CANDIDATES: u32 = 8;

/// How a task repeats.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RecurrenceSpec {
    Preset(RecurrencePreset),
    Custom(String),
}

impl RecurrenceSpec {
    /// Builds the active specification from a task's two recurrence columns.
    /// A non-blank rule string wins over the preset.
    pub fn from_fields(rule: Option<&str>, preset: Option<RecurrencePreset>) -> Option<Self> {
        match rule.map(str::trim).filter(|r| !r.is_empty()) {
            Some(rule) => Some(RecurrenceSpec::Custom(rule.to_string())),
            None => preset.map(RecurrenceSpec::Preset),
        }
    }
}

impl From<RecurrencePreset> for RecurrenceSpec {
    fn from(preset: RecurrencePreset) -> Self {
        RecurrenceSpec::Preset(preset)
    }
}

impl fmt::Display for RecurrenceSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecurrenceSpec::Preset(preset) => write!(f, "{}", preset),
            RecurrenceSpec::Custom(rule) => f.write_str(rule),
        }
    }
}

impl RecurrencePreset {
    /// The rule this preset stands for.
    pub fn to_rule(self) -> RecurrenceRule {
        match self {
            RecurrencePreset::Daily => RecurrenceRule::new(Frequency::Daily),
            RecurrencePreset::Weekly => RecurrenceRule::new(Frequency::Weekly),
            RecurrencePreset::Weekdays => RecurrenceRule::new(Frequency::Weekly).with_weekdays(&[
                Weekday::Mon,
                Weekday::Tue,
                Weekday::Wed,
                Weekday::Thu,
                Weekday::Fri,
            ]),
            RecurrencePreset::Monthly => RecurrenceRule::new(Frequency::Monthly),
            RecurrencePreset::Yearly => RecurrenceRule::new(Frequency::Yearly),
        }
    }
}

/// Stateless next-occurrence calculator, generic over the rule parser.
#[derive(Debug, Clone, Default)]
pub struct RecurrenceEngine<P = Rfc5545Parser> {
    parser: P,
}

impl RecurrenceEngine {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<P: RuleParser> RecurrenceEngine<P> {
    pub fn with_parser(parser: P) -> Self {
        Self { parser }
    }

    /// Lowers a specification to its rule.
    pub fn normalize(&self, spec: &RecurrenceSpec) -> Result<RecurrenceRule, RecurrenceError> {
        match spec {
            RecurrenceSpec::Preset(preset) => Ok(preset.to_rule()),
            RecurrenceSpec::Custom(rule) => self.parser.parse(rule),
        }
    }

    /// Computes the first occurrence strictly after `anchor`.
    ///
    /// # Returns
    /// * `Ok(Some(next))` - the next occurrence, in the anchor's timezone
    /// * `Ok(None)` - the rule is exhausted (`UNTIL` passed, `COUNT` used up,
    ///   or no date matches the filters)
    /// * `Err(RecurrenceError::Parse)` - the rule string is malformed
    pub fn next_occurrence<Tz: TimeZone>(
        &self,
        spec: &RecurrenceSpec,
        anchor: &DateTime<Tz>,
    ) -> Result<Option<DateTime<Tz>>, RecurrenceError> {
        let rule = self.normalize(spec)?;
        let next = next_after(&rule, anchor);
        tracing::debug!(spec = %spec, anchor = %anchor.naive_local(), next = ?next.as_ref().map(|d| d.naive_local()), "computed next occurrence");
        Ok(next)
    }

    /// Like [`next_occurrence`](Self::next_occurrence), but a malformed rule is
    /// logged and treated as "no further occurrence".
    pub fn next_occurrence_or_none<Tz: TimeZone>(
        &self,
        spec: &RecurrenceSpec,
        anchor: &DateTime<Tz>,
    ) -> Option<DateTime<Tz>> {
        match self.next_occurrence(spec, anchor) {
            Ok(next) => next,
            Err(err) => {
                tracing::warn!(error = %err, "recurrence rule could not be parsed; treating task as non-recurring");
                None
            }
        }
    }

    /// The specification a successor task inherits. Identical to `spec` except
    /// that a `COUNT` limit is reduced by the occurrence just completed.
    pub fn carry_forward(&self, spec: &RecurrenceSpec) -> RecurrenceSpec {
        match spec {
            RecurrenceSpec::Custom(text) => match self.parser.parse(text) {
                Ok(rule) if rule.count.is_some() => {
                    RecurrenceSpec::Custom(rule.consume_occurrence().to_string())
                }
                _ => spec.clone(),
            },
            RecurrenceSpec::Preset(_) => spec.clone(),
        }
    }
}

/// Computes the next occurrence with the default RFC 5545 parser.
pub fn compute_next_occurrence<Tz: TimeZone>(
    spec: &RecurrenceSpec,
    anchor: &DateTime<Tz>,
) -> Result<Option<DateTime<Tz>>, RecurrenceError> {
    RecurrenceEngine::new().next_occurrence(spec, anchor)
}

/// Runs the occurrence search for an already-parsed rule.
///
/// Stepping happens on the anchor's local wall-clock time, so a 10:00 task stays
/// at 10:00 across DST changes. Ambiguous local times take the earlier instant,
/// non-existent ones move forward by an hour. A candidate that still has no
/// instant (a skipped calendar day) is passed over for the one after it.
pub fn next_after<Tz: TimeZone>(rule: &RecurrenceRule, anchor: &DateTime<Tz>) -> Option<DateTime<Tz>> {
    // The anchor is occurrence number one.
    if rule.count.is_some_and(|count| count <= 1) {
        return None;
    }

    let tz = anchor.timezone();
    let mut from = anchor.naive_local();
    let mut skipped = 0;
    let (candidate, next) = loop {
        let candidate = if rule.has_filters() {
            scan_days(rule, from)?
        } else {
            step_once(rule, from)?
        };
        match resolve_local(&tz, candidate) {
            Some(next) => break (candidate, next),
            None if skipped < MAX_SKIPPED_CANDIDATES => {
                tracing::debug!(%candidate, "local time does not exist, trying the next candidate");
                skipped += 1;
                from = candidate;
            }
            None => return None,
        }
    };

    if next <= *anchor {
        return None;
    }
    match &rule.until {
        Some(until) if !until.admits(next.with_timezone(&Utc), candidate) => None,
        _ => Some(next),
    }
}

/// Advances by exactly `INTERVAL` periods, clamping the day for months and years.
fn step_once(rule: &RecurrenceRule, local: NaiveDateTime) -> Option<NaiveDateTime> {
    let date = local.date();
    let interval = rule.interval;
    let next = match rule.frequency {
        Frequency::Daily => date.checked_add_days(Days::new(u64::from(interval)))?,
        Frequency::Weekly => date.checked_add_days(Days::new(7 * u64::from(interval)))?,
        Frequency::Monthly => calendar::add_months_clamped(date, interval)?,
        Frequency::Yearly => calendar::add_months_clamped(date, interval.checked_mul(12)?)?,
    };
    Some(next.and_time(local.time()))
}

/// Walks forward one day at a time until a day satisfies every filter.
fn scan_days(rule: &RecurrenceRule, local: NaiveDateTime) -> Option<NaiveDateTime> {
    let anchor = local.date();
    let rule = with_implicit_filters(rule, anchor);

    let mut day = anchor;
    for _ in 0..scan_horizon_days(&rule) {
        day = day.succ_opt()?;
        if in_period(&rule, anchor, day) && matches_filters(&rule, day) {
            return Some(day.and_time(local.time()));
        }
    }
    None
}

/// Fills in the filters RFC 5545 derives from the start date.
fn with_implicit_filters(rule: &RecurrenceRule, anchor: NaiveDate) -> RecurrenceRule {
    let mut rule = rule.clone();
    let anchor_day = anchor.day() as i8;
    match rule.frequency {
        Frequency::Daily => {}
        Frequency::Weekly => {
            if rule.by_day.is_empty() {
                rule.by_day.push(WeekdaySpec::every(anchor.weekday()));
            }
        }
        Frequency::Monthly => {
            if rule.by_day.is_empty() && rule.by_month_day.is_empty() {
                rule.by_month_day.push(anchor_day);
            }
        }
        Frequency::Yearly => {
            if rule.by_day.is_empty() && rule.by_month_day.is_empty() {
                rule.by_month_day.push(anchor_day);
                if rule.by_month.is_empty() {
                    rule.by_month.push(anchor.month());
                }
            }
        }
    }
    rule
}

fn scan_horizon_days(rule: &RecurrenceRule) -> u64 {
    let period_days: u64 = match rule.frequency {
        Frequency::Daily => 1,
        Frequency::Weekly => 7,
        Frequency::Monthly => 31,
        Frequency::Yearly => 366,
    };
    (period_days * u64::from(rule.interval) * 28).clamp(MIN_SCAN_DAYS, MAX_SCAN_DAYS)
}

/// Whether `day` falls in a period selected by `INTERVAL`, counting from the anchor's period.
fn in_period(rule: &RecurrenceRule, anchor: NaiveDate, day: NaiveDate) -> bool {
    if rule.interval == 1 {
        return true;
    }
    let elapsed = match rule.frequency {
        Frequency::Daily => calendar::days_between(anchor, day),
        Frequency::Weekly => calendar::weeks_between(anchor, day, rule.week_start),
        Frequency::Monthly => calendar::months_between(anchor, day),
        Frequency::Yearly => calendar::years_between(anchor, day),
    };
    elapsed.rem_euclid(i64::from(rule.interval)) == 0
}

fn matches_filters(rule: &RecurrenceRule, day: NaiveDate) -> bool {
    let month_ok = rule.by_month.is_empty() || rule.by_month.contains(&day.month());
    let month_day_ok = rule.by_month_day.is_empty()
        || rule.by_month_day.iter().any(|&target| calendar::is_month_day(day, target));
    let weekday_ok = rule.by_day.is_empty()
        || rule.by_day.iter().any(|spec| {
            spec.weekday == day.weekday()
                && match spec.ordinal {
                    None => true,
                    Some(n) if rule.frequency == Frequency::Yearly && rule.by_month.is_empty() => {
                        calendar::is_nth_weekday_of_year(day, n)
                    }
                    Some(n) => calendar::is_nth_weekday_of_month(day, n),
                }
        });
    month_ok && month_day_ok && weekday_ok
}

fn resolve_local<Tz: TimeZone>(tz: &Tz, local: NaiveDateTime) -> Option<DateTime<Tz>> {
    tz.from_local_datetime(&local).earliest().or_else(|| {
        let shifted = local.checked_add_signed(Duration::hours(1))?;
        tz.from_local_datetime(&shifted).earliest()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono_tz::America::New_York;
    use chrono_tz::Pacific::Apia;
    use proptest::prelude::*;
    use rstest::rstest;

    fn at(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()
    }

    fn custom(rule: &str) -> RecurrenceSpec {
        RecurrenceSpec::Custom(rule.to_string())
    }

    fn next(spec: &RecurrenceSpec, anchor: DateTime<Utc>) -> Option<DateTime<Utc>> {
        compute_next_occurrence(spec, &anchor).unwrap()
    }

    mod scenarios {
        use super::*;

        #[test]
        fn test_daily_preset() {
            let spec = RecurrencePreset::Daily.into();
            assert_eq!(next(&spec, at(2025, 1, 1, 10)), Some(at(2025, 1, 2, 10)));
        }

        #[test]
        fn test_weekly_preset_keeps_weekday() {
            // 2025-01-01 is a Wednesday.
            let spec = RecurrencePreset::Weekly.into();
            assert_eq!(next(&spec, at(2025, 1, 1, 10)), Some(at(2025, 1, 8, 10)));
        }

        #[test]
        fn test_weekday_rule_skips_weekend_from_friday() {
            let spec = custom("FREQ=WEEKLY;BYDAY=MO,TU,WE,TH,FR");
            assert_eq!(next(&spec, at(2025, 12, 19, 10)), Some(at(2025, 12, 22, 10)));
        }

        #[test]
        fn test_until_already_elapsed() {
            let spec = custom("FREQ=DAILY;UNTIL=20241231T000000Z");
            assert_eq!(next(&spec, at(2025, 1, 1, 10)), None);
        }

        #[test]
        fn test_weekdays_preset_from_weekend() {
            let spec = RecurrencePreset::Weekdays.into();
            // Saturday and Sunday both land on Monday 2025-12-22.
            assert_eq!(next(&spec, at(2025, 12, 20, 10)), Some(at(2025, 12, 22, 10)));
            assert_eq!(next(&spec, at(2025, 12, 21, 10)), Some(at(2025, 12, 22, 10)));
        }
    }

    mod presets {
        use super::*;

        #[rstest]
        #[case(RecurrencePreset::Weekdays, at(2025, 12, 19, 9), at(2025, 12, 22, 9))]
        #[case(RecurrencePreset::Weekdays, at(2025, 12, 22, 9), at(2025, 12, 23, 9))]
        #[case(RecurrencePreset::Monthly, at(2025, 1, 15, 9), at(2025, 2, 15, 9))]
        #[case(RecurrencePreset::Monthly, at(2025, 1, 31, 9), at(2025, 2, 28, 9))]
        #[case(RecurrencePreset::Monthly, at(2024, 1, 31, 9), at(2024, 2, 29, 9))]
        #[case(RecurrencePreset::Monthly, at(2025, 3, 31, 9), at(2025, 4, 30, 9))]
        #[case(RecurrencePreset::Monthly, at(2025, 12, 31, 9), at(2026, 1, 31, 9))]
        #[case(RecurrencePreset::Yearly, at(2025, 6, 1, 9), at(2026, 6, 1, 9))]
        #[case(RecurrencePreset::Yearly, at(2024, 2, 29, 9), at(2025, 2, 28, 9))]
        #[case(RecurrencePreset::Daily, at(2024, 2, 28, 9), at(2024, 2, 29, 9))]
        #[case(RecurrencePreset::Daily, at(2025, 12, 31, 23), at(2026, 1, 1, 23))]
        fn test_preset_next_occurrence(
            #[case] preset: RecurrencePreset,
            #[case] anchor: DateTime<Utc>,
            #[case] expected: DateTime<Utc>,
        ) {
            assert_eq!(next(&preset.into(), anchor), Some(expected));
        }

        #[test]
        fn test_monthly_rule_string_clamps_like_preset() {
            let anchor = at(2025, 1, 31, 9);
            assert_eq!(
                next(&custom("FREQ=MONTHLY"), anchor),
                next(&RecurrencePreset::Monthly.into(), anchor)
            );
        }
    }

    mod rules {
        use super::*;

        #[rstest]
        #[case("FREQ=DAILY;INTERVAL=3", at(2025, 1, 30, 8), at(2025, 2, 2, 8))]
        #[case("FREQ=WEEKLY;INTERVAL=2", at(2025, 1, 1, 8), at(2025, 1, 15, 8))]
        #[case("FREQ=WEEKLY;BYDAY=TU,TH", at(2025, 1, 1, 8), at(2025, 1, 2, 8))]
        #[case("FREQ=WEEKLY;BYDAY=MO", at(2025, 1, 6, 8), at(2025, 1, 13, 8))]
        #[case("FREQ=WEEKLY;INTERVAL=2;BYDAY=MO,FR", at(2025, 12, 19, 8), at(2025, 12, 29, 8))]
        #[case("FREQ=WEEKLY;INTERVAL=2;BYDAY=MO,FR", at(2025, 12, 15, 8), at(2025, 12, 19, 8))]
        #[case("FREQ=DAILY;BYDAY=SA,SU", at(2025, 12, 17, 8), at(2025, 12, 20, 8))]
        #[case("FREQ=MONTHLY;BYMONTHDAY=31", at(2025, 1, 31, 8), at(2025, 3, 31, 8))]
        #[case("FREQ=MONTHLY;BYMONTHDAY=-1", at(2025, 1, 31, 8), at(2025, 2, 28, 8))]
        #[case("FREQ=MONTHLY;BYMONTHDAY=1,15", at(2025, 1, 1, 8), at(2025, 1, 15, 8))]
        #[case("FREQ=MONTHLY;BYDAY=-1FR", at(2025, 12, 1, 8), at(2025, 12, 26, 8))]
        #[case("FREQ=MONTHLY;BYDAY=1MO", at(2025, 12, 1, 8), at(2026, 1, 5, 8))]
        #[case("FREQ=MONTHLY;INTERVAL=3;BYMONTHDAY=10", at(2025, 1, 10, 8), at(2025, 4, 10, 8))]
        #[case("FREQ=YEARLY;BYMONTH=2;BYMONTHDAY=29", at(2024, 2, 29, 8), at(2028, 2, 29, 8))]
        #[case("FREQ=YEARLY;BYMONTH=3", at(2025, 1, 20, 8), at(2025, 3, 20, 8))]
        #[case("FREQ=YEARLY;BYDAY=1MO", at(2025, 1, 6, 8), at(2026, 1, 5, 8))]
        #[case("FREQ=DAILY;UNTIL=20250102T100000Z", at(2025, 1, 1, 10), at(2025, 1, 2, 10))]
        #[case("FREQ=DAILY;UNTIL=20250102", at(2025, 1, 1, 10), at(2025, 1, 2, 10))]
        #[case("FREQ=DAILY;COUNT=2", at(2025, 1, 1, 10), at(2025, 1, 2, 10))]
        #[case("DTSTART:20200101T000000Z\nRRULE:FREQ=DAILY", at(2025, 1, 1, 10), at(2025, 1, 2, 10))]
        fn test_rule_next_occurrence(
            #[case] rule: &str,
            #[case] anchor: DateTime<Utc>,
            #[case] expected: DateTime<Utc>,
        ) {
            assert_eq!(next(&custom(rule), anchor), Some(expected));
        }

        #[rstest]
        #[case("FREQ=DAILY;UNTIL=20250102T095959Z", at(2025, 1, 1, 10))]
        #[case("FREQ=DAILY;UNTIL=20250101", at(2025, 1, 1, 10))]
        #[case("FREQ=WEEKLY;UNTIL=20250107T235959Z", at(2025, 1, 1, 10))]
        #[case("FREQ=DAILY;COUNT=1", at(2025, 1, 1, 10))]
        #[case("FREQ=DAILY;INTERVAL=7;BYDAY=MO", at(2025, 1, 7, 10))]
        #[case("FREQ=YEARLY;BYMONTH=2;BYMONTHDAY=30", at(2025, 1, 1, 10))]
        fn test_rule_exhausted(#[case] rule: &str, #[case] anchor: DateTime<Utc>) {
            assert_eq!(next(&custom(rule), anchor), None);
        }

        #[test]
        fn test_malformed_rule_is_an_error() {
            let err = compute_next_occurrence(&custom("FREQ=SOMETIMES"), &at(2025, 1, 1, 10)).unwrap_err();
            assert!(matches!(err, RecurrenceError::Parse { .. }));
        }

        #[test]
        fn test_malformed_rule_maps_to_none_on_lenient_path() {
            let engine = RecurrenceEngine::new();
            assert_eq!(engine.next_occurrence_or_none(&custom("NOT A RULE"), &at(2025, 1, 1, 10)), None);
        }

        #[test]
        fn test_carry_forward_consumes_count() {
            let engine = RecurrenceEngine::new();
            assert_eq!(
                engine.carry_forward(&custom("FREQ=DAILY;COUNT=3")),
                custom("FREQ=DAILY;COUNT=2")
            );
            assert_eq!(
                engine.carry_forward(&custom("freq=daily;byday=mo")),
                custom("freq=daily;byday=mo")
            );
            let preset: RecurrenceSpec = RecurrencePreset::Weekdays.into();
            assert_eq!(engine.carry_forward(&preset), preset);
        }

        #[test]
        fn test_custom_parser_is_used() {
            struct AlwaysWeekly;
            impl RuleParser for AlwaysWeekly {
                fn parse(&self, _rule: &str) -> Result<RecurrenceRule, RecurrenceError> {
                    Ok(RecurrenceRule::new(Frequency::Weekly))
                }
            }
            let engine = RecurrenceEngine::with_parser(AlwaysWeekly);
            let next = engine.next_occurrence(&custom("whatever"), &at(2025, 1, 1, 10)).unwrap();
            assert_eq!(next, Some(at(2025, 1, 8, 10)));
        }
    }

    mod timezones {
        use super::*;

        #[test]
        fn test_wall_clock_time_survives_dst_start() {
            // US DST starts 2025-03-09; the 09:00 task stays at 09:00 local.
            let anchor = New_York.with_ymd_and_hms(2025, 3, 8, 9, 0, 0).unwrap();
            let next = compute_next_occurrence(&RecurrencePreset::Daily.into(), &anchor)
                .unwrap()
                .unwrap();
            assert_eq!(next, New_York.with_ymd_and_hms(2025, 3, 9, 9, 0, 0).unwrap());
            assert_eq!(next - anchor, Duration::hours(23));
        }

        #[test]
        fn test_nonexistent_local_time_moves_forward() {
            // 02:30 does not exist on 2025-03-09 in New York.
            let anchor = New_York.with_ymd_and_hms(2025, 3, 8, 2, 30, 0).unwrap();
            let next = compute_next_occurrence(&RecurrencePreset::Daily.into(), &anchor)
                .unwrap()
                .unwrap();
            assert_eq!(next, New_York.with_ymd_and_hms(2025, 3, 9, 3, 30, 0).unwrap());
        }

        #[test]
        fn test_ambiguous_local_time_takes_earliest() {
            // 01:30 happens twice on 2025-11-02 in New York.
            let anchor = New_York.with_ymd_and_hms(2025, 11, 1, 1, 30, 0).unwrap();
            let next = compute_next_occurrence(&RecurrencePreset::Daily.into(), &anchor)
                .unwrap()
                .unwrap();
            assert_eq!(next.naive_local(), anchor.naive_local() + Duration::days(1));
            assert_eq!(next - anchor, Duration::hours(24));
        }

        #[test]
        fn test_skipped_calendar_day_moves_to_next_candidate() {
            // Samoa jumped from the end of 2011-12-29 straight to 2011-12-31.
            let anchor = Apia.with_ymd_and_hms(2011, 12, 29, 9, 0, 0).unwrap();
            let next = compute_next_occurrence(&RecurrencePreset::Daily.into(), &anchor)
                .unwrap()
                .unwrap();
            assert_eq!(next, Apia.with_ymd_and_hms(2011, 12, 31, 9, 0, 0).unwrap());
        }

        #[test]
        fn test_skipped_calendar_day_keeps_weekly_weekday_series() {
            let spec = custom("FREQ=WEEKLY;BYDAY=TH,FR");
            let anchor = Apia.with_ymd_and_hms(2011, 12, 29, 9, 0, 0).unwrap();
            let next = compute_next_occurrence(&spec, &anchor).unwrap().unwrap();
            // Friday 2011-12-30 never happened in Apia; the next Thursday follows.
            assert_eq!(next, Apia.with_ymd_and_hms(2012, 1, 5, 9, 0, 0).unwrap());
        }

        #[test]
        fn test_floating_until_uses_local_time() {
            let spec = custom("FREQ=DAILY;UNTIL=20250102T090000");
            let anchor = New_York.with_ymd_and_hms(2025, 1, 1, 9, 0, 0).unwrap();
            assert!(compute_next_occurrence(&spec, &anchor).unwrap().is_some());

            let late = New_York.with_ymd_and_hms(2025, 1, 1, 9, 30, 0).unwrap();
            assert!(compute_next_occurrence(&spec, &late).unwrap().is_none());
        }
    }

    mod properties {
        use super::*;

        fn arb_anchor() -> impl Strategy<Value = DateTime<Utc>> {
            // 1990-01-01 .. 2090-01-01
            (631_152_000i64..3_786_912_000i64)
                .prop_map(|secs| DateTime::<Utc>::from_timestamp(secs, 0).unwrap())
        }

        fn arb_spec() -> impl Strategy<Value = RecurrenceSpec> {
            let presets = prop_oneof![
                Just(RecurrencePreset::Daily),
                Just(RecurrencePreset::Weekly),
                Just(RecurrencePreset::Weekdays),
                Just(RecurrencePreset::Monthly),
                Just(RecurrencePreset::Yearly),
            ]
            .prop_map(RecurrenceSpec::Preset);
            let rules = prop_oneof![
                Just("FREQ=DAILY;INTERVAL=2"),
                Just("FREQ=WEEKLY;BYDAY=MO,WE,FR"),
                Just("FREQ=WEEKLY;INTERVAL=3;BYDAY=SA"),
                Just("FREQ=MONTHLY;BYMONTHDAY=-1"),
                Just("FREQ=MONTHLY;BYDAY=2TU"),
                Just("FREQ=YEARLY;BYMONTH=2;BYMONTHDAY=29"),
                Just("FREQ=DAILY;UNTIL=20500101T000000Z"),
            ]
            .prop_map(|r| RecurrenceSpec::Custom(r.to_string()));
            prop_oneof![presets, rules]
        }

        proptest! {
            #[test]
            fn prop_next_is_strictly_after_anchor(spec in arb_spec(), anchor in arb_anchor()) {
                if let Some(next) = compute_next_occurrence(&spec, &anchor).unwrap() {
                    prop_assert!(next > anchor);
                }
            }

            #[test]
            fn prop_computation_is_deterministic(spec in arb_spec(), anchor in arb_anchor()) {
                let first = compute_next_occurrence(&spec, &anchor).unwrap();
                let second = compute_next_occurrence(&spec, &anchor).unwrap();
                prop_assert_eq!(first, second);
            }

            #[test]
            fn prop_reparsed_rule_gives_same_result(spec in arb_spec(), anchor in arb_anchor()) {
                let engine = RecurrenceEngine::new();
                let rendered = engine.normalize(&spec).unwrap().to_string();
                let reparsed = RecurrenceSpec::Custom(rendered);
                prop_assert_eq!(
                    engine.next_occurrence(&spec, &anchor).unwrap(),
                    engine.next_occurrence(&reparsed, &anchor).unwrap()
                );
            }

            #[test]
            fn prop_weekdays_never_land_on_weekend(anchor in arb_anchor()) {
                let next = compute_next_occurrence(&RecurrencePreset::Weekdays.into(), &anchor)
                    .unwrap()
                    .unwrap();
                prop_assert!(!matches!(next.weekday(), Weekday::Sat | Weekday::Sun));
                prop_assert!(next - anchor <= Duration::days(3));
            }

            #[test]
            fn prop_until_bounds_result(anchor in arb_anchor(), days in 0i64..10) {
                let until = anchor + Duration::days(days) + Duration::hours(1);
                let spec = RecurrenceSpec::Custom(format!(
                    "FREQ=DAILY;UNTIL={}",
                    until.format("%Y%m%dT%H%M%SZ")
                ));
                let next = compute_next_occurrence(&spec, &anchor).unwrap();
                if days == 0 {
                    prop_assert_eq!(next, None);
                } else {
                    prop_assert_eq!(next, Some(anchor + Duration::days(1)));
                }
            }
        }
    }
}

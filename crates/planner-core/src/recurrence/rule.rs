use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc, Weekday};
use std::fmt;
use std::str::FromStr;

use crate::error::RecurrenceError;

/// Repetition cadence of a rule (`FREQ`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Frequency {
    Daily,
    Weekly,
    Monthly,
    Yearly,
}

impl Frequency {
    pub fn as_str(&self) -> &'static str {
        match self {
            Frequency::Daily => "DAILY",
            Frequency::Weekly => "WEEKLY",
            Frequency::Monthly => "MONTHLY",
            Frequency::Yearly => "YEARLY",
        }
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Frequency {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "DAILY" => Ok(Frequency::Daily),
            "WEEKLY" => Ok(Frequency::Weekly),
            "MONTHLY" => Ok(Frequency::Monthly),
            "YEARLY" => Ok(Frequency::Yearly),
            other => Err(format!("unsupported FREQ '{}'", other)),
        }
    }
}

/// One `BYDAY` entry, e.g. `MO`, `1MO` (first Monday) or `-1FR` (last Friday).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WeekdaySpec {
    pub weekday: Weekday,
    pub ordinal: Option<i8>,
}

impl WeekdaySpec {
    pub fn every(weekday: Weekday) -> Self {
        Self {
            weekday,
            ordinal: None,
        }
    }

    pub fn nth(weekday: Weekday, ordinal: i8) -> Self {
        Self {
            weekday,
            ordinal: Some(ordinal),
        }
    }
}

impl fmt::Display for WeekdaySpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(n) = self.ordinal {
            write!(f, "{}", n)?;
        }
        f.write_str(weekday_code(self.weekday))
    }
}

/// Inclusive end of a rule (`UNTIL`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Until {
    /// `...Z` form: an absolute instant.
    Instant(DateTime<Utc>),
    /// Floating form: compared against the task's local wall-clock time.
    Floating(NaiveDateTime),
}

impl Until {
    /// Whether an occurrence at `instant` (wall-clock `local`) is still inside the rule.
    pub fn admits(&self, instant: DateTime<Utc>, local: NaiveDateTime) -> bool {
        match self {
            Until::Instant(until) => instant <= *until,
            Until::Floating(until) => local <= *until,
        }
    }
}

/// Parsed, normalised recurrence rule. Presets and custom rule strings both
/// lower to this shape before any occurrence is computed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecurrenceRule {
    pub frequency: Frequency,
    pub interval: u32,
    pub count: Option<u32>,
    pub until: Option<Until>,
    pub by_day: Vec<WeekdaySpec>,
    pub by_month_day: Vec<i8>,
    pub by_month: Vec<u32>,
    pub week_start: Weekday,
}

impl RecurrenceRule {
    pub fn new(frequency: Frequency) -> Self {
        Self {
            frequency,
            interval: 1,
            count: None,
            until: None,
            by_day: Vec::new(),
            by_month_day: Vec::new(),
            by_month: Vec::new(),
            week_start: Weekday::Mon,
        }
    }

    pub fn with_weekdays(mut self, weekdays: &[Weekday]) -> Self {
        self.by_day = weekdays.iter().copied().map(WeekdaySpec::every).collect();
        self
    }

    /// True when any `BY*` filter is present. Rules without filters advance by
    /// whole periods; filtered rules are scanned day by day.
    pub fn has_filters(&self) -> bool {
        !self.by_day.is_empty() || !self.by_month_day.is_empty() || !self.by_month.is_empty()
    }

    /// The rule a successor task should carry: `COUNT` shrinks by the occurrence
    /// just completed, everything else is unchanged.
    pub fn consume_occurrence(&self) -> RecurrenceRule {
        let mut next = self.clone();
        next.count = self.count.map(|c| c.saturating_sub(1));
        next
    }
}

impl fmt::Display for RecurrenceRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FREQ={}", self.frequency)?;
        if self.interval != 1 {
            write!(f, ";INTERVAL={}", self.interval)?;
        }
        if let Some(count) = self.count {
            write!(f, ";COUNT={}", count)?;
        }
        match self.until {
            Some(Until::Instant(until)) => write!(f, ";UNTIL={}", until.format("%Y%m%dT%H%M%SZ"))?,
            Some(Until::Floating(until)) => write!(f, ";UNTIL={}", until.format("%Y%m%dT%H%M%S"))?,
            None => {}
        }
        if !self.by_day.is_empty() {
            let days: Vec<String> = self.by_day.iter().map(|d| d.to_string()).collect();
            write!(f, ";BYDAY={}", days.join(","))?;
        }
        if !self.by_month_day.is_empty() {
            let days: Vec<String> = self.by_month_day.iter().map(|d| d.to_string()).collect();
            write!(f, ";BYMONTHDAY={}", days.join(","))?;
        }
        if !self.by_month.is_empty() {
            let months: Vec<String> = self.by_month.iter().map(|m| m.to_string()).collect();
            write!(f, ";BYMONTH={}", months.join(","))?;
        }
        if self.week_start != Weekday::Mon {
            write!(f, ";WKST={}", weekday_code(self.week_start))?;
        }
        Ok(())
    }
}

impl FromStr for RecurrenceRule {
    type Err = RecurrenceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Rfc5545Parser.parse(s)
    }
}

/// Narrow seam between rule text and the occurrence algorithm.
pub trait RuleParser: Send + Sync {
    fn parse(&self, rule: &str) -> Result<RecurrenceRule, RecurrenceError>;
}

/// Parser for the RFC 5545 `RRULE` subset used by planner tasks.
///
/// Accepts `KEY=VALUE` pairs joined by `;`, optionally prefixed with `RRULE:`
/// and optionally preceded by a `DTSTART` line, which is ignored because the
/// anchor date always seeds the series. Unknown keys are skipped.
#[derive(Debug, Clone, Copy, Default)]
pub struct Rfc5545Parser;

impl RuleParser for Rfc5545Parser {
    fn parse(&self, rule: &str) -> Result<RecurrenceRule, RecurrenceError> {
        let body = rule_body(rule).ok_or_else(|| RecurrenceError::parse(rule, "empty rule"))?;

        let mut frequency = None;
        let mut parsed = RecurrenceRule::new(Frequency::Daily);

        for part in body.split(';').map(str::trim).filter(|p| !p.is_empty()) {
            let (key, value) = part.split_once('=').ok_or_else(|| {
                RecurrenceError::parse(rule, format!("expected KEY=VALUE, found '{}'", part))
            })?;
            let key = key.trim().to_ascii_uppercase();
            let value = value.trim();
            let invalid = |reason: String| RecurrenceError::parse(rule, reason);

            match key.as_str() {
                "FREQ" => frequency = Some(value.parse::<Frequency>().map_err(invalid)?),
                "INTERVAL" => parsed.interval = parse_positive("INTERVAL", value).map_err(invalid)?,
                "COUNT" => parsed.count = Some(parse_positive("COUNT", value).map_err(invalid)?),
                "UNTIL" => parsed.until = Some(parse_until(value).map_err(invalid)?),
                "BYDAY" => parsed.by_day = parse_list(value, parse_weekday_spec).map_err(invalid)?,
                "BYMONTHDAY" => {
                    parsed.by_month_day = parse_list(value, parse_month_day).map_err(invalid)?
                }
                "BYMONTH" => parsed.by_month = parse_list(value, parse_month).map_err(invalid)?,
                "WKST" => parsed.week_start = parse_weekday(value).map_err(invalid)?,
                _ => tracing::debug!(key = %key, "ignoring unsupported recurrence rule key"),
            }
        }

        parsed.frequency = frequency.ok_or_else(|| RecurrenceError::parse(rule, "missing FREQ"))?;

        if parsed.count.is_some() && parsed.until.is_some() {
            return Err(RecurrenceError::parse(rule, "COUNT and UNTIL are mutually exclusive"));
        }
        for spec in &parsed.by_day {
            if let Some(n) = spec.ordinal {
                let limit = match parsed.frequency {
                    Frequency::Monthly => 5,
                    Frequency::Yearly if !parsed.by_month.is_empty() => 5,
                    Frequency::Yearly => 53,
                    Frequency::Daily | Frequency::Weekly => {
                        return Err(RecurrenceError::parse(
                            rule,
                            "ordinal BYDAY entries require FREQ=MONTHLY or FREQ=YEARLY",
                        ))
                    }
                };
                if n.unsigned_abs() > limit {
                    return Err(RecurrenceError::parse(
                        rule,
                        format!("BYDAY ordinal {} out of range", n),
                    ));
                }
            }
        }

        Ok(parsed)
    }
}

/// Picks the rule line out of a possibly multi-line `DTSTART`/`RRULE` block.
fn rule_body(rule: &str) -> Option<&str> {
    let lines: Vec<&str> = rule.lines().map(str::trim).filter(|l| !l.is_empty()).collect();
    lines
        .iter()
        .find_map(|line| strip_prefix_ignore_case(*line, "RRULE:"))
        .or_else(|| lines.iter().copied().find(|line| !line.contains(':')))
        .map(str::trim)
        .filter(|body| !body.is_empty())
}

fn strip_prefix_ignore_case<'a>(s: &'a str, prefix: &str) -> Option<&'a str> {
    let head = s.get(..prefix.len())?;
    if head.eq_ignore_ascii_case(prefix) {
        Some(&s[prefix.len()..])
    } else {
        None
    }
}

fn parse_list<T>(value: &str, item: fn(&str) -> Result<T, String>) -> Result<Vec<T>, String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(item)
        .collect()
}

fn parse_positive(key: &str, value: &str) -> Result<u32, String> {
    match value.parse::<u32>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(format!("{} must be a positive integer, found '{}'", key, value)),
    }
}

fn parse_until(value: &str) -> Result<Until, String> {
    let upper = value.to_ascii_uppercase();
    let invalid = |_| format!("invalid UNTIL '{}'", value);

    if let Some(instant) = upper.strip_suffix('Z') {
        let naive = NaiveDateTime::parse_from_str(instant, "%Y%m%dT%H%M%S").map_err(invalid)?;
        return Ok(Until::Instant(naive.and_utc()));
    }
    if upper.contains('T') {
        let naive = NaiveDateTime::parse_from_str(&upper, "%Y%m%dT%H%M%S").map_err(invalid)?;
        return Ok(Until::Floating(naive));
    }
    // A bare date covers the whole day.
    let date = NaiveDate::parse_from_str(&upper, "%Y%m%d").map_err(invalid)?;
    date.and_hms_opt(23, 59, 59)
        .map(Until::Floating)
        .ok_or_else(|| format!("invalid UNTIL '{}'", value))
}

fn parse_weekday(value: &str) -> Result<Weekday, String> {
    match value.trim().to_ascii_uppercase().as_str() {
        "MO" => Ok(Weekday::Mon),
        "TU" => Ok(Weekday::Tue),
        "WE" => Ok(Weekday::Wed),
        "TH" => Ok(Weekday::Thu),
        "FR" => Ok(Weekday::Fri),
        "SA" => Ok(Weekday::Sat),
        "SU" => Ok(Weekday::Sun),
        other => Err(format!("unknown weekday '{}'", other)),
    }
}

fn parse_weekday_spec(value: &str) -> Result<WeekdaySpec, String> {
    if value.len() < 2 || !value.is_ascii() {
        return Err(format!("invalid BYDAY entry '{}'", value));
    }
    let (ordinal, code) = value.split_at(value.len() - 2);
    let weekday = parse_weekday(code)?;
    if ordinal.is_empty() {
        return Ok(WeekdaySpec::every(weekday));
    }
    match ordinal.trim_start_matches('+').parse::<i8>() {
        Ok(n) if n != 0 => Ok(WeekdaySpec::nth(weekday, n)),
        _ => Err(format!("invalid BYDAY ordinal in '{}'", value)),
    }
}

fn parse_month_day(value: &str) -> Result<i8, String> {
    match value.trim_start_matches('+').parse::<i8>() {
        Ok(n) if n != 0 && (-31..=31).contains(&n) => Ok(n),
        _ => Err(format!("BYMONTHDAY out of range: '{}'", value)),
    }
}

fn parse_month(value: &str) -> Result<u32, String> {
    match value.parse::<u32>() {
        Ok(n) if (1..=12).contains(&n) => Ok(n),
        _ => Err(format!("BYMONTH out of range: '{}'", value)),
    }
}

pub(crate) fn weekday_code(weekday: Weekday) -> &'static str {
    match weekday {
        Weekday::Mon => "MO",
        Weekday::Tue => "TU",
        Weekday::Wed => "WE",
        Weekday::Thu => "TH",
        Weekday::Fri => "FR",
        Weekday::Sat => "SA",
        Weekday::Sun => "SU",
    }
}

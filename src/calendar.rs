use bdays::HolidayCalendar;
use bdays::calendars::us::USSettlement;
use chrono::{Datelike, Duration, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::ops::RangeInclusive;
use std::str::FromStr;
use thiserror::Error;
use tracing::{debug, warn};

/// Public-holiday calendars a plan can skip when counting business days.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum HolidayRegion {
    #[default]
    None,
    UnitedStates,
    Canada,
    UnitedKingdom,
    Germany,
    India,
    Australia,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown holiday region '{0}'")]
pub struct UnknownRegion(pub String);

impl HolidayRegion {
    pub const ALL: [HolidayRegion; 7] = [
        HolidayRegion::None,
        HolidayRegion::UnitedStates,
        HolidayRegion::Canada,
        HolidayRegion::UnitedKingdom,
        HolidayRegion::Germany,
        HolidayRegion::India,
        HolidayRegion::Australia,
    ];

    pub fn label(self) -> &'static str {
        match self {
            HolidayRegion::None => "None",
            HolidayRegion::UnitedStates => "United States",
            HolidayRegion::Canada => "Canada",
            HolidayRegion::UnitedKingdom => "United Kingdom",
            HolidayRegion::Germany => "Germany",
            HolidayRegion::India => "India",
            HolidayRegion::Australia => "Australia",
        }
    }

    pub fn code(self) -> &'static str {
        match self {
            HolidayRegion::None => "none",
            HolidayRegion::UnitedStates => "us",
            HolidayRegion::Canada => "ca",
            HolidayRegion::UnitedKingdom => "uk",
            HolidayRegion::Germany => "de",
            HolidayRegion::India => "in",
            HolidayRegion::Australia => "au",
        }
    }

    pub fn is_none(self) -> bool {
        self == HolidayRegion::None
    }

    /// Parses a region, falling back to `None` for anything unrecognised.
    pub fn parse_lossy(input: &str) -> Self {
        match input.parse() {
            Ok(region) => region,
            Err(err) => {
                warn!(%err, "falling back to weekend-only scheduling");
                HolidayRegion::None
            }
        }
    }
}

impl fmt::Display for HolidayRegion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for HolidayRegion {
    type Err = UnknownRegion;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim();
        if needle.is_empty() {
            return Ok(HolidayRegion::None);
        }
        if needle.eq_ignore_ascii_case("gb") {
            return Ok(HolidayRegion::UnitedKingdom);
        }
        Self::ALL
            .into_iter()
            .find(|region| {
                region.label().eq_ignore_ascii_case(needle)
                    || region.code().eq_ignore_ascii_case(needle)
            })
            .ok_or_else(|| UnknownRegion(needle.to_string()))
    }
}

impl From<String> for HolidayRegion {
    fn from(value: String) -> Self {
        HolidayRegion::parse_lossy(&value)
    }
}

impl From<HolidayRegion> for String {
    fn from(value: HolidayRegion) -> Self {
        value.label().to_string()
    }
}

/// Dates treated as non-working in addition to weekends.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HolidaySet {
    dates: BTreeSet<NaiveDate>,
}

impl HolidaySet {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.dates.contains(&date)
    }

    pub fn insert(&mut self, date: NaiveDate) -> bool {
        self.dates.insert(date)
    }

    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.dates.iter().copied()
    }

    /// A weekday that is not a holiday.
    pub fn is_business_day(&self, date: NaiveDate) -> bool {
        is_weekday(date) && !self.contains(date)
    }

    /// Holidays in `[start, end]`, ascending.
    pub fn holidays_between(&self, start: NaiveDate, end: NaiveDate) -> Vec<NaiveDate> {
        if start > end {
            return Vec::new();
        }
        self.dates.range(start..=end).copied().collect()
    }
}

impl FromIterator<NaiveDate> for HolidaySet {
    fn from_iter<I: IntoIterator<Item = NaiveDate>>(iter: I) -> Self {
        Self {
            dates: iter.into_iter().collect(),
        }
    }
}

impl Extend<NaiveDate> for HolidaySet {
    fn extend<I: IntoIterator<Item = NaiveDate>>(&mut self, iter: I) {
        self.dates.extend(iter);
    }
}

pub fn is_weekday(date: NaiveDate) -> bool {
    !matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// Steps forward from `date` one calendar day at a time, counting only
/// business days, until `n` have been counted.
///
/// `date` itself is never counted and never adjusted: `n <= 0` returns it
/// unchanged even when it falls on a weekend or holiday.
pub fn advance_business_days(date: NaiveDate, n: i64, holidays: &HolidaySet) -> NaiveDate {
    let mut current = date;
    let mut remaining = n;
    while remaining > 0 {
        current = current + Duration::days(1);
        if holidays.is_business_day(current) {
            remaining -= 1;
        }
    }
    current
}

/// Business days in the half-open span `(start, end]`; the inverse of
/// [`advance_business_days`].
pub fn business_days_between(start: NaiveDate, end: NaiveDate, holidays: &HolidaySet) -> i64 {
    let mut count = 0;
    let mut current = start;
    while current < end {
        current = current + Duration::days(1);
        if holidays.is_business_day(current) {
            count += 1;
        }
    }
    count
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HolidayError {
    #[error("no holiday data for region {0}")]
    Unsupported(HolidayRegion),
    #[error("year {0} is outside the supported calendar range")]
    YearOutOfRange(i32),
    #[error("holiday lookup failed: {0}")]
    Lookup(String),
}

/// Source of public-holiday dates for a region and a span of years.
pub trait HolidayProvider {
    fn holidays(
        &self,
        region: HolidayRegion,
        years: RangeInclusive<i32>,
    ) -> Result<HolidaySet, HolidayError>;
}

/// Builds the holiday set for `[start_year, start_year + max(1, years_ahead)]`.
///
/// Never fails: an unavailable provider or the `None` region yields an empty
/// set and scheduling falls back to weekend-only skipping.
pub fn build_holiday_set(region: HolidayRegion, start_year: i32, years_ahead: u32) -> HolidaySet {
    build_holiday_set_with(&RuleBasedHolidays, region, start_year, years_ahead)
}

pub fn build_holiday_set_with<P: HolidayProvider + ?Sized>(
    provider: &P,
    region: HolidayRegion,
    start_year: i32,
    years_ahead: u32,
) -> HolidaySet {
    if region.is_none() {
        return HolidaySet::empty();
    }
    let span = i32::try_from(years_ahead.max(1)).unwrap_or(i32::MAX);
    let Some(end_year) = start_year.checked_add(span) else {
        warn!(start_year, years_ahead, "holiday look-ahead overflows; skipping holidays");
        return HolidaySet::empty();
    };
    match provider.holidays(region, start_year..=end_year) {
        Ok(set) => {
            debug!(%region, start_year, end_year, count = set.len(), "built holiday set");
            set
        }
        Err(err) => {
            warn!(%region, %err, "holiday provider unavailable; skipping holidays");
            HolidaySet::empty()
        }
    }
}

/// Built-in national calendars computed from fixed-date, nth-weekday and
/// Easter-relative rules. The United States calendar comes from `bdays`.
#[derive(Debug, Clone, Copy, Default)]
pub struct RuleBasedHolidays;

impl HolidayProvider for RuleBasedHolidays {
    fn holidays(
        &self,
        region: HolidayRegion,
        years: RangeInclusive<i32>,
    ) -> Result<HolidaySet, HolidayError> {
        let mut set = HolidaySet::empty();
        for year in years {
            match region {
                HolidayRegion::None => {}
                HolidayRegion::UnitedStates => add_us_holidays(&mut set, year)?,
                HolidayRegion::Canada => add_canada_holidays(&mut set, year)?,
                HolidayRegion::UnitedKingdom => add_uk_holidays(&mut set, year)?,
                HolidayRegion::Germany => add_germany_holidays(&mut set, year)?,
                HolidayRegion::India => add_india_holidays(&mut set, year)?,
                HolidayRegion::Australia => add_australia_holidays(&mut set, year)?,
            }
        }
        Ok(set)
    }
}

fn ymd(year: i32, month: u32, day: u32) -> Result<NaiveDate, HolidayError> {
    NaiveDate::from_ymd_opt(year, month, day).ok_or(HolidayError::YearOutOfRange(year))
}

/// Find the nth occurrence of a weekday in a month
fn nth_weekday(year: i32, month: u32, weekday: Weekday, n: u32) -> Result<NaiveDate, HolidayError> {
    let mut date = ymd(year, month, 1)?;
    let mut count = 0;
    while date.month() == month {
        if date.weekday() == weekday {
            count += 1;
            if count == n {
                return Ok(date);
            }
        }
        date = date + Duration::days(1);
    }
    Err(HolidayError::Lookup(format!(
        "no {n}th {weekday} in {year}-{month:02}"
    )))
}

/// Find the last occurrence of a weekday in a month
fn last_weekday(year: i32, month: u32, weekday: Weekday) -> Result<NaiveDate, HolidayError> {
    let mut date = if month == 12 {
        ymd(year + 1, 1, 1)?
    } else {
        ymd(year, month + 1, 1)?
    };
    date = date - Duration::days(1);
    while date.weekday() != weekday {
        date = date - Duration::days(1);
    }
    Ok(date)
}

/// Last `weekday` strictly before `year-month-day`.
fn weekday_before(year: i32, month: u32, day: u32, weekday: Weekday) -> Result<NaiveDate, HolidayError> {
    let mut date = ymd(year, month, day)? - Duration::days(1);
    while date.weekday() != weekday {
        date = date - Duration::days(1);
    }
    Ok(date)
}

/// Gregorian Easter Sunday (anonymous Gregorian algorithm).
pub fn easter_sunday(year: i32) -> Option<NaiveDate> {
    let a = year.rem_euclid(19);
    let b = year.div_euclid(100);
    let c = year.rem_euclid(100);
    let d = b / 4;
    let e = b % 4;
    let f = (b + 8) / 25;
    let g = (b - f + 1) / 3;
    let h = (19 * a + b - d - g + 15).rem_euclid(30);
    let i = c / 4;
    let k = c % 4;
    let l = (32 + 2 * e + 2 * i - h - k).rem_euclid(7);
    let m = (a + 11 * h + 22 * l) / 451;
    let month = (h + l - 7 * m + 114) / 31;
    let day = (h + l - 7 * m + 114) % 31 + 1;
    NaiveDate::from_ymd_opt(year, month as u32, day as u32)
}

fn easter(year: i32) -> Result<NaiveDate, HolidayError> {
    easter_sunday(year).ok_or(HolidayError::YearOutOfRange(year))
}

/// Inserts `dates`, then a substitute weekday for each one that falls on a
/// weekend. Substitutes never land on another holiday of the group.
fn add_with_substitutes(set: &mut HolidaySet, dates: &[NaiveDate]) {
    set.extend(dates.iter().copied());
    for &date in dates {
        if is_weekday(date) {
            continue;
        }
        let mut substitute = date + Duration::days(1);
        while !is_weekday(substitute) || set.contains(substitute) {
            substitute = substitute + Duration::days(1);
        }
        set.insert(substitute);
    }
}

fn add_us_holidays(set: &mut HolidaySet, year: i32) -> Result<(), HolidayError> {
    let calendar = USSettlement;
    let mut date = ymd(year, 1, 1)?;
    let end = ymd(year, 12, 31)?;
    while date <= end {
        if calendar.is_holiday(date) {
            set.insert(date);
        }
        date = date + Duration::days(1);
    }
    Ok(())
}

fn add_canada_holidays(set: &mut HolidaySet, year: i32) -> Result<(), HolidayError> {
    let easter = easter(year)?;
    set.insert(easter - Duration::days(2));
    set.insert(weekday_before(year, 5, 25, Weekday::Mon)?);
    set.insert(nth_weekday(year, 9, Weekday::Mon, 1)?);
    set.insert(nth_weekday(year, 10, Weekday::Mon, 2)?);
    add_with_substitutes(set, &[ymd(year, 1, 1)?]);
    add_with_substitutes(set, &[ymd(year, 7, 1)?]);
    add_with_substitutes(set, &[ymd(year, 12, 25)?, ymd(year, 12, 26)?]);
    Ok(())
}

fn add_uk_holidays(set: &mut HolidaySet, year: i32) -> Result<(), HolidayError> {
    let easter = easter(year)?;
    set.insert(easter - Duration::days(2));
    set.insert(easter + Duration::days(1));
    set.insert(nth_weekday(year, 5, Weekday::Mon, 1)?);
    set.insert(last_weekday(year, 5, Weekday::Mon)?);
    set.insert(last_weekday(year, 8, Weekday::Mon)?);
    add_with_substitutes(set, &[ymd(year, 1, 1)?]);
    add_with_substitutes(set, &[ymd(year, 12, 25)?, ymd(year, 12, 26)?]);
    Ok(())
}

fn add_germany_holidays(set: &mut HolidaySet, year: i32) -> Result<(), HolidayError> {
    let easter = easter(year)?;
    set.insert(ymd(year, 1, 1)?);
    set.insert(easter - Duration::days(2));
    set.insert(easter + Duration::days(1));
    set.insert(ymd(year, 5, 1)?);
    set.insert(easter + Duration::days(39));
    set.insert(easter + Duration::days(50));
    set.insert(ymd(year, 10, 3)?);
    set.insert(ymd(year, 12, 25)?);
    set.insert(ymd(year, 12, 26)?);
    Ok(())
}

// Only the fixed national holidays; the lunar festivals need an almanac.
fn add_india_holidays(set: &mut HolidaySet, year: i32) -> Result<(), HolidayError> {
    set.insert(ymd(year, 1, 26)?);
    set.insert(ymd(year, 8, 15)?);
    set.insert(ymd(year, 10, 2)?);
    Ok(())
}

fn add_australia_holidays(set: &mut HolidaySet, year: i32) -> Result<(), HolidayError> {
    let easter = easter(year)?;
    set.insert(easter - Duration::days(2));
    set.insert(easter + Duration::days(1));
    set.insert(ymd(year, 4, 25)?);
    add_with_substitutes(set, &[ymd(year, 1, 1)?]);
    add_with_substitutes(set, &[ymd(year, 1, 26)?]);
    add_with_substitutes(set, &[ymd(year, 12, 25)?, ymd(year, 12, 26)?]);
    Ok(())
}

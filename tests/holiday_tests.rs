use chrono::NaiveDate;
use naf_planner::{
    HolidayError, HolidayProvider, HolidayRegion, HolidaySet, Milestone, advance_business_days,
    build_holiday_set, build_holiday_set_with, build_schedule,
};
use std::cell::RefCell;
use std::ops::RangeInclusive;

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

struct FailingProvider;

impl HolidayProvider for FailingProvider {
    fn holidays(
        &self,
        _region: HolidayRegion,
        _years: RangeInclusive<i32>,
    ) -> Result<HolidaySet, HolidayError> {
        Err(HolidayError::Lookup("calendar service offline".into()))
    }
}

#[derive(Default)]
struct RecordingProvider {
    requested: RefCell<Vec<RangeInclusive<i32>>>,
}

impl HolidayProvider for RecordingProvider {
    fn holidays(
        &self,
        _region: HolidayRegion,
        years: RangeInclusive<i32>,
    ) -> Result<HolidaySet, HolidayError> {
        self.requested.borrow_mut().push(years);
        Ok(HolidaySet::empty())
    }
}

#[test]
fn none_region_has_no_holidays() {
    assert!(build_holiday_set(HolidayRegion::None, 2025, 3).is_empty());
}

#[test]
fn united_states_federal_days() {
    let set = build_holiday_set(HolidayRegion::UnitedStates, 2025, 1);
    for date in [d(2025, 1, 1), d(2025, 7, 4), d(2025, 11, 27), d(2025, 12, 25)] {
        assert!(set.contains(date), "missing {date}");
    }
    assert!(!set.contains(d(2025, 7, 3)));
}

#[test]
fn germany_easter_relative_days() {
    let set = build_holiday_set(HolidayRegion::Germany, 2025, 1);
    assert!(set.contains(d(2025, 5, 29)), "Ascension");
    assert!(set.contains(d(2025, 6, 9)), "Whit Monday");
    assert!(set.contains(d(2025, 10, 3)));
}

#[test]
fn united_kingdom_bank_holidays() {
    let set = build_holiday_set(HolidayRegion::UnitedKingdom, 2025, 1);
    for date in [
        d(2025, 4, 18),
        d(2025, 4, 21),
        d(2025, 5, 5),
        d(2025, 5, 26),
        d(2025, 8, 25),
    ] {
        assert!(set.contains(date), "missing {date}");
    }
}

#[test]
fn canada_and_australia_rules() {
    let canada = build_holiday_set(HolidayRegion::Canada, 2025, 1);
    assert!(canada.contains(d(2025, 5, 19)), "Victoria Day");
    assert!(canada.contains(d(2025, 10, 13)), "Thanksgiving");
    assert!(canada.contains(d(2025, 7, 1)));

    let australia = build_holiday_set(HolidayRegion::Australia, 2025, 1);
    // Australia Day 2025 falls on a Sunday.
    assert!(australia.contains(d(2025, 1, 27)));
    assert!(australia.contains(d(2025, 4, 25)));
}

#[test]
fn india_fixed_national_days() {
    let set = build_holiday_set(HolidayRegion::India, 2025, 1);
    assert!(set.contains(d(2025, 1, 26)));
    assert!(set.contains(d(2025, 8, 15)));
    assert!(set.contains(d(2025, 10, 2)));
}

#[test]
fn independence_day_is_skipped() {
    let set = build_holiday_set(HolidayRegion::UnitedStates, 2025, 3);
    // Thursday + 1 skips Friday the 4th and the weekend.
    assert_eq!(advance_business_days(d(2025, 7, 3), 1, &set), d(2025, 7, 7));
}

#[test]
fn chain_crossing_new_year_skips_next_years_holiday() {
    let set = build_holiday_set(HolidayRegion::UnitedStates, 2025, 1);
    assert!(set.contains(d(2026, 1, 1)));
    let schedule = build_schedule(d(2025, 12, 30), &[Milestone::new("Cutover", 2)], &set);
    assert_eq!(schedule.projected_completion, d(2026, 1, 2));
}

#[test]
fn look_ahead_covers_at_least_one_extra_year() {
    let provider = RecordingProvider::default();
    build_holiday_set_with(&provider, HolidayRegion::Germany, 2025, 0);
    build_holiday_set_with(&provider, HolidayRegion::Germany, 2025, 3);
    build_holiday_set_with(&provider, HolidayRegion::None, 2025, 3);
    assert_eq!(*provider.requested.borrow(), vec![2025..=2026, 2025..=2028]);
}

#[test]
fn provider_failure_degrades_to_weekends_only() {
    let set = build_holiday_set_with(&FailingProvider, HolidayRegion::UnitedStates, 2025, 3);
    assert!(set.is_empty());
    let schedule = build_schedule(d(2025, 7, 3), &[Milestone::new("Deploy", 1)], &set);
    assert_eq!(schedule.projected_completion, d(2025, 7, 4));
}

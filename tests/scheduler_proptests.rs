use chrono::{Datelike, Duration, NaiveDate, Weekday};
use naf_planner::{HolidaySet, Milestone, advance_business_days, build_schedule};
use proptest::prelude::*;

fn date_strategy() -> impl Strategy<Value = NaiveDate> {
    (0i64..3650).prop_map(|offset| NaiveDate::from_ymd_opt(2020, 1, 1).unwrap() + Duration::days(offset))
}

fn holiday_strategy() -> impl Strategy<Value = HolidaySet> {
    prop::collection::vec(0i64..4000, 0..40).prop_map(|offsets| {
        offsets
            .into_iter()
            .map(|o| NaiveDate::from_ymd_opt(2020, 1, 1).unwrap() + Duration::days(o))
            .collect()
    })
}

fn milestone_strategy() -> impl Strategy<Value = Milestone> {
    (prop_oneof![Just(String::new()), "[A-Za-z ]{1,12}"], -5i64..30)
        .prop_map(|(name, duration)| Milestone::new(name, duration))
}

proptest! {
    #[test]
    fn zero_advance_is_identity(date in date_strategy(), holidays in holiday_strategy()) {
        prop_assert_eq!(advance_business_days(date, 0, &holidays), date);
    }

    #[test]
    fn positive_advance_lands_on_business_day(
        date in date_strategy(),
        n in 1i64..60,
        holidays in holiday_strategy(),
    ) {
        let end = advance_business_days(date, n, &holidays);
        prop_assert!(end > date);
        prop_assert!(!matches!(end.weekday(), Weekday::Sat | Weekday::Sun));
        prop_assert!(!holidays.contains(end));
        prop_assert_eq!(naf_planner::business_days_between(date, end, &holidays), n);
    }

    #[test]
    fn schedule_chains_and_totals(
        start in date_strategy(),
        milestones in prop::collection::vec(milestone_strategy(), 0..12),
        holidays in holiday_strategy(),
    ) {
        let schedule = build_schedule(start, &milestones, &holidays);

        let surviving: Vec<&Milestone> = milestones.iter().filter(|m| !m.is_blank()).collect();
        prop_assert_eq!(schedule.items.len(), surviving.len());

        let mut cursor = start;
        for item in &schedule.items {
            prop_assert_eq!(item.start_date, cursor);
            prop_assert!(item.end_date >= item.start_date);
            cursor = item.end_date;
        }
        prop_assert_eq!(schedule.projected_completion, cursor);

        let expected_total: i64 = surviving.iter().map(|m| m.duration_business_days.max(0)).sum();
        prop_assert_eq!(schedule.total_business_days, expected_total);
        prop_assert_eq!(build_schedule(start, &milestones, &holidays), schedule);
    }
}

use chrono::{Datelike, NaiveDate, Weekday};
use naf_planner::{HolidaySet, Milestone, advance_business_days, build_schedule};

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

fn default_chain() -> Vec<Milestone> {
    vec![
        Milestone::new("Planning", 5),
        Milestone::new("Design", 10),
        Milestone::new("Build", 10),
    ]
}

#[test]
fn zero_days_returns_input_even_on_weekend_or_holiday() {
    let saturday = d(2025, 1, 4);
    let holiday = d(2025, 1, 1);
    let holidays: HolidaySet = [holiday].into_iter().collect();
    assert_eq!(advance_business_days(saturday, 0, &holidays), saturday);
    assert_eq!(advance_business_days(holiday, 0, &holidays), holiday);
    assert_eq!(advance_business_days(holiday, -3, &holidays), holiday);
}

#[test]
fn friday_plus_one_lands_on_monday() {
    let friday = d(2025, 1, 10);
    let next = advance_business_days(friday, 1, &HolidaySet::empty());
    assert_eq!(next, d(2025, 1, 13));
    assert_eq!(next.weekday(), Weekday::Mon);
}

#[test]
fn weekend_start_counts_from_following_monday() {
    // Saturday + 1 business day is Monday.
    assert_eq!(
        advance_business_days(d(2025, 1, 4), 1, &HolidaySet::empty()),
        d(2025, 1, 6)
    );
}

#[test]
fn listed_holiday_is_skipped() {
    let monday = d(2025, 3, 3);
    let holidays: HolidaySet = [d(2025, 3, 4)].into_iter().collect();
    assert_eq!(advance_business_days(monday, 1, &holidays), d(2025, 3, 5));
}

#[test]
fn concrete_three_milestone_chain() {
    let schedule = build_schedule(d(2025, 1, 6), &default_chain(), &HolidaySet::empty());

    let spans: Vec<(&str, NaiveDate, NaiveDate)> = schedule
        .items
        .iter()
        .map(|i| (i.name.as_str(), i.start_date, i.end_date))
        .collect();
    assert_eq!(
        spans,
        vec![
            ("Planning", d(2025, 1, 6), d(2025, 1, 13)),
            ("Design", d(2025, 1, 13), d(2025, 1, 27)),
            ("Build", d(2025, 1, 27), d(2025, 2, 10)),
        ]
    );
    assert_eq!(schedule.total_business_days, 25);
    assert_eq!(schedule.projected_completion, d(2025, 2, 10));
}

#[test]
fn items_are_chained_end_to_start() {
    let holidays: HolidaySet = [d(2025, 1, 20), d(2025, 2, 17)].into_iter().collect();
    let start = d(2025, 1, 8);
    let schedule = build_schedule(start, &Milestone::default_template(), &holidays);

    assert_eq!(schedule.items[0].start_date, start);
    for pair in schedule.items.windows(2) {
        assert_eq!(pair[1].start_date, pair[0].end_date);
    }
    assert_eq!(
        schedule.projected_completion,
        schedule.items.last().unwrap().end_date
    );
}

#[test]
fn total_ignores_skipped_days() {
    let milestones = default_chain();
    let plain = build_schedule(d(2025, 1, 6), &milestones, &HolidaySet::empty());
    let holidays: HolidaySet = [d(2025, 1, 7), d(2025, 1, 20), d(2025, 2, 3)]
        .into_iter()
        .collect();
    let skipping = build_schedule(d(2025, 1, 6), &milestones, &holidays);

    assert_eq!(plain.total_business_days, skipping.total_business_days);
    assert!(skipping.projected_completion > plain.projected_completion);
}

#[test]
fn blank_rows_are_dropped_but_unnamed_work_is_kept() {
    let milestones = vec![
        Milestone::new("", 0),
        Milestone::new("   ", -2),
        Milestone::new("", 5),
        Milestone::new("Sign-off", 0),
    ];
    let schedule = build_schedule(d(2025, 1, 6), &milestones, &HolidaySet::empty());

    assert_eq!(schedule.len(), 2);
    assert_eq!(schedule.items[0].name, "");
    assert_eq!(schedule.items[0].display_name(), "(Unnamed)");
    assert_eq!(schedule.items[0].end_date, d(2025, 1, 13));
    assert_eq!(schedule.items[1].start_date, schedule.items[1].end_date);
    assert_eq!(schedule.total_business_days, 5);
}

#[test]
fn negative_duration_is_kept_when_named_and_counts_as_zero() {
    let milestones = vec![Milestone::new("Oops", -4), Milestone::new("Build", 2)];
    let schedule = build_schedule(d(2025, 1, 6), &milestones, &HolidaySet::empty());
    assert_eq!(schedule.len(), 2);
    assert_eq!(schedule.items[0].end_date, d(2025, 1, 6));
    assert_eq!(schedule.total_business_days, 2);
    assert_eq!(schedule.projected_completion, d(2025, 1, 8));
}

#[test]
fn same_inputs_same_schedule() {
    let holidays: HolidaySet = [d(2025, 5, 26)].into_iter().collect();
    let first = build_schedule(d(2025, 5, 1), &Milestone::default_template(), &holidays);
    let second = build_schedule(d(2025, 5, 1), &Milestone::default_template(), &holidays);
    assert_eq!(first, second);
}

#[test]
fn empty_input_completes_on_start_date() {
    let start = d(2025, 6, 14);
    let schedule = build_schedule(start, &[], &HolidaySet::empty());
    assert!(schedule.items.is_empty());
    assert_eq!(schedule.total_business_days, 0);
    assert_eq!(schedule.projected_completion, start);
}

#[test]
fn notes_travel_with_items() {
    let milestones = vec![Milestone::new("Pilot", 3).with_notes("two sites")];
    let schedule = build_schedule(d(2025, 1, 6), &milestones, &HolidaySet::empty());
    assert_eq!(schedule.items[0].notes, "two sites");
}

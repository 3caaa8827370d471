use chrono::NaiveDate;
use naf_planner::{
    HolidayRegion, ImportMode, Milestone, PersistenceError, PlanMetadata, PlannerConfig,
    ReportDocument, TimelinePlan, import_report_json, load_plan_from_csv, load_plan_from_json,
    persistence::parse_report_json, save_plan_to_csv, save_plan_to_json,
};
use std::fs;
use tempfile::{NamedTempFile, tempdir};

fn sample_plan() -> TimelinePlan {
    let mut metadata = PlanMetadata::starting(NaiveDate::from_ymd_opt(2025, 1, 6).unwrap());
    metadata.project_title = "Campus refresh".into();
    metadata.holiday_region = HolidayRegion::Canada;
    metadata.staff_count = 3;
    metadata.staffing_plan_md = "- 2 network engineers\n- 1 developer".into();
    TimelinePlan::with_milestones(
        metadata,
        vec![
            Milestone::new("Planning", 5).with_notes("kick-off, scope"),
            Milestone::new("", 0),
            Milestone::new("Build, \"phase 1\"", 12),
        ],
    )
}

#[test]
fn json_round_trip_preserves_plan() {
    let plan = sample_plan();
    let tmp = NamedTempFile::new().unwrap();
    save_plan_to_json(&plan, tmp.path()).unwrap();
    let loaded = load_plan_from_json(tmp.path()).unwrap();
    assert_eq!(loaded, plan);
}

#[test]
fn csv_round_trip_preserves_plan() {
    let plan = sample_plan();
    let tmp = NamedTempFile::new().unwrap();
    save_plan_to_csv(&plan, tmp.path()).unwrap();
    let text = fs::read_to_string(tmp.path()).unwrap();
    assert!(text.contains("__metadata__"));
    let loaded = load_plan_from_csv(tmp.path()).unwrap();
    assert_eq!(loaded, plan);
}

#[test]
fn csv_without_metadata_row_gets_defaults() {
    let tmp = NamedTempFile::new().unwrap();
    fs::write(
        tmp.path(),
        "name,duration_business_days,notes,metadata_json\nPilot,4,,\nRollout,,later,\n",
    )
    .unwrap();
    let loaded = load_plan_from_csv(tmp.path()).unwrap();
    assert_eq!(loaded.metadata.staff_count, 1);
    assert_eq!(loaded.milestones[0], Milestone::new("Pilot", 4));
    assert_eq!(loaded.milestones[1], Milestone::new("Rollout", 0).with_notes("later"));
}

#[test]
fn csv_with_bad_duration_is_rejected() {
    let tmp = NamedTempFile::new().unwrap();
    fs::write(
        tmp.path(),
        "name,duration_business_days,notes,metadata_json\nPilot,four,,\n",
    )
    .unwrap();
    let err = load_plan_from_csv(tmp.path()).unwrap_err();
    assert!(matches!(err, PersistenceError::InvalidData(_)), "got {err:?}");
}

#[test]
fn oversized_plan_is_not_saved() {
    let mut plan = sample_plan();
    plan.milestones[0].name = "x".repeat(500);
    let tmp = NamedTempFile::new().unwrap();
    let err = save_plan_to_json(&plan, tmp.path()).unwrap_err();
    assert!(matches!(err, PersistenceError::InvalidData(_)));
}

#[test]
fn missing_file_is_io_error() {
    let dir = tempdir().unwrap();
    let err = load_plan_from_json(dir.path().join("absent.json")).unwrap_err();
    assert!(matches!(err, PersistenceError::Io(_)));
}

#[test]
fn exported_report_overwrites_plan() {
    let source = sample_plan();
    let config = PlannerConfig::default();
    let schedule = source.compute(&config);
    let report = ReportDocument::new(&source, &schedule, &config);
    let tmp = NamedTempFile::new().unwrap();
    fs::write(tmp.path(), report.to_json_pretty().unwrap()).unwrap();

    let mut plan = TimelinePlan::default();
    import_report_json(tmp.path(), &mut plan, ImportMode::Overwrite).unwrap();

    assert_eq!(plan.metadata.project_title, "Campus refresh");
    assert_eq!(plan.metadata.start_date, source.metadata.start_date);
    assert_eq!(plan.metadata.holiday_region, HolidayRegion::Canada);
    assert_eq!(plan.metadata.staff_count, 3);
    // The blank row never made it into the schedule.
    let names: Vec<_> = plan.milestones.iter().map(|m| m.name.as_str()).collect();
    assert_eq!(names, vec!["Planning", "Build, \"phase 1\""]);
}

#[test]
fn merge_import_only_touches_present_timeline_fields() {
    let tmp = NamedTempFile::new().unwrap();
    fs::write(
        tmp.path(),
        r#"{"timeline": {"staff_count": 7, "holiday_region": "Germany", "staffing_plan_md": null}}"#,
    )
    .unwrap();

    let mut plan = sample_plan();
    import_report_json(tmp.path(), &mut plan, ImportMode::Merge).unwrap();

    assert_eq!(plan.metadata.staff_count, 7);
    assert_eq!(plan.metadata.holiday_region, HolidayRegion::Germany);
    assert_eq!(plan.metadata.project_title, "Campus refresh");
    assert_eq!(plan.metadata.staffing_plan_md, sample_plan().metadata.staffing_plan_md);
    assert_eq!(plan.milestones, sample_plan().milestones);
}

#[test]
fn import_skips_unparseable_start_date_and_keeps_the_rest() {
    let tmp = NamedTempFile::new().unwrap();
    fs::write(
        tmp.path(),
        r#"{"timeline": {"start_date": "01/06/2025", "staff_count": 4, "holiday_region": "Germany"}}"#,
    )
    .unwrap();
    let mut plan = sample_plan();
    import_report_json(tmp.path(), &mut plan, ImportMode::Merge).unwrap();

    assert_eq!(plan.metadata.start_date, sample_plan().metadata.start_date);
    assert_eq!(plan.metadata.staff_count, 4);
    assert_eq!(plan.metadata.holiday_region, HolidayRegion::Germany);
}

#[test]
fn import_reads_staff_count_leniently() {
    let staff = |raw: &str| {
        parse_report_json(&format!(r#"{{"timeline": {{"staff_count": {raw}}}}}"#))
            .unwrap()
            .staff_count
    };
    assert_eq!(staff(r#""6""#), Some(6));
    assert_eq!(staff("-2"), Some(0));
    assert_eq!(staff(r#""""#), Some(0));
    assert_eq!(staff("3.7"), Some(3));
    assert_eq!(staff(r#""several""#), None);
    assert_eq!(staff("null"), None);
}

#[test]
fn import_with_malformed_json_fails_without_changes() {
    let tmp = NamedTempFile::new().unwrap();
    fs::write(tmp.path(), r#"{"timeline": {"start_date": "#).unwrap();
    let mut plan = sample_plan();
    let err = import_report_json(tmp.path(), &mut plan, ImportMode::Merge).unwrap_err();
    assert!(matches!(err, PersistenceError::Serialization(_)), "got {err:?}");
    assert_eq!(plan, sample_plan());
}

#[cfg(feature = "sqlite")]
mod sqlite {
    use super::sample_plan;
    use naf_planner::{PlanStore, SqlitePlanStore};
    use tempfile::tempdir;

    #[test]
    fn empty_store_has_no_plan() {
        let store = SqlitePlanStore::in_memory().unwrap();
        assert!(store.load_plan().unwrap().is_none());
    }

    #[test]
    fn save_replaces_previous_plan() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("plan.sqlite");
        let store = SqlitePlanStore::new(&path).unwrap();

        let mut plan = sample_plan();
        store.save_plan(&plan).unwrap();
        plan.remove_milestone(0).unwrap();
        plan.metadata.staff_count = 5;
        store.save_plan(&plan).unwrap();
        drop(store);

        let reopened = SqlitePlanStore::new(&path).unwrap();
        let loaded = reopened.load_plan().unwrap().unwrap();
        assert_eq!(loaded, plan);
    }
}

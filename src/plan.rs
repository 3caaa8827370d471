use crate::calendar::{HolidayProvider, HolidaySet, RuleBasedHolidays, build_holiday_set_with};
use crate::config::PlannerConfig;
use crate::metadata::PlanMetadata;
use crate::milestone::Milestone;
use crate::schedule::{Schedule, build_schedule};
use crate::validation::ValidationError;
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::debug;

/// The staffing and timeline form as a plain value. Front ends edit it and
/// hand it to [`TimelinePlan::compute`]; nothing here is shared.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimelinePlan {
    pub metadata: PlanMetadata,
    #[serde(default)]
    pub milestones: Vec<Milestone>,
}

impl Default for TimelinePlan {
    fn default() -> Self {
        Self {
            metadata: PlanMetadata::default(),
            milestones: Milestone::default_template(),
        }
    }
}

/// How an imported document combines with the current plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImportMode {
    /// Start from defaults, then apply the document.
    #[default]
    Overwrite,
    /// Apply only the fields the document carries.
    Merge,
}

impl FromStr for ImportMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "overwrite" => Ok(ImportMode::Overwrite),
            "merge" => Ok(ImportMode::Merge),
            other => Err(format!("unknown import mode '{other}'")),
        }
    }
}

impl fmt::Display for ImportMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImportMode::Overwrite => f.write_str("overwrite"),
            ImportMode::Merge => f.write_str("merge"),
        }
    }
}

/// Optional plan fields carried by an imported document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlanUpdate {
    pub project_title: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub holiday_region: Option<crate::calendar::HolidayRegion>,
    pub staff_count: Option<u32>,
    pub staffing_plan_md: Option<String>,
    pub milestones: Option<Vec<Milestone>>,
}

impl TimelinePlan {
    pub fn new(metadata: PlanMetadata) -> Self {
        Self {
            metadata,
            milestones: Vec::new(),
        }
    }

    pub fn with_milestones(metadata: PlanMetadata, milestones: Vec<Milestone>) -> Self {
        Self {
            metadata,
            milestones,
        }
    }

    pub fn start_date(&self) -> NaiveDate {
        self.metadata.start_date
    }

    pub fn add_milestone(&mut self, milestone: Milestone) -> usize {
        self.milestones.push(milestone);
        self.milestones.len() - 1
    }

    /// Appends an empty row, as the form's "Add milestone row" does.
    pub fn insert_blank_row(&mut self) -> usize {
        self.add_milestone(Milestone::default())
    }

    pub fn milestone_mut(&mut self, index: usize) -> Result<&mut Milestone, ValidationError> {
        let len = self.milestones.len();
        self.milestones
            .get_mut(index)
            .ok_or(ValidationError::RowOutOfRange { index, len })
    }

    pub fn update_milestone(
        &mut self,
        index: usize,
        milestone: Milestone,
    ) -> Result<(), ValidationError> {
        *self.milestone_mut(index)? = milestone;
        Ok(())
    }

    pub fn remove_milestone(&mut self, index: usize) -> Result<Milestone, ValidationError> {
        let len = self.milestones.len();
        if index >= len {
            return Err(ValidationError::RowOutOfRange { index, len });
        }
        Ok(self.milestones.remove(index))
    }

    /// Removes every listed row; out-of-range indices are ignored.
    pub fn remove_milestones(&mut self, indices: &[usize]) -> usize {
        let mut sorted: Vec<usize> = indices.to_vec();
        sorted.sort_unstable();
        sorted.dedup();
        let mut removed = 0;
        for index in sorted.into_iter().rev() {
            if index < self.milestones.len() {
                self.milestones.remove(index);
                removed += 1;
            }
        }
        removed
    }

    /// Restores the default template while keeping the start date.
    pub fn reset_to_defaults(&mut self) {
        let start_date = self.metadata.start_date;
        *self = Self::default();
        self.metadata.start_date = start_date;
    }

    pub fn apply_update(&mut self, update: PlanUpdate, mode: ImportMode) {
        if mode == ImportMode::Overwrite {
            self.reset_to_defaults();
        }
        let PlanUpdate {
            project_title,
            start_date,
            holiday_region,
            staff_count,
            staffing_plan_md,
            milestones,
        } = update;
        if let Some(title) = project_title {
            self.metadata.project_title = title;
        }
        if let Some(date) = start_date {
            self.metadata.start_date = date;
        }
        if let Some(region) = holiday_region {
            self.metadata.holiday_region = region;
        }
        if let Some(count) = staff_count {
            self.metadata.staff_count = count;
        }
        if let Some(plan_md) = staffing_plan_md {
            self.metadata.staffing_plan_md = plan_md;
        }
        if let Some(rows) = milestones {
            if mode == ImportMode::Overwrite || !rows.is_empty() {
                self.milestones = rows;
            }
        }
        debug!(%mode, rows = self.milestones.len(), "applied plan update");
    }

    pub fn holiday_set(&self, config: &PlannerConfig) -> HolidaySet {
        self.holiday_set_with(&RuleBasedHolidays, config)
    }

    pub fn holiday_set_with<P: HolidayProvider + ?Sized>(
        &self,
        provider: &P,
        config: &PlannerConfig,
    ) -> HolidaySet {
        build_holiday_set_with(
            provider,
            self.metadata.holiday_region,
            self.metadata.start_date.year(),
            config.holiday_lookahead_years,
        )
    }

    pub fn compute(&self, config: &PlannerConfig) -> Schedule {
        let holidays = self.holiday_set(config);
        self.compute_with_holidays(&holidays)
    }

    pub fn compute_with_holidays(&self, holidays: &HolidaySet) -> Schedule {
        build_schedule(self.metadata.start_date, &self.milestones, holidays)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::HolidayRegion;

    fn d(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn plan() -> TimelinePlan {
        TimelinePlan::with_milestones(
            PlanMetadata::starting(d(2025, 1, 6)),
            vec![Milestone::new("Planning", 5), Milestone::new("Design", 10)],
        )
    }

    #[test]
    fn row_operations_keep_order() {
        let mut plan = plan();
        assert_eq!(plan.insert_blank_row(), 2);
        plan.update_milestone(2, Milestone::new("Build", 10)).unwrap();
        let removed = plan.remove_milestone(0).unwrap();
        assert_eq!(removed.name, "Planning");
        let names: Vec<_> = plan.milestones.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["Design", "Build"]);
        assert_eq!(
            plan.remove_milestone(9),
            Err(ValidationError::RowOutOfRange { index: 9, len: 2 })
        );
    }

    #[test]
    fn remove_many_ignores_duplicates_and_out_of_range() {
        let mut plan = TimelinePlan::default();
        let removed = plan.remove_milestones(&[5, 0, 0, 42]);
        assert_eq!(removed, 2);
        let names: Vec<_> = plan.milestones.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["Design", "Build", "Test", "Pilot"]);
    }

    #[test]
    fn merge_applies_only_present_fields() {
        let mut plan = plan();
        plan.metadata.staff_count = 4;
        plan.apply_update(
            PlanUpdate {
                holiday_region: Some(HolidayRegion::Canada),
                milestones: Some(Vec::new()),
                ..PlanUpdate::default()
            },
            ImportMode::Merge,
        );
        assert_eq!(plan.metadata.holiday_region, HolidayRegion::Canada);
        assert_eq!(plan.metadata.staff_count, 4);
        assert_eq!(plan.milestones.len(), 2);
    }

    #[test]
    fn overwrite_resets_before_applying() {
        let mut plan = plan();
        plan.metadata.staff_count = 4;
        plan.apply_update(
            PlanUpdate {
                start_date: Some(d(2026, 3, 2)),
                ..PlanUpdate::default()
            },
            ImportMode::Overwrite,
        );
        assert_eq!(plan.metadata.staff_count, 1);
        assert_eq!(plan.metadata.start_date, d(2026, 3, 2));
        assert_eq!(plan.milestones, Milestone::default_template());
    }

    #[test]
    fn compute_uses_configured_region() {
        let mut plan = TimelinePlan::with_milestones(
            PlanMetadata::starting(d(2025, 12, 22)),
            vec![Milestone::new("Holiday week", 3)],
        );
        let config = PlannerConfig::default();
        assert_eq!(plan.compute(&config).projected_completion, d(2025, 12, 25));

        plan.metadata.holiday_region = HolidayRegion::Germany;
        // 25th and 26th are skipped, then the weekend.
        assert_eq!(plan.compute(&config).projected_completion, d(2025, 12, 29));
    }
}

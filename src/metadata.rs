use crate::calendar::HolidayRegion;
use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};

pub const DEFAULT_PROJECT_TITLE: &str = "My new network automation project";

/// Project-level fields of the staffing and timeline form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanMetadata {
    pub project_title: String,
    pub start_date: NaiveDate,
    #[serde(default)]
    pub holiday_region: HolidayRegion,
    #[serde(default = "default_staff_count")]
    pub staff_count: u32,
    /// Free-form markdown.
    #[serde(default)]
    pub staffing_plan_md: String,
}

fn default_staff_count() -> u32 {
    1
}

impl PlanMetadata {
    pub fn starting(start_date: NaiveDate) -> Self {
        Self {
            start_date,
            ..Self::default()
        }
    }
}

impl Default for PlanMetadata {
    fn default() -> Self {
        Self {
            project_title: DEFAULT_PROJECT_TITLE.to_string(),
            start_date: Local::now().date_naive(),
            holiday_region: HolidayRegion::None,
            staff_count: default_staff_count(),
            staffing_plan_md: String::new(),
        }
    }
}

use crate::calendar::{HolidaySet, advance_business_days, is_weekday};
use crate::milestone::{Milestone, ScheduledMilestone};
use chrono::{Datelike, NaiveDate};
use polars::prelude::PlSmallStr;
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Average business days in a calendar month.
pub const BUSINESS_DAYS_PER_MONTH: f64 = 21.75;

/// A chained, calendar-anchored milestone plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schedule {
    pub start_date: NaiveDate,
    pub items: Vec<ScheduledMilestone>,
    pub total_business_days: i64,
    pub projected_completion: NaiveDate,
}

/// Rough calendar length of a schedule, for presentation only.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DurationSummary {
    pub approx_months: f64,
    pub approx_years: f64,
}

impl DurationSummary {
    pub fn from_business_days(total_business_days: i64, business_days_per_month: f64) -> Self {
        let approx_months = if total_business_days > 0 && business_days_per_month > 0.0 {
            total_business_days as f64 / business_days_per_month
        } else {
            0.0
        };
        Self {
            approx_months,
            approx_years: approx_months / 12.0,
        }
    }
}

/// Lays `milestones` end to end starting at `start_date`.
///
/// Each milestone starts where the previous one ended and runs for its
/// duration in business days. Rows with a blank name and no positive
/// duration are dropped; everything else is kept in input order.
pub fn build_schedule(
    start_date: NaiveDate,
    milestones: &[Milestone],
    holidays: &HolidaySet,
) -> Schedule {
    let mut cursor = start_date;
    let mut total_business_days = 0;
    let mut items = Vec::with_capacity(milestones.len());

    for milestone in milestones.iter().filter(|m| !m.is_blank()) {
        let duration = milestone.duration_business_days;
        let end_date = advance_business_days(cursor, duration, holidays);
        items.push(ScheduledMilestone {
            name: milestone.name.clone(),
            duration_business_days: duration,
            start_date: cursor,
            end_date,
            notes: milestone.notes.clone(),
        });
        cursor = end_date;
        total_business_days += milestone.clamped_duration();
    }

    debug!(
        %start_date,
        items = items.len(),
        dropped = milestones.len() - items.len(),
        total_business_days,
        completion = %cursor,
        "built schedule"
    );

    Schedule {
        start_date,
        items,
        total_business_days,
        projected_completion: cursor,
    }
}

impl Schedule {
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn duration_summary(&self) -> DurationSummary {
        self.duration_summary_with(BUSINESS_DAYS_PER_MONTH)
    }

    pub fn duration_summary_with(&self, business_days_per_month: f64) -> DurationSummary {
        DurationSummary::from_business_days(self.total_business_days, business_days_per_month)
    }

    /// Weekday holidays strictly after the start date and up to completion,
    /// i.e. the holidays that actually pushed the schedule out.
    pub fn holidays_skipped(&self, holidays: &HolidaySet) -> Vec<NaiveDate> {
        if self.projected_completion <= self.start_date {
            return Vec::new();
        }
        holidays
            .holidays_between(self.start_date, self.projected_completion)
            .into_iter()
            .filter(|date| *date != self.start_date && is_weekday(*date))
            .collect()
    }

    /// Tabular view of the items with display labels applied.
    pub fn to_dataframe(&self) -> PolarsResult<DataFrame> {
        let names: Vec<&str> = self.items.iter().map(|i| i.display_name()).collect();
        let durations: Vec<i64> = self
            .items
            .iter()
            .map(|i| i.duration_business_days)
            .collect();
        let starts: Vec<i32> = self.items.iter().map(|i| date_to_i32(i.start_date)).collect();
        let ends: Vec<i32> = self.items.iter().map(|i| date_to_i32(i.end_date)).collect();
        let notes: Vec<&str> = self.items.iter().map(|i| i.notes.as_str()).collect();

        let columns = vec![
            Series::new(PlSmallStr::from_static("name"), names).into_column(),
            Series::new(PlSmallStr::from_static("duration_business_days"), durations)
                .into_column(),
            Series::new(PlSmallStr::from_static("start_date"), starts)
                .cast(&DataType::Date)?
                .into_column(),
            Series::new(PlSmallStr::from_static("end_date"), ends)
                .cast(&DataType::Date)?
                .into_column(),
            Series::new(PlSmallStr::from_static("notes"), notes).into_column(),
        ];
        DataFrame::new(columns)
    }
}

/// Days from 0001-01-01 to 1970-01-01, the epoch polars dates count from.
const UNIX_EPOCH_DAYS_FROM_CE: i32 = 719_163;

fn date_to_i32(date: NaiveDate) -> i32 {
    date.num_days_from_ce() - UNIX_EPOCH_DAYS_FROM_CE
}

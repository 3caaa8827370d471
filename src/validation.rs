//! Checks applied to raw form input before it reaches the scheduler.

use crate::milestone::Milestone;
use crate::plan::TimelinePlan;
use chrono::NaiveDate;
use thiserror::Error;

pub const MAX_NAME_LEN: usize = 200;
pub const MAX_MILESTONES: usize = 500;
/// Roughly twenty years of business days.
pub const MAX_DURATION_BUSINESS_DAYS: i64 = 5_000;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("invalid duration '{0}': expected a whole number of business days")]
    InvalidDuration(String),

    #[error("duration {value} exceeds the maximum of {max} business days")]
    DurationTooLong { value: i64, max: i64 },

    #[error("invalid date '{0}': expected YYYY-MM-DD")]
    InvalidDate(String),

    #[error("milestone #{index} name is {len} characters (max {max})")]
    NameTooLong { index: usize, len: usize, max: usize },

    #[error("plan has {count} milestones (max {max})")]
    TooManyMilestones { count: usize, max: usize },

    #[error("no milestone row {index} (plan has {len})")]
    RowOutOfRange { index: usize, len: usize },
}

/// Parses a duration field. Blank means 0 and negatives clamp to 0;
/// anything non-numeric is rejected.
pub fn parse_duration(input: &str) -> Result<i64, ValidationError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Ok(0);
    }
    let value: i64 = trimmed
        .parse()
        .map_err(|_| ValidationError::InvalidDuration(input.to_string()))?;
    check_duration(value.max(0))
}

fn check_duration(value: i64) -> Result<i64, ValidationError> {
    if value > MAX_DURATION_BUSINESS_DAYS {
        return Err(ValidationError::DurationTooLong {
            value,
            max: MAX_DURATION_BUSINESS_DAYS,
        });
    }
    Ok(value)
}

/// Parses an ISO date, ignoring any time-of-day suffix.
pub fn parse_date(input: &str) -> Result<NaiveDate, ValidationError> {
    let trimmed = input.trim();
    let date_part = match trimmed.get(10..11) {
        Some("T") | Some(" ") => &trimmed[..10],
        _ => trimmed,
    };
    NaiveDate::parse_from_str(date_part, "%Y-%m-%d")
        .map_err(|_| ValidationError::InvalidDate(input.to_string()))
}

pub fn validate_milestone(index: usize, milestone: &Milestone) -> Result<(), ValidationError> {
    let len = milestone.name.chars().count();
    if len > MAX_NAME_LEN {
        return Err(ValidationError::NameTooLong {
            index,
            len,
            max: MAX_NAME_LEN,
        });
    }
    check_duration(milestone.duration_business_days)?;
    Ok(())
}

pub fn validate_milestones(milestones: &[Milestone]) -> Result<(), ValidationError> {
    if milestones.len() > MAX_MILESTONES {
        return Err(ValidationError::TooManyMilestones {
            count: milestones.len(),
            max: MAX_MILESTONES,
        });
    }
    for (index, milestone) in milestones.iter().enumerate() {
        validate_milestone(index, milestone)?;
    }
    Ok(())
}

pub fn validate_plan(plan: &TimelinePlan) -> Result<(), ValidationError> {
    validate_milestones(&plan.milestones)
}

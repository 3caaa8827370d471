use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Label renderers show for a milestone without a name.
pub const UNNAMED_LABEL: &str = "(Unnamed)";

/// A named unit of planned work, as entered on the timeline form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Milestone {
    #[serde(default)]
    pub name: String,
    #[serde(rename = "duration", default)]
    pub duration_business_days: i64,
    #[serde(default)]
    pub notes: String,
}

impl Milestone {
    pub fn new(name: impl Into<String>, duration_business_days: i64) -> Self {
        Self {
            name: name.into(),
            duration_business_days,
            notes: String::new(),
        }
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = notes.into();
        self
    }

    /// An empty row: whitespace-only name and no positive duration.
    /// Blank rows are the only ones the scheduler drops.
    pub fn is_blank(&self) -> bool {
        self.name.trim().is_empty() && self.duration_business_days <= 0
    }

    pub fn clamped_duration(&self) -> i64 {
        self.duration_business_days.max(0)
    }

    /// The template a fresh plan starts from.
    pub fn default_template() -> Vec<Milestone> {
        vec![
            Milestone::new("Planning", 5),
            Milestone::new("Design", 10),
            Milestone::new("Build", 10),
            Milestone::new("Test", 5),
            Milestone::new("Pilot", 5),
            Milestone::new("Production Rollout", 10),
        ]
    }
}

impl Default for Milestone {
    fn default() -> Self {
        Self::new("", 0)
    }
}

/// A milestone placed on the calendar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduledMilestone {
    pub name: String,
    pub duration_business_days: i64,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub notes: String,
}

impl ScheduledMilestone {
    pub fn display_name(&self) -> &str {
        let trimmed = self.name.trim();
        if trimmed.is_empty() {
            UNNAMED_LABEL
        } else {
            trimmed
        }
    }
}

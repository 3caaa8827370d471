//! Business-day milestone scheduling for network automation project plans.

pub mod calendar;
pub mod config;
pub mod export;
#[cfg(feature = "http_api")]
pub mod http_api;
pub mod logging;
pub mod metadata;
pub mod milestone;
pub mod narrative;
pub mod persistence;
pub mod plan;
pub mod schedule;
pub mod validation;

pub use calendar::{
    HolidayError, HolidayProvider, HolidayRegion, HolidaySet, RuleBasedHolidays,
    advance_business_days, build_holiday_set, build_holiday_set_with, business_days_between,
    is_weekday,
};
pub use config::{ConfigError, LoggingConfig, PlannerConfig};
pub use export::{
    ExportError, ReportDocument, TimelineExport, archive_file_name, build_archive,
    render_gantt_svg, render_markdown,
};
pub use metadata::PlanMetadata;
pub use milestone::{Milestone, ScheduledMilestone};
#[cfg(feature = "sqlite")]
pub use persistence::sqlite::SqlitePlanStore;
pub use persistence::{
    PersistenceError, PlanStore, import_report_json, load_plan_from_csv, load_plan_from_json,
    save_plan_to_csv, save_plan_to_json,
};
pub use plan::{ImportMode, PlanUpdate, TimelinePlan};
pub use schedule::{DurationSummary, Schedule, build_schedule};
pub use validation::ValidationError;

use crate::plan::TimelinePlan;
use crate::validation::{self, ValidationError};
use std::io;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] io::Error),

    #[cfg(feature = "sqlite")]
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("invalid data: {0}")]
    InvalidData(String),

    #[error("plan store lock poisoned")]
    LockPoisoned,
}

impl From<ValidationError> for PersistenceError {
    fn from(value: ValidationError) -> Self {
        Self::InvalidData(value.to_string())
    }
}

pub type PersistenceResult<T> = Result<T, PersistenceError>;

/// Somewhere a plan can be kept between sessions.
pub trait PlanStore {
    fn save_plan(&self, plan: &TimelinePlan) -> PersistenceResult<()>;
    fn load_plan(&self) -> PersistenceResult<Option<TimelinePlan>>;
}

pub fn validate_plan(plan: &TimelinePlan) -> PersistenceResult<()> {
    validation::validate_plan(plan)?;
    Ok(())
}

pub mod file;
#[cfg(feature = "sqlite")]
pub mod sqlite;

pub use file::{
    import_report_json, load_plan_from_csv, load_plan_from_json, parse_report_json, save_plan_to_csv,
    save_plan_to_json,
};

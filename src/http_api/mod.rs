use std::{net::SocketAddr, sync::Arc};

use axum::{
    Json, Router,
    extract::{Path, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post, put},
};
use chrono::{NaiveDate, Utc};
use parking_lot::RwLock;
use serde::Serialize;
use serde_json::json;
use tracing::info;

use crate::{
    HolidayRegion, Milestone, PlannerConfig, Schedule, TimelinePlan,
    export::{ExportError, archive_file_name, build_archive},
    schedule::DurationSummary,
    validation::{self, MAX_MILESTONES, ValidationError},
};

#[derive(Clone)]
pub struct AppState {
    plan: Arc<RwLock<TimelinePlan>>,
    config: Arc<PlannerConfig>,
}

impl AppState {
    pub fn new(plan: TimelinePlan, config: PlannerConfig) -> Self {
        Self {
            plan: Arc::new(RwLock::new(plan)),
            config: Arc::new(config),
        }
    }

    fn plan(&self) -> Arc<RwLock<TimelinePlan>> {
        self.plan.clone()
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
    message: String,
}

#[derive(Debug)]
enum ApiError {
    NotFound(String),
    Invalid(String),
    Internal(String),
}

impl From<ValidationError> for ApiError {
    fn from(value: ValidationError) -> Self {
        match value {
            ValidationError::RowOutOfRange { .. } => ApiError::NotFound(value.to_string()),
            other => ApiError::Invalid(other.to_string()),
        }
    }
}

impl From<ExportError> for ApiError {
    fn from(value: ExportError) -> Self {
        ApiError::Internal(value.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error, message) = match self {
            ApiError::NotFound(message) => (StatusCode::NOT_FOUND, "not_found", message),
            ApiError::Invalid(message) => (StatusCode::BAD_REQUEST, "invalid_request", message),
            ApiError::Internal(message) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", message)
            }
        };
        (status, Json(ErrorBody { error, message })).into_response()
    }
}

#[derive(Debug, Serialize)]
struct RegionEntry {
    code: &'static str,
    label: &'static str,
}

#[derive(Debug, Serialize)]
struct ScheduleResponse {
    schedule: Schedule,
    summary: DurationSummary,
    holidays_skipped: Vec<NaiveDate>,
}

impl ScheduleResponse {
    fn compute(plan: &TimelinePlan, config: &PlannerConfig) -> Self {
        let holidays = plan.holiday_set(config);
        let schedule = plan.compute_with_holidays(&holidays);
        Self {
            summary: schedule.duration_summary_with(config.business_days_per_month),
            holidays_skipped: schedule.holidays_skipped(&holidays),
            schedule,
        }
    }
}

#[derive(Debug, Serialize)]
struct CreatedMilestone {
    index: usize,
    milestone: Milestone,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/regions", get(list_regions))
        .route("/plan", get(get_plan).put(replace_plan))
        .route("/milestones", post(create_milestone))
        .route(
            "/milestones/:index",
            put(update_milestone).delete(delete_milestone),
        )
        .route("/schedule", get(get_schedule))
        .route("/schedule/compute", post(compute_schedule))
        .route("/export", get(export_archive))
        .with_state(state)
}

pub async fn serve(addr: SocketAddr, plan: TimelinePlan, config: PlannerConfig) -> std::io::Result<()> {
    let state = AppState::new(plan, config);
    let app = router(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "http api listening");
    axum::serve(listener, app).await
}

async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

async fn list_regions() -> Json<Vec<RegionEntry>> {
    Json(
        HolidayRegion::ALL
            .into_iter()
            .map(|region| RegionEntry {
                code: region.code(),
                label: region.label(),
            })
            .collect(),
    )
}

async fn get_plan(State(state): State<AppState>) -> Json<TimelinePlan> {
    let plan = state.plan();
    let current = plan.read().clone();
    Json(current)
}

async fn replace_plan(
    State(state): State<AppState>,
    Json(incoming): Json<TimelinePlan>,
) -> Result<Json<TimelinePlan>, ApiError> {
    validation::validate_plan(&incoming)?;
    let plan = state.plan();
    *plan.write() = incoming.clone();
    Ok(Json(incoming))
}

async fn create_milestone(
    State(state): State<AppState>,
    Json(milestone): Json<Milestone>,
) -> Result<(StatusCode, Json<CreatedMilestone>), ApiError> {
    let plan = state.plan();
    let index = {
        let mut guard = plan.write();
        if guard.milestones.len() >= MAX_MILESTONES {
            return Err(ValidationError::TooManyMilestones {
                count: guard.milestones.len() + 1,
                max: MAX_MILESTONES,
            }
            .into());
        }
        validation::validate_milestone(guard.milestones.len(), &milestone)?;
        guard.add_milestone(milestone.clone())
    };
    Ok((StatusCode::CREATED, Json(CreatedMilestone { index, milestone })))
}

async fn update_milestone(
    State(state): State<AppState>,
    Path(index): Path<usize>,
    Json(milestone): Json<Milestone>,
) -> Result<Json<Milestone>, ApiError> {
    validation::validate_milestone(index, &milestone)?;
    let plan = state.plan();
    plan.write().update_milestone(index, milestone.clone())?;
    Ok(Json(milestone))
}

async fn delete_milestone(
    State(state): State<AppState>,
    Path(index): Path<usize>,
) -> Result<StatusCode, ApiError> {
    let plan = state.plan();
    plan.write().remove_milestone(index)?;
    Ok(StatusCode::NO_CONTENT)
}

async fn get_schedule(State(state): State<AppState>) -> Json<ScheduleResponse> {
    let plan = state.plan().read().clone();
    Json(ScheduleResponse::compute(&plan, &state.config))
}

async fn compute_schedule(
    State(state): State<AppState>,
    Json(plan): Json<TimelinePlan>,
) -> Result<Json<ScheduleResponse>, ApiError> {
    validation::validate_plan(&plan)?;
    Ok(Json(ScheduleResponse::compute(&plan, &state.config)))
}

async fn export_archive(State(state): State<AppState>) -> Result<Response, ApiError> {
    let plan = state.plan().read().clone();
    let schedule = plan.compute(&state.config);
    let generated_at = Utc::now();
    let bytes = build_archive(&plan, &schedule, &state.config, generated_at)?;
    let disposition = format!(
        "attachment; filename=\"{}\"",
        archive_file_name(&plan.metadata.project_title, generated_at)
    );
    Ok((
        [
            (header::CONTENT_TYPE, "application/zip".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        bytes,
    )
        .into_response())
}

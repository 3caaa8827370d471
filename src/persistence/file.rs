use super::{PersistenceError, PersistenceResult};
use crate::calendar::HolidayRegion;
use crate::metadata::PlanMetadata;
use crate::milestone::Milestone;
use crate::plan::{ImportMode, PlanUpdate, TimelinePlan};
use crate::validation::parse_date;
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::path::Path;
use tracing::{info, warn};

const METADATA_ROW_NAME: &str = "__metadata__";

#[derive(Serialize, Deserialize)]
struct PlanSnapshot {
    metadata: PlanMetadata,
    #[serde(default)]
    milestones: Vec<Milestone>,
}

impl PlanSnapshot {
    fn from_plan(plan: &TimelinePlan) -> PersistenceResult<Self> {
        super::validate_plan(plan)?;
        Ok(Self {
            metadata: plan.metadata.clone(),
            milestones: plan.milestones.clone(),
        })
    }

    fn into_plan(self) -> PersistenceResult<TimelinePlan> {
        let plan = TimelinePlan::with_milestones(self.metadata, self.milestones);
        super::validate_plan(&plan)?;
        Ok(plan)
    }
}

pub fn save_plan_to_json<P: AsRef<Path>>(plan: &TimelinePlan, path: P) -> PersistenceResult<()> {
    let snapshot = PlanSnapshot::from_plan(plan)?;
    let file = File::create(path.as_ref())?;
    serde_json::to_writer_pretty(file, &snapshot)?;
    info!(path = %path.as_ref().display(), rows = plan.milestones.len(), "saved plan as json");
    Ok(())
}

pub fn load_plan_from_json<P: AsRef<Path>>(path: P) -> PersistenceResult<TimelinePlan> {
    let file = File::open(path)?;
    let snapshot: PlanSnapshot = serde_json::from_reader(file)?;
    snapshot.into_plan()
}

#[derive(Default, Serialize, Deserialize)]
struct MilestoneCsvRecord {
    name: String,
    duration_business_days: String,
    notes: String,
    #[serde(default)]
    metadata_json: String,
}

impl From<&Milestone> for MilestoneCsvRecord {
    fn from(milestone: &Milestone) -> Self {
        Self {
            name: milestone.name.clone(),
            duration_business_days: milestone.duration_business_days.to_string(),
            notes: milestone.notes.clone(),
            metadata_json: String::new(),
        }
    }
}

impl MilestoneCsvRecord {
    fn metadata_row(metadata: &PlanMetadata) -> PersistenceResult<Self> {
        Ok(Self {
            name: METADATA_ROW_NAME.to_string(),
            metadata_json: serde_json::to_string(metadata)?,
            ..Self::default()
        })
    }

    fn is_metadata_row(&self) -> bool {
        !self.metadata_json.trim().is_empty()
    }

    fn into_milestone(self) -> PersistenceResult<Milestone> {
        if self.is_metadata_row() {
            return Err(PersistenceError::InvalidData(
                "metadata row cannot be converted to a milestone".into(),
            ));
        }
        let duration = parse_i64(&self.duration_business_days)?;
        Ok(Milestone::new(self.name, duration).with_notes(self.notes))
    }
}

pub fn save_plan_to_csv<P: AsRef<Path>>(plan: &TimelinePlan, path: P) -> PersistenceResult<()> {
    super::validate_plan(plan)?;
    let file = File::create(path.as_ref())?;
    let mut writer = csv::Writer::from_writer(file);
    writer.serialize(MilestoneCsvRecord::metadata_row(&plan.metadata)?)?;
    for milestone in &plan.milestones {
        writer.serialize(MilestoneCsvRecord::from(milestone))?;
    }
    writer.flush()?;
    info!(path = %path.as_ref().display(), rows = plan.milestones.len(), "saved plan as csv");
    Ok(())
}

/// Reads a plan written by [`save_plan_to_csv`]. A file without the
/// metadata row gets default metadata.
pub fn load_plan_from_csv<P: AsRef<Path>>(path: P) -> PersistenceResult<TimelinePlan> {
    let file = File::open(path)?;
    let mut reader = csv::Reader::from_reader(file);
    let mut metadata: Option<PlanMetadata> = None;
    let mut milestones = Vec::new();
    for record in reader.deserialize::<MilestoneCsvRecord>() {
        let record = record?;
        if record.is_metadata_row() {
            if metadata.is_some() {
                return Err(PersistenceError::InvalidData(
                    "CSV file contained multiple metadata rows".into(),
                ));
            }
            metadata = Some(serde_json::from_str(&record.metadata_json).map_err(|err| {
                PersistenceError::InvalidData(format!("invalid metadata json: {err}"))
            })?);
            continue;
        }
        milestones.push(record.into_milestone()?);
    }

    let plan = TimelinePlan::with_milestones(metadata.unwrap_or_default(), milestones);
    super::validate_plan(&plan)?;
    Ok(plan)
}

#[derive(Deserialize)]
struct ReportFile {
    #[serde(default)]
    initiative: Option<ReportInitiative>,
    #[serde(default)]
    timeline: Option<ReportTimeline>,
}

#[derive(Deserialize)]
struct ReportInitiative {
    #[serde(default)]
    title: Option<String>,
}

#[derive(Deserialize)]
struct ReportTimeline {
    #[serde(default)]
    start_date: Option<String>,
    #[serde(default)]
    staff_count: Option<serde_json::Value>,
    #[serde(default)]
    staffing_plan_md: Option<String>,
    #[serde(default)]
    holiday_region: Option<String>,
    #[serde(default)]
    items: Option<Vec<ReportItem>>,
}

#[derive(Deserialize)]
struct ReportItem {
    #[serde(default)]
    name: String,
    #[serde(default)]
    duration_bd: i64,
    #[serde(default)]
    notes: String,
}

/// Extracts the plan fields a previously exported report carries. Fields
/// the report leaves out or sets to null stay `None`.
pub fn parse_report_json(text: &str) -> PersistenceResult<PlanUpdate> {
    let report: ReportFile = serde_json::from_str(text)?;
    let mut update = PlanUpdate {
        project_title: report
            .initiative
            .and_then(|i| i.title)
            .filter(|t| !t.trim().is_empty()),
        ..PlanUpdate::default()
    };
    let Some(timeline) = report.timeline else {
        return Ok(update);
    };
    update.start_date = timeline
        .start_date
        .as_deref()
        .filter(|s| !s.trim().is_empty())
        .and_then(|s| match parse_date(s) {
            Ok(date) => Some(date),
            Err(err) => {
                warn!(value = %s, error = %err, "ignoring unparseable start date in report");
                None
            }
        });
    update.staff_count = timeline.staff_count.as_ref().and_then(lenient_staff_count);
    update.staffing_plan_md = timeline.staffing_plan_md;
    update.holiday_region = timeline
        .holiday_region
        .as_deref()
        .map(HolidayRegion::parse_lossy);
    update.milestones = timeline.items.map(|items| {
        items
            .into_iter()
            .map(|item| Milestone::new(item.name, item.duration_bd).with_notes(item.notes))
            .collect()
    });
    if let Some(rows) = &update.milestones {
        crate::validation::validate_milestones(rows)?;
    }
    Ok(update)
}

/// Reads a staff count the way hand-edited reports write it: numbers are
/// clamped into range, numeric strings are parsed and a blank string is 0.
fn lenient_staff_count(value: &serde_json::Value) -> Option<u32> {
    use serde_json::Value;
    match value {
        Value::Null => None,
        Value::Number(n) => {
            let whole = n
                .as_i64()
                .or_else(|| n.as_u64().map(|u| i64::try_from(u).unwrap_or(i64::MAX)))
                .or_else(|| n.as_f64().map(|f| f.trunc() as i64))?;
            Some(whole.clamp(0, i64::from(u32::MAX)) as u32)
        }
        Value::String(s) if s.trim().is_empty() => Some(0),
        Value::String(s) => match s.trim().parse::<i64>() {
            Ok(n) => Some(n.clamp(0, i64::from(u32::MAX)) as u32),
            Err(_) => {
                warn!(value = %s, "ignoring non-numeric staff count in report");
                None
            }
        },
        other => {
            warn!(value = %other, "ignoring staff count of unexpected type in report");
            None
        }
    }
}

/// Applies an exported report JSON to `plan`.
pub fn import_report_json<P: AsRef<Path>>(
    path: P,
    plan: &mut TimelinePlan,
    mode: ImportMode,
) -> PersistenceResult<()> {
    let text = fs::read_to_string(path.as_ref())?;
    let update = parse_report_json(&text)?;
    plan.apply_update(update, mode);
    info!(path = %path.as_ref().display(), %mode, "imported report");
    Ok(())
}

fn parse_i64(input: &str) -> PersistenceResult<i64> {
    if input.trim().is_empty() {
        return Ok(0);
    }
    input
        .trim()
        .parse::<i64>()
        .map_err(|e| PersistenceError::InvalidData(format!("invalid integer '{input}': {e}")))
}

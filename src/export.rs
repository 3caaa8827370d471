//! Report artifacts: the timeline JSON section, the markdown design
//! document, a Gantt chart and the zip bundle that carries all three.

use crate::config::PlannerConfig;
use crate::milestone::ScheduledMilestone;
use crate::narrative::{is_meaningful, join_human, md_line};
use crate::plan::TimelinePlan;
use crate::schedule::Schedule;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::io::{Cursor, Write};
use thiserror::Error;
use tracing::info;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

pub const GANTT_FILE_NAME: &str = "Gantt.svg";
const DATE_FMT: &str = "%Y-%m-%d";
const TIMESTAMP_FMT: &str = "%Y%m%d_%H%M%S";
const MAX_TITLE_LEN: usize = 30;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("failed to serialize report: {0}")]
    Json(#[from] serde_json::Error),

    #[error("failed to write archive: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// One scheduled row as written to the report JSON.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportItem {
    pub name: String,
    pub duration_bd: i64,
    pub start: String,
    pub end: String,
    #[serde(default)]
    pub notes: String,
}

impl From<&ScheduledMilestone> for ExportItem {
    fn from(item: &ScheduledMilestone) -> Self {
        Self {
            name: item.name.clone(),
            duration_bd: item.duration_business_days,
            start: item.start_date.format(DATE_FMT).to_string(),
            end: item.end_date.format(DATE_FMT).to_string(),
            notes: item.notes.clone(),
        }
    }
}

/// The `timeline` section of the report JSON.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimelineExport {
    pub start_date: String,
    pub total_business_days: i64,
    /// `None` when no milestone was scheduled.
    pub projected_completion: Option<String>,
    pub staff_count: u32,
    pub staffing_plan_md: String,
    pub holiday_region: String,
    pub items: Vec<ExportItem>,
}

impl TimelineExport {
    pub fn new(plan: &TimelinePlan, schedule: &Schedule) -> Self {
        let projected_completion = (!schedule.is_empty())
            .then(|| schedule.projected_completion.format(DATE_FMT).to_string());
        Self {
            start_date: schedule.start_date.format(DATE_FMT).to_string(),
            total_business_days: schedule.total_business_days,
            projected_completion,
            staff_count: plan.metadata.staff_count,
            staffing_plan_md: plan.metadata.staffing_plan_md.clone(),
            holiday_region: plan.metadata.holiday_region.label().to_string(),
            items: schedule.items.iter().map(ExportItem::from).collect(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Initiative {
    #[serde(default)]
    pub title: String,
}

/// Top-level report JSON.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportDocument {
    pub initiative: Initiative,
    pub timeline: TimelineExport,
    pub naf_report_md: String,
}

impl ReportDocument {
    pub fn new(plan: &TimelinePlan, schedule: &Schedule, config: &PlannerConfig) -> Self {
        Self {
            initiative: Initiative {
                title: plan.metadata.project_title.clone(),
            },
            timeline: TimelineExport::new(plan, schedule),
            naf_report_md: render_markdown(plan, schedule, config),
        }
    }

    pub fn to_json_pretty(&self) -> Result<String, ExportError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Renders the staffing and timeline part of the design document.
pub fn render_markdown(plan: &TimelinePlan, schedule: &Schedule, config: &PlannerConfig) -> String {
    let meta = &plan.metadata;
    let title = if meta.project_title.trim().is_empty() {
        "Untitled project"
    } else {
        meta.project_title.trim()
    };

    let mut out = format!("# Solution Design Document: {title}\n\n");
    out.push_str("## Staffing, Timeline, & Milestones\n\n");

    if schedule.is_empty() {
        out.push_str("- No schedule: add at least one milestone to build a timeline.\n");
    } else {
        out.push_str(&format!(
            "- Staff {} • Start {} • Total {} bd • Completion {}\n",
            meta.staff_count,
            schedule.start_date.format(DATE_FMT),
            schedule.total_business_days,
            schedule.projected_completion.format(DATE_FMT),
        ));
        for item in schedule.items.iter().take(config.report_item_limit) {
            out.push_str(&format!(
                "  - {}: {} → {} ({} bd)\n",
                item.display_name(),
                item.start_date.format(DATE_FMT),
                item.end_date.format(DATE_FMT),
                item.duration_business_days,
            ));
        }
        let hidden = schedule.len().saturating_sub(config.report_item_limit);
        if hidden > 0 {
            out.push_str(&format!("  - … and {hidden} more\n"));
        }

        let summary = schedule.duration_summary_with(config.business_days_per_month);
        out.push_str(&md_line(&format!(
            "Approximate duration: {:.1} months ({:.2} years)",
            summary.approx_months, summary.approx_years
        )));
        out.push('\n');

        let holidays = plan.holiday_set(config);
        let skipped: Vec<String> = schedule
            .holidays_skipped(&holidays)
            .into_iter()
            .map(|d| d.format(DATE_FMT).to_string())
            .collect();
        if !skipped.is_empty() {
            out.push_str(&md_line(&format!(
                "Holidays observed ({}): {}",
                meta.holiday_region,
                join_human(&skipped)
            )));
            out.push('\n');
        }

        let noted: Vec<String> = schedule
            .items
            .iter()
            .take(config.report_item_limit)
            .filter(|item| is_meaningful(&item.notes))
            .map(|item| md_line(&format!("{}: {}", item.display_name(), item.notes.trim())))
            .collect();
        if !noted.is_empty() {
            out.push_str("\n### Milestone notes\n\n");
            for line in noted {
                out.push_str(&line);
                out.push('\n');
            }
        }
    }

    if !meta.staffing_plan_md.trim().is_empty() {
        out.push_str("\n## Staffing Plan\n\n");
        out.push_str(meta.staffing_plan_md.trim());
        out.push('\n');
    }
    out
}

// Set3, the qualitative palette the questionnaire charts use.
const PALETTE: [&str; 12] = [
    "#8dd3c7", "#ffffb3", "#bebada", "#fb8072", "#80b1d3", "#fdb462", "#b3de69", "#fccde5",
    "#d9d9d9", "#bc80bd", "#ccebc5", "#ffed6f",
];
const CHART_WIDTH: i64 = 960;
const LABEL_WIDTH: i64 = 240;
const ROW_HEIGHT: i64 = 26;
const HEADER_HEIGHT: i64 = 40;

/// Draws one bar per milestone, first milestone on top, capped at
/// `row_limit` rows.
pub fn render_gantt_svg(schedule: &Schedule, row_limit: usize) -> String {
    let rows: Vec<&ScheduledMilestone> = schedule.items.iter().take(row_limit).collect();
    if rows.is_empty() {
        return format!(
            "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{CHART_WIDTH}\" height=\"80\">\n\
             <text x=\"{}\" y=\"45\" text-anchor=\"middle\" font-family=\"sans-serif\" font-size=\"16\">No schedule</text>\n\
             </svg>\n",
            CHART_WIDTH / 2
        );
    }

    let first = rows.iter().map(|r| r.start_date).min().unwrap_or(schedule.start_date);
    let last = rows.iter().map(|r| r.end_date).max().unwrap_or(first);
    let span_days = (last - first).num_days().max(1);
    let plot_width = CHART_WIDTH - LABEL_WIDTH - 20;
    let x_of = |date: NaiveDate| LABEL_WIDTH + (date - first).num_days() * plot_width / span_days;
    let height = HEADER_HEIGHT + ROW_HEIGHT * rows.len() as i64 + 10;

    let mut svg = format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{CHART_WIDTH}\" height=\"{height}\" font-family=\"sans-serif\" font-size=\"12\">\n"
    );
    svg.push_str(&format!(
        "<text x=\"{LABEL_WIDTH}\" y=\"20\">{}</text>\n<text x=\"{}\" y=\"20\" text-anchor=\"end\">{}</text>\n",
        first.format(DATE_FMT),
        CHART_WIDTH - 20,
        last.format(DATE_FMT),
    ));
    for (row, item) in rows.iter().enumerate() {
        let y = HEADER_HEIGHT + ROW_HEIGHT * row as i64;
        let x_start = x_of(item.start_date);
        // Zero-length milestones still get a visible sliver.
        let width = (x_of(item.end_date) - x_start).max(2);
        svg.push_str(&format!(
            "<text x=\"{}\" y=\"{}\" text-anchor=\"end\">{}</text>\n",
            LABEL_WIDTH - 8,
            y + ROW_HEIGHT / 2 + 4,
            xml_escape(item.display_name()),
        ));
        svg.push_str(&format!(
            "<rect x=\"{x_start}\" y=\"{}\" width=\"{width}\" height=\"{}\" fill=\"{}\"><title>{}: {} to {}</title></rect>\n",
            y + 3,
            ROW_HEIGHT - 6,
            PALETTE[row % PALETTE.len()],
            xml_escape(item.display_name()),
            item.start_date.format(DATE_FMT),
            item.end_date.format(DATE_FMT),
        ));
    }
    svg.push_str("</svg>\n");
    svg
}

fn xml_escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            c => out.push(c),
        }
    }
    out
}

/// Filesystem-safe form of a project title, at most 30 characters.
pub fn sanitize_title(title: &str) -> String {
    let replaced: String = title
        .trim()
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();
    let mut collapsed = String::with_capacity(replaced.len());
    for c in replaced.chars() {
        if c == '_' && collapsed.ends_with('_') {
            continue;
        }
        collapsed.push(c);
    }
    let trimmed = collapsed.trim_matches('_');
    let base = if trimmed.is_empty() { "solution" } else { trimmed };
    base.chars().take(MAX_TITLE_LEN).collect()
}

pub fn archive_file_name(title: &str, generated_at: DateTime<Utc>) -> String {
    format!(
        "{}_{}.zip",
        sanitize_title(title),
        generated_at.format(TIMESTAMP_FMT)
    )
}

/// Names of the entries written by [`build_archive`], in order.
pub fn archive_entry_names(title: &str, generated_at: DateTime<Utc>) -> [String; 3] {
    let stem = format!(
        "naf_report_{}_{}",
        sanitize_title(title),
        generated_at.format(TIMESTAMP_FMT)
    );
    [
        format!("{stem}.json"),
        format!("{stem}.md"),
        GANTT_FILE_NAME.to_string(),
    ]
}

/// Bundles the report JSON, the markdown document and the Gantt chart
/// into an in-memory zip.
pub fn build_archive(
    plan: &TimelinePlan,
    schedule: &Schedule,
    config: &PlannerConfig,
    generated_at: DateTime<Utc>,
) -> Result<Vec<u8>, ExportError> {
    let report = ReportDocument::new(plan, schedule, config);
    let json = report.to_json_pretty()?;
    let markdown = format!(
        "{}\n\nGenerated: {}\n",
        report.naf_report_md.trim_end(),
        generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    );
    let gantt = render_gantt_svg(schedule, config.gantt_row_limit);
    let [json_name, md_name, gantt_name] =
        archive_entry_names(&plan.metadata.project_title, generated_at);

    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    for (name, body) in [
        (json_name, json.as_bytes()),
        (md_name, markdown.as_bytes()),
        (gantt_name, gantt.as_bytes()),
    ] {
        zip.start_file(name, options)?;
        zip.write_all(body)?;
    }
    let bytes = zip.finish()?.into_inner();
    info!(
        items = schedule.len(),
        bytes = bytes.len(),
        "built report archive"
    );
    Ok(bytes)
}

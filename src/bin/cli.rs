use chrono::Utc;
use naf_planner::{
    HolidayRegion, ImportMode, Milestone, PlannerConfig, TimelinePlan, build_archive,
    export::archive_file_name, import_report_json, load_plan_from_csv, load_plan_from_json,
    logging, render_markdown, save_plan_to_csv, save_plan_to_json,
    validation::{parse_date, parse_duration},
};
use polars::prelude::{AnyValue, Column, DataFrame, IntoColumn, NamedFrom, PlSmallStr, PolarsResult, Series};
use std::fs;
use std::io::{self, Write};
use std::path::Path;

fn render_df_as_text_table(df: &DataFrame) -> String {
    let columns = df.get_columns();
    let col_names: Vec<String> = columns.iter().map(|c| c.name().to_string()).collect();
    let cell = |av: &AnyValue| match av {
        AnyValue::Null => String::new(),
        AnyValue::Int64(v) => v.to_string(),
        AnyValue::UInt32(v) => v.to_string(),
        AnyValue::String(s) => s.to_string(),
        _ => av.to_string(),
    };

    let mut widths: Vec<usize> = col_names.iter().map(|n| n.chars().count()).collect();
    for (ci, col) in columns.iter().enumerate() {
        for row_idx in 0..df.height() {
            if let Ok(ref av) = col.get(row_idx) {
                widths[ci] = widths[ci].max(cell(av).chars().count());
            }
        }
    }

    let mut sep = String::from("+");
    for w in &widths {
        sep.push_str(&"-".repeat(*w + 2));
        sep.push('+');
    }

    let mut out = String::new();
    out.push_str(&sep);
    out.push('\n');

    out.push('|');
    for (i, name) in col_names.iter().enumerate() {
        out.push(' ');
        out.push_str(name);
        out.push_str(&" ".repeat(widths[i] - name.chars().count()));
        out.push_str(" |");
    }
    out.push('\n');
    out.push_str(&sep);
    out.push('\n');

    for row_idx in 0..df.height() {
        out.push('|');
        for (ci, col) in columns.iter().enumerate() {
            let s = col.get(row_idx).map(|av| cell(&av)).unwrap_or_default();
            out.push(' ');
            out.push_str(&s);
            out.push_str(&" ".repeat(widths[ci].saturating_sub(s.chars().count())));
            out.push_str(" |");
        }
        out.push('\n');
    }

    out.push_str(&sep);
    out.push('\n');
    out
}

fn plan_rows_dataframe(plan: &TimelinePlan) -> PolarsResult<DataFrame> {
    let rows: Vec<u32> = (1..=plan.milestones.len() as u32).collect();
    let names: Vec<String> = plan.milestones.iter().map(|m| m.name.clone()).collect();
    let durations: Vec<i64> = plan
        .milestones
        .iter()
        .map(|m| m.duration_business_days)
        .collect();
    let notes: Vec<String> = plan.milestones.iter().map(|m| m.notes.clone()).collect();
    let columns: Vec<Column> = vec![
        Series::new(PlSmallStr::from_static("#"), rows).into_column(),
        Series::new(PlSmallStr::from_static("name"), names).into_column(),
        Series::new(PlSmallStr::from_static("duration_business_days"), durations).into_column(),
        Series::new(PlSmallStr::from_static("notes"), notes).into_column(),
    ];
    DataFrame::new(columns)
}

fn print_help() {
    println!(
        "Commands:\n  help                               Show this help\n  show                               Show plan details and milestone rows\n  add <duration> <name...>           Append a milestone\n  new                                Append an empty milestone row\n  edit <row> <duration> <name...>    Replace a row's name and duration\n  notes <row> <text...>              Set a row's notes (rest of line)\n  delete <row>                       Remove a row\n  start <YYYY-MM-DD>                 Set the project start date\n  region <name|code>                 Set the holiday region (none, us, ca, uk, de, in, au)\n  staff <count>                      Set the staff count\n  staffing <text...>                 Set the staffing plan (markdown)\n  title <text...>                    Set the project title\n  compute                            Build the schedule\n  summary                            Print the timeline section of the design document\n  reset                              Restore the default milestone template\n  save <json|csv> <path>             Persist the plan to disk\n  load <json|csv> <path>             Load a plan from disk\n  import <path> [merge]              Apply an exported report JSON\n  export <dir>                       Write the report zip into a directory\n  quit|exit                          Exit"
    );
}

fn print_plan(plan: &TimelinePlan) {
    let meta = &plan.metadata;
    println!("Project title : {}", meta.project_title);
    println!("Start date    : {}", meta.start_date);
    println!("Holiday region: {}", meta.holiday_region);
    println!("Staff count   : {}", meta.staff_count);
    match plan_rows_dataframe(plan) {
        Ok(df) => println!("{}", render_df_as_text_table(&df)),
        Err(e) => println!("Render error: {}", e),
    }
}

fn parse_row(input: Option<&str>, plan: &TimelinePlan) -> Option<usize> {
    let row: usize = input?.parse().ok()?;
    (1..=plan.milestones.len()).contains(&row).then(|| row - 1)
}

fn rest_of_line<'a>(input: &'a str, skip: usize) -> &'a str {
    let mut rest = input.trim_start();
    for _ in 0..skip {
        rest = rest
            .split_once(char::is_whitespace)
            .map(|(_, tail)| tail.trim_start())
            .unwrap_or("");
    }
    rest.trim_end()
}

fn main() {
    let config = match PlannerConfig::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Config error: {e}; using defaults");
            PlannerConfig::default()
        }
    };
    logging::init(&config.logging);

    let mut plan = TimelinePlan::default();
    plan.metadata.holiday_region = config.default_region;

    println!("NAF Planner (CLI) - type 'help' for commands\n");
    print_plan(&plan);

    let stdin = io::stdin();
    let mut line = String::new();
    loop {
        print!("> ");
        let _ = io::stdout().flush();
        line.clear();
        match stdin.read_line(&mut line) {
            Ok(0) | Err(_) => break,
            Ok(_) => {}
        }
        let input = line.trim();
        if input.is_empty() {
            continue;
        }

        let mut parts = input.split_whitespace();
        let cmd = parts.next().unwrap_or("");

        match cmd {
            "help" => print_help(),
            "quit" | "exit" => break,
            "show" => print_plan(&plan),
            "new" => {
                let index = plan.insert_blank_row();
                println!("Added empty row {}.", index + 1);
            }
            "add" => {
                let Some(dur_s) = parts.next() else {
                    println!("Usage: add <duration> <name...>");
                    continue;
                };
                let duration = match parse_duration(dur_s) {
                    Ok(v) => v,
                    Err(e) => {
                        println!("Error: {}", e);
                        continue;
                    }
                };
                let name = rest_of_line(input, 2);
                let index = plan.add_milestone(Milestone::new(name, duration));
                println!("Added row {}.", index + 1);
            }
            "edit" => {
                let Some(index) = parse_row(parts.next(), &plan) else {
                    println!("Invalid row");
                    continue;
                };
                let duration = match parts.next().map(parse_duration) {
                    Some(Ok(v)) => v,
                    Some(Err(e)) => {
                        println!("Error: {}", e);
                        continue;
                    }
                    None => {
                        println!("Usage: edit <row> <duration> <name...>");
                        continue;
                    }
                };
                let notes = plan.milestones[index].notes.clone();
                let milestone = Milestone::new(rest_of_line(input, 3), duration).with_notes(notes);
                match plan.update_milestone(index, milestone) {
                    Ok(()) => println!("Updated row {}.", index + 1),
                    Err(e) => println!("Error: {}", e),
                }
            }
            "notes" => {
                let Some(index) = parse_row(parts.next(), &plan) else {
                    println!("Invalid row");
                    continue;
                };
                plan.milestones[index].notes = rest_of_line(input, 2).to_string();
                println!("Notes set for row {}.", index + 1);
            }
            "delete" => {
                let Some(index) = parse_row(parts.next(), &plan) else {
                    println!("Invalid row");
                    continue;
                };
                match plan.remove_milestone(index) {
                    Ok(removed) => println!(
                        "Deleted row {} ({}).",
                        index + 1,
                        if removed.name.trim().is_empty() {
                            naf_planner::milestone::UNNAMED_LABEL
                        } else {
                            removed.name.as_str()
                        }
                    ),
                    Err(e) => println!("Error: {}", e),
                }
            }
            "start" => match parts.next().map(parse_date) {
                Some(Ok(date)) => {
                    plan.metadata.start_date = date;
                    println!("Start date set to {}.", date);
                }
                Some(Err(e)) => println!("Error: {}", e),
                None => println!("Usage: start <YYYY-MM-DD>"),
            },
            "region" => match rest_of_line(input, 1).parse::<HolidayRegion>() {
                Ok(region) => {
                    plan.metadata.holiday_region = region;
                    println!("Holiday region set to {}.", region);
                }
                Err(e) => {
                    let known = HolidayRegion::ALL
                        .iter()
                        .map(|r| r.code())
                        .collect::<Vec<_>>()
                        .join(", ");
                    println!("Error: {} (known: {})", e, known);
                }
            },
            "staff" => match parts.next().map(str::parse::<u32>) {
                Some(Ok(count)) => {
                    plan.metadata.staff_count = count;
                    println!("Staff count set to {}.", count);
                }
                _ => println!("Usage: staff <count>"),
            },
            "staffing" => {
                plan.metadata.staffing_plan_md = rest_of_line(input, 1).to_string();
                println!("Staffing plan updated.");
            }
            "title" => {
                plan.metadata.project_title = rest_of_line(input, 1).to_string();
                println!("Project title set.");
            }
            "compute" => {
                let schedule = plan.compute(&config);
                if schedule.is_empty() {
                    println!("Add at least one milestone to build a timeline.");
                    continue;
                }
                match schedule.to_dataframe() {
                    Ok(df) => println!("{}", render_df_as_text_table(&df)),
                    Err(e) => println!("Render error: {}", e),
                }
                let summary = schedule.duration_summary_with(config.business_days_per_month);
                println!(
                    "Projected completion: {} ({} business days, ~{:.1} months / {:.2} years)",
                    schedule.projected_completion,
                    schedule.total_business_days,
                    summary.approx_months,
                    summary.approx_years
                );
            }
            "summary" => {
                let schedule = plan.compute(&config);
                println!("{}", render_markdown(&plan, &schedule, &config));
            }
            "reset" => {
                plan.reset_to_defaults();
                println!("Milestones reset to defaults.");
            }
            "save" => {
                let fmt = parts.next();
                let path = parts.next();
                match (fmt, path) {
                    (Some("json"), Some(p)) => match save_plan_to_json(&plan, p) {
                        Ok(_) => println!("Plan saved to {}", p),
                        Err(e) => println!("Save error: {}", e),
                    },
                    (Some("csv"), Some(p)) => match save_plan_to_csv(&plan, p) {
                        Ok(_) => println!("Plan saved to {}", p),
                        Err(e) => println!("Save error: {}", e),
                    },
                    _ => println!("Usage: save <json|csv> <path>"),
                }
            }
            "load" => {
                let fmt = parts.next();
                let path = parts.next();
                let loaded = match (fmt, path) {
                    (Some("json"), Some(p)) => load_plan_from_json(p),
                    (Some("csv"), Some(p)) => load_plan_from_csv(p),
                    _ => {
                        println!("Usage: load <json|csv> <path>");
                        continue;
                    }
                };
                match loaded {
                    Ok(p) => {
                        plan = p;
                        println!("Plan loaded from {}", path.unwrap_or_default());
                        print_plan(&plan);
                    }
                    Err(e) => println!("Load error: {}", e),
                }
            }
            "import" => {
                let Some(path) = parts.next() else {
                    println!("Usage: import <path> [merge]");
                    continue;
                };
                let mode = match parts.next().map(str::parse::<ImportMode>) {
                    None => ImportMode::Overwrite,
                    Some(Ok(mode)) => mode,
                    Some(Err(e)) => {
                        println!("Error: {}", e);
                        continue;
                    }
                };
                match import_report_json(path, &mut plan, mode) {
                    Ok(()) => {
                        println!("Report imported from {} ({}).", path, mode);
                        print_plan(&plan);
                    }
                    Err(e) => println!("Import error: {}", e),
                }
            }
            "export" => {
                let Some(dir) = parts.next() else {
                    println!("Usage: export <dir>");
                    continue;
                };
                let schedule = plan.compute(&config);
                let generated_at = Utc::now();
                let target = Path::new(dir)
                    .join(archive_file_name(&plan.metadata.project_title, generated_at));
                match build_archive(&plan, &schedule, &config, generated_at) {
                    Ok(bytes) => match fs::write(&target, bytes) {
                        Ok(()) => println!("Report written to {}", target.display()),
                        Err(e) => println!("Export error: {}", e),
                    },
                    Err(e) => println!("Export error: {}", e),
                }
            }
            _ => println!("Unknown command. Type 'help'."),
        }
    }
}

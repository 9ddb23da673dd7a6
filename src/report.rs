use log::{debug, info, warn};

use snafu::{prelude::*, Snafu};

use survey_tabulation::builder::Builder;
use survey_tabulation::*;

use std::collections::HashSet;
use std::fs;

use serde::{Deserialize, Serialize};
use serde_json::json;
use serde_json::Value as JSValue;
use text_diff::print_diff;

use crate::args::Args;
use crate::report::io_csv::read_csv_survey;
use crate::report::io_excel::read_excel_survey;

pub mod io_csv;
pub mod io_excel;

#[derive(Debug, Snafu)]
pub enum ReportError {
    #[snafu(display("Error opening survey file {path}"))]
    OpeningCsv { source: csv::Error, path: String },
    #[snafu(display("Error reading row {lineno}"))]
    CsvRow { source: csv::Error, lineno: usize },
    #[snafu(display("Error opening workbook {path}"))]
    OpeningExcel {
        source: calamine::XlsxError,
        path: String,
    },
    #[snafu(display("The workbook has no usable worksheet"))]
    EmptyExcel {},
    #[snafu(display("Cell of line {lineno} cannot be read: {content}"))]
    ExcelWrongCellType { lineno: u64, content: String },
    #[snafu(display("Error opening file {path}"))]
    OpeningJson {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display(""))]
    ParsingJson { source: serde_json::Error },
    #[snafu(display("Error writing summary to {path}"))]
    WritingSummary {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display(""))]
    Tabulation { source: SurveyErrors },

    #[snafu(whatever, display("{message}"))]
    Whatever {
        message: String,
        #[snafu(source(from(Box<dyn std::error::Error>, Some)))]
        source: Option<Box<dyn std::error::Error>>,
    },
}

pub type ReportResult<T> = Result<T, ReportError>;

/// One survey row as produced by the file readers, before any domain
/// validation.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct ParsedRespondent {
    pub lineno: usize,
    pub cells: Vec<(String, String)>,
}

/// Checks the parsed rows against the schema and assembles the dataset.
///
/// Exports carry columns the schema does not know (timestamps, free-text
/// questions): those are ignored. A value outside its column's domain is
/// dropped with a warning and becomes a missing answer, which matches how
/// the dashboard treated unparseable cells.
pub fn validate_respondents(
    parsed: &[ParsedRespondent],
    schema: &SurveySchema,
) -> ReportResult<SurveyDataset> {
    let mut builder = Builder::new(schema).context(TabulationSnafu {})?;
    let mut ignored_columns: HashSet<String> = HashSet::new();
    for pr in parsed.iter() {
        let mut cells: Vec<(String, String)> = Vec::new();
        for (name, value) in pr.cells.iter() {
            if value.is_empty() {
                continue;
            }
            match schema.validate_cell(name, value) {
                Ok(()) => cells.push((name.clone(), value.clone())),
                Err(SurveyErrors::UnknownColumn { .. }) => {
                    if ignored_columns.insert(name.clone()) {
                        debug!("validate_respondents: ignoring column {:?}", name);
                    }
                }
                Err(SurveyErrors::InvalidCategory { .. }) => {
                    warn!(
                        "validate_respondents: line {}: dropping out-of-domain value {:?} for {:?}",
                        pr.lineno, value, name
                    );
                }
            }
        }
        builder.add_respondent(&cells).context(TabulationSnafu {})?;
    }
    Ok(builder.build())
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct SummaryInfo {
    pub title: String,
    pub source: String,
    pub respondents: u64,
}

// Percentages and means are rounded before serialization so that summaries
// diff cleanly against a stored reference.
fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

fn rounded_grid(grid: &[Vec<f64>]) -> Vec<Vec<f64>> {
    grid.iter()
        .map(|row| row.iter().map(|x| round2(*x)).collect())
        .collect()
}

fn chart_js(id: &str, kind: &str, title: &str, data: JSValue) -> JSValue {
    json!({"id": id, "kind": kind, "title": title, "data": data})
}

fn counts_js(pairs: &[(String, u64)]) -> JSValue {
    let labels: Vec<String> = pairs.iter().map(|(l, _)| l.clone()).collect();
    let counts: Vec<u64> = pairs.iter().map(|(_, c)| *c).collect();
    json!({"labels": labels, "counts": counts})
}

fn means_js(pairs: &[(String, f64)]) -> JSValue {
    let labels: Vec<String> = pairs.iter().map(|(l, _)| l.clone()).collect();
    let means: Vec<f64> = pairs.iter().map(|(_, m)| round2(*m)).collect();
    json!({"labels": labels, "means": means})
}

fn crosstab_js(table: &CrossTab) -> JSValue {
    json!({
        "rows": table.row_labels,
        "cols": table.col_labels,
        "counts": table.counts,
        "percentages": rounded_grid(&table.percentages),
    })
}

fn grouped_means_js(table: &GroupedMeans) -> JSValue {
    let means: Vec<Vec<Option<f64>>> = table
        .means
        .iter()
        .map(|row| row.iter().map(|m| m.map(round2)).collect())
        .collect();
    json!({
        "rows": table.row_labels,
        "cols": table.col_labels,
        "means": means,
    })
}

fn stats_js(stats: &Option<SummaryStats>) -> JSValue {
    match stats {
        Some(s) => json!({
            "mean": round2(s.mean),
            "min": round2(s.min),
            "max": round2(s.max),
        }),
        None => json!(null),
    }
}

// **** Report sections ****
// One builder per dashboard page; each emits the tables that page drew.

fn demographics_section(data: &SurveyDataset) -> ReportResult<JSValue> {
    let charts = vec![
        chart_js(
            "age_distribution",
            "bar",
            "Age Distribution",
            counts_js(&category_counts(data, COL_AGE).context(TabulationSnafu {})?),
        ),
        chart_js(
            "gender_distribution",
            "pie",
            "Gender Distribution",
            counts_js(&category_counts(data, COL_GENDER).context(TabulationSnafu {})?),
        ),
        chart_js(
            "attendance_frequency",
            "pie",
            "Attendance Frequency",
            counts_js(&category_counts(data, COL_ATTENDANCE).context(TabulationSnafu {})?),
        ),
        chart_js(
            "experience",
            "bar",
            "Years of Experience",
            counts_js(&category_counts(data, COL_EXPERIENCE).context(TabulationSnafu {})?),
        ),
        chart_js(
            "roles",
            "bar",
            "Roles in Rave Scene",
            counts_js(&role_counts(data)),
        ),
    ];
    Ok(json!({"id": "demographics", "title": "Demographics", "charts": charts}))
}

fn talking_section(data: &SurveyDataset) -> ReportResult<JSValue> {
    let charts = vec![
        chart_js(
            "talk_frequency",
            "bar",
            "Conversation Frequency",
            counts_js(&category_counts(data, COL_TALK_FREQUENCY).context(TabulationSnafu {})?),
        ),
        chart_js(
            "talk_duration",
            "bar",
            "Conversation Duration",
            counts_js(&category_counts(data, COL_TALK_DURATION).context(TabulationSnafu {})?),
        ),
        chart_js(
            "talk_perception",
            "bar",
            "Perception of Talking on Dancefloor",
            counts_js(&category_counts(data, COL_TALK_PERCEPTION).context(TabulationSnafu {})?),
        ),
    ];
    Ok(json!({"id": "talking", "title": "Talking Behavior", "charts": charts}))
}

const IMPACT_COLUMNS: [(&str, &str, &str); 3] = [
    ("experience", "Personal Experience", COL_IMPACT_EXPERIENCE),
    ("dj", "DJ Performance", COL_IMPACT_DJ),
    ("atmosphere", "Event Atmosphere", COL_IMPACT_ATMOSPHERE),
];

fn impact_section(data: &SurveyDataset, breakdown_col: &str) -> ReportResult<JSValue> {
    let mut charts: Vec<JSValue> = Vec::new();
    for (key, label, column) in IMPACT_COLUMNS {
        charts.push(chart_js(
            &format!("impact_{}", key),
            "pie",
            &format!("Impact on {}", label),
            counts_js(&category_counts(data, column).context(TabulationSnafu {})?),
        ));
    }
    for (key, label, column) in IMPACT_COLUMNS {
        charts.push(chart_js(
            &format!("impact_{}_by_role", key),
            "heatmap",
            &format!("Impact on {} by Role", label),
            crosstab_js(&role_impact_table(data, column).context(TabulationSnafu {})?),
        ));
    }
    for (key, label, column) in IMPACT_COLUMNS {
        charts.push(chart_js(
            &format!("impact_{}_breakdown", key),
            "grouped_bar",
            &format!("Impact on {} by {}", label, breakdown_col),
            crosstab_js(&impact_breakdown(data, breakdown_col, column).context(TabulationSnafu {})?),
        ));
    }
    Ok(json!({"id": "impact", "title": "Impact Analysis", "charts": charts}))
}

fn quiet_section(data: &SurveyDataset, group_col: &str) -> ReportResult<JSValue> {
    let heatmap = paired_ordinal_table(data, COL_QUIET_IMPORTANCE, COL_LIKELIHOOD_INTERVENE)
        .context(TabulationSnafu {})?;
    let importance = ordinal_values(data, COL_QUIET_IMPORTANCE).context(TabulationSnafu {})?;
    let likelihood = ordinal_values(data, COL_LIKELIHOOD_INTERVENE).context(TabulationSnafu {})?;
    let by_group = grouped_means(data, &likelihood, COL_QUIET_IMPORTANCE, group_col)
        .context(TabulationSnafu {})?;
    let charts = vec![
        chart_js(
            "importance_vs_intervention",
            "heatmap",
            "Quiet Environment Importance vs Intervention Likelihood",
            crosstab_js(&heatmap),
        ),
        chart_js(
            "averages",
            "stats",
            "Average Importance and Likelihood",
            json!({
                "average_importance": mean_of(&importance).map(round2),
                "average_likelihood": mean_of(&likelihood).map(round2),
            }),
        ),
        chart_js(
            "intervention_by_group",
            "grouped_bar",
            &format!("Average Likelihood of Intervention by Importance and {}", group_col),
            grouped_means_js(&by_group),
        ),
    ];
    Ok(json!({"id": "quiet", "title": "Quiet Importance", "charts": charts}))
}

fn yapping_section(
    data: &SurveyDataset,
    engine: &ScoreEngine,
    group_col: &str,
) -> ReportResult<JSValue> {
    let scores = engine
        .annotate(data, COL_TALK_FREQUENCY, COL_TALK_DURATION)
        .context(TabulationSnafu {})?;
    let histogram = score_histogram(&scores, 20);
    let edges: Vec<f64> = histogram.iter().map(|(edge, _)| *edge).collect();
    let counts: Vec<u64> = histogram.iter().map(|(_, count)| *count).collect();
    let by_group = group_means(data, &scores, group_col).context(TabulationSnafu {})?;
    let charts = vec![
        chart_js(
            "yapping_distribution",
            "histogram",
            "Distribution of Yapping Factor",
            json!({"bin_edges": edges, "counts": counts}),
        ),
        chart_js(
            "yapping_by_group",
            "bar",
            &format!("Average Yapping Factor by {}", group_col),
            means_js(&by_group),
        ),
        chart_js(
            "yapping_stats",
            "stats",
            "Key Insights",
            stats_js(&summary_stats(&scores)),
        ),
    ];
    Ok(json!({"id": "yapping", "title": "Yapping Factor", "charts": charts}))
}

// The dashboard selectors, as the user types them on the command line.
fn demographic_column(key: &str) -> ReportResult<&'static str> {
    match key {
        "age" => Ok(COL_AGE),
        "gender" => Ok(COL_GENDER),
        "attendance" => Ok(COL_ATTENDANCE),
        "experience" => Ok(COL_EXPERIENCE),
        "talk-frequency" => Ok(COL_TALK_FREQUENCY),
        "talk-duration" => Ok(COL_TALK_DURATION),
        "perception" => Ok(COL_TALK_PERCEPTION),
        x => whatever!(
            "unknown demographic selector {:?} (expected age, gender, attendance, experience, talk-frequency, talk-duration or perception)",
            x
        ),
    }
}

pub fn build_summary_js(info: &SummaryInfo, sections: &[JSValue]) -> JSValue {
    json!({"config": info, "sections": sections})
}

pub fn read_summary(path: String) -> ReportResult<JSValue> {
    let contents = fs::read_to_string(path.clone()).context(OpeningJsonSnafu { path })?;
    let js: JSValue = serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu {})?;
    Ok(js)
}

pub fn run_report(args: &Args) -> ReportResult<()> {
    // Ad-hoc scoring from the command line, no dataset involved.
    if args.frequency.is_some() || args.duration.is_some() {
        let (frequency, duration) = match (&args.frequency, &args.duration) {
            (Some(f), Some(d)) => (f, d),
            _ => whatever!("--frequency and --duration must be passed together"),
        };
        let engine = ScoreEngine::dancefloor_default();
        let score = engine
            .normalized(frequency, duration)
            .context(TabulationSnafu {})?;
        println!("Your Normalized Yapping Factor is: {:.2}", score);
        println!("{}", YappingBand::of_score(score).message());
        if args.input.is_none() {
            return Ok(());
        }
    }

    let input = match &args.input {
        Some(p) => p.clone(),
        None => whatever!("no input file provided"),
    };

    let schema = SurveySchema::dancefloor();
    let parsed = match args.input_type.as_deref().unwrap_or("csv") {
        "csv" => read_csv_survey(&input)?,
        "xlsx" | "excel" => read_excel_survey(&input, args.excel_worksheet_name.as_deref())?,
        x => whatever!("input type not supported: {:?}", x),
    };
    let data = validate_respondents(&parsed, &schema)?;
    info!(
        "run_report: {} respondents loaded from {}",
        data.num_respondents(),
        input
    );

    let engine = ScoreEngine::dancefloor_default();
    let breakdown_col =
        demographic_column(args.breakdown.as_deref().unwrap_or("talk-frequency"))?;
    let group_col = demographic_column(args.group_by.as_deref().unwrap_or("age"))?;

    let section_names: Vec<String> = match &args.section {
        Some(names) if !names.is_empty() => names.clone(),
        _ => ["demographics", "talking", "impact", "quiet", "yapping"]
            .iter()
            .map(|s| s.to_string())
            .collect(),
    };
    let mut sections: Vec<JSValue> = Vec::new();
    for name in section_names.iter() {
        let js = match name.as_str() {
            "demographics" => demographics_section(&data)?,
            "talking" => talking_section(&data)?,
            "impact" => impact_section(&data, breakdown_col)?,
            "quiet" => quiet_section(&data, group_col)?,
            "yapping" => yapping_section(&data, &engine, group_col)?,
            x => whatever!("unknown section: {:?}", x),
        };
        sections.push(js);
    }

    let info = SummaryInfo {
        title: "Dutch Dancefloor Dialogue Dashboard".to_string(),
        source: input.clone(),
        respondents: data.num_respondents() as u64,
    };
    let summary = build_summary_js(&info, &sections);
    let pretty_js_summary = serde_json::to_string_pretty(&summary).context(ParsingJsonSnafu {})?;

    match args.out.as_deref() {
        None | Some("stdout") => println!("{}", pretty_js_summary),
        Some(path) => fs::write(path, &pretty_js_summary).context(WritingSummarySnafu {
            path: path.to_string(),
        })?,
    }

    // The reference summary, if provided for comparison.
    if let Some(summary_p) = &args.reference {
        let summary_ref = read_summary(summary_p.clone())?;
        let pretty_js_summary_ref =
            serde_json::to_string_pretty(&summary_ref).context(ParsingJsonSnafu {})?;
        if pretty_js_summary_ref != pretty_js_summary {
            warn!("Found differences with the reference summary");
            print_diff(
                pretty_js_summary_ref.as_str(),
                pretty_js_summary.as_ref(),
                "\n",
            );
            whatever!("Difference detected between calculated summary and reference summary")
        }
    }

    Ok(())
}

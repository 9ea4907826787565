//! Dashboard report generation.
//!
//! This module renders the aggregated tables and charts as a Markdown
//! report, a JSON document, or a self-contained HTML dashboard page.

use crate::models::{
    FamilyFareRow, FareRow, GenderSurvival, NameCount, Report, ReportMetadata, SurvivalRow,
};
use anyhow::{Context, Result};
use std::path::Path;

const GENDER_QUESTION: &str = "Did women have a higher survival rate than men?";
const FAMILY_QUESTION: &str =
    "What last names had the highest average ticket fare and what class were they in?";

const PLOTLY_CDN: &str = "https://cdn.plot.ly/plotly-2.35.2.min.js";

/// Options that shape the rendered report.
#[derive(Debug, Clone)]
pub struct RenderOptions {
    /// Rows of the last-name table to show.
    pub last_name_rows: usize,
    /// Render the data tables (charts are always drawn in HTML).
    pub include_tables: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            last_name_rows: 20,
            include_tables: true,
        }
    }
}

/// Generate a complete Markdown report.
pub fn generate_markdown_report(report: &Report, options: &RenderOptions) -> String {
    let mut output = String::new();

    output.push_str("# Titanic Passenger Dashboard\n\n");
    output.push_str(&generate_metadata_section(&report.metadata));
    output.push_str(&generate_table_of_contents());

    output.push_str("## Survival\n\n");
    output.push_str(&format!("*{}*\n\n", GENDER_QUESTION));
    output.push_str(&generate_gender_table(&report.gender));
    output.push_str(&generate_gender_answer(&report.gender));
    if options.include_tables {
        output.push_str("### Survival by Class, Sex and Age Group\n\n");
        output.push_str(&generate_survival_table(&report.survival));
    }

    output.push_str("## Families\n\n");
    if options.include_tables {
        output.push_str("### Fares by Family Size and Class\n\n");
        output.push_str(&generate_fare_table(&report.family_groups));
        output.push_str("### Most Common Last Names\n\n");
        output.push_str(&generate_name_table(&report.last_names, options.last_name_rows));
    }
    output.push_str("### Top Families by Average Fare\n\n");
    output.push_str(&format!("*{}*\n\n", FAMILY_QUESTION));
    output.push_str(&generate_family_fare_table(&report.top_families));

    output.push_str(&generate_footer());

    output
}

fn generate_metadata_section(metadata: &ReportMetadata) -> String {
    let mut section = String::new();

    section.push_str("## Metadata\n\n");
    section.push_str(&format!("- **Source:** {}\n", metadata.source));
    section.push_str(&format!(
        "- **Analysis Date:** {}\n",
        metadata.analysis_date.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    section.push_str(&format!("- **Passengers:** {}\n", metadata.records));
    section.push_str(&format!(
        "- **Analysis Duration:** {:.2}s\n",
        metadata.duration_seconds
    ));
    section.push('\n');

    section
}

fn generate_table_of_contents() -> String {
    let mut toc = String::new();

    toc.push_str("## Table of Contents\n\n");
    toc.push_str("- [Metadata](#metadata)\n");
    toc.push_str("- [Survival](#survival)\n");
    toc.push_str("- [Families](#families)\n\n");

    toc
}

fn generate_gender_table(rows: &[GenderSurvival]) -> String {
    let mut table = String::new();

    table.push_str("| Sex | Passengers | Survivors | Survival Rate |\n");
    table.push_str("|:---|:---:|:---:|:---:|\n");
    for row in rows {
        table.push_str(&format!(
            "| {} | {} | {} | {} |\n",
            row.sex,
            row.total_passengers,
            row.survivors,
            percent(row.survival_rate)
        ));
    }
    table.push('\n');

    table
}

/// One-sentence answer to the gender question, when both sexes are present.
fn generate_gender_answer(rows: &[GenderSurvival]) -> String {
    use crate::models::Sex;

    let rate = |sex: Sex| rows.iter().find(|r| r.sex == sex).map(|r| r.survival_rate);

    match (rate(Sex::Female), rate(Sex::Male)) {
        (Some(female), Some(male)) => {
            let verdict = if female > male {
                "Yes"
            } else if female < male {
                "No"
            } else {
                "Neither"
            };
            format!(
                "**{}:** women survived at {} versus {} for men.\n\n",
                verdict,
                percent(female),
                percent(male)
            )
        }
        _ => String::new(),
    }
}

fn generate_survival_table(rows: &[SurvivalRow]) -> String {
    let mut table = String::new();

    table.push_str("| Class | Sex | Age Group | Passengers | Survivors | Survival Rate |\n");
    table.push_str("|:---:|:---|:---|:---:|:---:|:---:|\n");
    for row in rows {
        table.push_str(&format!(
            "| {} | {} | {} | {} | {} | {} |\n",
            row.pclass,
            row.sex,
            row.age_group,
            row.total_passengers,
            row.survivors,
            percent(row.survival_rate)
        ));
    }
    table.push('\n');

    table
}

fn generate_fare_table(rows: &[FareRow]) -> String {
    let mut table = String::new();

    table.push_str("| Class | Family Size | Passengers | Avg Fare | Min Fare | Max Fare |\n");
    table.push_str("|:---:|:---:|:---:|---:|---:|---:|\n");
    for row in rows {
        table.push_str(&format!(
            "| {} | {} | {} | {:.2} | {:.2} | {:.2} |\n",
            row.pclass,
            row.family_size,
            row.num_passengers,
            row.avg_fare,
            row.min_fare,
            row.max_fare
        ));
    }
    table.push('\n');

    table
}

fn generate_name_table(rows: &[NameCount], limit: usize) -> String {
    let mut table = String::new();

    table.push_str("| Last Name | Count |\n");
    table.push_str("|:---|:---:|\n");
    for row in rows.iter().take(limit) {
        table.push_str(&format!(
            "| {} | {} |\n",
            escape_markdown(&row.last_name),
            row.count
        ));
    }
    if rows.len() > limit {
        table.push_str(&format!(
            "\n*{} more last names not shown.*\n",
            rows.len() - limit
        ));
    }
    table.push('\n');

    table
}

fn generate_family_fare_table(rows: &[FamilyFareRow]) -> String {
    if rows.is_empty() {
        return "No last name appears more than once.\n\n".to_string();
    }

    let mut table = String::new();

    table.push_str("| Rank | Last Name | Class | Average Fare | Count |\n");
    table.push_str("|:---:|:---|:---:|---:|:---:|\n");
    for (i, row) in rows.iter().enumerate() {
        table.push_str(&format!(
            "| {} | {} | {} | {:.2} | {} |\n",
            i + 1,
            escape_markdown(&row.last_name),
            row.pclass,
            row.average_fare,
            row.count
        ));
    }
    table.push('\n');

    table
}

fn generate_footer() -> String {
    "---\n\n*Report generated by titanic-eda*\n".to_string()
}

/// Make free text safe inside a Markdown table cell.
fn escape_markdown(text: &str) -> String {
    text.replace('\\', "\\\\")
        .replace('|', "\\|")
        .replace(['\r', '\n'], " ")
}

fn percent(rate: f64) -> String {
    format!("{:.1}%", rate * 100.0)
}

/// Generate a JSON report.
pub fn generate_json_report(report: &Report) -> Result<String> {
    serde_json::to_string_pretty(report).map_err(Into::into)
}

/// Generate the HTML dashboard page with both charts.
pub fn generate_html_dashboard(report: &Report, options: &RenderOptions) -> Result<String> {
    let mut html = String::new();

    html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n");
    html.push_str("<meta charset=\"utf-8\">\n");
    html.push_str("<title>Titanic Passenger Dashboard</title>\n");
    html.push_str(&format!("<script src=\"{}\"></script>\n", PLOTLY_CDN));
    html.push_str(
        "<style>body{font-family:sans-serif;margin:2rem auto;max-width:960px}\
         table{border-collapse:collapse;margin-bottom:1.5rem}\
         th,td{border:1px solid #ccc;padding:0.25rem 0.6rem}\
         .chart{height:420px}</style>\n",
    );
    html.push_str("</head>\n<body>\n");
    html.push_str("<h1>Titanic Passenger Dashboard</h1>\n");
    html.push_str(&format!(
        "<p>Source: {} &middot; {} passengers &middot; {}</p>\n",
        escape_html(&report.metadata.source),
        report.metadata.records,
        report.metadata.analysis_date.format("%Y-%m-%d %H:%M:%S UTC")
    ));

    for chart in &report.charts {
        html.push_str(&format!(
            "<div id=\"{}\" class=\"chart\"></div>\n",
            escape_html(&chart.id)
        ));
    }

    html.push_str(&format!("<h2>{}</h2>\n", escape_html(GENDER_QUESTION)));
    html.push_str(&html_table(
        &["Sex", "Passengers", "Survivors", "Survival Rate"],
        report.gender.iter().map(|r| {
            vec![
                r.sex.to_string(),
                r.total_passengers.to_string(),
                r.survivors.to_string(),
                percent(r.survival_rate),
            ]
        }),
    ));

    html.push_str(&format!("<h2>{}</h2>\n", escape_html(FAMILY_QUESTION)));
    html.push_str(&html_table(
        &["Last Name", "Class", "Average Fare", "Count"],
        report.top_families.iter().map(|r| {
            vec![
                r.last_name.clone(),
                r.pclass.to_string(),
                format!("{:.2}", r.average_fare),
                r.count.to_string(),
            ]
        }),
    ));

    if options.include_tables {
        html.push_str("<h2>Survival by Class, Sex and Age Group</h2>\n");
        html.push_str(&html_table(
            &["Class", "Sex", "Age Group", "Passengers", "Survivors", "Survival Rate"],
            report.survival.iter().map(|r| {
                vec![
                    r.pclass.to_string(),
                    r.sex.to_string(),
                    r.age_group.to_string(),
                    r.total_passengers.to_string(),
                    r.survivors.to_string(),
                    percent(r.survival_rate),
                ]
            }),
        ));

        html.push_str("<h2>Fares by Family Size and Class</h2>\n");
        html.push_str(&html_table(
            &["Class", "Family Size", "Passengers", "Avg Fare", "Min Fare", "Max Fare"],
            report.family_groups.iter().map(|r| {
                vec![
                    r.pclass.to_string(),
                    r.family_size.to_string(),
                    r.num_passengers.to_string(),
                    format!("{:.2}", r.avg_fare),
                    format!("{:.2}", r.min_fare),
                    format!("{:.2}", r.max_fare),
                ]
            }),
        ));

        html.push_str("<h2>Most Common Last Names</h2>\n");
        html.push_str(&html_table(
            &["Last Name", "Count"],
            report
                .last_names
                .iter()
                .take(options.last_name_rows)
                .map(|r| vec![r.last_name.clone(), r.count.to_string()]),
        ));
    }

    html.push_str("<script>\n");
    for chart in &report.charts {
        let figure = chart
            .to_json()
            .with_context(|| format!("Failed to serialize chart {}", chart.id))?;
        html.push_str(&format!(
            "(function(){{var f={};Plotly.newPlot({:?},f.data,f.layout,{{responsive:true}});}})();\n",
            escape_script(&figure),
            chart.id
        ));
    }
    html.push_str("</script>\n</body>\n</html>\n");

    Ok(html)
}

fn html_table<I>(headers: &[&str], rows: I) -> String
where
    I: IntoIterator<Item = Vec<String>>,
{
    let mut table = String::from("<table>\n<tr>");

    for header in headers {
        table.push_str(&format!("<th>{}</th>", escape_html(header)));
    }
    table.push_str("</tr>\n");

    for row in rows {
        table.push_str("<tr>");
        for cell in row {
            table.push_str(&format!("<td>{}</td>", escape_html(&cell)));
        }
        table.push_str("</tr>\n");
    }
    table.push_str("</table>\n");

    table
}

fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

/// Keep embedded JSON from closing the surrounding script element.
fn escape_script(json: &str) -> String {
    json.replace("</", "<\\/")
}

/// Write rendered report content to a file.
pub fn write_report(content: &str, path: &Path) -> Result<()> {
    std::fs::write(path, content)
        .with_context(|| format!("Failed to write report to {}", path.display()))
}

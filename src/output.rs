use anyhow::{Context, Result};
use chrono::Local;
use csv::WriterBuilder;
use serde::{Deserialize, Serialize};
use serde_json::to_string_pretty;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::analysis::{CompatibilityChart, CompatibilityEngine};
use crate::explanation::Explanation;
use crate::selection::connections;
use crate::types::*;

/// Supported report formats
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    #[default]
    Text,
    Json,
    Csv,
    Tsv,
    Html,
}

impl ReportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ReportFormat::Text => "txt",
            ReportFormat::Json => "json",
            ReportFormat::Csv => "csv",
            ReportFormat::Tsv => "tsv",
            ReportFormat::Html => "html",
        }
    }
}

/// Everything a consumer needs to render one selection
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct QueryReport {
    pub selected: BloodType,
    pub mode: InteractionMode,
    pub compatible: Vec<BloodType>,
    pub highlighted: Vec<BloodType>,
    pub connections: Vec<Connection>,
    pub explanation: String,
}

impl QueryReport {
    pub fn new(selected: BloodType, mode: InteractionMode) -> Self {
        let explanation = Explanation::for_selection(selected, mode);

        Self {
            selected,
            mode,
            compatible: explanation.compatible,
            highlighted: explanation.highlighted,
            connections: connections(selected, mode),
            explanation: explanation.summary,
        }
    }
}

/// Outcome of checking one donor/recipient pair
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CheckReport {
    pub donor: BloodType,
    pub recipient: BloodType,
    pub compatible: bool,
    pub rh_compatible: bool,
    pub abo_compatible: bool,
}

impl CheckReport {
    pub fn new(donor: BloodType, recipient: BloodType) -> Self {
        let engine = CompatibilityEngine::new();

        Self {
            donor,
            recipient,
            compatible: engine.can_donate(donor, recipient),
            rh_compatible: engine.rh_compatible(donor.rh(), recipient.rh()),
            abo_compatible: engine.abo_compatible(donor.abo(), recipient.abo()),
        }
    }

    /// Rules that fail for this pair, Rh first
    pub fn mismatches(&self) -> Vec<&'static str> {
        let mut reasons = Vec::new();
        if !self.rh_compatible {
            reasons.push("Rh");
        }
        if !self.abo_compatible {
            reasons.push("ABO");
        }
        reasons
    }

    pub fn verdict(&self) -> String {
        if self.compatible {
            format!("{} can donate to {}", self.donor, self.recipient)
        } else {
            format!(
                "{} cannot donate to {} ({} mismatch)",
                self.donor,
                self.recipient,
                self.mismatches().join(" and ")
            )
        }
    }
}

/// Renders query results, explanations, pair checks and the compatibility chart
pub struct ReportGenerator {
    format: ReportFormat,
}

impl ReportGenerator {
    pub fn new(format: ReportFormat) -> Self {
        Self { format }
    }

    pub fn format(&self) -> ReportFormat {
        self.format
    }

    pub fn render_query(&self, report: &QueryReport) -> Result<String> {
        match self.format {
            ReportFormat::Text => Ok(self.query_text(report)),
            ReportFormat::Json => Ok(to_string_pretty(report)?),
            ReportFormat::Csv => self.query_delimited(report, b','),
            ReportFormat::Tsv => self.query_delimited(report, b'\t'),
            ReportFormat::Html => Ok(self.query_html(report)),
        }
    }

    pub fn render_chart(&self, chart: &CompatibilityChart) -> Result<String> {
        match self.format {
            ReportFormat::Text => Ok(self.chart_text(chart)),
            ReportFormat::Json => Ok(to_string_pretty(chart)?),
            ReportFormat::Csv => self.chart_delimited(chart, b','),
            ReportFormat::Tsv => self.chart_delimited(chart, b'\t'),
            ReportFormat::Html => Ok(self.chart_html(chart)),
        }
    }

    pub fn render_explanation(&self, explanation: &Explanation) -> Result<String> {
        match self.format {
            ReportFormat::Text => Ok(self.explanation_text(explanation)),
            ReportFormat::Json => Ok(to_string_pretty(explanation)?),
            ReportFormat::Csv => self.explanation_delimited(explanation, b','),
            ReportFormat::Tsv => self.explanation_delimited(explanation, b'\t'),
            ReportFormat::Html => Ok(self.explanation_html(explanation)),
        }
    }

    pub fn render_check(&self, report: &CheckReport) -> Result<String> {
        match self.format {
            ReportFormat::Text => Ok(format!("{}\n", report.verdict())),
            ReportFormat::Json => Ok(to_string_pretty(report)?),
            ReportFormat::Csv => self.check_delimited(report, b','),
            ReportFormat::Tsv => self.check_delimited(report, b'\t'),
            ReportFormat::Html => Ok(html_page(
                "Blood Type Compatibility Check",
                &format!(
                    "<p class=\"{}\">{}</p>",
                    if report.compatible {
                        "compatibility-high"
                    } else {
                        "compatibility-low"
                    },
                    report.verdict()
                ),
            )),
        }
    }

    /// The registry listing: label, ABO group and Rh factor of every type
    pub fn render_types(&self, entities: &[BloodTypeEntity]) -> Result<String> {
        match self.format {
            ReportFormat::Text => Ok(entities
                .iter()
                .map(|entity| {
                    format!(
                        "{:<4} ABO group {}, Rh {}\n",
                        entity.label(),
                        entity.abo_group,
                        entity.rh_factor
                    )
                })
                .collect()),
            ReportFormat::Json => Ok(to_string_pretty(entities)?),
            ReportFormat::Csv => self.types_delimited(entities, b','),
            ReportFormat::Tsv => self.types_delimited(entities, b'\t'),
            ReportFormat::Html => {
                let mut table =
                    "<table>\n<tr><th>Blood Type</th><th>ABO Group</th><th>Rh Factor</th></tr>\n"
                        .to_string();
                for entity in entities {
                    table.push_str(&format!(
                        "<tr><td>{}</td><td>{}</td><td>{}</td></tr>\n",
                        entity.label(),
                        entity.abo_group,
                        entity.rh_factor
                    ));
                }
                table.push_str("</table>\n");
                Ok(html_page("Blood Types", &table))
            }
        }
    }

    /// Write rendered content to a timestamped file inside `output_dir`
    pub fn write_to_dir(&self, output_dir: &Path, stem: &str, content: &str) -> Result<PathBuf> {
        fs::create_dir_all(output_dir).with_context(|| {
            format!("Failed to create output directory {}", output_dir.display())
        })?;

        let timestamp = Local::now().format("%Y-%m-%d_%H-%M-%S").to_string();
        let filename = output_dir.join(format!(
            "{}_{}.{}",
            stem,
            timestamp,
            self.format.extension()
        ));

        fs::write(&filename, content)
            .with_context(|| format!("Failed to write report to {}", filename.display()))?;

        info!("Report written to {}", filename.display());
        Ok(filename)
    }

    fn query_text(&self, report: &QueryReport) -> String {
        let mut text = format!(
            "Selected: {} ({}, {})\n",
            report.selected,
            report.mode,
            report.mode.role()
        );
        text.push_str(&format!("Compatible: {}\n", join_labels(&report.compatible)));
        text.push_str(&format!("Highlighted: {}\n", join_labels(&report.highlighted)));

        if !report.connections.is_empty() {
            text.push_str("Connections:\n");
            for connection in &report.connections {
                text.push_str(&format!("  {} -> {}\n", connection.from, connection.to));
            }
        }

        text.push('\n');
        text.push_str(&report.explanation);
        text.push('\n');
        text
    }

    fn query_delimited(&self, report: &QueryReport, delimiter: u8) -> Result<String> {
        let mut wtr = WriterBuilder::new()
            .delimiter(delimiter)
            .from_writer(Vec::new());

        wtr.write_record(["selected", "mode", "counterpart", "from", "to", "highlighted"])?;

        let mode = report.mode.to_string();
        for &other in &report.compatible {
            let (from, to) = match report.mode {
                InteractionMode::Give => (report.selected, other),
                InteractionMode::Receive => (other, report.selected),
            };
            let highlighted = report.highlighted.contains(&other).to_string();
            wtr.write_record([
                report.selected.label(),
                mode.as_str(),
                other.label(),
                from.label(),
                to.label(),
                highlighted.as_str(),
            ])?;
        }

        into_string(wtr)
    }

    fn query_html(&self, report: &QueryReport) -> String {
        let mut rows = String::new();
        for &other in &report.compatible {
            let class = if report.highlighted.contains(&other) {
                "compatibility-high"
            } else {
                "selected"
            };
            rows.push_str(&format!(
                "<tr class=\"{}\"><td>{}</td><td>{}</td></tr>\n",
                class,
                other,
                if other == report.selected { "selected" } else { "compatible" }
            ));
        }

        let body = format!(
            "<h2>{} as {}</h2>\n<table>\n<tr><th>Blood Type</th><th>Status</th></tr>\n{}</table>\n<p>{}</p>",
            report.selected,
            report.mode.role(),
            rows,
            report.explanation
        );

        html_page("Blood Type Compatibility", &body)
    }

    fn explanation_text(&self, explanation: &Explanation) -> String {
        format!(
            "Selected: {} ({}, {})\nABO group: {}\nRh factor: {}\n\n{}\n",
            explanation.selected,
            explanation.mode,
            explanation.mode.role(),
            explanation.abo_group,
            explanation.rh_factor,
            explanation.summary
        )
    }

    fn explanation_delimited(&self, explanation: &Explanation, delimiter: u8) -> Result<String> {
        let mut wtr = WriterBuilder::new()
            .delimiter(delimiter)
            .from_writer(Vec::new());

        wtr.write_record([
            "selected",
            "mode",
            "abo_group",
            "rh_factor",
            "compatible",
            "highlighted",
            "universal_donor",
            "universal_recipient",
            "summary",
        ])?;
        wtr.write_record([
            explanation.selected.to_string(),
            explanation.mode.to_string(),
            explanation.abo_group.to_string(),
            explanation.rh_factor.to_string(),
            join_labels_with(&explanation.compatible, " "),
            join_labels_with(&explanation.highlighted, " "),
            explanation.universal_donor.to_string(),
            explanation.universal_recipient.to_string(),
            explanation.summary.clone(),
        ])?;

        into_string(wtr)
    }

    fn explanation_html(&self, explanation: &Explanation) -> String {
        let body = format!(
            "<h2>{} as {}</h2>\n<table>\n<tr><th>ABO Group</th><td>{}</td></tr>\n<tr><th>Rh Factor</th><td>{}</td></tr>\n<tr><th>Highlighted</th><td>{}</td></tr>\n</table>\n<p>{}</p>",
            explanation.selected,
            explanation.mode.role(),
            explanation.abo_group,
            explanation.rh_factor,
            join_labels(&explanation.highlighted),
            explanation.summary
        );

        html_page("Blood Type Explanation", &body)
    }

    fn check_delimited(&self, report: &CheckReport, delimiter: u8) -> Result<String> {
        let mut wtr = WriterBuilder::new()
            .delimiter(delimiter)
            .from_writer(Vec::new());

        wtr.write_record(["donor", "recipient", "compatible", "rh_compatible", "abo_compatible"])?;
        wtr.write_record([
            report.donor.to_string(),
            report.recipient.to_string(),
            report.compatible.to_string(),
            report.rh_compatible.to_string(),
            report.abo_compatible.to_string(),
        ])?;

        into_string(wtr)
    }

    fn types_delimited(&self, entities: &[BloodTypeEntity], delimiter: u8) -> Result<String> {
        let mut wtr = WriterBuilder::new()
            .delimiter(delimiter)
            .from_writer(Vec::new());

        wtr.write_record(["blood_type", "abo_group", "rh_factor"])?;
        for entity in entities {
            wtr.write_record([
                entity.label().to_string(),
                entity.abo_group.to_string(),
                entity.rh_factor.to_string(),
            ])?;
        }

        into_string(wtr)
    }

    fn chart_text(&self, chart: &CompatibilityChart) -> String {
        let recipients = chart.recipients();
        let mut text = format!("{:<8}", "D \\ R");
        for recipient in &recipients {
            text.push_str(&format!("{:>5}", recipient.label()));
        }
        text.push('\n');

        for row in &chart.rows {
            text.push_str(&format!("{:<8}", row.donor.label()));
            for &ok in &row.compatible {
                text.push_str(&format!("{:>5}", if ok { "x" } else { "." }));
            }
            text.push('\n');
        }
        text
    }

    fn chart_delimited(&self, chart: &CompatibilityChart, delimiter: u8) -> Result<String> {
        let mut wtr = WriterBuilder::new()
            .delimiter(delimiter)
            .from_writer(Vec::new());

        let mut header = vec!["donor".to_string()];
        header.extend(chart.recipients().iter().map(|id| id.to_string()));
        wtr.write_record(&header)?;

        for row in &chart.rows {
            let mut record = vec![row.donor.to_string()];
            record.extend(
                row.compatible
                    .iter()
                    .map(|&ok| if ok { "yes" } else { "no" }.to_string()),
            );
            wtr.write_record(&record)?;
        }

        into_string(wtr)
    }

    fn chart_html(&self, chart: &CompatibilityChart) -> String {
        let mut table = "<table>\n<tr><th>Donor \\ Recipient</th>".to_string();
        for recipient in chart.recipients() {
            table.push_str(&format!("<th>{}</th>", recipient));
        }
        table.push_str("</tr>\n");

        for row in &chart.rows {
            table.push_str(&format!("<tr><th>{}</th>", row.donor));
            for &ok in &row.compatible {
                if ok {
                    table.push_str("<td class=\"compatibility-high\">&#10003;</td>");
                } else {
                    table.push_str("<td class=\"compatibility-low\"></td>");
                }
            }
            table.push_str("</tr>\n");
        }
        table.push_str("</table>\n");

        html_page("Blood Type Compatibility Chart", &table)
    }
}

impl Default for ReportGenerator {
    fn default() -> Self {
        Self::new(ReportFormat::default())
    }
}

fn join_labels(ids: &[BloodType]) -> String {
    if ids.is_empty() {
        return "(none)".to_string();
    }
    join_labels_with(ids, ", ")
}

fn join_labels_with(ids: &[BloodType], separator: &str) -> String {
    ids.iter().map(BloodType::label).collect::<Vec<_>>().join(separator)
}

fn into_string(wtr: csv::Writer<Vec<u8>>) -> Result<String> {
    let bytes = wtr
        .into_inner()
        .map_err(|e| anyhow::anyhow!("Failed to flush CSV writer: {}", e))?;
    Ok(String::from_utf8(bytes)?)
}

fn html_page(title: &str, body: &str) -> String {
    let timestamp = Local::now().format("%Y-%m-%d %H:%M:%S").to_string();

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <title>{title}</title>
    <style>
        body {{
            font-family: Arial, sans-serif;
            margin: 40px;
            background-color: #f1f5f9;
        }}
        table {{
            border-collapse: collapse;
            margin: 20px 0;
        }}
        th, td {{
            border: 1px solid #ddd;
            padding: 10px;
            text-align: center;
        }}
        th {{
            background-color: #dc2626;
            color: white;
        }}
        .compatibility-high {{
            background-color: #d4edda;
        }}
        .compatibility-low {{
            background-color: #f8d7da;
        }}
        .selected {{
            background-color: #fee2e2;
            font-weight: bold;
        }}
    </style>
</head>
<body>
    <h1>{title}</h1>
    <p>Generated on: {timestamp}</p>
    {body}
</body>
</html>"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::BloodTypeRegistry;
    use tempfile::TempDir;
    use BloodType::*;

    #[test]
    fn test_query_report_contents() {
        let report = QueryReport::new(BNegative, InteractionMode::Receive);
        assert_eq!(report.compatible, vec![ONegative, BNegative]);
        assert_eq!(report.highlighted, vec![ONegative]);
        assert_eq!(report.connections, vec![Connection::new(ONegative, BNegative)]);
        assert!(!report.explanation.is_empty());
    }

    #[test]
    fn test_query_text() -> Result<()> {
        let report = QueryReport::new(APositive, InteractionMode::Give);
        let text = ReportGenerator::new(ReportFormat::Text).render_query(&report)?;

        assert!(text.starts_with("Selected: A+ (GIVE, donor)\n"));
        assert!(text.contains("Compatible: A+, AB+\n"));
        assert!(text.contains("Highlighted: AB+\n"));
        assert!(text.contains("  A+ -> AB+\n"));
        Ok(())
    }

    #[test]
    fn test_query_csv_marks_self_unhighlighted() -> Result<()> {
        let report = QueryReport::new(ONegative, InteractionMode::Receive);
        let csv = ReportGenerator::new(ReportFormat::Csv).render_query(&report)?;
        let lines: Vec<&str> = csv.lines().collect();

        assert_eq!(lines[0], "selected,mode,counterpart,from,to,highlighted");
        assert_eq!(lines[1], "O-,RECEIVE,O-,O-,O-,false");
        assert_eq!(lines.len(), 2);
        Ok(())
    }

    #[test]
    fn test_query_json() -> Result<()> {
        let report = QueryReport::new(ABNegative, InteractionMode::Give);
        let json = ReportGenerator::new(ReportFormat::Json).render_query(&report)?;
        let value: serde_json::Value = serde_json::from_str(&json)?;

        assert_eq!(value["selected"], "AB-");
        assert_eq!(value["mode"], "give");
        assert_eq!(value["highlighted"], serde_json::json!(["AB+"]));
        assert_eq!(value["connections"][0]["from"], "AB-");
        assert_eq!(value["connections"][0]["to"], "AB+");
        Ok(())
    }

    #[test]
    fn test_chart_tsv() -> Result<()> {
        let chart = CompatibilityEngine::new().chart();
        let tsv = ReportGenerator::new(ReportFormat::Tsv).render_chart(&chart)?;
        let lines: Vec<&str> = tsv.lines().collect();

        assert_eq!(lines.len(), 9);
        assert_eq!(lines[0], "donor\tO-\tO+\tA-\tA+\tB-\tB+\tAB-\tAB+");
        assert_eq!(lines[1], "O-\tyes\tyes\tyes\tyes\tyes\tyes\tyes\tyes");
        assert_eq!(lines[8], "AB+\tno\tno\tno\tno\tno\tno\tno\tyes");
        Ok(())
    }

    #[test]
    fn test_chart_text_and_html() -> Result<()> {
        let chart = CompatibilityEngine::new().chart();

        let text = ReportGenerator::new(ReportFormat::Text).render_chart(&chart)?;
        assert_eq!(text.lines().count(), 9);
        assert!(text.lines().nth(1).unwrap_or_default().starts_with("O-"));

        let html = ReportGenerator::new(ReportFormat::Html).render_chart(&chart)?;
        assert!(html.contains("<th>AB+</th>"));
        assert_eq!(html.matches("compatibility-high\">").count(), 27);
        Ok(())
    }

    #[test]
    fn test_write_to_dir_creates_directory() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let output_dir = temp_dir.path().join("reports");

        let generator = ReportGenerator::new(ReportFormat::Json);
        let report = QueryReport::new(OPositive, InteractionMode::Give);
        let content = generator.render_query(&report)?;
        let path = generator.write_to_dir(&output_dir, "query_O+", &content)?;

        assert!(path.starts_with(&output_dir));
        assert_eq!(path.extension().and_then(|e| e.to_str()), Some("json"));
        assert_eq!(fs::read_to_string(&path)?, content);
        Ok(())
    }

    #[test]
    fn test_explanation_html_is_markup() -> Result<()> {
        let explanation = Explanation::for_selection(ABPositive, InteractionMode::Give);
        let html = ReportGenerator::new(ReportFormat::Html).render_explanation(&explanation)?;

        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("<h2>AB+ as donor</h2>"));
        assert!(html.contains(&format!("<p>{}</p>", explanation.summary)));
        Ok(())
    }

    #[test]
    fn test_explanation_csv_and_text() -> Result<()> {
        let explanation = Explanation::for_selection(BNegative, InteractionMode::Receive);

        let csv = ReportGenerator::new(ReportFormat::Csv).render_explanation(&explanation)?;
        let mut reader = csv::Reader::from_reader(csv.as_bytes());
        let headers = reader.headers()?.clone();
        let records: Vec<csv::StringRecord> = reader.records().collect::<std::result::Result<_, _>>()?;

        assert_eq!(&headers[0], "selected");
        assert_eq!(records.len(), 1);
        assert_eq!(&records[0][0], "B-");
        assert_eq!(&records[0][1], "RECEIVE");
        assert_eq!(&records[0][4], "O- B-");
        assert_eq!(&records[0][5], "O-");
        assert_eq!(&records[0][8], explanation.summary.as_str());

        let text = ReportGenerator::new(ReportFormat::Text).render_explanation(&explanation)?;
        assert!(text.starts_with("Selected: B- (RECEIVE, recipient)\nABO group: B\nRh factor: negative\n"));
        Ok(())
    }

    #[test]
    fn test_explanation_written_with_matching_extension() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let generator = ReportGenerator::new(ReportFormat::Html);
        let explanation = Explanation::for_selection(ABPositive, InteractionMode::Give);
        let content = generator.render_explanation(&explanation)?;
        let path = generator.write_to_dir(temp_dir.path(), "explain_AB+", &content)?;

        assert_eq!(path.extension().and_then(|e| e.to_str()), Some("html"));
        assert!(fs::read_to_string(&path)?.contains("<html lang=\"en\">"));
        Ok(())
    }

    #[test]
    fn test_check_report() -> Result<()> {
        let report = CheckReport::new(ABPositive, ONegative);
        assert!(!report.compatible);
        assert_eq!(report.mismatches(), vec!["Rh", "ABO"]);
        assert_eq!(report.verdict(), "AB+ cannot donate to O- (Rh and ABO mismatch)");

        let ok = CheckReport::new(ONegative, ABPositive);
        assert!(ok.compatible);
        assert!(ok.mismatches().is_empty());

        let json = ReportGenerator::new(ReportFormat::Json).render_check(&report)?;
        let value: serde_json::Value = serde_json::from_str(&json)?;
        assert_eq!(value["donor"], "AB+");
        assert_eq!(value["compatible"], false);
        assert_eq!(value["rh_compatible"], false);

        let tsv = ReportGenerator::new(ReportFormat::Tsv).render_check(&ok)?;
        assert_eq!(
            tsv,
            "donor\trecipient\tcompatible\trh_compatible\tabo_compatible\nO-\tAB+\ttrue\ttrue\ttrue\n"
        );
        Ok(())
    }

    #[test]
    fn test_render_types() -> Result<()> {
        let entities = BloodTypeRegistry::all();

        let csv = ReportGenerator::new(ReportFormat::Csv).render_types(entities)?;
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines.len(), 9);
        assert_eq!(lines[0], "blood_type,abo_group,rh_factor");
        assert_eq!(lines[1], "O-,O,negative");
        assert_eq!(lines[8], "AB+,AB,positive");

        let json = ReportGenerator::new(ReportFormat::Json).render_types(entities)?;
        let value: serde_json::Value = serde_json::from_str(&json)?;
        assert_eq!(value[3]["id"], "A+");
        assert_eq!(value[3]["rh_factor"], "positive");
        Ok(())
    }
}

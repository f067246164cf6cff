//! HTML report output, rendered through tera templates

use std::io::Write;

use anyhow::{Context as _, Result};
use serde::Serialize;
use tera::{Context, Tera};

use crate::recon::{Discrepancy, ReconciliationReport};
use crate::suite::SuiteReport;

use super::OutputFormatter;

/// HTML report output
pub struct HtmlOutput;

impl HtmlOutput {
    pub fn new() -> Self {
        Self
    }
}

impl Default for HtmlOutput {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Serialize)]
struct Stat {
    label: String,
    value: usize,
    class: &'static str,
}

#[derive(Serialize)]
struct DiscrepancyRow {
    kind: String,
    key: String,
    column: String,
    left: String,
    right: String,
}

fn discrepancy_row(report: &ReconciliationReport, discrepancy: &Discrepancy) -> DiscrepancyRow {
    let key = discrepancy.key().render(&report.key_columns);
    let kind = discrepancy.kind().to_string();
    let measures_text = |measures: &[crate::recon::MeasureValue]| {
        measures
            .iter()
            .map(|m| format!("{}={}", m.column, m.value))
            .collect::<Vec<_>>()
            .join(", ")
    };
    match discrepancy {
        Discrepancy::LeftOnly { measures, .. } => DiscrepancyRow {
            kind,
            key,
            column: String::new(),
            left: measures_text(measures),
            right: String::new(),
        },
        Discrepancy::RightOnly { measures, .. } => DiscrepancyRow {
            kind,
            key,
            column: String::new(),
            left: String::new(),
            right: measures_text(measures),
        },
        Discrepancy::ValueMismatch {
            column,
            left,
            right,
            ..
        } => DiscrepancyRow {
            kind,
            key,
            column: column.clone(),
            left: left.to_string(),
            right: right.to_string(),
        },
    }
}

impl OutputFormatter for HtmlOutput {
    fn render_report(&self, report: &ReconciliationReport, writer: &mut dyn Write) -> Result<()> {
        let stats = &report.stats;
        let mut ctx = Context::new();
        ctx.insert("css", CSS_STYLES);
        ctx.insert("left", &report.left_label);
        ctx.insert("right", &report.right_label);
        ctx.insert("keys", &report.key_columns);
        ctx.insert("clean", &report.is_clean());
        ctx.insert(
            "stats",
            &[
                Stat { label: "keys".into(), value: stats.keys_total, class: "total" },
                Stat { label: "matched".into(), value: stats.matched, class: "matched" },
                Stat {
                    label: format!("only in {}", report.left_label),
                    value: stats.left_only,
                    class: "left-only",
                },
                Stat {
                    label: format!("only in {}", report.right_label),
                    value: stats.right_only,
                    class: "right-only",
                },
                Stat {
                    label: "differing values".into(),
                    value: stats.value_mismatches,
                    class: "mismatch",
                },
            ],
        );
        let rows: Vec<DiscrepancyRow> = report
            .discrepancies
            .iter()
            .map(|d| discrepancy_row(report, d))
            .collect();
        ctx.insert("rows", &rows);

        let html = Tera::one_off(REPORT_TEMPLATE, &ctx, true)
            .context("Failed to render HTML report")?;
        writer.write_all(html.as_bytes())?;
        Ok(())
    }

    fn render_suite(&self, report: &SuiteReport, writer: &mut dyn Write) -> Result<()> {
        let mut ctx = Context::new();
        ctx.insert("css", CSS_STYLES);
        ctx.insert("suite", report);
        ctx.insert("passed", &report.all_passed());

        let html = Tera::one_off(SUITE_TEMPLATE, &ctx, true)
            .context("Failed to render HTML suite report")?;
        writer.write_all(html.as_bytes())?;
        Ok(())
    }
}

const REPORT_TEMPLATE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8">
  <title>tabrecon: {{ left }} vs {{ right }}</title>
  <style>{{ css | safe }}</style>
</head>
<body>
  <div class="header">
    <h1>tabrecon</h1>
    <p class="files">{{ left }} vs {{ right }} on {{ keys | join(sep=", ") }}</p>
  </div>
  <div class="summary">
    {%- for stat in stats %}
    <div class="stat {{ stat.class }}"><span class="num">{{ stat.value }}</span><span class="label">{{ stat.label }}</span></div>
    {%- endfor %}
  </div>
  {%- if clean %}
  <p class="clean">No discrepancies found.</p>
  {%- else %}
  <div class="section">
    <h2>Discrepancies</h2>
    <table>
      <tr><th>Kind</th><th>Key</th><th>Column</th><th>{{ left }}</th><th>{{ right }}</th></tr>
      {%- for row in rows %}
      <tr class="{{ row.kind }}"><td>{{ row.kind }}</td><td>{{ row.key }}</td><td>{{ row.column }}</td><td class="left">{{ row.left }}</td><td class="right">{{ row.right }}</td></tr>
      {%- endfor %}
    </table>
  </div>
  {%- endif %}
</body>
</html>
"#;

const SUITE_TEMPLATE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8">
  <title>tabrecon suite: {{ suite.name }}</title>
  <style>{{ css | safe }}</style>
</head>
<body>
  <div class="header">
    <h1>{{ suite.name }}</h1>
    <p class="files">{{ suite.source }} vs {{ suite.target }}</p>
  </div>
  <div class="section">
    <table>
      <tr><th>Check</th><th>Result</th><th>Message</th></tr>
      {%- for outcome in suite.outcomes %}
      <tr class="{% if outcome.passed %}pass{% else %}fail{% endif %}"><td>{{ outcome.name }}</td><td>{% if outcome.passed %}PASS{% else %}FAIL{% endif %}</td><td><pre>{{ outcome.message | default(value="") }}</pre></td></tr>
      {%- endfor %}
    </table>
  </div>
  <p class="{% if passed %}clean{% else %}failed{% endif %}">{% if passed %}All checks passed.{% else %}Some checks failed.{% endif %}</p>
</body>
</html>
"#;

const CSS_STYLES: &str = r#"
    :root { --bg: #1a1b26; --fg: #a9b1d6; --accent: #7aa2f7; --green: #9ece6a; --red: #f7768e; --yellow: #e0af68; --border: #414868; }
    * { box-sizing: border-box; margin: 0; padding: 0; }
    body { font-family: 'JetBrains Mono', 'Fira Code', monospace; background: var(--bg); color: var(--fg); padding: 2rem; line-height: 1.6; }
    .header { border-bottom: 2px solid var(--border); padding-bottom: 1rem; margin-bottom: 2rem; }
    .header h1 { color: var(--accent); font-size: 2rem; }
    .summary { display: flex; gap: 2rem; margin-bottom: 2rem; }
    .stat { display: flex; flex-direction: column; padding: 1rem; border-radius: 8px; background: rgba(255,255,255,0.05); }
    .stat .num { font-size: 1.5rem; font-weight: 600; }
    .stat.matched .num, .clean { color: var(--green); }
    .stat.left-only .num, .failed { color: var(--red); }
    .stat.right-only .num { color: var(--green); }
    .stat.mismatch .num { color: var(--yellow); }
    .section h2 { color: var(--accent); margin-bottom: 1rem; }
    table { width: 100%; border-collapse: collapse; margin-bottom: 1rem; }
    th, td { text-align: left; padding: 0.75rem; border: 1px solid var(--border); }
    th { background: rgba(255,255,255,0.05); }
    tr.left_only, tr.fail { background: rgba(247, 118, 142, 0.1); }
    tr.right_only, tr.pass { background: rgba(158, 206, 106, 0.1); }
    tr.value_mismatch td.left { color: var(--red); }
    tr.value_mismatch td.right { color: var(--green); }
    pre { white-space: pre-wrap; }
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::fixtures;

    #[test]
    fn test_report_html() {
        let mut out = Vec::new();
        HtmlOutput.render_report(&fixtures::report(), &mut out).unwrap();
        let html = String::from_utf8(out).unwrap();

        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("<title>tabrecon: left vs right</title>"));
        assert!(html.contains("<tr class=\"left_only\"><td>left_only</td><td>(facility=Pool)</td>"));
        assert!(html.contains("<td class=\"right\">50</td>"));
        assert!(!html.contains("No discrepancies found."));
    }

    #[test]
    fn test_values_are_escaped() {
        let mut report = fixtures::clean_report();
        report.left_label = "<db>".to_string();
        let mut out = Vec::new();
        HtmlOutput.render_report(&report, &mut out).unwrap();
        let html = String::from_utf8(out).unwrap();

        assert!(html.contains("&lt;db&gt;"));
        assert!(html.contains("No discrepancies found."));
    }

    #[test]
    fn test_suite_html() {
        let mut out = Vec::new();
        HtmlOutput.render_suite(&fixtures::suite(), &mut out).unwrap();
        let html = String::from_utf8(out).unwrap();

        assert!(html.contains("<h1>players</h1>"));
        assert!(html.contains("<td>FAIL</td>"));
        assert!(html.contains("Some checks failed."));
    }
}

//! Colored terminal output

use std::io::Write;

use anyhow::Result;
use tabled::builder::Builder;
use tabled::settings::Style;
use termcolor::{Buffer, BufferWriter, Color, ColorChoice, ColorSpec, WriteColor};

use crate::model::KeyTuple;
use crate::recon::compare::percentage_change;
use crate::recon::{Discrepancy, DiscrepancyKind, MeasureValue, ReconciliationReport};
use crate::suite::SuiteReport;

use super::OutputFormatter;

const RULE: &str = "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━";

/// Terminal output with colors
pub struct TerminalOutput {
    color_choice: ColorChoice,
    stats_only: bool,
}

impl TerminalOutput {
    pub fn new() -> Self {
        Self::with_color_choice(ColorChoice::Auto)
    }

    pub fn with_color_choice(color_choice: ColorChoice) -> Self {
        Self {
            color_choice,
            stats_only: false,
        }
    }

    /// Print only the summary line for reconciliation reports
    pub fn with_stats_only(mut self, stats_only: bool) -> Self {
        self.stats_only = stats_only;
        self
    }

    fn buffer(&self) -> Buffer {
        BufferWriter::stdout(self.color_choice).buffer()
    }

    fn write_header(&self, buf: &mut Buffer, title: &str) -> Result<()> {
        writeln!(buf, "{}", RULE)?;
        writeln!(buf, " tabrecon: {}", title)?;
        writeln!(buf, "{}", RULE)?;
        writeln!(buf)?;
        Ok(())
    }

    fn write_colored(&self, buf: &mut Buffer, color: Color, text: &str) -> Result<()> {
        buf.set_color(ColorSpec::new().set_fg(Some(color)).set_bold(true))?;
        write!(buf, "{}", text)?;
        buf.reset()?;
        Ok(())
    }

    fn write_summary(&self, report: &ReconciliationReport, buf: &mut Buffer) -> Result<()> {
        let stats = &report.stats;
        writeln!(
            buf,
            "Keys: {}   Measures: {}",
            report.key_columns.join(", "),
            if report.measure_columns.is_empty() {
                "(none)".to_string()
            } else {
                report.measure_columns.join(", ")
            }
        )?;
        writeln!(
            buf,
            "Summary: {} keys, {} matched, -{} only in {}, +{} only in {}, ~{} rows with {} differing values ({} → {} rows)",
            stats.keys_total,
            stats.matched,
            stats.left_only,
            report.left_label,
            stats.right_only,
            report.right_label,
            stats.mismatched_rows,
            stats.value_mismatches,
            stats.left_rows,
            stats.right_rows
        )?;
        writeln!(buf)?;
        Ok(())
    }

    fn write_unmatched(
        &self,
        report: &ReconciliationReport,
        kind: DiscrepancyKind,
        buf: &mut Buffer,
    ) -> Result<()> {
        let rows: Vec<(&KeyTuple, &[MeasureValue])> = report
            .of_kind(kind)
            .filter_map(|d| match d {
                Discrepancy::LeftOnly { key, measures } | Discrepancy::RightOnly { key, measures } => {
                    Some((key, measures.as_slice()))
                }
                Discrepancy::ValueMismatch { .. } => None,
            })
            .collect();
        if rows.is_empty() {
            return Ok(());
        }

        let (label, color) = match kind {
            DiscrepancyKind::LeftOnly => (&report.left_label, Color::Red),
            _ => (&report.right_label, Color::Green),
        };
        self.write_colored(buf, color, &format!("Only in {}:", label))?;
        writeln!(buf)?;

        let mut builder = Builder::default();
        builder.push_record(
            report
                .key_columns
                .iter()
                .chain(report.measure_columns.iter())
                .cloned(),
        );
        for (key, measures) in rows {
            builder.push_record(
                key.values()
                    .iter()
                    .chain(measures.iter().map(|m| &m.value))
                    .map(|v| v.display().into_owned()),
            );
        }
        writeln!(buf, "{}", builder.build().with(Style::modern()))?;
        writeln!(buf)?;
        Ok(())
    }

    fn write_mismatches(&self, report: &ReconciliationReport, buf: &mut Buffer) -> Result<()> {
        let mismatches: Vec<_> = report.of_kind(DiscrepancyKind::ValueMismatch).collect();
        if mismatches.is_empty() {
            return Ok(());
        }

        self.write_colored(buf, Color::Yellow, "Different values:")?;
        writeln!(buf)?;

        let mut builder = Builder::default();
        builder.push_record([
            "key".to_string(),
            "column".to_string(),
            report.left_label.clone(),
            report.right_label.clone(),
            "change".to_string(),
        ]);
        for discrepancy in mismatches {
            if let Discrepancy::ValueMismatch {
                key,
                column,
                left,
                right,
            } = discrepancy
            {
                let change = percentage_change(left, right)
                    .map(|p| format!("{:+.1}%", p))
                    .unwrap_or_default();
                builder.push_record([
                    key.render(&report.key_columns),
                    column.clone(),
                    left.display().into_owned(),
                    right.display().into_owned(),
                    change,
                ]);
            }
        }
        writeln!(buf, "{}", builder.build().with(Style::modern()))?;
        writeln!(buf)?;
        Ok(())
    }
}

impl Default for TerminalOutput {
    fn default() -> Self {
        Self::new()
    }
}

impl OutputFormatter for TerminalOutput {
    fn render_report(&self, report: &ReconciliationReport, writer: &mut dyn Write) -> Result<()> {
        let mut buf = self.buffer();
        self.write_header(
            &mut buf,
            &format!("{} ↔ {}", report.left_label, report.right_label),
        )?;
        self.write_summary(report, &mut buf)?;

        if report.is_clean() {
            self.write_colored(&mut buf, Color::Green, "No discrepancies found.")?;
            writeln!(buf)?;
        } else if !self.stats_only {
            self.write_unmatched(report, DiscrepancyKind::LeftOnly, &mut buf)?;
            self.write_unmatched(report, DiscrepancyKind::RightOnly, &mut buf)?;
            self.write_mismatches(report, &mut buf)?;
        }

        writer.write_all(buf.as_slice())?;
        Ok(())
    }

    fn render_suite(&self, report: &SuiteReport, writer: &mut dyn Write) -> Result<()> {
        let mut buf = self.buffer();
        self.write_header(
            &mut buf,
            &format!("{} ({} vs {})", report.name, report.source, report.target),
        )?;

        for outcome in &report.outcomes {
            write!(buf, "  ")?;
            if outcome.passed {
                self.write_colored(&mut buf, Color::Green, "PASS")?;
            } else {
                self.write_colored(&mut buf, Color::Red, "FAIL")?;
            }
            writeln!(buf, " {}", outcome.name)?;
            if let Some(ref message) = outcome.message {
                for line in message.lines() {
                    writeln!(buf, "       {}", line)?;
                }
            }
        }

        let failed = report.failures().count();
        writeln!(buf)?;
        writeln!(
            buf,
            "Result: {} passed, {} failed",
            report.outcomes.len() - failed,
            failed
        )?;

        writer.write_all(buf.as_slice())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::fixtures;

    fn render(output: &TerminalOutput, report: &ReconciliationReport) -> String {
        let mut out = Vec::new();
        output.render_report(report, &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_report_sections() {
        let text = render(
            &TerminalOutput::with_color_choice(ColorChoice::Never),
            &fixtures::report(),
        );
        assert!(text.contains("tabrecon: left ↔ right"));
        assert!(text.contains("Summary: 3 keys, 0 matched, -1 only in left, +1 only in right"));
        assert!(text.contains("Only in left:"));
        assert!(text.contains("Pool"));
        assert!(text.contains("Only in right:"));
        assert!(text.contains("Sauna"));
        assert!(text.contains("Different values:"));
        assert!(text.contains("+25.0%"));
        assert!(!text.contains('\u{1b}'));
    }

    #[test]
    fn test_stats_only_omits_tables() {
        let output = TerminalOutput::with_color_choice(ColorChoice::Never).with_stats_only(true);
        let text = render(&output, &fixtures::report());
        assert!(text.contains("Summary:"));
        assert!(!text.contains("Only in left:"));
    }

    #[test]
    fn test_clean_report() {
        let text = render(
            &TerminalOutput::with_color_choice(ColorChoice::Never),
            &fixtures::clean_report(),
        );
        assert!(text.contains("No discrepancies found."));
    }

    #[test]
    fn test_suite_outcomes() {
        let mut out = Vec::new();
        TerminalOutput::with_color_choice(ColorChoice::Never)
            .render_suite(&fixtures::suite(), &mut out)
            .unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("PASS not_empty"));
        assert!(text.contains("FAIL no_nulls"));
        assert!(text.contains("Null values found in columns: [\"email\"]"));
        assert!(text.contains("Result: 1 passed, 1 failed"));
    }
}

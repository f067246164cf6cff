//! Diff-style output: left-side lines with `-`, right-side lines with `+`

use std::io::Write;

use anyhow::Result;

use crate::recon::{Discrepancy, MeasureValue, ReconciliationReport};
use crate::suite::SuiteReport;

use super::OutputFormatter;

/// Unified diff-style output
pub struct UnifiedOutput;

impl UnifiedOutput {
    pub fn new() -> Self {
        Self
    }
}

impl Default for UnifiedOutput {
    fn default() -> Self {
        Self::new()
    }
}

fn measures_line(measures: &[MeasureValue]) -> String {
    measures
        .iter()
        .map(|m| format!("{}={}", m.column, m.value))
        .collect::<Vec<_>>()
        .join(",")
}

impl OutputFormatter for UnifiedOutput {
    fn render_report(&self, report: &ReconciliationReport, writer: &mut dyn Write) -> Result<()> {
        writeln!(writer, "--- {}", report.left_label)?;
        writeln!(writer, "+++ {}", report.right_label)?;

        for discrepancy in &report.discrepancies {
            let key = discrepancy.key().render(&report.key_columns);
            match discrepancy {
                Discrepancy::LeftOnly { measures, .. } => {
                    writeln!(writer, "@@ {} @@", key)?;
                    writeln!(writer, "-{}", measures_line(measures))?;
                }
                Discrepancy::RightOnly { measures, .. } => {
                    writeln!(writer, "@@ {} @@", key)?;
                    writeln!(writer, "+{}", measures_line(measures))?;
                }
                Discrepancy::ValueMismatch {
                    column,
                    left,
                    right,
                    ..
                } => {
                    writeln!(writer, "@@ {} {} @@", key, column)?;
                    writeln!(writer, "-{}", left)?;
                    writeln!(writer, "+{}", right)?;
                }
            }
        }

        Ok(())
    }

    fn render_suite(&self, report: &SuiteReport, writer: &mut dyn Write) -> Result<()> {
        writeln!(writer, "--- {}", report.source)?;
        writeln!(writer, "+++ {}", report.target)?;

        for outcome in report.failures() {
            writeln!(writer, "@@ {} @@", outcome.name)?;
            for line in outcome.message.as_deref().unwrap_or_default().lines() {
                writeln!(writer, "-{}", line)?;
            }
        }

        Ok(())
    }
}

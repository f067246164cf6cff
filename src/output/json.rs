//! JSON output format

use std::io::Write;

use anyhow::Result;
use serde::Serialize;

use crate::recon::ReconciliationReport;
use crate::suite::SuiteReport;

use super::OutputFormatter;

/// JSON output formatter
pub struct JsonOutput {
    pretty: bool,
}

impl JsonOutput {
    pub fn new() -> Self {
        Self { pretty: true }
    }

    pub fn compact() -> Self {
        Self { pretty: false }
    }

    fn write<T: Serialize>(&self, value: &T, writer: &mut dyn Write) -> Result<()> {
        if self.pretty {
            serde_json::to_writer_pretty(&mut *writer, value)?;
        } else {
            serde_json::to_writer(&mut *writer, value)?;
        }
        writeln!(writer)?;
        Ok(())
    }
}

impl Default for JsonOutput {
    fn default() -> Self {
        Self::new()
    }
}

/// Report plus its rendered lines, so consumers need not rebuild messages
#[derive(Serialize)]
struct JsonReport<'a> {
    clean: bool,
    #[serde(flatten)]
    report: &'a ReconciliationReport,
    messages: Vec<String>,
}

#[derive(Serialize)]
struct JsonSuite<'a> {
    passed: bool,
    #[serde(flatten)]
    report: &'a SuiteReport,
}

impl OutputFormatter for JsonOutput {
    fn render_report(&self, report: &ReconciliationReport, writer: &mut dyn Write) -> Result<()> {
        let output = JsonReport {
            clean: report.is_clean(),
            report,
            messages: report.messages().unwrap_or_default(),
        };
        self.write(&output, writer)
    }

    fn render_suite(&self, report: &SuiteReport, writer: &mut dyn Write) -> Result<()> {
        let output = JsonSuite {
            passed: report.all_passed(),
            report,
        };
        self.write(&output, writer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::fixtures;
    use serde_json::Value;

    #[test]
    fn test_report_json() {
        let mut out = Vec::new();
        JsonOutput::compact()
            .render_report(&fixtures::report(), &mut out)
            .unwrap();
        let json: Value = serde_json::from_slice(&out).unwrap();

        assert_eq!(json["clean"], false);
        assert_eq!(json["left_label"], "left");
        assert_eq!(json["stats"]["keys_total"], 3);
        assert_eq!(json["discrepancies"][0]["kind"], "value_mismatch");
        assert_eq!(json["discrepancies"][0]["key"], serde_json::json!(["Gym"]));
        assert_eq!(json["discrepancies"][0]["right"], 50.0);
        assert_eq!(
            json["messages"][1],
            "(facility=Pool) is present in left but missing in right"
        );
    }

    #[test]
    fn test_suite_json() {
        let mut out = Vec::new();
        JsonOutput::new()
            .render_suite(&fixtures::suite(), &mut out)
            .unwrap();
        let json: Value = serde_json::from_slice(&out).unwrap();

        assert_eq!(json["passed"], false);
        assert_eq!(json["outcomes"][1]["name"], "no_nulls");
        assert!(json["outcomes"][0].get("message").is_none());
    }
}

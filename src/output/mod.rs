//! Output formatting for reconciliation and suite reports

mod html;
mod json;
mod terminal;
mod unified;

use std::io::{IsTerminal, Write};

use anyhow::Result;
use termcolor::ColorChoice;

use crate::config::OutputFormat;
use crate::recon::ReconciliationReport;
use crate::suite::SuiteReport;

pub use html::HtmlOutput;
pub use json::JsonOutput;
pub use terminal::TerminalOutput;
pub use unified::UnifiedOutput;

/// Trait for output formatters
pub trait OutputFormatter {
    /// Render a reconciliation report to a writer
    fn render_report(&self, report: &ReconciliationReport, writer: &mut dyn Write) -> Result<()>;

    /// Render the outcomes of a check suite to a writer
    fn render_suite(&self, report: &SuiteReport, writer: &mut dyn Write) -> Result<()>;
}

/// Factory for creating output formatters
pub struct OutputFactory;

impl OutputFactory {
    /// Create an output formatter based on format type
    pub fn create(format: OutputFormat, stats_only: bool) -> Box<dyn OutputFormatter> {
        match format {
            OutputFormat::Terminal => {
                let color_choice = if std::io::stdout().is_terminal() {
                    ColorChoice::Auto
                } else {
                    ColorChoice::Never
                };
                Box::new(
                    TerminalOutput::with_color_choice(color_choice).with_stats_only(stats_only),
                )
            }
            OutputFormat::Json => Box::new(JsonOutput::new()),
            OutputFormat::Html => Box::new(HtmlOutput::new()),
            OutputFormat::Unified => Box::new(UnifiedOutput::new()),
        }
    }
}

/// Render a reconciliation report to stdout
pub fn render_report_to_stdout(
    report: &ReconciliationReport,
    format: OutputFormat,
    stats_only: bool,
) -> Result<()> {
    let formatter = OutputFactory::create(format, stats_only);
    let mut stdout = std::io::stdout().lock();
    formatter.render_report(report, &mut stdout)
}

/// Render a suite report to stdout
pub fn render_suite_to_stdout(report: &SuiteReport, format: OutputFormat) -> Result<()> {
    let formatter = OutputFactory::create(format, false);
    let mut stdout = std::io::stdout().lock();
    formatter.render_suite(report, &mut stdout)
}

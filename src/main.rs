//! tabrecon - Reconciliation and data-quality checks for tabular data

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};
use tracing::info;
use tracing_subscriber::EnvFilter;

use tabrecon::config::{parse_alias, parse_tolerance, Config, OutputFormat};
use tabrecon::output::{render_report_to_stdout, render_suite_to_stdout};
use tabrecon::parser::ParserFactory;
use tabrecon::suite::{columns_arg, run_suite, CheckOutcome, SuiteConfig, SuiteReport};
use tabrecon::validate::{quality, validate_table, SchemaPolicy};
use tabrecon::{Reconciler, Table};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliOutputFormat {
    Terminal,
    Json,
    Html,
    Unified,
}

impl From<CliOutputFormat> for OutputFormat {
    fn from(f: CliOutputFormat) -> Self {
        match f {
            CliOutputFormat::Terminal => OutputFormat::Terminal,
            CliOutputFormat::Json => OutputFormat::Json,
            CliOutputFormat::Html => OutputFormat::Html,
            CliOutputFormat::Unified => OutputFormat::Unified,
        }
    }
}

/// Reconciliation and data-quality checks for tabular data (CSV, Excel, Parquet, JSON)
#[derive(Parser, Debug)]
#[command(name = "tabrecon")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Log more to stderr (-v info, -vv debug); RUST_LOG applies otherwise
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

/// Options for reading input files
#[derive(Args, Debug)]
struct ReadArgs {
    /// For Excel files: which sheet to read
    #[arg(long)]
    sheet: Option<String>,

    /// For Parquet directories: do not descend into subdirectories
    #[arg(long)]
    no_subfolders: bool,

    /// Column(s) to sort by after reading (comma-separated)
    #[arg(long, value_delimiter = ',')]
    sort_by: Vec<String>,
}

impl ReadArgs {
    fn config(&self) -> Config {
        let config = Config::new()
            .with_include_subfolders(!self.no_subfolders)
            .with_sort_by(self.sort_by.clone());
        match self.sheet {
            Some(ref sheet) => config.with_sheet_name(sheet.clone()),
            None => config,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Check a file's columns against an expected list
    Schema {
        file: PathBuf,

        /// Expected column names, in order (comma-separated)
        #[arg(long, value_delimiter = ',', required = true)]
        expected: Vec<String>,

        /// Do not fail on columns that are not expected
        #[arg(long)]
        allow_extra: bool,

        /// Do not fail on columns in the wrong position
        #[arg(long)]
        ignore_order: bool,

        #[arg(short, long, value_enum, default_value = "terminal")]
        format: CliOutputFormat,

        #[command(flatten)]
        read: ReadArgs,
    },

    /// Run single-table quality checks (all of them when none is selected)
    Check {
        file: PathBuf,

        /// Fail when the table has no rows
        #[arg(long)]
        not_empty: bool,

        /// Fail on nulls in these columns (comma-separated; all when empty)
        #[arg(long, num_args = 0.., value_delimiter = ',')]
        no_nulls: Option<Vec<String>>,

        /// Fail on rows repeating these columns (comma-separated; all when empty)
        #[arg(long, num_args = 0.., value_delimiter = ',')]
        no_duplicates: Option<Vec<String>>,

        #[arg(short, long, value_enum, default_value = "terminal")]
        format: CliOutputFormat,

        #[command(flatten)]
        read: ReadArgs,
    },

    /// Compare row counts and contents of two files position by position
    Compare {
        source: PathBuf,
        target: PathBuf,

        #[arg(short, long, value_enum, default_value = "terminal")]
        format: CliOutputFormat,

        #[command(flatten)]
        read: ReadArgs,
    },

    /// Match rows of two files on key columns and report discrepancies
    Reconcile {
        left: PathBuf,
        right: PathBuf,

        /// Join key column(s) (comma-separated)
        #[arg(short, long, value_delimiter = ',', required = true)]
        key: Vec<String>,

        /// Measure column(s) compared on matched rows (comma-separated)
        #[arg(short, long, value_delimiter = ',')]
        measure: Vec<String>,

        /// Absolute tolerance for numeric comparisons (e.g., 0.001)
        #[arg(long, value_parser = parse_tolerance)]
        tolerance: Option<f64>,

        /// Rename a column after normalization (old=new, repeatable)
        #[arg(long, value_parser = parse_alias)]
        alias: Vec<(String, String)>,

        /// Name of the left file in reports
        #[arg(long)]
        left_label: Option<String>,

        /// Name of the right file in reports
        #[arg(long)]
        right_label: Option<String>,

        /// Ignore case when comparing string values
        #[arg(long)]
        ignore_case: bool,

        /// Ignore leading/trailing whitespace in string values
        #[arg(long)]
        ignore_whitespace: bool,

        #[arg(short, long, value_enum, default_value = "terminal")]
        format: CliOutputFormat,

        /// Only show statistics, not detailed discrepancies
        #[arg(long)]
        stats_only: bool,

        #[command(flatten)]
        read: ReadArgs,
    },

    /// Run a TOML check suite
    Run {
        suite: PathBuf,

        #[arg(short, long, value_enum, default_value = "terminal")]
        format: CliOutputFormat,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli.command) {
        Ok(passed) => {
            if passed {
                ExitCode::SUCCESS
            } else {
                ExitCode::from(1) // Failures or discrepancies found
            }
        }
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::from(2)
        }
    }
}

fn init_tracing(verbose: u8) {
    let filter = match verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("tabrecon=info"),
        _ => EnvFilter::new("tabrecon=debug"),
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_env_filter(filter)
        .init();
}

fn load(factory: &ParserFactory, path: &Path, config: &Config) -> Result<Table> {
    factory
        .parse(path, config)
        .with_context(|| format!("Failed to parse {}", path.display()))
}

fn single_table_report(name: &str, table: &Table, outcomes: Vec<CheckOutcome>) -> SuiteReport {
    SuiteReport {
        name: name.to_string(),
        source: table.label().to_string(),
        target: table.label().to_string(),
        outcomes,
        reconciliation: None,
    }
}

/// Returns whether everything passed
fn run(command: Command) -> Result<bool> {
    let factory = ParserFactory::new();

    match command {
        Command::Schema {
            file,
            expected,
            allow_extra,
            ignore_order,
            format,
            read,
        } => {
            let table = load(&factory, &file, &read.config())?;
            let diff = validate_table(&table, &expected);
            let policy = SchemaPolicy {
                allow_extra,
                check_order: !ignore_order,
            };
            let report =
                single_table_report("schema", &table, vec![CheckOutcome::schema(&diff, policy)]);
            render_suite_to_stdout(&report, format.into())?;
            Ok(report.all_passed())
        }

        Command::Check {
            file,
            not_empty,
            no_nulls,
            no_duplicates,
            format,
            read,
        } => {
            let table = load(&factory, &file, &read.config())?;
            let run_all = !not_empty && no_nulls.is_none() && no_duplicates.is_none();

            let mut outcomes = Vec::new();
            if not_empty || run_all {
                outcomes.push(CheckOutcome::from_result(
                    "not_empty",
                    quality::not_empty(&table),
                ));
            }
            if let Some(columns) = no_nulls.or_else(|| run_all.then(Vec::new)) {
                let columns = columns_arg(&columns);
                outcomes.push(CheckOutcome::from_result(
                    "no_nulls",
                    quality::no_nulls(&table, columns.as_deref()),
                ));
            }
            if let Some(columns) = no_duplicates.or_else(|| run_all.then(Vec::new)) {
                let columns = columns_arg(&columns);
                outcomes.push(CheckOutcome::from_result(
                    "no_duplicates",
                    quality::no_duplicates(&table, columns.as_deref()),
                ));
            }

            let report = single_table_report("check", &table, outcomes);
            render_suite_to_stdout(&report, format.into())?;
            Ok(report.all_passed())
        }

        Command::Compare {
            source,
            target,
            format,
            read,
        } => {
            let config = read.config();
            let source = load(&factory, &source, &config)?;
            let target = load(&factory, &target, &config)?;

            let report = SuiteReport {
                name: "compare".to_string(),
                source: source.label().to_string(),
                target: target.label().to_string(),
                outcomes: vec![
                    CheckOutcome::from_result(
                        "row_count_match",
                        quality::row_count_match(&source, &target),
                    ),
                    CheckOutcome::from_result(
                        "full_equality",
                        quality::full_equality(&source, &target),
                    ),
                ],
                reconciliation: None,
            };
            render_suite_to_stdout(&report, format.into())?;
            Ok(report.all_passed())
        }

        Command::Reconcile {
            left,
            right,
            key,
            measure,
            tolerance,
            alias,
            left_label,
            right_label,
            ignore_case,
            ignore_whitespace,
            format,
            stats_only,
            read,
        } => {
            let read_config = read.config();
            let left_table = load(&factory, &left, &read_config)?;
            let right_table = load(&factory, &right, &read_config)?;

            let mut config = read_config
                .with_key_columns(key)
                .with_measure_columns(measure)
                .with_aliases(alias)
                .with_ignore_case(ignore_case)
                .with_ignore_whitespace(ignore_whitespace)
                .with_output_format(format.into())
                .with_stats_only(stats_only)
                .with_labels(
                    left_label.unwrap_or_else(|| left_table.label().to_string()),
                    right_label.unwrap_or_else(|| right_table.label().to_string()),
                );
            if let Some(tolerance) = tolerance {
                config = config.with_numeric_tolerance(tolerance);
            }

            let report = Reconciler::new(config.clone()).reconcile(&left_table, &right_table)?;
            info!(
                discrepancies = report.discrepancies.len(),
                keys = report.stats.keys_total,
                "reconciled"
            );
            render_report_to_stdout(&report, config.output_format, config.stats_only)?;
            Ok(report.is_clean())
        }

        Command::Run { suite, format } => {
            let config = SuiteConfig::load(&suite)?;
            let base_dir = suite.parent().unwrap_or_else(|| Path::new("."));
            let report = run_suite(&config, base_dir)?;
            render_suite_to_stdout(&report, format.into())?;
            Ok(report.all_passed())
        }
    }
}

//! Configuration handling for tabrecon

/// Absolute tolerance for numeric measure comparisons
pub const DEFAULT_NUMERIC_TOLERANCE: f64 = 1e-9;

/// Output format for reports
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Terminal,
    Json,
    Html,
    Unified,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "terminal" => Ok(OutputFormat::Terminal),
            "json" => Ok(OutputFormat::Json),
            "html" => Ok(OutputFormat::Html),
            "unified" => Ok(OutputFormat::Unified),
            _ => Err(format!("Unknown output format: {}", s)),
        }
    }
}

/// Configuration for reading, reconciling and reporting
#[derive(Debug, Clone)]
pub struct Config {
    /// Join key columns for reconciliation
    pub key_columns: Vec<String>,
    /// Measure columns compared once rows are matched
    pub measure_columns: Vec<String>,
    /// Output format
    pub output_format: OutputFormat,
    /// Ignore case when comparing string values
    pub ignore_case: bool,
    /// Absolute tolerance for numeric comparisons
    pub numeric_tolerance: f64,
    /// Ignore leading/trailing whitespace in string values
    pub ignore_whitespace: bool,
    /// Column renames applied after name normalization, as `(from, to)`
    pub aliases: Vec<(String, String)>,
    /// Name of the left table in reports
    pub left_label: String,
    /// Name of the right table in reports
    pub right_label: String,
    /// Columns to sort by after reading (canonicalizes row order)
    pub sort_by: Vec<String>,
    /// For Excel files: which sheet to read
    pub sheet_name: Option<String>,
    /// For Parquet directories: descend into subdirectories
    pub include_subfolders: bool,
    /// Only show statistics, not detailed discrepancies
    pub stats_only: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            key_columns: Vec::new(),
            measure_columns: Vec::new(),
            output_format: OutputFormat::default(),
            ignore_case: false,
            numeric_tolerance: DEFAULT_NUMERIC_TOLERANCE,
            ignore_whitespace: false,
            aliases: Vec::new(),
            left_label: "left".to_string(),
            right_label: "right".to_string(),
            sort_by: Vec::new(),
            sheet_name: None,
            include_subfolders: true,
            stats_only: false,
        }
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set join key columns
    pub fn with_key_columns(mut self, keys: Vec<String>) -> Self {
        self.key_columns = keys;
        self
    }

    /// Set measure columns
    pub fn with_measure_columns(mut self, measures: Vec<String>) -> Self {
        self.measure_columns = measures;
        self
    }

    /// Set output format
    pub fn with_output_format(mut self, format: OutputFormat) -> Self {
        self.output_format = format;
        self
    }

    /// Enable case-insensitive comparison
    pub fn with_ignore_case(mut self, ignore: bool) -> Self {
        self.ignore_case = ignore;
        self
    }

    /// Set numeric tolerance for float comparisons
    pub fn with_numeric_tolerance(mut self, tolerance: f64) -> Self {
        self.numeric_tolerance = tolerance;
        self
    }

    /// Enable whitespace-insensitive comparison
    pub fn with_ignore_whitespace(mut self, ignore: bool) -> Self {
        self.ignore_whitespace = ignore;
        self
    }

    /// Set column renames
    pub fn with_aliases(mut self, aliases: Vec<(String, String)>) -> Self {
        self.aliases = aliases;
        self
    }

    /// Set the names the two sides go by in reports
    pub fn with_labels(mut self, left: impl Into<String>, right: impl Into<String>) -> Self {
        self.left_label = left.into();
        self.right_label = right.into();
        self
    }

    /// Set sort columns for normalization
    pub fn with_sort_by(mut self, columns: Vec<String>) -> Self {
        self.sort_by = columns;
        self
    }

    /// Set Excel sheet name
    pub fn with_sheet_name(mut self, name: String) -> Self {
        self.sheet_name = Some(name);
        self
    }

    /// Recurse into subdirectories when reading a Parquet directory
    pub fn with_include_subfolders(mut self, include: bool) -> Self {
        self.include_subfolders = include;
        self
    }

    /// Enable stats-only mode
    pub fn with_stats_only(mut self, stats_only: bool) -> Self {
        self.stats_only = stats_only;
        self
    }
}

/// Parse an `old=new` alias argument
pub fn parse_alias(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((from, to)) if !from.trim().is_empty() && !to.trim().is_empty() => {
            Ok((from.trim().to_string(), to.trim().to_string()))
        }
        _ => Err(format!("Invalid alias '{}', expected old=new", s)),
    }
}

/// Accept a numeric tolerance only when it is a non-negative number
pub fn validate_tolerance(tolerance: f64) -> Result<f64, String> {
    if tolerance >= 0.0 {
        Ok(tolerance)
    } else {
        Err(format!(
            "Invalid tolerance '{}', expected a non-negative number",
            tolerance
        ))
    }
}

/// Parse a `--tolerance` argument
pub fn parse_tolerance(s: &str) -> Result<f64, String> {
    let tolerance = s.trim().parse::<f64>().map_err(|_| {
        format!("Invalid tolerance '{}', expected a non-negative number", s)
    })?;
    validate_tolerance(tolerance)
}

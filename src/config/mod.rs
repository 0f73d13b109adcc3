pub mod cli;
pub mod settings;
pub mod toml_config;

#[cfg(feature = "cli")]
use crate::config::settings::Settings;
#[cfg(feature = "cli")]
use crate::config::toml_config::TomlConfig;
#[cfg(feature = "cli")]
use crate::core::query::RowLimit;
#[cfg(feature = "cli")]
use crate::core::FieldValue;
#[cfg(feature = "cli")]
use clap::Parser;
#[cfg(feature = "cli")]
use std::time::Duration;

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Parser)]
#[command(name = "employee-etl")]
#[command(about = "Fetch, normalize and query employee records")]
pub struct CliConfig {
    /// Endpoint returning a JSON array of employee objects
    #[arg(long)]
    pub source_url: Option<String>,

    /// Total fetch attempts before giving up (default: 3)
    #[arg(long)]
    pub max_attempts: Option<u32>,

    /// Per-request timeout in seconds (default: 10)
    #[arg(long)]
    pub timeout_seconds: Option<u64>,

    /// Number of rows to display (default: 5)
    #[arg(long)]
    pub rows: Option<usize>,

    /// Display all rows
    #[arg(long)]
    pub all: bool,

    /// Filter by department
    #[arg(long)]
    pub department: Option<String>,

    /// Filter by designation
    #[arg(long)]
    pub designation: Option<String>,

    /// Filter by gender
    #[arg(long)]
    pub gender: Option<String>,

    /// Extra equality filter, repeatable
    #[arg(long = "filter", value_name = "FIELD=VALUE", value_parser = parse_filter)]
    pub filters: Vec<(String, String)>,

    /// Specific columns to display
    #[arg(long, num_args = 1.., value_delimiter = ',')]
    pub columns: Vec<String>,

    /// Where to write the normalized CSV
    #[arg(long)]
    pub output: Option<String>,

    /// Skip writing the normalized CSV
    #[arg(long)]
    pub no_save: bool,

    /// Show the dashboard summary instead of the query table
    #[arg(long)]
    pub ui: bool,

    /// TOML settings file
    #[arg(short, long)]
    pub config: Option<String>,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long)]
    pub log_json: bool,
}

#[cfg(feature = "cli")]
fn parse_filter(raw: &str) -> std::result::Result<(String, String), String> {
    match raw.split_once('=') {
        Some((field, value)) if !field.trim().is_empty() => {
            Ok((field.trim().to_string(), value.to_string()))
        }
        _ => Err(format!("expected FIELD=VALUE, got '{}'", raw)),
    }
}

#[cfg(feature = "cli")]
impl CliConfig {
    /// Flags win over the file; the file wins over built-in defaults.
    pub fn resolve(&self, file: Option<&TomlConfig>) -> Settings {
        let mut settings = file.map(Settings::from_toml).unwrap_or_default();

        if let Some(url) = &self.source_url {
            settings.source_url = url.clone();
        }
        if let Some(attempts) = self.max_attempts {
            settings.max_attempts = attempts;
        }
        if let Some(secs) = self.timeout_seconds {
            settings.timeout = Duration::from_secs(secs);
        }

        if self.all {
            settings.row_limit = RowLimit::All;
        } else if let Some(rows) = self.rows {
            settings.row_limit = RowLimit::Limited(rows);
        }

        let shorthand = [
            ("department", &self.department),
            ("designation", &self.designation),
            ("gender", &self.gender),
        ];
        let flag_filters = self.filters.iter().map(|(k, v)| (k.clone(), v.clone())).chain(
            shorthand
                .into_iter()
                .filter_map(|(k, v)| v.as_ref().map(|v| (k.to_string(), v.clone()))),
        );
        for (field, value) in flag_filters {
            settings.filters.insert(field, FieldValue::Text(value));
        }

        if !self.columns.is_empty() {
            settings.columns = Some(self.columns.clone());
        }

        if self.no_save {
            settings.output_path = None;
        } else if let Some(output) = &self.output {
            settings.output_path = Some(output.clone());
        }

        settings
    }
}

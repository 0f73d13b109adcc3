use crate::config::toml_config::TomlConfig;
use crate::core::fetcher::{DEFAULT_BACKOFF_UNIT, DEFAULT_MAX_ATTEMPTS, DEFAULT_TIMEOUT};
use crate::core::query::{QueryRequest, RowLimit};
use crate::core::summary::Selection;
use crate::core::{ConfigProvider, FieldValue};
use crate::utils::error::{EtlError, Result};
use crate::utils::validation::{validate_path, validate_positive_number, validate_url, Validate};
use std::collections::HashMap;
use std::time::Duration;

pub const DEFAULT_SOURCE_URL: &str =
    "https://api.slingacademy.com/v1/sample-data/files/employees.json";
pub const DEFAULT_OUTPUT_PATH: &str = "employees_normalized.csv";

/// Fully resolved run settings: CLI flags over config file over defaults.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub source_url: String,
    pub max_attempts: u32,
    pub timeout: Duration,
    pub backoff_unit: Duration,
    pub row_limit: RowLimit,
    pub filters: HashMap<String, FieldValue>,
    pub columns: Option<Vec<String>>,
    pub output_path: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            source_url: DEFAULT_SOURCE_URL.to_string(),
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            timeout: DEFAULT_TIMEOUT,
            backoff_unit: DEFAULT_BACKOFF_UNIT,
            row_limit: RowLimit::default(),
            filters: HashMap::new(),
            columns: None,
            output_path: Some(DEFAULT_OUTPUT_PATH.to_string()),
        }
    }
}

impl Settings {
    /// Defaults overlaid with whatever the file specifies.
    pub fn from_toml(file: &TomlConfig) -> Self {
        let mut settings = Self::default();

        if let Some(endpoint) = file.endpoint() {
            settings.source_url = endpoint.to_string();
        }
        if let Some(secs) = file.timeout_seconds() {
            settings.timeout = Duration::from_secs(secs);
        }
        if let Some(attempts) = file.max_attempts() {
            settings.max_attempts = attempts;
        }
        if let Some(ms) = file.backoff_unit_ms() {
            settings.backoff_unit = Duration::from_millis(ms);
        }

        if let Some(query) = &file.query {
            if query.all == Some(true) {
                settings.row_limit = RowLimit::All;
            } else if let Some(rows) = query.rows {
                settings.row_limit = RowLimit::Limited(rows);
            }
            if let Some(columns) = &query.columns {
                settings.columns = Some(columns.clone());
            }
            if let Some(filters) = &query.filters {
                settings.filters = filters
                    .iter()
                    .map(|(k, v)| (k.clone(), FieldValue::from_json(v)))
                    .collect();
            }
        }

        if let Some(load) = &file.load {
            if load.enabled == Some(false) {
                settings.output_path = None;
            } else if let Some(path) = &load.output_path {
                settings.output_path = Some(path.clone());
            }
        }

        settings
    }

    pub fn query_request(&self) -> QueryRequest {
        QueryRequest {
            limit: self.row_limit,
            filters: self.filters.clone(),
            columns: self.columns.clone(),
        }
    }

    /// Dashboard multi-select seeded from text filters on the categorical columns.
    pub fn selection(&self) -> Selection {
        let pick = |key: &str| match self.filters.get(key) {
            Some(FieldValue::Text(value)) => vec![value.clone()],
            _ => Vec::new(),
        };
        Selection {
            departments: pick("department"),
            designations: pick("designation"),
            genders: pick("gender"),
        }
    }
}

impl Validate for Settings {
    fn validate(&self) -> Result<()> {
        validate_url("source.endpoint", &self.source_url)?;
        validate_positive_number("retry.max_attempts", self.max_attempts, 1)?;
        if self.timeout.is_zero() {
            return Err(EtlError::InvalidConfigValueError {
                field: "source.timeout_seconds".to_string(),
                value: "0".to_string(),
                reason: "Timeout must be at least 1 second".to_string(),
            });
        }
        if let Some(path) = &self.output_path {
            validate_path("load.output_path", path)?;
        }
        Ok(())
    }
}

impl ConfigProvider for Settings {
    fn source_url(&self) -> &str {
        &self.source_url
    }

    fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    fn request_timeout(&self) -> Duration {
        self.timeout
    }

    fn backoff_unit(&self) -> Duration {
        self.backoff_unit
    }

    fn output_path(&self) -> Option<&str> {
        self.output_path.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.max_attempts, 3);
        assert_eq!(settings.timeout, Duration::from_secs(10));
        assert_eq!(settings.row_limit, RowLimit::Limited(5));
        assert_eq!(settings.output_path.as_deref(), Some("employees_normalized.csv"));
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_from_toml_overlays_defaults() {
        let file = TomlConfig::from_toml_str(
            r#"
[retry]
max_attempts = 5

[query]
all = true
rows = 3

[query.filters]
age = 25
gender = "female"

[load]
enabled = false
"#,
        )
        .unwrap();

        let settings = Settings::from_toml(&file);

        assert_eq!(settings.source_url, DEFAULT_SOURCE_URL);
        assert_eq!(settings.max_attempts, 5);
        assert_eq!(settings.row_limit, RowLimit::All);
        assert_eq!(settings.filters["age"], FieldValue::Int(25));
        assert_eq!(settings.filters["gender"], FieldValue::from("female"));
        assert_eq!(settings.output_path, None);
        assert_eq!(settings.selection().genders, vec!["female"]);
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        let bad_url = Settings {
            source_url: "ftp://example.com".to_string(),
            ..Settings::default()
        };
        assert!(bad_url.validate().is_err());

        let zero_attempts = Settings {
            max_attempts: 0,
            ..Settings::default()
        };
        assert!(zero_attempts.validate().is_err());

        let zero_timeout = Settings {
            timeout: Duration::ZERO,
            ..Settings::default()
        };
        assert!(zero_timeout.validate().is_err());

        let empty_output = Settings {
            output_path: Some(String::new()),
            ..Settings::default()
        };
        assert!(empty_output.validate().is_err());
    }
}

use crate::utils::error::{EtlError, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// Optional settings file. Every section and key may be omitted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TomlConfig {
    pub source: Option<SourceConfig>,
    pub retry: Option<RetryConfig>,
    pub query: Option<QueryConfig>,
    pub load: Option<LoadConfig>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SourceConfig {
    pub endpoint: Option<String>,
    pub timeout_seconds: Option<u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RetryConfig {
    pub max_attempts: Option<u32>,
    pub backoff_unit_ms: Option<u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryConfig {
    pub rows: Option<usize>,
    pub all: Option<bool>,
    pub columns: Option<Vec<String>>,
    /// Typed values: `age = 25` filters on the integer, `age = "25"` on text.
    pub filters: Option<HashMap<String, serde_json::Value>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LoadConfig {
    pub output_path: Option<String>,
    pub enabled: Option<bool>,
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(EtlError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| EtlError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${EMPLOYEE_API})；未設定的變數保持原樣
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| EtlError::ConfigError {
            message: format!("invalid substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn endpoint(&self) -> Option<&str> {
        self.source.as_ref()?.endpoint.as_deref()
    }

    pub fn timeout_seconds(&self) -> Option<u64> {
        self.source.as_ref()?.timeout_seconds
    }

    pub fn max_attempts(&self) -> Option<u32> {
        self.retry.as_ref()?.max_attempts
    }

    pub fn backoff_unit_ms(&self) -> Option<u64> {
        self.retry.as_ref()?.backoff_unit_ms
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_full_toml_config() {
        let toml_content = r#"
[source]
endpoint = "https://api.example.com/employees.json"
timeout_seconds = 5

[retry]
max_attempts = 4
backoff_unit_ms = 250

[query]
rows = 20
columns = ["full_name", "salary"]

[query.filters]
department = "Product"
age = 25

[load]
output_path = "./out/employees.csv"
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();

        assert_eq!(config.endpoint(), Some("https://api.example.com/employees.json"));
        assert_eq!(config.timeout_seconds(), Some(5));
        assert_eq!(config.max_attempts(), Some(4));
        assert_eq!(config.backoff_unit_ms(), Some(250));

        let query = config.query.unwrap();
        assert_eq!(query.rows, Some(20));
        let filters = query.filters.unwrap();
        assert_eq!(filters["department"], serde_json::json!("Product"));
        assert_eq!(filters["age"], serde_json::json!(25));
    }

    #[test]
    fn test_empty_file_is_valid() {
        let config = TomlConfig::from_toml_str("").unwrap();
        assert_eq!(config, TomlConfig::default());
        assert_eq!(config.endpoint(), None);
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("EMPLOYEE_ETL_TEST_ENDPOINT", "https://test.api.com/e.json");

        let toml_content = r#"
[source]
endpoint = "${EMPLOYEE_ETL_TEST_ENDPOINT}"
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(config.endpoint(), Some("https://test.api.com/e.json"));

        std::env::remove_var("EMPLOYEE_ETL_TEST_ENDPOINT");
    }

    #[test]
    fn test_unset_env_var_left_in_place() {
        let config = TomlConfig::from_toml_str(
            r#"
[source]
endpoint = "${EMPLOYEE_ETL_SURELY_UNSET_VAR}"
"#,
        )
        .unwrap();
        assert_eq!(config.endpoint(), Some("${EMPLOYEE_ETL_SURELY_UNSET_VAR}"));
    }

    #[test]
    fn test_invalid_toml_is_config_error() {
        let err = TomlConfig::from_toml_str("[retry\nmax_attempts = ").unwrap_err();
        assert!(matches!(err, EtlError::ConfigValidationError { .. }));
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file
            .write_all(b"[retry]\nmax_attempts = 2\n")
            .unwrap();

        let config = TomlConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.max_attempts(), Some(2));
    }
}

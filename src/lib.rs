pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use config::{cli::LocalStorage, settings::Settings, toml_config::TomlConfig};
pub use core::{
    etl::{EtlEngine, EtlOutcome},
    fetcher::{fetch_and_normalize, fetch_with_retry, HttpSource, RetryPolicy, TokioSleeper},
    pipeline::EmployeePipeline,
    query::{query, QueryRequest, QueryResult, RowLimit},
    summary::{distinct_values, DashboardSummary, Selection},
};
pub use domain::model::{Designation, Field, FieldValue, NormalizedRecord, NormalizedTable};
pub use utils::error::{EtlError, Result};

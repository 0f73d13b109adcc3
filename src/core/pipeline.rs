use crate::core::fetcher::{fetch_with_retry, HttpSource, RetryPolicy, TokioSleeper};
use crate::core::normalizer::normalize_table;
use crate::core::{ConfigProvider, Pipeline, RecordSource, Sleeper, Storage};
use crate::domain::model::{Field, NormalizedTable, RawRecord};
use crate::utils::error::{EtlError, Result};

/// Fetches employees from the configured source, normalizes them and writes a CSV copy.
pub struct EmployeePipeline<S: Storage, C: ConfigProvider> {
    pub(crate) storage: S,
    pub(crate) config: C,
    source: Box<dyn RecordSource>,
    sleeper: Box<dyn Sleeper>,
}

impl<S: Storage, C: ConfigProvider> EmployeePipeline<S, C> {
    pub fn new(storage: S, config: C) -> Result<Self> {
        let source = HttpSource::new(config.source_url(), config.request_timeout())?;
        Ok(Self::with_parts(
            storage,
            config,
            Box::new(source),
            Box::new(TokioSleeper),
        ))
    }

    /// Wires in an alternative source or clock, mostly for tests.
    pub fn with_parts(
        storage: S,
        config: C,
        source: Box<dyn RecordSource>,
        sleeper: Box<dyn Sleeper>,
    ) -> Self {
        Self {
            storage,
            config,
            source,
            sleeper,
        }
    }

    fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.config.max_attempts()).with_backoff_unit(self.config.backoff_unit())
    }
}

#[async_trait::async_trait]
impl<S: Storage, C: ConfigProvider> Pipeline for EmployeePipeline<S, C> {
    async fn extract(&self) -> Result<Vec<RawRecord>> {
        tracing::debug!(
            "Fetching employees from {} (max {} attempts)",
            self.source.location(),
            self.config.max_attempts()
        );
        fetch_with_retry(
            self.source.as_ref(),
            &self.retry_policy(),
            self.sleeper.as_ref(),
        )
        .await
    }

    async fn transform(&self, data: Vec<RawRecord>) -> Result<NormalizedTable> {
        normalize_table(data)
    }

    async fn load(&self, table: &NormalizedTable) -> Result<Option<String>> {
        let Some(path) = self.config.output_path() else {
            tracing::debug!("Persistence disabled, skipping CSV output");
            return Ok(None);
        };

        let data = table_to_csv(table)?;
        tracing::debug!("Writing CSV ({} bytes) to storage", data.len());
        self.storage.write_file(path, &data).await?;

        Ok(Some(path.to_string()))
    }
}

/// Header in schema order; null phone numbers become empty cells.
pub fn table_to_csv(table: &NormalizedTable) -> Result<Vec<u8>> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(Vec::new());

    writer.write_record(Field::ALL.iter().map(|field| field.name()))?;
    for record in table {
        writer.serialize(record)?;
    }

    writer
        .into_inner()
        .map_err(|e| EtlError::IoError(e.into_error()))
}

use crate::domain::model::{NormalizedTable, RawRecord};
use crate::utils::error::Result;
use async_trait::async_trait;
use std::time::Duration;

pub trait Storage: Send + Sync {
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    fn source_url(&self) -> &str;
    fn max_attempts(&self) -> u32;
    fn request_timeout(&self) -> Duration;
    fn backoff_unit(&self) -> Duration;
    /// `None` disables persistence of the normalized table.
    fn output_path(&self) -> Option<&str>;
}

/// Where raw employee JSON comes from. One call is one attempt; retrying is the caller's job.
#[async_trait]
pub trait RecordSource: Send + Sync {
    fn location(&self) -> &str;

    /// Returns the response body of a successful (2xx) response. Transport problems
    /// must surface as retriable errors.
    async fn fetch_body(&self, attempt: u32) -> Result<String>;
}

#[async_trait]
pub trait Sleeper: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn extract(&self) -> Result<Vec<RawRecord>>;
    async fn transform(&self, data: Vec<RawRecord>) -> Result<NormalizedTable>;
    /// Returns where the table was written, if it was written at all.
    async fn load(&self, table: &NormalizedTable) -> Result<Option<String>>;
}

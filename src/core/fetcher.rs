//! Bounded-retry fetching of the raw employee collection.
//!
//! Attempt `n` (zero-based) that fails with a transport problem is followed by a wait of
//! `backoff_unit * 2^n`, except after the final attempt. Bodies that arrive but do not
//! look like employee data are rejected straight away.

use crate::core::normalizer::{normalize_table, parse_raw_records};
use crate::domain::model::{NormalizedTable, RawRecord};
use crate::domain::ports::{RecordSource, Sleeper};
use crate::utils::error::{AttemptFailure, EtlError, Result};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);
pub const DEFAULT_BACKOFF_UNIT: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub backoff_unit: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            backoff_unit: DEFAULT_BACKOFF_UNIT,
        }
    }

    pub fn with_backoff_unit(mut self, unit: Duration) -> Self {
        self.backoff_unit = unit;
        self
    }

    /// Wait after failed attempt `attempt`. Saturates rather than overflowing.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let factor = 2u32.checked_pow(attempt).unwrap_or(u32::MAX);
        self.backoff_unit.saturating_mul(factor)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ATTEMPTS)
    }
}

pub struct HttpSource {
    url: String,
    client: Client,
}

impl HttpSource {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            url: url.into(),
            client,
        })
    }
}

#[async_trait]
impl RecordSource for HttpSource {
    fn location(&self) -> &str {
        &self.url
    }

    async fn fetch_body(&self, attempt: u32) -> Result<String> {
        let transient = |cause: String| EtlError::TransientFetchError { attempt, cause };

        tracing::debug!("Making API request to: {}", self.url);
        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| transient(e.to_string()))?;

        let status = response.status();
        tracing::debug!("API response status: {}", status);
        if !status.is_success() {
            return Err(transient(format!("HTTP status {}", status)));
        }

        response.text().await.map_err(|e| transient(e.to_string()))
    }
}

/// Real waiting, on the tokio timer.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

pub async fn fetch_with_retry<R, S>(
    source: &R,
    policy: &RetryPolicy,
    sleeper: &S,
) -> Result<Vec<RawRecord>>
where
    R: RecordSource + ?Sized,
    S: Sleeper + ?Sized,
{
    if policy.max_attempts == 0 {
        return Err(EtlError::InvalidConfigValueError {
            field: "max_attempts".to_string(),
            value: "0".to_string(),
            reason: "at least one attempt is required".to_string(),
        });
    }

    let mut failures = Vec::new();
    for attempt in 0..policy.max_attempts {
        let cause = match source.fetch_body(attempt).await {
            Ok(body) => {
                let records = parse_raw_records(&body)?;
                tracing::info!(
                    "Fetched {} raw records from {} on attempt {}",
                    records.len(),
                    source.location(),
                    attempt + 1
                );
                return Ok(records);
            }
            Err(EtlError::TransientFetchError { cause, .. }) => cause,
            Err(e) if e.is_retriable() => e.to_string(),
            Err(e) => return Err(e),
        };

        tracing::warn!("Attempt {} failed: {}", attempt + 1, cause);
        failures.push(AttemptFailure { attempt, cause });

        if attempt + 1 < policy.max_attempts {
            let delay = policy.delay_for(attempt);
            tracing::debug!("Retrying in {:?}", delay);
            sleeper.sleep(delay).await;
        }
    }

    tracing::error!(
        "Giving up on {} after {} attempts",
        source.location(),
        policy.max_attempts
    );
    Err(EtlError::ExhaustedRetriesError {
        attempts: policy.max_attempts,
        failures,
    })
}

/// Fetch `url` over HTTP with the default timeout and backoff, then normalize.
pub async fn fetch_and_normalize(url: &str, max_attempts: u32) -> Result<NormalizedTable> {
    let source = HttpSource::new(url, DEFAULT_TIMEOUT)?;
    let raw = fetch_with_retry(&source, &RetryPolicy::new(max_attempts), &TokioSleeper).await?;
    normalize_table(raw)
}


#[cfg(test)]
mod tests {
    use super::testing::*;
    use super::*;

    const ONE_EMPLOYEE: &str = r#"[{"first_name": "Jose", "last_name": "Lopez",
        "email": "test@email.com", "phone": "+1-971-533-4552x1542", "gender": "male",
        "age": 25, "job_title": "Project Manager", "years_of_experience": 1,
        "salary": 8500, "department": "Product"}]"#;

    #[test]
    fn test_backoff_doubles_per_attempt() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.delay_for(0), Duration::from_secs(1));
        assert_eq!(policy.delay_for(1), Duration::from_secs(2));
        assert_eq!(policy.delay_for(2), Duration::from_secs(4));
        assert_eq!(policy.delay_for(5), Duration::from_secs(32));
        // no cap, but no overflow panic either
        assert!(policy.delay_for(64) >= policy.delay_for(31));
    }

    #[tokio::test]
    async fn test_succeeds_on_third_attempt_after_backoff() {
        let source = ScriptedSource::new(vec![
            transient(0, "connection refused"),
            transient(1, "HTTP status 503 Service Unavailable"),
            Ok(ONE_EMPLOYEE.to_string()),
        ]);
        let sleeper = RecordingSleeper::default();

        let records = fetch_with_retry(&source, &RetryPolicy::new(3), &sleeper)
            .await
            .unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(source.calls(), vec![0, 1, 2]);
        assert_eq!(
            sleeper.slept(),
            vec![Duration::from_secs(1), Duration::from_secs(2)]
        );
    }

    #[derive(Clone, Default)]
    struct CapturedLogs(std::sync::Arc<std::sync::Mutex<Vec<u8>>>);

    impl CapturedLogs {
        fn lines(&self) -> Vec<String> {
            let bytes = self.0.lock().unwrap();
            String::from_utf8_lossy(&bytes)
                .lines()
                .map(str::to_string)
                .collect()
        }
    }

    impl std::io::Write for CapturedLogs {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl<'a> tracing_subscriber::fmt::MakeWriter<'a> for CapturedLogs {
        type Writer = CapturedLogs;

        fn make_writer(&'a self) -> Self::Writer {
            self.clone()
        }
    }

    #[tokio::test]
    async fn test_each_failed_attempt_is_logged() {
        let logs = CapturedLogs::default();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(logs.clone())
            .with_ansi(false)
            .with_max_level(tracing::Level::DEBUG)
            .finish();
        let _guard = tracing::subscriber::set_default(subscriber);

        let source = ScriptedSource::new(vec![
            transient(0, "timeout"),
            transient(1, "timeout"),
            transient(2, "timeout"),
        ]);
        let result =
            fetch_with_retry(&source, &RetryPolicy::new(3), &RecordingSleeper::default()).await;
        assert!(result.is_err());

        let lines = logs.lines();
        let warnings: Vec<&String> = lines.iter().filter(|l| l.contains("WARN")).collect();
        assert_eq!(warnings.len(), 3);
        for (i, line) in warnings.iter().enumerate() {
            assert!(
                line.contains(&format!("Attempt {} failed: timeout", i + 1)),
                "line = {}",
                line
            );
        }
        let errors: Vec<&String> = lines.iter().filter(|l| l.contains("ERROR")).collect();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("after 3 attempts"));
    }

    #[tokio::test]
    async fn test_exhausted_retries_reports_every_attempt() {
        let source = ScriptedSource::new(vec![
            transient(0, "timeout"),
            transient(1, "timeout"),
            transient(2, "HTTP status 500 Internal Server Error"),
        ]);
        let sleeper = RecordingSleeper::default();

        let err = fetch_with_retry(&source, &RetryPolicy::new(3), &sleeper)
            .await
            .unwrap_err();

        match err {
            EtlError::ExhaustedRetriesError { attempts, failures } => {
                assert_eq!(attempts, 3);
                let indices: Vec<u32> = failures.iter().map(|f| f.attempt).collect();
                assert_eq!(indices, vec![0, 1, 2]);
                assert_eq!(failures[2].cause, "HTTP status 500 Internal Server Error");
            }
            other => panic!("expected exhausted retries, got {:?}", other),
        }
        // no wait after the last attempt
        assert_eq!(
            sleeper.slept(),
            vec![Duration::from_secs(1), Duration::from_secs(2)]
        );
    }

    #[tokio::test]
    async fn test_schema_error_is_not_retried() {
        let source = ScriptedSource::new(vec![Ok(r#"{"message": "not a list"}"#.to_string())]);
        let sleeper = RecordingSleeper::default();

        let err = fetch_with_retry(&source, &RetryPolicy::new(3), &sleeper)
            .await
            .unwrap_err();

        assert!(matches!(err, EtlError::SchemaError { .. }));
        assert_eq!(source.calls(), vec![0]);
        assert!(sleeper.slept().is_empty());
    }

    #[tokio::test]
    async fn test_single_attempt_never_sleeps() {
        let source = ScriptedSource::new(vec![transient(0, "dns failure")]);
        let sleeper = RecordingSleeper::default();

        let err = fetch_with_retry(&source, &RetryPolicy::new(1), &sleeper)
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            EtlError::ExhaustedRetriesError { attempts: 1, .. }
        ));
        assert!(sleeper.slept().is_empty());
    }

    #[tokio::test]
    async fn test_zero_attempts_is_rejected_without_fetching() {
        let source = ScriptedSource::new(vec![]);
        let sleeper = RecordingSleeper::default();

        let err = fetch_with_retry(&source, &RetryPolicy::new(0), &sleeper)
            .await
            .unwrap_err();

        assert!(matches!(err, EtlError::InvalidConfigValueError { .. }));
        assert!(source.calls().is_empty());
    }

    #[tokio::test]
    async fn test_custom_backoff_unit() {
        let source = ScriptedSource::new(vec![
            transient(0, "reset"),
            transient(1, "reset"),
            Ok("[]".to_string()),
        ]);
        let sleeper = RecordingSleeper::default();
        let policy = RetryPolicy::new(3).with_backoff_unit(Duration::from_millis(10));

        let records = fetch_with_retry(&source, &policy, &sleeper).await.unwrap();

        assert!(records.is_empty());
        assert_eq!(
            sleeper.slept(),
            vec![Duration::from_millis(10), Duration::from_millis(20)]
        );
    }
}

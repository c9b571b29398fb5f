use crate::config::RetryConfig;
use crate::error::AtomlinkError;
use backon::{ExponentialBuilder, Retryable};
use std::future::Future;
use std::time::Duration;
use tracing::warn;

/// Exponential backoff for transient upstream failures.
///
/// With the defaults a call is attempted at most three times, waiting 2 s and
/// then 4 s between attempts. Only errors for which
/// [`AtomlinkError::is_transient`] holds are retried; anything else is
/// returned straight away.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    backoff: ExponentialBuilder,
    include_server_errors: bool,
}

impl RetryPolicy {
    pub fn new(cfg: &RetryConfig) -> Self {
        let backoff = ExponentialBuilder::default()
            .with_min_delay(cfg.base_delay())
            .with_factor(2.0)
            .with_max_times(cfg.max_attempts.saturating_sub(1));

        Self {
            backoff,
            include_server_errors: cfg.server_errors_transient,
        }
    }

    /// Runs `op` until it succeeds, fails permanently or the attempts run out.
    ///
    /// The last error is returned unchanged.
    pub async fn run<T, F, Fut>(&self, op: F) -> Result<T, AtomlinkError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, AtomlinkError>>,
    {
        let strict = self.include_server_errors;
        op.retry(self.backoff)
            .when(move |err: &AtomlinkError| err.is_transient(strict))
            .notify(|err: &AtomlinkError, dur: Duration| {
                warn!(
                    status = ?err.upstream_status(),
                    delay_ms = dur.as_millis() as u64,
                    "Transient upstream error, retrying: {err}"
                );
            })
            .await
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(&RetryConfig::default())
    }
}

use std::fmt::Display;
use std::time::Duration;

use backoff::ExponentialBackoffBuilder;

/// How failed provider calls are retried.
///
/// Only transient failures (unreachable provider, timeouts) are retried;
/// rate limits are reported right away.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Attempts after the first one. `0` disables retrying.
    pub max_retries: u32,
    /// Delay before the first retry, grown exponentially afterwards.
    pub initial_interval: Duration,
}

impl Default for RetryPolicy {
    #[inline]
    fn default() -> Self {
        Self {
            max_retries: 2,
            initial_interval: Duration::from_millis(500),
        }
    }
}

pub(crate) trait Transient: Display {
    fn is_transient(&self) -> bool;

    fn timed_out() -> Self;
}

/// Runs `op` with a per-attempt timeout, retrying transient failures.
pub(crate) async fn call_with_retry<T, E, F, Fut>(
    policy: RetryPolicy,
    timeout: Duration,
    what: &'static str,
    op: F,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Transient,
{
    let backoff = ExponentialBackoffBuilder::new()
        .with_initial_interval(policy.initial_interval)
        .with_max_elapsed_time(None)
        .build();

    let mut op = op;
    let mut attempt = 0u32;
    backoff::future::retry(backoff, move || {
        attempt += 1;
        let this_attempt = attempt;
        let fut = op();
        async move {
            let result = tokio::time::timeout(timeout, fut)
                .await
                .unwrap_or_else(|_| Err(E::timed_out()));
            match result {
                Ok(value) => Ok(value),
                Err(err)
                    if err.is_transient() && this_attempt <= policy.max_retries =>
                {
                    warn!("{what} failed on attempt {this_attempt}: {err}");
                    Err(backoff::Error::transient(err))
                }
                Err(err) => Err(backoff::Error::permanent(err)),
            }
        }
    })
    .await
}

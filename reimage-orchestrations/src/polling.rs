//! Bounded polling
//!
//! A probe runs on its own task and reports through a oneshot channel, which
//! is raced against the timeout. The channel guarantees a single result; when
//! the timeout wins the receiver is dropped and the probe task exits at its
//! next check, including while it sleeps between polls.

use std::future::Future;
use std::time::Duration;

use tokio::sync::oneshot;

use crate::error::IaasError;

/// Poll interval never exceeds `timeout / POLL_SAFETY_FACTOR`
pub const POLL_SAFETY_FACTOR: u32 = 10;

/// Floor for the inter-poll delay
pub const MIN_POLL_INTERVAL: Duration = Duration::from_millis(10);

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(300);
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitConfig {
    pub timeout: Duration,
    pub poll_interval: Duration,
}

impl Default for WaitConfig {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }
}

impl WaitConfig {
    pub fn new(timeout: Duration, poll_interval: Duration) -> Self {
        Self { timeout, poll_interval }
    }

    /// Delay between polls, bounded by the timeout so slow intervals still get several polls
    pub fn effective_poll_interval(&self) -> Duration {
        let ceiling = self.timeout / POLL_SAFETY_FACTOR;
        self.poll_interval.min(ceiling).max(MIN_POLL_INTERVAL)
    }
}

/// Outcome of a single poll
#[derive(Debug, Clone, PartialEq)]
pub enum Probe<T> {
    Done(T),
    /// Not there yet; carries what was observed for logging
    Pending(String),
}

/// Run `probe` until it returns `Done` or an error, or until `config.timeout` elapses.
///
/// Errors from the probe end the wait immediately and are never reported as a timeout.
pub async fn poll_until<T, F, Fut>(
    what: impl Into<String>,
    config: WaitConfig,
    mut probe: F,
) -> Result<T, IaasError>
where
    T: Send + 'static,
    F: FnMut() -> Fut + Send + 'static,
    Fut: Future<Output = Result<Probe<T>, IaasError>> + Send + 'static,
{
    let what = what.into();
    let interval = config.effective_poll_interval();
    let (mut tx, rx) = oneshot::channel();

    let label = what.clone();
    tokio::spawn(async move {
        let mut attempt: u32 = 0;
        loop {
            attempt += 1;
            match probe().await {
                Ok(Probe::Done(value)) => {
                    tracing::debug!("{}: done after {} poll(s)", label, attempt);
                    let _ = tx.send(Ok(value));
                    return;
                }
                Ok(Probe::Pending(observed)) => {
                    tracing::debug!("{}: observed {} (poll {})", label, observed, attempt);
                }
                Err(e) => {
                    let _ = tx.send(Err(e));
                    return;
                }
            }

            tokio::select! {
                _ = tokio::time::sleep(interval) => {}
                _ = tx.closed() => {
                    tracing::debug!("{}: waiter gone, abandoning poll loop", label);
                    return;
                }
            }
        }
    });

    match tokio::time::timeout(config.timeout, rx).await {
        Ok(Ok(result)) => result,
        Ok(Err(_)) => Err(IaasError::transport(
            format!("polling {}", what),
            "poll task ended without reporting a result",
        )),
        Err(_) => Err(IaasError::TimedOut {
            what,
            timeout: config.timeout,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    fn fast() -> WaitConfig {
        WaitConfig::new(Duration::from_millis(500), Duration::from_millis(5))
    }

    #[test]
    fn test_poll_interval_is_bounded_by_timeout() {
        let config = WaitConfig::new(Duration::from_secs(10), Duration::from_secs(5));
        assert_eq!(config.effective_poll_interval(), Duration::from_secs(1));

        let config = WaitConfig::new(Duration::from_secs(300), Duration::from_secs(5));
        assert_eq!(config.effective_poll_interval(), Duration::from_secs(5));

        let config = WaitConfig::new(Duration::from_millis(20), Duration::from_millis(1));
        assert_eq!(config.effective_poll_interval(), MIN_POLL_INTERVAL);
    }

    #[tokio::test]
    async fn test_returns_as_soon_as_probe_is_done() {
        let polls = Arc::new(AtomicU32::new(0));
        let counter = polls.clone();
        let result = poll_until("counter", fast(), move || {
            let counter = counter.clone();
            async move {
                let n = counter.fetch_add(1, Ordering::SeqCst) + 1;
                if n == 3 {
                    Ok(Probe::Done(n))
                } else {
                    Ok(Probe::Pending(format!("poll {}", n)))
                }
            }
        })
        .await
        .unwrap();

        assert_eq!(result, 3);
        assert_eq!(polls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_times_out_when_never_done() {
        let config = WaitConfig::new(Duration::from_millis(50), Duration::from_millis(5));
        let err = poll_until("nothing", config, || async { Ok(Probe::<()>::Pending("still".into())) })
            .await
            .unwrap_err();
        assert!(err.is_timeout());
    }

    #[tokio::test]
    async fn test_probe_error_is_not_a_timeout() {
        let err = poll_until("broken", fast(), || async {
            Err::<Probe<()>, _>(IaasError::transport("list instances", "connection reset"))
        })
        .await
        .unwrap_err();
        assert!(matches!(err, IaasError::Transport { .. }));
    }

    #[tokio::test]
    async fn test_abandoned_probe_stops_polling() {
        let polls = Arc::new(AtomicU32::new(0));
        let counter = polls.clone();
        let config = WaitConfig::new(Duration::from_millis(40), Duration::from_millis(2));
        let err = poll_until("forever", config, move || {
            let counter = counter.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(Probe::<()>::Pending("waiting".into()))
            }
        })
        .await
        .unwrap_err();
        assert!(err.is_timeout());

        tokio::time::sleep(Duration::from_millis(30)).await;
        let after_timeout = polls.load(Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(polls.load(Ordering::SeqCst), after_timeout);
    }
}

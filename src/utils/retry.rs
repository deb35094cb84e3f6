use std::future::Future;
use std::time::Duration;
use super::errors::Result;

/// Run `op` up to `attempts` times, sleeping `backoff` between failures.
/// Returns the last error if every attempt fails.
pub async fn retry_with_backoff<T, F, Fut>(
    label: &str,
    attempts: u32,
    backoff: Duration,
    mut op: F,
) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let attempts = attempts.max(1);
    let mut attempt = 1;
    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(e) if attempt < attempts => {
                tracing::warn!("{} failed (attempt {}/{}): {}", label, attempt, attempts, e);
                tokio::time::sleep(backoff).await;
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::DappError;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[tokio::test(start_paused = true)]
    async fn test_succeeds_after_transient_failures() {
        let counter = AtomicU32::new(0);
        let calls = &counter;
        let result = retry_with_backoff("read", 3, Duration::from_millis(500), move || async move {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            if n < 2 {
                Err(DappError::ContractError("header not found".into()))
            } else {
                Ok(n)
            }
        })
        .await;

        assert_eq!(result.unwrap(), 2);
        assert_eq!(counter.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_gives_up_after_limit() {
        let counter = AtomicU32::new(0);
        let calls = &counter;
        let result: Result<()> = retry_with_backoff("read", 2, Duration::from_millis(10), move || async move {
            calls.fetch_add(1, Ordering::SeqCst);
            Err(DappError::NoQuote)
        })
        .await;

        assert!(matches!(result, Err(DappError::NoQuote)));
        assert_eq!(counter.load(Ordering::SeqCst), 2);
    }
}

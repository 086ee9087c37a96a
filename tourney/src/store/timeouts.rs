//! Timeout wrapper for store operations.

use std::future::Future;
use std::time::Duration;
use tokio::time::timeout;

use super::{StoreError, StoreResult};

/// Default timeout for a store call (5 seconds)
pub const DEFAULT_STORE_TIMEOUT: Duration = Duration::from_secs(5);

/// Run a store call, failing with [`StoreError::Timeout`] if it takes longer
/// than `duration`.
///
/// # Example
///
/// ```no_run
/// use tourney::store::timeouts::{with_timeout, DEFAULT_STORE_TIMEOUT};
/// # async fn example(client: reqwest::Client) -> Result<(), tourney::store::StoreError> {
///
/// let response = with_timeout(
///     DEFAULT_STORE_TIMEOUT,
///     client.get("https://example.supabase.co/rest/v1/tournaments").send(),
/// )
/// .await?;
/// # let _ = response;
/// # Ok(())
/// # }
/// ```
pub async fn with_timeout<F, T, E>(duration: Duration, future: F) -> StoreResult<T>
where
    F: Future<Output = Result<T, E>>,
    E: Into<StoreError>,
{
    match timeout(duration, future).await {
        Ok(Ok(result)) => Ok(result),
        Ok(Err(e)) => Err(e.into()),
        Err(_) => Err(StoreError::Timeout(duration)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_completes_within_timeout() {
        let result = with_timeout(Duration::from_secs(1), async { Ok::<_, StoreError>(7) }).await;
        assert_eq!(result.unwrap(), 7);
    }

    #[tokio::test]
    async fn test_times_out() {
        let result = with_timeout(Duration::from_millis(10), async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok::<_, StoreError>(())
        })
        .await;

        let err = result.unwrap_err();
        assert!(matches!(err, StoreError::Timeout(d) if d == Duration::from_millis(10)));
        assert!(err.to_string().contains("timed out"));
    }

    #[tokio::test]
    async fn test_inner_error_is_converted() {
        let result = with_timeout(DEFAULT_STORE_TIMEOUT, async {
            Err::<(), _>(sqlx::Error::RowNotFound)
        })
        .await;
        assert!(matches!(result, Err(StoreError::Database(_))));
    }
}

//! Per-request deadlines.

use std::future::Future;
use std::time::Duration;

use articles_core::DomainError;

use crate::error::AppError;

/// Run a service call under the request deadline.
///
/// Dropping the future on expiry cancels every downstream await.
pub async fn with_deadline<T, F>(deadline: Duration, call: F) -> Result<T, AppError>
where
    F: Future<Output = Result<T, DomainError>>,
{
    match tokio::time::timeout(deadline, call).await {
        Ok(result) => result.map_err(AppError::from),
        Err(_) => {
            tracing::warn!(deadline_ms = deadline.as_millis() as u64, "Request deadline exceeded");
            Err(AppError::Timeout)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn passes_results_through() {
        let value = with_deadline(Duration::from_secs(1), async { Ok::<_, DomainError>(7) })
            .await
            .unwrap();
        assert_eq!(value, 7);

        let err = with_deadline(Duration::from_secs(1), async {
            Err::<(), _>(DomainError::Validation("empty".into()))
        })
        .await
        .unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[tokio::test]
    async fn slow_calls_time_out() {
        let err = with_deadline(Duration::from_millis(10), async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok::<_, DomainError>(())
        })
        .await
        .unwrap_err();
        assert!(matches!(err, AppError::Timeout));
    }
}

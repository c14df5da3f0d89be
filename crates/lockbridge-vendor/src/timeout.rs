//! Deadline enforcement for vendor calls.

use crate::{Result, VendorError};
use std::time::Duration;

/// Run a vendor call, failing with [`VendorError::Timeout`] if it takes
/// longer than `limit`.
///
/// The call is dropped on timeout; the vendor may still complete it.
///
/// # Examples
///
/// ```
/// use lockbridge_vendor::timeout::with_timeout;
/// use std::time::Duration;
///
/// #[tokio::main]
/// async fn main() {
///     let value = with_timeout(Duration::from_secs(1), async { Ok(7) }).await;
///     assert_eq!(value, Ok(7));
/// }
/// ```
pub async fn with_timeout<T>(
    limit: Duration,
    call: impl Future<Output = Result<T>>,
) -> Result<T> {
    match tokio::time::timeout(limit, call).await {
        Ok(result) => result,
        Err(_) => Err(VendorError::timeout(limit_millis(limit))),
    }
}

/// Milliseconds in `limit`, saturating at `u64::MAX`.
fn limit_millis(limit: Duration) -> u64 {
    u64::try_from(limit.as_millis()).unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_slow_call_times_out() {
        let result: Result<()> = with_timeout(Duration::from_secs(30), async {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok(())
        })
        .await;

        assert_eq!(result, Err(VendorError::timeout(30_000)));
    }

    #[test]
    fn test_limit_millis_saturates() {
        assert_eq!(limit_millis(Duration::from_secs(30)), 30_000);
        assert_eq!(limit_millis(Duration::MAX), u64::MAX);
    }

    #[tokio::test]
    async fn test_errors_pass_through() {
        let result: Result<()> = with_timeout(Duration::from_secs(1), async {
            Err(VendorError::auth("expired"))
        })
        .await;

        assert!(result.unwrap_err().is_auth());
    }
}

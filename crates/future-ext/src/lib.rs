//! A utility crate for working with futures.
#![cfg_attr(all(coverage_nightly, test), feature(coverage_attribute))]
#![deny(unsafe_code)]
#![deny(unreachable_pub)]

use std::future::Future;
use std::time::Duration;

use tokio::time::error::Elapsed;

/// Extension trait adding a timeout combinator to any [`Future`].
pub trait FutureExt: Future + Sized {
    /// Wraps this future in a [`tokio::time::timeout`] with the given duration.
    fn with_timeout(self, duration: Duration) -> tokio::time::Timeout<Self> {
        tokio::time::timeout(duration, self)
    }
}

impl<F: Future> FutureExt for F {}

#[cfg(test)]
#[cfg_attr(all(test, coverage_nightly), coverage(off))]
mod tests {
    use std::time::Duration;

    use super::FutureExt;

    #[tokio::test]
    async fn completes_before_timeout() {
        let result = std::future::ready(42).with_timeout(Duration::from_millis(50)).await;
        assert_eq!(result.unwrap(), 42);
    }

    #[tokio::test]
    async fn times_out() {
        let result = tokio::time::sleep(Duration::from_secs(10))
            .with_timeout(Duration::from_millis(5))
            .await;
        assert!(result.is_err());
    }
}

/// Re-exported so callers matching against a timeout failure don't need a direct `tokio` dependency.
pub type TimeoutError = Elapsed;

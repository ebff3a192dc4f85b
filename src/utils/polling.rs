use async_trait::async_trait;
use std::time::Duration;

#[cfg(test)]
use mockall::automock;

/// Source of the delay between confirmation polls.
///
/// Injected into the submission client so tests can run the polling loop
/// without waiting in real time.
#[async_trait]
#[cfg_attr(test, automock)]
pub trait PollClock: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

/// Clock that sleeps on the tokio timer.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioClock;

#[async_trait]
impl PollClock for TokioClock {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Clock that never waits. Used with the in-memory ledger, where every status
/// query already advances the chain by one block.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopClock;

#[async_trait]
impl PollClock for NoopClock {
    async fn sleep(&self, _duration: Duration) {
        tokio::task::yield_now().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_tokio_clock_sleeps() {
        let start = std::time::Instant::now();
        TokioClock.sleep(Duration::from_millis(20)).await;
        assert!(start.elapsed() >= Duration::from_millis(20));
    }

    #[tokio::test]
    async fn test_noop_clock_returns_immediately() {
        let start = std::time::Instant::now();
        NoopClock.sleep(Duration::from_secs(60)).await;
        assert!(start.elapsed() < Duration::from_secs(1));
    }
}

use std::future::Future;
use std::time::Duration;

use anyhow::Result;

/// Convergence timing injected into the orchestrator
#[derive(Debug, Clone, Copy)]
pub struct Pacing {
    /// Wait between ordered steps so keepalived on each side picks up the change
    pub settle: Duration,
    pub ping_interval: Duration,
    pub ping_attempts: u32,
    /// Delay before the second reload in virtual-MAC mode
    pub vmac_reload_delay: Duration,
}

impl Pacing {
    /// No waiting at all, with a single ping attempt
    pub fn immediate() -> Self {
        Self {
            settle: Duration::ZERO,
            ping_interval: Duration::ZERO,
            ping_attempts: 1,
            vmac_reload_delay: Duration::ZERO,
        }
    }

    pub async fn settle(&self) {
        sleep(self.settle).await;
    }
}

async fn sleep(duration: Duration) {
    if !duration.is_zero() {
        tokio::time::sleep(duration).await;
    }
}

/// Run `check` up to `attempts` times, sleeping `interval` before each attempt.
/// Returns the first success or the last error.
pub async fn poll_until<F, Fut>(attempts: u32, interval: Duration, mut check: F) -> Result<()>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<()>>,
{
    let mut last = None;
    for attempt in 1..=attempts.max(1) {
        sleep(interval).await;
        match check().await {
            Ok(()) => return Ok(()),
            Err(e) => {
                tracing::debug!(attempt, error = %e, "Convergence check failed");
                last = Some(e);
            }
        }
    }
    Err(last.unwrap_or_else(|| anyhow::anyhow!("convergence check never ran")))
}

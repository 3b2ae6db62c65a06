use rand::Rng;
use serde::Deserialize;
use std::time::Duration;
use tokio::time::sleep;

/// Politeness delays between page transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Pacing {
    /// Fixed wait after a navigation or click so the page can render.
    pub settle_ms: u64,
    pub jitter_min_ms: u64,
    pub jitter_max_ms: u64,
}

impl Default for Pacing {
    fn default() -> Self {
        Self {
            settle_ms: 1_000,
            jitter_min_ms: 1_000,
            jitter_max_ms: 2_000,
        }
    }
}

impl Pacing {
    #[cfg(test)]
    pub const fn none() -> Self {
        Self {
            settle_ms: 0,
            jitter_min_ms: 0,
            jitter_max_ms: 0,
        }
    }

    pub async fn settle(&self) {
        if self.settle_ms > 0 {
            sleep(Duration::from_millis(self.settle_ms)).await;
        }
    }

    pub async fn jitter(&self) {
        let delay = self.jitter_delay();
        if !delay.is_zero() {
            sleep(delay).await;
        }
    }

    fn jitter_delay(&self) -> Duration {
        let (lo, hi) = if self.jitter_min_ms <= self.jitter_max_ms {
            (self.jitter_min_ms, self.jitter_max_ms)
        } else {
            (self.jitter_max_ms, self.jitter_min_ms)
        };
        Duration::from_millis(rand::thread_rng().gen_range(lo..=hi))
    }
}

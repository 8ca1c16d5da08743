use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::utils::format::format_uptime;

/// Process-wide request counters, shared by every request task.
#[derive(Debug, Clone)]
pub(crate) struct StatsManager {
    inner: Arc<StatsManagerInner>,
}

#[derive(Debug)]
struct StatsManagerInner {
    started_at: Instant,
    total_requests: AtomicU64,
    successes: AtomicU64,
    failures: AtomicU64,
}

impl StatsManager {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(StatsManagerInner {
                started_at: Instant::now(),
                total_requests: AtomicU64::new(0),
                successes: AtomicU64::new(0),
                failures: AtomicU64::new(0),
            }),
        }
    }

    pub fn record_request(&self) {
        self.inner.total_requests.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_success(&self) {
        self.inner.successes.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_failure(&self) {
        self.inner.failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            uptime: self.inner.started_at.elapsed(),
            total_requests: self.inner.total_requests.load(Ordering::Relaxed),
            successes: self.inner.successes.load(Ordering::Relaxed),
            failures: self.inner.failures.load(Ordering::Relaxed),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct StatsSnapshot {
    pub uptime: Duration,
    pub total_requests: u64,
    pub successes: u64,
    pub failures: u64,
}

impl StatsSnapshot {
    /// Share of requests that produced an animation, in percent.
    pub fn success_rate(&self) -> f64 {
        if self.total_requests == 0 {
            return 0.0;
        }
        self.successes as f64 / self.total_requests as f64 * 100.0
    }

    pub fn report(&self) -> String {
        format!(
            "Stats:\nUptime: {}\nRequests: {}\nSuccessful GIFs: {}\nFailures: {}\nSuccess rate: {:.1}%",
            format_uptime(self.uptime),
            self.total_requests,
            self.successes,
            self.failures,
            self.success_rate()
        )
    }

    /// A single-line form of [`StatsSnapshot::report`] for logs.
    pub fn summary(&self) -> String {
        format!(
            "uptime {}, {} requests, {} GIFs, {} failures, success rate {:.1}%",
            format_uptime(self.uptime),
            self.total_requests,
            self.successes,
            self.failures,
            self.success_rate()
        )
    }
}

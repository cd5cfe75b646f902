use crate::extract::SkipReason;
use std::time::{Duration, Instant};

/// Counters collected over one extraction run, one per skip reason.
#[derive(Debug, Default, Clone)]
pub struct PipelineStats {
    pub pages_seen: u64,
    pub accepted: u64,
    pub skipped_namespace: u64,
    pub skipped_incomplete: u64,
    pub skipped_redirect: u64,
    pub skipped_short: u64,
    pub skipped_markup: u64,
    pub skipped_prose: u64,
    pub interrupted: bool,
}

impl PipelineStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn inc_pages(&mut self) {
        self.pages_seen += 1;
    }

    pub fn inc_accepted(&mut self) {
        self.accepted += 1;
    }

    pub fn record_skip(&mut self, reason: SkipReason) {
        match reason {
            SkipReason::Namespace => self.skipped_namespace += 1,
            SkipReason::Incomplete => self.skipped_incomplete += 1,
            SkipReason::Redirect => self.skipped_redirect += 1,
            SkipReason::Short => self.skipped_short += 1,
            SkipReason::Markup => self.skipped_markup += 1,
            SkipReason::Prose => self.skipped_prose += 1,
        }
    }

    pub fn skipped(&self) -> u64 {
        self.skipped_namespace
            + self.skipped_incomplete
            + self.skipped_redirect
            + self.skipped_short
            + self.skipped_markup
            + self.skipped_prose
    }
}

/// Throughput over the run, sampled at progress intervals.
pub struct RateTracker {
    started: Instant,
    last_mark: Instant,
    last_count: u64,
}

impl RateTracker {
    pub fn new() -> Self {
        let now = Instant::now();
        Self {
            started: now,
            last_mark: now,
            last_count: 0,
        }
    }

    /// Returns (instant, average) articles per second at `count` accepted,
    /// and advances the sampling window.
    pub fn sample(&mut self, count: u64) -> (f64, f64) {
        let now = Instant::now();
        let instant = rate(count.saturating_sub(self.last_count), now - self.last_mark);
        let average = rate(count, now - self.started);
        self.last_mark = now;
        self.last_count = count;
        (instant, average)
    }
}

impl Default for RateTracker {
    fn default() -> Self {
        Self::new()
    }
}

fn rate(count: u64, elapsed: Duration) -> f64 {
    let secs = elapsed.as_secs_f64();
    if secs > 0.0 {
        count as f64 / secs
    } else {
        0.0
    }
}

//! Stage timings for the fixture start-up pipeline

use std::time::{Duration, Instant};

/// Time spent in each named stage of a multi-step start-up
///
/// Each [`mark`](Self::mark) closes the stage that began at the previous mark
/// (or at [`start`](Self::start)).
///
/// ```ignore
/// let mut timings = StageTimings::start();
/// runtime.start().await?;
/// timings.mark("runtime");
/// gate.await_ready(names, timeout).await?;
/// timings.mark("readiness");
/// info!(total_ms = timings.total_ms(), "Started");
/// ```
#[derive(Debug, Clone)]
pub struct StageTimings {
    started: Instant,
    last_mark: Instant,
    stages: Vec<(&'static str, Duration)>,
}

impl StageTimings {
    /// Begin timing the first stage
    pub fn start() -> Self {
        let now = Instant::now();
        Self {
            started: now,
            last_mark: now,
            stages: Vec::new(),
        }
    }

    /// Close the current stage under `stage` and return its duration
    pub fn mark(&mut self, stage: &'static str) -> Duration {
        let now = Instant::now();
        let spent = now.duration_since(self.last_mark);
        self.last_mark = now;
        self.stages.push((stage, spent));
        spent
    }

    /// Duration of a closed stage
    pub fn stage(&self, stage: &str) -> Option<Duration> {
        self.stages
            .iter()
            .find(|(name, _)| *name == stage)
            .map(|(_, spent)| *spent)
    }

    /// Closed stages in the order they were marked
    pub fn stages(&self) -> &[(&'static str, Duration)] {
        &self.stages
    }

    /// Time since [`start`](Self::start)
    pub fn total(&self) -> Duration {
        self.started.elapsed()
    }

    /// [`total`](Self::total) in whole milliseconds, saturating
    pub fn total_ms(&self) -> u64 {
        u64::try_from(self.total().as_millis()).unwrap_or(u64::MAX)
    }
}

use std::{future::Future, sync::Arc, time::Duration};
use tokio::{
    sync::Mutex,
    task::JoinSet,
    time::{Instant, MissedTickBehavior, interval_at},
};
use tracing::{info, warn};

use crate::{
    config::{MAX_INTERVAL_SECS, ScheduleConfig},
    pipeline::Pipeline,
};

/// A firing later than this past its slot is reported as past due.
const PAST_DUE_GRACE: Duration = Duration::from_millis(500);

/// What happened between startup and shutdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SchedulerStats {
    pub started: usize,
    /// Firings dropped because the previous run was still active.
    pub skipped: usize,
    /// Started runs whose firing came late.
    pub past_due: usize,
}

/// Fires [`Pipeline::fire`] on a fixed interval until shutdown.
#[derive(Debug, Clone)]
pub struct Scheduler {
    period: Duration,
    run_on_startup: bool,
    allow_overlap: bool,
}

impl From<&ScheduleConfig> for Scheduler {
    fn from(config: &ScheduleConfig) -> Self {
        Self::new(config.interval())
            .run_on_startup(config.run_on_startup)
            .allow_overlap(config.allow_overlap)
    }
}

impl Scheduler {
    /// `period` is clamped to 1 s ..= one day; tokio's deadline arithmetic
    /// panics on a zero or overflowing period.
    pub fn new(period: Duration) -> Self {
        let period = period.clamp(Duration::from_secs(1), Duration::from_secs(MAX_INTERVAL_SECS));
        Self { period, run_on_startup: true, allow_overlap: false }
    }

    pub fn run_on_startup(mut self, yes: bool) -> Self {
        self.run_on_startup = yes;
        self
    }

    pub fn allow_overlap(mut self, yes: bool) -> Self {
        self.allow_overlap = yes;
        self
    }

    /// In-flight runs are awaited before returning.
    ///
    /// Without `allow_overlap`, a firing that finds the previous run still
    /// active is skipped.
    pub async fn run_until<F>(&self, pipeline: Arc<Pipeline>, shutdown: F) -> SchedulerStats
    where
        F: Future<Output = ()>,
    {
        let start =
            if self.run_on_startup { Instant::now() } else { Instant::now() + self.period };
        let mut ticker = interval_at(start, self.period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        let guard = Arc::new(Mutex::new(()));
        let mut runs = JoinSet::new();
        let mut stats = SchedulerStats::default();

        info!(period_secs = self.period.as_secs(), allow_overlap = self.allow_overlap, "scheduler started");

        tokio::pin!(shutdown);
        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    info!("scheduler shutting down");
                    break;
                }
                scheduled = ticker.tick() => {
                    while runs.try_join_next().is_some() {}

                    let past_due = Instant::now().saturating_duration_since(scheduled) > PAST_DUE_GRACE;

                    let permit = if self.allow_overlap {
                        None
                    } else {
                        match guard.clone().try_lock_owned() {
                            Ok(permit) => Some(permit),
                            Err(_) => {
                                warn!("previous weather run still in progress, skipping this firing");
                                stats.skipped += 1;
                                continue;
                            }
                        }
                    };

                    let pipeline = pipeline.clone();
                    runs.spawn(async move {
                        let _permit = permit;
                        pipeline.fire(past_due).await;
                    });
                    stats.started += 1;
                    if past_due {
                        stats.past_due += 1;
                    }
                }
            }
        }

        while runs.join_next().await.is_some() {}
        stats
    }
}

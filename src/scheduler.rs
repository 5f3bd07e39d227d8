//! Background refresh tasks.
//!
//! Six independent loops, one per [`Job`], each on its own interval. The
//! first tick fires immediately. A job awaits its own work before waiting
//! for the next tick, so it never overlaps itself; ticks missed while work
//! is outstanding are skipped. Errors are logged and the loop carries on.

use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::aggregator::Aggregator;
use crate::config::ScheduleConfig;
use crate::sources::SourceName;

/// What one background task refreshes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Job {
    Position,
    Catalog,
    /// Cached feeds refreshed one after another within a single tick.
    Feeds(Vec<SourceName>),
}

impl Job {
    pub fn name(&self) -> String {
        match self {
            Job::Position => "position".to_string(),
            Job::Catalog => "catalog".to_string(),
            Job::Feeds(sources) if sources == &[SourceName::Flr, SourceName::Cme] => {
                "donki".to_string()
            }
            Job::Feeds(sources) => sources
                .iter()
                .map(SourceName::as_str)
                .collect::<Vec<_>>()
                .join("+"),
        }
    }

    /// Run one tick's worth of work, logging the outcome.
    pub async fn run(&self, aggregator: &Aggregator) {
        match self {
            Job::Position => match aggregator.fetch_position().await {
                Ok(Some(sample)) => info!(id = sample.id, "position sample stored"),
                Ok(None) => warn!("position fetched but log is empty"),
                Err(e) => warn!(code = e.code(), "position fetch failed: {}", e),
            },
            Job::Catalog => match aggregator.sync_catalog().await {
                Ok(written) => info!(written, "catalog synced"),
                Err(e) => warn!(code = e.code(), "catalog sync failed: {}", e),
            },
            Job::Feeds(sources) => {
                for &source in sources {
                    match aggregator.refresh_source(source).await {
                        Ok(()) => info!(source = source.as_str(), "feed cached"),
                        Err(e) => warn!(
                            source = source.as_str(),
                            code = e.code(),
                            "feed refresh failed: {}",
                            e
                        ),
                    }
                }
            }
        }
    }
}

/// The six jobs with their configured intervals.
pub fn jobs(schedule: &ScheduleConfig) -> Vec<(Job, Duration)> {
    vec![
        (Job::Position, schedule.position()),
        (Job::Catalog, schedule.catalog()),
        (Job::Feeds(vec![SourceName::Apod]), schedule.apod()),
        (Job::Feeds(vec![SourceName::Neo]), schedule.neo()),
        (
            Job::Feeds(vec![SourceName::Flr, SourceName::Cme]),
            schedule.donki(),
        ),
        (Job::Feeds(vec![SourceName::Spacex]), schedule.spacex()),
    ]
}

/// Handle to the running background tasks.
pub struct Scheduler {
    shutdown: CancellationToken,
    handles: Vec<JoinHandle<()>>,
}

impl Scheduler {
    /// Spawn every job from `schedule`. Cancelling `shutdown` (directly or
    /// through [`Scheduler::shutdown`]) stops them all.
    pub fn start(
        aggregator: Arc<Aggregator>,
        schedule: &ScheduleConfig,
        shutdown: CancellationToken,
    ) -> Self {
        Self::start_jobs(aggregator, jobs(schedule), shutdown)
    }

    pub fn start_jobs(
        aggregator: Arc<Aggregator>,
        jobs: Vec<(Job, Duration)>,
        shutdown: CancellationToken,
    ) -> Self {
        let handles = jobs
            .into_iter()
            .map(|(job, period)| {
                tokio::spawn(run_job(
                    aggregator.clone(),
                    job,
                    period,
                    shutdown.clone(),
                ))
            })
            .collect();
        Self { shutdown, handles }
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    /// Cancel every task and wait for them to finish their current tick.
    pub async fn shutdown(self) {
        self.shutdown.cancel();
        for handle in self.handles {
            if let Err(e) = handle.await {
                warn!("scheduler task ended abnormally: {}", e);
            }
        }
    }
}

async fn run_job(
    aggregator: Arc<Aggregator>,
    job: Job,
    period: Duration,
    shutdown: CancellationToken,
) {
    let name = job.name();
    info!(job = %name, every_secs = period.as_secs(), "background task starting");

    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            _ = ticker.tick() => {}
            _ = shutdown.cancelled() => break,
        }
        job.run(&aggregator).await;
    }

    info!(job = %name, "background task stopped");
}

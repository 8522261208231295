//! Tokio driver servicing a scheduler on a timer.
//!
//! The scheduler, the world and the executor live together behind one
//! `parking_lot::Mutex`. The lock is only held for synchronous work, never across an
//! await point.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info};

use crate::core::{CommandExecutor, QueueError, QueueRequest, Scheduler, TickReport, World};
use crate::util::clock::{now_secs, Timestamp};
use crate::util::serde::EntryId;

/// Counts from one service pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceReport {
    /// Tick results, if a new second started since the last pass.
    pub tick: Option<TickReport>,
    /// Entries popped from the player lane.
    pub ran: usize,
}

struct DriverState<W, E> {
    scheduler: Scheduler,
    world: W,
    executor: E,
    last_tick: Option<Timestamp>,
}

/// Shared handle owning a scheduler, its world and its executor.
pub struct QueueDriver<W, E> {
    state: Arc<Mutex<DriverState<W, E>>>,
    shutdown: Arc<Notify>,
}

impl<W, E> Clone for QueueDriver<W, E> {
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
            shutdown: Arc::clone(&self.shutdown),
        }
    }
}

impl<W, E> QueueDriver<W, E>
where
    W: World + Send + 'static,
    E: CommandExecutor<W> + Send + 'static,
{
    /// Wrap the three collaborators in a driver.
    pub fn new(scheduler: Scheduler, world: W, executor: E) -> Self {
        Self {
            state: Arc::new(Mutex::new(DriverState {
                scheduler,
                world,
                executor,
                last_tick: None,
            })),
            shutdown: Arc::new(Notify::new()),
        }
    }

    /// Queue a request at the current wall-clock time.
    ///
    /// # Errors
    ///
    /// Any admission or scheduling refusal.
    pub fn submit(&self, request: &QueueRequest) -> Result<EntryId, QueueError> {
        self.submit_at(request, now_secs())
    }

    /// Queue a request at `now`.
    ///
    /// # Errors
    ///
    /// Any admission or scheduling refusal.
    pub fn submit_at(&self, request: &QueueRequest, now: Timestamp) -> Result<EntryId, QueueError> {
        let mut guard = self.state.lock();
        let state = &mut *guard;
        state.scheduler.submit(&mut state.world, request, now)
    }

    /// Run `f` with exclusive access to the scheduler and world.
    pub fn with_state<R>(&self, f: impl FnOnce(&mut Scheduler, &mut W) -> R) -> R {
        let mut guard = self.state.lock();
        let state = &mut *guard;
        f(&mut state.scheduler, &mut state.world)
    }

    /// One service pass at `now`: tick once per new second, then run a chunk of the
    /// player lane. `active` selects the larger chunk used after network activity.
    pub fn service(&self, now: Timestamp, active: bool) -> ServiceReport {
        let mut guard = self.state.lock();
        let state = &mut *guard;

        let tick = if state.last_tick.is_none_or(|t| now > t) {
            state.last_tick = Some(now);
            Some(state.scheduler.tick(&mut state.world, now))
        } else {
            None
        };

        let config = state.scheduler.config();
        let chunk = if active {
            config.active_queue_chunk
        } else {
            config.queue_chunk
        };
        let ran = state
            .scheduler
            .run_top(&mut state.world, &mut state.executor, chunk);
        ServiceReport { tick, ran }
    }

    /// Seconds until the queue next needs service.
    pub fn next_service_in(&self, now: Timestamp) -> i64 {
        self.state.lock().scheduler.next_service_in(now)
    }

    /// Ask the service loop to stop. Takes effect even if the loop has not started yet.
    pub fn shutdown(&self) {
        self.shutdown.notify_one();
    }

    /// Service the queue every `tick_interval_ms` until [`QueueDriver::shutdown`].
    pub async fn run(&self) {
        let period = Duration::from_millis(self.state.lock().scheduler.config().tick_interval_ms);
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        info!(period_ms = period.as_millis(), "queue driver started");

        loop {
            tokio::select! {
                () = self.shutdown.notified() => break,
                _ = interval.tick() => {
                    let report = self.service(now_secs(), false);
                    if report.ran > 0 {
                        debug!(ran = report.ran, "queue service pass");
                    }
                }
            }
        }
        info!("queue driver stopped");
    }

    /// Spawn [`QueueDriver::run`] on the current tokio runtime.
    #[must_use]
    pub fn spawn(&self) -> JoinHandle<()> {
        let driver = self.clone();
        tokio::spawn(async move { driver.run().await })
    }
}

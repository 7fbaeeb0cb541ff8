//! Watch session: a cancellable scheduler thread feeding a channel.
//!
//! The scheduler owns its own SQLite connection and only reads (plus the
//! idempotent sweep). Sentinel writes and delivery happen on the consuming
//! side through [`Dispatcher`](crate::core::watchdog::Dispatcher).

use crate::config::Config;
use crate::core::policy::CheckPolicy;
use crate::core::sweep::sweep_missed_checks;
use crate::core::watchdog::{DueCheck, badge_count, find_due_checks};
use crate::db::pool::DbPool;
use crate::errors::{AppError, AppResult};
use chrono::NaiveDateTime;
use rusqlite::Connection;
use std::sync::Arc;
use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Source of "now" for the scheduler. Tests and `--now` pin it.
pub type Clock = Arc<dyn Fn() -> NaiveDateTime + Send + Sync>;

pub fn system_clock() -> Clock {
    Arc::new(crate::utils::time::now)
}

pub fn fixed_clock(at: NaiveDateTime) -> Clock {
    Arc::new(move || at)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WatchEvent {
    /// A newly actionable obligation with no sentinel yet.
    Due(DueCheck),
    /// Due + Overdue checks across the user's events.
    Badge { owner_id: String, count: usize },
    /// Rows moved to `missed` by a sweep tick (only sent when non-zero).
    Swept(usize),
    /// A tick failed; it is retried on the next one.
    TickFailed { transient: bool, message: String },
    /// End of one state tick; `tick` counts from 1.
    TickDone { tick: u64 },
}

/// Handle of a running watch session. Stopping or dropping it joins the
/// scheduler thread.
pub struct WatchSession {
    shutdown: Option<Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

struct Ticker {
    period: Duration,
    next: Instant,
}

impl Ticker {
    fn new(period: Duration, start: Instant) -> Self {
        Self {
            period,
            next: start,
        }
    }

    fn fire(&mut self, now: Instant) -> bool {
        if now < self.next {
            return false;
        }
        self.next = now + self.period;
        true
    }
}

impl WatchSession {
    pub fn spawn(cfg: Config, user: String, clock: Clock, events: Sender<WatchEvent>) -> AppResult<Self> {
        let pool = DbPool::with_busy_timeout(&cfg.database, cfg.busy_timeout_ms)?;
        let (shutdown_tx, shutdown_rx) = mpsc::channel::<()>();

        let handle = thread::Builder::new()
            .name(format!("recwatch-watch-{user}"))
            .spawn(move || {
                let policy = CheckPolicy::from_config(&cfg);
                let start = Instant::now();
                let mut state = Ticker::new(Duration::from_secs(cfg.watchdog_tick_secs), start);
                let mut badge = Ticker::new(Duration::from_secs(cfg.badge_tick_secs), start);
                let mut sweep = Ticker::new(Duration::from_secs(cfg.sweep_interval_secs.max(1)), start);
                let mut ticks = 0u64;

                loop {
                    let wall = Instant::now();
                    let now = clock();

                    if sweep.fire(wall) {
                        let res = sweep_missed_checks(&pool.conn, now, &policy, cfg.sweep_lookback_days);
                        let ev = match res {
                            Ok(0) => None,
                            Ok(n) => Some(WatchEvent::Swept(n)),
                            Err(e) => Some(failed(&e)),
                        };
                        if let Some(ev) = ev
                            && events.send(ev).is_err()
                        {
                            break;
                        }
                    }

                    if state.fire(wall) {
                        ticks += 1;
                        if !state_tick(&pool.conn, &cfg, &user, now, ticks, &events) {
                            break;
                        }
                    }

                    if badge.fire(wall) {
                        let ev = match badge_count(&pool.conn, &cfg, &user, now) {
                            Ok(count) => WatchEvent::Badge {
                                owner_id: user.clone(),
                                count,
                            },
                            Err(e) => failed(&e),
                        };
                        if events.send(ev).is_err() {
                            break;
                        }
                    }

                    let next = state.next.min(badge.next).min(sweep.next);
                    let wait = next.saturating_duration_since(Instant::now());
                    match shutdown_rx.recv_timeout(wait) {
                        Err(RecvTimeoutError::Timeout) => continue,
                        Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                    }
                }

                debug!(user = %user, ticks, "Watch scheduler stopped");
            })?;

        Ok(Self {
            shutdown: Some(shutdown_tx),
            handle: Some(handle),
        })
    }

    /// Signal the scheduler and wait for it to exit.
    pub fn stop(&mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        if let Some(handle) = self.handle.take()
            && handle.join().is_err()
        {
            warn!("Watch scheduler panicked");
        }
    }
}

impl Drop for WatchSession {
    fn drop(&mut self) {
        self.stop();
    }
}

fn failed(e: &AppError) -> WatchEvent {
    warn!(error = %e, transient = e.is_transient(), "Watch tick failed");
    WatchEvent::TickFailed {
        transient: e.is_transient(),
        message: e.to_string(),
    }
}

/// Returns `false` once the consumer is gone.
fn state_tick(
    conn: &Connection,
    cfg: &Config,
    user: &str,
    now: NaiveDateTime,
    tick: u64,
    events: &Sender<WatchEvent>,
) -> bool {
    match find_due_checks(conn, cfg, user, now) {
        Ok(due) => {
            for d in due {
                if events.send(WatchEvent::Due(d)).is_err() {
                    return false;
                }
            }
        }
        Err(e) => {
            if events.send(failed(&e)).is_err() {
                return false;
            }
        }
    }
    events.send(WatchEvent::TickDone { tick }).is_ok()
}

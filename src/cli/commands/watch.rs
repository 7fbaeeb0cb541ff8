use crate::cli::commands::{open_pool, resolve_user};
use crate::cli::parser::Commands;
use crate::config::Config;
use crate::core::runtime::{WatchEvent, WatchSession, fixed_clock, system_clock};
use crate::core::watchdog::{DesktopNotifier, DispatchOutcome, Dispatcher, Notifier, TerminalNotifier};
use crate::errors::{AppError, AppResult};
use crate::ui::messages::{info, reminder, warning};
use crate::utils::time::parse_datetime;
use std::sync::mpsc;
use tracing::debug;

pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Watch {
        user,
        ticks,
        native,
        now,
    } = cmd
    {
        let user = resolve_user(user, cfg)?;
        let clock = match now {
            Some(s) => fixed_clock(parse_datetime(s).ok_or_else(|| AppError::InvalidTime(s.clone()))?),
            None => system_clock(),
        };

        // Schema first: the scheduler thread only reads.
        let pool = open_pool(cfg)?;

        let notifier: Box<dyn Notifier> = if *native {
            Box::new(DesktopNotifier)
        } else {
            Box::new(TerminalNotifier)
        };
        let dispatcher = Dispatcher::new(notifier);

        let (tx, rx) = mpsc::channel();
        let mut session = WatchSession::spawn(cfg.clone(), user.clone(), clock, tx)?;
        info(format!("Watching recording checks for {user}…"));

        let mut last_badge = None;
        for event in rx.iter() {
            match event {
                WatchEvent::Due(due) => match dispatcher.dispatch(&pool.conn, &due) {
                    Ok(DispatchOutcome::Delivered(n)) => reminder(&n.title, &n.message),
                    Ok(DispatchOutcome::AlreadyHandled) => {}
                    Err(e) if e.is_transient() => warning(format!("Reminder not sent, retrying: {e}")),
                    Err(e) => {
                        session.stop();
                        return Err(e);
                    }
                },
                WatchEvent::Badge { count, .. } => {
                    if last_badge != Some(count) {
                        info(format!("{count} checks need your attention"));
                        last_badge = Some(count);
                    }
                }
                WatchEvent::Swept(n) => warning(format!("{n} checks marked as missed")),
                WatchEvent::TickFailed { message, .. } => warning(format!("Watch tick failed: {message}")),
                WatchEvent::TickDone { tick } => {
                    debug!(tick, "Watch tick done");
                    if ticks.is_some_and(|limit| tick >= limit) {
                        break;
                    }
                }
            }
        }

        session.stop();
    }
    Ok(())
}
